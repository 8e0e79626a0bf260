use std::sync::Arc;

use crate::config::Config;
use crate::db::UserStore;
use crate::email::Notifier;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub notifier: Arc<dyn Notifier>,
}
