use sha2::{Digest, Sha256};

/// Raw token size. 32 bytes gives 256 bits of entropy, 64 hex chars.
pub const TOKEN_BYTES: usize = 32;

pub fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Tokens are persisted only as this digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `<base_url>/reset_password?token=<token>&email=<email>`, with both query
/// values form-encoded.
pub fn reset_link(base_url: &str, token: &str, email: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("email", email)
        .finish();
    format!("{}/reset_password?{query}", base_url.trim_end_matches('/'))
}
