pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_POST_LENGTH: usize = 5000;
pub const MAX_COMMENT_LENGTH: usize = 1000;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;
pub const MAX_URL_LENGTH: usize = 2048;

pub fn session_expiration_hours() -> i64 {
    std::env::var("RIPPLE_SESSION_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn listen_addr() -> String {
    std::env::var("RIPPLE_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string())
}
