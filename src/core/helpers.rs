use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use spin_sdk::http::Response;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::PasswordHash;

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Parse the path segment at `index` (zero-based, leading slash ignored) as an
/// entity id. `/api/posts/7/like` has the post id at index 2.
pub fn id_segment(path: &str, index: usize) -> Option<u64> {
    path.trim_start_matches('/')
        .split('/')
        .nth(index)?
        .parse()
        .ok()
}

/// Strip all HTML, leaving plain text. Used for usernames, display names,
/// bios and comments.
pub fn sanitize_text(text: &str) -> String {
    ammonia::Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text)
        .to_string()
}

pub fn json_response(status: u16, body: &impl serde::Serialize) -> anyhow::Result<Response> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_vec(body)?)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_segment_parses_entity_ids() {
        assert_eq!(id_segment("/api/posts/7/like", 2), Some(7));
        assert_eq!(id_segment("/api/follow/12", 2), Some(12));
        assert_eq!(id_segment("/api/follow/abc", 2), None);
        assert_eq!(id_segment("/api/follow", 2), None);
    }

    #[test]
    fn sanitize_strips_markup() {
        assert_eq!(sanitize_text("<script>x</script>hello"), "hello");
        assert_eq!(sanitize_text("<b>bold</b> name"), "bold name");
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }
}
