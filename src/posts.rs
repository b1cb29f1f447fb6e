use std::sync::OnceLock;

use ammonia::Builder;
use html_escape::encode_double_quoted_attribute;
use regex::Regex;
use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{id_segment, json_response};
use crate::core::storage::Storage;
use crate::models::models::CreatePostBody;

/// POST /api/posts
pub fn create_post(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let body: CreatePostBody = match serde_json::from_slice(req.body()) {
        Ok(b) => b,
        Err(e) => return Ok(ApiError::BadRequest(e.to_string()).into()),
    };

    if body.content.is_empty() || body.content.chars().count() > MAX_POST_LENGTH {
        return Ok(ApiError::BadRequest("Invalid content".to_string()).into());
    }
    if body
        .image_url
        .as_ref()
        .is_some_and(|u| u.is_empty() || u.chars().count() > MAX_URL_LENGTH)
    {
        return Ok(ApiError::BadRequest("Invalid image URL".to_string()).into());
    }

    let post = store.create_post(user_id, filter_post_content(&body.content), body.image_url);

    json_response(201, &post)
}

/// GET /api/feed
pub fn get_feed(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    json_response(200, &store.get_feed(user_id))
}

/// GET /api/users/:userId/posts
pub fn get_user_posts(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    if authenticate(store, &req).is_none() {
        return Ok(ApiError::Unauthorized.into());
    }
    let user_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid user ID".to_string()).into()),
    };

    json_response(200, &store.get_user_posts(user_id))
}

fn url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("Regex should compile"))
}

/// Sanitize post content and turn bare http(s) URLs into anchor tags.
fn filter_post_content(content: &str) -> String {
    let clean = Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string();

    url_regex()
        .replace_all(&clean, |caps: &regex::Captures| {
            let url = &caps[0];
            let escaped_url = encode_double_quoted_attribute(url);
            format!(r#"<a href="{}" target="_blank">{}</a>"#, escaped_url, url)
        })
        .to_string()
}
