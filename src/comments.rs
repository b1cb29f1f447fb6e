use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::config::MAX_COMMENT_LENGTH;
use crate::core::errors::ApiError;
use crate::core::helpers::{id_segment, json_response, sanitize_text};
use crate::core::storage::Storage;
use crate::models::models::CreateCommentBody;

/// POST /api/posts/:postId/comments
pub fn add_comment(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let post_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid post ID".to_string()).into()),
    };
    if store.get_post(post_id).is_none() {
        return Ok(ApiError::NotFound("Post not found".to_string()).into());
    }

    let body: CreateCommentBody = match serde_json::from_slice(req.body()) {
        Ok(b) => b,
        Err(e) => return Ok(ApiError::BadRequest(e.to_string()).into()),
    };

    let content = sanitize_text(&body.content);
    if content.is_empty() || content.chars().count() > MAX_COMMENT_LENGTH {
        return Ok(ApiError::BadRequest("Invalid content".to_string()).into());
    }

    let comment = store.add_comment(user_id, post_id, content);

    json_response(201, &comment)
}

/// GET /api/posts/:postId/comments
pub fn get_post_comments(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    if authenticate(store, &req).is_none() {
        return Ok(ApiError::Unauthorized.into());
    }
    let post_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid post ID".to_string()).into()),
    };

    json_response(200, &store.get_post_comments(post_id))
}
