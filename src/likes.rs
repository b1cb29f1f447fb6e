use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::core::errors::ApiError;
use crate::core::helpers::{id_segment, json_response};
use crate::core::storage::Storage;

/// POST /api/posts/:postId/like
pub fn like_post(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
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

    let like = store.like_post(user_id, post_id);

    json_response(201, &like)
}

/// DELETE /api/posts/:postId/like
pub fn unlike_post(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let post_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid post ID".to_string()).into()),
    };

    store.unlike_post(user_id, post_id);

    json_response(200, &serde_json::json!({ "status": "unliked" }))
}

/// GET /api/posts/:postId/likes
pub fn get_post_likes(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    if authenticate(store, &req).is_none() {
        return Ok(ApiError::Unauthorized.into());
    }
    let post_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid post ID".to_string()).into()),
    };

    json_response(200, &store.get_post_likes(post_id))
}
