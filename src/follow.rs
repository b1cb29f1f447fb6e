use spin_sdk::http::{Request, Response};

use crate::auth::authenticate;
use crate::core::errors::ApiError;
use crate::core::helpers::{id_segment, json_response};
use crate::core::storage::Storage;

/// POST /api/follow/:userId
pub fn follow(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let target_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid target user".to_string()).into()),
    };
    if target_id == user_id {
        return Ok(ApiError::BadRequest("Cannot follow yourself".to_string()).into());
    }
    if store.get_user(target_id).is_none() {
        return Ok(ApiError::NotFound("Target user not found".to_string()).into());
    }

    let edge = store.follow_user(user_id, target_id);

    json_response(200, &edge)
}

/// DELETE /api/follow/:userId
pub fn unfollow(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let target_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid target user".to_string()).into()),
    };

    // Removing an absent edge is a no-op.
    store.unfollow_user(user_id, target_id);

    json_response(200, &serde_json::json!({ "status": "unfollowed" }))
}

/// GET /api/users/:userId/following
///
/// Whether the caller follows :userId, as a bare JSON boolean.
pub fn is_following(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let target_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid user ID".to_string()).into()),
    };

    json_response(200, &store.is_following(user_id, target_id))
}
