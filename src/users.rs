use spin_sdk::http::{Request, Response};

use crate::auth::{authenticate, bearer_token};
use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{id_segment, json_response, sanitize_text};
use crate::core::storage::{ProfileChanges, Storage};
use crate::models::models::{PublicUser, UpdateProfileBody};

/// GET /api/users/:userId
pub fn get_user_details(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    if authenticate(store, &req).is_none() {
        return Ok(ApiError::Unauthorized.into());
    }
    let user_id = match id_segment(req.path(), 2) {
        Some(id) => id,
        None => return Ok(ApiError::BadRequest("Invalid user ID".to_string()).into()),
    };

    match store.get_user(user_id) {
        Some(user) => json_response(200, &PublicUser::from(user)),
        None => Ok(ApiError::NotFound("User not found".to_string()).into()),
    }
}

/// PUT /api/user/profile
///
/// The one composite handler: updates the profile, then re-establishes the
/// session by rotating the caller's token and returning the new one.
pub fn update_profile(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let user_id = match authenticate(store, &req) {
        Some(uid) => uid,
        None => return Ok(ApiError::Unauthorized.into()),
    };

    let body: UpdateProfileBody = match serde_json::from_slice(req.body()) {
        Ok(b) => b,
        Err(e) => return Ok(ApiError::BadRequest(e.to_string()).into()),
    };

    if body
        .bio
        .as_ref()
        .is_some_and(|b| b.chars().count() > MAX_BIO_LENGTH)
    {
        return Ok(ApiError::BadRequest("Bio too long (max 500 chars)".to_string()).into());
    }
    if body
        .display_name
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DISPLAY_NAME_LENGTH)
    {
        return Ok(ApiError::BadRequest("Display name too long (max 100 chars)".to_string()).into());
    }
    if body
        .avatar_url
        .as_ref()
        .is_some_and(|u| u.chars().count() > MAX_URL_LENGTH)
    {
        return Ok(ApiError::BadRequest("Avatar URL too long".to_string()).into());
    }

    let changes = ProfileChanges {
        display_name: body.display_name.map(|s| sanitize_text(&s)),
        bio: body.bio.map(|s| sanitize_text(&s)),
        avatar_url: body.avatar_url,
    };

    let user = match store.update_user_profile(user_id, changes) {
        Some(u) => u,
        None => return Ok(ApiError::NotFound("User not found".to_string()).into()),
    };

    // Rotate the session so the client continues with a fresh token.
    if let Some(old_token) = bearer_token(&req) {
        store.delete_session(&old_token);
    }
    let token = store.create_session(user_id);

    let mut response = serde_json::to_value(PublicUser::from(user))?;
    response["token"] = serde_json::Value::String(token);

    json_response(200, &response)
}
