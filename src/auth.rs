use spin_sdk::http::{Request, Response};

use crate::config::*;
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, json_response, now, sanitize_text, verify_password};
use crate::core::storage::{NewUser, Storage};
use crate::models::models::{LoginBody, PublicUser, RegisterBody};

pub fn register(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let body: RegisterBody = match serde_json::from_slice(req.body()) {
        Ok(b) => b,
        Err(e) => return Ok(ApiError::BadRequest(e.to_string()).into()),
    };

    let username = sanitize_text(body.username.trim());
    let username_chars = username.chars().count();
    if username_chars < MIN_USERNAME_LENGTH || username_chars > MAX_USERNAME_LENGTH {
        return Ok(ApiError::BadRequest("Username must be 3-50 characters".to_string()).into());
    }
    if body.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Ok(ApiError::BadRequest("Password must be at least 3 characters".to_string()).into());
    }
    if store.get_user_by_username(&username).is_some() {
        return Ok(ApiError::Conflict("Username exists".to_string()).into());
    }

    let user = store.create_user(NewUser {
        username,
        password: hash_password(&body.password)?,
        display_name: body.display_name.map(|s| sanitize_text(&s)),
        bio: body.bio.map(|s| sanitize_text(&s)),
        avatar_url: body.avatar_url,
    });

    json_response(201, &PublicUser::from(user))
}

pub fn login(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let creds: LoginBody = match serde_json::from_slice(req.body()) {
        Ok(b) => b,
        Err(e) => return Ok(ApiError::BadRequest(e.to_string()).into()),
    };

    let user = match store.get_user_by_username(&creds.username) {
        Some(u) if verify_password(&creds.password, &u.password) => u,
        _ => return Ok(ApiError::Unauthorized.into()),
    };

    let token = store.create_session(user.id);
    json_response(
        200,
        &serde_json::json!({ "token": token, "userId": user.id }),
    )
}

pub fn logout(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let token = match bearer_token(&req) {
        Some(t) => t,
        None => return Ok(ApiError::Unauthorized.into()),
    };
    store.delete_session(&token);

    json_response(200, &serde_json::json!({ "message": "Logged out successfully" }))
}

pub fn bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.header("Authorization")?.as_str().unwrap_or_default();
    auth_header.strip_prefix("Bearer ").map(|t| t.to_string())
}

/// Resolve the caller's user id from the bearer token, rejecting expired
/// sessions and sessions for users that no longer exist.
pub fn authenticate(store: &dyn Storage, req: &Request) -> Option<u64> {
    let token = bearer_token(req)?;
    let session = store.get_session(&token)?;

    let age_hours = (now() - session.created_at).num_hours();
    if age_hours > session_expiration_hours() {
        return None;
    }
    store.get_user(session.user_id)?;
    Some(session.user_id)
}
