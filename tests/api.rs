use serde_json::{json, Value};
use spin_sdk::http::{Method, Request};

use ripple::core::storage::MemStorage;

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request {
    let mut builder = Request::builder();
    builder.method(method).uri(uri);
    if let Some(token) = token {
        let header = format!("Bearer {}", token);
        builder.header("Authorization", header.as_str());
    }
    let bytes = body
        .map(|v| serde_json::to_vec(&v).expect("serializable body"))
        .unwrap_or_default();
    builder.body(bytes).build()
}

fn send(
    store: &mut MemStorage,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let resp = ripple::route(store, request(method, uri, token, body)).expect("handler failed");
    let status = *resp.status();
    let value = if resp.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(resp.body()).unwrap_or(Value::Null)
    };
    (status, value)
}

fn register_and_login(store: &mut MemStorage, username: &str) -> (u64, String) {
    let (status, user) = send(
        store,
        Method::Post,
        "/api/register",
        None,
        Some(json!({ "username": username, "password": "secret" })),
    );
    assert_eq!(status, 201, "register failed: {:?}", user);
    let user_id = user["id"].as_u64().expect("user id");

    let (status, login) = send(
        store,
        Method::Post,
        "/api/login",
        None,
        Some(json!({ "username": username, "password": "secret" })),
    );
    assert_eq!(status, 200, "login failed: {:?}", login);
    let token = login["token"].as_str().expect("token").to_string();
    assert_eq!(login["userId"].as_u64(), Some(user_id));

    (user_id, token)
}

#[test]
fn register_login_post_and_feed_flow() {
    let mut store = MemStorage::new();
    let (user_id, token) = register_and_login(&mut store, "flow_user");

    let (status, post) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "My first post!" })),
    );
    assert_eq!(status, 201);
    assert_eq!(post["content"], "My first post!");
    assert_eq!(post["userId"].as_u64(), Some(user_id));
    assert!(post["createdAt"].is_string());

    let (status, feed) = send(&mut store, Method::Get, "/api/feed", Some(token.as_str()), None);
    assert_eq!(status, 200);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["id"], post["id"]);
}

#[test]
fn register_response_hides_password() {
    let mut store = MemStorage::new();
    let (status, user) = send(
        &mut store,
        Method::Post,
        "/api/register",
        None,
        Some(json!({ "username": "careful", "password": "secret", "bio": "hi" })),
    );
    assert_eq!(status, 201);
    assert!(user.get("password").is_none());
    assert_eq!(user["bio"], "hi");
}

#[test]
fn duplicate_username_is_conflict() {
    let mut store = MemStorage::new();
    register_and_login(&mut store, "taken");

    let (status, body) = send(
        &mut store,
        Method::Post,
        "/api/register",
        None,
        Some(json!({ "username": "taken", "password": "other" })),
    );
    assert_eq!(status, 409);
    assert_eq!(body["message"], "Username exists");
}

#[test]
fn invalid_credentials_are_unauthorized() {
    let mut store = MemStorage::new();
    register_and_login(&mut store, "present");

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/login",
        None,
        Some(json!({ "username": "present", "password": "wrong" })),
    );
    assert_eq!(status, 401);

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/login",
        None,
        Some(json!({ "username": "absent", "password": "any" })),
    );
    assert_eq!(status, 401);
}

#[test]
fn api_requires_authentication() {
    let mut store = MemStorage::new();

    let (status, _) = send(&mut store, Method::Get, "/api/feed", None, None);
    assert_eq!(status, 401);

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        None,
        Some(json!({ "content": "nope" })),
    );
    assert_eq!(status, 401);

    let (status, _) = send(&mut store, Method::Get, "/api/feed", Some("bogus-token"), None);
    assert_eq!(status, 401);
}

#[test]
fn post_content_is_validated() {
    let mut store = MemStorage::new();
    let (_, token) = register_and_login(&mut store, "validator");

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "" })),
    );
    assert_eq!(status, 400);

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "a".repeat(5001) })),
    );
    assert_eq!(status, 400);

    // Not a CreatePostBody at all.
    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "text": "wrong field" })),
    );
    assert_eq!(status, 400);
}

#[test]
fn length_limits_count_characters_not_bytes() {
    let mut store = MemStorage::new();

    // Two multibyte characters stay below the 3-character minimum.
    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/register",
        None,
        Some(json!({ "username": "éé", "password": "secret" })),
    );
    assert_eq!(status, 400);

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/register",
        None,
        Some(json!({ "username": "ééé", "password": "secret" })),
    );
    assert_eq!(status, 201);

    let (_, token) = register_and_login(&mut store, "unicode_author");

    // 5000 multibyte characters is within the post limit even though it is
    // twice that many bytes.
    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "é".repeat(5000) })),
    );
    assert_eq!(status, 201);

    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "é".repeat(5001) })),
    );
    assert_eq!(status, 400);

    let (status, _) = send(
        &mut store,
        Method::Put,
        "/api/user/profile",
        Some(token.as_str()),
        Some(json!({ "bio": "é".repeat(500) })),
    );
    assert_eq!(status, 200);
}

#[test]
fn feed_follows_the_follow_graph() {
    let mut store = MemStorage::new();
    let (_a_id, a_token) = register_and_login(&mut store, "user_a");
    let (b_id, b_token) = register_and_login(&mut store, "user_b");
    let (_c_id, c_token) = register_and_login(&mut store, "user_c");

    let (status, edge) = send(
        &mut store,
        Method::Post,
        &format!("/api/follow/{}", b_id),
        Some(a_token.as_str()),
        None,
    );
    assert_eq!(status, 200);
    assert_eq!(edge["followingId"].as_u64(), Some(b_id));

    let (status, post) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(b_token.as_str()),
        Some(json!({ "content": "hello" })),
    );
    assert_eq!(status, 201);
    let post_id = post["id"].as_u64().unwrap();

    let (_, a_feed) = send(&mut store, Method::Get, "/api/feed", Some(a_token.as_str()), None);
    assert!(a_feed
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["id"].as_u64() == Some(post_id)));

    let (_, c_feed) = send(&mut store, Method::Get, "/api/feed", Some(c_token.as_str()), None);
    assert!(c_feed
        .as_array()
        .unwrap()
        .iter()
        .all(|p| p["id"].as_u64() != Some(post_id)));
}

#[test]
fn feed_is_newest_first_across_authors() {
    let mut store = MemStorage::new();
    let (a_id, a_token) = register_and_login(&mut store, "chrono_a");
    let (b_id, b_token) = register_and_login(&mut store, "chrono_b");

    send(
        &mut store,
        Method::Post,
        &format!("/api/follow/{}", b_id),
        Some(a_token.as_str()),
        None,
    );

    for (token, content) in [(&a_token, "one"), (&b_token, "two"), (&a_token, "three")] {
        let (status, _) = send(
            &mut store,
            Method::Post,
            "/api/posts",
            Some(token.as_str()),
            Some(json!({ "content": content })),
        );
        assert_eq!(status, 201);
    }

    let (_, feed) = send(&mut store, Method::Get, "/api/feed", Some(a_token.as_str()), None);
    let contents: Vec<&str> = feed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["three", "two", "one"]);

    let (_, a_posts) = send(
        &mut store,
        Method::Get,
        &format!("/api/users/{}/posts", a_id),
        Some(a_token.as_str()),
        None,
    );
    let contents: Vec<&str> = a_posts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["three", "one"]);
}

#[test]
fn follow_edge_cases() {
    let mut store = MemStorage::new();
    let (a_id, a_token) = register_and_login(&mut store, "edge_a");
    let (b_id, _) = register_and_login(&mut store, "edge_b");

    // Self-follow rejected.
    let (status, _) = send(
        &mut store,
        Method::Post,
        &format!("/api/follow/{}", a_id),
        Some(a_token.as_str()),
        None,
    );
    assert_eq!(status, 400);

    // Unknown target.
    let (status, body) = send(&mut store, Method::Post, "/api/follow/999", Some(a_token.as_str()), None);
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Target user not found");

    // Follow, check the boolean endpoint, then unfollow twice.
    send(
        &mut store,
        Method::Post,
        &format!("/api/follow/{}", b_id),
        Some(a_token.as_str()),
        None,
    );
    let (status, following) = send(
        &mut store,
        Method::Get,
        &format!("/api/users/{}/following", b_id),
        Some(a_token.as_str()),
        None,
    );
    assert_eq!(status, 200);
    assert_eq!(following, Value::Bool(true));

    for _ in 0..2 {
        let (status, body) = send(
            &mut store,
            Method::Delete,
            &format!("/api/follow/{}", b_id),
            Some(a_token.as_str()),
            None,
        );
        assert_eq!(status, 200);
        assert_eq!(body["status"], "unfollowed");
    }

    let (_, following) = send(
        &mut store,
        Method::Get,
        &format!("/api/users/{}/following", b_id),
        Some(a_token.as_str()),
        None,
    );
    assert_eq!(following, Value::Bool(false));
}

#[test]
fn like_and_unlike_roundtrip() {
    let mut store = MemStorage::new();
    let (_, author_token) = register_and_login(&mut store, "liked_author");
    let (fan_id, fan_token) = register_and_login(&mut store, "fan");

    let (_, post) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(author_token.as_str()),
        Some(json!({ "content": "like me" })),
    );
    let post_id = post["id"].as_u64().unwrap();

    let likes_uri = format!("/api/posts/{}/likes", post_id);
    let like_uri = format!("/api/posts/{}/like", post_id);

    let (_, likes) = send(&mut store, Method::Get, &likes_uri, Some(fan_token.as_str()), None);
    let before = likes.as_array().unwrap().len();

    let (status, like) = send(&mut store, Method::Post, &like_uri, Some(fan_token.as_str()), None);
    assert_eq!(status, 201);
    assert_eq!(like["userId"].as_u64(), Some(fan_id));

    // Second like does not add another edge.
    send(&mut store, Method::Post, &like_uri, Some(fan_token.as_str()), None);
    let (_, likes) = send(&mut store, Method::Get, &likes_uri, Some(fan_token.as_str()), None);
    assert_eq!(likes.as_array().unwrap().len(), before + 1);

    let (status, _) = send(&mut store, Method::Delete, &like_uri, Some(fan_token.as_str()), None);
    assert_eq!(status, 200);
    let (_, likes) = send(&mut store, Method::Get, &likes_uri, Some(fan_token.as_str()), None);
    assert_eq!(likes.as_array().unwrap().len(), before);

    // Liking a missing post is a 404.
    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts/999/like",
        Some(fan_token.as_str()),
        None,
    );
    assert_eq!(status, 404);
}

#[test]
fn comments_grow_by_one_and_return_newest_first() {
    let mut store = MemStorage::new();
    let (_, token) = register_and_login(&mut store, "commenter");

    let (_, post) = send(
        &mut store,
        Method::Post,
        "/api/posts",
        Some(token.as_str()),
        Some(json!({ "content": "discuss" })),
    );
    let comments_uri = format!("/api/posts/{}/comments", post["id"]);

    for content in ["first", "second"] {
        let (status, comment) = send(
            &mut store,
            Method::Post,
            &comments_uri,
            Some(token.as_str()),
            Some(json!({ "content": content })),
        );
        assert_eq!(status, 201);
        assert_eq!(comment["content"], content);
    }

    let (status, comments) = send(&mut store, Method::Get, &comments_uri, Some(token.as_str()), None);
    assert_eq!(status, 200);
    let comments = comments.as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "second");
    assert_eq!(comments[1]["content"], "first");

    // Commenting on a missing post is a 404; empty comments are rejected.
    let (status, _) = send(
        &mut store,
        Method::Post,
        "/api/posts/999/comments",
        Some(token.as_str()),
        Some(json!({ "content": "void" })),
    );
    assert_eq!(status, 404);

    let (status, _) = send(
        &mut store,
        Method::Post,
        &comments_uri,
        Some(token.as_str()),
        Some(json!({ "content": "" })),
    );
    assert_eq!(status, 400);
}

#[test]
fn user_lookup_hides_password_and_404s() {
    let mut store = MemStorage::new();
    let (user_id, token) = register_and_login(&mut store, "visible");

    let (status, user) = send(
        &mut store,
        Method::Get,
        &format!("/api/users/{}", user_id),
        Some(token.as_str()),
        None,
    );
    assert_eq!(status, 200);
    assert_eq!(user["username"], "visible");
    assert!(user.get("password").is_none());

    let (status, body) = send(&mut store, Method::Get, "/api/users/999", Some(token.as_str()), None);
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found");
}

#[test]
fn profile_update_rotates_the_session() {
    let mut store = MemStorage::new();
    let (_, token) = register_and_login(&mut store, "profiled");

    let (status, updated) = send(
        &mut store,
        Method::Put,
        "/api/user/profile",
        Some(token.as_str()),
        Some(json!({ "displayName": "Display Me", "bio": "short bio" })),
    );
    assert_eq!(status, 200);
    assert_eq!(updated["displayName"], "Display Me");
    assert_eq!(updated["bio"], "short bio");
    assert!(updated.get("password").is_none());

    let new_token = updated["token"].as_str().expect("rotated token").to_string();
    assert_ne!(new_token, token);

    // Old token is dead, the rotated one works.
    let (status, _) = send(&mut store, Method::Get, "/api/feed", Some(token.as_str()), None);
    assert_eq!(status, 401);
    let (status, _) = send(&mut store, Method::Get, "/api/feed", Some(new_token.as_str()), None);
    assert_eq!(status, 200);

    // Partial update keeps earlier fields.
    let (status, updated) = send(
        &mut store,
        Method::Put,
        "/api/user/profile",
        Some(new_token.as_str()),
        Some(json!({ "avatarUrl": "https://example.com/a.png" })),
    );
    assert_eq!(status, 200);
    assert_eq!(updated["displayName"], "Display Me");
    assert_eq!(updated["avatarUrl"], "https://example.com/a.png");
}

#[test]
fn oversized_bio_is_rejected() {
    let mut store = MemStorage::new();
    let (_, token) = register_and_login(&mut store, "bio_heavy");

    let (status, _) = send(
        &mut store,
        Method::Put,
        "/api/user/profile",
        Some(token.as_str()),
        Some(json!({ "bio": "b".repeat(501) })),
    );
    assert_eq!(status, 400);
}

#[test]
fn logout_invalidates_the_token() {
    let mut store = MemStorage::new();
    let (_, token) = register_and_login(&mut store, "leaver");

    let (status, _) = send(&mut store, Method::Post, "/api/logout", Some(token.as_str()), None);
    assert_eq!(status, 200);

    let (status, _) = send(&mut store, Method::Get, "/api/feed", Some(token.as_str()), None);
    assert_eq!(status, 401);
}

#[test]
fn unknown_api_route_is_404() {
    let mut store = MemStorage::new();
    let (status, body) = send(&mut store, Method::Get, "/api/nothing/here", None, None);
    assert_eq!(status, 404);
    assert_eq!(body["message"], "No route found");
}

#[test]
fn root_serves_the_client_shell() {
    let mut store = MemStorage::new();
    let resp = ripple::route(&mut store, request(Method::Get, "/", None, None)).unwrap();
    assert_eq!(*resp.status(), 200);
    assert!(std::str::from_utf8(resp.body()).unwrap().contains("Ripple"));
}
