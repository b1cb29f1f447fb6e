use spin_sdk::http::{Request, Response};

pub mod auth;
pub mod comments;
pub mod config;
pub mod follow;
pub mod likes;
pub mod posts;
pub mod users;

pub mod core {
    pub mod db;
    pub mod errors;
    pub mod helpers;
    pub mod static_server;
    pub mod storage;
}

pub mod models {
    pub mod models;
}

use crate::core::errors::ApiError;
use crate::core::storage::Storage;

/// Dispatch a request against the injected store. Both the Spin component and
/// the native adapter binary funnel through here.
pub fn route(store: &mut dyn Storage, req: Request) -> anyhow::Result<Response> {
    let path = req.path().to_string();
    let method = req.method().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "register"]) => auth::register(store, req),
        ("POST", ["api", "login"]) => auth::login(store, req),
        ("POST", ["api", "logout"]) => auth::logout(store, req),

        ("POST", ["api", "posts"]) => posts::create_post(store, req),
        ("GET", ["api", "feed"]) => posts::get_feed(store, req),

        ("POST", ["api", "follow", _]) => follow::follow(store, req),
        ("DELETE", ["api", "follow", _]) => follow::unfollow(store, req),

        ("POST", ["api", "posts", _, "like"]) => likes::like_post(store, req),
        ("DELETE", ["api", "posts", _, "like"]) => likes::unlike_post(store, req),
        ("GET", ["api", "posts", _, "likes"]) => likes::get_post_likes(store, req),

        ("POST", ["api", "posts", _, "comments"]) => comments::add_comment(store, req),
        ("GET", ["api", "posts", _, "comments"]) => comments::get_post_comments(store, req),

        ("GET", ["api", "users", _, "posts"]) => posts::get_user_posts(store, req),
        ("GET", ["api", "users", _, "following"]) => follow::is_following(store, req),
        ("GET", ["api", "users", _]) => users::get_user_details(store, req),
        ("PUT", ["api", "user", "profile"]) => users::update_profile(store, req),

        ("GET", _) if !path.starts_with("/api") => core::static_server::serve_static(&path),

        _ => Ok(ApiError::NotFound("No route found".to_string()).into()),
    }
}

#[cfg(target_arch = "wasm32")]
mod component {
    use std::cell::RefCell;

    use spin_sdk::http::{IntoResponse, Request};
    use spin_sdk::http_component;

    use crate::core::db::seed_demo_data;
    use crate::core::storage::MemStorage;

    thread_local! {
        static STORE: RefCell<MemStorage> = RefCell::new(MemStorage::new());
    }

    #[http_component]
    fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        STORE.with(|store| {
            let mut store = store.borrow_mut();
            seed_demo_data(&mut *store)?;
            crate::route(&mut *store, req)
        })
    }
}
