use crate::core::helpers::hash_password;
use crate::core::storage::{NewUser, Storage};

/// Seed a handful of demo accounts so a fresh instance has something to show.
/// Safe to call repeatedly; it skips usernames that already exist.
pub fn seed_demo_data(store: &mut dyn Storage) -> anyhow::Result<()> {
    if store.get_user_by_username("alice").is_some() {
        return Ok(());
    }

    let alice = store.create_user(NewUser {
        username: "alice".to_string(),
        password: hash_password("alice")?,
        display_name: Some("Alice".to_string()),
        bio: Some("Hello, I'm Alice!".to_string()),
        avatar_url: None,
    });
    let bob = store.create_user(NewUser {
        username: "bob".to_string(),
        password: hash_password("bob")?,
        display_name: Some("Bob".to_string()),
        bio: Some("Bob's corner of the internet".to_string()),
        avatar_url: None,
    });

    let welcome = store.create_post(
        alice.id,
        "Welcome to Ripple! Excited to share thoughts here.".to_string(),
        None,
    );
    store.create_post(
        alice.id,
        "Just finished an amazing project. Feeling productive today!".to_string(),
        None,
    );
    let hello = store.create_post(
        bob.id,
        "Hey everyone! Just joined, looking forward to connecting with you all.".to_string(),
        None,
    );

    store.follow_user(bob.id, alice.id);
    store.like_post(bob.id, welcome.id);
    store.add_comment(alice.id, hello.id, "Welcome aboard, Bob!".to_string());

    Ok(())
}
