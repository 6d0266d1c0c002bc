//! Integration tests for sessions surviving a restart.

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use royal_florist_integration_tests::MockShop;
use royal_florist_storefront::notify::NoticeLog;
use royal_florist_storefront::session::{FileStorage, Storage, keys};
use royal_florist_storefront::{Storefront, StorefrontError};
use secrecy::ExposeSecret;

const EMAIL: &str = "ada@royal.com";

fn session_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("royal-florist-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

fn open(shop: &MockShop, path: &Path) -> Storefront {
    shop.connect(Arc::new(FileStorage::new(path)), Arc::new(NoticeLog::new()))
        .unwrap()
}

#[tokio::test]
async fn test_session_survives_restart() {
    let shop = MockShop::start().await.unwrap();
    shop.add_account("Ada", EMAIL, "secret1");
    let path = session_path();

    let first = open(&shop, &path);
    first.auth().login_with_password(EMAIL, "secret1").await.unwrap();
    let token = first.session().current_token().unwrap().expose_secret().to_string();
    drop(first);

    let second = open(&shop, &path);
    assert!(second.session().is_authenticated());
    assert_eq!(second.session().current_token().unwrap().expose_secret(), token);
    assert_eq!(second.session().current_user().unwrap().name, "Ada");

    // The restored token is still accepted by the server.
    let user = second.profile().fetch().await.unwrap();
    assert_eq!(user.email.as_str(), EMAIL);

    second.auth().logout().unwrap();
    assert!(!path.exists());

    let third = open(&shop, &path);
    assert!(!third.session().is_authenticated());
    assert!(matches!(
        third.auth().require_auth(),
        Err(StorefrontError::Unauthenticated)
    ));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[tokio::test]
async fn test_half_written_session_is_discarded() {
    let shop = MockShop::start().await.unwrap();
    let path = session_path();
    let storage = FileStorage::new(path.clone());
    storage.set(keys::TOKEN, "orphan-token").unwrap();

    let store = open(&shop, &path);

    assert!(!store.session().is_authenticated());
    assert!(store.session().current_token().is_none());
    assert_eq!(storage.get(keys::TOKEN).unwrap(), None);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
