//! Tests for credential
//! Sign-in/sign-out flow over the file backend.

use std::sync::Arc;

use murmur_core::credential::*;
use tempfile::tempdir;

#[test]
fn test_login_logout_through_file_storage() {
    let dir = tempdir().unwrap();
    let storage: Arc<dyn SecureStorage> = Arc::new(FileRecordStorage::new(dir.path()));
    let session = SessionWriter::new(storage.clone());
    let accessor = CredentialAccessor::new(storage);

    assert!(accessor.get_token().is_none());
    assert!(!session.auth_state().is_logged_in);

    session.store_login(&Credential::new("bearer-1")).unwrap();
    assert_eq!(accessor.get_token().unwrap().expose(), "bearer-1");
    assert!(session.auth_state().is_logged_in);

    let raw = std::fs::read_to_string(dir.path().join("auth-key.json")).unwrap();
    assert_eq!(raw, r#"{"isLoggedIn":true,"token":"bearer-1"}"#);

    session.store_logout().unwrap();
    assert!(accessor.get_token().is_none());
    assert_eq!(session.auth_state(), AuthRecord::logged_out());
}

#[test]
fn test_token_is_read_even_if_flag_is_false() {
    let storage = Arc::new(MemoryRecordStorage::new());
    storage
        .save_record(AUTH_STORAGE_KEY, br#"{"isLoggedIn":false,"token":"left-over"}"#)
        .unwrap();

    let accessor = CredentialAccessor::new(storage);
    assert_eq!(accessor.get_token().unwrap().expose(), "left-over");
}

#[test]
fn test_custom_key_is_isolated() {
    let storage: Arc<dyn SecureStorage> = Arc::new(MemoryRecordStorage::new());
    let work = SessionWriter::with_key(storage.clone(), "work-auth");
    work.store_login(&Credential::new("w")).unwrap();

    assert!(CredentialAccessor::new(storage.clone()).get_token().is_none());
    assert_eq!(work.accessor().get_token().unwrap().expose(), "w");
}

#[test]
fn test_accessor_is_a_token_source() {
    let storage: Arc<dyn SecureStorage> = Arc::new(MemoryRecordStorage::new());
    SessionWriter::new(storage.clone())
        .store_login(&Credential::new("t"))
        .unwrap();

    let source: Arc<dyn TokenSource> = Arc::new(CredentialAccessor::new(storage));
    assert_eq!(source.get_token().unwrap().bearer(), "Bearer t");
    assert!(StaticToken::absent().get_token().is_none());
}
