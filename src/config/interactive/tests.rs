use super::load_existing_config as load_existing_config_impl;
use super::mask_secret;
use tempfile::TempDir;

#[test]
fn load_existing_config_without_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = load_existing_config_impl(temp_dir.path()).expect("config loaded successfully");

    assert_eq!(config.base_dir, temp_dir.path());
    assert!(!config.openai.chat_model.is_empty());
    assert!(config.vector_store.top_k > 0);
}

#[test]
fn masks_secrets() {
    assert_eq!(mask_secret(None), "<not set>");
    assert_eq!(mask_secret(Some("abc")), "****");
    assert_eq!(mask_secret(Some("sk-1234567890")), "****7890");
}
