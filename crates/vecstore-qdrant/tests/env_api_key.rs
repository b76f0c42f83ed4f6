//! Process environment handling.
//!
//! Everything that touches environment variables lives in a single test so
//! no two tests mutate the environment concurrently.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use vecstore_qdrant::{InvalidOption, QDRANT_API_KEY_ENV, StoreOptions, Transport};
use vecstore_test::MockEmbedder;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn options() -> StoreOptions {
    StoreOptions::new()
        .with_embedder(Arc::new(MockEmbedder::new(3)))
        .with_index_name("docs")
        .with_host("http://localhost:6333")
        .with_collection_name("mycol")
}

#[test]
fn api_key_falls_back_to_environment() {
    init_tracing();

    // SAFETY: this is the only test in the binary that reads or writes the
    // process environment.
    unsafe { std::env::remove_var(QDRANT_API_KEY_ENV) };
    let error = options().build().unwrap_err();
    assert_eq!(error.invalid_option(), Some(InvalidOption::MissingApiKey));
    assert!(error.to_string().contains(QDRANT_API_KEY_ENV));

    unsafe { std::env::set_var(QDRANT_API_KEY_ENV, "") };
    let error = options().build().unwrap_err();
    assert_eq!(error.invalid_option(), Some(InvalidOption::MissingApiKey));

    unsafe { std::env::set_var(QDRANT_API_KEY_ENV, "env-key") };
    let store = options().build().unwrap();
    assert_eq!(store.api_key(), "env-key");
    assert_eq!(store.text_key(), "text");

    let store = options().with_api_key("k1").build().unwrap();
    assert_eq!(store.api_key(), "k1");

    unsafe {
        std::env::set_var("QDRANT_HOST", "http://qdrant.internal:6333");
        std::env::set_var("QDRANT_COLLECTION", "articles");
        std::env::set_var("QDRANT_INDEX", "kb");
    }
    let store = StoreOptions::from_env()
        .with_embedder(Arc::new(MockEmbedder::new(3)))
        .build()
        .unwrap();
    assert_eq!(store.host(), "http://qdrant.internal:6333");
    assert_eq!(store.collection_name(), "articles");
    assert_eq!(store.index_name(), "kb");
    assert_eq!(store.api_key(), "env-key");
    assert_eq!(store.transport(), Transport::Rest);

    unsafe {
        std::env::remove_var(QDRANT_API_KEY_ENV);
        std::env::remove_var("QDRANT_HOST");
        std::env::remove_var("QDRANT_COLLECTION");
        std::env::remove_var("QDRANT_INDEX");
    }
}
