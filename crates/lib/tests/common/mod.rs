#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared setup for the integration tests of this crate.

use serde_json::{json, Value};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once per test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A translation-tag create payload for one verse.
pub fn translation_payload(verse_id: &str, entries: Value) -> Value {
    json!({ "verse_id": verse_id, "translationtags": entries })
}

/// A purport-tag create payload for one verse.
pub fn purport_payload(verse_id: &str, entries: Value) -> Value {
    json!({ "verse_id": verse_id, "purporttags": entries })
}
