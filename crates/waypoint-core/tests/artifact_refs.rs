// crates/waypoint-core/tests/artifact_refs.rs
// ============================================================================
// Module: Artifact Reference Tests
// Description: Tests for the tagged artifact reference union and hashing.
// Purpose: Validate discriminator handling, size caps, and digest checks.
// Dependencies: waypoint-core, serde_json
// ============================================================================

//! ## Overview
//! Validates artifact reference construction, serialization tags, and
//! fail-closed hash handling.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use serde_json::json;
use waypoint_core::ArtifactError;
use waypoint_core::ArtifactRef;
use waypoint_core::ContentHash;
use waypoint_core::MAX_INLINE_BYTES;
use waypoint_core::core::artifact::hash_bytes;

// ============================================================================
// SECTION: Content Hash Tests
// ============================================================================

/// Tests hash construction accepts a 64-character lowercase hex digest.
#[test]
fn content_hash_accepts_lowercase_hex() {
    let hash = ContentHash::new("a".repeat(64)).expect("valid hash");
    assert_eq!(hash.as_str().len(), 64);
}

/// Tests hash construction rejects short values.
#[test]
fn content_hash_rejects_short_values() {
    let err = ContentHash::new("abc123").expect_err("short hash");
    assert!(matches!(err, ArtifactError::MalformedHash(_)));
}

/// Tests hash construction rejects uppercase hex.
#[test]
fn content_hash_rejects_uppercase_hex() {
    let err = ContentHash::new("A".repeat(64)).expect_err("uppercase hash");
    assert!(matches!(err, ArtifactError::MalformedHash(_)));
}

/// Tests hash_bytes produces the well-known sha-256 of an empty payload.
#[test]
fn hash_bytes_matches_known_digest() {
    let digest = hash_bytes(b"");
    assert_eq!(
        digest.as_str(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

// ============================================================================
// SECTION: Reference Shape Tests
// ============================================================================

/// Tests the wire form carries the kind discriminator.
#[test]
fn serialized_reference_carries_kind_tag() {
    let artifact = ArtifactRef::Inline {
        content: "patch".to_string(),
        content_type: "text/x-diff".to_string(),
        content_hash: None,
    };
    let value = serde_json::to_value(&artifact).expect("serialize");
    assert_eq!(value["kind"], json!("inline"));
}

/// Tests inline content over the cap fails validation.
#[test]
fn oversized_inline_content_fails_validation() {
    let artifact = ArtifactRef::Inline {
        content: "x".repeat(MAX_INLINE_BYTES + 1),
        content_type: "text/plain".to_string(),
        content_hash: None,
    };
    let err = artifact.validate().expect_err("oversized inline");
    assert!(matches!(err, ArtifactError::TooLarge { .. }));
}

/// Tests pointer previews over the cap fail validation.
#[test]
fn oversized_preview_fails_validation() {
    let artifact = ArtifactRef::Pointer {
        uri: "blob://artifact".to_string(),
        content_type: "text/plain".to_string(),
        size_bytes: 10,
        content_hash: hash_bytes(b"artifact"),
        preview: Some("p".repeat(4 * 1024 + 1)),
    };
    assert!(artifact.validate().is_err());
}

/// Tests inline digest verification detects tampered content.
#[test]
fn inline_hash_mismatch_is_detected() {
    let artifact = ArtifactRef::Inline {
        content: "tampered".to_string(),
        content_type: "text/plain".to_string(),
        content_hash: Some(hash_bytes(b"original")),
    };
    assert!(!artifact.inline_hash_matches());

    let artifact = ArtifactRef::Inline {
        content: "original".to_string(),
        content_type: "text/plain".to_string(),
        content_hash: Some(hash_bytes(b"original")),
    };
    assert!(artifact.inline_hash_matches());
}

/// Tests deserialization fails closed on malformed digests.
#[test]
fn deserialization_rejects_malformed_digest() {
    let value = json!({
        "kind": "pointer",
        "uri": "blob://artifact",
        "content_type": "text/plain",
        "size_bytes": 10,
        "content_hash": "not-a-digest",
        "preview": null
    });
    assert!(serde_json::from_value::<ArtifactRef>(value).is_err());
}
