// crates/waypoint-core/src/core/artifact.rs
// ============================================================================
// Module: Waypoint Artifact References
// Description: Tagged references to step-produced content, inline or pointed.
// Purpose: Carry artifact payloads with fail-closed size and hash invariants.
// Dependencies: serde, sha2, thiserror
// ============================================================================

//! ## Overview
//! Artifact references are a tagged sum type with exactly two shapes:
//! a [`ArtifactRef::Pointer`] into external blob storage and a small
//! [`ArtifactRef::Inline`] payload. Callers must match on the discriminator;
//! there is no loosely typed fallback. Size caps and hash shapes are
//! validated fail-closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum inline artifact content size in bytes.
pub const MAX_INLINE_BYTES: usize = 64 * 1024;
/// Maximum pointer preview size in bytes.
pub const MAX_PREVIEW_BYTES: usize = 4 * 1024;
/// Required content hash length in hex characters.
pub const CONTENT_HASH_LEN: usize = 64;

// ============================================================================
// SECTION: Artifact Errors
// ============================================================================

/// Errors for artifact reference construction and validation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact content exceeds a size cap.
    #[error("artifact {what} too large ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Which payload exceeded the cap (content or preview).
        what: &'static str,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Content hash is not a 64-character lowercase hex digest.
    #[error("malformed content hash: {0}")]
    MalformedHash(String),
}

// ============================================================================
// SECTION: Content Hash
// ============================================================================

/// Lowercase 64-character hex content digest.
///
/// # Invariants
/// - Exactly [`CONTENT_HASH_LEN`] lowercase hex characters; construction
///   fails closed on anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Creates a content hash, validating length and character set.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::MalformedHash`] when the value is not a
    /// 64-character lowercase hex string.
    pub fn new(value: impl Into<String>) -> Result<Self, ArtifactError> {
        let value = value.into();
        let well_formed = value.len() == CONTENT_HASH_LEN
            && value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase());
        if well_formed {
            Ok(Self(value))
        } else {
            Err(ArtifactError::MalformedHash(value))
        }
    }

    /// Returns the digest as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ArtifactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> Self {
        value.0
    }
}

/// Computes the SHA-256 content hash of raw bytes.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(CONTENT_HASH_LEN);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    ContentHash(out)
}

// ============================================================================
// SECTION: Artifact Reference
// ============================================================================

/// Reference to step-produced content.
///
/// # Invariants
/// - Exactly one shape is present; the `kind` tag is the discriminator.
/// - Inline content is capped at [`MAX_INLINE_BYTES`], previews at
///   [`MAX_PREVIEW_BYTES`]; enforced by [`ArtifactRef::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactRef {
    /// URI into external blob storage.
    Pointer {
        /// Storage URI for the artifact bytes.
        uri: String,
        /// Content type of the stored bytes.
        content_type: String,
        /// Stored payload size in bytes.
        size_bytes: u64,
        /// Content digest of the stored bytes.
        content_hash: ContentHash,
        /// Optional short preview of the content.
        preview: Option<String>,
    },
    /// Small payload carried inline.
    Inline {
        /// Inline content.
        content: String,
        /// Content type of the inline payload.
        content_type: String,
        /// Optional content digest of the inline payload.
        content_hash: Option<ContentHash>,
    },
}

impl ArtifactRef {
    /// Returns the declared content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self {
            Self::Pointer {
                content_type, ..
            }
            | Self::Inline {
                content_type, ..
            } => content_type,
        }
    }

    /// Returns true for the inline shape.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    /// Validates size caps for the reference.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::TooLarge`] when inline content or a pointer
    /// preview exceeds its cap.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Self::Pointer {
                preview, ..
            } => match preview {
                Some(preview) if preview.len() > MAX_PREVIEW_BYTES => Err(ArtifactError::TooLarge {
                    what: "preview",
                    max_bytes: MAX_PREVIEW_BYTES,
                    actual_bytes: preview.len(),
                }),
                _ => Ok(()),
            },
            Self::Inline {
                content, ..
            } => {
                if content.len() > MAX_INLINE_BYTES {
                    return Err(ArtifactError::TooLarge {
                        what: "content",
                        max_bytes: MAX_INLINE_BYTES,
                        actual_bytes: content.len(),
                    });
                }
                Ok(())
            }
        }
    }

    /// Returns true when an inline payload matches its declared digest.
    ///
    /// Pointer shapes and inline shapes without a digest return `true`;
    /// digest verification for pointed content is a storage concern.
    #[must_use]
    pub fn inline_hash_matches(&self) -> bool {
        match self {
            Self::Pointer { .. }
            | Self::Inline {
                content_hash: None, ..
            } => true,
            Self::Inline {
                content,
                content_hash: Some(declared),
                ..
            } => hash_bytes(content.as_bytes()) == *declared,
        }
    }
}
