// Licensed under the Apache-2.0 license

use ec_image_layout::FieldError;
use thiserror::Error;

/// Failures that abort a package build.
#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("manifest field {field}: {reason}")]
    Manifest { field: &'static str, reason: String },

    #[error("source image too short: need {need} bytes, have {have}")]
    SourceTooShort { need: usize, have: usize },

    #[error("{name} spans {start:#x}..{end:#x}, outside the {len}-byte source image")]
    SegmentBounds {
        name: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("assembled {actual} bytes, layout expects {expected}")]
    PackageLength { expected: usize, actual: usize },

    #[error("{name} is {actual} bytes, must be {expected}")]
    RecordLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("key reference {0}: no signing backend configured")]
    KeyReference(String),

    #[error("digest is {actual} bytes, expected {expected}")]
    DigestLength { expected: usize, actual: usize },

    #[error("unsupported digest width {0}")]
    DigestWidth(u16),
}
