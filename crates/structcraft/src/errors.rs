//! Error type shared by every structure, field and bit-structure operation.

use thiserror::Error;

/// Errors produced while building, querying or serializing a structure.
///
/// Every failure is raised where it is detected and handed straight back to the
/// caller. Nothing in this crate catches or retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A field with this name is already attached to the structure.
    #[error("A field already exists on Struct {structure} with name {name}")]
    DuplicateField { structure: String, name: String },

    /// Field name does not match `[A-Za-z0-9_-]+`.
    #[error(
        "Name \"{0}\" is not valid. Names can be made of letters, numbers, underscores, and dashes"
    )]
    InvalidName(String),

    /// Path is malformed, or one of its non-final segments is not a struct.
    #[error("Path \"{path}\" is not valid: {reason}")]
    InvalidPath { path: String, reason: String },

    /// No field with this name exists on the structure.
    #[error("No field with name {name} exists on Struct {structure}")]
    FieldNotFound { structure: String, name: String },

    /// A pointer was aimed at something other than a struct.
    #[error("Reference target must be a Struct, got {0}")]
    InvalidReferenceTarget(&'static str),

    /// Value does not fit the declared width and signedness.
    #[error("value {value} must be an integer between {min} and {max}")]
    OutOfRange { value: i128, min: i128, max: i128 },

    /// Multi-bit member width outside `1..=64`.
    #[error("Bit width must be in the range 1..=64, got {0}")]
    InvalidBitWidth(usize),

    /// The target of a pointer or size-of field has been dropped.
    #[error("Referenced {0} no longer exists")]
    DanglingReference(&'static str),

    /// Attaching this struct would make it contain itself.
    #[error("Struct {name} cannot be attached to Struct {structure}: it contains Struct {structure}")]
    CyclicStructure { structure: String, name: String },

    /// Typed lookup found a field of a different kind.
    #[error("Field {name} is a {found}, not a {expected}")]
    UnexpectedFieldKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
