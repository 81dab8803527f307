//! Error types for the compose-matrix domain

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invocation record is missing field: {0}")]
    MissingRecordField(String),

    #[error("Invocation record field {field} is invalid: {reason}")]
    InvalidRecordField { field: String, reason: String },

    #[error("Metadata view error: {0}")]
    MetadataView(#[from] MetadataViewError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building or reading a metadata view proxy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataViewError {
    /// The shape has members other than property getters. Asking for a proxy
    /// of such a shape is a caller bug: check `is_metadata_view_supported` first.
    #[error("metadata view {view} is not supported: {reason}")]
    UnsupportedShape { view: String, reason: String },

    #[error("metadata for view {view} has no entry for property {property}")]
    MissingMetadataKey { view: String, property: String },

    #[error("metadata view {view} declares no property {property}")]
    UnknownProperty { view: String, property: String },

    #[error("property {property} of view {view} holds an empty sequence")]
    EmptySequence { view: String, property: String },

    #[error("property {property} of view {view} has unexpected type: {reason}")]
    TypeMismatch {
        view: String,
        property: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_names_property() {
        let err = MetadataViewError::MissingMetadataKey {
            view: "IPartMetadata".to_string(),
            property: "Name".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("IPartMetadata"));
        assert!(msg.contains("Name"));
    }

    #[test]
    fn test_missing_record_field_display() {
        let err = DomainError::MissingRecordField("parts".to_string());
        assert!(err.to_string().contains("parts"));
    }

    #[test]
    fn test_metadata_view_error_converts() {
        let err: DomainError = MetadataViewError::UnknownProperty {
            view: "IView".to_string(),
            property: "Other".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Metadata view error"));
    }
}
