//! Commerce error types.

use thiserror::Error;

/// Errors that can occur talking to the storefront's collaborators.
///
/// Cart and checkout failures have their own narrower enums
/// ([`CartError`](crate::cart::CartError),
/// [`CheckoutError`](crate::checkout::CheckoutError)); this one covers the
/// catalog and order services, storage and configuration.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The remote API rejected or failed the request. `message` is user-facing.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Cache error.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}

impl CommerceError {
    /// HTTP status of an API failure, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            CommerceError::Api { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<lucy_data::FetchError> for CommerceError {
    fn from(e: lucy_data::FetchError) -> Self {
        CommerceError::Api {
            status: e.status(),
            message: e.to_string(),
        }
    }
}

impl From<lucy_cache::CacheError> for CommerceError {
    fn from(e: lucy_cache::CacheError) -> Self {
        CommerceError::CacheError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lucy_data::FetchError;

    #[test]
    fn test_api_error_keeps_service_message() {
        let err: CommerceError = FetchError::HttpError {
            status: 422,
            message: "Insufficient stock for Rose Oud".into(),
        }
        .into();

        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "Insufficient stock for Rose Oud");
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err: CommerceError = FetchError::Timeout.into();
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "Request timed out");
    }
}
