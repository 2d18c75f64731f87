//! # Error Handling
//!
//! Error types for listener generation using `thiserror`.
//!
//! Every failure carries the identity of the proxy or destination it was raised
//! for, so the reconciliation loop can attribute it without re-deriving context.

/// Custom result type for meshline operations
pub type Result<T> = std::result::Result<T, Error>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for listener generation
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Encoding a typed payload into its opaque bytes failed
    #[error("Failed to serialize {resource} for {target}")]
    Serialization {
        resource: String,
        target: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The endpoint resolver could not answer for a destination
    #[error("Failed to resolve endpoints for service {service}")]
    Resolution {
        service: String,
        #[source]
        source: BoxedSource,
    },

    /// Certificate material could not be named for a proxy identity
    #[error("Certificate error for {identity}: {message}")]
    Certificate { identity: String, message: String },

    /// Topology snapshot errors (unknown services, malformed files)
    #[error("Topology error: {message}")]
    Topology { message: String },

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(message: S, source: BoxedSource) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a serialization error for a payload built for `target`
    pub fn serialization<R: Into<String>, T: Into<String>>(resource: R, target: T) -> Self {
        Self::Serialization { resource: resource.into(), target: target.into(), source: None }
    }

    /// Create a serialization error carrying the encoder failure
    pub fn serialization_with_source<R: Into<String>, T: Into<String>>(
        resource: R,
        target: T,
        source: BoxedSource,
    ) -> Self {
        Self::Serialization { resource: resource.into(), target: target.into(), source: Some(source) }
    }

    /// Wrap a resolver failure with the destination it was raised for
    pub fn resolution<S, E>(service: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxedSource>,
    {
        Self::Resolution { service: service.into(), source: source.into() }
    }

    /// Create a certificate error for a proxy identity
    pub fn certificate<I: Into<String>, S: Into<String>>(identity: I, message: S) -> Self {
        Self::Certificate { identity: identity.into(), message: message.into() }
    }

    /// Create a topology error
    pub fn topology<S: Into<String>>(message: S) -> Self {
        Self::Topology { message: message.into() }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(source: std::io::Error, context: S) -> Self {
        Self::Io { source, context: context.into() }
    }

    /// Identity of the proxy or destination the error is attributed to, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            Error::Serialization { target, .. } => Some(target),
            Error::Resolution { service, .. } => Some(service),
            Error::Certificate { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::topology(format!("Invalid YAML: {}", error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::topology(format!("Invalid JSON: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::config("Test configuration error");
        assert!(matches!(error, Error::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_validation_error() {
        let error = Error::validation_field("ALPN list cannot be empty", "in_mesh_alpn");
        if let Error::Validation { field, .. } = error {
            assert_eq!(field, Some("in_mesh_alpn".to_string()));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_resolution_error_keeps_service_and_source() {
        let error = Error::resolution("default/bookstore", Error::topology("backend unavailable"));
        assert_eq!(error.target(), Some("default/bookstore"));
        assert_eq!(error.to_string(), "Failed to resolve endpoints for service default/bookstore");

        let source = std::error::Error::source(&error).expect("source attached");
        assert_eq!(source.to_string(), "Topology error: backend unavailable");
    }

    #[test]
    fn test_serialization_error_target() {
        let error = Error::serialization("DownstreamTlsContext", "default/bookstore");
        assert_eq!(error.target(), Some("default/bookstore"));
        assert!(error.to_string().contains("DownstreamTlsContext"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io { .. }));
        assert_eq!(error.target(), None);

        let yaml_error = serde_yaml::from_str::<Vec<String>>("{ not: a list").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(matches!(error, Error::Topology { .. }));
    }
}
