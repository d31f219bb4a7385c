//! Error types for the session token signer.
//!
//! Expired tokens and tokens with a bad signature are not errors: decoding
//! reports them as `Ok(None)`. Everything here is either a precondition
//! violation or a token that is structurally wrong.

use std::fmt;
use thiserror::Error;

/// Subsystem that rejected an authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Session token validation
    Token,
}

impl Source {
    /// Get the classifier string for this source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token that could be read but must not be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthenticationError {
    auth_source: Source,
    login: Option<String>,
    message: String,
}

impl AuthenticationError {
    /// Create a new authentication error.
    #[must_use]
    pub fn new(source: Source, message: impl Into<String>) -> Self {
        Self {
            auth_source: source,
            login: None,
            message: message.into(),
        }
    }

    /// Attach the login carried by the rejected token, if any.
    #[must_use]
    pub fn with_login(mut self, login: Option<String>) -> Self {
        self.login = login;
        self
    }

    /// Subsystem that produced the error.
    #[must_use]
    pub const fn auth_source(&self) -> Source {
        self.auth_source
    }

    /// Login extracted from the token payload.
    #[must_use]
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Human-readable cause.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised by the session token signer.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SessionTokenError {
    /// An operation was invoked before `start()` or after `stop()`
    #[error("TokenSigner not started")]
    NotStarted,

    /// The configured signing key is not valid base64
    #[error("Invalid signing key: {0}")]
    InvalidSigningKey(#[from] base64::DecodeError),

    /// The session request violates an input constraint
    #[error("Invalid session request: {0}")]
    InvalidRequest(String),

    /// Token could not be serialized or signed
    #[error("JWT encoding error: {0}")]
    Encoding(String),

    /// Token is malformed or lacks a mandatory claim
    #[error("Authentication failed ({src}): {0}", src = .0.auth_source())]
    Authentication(#[from] AuthenticationError),
}

impl SessionTokenError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotStarted => ErrorCode::NotStarted,
            Self::InvalidSigningKey(_) => ErrorCode::InvalidSigningKey,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Encoding(_) => ErrorCode::Encoding,
            Self::Authentication(_) => ErrorCode::TokenMalformed,
        }
    }

    /// Whether the error is a precondition violation that should abort the caller.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NotStarted | Self::InvalidSigningKey(_))
    }
}

/// Stable error codes for logs and API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Signer used while stopped
    NotStarted,
    /// Configured key could not be decoded
    InvalidSigningKey,
    /// Bad session request
    InvalidRequest,
    /// Token serialization failure
    Encoding,
    /// Token structurally invalid
    TokenMalformed,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "SIGNER_NOT_STARTED",
            Self::InvalidSigningKey => "SIGNER_INVALID_KEY",
            Self::InvalidRequest => "SESSION_REQUEST_INVALID",
            Self::Encoding => "AUTH_TOKEN_ENCODING",
            Self::TokenMalformed => "AUTH_TOKEN_MALFORMED",
        }
    }
}
