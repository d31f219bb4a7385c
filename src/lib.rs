//! Session Token library.
//!
//! Provides HS256 session token encoding, validation and renewal on top of a
//! single process-wide signing key with an explicit start/stop lifecycle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod jwt;
pub mod metrics;
pub mod observability;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, EnvSettings, MapSettings, Settings};
pub use error::{AuthenticationError, ErrorCode, SessionTokenError, Source};
pub use id::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use jwt::{DecodedClaims, KeyOrigin, SessionRequest, SigningKey, TokenSigner};
