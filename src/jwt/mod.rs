//! HS256 session tokens: key material, claim sets and the signer service.

pub mod claims;
pub mod key;
pub mod signer;

pub use claims::{ClaimMap, DecodedClaims, SessionRequest};
pub use key::SigningKey;
pub use signer::{KeyOrigin, TokenSigner};
