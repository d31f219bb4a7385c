//! Session token signer.
//!
//! Owns the process-wide HS256 key and turns session requests into compact
//! signed tokens and back. The key is published atomically on `start()` and
//! withdrawn on `stop()`; each operation works on the snapshot it loaded when
//! it began.

use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, SECRET_KEY_PROPERTY};
use crate::error::{AuthenticationError, SessionTokenError, Source};
use crate::id::{IdGenerator, UuidGenerator};
use crate::jwt::claims::{ClaimMap, DecodedClaims, SessionRequest, EXP, IAT, JTI, SUB};
use crate::jwt::key::SigningKey;
use crate::metrics;
use arc_swap::ArcSwapOption;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

const SIGNATURE_ALGORITHM: Algorithm = Algorithm::HS256;

/// How the active key was obtained on `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Fresh random key, valid only for this process
    Generated,
    /// Decoded from the configured secret property
    Restored,
}

impl KeyOrigin {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Restored => "restored",
        }
    }
}

/// Encodes, decodes and refreshes HS256 session tokens.
pub struct TokenSigner {
    settings: Arc<dyn Settings>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    key: ArcSwapOption<SigningKey>,
}

impl TokenSigner {
    /// Create a stopped signer.
    #[must_use]
    pub fn new(
        settings: Arc<dyn Settings>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            settings,
            clock,
            ids,
            key: ArcSwapOption::empty(),
        }
    }

    /// Create a stopped signer using the wall clock and UUID token ids.
    #[must_use]
    pub fn with_settings(settings: Arc<dyn Settings>) -> Self {
        Self::new(settings, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    /// Load or generate the signing key and publish it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSigningKey` if the configured secret is not valid base64.
    /// The signer is left in its previous state.
    pub fn start(&self) -> Result<KeyOrigin, SessionTokenError> {
        let configured = self.settings.get_string(SECRET_KEY_PROPERTY).map(Zeroizing::new);
        let (key, origin) = match configured {
            Some(encoded) => (SigningKey::from_base64(&encoded)?, KeyOrigin::Restored),
            None => (SigningKey::generate(), KeyOrigin::Generated),
        };
        let key_len = key.len();

        if self.key.swap(Some(Arc::new(key))).is_some() {
            warn!("Signing key replaced while signer was running");
        }

        metrics::record_signer_start(origin.as_str());
        info!(origin = origin.as_str(), key_len, "Session token signer started");
        Ok(origin)
    }

    /// Discard the signing key.
    pub fn stop(&self) {
        if self.key.swap(None).is_some() {
            info!("Session token signer stopped");
        }
    }

    /// Whether a signing key is currently published.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.key.load().is_some()
    }

    /// Snapshot of the active key, for diagnostics.
    #[must_use]
    pub fn signing_key(&self) -> Option<Arc<SigningKey>> {
        self.key.load_full()
    }

    /// Issue a new token for the session.
    ///
    /// # Errors
    ///
    /// Returns `NotStarted` if the signer has no key, or `Encoding` if the
    /// claims cannot be serialized.
    pub fn encode(&self, session: &SessionRequest) -> Result<String, SessionTokenError> {
        let key = self.active_key()?;
        let now = self.clock.now_seconds();

        let mut claims = ClaimMap::new();
        claims.insert(JTI.to_string(), Value::from(self.ids.new_id()));
        claims.insert(SUB.to_string(), Value::from(session.user_login()));
        claims.insert(IAT.to_string(), Value::from(now));
        claims.insert(
            EXP.to_string(),
            Value::from(now.saturating_add(session.expiration_seconds())),
        );
        for (name, value) in session.properties() {
            claims.insert(name.clone(), value.clone());
        }

        let token = sign(&claims, &key)?;
        metrics::record_token_issued("encode");
        debug!(subject = session.user_login(), "Session token issued");
        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// `Ok(None)` means the token is expired or its signature does not match
    /// the active key: the caller is simply not authenticated.
    ///
    /// # Errors
    ///
    /// Returns `NotStarted` if the signer has no key, and `Authentication` if
    /// the token is malformed, uses another algorithm, or is correctly signed
    /// but lacks `jti`, `sub`, `exp` or `iat`.
    pub fn decode(&self, token: &str) -> Result<Option<DecodedClaims>, SessionTokenError> {
        let key = self.active_key()?;

        let decoded = jsonwebtoken::decode::<ClaimMap>(token, &key.decoding_key(), &validation());
        let payload = match decoded {
            Ok(data) => data.claims,
            Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => {
                metrics::record_token_decoded("invalid_signature");
                debug!("Session token signature mismatch");
                return Ok(None);
            }
            Err(e) => return Err(rejected(AuthenticationError::new(Source::Token, e.to_string()))),
        };

        if let Some(exp) = payload.get(EXP).and_then(Value::as_i64) {
            if self.clock.now_seconds() > exp {
                metrics::record_token_decoded("expired");
                debug!(exp, "Session token expired");
                return Ok(None);
            }
        }

        let claims = DecodedClaims::from_payload(payload).map_err(rejected)?;
        metrics::record_token_decoded("valid");
        Ok(Some(claims))
    }

    /// Re-sign already decoded claims with a new expiration.
    ///
    /// Every claim is carried over unchanged, `iat` included; only `exp` is
    /// recomputed from the current time. The claims are not re-verified.
    ///
    /// # Errors
    ///
    /// Returns `NotStarted` if the signer has no key, or `Encoding` if the
    /// claims cannot be serialized.
    pub fn refresh(
        &self,
        claims: &DecodedClaims,
        expiration_seconds: i64,
    ) -> Result<String, SessionTokenError> {
        let key = self.active_key()?;
        let now = self.clock.now_seconds();

        let mut refreshed = claims.to_claim_map();
        refreshed.insert(EXP.to_string(), Value::from(now.saturating_add(expiration_seconds)));

        let token = sign(&refreshed, &key)?;
        metrics::record_token_issued("refresh");
        debug!(subject = claims.subject(), token_id = claims.token_id(), "Session token refreshed");
        Ok(token)
    }

    fn active_key(&self) -> Result<Arc<SigningKey>, SessionTokenError> {
        self.key.load_full().ok_or(SessionTokenError::NotStarted)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

fn sign(claims: &ClaimMap, key: &SigningKey) -> Result<String, SessionTokenError> {
    jsonwebtoken::encode(&Header::new(SIGNATURE_ALGORITHM), claims, &key.encoding_key())
        .map_err(|e| SessionTokenError::Encoding(e.to_string()))
}

/// Signature and algorithm only; time and required claims are checked by the
/// signer against its own clock.
fn validation() -> Validation {
    let mut validation = Validation::new(SIGNATURE_ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

fn rejected(err: AuthenticationError) -> SessionTokenError {
    metrics::record_token_decoded("malformed");
    warn!(
        source = %err.auth_source(),
        login = err.login().unwrap_or("-"),
        reason = err.message(),
        "Rejected malformed session token"
    );
    SessionTokenError::Authentication(err)
}
