//! Session claim sets: what callers ask to be signed, and what a valid token
//! hands back.

use crate::error::{AuthenticationError, SessionTokenError, Source};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Ordered claim name to value mapping, as carried in the token payload.
pub type ClaimMap = serde_json::Map<String, Value>;

/// Token id claim.
pub const JTI: &str = "jti";
/// Subject (user login) claim.
pub const SUB: &str = "sub";
/// Issued-at claim, seconds since the epoch.
pub const IAT: &str = "iat";
/// Expiration claim, seconds since the epoch.
pub const EXP: &str = "exp";

/// Claim names owned by the signer. Callers cannot set them as extra claims.
pub const REGISTERED_CLAIMS: [&str; 4] = [JTI, SUB, IAT, EXP];

/// Request to issue a session token for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    user_login: String,
    expiration_seconds: i64,
    properties: ClaimMap,
}

impl SessionRequest {
    /// Create a request with no extra claims.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the login is empty.
    pub fn new(
        user_login: impl Into<String>,
        expiration_seconds: i64,
    ) -> Result<Self, SessionTokenError> {
        Self::with_properties(user_login, expiration_seconds, ClaimMap::new())
    }

    /// Create a request carrying extra claims.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the login is empty, a claim reuses a
    /// registered name, or a claim value is not a string, number or boolean.
    pub fn with_properties(
        user_login: impl Into<String>,
        expiration_seconds: i64,
        properties: ClaimMap,
    ) -> Result<Self, SessionTokenError> {
        let user_login = user_login.into();
        if user_login.is_empty() {
            return Err(SessionTokenError::InvalidRequest(
                "user login cannot be empty".to_string(),
            ));
        }
        for (name, value) in &properties {
            check_property(name, value)?;
        }

        Ok(Self {
            user_login,
            expiration_seconds,
            properties,
        })
    }

    /// Add one extra claim.
    ///
    /// # Errors
    ///
    /// Same constraints as [`SessionRequest::with_properties`].
    pub fn with_claim(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, SessionTokenError> {
        let name = name.into();
        let value = value.into();
        check_property(&name, &value)?;
        self.properties.insert(name, value);
        Ok(self)
    }

    /// User login placed in `sub`.
    #[must_use]
    pub fn user_login(&self) -> &str {
        &self.user_login
    }

    /// Requested lifetime in seconds.
    #[must_use]
    pub const fn expiration_seconds(&self) -> i64 {
        self.expiration_seconds
    }

    /// Extra claims in insertion order.
    #[must_use]
    pub const fn properties(&self) -> &ClaimMap {
        &self.properties
    }
}

fn check_property(name: &str, value: &Value) -> Result<(), SessionTokenError> {
    if REGISTERED_CLAIMS.contains(&name) {
        return Err(SessionTokenError::InvalidRequest(format!(
            "claim '{name}' is reserved"
        )));
    }
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        _ => Err(SessionTokenError::InvalidRequest(format!(
            "claim '{name}' must be a string, number or boolean"
        ))),
    }
}

/// Claims of a token whose signature and expiration have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClaims {
    token_id: String,
    subject: String,
    issued_at: i64,
    expires_at: i64,
    extra: ClaimMap,
}

impl DecodedClaims {
    /// Split a verified payload into registered and extra claims.
    ///
    /// Registered claims are checked in the order `jti`, `sub`, `exp`, `iat`
    /// and the first violation is reported.
    pub(crate) fn from_payload(payload: ClaimMap) -> Result<Self, AuthenticationError> {
        let login = payload.get(SUB).and_then(Value::as_str).map(str::to_owned);
        let reject = |message: String| {
            AuthenticationError::new(Source::Token, message).with_login(login.clone())
        };

        let (mut registered, extra): (ClaimMap, ClaimMap) = payload
            .into_iter()
            .partition(|(name, _)| REGISTERED_CLAIMS.contains(&name.as_str()));

        let token_id = take_string(&mut registered, JTI, "Token id").map_err(reject)?;
        let subject = take_string(&mut registered, SUB, "Token subject").map_err(reject)?;
        let expires_at =
            take_timestamp(&mut registered, EXP, "Token expiration date").map_err(reject)?;
        let issued_at =
            take_timestamp(&mut registered, IAT, "Token creation date").map_err(reject)?;

        Ok(Self {
            token_id,
            subject,
            issued_at,
            expires_at,
            extra,
        })
    }

    /// Token id (`jti`).
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    /// User login (`sub`).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Issued-at (`iat`), seconds since the epoch.
    #[must_use]
    pub const fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Expiration (`exp`), seconds since the epoch.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Expiration as a UTC date-time, if representable.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }

    /// Claims other than the registered ones, in payload order.
    #[must_use]
    pub const fn extra_claims(&self) -> &ClaimMap {
        &self.extra
    }

    /// Look up any claim by name, registered ones included.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            JTI => Some(Value::from(self.token_id.as_str())),
            SUB => Some(Value::from(self.subject.as_str())),
            IAT => Some(Value::from(self.issued_at)),
            EXP => Some(Value::from(self.expires_at)),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// Full claim set, registered claims first.
    #[must_use]
    pub fn to_claim_map(&self) -> ClaimMap {
        let mut map = ClaimMap::new();
        map.insert(JTI.to_string(), Value::from(self.token_id.as_str()));
        map.insert(SUB.to_string(), Value::from(self.subject.as_str()));
        map.insert(IAT.to_string(), Value::from(self.issued_at));
        map.insert(EXP.to_string(), Value::from(self.expires_at));
        for (name, value) in &self.extra {
            map.insert(name.clone(), value.clone());
        }
        map
    }
}

fn take_string(payload: &mut ClaimMap, name: &str, label: &str) -> Result<String, String> {
    match payload.remove(name) {
        None | Some(Value::Null) => Err(format!("{label} hasn't been found")),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("{label} ({name}) is not a string")),
    }
}

fn take_timestamp(payload: &mut ClaimMap, name: &str, label: &str) -> Result<i64, String> {
    match payload.remove(name) {
        None | Some(Value::Null) => Err(format!("{label} hasn't been found")),
        Some(value) => value
            .as_i64()
            .ok_or_else(|| format!("{label} ({name}) is not a numeric timestamp")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> ClaimMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    #[test]
    fn test_request_rejects_empty_login() {
        let result = SessionRequest::new("", 60);
        assert!(matches!(result, Err(SessionTokenError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_rejects_reserved_claims() {
        for name in REGISTERED_CLAIMS {
            let result = SessionRequest::new("alice", 60).unwrap().with_claim(name, "x");
            assert!(matches!(result, Err(SessionTokenError::InvalidRequest(_))), "{name}");
        }
    }

    #[test]
    fn test_request_rejects_structured_values() {
        let base = SessionRequest::new("alice", 60).unwrap();
        assert!(base.clone().with_claim("roles", json!(["a"])).is_err());
        assert!(base.clone().with_claim("nested", json!({"a": 1})).is_err());
        assert!(base.with_claim("nothing", Value::Null).is_err());
    }

    #[test]
    fn test_request_keeps_claim_order() {
        let request = SessionRequest::new("alice", 60)
            .unwrap()
            .with_claim("zeta", 1)
            .unwrap()
            .with_claim("alpha", true)
            .unwrap()
            .with_claim("mid", "m")
            .unwrap();

        let names: Vec<&str> = request.properties().keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_payload_splits_claims() {
        let claims = DecodedClaims::from_payload(payload(json!({
            "jti": "id-1",
            "sub": "alice",
            "iat": 1000,
            "exp": 4600,
            "lastRefreshTime": 1000,
        })))
        .unwrap();

        assert_eq!(claims.token_id(), "id-1");
        assert_eq!(claims.subject(), "alice");
        assert_eq!(claims.issued_at(), 1000);
        assert_eq!(claims.expires_at(), 4600);
        assert_eq!(claims.extra_claims().len(), 1);
        assert_eq!(claims.get("lastRefreshTime"), Some(json!(1000)));
        assert_eq!(claims.get("sub"), Some(json!("alice")));
    }

    #[test]
    fn test_from_payload_missing_subject() {
        let err = DecodedClaims::from_payload(payload(json!({
            "jti": "id-1",
            "iat": 1000,
            "exp": 4600,
        })))
        .unwrap_err();

        assert_eq!(err.auth_source(), Source::Token);
        assert_eq!(err.login(), None);
        assert_eq!(err.message(), "Token subject hasn't been found");
    }

    #[test]
    fn test_from_payload_missing_issued_at_keeps_login() {
        let err = DecodedClaims::from_payload(payload(json!({
            "jti": "id-1",
            "sub": "bob",
            "exp": 4600,
        })))
        .unwrap_err();

        assert_eq!(err.login(), Some("bob"));
        assert_eq!(err.message(), "Token creation date hasn't been found");
    }

    #[test]
    fn test_from_payload_checks_in_order() {
        let err = DecodedClaims::from_payload(ClaimMap::new()).unwrap_err();
        assert_eq!(err.message(), "Token id hasn't been found");

        let err = DecodedClaims::from_payload(payload(json!({
            "jti": "id-1",
            "sub": "bob",
            "exp": "tomorrow",
            "iat": 1,
        })))
        .unwrap_err();
        assert_eq!(err.message(), "Token expiration date (exp) is not a numeric timestamp");
    }

    #[test]
    fn test_to_claim_map_order() {
        let claims = DecodedClaims::from_payload(payload(json!({
            "custom": "c",
            "exp": 20,
            "sub": "alice",
            "iat": 10,
            "jti": "id",
        })))
        .unwrap();

        let names: Vec<String> = claims.to_claim_map().keys().cloned().collect();
        assert_eq!(names, ["jti", "sub", "iat", "exp", "custom"]);
    }
}
