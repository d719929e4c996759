//! Signed, time-limited admin capabilities
//!
//! An admin link carries `swiftinfo_sig` and `swiftinfo_expires` query
//! parameters. The signature is an HMAC-SHA256 over
//! `"{METHOD}\n{expires}\n{path}"` keyed by the deployment's admin key, so it
//! binds method, path and expiry without any server-side session.

use std::collections::HashMap;
use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Query parameter carrying the hex signature
pub const SIG_PARAM: &str = "swiftinfo_sig";

/// Query parameter carrying the Unix expiry timestamp
pub const EXPIRES_PARAM: &str = "swiftinfo_expires";

/// Outcome of validating an admin request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    Authorized,
    Rejected(RejectReason),
}

/// Why an admin request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No admin key is configured
    AdminDisabled,
    /// Missing, malformed, expired or forged capability
    Unauthorized,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminDisabled => write!(f, "admin disabled"),
            Self::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// Keyed signer for admin capabilities
///
/// Only constructible from a non-empty secret.
#[derive(Clone)]
pub struct AdminKey {
    mac: HmacSha256,
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminKey([REDACTED])")
    }
}

impl AdminKey {
    /// Create a signer, or `None` when the secret is empty
    #[must_use]
    pub fn new(secret: &str) -> Option<Self> {
        if secret.is_empty() {
            return None;
        }
        HmacSha256::new_from_slice(secret.as_bytes())
            .ok()
            .map(|mac| Self { mac })
    }

    /// Hex signature for `method` on `path` until `expires`
    #[must_use]
    pub fn sign(&self, method: &str, path: &str, expires: i64) -> String {
        hex::encode(self.keyed(method, path, expires).finalize().into_bytes())
    }

    /// Timing-safe check of a hex signature
    #[must_use]
    pub fn verify(&self, method: &str, path: &str, expires: i64, signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        self.keyed(method, path, expires)
            .verify_slice(&provided)
            .is_ok()
    }

    fn keyed(&self, method: &str, path: &str, expires: i64) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(format!("{method}\n{expires}\n{path}").as_bytes());
        mac
    }
}

/// Methods whose signatures authorize a request made with `method`
///
/// HEAD reveals nothing GET does not, so a GET capability also covers HEAD.
fn accepted_methods(method: &str) -> &'static [&'static str] {
    match method {
        "HEAD" => &["HEAD", "GET"],
        "GET" => &["GET"],
        _ => &[],
    }
}

/// Validates signed admin requests against the configured admin key
#[derive(Debug, Clone)]
pub struct CapabilityValidator {
    key: Option<AdminKey>,
}

impl CapabilityValidator {
    /// Create a validator; a missing or empty secret disables admin access
    #[must_use]
    pub fn new(admin_key: Option<&SecretString>) -> Self {
        let key = admin_key.and_then(|k| AdminKey::new(k.expose_secret()));
        Self { key }
    }

    /// Whether admin access can ever be granted
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Whether the query carries any admin capability parameter
    #[must_use]
    pub fn is_admin_request(params: &HashMap<String, String>) -> bool {
        params.contains_key(SIG_PARAM) || params.contains_key(EXPIRES_PARAM)
    }

    /// Validate a request against the current time
    #[must_use]
    pub fn validate(
        &self,
        method: &str,
        path: &str,
        params: &HashMap<String, String>,
    ) -> Authorization {
        self.validate_at(method, path, params, chrono::Utc::now().timestamp())
    }

    /// Validate a request as of the Unix time `now`
    #[must_use]
    pub fn validate_at(
        &self,
        method: &str,
        path: &str,
        params: &HashMap<String, String>,
        now: i64,
    ) -> Authorization {
        let Some(key) = &self.key else {
            return Authorization::Rejected(RejectReason::AdminDisabled);
        };

        let (Some(signature), Some(expires)) = (params.get(SIG_PARAM), params.get(EXPIRES_PARAM))
        else {
            return Authorization::Rejected(RejectReason::Unauthorized);
        };

        let Ok(expires) = expires.trim().parse::<i64>() else {
            return Authorization::Rejected(RejectReason::Unauthorized);
        };

        if expires < now {
            return Authorization::Rejected(RejectReason::Unauthorized);
        }

        let valid = accepted_methods(method)
            .iter()
            .any(|m| key.verify(m, path, expires, signature));

        if valid {
            Authorization::Authorized
        } else {
            Authorization::Rejected(RejectReason::Unauthorized)
        }
    }
}

/// Build the query string for a signed admin link
#[must_use]
pub fn signed_query(key: &AdminKey, method: &str, path: &str, expires: i64) -> String {
    let signature = key.sign(method, path, expires);
    format!("{SIG_PARAM}={signature}&{EXPIRES_PARAM}={expires}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "secret-admin-key";
    const NOW: i64 = 1_700_000_000;

    fn validator(secret: &str) -> CapabilityValidator {
        CapabilityValidator::new(Some(&SecretString::from(secret.to_string())))
    }

    fn params(sig: &str, expires: &str) -> HashMap<String, String> {
        HashMap::from([
            (SIG_PARAM.to_string(), sig.to_string()),
            (EXPIRES_PARAM.to_string(), expires.to_string()),
        ])
    }

    fn signed(method: &str, path: &str, expires: i64, secret: &str) -> HashMap<String, String> {
        let key = AdminKey::new(secret).unwrap();
        params(&key.sign(method, path, expires), &expires.to_string())
    }

    #[test]
    fn valid_signature_is_authorized() {
        let expires = NOW + 86_400;
        let p = signed("GET", "/info", expires, SECRET);
        assert_eq!(
            validator(SECRET).validate_at("GET", "/info", &p, NOW),
            Authorization::Authorized
        );
    }

    #[test]
    fn empty_secret_never_authorizes() {
        assert!(AdminKey::new("").is_none());

        // A signature computed with the empty key is still rejected
        let mut mac = HmacSha256::new_from_slice(b"").unwrap();
        mac.update(format!("GET\n{}\n/info", NOW + 10).as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        let p = params(&sig, &(NOW + 10).to_string());

        assert_eq!(
            validator("").validate_at("GET", "/info", &p, NOW),
            Authorization::Rejected(RejectReason::AdminDisabled)
        );
        assert_eq!(
            CapabilityValidator::new(None).validate_at("GET", "/info", &p, NOW),
            Authorization::Rejected(RejectReason::AdminDisabled)
        );
    }

    #[test]
    fn missing_parameters_are_unauthorized() {
        let v = validator(SECRET);
        let only_sig = HashMap::from([(SIG_PARAM.to_string(), "abcd".to_string())]);
        let only_expires = HashMap::from([(EXPIRES_PARAM.to_string(), NOW.to_string())]);

        for p in [HashMap::new(), only_sig, only_expires] {
            assert_eq!(
                v.validate_at("GET", "/info", &p, NOW),
                Authorization::Rejected(RejectReason::Unauthorized)
            );
        }
    }

    #[test]
    fn non_integer_expiry_is_unauthorized() {
        let key = AdminKey::new(SECRET).unwrap();
        let p = params(&key.sign("GET", "/info", 0), "abc");
        assert_eq!(
            validator(SECRET).validate_at("GET", "/info", &p, NOW),
            Authorization::Rejected(RejectReason::Unauthorized)
        );
    }

    #[test]
    fn expiry_boundary() {
        let v = validator(SECRET);

        let past = signed("GET", "/info", NOW - 1, SECRET);
        assert_eq!(
            v.validate_at("GET", "/info", &past, NOW),
            Authorization::Rejected(RejectReason::Unauthorized)
        );

        let exact = signed("GET", "/info", NOW, SECRET);
        assert_eq!(
            v.validate_at("GET", "/info", &exact, NOW),
            Authorization::Authorized
        );

        let day = signed("GET", "/info", NOW + 86_400, SECRET);
        assert_eq!(
            v.validate_at("GET", "/info", &day, NOW),
            Authorization::Authorized
        );
    }

    #[test]
    fn tampering_invalidates_signature() {
        let v = validator(SECRET);
        let expires = NOW + 100;

        let wrong_path = signed("GET", "/foo", expires, SECRET);
        assert!(matches!(
            v.validate_at("GET", "/info", &wrong_path, NOW),
            Authorization::Rejected(_)
        ));

        let wrong_key = signed("GET", "/info", expires, "invalid-admin-key");
        assert!(matches!(
            v.validate_at("GET", "/info", &wrong_key, NOW),
            Authorization::Rejected(_)
        ));

        // Expiry bumped by one after signing
        let key = AdminKey::new(SECRET).unwrap();
        let bumped = params(&key.sign("GET", "/info", expires), &(expires + 1).to_string());
        assert!(matches!(
            v.validate_at("GET", "/info", &bumped, NOW),
            Authorization::Rejected(_)
        ));
    }

    #[test]
    fn head_accepts_get_signature_but_not_vice_versa() {
        let v = validator(SECRET);
        let expires = NOW + 100;

        let get_sig = signed("GET", "/info", expires, SECRET);
        assert_eq!(
            v.validate_at("HEAD", "/info", &get_sig, NOW),
            Authorization::Authorized
        );

        let head_sig = signed("HEAD", "/info", expires, SECRET);
        assert_eq!(
            v.validate_at("HEAD", "/info", &head_sig, NOW),
            Authorization::Authorized
        );
        assert_eq!(
            v.validate_at("GET", "/info", &head_sig, NOW),
            Authorization::Rejected(RejectReason::Unauthorized)
        );
    }

    #[test]
    fn other_methods_are_never_authorized() {
        let p = signed("POST", "/info", NOW + 100, SECRET);
        assert_eq!(
            validator(SECRET).validate_at("POST", "/info", &p, NOW),
            Authorization::Rejected(RejectReason::Unauthorized)
        );
    }

    #[test]
    fn non_hex_signature_is_unauthorized() {
        let p = params("not-hex!", &(NOW + 100).to_string());
        assert_eq!(
            validator(SECRET).validate_at("GET", "/info", &p, NOW),
            Authorization::Rejected(RejectReason::Unauthorized)
        );
    }

    #[test]
    fn admin_request_detection() {
        assert!(!CapabilityValidator::is_admin_request(&HashMap::new()));
        let only_expires = HashMap::from([(EXPIRES_PARAM.to_string(), String::new())]);
        assert!(CapabilityValidator::is_admin_request(&only_expires));
    }

    #[test]
    fn signed_query_round_trips_through_validator() {
        let key = AdminKey::new(SECRET).unwrap();
        let query = signed_query(&key, "GET", "/info", NOW + 60);
        let p: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        assert_eq!(
            validator(SECRET).validate_at("GET", "/info", &p, NOW),
            Authorization::Authorized
        );
    }

    #[test]
    fn debug_output_hides_key() {
        let key = AdminKey::new(SECRET).unwrap();
        assert!(!format!("{key:?}").contains(SECRET));
    }
}
