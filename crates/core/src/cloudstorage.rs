//! Cloud storage URL construction
//!
//! Pure functions for building public object URLs and V4 signed URLs for
//! Google Cloud Storage. Signing uses an HMAC key (GOOG4-HMAC-SHA256), so a
//! URL can be computed without any network call.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Public host for Google Cloud Storage objects, e.g.
/// https://storage.googleapis.com/example-test/test.jpg
pub const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Host header signed into V4 URLs
pub const SIGNING_HOST: &str = "storage.googleapis.com";

/// Longest lifetime GCS accepts for a V4 signed URL (7 days)
pub const MAX_EXPIRES_SECS: i64 = 604_800;

const ALGORITHM: &str = "GOOG4-HMAC-SHA256";
const REGION: &str = "auto";
const SERVICE: &str = "storage";
const REQUEST_TYPE: &str = "goog4_request";

/// Error type for URL signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// Expiry is not after the signing time
    ExpiresInPast,
    /// Expiry is more than [`MAX_EXPIRES_SECS`] after the signing time
    ExpiresTooFar(i64),
    /// The HMAC key could not be used
    InvalidKey(String),
}

impl std::fmt::Display for SigningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningError::ExpiresInPast => write!(f, "expire time must be in the future"),
            SigningError::ExpiresTooFar(secs) => write!(
                f,
                "expire time can't be more than {} seconds in the future, got {}",
                MAX_EXPIRES_SECS, secs
            ),
            SigningError::InvalidKey(msg) => write!(f, "Invalid HMAC key: {}", msg),
        }
    }
}

impl std::error::Error for SigningError {}

/// HMAC key used to sign URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacKey {
    pub access_id: String,
    pub secret: String,
}

/// Percent-encode an object name, keeping `/` separators.
pub fn encode_object(object: &str) -> String {
    object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the public URL of `object` in `bucket`.
pub fn public_url(bucket: &str, object: &str) -> String {
    format!("{}/{}/{}", PUBLIC_HOST, bucket, object)
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Build a V4 signed GET URL for `object`
///
/// # Arguments
/// * `key` - HMAC key of the signing service account
/// * `bucket` - Bucket holding the object
/// * `object` - Object name
/// * `expires` - Moment the URL stops working
/// * `now` - Signing time
///
/// # Returns
/// The signed URL, valid from `now` until `expires`
pub fn sign_url(
    key: &HmacKey,
    bucket: &str,
    object: &str,
    expires: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<String, SigningError> {
    let lifetime = (expires - now).num_seconds();
    if lifetime <= 0 {
        return Err(SigningError::ExpiresInPast);
    }
    if lifetime > MAX_EXPIRES_SECS {
        return Err(SigningError::ExpiresTooFar(lifetime));
    }

    let date = now.format("%Y%m%d").to_string();
    let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let scope = format!("{date}/{REGION}/{SERVICE}/{REQUEST_TYPE}");
    let credential = format!("{}/{}", key.access_id, scope);

    // Already in lexical order
    let params = [
        ("X-Goog-Algorithm", ALGORITHM.to_string()),
        ("X-Goog-Credential", credential),
        ("X-Goog-Date", timestamp.clone()),
        ("X-Goog-Expires", lifetime.to_string()),
        ("X-Goog-SignedHeaders", "host".to_string()),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let path = format!("/{}/{}", bucket, encode_object(object));
    let canonical_request =
        format!("GET\n{path}\n{query}\nhost:{SIGNING_HOST}\n\nhost\nUNSIGNED-PAYLOAD");

    let string_to_sign = format!(
        "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let signing_key = [REGION, SERVICE, REQUEST_TYPE].iter().try_fold(
        hmac_sha256(format!("GOOG4{}", key.secret).as_bytes(), date.as_bytes())?,
        |acc, part| hmac_sha256(&acc, part.as_bytes()),
    )?;
    let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

    Ok(format!(
        "https://{SIGNING_HOST}{path}?{query}&X-Goog-Signature={signature}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn key() -> HmacKey {
        HmacKey {
            access_id: "GOOG1EXAMPLE".to_string(),
            secret: "bGoa+V7g/yqDXvKRqq+JTFn4uQZbPiQJo4pf9RzJ".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("example-test", "test.jpg"),
            "https://storage.googleapis.com/example-test/test.jpg"
        );
    }

    #[test]
    fn test_encode_object_keeps_separators() {
        assert_eq!(encode_object("a dir/b+c.jpg"), "a%20dir/b%2Bc.jpg");
    }

    #[test]
    fn test_sign_url_query() {
        let url = sign_url(&key(), "bucket", "dir/file.jpg", now() + Duration::hours(1), now())
            .unwrap();

        assert!(url.starts_with("https://storage.googleapis.com/bucket/dir/file.jpg?"));
        assert!(url.contains("X-Goog-Algorithm=GOOG4-HMAC-SHA256"));
        assert!(url.contains(
            "X-Goog-Credential=GOOG1EXAMPLE%2F20240301%2Fauto%2Fstorage%2Fgoog4_request"
        ));
        assert!(url.contains("X-Goog-Date=20240301T123000Z"));
        assert!(url.contains("X-Goog-Expires=3600"));
        assert!(url.contains("X-Goog-SignedHeaders=host"));

        let signature = url.rsplit("X-Goog-Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_url_deterministic() {
        let expires = now() + Duration::minutes(15);
        let a = sign_url(&key(), "bucket", "file.jpg", expires, now()).unwrap();
        let b = sign_url(&key(), "bucket", "file.jpg", expires, now()).unwrap();
        assert_eq!(a, b);

        let other = HmacKey {
            secret: "another-secret".to_string(),
            ..key()
        };
        let c = sign_url(&other, "bucket", "file.jpg", expires, now()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_sign_url_expires_in_past() {
        let err = sign_url(&key(), "bucket", "file.jpg", now(), now()).unwrap_err();
        assert_eq!(err, SigningError::ExpiresInPast);
    }

    #[test]
    fn test_sign_url_expires_too_far() {
        let err = sign_url(
            &key(),
            "bucket",
            "file.jpg",
            now() + Duration::days(8),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, SigningError::ExpiresTooFar(_)));
    }

    #[test]
    fn test_sign_url_max_lifetime() {
        assert!(sign_url(
            &key(),
            "bucket",
            "file.jpg",
            now() + Duration::days(7),
            now()
        )
        .is_ok());
    }
}
