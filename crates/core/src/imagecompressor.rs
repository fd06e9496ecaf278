//! Image compression service responses
//!
//! Response shapes of the supported image compression services and pure
//! functions that map a raw response body to the compressed file URL.

use serde::{Deserialize, Serialize};

/// Error type for compression response parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    /// The body is not the JSON shape the service documents
    Malformed(String),
    /// The service reported that it could not compress the image
    Rejected(String),
}

impl std::fmt::Display for CompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressError::Malformed(msg) => write!(f, "Malformed response: {}", msg),
            CompressError::Rejected(msg) => write!(f, "Rejected: {}", msg),
        }
    }
}

impl std::error::Error for CompressError {}

impl From<serde_json::Error> for CompressError {
    fn from(err: serde_json::Error) -> Self {
        CompressError::Malformed(err.to_string())
    }
}

// ============================================================================
// Kraken
// ============================================================================

/// Kraken upload response
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KrakenData {
    pub message: String,
    pub file_name: String,
    pub original_size: i64,
    pub kraked_size: i64,
    pub saved_bytes: i64,
    pub kraked_url: String,
    pub original_width: i64,
    pub original_height: i64,
    pub kraked_width: i64,
    pub kraked_height: i64,
    pub success: bool,
}

/// Kraken credentials sent inside the `data` form field
#[derive(Debug, Serialize)]
pub struct KrakenAuth<'a> {
    pub api_key: &'a str,
    pub api_secret: &'a str,
}

/// Kraken `data` form field
#[derive(Debug, Serialize)]
pub struct KrakenRequest<'a> {
    pub auth: KrakenAuth<'a>,
    pub wait: bool,
}

/// Serialize the `data` form field for a Kraken upload.
pub fn kraken_request_data(api_key: &str, api_secret: &str) -> Result<String, CompressError> {
    let request = KrakenRequest {
        auth: KrakenAuth {
            api_key,
            api_secret,
        },
        wait: true,
    };

    Ok(serde_json::to_string(&request)?)
}

/// Parse a Kraken response body into the compressed file URL.
pub fn parse_kraken_response(body: &[u8]) -> Result<String, CompressError> {
    let data: KrakenData = serde_json::from_slice(body)?;

    if !data.success {
        return Err(CompressError::Rejected(data.message));
    }

    Ok(data.kraked_url)
}

// ============================================================================
// reSmush
// ============================================================================

/// reSmush error codes start here
pub const RESMUSH_ERROR_THRESHOLD: i64 = 300;

/// reSmush `ws.php` response
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReSmushData {
    pub src: String,
    pub dest: String,
    pub src_size: i64,
    pub dest_size: i64,
    pub percent: i64,
    pub output: String,
    pub expires: String,
    pub generator: String,
    pub error: i64,
    pub error_long: String,
}

/// Parse a reSmush response body into the compressed file URL.
pub fn parse_resmush_response(body: &[u8]) -> Result<String, CompressError> {
    let data: ReSmushData = serde_json::from_slice(body)?;

    if data.error >= RESMUSH_ERROR_THRESHOLD {
        return Err(CompressError::Rejected(data.error_long));
    }

    Ok(data.dest)
}

// ============================================================================
// Tinify
// ============================================================================

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TinifyInput {
    pub size: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TinifyOutput {
    pub size: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub width: i64,
    pub height: i64,
    pub ratio: f64,
    pub url: String,
}

/// Tinify `shrink` response
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TinifyData {
    pub input: TinifyInput,
    pub output: TinifyOutput,
    pub error: String,
    pub message: String,
}

/// Parse a Tinify response body into the compressed file URL.
pub fn parse_tinify_response(body: &[u8]) -> Result<String, CompressError> {
    let data: TinifyData = serde_json::from_slice(body)?;

    if !data.error.is_empty() {
        return Err(CompressError::Rejected(format!(
            "{}. {}",
            data.error, data.message
        )));
    }

    Ok(data.output.url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_kraken_request_data() {
        let data = kraken_request_data("key", "se\"cret").unwrap();
        let value: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(
            value,
            json!({"auth": {"api_key": "key", "api_secret": "se\"cret"}, "wait": true})
        );
    }

    #[test]
    fn test_parse_kraken_success() {
        let b = body(json!({
            "success": true,
            "file_name": "file.jpg",
            "original_size": 324520,
            "kraked_size": 165358,
            "saved_bytes": 159162,
            "kraked_url": "https://dl.kraken.io/api/3e/db/24/file.jpg"
        }));
        assert_eq!(
            parse_kraken_response(&b).unwrap(),
            "https://dl.kraken.io/api/3e/db/24/file.jpg"
        );
    }

    #[test]
    fn test_parse_kraken_rejected() {
        let b = body(json!({"success": false, "message": "Unknown API Key"}));
        assert_eq!(
            parse_kraken_response(&b).unwrap_err(),
            CompressError::Rejected("Unknown API Key".to_string())
        );
    }

    #[test]
    fn test_parse_kraken_missing_success_is_rejected() {
        let b = body(json!({"kraked_url": "https://dl.kraken.io/x.jpg"}));
        assert!(matches!(
            parse_kraken_response(&b),
            Err(CompressError::Rejected(_))
        ));
    }

    #[test]
    fn test_parse_kraken_malformed() {
        assert!(matches!(
            parse_kraken_response(b"<html>"),
            Err(CompressError::Malformed(_))
        ));
        assert!(matches!(
            parse_kraken_response(br#"{"success": "yes"}"#),
            Err(CompressError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_resmush_success() {
        let b = body(json!({
            "src": "http://example.com/a.jpg",
            "dest": "http://par.resmush.it/a.jpg",
            "src_size": 100,
            "dest_size": 80,
            "percent": 20,
            "expires": "Fri, 12 Aug 2022 08:21:36 +0200",
            "generator": "reSmush.it rev.3.0.4.20211124"
        }));
        assert_eq!(
            parse_resmush_response(&b).unwrap(),
            "http://par.resmush.it/a.jpg"
        );
    }

    #[test]
    fn test_parse_resmush_error_threshold() {
        let b = body(json!({"error": 299, "dest": "http://par.resmush.it/a.jpg"}));
        assert!(parse_resmush_response(&b).is_ok());

        let b = body(json!({"error": 301, "error_long": "Cannot copy from remote url"}));
        assert_eq!(
            parse_resmush_response(&b).unwrap_err(),
            CompressError::Rejected("Cannot copy from remote url".to_string())
        );
    }

    #[test]
    fn test_parse_resmush_malformed() {
        assert!(matches!(
            parse_resmush_response(b""),
            Err(CompressError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_tinify_success() {
        let b = body(json!({
            "input": {"size": 207565, "type": "image/jpeg"},
            "output": {
                "size": 174334,
                "type": "image/jpeg",
                "width": 1024,
                "height": 768,
                "ratio": 0.8399,
                "url": "https://api.tinify.com/output/2xnsp7jn34e5"
            }
        }));
        assert_eq!(
            parse_tinify_response(&b).unwrap(),
            "https://api.tinify.com/output/2xnsp7jn34e5"
        );
    }

    #[test]
    fn test_parse_tinify_rejected() {
        let b = body(json!({"error": "Unauthorized", "message": "Credentials are invalid"}));
        assert_eq!(
            parse_tinify_response(&b).unwrap_err(),
            CompressError::Rejected("Unauthorized. Credentials are invalid".to_string())
        );
    }

    #[test]
    fn test_parse_tinify_malformed() {
        assert!(matches!(
            parse_tinify_response(b"[1, 2]"),
            Err(CompressError::Malformed(_))
        ));
    }
}
