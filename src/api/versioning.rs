use axum::http::HeaderMap;
use once_cell::sync::Lazy;

use crate::error::ApiError;

pub const LATEST_API_VERSION: &str = "2.0";

/// Versions a client may request via the X-API-Version header.
static SUPPORTED_VERSIONS: Lazy<Vec<f64>> = Lazy::new(|| {
    ["1.0", "1.8", LATEST_API_VERSION]
        .iter()
        .map(|v| v.parse().expect("supported versions parse as floats"))
        .collect()
});

pub fn latest() -> f64 {
    LATEST_API_VERSION
        .parse()
        .expect("latest version parses as a float")
}

/// Negotiated API version for a request, attached as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct ApiVersion(pub f64);

/// Resolve the requested API version against the whitelist.
///
/// In lenient mode an unrecognized or unparseable version silently falls back
/// to the latest supported version; strict mode reports it to the client.
pub fn negotiate(headers: &HeaderMap, strict: bool) -> Result<ApiVersion, ApiError> {
    let requested = headers
        .get("x-api-version")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let raw = match requested {
        Some(raw) => raw,
        None => return Ok(ApiVersion(latest())),
    };

    match raw.parse::<f64>() {
        Ok(version) if SUPPORTED_VERSIONS.contains(&version) => Ok(ApiVersion(version)),
        _ if strict => Err(ApiError::InvalidApiVersion(raw.to_string())),
        _ => Ok(ApiVersion(latest())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(version: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-version", HeaderValue::from_str(version).unwrap());
        headers
    }

    #[test]
    fn defaults_to_latest_when_header_absent() {
        let version = negotiate(&HeaderMap::new(), false).unwrap();
        assert_eq!(version.0, latest());
    }

    #[test]
    fn passes_requested_supported_version() {
        let version = negotiate(&headers_with("1.8"), false).unwrap();
        assert_eq!(version.0, 1.8);
    }

    #[test]
    fn unknown_version_falls_back_when_lenient() {
        let version = negotiate(&headers_with("9.9"), false).unwrap();
        assert_eq!(version.0, latest());
    }

    #[test]
    fn unknown_version_rejected_when_strict() {
        let err = negotiate(&headers_with("9.9"), true).unwrap_err();
        assert_eq!(err.code(), "invalid-api-version");
    }

    #[test]
    fn garbage_version_rejected_when_strict() {
        assert!(negotiate(&headers_with("latest"), true).is_err());
    }
}
