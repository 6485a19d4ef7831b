use serde_json::{Map, Value};
use url::Url;

use crate::ScannerError;

/// Keys searched, in priority order, when a pointer is a JSON object.
pub const POINTER_KEYS: [&str; 7] = ["gatewayUrl", "url", "ipfsUrl", "src", "href", "cid", "hash"];

const IPFS_SCHEME: &str = "ipfs://";

/// A content pointer as logged by the chat contract.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentPointer {
    /// A URL, an `ipfs://` URI or a bare content identifier.
    Raw(String),
    /// A JSON object carrying the pointer under one of [`POINTER_KEYS`].
    Nested(Map<String, Value>),
}

impl ContentPointer {
    /// Parses a logged pointer string. Strings holding a JSON object become [`Self::Nested`].
    ///
    /// Returns `None` for empty or whitespace-only input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.starts_with('{') {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(value) {
                return Some(Self::Nested(map));
            }
        }
        Some(Self::Raw(value.to_owned()))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Object(map) if !map.is_empty() => Some(Self::Nested(map.clone())),
            _ => None,
        }
    }

    /// Reduces the pointer to a single fetchable address, or `None` if it names nothing.
    #[must_use]
    pub fn normalize(&self, gateway: &Gateway) -> Option<String> {
        match self {
            Self::Raw(raw) => normalize_raw(raw, gateway),
            Self::Nested(map) => POINTER_KEYS.iter().find_map(|key| {
                map.get(*key).and_then(Self::from_value).and_then(|inner| inner.normalize(gateway))
            }),
        }
    }
}

fn normalize_raw(raw: &str, gateway: &Gateway) -> Option<String> {
    if let Some(cid) = strip_ipfs_scheme(raw) {
        return gateway.address_for(cid.trim_start_matches("ipfs/"));
    }
    if has_url_scheme(raw) {
        return Some(raw.to_owned());
    }
    gateway.address_for(raw.trim_start_matches('/').trim_start_matches("ipfs/"))
}

fn strip_ipfs_scheme(raw: &str) -> Option<&str> {
    let prefix = raw.get(..IPFS_SCHEME.len())?;
    prefix.eq_ignore_ascii_case(IPFS_SCHEME).then(|| &raw[IPFS_SCHEME.len()..])
}

fn has_url_scheme(raw: &str) -> bool {
    raw.contains("://") && Url::parse(raw).is_ok()
}

/// Base URL of the HTTP gateway serving content-addressed data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gateway {
    base: String,
}

impl Gateway {
    /// Parses a gateway base such as `https://ipfs.io` or `https://ipfs.io/ipfs/`.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::InvalidGateway`] unless `base` is an absolute http(s) URL.
    pub fn parse(base: &str) -> Result<Self, ScannerError> {
        let url = Url::parse(base.trim()).map_err(|e| ScannerError::InvalidGateway(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScannerError::InvalidGateway(format!("unsupported scheme {}", url.scheme())));
        }

        let base = url.as_str().trim_end_matches('/');
        let base = base.strip_suffix("/ipfs").unwrap_or(base);
        Ok(Self { base: base.to_owned() })
    }

    /// Canonical address of `cid` on this gateway.
    #[must_use]
    pub fn address_for(&self, cid: &str) -> Option<String> {
        let cid = cid.trim().trim_matches('/');
        (!cid.is_empty()).then(|| format!("{}/ipfs/{cid}", self.base))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CANONICAL: &str = "https://gw.example/ipfs/bafybeigabc";

    fn gateway() -> Gateway {
        Gateway::parse("https://gw.example").unwrap()
    }

    fn normalize(raw: &str) -> Option<String> {
        ContentPointer::parse(raw)?.normalize(&gateway())
    }

    #[test]
    fn every_pointer_shape_reaches_the_same_address() {
        assert_eq!(normalize("ipfs://bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(normalize("https://gw.example/ipfs/bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(normalize("bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(
            normalize(r#"{"gatewayUrl":"https://gw.example/ipfs/bafybeigabc"}"#).as_deref(),
            Some(CANONICAL)
        );
    }

    #[test]
    fn tolerates_ipfs_path_variants() {
        assert_eq!(normalize("ipfs://ipfs/bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(normalize("IPFS://bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(normalize("/ipfs/bafybeigabc").as_deref(), Some(CANONICAL));
        assert_eq!(normalize("  bafybeigabc \n").as_deref(), Some(CANONICAL));
    }

    #[test]
    fn foreign_urls_are_used_unchanged() {
        assert_eq!(
            normalize("https://other.example/content/1.json").as_deref(),
            Some("https://other.example/content/1.json")
        );
    }

    #[test]
    fn object_keys_follow_priority_order() {
        let pointer = ContentPointer::Nested(
            json!({ "cid": "second", "url": "https://x.example/first" })
                .as_object()
                .cloned()
                .unwrap(),
        );

        assert_eq!(pointer.normalize(&gateway()).as_deref(), Some("https://x.example/first"));
    }

    #[test]
    fn empty_and_non_string_keys_are_skipped() {
        let raw = r#"{"gatewayUrl":"","url":42,"hash":"bafybeigabc"}"#;

        assert_eq!(normalize(raw).as_deref(), Some(CANONICAL));
    }

    #[test]
    fn nested_objects_are_followed() {
        let raw = r#"{"src":{"ipfsUrl":"ipfs://bafybeigabc"}}"#;

        assert_eq!(normalize(raw).as_deref(), Some(CANONICAL));
    }

    #[test]
    fn empty_input_normalizes_to_nothing() {
        assert_eq!(ContentPointer::parse(""), None);
        assert_eq!(ContentPointer::parse("   "), None);
        assert_eq!(normalize("ipfs://"), None);
        assert_eq!(normalize(r#"{"title":"no pointer here"}"#), None);
    }

    #[test]
    fn gateway_accepts_ipfs_suffixed_base() {
        let gw = Gateway::parse("https://gw.example/ipfs/").unwrap();

        assert_eq!(gw.as_str(), "https://gw.example");
        assert_eq!(gw.address_for("bafybeigabc").as_deref(), Some(CANONICAL));
    }

    #[test]
    fn gateway_rejects_non_http_urls() {
        assert!(matches!(Gateway::parse("ftp://gw.example"), Err(ScannerError::InvalidGateway(_))));
        assert!(matches!(Gateway::parse("not a url"), Err(ScannerError::InvalidGateway(_))));
    }
}
