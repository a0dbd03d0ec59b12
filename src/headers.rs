// Request header container
// Adapter over the two header shapes a request may carry

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{Result, TransportError};

/// Header container of an outgoing request
///
/// `Structured` is the setter form backed by a typed `HeaderMap`; names and
/// values are validated on every `set`. `Plain` is a string map that takes
/// direct key assignment and is only validated when the request is built.
#[derive(Debug, Clone)]
pub enum Headers {
    Structured(HeaderMap),
    Plain(BTreeMap<String, String>),
}

impl Default for Headers {
    fn default() -> Self {
        Headers::Structured(HeaderMap::new())
    }
}

impl Headers {
    pub fn structured() -> Self {
        Headers::Structured(HeaderMap::new())
    }

    pub fn plain() -> Self {
        Headers::Plain(BTreeMap::new())
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match self {
            Headers::Structured(map) => {
                let name = parse_name(name)?;
                let value = parse_value(name.as_str(), value)?;
                map.insert(name, value);
            }
            Headers::Plain(map) => {
                map.retain(|k, _| !k.eq_ignore_ascii_case(name));
                map.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Set `Authorization: Bearer <token>`
    pub fn set_bearer(&mut self, token: &str) -> Result<()> {
        self.set(AUTHORIZATION.as_str(), &bearer_value(token))
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            Headers::Structured(map) => map
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            Headers::Plain(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Headers::Structured(map) => map.contains_key(name),
            Headers::Plain(map) => map.keys().any(|k| k.eq_ignore_ascii_case(name)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        match self {
            Headers::Structured(map) => {
                map.remove(name);
            }
            Headers::Plain(map) => map.retain(|k, _| !k.eq_ignore_ascii_case(name)),
        }
    }

    /// Fill in every header from `defaults` the request does not set itself
    pub fn merge_defaults(&mut self, defaults: &HeaderMap) -> Result<()> {
        for (name, value) in defaults {
            if self.contains(name.as_str()) {
                continue;
            }
            match self {
                Headers::Structured(map) => {
                    map.insert(name.clone(), value.clone());
                }
                Headers::Plain(map) => {
                    let value = value.to_str().map_err(|e| {
                        TransportError::InvalidRequest(format!(
                            "Default header {} is not valid text: {}",
                            name, e
                        ))
                    })?;
                    map.insert(name.to_string(), value.to_string());
                }
            }
        }
        Ok(())
    }

    /// Convert into a typed map for transmission
    pub fn into_header_map(self) -> Result<HeaderMap> {
        match self {
            Headers::Structured(map) => Ok(map),
            Headers::Plain(map) => {
                let mut headers = HeaderMap::with_capacity(map.len());
                for (name, value) in map {
                    let name = parse_name(&name)?;
                    let value = parse_value(name.as_str(), &value)?;
                    headers.insert(name, value);
                }
                Ok(headers)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Headers::Structured(map) => map.len(),
            Headers::Plain(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Headers::Structured(map)
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        Headers::Plain(map)
    }
}

/// `Bearer <token>`
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {}", token)
}

fn parse_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| TransportError::InvalidRequest(format!("Invalid header name {:?}: {}", name, e)))
}

fn parse_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| TransportError::InvalidRequest(format!("Invalid value for header {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_structured_set_and_get() {
        let mut headers = Headers::structured();
        headers.set("Authorization", "Bearer abc").unwrap();
        assert_eq!(headers.get("authorization").as_deref(), Some("Bearer abc"));

        headers.set("authorization", "Bearer xyz").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Authorization").as_deref(), Some("Bearer xyz"));
    }

    #[test]
    fn test_plain_assignment_is_case_insensitive() {
        let mut headers = Headers::plain();
        headers.set("authorization", "Bearer abc").unwrap();
        headers.set("Authorization", "Bearer xyz").unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("AUTHORIZATION").as_deref(), Some("Bearer xyz"));
    }

    #[test]
    fn test_structured_rejects_invalid_value() {
        let mut headers = Headers::structured();
        let err = headers.set("Authorization", "Bearer a\nb").unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_plain_defers_validation_until_build() {
        let mut headers = Headers::plain();
        headers.set("bad header", "value").unwrap();
        let err = headers.into_header_map().unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_merge_defaults_keeps_request_values() {
        let mut defaults = HeaderMap::new();
        defaults.insert(AUTHORIZATION, HeaderValue::from_static("Bearer default"));
        defaults.insert("x-client", HeaderValue::from_static("webook"));

        let mut headers = Headers::plain();
        headers.set("Authorization", "Bearer mine").unwrap();
        headers.merge_defaults(&defaults).unwrap();

        assert_eq!(headers.get("authorization").as_deref(), Some("Bearer mine"));
        assert_eq!(headers.get("x-client").as_deref(), Some("webook"));
    }

    #[test]
    fn test_remove() {
        let mut headers = Headers::structured();
        headers.set("x-a", "1").unwrap();
        headers.remove("X-A");
        assert!(headers.is_empty());

        let mut headers = Headers::plain();
        headers.set("X-A", "1").unwrap();
        headers.remove("x-a");
        assert!(headers.is_empty());
    }

    proptest! {
        #[test]
        fn bearer_header_matches_token_in_both_shapes(token in "[A-Za-z0-9._-]{1,64}") {
            let mut structured = Headers::structured();
            structured.set_bearer(&token).unwrap();
            let mut plain = Headers::plain();
            plain.set_bearer(&token).unwrap();

            let expected = format!("Bearer {}", token);
            prop_assert_eq!(structured.get("Authorization"), Some(expected.clone()));
            prop_assert_eq!(plain.get("Authorization"), Some(expected.clone()));

            let built = plain.into_header_map().unwrap();
            prop_assert_eq!(built.get(AUTHORIZATION).unwrap().to_str().unwrap(), expected.as_str());
        }
    }
}
