//! Locale resolution from the incoming request.

use axum::http::HeaderMap;

use crate::config::Config;

/// Picks the active locale for a request.
///
/// The result is always one of the supported locales or the fallback
/// locale; absent or unsupported header values fall back silently.
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    header_name: String,
    supported: Vec<String>,
    fallback: String,
}

impl LocaleResolver {
    pub fn new(
        header_name: impl Into<String>,
        supported: Vec<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            header_name: header_name.into(),
            supported,
            fallback: fallback.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.locale_header.clone(),
            config.supported_locales.clone(),
            config.fallback_locale.clone(),
        )
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported.iter().any(|l| l == locale)
    }

    /// Resolve from the configured request header.
    pub fn resolve(&self, headers: &HeaderMap) -> String {
        let value = headers
            .get(self.header_name.as_str())
            .and_then(|v| v.to_str().ok());

        self.resolve_value(value)
    }

    /// Resolve from a raw header value.
    pub fn resolve_value(&self, value: Option<&str>) -> String {
        match value.map(str::trim) {
            Some(locale) if self.is_supported(locale) => locale.to_string(),
            _ => self.fallback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn resolver() -> LocaleResolver {
        LocaleResolver::new(
            "SELECTED-LOCALE",
            vec!["en".to_string(), "fr".to_string()],
            "en",
        )
    }

    #[test]
    fn test_supported_header_value() {
        let mut headers = HeaderMap::new();
        headers.insert("selected-locale", HeaderValue::from_static("fr"));

        assert_eq!(resolver().resolve(&headers), "fr");
    }

    #[test]
    fn test_unsupported_header_value_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("selected-locale", HeaderValue::from_static("xx"));

        assert_eq!(resolver().resolve(&headers), "en");
    }

    #[test]
    fn test_missing_header_falls_back() {
        assert_eq!(resolver().resolve(&HeaderMap::new()), "en");
    }

    #[test]
    fn test_fallback_outside_supported_set() {
        let resolver = LocaleResolver::new("X-Locale", vec!["fr".to_string()], "en");

        assert_eq!(resolver.resolve_value(None), "en");
        assert_eq!(resolver.resolve_value(Some(" fr ")), "fr");
        assert_eq!(resolver.resolve_value(Some("FR")), "en");
    }
}
