//! Provider payload shape.
//!
//! The payload is `{ locale: { domain: { key: translation } } }`. Locale and
//! domain entries of any other shape are skipped, not rejected.

use serde_json::{Map, Value};
use tracing::debug;

use super::SyncError;

/// One (locale, domain, translations) triple of a valid payload.
#[derive(Debug, Clone, Copy)]
pub struct PayloadEntry<'a> {
    pub locale: &'a str,
    pub domain: &'a str,
    pub translations: &'a Map<String, Value>,
}

/// Walk the payload, keeping only entries of the expected shape.
///
/// Fails only when the top level is not an object.
pub fn entries(payload: &Value) -> Result<Vec<PayloadEntry<'_>>, SyncError> {
    let locales = payload.as_object().ok_or(SyncError::UnexpectedShape {
        found: type_name(payload),
    })?;

    let mut out = Vec::new();

    for (locale, domains) in locales {
        let Some(domains) = domains.as_object() else {
            debug!("Skipping locale {}: not an object", locale);
            continue;
        };
        if !is_safe_name(locale) {
            debug!("Skipping locale {:?}: not usable in a file name", locale);
            continue;
        }

        for (domain, translations) in domains {
            let Some(translations) = translations.as_object() else {
                debug!("Skipping {}/{}: not an object", domain, locale);
                continue;
            };
            if !is_safe_name(domain) {
                debug!("Skipping domain {:?}: not usable in a file name", domain);
                continue;
            }
            if !translations.values().all(Value::is_string) {
                debug!("Skipping {}/{}: translations must be strings", domain, locale);
                continue;
            }

            out.push(PayloadEntry {
                locale,
                domain,
                translations,
            });
        }
    }

    Ok(out)
}

/// Names end up in `{domain}_{locale}.json`, so they must stay inside the
/// translations directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_payload() {
        let payload = json!({
            "en": {"messages": {"hello": "Hi"}, "errors": {"oops": "Oops"}},
            "fr": {"messages": {"hello": "Salut"}}
        });

        let entries = entries(&payload).unwrap();

        assert_eq!(entries.len(), 3);
        assert!(entries
            .iter()
            .any(|e| e.locale == "fr" && e.domain == "messages" && e.translations["hello"] == "Salut"));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let payload = json!({
            "en": {"messages": {"hello": "Hi"}, "broken": ["not", "a", "map"]},
            "de": "not a map",
            "fr": {"messages": {"count": 3}},
            "../etc": {"messages": {"hello": "Hi"}}
        });

        let entries = entries(&payload).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].locale, "en");
        assert_eq!(entries[0].domain, "messages");
    }

    #[test]
    fn test_top_level_must_be_object() {
        let err = entries(&json!(["en"])).unwrap_err();

        assert!(matches!(err, SyncError::UnexpectedShape { found: "array" }));
    }
}
