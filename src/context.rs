//! Per-request translation state and the lookup function.
//!
//! A `RequestContext` is built once per request by
//! [`Translations::begin_request`](crate::Translations::begin_request) and
//! holds, for every configured domain, the dictionary of the resolved locale
//! and the dictionary of the fallback locale. Lookups only ever read these.
//!
//! ## Lookup order
//!
//! 1. Primary dictionary
//! 2. Fallback dictionary (if the domain has none, the key is returned as-is)
//! 3. The key itself
//!
//! Parameters are substituted afterwards.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;

use crate::store::Dictionary;

/// Domain used when none is given.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Primary and fallback dictionaries of one domain.
///
/// Both point at the same dictionary when the request locale is the
/// fallback locale.
#[derive(Debug, Clone)]
pub struct DomainDictionaries {
    pub primary: Dictionary,
    pub fallback: Dictionary,
}

/// Translation state of a single request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    locale: String,
    domains: HashMap<String, DomainDictionaries>,
}

impl RequestContext {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            domains: HashMap::new(),
        }
    }

    /// Attach the dictionaries of a domain.
    pub fn insert_domain(&mut self, domain: impl Into<String>, primary: Dictionary, fallback: Dictionary) {
        self.domains
            .insert(domain.into(), DomainDictionaries { primary, fallback });
    }

    /// Locale resolved for this request.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn domain(&self, domain: &str) -> Option<&DomainDictionaries> {
        self.domains.get(domain)
    }

    /// Translate `key` in the default domain.
    pub fn t(&self, key: &str) -> String {
        self.translate(key, DEFAULT_DOMAIN)
    }

    /// Translate `key` in `domain` without parameters.
    pub fn translate(&self, key: &str, domain: &str) -> String {
        self.resolve(key, domain)
            .map_or_else(|| key.to_string(), str::to_string)
    }

    /// Translate `key` in `domain`, then replace every literal occurrence of
    /// each parameter name with its value.
    ///
    /// Replacements run in iteration order, so a name that is a substring of
    /// another can affect later replacements.
    pub fn translate_with<I, K, V>(&self, key: &str, domain: &str, parameters: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Display,
    {
        let Some(template) = self.resolve(key, domain) else {
            return key.to_string();
        };

        substitute(template, parameters)
    }

    /// Candidate translation before substitution.
    ///
    /// `None` means the domain has no fallback dictionary at all, in which
    /// case the key is returned untouched.
    fn resolve<'a>(&'a self, key: &'a str, domain: &str) -> Option<&'a str> {
        let dicts = self.domains.get(domain);

        if let Some(value) = dicts.and_then(|d| d.primary.get(key)) {
            return Some(value);
        }

        let fallback = &dicts?.fallback;
        Some(fallback.get(key).map_or(key, String::as_str))
    }
}

/// Literal substring replacement, in parameter order.
pub fn substitute<I, K, V>(template: &str, parameters: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut result = template.to_string();

    for (name, value) in parameters {
        let name = name.as_ref();
        if name.is_empty() {
            continue;
        }
        result = result.replace(name, &value.to_string());
    }

    result
}

/// Shared handle, as stored in request extensions.
pub type SharedContext = Arc<RequestContext>;

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, &str)]) -> Dictionary {
        Arc::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn context() -> RequestContext {
        let mut ctx = RequestContext::new("fr");
        ctx.insert_domain(
            "messages",
            dict(&[("hello", "Bonjour"), ("greet", "Salut {name}")]),
            dict(&[("hello", "Hello"), ("bye", "Goodbye"), ("greet", "Hi {name}")]),
        );
        ctx
    }

    #[test]
    fn test_primary_wins() {
        assert_eq!(context().t("hello"), "Bonjour");
    }

    #[test]
    fn test_fallback_used_when_primary_misses() {
        assert_eq!(context().t("bye"), "Goodbye");
    }

    #[test]
    fn test_missing_everywhere_returns_key() {
        assert_eq!(context().t("nope"), "nope");
    }

    #[test]
    fn test_unknown_domain_returns_key() {
        let ctx = context();

        assert_eq!(ctx.translate("hello", "errors"), "hello");
        assert_eq!(ctx.translate_with("x {a}", "errors", [("{a}", "1")]), "x {a}");
    }

    #[test]
    fn test_empty_fallback_still_substitutes_key() {
        let mut ctx = RequestContext::new("en");
        let empty = dict(&[]);
        ctx.insert_domain("messages", empty.clone(), empty);

        assert_eq!(ctx.translate_with("hi {n}", "messages", [("{n}", "Bo")]), "hi Bo");
    }

    #[test]
    fn test_parameters_substituted() {
        let mut ctx = RequestContext::new("en");
        let en = dict(&[("greet", "Hi {name}")]);
        ctx.insert_domain("messages", en.clone(), en);

        assert_eq!(ctx.translate_with("greet", "messages", [("{name}", "Ann")]), "Hi Ann");
    }

    #[test]
    fn test_parameters_applied_to_fallback_and_key() {
        let ctx = context();

        assert_eq!(ctx.translate_with("greet", "messages", [("{name}", "Léa")]), "Salut Léa");
        assert_eq!(
            ctx.translate_with("missing {n}", "messages", [("{n}", 3)]),
            "missing 3"
        );
    }

    #[test]
    fn test_substitution_follows_parameter_order() {
        let params = vec![("{a}", "{ab}"), ("{ab}", "x")];
        assert_eq!(substitute("{a} {ab}", params), "x x");

        let params = vec![("{ab}", "x"), ("{a}", "{ab}")];
        assert_eq!(substitute("{a} {ab}", params), "{ab} x");
    }

    #[test]
    fn test_numbers_as_values() {
        let params: Vec<(&str, &dyn Display)> = vec![("%count%", &5), ("%name%", &"Bo")];
        assert_eq!(substitute("%name% has %count%", params), "Bo has 5");
    }
}
