//! Template filter entry point.
//!
//! Template engines hand filters their named arguments as a map; `trans`
//! turns those into substitution parameters:
//!
//! ```text
//! {{ "greet" | trans(domain="messages", name="Ann") }}
//! ```

use serde_json::{Map, Value};

use crate::context::{RequestContext, DEFAULT_DOMAIN};

/// Translate `key` with named arguments as parameters.
///
/// Arguments are applied in the order they were given. String arguments
/// are substituted verbatim, anything else as its JSON text. No arguments
/// means no substitution.
pub fn trans(ctx: &RequestContext, key: &str, domain: Option<&str>, kwargs: &Map<String, Value>) -> String {
    let domain = domain.unwrap_or(DEFAULT_DOMAIN);

    if kwargs.is_empty() {
        return ctx.translate(key, domain);
    }

    let parameters = kwargs.iter().map(|(name, value)| (name, value_text(value)));
    ctx.translate_with(key, domain, parameters)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
