//! Environment variable substitution in configuration values.
//!
//! Two forms are understood: a string that is exactly `$VAR`, and
//! `{env:VAR}` placeholders anywhere inside a string. Unset variables
//! resolve to the empty string.

use serde_json::Value;

/// Resolves placeholders in every string of `value`, recursing into maps and lists.
pub(crate) fn resolve_value(value: &mut Value, lookup: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::String(s) => *s = resolve_str(s, lookup),
        Value::Array(items) => items.iter_mut().for_each(|v| resolve_value(v, lookup)),
        Value::Object(map) => map.values_mut().for_each(|v| resolve_value(v, lookup)),
        _ => {}
    }
}

/// Resolves placeholders in a single string.
pub(crate) fn resolve_str(s: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    if let Some(name) = s.strip_prefix('$') {
        if is_var_name(name) {
            return lookup(name).unwrap_or_default();
        }
    }

    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("{env:") {
        let start = from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 5..start + end];
        let value = lookup(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        from = start + value.len();
    }
    result
}

fn is_var_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Looks up a variable in the process environment.
pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
