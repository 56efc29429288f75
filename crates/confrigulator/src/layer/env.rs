use crate::path::PathResolver;
use crate::value::Value;

/// Builds a document from `PREFIX<separator>PATH` variables
///
/// The remainder after the prefix is split on `separator` into lower-cased keys, so with
/// prefix `APP` and separator `__` the variable `APP__DATABASE__PORT=5432` becomes
/// `{"database": {"port": 5432}}`. Values are coerced to the most specific scalar.
///
/// Variables are applied in name order. A variable that would need to turn an existing
/// value into an object (`APP__A=1` next to `APP__A__B=2`) is skipped.
///
/// # Panics
///
/// When `separator` is empty, like [PathResolver::new].
pub fn document_from_vars(
    prefix: &str,
    separator: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Value {
    let resolver = PathResolver::new(separator);
    let prefix_with_sep = format!("{prefix}{separator}");

    let mut vars: Vec<_> = vars
        .into_iter()
        .filter_map(|(key, value)| {
            let path = key.strip_prefix(&prefix_with_sep)?.to_lowercase();
            Some((path, value))
        })
        .collect();
    vars.sort();

    let mut document = Value::empty_object();
    for (path, value) in vars {
        match resolver.set(&path, coerce_value(&value), &mut document, true) {
            Ok(_) => tracing::trace!(%path, "environment value"),
            Err(error) => tracing::warn!(%error, "skipping environment variable"),
        }
    }

    document
}

fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    // "0755" or "01234" are modes and codes, not numbers
    if has_leading_zero(s) {
        return Value::String(s.to_string());
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Decimal(f);
        }
    }

    Value::String(s.to_string())
}

fn has_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s).as_bytes();
    digits.first() == Some(&b'0') && digits.get(1).is_some_and(u8::is_ascii_digit)
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
