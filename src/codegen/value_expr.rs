//! Parameter value → Cadence expression text.

use serde_json::Value;

use crate::analysis::compat::{is_integer, normalize_type};
use crate::parse::literal_text;

/// Render a literal according to the parameter's declared type.
///
/// Typed literals are pasted into the script verbatim, so each must have the
/// lexical form of its type. Returns `None` when it does not.
pub fn emit_literal(value: &Value, declared_type: &str) -> Option<String> {
    let ty = normalize_type(declared_type);
    let text = literal_text(value);
    match ty.as_str() {
        "ufix64" | "fix64" => {
            if !is_decimal(&text, ty == "fix64") {
                return None;
            }
            if text.contains('.') {
                Some(text)
            } else {
                Some(format!("{}.0", text))
            }
        }
        "bool" => matches!(text.as_str(), "true" | "false").then_some(text),
        "address" => is_address(&text).then_some(text),
        "string" => Some(quote(&text)),
        t if is_integer(t) => {
            let digits = match text.strip_prefix('-') {
                Some(rest) if t.starts_with("int") => rest,
                _ => text.as_str(),
            };
            is_digits(digits).then_some(text)
        }
        _ => Some(match value {
            Value::String(s) => quote(s),
            other => other.to_string(),
        }),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(text: &str, signed: bool) -> bool {
    let unsigned = match text.strip_prefix('-') {
        Some(rest) if signed => rest,
        _ => text,
    };
    match unsigned.split_once('.') {
        Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        None => is_digits(unsigned),
    }
}

/// `0x` followed by 1 to 16 hex digits.
fn is_address(text: &str) -> bool {
    text.strip_prefix("0x").is_some_and(|hex| {
        (1..=16).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit())
    })
}

/// Variable name bound to an action's output: `<actionId>_<outputName>`, with
/// every character that is not valid in a Cadence identifier replaced by `_`.
pub fn binding_var_name(action_id: &str, name: &str) -> String {
    scoped_var_name(&action_prefix(action_id), name)
}

/// Identifier stem for an action's variables before any clash suffix.
pub fn action_prefix(action_id: &str) -> String {
    sanitize(action_id)
}

/// `<prefix>_<name>`, kept a valid identifier.
pub fn scoped_var_name(prefix: &str, name: &str) -> String {
    let mut var = format!("{}_{}", prefix, sanitize(name));
    if var.starts_with(|c: char| c.is_ascii_digit()) {
        var.insert(0, '_');
    }
    var
}

/// Action-local temporary: the output variable name with a leading `_`, so a
/// temporary never shadows an output variable of the same action.
pub fn local_var_name(prefix: &str, name: &str) -> String {
    format!("_{}", scoped_var_name(prefix, name))
}

/// `$local` placeholder names used in `text`.
pub fn template_locals(text: &str) -> Vec<String> {
    render_template(text, |_| None)
        .1
        .into_iter()
        .filter_map(|key| key.strip_prefix('$').map(str::to_string))
        .collect()
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Substitute `{{...}}` placeholders.
///
/// `lookup` returns the replacement for a placeholder's inner text; unknown
/// placeholders become `nil` and are returned in the second element. Unclosed
/// `{{` is kept as literal text.
pub fn render_template(
    text: &str,
    mut lookup: impl FnMut(&str) -> Option<String>,
) -> (String, Vec<String>) {
    let mut out = String::with_capacity(text.len());
    let mut missing = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("{{") {
        out.push_str(&remaining[..start]);
        let after_open = &remaining[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let inner = after_open[..end].trim();
                match lookup(inner) {
                    Some(replacement) => out.push_str(&replacement),
                    None => {
                        out.push_str("nil");
                        missing.push(inner.to_string());
                    }
                }
                remaining = &after_open[end + 2..];
            }
            None => {
                out.push_str(&remaining[start..]);
                remaining = "";
            }
        }
    }
    out.push_str(remaining);

    (out, missing)
}
