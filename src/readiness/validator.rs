//! Per-parameter literal validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::compat::normalize_type;
use crate::parse::literal_text;

/// Validation outcome for one `(actionId, parameterName)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParameterCheck {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Per-parameter results keyed by `(actionId, parameterName)`.
pub type ParameterReport = BTreeMap<(String, String), ParameterCheck>;

/// A literal parameter value to check. References and unset values are never
/// passed to a validator.
#[derive(Debug, Clone, Copy)]
pub struct ParameterInput<'a> {
    pub action_id: &'a str,
    pub name: &'a str,
    pub declared_type: &'a str,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub value: &'a Value,
}

pub trait ParameterValidator {
    fn validate(&self, input: &ParameterInput<'_>) -> ParameterCheck;
}

/// Type coercion and range checks for Cadence primitive types.
#[derive(Debug, Clone, Copy, Default)]
pub struct CadenceParameterValidator;

const UFIX64_MAX_FRACTION_DIGITS: usize = 8;
const ADDRESS_MAX_HEX_DIGITS: usize = 16;
const INTEGER_WIDTHS: [u32; 6] = [8, 16, 32, 64, 128, 256];

impl ParameterValidator for CadenceParameterValidator {
    fn validate(&self, input: &ParameterInput<'_>) -> ParameterCheck {
        let mut check = ParameterCheck::default();
        let text = literal_text(input.value);
        let ty = normalize_type(input.declared_type);

        let numeric = match ty.as_str() {
            "ufix64" => check_fix64(&text, false, input.declared_type, &mut check),
            "fix64" => check_fix64(&text, true, input.declared_type, &mut check),
            "address" => {
                check_address(&text, &mut check);
                None
            }
            "bool" => {
                if !matches!(input.value, Value::Bool(_)) && text != "true" && text != "false" {
                    check.error(format!("'{}' is not a Bool (expected true or false)", text));
                }
                None
            }
            t if t.starts_with("int") || t.starts_with("uint") || t.starts_with("word") => {
                check_integer(&text, t, input.declared_type, &mut check)
            }
            _ => None,
        };

        if let Some(n) = numeric {
            if let Some(min) = input.min {
                if n < min {
                    check.error(format!("{} is below the minimum of {}", text, min));
                }
            }
            if let Some(max) = input.max {
                if n > max {
                    check.error(format!("{} exceeds the maximum of {}", text, max));
                }
            }
            if ty == "ufix64" && n == 0.0 && check.errors.is_empty() {
                check.warning(format!("'{}' is zero", input.name));
            }
        }

        check
    }
}

/// Run a validator over every literal, keyed by `(actionId, parameterName)`.
pub fn collect_checks<'a>(
    validator: &dyn ParameterValidator,
    inputs: impl IntoIterator<Item = ParameterInput<'a>>,
) -> ParameterReport {
    inputs
        .into_iter()
        .map(|input| {
            let check = validator.validate(&input);
            ((input.action_id.to_string(), input.name.to_string()), check)
        })
        .filter(|(_, check)| !check.is_clean())
        .collect()
}

fn check_fix64(
    text: &str,
    signed: bool,
    declared: &str,
    check: &mut ParameterCheck,
) -> Option<f64> {
    let body = text.strip_prefix('-').filter(|_| signed).unwrap_or(text);
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    let digits_ok = !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit());
    if !digits_ok {
        let kind = if signed { "decimal" } else { "non-negative decimal" };
        check.error(format!("'{}' is not a valid {} ({})", text, declared, kind));
        return None;
    }
    if fraction.len() > UFIX64_MAX_FRACTION_DIGITS {
        check.error(format!(
            "'{}' has more than {} fractional digits",
            text, UFIX64_MAX_FRACTION_DIGITS
        ));
        return None;
    }
    text.parse::<f64>().ok()
}

fn check_integer(text: &str, ty: &str, declared: &str, check: &mut ParameterCheck) -> Option<f64> {
    let unsigned = !ty.starts_with("int");
    let Ok(n) = text.parse::<i128>() else {
        check.error(format!("'{}' is not a valid {} (integer)", text, declared));
        return None;
    };
    if unsigned && n < 0 {
        check.error(format!("'{}' must not be negative for {}", text, declared));
        return None;
    }
    let width = ty.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    if width.is_empty() {
        // Int / UInt are arbitrary precision.
        return Some(n as f64);
    }
    let Some(bits) = width.parse::<u32>().ok().filter(|b| INTEGER_WIDTHS.contains(b)) else {
        check.error(format!("'{}' is not a known integer type", declared));
        return None;
    };
    // Widths of 128 bits and up are only bounded by the i128 parse.
    if bits < 128 {
        let (lo, hi) = if unsigned {
            (0i128, (1i128 << bits) - 1)
        } else {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        };
        if n < lo || n > hi {
            check.error(format!("'{}' is out of range for {}", text, declared));
            return None;
        }
    }
    Some(n as f64)
}

fn check_address(text: &str, check: &mut ParameterCheck) {
    let hex = text.strip_prefix("0x").unwrap_or("");
    let valid = !hex.is_empty()
        && hex.len() <= ADDRESS_MAX_HEX_DIGITS
        && hex.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        check.error(format!(
            "'{}' is not a valid Address (0x followed by up to {} hex digits)",
            text, ADDRESS_MAX_HEX_DIGITS
        ));
    }
}
