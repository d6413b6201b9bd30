//! Cadence type compatibility between an upstream output and a downstream
//! parameter.

/// Numeric class, normalized.
const NUMERIC_TYPES: &[&str] = &[
    "ufix64", "fix64", "int", "int8", "int16", "int32", "int64", "int128", "int256", "uint",
    "uint8", "uint16", "uint32", "uint64", "uint128", "uint256", "word8", "word16", "word32",
    "word64", "word128", "word256", "number",
];

const INTEGER_PREFIXES: &[&str] = &["int", "uint", "word"];

pub const EXACT_SCORE: f64 = 1.0;
pub const NUMERIC_SCORE: f64 = 0.8;
pub const STRING_SCORE: f64 = 0.6;
pub const INCOMPATIBLE_SCORE: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct Compatibility {
    pub compatible: bool,
    /// Type contribution to connection strength.
    pub score: f64,
    /// A known automatic coercion exists (only meaningful when incompatible).
    pub can_convert: bool,
    pub suggestion: Option<String>,
}

impl Compatibility {
    fn compatible(score: f64) -> Self {
        Compatibility {
            compatible: true,
            score,
            can_convert: true,
            suggestion: None,
        }
    }

    fn incompatible(can_convert: bool, suggestion: impl Into<String>) -> Self {
        Compatibility {
            compatible: false,
            score: INCOMPATIBLE_SCORE,
            can_convert,
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Lowercase and strip everything but ASCII alphanumerics: `"UFix64?"` → `"ufix64"`.
pub fn normalize_type(t: &str) -> String {
    t.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub fn is_numeric(normalized: &str) -> bool {
    NUMERIC_TYPES.contains(&normalized)
}

pub fn is_integer(normalized: &str) -> bool {
    is_numeric(normalized)
        && INTEGER_PREFIXES
            .iter()
            .any(|p| normalized.starts_with(p))
}

fn is_string(normalized: &str) -> bool {
    normalized == "string"
}

/// Container markers (`[]`, `{}`, `:`) and whether the type is optional.
/// Normalization drops both, so they are compared separately.
fn shape(t: &str) -> (String, bool) {
    let t = t.trim();
    let containers = t.chars().filter(|c| matches!(c, '[' | ']' | '{' | '}' | ':')).collect();
    (containers, t.ends_with('?'))
}

pub fn check_compatible(source_type: &str, target_type: &str) -> bool {
    assess(source_type, target_type).compatible
}

/// Score how well `source_type` feeds a parameter of `target_type`.
///
/// An untyped target accepts anything at the string-class score. Arrays,
/// dictionaries and optionals only match a target of the same shape, though a
/// plain value may feed an optional parameter.
pub fn assess(source_type: &str, target_type: &str) -> Compatibility {
    let source = normalize_type(source_type);
    let target = normalize_type(target_type);
    let (source_containers, source_optional) = shape(source_type);
    let (target_containers, target_optional) = shape(target_type);
    let same_shape =
        source_containers == target_containers && (!source_optional || target_optional);
    let scalar = same_shape && source_containers.is_empty();

    if same_shape && source == target && !source.is_empty() {
        return Compatibility::compatible(EXACT_SCORE);
    }
    if scalar && is_numeric(&source) && is_numeric(&target) {
        return Compatibility::compatible(NUMERIC_SCORE);
    }
    if (is_string(&target) && target_containers.is_empty()) || target.is_empty() {
        return Compatibility::compatible(STRING_SCORE);
    }
    if source_optional && !target_optional && source_containers == target_containers {
        return Compatibility::incompatible(
            false,
            format!("unwrap the optional {} before passing it as {}", source_type, target_type),
        );
    }
    if !scalar {
        return Compatibility::incompatible(
            false,
            format!(
                "insert an explicit conversion from {} to {}",
                display_type(source_type),
                display_type(target_type)
            ),
        );
    }

    if source == "bool" && is_integer(&target) {
        return Compatibility::incompatible(
            true,
            format!("convert boolean to {} (true = 1, false = 0)", target_type),
        );
    }
    if is_string(&source) && is_numeric(&target) {
        return Compatibility::incompatible(
            false,
            format!("parse numeric string as decimal before passing it as {}", target_type),
        );
    }
    if is_string(&source) && target == "address" {
        return Compatibility::incompatible(
            false,
            "parse the string as a 0x-prefixed account address",
        );
    }
    if is_numeric(&source) && target == "bool" {
        return Compatibility::incompatible(false, "compare the number against zero to get a Bool");
    }

    Compatibility::incompatible(
        false,
        format!(
            "insert an explicit conversion from {} to {}",
            display_type(source_type),
            display_type(target_type)
        ),
    )
}

fn display_type(t: &str) -> &str {
    if t.trim().is_empty() { "an untyped value" } else { t }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(normalize_type("UFix64?"), "ufix64");
        assert_eq!(normalize_type("  U-Int_64 "), "uint64");
    }

    #[test]
    fn every_type_is_compatible_with_itself() {
        for t in ["UFix64", "Address", "String", "Bool", "UInt64", "{String: Int}"] {
            assert!(check_compatible(t, t), "{t}");
            assert_eq!(assess(t, t).score, EXACT_SCORE);
        }
    }

    #[test]
    fn numeric_class_members_are_compatible() {
        for a in ["UFix64", "Int", "UInt64", "Fix64", "Word8"] {
            for b in ["UFix64", "Int", "UInt64", "Fix64", "Word8"] {
                assert!(check_compatible(a, b), "{a} -> {b}");
            }
        }
        assert_eq!(assess("Int", "UFix64").score, NUMERIC_SCORE);
    }

    #[test]
    fn anything_becomes_string() {
        for t in ["UFix64", "Address", "Bool", "[UInt8]"] {
            assert!(check_compatible(t, "String"));
        }
        assert_eq!(assess("Address", "String").score, STRING_SCORE);
    }

    #[test]
    fn case_and_punctuation_do_not_matter() {
        assert_eq!(assess("ufix64", "UFix64?").score, EXACT_SCORE);
    }

    #[test]
    fn string_to_number_has_no_coercion() {
        let c = assess("String", "UFix64");
        assert!(!c.compatible);
        assert!(!c.can_convert);
        assert_eq!(c.score, INCOMPATIBLE_SCORE);
        assert!(c.suggestion.unwrap().contains("parse numeric string as decimal"));
    }

    #[test]
    fn bool_to_integer_is_convertible() {
        let c = assess("Bool", "UInt8");
        assert!(!c.compatible);
        assert!(c.can_convert);
    }

    #[test]
    fn unrelated_types_get_generic_suggestion() {
        let c = assess("Address", "UInt64");
        assert!(!c.compatible);
        assert!(!c.can_convert);
        assert_eq!(
            c.suggestion.as_deref(),
            Some("insert an explicit conversion from Address to UInt64")
        );
    }

    #[test]
    fn containers_are_not_scalars() {
        let pairs = [("[UInt8]", "UInt64"), ("UInt64", "[UInt8]"), ("{String: Int}", "Int")];
        for (source, target) in pairs {
            let c = assess(source, target);
            assert!(!c.compatible, "{source} -> {target}");
            assert!(!c.can_convert);
        }
        assert_eq!(assess("[UInt8]", "[UInt8]").score, EXACT_SCORE);
        assert!(!check_compatible("[String]", "[[String]]"));
    }

    #[test]
    fn optionals_must_be_unwrapped() {
        let c = assess("UFix64?", "UFix64");
        assert!(!c.compatible);
        assert!(c.suggestion.unwrap().starts_with("unwrap the optional UFix64?"));
        assert!(check_compatible("UFix64?", "UInt64?"));
        assert_eq!(assess("Bool", "Bool?").score, EXACT_SCORE);
    }
}
