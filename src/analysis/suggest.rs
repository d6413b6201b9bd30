//! Nearest-output suggestions for unresolved references.

use super::compat::normalize_type;
use crate::registry::OutputSpec;

/// Up to `max` output names the user probably meant.
///
/// Outputs sharing the parameter's declared type are preferred; within the
/// chosen pool candidates are ranked by edit distance to the requested name.
pub fn suggest_outputs(
    outputs: &[OutputSpec],
    requested: &str,
    target_type: &str,
    max: usize,
) -> Vec<String> {
    let wanted = normalize_type(target_type);
    let same_type: Vec<&OutputSpec> = outputs
        .iter()
        .filter(|o| !wanted.is_empty() && normalize_type(&o.output_type) == wanted)
        .collect();
    let pool: Vec<&OutputSpec> = if same_type.is_empty() {
        outputs.iter().collect()
    } else {
        same_type
    };

    let requested = requested.to_lowercase();
    let mut ranked: Vec<(usize, usize, &str)> = pool
        .iter()
        .enumerate()
        .map(|(i, o)| (edit_distance(&requested, &o.name.to_lowercase()), i, o.name.as_str()))
        .collect();
    ranked.sort();
    ranked
        .into_iter()
        .take(max)
        .map(|(_, _, name)| name.to_string())
        .collect()
}

/// Levenshtein distance over chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn out(name: &str, t: &str) -> OutputSpec {
        OutputSpec {
            name: name.into(),
            output_type: t.into(),
            description: None,
        }
    }

    #[test]
    fn distances() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn prefers_same_type() {
        let outputs = vec![
            out("amountOt", "String"),
            out("received", "UFix64"),
            out("fee", "UFix64"),
        ];
        let s = suggest_outputs(&outputs, "amountOut", "UFix64", 3);
        assert_eq!(s.len(), 2);
        assert!(!s.contains(&"amountOt".to_string()));
    }

    #[test]
    fn falls_back_to_edit_distance_and_caps() {
        let outputs = vec![
            out("balance", "UFix64"),
            out("amountOut", "UFix64"),
            out("amount", "UFix64"),
            out("total", "UFix64"),
        ];
        let s = suggest_outputs(&outputs, "amountOu", "Address", 3);
        assert_eq!(s.len(), 3);
        assert_eq!(&s[..2], &["amountOut".to_string(), "amount".to_string()]);
    }
}
