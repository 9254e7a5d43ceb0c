//! Text edits produced by the analysis pass.

/// A single replacement: bytes `[lo, hi)` of the original source become
/// `new_text`. Edits produced for one source snapshot never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub lo: usize,
    pub hi: usize,
    pub new_text: String,
}

/// Applies a batch of non-overlapping edits to `source`. Edits may arrive
/// in any order.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| e.lo);

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in ordered {
        debug_assert!(edit.lo >= cursor, "overlapping edits");
        result.push_str(&source[cursor..edit.lo]);
        result.push_str(&edit.new_text);
        cursor = edit.hi;
    }
    result.push_str(&source[cursor..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_no_edits() {
        assert_eq!(apply_edits("abc", &[]), "abc");
    }

    #[test]
    fn test_apply_single_edit() {
        let edits = vec![TextEdit {
            lo: 1,
            hi: 2,
            new_text: "XY".to_string(),
        }];
        assert_eq!(apply_edits("abc", &edits), "aXYc");
    }

    #[test]
    fn test_apply_unordered_edits() {
        let edits = vec![
            TextEdit {
                lo: 4,
                hi: 5,
                new_text: "E".to_string(),
            },
            TextEdit {
                lo: 0,
                hi: 1,
                new_text: "A".to_string(),
            },
        ];
        assert_eq!(apply_edits("abcde", &edits), "AbcdE");
    }
}
