//! Category label normalization
//!
//! Labels arrive with decorations such as `（建筑工程）` or `【租赁】`. Both the
//! query side and the catalog side go through [`normalize_label`] before the
//! exact comparison that awards the category bonus.

/// Bracket pairs removed from around a label, ASCII first then CJK variants
pub const BRACKET_PAIRS: [(char, char); 7] = [
    ('(', ')'),
    ('[', ']'),
    ('{', '}'),
    ('（', '）'),
    ('【', '】'),
    ('「', '」'),
    ('『', '』'),
];

/// Strip surrounding bracket pairs.
///
/// Repeats while the trimmed text both starts with an opener and ends with its
/// matching closer, so `"(【买卖】)"` becomes `"买卖"`. Unbalanced decoration
/// such as `"(买卖"` is left as is.
pub fn strip_brackets(text: &str) -> &str {
    let mut s = text.trim();
    loop {
        let mut changed = false;
        for (open, close) in BRACKET_PAIRS {
            if let Some(inner) = s.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
                s = inner.trim();
                changed = true;
            }
        }
        if !changed {
            return s;
        }
    }
}

/// CJK Unified Ideographs block
#[inline]
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Normalize a category label for exact comparison.
///
/// After bracket stripping, a label containing Chinese keeps only its
/// ideographs (digits, Latin letters and punctuation are dropped). Any other
/// label keeps its alphanumeric characters, lowercased.
pub fn normalize_label(label: &str) -> String {
    let stripped = strip_brackets(label);
    if stripped.chars().any(is_cjk_ideograph) {
        stripped.chars().filter(|&c| is_cjk_ideograph(c)).collect()
    } else {
        stripped
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

/// True when both labels normalize to the same non-empty string
pub fn labels_match(query_label: &str, entry_label: &str) -> bool {
    let q = normalize_label(query_label);
    !q.is_empty() && q == normalize_label(entry_label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fullwidth_parens() {
        assert_eq!(strip_brackets("（建筑工程）"), "建筑工程");
    }

    #[test]
    fn test_strip_nested_mixed_pairs() {
        assert_eq!(strip_brackets(" (【 买卖合同 】) "), "买卖合同");
        assert_eq!(strip_brackets("『「租赁」』"), "租赁");
    }

    #[test]
    fn test_unbalanced_left_alone() {
        assert_eq!(strip_brackets("(买卖合同"), "(买卖合同");
        assert_eq!(strip_brackets("（买卖合同)"), "（买卖合同)");
    }

    #[test]
    fn test_empty_and_bare_brackets() {
        assert_eq!(strip_brackets(""), "");
        assert_eq!(strip_brackets("()"), "");
        assert_eq!(strip_brackets("【】"), "");
    }

    #[test]
    fn test_normalize_keeps_only_ideographs() {
        assert_eq!(normalize_label("（建筑工程）"), "建筑工程");
        assert_eq!(normalize_label("建筑 工程-2024"), "建筑工程");
        assert_eq!(normalize_label("【买卖合同】：家具"), "买卖合同家具");
    }

    #[test]
    fn test_normalize_non_cjk_label() {
        assert_eq!(normalize_label("(Lease Agreement)"), "leaseagreement");
        assert_eq!(normalize_label("  --  "), "");
    }

    #[test]
    fn test_labels_match() {
        assert!(labels_match("（建筑工程）", "建筑工程"));
        assert!(!labels_match("", ""));
        assert!(!labels_match("", "建筑工程"));
        assert!(!labels_match("建筑工程", "装饰工程"));
    }
}
