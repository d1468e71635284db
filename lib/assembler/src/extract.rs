//! Splitting free text into the four contract fields

use clausematch_core::{FieldName, FieldTexts};
use once_cell::sync::Lazy;
use regex::Regex;

/// Per-field text produced by an extractor; fields it could not find are empty
pub type ExtractedFields = FieldTexts;

/// Prefix that marks a model reply in a chat transcript
pub const ASSISTANT_PREFIX: &str = "assistant:";

/// Splits a free-form contract description into field texts
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, text: &str) -> ExtractedFields;
}

static SECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)标的[物的]*信息：(.+?)\s*主体信息：(.+?)\s*价款与支付信息：(.+?)\s*履行[条款的]*信息：(.+)",
    )
    .expect("Failed to compile section pattern")
});

/// Extractor for descriptions written under the four standard headings
/// (标的信息 / 主体信息 / 价款与支付信息 / 履行条款信息).
///
/// Headings must appear in that order. Anything else yields four empty
/// fields rather than a partial split.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingExtractor;

impl FieldExtractor for HeadingExtractor {
    fn extract(&self, text: &str) -> ExtractedFields {
        let Some(caps) = SECTION_PATTERN.captures(text) else {
            return ExtractedFields::default();
        };

        ExtractedFields::from_fn(|field| {
            caps.get(field.index() + 1)
                .map(|m| clean_section(m.as_str()))
                .unwrap_or_default()
        })
    }
}

/// Drop line breaks, including the escaped `\n` sequences that survive when a
/// reply has been JSON-encoded twice
fn clean_section(section: &str) -> String {
    section
        .trim()
        .replace('\n', "")
        .replace("\\n", "")
        .trim()
        .to_string()
}

/// Text of the last `assistant:` message in a chat history, or `""`
pub fn last_assistant_reply<S: AsRef<str>>(history: &[S]) -> &str {
    history
        .iter()
        .rev()
        .find_map(|item| item.as_ref().strip_prefix(ASSISTANT_PREFIX))
        .map(str::trim)
        .unwrap_or("")
}

/// Fields that carry text, in canonical order
pub fn non_empty_fields(fields: &ExtractedFields) -> Vec<(FieldName, &str)> {
    fields
        .iter()
        .map(|(field, text)| (field, text.trim()))
        .filter(|(_, text)| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "标的物信息：本合同涉及的标的为成品家具，包括家具的规格、型号、数量等具体信息。  \\n主体信息：本合同主体为买方与卖方。  \\n价款与支付信息：合同采用固定总价计价方式，\n付款方式为银行转账。  \\n\\n履行条款信息：合同需明确交货时间、地点及方式。";

    #[test]
    fn test_extract_sections() {
        let fields = HeadingExtractor.extract(REPLY);

        assert_eq!(
            fields.get(FieldName::SubjectMatter),
            "本合同涉及的标的为成品家具，包括家具的规格、型号、数量等具体信息。"
        );
        assert_eq!(fields.get(FieldName::Parties), "本合同主体为买方与卖方。");
        assert_eq!(
            fields.get(FieldName::PricePayment),
            "合同采用固定总价计价方式，付款方式为银行转账。"
        );
        assert_eq!(fields.get(FieldName::PerformanceTerms), "合同需明确交货时间、地点及方式。");
    }

    #[test]
    fn test_heading_variants() {
        let text = "标的的信息：工程\n\n主体信息：发包方\n价款与支付信息：按进度\n履行的信息：工期";
        let fields = HeadingExtractor.extract(text);
        assert_eq!(fields.get(FieldName::SubjectMatter), "工程");
        assert_eq!(fields.get(FieldName::PerformanceTerms), "工期");
    }

    #[test]
    fn test_no_match_yields_empty_fields() {
        let fields = HeadingExtractor.extract("我要一份家具买卖合同");
        assert!(non_empty_fields(&fields).is_empty());

        // Out of order headings are not split
        let fields = HeadingExtractor.extract("主体信息：甲\n标的信息：乙\n价款与支付信息：丙\n履行信息：丁");
        assert!(non_empty_fields(&fields).is_empty());
    }

    #[test]
    fn test_last_assistant_reply() {
        let history = vec![
            "user:我要在浙江省内的实体店购买成品家具".to_string(),
            "assistant:  第一版  ".to_string(),
            "user:再详细一点".to_string(),
            "assistant:第二版".to_string(),
            "user:确认".to_string(),
        ];
        assert_eq!(last_assistant_reply(&history), "第二版");
        assert_eq!(last_assistant_reply(&["user:hi"]), "");
        assert_eq!(last_assistant_reply::<&str>(&[]), "");
    }

    #[test]
    fn test_non_empty_fields_order() {
        let mut fields = ExtractedFields::default();
        fields.set(FieldName::PerformanceTerms, "工期".into());
        fields.set(FieldName::SubjectMatter, "家具".into());
        fields.set(FieldName::Parties, "   ".into());

        let present: Vec<_> = non_empty_fields(&fields).into_iter().map(|(f, _)| f).collect();
        assert_eq!(present, vec![FieldName::SubjectMatter, FieldName::PerformanceTerms]);
    }
}
