use std::collections::HashSet;

use ctrsum_core::RawCell;

/// Keywords sent per request.
pub const MAX_PROMPT_KEYWORDS: usize = 20;

/// Answers that mean the model could not tell.
const NO_ANSWER: [&str; 3] = ["unknown", "unknown company", "no identification possible"];

/// First `limit` distinct keywords, trimmed, original casing kept.
/// Distinctness ignores case.
pub fn representative_keywords(keywords: &[RawCell], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for cell in keywords {
        if out.len() == limit {
            break;
        }
        let Some(text) = cell.as_keyword() else { continue };
        let text = text.trim();
        if text.is_empty() || !seen.insert(text.to_lowercase()) {
            continue;
        }
        out.push(text.to_string());
    }
    out
}

pub fn build_prompt(keywords: &[String]) -> String {
    format!(
        "These search keywords all come from one company's marketing report:\n\
         {}\n\n\
         Which company is it? Reply with the exact company name only. \
         If you cannot tell, reply \"Unknown\".",
        keywords.join(", ")
    )
}

/// Clean a model reply into a company name. `None` when the model declined.
pub fn parse_answer(raw: &str) -> Option<String> {
    let mut answer = raw.trim();
    answer = answer.strip_suffix('.').unwrap_or(answer).trim();
    for quote in ['"', '\'', '`'] {
        if answer.len() >= 2 && answer.starts_with(quote) && answer.ends_with(quote) {
            answer = answer[1..answer.len() - 1].trim();
        }
    }
    answer = answer.strip_suffix('.').unwrap_or(answer).trim();

    if answer.is_empty() || NO_ANSWER.iter().any(|n| answer.eq_ignore_ascii_case(n)) {
        return None;
    }
    Some(answer.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_representative_keywords_dedup_and_limit() {
        let mut cells: Vec<RawCell> = vec![
            RawCell::Text("Chase Sapphire".into()),
            RawCell::Text("chase sapphire".into()),
            RawCell::Empty,
            RawCell::Text("  ".into()),
            RawCell::Number(401.0),
        ];
        cells.extend((0..30).map(|i| RawCell::Text(format!("kw {i}"))));

        let kws = representative_keywords(&cells, MAX_PROMPT_KEYWORDS);
        assert_eq!(kws.len(), 20);
        assert_eq!(kws[0], "Chase Sapphire");
        assert_eq!(kws[1], "401");
        assert_eq!(kws[2], "kw 0");
    }

    #[test]
    fn test_prompt_lists_keywords() {
        let prompt = build_prompt(&["amex gold".into(), "amex login".into()]);
        assert!(prompt.contains("amex gold, amex login"));
        assert!(prompt.contains("Unknown"));
    }

    #[test]
    fn test_parse_answer_cleanup() {
        assert_eq!(parse_answer("  American Express\n").as_deref(), Some("American Express"));
        assert_eq!(parse_answer("\"Chase\"").as_deref(), Some("Chase"));
        assert_eq!(parse_answer("'Wells Fargo'.").as_deref(), Some("Wells Fargo"));
        assert_eq!(parse_answer("Capital One.").as_deref(), Some("Capital One"));
    }

    #[test]
    fn test_parse_answer_declines() {
        assert_eq!(parse_answer("Unknown"), None);
        assert_eq!(parse_answer("unknown company."), None);
        assert_eq!(parse_answer("No identification possible"), None);
        assert_eq!(parse_answer("   "), None);
        assert_eq!(parse_answer("\"\""), None);
    }
}
