use crate::dictionary::{normalize_keyword, IndicatorDictionary};
use crate::model::RawCell;

/// Per-company hit counts, in dictionary order.
///
/// A keyword is one hit for a company when it contains any of that
/// company's phrases.
pub fn company_hit_counts<'d>(
    keywords: &[RawCell],
    dictionary: &'d IndicatorDictionary,
) -> Vec<(&'d str, usize)> {
    let normalized: Vec<String> = keywords.iter().filter_map(normalize_keyword).collect();

    dictionary
        .iter()
        .map(|(company, phrases)| {
            let hits = normalized
                .iter()
                .filter(|kw| phrases.iter().any(|p| kw.contains(p.as_str())))
                .count();
            (company, hits)
        })
        .collect()
}

/// Company with the most keyword hits. Ties go to the company listed first.
/// `None` when no keyword hits any company.
pub fn match_company(keywords: &[RawCell], dictionary: &IndicatorDictionary) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for (company, hits) in company_hit_counts(keywords, dictionary) {
        if hits == 0 {
            continue;
        }
        match best {
            Some((_, best_hits)) if best_hits >= hits => {}
            _ => best = Some((company, hits)),
        }
    }

    best.map(|(company, _)| company.to_string())
}
