use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::RawCell;

/// Learned phrases shorter than this are too generic to identify a company.
pub const MIN_PHRASE_LEN: usize = 3;
/// Upper bound on phrases derived for a newly learned company.
pub const MAX_LEARNED_PHRASES: usize = 10;

/// Company name → indicator phrases.
///
/// Order matters: when two companies tie on match count, the one listed
/// first wins. Order survives JSON round trips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorDictionary {
    entries: Vec<(String, Vec<String>)>,
}

impl IndicatorDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary used when no company config exists yet.
    pub fn builtin() -> Self {
        let mut dict = Self::new();
        dict.insert("Bank of America", ["bank of america", "bofa", "b of a"]);
        dict.insert("Wells Fargo", ["wells fargo", "wellsfargo"]);
        dict.insert("Citibank", ["citibank", "citi"]);
        dict.insert("Chase", ["chase", "jp morgan chase", "jpmorgan"]);
        dict.insert("Capital One", ["capital one"]);
        dict.insert("American Express", ["american express", "amex"]);
        dict
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, company: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == company)
    }

    pub fn phrases(&self, company: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == company)
            .map(|(_, phrases)| phrases.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(name, phrases)| (name.as_str(), phrases.as_slice()))
    }

    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Add a company, or replace its phrases in place.
    ///
    /// Phrases are lowercased and trimmed; blanks and duplicates are dropped.
    /// Returns `true` if the company was not present before.
    pub fn insert<I, S>(&mut self, company: &str, phrases: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !cleaned.contains(&phrase) {
                cleaned.push(phrase);
            }
        }

        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == company) {
            entry.1 = cleaned;
            false
        } else {
            self.entries.push((company.to_string(), cleaned));
            true
        }
    }

    pub fn remove(&mut self, company: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(name, _)| name != company);
        self.entries.len() != before
    }
}

/// Lowercase, trimmed keyword text. `None` for empty cells.
pub fn normalize_keyword(cell: &RawCell) -> Option<String> {
    let text = cell.as_keyword()?;
    let normalized = text.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// Indicator phrases for a newly seen company, derived from keyword frequency.
///
/// Most frequent normalized keywords first (ties keep first appearance),
/// phrases shorter than [`MIN_PHRASE_LEN`] characters left out.
pub fn candidate_phrases(keywords: &[RawCell], limit: usize) -> Vec<String> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for phrase in keywords.iter().filter_map(normalize_keyword) {
        if phrase.chars().count() < MIN_PHRASE_LEN {
            continue;
        }
        match index.get(&phrase) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(phrase.clone(), counts.len());
                counts.push((phrase, 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(phrase, _)| phrase).collect()
}

// ---------------------------------------------------------------------------
// Serde: a JSON object of company -> [phrases], order preserved
// ---------------------------------------------------------------------------

impl Serialize for IndicatorDictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, phrases) in &self.entries {
            map.serialize_entry(name, phrases)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IndicatorDictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DictionaryVisitor;

        impl<'de> Visitor<'de> for DictionaryVisitor {
            type Value = IndicatorDictionary;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of company name to a list of indicator phrases")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut dict = IndicatorDictionary::new();
                while let Some((name, phrases)) = access.next_entry::<String, Vec<String>>()? {
                    dict.insert(&name, phrases);
                }
                Ok(dict)
            }
        }

        deserializer.deserialize_map(DictionaryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn builtin_has_six_companies_in_order() {
        let dict = IndicatorDictionary::builtin();
        let names: Vec<&str> = dict.companies().collect();
        assert_eq!(
            names,
            vec!["Bank of America", "Wells Fargo", "Citibank", "Chase", "Capital One", "American Express"]
        );
        assert_eq!(dict.phrases("Chase").unwrap(), &["chase", "jp morgan chase", "jpmorgan"]);
    }

    #[test]
    fn insert_normalizes_and_replaces_in_place() {
        let mut dict = IndicatorDictionary::new();
        assert!(dict.insert("Acme", ["  ACME ", "acme", "", "Acme Corp"]));
        assert!(dict.insert("Globex", ["globex"]));
        assert_eq!(dict.phrases("Acme").unwrap(), &["acme", "acme corp"]);

        assert!(!dict.insert("Acme", ["acme inc"]));
        let names: Vec<&str> = dict.companies().collect();
        assert_eq!(names, vec!["Acme", "Globex"]);
        assert_eq!(dict.phrases("Acme").unwrap(), &["acme inc"]);
    }

    #[test]
    fn candidates_by_frequency() {
        let keywords = vec![text("Acme Corp"), text("acme corp"), text("acme"), text("support")];
        let phrases = candidate_phrases(&keywords, MAX_LEARNED_PHRASES);
        assert_eq!(phrases, vec!["acme corp", "acme", "support"]);
    }

    #[test]
    fn candidates_skip_short_and_empty() {
        let keywords = vec![text("ab"), RawCell::Empty, text("  "), text("xyz"), RawCell::Number(7.0)];
        assert_eq!(candidate_phrases(&keywords, MAX_LEARNED_PHRASES), vec!["xyz"]);
    }

    #[test]
    fn candidates_capped_at_limit() {
        let keywords: Vec<RawCell> = (0..25).map(|i| text(&format!("keyword {i}"))).collect();
        assert_eq!(candidate_phrases(&keywords, MAX_LEARNED_PHRASES).len(), 10);
    }

    #[test]
    fn json_keeps_order() {
        let json = r#"{"Zeta":["zeta"],"Alpha":["alpha","a co"]}"#;
        let dict: IndicatorDictionary = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = dict.companies().collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(serde_json::to_string(&dict).unwrap(), json);
    }
}
