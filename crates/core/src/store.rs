use crate::dictionary::{candidate_phrases, IndicatorDictionary, MAX_LEARNED_PHRASES};
use crate::error::CtrError;
use crate::model::RawCell;

/// Persistent home of the company dictionary.
///
/// Passed by `&mut` into the aggregator so a run has exactly one writer.
pub trait IndicatorStore {
    /// Current dictionary. Must reflect the last successful `save`.
    fn load(&mut self) -> IndicatorDictionary;

    /// Replace the stored dictionary.
    fn save(&mut self, dictionary: &IndicatorDictionary) -> Result<(), CtrError>;

    /// Add `company` with phrases derived from `keywords`.
    ///
    /// Returns `Ok(false)` when the company is already known or no keyword
    /// is long enough to serve as a phrase.
    fn learn(&mut self, company: &str, keywords: &[RawCell]) -> Result<bool, CtrError> {
        let mut dictionary = self.load();
        if dictionary.contains(company) {
            return Ok(false);
        }

        let phrases = candidate_phrases(keywords, MAX_LEARNED_PHRASES);
        if phrases.is_empty() {
            return Ok(false);
        }

        dictionary.insert(company, phrases);
        self.save(&dictionary)?;
        Ok(true)
    }
}

/// In-memory store for tests and runs that must not touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dictionary: IndicatorDictionary,
    saves: usize,
}

impl MemoryStore {
    pub fn new(dictionary: IndicatorDictionary) -> Self {
        Self { dictionary, saves: 0 }
    }

    pub fn builtin() -> Self {
        Self::new(IndicatorDictionary::builtin())
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl IndicatorStore for MemoryStore {
    fn load(&mut self) -> IndicatorDictionary {
        self.dictionary.clone()
    }

    fn save(&mut self, dictionary: &IndicatorDictionary) -> Result<(), CtrError> {
        self.dictionary = dictionary.clone();
        self.saves += 1;
        Ok(())
    }
}
