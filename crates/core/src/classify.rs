use tracing::debug;

use crate::dictionary::IndicatorDictionary;
use crate::fallback::extract_capitalized;
use crate::matcher::match_company;
use crate::model::{RawCell, UNKNOWN_COMPANY};

/// One way of naming the company behind a file's keywords.
pub trait CompanyClassifier {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Best guess at the company, or `None` to let the next strategy try.
    fn attempt(&self, keywords: &[RawCell], dictionary: &IndicatorDictionary) -> Option<String>;
}

/// Indicator-phrase matching against the company dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct DictionaryClassifier;

impl CompanyClassifier for DictionaryClassifier {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn attempt(&self, keywords: &[RawCell], dictionary: &IndicatorDictionary) -> Option<String> {
        match_company(keywords, dictionary)
    }
}

/// Most frequent capitalized keyword. Last resort.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapitalizationClassifier;

impl CompanyClassifier for CapitalizationClassifier {
    fn name(&self) -> &'static str {
        "capitalization"
    }

    fn attempt(&self, keywords: &[RawCell], _dictionary: &IndicatorDictionary) -> Option<String> {
        extract_capitalized(keywords)
    }
}

/// Outcome of running the chain on one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub company: String,
    /// Strategy that produced the answer; `None` for the unknown bucket.
    pub strategy: Option<&'static str>,
}

/// Ordered list of strategies; the first usable answer wins.
#[derive(Default)]
pub struct ClassifierChain {
    strategies: Vec<Box<dyn CompanyClassifier>>,
}

impl ClassifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// `[dictionary]`
    pub fn dictionary_only() -> Self {
        Self::new().with(DictionaryClassifier)
    }

    /// `[dictionary, capitalization]`
    pub fn with_heuristic() -> Self {
        Self::dictionary_only().with(CapitalizationClassifier)
    }

    pub fn with(mut self, strategy: impl CompanyClassifier + 'static) -> Self {
        self.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn CompanyClassifier>) {
        self.strategies.push(strategy);
    }

    /// Put a strategy ahead of all others.
    pub fn prepend(&mut self, strategy: Box<dyn CompanyClassifier>) {
        self.strategies.insert(0, strategy);
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn resolve(&self, keywords: &[RawCell], dictionary: &IndicatorDictionary) -> Resolution {
        for strategy in &self.strategies {
            let Some(answer) = strategy.attempt(keywords, dictionary) else {
                debug!(strategy = strategy.name(), "no match");
                continue;
            };
            let answer = answer.trim();
            if answer.is_empty() || answer.eq_ignore_ascii_case(UNKNOWN_COMPANY) {
                debug!(strategy = strategy.name(), "declined");
                continue;
            }
            debug!(strategy = strategy.name(), company = answer, "resolved");
            return Resolution {
                company: answer.to_string(),
                strategy: Some(strategy.name()),
            };
        }

        Resolution {
            company: UNKNOWN_COMPANY.to_string(),
            strategy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn kws(values: &[&str]) -> Vec<RawCell> {
        values.iter().map(|s| RawCell::Text(s.to_string())).collect()
    }

    struct Fixed(Option<&'static str>);

    impl CompanyClassifier for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn attempt(&self, _: &[RawCell], _: &IndicatorDictionary) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    struct Counting(Rc<Cell<usize>>);

    impl CompanyClassifier for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn attempt(&self, _: &[RawCell], _: &IndicatorDictionary) -> Option<String> {
            self.0.set(self.0.get() + 1);
            None
        }
    }

    #[test]
    fn dictionary_only_falls_to_unknown() {
        let chain = ClassifierChain::dictionary_only();
        let res = chain.resolve(&kws(&["Globex Widgets"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, UNKNOWN_COMPANY);
        assert_eq!(res.strategy, None);
    }

    #[test]
    fn heuristic_used_after_dictionary() {
        let chain = ClassifierChain::with_heuristic();
        assert_eq!(chain.strategy_names(), vec!["dictionary", "capitalization"]);

        let res = chain.resolve(&kws(&["Globex Widgets", "globex"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "Globex Widgets");
        assert_eq!(res.strategy, Some("capitalization"));

        let res = chain.resolve(&kws(&["Chase Freedom"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "Chase");
        assert_eq!(res.strategy, Some("dictionary"));
    }

    #[test]
    fn first_answer_wins_and_stops_chain() {
        let calls = Rc::new(Cell::new(0));
        let chain = ClassifierChain::new()
            .with(Fixed(Some("Initech")))
            .with(Counting(Rc::clone(&calls)));
        let res = chain.resolve(&[], &IndicatorDictionary::new());
        assert_eq!(res.company, "Initech");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unknown_answers_are_declined() {
        let mut chain = ClassifierChain::new().with(Fixed(Some("  unknown company ")));
        chain.push(Box::new(DictionaryClassifier));
        let res = chain.resolve(&kws(&["amex"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "American Express");
    }

    #[test]
    fn prepend_runs_first() {
        let mut chain = ClassifierChain::dictionary_only();
        chain.prepend(Box::new(Fixed(Some("Umbrella"))));
        assert_eq!(chain.strategy_names(), vec!["fixed", "dictionary"]);
        let res = chain.resolve(&kws(&["chase"]), &IndicatorDictionary::builtin());
        assert_eq!(res.company, "Umbrella");
    }
}
