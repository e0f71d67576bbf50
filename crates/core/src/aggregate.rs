use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::classify::ClassifierChain;
use crate::error::CtrError;
use crate::model::{
    sum_numeric, BatchReport, CompanyAggregate, CompanySummaryRow, FileFailure, FileRecord, RawCell,
    SheetTable, KEYWORD_COLUMN, REQUIRED_COLUMNS, SEARCH_VOLUME_COLUMN, TRAFFIC_COLUMN, UNKNOWN_COMPANY,
};
use crate::store::IndicatorStore;

/// Sequential per-company accumulator over a batch of files.
///
/// Feed files with [`Aggregator::process_file`] in processing order, then
/// call [`Aggregator::finish`].
pub struct Aggregator<'a> {
    chain: &'a ClassifierChain,
    store: &'a mut dyn IndicatorStore,
    learn: bool,
    monthly: Vec<FileRecord>,
    companies: BTreeMap<String, CompanyAggregate>,
    newly_detected: Vec<String>,
    failures: Vec<FileFailure>,
}

impl<'a> Aggregator<'a> {
    pub fn new(chain: &'a ClassifierChain, store: &'a mut dyn IndicatorStore) -> Self {
        Self {
            chain,
            store,
            learn: true,
            monthly: Vec::new(),
            companies: BTreeMap::new(),
            newly_detected: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether newly detected companies are written back to the store.
    pub fn learning(mut self, enabled: bool) -> Self {
        self.learn = enabled;
        self
    }

    /// Process one file. A failed file is recorded and skipped; it never
    /// stops the batch.
    pub fn process_file(
        &mut self,
        file_name: &str,
        table: Result<SheetTable, CtrError>,
    ) -> Result<&FileRecord, CtrError> {
        match self.extract(file_name, table) {
            Ok(record) => {
                info!(
                    file = file_name,
                    company = %record.company,
                    search_volume = record.monthly_search_volume,
                    traffic = record.monthly_traffic,
                    "processed"
                );
                self.companies
                    .entry(record.company.clone())
                    .or_default()
                    .add(&record);
                self.monthly.push(record);
                Ok(&self.monthly[self.monthly.len() - 1])
            }
            Err(e) => {
                warn!(file = file_name, error = %e, "skipping file");
                self.failures.push(FileFailure {
                    file_name: file_name.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn extract(&mut self, file_name: &str, table: Result<SheetTable, CtrError>) -> Result<FileRecord, CtrError> {
        let table = table?;
        if table.width < REQUIRED_COLUMNS {
            return Err(CtrError::MissingColumns {
                needed: REQUIRED_COLUMNS,
                found: table.width,
            });
        }

        let monthly_search_volume = sum_numeric(table.column(SEARCH_VOLUME_COLUMN));
        let monthly_traffic = sum_numeric(table.column(TRAFFIC_COLUMN));
        let keywords: Vec<RawCell> = table.column(KEYWORD_COLUMN).cloned().collect();

        let dictionary = self.store.load();
        let resolution = self.chain.resolve(&keywords, &dictionary);
        debug!(file = file_name, company = %resolution.company, strategy = ?resolution.strategy, "classified");

        if resolution.company != UNKNOWN_COMPANY && !dictionary.contains(&resolution.company) {
            self.note_new_company(&resolution.company, &keywords);
        }

        Ok(FileRecord {
            file_name: file_name.to_string(),
            company: resolution.company,
            monthly_search_volume,
            monthly_traffic,
        })
    }

    fn note_new_company(&mut self, company: &str, keywords: &[RawCell]) {
        if !self.newly_detected.iter().any(|c| c == company) {
            self.newly_detected.push(company.to_string());
        }
        if !self.learn {
            return;
        }
        match self.store.learn(company, keywords) {
            Ok(true) => info!(company, "learned new company"),
            Ok(false) => debug!(company, "nothing to learn"),
            // Learning is best effort; the file still counts
            Err(e) => warn!(company, error = %e, "could not save learned company"),
        }
    }

    /// Companies resolved so far that were not in the dictionary.
    pub fn newly_detected(&self) -> &[String] {
        &self.newly_detected
    }

    /// Compute CTR per company and hand back the batch result.
    pub fn finish(self) -> BatchReport {
        let company_summary = self
            .companies
            .iter()
            .map(|(company, agg)| CompanySummaryRow {
                company: company.clone(),
                total_search_volume: agg.total_search_volume,
                total_traffic: agg.total_traffic,
                ctr: agg.ctr(),
            })
            .collect();

        BatchReport {
            company_summary,
            monthly: self.monthly,
            newly_detected: self.newly_detected,
            failures: self.failures,
        }
    }
}

/// Run a whole batch in one call.
pub fn run_batch<I>(chain: &ClassifierChain, store: &mut dyn IndicatorStore, files: I) -> BatchReport
where
    I: IntoIterator<Item = (String, Result<SheetTable, CtrError>)>,
{
    let mut aggregator = Aggregator::new(chain, store);
    for (name, table) in files {
        let _ = aggregator.process_file(&name, table);
    }
    aggregator.finish()
}
