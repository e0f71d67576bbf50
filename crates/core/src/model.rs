use serde::Serialize;

/// Company bucket for files no classifier could resolve.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

// ---------------------------------------------------------------------------
// Input layout
// ---------------------------------------------------------------------------

/// Column A: keyword text used to identify the company.
pub const KEYWORD_COLUMN: usize = 0;
/// Column D: monthly search volume.
pub const SEARCH_VOLUME_COLUMN: usize = 3;
/// Column H: monthly traffic.
pub const TRAFFIC_COLUMN: usize = 7;
/// Minimum sheet width for the fixed layout above.
pub const REQUIRED_COLUMNS: usize = TRAFFIC_COLUMN + 1;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single cell as read from the first sheet of an input file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    /// Numbers, integers and date serials.
    Number(f64),
    Bool(bool),
    /// Excel error value (`#N/A`, `#DIV/0!`, ...).
    Error(String),
}

static EMPTY_CELL: RawCell = RawCell::Empty;

impl RawCell {
    /// Text form used for keyword matching. `None` for empty and error cells.
    pub fn as_keyword(&self) -> Option<String> {
        match self {
            RawCell::Empty | RawCell::Error(_) => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(n) => {
                // Integers without decimals, the way the sheet displays them
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            RawCell::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        }
    }

    /// Numeric value for summing. Unparseable cells yield `None` and are
    /// left out of the total.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            RawCell::Number(n) => *n,
            RawCell::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            RawCell::Text(s) => s.trim().parse::<f64>().ok()?,
            RawCell::Empty | RawCell::Error(_) => return None,
        };
        n.is_finite().then_some(n)
    }
}

/// Sum of the parseable numeric cells in a column.
pub fn sum_numeric<'c>(cells: impl IntoIterator<Item = &'c RawCell>) -> f64 {
    cells.into_iter().filter_map(RawCell::as_number).sum()
}

/// Primary data table of an input file, header row already removed.
///
/// Cells are addressed by absolute column index (A = 0) even when the
/// sheet's used range does not start at column A.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetTable {
    /// Number of columns in the sheet, header row included.
    pub width: usize,
    pub rows: Vec<Vec<RawCell>>,
}

impl SheetTable {
    pub fn new(width: usize, rows: Vec<Vec<RawCell>>) -> Self {
        Self { width, rows }
    }

    /// All cells of one column, `Empty` where a row is short.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &RawCell> + '_ {
        self.rows.iter().map(move |row| row.get(col).unwrap_or(&EMPTY_CELL))
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Totals extracted from one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub file_name: String,
    pub company: String,
    pub monthly_search_volume: f64,
    pub monthly_traffic: f64,
}

/// Running totals for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyAggregate {
    pub total_search_volume: f64,
    pub total_traffic: f64,
    pub file_count: usize,
}

impl CompanyAggregate {
    pub fn add(&mut self, record: &FileRecord) {
        self.total_search_volume += record.monthly_search_volume;
        self.total_traffic += record.monthly_traffic;
        self.file_count += 1;
    }

    /// Traffic over search volume; 0 when there is no volume.
    pub fn ctr(&self) -> f64 {
        if self.total_search_volume > 0.0 {
            self.total_traffic / self.total_search_volume
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummaryRow {
    pub company: String,
    pub total_search_volume: f64,
    pub total_traffic: f64,
    pub ctr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub error: String,
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// One row per company, sorted by company name.
    pub company_summary: Vec<CompanySummaryRow>,
    /// One row per processed file, in processing order.
    pub monthly: Vec<FileRecord>,
    /// Companies resolved during this run that were not in the dictionary.
    pub newly_detected: Vec<String>,
    /// Files skipped because they could not be read.
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.monthly.is_empty() && self.failures.is_empty()
    }
}
