use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CtrError {
    /// Spreadsheet could not be opened or its first sheet could not be read.
    Read(String),
    /// Sheet is narrower than the fixed input layout requires.
    MissingColumns { needed: usize, found: usize },
    /// Company dictionary could not be read or written.
    Store(String),
    /// Summary workbook could not be produced.
    Report(String),
    /// IO error (directory listing, file write, etc.).
    Io(String),
}

impl fmt::Display for CtrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "cannot read spreadsheet: {msg}"),
            Self::MissingColumns { needed, found } => {
                write!(f, "expected at least {needed} columns, found {found}")
            }
            Self::Store(msg) => write!(f, "company config error: {msg}"),
            Self::Report(msg) => write!(f, "report error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CtrError {}
