// Spreadsheet I/O
//
// Import: first sheet of each input file into a core SheetTable.
// Export: the two-sheet CTR summary workbook (xlsx only).

pub mod discover;
pub mod reader;
pub mod report;

pub use discover::{discover_inputs, is_spreadsheet, SPREADSHEET_EXTENSIONS};
pub use reader::read_first_sheet;
pub use report::{report_to_buffer, write_report, DEFAULT_OUTPUT_NAME};
