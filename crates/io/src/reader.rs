// First-sheet import (xlsx, xlsm, xls, xlsb, ods)
//
// One-way: only cell values are read. Formulas contribute their cached
// result, formatting is ignored.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use ctrsum_core::{CtrError, RawCell, SheetTable};

/// Read the first sheet of a workbook, header row removed.
///
/// Columns keep their absolute position: a used range starting at column C
/// still puts its first cell at index 2.
pub fn read_first_sheet(path: &Path) -> Result<SheetTable, CtrError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CtrError::Read(format!("failed to open {}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CtrError::Read(format!("{} contains no sheets", path.display())))?
        .map_err(|e| CtrError::Read(format!("failed to read first sheet of {}: {}", path.display(), e)))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(SheetTable::default());
    }

    // Range start offset (data may not begin at A1)
    let (_, start_col) = range.start().unwrap_or((0, 0));
    let start_col = start_col as usize;

    let rows = range
        .rows()
        .skip(1)
        .map(|row| {
            let mut cells = vec![RawCell::Empty; start_col];
            cells.extend(row.iter().map(convert_cell));
            cells
        })
        .collect();

    Ok(SheetTable::new(start_col + width, rows))
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) if s.is_empty() => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(n) => RawCell::Number(*n),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::Error(e) => RawCell::Error(format!("#{:?}", e)),
        // Date serials sum like any other number
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}
