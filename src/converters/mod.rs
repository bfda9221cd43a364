pub mod missile_launches;
pub mod serial_date;

use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info};

use crate::error::{Error, Result};
use missile_launches::{HEADERS, Record};

/// Cell text as the launch converter expects it.
///
/// Dates and times stay in their serial form so the converter can apply its
/// own calendar rules. Errors and blanks become empty text.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::String(s) => s.clone(),
        _ => cell.to_string(),
    }
}

/// Flatten a worksheet range into rows of text.
///
/// Rows are padded on the left so index 0 is always column A, and rows
/// without any content are dropped, so row offsets count non-empty rows.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let leading_cols = range.start().map_or(0, |(_, col)| col as usize);

    range
        .rows()
        .filter(|row| row.iter().any(|cell| !cell_text(cell).trim().is_empty()))
        .map(|row| {
            std::iter::repeat_n(String::new(), leading_cols)
                .chain(row.iter().map(cell_text))
                .collect()
        })
        .collect()
}

/// Parse the first worksheet of an XLSX file into Vec<Vec<String>>
pub fn parse_xlsx(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| Error::source_unavailable(format!("cannot open {}", path.display()), e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| {
            Error::source_unavailable(
                format!("cannot read {}", path.display()),
                "no worksheets found",
            )
        })?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        Error::source_unavailable(format!("cannot read sheet {:?}", sheet_name), e)
    })?;

    let rows = range_to_rows(&range);
    info!(sheet = %sheet_name, rows = rows.len(), "parsed worksheet");
    Ok(rows)
}

/// Write records to a CSV file, header first
pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(record.to_columns())?;
    }

    writer.flush()?;
    debug!(path = %path.display(), records = records.len(), "wrote CSV");
    Ok(())
}
