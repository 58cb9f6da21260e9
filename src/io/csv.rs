use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

use crate::column::{BooleanColumn, Column, Float64Column, Int64Column, StringColumn};
use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Read a CSV file into a [`Dataset`], inferring one storage type per column
///
/// A path that does not resolve to a readable file is reported as
/// [`Error::DataAccess`]; a readable file that is not a well-formed table is
/// reported as [`Error::Csv`], [`Error::InconsistentRowCount`] or
/// [`Error::EmptyData`].
pub fn read_csv<P: AsRef<Path>>(path: P, has_header: bool) -> Result<Dataset> {
    let path = path.as_ref();
    let data_access = |reason: String| Error::DataAccess {
        path: path.display().to_string(),
        reason,
    };

    if path.is_dir() {
        return Err(data_access("path is a directory".to_string()));
    }

    let file = File::open(path).map_err(|e| data_access(e.to_string()))?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(has_header)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| {
            if e.is_io_error() {
                data_access(e.to_string())
            } else {
                Error::Csv(e)
            }
        })?;
        records.push(record);
    }

    let headers: Vec<String> = if has_header {
        rdr.headers()
            .map_err(Error::Csv)?
            .iter()
            .map(|h| h.to_string())
            .collect()
    } else {
        let width = records.first().map(StringRecord::len).unwrap_or(0);
        (0..width).map(|i| format!("column_{}", i)).collect()
    };

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(Error::EmptyData(format!("{} has no columns", path.display())));
    }

    if records.is_empty() {
        return Err(Error::EmptyData(format!("{} has no data rows", path.display())));
    }

    let mut dataset = Dataset::new();
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<&str> = records
            .iter()
            .map(|record| record.get(col_idx).unwrap_or(""))
            .collect();
        dataset.add_column(header.clone(), infer_column(&cells))?;
    }

    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        path.display()
    );

    Ok(dataset)
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || matches!(cell, "NA" | "NaN" | "nan" | "null" | "NULL")
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick the narrowest storage type that every non-missing cell parses as:
/// int64, then float64, then bool, falling back to text
fn infer_column(cells: &[&str]) -> Column {
    let nulls: Vec<bool> = cells.iter().map(|c| is_missing(c)).collect();
    let present = || cells.iter().zip(&nulls).filter(|(_, &n)| !n).map(|(c, _)| *c);

    if present().all(|c| c.parse::<i64>().is_ok()) && present().next().is_some() {
        let data = cells.iter().map(|c| c.parse::<i64>().unwrap_or(0)).collect();
        return Int64Column::with_nulls(data, nulls).into();
    }

    if present().all(|c| c.parse::<f64>().is_ok()) && present().next().is_some() {
        let data = cells
            .iter()
            .map(|c| c.parse::<f64>().unwrap_or(f64::NAN))
            .collect();
        return Float64Column::with_nulls(data, nulls).into();
    }

    if present().all(|c| parse_bool(c).is_some()) && present().next().is_some() {
        let data = cells.iter().map(|c| parse_bool(c).unwrap_or(false)).collect();
        return BooleanColumn::with_nulls(data, nulls).into();
    }

    let data = cells
        .iter()
        .zip(&nulls)
        .map(|(c, &n)| if n { String::new() } else { c.to_string() })
        .collect();
    StringColumn::with_nulls(data, nulls).into()
}
