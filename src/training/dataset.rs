//! Labelled transaction CSV files.
//!
//! The header row must contain `Description` and `Category` columns (matched
//! case-insensitively, surrounding whitespace ignored). Other columns are
//! ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::{AngelError, Result};

/// One training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub description: String,
    pub category: String,
}

impl LabeledRow {
    pub fn new<D: Into<String>, C: Into<String>>(description: D, category: C) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

struct HeaderIndex {
    description: usize,
    category: usize,
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| AngelError::dataset(format!("unable to locate '{name}' column")))
}

fn parse_header_index(headers: &StringRecord) -> Result<HeaderIndex> {
    Ok(HeaderIndex {
        description: find_column(headers, "description")?,
        category: find_column(headers, "category")?,
    })
}

/// Read labelled rows from any CSV source.
pub fn read_labeled_csv<R: Read>(reader: R) -> Result<Vec<LabeledRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| AngelError::dataset(format!("unreadable header: {e}")))?
        .clone();
    let index = parse_header_index(&headers)?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| AngelError::dataset(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let field = |i: usize| {
            record
                .get(i)
                .ok_or_else(|| AngelError::dataset(format!("line {line}: missing column {i}")))
        };
        let description = field(index.description)?;
        let category = field(index.category)?.trim();

        if category.is_empty() {
            return Err(AngelError::dataset(format!("line {line}: blank category")));
        }
        if description.trim().is_empty() {
            log::warn!("line {line}: blank description");
        }

        rows.push(LabeledRow::new(description, category));
    }

    log::info!("read {} labelled rows", rows.len());
    Ok(rows)
}

/// Read labelled rows from a CSV file.
pub fn load_labeled_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LabeledRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        AngelError::dataset(format!("cannot open {}: {e}", path.display()))
    })?;
    read_labeled_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_relevant_columns() {
        let data = "Date,Description,Amount,Category\n\
                    2023-01-04,UPI/SWIGGY,450.00,Food\n\
                    2023-01-05,\"SALARY CREDIT - TCS\",95000.00,Salary\n";
        let rows = read_labeled_csv(data.as_bytes()).unwrap();
        assert_eq!(
            rows,
            vec![
                LabeledRow::new("UPI/SWIGGY", "Food"),
                LabeledRow::new("SALARY CREDIT - TCS", "Salary"),
            ]
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let data = " category , DESCRIPTION\nRent,HOUSE RENT\n";
        let rows = read_labeled_csv(data.as_bytes()).unwrap();
        assert_eq!(rows, vec![LabeledRow::new("HOUSE RENT", "Rent")]);
    }

    #[test]
    fn test_missing_column() {
        let err = read_labeled_csv("Description,Amount\nZARA,10\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_blank_category_names_line() {
        let data = "Description,Category\nZARA,Shopping\nMYNTRA, \n";
        let err = read_labeled_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AngelError::Dataset(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_labeled_csv(dir.path().join("none.csv")).is_err());
    }
}
