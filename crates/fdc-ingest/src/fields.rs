//! Column value helpers shared by the row decoders
//!
//! Bad values never fail a row: optional numbers fall back to zero, and only
//! the field a decoder cannot do without turns the row into a skip.

use csv_async::StringRecord;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::tabular::column;

/// Trimmed column text as an owned string
pub(crate) fn text(row: &StringRecord, index: usize) -> String {
    column(row, index).to_string()
}

/// Column text, `None` when blank
pub(crate) fn optional_text(row: &StringRecord, index: usize) -> Option<String> {
    let value = column(row, index);
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a numeric column, substituting zero when it is blank or malformed
pub(crate) fn number_or_zero<T>(
    row: &StringRecord,
    index: usize,
    field: &'static str,
    fdc_id: &str,
) -> T
where
    T: FromStr + Default,
{
    let raw = column(row, index);
    if raw.is_empty() {
        debug!(fdc_id, field, "Blank value, using zero");
        return T::default();
    }
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(fdc_id, field, value = raw, "Unparsable value, using zero");
            T::default()
        },
    }
}

/// Parse a column the row cannot be used without
pub(crate) fn required_number<T: FromStr>(
    row: &StringRecord,
    index: usize,
    field: &'static str,
    fdc_id: &str,
) -> Option<T> {
    let raw = column(row, index);
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(fdc_id, field, value = raw, "Unparsable required value, skipping row");
            None
        },
    }
}

/// Parse a column whose absence is normal, `None` when blank or malformed
pub(crate) fn optional_number<T: FromStr>(row: &StringRecord, index: usize) -> Option<T> {
    column(row, index).parse().ok()
}
