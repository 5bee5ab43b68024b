//! ISO-8601 local date-time text, the column format of every timestamp.

use time::format_description::well_known::Iso8601;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::outcome::AppError;

macro_rules! full_precision {
    () => {
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]")
    };
}

pub fn encode(ts: PrimitiveDateTime) -> String {
    // Every component of the format is present on a PrimitiveDateTime.
    ts.format(full_precision!())
        .unwrap_or_else(|_| format!("{}T{}", ts.date(), ts.time()))
}

/// Accepts the full-precision form written by [`encode`] as well as any
/// other ISO-8601 local date-time (e.g. without fractional seconds).
pub fn decode(s: &str) -> Result<PrimitiveDateTime, AppError> {
    PrimitiveDateTime::parse(s, full_precision!())
        .or_else(|_| PrimitiveDateTime::parse(s, &Iso8601::DEFAULT))
        .map_err(|e| AppError::Decode(format!("invalid timestamp '{s}': {e}")))
}
