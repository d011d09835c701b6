//! Shared output helpers.

use serde::Serialize;
use tally::{JsonError, TallyResult};

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> TallyResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Compact single-line JSON for `value`.
pub fn json_line<T: Serialize + ?Sized>(value: &T) -> TallyResult<String> {
    Ok(serde_json::to_string(value).map_err(|e| JsonError::new(e.to_string()))?)
}

/// Print `value` as one line of JSON on stdout.
pub fn print_json_line<T: Serialize + ?Sized>(value: &T) -> TallyResult<()> {
    println!("{}", json_line(value)?);
    Ok(())
}

/// Horizontal rule used between sections of human output.
pub fn rule() {
    println!("{:-<60}", "");
}
