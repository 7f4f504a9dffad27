//! Plain-text formatting of chip amounts and report columns.
//!
//! ## Example
//!
//! ```rust
//! use potledger_cli::formatters::{format_chips, format_percent, right_align};
//! use rust_decimal::Decimal;
//!
//! assert_eq!(format_chips(Decimal::new(1250, 2)), "12.5");
//! assert_eq!(format_percent(Some(67)), "67%");
//! assert_eq!(right_align("-10", 6), "   -10");
//! ```

use potledger_engine::chips::Chips;

/// Width of numeric columns.
pub const COLUMN_WIDTH: usize = 8;

/// Chip amount without trailing fractional zeros.
pub fn format_chips(value: Chips) -> String {
    value.normalize().to_string()
}

/// Chip amount with an explicit sign for positive values.
pub fn format_signed(value: Chips) -> String {
    if value.is_sign_positive() && !value.is_zero() {
        format!("+{}", format_chips(value))
    } else {
        format_chips(value)
    }
}

/// Time between two hands, as `5m00s`, or `1h02m` past an hour.
pub fn format_gap(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let s = seconds.unsigned_abs();
    if s >= 3600 {
        format!("{}{}h{:02}m", sign, s / 3600, s % 3600 / 60)
    } else {
        format!("{}{}m{:02}s", sign, s / 60, s % 60)
    }
}

/// Percentage, or `-` when the ratio is undefined.
pub fn format_percent(value: Option<u32>) -> String {
    match value {
        Some(p) => format!("{}%", p),
        None => "-".to_string(),
    }
}

pub fn right_align(text: &str, width: usize) -> String {
    format!("{:>width$}", text, width = width)
}

pub fn left_align(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

/// Width of the name column: the longest name, never narrower than the header.
pub fn name_width<'a>(names: impl IntoIterator<Item = &'a str>, header: &str) -> usize {
    names
        .into_iter()
        .map(|n| n.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

/// A row of right-aligned chip columns.
pub fn chip_columns(values: &[Chips]) -> String {
    values
        .iter()
        .map(|v| right_align(&format_chips(*v), COLUMN_WIDTH))
        .collect()
}
