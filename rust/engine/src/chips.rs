//! Chip amounts.
//!
//! Hand histories carry plain integers for play-money tables and `$`-prefixed
//! decimals once converted, so every amount is kept as a [`Decimal`] and
//! accounting stays exact regardless of the dialect.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{AmountError, LedgerError};

/// Chip amount as found in a hand history.
pub type Chips = Decimal;

/// Parses an amount token such as `1000`, `$12.50`, `-5` or `1,250`.
pub fn parse_amount(token: &str) -> Result<Chips, AmountError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AmountError::Empty);
    }
    let (negative, rest) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let rest = rest.strip_prefix('$').unwrap_or(rest);
    if rest.is_empty()
        || !rest.starts_with(|c: char| c.is_ascii_digit())
        || !rest.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return Err(AmountError::Invalid(token.to_string()));
    }
    let digits: String = rest.chars().filter(|c| *c != ',').collect();
    let value: Decimal = digits
        .parse()
        .map_err(|_| AmountError::Invalid(token.to_string()))?;
    Ok(if negative { -value } else { value })
}

/// `a + b`, or [`LedgerError::Overflow`] past the range of [`Decimal`].
pub fn add_chips(a: Chips, b: Chips) -> Result<Chips, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

pub fn sub_chips(a: Chips, b: Chips) -> Result<Chips, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}

/// Rounds to the nearest whole chip, halves away from zero.
pub fn round_chips(value: Decimal) -> Chips {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
