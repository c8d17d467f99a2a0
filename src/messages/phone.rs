//! Recipient phone number normalization.

use crate::error::{Error, Result};

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Reduces a phone number to its digits and checks the digit count.
///
/// Formatting characters (`+`, spaces, dashes, parentheses) are dropped,
/// so `"+1 (234) 567-8900"` becomes `"12345678900"`.
///
/// # Errors
///
/// Returns [`Error::Validation`] on field `to` unless the input holds
/// between 7 and 15 digits inclusive.
pub fn normalize_phone_number(input: &str) -> Result<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        Ok(digits)
    } else {
        Err(Error::validation(
            "to",
            format!(
                "phone number must contain {MIN_DIGITS} to {MAX_DIGITS} digits, got {} in {input:?}",
                digits.len()
            ),
        ))
    }
}
