//! Card form input.
//!
//! Card data is never sent to the rental API; it only gates the purchase.
//! The single rule is that all four fields are filled in.

use std::fmt;

use zeroize::Zeroize;

use crate::error::{CARD_INCOMPLETE_MESSAGE, RentalError, Result};

/// Card fields as typed by the user.
///
/// # Security
///
/// - `Debug` shows only the last four digits
/// - Number and CVV are zeroized on drop
///
/// # Examples
///
/// ```
/// use rental_client::workflow::CardDetails;
///
/// let card = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "123");
/// assert!(card.validate().is_ok());
/// assert_eq!(card.last_four(), "1111");
///
/// let blank_cvv = CardDetails::new("Ana López", "4111 1111 1111 1111", "12/27", "  ");
/// assert!(blank_cvv.validate().is_err());
/// ```
#[derive(Clone, Default)]
pub struct CardDetails {
    /// Cardholder name.
    pub holder: String,
    /// Card number.
    pub number: String,
    /// Expiry, free-form.
    pub expiry: String,
    /// Card verification value.
    pub cvv: String,
}

impl CardDetails {
    /// Collects the four card fields.
    #[must_use]
    pub fn new(
        holder: impl Into<String>,
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self { holder: holder.into(), number: number.into(), expiry: expiry.into(), cvv: cvv.into() }
    }

    /// Checks that no field is empty after trimming.
    ///
    /// No Luhn, expiry or length checks are made.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] with [`CARD_INCOMPLETE_MESSAGE`].
    pub fn validate(&self) -> Result<()> {
        let fields = [&self.holder, &self.number, &self.expiry, &self.cvv];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(RentalError::Validation(CARD_INCOMPLETE_MESSAGE.to_owned()));
        }
        Ok(())
    }

    /// Last four digits of the number, for display.
    #[must_use]
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("holder", &self.holder)
            .field("last_four", &self.last_four())
            .finish_non_exhaustive()
    }
}

impl Drop for CardDetails {
    fn drop(&mut self) {
        self.number.zeroize();
        self.cvv.zeroize();
        self.expiry.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_card_accepted_without_format_checks() {
        let card = CardDetails::new("x", "not-a-number", "whenever", "?");
        assert!(card.validate().is_ok());
    }

    #[test]
    fn test_each_blank_field_rejected() {
        let cases = [
            CardDetails::new(" ", "4111111111111111", "12/27", "123"),
            CardDetails::new("Ana", "", "12/27", "123"),
            CardDetails::new("Ana", "4111111111111111", "\t", "123"),
            CardDetails::new("Ana", "4111111111111111", "12/27", "   "),
        ];
        for card in &cases {
            match card.validate() {
                Err(RentalError::Validation(msg)) => assert_eq!(msg, CARD_INCOMPLETE_MESSAGE),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_debug_hides_number_and_cvv() {
        let card = CardDetails::new("Ana", "4111 1111 1111 1234", "12/27", "987");
        let debug = format!("{card:?}");
        assert!(debug.contains("1234"));
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("987"));
    }

    #[test]
    fn test_last_four_short_number() {
        assert_eq!(CardDetails::new("a", "12", "b", "c").last_four(), "12");
    }
}
