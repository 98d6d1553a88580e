//! Billing window and date source.

use chrono::{Local, Months, NaiveDate};

use crate::error::{RentalError, Result};

/// Source of "today" for the workflow.
pub trait Clock: Send + Sync {
    /// Current local date.
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always answers the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Dates of a one-month subscription bought on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingWindow {
    /// First day (`fecha_inicio`).
    pub start: NaiveDate,
    /// One calendar month later (`fecha_fin`).
    pub end: NaiveDate,
    /// Payment date (`fecha_pago`).
    pub payment_date: NaiveDate,
}

impl BillingWindow {
    /// Window starting and paid on `today`.
    ///
    /// The end keeps the day of month when the next month has it and clamps
    /// to that month's last day otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] if the end date is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rental_client::workflow::BillingWindow;
    ///
    /// let jan31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
    /// let window = BillingWindow::starting(jan31)?;
    /// assert_eq!(window.end, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    /// # Ok::<(), rental_client::error::RentalError>(())
    /// ```
    pub fn starting(today: NaiveDate) -> Result<Self> {
        let end = today
            .checked_add_months(Months::new(1))
            .ok_or_else(|| RentalError::Validation(format!("fecha fuera de rango: {today}")))?;
        Ok(Self { start: today, end, payment_date: today })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_day_next_month() {
        let window = BillingWindow::starting(date(2025, 3, 10)).unwrap();
        assert_eq!(window.start, date(2025, 3, 10));
        assert_eq!(window.end, date(2025, 4, 10));
        assert_eq!(window.payment_date, date(2025, 3, 10));
    }

    #[test]
    fn test_month_end_clamped() {
        assert_eq!(BillingWindow::starting(date(2025, 1, 31)).unwrap().end, date(2025, 2, 28));
        assert_eq!(BillingWindow::starting(date(2024, 1, 31)).unwrap().end, date(2024, 2, 29));
        assert_eq!(BillingWindow::starting(date(2025, 5, 31)).unwrap().end, date(2025, 6, 30));
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(BillingWindow::starting(date(2025, 12, 15)).unwrap().end, date(2026, 1, 15));
    }

    #[test]
    fn test_out_of_range() {
        assert!(BillingWindow::starting(NaiveDate::MAX).is_err());
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(date(2025, 3, 1)).today(), date(2025, 3, 1));
    }
}
