//! Date helpers for API fields.
//!
//! Date columns come back as `YYYY-MM-DD`, as `YYYY-MM-DD HH:MM:SS`, or as an
//! RFC 3339 timestamp depending on the endpoint. These serde adapters read all
//! three and always write `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Wire format for date-only fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date from any of the formats the API produces.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rental_client::models::dates::parse_api_date;
///
/// let expected = NaiveDate::from_ymd_opt(2025, 4, 10);
/// assert_eq!(parse_api_date("2025-04-10"), expected);
/// assert_eq!(parse_api_date("2025-04-10 08:30:00"), expected);
/// assert_eq!(parse_api_date("2025-04-10T08:30:00.000000Z"), expected);
/// assert_eq!(parse_api_date("10/04/2025"), None);
/// ```
#[must_use]
pub fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

/// Serde adapter for required date fields.
pub mod date {
    use super::{DATE_FORMAT, Deserialize, Deserializer, NaiveDate, Serializer, parse_api_date};

    /// Writes the date as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    /// Reads a date in any API format.
    ///
    /// # Errors
    ///
    /// Fails when the value is not a string or not a recognised date.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_api_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}")))
    }
}

/// Serde adapter for nullable date fields.
pub mod option_date {
    use super::{DATE_FORMAT, Deserialize, Deserializer, NaiveDate, Serializer, parse_api_date};

    /// Writes the date as `YYYY-MM-DD`, or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Reads an optional date; empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Fails when a non-empty value is not a recognised date.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_api_date(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(with = "date")]
        day: NaiveDate,
        #[serde(default, with = "option_date")]
        maybe: Option<NaiveDate>,
    }

    #[test]
    fn test_date_round_trip_writes_plain_format() {
        let row: Row = serde_json::from_str(r#"{"day":"2025-01-31 10:00:00","maybe":""}"#).unwrap();
        assert_eq!(row.day, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert!(row.maybe.is_none());

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"day":"2025-01-31","maybe":null}"#);
    }

    #[test]
    fn test_missing_optional_date_defaults_to_none() {
        let row: Row = serde_json::from_str(r#"{"day":"2025-02-01"}"#).unwrap();
        assert!(row.maybe.is_none());
    }

    #[test]
    fn test_unrecognised_date_rejected() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"day":"31/01/2025"}"#);
        assert!(result.is_err());
    }
}
