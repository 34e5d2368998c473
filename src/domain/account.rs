//! The exporting account and installation branding
//!
//! Both are handed to every export session explicitly instead of being read
//! from process-wide state.

use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The account on whose behalf an export runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Timezone all date-times are normalized to
    #[serde(skip)]
    pub timezone: AccountTimezone,
    /// Locale tag, e.g. `en_US`
    pub locale: String,
}

impl Account {
    /// Creates an account in UTC with the `en_US` locale
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            timezone: AccountTimezone::Fixed(utc()),
            locale: "en_US".to_string(),
        }
    }

    /// Sets the timezone
    pub fn with_timezone(mut self, timezone: impl Into<AccountTimezone>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Sets the locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Locale used for month and day names; unknown tags format as POSIX
    pub fn chrono_locale(&self) -> Locale {
        parse_locale(&self.locale).unwrap_or(Locale::POSIX)
    }
}

/// Timezone of an account: a fixed UTC offset or an IANA zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountTimezone {
    /// Constant offset such as `+02:00`
    Fixed(FixedOffset),
    /// Named zone such as `Europe/Berlin`, offset follows daylight saving time
    Named(Tz),
}

impl AccountTimezone {
    /// Parses a UTC offset (`+02:00`, `UTC`) or an IANA zone name
    pub fn parse(value: &str) -> Result<Self, String> {
        if let Ok(offset) = parse_utc_offset(value) {
            return Ok(AccountTimezone::Fixed(offset));
        }
        value
            .trim()
            .parse::<Tz>()
            .map(AccountTimezone::Named)
            .map_err(|_| format!("Unknown timezone '{value}': expected +HH:MM or an IANA name"))
    }

    /// Moves `dt` into this timezone, keeping the instant
    pub fn localize(&self, dt: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            AccountTimezone::Fixed(offset) => dt.with_timezone(offset),
            AccountTimezone::Named(tz) => dt.with_timezone(tz).fixed_offset(),
        }
    }

    /// Current time in this timezone
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(&Utc::now().fixed_offset())
    }
}

impl Default for AccountTimezone {
    fn default() -> Self {
        AccountTimezone::Fixed(utc())
    }
}

impl From<FixedOffset> for AccountTimezone {
    fn from(offset: FixedOffset) -> Self {
        AccountTimezone::Fixed(offset)
    }
}

impl From<Tz> for AccountTimezone {
    fn from(tz: Tz) -> Self {
        AccountTimezone::Named(tz)
    }
}

impl fmt::Display for AccountTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountTimezone::Fixed(offset) => write!(f, "{offset}"),
            AccountTimezone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Parses a locale tag such as `de_DE` or `de-DE`
pub fn parse_locale(value: &str) -> Result<Locale, String> {
    let tag = value.trim().replace('-', "_");
    Locale::try_from(tag.as_str()).map_err(|_| format!("Unknown locale '{value}'"))
}

/// Installation branding exposed to templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Logo URL or path
    #[serde(default)]
    pub logo: Option<String>,
    /// Product title
    #[serde(default)]
    pub title: Option<String>,
    /// Product description
    #[serde(default)]
    pub description: Option<String>,
    /// Public web URL
    #[serde(default)]
    pub weburl: Option<String>,
}

/// Parses a UTC offset such as `+02:00`, `-0530`, `Z` or `UTC`
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
        return Ok(utc());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(format!("Invalid UTC offset '{value}': expected +HH:MM")),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Invalid UTC offset '{value}': expected +HH:MM"));
    }
    let hours: i32 = digits[..2].parse().map_err(|_| format!("Invalid hours in '{value}'"))?;
    let minutes: i32 = digits[2..]
        .parse()
        .map_err(|_| format!("Invalid minutes in '{value}'"))?;
    if minutes >= 60 {
        return Err(format!("Invalid minutes in '{value}'"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("UTC offset out of range: '{value}'"))
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("+02:00", 7200 ; "colon form")]
    #[test_case("-0530", -19800 ; "compact negative")]
    #[test_case("UTC", 0 ; "utc keyword")]
    #[test_case("Z", 0 ; "zulu")]
    fn test_parse_utc_offset_valid(input: &str, seconds: i32) {
        assert_eq!(parse_utc_offset(input).unwrap().local_minus_utc(), seconds);
    }

    #[test_case("02:00" ; "missing sign")]
    #[test_case("+2" ; "too short")]
    #[test_case("+02:75" ; "bad minutes")]
    #[test_case("+25:00" ; "out of range")]
    fn test_parse_utc_offset_invalid(input: &str) {
        assert!(parse_utc_offset(input).is_err());
    }

    #[test]
    fn test_account_builder() {
        let plus1 = FixedOffset::east_opt(3600).unwrap();
        let account = Account::new("u1", "Alice")
            .with_timezone(plus1)
            .with_locale("de_DE");
        assert_eq!(account.timezone, AccountTimezone::Fixed(plus1));
        assert_eq!(account.chrono_locale(), Locale::de_DE);
        assert_eq!(Account::new("u2", "Bob").with_locale("xx").chrono_locale(), Locale::POSIX);
    }

    #[test_case("+02:00", "+02:00" ; "offset")]
    #[test_case("Europe/Berlin", "Europe/Berlin" ; "iana name")]
    #[test_case("UTC", "+00:00" ; "utc keyword")]
    fn test_parse_timezone(input: &str, display: &str) {
        assert_eq!(AccountTimezone::parse(input).unwrap().to_string(), display);
    }

    #[test]
    fn test_parse_timezone_invalid() {
        assert!(AccountTimezone::parse("Mars/Olympus").is_err());
    }

    #[test]
    fn test_named_zone_follows_daylight_saving() {
        use chrono::TimeZone;
        let berlin = AccountTimezone::parse("Europe/Berlin").unwrap();

        // clocks go forward at 01:00 UTC on 2024-03-31
        let before = utc().with_ymd_and_hms(2024, 3, 31, 0, 30, 0).unwrap();
        let after = utc().with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap();

        assert_eq!(berlin.localize(&before).to_rfc3339(), "2024-03-31T01:30:00+01:00");
        assert_eq!(berlin.localize(&after).to_rfc3339(), "2024-03-31T03:30:00+02:00");
    }

    #[test_case("de_DE", Locale::de_DE ; "underscore")]
    #[test_case("fr-FR", Locale::fr_FR ; "dash")]
    fn test_parse_locale(input: &str, expected: Locale) {
        assert_eq!(parse_locale(input).unwrap(), expected);
    }
}
