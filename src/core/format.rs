//! Value stringification
//!
//! Every cell goes through [`to_display_string`] (record fields) or
//! [`json_to_display_string`] (template results). Null becomes `""`,
//! date-times are formatted in the account timezone and locale, references show their
//! display name and other composite values are dropped to `""`.

use crate::definition::DEFAULT_DATETIME_FORMAT;
use crate::domain::{Account, FieldValue};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};

/// Display string of a record field value
///
/// `format` is a strftime pattern; an invalid pattern falls back to
/// [`DEFAULT_DATETIME_FORMAT`].
pub fn to_display_string(value: &FieldValue, format: &str, account: &Account) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Integer(i) => i.to_string(),
        FieldValue::Float(f) => f.to_string(),
        FieldValue::Text(s) => s.clone(),
        FieldValue::DateTime(dt) => format_datetime(dt, format, account),
        FieldValue::User(user) => user.to_string(),
        FieldValue::Container(container) => container.to_string(),
        FieldValue::Notes(_) | FieldValue::Structured(_) => String::new(),
    }
}

/// Display string of one value of a template result
pub fn json_to_display_string(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
    }
}

/// Formats `dt` in the account timezone, month and day names in its locale
pub fn format_datetime(dt: &DateTime<FixedOffset>, format: &str, account: &Account) -> String {
    let local = account.timezone.localize(dt);
    let locale = account.chrono_locale();
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        tracing::debug!(format, "Invalid date-time format, using default");
        return local.format_localized(DEFAULT_DATETIME_FORMAT, locale).to_string();
    }
    local.format_localized(format, locale).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountTimezone, ContainerRef, Note, UserRef};
    use chrono::TimeZone;
    use test_case::test_case;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn account() -> Account {
        Account::new("acc", "Exporter")
    }

    #[test_case(FieldValue::Null, "" ; "null")]
    #[test_case(FieldValue::Bool(true), "true" ; "bool")]
    #[test_case(FieldValue::Integer(-7), "-7" ; "integer")]
    #[test_case(FieldValue::Float(2.5), "2.5" ; "float")]
    #[test_case(FieldValue::from("Alice"), "Alice" ; "text")]
    #[test_case(FieldValue::Notes(vec![]), "" ; "notes are dropped")]
    #[test_case(FieldValue::Structured(serde_json::json!({"a": 1})), "" ; "structured is dropped")]
    fn test_primitive_display(value: FieldValue, expected: &str) {
        assert_eq!(to_display_string(&value, DEFAULT_DATETIME_FORMAT, &account()), expected);
    }

    #[test]
    fn test_references_use_display_name() {
        let user = FieldValue::User(UserRef {
            id: "u1".to_string(),
            display_name: "Alice Admin".to_string(),
            email: None,
        });
        let container = FieldValue::Container(ContainerRef {
            id: "c1".to_string(),
            name: "Internal Contacts".to_string(),
            account_grants: vec![],
        });
        assert_eq!(to_display_string(&user, "", &account()), "Alice Admin");
        assert_eq!(to_display_string(&container, "", &account()), "Internal Contacts");

        let notes = FieldValue::Notes(vec![Note {
            note_type: "note".to_string(),
            note: "hidden".to_string(),
            created_by: None,
            creation_time: None,
        }]);
        assert_eq!(to_display_string(&notes, "", &account()), "");
    }

    #[test]
    fn test_datetime_in_account_timezone() {
        let dt = utc().with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let berlin = account().with_timezone(FixedOffset::east_opt(3600).unwrap());
        let value = FieldValue::DateTime(dt);

        assert_eq!(
            to_display_string(&value, DEFAULT_DATETIME_FORMAT, &berlin),
            "2024-03-02 00:30:00"
        );
        assert_eq!(to_display_string(&value, "%d.%m.%Y", &account()), "01.03.2024");
        // deterministic for a fixed format and timezone
        assert_eq!(
            to_display_string(&value, "%d.%m.%Y %H:%M", &berlin),
            to_display_string(&value, "%d.%m.%Y %H:%M", &berlin)
        );
    }

    #[test]
    fn test_named_timezone_across_dst() {
        let berlin = account().with_timezone(AccountTimezone::parse("Europe/Berlin").unwrap());
        let winter = utc().with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let summer = utc().with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(format_datetime(&winter, "%H:%M %:z", &berlin), "13:00 +01:00");
        assert_eq!(format_datetime(&summer, "%H:%M %:z", &berlin), "14:00 +02:00");
    }

    #[test]
    fn test_locale_names_months_and_days() {
        let dt = utc().with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let german = account().with_locale("de_DE");

        assert_eq!(format_datetime(&dt, "%A, %d. %B %Y", &german), "Freitag, 01. März 2024");
        assert_eq!(format_datetime(&dt, "%A, %d. %B %Y", &account()), "Friday, 01. March 2024");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let dt = utc().with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(format_datetime(&dt, "%Q", &account()), "2024-03-01 08:00:00");
    }

    #[test]
    fn test_json_display() {
        assert_eq!(json_to_display_string(&serde_json::json!(null)), "");
        assert_eq!(json_to_display_string(&serde_json::json!("42")), "42");
        assert_eq!(json_to_display_string(&serde_json::json!(42)), "42");
        assert_eq!(json_to_display_string(&serde_json::json!([1])), "");
        assert_eq!(json_to_display_string(&serde_json::json!({"a": 1})), "");
    }
}
