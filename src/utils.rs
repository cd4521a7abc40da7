use chrono::NaiveTime;
use uuid::Uuid;

use crate::prelude::*;

const SECONDS_PER_DAY: i64 = 86_400;

pub fn now() -> DateTime {
  Utc::now().naive_utc()
}

pub fn today() -> Date {
  Utc::now().date_naive()
}

pub fn format_date(date: Date) -> String {
  date.format("%d/%m/%Y").to_string()
}

/// Whole days until the start of `expires_on`, rounded up.
///
/// Zero means the license lapses today; negative means it already has.
pub fn days_remaining(expires_on: Date, now: DateTime) -> i64 {
  let seconds = (expires_on.and_time(NaiveTime::MIN) - now).num_seconds();
  -(-seconds).div_euclid(SECONDS_PER_DAY)
}

/// Calendar days between today and `expires_on`.
pub fn days_until(expires_on: Date, today: Date) -> i64 {
  (expires_on - today).num_days()
}

/// `LIC-<owner>-<millis>-<tag>`, owner `00000` for provisioned stock.
pub fn license_code(user_id: Option<i32>) -> String {
  let tag = Uuid::new_v4().simple().to_string();
  format!(
    "LIC-{:05}-{}-{}",
    user_id.unwrap_or(0),
    Utc::now().timestamp_millis(),
    tag[..4].to_uppercase()
  )
}

/// Trims the value and maps blank strings to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}

pub fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn at(date: Date, hour: u32) -> DateTime {
    date.and_hms_opt(hour, 0, 0).unwrap()
  }

  #[test]
  fn test_days_remaining_rounds_up() {
    let today = Date::from_ymd_opt(2026, 3, 1).unwrap();
    let expires = Date::from_ymd_opt(2026, 3, 31).unwrap();

    assert_eq!(days_remaining(expires, at(today, 0)), 30);
    assert_eq!(days_remaining(expires, at(today, 1)), 30);
    assert_eq!(days_remaining(expires, at(today, 23)), 30);
  }

  #[test]
  fn test_days_remaining_past_expiry() {
    let expires = Date::from_ymd_opt(2026, 3, 1).unwrap();

    assert_eq!(days_remaining(expires, at(expires, 0)), 0);
    assert_eq!(days_remaining(expires, at(expires, 1)), 0);

    let yesterday = Date::from_ymd_opt(2026, 2, 28).unwrap();
    assert_eq!(days_remaining(yesterday, at(expires, 1)), -1);
  }

  #[test]
  fn test_license_code_shape() {
    let code = license_code(Some(42));
    let parts: Vec<_> = code.split('-').collect();

    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], "LIC");
    assert_eq!(parts[1], "00042");
    assert!(parts[2].parse::<i64>().is_ok());
    assert_eq!(parts[3].len(), 4);

    assert!(license_code(None).starts_with("LIC-00000-"));
    assert_ne!(license_code(Some(1)), license_code(Some(1)));
  }

  #[test]
  fn test_non_blank() {
    assert_eq!(non_blank(Some("  dev-1 ")), Some("dev-1".into()));
    assert_eq!(non_blank(Some("   ")), None);
    assert_eq!(non_blank(None), None);
  }
}
