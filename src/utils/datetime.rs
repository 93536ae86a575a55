use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// 標記：依 RFC 3339 (含時區) 解析，換算為當地時間後去除時區
pub const RFC3339: &str = "rfc3339";

/// 依序嘗試每一種格式，全部失敗時回傳 `None`。
///
/// 格式可以是完整的日期時間，也可以只有日期 (視為當天 00:00)。
pub fn parse_timestamp(raw: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in formats {
        if *format == RFC3339 {
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Some(dt.with_timezone(&Local).naive_local());
            }
            continue;
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }

        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// 解析失敗時以「現在」代替，寧可時間不精確也不丟掉狀態紀錄
pub fn timestamp_or_now(courier: &str, raw: Option<&str>, formats: &[&str]) -> NaiveDateTime {
    match raw.and_then(|value| parse_timestamp(value, formats)) {
        Some(dt) => dt,
        None => {
            tracing::debug!(
                "{}: could not parse timestamp {:?}, falling back to now",
                courier,
                raw
            );
            Local::now().naive_local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_primary_format_wins() {
        let dt = parse_timestamp("05-03-2024 14:20", &["%d-%m-%Y %H:%M", "%d-%m-%Y"]).unwrap();
        assert_eq!((dt.day(), dt.month(), dt.year()), (5, 3, 2024));
        assert_eq!((dt.hour(), dt.minute()), (14, 20));
    }

    #[test]
    fn test_falls_back_to_date_only_format() {
        let dt = parse_timestamp("05/03/2024", &["%d/%m/%Y %H:%M", "%d/%m/%Y"]).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (0, 0));
        assert_eq!(dt.day(), 5);
    }

    #[test]
    fn test_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-03-05T14:20:00+02:00", &[RFC3339]);
        assert!(dt.is_some());
    }

    #[test]
    fn test_unparsable_returns_none() {
        assert!(parse_timestamp("yesterday", &["%d-%m-%Y %H:%M"]).is_none());
        assert!(parse_timestamp("   ", &["%d-%m-%Y %H:%M"]).is_none());
    }

    #[test]
    fn test_timestamp_or_now_uses_current_time() {
        let before = Local::now().naive_local();
        let dt = timestamp_or_now("ELTA", Some("not a date"), &["%d-%m-%Y %H:%M"]);
        let after = Local::now().naive_local();
        assert!(dt >= before && dt <= after);

        let missing = timestamp_or_now("ACS", None, &[RFC3339]);
        assert!(missing >= before);
    }
}
