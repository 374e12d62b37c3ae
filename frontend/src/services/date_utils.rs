use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Current instant from the browser clock.
pub fn now_utc() -> DateTime<Utc> {
    let millis = js_sys::Date::now() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
}

pub fn now_unix_secs() -> i64 {
    now_utc().timestamp()
}

/// The browser's current UTC offset.
pub fn local_offset() -> FixedOffset {
    // getTimezoneOffset is minutes *behind* UTC
    let minutes = -(js_sys::Date::new_0().get_timezone_offset() as i32);
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

pub fn today() -> NaiveDate {
    now_utc().with_timezone(&local_offset()).date_naive()
}

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("January")
}

/// "January 15, 2025"
pub fn format_date(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{} {}, {}", month_name(date.month()), date.day(), date.year())
}

/// "Jan 15, 8:05 PM" in the given offset.
pub fn format_datetime_in(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%b %-d, %-I:%M %p").to_string()
}

pub fn format_datetime(at: DateTime<Utc>) -> String {
    format_datetime_in(at, local_offset())
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&local_offset()).format("%-I:%M %p").to_string()
}

/// Value for an `<input type="datetime-local">`.
pub fn to_datetime_local_in(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%Y-%m-%dT%H:%M").to_string()
}

pub fn to_datetime_local(at: DateTime<Utc>) -> String {
    to_datetime_local_in(at, local_offset())
}

/// Parse an `<input type="datetime-local">` value entered in `offset`.
pub fn parse_datetime_local_in(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
}

pub fn parse_datetime_local(raw: &str) -> Option<DateTime<Utc>> {
    parse_datetime_local_in(raw, local_offset())
}

/// Parse an `<input type="date">` value.
pub fn parse_date_input(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse an `<input type="time">` value, with or without seconds.
pub fn parse_time_input(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// "7:30 PM"
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

pub fn local_time_now() -> NaiveTime {
    now_utc().with_timezone(&local_offset()).time()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(format_date(date), "January 15, 2025");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "January");
    }

    #[wasm_bindgen_test]
    fn test_datetime_local_round_trip_respects_offset() {
        let at = Utc.with_ymd_and_hms(2025, 6, 27, 18, 30, 0).unwrap();
        let raw = to_datetime_local_in(at, offset(-5));
        assert_eq!(raw, "2025-06-27T13:30");
        assert_eq!(parse_datetime_local_in(&raw, offset(-5)), Some(at));
        assert_eq!(parse_datetime_local_in("not a date", offset(0)), None);
    }

    #[wasm_bindgen_test]
    fn test_format_datetime() {
        let at = Utc.with_ymd_and_hms(2025, 6, 27, 20, 5, 0).unwrap();
        assert_eq!(format_datetime_in(at, offset(0)), "Jun 27, 8:05 PM");
    }

    #[wasm_bindgen_test]
    fn test_parse_date_input() {
        assert_eq!(
            parse_date_input("2025-02-03"),
            NaiveDate::from_ymd_opt(2025, 2, 3)
        );
        assert_eq!(parse_date_input("02/03/2025"), None);
    }

    #[wasm_bindgen_test]
    fn test_time_input() {
        let evening = NaiveTime::from_hms_opt(19, 30, 0);
        assert_eq!(parse_time_input("19:30"), evening);
        assert_eq!(parse_time_input("19:30:00"), evening);
        assert_eq!(parse_time_input("7.30pm"), None);
        assert_eq!(format_clock(NaiveTime::from_hms_opt(19, 30, 0).unwrap()), "7:30 PM");
    }

    #[wasm_bindgen_test]
    fn test_browser_clock_is_sane() {
        assert!(now_unix_secs() > 1_700_000_000);
    }
}
