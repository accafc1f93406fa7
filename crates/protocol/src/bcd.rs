//! BCD time fields

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Render BCD bytes as their digit string (`[0x23, 0x04]` -> `"2304"`)
pub(crate) fn digits(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Parse the nibble pair at `i` as a two-digit decimal
fn pair(text: &[u8], i: usize) -> Option<u32> {
    let hi = (text[i] as char).to_digit(10)?;
    let lo = (text[i + 1] as char).to_digit(10)?;
    Some(hi * 10 + lo)
}

/// `YYMMDDHHMMSS`, years offset from 2000
pub(crate) fn date_time(bytes: &[u8; 6]) -> Option<NaiveDateTime> {
    let text = digits(bytes);
    let t = text.as_bytes();
    let date = NaiveDate::from_ymd_opt(2000 + pair(t, 0)? as i32, pair(t, 2)?, pair(t, 4)?)?;
    let time = NaiveTime::from_hms_opt(pair(t, 6)?, pair(t, 8)?, pair(t, 10)?)?;
    Some(date.and_time(time))
}

/// `HHMMSS` then four millisecond digits of which the last three count
pub(crate) fn time_of_day_millis(bytes: &[u8; 5]) -> Option<NaiveTime> {
    let text = digits(bytes);
    let t = text.as_bytes();
    let millis = text[7..10].parse::<u32>().ok()?;
    NaiveTime::from_hms_milli_opt(pair(t, 0)?, pair(t, 2)?, pair(t, 4)?, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_time() {
        let dt = date_time(&[0x22, 0x09, 0x30, 0x23, 0x39, 0x28]).unwrap();
        assert_eq!(dt.to_string(), "2022-09-30 23:39:28");
    }

    #[test]
    fn test_date_time_rejects_bad_month() {
        assert!(date_time(&[0x22, 0x13, 0x01, 0x00, 0x00, 0x00]).is_none());
    }

    #[test]
    fn test_date_time_rejects_hex_nibbles() {
        assert!(date_time(&[0x2A, 0x01, 0x01, 0x00, 0x00, 0x00]).is_none());
    }

    #[test]
    fn test_time_of_day_uses_last_three_millis_digits() {
        let t = time_of_day_millis(&[0x01, 0x02, 0x03, 0x04, 0x56]).unwrap();
        assert_eq!(t.to_string(), "01:02:03.456");

        let t = time_of_day_millis(&[0x14, 0x33, 0x27, 0x05, 0x00]).unwrap();
        assert_eq!(t.to_string(), "14:33:27.500");
    }
}
