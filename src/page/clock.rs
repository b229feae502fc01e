//! Pacific time readout.
//!
//! The browser hands us UTC milliseconds; the US daylight saving rule is
//! applied here so the page does not depend on the host's locale data.

/// Milliseconds between silent refreshes.
pub const REFRESH_MS: i32 = 60_000;
/// Delay before the initial scramble starts.
pub const SCRAMBLE_DELAY_MS: i32 = 30;
pub const ZONE_LABEL: &str = "PST";

const SECS_PER_DAY: i64 = 86_400;

/// `HH:MM PST` for a UTC timestamp.
pub fn display(utc_ms: f64) -> String {
    let (hour, minute) = pacific_time(utc_ms);
    format!("{:02}:{:02} {}", hour, minute, ZONE_LABEL)
}

/// Wall-clock hour and minute in America/Los_Angeles.
pub fn pacific_time(utc_ms: f64) -> (u32, u32) {
    let secs = (utc_ms / 1000.0).floor() as i64;
    let offset_hours = if is_daylight_time(secs) { -7 } else { -8 };
    let local = (secs + offset_hours * 3600).rem_euclid(SECS_PER_DAY);
    ((local / 3600) as u32, ((local % 3600) / 60) as u32)
}

/// Daylight time runs from 02:00 local on the second Sunday of March to
/// 02:00 local on the first Sunday of November.
pub fn is_daylight_time(utc_secs: i64) -> bool {
    let (year, _, _) = civil_from_days(utc_secs.div_euclid(SECS_PER_DAY));
    let start = nth_sunday(year, 3, 2) * SECS_PER_DAY + 10 * 3600;
    let end = nth_sunday(year, 11, 1) * SECS_PER_DAY + 9 * 3600;
    (start..end).contains(&utc_secs)
}

/// Days since 1970-01-01 of the `n`th Sunday of `month`.
fn nth_sunday(year: i64, month: u32, n: i64) -> i64 {
    let first = days_from_civil(year, month, 1);
    let to_sunday = (7 - weekday(first)) % 7;
    first + to_sunday + 7 * (n - 1)
}

/// 0 = Sunday.
fn weekday(days: i64) -> i64 {
    (days + 4).rem_euclid(7)
}

fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(year: i64, month: u32, day: u32, hour: i64, minute: i64) -> f64 {
        ((days_from_civil(year, month, day) * SECS_PER_DAY + hour * 3600 + minute * 60) * 1000) as f64
    }

    #[test]
    fn civil_round_trip() {
        for days in [-1000, 0, 19_000, 20_000] {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days);
        }
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn winter_is_utc_minus_eight() {
        assert_eq!(display(utc(2024, 1, 15, 20, 30)), "12:30 PST");
    }

    #[test]
    fn summer_is_utc_minus_seven() {
        assert_eq!(pacific_time(utc(2024, 7, 4, 19, 5)), (12, 5));
    }

    #[test]
    fn dst_switches_at_two_local() {
        // 2024-03-10 is the second Sunday of March.
        assert_eq!(pacific_time(utc(2024, 3, 10, 9, 59)), (1, 59));
        assert_eq!(pacific_time(utc(2024, 3, 10, 10, 0)), (3, 0));
        // 2024-11-03 is the first Sunday of November.
        assert_eq!(pacific_time(utc(2024, 11, 3, 8, 59)), (1, 59));
        assert_eq!(pacific_time(utc(2024, 11, 3, 9, 0)), (1, 0));
    }

    #[test]
    fn wraps_to_previous_day() {
        assert_eq!(pacific_time(utc(2024, 1, 1, 3, 0)), (19, 0));
    }
}
