use super::*;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

#[test]
fn relative_offsets() {
    assert_eq!(parse_send_time("in 10m", now()), Ok(at(2026, 3, 14, 12, 10)));
    assert_eq!(parse_send_time("2h", now()), Ok(at(2026, 3, 14, 14, 0)));
    assert_eq!(parse_send_time("1 day", now()), Ok(at(2026, 3, 15, 12, 0)));
    assert_eq!(
        parse_send_time("30s", now()),
        Ok(now() + TimeDelta::try_seconds(30).unwrap())
    );
}

#[test]
fn clock_time_rolls_to_tomorrow_once_passed() {
    assert_eq!(parse_send_time("17:30", now()), Ok(at(2026, 3, 14, 17, 30)));
    assert_eq!(parse_send_time("09:00", now()), Ok(at(2026, 3, 15, 9, 0)));
    assert_eq!(parse_send_time("12:00", now()), Ok(at(2026, 3, 15, 12, 0)));
}

#[test]
fn absolute_must_be_in_the_future() {
    assert_eq!(
        parse_send_time("2026-04-01 08:15", now()),
        Ok(at(2026, 4, 1, 8, 15))
    );
    assert!(parse_send_time("2020-01-01 08:15", now()).is_err());
}

#[test]
fn garbage_is_rejected() {
    for input in ["", "soon", "0m", "in", "25:99", "2026-13-01 10:00"] {
        assert_eq!(
            parse_send_time(input, now()),
            Err(ValidationError::InvalidTime {
                input: input.to_string()
            }),
            "input: {input:?}"
        );
    }
}
