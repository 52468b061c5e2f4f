use chrono::{Datelike, Local, TimeZone, Timelike, Weekday};

use tech_news_digest::scheduler::CronSchedule;

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
}

#[test]
fn daily_fires_later_today_or_tomorrow() {
    let daily = CronSchedule::parse("0 9 * * *").unwrap();

    let next = daily.next_after(local(2025, 6, 10, 7, 30)).unwrap();
    assert_eq!((next.day(), next.hour(), next.minute()), (10, 9, 0));

    let next = daily.next_after(local(2025, 6, 10, 9, 0)).unwrap();
    assert_eq!((next.day(), next.hour(), next.minute()), (11, 9, 0), "strictly after");

    let next = daily.next_after(local(2025, 6, 10, 9, 0) + chrono::Duration::seconds(30)).unwrap();
    assert_eq!(next.day(), 11);
}

#[test]
fn weekly_fires_on_sunday() {
    let weekly = CronSchedule::parse("0 10 * * 0").unwrap();
    // 2025-06-10 is a Tuesday.
    let next = weekly.next_after(local(2025, 6, 10, 12, 0)).unwrap();
    assert_eq!(next.weekday(), Weekday::Sun);
    assert_eq!((next.month(), next.day(), next.hour()), (6, 15, 10));
}

#[test]
fn wildcards_fire_every_minute() {
    let every = CronSchedule::parse("* * * * *").unwrap();
    let t = local(2025, 6, 10, 23, 59);
    let next = every.next_after(t).unwrap();
    assert_eq!((next.day(), next.hour(), next.minute()), (11, 0, 0));
}

#[test]
fn hourly_at_quarter_past() {
    let s = CronSchedule::parse("15 * * * *").unwrap();
    let next = s.next_after(local(2025, 6, 10, 12, 20)).unwrap();
    assert_eq!((next.hour(), next.minute()), (13, 15));
}

#[test]
fn malformed_expressions_are_errors() {
    for bad in ["", "0 9 * * * *", "a 9 * * *", "0 24 * * *", "0 9 * * 8", "0 9 L * *"] {
        assert!(CronSchedule::parse(bad).is_err(), "`{bad}` should not parse");
    }
}
