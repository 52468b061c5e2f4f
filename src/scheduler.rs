// src/scheduler.rs
//! Minimal five-field cron (`m h dom mon dow`, local time) and a tokio loop that runs a
//! job at each fire time.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDateTime, TimeZone, Timelike};
use std::fmt;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Eight days of minutes covers any weekly pattern.
const SEARCH_MINUTES: i64 = 8 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CronSchedule {
    minute: Option<u32>,
    hour: Option<u32>,
    /// 0 = Sunday.
    weekday: Option<u32>,
}

fn parse_field(raw: &str, name: &str, max: u32) -> Result<Option<u32>> {
    if raw == "*" {
        return Ok(None);
    }
    let v: u32 = raw
        .parse()
        .with_context(|| format!("cron {name} `{raw}` is not a number or `*`"))?;
    if v > max {
        bail!("cron {name} {v} out of range 0..={max}");
    }
    Ok(Some(v))
}

impl CronSchedule {
    /// Numbers or `*` for minute, hour and day-of-week (0-7, 7 = Sunday);
    /// only `*` for day-of-month and month.
    pub fn parse(expr: &str) -> Result<Self> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [m, h, dom, mon, dow] = fields.as_slice() else {
            bail!("cron `{expr}`: expected 5 fields, got {}", fields.len());
        };
        if *dom != "*" || *mon != "*" {
            bail!("cron `{expr}`: day-of-month and month must be `*`");
        }
        Ok(Self {
            minute: parse_field(m, "minute", 59)?,
            hour: parse_field(h, "hour", 23)?,
            weekday: parse_field(dow, "day-of-week", 7)?.map(|d| d % 7),
        })
    }

    fn matches(&self, t: &NaiveDateTime) -> bool {
        self.minute.map_or(true, |m| t.minute() == m)
            && self.hour.map_or(true, |h| t.hour() == h)
            && self
                .weekday
                .map_or(true, |d| t.weekday().num_days_from_sunday() == d)
    }

    /// Next fire time strictly after `after`. Wall-clock times skipped by a DST jump
    /// never fire; repeated ones fire once.
    pub fn next_after(&self, after: DateTime<Local>) -> Option<DateTime<Local>> {
        let start = after
            .naive_local()
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))?;
        (1..=SEARCH_MINUTES)
            .map(|i| start + Duration::minutes(i))
            .filter(|t| self.matches(t))
            .find_map(|t| Local.from_local_datetime(&t).earliest())
            .filter(|t| *t > after)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u32>| v.map_or_else(|| "*".to_string(), |x| x.to_string());
        write!(
            f,
            "{} {} * * {}",
            show(self.minute),
            show(self.hour),
            show(self.weekday)
        )
    }
}

/// Run `job` at every fire time of `schedule`, forever.
pub fn spawn_cron<F, Fut>(name: &'static str, schedule: CronSchedule, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let now = Local::now();
            let Some(next) = schedule.next_after(now) else {
                warn!(target: "scheduler", job = name, %schedule, "no next fire time, stopping");
                return;
            };
            info!(target: "scheduler", job = name, next = %next.to_rfc3339(), "scheduled");
            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
            job().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unsupported_fields() {
        assert!(CronSchedule::parse("0 9 1 * *").is_err());
        assert!(CronSchedule::parse("0 9 * 6 *").is_err());
        assert!(CronSchedule::parse("*/5 * * * *").is_err());
        assert!(CronSchedule::parse("60 9 * * *").is_err());
        assert!(CronSchedule::parse("0 9 * *").is_err());
    }

    #[test]
    fn sunday_is_zero_or_seven() {
        assert_eq!(
            CronSchedule::parse("0 10 * * 7").unwrap(),
            CronSchedule::parse("0 10 * * 0").unwrap()
        );
        assert_eq!(CronSchedule::parse("0 10 * * 7").unwrap().to_string(), "0 10 * * 0");
    }
}
