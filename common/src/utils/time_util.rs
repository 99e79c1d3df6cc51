use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::error::AppError;
use crate::models::time_range::TimeRange;

/// 时钟抽象，服务取当前时间统一走这里，便于测试注入固定时间
pub trait Clock: Send + Sync {
    /// 当前 Unix 秒
    fn now_ts(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ts(&self) -> i64 {
        Local::now().timestamp()
    }
}

/// 固定时钟（测试用），可手动推进
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(ts: i64) -> Self {
        Self { now: AtomicI64::new(ts) }
    }

    /// 推进指定秒数
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, ts: i64) {
        self.now.store(ts, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ts(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// 相对时间窗口（按自然日/自然周对齐）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeWindow {
    /// 今天 0 点至当前时刻
    Today,
    /// 本周一 0 点至当前时刻
    Week,
}

impl FromStr for RelativeWindow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(RelativeWindow::Today),
            "week" => Ok(RelativeWindow::Week),
            other => Err(AppError::invalid_window(other)),
        }
    }
}

/// Unix 秒转本地时间
pub fn ts_to_local(ts: i64) -> DateTime<Local> {
    DateTime::from_timestamp(ts, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&Local)
}

/// 本地日期 0 点对应的 Unix 秒
///
/// 夏令时跳变导致 0 点不存在或出现两次时，取可解析的最早时刻。
pub fn day_start_ts(date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => Utc.from_utc_datetime(&naive).timestamp(),
    }
}

/// 把相对窗口按当前时刻展开成闭区间 [起点, now]
pub fn resolve_window(window: RelativeWindow, now_ts: i64) -> TimeRange {
    let today = ts_to_local(now_ts).date_naive();
    let start_date = match window {
        RelativeWindow::Today => today,
        RelativeWindow::Week => today.week(Weekday::Mon).first_day(),
    };
    TimeRange { start: day_start_ts(start_date), end: now_ts }
}

/// Unix 秒格式化为 yyyy-MM-dd
pub fn date_str(ts: i64) -> String {
    ts_to_local(ts).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_str() {
        assert_eq!("today".parse::<RelativeWindow>().ok(), Some(RelativeWindow::Today));
        assert_eq!("week".parse::<RelativeWindow>().ok(), Some(RelativeWindow::Week));
        assert!(matches!(
            "month".parse::<RelativeWindow>(),
            Err(AppError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_resolve_window_today() {
        let now_ts = 1_700_000_000;
        let range = resolve_window(RelativeWindow::Today, now_ts);
        assert_eq!(range.end, now_ts);
        assert!(range.start <= now_ts);
        let start = ts_to_local(range.start);
        assert_eq!(start.time(), NaiveTime::MIN);
        assert_eq!(start.date_naive(), ts_to_local(now_ts).date_naive());
    }

    #[test]
    fn test_resolve_window_week_starts_monday() {
        let now_ts = 1_700_000_000;
        let range = resolve_window(RelativeWindow::Week, now_ts);
        assert_eq!(ts_to_local(range.start).weekday(), Weekday::Mon);
        assert!(range.start <= range.end);
        // 周窗口起点不晚于当天 0 点
        let today_range = resolve_window(RelativeWindow::Today, now_ts);
        assert!(range.start <= today_range.start);
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.now_ts(), 100);
        clock.advance(60);
        assert_eq!(clock.now_ts(), 160);
        clock.set(30);
        assert_eq!(clock.now_ts(), 30);
    }

    #[test]
    fn test_date_str() {
        // 1970-01-01 00:00:00 UTC，本地时区偏移不超过一天
        let s = date_str(86_400);
        assert!(s == "1970-01-02" || s == "1970-01-01");
    }
}
