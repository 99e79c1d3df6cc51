use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use common::error::{AppError, AppResult};
use common::models::time_range::TimeRange;
use common::utils::time_util::{resolve_window, Clock, RelativeWindow};
use orm::store::{RecordStore, TimeField};

use super::bounded;

/// 统计窗口：命名窗口按当前时刻展开，显式区间原样使用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
    Named(RelativeWindow),
    Explicit(TimeRange),
}

impl WindowSpec {
    /// 从请求参数构造，显式区间优先于窗口名
    pub fn from_req(window: Option<&str>, start: Option<i64>, end: Option<i64>) -> AppResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            return Ok(WindowSpec::Explicit(TimeRange::new(start, end)));
        }
        match window {
            Some(name) => Ok(WindowSpec::Named(name.parse()?)),
            None => Err(AppError::invalid_window("缺少时间窗口")),
        }
    }

    /// 展开成闭区间，显式区间先校验起止顺序
    pub fn resolve(&self, now_ts: i64) -> AppResult<TimeRange> {
        match self {
            WindowSpec::Named(named) => Ok(resolve_window(*named, now_ts)),
            WindowSpec::Explicit(range) => {
                range.validate()?;
                Ok(*range)
            }
        }
    }
}

/// 活跃口径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    /// 访问，按最后访问时间
    Visit,
    /// 注册，按注册时间
    Registration,
}

impl ActivityKind {
    fn field(self) -> TimeField {
        match self {
            ActivityKind::Visit => TimeField::LastTime,
            ActivityKind::Registration => TimeField::AddTime,
        }
    }
}

/// 首页活跃概览
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub today_visits: i64,
    pub today_registrations: i64,
    pub week_visits: i64,
    pub week_registrations: i64,
}

/// 访问与注册统计
///
/// 命名窗口在每次调用时按注入的时钟重新展开，跨过零点后同一个
/// 窗口名自然落到新的区间上。
pub struct VisitStatService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    query_timeout: Duration,
}

impl VisitStatService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, query_timeout: Duration) -> Self {
        Self { store, clock, query_timeout }
    }

    /// 窗口内的活跃人数
    pub async fn count_in_window(&self, window: &WindowSpec, kind: ActivityKind) -> AppResult<i64> {
        let range = window.resolve(self.clock.now_ts())?;
        bounded(
            self.query_timeout,
            "活跃统计查询",
            self.store.count_users_by_time(kind.field(), &range),
        )
        .await
    }

    /// 首页概览：今日与本周的访问、注册人数
    pub async fn dashboard_counts(&self) -> AppResult<VisitSummary> {
        let today = WindowSpec::Named(RelativeWindow::Today);
        let week = WindowSpec::Named(RelativeWindow::Week);
        Ok(VisitSummary {
            today_visits: self.count_in_window(&today, ActivityKind::Visit).await?,
            today_registrations: self.count_in_window(&today, ActivityKind::Registration).await?,
            week_visits: self.count_in_window(&week, ActivityKind::Visit).await?,
            week_registrations: self.count_in_window(&week, ActivityKind::Registration).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::time_util::FixedClock;
    use orm::entities::user::User;
    use orm::store::mem::MemRecordStore;

    // 任意时区下本地日期都落在周二或周三，前一天仍在本周内
    const NOW_TS: i64 = 1_700_000_000;

    fn visitor(uid: i64, add_time: i64, last_time: i64) -> User {
        User {
            uid: Some(uid),
            add_time: Some(add_time),
            last_time: Some(last_time),
            ..Default::default()
        }
    }

    fn service(store: Arc<MemRecordStore>, clock: Arc<FixedClock>) -> VisitStatService {
        VisitStatService::new(store, clock, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn named_window_follows_clock() {
        let store = Arc::new(MemRecordStore::new());
        let clock = Arc::new(FixedClock::new(NOW_TS));
        let today = resolve_window(RelativeWindow::Today, NOW_TS);

        store.push_user(visitor(1, 1_000, today.start + 100));
        store.push_user(visitor(2, 1_000, today.start + 200));
        store.push_user(visitor(3, 1_000, today.start - 10));

        let service = service(store.clone(), clock.clone());
        let window = WindowSpec::Named(RelativeWindow::Today);
        assert_eq!(
            service.count_in_window(&window, ActivityKind::Visit).await.unwrap(),
            2
        );

        // 一秒后又来一个访客，计数加一
        clock.advance(1);
        store.push_user(visitor(4, 1_000, today.start + 300));
        assert_eq!(
            service.count_in_window(&window, ActivityKind::Visit).await.unwrap(),
            3
        );

        // 一周后再看，当天已无访问
        clock.advance(86_400 * 8);
        assert_eq!(
            service.count_in_window(&window, ActivityKind::Visit).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn explicit_range_is_validated() {
        let store = Arc::new(MemRecordStore::new());
        store.push_user(visitor(1, 150, 150));
        store.push_user(visitor(2, 400, 400));
        let service = service(store, Arc::new(FixedClock::new(NOW_TS)));

        let window = WindowSpec::Explicit(TimeRange::new(100, 200));
        assert_eq!(
            service
                .count_in_window(&window, ActivityKind::Registration)
                .await
                .unwrap(),
            1
        );

        let inverted = WindowSpec::Explicit(TimeRange::new(200, 100));
        let err = service
            .count_in_window(&inverted, ActivityKind::Registration)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[test]
    fn window_spec_from_req() {
        assert_eq!(
            WindowSpec::from_req(Some("today"), None, None).unwrap(),
            WindowSpec::Named(RelativeWindow::Today)
        );
        // 显式区间优先，窗口名写错也不报错
        assert_eq!(
            WindowSpec::from_req(Some("month"), Some(100), Some(200)).unwrap(),
            WindowSpec::Explicit(TimeRange::new(100, 200))
        );
        assert!(matches!(
            WindowSpec::from_req(Some("month"), None, None),
            Err(AppError::InvalidWindow(_))
        ));
        assert!(matches!(
            WindowSpec::from_req(None, Some(100), None),
            Err(AppError::InvalidWindow(_))
        ));
    }

    #[tokio::test]
    async fn dashboard_splits_today_and_week() {
        let store = Arc::new(MemRecordStore::new());
        let today = resolve_window(RelativeWindow::Today, NOW_TS);

        // 今天访问过的老用户、今天注册的新用户、昨天访问过的老用户
        store.push_user(visitor(1, 1_000, today.start + 100));
        store.push_user(visitor(2, today.start + 50, today.start + 50));
        store.push_user(visitor(3, 1_000, today.start - 3_600));

        let service = service(store, Arc::new(FixedClock::new(NOW_TS)));
        let summary = service.dashboard_counts().await.unwrap();
        assert_eq!(summary.today_visits, 2);
        assert_eq!(summary.today_registrations, 1);
        assert_eq!(summary.week_visits, 3);
        assert_eq!(summary.week_registrations, 1);
    }
}
