use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use common::error::AppResult;
use orm::store::{AggregateSpec, RecordStore};

use super::bounded;

/// 单个分组的聚合指标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricTotals {
    pub sum: Decimal,
    pub count: i64,
}

impl MetricTotals {
    pub const ZERO: MetricTotals = MetricTotals { sum: Decimal::ZERO, count: 0 };
}

/// 指标聚合器
///
/// 对单个记录集执行一次分组聚合，产出 分组键 -> {金额, 行数}。
/// 结果里没出现的键代表该组没有符合条件的记录，取数方按零处理，
/// 统一走 [`MetricAggregator::totals_for`]。
pub struct MetricAggregator {
    store: Arc<dyn RecordStore>,
    query_timeout: Duration,
}

impl MetricAggregator {
    pub fn new(store: Arc<dyn RecordStore>, query_timeout: Duration) -> Self {
        Self { store, query_timeout }
    }

    /// 执行一次聚合，子查询超时按可重试的存储故障处理
    pub async fn aggregate(&self, spec: &AggregateSpec) -> AppResult<HashMap<i64, MetricTotals>> {
        let rows = bounded(self.query_timeout, "聚合查询", self.store.group_aggregate(spec)).await?;
        let mut totals = HashMap::with_capacity(rows.len());
        for row in rows {
            totals.insert(
                row.group_key,
                MetricTotals {
                    sum: row.total.unwrap_or(Decimal::ZERO),
                    count: row.row_count,
                },
            );
        }
        Ok(totals)
    }

    /// 取某个键的指标，缺失即为零
    pub fn totals_for(totals: &HashMap<i64, MetricTotals>, key: i64) -> MetricTotals {
        totals.get(&key).copied().unwrap_or(MetricTotals::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::AppError;
    use common::models::page::PageParams;
    use common::models::time_range::TimeRange;
    use orm::entities::order::StoreOrder;
    use orm::entities::user::User;
    use orm::store::mem::MemRecordStore;
    use orm::store::{DailyCount, GroupedAggregate, PayCountBand, TimeField, UserQuery, UserSumField};

    fn order(uid: i64, price: i64) -> StoreOrder {
        StoreOrder {
            uid: Some(uid),
            pay_price: Some(Decimal::from(price)),
            paid: Some(1),
            refund_status: Some(0),
            is_del: Some(0),
            is_system_del: Some(0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn aggregate_maps_rows_and_defaults_missing_to_zero() {
        let store = Arc::new(MemRecordStore::new());
        store.push_order(order(1, 100));
        store.push_order(order(1, 50));

        let aggregator = MetricAggregator::new(store, Duration::from_secs(5));
        let totals = aggregator
            .aggregate(&AggregateSpec::eligible_orders(&[1, 2]))
            .await
            .unwrap();

        let hit = MetricAggregator::totals_for(&totals, 1);
        assert_eq!(hit.sum, Decimal::from(150));
        assert_eq!(hit.count, 2);
        // 没有记录的键不在映射里，但取数按零
        assert!(!totals.contains_key(&2));
        assert_eq!(MetricAggregator::totals_for(&totals, 2), MetricTotals::ZERO);
    }

    /// 永远不返回的存储，用来验证超时路径
    struct StalledStore;

    #[async_trait::async_trait]
    impl RecordStore for StalledStore {
        async fn group_aggregate(
            &self,
            _spec: &AggregateSpec,
        ) -> AppResult<Vec<GroupedAggregate>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        async fn find_user(&self, _uid: i64) -> AppResult<Option<User>> {
            unreachable!()
        }

        async fn select_users_by_uids(&self, _uids: &[i64]) -> AppResult<Vec<User>> {
            unreachable!()
        }

        async fn select_users(&self, _query: &UserQuery) -> AppResult<Vec<User>> {
            unreachable!()
        }

        async fn select_users_page(
            &self,
            _query: &UserQuery,
            _page: &PageParams,
        ) -> AppResult<Vec<User>> {
            unreachable!()
        }

        async fn count_users(&self, _query: &UserQuery) -> AppResult<i64> {
            unreachable!()
        }

        async fn count_users_by_time(
            &self,
            _field: TimeField,
            _range: &TimeRange,
        ) -> AppResult<i64> {
            unreachable!()
        }

        async fn count_users_by_pay_band(&self, _band: PayCountBand) -> AppResult<i64> {
            unreachable!()
        }

        async fn sum_user_field(&self, _field: UserSumField) -> AppResult<Decimal> {
            unreachable!()
        }

        async fn registration_series(&self, _range: &TimeRange) -> AppResult<Vec<DailyCount>> {
            unreachable!()
        }

        async fn select_recruits(
            &self,
            _spread_uid: i64,
            _page: &PageParams,
        ) -> AppResult<Vec<User>> {
            unreachable!()
        }

        async fn count_recruits(&self, _spread_uid: i64) -> AppResult<i64> {
            unreachable!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn aggregate_times_out_as_retryable() {
        let aggregator = MetricAggregator::new(Arc::new(StalledStore), Duration::from_millis(100));
        let err = aggregator
            .aggregate(&AggregateSpec::eligible_orders(&[1]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }
}
