//! [`RecordStore`] 的内存实现
//!
//! 行为与数据库实现保持同一口径（NULL 列不参与比较），服务层测试用它做数据源。

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;

use common::constants::{ORDER_PAID, RECORD_STATUS_VALID, REFUND_STATUS_NONE};
use common::enums::{BillCategory, BillPm, BillType, ExtractStatus};
use common::error::AppResult;
use common::models::page::PageParams;
use common::models::time_range::TimeRange;
use common::utils::time_util::date_str;

use crate::entities::order::StoreOrder;
use crate::entities::user::{User, UserBill, UserExtract};
use crate::store::{
    AggregateSpec, DailyCount, GroupedAggregate, PayCountBand, RecordStore, RowPredicate,
    TimeField, UserQuery, UserSumField,
};

use async_trait::async_trait;

/// 内存表集合
#[derive(Default)]
pub struct MemRecordStore {
    users: Mutex<Vec<User>>,
    orders: Mutex<Vec<StoreOrder>>,
    bills: Mutex<Vec<UserBill>>,
    extracts: Mutex<Vec<UserExtract>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&self, user: User) {
        guard(&self.users).push(user);
    }

    pub fn push_order(&self, order: StoreOrder) {
        guard(&self.orders).push(order);
    }

    pub fn push_bill(&self, bill: UserBill) {
        guard(&self.bills).push(bill);
    }

    pub fn push_extract(&self, extract: UserExtract) {
        guard(&self.extracts).push(extract);
    }

    fn filter_users(&self, query: &UserQuery) -> Vec<User> {
        let users = guard(&self.users);
        let mut matched: Vec<User> = users
            .iter()
            .filter(|u| {
                if let Some(keyword) = &query.keyword {
                    if !keyword.is_empty() {
                        let nick_hit = u
                            .nickname
                            .as_deref()
                            .map(|n| n.contains(keyword.as_str()))
                            .unwrap_or(false);
                        let phone_hit = u
                            .phone
                            .as_deref()
                            .map(|p| p.contains(keyword.as_str()))
                            .unwrap_or(false);
                        if !nick_hit && !phone_hit {
                            return false;
                        }
                    }
                }
                if let Some(window) = &query.window {
                    match u.add_time {
                        Some(t) if window.contains(t) => {}
                        _ => return false,
                    }
                }
                if let Some(status) = query.status {
                    if u.status != Some(status) {
                        return false;
                    }
                }
                if let Some(spread_uid) = query.spread_uid {
                    if u.spread_uid != Some(spread_uid) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.sort_by_key(|u| Reverse(u.uid.unwrap_or(0)));
        matched
    }

    fn recruits_of(&self, spread_uid: i64) -> Vec<User> {
        let users = guard(&self.users);
        let mut matched: Vec<User> = users
            .iter()
            .filter(|u| u.spread_uid == Some(spread_uid) && u.uid != Some(spread_uid))
            .cloned()
            .collect();
        matched.sort_by_key(|u| Reverse(u.uid.unwrap_or(0)));
        matched
    }
}

fn page_slice<T: Clone>(rows: &[T], page: &PageParams) -> Vec<T> {
    let offset = page.offset() as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    let end = (offset + page.limit as usize).min(rows.len());
    rows[offset..end].to_vec()
}

#[async_trait]
impl RecordStore for MemRecordStore {
    async fn group_aggregate(&self, spec: &AggregateSpec) -> AppResult<Vec<GroupedAggregate>> {
        if spec.restrict_uids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: HashSet<i64> = spec.restrict_uids.iter().copied().collect();
        // (分组键, 金额, 是否计金额)
        let mut groups: BTreeMap<i64, (Decimal, i64)> = BTreeMap::new();
        let mut with_total = true;
        match &spec.predicate {
            RowPredicate::EligibleOrder => {
                for o in guard(&self.orders).iter() {
                    let uid = match o.uid {
                        Some(uid) if keys.contains(&uid) => uid,
                        _ => continue,
                    };
                    if o.paid != Some(ORDER_PAID)
                        || o.refund_status != Some(REFUND_STATUS_NONE)
                        || o.is_del != Some(0)
                        || o.is_system_del != Some(0)
                    {
                        continue;
                    }
                    let entry = groups.entry(uid).or_insert((Decimal::ZERO, 0));
                    entry.0 += o.pay_price.unwrap_or(Decimal::ZERO);
                    entry.1 += 1;
                }
            }
            RowPredicate::CommissionCredit => {
                for b in guard(&self.bills).iter() {
                    let uid = match b.uid {
                        Some(uid) if keys.contains(&uid) => uid,
                        _ => continue,
                    };
                    if b.category.as_deref() != Some(BillCategory::NowMoney.as_value())
                        || b.bill_type.as_deref() != Some(BillType::Brokerage.as_value())
                        || b.pm != Some(BillPm::Income.get_code())
                        || b.status != Some(RECORD_STATUS_VALID)
                    {
                        continue;
                    }
                    let entry = groups.entry(uid).or_insert((Decimal::ZERO, 0));
                    entry.0 += b.number.unwrap_or(Decimal::ZERO);
                    entry.1 += 1;
                }
            }
            RowPredicate::ApprovedWithdrawal => {
                for e in guard(&self.extracts).iter() {
                    let uid = match e.uid {
                        Some(uid) if keys.contains(&uid) => uid,
                        _ => continue,
                    };
                    if e.status != Some(ExtractStatus::Approved.get_code()) {
                        continue;
                    }
                    let entry = groups.entry(uid).or_insert((Decimal::ZERO, 0));
                    entry.0 += e.extract_price.unwrap_or(Decimal::ZERO);
                    entry.1 += 1;
                }
            }
            RowPredicate::DirectRecruit { window } => {
                with_total = false;
                for u in guard(&self.users).iter() {
                    let spread = match u.spread_uid {
                        Some(s) if keys.contains(&s) => s,
                        _ => continue,
                    };
                    if u.uid == Some(spread) {
                        continue;
                    }
                    if let Some(window) = window {
                        match u.add_time {
                            Some(t) if window.contains(t) => {}
                            _ => continue,
                        }
                    }
                    let entry = groups.entry(spread).or_insert((Decimal::ZERO, 0));
                    entry.1 += 1;
                }
            }
        }
        Ok(groups
            .into_iter()
            .map(|(group_key, (total, row_count))| GroupedAggregate {
                group_key,
                total: if with_total { Some(total) } else { None },
                row_count,
            })
            .collect())
    }

    async fn find_user(&self, uid: i64) -> AppResult<Option<User>> {
        let users = guard(&self.users);
        Ok(users.iter().find(|u| u.uid == Some(uid)).cloned())
    }

    async fn select_users_by_uids(&self, uids: &[i64]) -> AppResult<Vec<User>> {
        let keys: HashSet<i64> = uids.iter().copied().collect();
        let users = guard(&self.users);
        Ok(users
            .iter()
            .filter(|u| matches!(u.uid, Some(uid) if keys.contains(&uid)))
            .cloned()
            .collect())
    }

    async fn select_users(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        Ok(self.filter_users(query))
    }

    async fn select_users_page(&self, query: &UserQuery, page: &PageParams) -> AppResult<Vec<User>> {
        Ok(page_slice(&self.filter_users(query), page))
    }

    async fn count_users(&self, query: &UserQuery) -> AppResult<i64> {
        Ok(self.filter_users(query).len() as i64)
    }

    async fn count_users_by_time(&self, field: TimeField, range: &TimeRange) -> AppResult<i64> {
        let users = guard(&self.users);
        let count = users
            .iter()
            .filter(|u| {
                let ts = match field {
                    TimeField::AddTime => u.add_time,
                    TimeField::LastTime => u.last_time,
                };
                matches!(ts, Some(t) if range.contains(t))
            })
            .count();
        Ok(count as i64)
    }

    async fn count_users_by_pay_band(&self, band: PayCountBand) -> AppResult<i64> {
        let users = guard(&self.users);
        let count = users
            .iter()
            .filter(|u| match (band, u.pay_count) {
                (PayCountBand::OneToThree, Some(p)) => p > 0 && p < 4,
                (PayCountBand::AboveFour, Some(p)) => p > 4,
                _ => false,
            })
            .count();
        Ok(count as i64)
    }

    async fn sum_user_field(&self, field: UserSumField) -> AppResult<Decimal> {
        let users = guard(&self.users);
        let total = users
            .iter()
            .filter_map(|u| match field {
                UserSumField::NowMoney => u.now_money,
                UserSumField::BrokeragePrice => u.brokerage_price,
            })
            .sum();
        Ok(total)
    }

    async fn registration_series(&self, range: &TimeRange) -> AppResult<Vec<DailyCount>> {
        let users = guard(&self.users);
        let mut days: BTreeMap<String, i64> = BTreeMap::new();
        for u in users.iter() {
            if let Some(t) = u.add_time {
                if range.contains(t) {
                    *days.entry(date_str(t)).or_insert(0) += 1;
                }
            }
        }
        Ok(days
            .into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect())
    }

    async fn select_recruits(&self, spread_uid: i64, page: &PageParams) -> AppResult<Vec<User>> {
        Ok(page_slice(&self.recruits_of(spread_uid), page))
    }

    async fn count_recruits(&self, spread_uid: i64) -> AppResult<i64> {
        Ok(self.recruits_of(spread_uid).len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: i64, spread_uid: i64, add_time: i64) -> User {
        User {
            uid: Some(uid),
            spread_uid: Some(spread_uid),
            add_time: Some(add_time),
            ..Default::default()
        }
    }

    fn paid_order(uid: i64, price: i64) -> StoreOrder {
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

    fn brokerage_bill(uid: i64, amount: i64) -> UserBill {
        UserBill {
            uid: Some(uid),
            pm: Some(1),
            category: Some("now_money".to_string()),
            bill_type: Some("brokerage".to_string()),
            number: Some(Decimal::from(amount)),
            status: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn aggregate_orders_groups_by_uid() {
        let store = MemRecordStore::new();
        store.push_order(paid_order(1, 100));
        store.push_order(paid_order(1, 50));
        store.push_order(paid_order(2, 5));
        // 未支付的不计入
        store.push_order(StoreOrder {
            uid: Some(1),
            pay_price: Some(Decimal::from(99)),
            paid: Some(0),
            refund_status: Some(0),
            is_del: Some(0),
            is_system_del: Some(0),
            ..Default::default()
        });
        // 已退款的不计入
        let mut refunded = paid_order(1, 30);
        refunded.refund_status = Some(2);
        store.push_order(refunded);
        // 已删除的不计入
        let mut deleted = paid_order(1, 40);
        deleted.is_system_del = Some(1);
        store.push_order(deleted);

        let rows = store
            .group_aggregate(&AggregateSpec::eligible_orders(&[1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group_key, 1);
        assert_eq!(rows[0].total, Some(Decimal::from(150)));
        assert_eq!(rows[0].row_count, 2);
        assert_eq!(rows[1].group_key, 2);
        // uid=3 没有记录，不出现在结果里
        assert!(!rows.iter().any(|r| r.group_key == 3));
    }

    #[tokio::test]
    async fn aggregate_empty_restrict_returns_empty() {
        let store = MemRecordStore::new();
        store.push_order(paid_order(1, 30));
        let rows = store
            .group_aggregate(&AggregateSpec::eligible_orders(&[]))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn aggregate_bills_checks_all_columns() {
        let store = MemRecordStore::new();
        store.push_bill(brokerage_bill(1, 10));
        // 支出方向不计
        let mut expend = brokerage_bill(1, 100);
        expend.pm = Some(0);
        store.push_bill(expend);
        // 积分账单不计
        let mut integral = brokerage_bill(1, 100);
        integral.category = Some("integral".to_string());
        store.push_bill(integral);
        // 未生效不计
        let mut pending = brokerage_bill(1, 100);
        pending.status = Some(0);
        store.push_bill(pending);

        let rows = store
            .group_aggregate(&AggregateSpec::commission_credits(&[1]))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, Some(Decimal::from(10)));
        assert_eq!(rows[0].row_count, 1);
    }

    #[tokio::test]
    async fn aggregate_recruits_skips_self_reference() {
        let store = MemRecordStore::new();
        store.push_user(user(1, 0, 100));
        store.push_user(user(2, 1, 200));
        store.push_user(user(3, 1, 300));
        // 推荐人指向自己的脏数据
        store.push_user(user(4, 4, 400));

        let rows = store
            .group_aggregate(&AggregateSpec::direct_recruits(&[1, 4], None))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_key, 1);
        assert_eq!(rows[0].total, None);
        assert_eq!(rows[0].row_count, 2);
    }

    #[tokio::test]
    async fn aggregate_recruits_honors_window() {
        let store = MemRecordStore::new();
        store.push_user(user(2, 1, 100));
        store.push_user(user(3, 1, 200));
        store.push_user(user(4, 1, 300));

        let window = TimeRange::new(150, 250);
        let rows = store
            .group_aggregate(&AggregateSpec::direct_recruits(&[1], Some(window)))
            .await
            .unwrap();
        assert_eq!(rows[0].row_count, 1);
    }

    #[tokio::test]
    async fn pay_band_excludes_boundary_four() {
        let store = MemRecordStore::new();
        for (uid, pay_count) in [(1, 0), (2, 1), (3, 3), (4, 4), (5, 5)] {
            store.push_user(User {
                uid: Some(uid),
                pay_count: Some(pay_count),
                ..Default::default()
            });
        }
        let low = store
            .count_users_by_pay_band(PayCountBand::OneToThree)
            .await
            .unwrap();
        let high = store
            .count_users_by_pay_band(PayCountBand::AboveFour)
            .await
            .unwrap();
        assert_eq!(low, 2);
        assert_eq!(high, 1);
    }

    #[tokio::test]
    async fn user_filters_and_paging() {
        let store = MemRecordStore::new();
        store.push_user(User {
            uid: Some(1),
            nickname: Some("张三".to_string()),
            phone: Some("13800000001".to_string()),
            add_time: Some(100),
            ..Default::default()
        });
        store.push_user(User {
            uid: Some(2),
            nickname: Some("李四".to_string()),
            phone: Some("13900000002".to_string()),
            add_time: Some(200),
            ..Default::default()
        });

        let query = UserQuery { keyword: Some("138".to_string()), ..Default::default() };
        assert_eq!(store.count_users(&query).await.unwrap(), 1);

        let query = UserQuery {
            window: Some(TimeRange::new(150, 300)),
            ..Default::default()
        };
        let users = store.select_users(&query).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].uid, Some(2));

        // 批量取数只返回存在的 uid
        let picked = store.select_users_by_uids(&[2, 9]).await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].uid, Some(2));

        // 超出末页返回空
        let page = PageParams::new(9, 10);
        let users = store
            .select_users_page(&UserQuery::default(), &page)
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn registration_series_groups_by_day() {
        let store = MemRecordStore::new();
        // 相隔两天的三条注册记录
        store.push_user(user(1, 0, 1_000_000));
        store.push_user(user(2, 0, 1_000_100));
        store.push_user(user(3, 0, 1_000_000 + 86_400 * 2));

        let series = store
            .registration_series(&TimeRange::new(0, 2_000_000))
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].count, 2);
        assert_eq!(series[1].count, 1);
        assert!(series[0].day < series[1].day);
    }

    #[tokio::test]
    async fn recruits_listing_excludes_self() {
        let store = MemRecordStore::new();
        store.push_user(user(1, 1, 100));
        store.push_user(user(2, 1, 200));
        store.push_user(user(3, 1, 300));

        assert_eq!(store.count_recruits(1).await.unwrap(), 2);
        let page = PageParams::new(1, 1);
        let recruits = store.select_recruits(1, &page).await.unwrap();
        assert_eq!(recruits.len(), 1);
        assert_eq!(recruits[0].uid, Some(3));
    }
}
