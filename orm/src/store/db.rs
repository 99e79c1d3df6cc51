//! [`RecordStore`] 的 MySQL 实现

use std::sync::Arc;

use rbatis::RBatis;
use rbs::Value;
use rust_decimal::Decimal;

use common::constants::{ORDER_PAID, RECORD_STATUS_VALID, REFUND_STATUS_NONE};
use common::enums::{BillCategory, BillPm, BillType, ExtractStatus};
use common::error::AppResult;
use common::models::page::PageParams;
use common::models::time_range::TimeRange;

use crate::entities::order::StoreOrder;
use crate::entities::user::{User, UserBill, UserExtract};
use crate::store::{
    AggregateSpec, DailyCount, GroupedAggregate, PayCountBand, RecordStore, RowPredicate,
    TimeField, UserQuery, UserSumField,
};

use async_trait::async_trait;

/// 基于 rbatis 的记录存取实现
pub struct DbRecordStore {
    rb: Arc<RBatis>,
}

impl DbRecordStore {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }
}

/// n 个 ? 占位符，逗号分隔
fn sql_in_marks(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn push_uids(args: &mut Vec<Value>, uids: &[i64]) {
    for uid in uids {
        args.push((*uid).into());
    }
}

/// 用户筛选条件转 where 子句，参数按出现顺序追加
fn user_where(query: &UserQuery, args: &mut Vec<Value>) -> String {
    let mut sql = String::from(" WHERE 1 = 1");
    if let Some(keyword) = &query.keyword {
        if !keyword.is_empty() {
            sql.push_str(" AND (nickname LIKE ? OR phone LIKE ?)");
            let like = format!("%{}%", keyword);
            args.push(like.clone().into());
            args.push(like.into());
        }
    }
    if let Some(window) = &query.window {
        sql.push_str(" AND add_time >= ? AND add_time <= ?");
        args.push(window.start.into());
        args.push(window.end.into());
    }
    if let Some(status) = query.status {
        sql.push_str(" AND status = ?");
        args.push(status.into());
    }
    if let Some(spread_uid) = query.spread_uid {
        sql.push_str(" AND spread_uid = ?");
        args.push(spread_uid.into());
    }
    sql
}

#[async_trait]
impl RecordStore for DbRecordStore {
    async fn group_aggregate(&self, spec: &AggregateSpec) -> AppResult<Vec<GroupedAggregate>> {
        // IN () 不是合法 SQL，空候选集直接返回
        if spec.restrict_uids.is_empty() {
            return Ok(Vec::new());
        }
        let marks = sql_in_marks(spec.restrict_uids.len());
        let mut args: Vec<Value> = Vec::new();
        let sql = match &spec.predicate {
            RowPredicate::EligibleOrder => {
                push_uids(&mut args, &spec.restrict_uids);
                format!(
                    "SELECT uid AS group_key, SUM(pay_price) AS total, COUNT(id) AS row_count \
                     FROM {} WHERE paid = {} AND refund_status = {} \
                     AND is_del = 0 AND is_system_del = 0 \
                     AND uid IN ({}) GROUP BY uid",
                    StoreOrder::TABLE_NAME,
                    ORDER_PAID,
                    REFUND_STATUS_NONE,
                    marks
                )
            }
            RowPredicate::CommissionCredit => {
                args.push(BillCategory::NowMoney.as_value().into());
                args.push(BillType::Brokerage.as_value().into());
                args.push(BillPm::Income.get_code().into());
                push_uids(&mut args, &spec.restrict_uids);
                format!(
                    "SELECT uid AS group_key, SUM(number) AS total, COUNT(id) AS row_count \
                     FROM {} WHERE category = ? AND `type` = ? AND pm = ? AND status = {} \
                     AND uid IN ({}) GROUP BY uid",
                    UserBill::TABLE_NAME,
                    RECORD_STATUS_VALID,
                    marks
                )
            }
            RowPredicate::ApprovedWithdrawal => {
                args.push(ExtractStatus::Approved.get_code().into());
                push_uids(&mut args, &spec.restrict_uids);
                format!(
                    "SELECT uid AS group_key, SUM(extract_price) AS total, COUNT(id) AS row_count \
                     FROM {} WHERE status = ? AND uid IN ({}) GROUP BY uid",
                    UserExtract::TABLE_NAME,
                    marks
                )
            }
            RowPredicate::DirectRecruit { window } => {
                push_uids(&mut args, &spec.restrict_uids);
                let mut sql = format!(
                    "SELECT spread_uid AS group_key, NULL AS total, COUNT(uid) AS row_count \
                     FROM {} WHERE spread_uid IN ({}) AND spread_uid <> uid",
                    User::TABLE_NAME,
                    marks
                );
                if let Some(window) = window {
                    sql.push_str(" AND add_time >= ? AND add_time <= ?");
                    args.push(window.start.into());
                    args.push(window.end.into());
                }
                sql.push_str(" GROUP BY spread_uid");
                sql
            }
        };
        let rows: Vec<GroupedAggregate> = self.rb.query_decode(&sql, args).await?;
        Ok(rows)
    }

    async fn find_user(&self, uid: i64) -> AppResult<Option<User>> {
        let found = User::select_by_uid(self.rb.as_ref(), uid).await?;
        Ok(found)
    }

    async fn select_users_by_uids(&self, uids: &[i64]) -> AppResult<Vec<User>> {
        if uids.is_empty() {
            return Ok(Vec::new());
        }
        let mut args: Vec<Value> = Vec::new();
        push_uids(&mut args, uids);
        let sql = format!(
            "SELECT * FROM {} WHERE uid IN ({})",
            User::TABLE_NAME,
            sql_in_marks(uids.len())
        );
        let users: Vec<User> = self.rb.query_decode(&sql, args).await?;
        Ok(users)
    }

    async fn select_users(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let mut args: Vec<Value> = Vec::new();
        let where_sql = user_where(query, &mut args);
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY uid DESC",
            User::TABLE_NAME,
            where_sql
        );
        let users: Vec<User> = self.rb.query_decode(&sql, args).await?;
        Ok(users)
    }

    async fn select_users_page(&self, query: &UserQuery, page: &PageParams) -> AppResult<Vec<User>> {
        let mut args: Vec<Value> = Vec::new();
        let where_sql = user_where(query, &mut args);
        let sql = format!(
            "SELECT * FROM {}{} ORDER BY uid DESC LIMIT ?, ?",
            User::TABLE_NAME,
            where_sql
        );
        args.push(page.offset().into());
        args.push(page.limit.into());
        let users: Vec<User> = self.rb.query_decode(&sql, args).await?;
        Ok(users)
    }

    async fn count_users(&self, query: &UserQuery) -> AppResult<i64> {
        let mut args: Vec<Value> = Vec::new();
        let where_sql = user_where(query, &mut args);
        let sql = format!("SELECT COUNT(uid) FROM {}{}", User::TABLE_NAME, where_sql);
        let count: i64 = self.rb.query_decode(&sql, args).await?;
        Ok(count)
    }

    async fn count_users_by_time(&self, field: TimeField, range: &TimeRange) -> AppResult<i64> {
        let col = field.column();
        let sql = format!(
            "SELECT COUNT(uid) FROM {} WHERE {} >= ? AND {} <= ?",
            User::TABLE_NAME,
            col,
            col
        );
        let count: i64 = self
            .rb
            .query_decode(&sql, vec![range.start.into(), range.end.into()])
            .await?;
        Ok(count)
    }

    async fn count_users_by_pay_band(&self, band: PayCountBand) -> AppResult<i64> {
        let sql = match band {
            PayCountBand::OneToThree => format!(
                "SELECT COUNT(uid) FROM {} WHERE pay_count > 0 AND pay_count < 4",
                User::TABLE_NAME
            ),
            PayCountBand::AboveFour => format!(
                "SELECT COUNT(uid) FROM {} WHERE pay_count > 4",
                User::TABLE_NAME
            ),
        };
        let count: i64 = self.rb.query_decode(&sql, vec![]).await?;
        Ok(count)
    }

    async fn sum_user_field(&self, field: UserSumField) -> AppResult<Decimal> {
        let sql = format!(
            "SELECT IFNULL(SUM({}), 0) FROM {}",
            field.column(),
            User::TABLE_NAME
        );
        let total: Decimal = self.rb.query_decode(&sql, vec![]).await?;
        Ok(total)
    }

    async fn registration_series(&self, range: &TimeRange) -> AppResult<Vec<DailyCount>> {
        let sql = format!(
            "SELECT FROM_UNIXTIME(add_time, '%Y-%m-%d') AS day, COUNT(uid) AS `count` \
             FROM {} WHERE add_time >= ? AND add_time <= ? \
             GROUP BY day ORDER BY day ASC",
            User::TABLE_NAME
        );
        let rows: Vec<DailyCount> = self
            .rb
            .query_decode(&sql, vec![range.start.into(), range.end.into()])
            .await?;
        Ok(rows)
    }

    async fn select_recruits(&self, spread_uid: i64, page: &PageParams) -> AppResult<Vec<User>> {
        let sql = format!(
            "SELECT * FROM {} WHERE spread_uid = ? AND uid <> ? ORDER BY uid DESC LIMIT ?, ?",
            User::TABLE_NAME
        );
        let users: Vec<User> = self
            .rb
            .query_decode(
                &sql,
                vec![
                    spread_uid.into(),
                    spread_uid.into(),
                    page.offset().into(),
                    page.limit.into(),
                ],
            )
            .await?;
        Ok(users)
    }

    async fn count_recruits(&self, spread_uid: i64) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(uid) FROM {} WHERE spread_uid = ? AND uid <> ?",
            User::TABLE_NAME
        );
        let count: i64 = self
            .rb
            .query_decode(&sql, vec![spread_uid.into(), spread_uid.into()])
            .await?;
        Ok(count)
    }
}
