//! 记录存取层
//!
//! 服务层不直接拼 SQL，统一通过 [`RecordStore`] 以预定义的聚合描述符取数。
//! 描述符是封闭集合，只能用本模块提供的构造函数组合出来。

pub mod address;
pub mod db;
pub mod mem;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use common::error::AppResult;
use common::models::page::PageParams;
use common::models::time_range::TimeRange;

use crate::entities::user::User;

/// 行筛选谓词，每个变体对应一条预定义的业务口径
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowPredicate {
    /// 有效订单：已支付、未退款、未删除
    EligibleOrder,
    /// 佣金入账：余额账单中已生效的佣金收入
    CommissionCredit,
    /// 成功提现：审核通过的提现申请
    ApprovedWithdrawal,
    /// 直推下级：推荐人指向组内成员，可限定注册时间窗口
    DirectRecruit { window: Option<TimeRange> },
}

/// 分组键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// 按记录归属用户分组
    Uid,
    /// 按推荐人分组
    SpreadUid,
}

/// 求和列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumField {
    /// 订单实付金额
    PayPrice,
    /// 账单发生金额
    BillNumber,
    /// 提现金额
    ExtractPrice,
    /// 只计数不求和
    None,
}

/// 聚合描述符
///
/// 字段对外只读，组合只能来自下面的构造函数。
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub(crate) predicate: RowPredicate,
    pub(crate) group_key: GroupKey,
    pub(crate) sum_field: SumField,
    /// 限定分组键的取值集合，空集合表示没有任何候选
    pub(crate) restrict_uids: Vec<i64>,
}

impl AggregateSpec {
    /// 有效订单实付金额与单数，按买家汇总
    pub fn eligible_orders(uids: &[i64]) -> Self {
        Self {
            predicate: RowPredicate::EligibleOrder,
            group_key: GroupKey::Uid,
            sum_field: SumField::PayPrice,
            restrict_uids: uids.to_vec(),
        }
    }

    /// 佣金入账金额与笔数，按受益人汇总
    pub fn commission_credits(uids: &[i64]) -> Self {
        Self {
            predicate: RowPredicate::CommissionCredit,
            group_key: GroupKey::Uid,
            sum_field: SumField::BillNumber,
            restrict_uids: uids.to_vec(),
        }
    }

    /// 成功提现金额与笔数，按申请人汇总
    pub fn approved_withdrawals(uids: &[i64]) -> Self {
        Self {
            predicate: RowPredicate::ApprovedWithdrawal,
            group_key: GroupKey::Uid,
            sum_field: SumField::ExtractPrice,
            restrict_uids: uids.to_vec(),
        }
    }

    /// 直推下级人数，按推荐人汇总，可限定下级注册时间窗口
    pub fn direct_recruits(uids: &[i64], window: Option<TimeRange>) -> Self {
        Self {
            predicate: RowPredicate::DirectRecruit { window },
            group_key: GroupKey::SpreadUid,
            sum_field: SumField::None,
            restrict_uids: uids.to_vec(),
        }
    }

    pub fn predicate(&self) -> &RowPredicate {
        &self.predicate
    }

    pub fn restrict_uids(&self) -> &[i64] {
        &self.restrict_uids
    }
}

/// 聚合结果行：分组键 -> (求和, 行数)
///
/// 无求和列的聚合 total 为 None，合并时按 0 处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedAggregate {
    pub group_key: i64,
    #[serde(default)]
    pub total: Option<Decimal>,
    pub row_count: i64,
}

/// 用户筛选条件（报表候选、用户列表共用）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    /// 昵称或手机号模糊匹配
    pub keyword: Option<String>,
    /// 注册时间窗口
    pub window: Option<TimeRange>,
    /// 账号状态
    pub status: Option<i32>,
    /// 限定推荐人
    pub spread_uid: Option<i64>,
}

/// 用户表上的时间列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    /// 注册时间
    AddTime,
    /// 最后访问时间
    LastTime,
}

impl TimeField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            TimeField::AddTime => "add_time",
            TimeField::LastTime => "last_time",
        }
    }
}

/// 用户表上的金额列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSumField {
    /// 余额
    NowMoney,
    /// 可提现佣金
    BrokeragePrice,
}

impl UserSumField {
    pub(crate) fn column(self) -> &'static str {
        match self {
            UserSumField::NowMoney => "now_money",
            UserSumField::BrokeragePrice => "brokerage_price",
        }
    }
}

/// 支付次数分段
///
/// 一至三次与四次以上之间留有空档，pay_count = 4 的用户不落入任何分段，
/// 与既有报表口径一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayCountBand {
    /// 0 < pay_count < 4
    OneToThree,
    /// pay_count > 4
    AboveFour,
}

/// 每日计数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    /// yyyy-MM-dd
    pub day: String,
    pub count: i64,
}

/// 记录存取接口
///
/// 数据库实现见 [`db::DbRecordStore`]，内存实现见 [`mem::MemRecordStore`]。
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 按描述符聚合
    ///
    /// 结果只包含有记录的分组键，没出现的键由调用方按零补齐。
    /// restrict_uids 为空时直接返回空结果。
    async fn group_aggregate(&self, spec: &AggregateSpec) -> AppResult<Vec<GroupedAggregate>>;

    /// 按 uid 查找用户
    async fn find_user(&self, uid: i64) -> AppResult<Option<User>>;

    /// 按 uid 集合批量取用户，用于回填展示信息
    ///
    /// 空集合直接返回空结果。
    async fn select_users_by_uids(&self, uids: &[i64]) -> AppResult<Vec<User>>;

    /// 满足条件的全部用户，uid 降序
    async fn select_users(&self, query: &UserQuery) -> AppResult<Vec<User>>;

    /// 满足条件的用户分页，uid 降序
    async fn select_users_page(&self, query: &UserQuery, page: &PageParams) -> AppResult<Vec<User>>;

    /// 满足条件的用户总数
    async fn count_users(&self, query: &UserQuery) -> AppResult<i64>;

    /// 指定时间列落在区间内的用户数
    async fn count_users_by_time(&self, field: TimeField, range: &TimeRange) -> AppResult<i64>;

    /// 支付次数分段内的用户数
    async fn count_users_by_pay_band(&self, band: PayCountBand) -> AppResult<i64>;

    /// 全体用户指定金额列求和
    async fn sum_user_field(&self, field: UserSumField) -> AppResult<Decimal>;

    /// 区间内按天统计的注册人数，日期升序
    async fn registration_series(&self, range: &TimeRange) -> AppResult<Vec<DailyCount>>;

    /// 某推荐人的直推下级分页，uid 降序，不含其本人
    async fn select_recruits(&self, spread_uid: i64, page: &PageParams) -> AppResult<Vec<User>>;

    /// 某推荐人的直推下级总数，不含其本人
    async fn count_recruits(&self, spread_uid: i64) -> AppResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_constructors() {
        let spec = AggregateSpec::eligible_orders(&[1, 2, 3]);
        assert_eq!(spec.predicate(), &RowPredicate::EligibleOrder);
        assert_eq!(spec.restrict_uids(), &[1, 2, 3]);

        let window = TimeRange { start: 0, end: 100 };
        let spec = AggregateSpec::direct_recruits(&[7], Some(window));
        assert_eq!(
            spec.predicate(),
            &RowPredicate::DirectRecruit { window: Some(window) }
        );
    }

    #[test]
    fn test_time_field_columns() {
        assert_eq!(TimeField::AddTime.column(), "add_time");
        assert_eq!(TimeField::LastTime.column(), "last_time");
    }
}
