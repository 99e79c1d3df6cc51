use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use common::error::AppResult;
use common::models::page::PageParams;
use common::models::time_range::TimeRange;
use common::response::PageData;
use orm::entities::user::User;
use orm::store::{DailyCount, PayCountBand, RecordStore, UserQuery, UserSumField};

use super::bounded;

/// 用户总体概况
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub total: i64,
    /// 支付 1 至 3 次
    pub pay_one_to_three: i64,
    /// 支付 4 次以上
    pub pay_above_four: i64,
    pub now_money_total: Decimal,
    pub brokerage_total: Decimal,
}

/// 用户查询服务
pub struct UserService {
    store: Arc<dyn RecordStore>,
    query_timeout: Duration,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>, query_timeout: Duration) -> Self {
        Self { store, query_timeout }
    }

    /// 用户分页列表，uid 降序
    pub async fn user_page(&self, query: &UserQuery, page: &PageParams) -> AppResult<PageData<User>> {
        page.validate()?;
        if let Some(window) = &query.window {
            window.validate()?;
        }
        let count = bounded(self.query_timeout, "用户总数查询", self.store.count_users(query)).await?;
        let list = bounded(
            self.query_timeout,
            "用户列表查询",
            self.store.select_users_page(query, page),
        )
        .await?;
        Ok(PageData::new(list, count))
    }

    /// 用户概况：总数、支付次数分段与两项余额合计
    pub async fn user_summary(&self) -> AppResult<UserSummary> {
        let total = bounded(
            self.query_timeout,
            "用户总数查询",
            self.store.count_users(&UserQuery::default()),
        )
        .await?;
        let pay_one_to_three = bounded(
            self.query_timeout,
            "支付分段查询",
            self.store.count_users_by_pay_band(PayCountBand::OneToThree),
        )
        .await?;
        let pay_above_four = bounded(
            self.query_timeout,
            "支付分段查询",
            self.store.count_users_by_pay_band(PayCountBand::AboveFour),
        )
        .await?;
        let now_money_total = bounded(
            self.query_timeout,
            "余额合计查询",
            self.store.sum_user_field(UserSumField::NowMoney),
        )
        .await?;
        let brokerage_total = bounded(
            self.query_timeout,
            "佣金合计查询",
            self.store.sum_user_field(UserSumField::BrokeragePrice),
        )
        .await?;
        Ok(UserSummary {
            total,
            pay_one_to_three,
            pay_above_four,
            now_money_total,
            brokerage_total,
        })
    }

    /// 区间内按天的注册人数，日期升序
    pub async fn registration_series(&self, range: &TimeRange) -> AppResult<Vec<DailyCount>> {
        range.validate()?;
        bounded(
            self.query_timeout,
            "注册趋势查询",
            self.store.registration_series(range),
        )
        .await
    }
}
