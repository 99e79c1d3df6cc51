use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use common::constants::NO_SPREAD_UID;
use common::error::AppResult;
use common::models::page::PageParams;
use common::models::time_range::TimeRange;
use common::response::PageData;
use orm::entities::user::User;
use orm::store::{AggregateSpec, UserQuery};

use super::metric_aggregator::{MetricAggregator, MetricTotals};
use super::referral_graph::ReferralGraphResolver;

/// 报表排序指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankBy {
    /// 累计佣金
    #[default]
    Brokerage,
    /// 直推人数
    RecruitCount,
}

/// 分销报表筛选条件
///
/// keyword、window、status 圈定候选用户，window 作用在注册时间上；
/// recruit_window 只影响直推人数的统计口径，榜单按窗口排名时使用。
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub keyword: Option<String>,
    pub window: Option<TimeRange>,
    pub status: Option<i32>,
    pub recruit_window: Option<TimeRange>,
    pub rank_by: RankBy,
    /// 只保留窗口内有直推的用户
    pub only_recruiters: bool,
}

impl ReportFilter {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(window) = &self.window {
            window.validate()?;
        }
        if let Some(window) = &self.recruit_window {
            window.validate()?;
        }
        Ok(())
    }
}

/// 分销报表行，四组指标缺省为零
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReportRow {
    pub uid: i64,
    pub nickname: String,
    pub phone: String,
    pub avatar: String,
    pub spread_uid: i64,
    /// 上级推广人昵称，没有上级时为空串
    pub spread_nickname: String,
    pub add_time: i64,
    pub order_amount: Decimal,
    pub order_count: i64,
    pub brokerage_amount: Decimal,
    pub brokerage_count: i64,
    pub extract_amount: Decimal,
    pub extract_count: i64,
    pub recruit_count: i64,
}

/// 下级报表行：下级自身的消费与再推广情况
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruitRow {
    pub uid: i64,
    pub nickname: String,
    pub phone: String,
    pub avatar: String,
    pub add_time: i64,
    pub order_amount: Decimal,
    pub order_count: i64,
    pub recruit_count: i64,
}

/// 分销报表服务
///
/// 报表不落库：每次按筛选条件圈出候选，再把四路聚合结果按 uid 合并，
/// 缺失的键补零，排序分页后直接返回。各路聚合之间没有快照隔离，
/// 聚合窗口内的并发写入可能让同一行的指标来自不同时刻。
pub struct AgentReportService {
    resolver: Arc<ReferralGraphResolver>,
    aggregator: Arc<MetricAggregator>,
}

impl AgentReportService {
    pub fn new(resolver: Arc<ReferralGraphResolver>, aggregator: Arc<MetricAggregator>) -> Self {
        Self { resolver, aggregator }
    }

    /// 构建分销报表
    ///
    /// count 是筛选后的候选总数，与页码无关；排序指标相同的行按 uid 降序，
    /// 条件和数据不变时结果可重复。
    pub async fn build_report(
        &self,
        filter: &ReportFilter,
        page: &PageParams,
    ) -> AppResult<PageData<AgentReportRow>> {
        page.validate()?;
        filter.validate()?;

        let query = UserQuery {
            keyword: filter.keyword.clone(),
            window: filter.window,
            status: filter.status,
            spread_uid: None,
        };
        let candidates = self.resolver.candidates(&query).await?;
        if candidates.is_empty() {
            return Ok(PageData::empty());
        }

        let uids: Vec<i64> = candidates.iter().filter_map(|u| u.uid).collect();
        let orders = self
            .aggregator
            .aggregate(&AggregateSpec::eligible_orders(&uids))
            .await?;
        let brokerage = self
            .aggregator
            .aggregate(&AggregateSpec::commission_credits(&uids))
            .await?;
        let extracts = self
            .aggregator
            .aggregate(&AggregateSpec::approved_withdrawals(&uids))
            .await?;
        let recruits = self
            .aggregator
            .aggregate(&AggregateSpec::direct_recruits(&uids, filter.recruit_window))
            .await?;

        let mut rows: Vec<AgentReportRow> = candidates
            .iter()
            .filter_map(|user| {
                let uid = user.uid?;
                Some(Self::merge_row(user, uid, &orders, &brokerage, &extracts, &recruits))
            })
            .collect();
        if filter.only_recruiters {
            rows.retain(|row| row.recruit_count > 0);
        }
        rows.sort_by(|a, b| {
            let by_metric = match filter.rank_by {
                RankBy::Brokerage => b.brokerage_amount.cmp(&a.brokerage_amount),
                RankBy::RecruitCount => b.recruit_count.cmp(&a.recruit_count),
            };
            by_metric.then(b.uid.cmp(&a.uid))
        });

        let count = rows.len() as i64;
        let mut page_rows = page_slice(rows, page);
        self.fill_spread_names(&mut page_rows).await?;
        Ok(PageData::new(page_rows, count))
    }

    /// 回填上级昵称，只查当前页涉及的推荐人
    async fn fill_spread_names(&self, rows: &mut [AgentReportRow]) -> AppResult<()> {
        let mut uids: Vec<i64> = rows
            .iter()
            .map(|r| r.spread_uid)
            .filter(|&uid| uid != NO_SPREAD_UID)
            .collect();
        uids.sort_unstable();
        uids.dedup();
        let referrers = self.resolver.referrers_by_uids(&uids).await?;
        for row in rows.iter_mut() {
            if let Some(referrer) = referrers.get(&row.spread_uid) {
                row.spread_nickname = referrer.nickname.clone().unwrap_or_default();
            }
        }
        Ok(())
    }

    /// 推广人数榜单：窗口内有直推的用户按人数排名
    pub async fn rank_report(
        &self,
        window: TimeRange,
        page: &PageParams,
    ) -> AppResult<PageData<AgentReportRow>> {
        let filter = ReportFilter {
            recruit_window: Some(window),
            rank_by: RankBy::RecruitCount,
            only_recruiters: true,
            ..Default::default()
        };
        self.build_report(&filter, page).await
    }

    /// 某推荐人的直推下级报表，uid 降序分页
    ///
    /// 先取一页下级，再只对这一页做消费和再推广两路聚合。
    pub async fn recruit_report(
        &self,
        spread_uid: i64,
        page: &PageParams,
    ) -> AppResult<PageData<RecruitRow>> {
        let recruits = self.resolver.recruits_of(spread_uid, page).await?;
        if recruits.list.is_empty() {
            return Ok(PageData::new(Vec::new(), recruits.count));
        }

        let uids: Vec<i64> = recruits.list.iter().filter_map(|u| u.uid).collect();
        let orders = self
            .aggregator
            .aggregate(&AggregateSpec::eligible_orders(&uids))
            .await?;
        let sub_recruits = self
            .aggregator
            .aggregate(&AggregateSpec::direct_recruits(&uids, None))
            .await?;

        let rows: Vec<RecruitRow> = recruits
            .list
            .iter()
            .filter_map(|user| {
                let uid = user.uid?;
                let order = MetricAggregator::totals_for(&orders, uid);
                Some(RecruitRow {
                    uid,
                    nickname: user.nickname.clone().unwrap_or_default(),
                    phone: user.phone.clone().unwrap_or_default(),
                    avatar: user.avatar.clone().unwrap_or_default(),
                    add_time: user.add_time.unwrap_or(0),
                    order_amount: order.sum,
                    order_count: order.count,
                    recruit_count: MetricAggregator::totals_for(&sub_recruits, uid).count,
                })
            })
            .collect();
        Ok(PageData::new(rows, recruits.count))
    }

    fn merge_row(
        user: &User,
        uid: i64,
        orders: &HashMap<i64, MetricTotals>,
        brokerage: &HashMap<i64, MetricTotals>,
        extracts: &HashMap<i64, MetricTotals>,
        recruits: &HashMap<i64, MetricTotals>,
    ) -> AgentReportRow {
        let order = MetricAggregator::totals_for(orders, uid);
        let brokerage = MetricAggregator::totals_for(brokerage, uid);
        let extract = MetricAggregator::totals_for(extracts, uid);
        AgentReportRow {
            uid,
            nickname: user.nickname.clone().unwrap_or_default(),
            phone: user.phone.clone().unwrap_or_default(),
            avatar: user.avatar.clone().unwrap_or_default(),
            spread_uid: user.spread_uid.unwrap_or(NO_SPREAD_UID),
            spread_nickname: String::new(),
            add_time: user.add_time.unwrap_or(0),
            order_amount: order.sum,
            order_count: order.count,
            brokerage_amount: brokerage.sum,
            brokerage_count: brokerage.count,
            extract_amount: extract.sum,
            extract_count: extract.count,
            recruit_count: MetricAggregator::totals_for(recruits, uid).count,
        }
    }
}

fn page_slice<T>(rows: Vec<T>, page: &PageParams) -> Vec<T> {
    let offset = page.offset() as usize;
    if offset >= rows.len() {
        return Vec::new();
    }
    rows.into_iter().skip(offset).take(page.limit as usize).collect()
}
