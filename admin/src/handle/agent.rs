use actix_web::{get, web, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::models::page::PageParams;
use common::response::R;

use crate::service::agent_report_service::ReportFilter;
use crate::service::visit_stat_service::WindowSpec;
use crate::state::AppState;

use super::optional_range;

#[derive(Debug, Deserialize)]
pub struct AgentIndexQuery {
    pub keyword: Option<String>,
    pub status: Option<i32>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/agent/index?keyword=张&start=1700000000&end=1700600000&page=1&limit=20
/// 分销员业绩报表，按累计佣金降序
#[get("/adminapi/agent/index")]
pub async fn index(
    query: web::Query<AgentIndexQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    log::info!(
        "分销报表查询: keyword={:?}, status={:?}, page={:?}",
        query.keyword,
        query.status,
        query.page
    );
    let filter = ReportFilter {
        keyword: query.keyword,
        window: optional_range(query.start, query.end)?,
        status: query.status,
        ..Default::default()
    };
    let page = PageParams::from_req(query.page, query.limit);
    let data = state.report_service.build_report(&filter, &page).await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct StairQuery {
    pub uid: i64,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/agent/stair?uid=1&page=1&limit=20
/// 某分销员的直推下级报表
#[get("/adminapi/agent/stair")]
pub async fn stair(
    query: web::Query<StairQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let page = PageParams::from_req(query.page, query.limit);
    let data = state.report_service.recruit_report(query.uid, &page).await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct RankQuery {
    pub window: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/agent/rank?window=week&page=1&limit=20
/// 推广人数榜单，window 支持 today/week，也可以换成显式的 start/end
#[get("/adminapi/agent/rank")]
pub async fn rank(
    query: web::Query<RankQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let range = WindowSpec::from_req(query.window.as_deref(), query.start, query.end)?
        .resolve(state.clock.now_ts())?;
    let page = PageParams::from_req(query.page, query.limit);
    let data = state.report_service.rank_report(range, &page).await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct UidQuery {
    pub uid: i64,
}

/// GET /adminapi/agent/referrer?uid=5
/// 查询用户的推荐人，顶级用户返回空
#[get("/adminapi/agent/referrer")]
pub async fn referrer(
    query: web::Query<UidQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let data = state.referral_service.referrer_of(query.uid).await?;
    R::success(data)
}
