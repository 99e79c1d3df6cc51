use actix_web::{get, web, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::models::page::PageParams;
use common::response::R;
use orm::store::UserQuery;

use crate::service::visit_stat_service::{ActivityKind, WindowSpec};
use crate::state::AppState;

use super::optional_range;

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub keyword: Option<String>,
    pub status: Option<i32>,
    pub spread_uid: Option<i64>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/user/list?keyword=138&page=1&limit=20
/// 用户分页列表，uid 降序
#[get("/adminapi/user/list")]
pub async fn list(
    query: web::Query<UserListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let user_query = UserQuery {
        keyword: query.keyword,
        window: optional_range(query.start, query.end)?,
        status: query.status,
        spread_uid: query.spread_uid,
    };
    let page = PageParams::from_req(query.page, query.limit);
    let data = state.user_service.user_page(&user_query, &page).await?;
    R::success(data)
}

/// GET /adminapi/user/count
/// 用户总体概况
#[get("/adminapi/user/count")]
pub async fn count(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let data = state.user_service.user_summary().await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub window: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// visit 或 register，缺省按 visit
    pub kind: Option<String>,
}

/// GET /adminapi/user/visit?window=today&kind=visit
/// 窗口内的活跃人数，window 支持 today/week 或显式 start/end
#[get("/adminapi/user/visit")]
pub async fn visit(
    query: web::Query<VisitQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let kind = match query.kind.as_deref() {
        None | Some("visit") => ActivityKind::Visit,
        Some("register") => ActivityKind::Registration,
        Some(other) => {
            return Err(AppError::invalid_filter(format!("活跃口径无效: {}", other)));
        }
    };
    let window = WindowSpec::from_req(query.window.as_deref(), query.start, query.end)?;
    let data = state.visit_service.count_in_window(&window, kind).await?;
    R::success(data)
}

/// GET /adminapi/user/dashboard
/// 首页概览：今日与本周的访问、注册人数
#[get("/adminapi/user/dashboard")]
pub async fn dashboard(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let data = state.visit_service.dashboard_counts().await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub window: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

/// GET /adminapi/user/register_series?start=1700000000&end=1700600000
/// 按天统计的注册人数
#[get("/adminapi/user/register_series")]
pub async fn register_series(
    query: web::Query<SeriesQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let range = WindowSpec::from_req(query.window.as_deref(), query.start, query.end)?
        .resolve(state.clock.now_ts())?;
    let data = state.user_service.registration_series(&range).await?;
    R::success(data)
}
