use actix_web::{get, post, web, Responder};
use serde::Deserialize;

use common::enums::ChargeType;
use common::error::AppError;
use common::models::page::PageParams;
use common::response::R;

use crate::service::shipping_template_service::TemplateReq;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplateListQuery {
    pub keyword: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/shipping/list?keyword=包邮&page=1&limit=20
/// 运费模板分页
#[get("/adminapi/shipping/list")]
pub async fn list(
    query: web::Query<TemplateListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let page = PageParams::from_req(query.page, query.limit);
    let data = state
        .shipping_service
        .template_page(query.keyword.as_deref(), &page)
        .await?;
    R::success(data)
}

/// GET /adminapi/shipping/charge_types
/// 计费方式下拉选项
#[get("/adminapi/shipping/charge_types")]
pub async fn charge_types() -> Result<impl Responder, AppError> {
    R::success(ChargeType::all_labels())
}

/// POST /adminapi/shipping/save
/// 新增或编辑运费模板，返回模板 id
#[post("/adminapi/shipping/save")]
pub async fn save(
    req: web::Json<TemplateReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let id = state.shipping_service.save_template(&req.into_inner()).await?;
    R::success(id)
}

#[derive(Debug, Deserialize)]
pub struct IdReq {
    pub id: i64,
}

/// POST /adminapi/shipping/del
/// 删除运费模板，系统默认模板不可删
#[post("/adminapi/shipping/del")]
pub async fn delete(
    req: web::Json<IdReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.shipping_service.delete_template(req.id).await?;
    R::ok()
}
