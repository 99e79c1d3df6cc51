use actix_web::{get, post, web, Responder};
use serde::Deserialize;

use common::error::AppError;
use common::models::page::PageParams;
use common::response::R;

use crate::service::user_address_service::AddressReq;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressListQuery {
    pub uid: i64,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /adminapi/address/list?uid=1&page=1&limit=20
/// 用户的收货地址分页，默认地址排最前
#[get("/adminapi/address/list")]
pub async fn list(
    query: web::Query<AddressListQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let page = PageParams::from_req(query.page, query.limit);
    let data = state.address_service.address_page(query.uid, &page).await?;
    R::success(data)
}

#[derive(Debug, Deserialize)]
pub struct UidQuery {
    pub uid: i64,
}

/// GET /adminapi/address/default?uid=1
/// 用户当前默认地址，没有时返回空
#[get("/adminapi/address/default")]
pub async fn default_address(
    query: web::Query<UidQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let data = state.address_service.default_address(query.uid).await?;
    R::success(data)
}

/// POST /adminapi/address/save
/// 新增或编辑收货地址，返回地址 id
#[post("/adminapi/address/save")]
pub async fn save(
    req: web::Json<AddressReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let req = req.into_inner();
    log::info!("保存收货地址: uid={}, id={:?}, is_default={}", req.uid, req.id, req.is_default);
    let id = state.address_service.save_address(&req).await?;
    R::success(id)
}

#[derive(Debug, Deserialize)]
pub struct AddressIdReq {
    pub id: i64,
    pub uid: i64,
}

/// POST /adminapi/address/default/set
/// 切换默认地址
#[post("/adminapi/address/default/set")]
pub async fn set_default(
    req: web::Json<AddressIdReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    log::info!("切换默认地址: uid={}, id={}", req.uid, req.id);
    state.address_service.set_default(req.id, req.uid).await?;
    R::ok()
}

/// POST /adminapi/address/del
/// 删除收货地址
#[post("/adminapi/address/del")]
pub async fn delete(
    req: web::Json<AddressIdReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.address_service.delete_address(req.id, req.uid).await?;
    R::ok()
}
