use std::sync::Arc;

use rbatis::RBatis;
use serde::Deserialize;

use common::constants::DEFAULT_SHIPPING_TEMPLATE_ID;
use common::enums::ChargeType;
use common::error::{AppError, AppResult};
use common::models::page::PageParams;
use common::response::PageData;
use common::utils::time_util::Clock;
use orm::entities::system::ShippingTemplate;

/// 运费模板保存请求，新增时 id 为空
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReq {
    pub id: Option<i64>,
    pub name: String,
    /// 计费方式，取值见 [`ChargeType`]
    #[serde(rename = "type")]
    pub charge_type: i32,
    /// 是否指定包邮
    #[serde(default)]
    pub appoint: bool,
    #[serde(default)]
    pub sort: i32,
}

fn validate_template(req: &TemplateReq) -> AppResult<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::validation("模板名称不能为空"));
    }
    if ChargeType::from_code(req.charge_type).is_none() {
        return Err(AppError::validation(format!("计费方式无效: {}", req.charge_type)));
    }
    Ok(())
}

/// 运费模板服务
pub struct ShippingTemplateService {
    rb: Arc<RBatis>,
    clock: Arc<dyn Clock>,
}

impl ShippingTemplateService {
    pub fn new(rb: Arc<RBatis>, clock: Arc<dyn Clock>) -> Self {
        Self { rb, clock }
    }

    /// 模板分页，按 sort、id 降序
    pub async fn template_page(
        &self,
        keyword: Option<&str>,
        page: &PageParams,
    ) -> AppResult<PageData<ShippingTemplate>> {
        page.validate()?;
        let mut where_sql = String::new();
        let mut args: Vec<rbs::Value> = Vec::new();
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            where_sql = " WHERE name LIKE ?".to_string();
            args.push(format!("%{}%", keyword).into());
        }

        let count_sql = format!(
            "SELECT COUNT(id) FROM {}{}",
            ShippingTemplate::TABLE_NAME,
            where_sql
        );
        let count: i64 = self.rb.query_decode(&count_sql, args.clone()).await?;

        let list_sql = format!(
            "SELECT * FROM {}{} ORDER BY sort DESC, id DESC LIMIT ?, ?",
            ShippingTemplate::TABLE_NAME,
            where_sql
        );
        args.push(page.offset().into());
        args.push(page.limit.into());
        let list: Vec<ShippingTemplate> = self.rb.query_decode(&list_sql, args).await?;
        Ok(PageData::new(list, count))
    }

    /// 新增或编辑模板，返回模板 id
    ///
    /// 模板名称全局唯一。
    pub async fn save_template(&self, req: &TemplateReq) -> AppResult<i64> {
        validate_template(req)?;
        let dup_sql = format!(
            "SELECT COUNT(id) FROM {} WHERE name = ? AND id <> ?",
            ShippingTemplate::TABLE_NAME
        );
        let dup: i64 = self
            .rb
            .query_decode(
                &dup_sql,
                vec![req.name.clone().into(), req.id.unwrap_or(0).into()],
            )
            .await?;
        if dup > 0 {
            return Err(AppError::business(format!("模板名称已存在: {}", req.name)));
        }

        match req.id {
            Some(id) => {
                let mut row = ShippingTemplate::select_by_id(self.rb.as_ref(), id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("运费模板不存在: id={}", id)))?;
                row.name = Some(req.name.clone());
                row.charge_type = Some(req.charge_type);
                row.appoint = Some(i32::from(req.appoint));
                row.sort = Some(req.sort);
                ShippingTemplate::update_by_column(self.rb.as_ref(), &row, "id").await?;
                log::info!("运费模板已更新: id={}, name={}", id, req.name);
                Ok(id)
            }
            None => {
                let row = ShippingTemplate {
                    id: None,
                    name: Some(req.name.clone()),
                    charge_type: Some(req.charge_type),
                    appoint: Some(i32::from(req.appoint)),
                    sort: Some(req.sort),
                    add_time: Some(self.clock.now_ts()),
                };
                let result = ShippingTemplate::insert(self.rb.as_ref(), &row).await?;
                let id = result.last_insert_id.as_i64().unwrap_or_default();
                log::info!("运费模板已创建: id={}, name={}", id, req.name);
                Ok(id)
            }
        }
    }

    /// 删除模板，系统默认模板不可删
    pub async fn delete_template(&self, id: i64) -> AppResult<()> {
        if id == DEFAULT_SHIPPING_TEMPLATE_ID {
            return Err(AppError::business("默认模板不能删除"));
        }
        let result = ShippingTemplate::delete_by_column(self.rb.as_ref(), "id", id).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found(format!("运费模板不存在: id={}", id)));
        }
        log::info!("运费模板已删除: id={}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str, charge_type: i32) -> TemplateReq {
        TemplateReq {
            id: None,
            name: name.to_string(),
            charge_type,
            appoint: false,
            sort: 0,
        }
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert!(validate_template(&req("顺丰包邮", 1)).is_ok());
        let err = validate_template(&req("  ", 1)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn validate_rejects_unknown_charge_type() {
        let err = validate_template(&req("顺丰包邮", 9)).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        for code in [1, 2, 3] {
            assert!(validate_template(&req("顺丰包邮", code)).is_ok());
        }
    }
}
