use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use common::error::{AppError, AppResult};
use common::models::page::PageParams;
use common::response::PageData;
use common::utils::time_util::Clock;
use orm::entities::user::UserAddress;
use orm::store::address::{AddressStore, CityStore};

use super::bounded;

/// 收货地址保存请求，新增时 id 为空
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressReq {
    pub id: Option<i64>,
    pub uid: i64,
    pub real_name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub detail: String,
    pub post_code: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

fn validate_address(req: &AddressReq) -> AppResult<()> {
    if req.uid <= 0 {
        return Err(AppError::validation(format!("用户编号无效: {}", req.uid)));
    }
    if req.real_name.trim().is_empty() {
        return Err(AppError::validation("收货人姓名不能为空"));
    }
    if req.phone.trim().is_empty() {
        return Err(AppError::validation("收货人电话不能为空"));
    }
    if req.detail.trim().is_empty() {
        return Err(AppError::validation("详细地址不能为空"));
    }
    Ok(())
}

/// 收货地址服务
///
/// 每个用户至多一个默认地址。切换默认是「清旧 + 标新」两步写：
/// 默认走两步模式，第二步失败时库里会短暂没有默认地址，按可由
/// 调用方重试的冲突上报；配置打开 transactional_default 后两步
/// 放进同一事务，失败时旧默认保持不变。
pub struct UserAddressService {
    addresses: Arc<dyn AddressStore>,
    cities: Arc<dyn CityStore>,
    clock: Arc<dyn Clock>,
    query_timeout: Duration,
    transactional_default: bool,
}

impl UserAddressService {
    pub fn new(
        addresses: Arc<dyn AddressStore>,
        cities: Arc<dyn CityStore>,
        clock: Arc<dyn Clock>,
        query_timeout: Duration,
        transactional_default: bool,
    ) -> Self {
        Self { addresses, cities, clock, query_timeout, transactional_default }
    }

    /// 用户的地址分页，默认地址排最前
    pub async fn address_page(
        &self,
        uid: i64,
        page: &PageParams,
    ) -> AppResult<PageData<UserAddress>> {
        page.validate()?;
        let count = bounded(
            self.query_timeout,
            "地址总数查询",
            self.addresses.count_by_uid(uid),
        )
        .await?;
        let list = bounded(
            self.query_timeout,
            "地址列表查询",
            self.addresses.list_by_uid(uid, page),
        )
        .await?;
        Ok(PageData::new(list, count))
    }

    /// 用户当前默认地址
    pub async fn default_address(&self, uid: i64) -> AppResult<Option<UserAddress>> {
        bounded(
            self.query_timeout,
            "默认地址查询",
            self.addresses.find_default(uid),
        )
        .await
    }

    /// 新增或编辑地址，返回地址 id
    ///
    /// 城市名先精确后模糊解析成 city_id，解析不到按参数错误处理。
    pub async fn save_address(&self, req: &AddressReq) -> AppResult<i64> {
        validate_address(req)?;
        let city_id = bounded(
            self.query_timeout,
            "城市解析查询",
            self.cities.resolve_city_id(&req.city),
        )
        .await?
        .ok_or_else(|| AppError::validation(format!("城市不存在: {}", req.city)))?;

        let id = match req.id {
            Some(id) => {
                let existing = bounded(
                    self.query_timeout,
                    "地址查询",
                    self.addresses.find_by_id(id),
                )
                .await?
                .filter(|a| a.uid == Some(req.uid))
                .ok_or_else(|| AppError::not_found(format!("地址不存在: id={}", id)))?;

                let mut row = existing;
                row.real_name = Some(req.real_name.clone());
                row.phone = Some(req.phone.clone());
                row.province = Some(req.province.clone());
                row.city = Some(req.city.clone());
                row.city_id = Some(city_id);
                row.district = Some(req.district.clone());
                row.detail = Some(req.detail.clone());
                row.post_code = req.post_code.clone();
                bounded(self.query_timeout, "地址更新", self.addresses.update(&row)).await?;
                id
            }
            None => {
                let row = UserAddress {
                    id: None,
                    uid: Some(req.uid),
                    real_name: Some(req.real_name.clone()),
                    phone: Some(req.phone.clone()),
                    province: Some(req.province.clone()),
                    city: Some(req.city.clone()),
                    city_id: Some(city_id),
                    district: Some(req.district.clone()),
                    detail: Some(req.detail.clone()),
                    post_code: req.post_code.clone(),
                    is_default: Some(0),
                    is_del: Some(0),
                    add_time: Some(self.clock.now_ts()),
                };
                bounded(self.query_timeout, "地址写入", self.addresses.insert(&row)).await?
            }
        };

        if req.is_default {
            self.set_default(id, req.uid).await?;
        }
        Ok(id)
    }

    /// 把某个地址设为用户的默认地址
    pub async fn set_default(&self, id: i64, uid: i64) -> AppResult<()> {
        let owned = bounded(self.query_timeout, "地址查询", self.addresses.find_by_id(id))
            .await?
            .map(|a| a.uid == Some(uid))
            .unwrap_or(false);
        if !owned {
            return Err(AppError::not_found(format!("地址不存在: id={}", id)));
        }

        if self.transactional_default {
            return bounded(
                self.query_timeout,
                "默认地址切换",
                self.addresses.set_default_transactional(id, uid),
            )
            .await;
        }

        bounded(
            self.query_timeout,
            "默认地址清除",
            self.addresses.clear_default(uid),
        )
        .await?;
        let marked = bounded(
            self.query_timeout,
            "默认地址标记",
            self.addresses.mark_default(id, uid),
        )
        .await;
        match marked {
            Ok(0) => Err(AppError::inconsistent_default_address(format!(
                "默认标记未命中地址 id={}，该用户暂无默认地址，重新设置可恢复",
                id
            ))),
            Ok(_) => Ok(()),
            Err(e) => {
                log::warn!("默认地址标记失败: uid={}, id={}, {}", uid, id, e);
                Err(AppError::inconsistent_default_address(format!(
                    "默认标记写入失败，该用户暂无默认地址，重新设置可恢复: {}",
                    e
                )))
            }
        }
    }

    /// 软删除一个地址
    pub async fn delete_address(&self, id: i64, uid: i64) -> AppResult<()> {
        let affected = bounded(
            self.query_timeout,
            "地址删除",
            self.addresses.soft_delete(id, uid),
        )
        .await?;
        if affected == 0 {
            return Err(AppError::not_found(format!("地址不存在: id={}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::time_util::FixedClock;
    use orm::entities::system::SystemCity;
    use orm::store::address::{MemAddressStore, MemCityStore};

    fn seeded_cities() -> Arc<MemCityStore> {
        let cities = Arc::new(MemCityStore::new());
        cities.push_city(SystemCity {
            city_id: Some(130600),
            name: Some("保定市".to_string()),
            parent_id: Some(130000),
            ..Default::default()
        });
        cities
    }

    fn service(addresses: Arc<MemAddressStore>, transactional: bool) -> UserAddressService {
        UserAddressService::new(
            addresses,
            seeded_cities(),
            Arc::new(FixedClock::new(1_700_000_000)),
            Duration::from_secs(5),
            transactional,
        )
    }

    fn req(uid: i64, is_default: bool) -> AddressReq {
        AddressReq {
            id: None,
            uid,
            real_name: "张三".to_string(),
            phone: "13800000000".to_string(),
            province: "河北省".to_string(),
            city: "保定市".to_string(),
            district: "莲池区".to_string(),
            detail: "七一路 1 号".to_string(),
            post_code: Some("071000".to_string()),
            is_default,
        }
    }

    #[tokio::test]
    async fn save_resolves_city_and_lists_default_first() {
        let service = service(Arc::new(MemAddressStore::new()), false);

        let plain = service.save_address(&req(1, false)).await.unwrap();
        let main = service.save_address(&req(1, true)).await.unwrap();

        let page = service.address_page(1, &PageParams::new(1, 10)).await.unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.list[0].id, Some(main));
        assert_eq!(page.list[0].city_id, Some(130600));
        assert_eq!(page.list[0].add_time, Some(1_700_000_000));
        assert_eq!(page.list[1].id, Some(plain));

        // 模糊写法也能解析
        let mut fuzzy = req(1, false);
        fuzzy.city = "保定".to_string();
        service.save_address(&fuzzy).await.unwrap();

        let mut unknown = req(1, false);
        unknown.city = "不存在的城市".to_string();
        let err = service.save_address(&unknown).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut blank = req(1, false);
        blank.real_name = "  ".to_string();
        let err = service.save_address(&blank).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn toggle_keeps_exactly_one_default() {
        let addresses = Arc::new(MemAddressStore::new());
        let service = service(addresses.clone(), false);

        let first = service.save_address(&req(1, true)).await.unwrap();
        let second = service.save_address(&req(1, false)).await.unwrap();
        assert_eq!(addresses.count_defaults(1).await.unwrap(), 1);

        service.set_default(second, 1).await.unwrap();
        assert_eq!(addresses.count_defaults(1).await.unwrap(), 1);
        let default = service.default_address(1).await.unwrap().unwrap();
        assert_eq!(default.id, Some(second));

        // 再切回来仍然只有一个默认
        service.set_default(first, 1).await.unwrap();
        assert_eq!(addresses.count_defaults(1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn two_step_failure_leaves_no_default_but_is_recoverable() {
        let addresses = Arc::new(MemAddressStore::new());
        let service = service(addresses.clone(), false);

        service.save_address(&req(1, true)).await.unwrap();
        let second = service.save_address(&req(1, false)).await.unwrap();

        addresses.fail_next_mark();
        let err = service.set_default(second, 1).await.unwrap_err();
        assert!(matches!(err, AppError::InconsistentDefaultAddress(_)));
        assert!(err.is_retryable());
        // 清旧一步已生效，库里暂时没有默认地址，但没有半新半旧的数据
        assert_eq!(addresses.count_defaults(1).await.unwrap(), 0);

        // 重试即可恢复
        service.set_default(second, 1).await.unwrap();
        let default = service.default_address(1).await.unwrap().unwrap();
        assert_eq!(default.id, Some(second));
    }

    #[tokio::test]
    async fn transactional_failure_keeps_old_default() {
        let addresses = Arc::new(MemAddressStore::new());
        let service = service(addresses.clone(), true);

        let first = service.save_address(&req(1, true)).await.unwrap();
        let second = service.save_address(&req(1, false)).await.unwrap();

        addresses.fail_next_mark();
        assert!(service.set_default(second, 1).await.is_err());
        // 事务回滚，旧默认原样保留
        assert_eq!(addresses.count_defaults(1).await.unwrap(), 1);
        let default = service.default_address(1).await.unwrap().unwrap();
        assert_eq!(default.id, Some(first));
    }

    #[tokio::test]
    async fn ownership_is_checked_on_edit_and_delete() {
        let addresses = Arc::new(MemAddressStore::new());
        let service = service(addresses, false);

        let id = service.save_address(&req(1, false)).await.unwrap();

        // 别人的地址既改不了也删不掉
        let mut theft = req(2, false);
        theft.id = Some(id);
        let err = service.save_address(&theft).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete_address(id, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.set_default(999, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        service.delete_address(id, 1).await.unwrap();
        let err = service.delete_address(id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_keeps_id_and_updates_fields() {
        let addresses = Arc::new(MemAddressStore::new());
        let service = service(addresses.clone(), false);

        let id = service.save_address(&req(1, true)).await.unwrap();
        let mut edit = req(1, false);
        edit.id = Some(id);
        edit.detail = "朝阳大街 2 号".to_string();
        let saved = service.save_address(&edit).await.unwrap();
        assert_eq!(saved, id);

        let row = addresses.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(row.detail.as_deref(), Some("朝阳大街 2 号"));
        // 编辑不带默认标记时，原默认状态不动
        assert_eq!(row.is_default, Some(1));
    }
}
