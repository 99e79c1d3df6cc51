//! 收货地址与城市数据存取

use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use rbatis::executor::Executor;
use rbatis::RBatis;
use rbs::Value;
use std::sync::Arc;

use common::error::{AppError, AppResult};
use common::models::page::PageParams;

use crate::entities::system::SystemCity;
use crate::entities::user::UserAddress;

use async_trait::async_trait;

/// 地址存取接口
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// 用户的地址分页，默认地址在前
    async fn list_by_uid(&self, uid: i64, page: &PageParams) -> AppResult<Vec<UserAddress>>;

    async fn count_by_uid(&self, uid: i64) -> AppResult<i64>;

    /// 按 id 查找，已删除的不返回
    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserAddress>>;

    /// 用户当前默认地址
    async fn find_default(&self, uid: i64) -> AppResult<Option<UserAddress>>;

    /// 用户名下默认地址条数
    async fn count_defaults(&self, uid: i64) -> AppResult<i64>;

    /// 新增地址，返回主键
    async fn insert(&self, address: &UserAddress) -> AppResult<i64>;

    /// 按主键更新，返回影响行数
    async fn update(&self, address: &UserAddress) -> AppResult<u64>;

    /// 清除用户的默认标记，返回影响行数
    async fn clear_default(&self, uid: i64) -> AppResult<u64>;

    /// 把指定地址标记为默认，返回影响行数
    async fn mark_default(&self, id: i64, uid: i64) -> AppResult<u64>;

    /// 清除加标记在同一事务内完成
    async fn set_default_transactional(&self, id: i64, uid: i64) -> AppResult<()>;

    /// 软删除，返回影响行数
    async fn soft_delete(&self, id: i64, uid: i64) -> AppResult<u64>;
}

/// 城市数据接口
#[async_trait]
pub trait CityStore: Send + Sync {
    /// 城市名转城市编号，先精确匹配再模糊匹配
    async fn resolve_city_id(&self, name: &str) -> AppResult<Option<i64>>;
}

/// 基于 rbatis 的地址存取实现
pub struct DbAddressStore {
    rb: Arc<RBatis>,
}

impl DbAddressStore {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }
}

#[async_trait]
impl AddressStore for DbAddressStore {
    async fn list_by_uid(&self, uid: i64, page: &PageParams) -> AppResult<Vec<UserAddress>> {
        let sql = format!(
            "SELECT * FROM {} WHERE uid = ? AND is_del = 0 \
             ORDER BY is_default DESC, id DESC LIMIT ?, ?",
            UserAddress::TABLE_NAME
        );
        let rows: Vec<UserAddress> = self
            .rb
            .query_decode(
                &sql,
                vec![uid.into(), page.offset().into(), page.limit.into()],
            )
            .await?;
        Ok(rows)
    }

    async fn count_by_uid(&self, uid: i64) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(id) FROM {} WHERE uid = ? AND is_del = 0",
            UserAddress::TABLE_NAME
        );
        let count: i64 = self.rb.query_decode(&sql, vec![uid.into()]).await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserAddress>> {
        let found = UserAddress::select_by_id(self.rb.as_ref(), id).await?;
        Ok(found)
    }

    async fn find_default(&self, uid: i64) -> AppResult<Option<UserAddress>> {
        let found = UserAddress::select_default(self.rb.as_ref(), uid).await?;
        Ok(found)
    }

    async fn count_defaults(&self, uid: i64) -> AppResult<i64> {
        let sql = format!(
            "SELECT COUNT(id) FROM {} WHERE uid = ? AND is_default = 1 AND is_del = 0",
            UserAddress::TABLE_NAME
        );
        let count: i64 = self.rb.query_decode(&sql, vec![uid.into()]).await?;
        Ok(count)
    }

    async fn insert(&self, address: &UserAddress) -> AppResult<i64> {
        let result = UserAddress::insert(self.rb.as_ref(), address).await?;
        Ok(result.last_insert_id.as_i64().unwrap_or_default())
    }

    async fn update(&self, address: &UserAddress) -> AppResult<u64> {
        let result = UserAddress::update_by_column(self.rb.as_ref(), address, "id").await?;
        Ok(result.rows_affected)
    }

    async fn clear_default(&self, uid: i64) -> AppResult<u64> {
        let sql = format!(
            "UPDATE {} SET is_default = 0 WHERE uid = ? AND is_default = 1",
            UserAddress::TABLE_NAME
        );
        let result = self.rb.exec(&sql, vec![uid.into()]).await?;
        Ok(result.rows_affected)
    }

    async fn mark_default(&self, id: i64, uid: i64) -> AppResult<u64> {
        let sql = format!(
            "UPDATE {} SET is_default = 1 WHERE id = ? AND uid = ? AND is_del = 0",
            UserAddress::TABLE_NAME
        );
        let result = self.rb.exec(&sql, vec![id.into(), uid.into()]).await?;
        Ok(result.rows_affected)
    }

    async fn set_default_transactional(&self, id: i64, uid: i64) -> AppResult<()> {
        let clear_sql = format!(
            "UPDATE {} SET is_default = 0 WHERE uid = ? AND is_default = 1",
            UserAddress::TABLE_NAME
        );
        let mark_sql = format!(
            "UPDATE {} SET is_default = 1 WHERE id = ? AND uid = ? AND is_del = 0",
            UserAddress::TABLE_NAME
        );
        let tx = self.rb.acquire_begin().await?;
        let applied = async {
            tx.exec(&clear_sql, vec![uid.into()]).await?;
            let marked = tx
                .exec(&mark_sql, vec![Value::from(id), Value::from(uid)])
                .await?;
            Ok::<u64, rbatis::Error>(marked.rows_affected)
        }
        .await;
        match applied {
            Ok(0) => {
                let _ = tx.rollback().await;
                Err(AppError::not_found(format!("地址不存在: id={}", id)))
            }
            Ok(_) => {
                tx.commit().await?;
                Ok(())
            }
            Err(e) => {
                log::warn!("默认地址事务失败，已回滚: {}", e);
                let _ = tx.rollback().await;
                Err(e.into())
            }
        }
    }

    async fn soft_delete(&self, id: i64, uid: i64) -> AppResult<u64> {
        let sql = format!(
            "UPDATE {} SET is_del = 1 WHERE id = ? AND uid = ?",
            UserAddress::TABLE_NAME
        );
        let result = self.rb.exec(&sql, vec![id.into(), uid.into()]).await?;
        Ok(result.rows_affected)
    }
}

/// 基于 rbatis 的城市数据实现
pub struct DbCityStore {
    rb: Arc<RBatis>,
}

impl DbCityStore {
    pub fn new(rb: Arc<RBatis>) -> Self {
        Self { rb }
    }
}

#[async_trait]
impl CityStore for DbCityStore {
    async fn resolve_city_id(&self, name: &str) -> AppResult<Option<i64>> {
        if let Some(city) = SystemCity::select_by_name(self.rb.as_ref(), name).await? {
            return Ok(city.city_id);
        }
        // 精确匹配不到时退回模糊匹配，兼容「北京」与「北京市」这类写法
        let sql = format!(
            "SELECT city_id FROM {} WHERE name LIKE ? AND parent_id != 0 LIMIT 1",
            SystemCity::TABLE_NAME
        );
        let city_id: Option<i64> = self
            .rb
            .query_decode(&sql, vec![format!("%{}%", name).into()])
            .await?;
        Ok(city_id)
    }
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// 内存地址存取，测试用
///
/// mark_default 支持注入一次性失败，模拟两步写在中间断开的场景。
pub struct MemAddressStore {
    rows: Mutex<Vec<UserAddress>>,
    next_id: AtomicI64,
    fail_next_mark: AtomicBool,
}

impl Default for MemAddressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemAddressStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            fail_next_mark: AtomicBool::new(false),
        }
    }

    /// 下一次 mark_default / set_default_transactional 返回存储失败
    pub fn fail_next_mark(&self) {
        self.fail_next_mark.store(true, Ordering::SeqCst);
    }

    fn take_fail_flag(&self) -> bool {
        self.fail_next_mark.swap(false, Ordering::SeqCst)
    }

    fn active_rows(&self, uid: i64) -> Vec<UserAddress> {
        let rows = guard(&self.rows);
        let mut matched: Vec<UserAddress> = rows
            .iter()
            .filter(|a| a.uid == Some(uid) && a.is_del == Some(0))
            .cloned()
            .collect();
        matched.sort_by_key(|a| {
            (
                Reverse(a.is_default.unwrap_or(0)),
                Reverse(a.id.unwrap_or(0)),
            )
        });
        matched
    }
}

#[async_trait]
impl AddressStore for MemAddressStore {
    async fn list_by_uid(&self, uid: i64, page: &PageParams) -> AppResult<Vec<UserAddress>> {
        let rows = self.active_rows(uid);
        let offset = page.offset() as usize;
        if offset >= rows.len() {
            return Ok(Vec::new());
        }
        let end = (offset + page.limit as usize).min(rows.len());
        Ok(rows[offset..end].to_vec())
    }

    async fn count_by_uid(&self, uid: i64) -> AppResult<i64> {
        Ok(self.active_rows(uid).len() as i64)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<UserAddress>> {
        let rows = guard(&self.rows);
        Ok(rows
            .iter()
            .find(|a| a.id == Some(id) && a.is_del == Some(0))
            .cloned())
    }

    async fn find_default(&self, uid: i64) -> AppResult<Option<UserAddress>> {
        let rows = guard(&self.rows);
        Ok(rows
            .iter()
            .find(|a| a.uid == Some(uid) && a.is_default == Some(1) && a.is_del == Some(0))
            .cloned())
    }

    async fn count_defaults(&self, uid: i64) -> AppResult<i64> {
        let rows = guard(&self.rows);
        Ok(rows
            .iter()
            .filter(|a| a.uid == Some(uid) && a.is_default == Some(1) && a.is_del == Some(0))
            .count() as i64)
    }

    async fn insert(&self, address: &UserAddress) -> AppResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut row = address.clone();
        row.id = Some(id);
        if row.is_del.is_none() {
            row.is_del = Some(0);
        }
        guard(&self.rows).push(row);
        Ok(id)
    }

    async fn update(&self, address: &UserAddress) -> AppResult<u64> {
        let mut rows = guard(&self.rows);
        for row in rows.iter_mut() {
            if row.id == address.id {
                *row = address.clone();
                return Ok(1);
            }
        }
        Ok(0)
    }

    async fn clear_default(&self, uid: i64) -> AppResult<u64> {
        let mut rows = guard(&self.rows);
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.uid == Some(uid) && row.is_default == Some(1) {
                row.is_default = Some(0);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn mark_default(&self, id: i64, uid: i64) -> AppResult<u64> {
        if self.take_fail_flag() {
            return Err(AppError::store_unavailable("注入的标记失败"));
        }
        let mut rows = guard(&self.rows);
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.id == Some(id) && row.uid == Some(uid) && row.is_del == Some(0) {
                row.is_default = Some(1);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn set_default_transactional(&self, id: i64, uid: i64) -> AppResult<()> {
        // 注入失败时不做任何修改，等价于整个事务回滚
        if self.take_fail_flag() {
            return Err(AppError::store_unavailable("注入的事务失败"));
        }
        let mut rows = guard(&self.rows);
        if !rows
            .iter()
            .any(|a| a.id == Some(id) && a.uid == Some(uid) && a.is_del == Some(0))
        {
            return Err(AppError::not_found(format!("地址不存在: id={}", id)));
        }
        for row in rows.iter_mut() {
            if row.uid == Some(uid) && row.is_default == Some(1) {
                row.is_default = Some(0);
            }
        }
        for row in rows.iter_mut() {
            if row.id == Some(id) && row.uid == Some(uid) {
                row.is_default = Some(1);
            }
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i64, uid: i64) -> AppResult<u64> {
        let mut rows = guard(&self.rows);
        let mut affected = 0;
        for row in rows.iter_mut() {
            if row.id == Some(id) && row.uid == Some(uid) && row.is_del == Some(0) {
                row.is_del = Some(1);
                affected += 1;
            }
        }
        Ok(affected)
    }
}

/// 内存城市数据，测试用
#[derive(Default)]
pub struct MemCityStore {
    cities: Mutex<Vec<SystemCity>>,
}

impl MemCityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_city(&self, city: SystemCity) {
        guard(&self.cities).push(city);
    }
}

#[async_trait]
impl CityStore for MemCityStore {
    async fn resolve_city_id(&self, name: &str) -> AppResult<Option<i64>> {
        let cities = guard(&self.cities);
        let exact = cities
            .iter()
            .find(|c| c.name.as_deref() == Some(name) && c.parent_id != Some(0));
        if let Some(city) = exact {
            return Ok(city.city_id);
        }
        let fuzzy = cities
            .iter()
            .find(|c| {
                c.parent_id != Some(0)
                    && c.name
                        .as_deref()
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
            });
        Ok(fuzzy.and_then(|c| c.city_id))
    }
}
