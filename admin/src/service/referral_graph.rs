use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::constants::NO_SPREAD_UID;
use common::error::{AppError, AppResult};
use common::models::page::PageParams;
use common::response::PageData;
use orm::entities::user::User;
use orm::store::{RecordStore, UserQuery};

use super::bounded;

/// 推荐关系解析器
///
/// 只解析一层关系：某用户的直推下级，以及某用户的推荐人。
/// 下级的下级不在口径内，需要时由调用方逐层再查。
pub struct ReferralGraphResolver {
    store: Arc<dyn RecordStore>,
    query_timeout: Duration,
}

impl ReferralGraphResolver {
    pub fn new(store: Arc<dyn RecordStore>, query_timeout: Duration) -> Self {
        Self { store, query_timeout }
    }

    /// 按筛选条件圈定候选推广人，uid 降序
    pub async fn candidates(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        bounded(
            self.query_timeout,
            "候选用户查询",
            self.store.select_users(query),
        )
        .await
    }

    /// 某推荐人的直推下级分页，uid 降序
    ///
    /// count 是全部下级的条数，不随页码变化；spread_uid 指向自身的脏数据不计入。
    pub async fn recruits_of(&self, spread_uid: i64, page: &PageParams) -> AppResult<PageData<User>> {
        if spread_uid <= NO_SPREAD_UID {
            return Err(AppError::invalid_filter(format!("推荐人编号无效: {}", spread_uid)));
        }
        page.validate()?;
        let count = bounded(
            self.query_timeout,
            "下级人数查询",
            self.store.count_recruits(spread_uid),
        )
        .await?;
        let list = bounded(
            self.query_timeout,
            "下级列表查询",
            self.store.select_recruits(spread_uid, page),
        )
        .await?;
        Ok(PageData::new(list, count))
    }

    /// 某用户的推荐人，顶级用户返回 None
    pub async fn referrer_of(&self, uid: i64) -> AppResult<Option<User>> {
        let user = bounded(self.query_timeout, "用户查询", self.store.find_user(uid))
            .await?
            .ok_or_else(|| AppError::not_found(format!("用户不存在: {}", uid)))?;
        let spread_uid = match user.spread_uid {
            Some(spread) if spread != NO_SPREAD_UID && spread != uid => spread,
            _ => return Ok(None),
        };
        let referrer = bounded(
            self.query_timeout,
            "推荐人查询",
            self.store.find_user(spread_uid),
        )
        .await?;
        if referrer.is_none() {
            log::warn!("推荐人记录缺失: uid={}, spread_uid={}", uid, spread_uid);
        }
        Ok(referrer)
    }

    /// 批量解析推荐人，键是推荐人 uid，查不到的键不出现
    pub async fn referrers_by_uids(&self, uids: &[i64]) -> AppResult<HashMap<i64, User>> {
        if uids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = bounded(
            self.query_timeout,
            "推荐人批量查询",
            self.store.select_users_by_uids(uids),
        )
        .await?;
        Ok(users
            .into_iter()
            .filter_map(|u| u.uid.map(|uid| (uid, u)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orm::store::mem::MemRecordStore;

    fn user(uid: i64, spread_uid: i64) -> User {
        User {
            uid: Some(uid),
            nickname: Some(format!("用户{}", uid)),
            spread_uid: Some(spread_uid),
            add_time: Some(1_600_000_000 + uid),
            ..Default::default()
        }
    }

    fn resolver(store: Arc<MemRecordStore>) -> ReferralGraphResolver {
        ReferralGraphResolver::new(store, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn recruits_page_keeps_full_count() {
        let store = Arc::new(MemRecordStore::new());
        store.push_user(user(1, 0));
        for uid in 2..=5 {
            store.push_user(user(uid, 1));
        }
        store.push_user(user(9, 3));

        let resolver = resolver(store);
        let page = resolver.recruits_of(1, &PageParams::new(1, 3)).await.unwrap();
        assert_eq!(page.count, 4);
        let uids: Vec<i64> = page.list.iter().filter_map(|u| u.uid).collect();
        assert_eq!(uids, vec![5, 4, 3]);

        let rest = resolver.recruits_of(1, &PageParams::new(2, 3)).await.unwrap();
        assert_eq!(rest.count, 4);
        let uids: Vec<i64> = rest.list.iter().filter_map(|u| u.uid).collect();
        assert_eq!(uids, vec![2]);
    }

    #[tokio::test]
    async fn recruits_rejects_bad_params() {
        let store = Arc::new(MemRecordStore::new());
        let resolver = resolver(store);

        let err = resolver.recruits_of(0, &PageParams::new(1, 20)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));

        let err = resolver.recruits_of(1, &PageParams::new(0, 20)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn referrer_follows_one_level() {
        let store = Arc::new(MemRecordStore::new());
        store.push_user(user(1, 0));
        store.push_user(user(2, 1));
        store.push_user(user(3, 2));

        let resolver = resolver(store);
        let referrer = resolver.referrer_of(3).await.unwrap().unwrap();
        // 只上溯一层，uid=3 的推荐人是 2 而不是 1
        assert_eq!(referrer.uid, Some(2));
        assert!(resolver.referrer_of(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn referrers_map_skips_missing_uids() {
        let store = Arc::new(MemRecordStore::new());
        store.push_user(user(1, 0));
        store.push_user(user(2, 1));

        let resolver = resolver(store);
        let map = resolver.referrers_by_uids(&[1, 999]).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&1).and_then(|u| u.nickname.clone()),
            Some("用户1".to_string())
        );
        assert!(resolver.referrers_by_uids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn referrer_tolerates_dirty_links() {
        let store = Arc::new(MemRecordStore::new());
        store.push_user(user(7, 7));
        store.push_user(user(8, 999));

        let resolver = resolver(store);
        // 自引和悬空的 spread_uid 都按无推荐人处理
        assert!(resolver.referrer_of(7).await.unwrap().is_none());
        assert!(resolver.referrer_of(8).await.unwrap().is_none());

        let err = resolver.referrer_of(404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
