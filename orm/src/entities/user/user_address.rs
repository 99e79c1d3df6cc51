use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 用户收货地址表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAddress {
    pub id: Option<i64>,
    pub uid: Option<i64>,
    pub real_name: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    /// 城市编号，由城市名解析得到
    pub city_id: Option<i64>,
    pub district: Option<String>,
    pub detail: Option<String>,
    pub post_code: Option<String>,
    /// 是否默认地址，每个用户至多一条为 1
    pub is_default: Option<i32>,
    /// 软删除标记
    pub is_del: Option<i32>,
    pub add_time: Option<i64>,
}

crud!(UserAddress {}, "eb_user_address");
impl_select!(UserAddress{select_by_id(id: i64) -> Option => "`where id = #{id} and is_del = 0 limit 1`"}, "eb_user_address");
impl_select!(UserAddress{select_default(uid: i64) -> Option => "`where uid = #{uid} and is_default = 1 and is_del = 0 limit 1`"}, "eb_user_address");

impl UserAddress {
    pub const TABLE_NAME: &'static str = "eb_user_address";
}
