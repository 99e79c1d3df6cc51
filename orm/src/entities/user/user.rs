use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 用户表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub uid: Option<i64>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    /// 余额
    pub now_money: Option<Decimal>,
    /// 可提现佣金
    pub brokerage_price: Option<Decimal>,
    /// 推荐人 uid，0 表示无上级
    pub spread_uid: Option<i64>,
    /// 绑定推荐关系时间（Unix 秒）
    pub spread_time: Option<i64>,
    /// 注册时间（Unix 秒）
    pub add_time: Option<i64>,
    /// 最后访问时间（Unix 秒）
    pub last_time: Option<i64>,
    /// 累计支付次数
    pub pay_count: Option<i32>,
    /// 是否推广员
    pub is_promoter: Option<i32>,
    pub status: Option<i32>,
}

crud!(User {}, "eb_user");
impl_select!(User{select_by_uid(uid: i64) -> Option => "`where uid = #{uid} limit 1`"}, "eb_user");

impl User {
    pub const TABLE_NAME: &'static str = "eb_user";
}
