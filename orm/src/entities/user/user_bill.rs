use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 用户账单表
///
/// category 区分资金类别（now_money / integral），type 区分业务类型，
/// pm 区分收支方向（1 收入 0 支出）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserBill {
    pub id: Option<i64>,
    pub uid: Option<i64>,
    /// 关联记录 id（订单、提现单等）
    pub link_id: Option<String>,
    /// 收支方向 1=收入 0=支出
    pub pm: Option<i32>,
    pub title: Option<String>,
    /// 资金类别
    pub category: Option<String>,
    /// 业务类型
    #[serde(rename = "type")]
    pub bill_type: Option<String>,
    /// 发生金额
    pub number: Option<Decimal>,
    /// 剩余金额
    pub balance: Option<Decimal>,
    pub mark: Option<String>,
    /// 0=待确定 1=有效 -1=无效
    pub status: Option<i32>,
    pub add_time: Option<i64>,
}

crud!(UserBill {}, "eb_user_bill");
impl_select!(UserBill{select_by_uid(uid: i64) => "`where uid = #{uid} order by add_time desc`"}, "eb_user_bill");

impl UserBill {
    pub const TABLE_NAME: &'static str = "eb_user_bill";
}
