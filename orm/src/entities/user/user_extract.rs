use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 用户提现申请表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserExtract {
    pub id: Option<i64>,
    pub uid: Option<i64>,
    pub real_name: Option<String>,
    /// 提现方式 bank/alipay/weixin
    pub extract_type: Option<String>,
    /// 提现金额
    pub extract_price: Option<Decimal>,
    /// -1=未通过 0=审核中 1=已提现
    pub status: Option<i32>,
    /// 审核未通过原因
    pub fail_msg: Option<String>,
    pub add_time: Option<i64>,
}

crud!(UserExtract {}, "eb_user_extract");
impl_select!(UserExtract{select_by_uid(uid: i64) => "`where uid = #{uid} order by add_time desc`"}, "eb_user_extract");

impl UserExtract {
    pub const TABLE_NAME: &'static str = "eb_user_extract";
}
