use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 商城订单表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreOrder {
    pub id: Option<i64>,
    /// 订单号
    pub order_id: Option<String>,
    pub uid: Option<i64>,
    /// 实际支付金额
    pub pay_price: Option<Decimal>,
    /// 是否已支付
    pub paid: Option<i32>,
    pub pay_time: Option<i64>,
    /// 0=未退款 1=申请中 2=已退款
    pub refund_status: Option<i32>,
    /// 用户侧软删除标记
    pub is_del: Option<i32>,
    /// 后台侧软删除标记
    pub is_system_del: Option<i32>,
    pub add_time: Option<i64>,
}

crud!(StoreOrder {}, "eb_store_order");
impl_select!(StoreOrder{select_by_order_id(order_id: &str) -> Option => "`where order_id = #{order_id} limit 1`"}, "eb_store_order");

impl StoreOrder {
    pub const TABLE_NAME: &'static str = "eb_store_order";
}
