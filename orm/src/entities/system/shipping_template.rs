use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 运费模板表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingTemplate {
    pub id: Option<i64>,
    /// 模板名称
    pub name: Option<String>,
    /// 计费方式 1=按件数 2=按重量 3=按体积
    #[serde(rename = "type")]
    pub charge_type: Option<i32>,
    /// 是否指定包邮
    pub appoint: Option<i32>,
    pub sort: Option<i32>,
    pub add_time: Option<i64>,
}

crud!(ShippingTemplate {}, "eb_shipping_templates");
impl_select!(ShippingTemplate{select_by_id(id: i64) -> Option => "`where id = #{id} limit 1`"}, "eb_shipping_templates");
impl_select!(ShippingTemplate{select_page(limit: u64, offset: u64) => "`order by sort desc, id desc limit #{offset}, #{limit}`"}, "eb_shipping_templates");

impl ShippingTemplate {
    pub const TABLE_NAME: &'static str = "eb_shipping_templates";
}
