use rbatis::{crud, impl_select};
use serde::{Deserialize, Serialize};

/// 城市数据表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemCity {
    pub id: Option<i64>,
    /// 城市编号
    pub city_id: Option<i64>,
    /// 0=省 1=市 2=区县
    pub level: Option<i32>,
    pub parent_id: Option<i64>,
    pub area_code: Option<String>,
    pub name: Option<String>,
    pub merger_name: Option<String>,
    pub is_show: Option<i32>,
}

crud!(SystemCity {}, "eb_system_city");
impl_select!(SystemCity{select_by_name(name: &str) -> Option => "`where name = #{name} and parent_id != 0 limit 1`"}, "eb_system_city");

impl SystemCity {
    pub const TABLE_NAME: &'static str = "eb_system_city";
}
