use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, AsRefStr};
use crate::models::dto::label::Label;

/// 运费模板计费方式枚举（shipping_templates.type 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum ChargeType {
    /// 按件数 (1)
    #[strum(to_string = "按件数")]
    Piece = 1,
    /// 按重量 (2)
    #[strum(to_string = "按重量")]
    Weight = 2,
    /// 按体积 (3)
    #[strum(to_string = "按体积")]
    Volume = 3,
}

impl ChargeType {
    /// 转换为 i32 值
    pub fn get_code(self) -> i32 {
        self as i32
    }

    /// 从 i32 值转换
    pub fn from_code(value: i32) -> Option<Self> {
        for e in Self::iter() {
            if e.get_code() == value {
                return Some(e);
            }
        }
        None
    }

    /// 获取描述
    pub fn description(&self) -> String {
        self.as_ref().to_string()
    }

    /// 获取所有枚举的 Label 列表
    pub fn all_labels() -> Vec<Label<i32, String>> {
        Self::iter().map(|e| {
            Label { value: e.get_code(), label: e.description() }
        }).collect()
    }
}
