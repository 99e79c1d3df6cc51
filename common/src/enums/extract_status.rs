use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, AsRefStr};
use crate::models::dto::label::Label;

/// 提现申请状态枚举（user_extract.status 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum ExtractStatus {
    /// 未通过 (-1)
    #[strum(to_string = "未通过")]
    Refused = -1,
    /// 审核中 (0)
    #[strum(to_string = "审核中")]
    Pending = 0,
    /// 已提现 (1)
    #[strum(to_string = "已提现")]
    Approved = 1,
}

impl ExtractStatus {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_status_codes() {
        assert_eq!(ExtractStatus::Approved.get_code(), 1);
        assert_eq!(ExtractStatus::Refused.get_code(), -1);
        assert_eq!(ExtractStatus::from_code(0), Some(ExtractStatus::Pending));
        assert_eq!(ExtractStatus::from_code(5), None);
    }

    #[test]
    fn test_extract_status_labels() {
        let labels = ExtractStatus::all_labels();
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().any(|l| l.value == 1 && l.label == "已提现"));
    }
}
