use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, AsRefStr};
use crate::models::dto::label::Label;

/// 账单资金类别枚举（user_bill.category 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum BillCategory {
    /// 余额
    #[strum(to_string = "余额")]
    NowMoney,
    /// 积分
    #[strum(to_string = "积分")]
    Integral,
}

impl BillCategory {
    /// 数据库列取值
    pub fn as_value(self) -> &'static str {
        match self {
            BillCategory::NowMoney => "now_money",
            BillCategory::Integral => "integral",
        }
    }

    /// 从列取值转换
    pub fn from_value(value: &str) -> Option<Self> {
        for e in Self::iter() {
            if e.as_value() == value {
                return Some(e);
            }
        }
        None
    }

    /// 获取描述
    pub fn description(&self) -> String {
        self.as_ref().to_string()
    }
}

/// 账单业务类型枚举（user_bill.type 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum BillType {
    /// 购买商品
    #[strum(to_string = "购买商品")]
    PayProduct,
    /// 充值
    #[strum(to_string = "充值")]
    Recharge,
    /// 获得推广佣金
    #[strum(to_string = "获得推广佣金")]
    Brokerage,
    /// 余额提现
    #[strum(to_string = "余额提现")]
    Extract,
    /// 系统增加余额
    #[strum(to_string = "系统增加余额")]
    SystemAdd,
    /// 系统减少余额
    #[strum(to_string = "系统减少余额")]
    SystemSub,
}

impl BillType {
    /// 数据库列取值
    pub fn as_value(self) -> &'static str {
        match self {
            BillType::PayProduct => "pay_product",
            BillType::Recharge => "recharge",
            BillType::Brokerage => "brokerage",
            BillType::Extract => "extract",
            BillType::SystemAdd => "system_add",
            BillType::SystemSub => "system_sub",
        }
    }

    /// 从列取值转换
    pub fn from_value(value: &str) -> Option<Self> {
        for e in Self::iter() {
            if e.as_value() == value {
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
    pub fn all_labels() -> Vec<Label<String, String>> {
        Self::iter().map(|e| {
            Label { value: e.as_value().to_string(), label: e.description() }
        }).collect()
    }
}

/// 账单收支方向枚举（user_bill.pm 列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr)]
pub enum BillPm {
    /// 支出 (0)
    #[strum(to_string = "支出")]
    Expend = 0,
    /// 收入 (1)
    #[strum(to_string = "收入")]
    Income = 1,
}

impl BillPm {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_type_value_round_trip() {
        assert_eq!(BillType::Brokerage.as_value(), "brokerage");
        assert_eq!(BillType::from_value("brokerage"), Some(BillType::Brokerage));
        assert_eq!(BillType::from_value("unknown"), None);
    }

    #[test]
    fn test_bill_pm_codes() {
        assert_eq!(BillPm::Income.get_code(), 1);
        assert_eq!(BillPm::from_code(0), Some(BillPm::Expend));
        assert_eq!(BillPm::from_code(9), None);
    }

    #[test]
    fn test_bill_type_labels() {
        let labels = BillType::all_labels();
        assert_eq!(labels.len(), 6);
        assert!(labels.iter().any(|l| l.value == "brokerage" && l.label == "获得推广佣金"));
    }
}
