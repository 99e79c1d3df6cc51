use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 闭区间的时间范围，Unix 秒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// 校验起止顺序，起始时间晚于结束时间视为参数错误
    pub fn validate(&self) -> AppResult<()> {
        if self.start > self.end {
            return Err(AppError::invalid_filter(format!(
                "时间窗口起始晚于结束: {} > {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_inverted_range() {
        assert!(TimeRange::new(100, 50).validate().is_err());
        assert!(TimeRange::new(50, 100).validate().is_ok());
        assert!(TimeRange::new(50, 50).validate().is_ok());
    }

    #[test]
    fn contains_is_inclusive() {
        let range = TimeRange::new(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
    }
}
