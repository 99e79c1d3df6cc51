use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PAGE_LIMIT;
use crate::error::{AppError, AppResult};

/// 分页参数，页码从 1 开始
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// 从可选的请求参数构造，缺省取第一页、默认条数
    pub fn from_req(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }

    /// 页码和条数都必须大于等于 1
    pub fn validate(&self) -> AppResult<()> {
        if self.page < 1 || self.limit < 1 {
            return Err(AppError::invalid_filter(format!(
                "分页参数必须从 1 开始: page={}, limit={}",
                self.page, self.limit
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}
