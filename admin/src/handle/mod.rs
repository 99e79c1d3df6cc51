//! HTTP 接口层

pub mod address;
pub mod agent;
pub mod shipping;
pub mod user;

use common::error::{AppError, AppResult};
use common::models::time_range::TimeRange;

/// 起止时间要么都给、要么都不给
pub(crate) fn optional_range(start: Option<i64>, end: Option<i64>) -> AppResult<Option<TimeRange>> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(TimeRange::new(start, end))),
        (None, None) => Ok(None),
        _ => Err(AppError::invalid_filter("时间窗口必须同时提供 start 和 end")),
    }
}
