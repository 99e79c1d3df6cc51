//! 业务服务层
//!
//! 服务通过构造函数注入存取接口和时钟，便于在测试中替换为内存实现。
//! 所有下发到存储的子查询都有统一的超时上限，超时视为可重试的存储故障。

pub mod agent_report_service;
pub mod metric_aggregator;
pub mod referral_graph;
pub mod shipping_template_service;
pub mod user_address_service;
pub mod user_service;
pub mod visit_stat_service;

use std::future::Future;
use std::time::Duration;

use common::error::{AppError, AppResult};

/// 给单条子查询加超时上限
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(AppError::store_unavailable(format!("{}超时", what))),
    }
}
