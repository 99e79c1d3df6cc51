use rbatis::RBatis;
use rbdc_mysql::driver::MysqlDriver;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;

/// MySQL 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// 数据库连接 URL
    pub url: String,
    /// 连接池最大连接数
    pub max_connections: u64,
}

impl DbConfig {
    /// 创建新的数据库配置
    pub fn new(url: String, max_connections: u64) -> Self {
        Self {
            url,
            max_connections,
        }
    }

    /// 构建带连接池参数的数据库 URL
    pub fn build_url_with_pool(&self) -> String {
        if self.url.contains('?') {
            format!("{}&max_connections={}", self.url, self.max_connections)
        } else {
            format!("{}?max_connections={}", self.url, self.max_connections)
        }
    }
}

/// 建立数据库连接
///
/// 返回独立的 RBatis 实例，由调用方负责注入到各服务中，
/// 不提供全局访问入口。
pub async fn connect_db(config: &DbConfig) -> AppResult<RBatis> {
    let rb = RBatis::new();
    rb.link(MysqlDriver {}, &config.build_url_with_pool()).await?;

    log::info!("✅ 数据库连接初始化成功");
    Ok(rb)
}

/// 测试数据库连接
pub async fn test_connection(rb: &RBatis) -> AppResult<bool> {
    match rb.query("SELECT 1", vec![]).await {
        Ok(_) => {
            log::info!("✅ 数据库连接测试成功");
            Ok(true)
        }
        Err(e) => {
            log::error!("❌ 数据库连接测试失败: {}", e);
            Err(e.into())
        }
    }
}
