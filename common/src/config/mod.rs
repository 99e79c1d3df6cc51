// 配置模块

pub mod app_config;
pub mod db_conf;

pub use app_config::{AddressConfig, AppConfig, DatabaseConfig, LogConfig, ReportConfig, ServerConfig};
pub use db_conf::{connect_db, test_connection, DbConfig};
