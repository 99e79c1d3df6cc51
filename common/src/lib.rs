// 公共模块
// 提供配置、数据库连接、日志、错误处理等通用功能

pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;

// 重新导出常用类型和函数
pub use config::{connect_db, AppConfig, DbConfig};
pub use error::{AppError, AppResult};
pub use logger::init_logger;
pub use models::{PageParams, TimeRange};
pub use response::{PageData, R};
pub use utils::{Clock, FixedClock, RelativeWindow, SystemClock};

/// 初始化公共模块
///
/// 这个函数可以用来初始化日志系统
pub fn init() {
    logger::init_logger();
    log::info!("✅ 公共模块初始化完成");
}
