// 错误处理模块
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::response::R;

#[derive(Error, Debug)]
pub enum AppError {
    /// 分页或时间窗口参数不合法，直接返回调用方，不重试
    #[error("无效的查询条件: {0}")]
    InvalidFilter(String),

    /// 相对时间窗口名称不在固定枚举内
    #[error("无效的时间窗口: {0}")]
    InvalidWindow(String),

    /// 底层存储读取失败（连接丢失、超时），可由调用方重试
    #[error("数据存储不可用: {0}")]
    StoreUnavailable(String),

    /// 默认地址两步写入中第二步失败，当前用户可能没有任何默认地址
    #[error("默认地址状态不一致: {0}")]
    InconsistentDefaultAddress(String),

    #[error("验证错误: {0}")]
    ValidationError(String),

    #[error("未找到: {0}")]
    NotFound(String),

    #[error("业务错误: {0}")]
    BusinessError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        AppError::InvalidFilter(msg.into())
    }

    pub fn invalid_window(msg: impl Into<String>) -> Self {
        AppError::InvalidWindow(msg.into())
    }

    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        AppError::StoreUnavailable(msg.into())
    }

    pub fn inconsistent_default_address(msg: impl Into<String>) -> Self {
        AppError::InconsistentDefaultAddress(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        AppError::BusinessError(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        AppError::ConfigError(msg.into())
    }

    /// 调用方是否可以整体重试
    ///
    /// 存储读取失败是瞬时故障；默认地址两步写入失败需要调用方决定
    /// 是否重做整个切换操作。参数类错误重试没有意义。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable(_) | AppError::InconsistentDefaultAddress(_)
        )
    }
}

// 从 rbatis 错误转换 (rbatis::Error 包含了 rbdc::Error)
impl From<rbatis::Error> for AppError {
    fn from(err: rbatis::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFilter(_)
            | AppError::InvalidWindow(_)
            | AppError::ValidationError(_)
            | AppError::BusinessError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InconsistentDefaultAddress(_) => StatusCode::CONFLICT,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body: R<()> = R::error(self.status_code().as_u16(), self.to_string());
        HttpResponse::build(self.status_code()).json(body)
    }
}
