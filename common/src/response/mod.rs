use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// 统一响应包装
#[derive(Debug, Serialize, Deserialize)]
pub struct R<T> {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 分页数据载荷：列表 + 满足条件的总条数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageData<T> {
    pub list: Vec<T>,
    pub count: i64,
}

impl<T> PageData<T> {
    pub fn new(list: Vec<T>, count: i64) -> Self {
        Self { list, count }
    }

    pub fn empty() -> Self {
        Self { list: Vec::new(), count: 0 }
    }
}

impl<T: Serialize> R<T> {
    /// 成功响应，返回 Result 类型以便直接在 handler 中使用
    pub fn success(data: T) -> Result<R<T>, crate::error::AppError> {
        Ok(Self {
            code: 200,
            msg: "success".to_string(),
            data: Some(data),
        })
    }

    pub fn error(code: u16, msg: String) -> Self {
        Self {
            code,
            msg,
            data: None,
        }
    }
}

impl R<()> {
    /// 成功响应（无数据），返回 Result 类型以便直接在 handler 中使用
    pub fn ok() -> Result<R<()>, crate::error::AppError> {
        Ok(R::<()> {
            code: 200,
            msg: "success".to_string(),
            data: None,
        })
    }
}

// 为 R<T> 实现 Responder trait
impl<T: Serialize> Responder for R<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        match serde_json::to_string(&self) {
            Ok(body) => HttpResponse::Ok()
                .content_type("application/json")
                .body(body),
            Err(e) => HttpResponse::InternalServerError()
                .content_type("application/json")
                .body(format!(r#"{{"code":500,"msg":"Serialization error: {}"}}"#, e)),
        }
    }
}
