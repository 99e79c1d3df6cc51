use actix_web::{error::JsonPayloadError, error::QueryPayloadError, web, HttpResponse};

use crate::response::R;

fn bad_request(msg: String) -> HttpResponse {
    HttpResponse::BadRequest().json(R::<()>::error(400, msg))
}

/// JSON 请求体解析错误处理器，统一返回 R 格式
pub fn json_error_handler(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    let msg = match &err {
        JsonPayloadError::Deserialize(e) => format!("参数格式错误: {}", e),
        JsonPayloadError::ContentType => "Content-Type 必须是 application/json".to_string(),
        JsonPayloadError::Overflow { limit } => format!("请求体过大，限制为 {} 字节", limit),
        _ => "JSON 解析失败".to_string(),
    };
    actix_web::error::InternalError::from_response(err, bad_request(msg)).into()
}

/// Query 参数解析错误处理器
pub fn query_error_handler(err: QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    let msg = format!("参数错误: {}", err);
    actix_web::error::InternalError::from_response(err, bad_request(msg)).into()
}

/// JSON 错误处理器注册配置
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Query 错误处理器注册配置
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}
