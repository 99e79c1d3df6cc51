use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use common::middleware::error_handler;
use common::utils::time_util::{Clock, SystemClock};
use common::AppConfig;
use orm::store::address::{DbAddressStore, DbCityStore};
use orm::store::db::DbRecordStore;

use crate::service::agent_report_service::AgentReportService;
use crate::service::metric_aggregator::MetricAggregator;
use crate::service::referral_graph::ReferralGraphResolver;
use crate::service::shipping_template_service::ShippingTemplateService;
use crate::service::user_address_service::UserAddressService;
use crate::service::user_service::UserService;
use crate::service::visit_stat_service::VisitStatService;

mod handle;
mod service;
mod state;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.toml");
    const PROD_CONFIG: &str = include_str!("../config.production.toml");

    let config = AppConfig::from_file_or_embedded("admin/config", DEFAULT_CONFIG, Some(PROD_CONFIG))
        .or_else(|_| AppConfig::from_env())
        .expect("配置加载失败");

    // 初始化日志（使用配置的日志级别）
    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动分销后台服务...");
    log::info!("配置加载成功 - 数据库: {}", config.database.url);

    let db_config = common::DbConfig::new(
        config.database.url.clone(),
        config.database.max_connections as u64,
    );
    let rb = common::connect_db(&db_config).await.map_err(|e| {
        log::error!("数据库连接失败: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    if let Err(e) = common::config::test_connection(&rb).await {
        log::error!("数据库连接测试失败: {}", e);
    }
    let rb = Arc::new(rb);

    let query_timeout = Duration::from_millis(config.report.query_timeout_ms);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let record_store = Arc::new(DbRecordStore::new(rb.clone()));
    let address_store = Arc::new(DbAddressStore::new(rb.clone()));
    let city_store = Arc::new(DbCityStore::new(rb.clone()));

    let referral_service = Arc::new(ReferralGraphResolver::new(record_store.clone(), query_timeout));
    let aggregator = Arc::new(MetricAggregator::new(record_store.clone(), query_timeout));
    let report_service = Arc::new(AgentReportService::new(referral_service.clone(), aggregator));
    let visit_service = Arc::new(VisitStatService::new(
        record_store.clone(),
        clock.clone(),
        query_timeout,
    ));
    let user_service = Arc::new(UserService::new(record_store, query_timeout));
    let address_service = Arc::new(UserAddressService::new(
        address_store,
        city_store,
        clock.clone(),
        query_timeout,
        config.address.transactional_default,
    ));
    let shipping_service = Arc::new(ShippingTemplateService::new(rb.clone(), clock.clone()));

    // 组装工程依赖
    let state = state::AppState {
        rb,
        clock,
        report_service,
        referral_service,
        visit_service,
        user_service,
        address_service,
        shipping_service,
    };
    let state_data = web::Data::new(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🚀 启动 Actix Web 服务器: {}", addr);
    HttpServer::new(move || {
        App::new()
            // 全局中间件配置
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            // 注册 JSON 和 Query 错误处理器
            .app_data(error_handler::json_config())
            .app_data(error_handler::query_config())
            // 注册全局数据
            .app_data(state_data.clone())
            .service(handle::agent::index)
            .service(handle::agent::stair)
            .service(handle::agent::rank)
            .service(handle::agent::referrer)
            .service(handle::user::list)
            .service(handle::user::count)
            .service(handle::user::visit)
            .service(handle::user::dashboard)
            .service(handle::user::register_series)
            .service(handle::address::list)
            .service(handle::address::default_address)
            .service(handle::address::save)
            .service(handle::address::set_default)
            .service(handle::address::delete)
            .service(handle::shipping::list)
            .service(handle::shipping::charge_types)
            .service(handle::shipping::save)
            .service(handle::shipping::delete)
    })
    .bind(&addr)?
    .run()
    .await
}
