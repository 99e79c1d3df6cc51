use std::sync::Arc;
use rbatis::RBatis;
use common::utils::time_util::Clock;
use crate::service::agent_report_service::AgentReportService;
use crate::service::referral_graph::ReferralGraphResolver;
use crate::service::shipping_template_service::ShippingTemplateService;
use crate::service::user_address_service::UserAddressService;
use crate::service::user_service::UserService;
use crate::service::visit_stat_service::VisitStatService;

#[derive(Clone)]
#[allow(dead_code)]
pub struct AppState {
    pub rb: Arc<RBatis>,
    pub clock: Arc<dyn Clock>,
    pub report_service: Arc<AgentReportService>,
    pub referral_service: Arc<ReferralGraphResolver>,
    pub visit_service: Arc<VisitStatService>,
    pub user_service: Arc<UserService>,
    pub address_service: Arc<UserAddressService>,
    pub shipping_service: Arc<ShippingTemplateService>,
}
