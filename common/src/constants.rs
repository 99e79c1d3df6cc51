//! 业务常量

/// 分页默认每页条数
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// 顶级用户的推荐人 uid（无上级）
pub const NO_SPREAD_UID: i64 = 0;

/// 订单未退款状态（refund_status = 0）
pub const REFUND_STATUS_NONE: i32 = 0;

/// 订单已支付标记（paid = 1）
pub const ORDER_PAID: i32 = 1;

/// 账单生效状态（status = 1）
pub const RECORD_STATUS_VALID: i32 = 1;

/// 系统默认运费模板，不允许删除
pub const DEFAULT_SHIPPING_TEMPLATE_ID: i64 = 1;
