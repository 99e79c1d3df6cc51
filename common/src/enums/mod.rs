pub mod bill_type;
pub mod charge_type;
pub mod extract_status;

pub use bill_type::{BillCategory, BillPm, BillType};
pub use charge_type::ChargeType;
pub use extract_status::ExtractStatus;
