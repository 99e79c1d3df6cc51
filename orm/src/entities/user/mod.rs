pub mod user;
pub mod user_address;
pub mod user_bill;
pub mod user_extract;

pub use user::User;
pub use user_address::UserAddress;
pub use user_bill::UserBill;
pub use user_extract::UserExtract;
