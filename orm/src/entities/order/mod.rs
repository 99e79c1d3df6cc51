pub mod store_order;

pub use store_order::StoreOrder;
