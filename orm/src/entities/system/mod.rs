pub mod shipping_template;
pub mod system_city;

pub use shipping_template::ShippingTemplate;
pub use system_city::SystemCity;
