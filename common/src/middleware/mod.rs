pub mod error_handler;

pub use error_handler::{json_config, query_config};
