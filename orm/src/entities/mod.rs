pub mod order;
pub mod system;
pub mod user;

// Re-export all entities
pub use order::*;
pub use system::*;
pub use user::*;
