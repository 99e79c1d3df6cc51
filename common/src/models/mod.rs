pub mod dto;
pub mod page;
pub mod time_range;

pub use page::PageParams;
pub use time_range::TimeRange;
