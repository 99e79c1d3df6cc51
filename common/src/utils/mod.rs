pub mod time_util;

pub use time_util::{Clock, FixedClock, RelativeWindow, SystemClock};
