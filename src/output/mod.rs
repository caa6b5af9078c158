//! Output format writers.

mod info;
mod json;

pub use self::info::*;
pub use self::json::*;
