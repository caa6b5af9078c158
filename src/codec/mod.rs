//! Binary codec for the legacy uImage container format.

mod container;
mod crc;
mod header;

pub use container::*;
pub use crc::*;
pub use header::*;
