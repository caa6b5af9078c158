//! High-level boot script document built on the codec layer.

mod boot_script;

pub use boot_script::BootScript;
