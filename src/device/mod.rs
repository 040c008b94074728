//! Report layouts of the devices implemented by this crate

pub mod mouse;
