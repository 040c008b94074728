//! The relative mouse Prelude.
//!
//! The purpose of this module is to alleviate imports of structs and enums
//! required to instance and drive the mouse:
//!
//! ```
//! # #![allow(unused_imports)]
//! use usbd_relative_mouse::prelude::*;
//! ```

pub use crate::usb_class::prelude::*;
