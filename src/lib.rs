//! USB HID relative mouse with 16-bit X/Y axes for [usb-device](https://crates.io/crates/usb-device).
//!
//! Boot sub-class mouse with five buttons, 16-bit relative X/Y (logical range -32767..=32767)
//! and an 8-bit relative scroll wheel, sent as a fixed 6 byte report over an interrupt IN
//! endpoint. A host that selects the boot protocol (BIOS, boot loaders) is sent the
//! 4 byte boot layout instead, with X and Y saturated to ±127, until the next bus reset.
//!
//! ```rust,ignore
//! use usbd_relative_mouse::prelude::*;
//! use usb_device::class_prelude::*;
//!
//! let usb_alloc = UsbBusAllocator::new(usb_bus);
//!
//! let mut mouse = RelativeMouseBuilder::new().build().allocate(&usb_alloc);
//!
//! let mut usb_dev = DeviceIdentity::default()
//!     .device_builder(&usb_alloc)?
//!     .build();
//!
//! loop {
//!     if usb_dev.poll(&mut [&mut mouse]) {
//!         // host requests handled by `mouse`
//!     }
//!
//!     // move right and down, scroll up one notch
//!     mouse.update(1000, 500, 0, 1);
//! }
//! ```
//!
//! Report layout
//! -------------
//!
//! | byte | field                                  |
//! |------|----------------------------------------|
//! | 0    | buttons, bits 0-4, bits 5-7 padding    |
//! | 1-2  | X, little endian `i16`                 |
//! | 3-4  | Y, little endian `i16`                 |
//! | 5    | wheel, negated so positive scrolls up  |
//!
//! In boot protocol the report shrinks to `[buttons, x, y, wheel]`, one byte each.

#![no_std]

//Allow the use of std in tests
#[cfg(test)]
#[macro_use]
extern crate std;

use usb_device::UsbError;

pub mod configuration;
pub mod descriptor;
pub mod device;
pub mod identity;
pub mod prelude;
pub mod usb_class;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbHidError {
    WouldBlock,
    UsbError(UsbError),
    SerializationError,
}

impl From<UsbError> for UsbHidError {
    fn from(e: UsbError) -> Self {
        match e {
            UsbError::WouldBlock => UsbHidError::WouldBlock,
            _ => UsbHidError::UsbError(e),
        }
    }
}
