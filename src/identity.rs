//! USB identification of the device
use usb_device::bus::{UsbBus, UsbBusAllocator};
use usb_device::prelude::{UsbDeviceBuilder, UsbVidPid};

use crate::usb_class::{BuilderResult, UsbHidBuilderError};

pub const DEFAULT_VENDOR_ID: u16 = 0x8234;
pub const DEFAULT_PRODUCT_ID: u16 = 0x0001;
pub const DEFAULT_PRODUCT_RELEASE: u16 = 0x0001;

/// Vendor ID, product ID and `bcdDevice` the device enumerates with
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    pub product_release: u16,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            product_release: DEFAULT_PRODUCT_RELEASE,
        }
    }
}

impl DeviceIdentity {
    #[must_use]
    pub fn vendor_id(mut self, vendor_id: u16) -> Self {
        self.vendor_id = vendor_id;
        self
    }

    #[must_use]
    pub fn product_id(mut self, product_id: u16) -> Self {
        self.product_id = product_id;
        self
    }

    #[must_use]
    pub fn product_release(mut self, product_release: u16) -> Self {
        self.product_release = product_release;
        self
    }

    #[must_use]
    pub fn vid_pid(&self) -> UsbVidPid {
        UsbVidPid(self.vendor_id, self.product_id)
    }

    /// Device builder carrying this identity, self powered and drawing no bus
    /// current, matching the configuration descriptor of
    /// [`RelativeMouse16`](crate::usb_class::RelativeMouse16)
    pub fn device_builder<'a, B: UsbBus>(
        &self,
        usb_alloc: &'a UsbBusAllocator<B>,
    ) -> BuilderResult<UsbDeviceBuilder<'a, B>> {
        UsbDeviceBuilder::new(usb_alloc, self.vid_pid())
            .device_release(self.product_release)
            .self_powered(true)
            .max_power(0)
            .map_err(|_| UsbHidBuilderError::ValueOverflow)
    }
}
