//! USB Class for the 16-bit relative mouse

use core::cell::RefCell;

use critical_section::Mutex;
use fugit::{ExtU32, MillisDurationU32};
use heapless::Vec;
use log::{error, info, trace, warn};
use num_enum::IntoPrimitive;
use packed_struct::prelude::*;
#[allow(clippy::wildcard_imports)]
use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request, RequestType};
use usb_device::{Result, UsbError};

use crate::configuration::{
    build_configuration_descriptor, hid_descriptor, hid_descriptor_body,
    ConfigurationDescriptorParams, EndpointConfig, CONFIGURATION_DESCRIPTOR_CAPACITY,
};
use crate::descriptor::{
    DescriptorType, HidProtocol, HidReportType, HidRequest, InterfaceProtocol, InterfaceSubClass,
    USB_CLASS_HID,
};
use crate::device::mouse::{
    encode, encode_boot, report_descriptor, RelativeMouseReport, BOOT_REPORT_LEN, REPORT_LEN,
};
use crate::UsbHidError;


pub mod prelude {
    //! Prelude for building and using the relative mouse
    //!
    //! ```
    //! # #![allow(unused_imports)]
    //! use usbd_relative_mouse::usb_class::prelude::*;
    //! ```

    pub use crate::descriptor::{HidProtocol, InterfaceProtocol};
    pub use crate::device::mouse::RelativeMouseReport;
    pub use crate::identity::DeviceIdentity;
    pub use crate::usb_class::{
        RelativeMouse16, RelativeMouseBuilder, RelativeMouseConfig, UsbPacketSize,
    };
    pub use crate::UsbHidError;
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum UsbPacketSize {
    Bytes8 = 8,
    Bytes16 = 16,
    Bytes32 = 32,
    Bytes64 = 64,
}

/// [`RelativeMouseBuilder`] error
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbHidBuilderError {
    /// A value is greater than the acceptable range of input values
    ValueOverflow,
    /// A value is less than the acceptable range of input values
    ValueUnderflow,
}

pub type BuilderResult<B> = core::result::Result<B, UsbHidBuilderError>;

/// Construction time settings for [`RelativeMouse16`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeMouseConfig {
    endpoint: EndpointConfig,
    idle_default: u8,
}

impl Default for RelativeMouseConfig {
    fn default() -> Self {
        RelativeMouseBuilder::new().build()
    }
}

impl RelativeMouseConfig {
    #[must_use]
    pub fn endpoint(&self) -> EndpointConfig {
        self.endpoint
    }

    /// Allocate the interface and both interrupt endpoints
    pub fn allocate<B: UsbBus>(self, usb_alloc: &UsbBusAllocator<B>) -> RelativeMouse16<'_, B> {
        RelativeMouse16::new(usb_alloc, self)
    }
}

/// Builder for [`RelativeMouseConfig`]
#[must_use = "this `RelativeMouseBuilder` must be assigned or consumed by `::build()`"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeMouseBuilder {
    config: RelativeMouseConfig,
}

impl Default for RelativeMouseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RelativeMouseBuilder {
    /// 64 byte endpoints polled every 1ms, idle disabled
    pub fn new() -> Self {
        Self {
            config: RelativeMouseConfig {
                endpoint: EndpointConfig {
                    poll_interval: 1,
                    max_packet_size: UsbPacketSize::Bytes64,
                },
                idle_default: 0,
            },
        }
    }

    pub fn max_packet_size(mut self, max_packet_size: UsbPacketSize) -> Self {
        self.config.endpoint.max_packet_size = max_packet_size;
        self
    }

    /// Polling interval of both interrupt endpoints, 1-255ms
    pub fn poll_interval(mut self, poll_interval: MillisDurationU32) -> BuilderResult<Self> {
        let interval = u8::try_from(poll_interval.to_millis())
            .map_err(|_| UsbHidBuilderError::ValueOverflow)?;
        if interval == 0 {
            return Err(UsbHidBuilderError::ValueUnderflow);
        }
        self.config.endpoint.poll_interval = interval;
        Ok(self)
    }

    /// Idle rate restored on bus reset, stored in 4ms units
    pub fn idle_default(mut self, duration: MillisDurationU32) -> BuilderResult<Self> {
        if duration.ticks() == 0 {
            self.config.idle_default = 0;
        } else {
            let scaled_duration = duration.to_millis() / 4;

            if scaled_duration == 0 {
                //round up for 1-3ms
                self.config.idle_default = 1;
            } else {
                self.config.idle_default =
                    u8::try_from(scaled_duration).map_err(|_| UsbHidBuilderError::ValueOverflow)?;
            }
        }
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> RelativeMouseConfig {
        self.config
    }
}

/// USB HID mouse with 16-bit relative X/Y, five buttons and a wheel
///
/// Reports are sent with [`RelativeMouse16::update`] from any number of
/// threads; sends are serialized so whole reports reach the endpoint one at a
/// time. After the host selects the boot protocol, reports switch to the
/// 4 byte boot layout until the next bus reset. Poll the device with [`UsbDevice::poll`](usb_device::device::UsbDevice::poll)
/// to answer enumeration and HID class requests.
pub struct RelativeMouse16<'a, B: UsbBus> {
    config: RelativeMouseConfig,
    interface: InterfaceNumber,
    in_endpoint: EndpointIn<'a, B>,
    out_endpoint: EndpointOut<'a, B>,
    in_flight: Mutex<RefCell<Vec<u8, REPORT_LEN>>>,
    configuration_descriptor: [u8; CONFIGURATION_DESCRIPTOR_CAPACITY],
    protocol: HidProtocol,
    global_idle: u8,
}

impl<'a, B: UsbBus> RelativeMouse16<'a, B> {
    pub fn new(usb_alloc: &'a UsbBusAllocator<B>, config: RelativeMouseConfig) -> Self {
        let max_packet_size = u16::from(u8::from(config.endpoint.max_packet_size));
        Self {
            interface: usb_alloc.interface(),
            in_endpoint: usb_alloc.interrupt(max_packet_size, config.endpoint.poll_interval),
            out_endpoint: usb_alloc.interrupt(max_packet_size, config.endpoint.poll_interval),
            in_flight: Mutex::new(RefCell::new(Vec::new())),
            configuration_descriptor: [0; CONFIGURATION_DESCRIPTOR_CAPACITY],
            //When initialized, all devices default to report protocol - Hid spec 7.2.6 Set_Protocol Request
            protocol: HidProtocol::Report,
            global_idle: config.idle_default,
            config,
        }
    }

    /// Send a report for the given pointer state
    ///
    /// Positive `wheel` scrolls up. Returns `false` if the endpoint did not
    /// accept the report, e.g. the previous one is still pending or the
    /// device is not configured. Failed reports are not retried.
    ///
    /// In boot protocol X and Y saturate at ±127.
    pub fn update(&self, x: i16, y: i16, buttons: u8, wheel: i8) -> bool {
        let sent = match self.protocol {
            HidProtocol::Report => self.send(&encode(x, y, buttons, wheel)),
            HidProtocol::Boot => self.send(&encode_boot(x, y, buttons, wheel)),
        };
        sent.is_ok()
    }

    pub fn write_report(&self, report: &RelativeMouseReport) -> core::result::Result<(), UsbHidError> {
        let sent = match self.protocol {
            HidProtocol::Report => {
                let data = report.pack().map_err(|_| {
                    error!("Error packing RelativeMouseReport");
                    UsbHidError::SerializationError
                })?;
                self.send(&data)
            }
            HidProtocol::Boot => self.send(&encode_boot(
                report.x,
                report.y,
                report.buttons,
                report.scroll(),
            )),
        };
        sent.map(|_| ()).map_err(UsbHidError::from)
    }

    fn send(&self, report: &[u8]) -> Result<usize> {
        critical_section::with(|cs| {
            let mut in_flight = self.in_flight.borrow_ref_mut(cs);
            in_flight.clear();
            in_flight
                .extend_from_slice(report)
                .map_err(|()| UsbError::BufferOverflow)?;
            self.in_endpoint.write(&in_flight)
        })
    }

    /// Length of the reports sent under the current protocol
    #[must_use]
    pub fn report_len(&self) -> usize {
        match self.protocol {
            HidProtocol::Report => REPORT_LEN,
            HidProtocol::Boot => BOOT_REPORT_LEN,
        }
    }

    /// Read an output report from the interrupt OUT endpoint
    pub fn read_report(&self, data: &mut [u8]) -> Result<usize> {
        self.out_endpoint.read(data)
    }

    #[must_use]
    pub fn report_descriptor(&self) -> &'static [u8] {
        report_descriptor()
    }

    /// Rebuild and return the configuration descriptor
    ///
    /// Only index 0 exists, any other index returns `None`.
    pub fn configuration_descriptor(&mut self, index: u8) -> Option<&[u8]> {
        if index != 0 {
            return None;
        }
        let params = self.configuration_params();
        build_configuration_descriptor(&params, &mut self.configuration_descriptor);
        Some(&self.configuration_descriptor)
    }

    fn configuration_params(&self) -> ConfigurationDescriptorParams {
        ConfigurationDescriptorParams {
            interface_number: u8::from(self.interface),
            in_endpoint_address: u8::from(self.in_endpoint.address()),
            out_endpoint_address: u8::from(self.out_endpoint.address()),
            endpoint: self.config.endpoint,
        }
    }

    #[must_use]
    pub fn protocol(&self) -> HidProtocol {
        self.protocol
    }

    #[must_use]
    pub fn global_idle(&self) -> MillisDurationU32 {
        (u32::from(self.global_idle) * 4).millis()
    }

    fn last_report(&self) -> Vec<u8, REPORT_LEN> {
        critical_section::with(|cs| self.in_flight.borrow_ref(cs).clone())
    }

    fn get_descriptor(&self, transfer: ControlIn<B>) {
        let request: &Request = transfer.request();
        match DescriptorType::try_from((request.value >> 8) as u8) {
            Ok(DescriptorType::Report) => match transfer.accept_with(report_descriptor()) {
                Err(e) => error!("Failed to send report descriptor - {:?}", e),
                Ok(_) => {
                    trace!("Sent report descriptor");
                }
            },
            Ok(DescriptorType::Hid) => match transfer.accept_with(&hid_descriptor()) {
                Err(e) => {
                    error!("Failed to send Hid descriptor - {:?}", e);
                }
                Ok(_) => {
                    trace!("Sent hid descriptor");
                }
            },
            _ => {
                warn!(
                    "Unsupported descriptor type, request type:{:?}, request:{}, value:{}",
                    request.request_type, request.request, request.value
                );
            }
        }
    }
}

impl<B: UsbBus> UsbClass<B> for RelativeMouse16<'_, B> {
    fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        writer.interface_alt(
            self.interface,
            usb_device::device::DEFAULT_ALTERNATE_SETTING,
            USB_CLASS_HID,
            InterfaceSubClass::from(InterfaceProtocol::Mouse).into(),
            InterfaceProtocol::Mouse.into(),
            None,
        )?;

        //Hid descriptor
        writer.write(DescriptorType::Hid.into(), &hid_descriptor_body())?;

        //Endpoint descriptors
        writer.endpoint(&self.in_endpoint)?;
        writer.endpoint(&self.out_endpoint)?;

        info!("wrote class config descriptor");
        Ok(())
    }

    fn reset(&mut self) {
        info!("Reset");
        self.protocol = HidProtocol::Report;
        self.global_idle = self.config.idle_default;
    }

    fn control_out(&mut self, transfer: ControlOut<B>) {
        let request: &Request = transfer.request();

        //only respond to Class requests for this interface
        if !(request.request_type == RequestType::Class
            && request.recipient == Recipient::Interface
            && request.index == u16::from(u8::from(self.interface)))
        {
            return;
        }

        trace!(
            "ctrl_out: request type: {:?}, request: {}, value: {}",
            request.request_type,
            request.request,
            request.value
        );

        match HidRequest::try_from(request.request) {
            Ok(HidRequest::SetIdle) => {
                if request.length != 0 {
                    warn!(
                        "Expected SetIdle to have length 0, received {}",
                        request.length
                    );
                }

                let report_id = (request.value & 0xFF) as u8;
                let idle = (request.value >> 8) as u8;
                if report_id == 0 {
                    self.global_idle = idle;
                    info!("Set global idle to {}", idle);
                    transfer.accept().ok();
                } else {
                    //single report device, there are no report ids
                    warn!("Failed to set idle for report id {}", report_id);
                    transfer.reject().ok();
                }
            }
            Ok(HidRequest::SetReport) => {
                //output reports arrive on the interrupt OUT endpoint
                warn!("Rejected SetReport, value: {}", request.value);
                transfer.reject().ok();
            }
            Ok(HidRequest::SetProtocol) => {
                if request.length != 0 {
                    warn!(
                        "Expected SetProtocol to have length 0, received {}",
                        request.length
                    );
                }
                if let Ok(protocol) = HidProtocol::try_from((request.value & 0xFF) as u8) {
                    self.protocol = protocol;
                    info!("Set protocol to {:?}", protocol);
                    transfer.accept().ok();
                } else {
                    error!(
                        "Unable to set protocol, unsupported value:{}",
                        request.value
                    );
                }
            }
            _ => {
                warn!(
                    "Unsupported control_out request type: {:?}, request: {}, value: {}",
                    request.request_type, request.request, request.value
                );
            }
        }
    }

    fn control_in(&mut self, transfer: ControlIn<B>) {
        let request: &Request = transfer.request();
        //only respond to requests for this interface
        if !(request.recipient == Recipient::Interface
            && request.index == u16::from(u8::from(self.interface)))
        {
            return;
        }

        trace!(
            "ctrl_in: request type: {:?}, request: {}, value: {}",
            request.request_type,
            request.request,
            request.value
        );

        match request.request_type {
            RequestType::Standard => {
                if request.request == Request::GET_DESCRIPTOR {
                    info!("Get descriptor");
                    self.get_descriptor(transfer);
                }
            }
            RequestType::Class => match HidRequest::try_from(request.request) {
                Ok(HidRequest::GetReport) => {
                    let report_type = HidReportType::try_from((request.value >> 8) as u8);
                    if !matches!(report_type, Ok(HidReportType::Input)) {
                        //only an input report is declared
                        warn!("Rejected GetReport for report type {}", request.value >> 8);
                        transfer.reject().ok();
                        return;
                    }

                    let last = self.last_report();
                    let nothing_sent = [0_u8; REPORT_LEN];
                    let report = if last.is_empty() {
                        &nothing_sent[..self.report_len()]
                    } else {
                        &last[..]
                    };
                    if let Err(e) = transfer.accept_with(report) {
                        error!("Failed to send report - {:?}", e);
                    } else {
                        trace!("Sent report, {} bytes", report.len());
                    }
                }
                Ok(HidRequest::GetIdle) => {
                    if request.length != 1 {
                        warn!(
                            "Expected GetIdle to have length 1, received {}",
                            request.length
                        );
                    }

                    let idle = self.global_idle;
                    if let Err(e) = transfer.accept_with(&[idle]) {
                        error!("Failed to send idle data - {:?}", e);
                    } else {
                        info!("Get Idle: {}", idle);
                    }
                }
                Ok(HidRequest::GetProtocol) => {
                    if request.length != 1 {
                        warn!(
                            "Expected GetProtocol to have length 1, received {}",
                            request.length
                        );
                    }

                    let protocol = self.protocol;
                    if let Err(e) = transfer.accept_with(&[protocol.into()]) {
                        error!("Failed to send protocol data - {:?}", e);
                    } else {
                        info!("Get protocol: {:?}", protocol);
                    }
                }
                _ => {
                    warn!(
                        "Unsupported control_in request type: {:?}, request: {}, value: {}",
                        request.request_type, request.request, request.value
                    );
                }
            },
            _ => {}
        }
    }
}
