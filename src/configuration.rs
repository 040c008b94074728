//! Configuration descriptor for the relative mouse
//!
//! Each sub-descriptor is a [`PackedStruct`]; every `bLength`, `wTotalLength`
//! and `wDescriptorLength` field is derived from the packed size of the
//! structure it describes, so the fields cannot drift from the bytes.
use core::mem::size_of;

use heapless::Vec;
use packed_struct::prelude::*;

use crate::descriptor::{
    DescriptorType, InterfaceProtocol, InterfaceSubClass, CONFIGURATION_RESERVED,
    CONFIGURATION_SELF_POWERED, COUNTRY_CODE_NOT_SUPPORTED, DEFAULT_CONFIGURATION,
    ENDPOINT_INTERRUPT, SPEC_VERSION_1_11, USB_CLASS_HID,
};
use crate::device::mouse::report_descriptor;
use crate::usb_class::UsbPacketSize;

const fn packed_len<T: PackedStruct>() -> usize {
    size_of::<T::ByteArray>()
}

/// `bLength` + `bDescriptorType`
const DESCRIPTOR_HEADER_LEN: usize = 2;

pub const CONFIGURATION_DESCRIPTOR_LEN: usize = packed_len::<ConfigurationDescriptor>();
pub const INTERFACE_DESCRIPTOR_LEN: usize = packed_len::<InterfaceDescriptor>();
pub const HID_DESCRIPTOR_LEN: usize = DESCRIPTOR_HEADER_LEN + packed_len::<HidDescriptorBody>();
pub const ENDPOINT_DESCRIPTOR_LEN: usize = packed_len::<EndpointDescriptor>();

/// Interrupt IN and interrupt OUT
pub const ENDPOINT_COUNT: usize = 2;

/// `wTotalLength` of the configuration
pub const TOTAL_DESCRIPTOR_LEN: usize = CONFIGURATION_DESCRIPTOR_LEN
    + INTERFACE_DESCRIPTOR_LEN
    + HID_DESCRIPTOR_LEN
    + ENDPOINT_COUNT * ENDPOINT_DESCRIPTOR_LEN;

/// Size of the buffer the configuration descriptor is served from
pub const CONFIGURATION_DESCRIPTOR_CAPACITY: usize = 41;

const SCRATCH_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb", size_bytes = 9)]
pub struct ConfigurationDescriptor {
    length: u8,
    #[packed_field(ty = "enum", size_bytes = "1")]
    descriptor_type: DescriptorType,
    total_length: u16,
    num_interfaces: u8,
    configuration_value: u8,
    configuration_string: u8,
    attributes: u8,
    max_power: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb", size_bytes = 9)]
pub struct InterfaceDescriptor {
    length: u8,
    #[packed_field(ty = "enum", size_bytes = "1")]
    descriptor_type: DescriptorType,
    interface_number: u8,
    alternate_setting: u8,
    num_endpoints: u8,
    interface_class: u8,
    interface_sub_class: u8,
    interface_protocol: u8,
    interface_string: u8,
}

/// HID descriptor without `bLength`/`bDescriptorType`, which
/// [`DescriptorWriter`](usb_device::descriptor::DescriptorWriter) supplies
#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb", size_bytes = 7)]
pub struct HidDescriptorBody {
    bcd_hid: u16,
    country_code: u8,
    num_descriptors: u8,
    #[packed_field(ty = "enum", size_bytes = "1")]
    descriptor_type: DescriptorType,
    descriptor_length: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PackedStruct)]
#[packed_struct(endian = "lsb", size_bytes = 7)]
pub struct EndpointDescriptor {
    length: u8,
    #[packed_field(ty = "enum", size_bytes = "1")]
    descriptor_type: DescriptorType,
    address: u8,
    attributes: u8,
    max_packet_size: u16,
    interval: u8,
}

/// Settings shared by both interrupt endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// `bInterval` in milliseconds
    pub poll_interval: u8,
    pub max_packet_size: UsbPacketSize,
}

/// Values assigned by the USB stack when the device is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationDescriptorParams {
    pub interface_number: u8,
    pub in_endpoint_address: u8,
    pub out_endpoint_address: u8,
    pub endpoint: EndpointConfig,
}

fn packed<const N: usize>(result: Result<[u8; N], PackingError>) -> [u8; N] {
    match result {
        Ok(bytes) => bytes,
        // Avoid pulling all the core::fmt code into final binary
        Err(_) => panic!("Failed to pack descriptor"),
    }
}

fn u8_len(len: usize) -> u8 {
    match u8::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("Descriptor too long, must be <= u8::MAX"),
    }
}

fn u16_len(len: usize) -> u16 {
    match u16::try_from(len) {
        Ok(len) => len,
        Err(_) => panic!("Descriptor too long, must be <= u16::MAX"),
    }
}

/// Body of the HID descriptor, pointing at [`report_descriptor`]
#[must_use]
pub fn hid_descriptor_body() -> [u8; 7] {
    packed(
        HidDescriptorBody {
            bcd_hid: SPEC_VERSION_1_11,
            country_code: COUNTRY_CODE_NOT_SUPPORTED,
            num_descriptors: 1,
            descriptor_type: DescriptorType::Report,
            descriptor_length: u16_len(report_descriptor().len()),
        }
        .pack(),
    )
}

/// Complete HID descriptor, as returned for `GET_DESCRIPTOR(HID)`
#[must_use]
pub fn hid_descriptor() -> [u8; HID_DESCRIPTOR_LEN] {
    let mut buffer = [0; HID_DESCRIPTOR_LEN];
    buffer[0] = u8_len(HID_DESCRIPTOR_LEN);
    buffer[1] = u8::from(DescriptorType::Hid);
    buffer[DESCRIPTOR_HEADER_LEN..].copy_from_slice(&hid_descriptor_body());
    buffer
}

fn endpoint_descriptor(address: u8, endpoint: &EndpointConfig) -> [u8; ENDPOINT_DESCRIPTOR_LEN] {
    packed(
        EndpointDescriptor {
            length: u8_len(ENDPOINT_DESCRIPTOR_LEN),
            descriptor_type: DescriptorType::Endpoint,
            address,
            attributes: ENDPOINT_INTERRUPT,
            max_packet_size: u16::from(u8::from(endpoint.max_packet_size)),
            interval: endpoint.poll_interval,
        }
        .pack(),
    )
}

/// Writes Configuration, Interface, HID, Endpoint IN and Endpoint OUT
/// descriptors into `out`
///
/// # Panics
///
/// If `out` is not exactly [`TOTAL_DESCRIPTOR_LEN`] bytes long. Both sizes are
/// fixed when the crate is compiled, a mismatch means the descriptor layout
/// and its buffer have diverged and any descriptor written would be corrupt.
pub fn build_configuration_descriptor(params: &ConfigurationDescriptorParams, out: &mut [u8]) {
    let configuration = packed(
        ConfigurationDescriptor {
            length: u8_len(CONFIGURATION_DESCRIPTOR_LEN),
            descriptor_type: DescriptorType::Configuration,
            total_length: u16_len(TOTAL_DESCRIPTOR_LEN),
            num_interfaces: 1,
            configuration_value: DEFAULT_CONFIGURATION,
            configuration_string: 0,
            attributes: CONFIGURATION_RESERVED | CONFIGURATION_SELF_POWERED,
            max_power: 0,
        }
        .pack(),
    );

    let interface = packed(
        InterfaceDescriptor {
            length: u8_len(INTERFACE_DESCRIPTOR_LEN),
            descriptor_type: DescriptorType::Interface,
            interface_number: params.interface_number,
            alternate_setting: 0,
            num_endpoints: u8_len(ENDPOINT_COUNT),
            interface_class: USB_CLASS_HID,
            interface_sub_class: InterfaceSubClass::from(InterfaceProtocol::Mouse).into(),
            interface_protocol: InterfaceProtocol::Mouse.into(),
            interface_string: 0,
        }
        .pack(),
    );

    let hid = hid_descriptor();
    let in_endpoint = endpoint_descriptor(params.in_endpoint_address, &params.endpoint);
    let out_endpoint = endpoint_descriptor(params.out_endpoint_address, &params.endpoint);

    let mut scratch: Vec<u8, SCRATCH_CAPACITY> = Vec::new();
    for part in [
        &configuration[..],
        &interface[..],
        &hid[..],
        &in_endpoint[..],
        &out_endpoint[..],
    ] {
        if scratch.extend_from_slice(part).is_err() {
            panic!("Configuration descriptor exceeds scratch buffer");
        }
    }

    assert_eq!(
        scratch.len(),
        out.len(),
        "Configuration descriptor length does not match its buffer"
    );
    out.copy_from_slice(&scratch);
}
