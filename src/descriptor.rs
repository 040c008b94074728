//! HID and USB descriptor constants and enumerations
use num_enum::{IntoPrimitive, TryFromPrimitive};
use packed_struct::prelude::*;

pub const USB_CLASS_HID: u8 = 0x03;
pub const SPEC_VERSION_1_11: u16 = 0x0111; //1.11 in BCD
pub const COUNTRY_CODE_NOT_SUPPORTED: u8 = 0x0;

/// `bConfigurationValue` of the single configuration
pub const DEFAULT_CONFIGURATION: u8 = 1;

/// `bmAttributes` bit 7, must always be set
pub const CONFIGURATION_RESERVED: u8 = 0x80;
pub const CONFIGURATION_SELF_POWERED: u8 = 0x40;

/// `bmAttributes` transfer type of an interrupt endpoint
pub const ENDPOINT_INTERRUPT: u8 = 0x03;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum InterfaceProtocol {
    None = 0x00,
    Mouse = 0x02,
}

/// Standard (USB 2.0 table 9-5) and HID class (HID 1.11 section 7.1) descriptor types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PrimitiveEnum, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DescriptorType {
    Configuration = 0x02,
    Interface = 0x04,
    Endpoint = 0x05,
    Hid = 0x21,
    Report = 0x22,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum InterfaceSubClass {
    None = 0x00,
    Boot = 0x01,
}

impl From<InterfaceProtocol> for InterfaceSubClass {
    fn from(protocol: InterfaceProtocol) -> Self {
        if protocol == InterfaceProtocol::None {
            Self::None
        } else {
            Self::Boot
        }
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum HidProtocol {
    Boot = 0x00,
    Report = 0x01,
}

/// Report type carried in the high byte of `GET_REPORT`/`SET_REPORT` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum HidReportType {
    Input = 0x01,
    Output = 0x02,
    Feature = 0x03,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum HidRequest {
    GetReport = 0x01,
    GetIdle = 0x02,
    GetProtocol = 0x03,
    SetReport = 0x09,
    SetIdle = 0x0A,
    SetProtocol = 0x0B,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn boot_sub_class_follows_protocol() {
        assert_eq!(
            InterfaceSubClass::from(InterfaceProtocol::Mouse),
            InterfaceSubClass::Boot
        );
        assert_eq!(
            InterfaceSubClass::from(InterfaceProtocol::None),
            InterfaceSubClass::None
        );
    }

    #[test]
    fn descriptor_types_round_trip_through_u8() {
        assert_eq!(u8::from(DescriptorType::Hid), 0x21);
        assert!(matches!(
            DescriptorType::try_from(0x22_u8),
            Ok(DescriptorType::Report)
        ));
        assert!(DescriptorType::try_from(0x01_u8).is_err());
    }

    #[test]
    fn report_type_from_request_value() {
        assert!(matches!(
            HidReportType::try_from((0x0300_u16 >> 8) as u8),
            Ok(HidReportType::Feature)
        ));
        assert!(HidReportType::try_from(0x00_u8).is_err());
    }
}
