//!HID mouse with 16-bit relative axes
use packed_struct::prelude::*;

/// Length in bytes of a [`RelativeMouseReport`] on the wire
pub const REPORT_LEN: usize = 6;

/// Number of buttons advertised by [`REPORT_DESCRIPTOR`]
pub const BUTTON_COUNT: u8 = 5;

/// Bits of the button byte that carry button state, the remainder is constant padding
pub const BUTTON_MASK: u8 = (1 << BUTTON_COUNT) - 1;

/// Five button mouse with 16-bit relative X/Y and an 8-bit relative wheel
///
/// The field layout must match [`RelativeMouseReport`] exactly:
///
/// | byte | field                      |
/// |------|----------------------------|
/// | 0    | buttons 1-5, 3 bit padding |
/// | 1-2  | X, little endian           |
/// | 3-4  | Y, little endian           |
/// | 5    | wheel                      |
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,        // Usage Page (Generic Desktop),
    0x09, 0x02,        // Usage (Mouse),
    0xA1, 0x01,        // Collection (Application),
    0x09, 0x01,        //   Usage (Pointer),
    0xA1, 0x00,        //   Collection (Physical),

    0x95, 0x05,        //     Report Count (5),
    0x75, 0x01,        //     Report Size (1),
    0x05, 0x09,        //     Usage Page (Buttons),
    0x19, 0x01,        //     Usage Minimum (1),
    0x29, 0x05,        //     Usage Maximum (5),
    0x15, 0x00,        //     Logical Minimum (0),
    0x25, 0x01,        //     Logical Maximum (1),
    0x81, 0x02,        //     Input (Data, Variable, Absolute),
    0x95, 0x01,        //     Report Count (1),
    0x75, 0x03,        //     Report Size (3),
    0x81, 0x01,        //     Input (Constant),

    0x95, 0x02,        //     Report Count (2),
    0x75, 0x10,        //     Report Size (16),
    0x05, 0x01,        //     Usage Page (Generic Desktop),
    0x09, 0x30,        //     Usage (X),
    0x09, 0x31,        //     Usage (Y),
    0x16, 0x01, 0x80,  //     Logical Minimum (-32767),
    0x26, 0xFF, 0x7F,  //     Logical Maximum (32767),
    0x81, 0x06,        //     Input (Data, Variable, Relative),

    0x95, 0x01,        //     Report Count (1),
    0x75, 0x08,        //     Report Size (8),
    0x05, 0x01,        //     Usage Page (Generic Desktop),
    0x09, 0x38,        //     Usage (Wheel),
    0x15, 0x81,        //     Logical Minimum (-127),
    0x25, 0x7F,        //     Logical Maximum (127),
    0x81, 0x06,        //     Input (Data, Variable, Relative),

    0xC0,              //   End Collection,
    0xC0,              // End Collection
];

/// The report descriptor served to the host, see [`REPORT_DESCRIPTOR`]
#[must_use]
pub fn report_descriptor() -> &'static [u8] {
    REPORT_DESCRIPTOR
}

/// Input report as it appears on the interrupt IN endpoint
///
/// `wheel` holds the wire value, which is the negation of the scroll delta
/// passed to [`RelativeMouseReport::new`] and [`encode`].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Default, PackedStruct)]
#[packed_struct(endian = "lsb", size_bytes = "6")]
pub struct RelativeMouseReport {
    #[packed_field]
    pub buttons: u8,
    #[packed_field]
    pub x: i16,
    #[packed_field]
    pub y: i16,
    #[packed_field]
    pub wheel: i8,
}

impl RelativeMouseReport {
    /// Positive `wheel` scrolls up. Bits 5-7 of `buttons` are not masked.
    #[must_use]
    pub fn new(x: i16, y: i16, buttons: u8, wheel: i8) -> Self {
        Self {
            buttons,
            x,
            y,
            wheel: wheel.wrapping_neg(),
        }
    }

    /// The scroll delta as passed to [`RelativeMouseReport::new`]
    #[must_use]
    pub fn scroll(&self) -> i8 {
        self.wheel.wrapping_neg()
    }
}

/// Packs pointer state into the 6 byte report described by [`REPORT_DESCRIPTOR`]
///
/// Every input is representable, no clamping takes place. `buttons` is copied
/// verbatim, callers are expected to keep bits 5-7 clear (see [`BUTTON_MASK`]).
#[must_use]
pub fn encode(x: i16, y: i16, buttons: u8, wheel: i8) -> [u8; REPORT_LEN] {
    let [x_lo, x_hi] = x.to_le_bytes();
    let [y_lo, y_hi] = y.to_le_bytes();
    let [wheel] = wheel.wrapping_neg().to_le_bytes();
    [buttons, x_lo, x_hi, y_lo, y_hi, wheel]
}

/// Length in bytes of a boot protocol report
pub const BOOT_REPORT_LEN: usize = 4;

/// Largest displacement a boot protocol axis can carry
pub const BOOT_AXIS_LIMIT: i16 = 127;

/// Packs pointer state into the fixed boot protocol layout (HID 1.11 appendix B.2)
///
/// Boot hosts ignore the report descriptor and read X and Y as single signed
/// bytes, so both axes saturate at ±[`BOOT_AXIS_LIMIT`]. The wheel follows in
/// byte 3 with the same sign convention as [`encode`].
#[must_use]
pub fn encode_boot(x: i16, y: i16, buttons: u8, wheel: i8) -> [u8; BOOT_REPORT_LEN] {
    let saturate = |axis: i16| axis.clamp(-BOOT_AXIS_LIMIT, BOOT_AXIS_LIMIT) as i8;
    let [x] = saturate(x).to_le_bytes();
    let [y] = saturate(y).to_le_bytes();
    let [wheel] = wheel.wrapping_neg().to_le_bytes();
    [buttons, x, y, wheel]
}
