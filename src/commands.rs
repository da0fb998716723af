//! 24-bit command frames exchanged with the DAC.
//!
//! Every register on the AD5781 and AD5791 is reached through the same frame
//! layout (see table 10 of the AD5791 datasheet):
//!
//! | Bit   | 23  | 22..=20  | 19..=0  |
//! |-------|-----|----------|---------|
//! | Field | R/W | Register | Payload |
//!
//! Frames are shifted out MSB first.

use bit_field::BitField;

/// Mask of the 20-bit payload field.
pub const PAYLOAD_MASK: u32 = 0xF_FFFF;

/// Bit position of the read/write flag.
const DIRECTION_BIT: usize = 23;

/// Bit range of the register address.
const ADDRESS_BITS: core::ops::RangeInclusive<usize> = 20..=22;

/// Bit range of the payload.
const PAYLOAD_BITS: core::ops::RangeInclusive<usize> = 0..=19;

/// Registers that can be addressed in a command frame.
///
/// The register map is fixed by the chip; there is no way to reach anything
/// else through the serial interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// DAC input register holding the output code.
    ///
    /// See page 21 of the datasheet.
    DacValue,
    /// Control register holding the output stage and coding configuration.
    ///
    /// See page 22 of the datasheet, and [`ControlRegister`] for the layout.
    ///
    /// [`ControlRegister`]: crate::control::ControlRegister
    Control,
    /// Clear code register, the code the output is forced to by CLR.
    ///
    /// See page 22 of the datasheet.
    ClearCode,
    /// Write-only software control register (LDAC, CLR and RESET strobes).
    ///
    /// See page 23 of the datasheet.
    SoftwareControl,
}

impl Register {
    /// All addressable registers.
    pub const ALL: [Register; 4] = [
        Register::DacValue,
        Register::Control,
        Register::ClearCode,
        Register::SoftwareControl,
    ];

    /// 3-bit register address placed in bits 20 to 22 of a frame.
    pub const fn address(self) -> u8 {
        match self {
            Register::DacValue => 0b001,
            Register::Control => 0b010,
            Register::ClearCode => 0b011,
            Register::SoftwareControl => 0b100,
        }
    }

    /// Look up the register with the given 3-bit address.
    ///
    /// Returns `None` for the addresses the chip does not assign (including the
    /// no-operation address `0b000`).
    pub fn from_address(address: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.address() == address)
    }
}

/// Transfer direction of a command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Load the payload into the addressed register (R/W bit clear).
    Write,
    /// Ask the chip to return the addressed register in the next frame
    /// (R/W bit set).
    Read,
}

impl From<Direction> for bool {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Write => false,
            Direction::Read => true,
        }
    }
}

impl From<bool> for Direction {
    fn from(value: bool) -> Self {
        if value { Self::Read } else { Self::Write }
    }
}

/// Strobes in the software control register.
///
/// Each one is self-clearing on the chip, so a frame carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftwareControl {
    /// Transfer the input register to the DAC output (software LDAC).
    Load,
    /// Load the clear code into the DAC register (software CLR).
    Clear,
    /// Return the chip to its power-on state (software RESET).
    Reset,
}

impl SoftwareControl {
    /// Payload bits for this strobe.
    pub const fn bits(self) -> u32 {
        match self {
            SoftwareControl::Load => 0b001,
            SoftwareControl::Clear => 0b010,
            SoftwareControl::Reset => 0b100,
        }
    }
}

/// A 24-bit command frame ready to be shifted out to the DAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame(u32);

impl Frame {
    /// Assemble a frame.
    ///
    /// The payload is masked to 20 bits. Anything above bit 19 is silently
    /// dropped rather than rejected, so callers that pass an over-wide value
    /// get the low 20 bits written.
    pub fn new(direction: Direction, register: Register, payload: u32) -> Self {
        let mut bits = 0u32;
        bits.set_bit(DIRECTION_BIT, direction.into());
        bits.set_bits(ADDRESS_BITS, register.address().into());
        bits.set_bits(PAYLOAD_BITS, payload & PAYLOAD_MASK);
        Self(bits)
    }

    /// Write `payload` to `register`.
    pub fn write(register: Register, payload: u32) -> Self {
        Self::new(Direction::Write, register, payload)
    }

    /// Request a readback of `register`.
    ///
    /// The payload of a read command is ignored by the chip and sent as zero.
    pub fn read(register: Register) -> Self {
        Self::new(Direction::Read, register, 0)
    }

    /// Pulse one of the software control strobes.
    pub fn software_control(strobe: SoftwareControl) -> Self {
        Self::write(Register::SoftwareControl, strobe.bits())
    }

    /// The frame as a right-aligned 24-bit integer.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Bytes to place on the bus, most significant first.
    pub fn to_bytes(&self) -> [u8; 3] {
        let [_, high, mid, low] = self.0.to_be_bytes();
        [high, mid, low]
    }
}

/// A raw 24-bit word clocked out of the DAC during a readback.
///
/// The chip echoes the read command it was given, with the payload replaced by
/// the register contents. Nothing beyond splitting the fields is done here;
/// scaling the payload to a DAC code is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readback(u32);

impl Readback {
    /// Parse the three bytes received, most significant first.
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let [high, mid, low] = bytes;
        Self(u32::from_be_bytes([0, high, mid, low]))
    }

    /// The whole 24-bit word, including the echoed command bits.
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Echoed R/W flag.
    pub fn direction(&self) -> Direction {
        self.0.get_bit(DIRECTION_BIT).into()
    }

    /// Echoed 3-bit register address.
    pub fn address(&self) -> u8 {
        self.0.get_bits(ADDRESS_BITS) as u8
    }

    /// Register named by the echoed address, if the address is assigned.
    pub fn register(&self) -> Option<Register> {
        Register::from_address(self.address())
    }

    /// The 20-bit register contents.
    pub fn payload(&self) -> u32 {
        self.0.get_bits(PAYLOAD_BITS)
    }
}
