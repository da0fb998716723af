//! Construction-time configuration of the driver.

use embedded_hal::spi::{MODE_1, Mode};
use fugit::{HertzU32, RateExtU32};

use crate::control::{ControlRegister, LinearityCompensation};

/// Members of the chip family.
///
/// Both chips share the 20-bit payload field of the command frame. The 18-bit
/// AD5781 takes its code in the top 18 bits, so its codes are shifted left by
/// two on write and right by two on readback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// AD5781, 18-bit.
    Ad5781,
    /// AD5791, 20-bit.
    Ad5791,
}

impl Variant {
    /// DAC resolution in bits.
    pub const fn resolution(self) -> u8 {
        match self {
            Variant::Ad5781 => 18,
            Variant::Ad5791 => 20,
        }
    }

    /// Left shift that aligns a code with the top of the 20-bit payload.
    pub const fn value_offset(self) -> u8 {
        20 - self.resolution()
    }

    /// Largest code the chip accepts.
    pub fn max_value(self) -> u32 {
        (1u32 << self.resolution()) - 1
    }

    /// Scale a DAC code into the 20-bit payload.
    ///
    /// Bits shifted past bit 19 are dropped, so out-of-range codes wrap rather
    /// than fail.
    pub fn encode(self, value: u32) -> u32 {
        (value << self.value_offset()) & crate::commands::PAYLOAD_MASK
    }

    /// Scale a 20-bit payload back into a DAC code.
    pub fn decode(self, payload: u32) -> u32 {
        (payload & crate::commands::PAYLOAD_MASK) >> self.value_offset()
    }
}

/// Logic level that selects the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSelectPolarity {
    /// Chip selected while the line is low (the ~SYNC input of the DAC).
    #[default]
    ActiveLow,
    /// Chip selected while the line is high, eg behind an inverting buffer.
    ActiveHigh,
}

/// What [`Ad57x1::enable_output`](crate::Ad57x1::enable_output) does to the
/// control register image before committing it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputEnableSequence {
    /// Release the ground clamp and tristate only. Every other field keeps
    /// whatever was configured before.
    #[default]
    ClampAndTristate,
    /// Also bring the remaining fields to a fixed operating state: internal
    /// amplifier disabled, two's complement coding, and linearity compensation
    /// chosen from the reference span (20 V compensation above 10 V).
    Full {
        /// Reference input span in volts.
        reference_voltage: f32,
    },
}

impl OutputEnableSequence {
    /// Apply the sequence to an image.
    pub fn apply(&self, image: ControlRegister) -> ControlRegister {
        let image = image.with_output_clamp(false).with_tristate(false);
        match *self {
            OutputEnableSequence::ClampAndTristate => image,
            OutputEnableSequence::Full { reference_voltage } => image
                .with_internal_amplifier(false)
                .with_offset_binary(false)
                .with_linearity_compensation(LinearityCompensation::for_reference_span(
                    reference_voltage,
                )),
        }
    }
}

/// SPI settings the bus has to be configured with for the DAC.
///
/// `embedded-hal` buses are configured when they are created, so the driver
/// cannot apply these itself. Data is always shifted MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusSettings {
    /// SCLK frequency.
    pub frequency: HertzU32,
    /// Clock polarity and phase: CPOL = 0, CPHA = 1.
    pub mode: Mode,
}

/// Driver configuration.
///
/// Everything here is fixed for the life of the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Chip the driver talks to.
    pub variant: Variant,
    /// Active level of the chip-select line.
    pub chip_select: ChipSelectPolarity,
    /// SCLK frequency.
    ///
    /// The datasheet allows up to 35 MHz for writes; the default is a
    /// conservative 1 MHz.
    pub bus_frequency: HertzU32,
    /// Behaviour of `enable_output` and `reset`.
    pub enable_output: OutputEnableSequence,
}

impl Config {
    /// Default configuration for the given chip.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            chip_select: ChipSelectPolarity::default(),
            bus_frequency: 1.MHz(),
            enable_output: OutputEnableSequence::default(),
        }
    }

    /// Change the chip-select polarity.
    pub fn with_chip_select(&mut self, polarity: ChipSelectPolarity) -> &mut Self {
        self.chip_select = polarity;
        self
    }

    /// Change the SCLK frequency.
    pub fn with_bus_frequency(&mut self, frequency: HertzU32) -> &mut Self {
        self.bus_frequency = frequency;
        self
    }

    /// Change what `enable_output` does.
    pub fn with_enable_output(&mut self, sequence: OutputEnableSequence) -> &mut Self {
        self.enable_output = sequence;
        self
    }

    /// SPI settings matching this configuration.
    pub fn bus_settings(&self) -> BusSettings {
        BusSettings {
            frequency: self.bus_frequency,
            mode: MODE_1,
        }
    }
}
