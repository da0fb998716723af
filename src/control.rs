//! The control register and its cached image.
//!
//! The control register sets up the output stage and the input coding of the
//! DAC. The driver never reads it back on its own: it keeps an image of what it
//! last configured and sends the whole image on every commit.
//!
//! ## Datasheet
//!
//! See table 12 and page 22 of the AD5791 datasheet for the bit layout.

use bit_field::BitField;

/// RBUF: internal amplifier disabled when set.
const RBUF_BIT: usize = 1;
/// OPGND: output clamped to ground when set.
const OPGND_BIT: usize = 2;
/// DACTRI: output tristated when set.
const DACTRI_BIT: usize = 3;
/// BIN/2sC: offset binary coding when set, two's complement when clear.
const BIN_BIT: usize = 4;
/// SDODIS: serial data output disabled when set.
const SDODIS_BIT: usize = 5;
/// LIN COMP: linearity error compensation for the reference span.
const LIN_COMP_BITS: core::ops::RangeInclusive<usize> = 6..=9;

/// Linearity error compensation setting, chosen by the reference input span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinearityCompensation {
    /// Reference span up to 10 V (power-on default).
    #[default]
    Range10V,
    /// Reference span between 10 V and 20 V.
    Range20V,
    /// One of the codes the datasheet leaves reserved, kept as read.
    ///
    /// Only the low four bits are used.
    Reserved(u8),
}

impl LinearityCompensation {
    /// Pick the compensation for a reference span in volts.
    ///
    /// Spans above 10 V need the 20 V compensation.
    pub fn for_reference_span(volts: f32) -> Self {
        if volts > 10.0 { Self::Range20V } else { Self::Range10V }
    }
}

impl From<LinearityCompensation> for u32 {
    fn from(value: LinearityCompensation) -> Self {
        match value {
            LinearityCompensation::Range10V => 0b0000,
            LinearityCompensation::Range20V => 0b1100,
            LinearityCompensation::Reserved(code) => u32::from(code & 0b1111),
        }
    }
}

impl From<u32> for LinearityCompensation {
    /// Decode the 4-bit LIN COMP field.
    ///
    /// Only `0b0000` and `0b1100` are defined. Any other code is kept as
    /// [`LinearityCompensation::Reserved`] so that it is written back unchanged.
    fn from(value: u32) -> Self {
        match value & 0b1111 {
            0b0000 => Self::Range10V,
            0b1100 => Self::Range20V,
            code => Self::Reserved(code as u8),
        }
    }
}

/// Image of the DAC control register.
///
/// This is a plain value: the `with_` methods return a copy with one field
/// changed and leave every other bit alone. Use [`ControlRegister::bits`] to get
/// the word sent to the chip.
///
/// The [`Default`] image is the chip's power-on state: internal amplifier
/// disabled, output clamped to ground and tristated, offset binary coding, SDO
/// enabled and 10 V linearity compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRegister {
    /// Internal amplifier disabled (RBUF).
    pub internal_amplifier_disabled: bool,
    /// Output clamped to ground through 6 kΩ (OPGND).
    ///
    /// Overrides tristate mode while set.
    pub output_clamped_to_ground: bool,
    /// Output in tristate (DACTRI).
    pub tristate: bool,
    /// Offset binary coding (BIN/2sC); two's complement when `false`.
    pub offset_binary: bool,
    /// SDO pin disabled (SDODIS).
    ///
    /// Readback does not work while this is set. None of the driver's setters
    /// change it.
    pub sdo_disabled: bool,
    /// Linearity error compensation (LIN COMP).
    pub linearity_compensation: LinearityCompensation,
}

impl Default for ControlRegister {
    fn default() -> Self {
        Self {
            internal_amplifier_disabled: true,
            output_clamped_to_ground: true,
            tristate: true,
            offset_binary: true,
            sdo_disabled: false,
            linearity_compensation: LinearityCompensation::Range10V,
        }
    }
}

impl ControlRegister {
    /// Fold the image into the register word.
    pub fn bits(&self) -> u32 {
        let mut bits = 0u32;
        bits.set_bit(RBUF_BIT, self.internal_amplifier_disabled);
        bits.set_bit(OPGND_BIT, self.output_clamped_to_ground);
        bits.set_bit(DACTRI_BIT, self.tristate);
        bits.set_bit(BIN_BIT, self.offset_binary);
        bits.set_bit(SDODIS_BIT, self.sdo_disabled);
        bits.set_bits(LIN_COMP_BITS, self.linearity_compensation.into());
        bits
    }

    /// Rebuild an image from a register word, eg the payload of a readback.
    ///
    /// Bits outside the documented fields are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            internal_amplifier_disabled: bits.get_bit(RBUF_BIT),
            output_clamped_to_ground: bits.get_bit(OPGND_BIT),
            tristate: bits.get_bit(DACTRI_BIT),
            offset_binary: bits.get_bit(BIN_BIT),
            sdo_disabled: bits.get_bit(SDODIS_BIT),
            linearity_compensation: bits.get_bits(LIN_COMP_BITS).into(),
        }
    }

    /// Enable or disable the internal amplifier.
    ///
    /// Note the inversion: enabling the amplifier clears RBUF.
    pub fn with_internal_amplifier(self, enable: bool) -> Self {
        Self {
            internal_amplifier_disabled: !enable,
            ..self
        }
    }

    /// Clamp the output to ground, or release it.
    pub fn with_output_clamp(self, enable: bool) -> Self {
        Self {
            output_clamped_to_ground: enable,
            ..self
        }
    }

    /// Put the output into tristate, or release it.
    pub fn with_tristate(self, enable: bool) -> Self {
        Self {
            tristate: enable,
            ..self
        }
    }

    /// Select offset binary (`true`) or two's complement (`false`) coding.
    pub fn with_offset_binary(self, enable: bool) -> Self {
        Self {
            offset_binary: enable,
            ..self
        }
    }

    /// Enable or disable the SDO pin.
    pub fn with_sdo_disabled(self, disable: bool) -> Self {
        Self {
            sdo_disabled: disable,
            ..self
        }
    }

    /// Set the linearity compensation for the reference span.
    pub fn with_linearity_compensation(self, compensation: LinearityCompensation) -> Self {
        Self {
            linearity_compensation: compensation,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_matches_power_on_state() {
        let image = ControlRegister::default();
        assert_eq!(image.bits(), 0b01_1110);
        assert!(image.internal_amplifier_disabled);
        assert!(image.output_clamped_to_ground);
        assert!(image.tristate);
        assert!(image.offset_binary);
        assert!(!image.sdo_disabled);
        assert_eq!(image.linearity_compensation, LinearityCompensation::Range10V);
    }

    #[test]
    fn default_survives_decoding() {
        let bits = ControlRegister::default().bits();
        assert_eq!(ControlRegister::from_bits(bits), ControlRegister::default());
    }

    #[test]
    fn twenty_volt_compensation_bits() {
        let image = ControlRegister::default()
            .with_linearity_compensation(LinearityCompensation::Range20V);
        assert_eq!(image.bits(), 0x31E);
    }

    #[test]
    fn reserved_compensation_codes_are_kept() {
        assert_eq!(LinearityCompensation::from(0b0100u32), LinearityCompensation::Reserved(0b0100));
        assert_eq!(LinearityCompensation::from(0b1100u32), LinearityCompensation::Range20V);
        assert_eq!(LinearityCompensation::from(0b0000u32), LinearityCompensation::Range10V);

        let image = ControlRegister::from_bits(0x112);
        assert_eq!(image.linearity_compensation, LinearityCompensation::Reserved(0b0100));
        assert_eq!(image.bits(), 0x112);
    }

    #[test]
    fn reference_span_threshold() {
        assert_eq!(
            LinearityCompensation::for_reference_span(10.0),
            LinearityCompensation::Range10V
        );
        assert_eq!(
            LinearityCompensation::for_reference_span(10.5),
            LinearityCompensation::Range20V
        );
    }

    #[test]
    fn amplifier_setter_is_inverted() {
        let image = ControlRegister::default().with_internal_amplifier(true);
        assert!(!image.internal_amplifier_disabled);
        assert_eq!(image.bits(), 0b01_1100);
    }

    fn any_image() -> impl Strategy<Value = ControlRegister> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(|(rbuf, opgnd, dactri, bin, sdodis, lin20)| ControlRegister {
                internal_amplifier_disabled: rbuf,
                output_clamped_to_ground: opgnd,
                tristate: dactri,
                offset_binary: bin,
                sdo_disabled: sdodis,
                linearity_compensation: if lin20 {
                    LinearityCompensation::Range20V
                } else {
                    LinearityCompensation::Range10V
                },
            })
    }

    proptest! {
        #[test]
        fn setters_only_touch_their_field(image in any_image(), enable in any::<bool>()) {
            let before = image.bits();
            let cases = [
                (image.with_internal_amplifier(enable).bits(), 1u32 << RBUF_BIT),
                (image.with_output_clamp(enable).bits(), 1 << OPGND_BIT),
                (image.with_tristate(enable).bits(), 1 << DACTRI_BIT),
                (image.with_offset_binary(enable).bits(), 1 << BIN_BIT),
                (image.with_sdo_disabled(enable).bits(), 1 << SDODIS_BIT),
                (
                    image
                        .with_linearity_compensation(LinearityCompensation::for_reference_span(
                            if enable { 20.0 } else { 5.0 },
                        ))
                        .bits(),
                    0b1111 << 6,
                ),
            ];
            for (after, mask) in cases {
                prop_assert_eq!(after & !mask, before & !mask);
            }
        }

        #[test]
        fn set_then_clear_restores_cleared_field(image in any_image()) {
            let image = image.with_output_clamp(false).with_tristate(false).with_offset_binary(false);
            prop_assert_eq!(image.with_output_clamp(true).with_output_clamp(false), image);
            prop_assert_eq!(image.with_tristate(true).with_tristate(false), image);
            prop_assert_eq!(image.with_offset_binary(true).with_offset_binary(false), image);
        }
    }
}
