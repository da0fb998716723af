use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use log::debug;

use super::Ad57x1;
use crate::Error;
use crate::commands::{Frame, Register, SoftwareControl};
use crate::control::{ControlRegister, LinearityCompensation};

/// # Control register
///
/// The control register is write-only as far as the driver is concerned: the
/// setters below only change the cached image, and nothing reaches the chip
/// until [`Ad57x1::update_control_register`] is called.
impl<SPI, CS, LDAC> Ad57x1<SPI, CS, LDAC>
where
    SPI: SpiBus,
    CS: OutputPin,
    LDAC: OutputPin,
{
    /// Enable or disable the internal amplifier (RBUF).
    ///
    /// Disabled at power-on. Enable it when the reference buffer amplifier is
    /// wired in unity gain through the DAC's internal resistors.
    pub fn set_internal_amplifier(&mut self, enable: bool) {
        self.control = self.control.with_internal_amplifier(enable);
    }

    /// Clamp the output to ground (OPGND).
    ///
    /// Clamped at power-on. While clamped, the tristate setting has no effect.
    pub fn set_output_clamp(&mut self, enable: bool) {
        self.control = self.control.with_output_clamp(enable);
    }

    /// Put the output into tristate (DACTRI).
    ///
    /// Tristated at power-on.
    pub fn set_tristate_mode(&mut self, enable: bool) {
        self.control = self.control.with_tristate(enable);
    }

    /// Select offset binary coding, or two's complement when `false` (BIN/2sC).
    ///
    /// Offset binary at power-on. Use offset binary when writing unsigned
    /// codes and two's complement for signed ones.
    pub fn set_offset_binary_encoding(&mut self, enable: bool) {
        self.control = self.control.with_offset_binary(enable);
    }

    /// Select the linearity error compensation for the reference span.
    ///
    /// `false` selects the compensation for spans up to 10 V (the power-on
    /// default), `true` the one for spans between 10 V and 20 V.
    pub fn set_reference_input_range(&mut self, enable_compensation: bool) {
        let compensation = if enable_compensation {
            LinearityCompensation::Range20V
        } else {
            LinearityCompensation::Range10V
        };
        self.control = self.control.with_linearity_compensation(compensation);
    }

    /// The cached control register image.
    ///
    /// This is what the driver last configured, not necessarily what the chip
    /// holds. Use [`Ad57x1::read_control_register`] to ask the chip.
    pub fn control_register(&self) -> ControlRegister {
        self.control
    }

    /// Send the cached image to the control register.
    pub fn update_control_register(&mut self) -> Result<(), Error<SPI::Error>> {
        debug!("Updating control register: {:?}", self.control);
        self.write_frame(Frame::write(Register::Control, self.control.bits()))
    }

    /// Release the output and commit the control register.
    ///
    /// What exactly is changed depends on the [`OutputEnableSequence`] in the
    /// configuration. By default only the ground clamp and tristate are
    /// released.
    ///
    /// [`OutputEnableSequence`]: crate::config::OutputEnableSequence
    pub fn enable_output(&mut self) -> Result<(), Error<SPI::Error>> {
        self.control = self.config.enable_output.apply(self.control);
        self.update_control_register()
    }

    /// Bring the output into its operating state.
    ///
    /// This is the same as [`Ad57x1::enable_output`]. It does not reset the
    /// chip; see [`Ad57x1::software_reset`] for that.
    pub fn reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.enable_output()
    }

    /// Read the control register from the chip.
    ///
    /// Returns the whole 24-bit word clocked out, including the echoed command
    /// bits, without interpreting it. The cached image is not changed.
    pub fn read_control_register(&mut self) -> Result<u32, Error<SPI::Error>> {
        Ok(self.read_register(Register::Control)?.raw())
    }

    /// Read the control register and replace the cached image with it.
    ///
    /// Returns the new image. Later setters modify this image rather than the
    /// one the driver built up before.
    pub fn sync_control_register(&mut self) -> Result<ControlRegister, Error<SPI::Error>> {
        let readback = self.read_register(Register::Control)?;
        self.control = ControlRegister::from_bits(readback.payload());
        debug!("Control register read back as {:?}", self.control);
        Ok(self.control)
    }

    /// Return the chip to its power-on state with the software RESET strobe.
    ///
    /// The cached image goes back to the power-on default as well, so the
    /// output is clamped to ground again until [`Ad57x1::enable_output`].
    ///
    /// # Datasheet
    ///
    /// See page 23 for the software control register.
    pub fn software_reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.write_frame(Frame::software_control(SoftwareControl::Reset))?;
        self.control = ControlRegister::default();
        Ok(())
    }
}
