use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use log::{debug, trace};

use super::Ad57x1;
use crate::Error;
use crate::commands::{Frame, Register, SoftwareControl};

/// # Output value
impl<SPI, CS, LDAC> Ad57x1<SPI, CS, LDAC>
where
    SPI: SpiBus,
    CS: OutputPin,
    LDAC: OutputPin,
{
    /// Write a code to the DAC and latch it to the output.
    ///
    /// `value` is an 18-bit code on the AD5781 and a 20-bit code on the AD5791.
    /// Wider values are not rejected: the code is shifted into place and then
    /// masked to the 20-bit payload, so the excess high bits are lost. Use
    /// [`Ad57x1::try_set_value`] to reject them instead.
    ///
    /// How the code is interpreted depends on the coding selected in the
    /// control register (offset binary by default).
    ///
    /// # Datasheet
    ///
    /// See page 21 for the DAC register and page 23 for LDAC.
    pub fn set_value(&mut self, value: u32) -> Result<(), Error<SPI::Error>> {
        let payload = self.config.variant.encode(value);
        self.write_frame(Frame::write(Register::DacValue, payload))?;
        self.load()
    }

    /// Write a code to the DAC and latch it, rejecting codes that do not fit.
    ///
    /// # Errors
    ///
    /// [`Error::ValueOutOfRange`] if `value` is above the largest code of the
    /// chip. Nothing is sent in that case.
    pub fn try_set_value(&mut self, value: u32) -> Result<(), Error<SPI::Error>> {
        self.check_range(value)?;
        self.set_value(value)
    }

    /// Read back the code in the DAC register.
    ///
    /// The payload is scaled back down by the variant offset, so this returns
    /// what was passed to [`Ad57x1::set_value`] (after truncation).
    pub fn read_value(&mut self) -> Result<u32, Error<SPI::Error>> {
        let readback = self.read_register(Register::DacValue)?;
        Ok(self.config.variant.decode(readback.payload()))
    }

    /// Latch the DAC register to the output.
    ///
    /// With an LDAC pin this pulses the pin high then low, with no delay other
    /// than the time the two writes take. Without one it sends the software
    /// LDAC strobe as a frame of its own.
    ///
    /// [`Ad57x1::set_value`] already does this; it is only needed on its own
    /// to update several chips together.
    pub fn load(&mut self) -> Result<(), Error<SPI::Error>> {
        match self.ldac.as_mut() {
            Some(ldac) => {
                trace!("Pulsing LDAC");
                ldac.set_high().map_err(Error::pin)?;
                ldac.set_low().map_err(Error::pin)
            }
            None => self.write_frame(Frame::software_control(SoftwareControl::Load)),
        }
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Clear code
    ////////////////////////////////////////////////////////////////////////////////

    /// Set the code the output is forced to when the chip is cleared.
    ///
    /// The same scaling and truncation as [`Ad57x1::set_value`] apply. The
    /// output is not changed.
    ///
    /// # Datasheet
    ///
    /// See page 22 for the clear code register.
    pub fn set_clear_code_value(&mut self, value: u32) -> Result<(), Error<SPI::Error>> {
        let payload = self.config.variant.encode(value);
        self.write_frame(Frame::write(Register::ClearCode, payload))
    }

    /// Set the clear code, rejecting codes that do not fit.
    ///
    /// # Errors
    ///
    /// [`Error::ValueOutOfRange`] if `value` is above the largest code of the
    /// chip. Nothing is sent in that case.
    pub fn try_set_clear_code_value(&mut self, value: u32) -> Result<(), Error<SPI::Error>> {
        self.check_range(value)?;
        self.set_clear_code_value(value)
    }

    /// Read back the clear code.
    pub fn read_clear_code_value(&mut self) -> Result<u32, Error<SPI::Error>> {
        let readback = self.read_register(Register::ClearCode)?;
        Ok(self.config.variant.decode(readback.payload()))
    }

    /// Force the output to the clear code with the software CLR strobe.
    ///
    /// # Datasheet
    ///
    /// See page 23 for the software control register.
    pub fn load_clear_code(&mut self) -> Result<(), Error<SPI::Error>> {
        debug!("Clearing output to the clear code");
        self.write_frame(Frame::software_control(SoftwareControl::Clear))
    }

    fn check_range(&self, value: u32) -> Result<(), Error<SPI::Error>> {
        let max = self.config.variant.max_value();
        if value > max {
            return Err(Error::ValueOutOfRange { value, max });
        }
        Ok(())
    }
}
