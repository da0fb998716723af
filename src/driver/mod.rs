use core::convert::Infallible;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::SpiBus;
use log::{debug, trace, warn};

use crate::commands::{Frame, Readback, Register};
use crate::config::{BusSettings, ChipSelectPolarity, Config, Variant};
use crate::control::ControlRegister;
use crate::error::Error;

mod control;
mod output;

/// Driver for the AD5781 and AD5791.
///
/// # Quick start
///
/// Build the driver from an [`embedded_hal::spi::SpiBus`], the chip-select
/// pin and (optionally) the LDAC pin with [`Ad57x1::new`], then call
/// [`Ad57x1::begin`] once to put the pins into their idle state.
///
/// The driver drives chip-select itself, so it takes the bus rather than an
/// `SpiDevice`. The bus has to be set up for [SPI mode 1][MODE_1], MSB first,
/// at the frequency given in the [`Config`]; see [`Ad57x1::bus_settings`].
///
/// [MODE_1]: embedded_hal::spi::MODE_1
///
/// # Overview
///
/// * Output codes are written with [`Ad57x1::set_value`], which also latches
///   them to the output, either by pulsing LDAC or, without an LDAC pin, with
///   the software LDAC strobe.
/// * The control register is configured through the `set_` methods in the
///   [control register section](#control-register), which only change the
///   driver's cached image. [`Ad57x1::update_control_register`] sends it.
/// * The output powers up clamped to ground; call [`Ad57x1::enable_output`]
///   to release it.
///
/// Every bus operation asserts chip-select for exactly one 24-bit frame.
#[derive(Debug)]
pub struct Ad57x1<SPI, CS, LDAC = NoPin> {
    spi: SPI,
    chip_select: CS,
    /// LDAC pin, if wired to the MCU.
    ///
    /// `None` selects the software LDAC strobe for the life of the driver.
    ldac: Option<LDAC>,
    config: Config,
    /// Write-side cache of the control register.
    control: ControlRegister,
    state: DeviceState,
}

/// Whether [`Ad57x1::begin`] has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Freshly constructed; the pin levels are whatever they were before.
    Unconfigured,
    /// Pins are in their idle state and the driver can talk to the chip.
    Ready,
}

/// Placeholder LDAC pin type for boards without an LDAC connection.
///
/// Writes to it do nothing. It exists only so that the LDAC type parameter
/// can be named when passing `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl digital::ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<SPI, CS> Ad57x1<SPI, CS, NoPin>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Create a driver for a chip whose LDAC input is tied low.
    ///
    /// Every value write is followed by a software LDAC frame.
    pub fn without_ldac(spi: SPI, chip_select: CS, config: Config) -> Self {
        Self::new(spi, chip_select, None, config)
    }
}

impl<SPI, CS, LDAC> Ad57x1<SPI, CS, LDAC>
where
    SPI: SpiBus,
    CS: OutputPin,
    LDAC: OutputPin,
{
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors
    ////////////////////////////////////////////////////////////////////////////////

    /// Create the driver.
    ///
    /// Nothing is written to the pins or the bus until [`Ad57x1::begin`]. The
    /// control register image starts at the chip's power-on default.
    pub fn new(spi: SPI, chip_select: CS, ldac: Option<LDAC>, config: Config) -> Self {
        Self {
            spi,
            chip_select,
            ldac,
            config,
            control: ControlRegister::default(),
            state: DeviceState::Unconfigured,
        }
    }

    /// Create a driver for an AD5781 with the default configuration.
    pub fn ad5781(spi: SPI, chip_select: CS, ldac: Option<LDAC>) -> Self {
        Self::new(spi, chip_select, ldac, Config::new(Variant::Ad5781))
    }

    /// Create a driver for an AD5791 with the default configuration.
    pub fn ad5791(spi: SPI, chip_select: CS, ldac: Option<LDAC>) -> Self {
        Self::new(spi, chip_select, ldac, Config::new(Variant::Ad5791))
    }

    /// Put the pins into their idle state.
    ///
    /// Chip-select is deasserted and LDAC (if present) is driven low. When
    /// `initialize_bus` is true, the bus is also flushed so that no earlier
    /// transfer is still running when the chip is first selected.
    ///
    /// This can be called again at any time; it does not touch the control
    /// register image.
    pub fn begin(&mut self, initialize_bus: bool) -> Result<(), Error<SPI::Error>> {
        self.set_chip_select(false)?;
        if let Some(ldac) = self.ldac.as_mut() {
            ldac.set_low().map_err(Error::pin)?;
        }
        if initialize_bus {
            self.spi.flush()?;
        }
        self.state = DeviceState::Ready;
        debug!(
            "{:?} ready, {} LDAC",
            self.config.variant,
            if self.ldac.is_some() { "hardware" } else { "software" }
        );
        Ok(())
    }

    /// Give back the bus and pins.
    pub fn release(self) -> (SPI, CS, Option<LDAC>) {
        (self.spi, self.chip_select, self.ldac)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Accessors
    ////////////////////////////////////////////////////////////////////////////////

    /// Configuration the driver was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chip the driver was created for.
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    /// SPI settings the bus must be configured with.
    pub fn bus_settings(&self) -> BusSettings {
        self.config.bus_settings()
    }

    /// Whether [`Ad57x1::begin`] has been called.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Whether the driver latches values with the LDAC pin (`true`) or the
    /// software LDAC strobe (`false`).
    pub fn has_ldac_pin(&self) -> bool {
        self.ldac.is_some()
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Frame exchange with the DAC
    ////////////////////////////////////////////////////////////////////////////////

    /// Drive chip-select to select (`true`) or release (`false`) the chip.
    fn set_chip_select(&mut self, selected: bool) -> Result<(), Error<SPI::Error>> {
        let high = match self.config.chip_select {
            ChipSelectPolarity::ActiveLow => !selected,
            ChipSelectPolarity::ActiveHigh => selected,
        };
        let result = if high {
            self.chip_select.set_high()
        } else {
            self.chip_select.set_low()
        };
        result.map_err(Error::pin)
    }

    /// Shift three bytes through the bus inside one chip-select cycle.
    ///
    /// With `receive` set the bytes clocked in replace `buffer`; otherwise
    /// they are discarded. Chip-select is released even if the bus fails, and
    /// the bus error then takes precedence over any pin error.
    fn exchange(&mut self, buffer: &mut [u8; 3], receive: bool) -> Result<(), Error<SPI::Error>> {
        if self.state == DeviceState::Unconfigured {
            warn!("Bus access before begin(), pin levels are undefined");
        }

        self.set_chip_select(true)?;
        let transferred = if receive {
            self.spi.transfer_in_place(buffer)
        } else {
            self.spi.write(buffer)
        };
        let transferred = transferred.and_then(|()| self.spi.flush());
        let released = self.set_chip_select(false);

        transferred?;
        released
    }

    /// Send one command frame.
    pub(crate) fn write_frame(&mut self, frame: Frame) -> Result<(), Error<SPI::Error>> {
        trace!("Writing frame {:06X}", frame.bits());
        self.exchange(&mut frame.to_bytes(), false)
    }

    /// Read a register back.
    ///
    /// This takes two chip-select cycles: the read command, then a no-op frame
    /// of zeroes during which the chip shifts out the register.
    pub(crate) fn read_register(&mut self, register: Register) -> Result<Readback, Error<SPI::Error>> {
        self.write_frame(Frame::read(register))?;

        let mut buffer = [0u8; 3];
        self.exchange(&mut buffer, true)?;
        let readback = Readback::from_bytes(buffer);
        trace!("Read {:?}: {:06X}", register, readback.raw());
        Ok(readback)
    }
}
