use embedded_hal::digital;
use embedded_hal::spi;

/// Wrapper for problems when communicating with the DAC.
///
/// `E` is the error type of the SPI bus the driver was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A transfer on the SPI bus failed.
    ///
    /// The bus error is passed through untouched. The chip-select line has
    /// already been released when this is returned.
    Spi(E),
    /// Driving the chip-select or LDAC pin failed.
    ///
    /// Only the [`ErrorKind`](digital::ErrorKind) of the pin error is kept, so
    /// that the two pins do not have to share an error type.
    Pin(digital::ErrorKind),
    /// A DAC code given to one of the strict `try_` setters does not fit the
    /// resolution of the chip.
    ///
    /// The lenient setters never return this and truncate instead.
    ValueOutOfRange {
        /// Code that was passed in.
        value: u32,
        /// Largest code the chip accepts.
        max: u32,
    },
}

impl<E> Error<E> {
    /// Reduce a pin error to its kind.
    pub(crate) fn pin<P: digital::Error>(error: P) -> Self {
        Self::Pin(error.kind())
    }
}

#[doc(hidden)]
impl<E> From<E> for Error<E>
where
    E: spi::Error,
{
    fn from(value: E) -> Self {
        Self::Spi(value)
    }
}

impl<E: spi::Error> spi::Error for Error<E> {
    fn kind(&self) -> spi::ErrorKind {
        match self {
            Error::Spi(e) => e.kind(),
            // Neither of these map onto a bus condition.
            Error::Pin(_) | Error::ValueOutOfRange { .. } => spi::ErrorKind::Other,
        }
    }
}
