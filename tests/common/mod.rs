//! A bus and pins that record everything done to them in one shared log.
//!
//! `embedded-hal-mock` checks each mock on its own, so it cannot tell whether
//! a bus write happened while chip-select was asserted. These record into a
//! single ordered list instead.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ChipSelect(bool),
    Ldac(bool),
    Write(Vec<u8>),
    Transfer(Vec<u8>),
    Flush,
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub struct RecordingBus {
    log: Log,
    /// Words returned by successive in-place transfers. Zeroes once empty.
    responses: VecDeque<[u8; 3]>,
    /// Fail the next write or transfer.
    pub fail_next: bool,
}

impl RecordingBus {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            responses: VecDeque::new(),
            fail_next: false,
        }
    }

    pub fn respond_with(mut self, word: u32) -> Self {
        let [_, high, mid, low] = word.to_be_bytes();
        self.responses.push_back([high, mid, low]);
        self
    }

    fn record(&mut self, event: Event) -> Result<(), spi::ErrorKind> {
        self.log.borrow_mut().push(event);
        if std::mem::take(&mut self.fail_next) {
            Err(spi::ErrorKind::Other)
        } else {
            Ok(())
        }
    }
}

impl spi::ErrorType for RecordingBus {
    type Error = spi::ErrorKind;
}

impl SpiBus for RecordingBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        self.record(Event::Transfer(vec![0; words.len()]))
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        self.record(Event::Write(words.to_vec()))
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.record(Event::Transfer(write.to_vec()))
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let sent = words.to_vec();
        let response = self.responses.pop_front().unwrap_or_default();
        words.copy_from_slice(&response[..words.len()]);
        self.record(Event::Transfer(sent))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(Event::Flush);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Line {
    ChipSelect,
    Ldac,
}

pub struct RecordingPin {
    log: Log,
    line: Line,
}

impl RecordingPin {
    pub fn chip_select(log: &Log) -> Self {
        Self {
            log: log.clone(),
            line: Line::ChipSelect,
        }
    }

    pub fn ldac(log: &Log) -> Self {
        Self {
            log: log.clone(),
            line: Line::Ldac,
        }
    }

    fn record(&mut self, high: bool) {
        let event = match self.line {
            Line::ChipSelect => Event::ChipSelect(high),
            Line::Ldac => Event::Ldac(high),
        };
        self.log.borrow_mut().push(event);
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Take everything recorded so far.
pub fn drain(log: &Log) -> Vec<Event> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Frames written to the bus, as right-aligned 24-bit integers.
pub fn written_frames(events: &[Event]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Write(bytes) => Some(
                bytes
                    .iter()
                    .fold(0u32, |word, &byte| (word << 8) | u32::from(byte)),
            ),
            _ => None,
        })
        .collect()
}

/// Events for one write frame with an active-low chip-select.
pub fn framed_write(bytes: [u8; 3]) -> [Event; 4] {
    [
        Event::ChipSelect(false),
        Event::Write(bytes.to_vec()),
        Event::Flush,
        Event::ChipSelect(true),
    ]
}
