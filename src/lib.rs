#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

pub mod commands;
pub mod config;
pub mod control;
mod driver;
mod error;

pub use config::{ChipSelectPolarity, Config, OutputEnableSequence, Variant};
pub use control::{ControlRegister, LinearityCompensation};
pub use driver::{Ad57x1, DeviceState, NoPin};
pub use error::Error;
