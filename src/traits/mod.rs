//! Trait definitions for the hardware the counter driver runs on.
//!
//! The driver never touches registers directly. It talks to the analog
//! converter, the GPIO controller and the system interrupt controller through
//! the traits in [`hardware`], which lets the same decoding and detection
//! code run against the AM1808 registers or against desktop mocks.
//!
//! # Hardware Abstraction
//!
//! - [`AnalogInput`]: raw samples for device detection
//! - [`GpioPins`]: pin configuration and levels
//! - [`GpioBanks`]: bank edge interrupts
//! - [`InterruptController`]: system interrupt vectors

pub mod hardware;

pub use hardware::*;
