//! Hardware collaborator traits for the counter driver.
//!
//! The driver needs three things from the platform: analog samples, GPIO
//! pins and bank-level edge interrupts, and a system interrupt controller.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`AnalogInput`] | One-shot analog samples for device detection |
//! | [`GpioPins`] | Pin direction and level |
//! | [`GpioBanks`] | Bank interrupt enable, edge triggers, pending status |
//! | [`InterruptController`] | System-level vector routing and acknowledge |
//!
//! # Shared Access
//!
//! Every method takes `&self`. The same collaborator is used from the
//! interrupt handler and from foreground queries, and the underlying
//! registers are shared between both anyway. Implementations that keep
//! software state use interior mutability.
//!
//! Each trait is also implemented for `&T`, so a driver can borrow
//! collaborators that the caller keeps ownership of.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::traits::{AnalogInput, GpioPins};
//! use motor_counter::hal::{MockAdc, MockGpio};
//! use motor_counter::config::ev3;
//!
//! let adc = MockAdc::new();
//! adc.set_sample(1, 290);
//! assert_eq!(adc.read_channel(1), Ok(290));
//!
//! let gpio = MockGpio::new();
//! let pin = ev3::WIRING[0].direction_pin;
//! gpio.set_level(&pin, true);
//! assert!(gpio.read_level(&pin));
//! ```

use crate::error::Error;
use crate::pin::PinDescriptor;

/// Analog-to-digital converter.
///
/// Treated as a black box that returns one raw sample per call.
pub trait AnalogInput {
    /// Reads one raw sample from `channel`.
    ///
    /// Returns [`Error::ConversionFailed`] if no sample could be produced.
    fn read_channel(&self, channel: u8) -> Result<u16, Error>;
}

/// Digital GPIO pin access.
pub trait GpioPins {
    /// Routes the pad to the GPIO controller and makes it an input.
    fn configure_input(&self, pin: &PinDescriptor);

    /// Routes the pad to the GPIO controller and drives it low.
    fn configure_output_low(&self, pin: &PinDescriptor);

    /// Returns the current logic level of the pin.
    fn read_level(&self, pin: &PinDescriptor) -> bool;
}

/// Bank-level GPIO edge interrupt control.
///
/// Status and trigger registers are shared by a pair of banks; `register`
/// arguments index that pair (see [`PinDescriptor::status_register`]).
pub trait GpioBanks {
    /// Stops `bank` from raising interrupts.
    fn disable_bank_interrupt(&self, bank: u8);

    /// Lets `bank` raise interrupts again.
    fn enable_bank_interrupt(&self, bank: u8);

    /// Enables every bank set in `mask` without touching the others.
    fn enable_bank_interrupts(&self, mask: u32);

    /// Reads the pending-edge status register that holds `bank`.
    fn pending_edges(&self, bank: u8) -> u32;

    /// Acknowledges the pending edges in `mask` only.
    fn clear_pending_edges(&self, bank: u8, mask: u32);

    /// Adds rising-edge triggers for the pins in `mask`.
    fn set_rising_trigger(&self, register: u8, mask: u32);

    /// Adds falling-edge triggers for the pins in `mask`.
    fn set_falling_trigger(&self, register: u8, mask: u32);
}

/// System interrupt controller.
pub trait InterruptController {
    /// Routes `vector` to the counter handler for GPIO `bank`.
    fn register_handler(&self, vector: u32, bank: u8);

    /// Assigns `vector` to a priority channel.
    fn set_priority_channel(&self, vector: u32, channel: u8);

    /// Enables delivery of `vector`.
    fn enable(&self, vector: u32);

    /// Clears the pending status of `vector`.
    fn acknowledge(&self, vector: u32);
}

impl<T: AnalogInput + ?Sized> AnalogInput for &T {
    #[inline]
    fn read_channel(&self, channel: u8) -> Result<u16, Error> {
        T::read_channel(self, channel)
    }
}

impl<T: GpioPins + ?Sized> GpioPins for &T {
    #[inline]
    fn configure_input(&self, pin: &PinDescriptor) {
        T::configure_input(self, pin)
    }

    #[inline]
    fn configure_output_low(&self, pin: &PinDescriptor) {
        T::configure_output_low(self, pin)
    }

    #[inline]
    fn read_level(&self, pin: &PinDescriptor) -> bool {
        T::read_level(self, pin)
    }
}

impl<T: GpioBanks + ?Sized> GpioBanks for &T {
    #[inline]
    fn disable_bank_interrupt(&self, bank: u8) {
        T::disable_bank_interrupt(self, bank)
    }

    #[inline]
    fn enable_bank_interrupt(&self, bank: u8) {
        T::enable_bank_interrupt(self, bank)
    }

    #[inline]
    fn enable_bank_interrupts(&self, mask: u32) {
        T::enable_bank_interrupts(self, mask)
    }

    #[inline]
    fn pending_edges(&self, bank: u8) -> u32 {
        T::pending_edges(self, bank)
    }

    #[inline]
    fn clear_pending_edges(&self, bank: u8, mask: u32) {
        T::clear_pending_edges(self, bank, mask)
    }

    #[inline]
    fn set_rising_trigger(&self, register: u8, mask: u32) {
        T::set_rising_trigger(self, register, mask)
    }

    #[inline]
    fn set_falling_trigger(&self, register: u8, mask: u32) {
        T::set_falling_trigger(self, register, mask)
    }
}

impl<T: InterruptController + ?Sized> InterruptController for &T {
    #[inline]
    fn register_handler(&self, vector: u32, bank: u8) {
        T::register_handler(self, vector, bank)
    }

    #[inline]
    fn set_priority_channel(&self, vector: u32, channel: u8) {
        T::set_priority_channel(self, vector, channel)
    }

    #[inline]
    fn enable(&self, vector: u32) {
        T::enable(self, vector)
    }

    #[inline]
    fn acknowledge(&self, vector: u32) {
        T::acknowledge(self, vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    // =========================================================================
    // Reference Forwarding Tests
    // =========================================================================

    struct FixedAdc(u16);

    impl AnalogInput for FixedAdc {
        fn read_channel(&self, channel: u8) -> Result<u16, Error> {
            if channel == 0 {
                Ok(self.0)
            } else {
                Err(Error::ConversionFailed)
            }
        }
    }

    fn read_through<A: AnalogInput>(adc: A, channel: u8) -> Result<u16, Error> {
        adc.read_channel(channel)
    }

    #[test]
    fn analog_input_through_reference() {
        let adc = FixedAdc(1234);
        assert_eq!(read_through(&adc, 0), Ok(1234));
        assert_eq!(read_through(&adc, 1), Err(Error::ConversionFailed));
    }

    struct CountingIntc {
        acks: Cell<u32>,
    }

    impl InterruptController for CountingIntc {
        fn register_handler(&self, _vector: u32, _bank: u8) {}
        fn set_priority_channel(&self, _vector: u32, _channel: u8) {}
        fn enable(&self, _vector: u32) {}
        fn acknowledge(&self, _vector: u32) {
            self.acks.set(self.acks.get() + 1);
        }
    }

    fn ack_twice<I: InterruptController>(intc: I) {
        intc.acknowledge(47);
        intc.acknowledge(48);
    }

    #[test]
    fn interrupt_controller_through_reference() {
        let intc = CountingIntc { acks: Cell::new(0) };
        ack_twice(&intc);
        ack_twice(&&intc);
        assert_eq!(intc.acks.get(), 4);
    }
}
