//! Physical GPIO pin descriptors.
//!
//! A [`PinDescriptor`] names one GPIO line by its bank and position within
//! the bank, together with the pad mux field that has to be programmed to
//! route the pad to the GPIO controller.
//!
//! GPIO banks have 16 pins each. Two consecutive banks share a 32-bit
//! register for direction, data, edge triggers and interrupt status: bank
//! `2n` occupies the low half and bank `2n + 1` the high half of register
//! pair `n`.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::pin::{PinDescriptor, PinMux};
//!
//! // GP5[11], muxed through PINMUX11[19:16]
//! let pin = PinDescriptor::new(PinMux::new(11, 16, 8), 5, 11);
//!
//! assert_eq!(pin.status_register(), 2);
//! assert_eq!(pin.status_mask(), 1 << 27);
//! assert_eq!(pin.bank_enable_mask(), 1 << 5);
//! ```

/// Number of pins in one GPIO bank.
pub const PINS_PER_BANK: u8 = 16;

/// Pad multiplexer field selecting the GPIO function for a pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinMux {
    /// Index of the pin mux register.
    pub register: u8,
    /// Bit offset of the 4-bit function field within the register.
    pub shift: u8,
    /// Function code that selects GPIO mode.
    pub function: u8,
}

impl PinMux {
    /// Width mask of a mux function field (before shifting).
    pub const FIELD_MASK: u32 = 0xF;

    /// Creates a mux field descriptor.
    #[inline]
    pub const fn new(register: u8, shift: u8, function: u8) -> Self {
        Self {
            register,
            shift,
            function,
        }
    }

    /// Returns the mask covering this field within its register.
    #[inline]
    pub const fn mask(&self) -> u32 {
        Self::FIELD_MASK << self.shift
    }

    /// Returns the function code shifted into place.
    #[inline]
    pub const fn value(&self) -> u32 {
        ((self.function as u32) & Self::FIELD_MASK) << self.shift
    }
}

/// One physical GPIO line.
///
/// Immutable after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinDescriptor {
    /// Pad mux field for this pin.
    pub mux: PinMux,
    /// GPIO bank index.
    pub bank: u8,
    /// Pin index within the bank (0-15).
    pub pin: u8,
}

impl PinDescriptor {
    /// Creates a pin descriptor.
    #[inline]
    pub const fn new(mux: PinMux, bank: u8, pin: u8) -> Self {
        Self { mux, bank, pin }
    }

    /// Index of the 32-bit register pair that holds this pin's bank.
    #[inline]
    pub const fn status_register(&self) -> u8 {
        self.bank / 2
    }

    /// Bit position of this pin within its register pair.
    #[inline]
    pub const fn bit(&self) -> u32 {
        (self.bank as u32 * PINS_PER_BANK as u32 + self.pin as u32) % 32
    }

    /// Single-bit mask of this pin in the shared status and trigger registers.
    #[inline]
    pub const fn status_mask(&self) -> u32 {
        1 << self.bit()
    }

    /// Mask of this pin's bank in the bank interrupt enable register.
    #[inline]
    pub const fn bank_enable_mask(&self) -> u32 {
        1 << self.bank
    }
}
