//! Build-time wiring tables and driver configuration.
//!
//! The physical layout of a board (which pins and analog channel belong to
//! which port) is plain data. The driver only ever sees it through
//! [`CounterWiring`] entries, so the decoding and classification code stays
//! independent of any specific board.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::config::{ClassifierConfig, Config, InterruptConfig};
//!
//! // Use defaults (EV3 calibration, AM1808 vectors)
//! let config = Config::default();
//! assert_eq!(config.classifier.threshold_low(), 205);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_classifier(ClassifierConfig::default().with_none_tolerance(600))
//!     .with_interrupts(InterruptConfig::default().with_priority_channel(2));
//! assert_eq!(config.interrupts.priority_channel, 2);
//! ```

use crate::pin::PinDescriptor;
use heapless::Vec;

/// Maximum number of GPIO banks that can raise counter interrupts.
pub const MAX_BANKS: usize = 9;

// ============================================================================
// Wiring
// ============================================================================

/// Wiring of one sensor port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterWiring {
    /// Edge-interrupt pin (encoder channel A).
    pub interrupt_pin: PinDescriptor,
    /// Direction pin (encoder channel B).
    pub direction_pin: PinDescriptor,
    /// Presence-detect pin, driven low while the port is in detect mode.
    pub detect_pin: PinDescriptor,
    /// Analog channel multiplexed to this port.
    pub adc_channel: u8,
}

impl CounterWiring {
    /// Creates a wiring entry.
    pub const fn new(
        interrupt_pin: PinDescriptor,
        direction_pin: PinDescriptor,
        detect_pin: PinDescriptor,
        adc_channel: u8,
    ) -> Self {
        Self {
            interrupt_pin,
            direction_pin,
            detect_pin,
            adc_channel,
        }
    }
}

/// Interrupt wiring for one monitored GPIO bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankInterrupt {
    /// GPIO bank index.
    pub bank: u8,
    /// System interrupt vector raised by this bank.
    pub vector: u32,
    /// Register pair holding this bank's trigger and status bits.
    pub status_register: u8,
    /// Interrupt pins of this bank, as a mask within `status_register`.
    pub edge_mask: u32,
}

impl BankInterrupt {
    /// Mask of this bank in the bank interrupt enable register.
    #[inline]
    pub const fn enable_mask(&self) -> u32 {
        1 << self.bank
    }
}

/// Derives the monitored banks from a wiring table.
///
/// Banks are listed in the order their first interrupt pin appears. Each
/// entry carries the edge mask of every interrupt pin in that bank.
///
/// # Example
///
/// ```rust
/// use motor_counter::config::{bank_interrupts, ev3, InterruptConfig};
///
/// let banks = bank_interrupts(&ev3::WIRING, &InterruptConfig::default());
/// assert_eq!(banks.len(), 2);
/// assert_eq!((banks[0].bank, banks[0].edge_mask), (5, 0x2900_0000));
/// assert_eq!((banks[1].bank, banks[1].edge_mask), (6, 0x0000_0200));
/// ```
pub fn bank_interrupts<'w>(
    wiring: impl IntoIterator<Item = &'w CounterWiring>,
    interrupts: &InterruptConfig,
) -> Vec<BankInterrupt, MAX_BANKS> {
    let mut banks: Vec<BankInterrupt, MAX_BANKS> = Vec::new();

    for entry in wiring {
        let pin = &entry.interrupt_pin;
        if let Some(existing) = banks.iter_mut().find(|b| b.bank == pin.bank) {
            existing.edge_mask |= pin.status_mask();
            continue;
        }

        let bank = BankInterrupt {
            bank: pin.bank,
            vector: interrupts.vector_for(pin.bank),
            status_register: pin.status_register(),
            edge_mask: pin.status_mask(),
        };
        if banks.push(bank).is_err() {
            log::warn!("bank {} ignored: more than {} banks", pin.bank, MAX_BANKS);
        }
    }

    banks
}

/// Mask of every bank in `banks` for the bank interrupt enable register.
pub fn bank_enable_mask(banks: &[BankInterrupt]) -> u32 {
    banks.iter().fold(0, |mask, b| mask | b.enable_mask())
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete driver configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Analog thresholds for device detection.
    pub classifier: ClassifierConfig,
    /// Interrupt vector assignment.
    pub interrupts: InterruptConfig,
}

impl Config {
    /// Set classifier configuration
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set interrupt configuration
    pub fn with_interrupts(mut self, interrupts: InterruptConfig) -> Self {
        self.interrupts = interrupts;
        self
    }
}

// ============================================================================
// Classifier Config
// ============================================================================

/// Analog calibration values used to identify the attached device.
///
/// Each motor type reads one of two values depending on the state of its
/// encoder, one below and one above the "nothing attached" level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifierConfig {
    /// Reading with nothing plugged in.
    pub none_nominal: u16,
    /// Samples within this distance of `none_nominal` mean "no device".
    pub none_tolerance: u16,
    /// Medium motor reading, low encoder state.
    pub medium_low: u16,
    /// Medium motor reading, high encoder state.
    pub medium_high: u16,
    /// Large motor reading, low encoder state.
    pub large_low: u16,
    /// Large motor reading, high encoder state.
    pub large_high: u16,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            none_nominal: 2014,
            none_tolerance: 750,
            medium_low: 290,
            medium_high: 3451,
            large_low: 120,
            large_high: 3666,
        }
    }
}

impl ClassifierConfig {
    /// Midpoint between the medium and large readings below `none_nominal`.
    #[inline]
    pub const fn threshold_low(&self) -> u16 {
        ((self.medium_low as u32 + self.large_low as u32) / 2) as u16
    }

    /// Midpoint between the medium and large readings above `none_nominal`.
    #[inline]
    pub const fn threshold_high(&self) -> u16 {
        ((self.medium_high as u32 + self.large_high as u32) / 2) as u16
    }

    /// Set the "nothing attached" reading
    pub fn with_none_nominal(mut self, value: u16) -> Self {
        self.none_nominal = value;
        self
    }

    /// Set the "nothing attached" tolerance
    pub fn with_none_tolerance(mut self, tolerance: u16) -> Self {
        self.none_tolerance = tolerance;
        self
    }

    /// Set the medium motor readings
    pub fn with_medium(mut self, low: u16, high: u16) -> Self {
        self.medium_low = low;
        self.medium_high = high;
        self
    }

    /// Set the large motor readings
    pub fn with_large(mut self, low: u16, high: u16) -> Self {
        self.large_low = low;
        self.large_high = high;
        self
    }
}

// ============================================================================
// Interrupt Config
// ============================================================================

/// System interrupt assignment for GPIO bank interrupts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptConfig {
    /// Vector of GPIO bank 0; bank `n` raises `vector_base + n`.
    pub vector_base: u32,
    /// Interrupt controller channel (priority) for all bank interrupts.
    pub priority_channel: u8,
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            vector_base: 42,
            priority_channel: 0,
        }
    }
}

impl InterruptConfig {
    /// Returns the system vector for a GPIO bank.
    #[inline]
    pub const fn vector_for(&self, bank: u8) -> u32 {
        self.vector_base + bank as u32
    }

    /// Set the vector of GPIO bank 0
    pub fn with_vector_base(mut self, base: u32) -> Self {
        self.vector_base = base;
        self
    }

    /// Set the priority channel
    pub fn with_priority_channel(mut self, channel: u8) -> Self {
        self.priority_channel = channel;
        self
    }
}

// ============================================================================
// EV3 Wiring
// ============================================================================

/// Motor port wiring of the LEGO MINDSTORMS EV3 brick.
pub mod ev3 {
    use super::CounterWiring;
    use crate::pin::{PinDescriptor, PinMux};

    /// Pin mux function code that routes a pad to the GPIO controller.
    pub const GPIO_FUNCTION: u8 = 8;

    const fn pin(mux_register: u8, mux_shift: u8, bank: u8, pin: u8) -> PinDescriptor {
        PinDescriptor::new(PinMux::new(mux_register, mux_shift, GPIO_FUNCTION), bank, pin)
    }

    /// Number of motor ports.
    pub const PORT_COUNT: usize = 4;

    /// Ports A to D, in order.
    pub const WIRING: [CounterWiring; PORT_COUNT] = [
        // Port A
        CounterWiring::new(pin(11, 16, 5, 11), pin(1, 12, 0, 4), pin(12, 12, 5, 4), 1),
        // Port B
        CounterWiring::new(pin(11, 28, 5, 8), pin(5, 24, 2, 9), pin(6, 8, 2, 5), 0),
        // Port C
        CounterWiring::new(pin(11, 8, 5, 13), pin(7, 4, 3, 14), pin(7, 28, 3, 8), 13),
        // Port D
        CounterWiring::new(pin(13, 24, 6, 9), pin(5, 28, 2, 8), pin(11, 0, 5, 15), 14),
    ];
}

// ============================================================================
// Tests
// ============================================================================
