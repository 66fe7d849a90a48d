//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for the hardware traits, so the driver
//! can be exercised on desktop, including from several threads at once.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockAdc`] | [`AnalogInput`] | Per-channel samples or failures |
//! | [`MockGpio`] | [`GpioPins`], [`GpioBanks`] | Pin levels, pending edges, register state |
//! | [`MockInterrupts`] | [`InterruptController`] | Records routing, priority, enable, acknowledge |
//!
//! Every mock can also append to a shared [`MockTrace`], which records the
//! order of hardware calls across all of them.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::hal::{MockGpio, MockTrace, HwEvent};
//! use motor_counter::traits::GpioBanks;
//! use motor_counter::config::ev3;
//!
//! let trace = MockTrace::new();
//! let gpio = MockGpio::new().with_trace(&trace);
//!
//! let pin = ev3::WIRING[0].interrupt_pin;
//! gpio.raise_edge(&pin, true);
//! assert_eq!(gpio.pending_edges(pin.bank), pin.status_mask());
//!
//! gpio.clear_pending_edges(pin.bank, pin.status_mask());
//! assert_eq!(gpio.pending_edges(pin.bank), 0);
//! assert_eq!(
//!     trace.events(),
//!     vec![HwEvent::ClearPending { bank: 5, mask: pin.status_mask() }]
//! );
//! ```
//!
//! [`AnalogInput`]: crate::traits::AnalogInput
//! [`GpioPins`]: crate::traits::GpioPins
//! [`GpioBanks`]: crate::traits::GpioBanks
//! [`InterruptController`]: crate::traits::InterruptController

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Error;
use crate::pin::PinDescriptor;
use crate::traits::{AnalogInput, GpioBanks, GpioPins, InterruptController};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// Trace
// ============================================================================

/// One recorded hardware call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HwEvent {
    /// `GpioPins::configure_input`
    ConfigureInput {
        /// Bank of the pin.
        bank: u8,
        /// Pin within the bank.
        pin: u8,
    },
    /// `GpioPins::configure_output_low`
    ConfigureOutputLow {
        /// Bank of the pin.
        bank: u8,
        /// Pin within the bank.
        pin: u8,
    },
    /// `GpioBanks::disable_bank_interrupt`
    DisableBank(u8),
    /// `GpioBanks::enable_bank_interrupt`
    EnableBank(u8),
    /// `GpioBanks::enable_bank_interrupts`
    EnableBanks(u32),
    /// `GpioBanks::clear_pending_edges`
    ClearPending {
        /// Bank being acknowledged.
        bank: u8,
        /// Bits cleared.
        mask: u32,
    },
    /// `GpioBanks::set_rising_trigger`
    RisingTrigger {
        /// Register pair index.
        register: u8,
        /// Bits set.
        mask: u32,
    },
    /// `GpioBanks::set_falling_trigger`
    FallingTrigger {
        /// Register pair index.
        register: u8,
        /// Bits set.
        mask: u32,
    },
    /// `InterruptController::register_handler`
    RegisterHandler {
        /// System vector.
        vector: u32,
        /// Bank routed to the vector.
        bank: u8,
    },
    /// `InterruptController::set_priority_channel`
    PriorityChannel {
        /// System vector.
        vector: u32,
        /// Assigned channel.
        channel: u8,
    },
    /// `InterruptController::enable`
    EnableVector(u32),
    /// `InterruptController::acknowledge`
    Acknowledge(u32),
}

/// Shared, ordered log of hardware calls.
///
/// Cloning gives another handle to the same log.
#[derive(Clone, Debug, Default)]
pub struct MockTrace {
    events: Arc<Mutex<Vec<HwEvent>>>,
}

impl MockTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    pub fn events(&self) -> Vec<HwEvent> {
        lock(&self.events).clone()
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&HwEvent) -> bool) -> Option<usize> {
        lock(&self.events).iter().position(pred)
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }

    fn push(&self, event: HwEvent) {
        lock(&self.events).push(event);
    }
}

// ============================================================================
// Analog Mock
// ============================================================================

/// Mock analog converter.
///
/// Channels return whatever was last set with [`set_sample`](Self::set_sample).
/// Channels never set, or marked with [`fail_channel`](Self::fail_channel),
/// return [`Error::ConversionFailed`].
///
/// # Example
///
/// ```rust
/// use motor_counter::hal::MockAdc;
/// use motor_counter::traits::AnalogInput;
/// use motor_counter::Error;
///
/// let adc = MockAdc::new();
/// adc.set_sample(3, 2014);
/// assert_eq!(adc.read_channel(3), Ok(2014));
///
/// adc.fail_channel(3);
/// assert_eq!(adc.read_channel(3), Err(Error::ConversionFailed));
/// assert_eq!(adc.read_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockAdc {
    samples: Mutex<HashMap<u8, Result<u16, Error>>>,
    reads: Mutex<usize>,
}

impl MockAdc {
    /// Creates a mock with no channels configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sample returned by `channel`.
    pub fn set_sample(&self, channel: u8, sample: u16) {
        lock(&self.samples).insert(channel, Ok(sample));
    }

    /// Makes `channel` fail every conversion.
    pub fn fail_channel(&self, channel: u8) {
        lock(&self.samples).insert(channel, Err(Error::ConversionFailed));
    }

    /// Number of conversions requested so far.
    pub fn read_count(&self) -> usize {
        *lock(&self.reads)
    }
}

impl AnalogInput for MockAdc {
    fn read_channel(&self, channel: u8) -> Result<u16, Error> {
        *lock(&self.reads) += 1;
        lock(&self.samples)
            .get(&channel)
            .copied()
            .unwrap_or(Err(Error::ConversionFailed))
    }
}

// ============================================================================
// GPIO Mock
// ============================================================================

/// Direction a mock pin was configured with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinMode {
    /// Digital input.
    Input,
    /// Digital output, driven low.
    OutputLow,
}

#[derive(Debug, Default)]
struct GpioState {
    levels: HashMap<(u8, u8), bool>,
    modes: HashMap<(u8, u8), PinMode>,
    pending: HashMap<u8, u32>,
    rising: HashMap<u8, u32>,
    falling: HashMap<u8, u32>,
    bank_enable: u32,
    cleared: Vec<(u8, u32)>,
}

/// Mock GPIO controller.
///
/// Models pin levels, the per-register-pair pending status, the edge trigger
/// registers and the bank interrupt enable register. Status and trigger
/// registers are shared between bank pairs exactly as the hardware does it.
#[derive(Debug, Default)]
pub struct MockGpio {
    state: Mutex<GpioState>,
    trace: Option<MockTrace>,
}

impl MockGpio {
    /// Creates a mock with every pin low and nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls into `trace`.
    pub fn with_trace(mut self, trace: &MockTrace) -> Self {
        self.trace = Some(trace.clone());
        self
    }

    fn record(&self, event: HwEvent) {
        if let Some(trace) = &self.trace {
            trace.push(event);
        }
    }

    /// Sets the level of a pin.
    pub fn set_level(&self, pin: &PinDescriptor, level: bool) {
        lock(&self.state).levels.insert((pin.bank, pin.pin), level);
    }

    /// Simulates an edge: sets the pin to `level` and marks it pending.
    pub fn raise_edge(&self, pin: &PinDescriptor, level: bool) {
        let mut state = lock(&self.state);
        state.levels.insert((pin.bank, pin.pin), level);
        *state.pending.entry(pin.status_register()).or_default() |= pin.status_mask();
    }

    /// ORs raw bits into the status register pair holding `bank`.
    pub fn set_pending(&self, bank: u8, mask: u32) {
        *lock(&self.state).pending.entry(bank / 2).or_default() |= mask;
    }

    /// Mode the pin was last configured with, if any.
    pub fn pin_mode(&self, pin: &PinDescriptor) -> Option<PinMode> {
        lock(&self.state).modes.get(&(pin.bank, pin.pin)).copied()
    }

    /// Returns true if `bank` is enabled in the bank interrupt enable register.
    pub fn bank_enabled(&self, bank: u8) -> bool {
        lock(&self.state).bank_enable & (1 << bank) != 0
    }

    /// Current value of the bank interrupt enable register.
    pub fn bank_enable_register(&self) -> u32 {
        lock(&self.state).bank_enable
    }

    /// Rising-edge trigger bits of a register pair.
    pub fn rising_trigger(&self, register: u8) -> u32 {
        lock(&self.state).rising.get(&register).copied().unwrap_or(0)
    }

    /// Falling-edge trigger bits of a register pair.
    pub fn falling_trigger(&self, register: u8) -> u32 {
        lock(&self.state).falling.get(&register).copied().unwrap_or(0)
    }

    /// Every `(bank, mask)` passed to `clear_pending_edges`, in order.
    pub fn cleared_masks(&self) -> Vec<(u8, u32)> {
        lock(&self.state).cleared.clone()
    }
}

impl GpioPins for MockGpio {
    fn configure_input(&self, pin: &PinDescriptor) {
        lock(&self.state)
            .modes
            .insert((pin.bank, pin.pin), PinMode::Input);
        self.record(HwEvent::ConfigureInput {
            bank: pin.bank,
            pin: pin.pin,
        });
    }

    fn configure_output_low(&self, pin: &PinDescriptor) {
        let mut state = lock(&self.state);
        state.modes.insert((pin.bank, pin.pin), PinMode::OutputLow);
        state.levels.insert((pin.bank, pin.pin), false);
        drop(state);
        self.record(HwEvent::ConfigureOutputLow {
            bank: pin.bank,
            pin: pin.pin,
        });
    }

    fn read_level(&self, pin: &PinDescriptor) -> bool {
        lock(&self.state)
            .levels
            .get(&(pin.bank, pin.pin))
            .copied()
            .unwrap_or(false)
    }
}

impl GpioBanks for MockGpio {
    fn disable_bank_interrupt(&self, bank: u8) {
        lock(&self.state).bank_enable &= !(1 << bank);
        self.record(HwEvent::DisableBank(bank));
    }

    fn enable_bank_interrupt(&self, bank: u8) {
        lock(&self.state).bank_enable |= 1 << bank;
        self.record(HwEvent::EnableBank(bank));
    }

    fn enable_bank_interrupts(&self, mask: u32) {
        lock(&self.state).bank_enable |= mask;
        self.record(HwEvent::EnableBanks(mask));
    }

    fn pending_edges(&self, bank: u8) -> u32 {
        lock(&self.state)
            .pending
            .get(&(bank / 2))
            .copied()
            .unwrap_or(0)
    }

    fn clear_pending_edges(&self, bank: u8, mask: u32) {
        let mut state = lock(&self.state);
        *state.pending.entry(bank / 2).or_default() &= !mask;
        state.cleared.push((bank, mask));
        drop(state);
        self.record(HwEvent::ClearPending { bank, mask });
    }

    fn set_rising_trigger(&self, register: u8, mask: u32) {
        *lock(&self.state).rising.entry(register).or_default() |= mask;
        self.record(HwEvent::RisingTrigger { register, mask });
    }

    fn set_falling_trigger(&self, register: u8, mask: u32) {
        *lock(&self.state).falling.entry(register).or_default() |= mask;
        self.record(HwEvent::FallingTrigger { register, mask });
    }
}

// ============================================================================
// Interrupt Controller Mock
// ============================================================================

#[derive(Debug, Default)]
struct IntcState {
    routes: Vec<(u32, u8)>,
    channels: HashMap<u32, u8>,
    enabled: Vec<u32>,
    acknowledged: Vec<u32>,
}

/// Mock system interrupt controller.
///
/// # Example
///
/// ```rust
/// use motor_counter::hal::MockInterrupts;
/// use motor_counter::traits::InterruptController;
///
/// let intc = MockInterrupts::new();
/// intc.register_handler(47, 5);
/// intc.set_priority_channel(47, 0);
/// intc.enable(47);
///
/// assert_eq!(intc.route(47), Some(5));
/// assert_eq!(intc.priority_channel(47), Some(0));
/// assert!(intc.is_enabled(47));
/// assert!(!intc.is_enabled(48));
/// ```
#[derive(Debug, Default)]
pub struct MockInterrupts {
    state: Mutex<IntcState>,
    trace: Option<MockTrace>,
}

impl MockInterrupts {
    /// Creates a mock with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls into `trace`.
    pub fn with_trace(mut self, trace: &MockTrace) -> Self {
        self.trace = Some(trace.clone());
        self
    }

    fn record(&self, event: HwEvent) {
        if let Some(trace) = &self.trace {
            trace.push(event);
        }
    }

    /// Every `(vector, bank)` registration, in order.
    pub fn registered(&self) -> Vec<(u32, u8)> {
        lock(&self.state).routes.clone()
    }

    /// Bank routed to `vector`, if registered.
    pub fn route(&self, vector: u32) -> Option<u8> {
        lock(&self.state)
            .routes
            .iter()
            .rev()
            .find(|(v, _)| *v == vector)
            .map(|(_, bank)| *bank)
    }

    /// Priority channel assigned to `vector`, if any.
    pub fn priority_channel(&self, vector: u32) -> Option<u8> {
        lock(&self.state).channels.get(&vector).copied()
    }

    /// Returns true if `vector` has been enabled.
    pub fn is_enabled(&self, vector: u32) -> bool {
        lock(&self.state).enabled.contains(&vector)
    }

    /// Every acknowledged vector, in order.
    pub fn acknowledged(&self) -> Vec<u32> {
        lock(&self.state).acknowledged.clone()
    }
}

impl InterruptController for MockInterrupts {
    fn register_handler(&self, vector: u32, bank: u8) {
        lock(&self.state).routes.push((vector, bank));
        self.record(HwEvent::RegisterHandler { vector, bank });
    }

    fn set_priority_channel(&self, vector: u32, channel: u8) {
        lock(&self.state).channels.insert(vector, channel);
        self.record(HwEvent::PriorityChannel { vector, channel });
    }

    fn enable(&self, vector: u32) {
        lock(&self.state).enabled.push(vector);
        self.record(HwEvent::EnableVector(vector));
    }

    fn acknowledge(&self, vector: u32) {
        lock(&self.state).acknowledged.push(vector);
        self.record(HwEvent::Acknowledge(vector));
    }
}
