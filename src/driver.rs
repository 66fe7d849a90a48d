//! Public driver facade: device lookup, angle queries, interrupt entry and
//! one-time hardware setup.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::config::{ev3, Config};
//! use motor_counter::counter::CounterTable;
//! use motor_counter::hal::{MockAdc, MockGpio, MockInterrupts};
//! use motor_counter::{CounterDriver, DeviceType, Error};
//!
//! let table = CounterTable::new(ev3::WIRING);
//! let (adc, gpio, intc) = (MockAdc::new(), MockGpio::new(), MockInterrupts::new());
//! let driver = CounterDriver::new(&table, &adc, &gpio, &intc, Config::default());
//! driver.init();
//!
//! // Turn port A forward by one edge
//! let port_a = &ev3::WIRING[0];
//! gpio.raise_edge(&port_a.interrupt_pin, true);
//! driver.handle_bank_interrupt(port_a.interrupt_pin.bank);
//!
//! let motor = driver.get_device(0).unwrap();
//! adc.set_sample(port_a.adc_channel, 3666);
//! let reading = driver.get_angle(motor).unwrap();
//! assert_eq!(reading.angle.millidegrees, 1000);
//! assert_eq!(reading.device_type, DeviceType::Ev3LargeMotor);
//!
//! // Unplugged: no angle, count is kept
//! adc.set_sample(port_a.adc_channel, 2014);
//! assert_eq!(driver.get_angle(motor).unwrap_err(), Error::NoDevice);
//! assert_eq!(motor.count(), 1);
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{bank_enable_mask, bank_interrupts, BankInterrupt, Config, MAX_BANKS};
use crate::counter::{CounterHandle, CounterTable};
use crate::device_type::{classify, DeviceType};
use crate::error::Error;
use crate::quadrature::decode_bank;
use crate::traits::{AnalogInput, GpioBanks, GpioPins, InterruptController};

/// Counts per full rotation.
pub const COUNTS_PER_ROTATION: i32 = 360;

/// Relative angle split into whole rotations and the remainder.
///
/// Both parts carry the sign of the underlying count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angle {
    /// Whole rotations, truncated toward zero.
    pub rotations: i32,
    /// Remainder within the current rotation, in millidegrees.
    pub millidegrees: i32,
}

impl Angle {
    /// Converts a quadrature count (one count per degree).
    ///
    /// # Examples
    ///
    /// ```
    /// use motor_counter::Angle;
    ///
    /// let angle = Angle::from_count(725);
    /// assert_eq!((angle.rotations, angle.millidegrees), (2, 5000));
    ///
    /// let angle = Angle::from_count(-725);
    /// assert_eq!((angle.rotations, angle.millidegrees), (-2, -5000));
    /// ```
    #[inline]
    pub const fn from_count(count: i32) -> Self {
        Self {
            rotations: count / COUNTS_PER_ROTATION,
            millidegrees: (count % COUNTS_PER_ROTATION) * 1000,
        }
    }

    /// Total angle in whole degrees.
    #[inline]
    pub const fn total_degrees(&self) -> i64 {
        self.rotations as i64 * COUNTS_PER_ROTATION as i64 + (self.millidegrees / 1000) as i64
    }
}

/// Result of a successful angle query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngleReading {
    /// Relative angle since power-on.
    pub angle: Angle,
    /// Device detected during this query.
    pub device_type: DeviceType,
}

/// Quadrature counter driver.
///
/// Borrows the device table and owns (or borrows, through the `&T` trait
/// impls) the three hardware collaborators. Every method takes `&self`: the
/// same driver serves foreground queries and the bank interrupt handlers.
pub struct CounterDriver<'a, A, G, I, const N: usize> {
    table: &'a CounterTable<N>,
    adc: A,
    gpio: G,
    intc: I,
    config: Config,
    banks: heapless::Vec<BankInterrupt, MAX_BANKS>,
    initialized: AtomicBool,
}

impl<'a, A, G, I, const N: usize> CounterDriver<'a, A, G, I, N>
where
    A: AnalogInput,
    G: GpioPins + GpioBanks,
    I: InterruptController,
{
    /// Creates a driver. Hardware is untouched until [`init`](Self::init).
    pub fn new(table: &'a CounterTable<N>, adc: A, gpio: G, intc: I, config: Config) -> Self {
        let banks = bank_interrupts(table.iter().map(|d| d.wiring()), &config.interrupts);
        Self {
            table,
            adc,
            gpio,
            intc,
            config,
            banks,
            initialized: AtomicBool::new(false),
        }
    }

    /// Configures pins and enables bank interrupts. Runs once.
    ///
    /// For each device, both encoder pins become inputs and the detect pin is
    /// driven low. Only then are the bank vectors registered, given a
    /// priority channel and enabled, and the GPIO controller told to raise
    /// interrupts on both edges of every interrupt pin.
    pub fn init(&self) {
        if self.initialized.load(Ordering::Acquire) {
            log::warn!("counter driver already initialized");
            return;
        }
        self.initialized.store(true, Ordering::Release);

        for (id, device) in self.table.iter().enumerate() {
            let wiring = device.wiring();
            log::debug!(
                "counter {}: int {}.{}, dir {}.{}, det {}.{}, adc {}",
                id,
                wiring.interrupt_pin.bank,
                wiring.interrupt_pin.pin,
                wiring.direction_pin.bank,
                wiring.direction_pin.pin,
                wiring.detect_pin.bank,
                wiring.detect_pin.pin,
                wiring.adc_channel
            );
            self.gpio.configure_input(&wiring.direction_pin);
            self.gpio.configure_input(&wiring.interrupt_pin);
            self.gpio.configure_output_low(&wiring.detect_pin);
        }

        for bank in &self.banks {
            self.intc.register_handler(bank.vector, bank.bank);
            self.intc
                .set_priority_channel(bank.vector, self.config.interrupts.priority_channel);
        }
        for bank in &self.banks {
            self.intc.enable(bank.vector);
        }

        self.gpio.enable_bank_interrupts(bank_enable_mask(&self.banks));
        for bank in &self.banks {
            self.gpio.set_rising_trigger(bank.status_register, bank.edge_mask);
            self.gpio.set_falling_trigger(bank.status_register, bank.edge_mask);
        }

        log::info!(
            "counter driver ready: {} devices on {} banks",
            N,
            self.banks.len()
        );
    }

    /// Returns true once [`init`](Self::init) has run.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Looks up a device by zero-based port index.
    ///
    /// Returns [`Error::NoDevice`] if `id` is out of range.
    #[inline]
    pub fn get_device(&self, id: usize) -> Result<CounterHandle<'a>, Error> {
        self.table.get(id)
    }

    /// Samples the port's analog line and classifies the attached device.
    ///
    /// Returns [`DeviceType::None`] rather than an error when nothing is
    /// attached.
    pub fn device_type(&self, handle: CounterHandle<'_>) -> Result<DeviceType, Error> {
        let channel = handle.wiring().adc_channel;
        let sample = self.adc.read_channel(channel).map_err(|err| {
            log::trace!("counter {}: adc channel {}: {}", handle.index(), channel, err);
            err
        })?;
        Ok(classify(sample, &self.config.classifier))
    }

    /// Returns the relative angle of a device and the detected device type.
    ///
    /// Presence is checked on every call: if the analog line reads "nothing
    /// attached", this returns [`Error::NoDevice`] even though the count is
    /// kept. Analog failures are returned as-is.
    pub fn get_angle(&self, handle: CounterHandle<'_>) -> Result<AngleReading, Error> {
        let device_type = self.device_type(handle)?;
        if device_type.is_none() {
            log::trace!("counter {}: nothing attached", handle.index());
            return Err(Error::NoDevice);
        }

        Ok(AngleReading {
            angle: Angle::from_count(handle.count()),
            device_type,
        })
    }

    /// Absolute angle is not available from an incremental encoder.
    ///
    /// Always returns [`Error::NotSupported`].
    #[inline]
    pub fn get_absolute_angle(&self, _handle: CounterHandle<'_>) -> Result<i32, Error> {
        Err(Error::NotSupported)
    }

    /// Interrupt handler for one GPIO bank.
    ///
    /// Decodes the bank's pending edges, acknowledges the bank's vector at
    /// the interrupt controller and unmasks the bank. Banks with no
    /// configured counter are ignored.
    pub fn handle_bank_interrupt(&self, bank: u8) {
        let Some(vector) = self.banks.iter().find(|b| b.bank == bank).map(|b| b.vector) else {
            return;
        };

        decode_bank(self.table, &self.gpio, bank);

        self.intc.acknowledge(vector);
        self.gpio.enable_bank_interrupt(bank);
    }

    /// Dispatches a system interrupt vector.
    ///
    /// Returns false if `vector` does not belong to a monitored bank.
    pub fn handle_vector(&self, vector: u32) -> bool {
        match self.banks.iter().find(|b| b.vector == vector) {
            Some(bank) => {
                self.handle_bank_interrupt(bank.bank);
                true
            }
            None => false,
        }
    }

    /// Monitored GPIO banks, in the order they are registered.
    #[inline]
    pub fn banks(&self) -> &[BankInterrupt] {
        &self.banks
    }

    /// Number of devices in the table.
    #[inline]
    pub fn len(&self) -> usize {
        N
    }

    /// Returns true if the table has no devices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// Returns the driver configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ev3;
    use crate::hal::{MockAdc, MockGpio, MockInterrupts};

    // =========================================================================
    // Angle Tests
    // =========================================================================

    #[test]
    fn angle_zero() {
        assert_eq!(Angle::from_count(0), Angle::default());
    }

    #[test]
    fn angle_positive() {
        let angle = Angle::from_count(725);
        assert_eq!(angle.rotations, 2);
        assert_eq!(angle.millidegrees, 5000);
        assert_eq!(angle.total_degrees(), 725);
    }

    #[test]
    fn angle_negative_truncates_toward_zero() {
        let angle = Angle::from_count(-725);
        assert_eq!(angle.rotations, -2);
        assert_eq!(angle.millidegrees, -5000);
        assert_eq!(angle.total_degrees(), -725);
    }

    #[test]
    fn angle_below_one_rotation() {
        assert_eq!(Angle::from_count(359), Angle { rotations: 0, millidegrees: 359_000 });
        assert_eq!(Angle::from_count(-1), Angle { rotations: 0, millidegrees: -1000 });
        assert_eq!(Angle::from_count(360), Angle { rotations: 1, millidegrees: 0 });
    }

    #[test]
    fn angle_extremes() {
        let angle = Angle::from_count(i32::MAX);
        assert_eq!(angle.total_degrees(), i32::MAX as i64);
        let angle = Angle::from_count(i32::MIN);
        assert_eq!(angle.total_degrees(), i32::MIN as i64);
    }

    // =========================================================================
    // Driver Tests
    // =========================================================================

    struct Rig {
        table: CounterTable<{ ev3::PORT_COUNT }>,
        adc: MockAdc,
        gpio: MockGpio,
        intc: MockInterrupts,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                table: CounterTable::new(ev3::WIRING),
                adc: MockAdc::new(),
                gpio: MockGpio::new(),
                intc: MockInterrupts::new(),
            }
        }

        fn driver(
            &self,
        ) -> CounterDriver<'_, &MockAdc, &MockGpio, &MockInterrupts, { ev3::PORT_COUNT }> {
            CounterDriver::new(&self.table, &self.adc, &self.gpio, &self.intc, Config::default())
        }
    }

    #[test]
    fn driver_banks_follow_wiring() {
        let rig = Rig::new();
        let driver = rig.driver();
        let banks: Vec<u8> = driver.banks().iter().map(|b| b.bank).collect();
        assert_eq!(banks, vec![5, 6]);
        assert_eq!(driver.len(), 4);
        assert!(!driver.is_empty());
    }

    #[test]
    fn init_runs_once() {
        let rig = Rig::new();
        let driver = rig.driver();
        assert!(!driver.is_initialized());

        driver.init();
        assert!(driver.is_initialized());
        let registered = rig.intc.registered().len();

        driver.init();
        assert_eq!(rig.intc.registered().len(), registered);
    }

    #[test]
    fn get_device_bounds() {
        let rig = Rig::new();
        let driver = rig.driver();
        assert!(driver.get_device(3).is_ok());
        assert_eq!(driver.get_device(4).unwrap_err(), Error::NoDevice);
    }

    #[test]
    fn get_angle_reports_type() {
        let rig = Rig::new();
        let driver = rig.driver();
        let handle = driver.get_device(1).unwrap();

        rig.adc.set_sample(ev3::WIRING[1].adc_channel, 290);
        let reading = driver.get_angle(handle).unwrap();
        assert_eq!(reading.device_type, DeviceType::Ev3MediumMotor);
        assert_eq!(reading.angle, Angle::default());
    }

    #[test]
    fn get_angle_propagates_conversion_failure() {
        let rig = Rig::new();
        let driver = rig.driver();
        let handle = driver.get_device(2).unwrap();

        rig.adc.fail_channel(ev3::WIRING[2].adc_channel);
        assert_eq!(driver.get_angle(handle).unwrap_err(), Error::ConversionFailed);
        assert_eq!(driver.device_type(handle).unwrap_err(), Error::ConversionFailed);
    }

    #[test]
    fn get_angle_without_sample_fails() {
        let rig = Rig::new();
        let driver = rig.driver();
        let handle = driver.get_device(0).unwrap();
        assert_eq!(driver.get_angle(handle).unwrap_err(), Error::ConversionFailed);
    }

    #[test]
    fn absolute_angle_not_supported() {
        let rig = Rig::new();
        let driver = rig.driver();
        let handle = driver.get_device(0).unwrap();
        rig.adc.set_sample(ev3::WIRING[0].adc_channel, 120);
        assert_eq!(driver.get_absolute_angle(handle).unwrap_err(), Error::NotSupported);
    }

    #[test]
    fn unknown_bank_interrupt_is_ignored() {
        let rig = Rig::new();
        let driver = rig.driver();
        driver.handle_bank_interrupt(2);
        assert!(rig.intc.acknowledged().is_empty());
        assert!(!driver.handle_vector(44));
    }

    #[test]
    fn handle_vector_dispatches_to_bank() {
        let rig = Rig::new();
        let driver = rig.driver();
        let port_d = &ev3::WIRING[3];

        rig.gpio.set_level(&port_d.direction_pin, true);
        rig.gpio.raise_edge(&port_d.interrupt_pin, false);

        assert!(driver.handle_vector(48));
        assert_eq!(driver.get_device(3).unwrap().count(), 1);
        assert_eq!(rig.intc.acknowledged(), vec![48]);
        assert!(rig.gpio.bank_enabled(6));
    }
}
