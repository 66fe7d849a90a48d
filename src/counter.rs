//! Per-port counter state and the fixed device table.
//!
//! The table is sized at compile time and built by a `const fn`, so a board
//! can keep it in a `static` for the life of the program:
//!
//! ```rust
//! use motor_counter::config::ev3;
//! use motor_counter::counter::CounterTable;
//!
//! static COUNTERS: CounterTable<{ ev3::PORT_COUNT }> = CounterTable::new(ev3::WIRING);
//!
//! let port_a = COUNTERS.get(0).unwrap();
//! assert_eq!(port_a.count(), 0);
//! assert!(COUNTERS.get(4).is_err());
//! ```
//!
//! # Concurrency
//!
//! `count` is written only by the bank interrupt handler that owns the
//! device's interrupt pin, and that handler masks its own bank while it
//! runs. With exactly one writer, the update is a plain atomic load followed
//! by an atomic store, so cores without read-modify-write atomics work too.
//! Foreground readers always see a whole value from before or after an
//! update.

use core::sync::atomic::{AtomicI32, Ordering};

use crate::config::CounterWiring;
use crate::error::Error;
use crate::pin::{PinDescriptor, PinMux};

/// Counter state and wiring for one sensor port.
#[derive(Debug)]
pub struct CounterDevice {
    count: AtomicI32,
    wiring: CounterWiring,
}

const UNWIRED_PIN: PinDescriptor = PinDescriptor::new(PinMux::new(0, 0, 0), 0, 0);

const UNWIRED: CounterDevice = CounterDevice::new(CounterWiring::new(
    UNWIRED_PIN,
    UNWIRED_PIN,
    UNWIRED_PIN,
    0,
));

impl CounterDevice {
    /// Creates a device with a zero count.
    pub const fn new(wiring: CounterWiring) -> Self {
        Self {
            count: AtomicI32::new(0),
            wiring,
        }
    }

    /// Returns the accumulated quadrature count.
    #[inline]
    pub fn count(&self) -> i32 {
        self.count.load(Ordering::Acquire)
    }

    /// Returns the wiring of this port.
    #[inline]
    pub fn wiring(&self) -> &CounterWiring {
        &self.wiring
    }

    /// Records one decoded edge: +1 if `forward`, -1 otherwise.
    ///
    /// Must only be called from the single context that owns this device's
    /// interrupt bank.
    #[inline]
    pub fn record_edge(&self, forward: bool) {
        let step = if forward { 1 } else { -1 };
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(step), Ordering::Release);
    }
}

/// Fixed-size table of counter devices.
#[derive(Debug)]
pub struct CounterTable<const N: usize> {
    devices: [CounterDevice; N],
}

impl<const N: usize> CounterTable<N> {
    /// Builds a table with every count at zero.
    pub const fn new(wiring: [CounterWiring; N]) -> Self {
        let mut devices = [UNWIRED; N];
        let mut i = 0;
        while i < N {
            devices[i].wiring = wiring[i];
            i += 1;
        }
        Self { devices }
    }

    /// Looks up a device by zero-based index.
    ///
    /// Returns [`Error::NoDevice`] if `id` is outside the table.
    pub fn get(&self, id: usize) -> Result<CounterHandle<'_>, Error> {
        self.devices
            .get(id)
            .map(|device| CounterHandle { index: id, device })
            .ok_or(Error::NoDevice)
    }

    /// Iterates over all devices in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, CounterDevice> {
        self.devices.iter()
    }

    /// Number of devices in the table.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Returns true if the table has no devices.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// Handle to one live device in a [`CounterTable`].
///
/// Cheap to copy. Reads through a handle always see the current count.
#[derive(Clone, Copy, Debug)]
pub struct CounterHandle<'a> {
    index: usize,
    device: &'a CounterDevice,
}

impl<'a> CounterHandle<'a> {
    /// Index of the device in its table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the accumulated quadrature count.
    #[inline]
    pub fn count(&self) -> i32 {
        self.device.count()
    }

    /// Returns the wiring of this port.
    #[inline]
    pub fn wiring(&self) -> &'a CounterWiring {
        &self.device.wiring
    }

    /// Returns the underlying device.
    #[inline]
    pub fn device(&self) -> &'a CounterDevice {
        self.device
    }
}

impl PartialEq for CounterHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && core::ptr::eq(self.device, other.device)
    }
}

impl Eq for CounterHandle<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ev3;

    fn table() -> CounterTable<{ ev3::PORT_COUNT }> {
        CounterTable::new(ev3::WIRING)
    }

    // =========================================================================
    // Table Tests
    // =========================================================================

    #[test]
    fn new_table_starts_at_zero() {
        let table = table();
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert!(table.iter().all(|d| d.count() == 0));
    }

    #[test]
    fn wiring_is_kept_in_order() {
        let table = table();
        for (device, wiring) in table.iter().zip(ev3::WIRING.iter()) {
            assert_eq!(device.wiring(), wiring);
        }
    }

    #[test]
    fn get_out_of_range() {
        let table = table();
        assert_eq!(table.get(4).unwrap_err(), Error::NoDevice);
        assert_eq!(table.get(usize::MAX).unwrap_err(), Error::NoDevice);
    }

    #[test]
    fn get_is_stable() {
        let table = table();
        let a = table.get(2).unwrap();
        let b = table.get(2).unwrap();
        assert_eq!(a, b);
        assert!(core::ptr::eq(a.device(), b.device()));
        assert_eq!(a.index(), 2);
        assert_ne!(table.get(1).unwrap(), a);
    }

    #[test]
    fn handle_aliases_live_count() {
        let table = table();
        let handle = table.get(0).unwrap();
        table.iter().next().unwrap().record_edge(true);
        assert_eq!(handle.count(), 1);
    }

    #[test]
    fn empty_table() {
        let table: CounterTable<0> = CounterTable::new([]);
        assert!(table.is_empty());
        assert_eq!(table.get(0).unwrap_err(), Error::NoDevice);
    }

    // =========================================================================
    // Edge Recording Tests
    // =========================================================================

    #[test]
    fn record_edges() {
        let device = CounterDevice::new(ev3::WIRING[0]);
        for _ in 0..5 {
            device.record_edge(true);
        }
        for _ in 0..2 {
            device.record_edge(false);
        }
        assert_eq!(device.count(), 3);
    }

    #[test]
    fn record_edge_wraps() {
        let device = CounterDevice::new(ev3::WIRING[0]);
        device.count.store(i32::MAX, Ordering::Relaxed);
        device.record_edge(true);
        assert_eq!(device.count(), i32::MIN);
    }
}
