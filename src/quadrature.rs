//! Quadrature decoding from GPIO bank edge interrupts.
//!
//! Each port's encoder has two channels. Channel A is wired to a pin that
//! raises an interrupt on both edges; channel B is only sampled. At each A
//! edge, the two levels differ when the motor turns one way and match when
//! it turns the other, so one XOR gives the direction of that step.
//!
//! Several ports can share a bank, and one status read may carry edges for
//! more than one of them, so every handler invocation checks every device
//! against the status bits it read.

use crate::counter::CounterTable;
use crate::traits::{GpioBanks, GpioPins};

/// Returns true if an edge on the interrupt pin is a forward step.
#[inline]
pub const fn is_forward(interrupt_level: bool, direction_level: bool) -> bool {
    interrupt_level ^ direction_level
}

/// Decodes the pending edges of one GPIO bank into the table's counters.
///
/// Masks `bank` for the duration, reads its pending status once, and for
/// each device whose interrupt pin is in `bank` with a pending edge:
/// acknowledges that pin's bit only, samples both encoder channels and
/// steps the count. Bank delivery is re-enabled by the caller after the
/// system-level acknowledge.
///
/// Returns the number of edges decoded.
pub fn decode_bank<G, const N: usize>(table: &CounterTable<N>, gpio: &G, bank: u8) -> u32
where
    G: GpioPins + GpioBanks + ?Sized,
{
    gpio.disable_bank_interrupt(bank);
    let status = gpio.pending_edges(bank);

    let mut decoded = 0;
    for device in table.iter() {
        let wiring = device.wiring();
        let pin = &wiring.interrupt_pin;
        let mask = pin.status_mask();

        // Edge is not for this device.
        if pin.bank != bank || status & mask == 0 {
            continue;
        }

        gpio.clear_pending_edges(bank, mask);
        let forward = is_forward(
            gpio.read_level(pin),
            gpio.read_level(&wiring.direction_pin),
        );
        device.record_edge(forward);
        decoded += 1;
    }

    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ev3;
    use crate::hal::MockGpio;

    fn table() -> CounterTable<{ ev3::PORT_COUNT }> {
        CounterTable::new(ev3::WIRING)
    }

    #[test]
    fn forward_when_levels_differ() {
        assert!(is_forward(true, false));
        assert!(is_forward(false, true));
        assert!(!is_forward(true, true));
        assert!(!is_forward(false, false));
    }

    #[test]
    fn decode_increment() {
        let table = table();
        let gpio = MockGpio::new();
        let port_a = &ev3::WIRING[0];

        gpio.set_level(&port_a.direction_pin, false);
        gpio.raise_edge(&port_a.interrupt_pin, true);

        assert_eq!(decode_bank(&table, &gpio, 5), 1);
        assert_eq!(table.get(0).unwrap().count(), 1);
        assert_eq!(gpio.pending_edges(5), 0);
    }

    #[test]
    fn decode_decrement() {
        let table = table();
        let gpio = MockGpio::new();
        let port_a = &ev3::WIRING[0];

        gpio.set_level(&port_a.direction_pin, true);
        gpio.raise_edge(&port_a.interrupt_pin, true);

        decode_bank(&table, &gpio, 5);
        assert_eq!(table.get(0).unwrap().count(), -1);
    }

    #[test]
    fn decode_masks_bank_while_running() {
        let table = table();
        let gpio = MockGpio::new();
        gpio.enable_bank_interrupts(0x60);

        decode_bank(&table, &gpio, 5);
        assert!(!gpio.bank_enabled(5));
        assert!(gpio.bank_enabled(6));
    }

    #[test]
    fn decode_ignores_other_bank() {
        let table = table();
        let gpio = MockGpio::new();
        let port_d = &ev3::WIRING[3];

        gpio.raise_edge(&port_d.interrupt_pin, true);

        // Port D is on bank 6
        assert_eq!(decode_bank(&table, &gpio, 5), 0);
        assert!(table.iter().all(|d| d.count() == 0));
        assert_ne!(gpio.pending_edges(6), 0);

        assert_eq!(decode_bank(&table, &gpio, 6), 1);
        assert_eq!(table.get(3).unwrap().count(), 1);
    }

    #[test]
    fn decode_multiple_devices_in_one_status() {
        let table = table();
        let gpio = MockGpio::new();
        let port_a = &ev3::WIRING[0];
        let port_c = &ev3::WIRING[2];

        gpio.set_level(&port_a.direction_pin, false);
        gpio.raise_edge(&port_a.interrupt_pin, true);
        gpio.set_level(&port_c.direction_pin, false);
        gpio.raise_edge(&port_c.interrupt_pin, false);

        assert_eq!(decode_bank(&table, &gpio, 5), 2);
        assert_eq!(table.get(0).unwrap().count(), 1);
        assert_eq!(table.get(1).unwrap().count(), 0);
        assert_eq!(table.get(2).unwrap().count(), -1);
        assert_eq!(gpio.pending_edges(5), 0);
    }

    #[test]
    fn decode_clears_only_matched_bits() {
        let table = table();
        let gpio = MockGpio::new();
        let port_a = &ev3::WIRING[0];

        // An unrelated pin in the same bank
        gpio.set_pending(5, 1 << 16);
        gpio.raise_edge(&port_a.interrupt_pin, true);

        decode_bank(&table, &gpio, 5);
        assert_eq!(gpio.pending_edges(5), 1 << 16);
        assert_eq!(gpio.cleared_masks(), vec![(5, port_a.interrupt_pin.status_mask())]);
    }

    #[test]
    fn decode_with_nothing_pending() {
        let table = table();
        let gpio = MockGpio::new();
        assert_eq!(decode_bank(&table, &gpio, 5), 0);
        assert!(gpio.cleared_masks().is_empty());
    }
}
