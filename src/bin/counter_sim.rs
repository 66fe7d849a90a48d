//! Desktop simulator for the EV3 motor counter driver.
//!
//! Builds the four EV3 output ports on mock hardware, attaches motors,
//! turns them by feeding encoder edges through the bank interrupt vectors
//! and prints the resulting angles. Port A is then unplugged and plugged
//! back in to show that the count survives a disconnect.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --features sim --bin counter_sim -- 725
//! ```
//!
//! The optional argument is the number of edges to turn port A forward.

use motor_counter::config::ev3;
use motor_counter::counter::CounterTable;
use motor_counter::hal::{MockAdc, MockGpio, MockInterrupts};
use motor_counter::{Config, CounterDriver, CounterWiring, Error};

/// Analog samples for the simulated devices
const LARGE_MOTOR_SAMPLE: u16 = 3666;
const MEDIUM_MOTOR_SAMPLE: u16 = 290;
const NOTHING_SAMPLE: u16 = 2014;

static COUNTERS: CounterTable<{ ev3::PORT_COUNT }> = CounterTable::new(ev3::WIRING);

type SimDriver<'a> =
    CounterDriver<'a, &'a MockAdc, &'a MockGpio, &'a MockInterrupts, { ev3::PORT_COUNT }>;

/// Encoder attached to one port, tracking the level of its A channel.
struct Encoder {
    wiring: CounterWiring,
    level: bool,
}

impl Encoder {
    fn new(wiring: CounterWiring) -> Self {
        Self {
            wiring,
            level: false,
        }
    }

    /// Emits `edges` edges and runs the bank interrupt after each one.
    fn turn(&mut self, driver: &SimDriver<'_>, gpio: &MockGpio, edges: u32, forward: bool) {
        let bank = self.wiring.interrupt_pin.bank;
        let vector = driver.config().interrupts.vector_for(bank);
        for _ in 0..edges {
            self.level = !self.level;
            gpio.set_level(&self.wiring.direction_pin, self.level ^ forward);
            gpio.raise_edge(&self.wiring.interrupt_pin, self.level);
            if !driver.handle_vector(vector) {
                log::warn!("vector {} not routed", vector);
            }
        }
    }
}

fn report(driver: &SimDriver<'_>) -> anyhow::Result<()> {
    for (id, name) in ["A", "B", "C", "D"].iter().enumerate() {
        let handle = driver.get_device(id)?;
        match driver.get_angle(handle) {
            Ok(reading) => println!(
                "  port {}: {:<17} {:>4} rot {:>8} mdeg  (count {})",
                name,
                reading.device_type.as_str(),
                reading.angle.rotations,
                reading.angle.millidegrees,
                handle.count()
            ),
            Err(Error::NoDevice) => {
                println!("  port {}: nothing attached        (count {})", name, handle.count())
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let edges: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(725);

    let adc = MockAdc::new();
    let gpio = MockGpio::new();
    let intc = MockInterrupts::new();
    let driver = CounterDriver::new(&COUNTERS, &adc, &gpio, &intc, Config::default());
    driver.init();

    // =========================================================================
    // Attach devices
    // =========================================================================
    let [port_a, port_b, port_c, port_d] = ev3::WIRING;
    adc.set_sample(port_a.adc_channel, LARGE_MOTOR_SAMPLE);
    adc.set_sample(port_b.adc_channel, NOTHING_SAMPLE);
    adc.set_sample(port_c.adc_channel, MEDIUM_MOTOR_SAMPLE);
    adc.set_sample(port_d.adc_channel, NOTHING_SAMPLE);

    // =========================================================================
    // Turn motors
    // =========================================================================
    let mut motor_a = Encoder::new(port_a);
    let mut motor_c = Encoder::new(port_c);

    motor_a.turn(&driver, &gpio, edges, true);
    motor_c.turn(&driver, &gpio, 90, false);

    println!("After turning A forward {} and C back 90:", edges);
    report(&driver)?;

    // =========================================================================
    // Disconnect and reconnect port A
    // =========================================================================
    adc.set_sample(port_a.adc_channel, NOTHING_SAMPLE);
    println!("Port A unplugged:");
    report(&driver)?;

    adc.set_sample(port_a.adc_channel, LARGE_MOTOR_SAMPLE);
    motor_a.turn(&driver, &gpio, 10, false);
    println!("Port A plugged back in and turned back 10:");
    report(&driver)?;

    Ok(())
}
