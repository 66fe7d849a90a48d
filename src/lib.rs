//! # motor-counter
//!
//! Interrupt-driven quadrature counter driver for motor ports with analog
//! device detection, as found on the LEGO MINDSTORMS EV3.
//!
//! ## Features
//!
//! - **Quadrature decoding in the bank interrupt**: one count per edge of the
//!   encoder's A channel, direction from the B channel
//! - **Device detection**: one analog sample tells "nothing attached" from
//!   medium and large motors, on every query
//! - **Tear-free counters**: a single interrupt writer and any number of
//!   foreground readers share each count through an atomic
//! - **Declarative wiring**: pins and analog channels per port are a
//!   build-time table
//! - **Hardware abstraction**: traits for the analog converter, GPIO and
//!   interrupt controller, with desktop mocks and an AM1808 backend
//!
//! ## Architecture
//!
//! - `traits` - Hardware abstractions
//! - `pin` - GPIO pin descriptors
//! - `config` - Wiring tables, calibration and interrupt assignment
//! - `counter` - Device table and per-port counts
//! - `device_type` - Analog device classifier
//! - `quadrature` - Edge decoding for one GPIO bank
//! - `driver` - Public facade: lookup, angle queries, init, interrupt entry
//! - `hal` - Concrete implementations (mock for testing, am1808 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use motor_counter::{
//!     config::{ev3, Config},
//!     counter::CounterTable,
//!     hal::{MockAdc, MockGpio, MockInterrupts},
//!     CounterDriver, DeviceType,
//! };
//!
//! static COUNTERS: CounterTable<{ ev3::PORT_COUNT }> = CounterTable::new(ev3::WIRING);
//!
//! let (adc, gpio, intc) = (MockAdc::new(), MockGpio::new(), MockInterrupts::new());
//! let driver = CounterDriver::new(&COUNTERS, &adc, &gpio, &intc, Config::default());
//! driver.init();
//!
//! // Port B, medium motor, turned backwards by two edges
//! let port_b = &ev3::WIRING[1];
//! gpio.set_level(&port_b.direction_pin, true);
//! for _ in 0..2 {
//!     gpio.raise_edge(&port_b.interrupt_pin, true);
//!     driver.handle_vector(47);
//! }
//!
//! adc.set_sample(port_b.adc_channel, 290);
//! let reading = driver.get_angle(driver.get_device(1).unwrap()).unwrap();
//! assert_eq!(reading.angle.millidegrees, -2000);
//! assert_eq!(reading.device_type, DeviceType::Ev3MediumMotor);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Wiring tables, classifier calibration and interrupt assignment.
pub mod config;
/// Fixed device table and per-port quadrature counts.
pub mod counter;
/// Analog device type classifier.
pub mod device_type;
/// Driver facade: lookup, angle queries, init and interrupt entry.
pub mod driver;
/// Error type shared by the driver and its collaborators.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// GPIO pin descriptors.
pub mod pin;
/// Quadrature decoding for one GPIO bank.
pub mod quadrature;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use config::{ClassifierConfig, Config, CounterWiring, InterruptConfig};
pub use counter::{CounterDevice, CounterHandle, CounterTable};
pub use device_type::{classify, DeviceType};
pub use driver::{Angle, AngleReading, CounterDriver, COUNTS_PER_ROTATION};
pub use error::Error;
pub use pin::{PinDescriptor, PinMux};
pub use traits::{AnalogInput, GpioBanks, GpioPins, InterruptController};
