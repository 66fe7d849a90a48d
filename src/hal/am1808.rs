//! TI AM1808 GPIO, pin mux and interrupt controller registers.
//!
//! This is the backend used on the EV3 brick. The analog converter on that
//! board sits behind SPI and is not part of this module; pass any
//! [`AnalogInput`](crate::traits::AnalogInput) implementation to the driver.
//!
//! # Wiring into the IRQ entry
//!
//! ```ignore
//! use motor_counter::hal::am1808::{Aintc, Am1808Gpio};
//!
//! static GPIO: Am1808Gpio = unsafe { Am1808Gpio::new() };
//! static AINTC: Aintc = unsafe { Aintc::new() };
//!
//! // Board IRQ entry point
//! fn irq() {
//!     if let Some(vector) = AINTC.active_vector() {
//!         if AINTC.route(vector).is_some() {
//!             DRIVER.handle_vector(vector);
//!         }
//!     }
//! }
//! ```
//!
//! The SYSCFG pin mux registers are locked after reset. Call
//! [`Am1808Gpio::unlock_pinmux`] once before the counter driver is
//! initialized, unless the boot code already did.

use core::sync::atomic::{AtomicU8, Ordering};

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::register_structs;

use crate::pin::PinDescriptor;
use crate::traits::{GpioBanks, GpioPins, InterruptController};

/// GPIO controller base address.
pub const GPIO_BASE: usize = 0x01E2_6000;

/// SYSCFG0 base address.
pub const SYSCFG0_BASE: usize = 0x01C1_4000;

/// ARM interrupt controller base address.
pub const AINTC_BASE: usize = 0xFFFE_E000;

/// Number of system interrupts handled by the AINTC.
pub const NUM_INTERRUPTS: usize = 101;

const KICK0_UNLOCK: u32 = 0x83E7_0B13;
const KICK1_UNLOCK: u32 = 0x95A4_F1E0;

register_structs! {
    /// Registers shared by one pair of GPIO banks
    GpioPairRegisters {
        /// Direction, 1 = input
        (0x00 => dir: ReadWrite<u32>),
        (0x04 => _reserved0),
        /// Write 1 to drive low
        (0x0C => clr_data: WriteOnly<u32>),
        /// Pin levels
        (0x10 => in_data: ReadOnly<u32>),
        /// Write 1 to enable rising-edge interrupt
        (0x14 => set_ris_trig: WriteOnly<u32>),
        (0x18 => _reserved1),
        /// Write 1 to enable falling-edge interrupt
        (0x1C => set_fal_trig: WriteOnly<u32>),
        (0x20 => _reserved2),
        /// Pending edges, write 1 to clear
        (0x24 => intstat: ReadWrite<u32>),
        (0x28 => @END),
    },

    /// GPIO controller
    GpioRegisters {
        (0x00 => _reserved0),
        /// Bank interrupt enable
        (0x08 => binten: ReadWrite<u32>),
        (0x0C => _reserved1),
        (0x10 => pairs: [GpioPairRegisters; 5]),
        (0xD8 => @END),
    },

    /// System configuration module 0 (pin mux part)
    SysCfgRegisters {
        (0x000 => _reserved0),
        (0x038 => kick0r: WriteOnly<u32>),
        (0x03C => kick1r: WriteOnly<u32>),
        (0x040 => _reserved1),
        (0x120 => pinmux: [ReadWrite<u32>; 20]),
        (0x170 => @END),
    },

    /// ARM interrupt controller
    AintcRegisters {
        (0x000 => _reserved0),
        /// System interrupt status indexed clear
        (0x024 => sicr: WriteOnly<u32>),
        /// System interrupt enable indexed set
        (0x028 => eisr: WriteOnly<u32>),
        (0x02C => _reserved1),
        /// Global prioritized index
        (0x080 => gpir: ReadOnly<u32>),
        (0x084 => _reserved2),
        /// Channel map, one byte per system interrupt
        (0x400 => cmr: [ReadWrite<u32>; 26]),
        (0x468 => @END),
    }
}

// ============================================================================
// GPIO
// ============================================================================

/// AM1808 GPIO controller with SYSCFG pin muxing.
pub struct Am1808Gpio {
    gpio: *const GpioRegisters,
    syscfg: *const SysCfgRegisters,
}

// SAFETY: single-core part. Register accesses are single volatile loads and
// stores; the read-modify-write sequences on BINTEN, DIR and PINMUX run from
// foreground init or from a bank handler with IRQs masked by the core.
unsafe impl Sync for Am1808Gpio {}

impl Am1808Gpio {
    /// Creates the controller at its fixed address.
    ///
    /// # Safety
    ///
    /// Only one instance may exist, and only on AM1808 hardware.
    pub const unsafe fn new() -> Self {
        Self {
            gpio: GPIO_BASE as *const GpioRegisters,
            syscfg: SYSCFG0_BASE as *const SysCfgRegisters,
        }
    }

    /// Unlocks the SYSCFG registers so the pin mux can be written.
    pub fn unlock_pinmux(&self) {
        self.syscfg().kick0r.set(KICK0_UNLOCK);
        self.syscfg().kick1r.set(KICK1_UNLOCK);
    }

    fn regs(&self) -> &GpioRegisters {
        // SAFETY: points at the GPIO block for the life of the program.
        unsafe { &*self.gpio }
    }

    fn syscfg(&self) -> &SysCfgRegisters {
        // SAFETY: points at SYSCFG0 for the life of the program.
        unsafe { &*self.syscfg }
    }

    fn pair(&self, bank: u8) -> Option<&GpioPairRegisters> {
        self.regs().pairs.get(usize::from(bank / 2))
    }

    fn select_gpio(&self, pin: &PinDescriptor) {
        let Some(reg) = self.syscfg().pinmux.get(usize::from(pin.mux.register)) else {
            log::warn!("pinmux register {} out of range", pin.mux.register);
            return;
        };
        reg.set((reg.get() & !pin.mux.mask()) | pin.mux.value());
    }
}

impl GpioPins for Am1808Gpio {
    fn configure_input(&self, pin: &PinDescriptor) {
        self.select_gpio(pin);
        if let Some(pair) = self.pair(pin.bank) {
            pair.dir.set(pair.dir.get() | pin.status_mask());
        }
    }

    fn configure_output_low(&self, pin: &PinDescriptor) {
        self.select_gpio(pin);
        if let Some(pair) = self.pair(pin.bank) {
            pair.clr_data.set(pin.status_mask());
            pair.dir.set(pair.dir.get() & !pin.status_mask());
        }
    }

    fn read_level(&self, pin: &PinDescriptor) -> bool {
        self.pair(pin.bank)
            .is_some_and(|pair| pair.in_data.get() & pin.status_mask() != 0)
    }
}

impl GpioBanks for Am1808Gpio {
    fn disable_bank_interrupt(&self, bank: u8) {
        let binten = &self.regs().binten;
        binten.set(binten.get() & !(1 << bank));
    }

    fn enable_bank_interrupt(&self, bank: u8) {
        let binten = &self.regs().binten;
        binten.set(binten.get() | (1 << bank));
    }

    fn enable_bank_interrupts(&self, mask: u32) {
        let binten = &self.regs().binten;
        binten.set(binten.get() | mask);
    }

    fn pending_edges(&self, bank: u8) -> u32 {
        self.pair(bank).map_or(0, |pair| pair.intstat.get())
    }

    fn clear_pending_edges(&self, bank: u8, mask: u32) {
        if let Some(pair) = self.pair(bank) {
            pair.intstat.set(mask);
        }
    }

    fn set_rising_trigger(&self, register: u8, mask: u32) {
        if let Some(pair) = self.regs().pairs.get(usize::from(register)) {
            pair.set_ris_trig.set(mask);
        }
    }

    fn set_falling_trigger(&self, register: u8, mask: u32) {
        if let Some(pair) = self.regs().pairs.get(usize::from(register)) {
            pair.set_fal_trig.set(mask);
        }
    }
}

// ============================================================================
// AINTC
// ============================================================================

const NO_ROUTE: u8 = u8::MAX;
#[allow(clippy::declare_interior_mutable_const)]
const UNROUTED: AtomicU8 = AtomicU8::new(NO_ROUTE);

/// Bit set in GPIR when no interrupt is pending.
const GPIR_NONE: u32 = 1 << 31;
const GPIR_INDEX_MASK: u32 = 0x3FF;

/// AM1808 ARM interrupt controller.
///
/// The hardware vector table is replaced by a software route table: each
/// registered vector remembers the GPIO bank it belongs to, and the board's
/// IRQ entry asks [`active_vector`](Self::active_vector) which one fired.
pub struct Aintc {
    regs: *const AintcRegisters,
    routes: [AtomicU8; NUM_INTERRUPTS],
}

// SAFETY: see `Am1808Gpio`. Routes are atomics; CMR read-modify-write only
// happens during foreground init.
unsafe impl Sync for Aintc {}

impl Aintc {
    /// Creates the controller at its fixed address.
    ///
    /// # Safety
    ///
    /// Only one instance may exist, and only on AM1808 hardware.
    pub const unsafe fn new() -> Self {
        Self {
            regs: AINTC_BASE as *const AintcRegisters,
            routes: [UNROUTED; NUM_INTERRUPTS],
        }
    }

    fn regs(&self) -> &AintcRegisters {
        // SAFETY: points at the AINTC block for the life of the program.
        unsafe { &*self.regs }
    }

    /// Highest-priority pending vector, if any.
    pub fn active_vector(&self) -> Option<u32> {
        let gpir = self.regs().gpir.get();
        if gpir & GPIR_NONE != 0 {
            None
        } else {
            Some(gpir & GPIR_INDEX_MASK)
        }
    }

    /// GPIO bank registered for `vector`.
    pub fn route(&self, vector: u32) -> Option<u8> {
        let slot = self.routes.get(vector as usize)?;
        match slot.load(Ordering::Acquire) {
            NO_ROUTE => None,
            bank => Some(bank),
        }
    }
}

impl InterruptController for Aintc {
    fn register_handler(&self, vector: u32, bank: u8) {
        match self.routes.get(vector as usize) {
            Some(slot) => slot.store(bank, Ordering::Release),
            None => log::warn!("interrupt {} out of range", vector),
        }
    }

    fn set_priority_channel(&self, vector: u32, channel: u8) {
        let index = vector as usize;
        let Some(cmr) = self.regs().cmr.get(index / 4) else {
            return;
        };
        let shift = (index % 4) * 8;
        cmr.set((cmr.get() & !(0xFF << shift)) | (u32::from(channel) << shift));
    }

    fn enable(&self, vector: u32) {
        self.regs().eisr.set(vector);
    }

    fn acknowledge(&self, vector: u32) {
        self.regs().sicr.set(vector);
    }
}
