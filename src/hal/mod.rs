//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development (requires `std` feature)
//! - `am1808`: TI AM1808 GPIO and AINTC registers (requires `am1808` feature)

#[cfg(feature = "std")]
pub mod mock;

#[cfg(feature = "am1808")]
pub mod am1808;

#[cfg(feature = "std")]
pub use mock::*;
