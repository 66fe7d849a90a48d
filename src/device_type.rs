//! Device type detection from a single analog reading.
//!
//! Every motor port has an analog line whose level depends on what is
//! plugged in. With nothing attached it floats near a nominal value. A motor
//! pulls it either low or high depending on the state of its encoder, and
//! the exact level tells the medium and large motors apart.
//!
//! The decision is static: one sample in, one type out. There is no
//! filtering, so a sample taken while the line is settling can report the
//! wrong motor type for that one query.
//!
//! # Example
//!
//! ```rust
//! use motor_counter::config::ClassifierConfig;
//! use motor_counter::device_type::{classify, DeviceType};
//!
//! let config = ClassifierConfig::default();
//!
//! assert_eq!(classify(2014, &config), DeviceType::None);
//! assert_eq!(classify(290, &config), DeviceType::Ev3MediumMotor);
//! assert_eq!(classify(120, &config), DeviceType::Ev3LargeMotor);
//! assert_eq!(classify(3666, &config), DeviceType::Ev3LargeMotor);
//! assert_eq!(classify(3451, &config), DeviceType::Ev3MediumMotor);
//! ```

use crate::config::ClassifierConfig;

/// Type of device detected on a port.
///
/// Produced fresh by every query; never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceType {
    /// Nothing attached.
    #[default]
    None,
    /// EV3 medium motor.
    Ev3MediumMotor,
    /// EV3 large motor.
    Ev3LargeMotor,
}

impl DeviceType {
    /// Returns true if no device is attached.
    #[inline]
    pub const fn is_none(&self) -> bool {
        matches!(self, DeviceType::None)
    }

    /// Returns the device type as a snake_case string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceType::None => "none",
            DeviceType::Ev3MediumMotor => "ev3_medium_motor",
            DeviceType::Ev3LargeMotor => "ev3_large_motor",
        }
    }
}

/// Classifies one raw analog sample.
///
/// 1. Within `none_tolerance` of `none_nominal` (inclusive): [`DeviceType::None`].
/// 2. Below `none_nominal`: medium if strictly above the low midpoint,
///    otherwise large.
/// 3. Above `none_nominal`: large if strictly above the high midpoint,
///    otherwise medium.
///
/// A sample exactly on a midpoint is not "above" it.
pub fn classify(sample: u16, config: &ClassifierConfig) -> DeviceType {
    if sample.abs_diff(config.none_nominal) <= config.none_tolerance {
        return DeviceType::None;
    }

    if sample < config.none_nominal {
        return if sample > config.threshold_low() {
            DeviceType::Ev3MediumMotor
        } else {
            DeviceType::Ev3LargeMotor
        };
    }

    if sample > config.threshold_high() {
        DeviceType::Ev3LargeMotor
    } else {
        DeviceType::Ev3MediumMotor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    // =========================================================================
    // Absent Band Tests
    // =========================================================================

    #[test]
    fn nominal_is_none() {
        assert_eq!(classify(2014, &config()), DeviceType::None);
    }

    #[test]
    fn tolerance_band_is_inclusive() {
        assert_eq!(classify(2014 - 750, &config()), DeviceType::None);
        assert_eq!(classify(2014 + 750, &config()), DeviceType::None);
    }

    #[test]
    fn just_outside_tolerance_band() {
        // 1263 is in the low half, above the low midpoint
        assert_eq!(classify(2014 - 751, &config()), DeviceType::Ev3MediumMotor);
        // 2765 is in the high half, below the high midpoint
        assert_eq!(classify(2014 + 751, &config()), DeviceType::Ev3MediumMotor);
    }

    // =========================================================================
    // Low Half Tests
    // =========================================================================

    #[test]
    fn low_half_calibration_points() {
        assert_eq!(classify(290, &config()), DeviceType::Ev3MediumMotor);
        assert_eq!(classify(120, &config()), DeviceType::Ev3LargeMotor);
    }

    #[test]
    fn low_midpoint_boundary() {
        assert_eq!(config().threshold_low(), 205);
        assert_eq!(classify(206, &config()), DeviceType::Ev3MediumMotor);
        assert_eq!(classify(205, &config()), DeviceType::Ev3LargeMotor);
        assert_eq!(classify(204, &config()), DeviceType::Ev3LargeMotor);
    }

    #[test]
    fn low_extreme() {
        assert_eq!(classify(0, &config()), DeviceType::Ev3LargeMotor);
    }

    // =========================================================================
    // High Half Tests
    // =========================================================================

    #[test]
    fn high_half_calibration_points() {
        assert_eq!(classify(3451, &config()), DeviceType::Ev3MediumMotor);
        assert_eq!(classify(3666, &config()), DeviceType::Ev3LargeMotor);
    }

    #[test]
    fn high_midpoint_boundary() {
        assert_eq!(config().threshold_high(), 3558);
        assert_eq!(classify(3559, &config()), DeviceType::Ev3LargeMotor);
        assert_eq!(classify(3558, &config()), DeviceType::Ev3MediumMotor);
        assert_eq!(classify(3557, &config()), DeviceType::Ev3MediumMotor);
    }

    #[test]
    fn high_extreme() {
        assert_eq!(classify(4095, &config()), DeviceType::Ev3LargeMotor);
        assert_eq!(classify(u16::MAX, &config()), DeviceType::Ev3LargeMotor);
    }

    // =========================================================================
    // No Filtering
    // =========================================================================

    #[test]
    fn transient_reading_is_taken_at_face_value() {
        // A large motor settling from its low to its high level passes
        // through the medium band; each sample is classified on its own.
        let samples = [120, 900, 2014, 3300, 3666];
        let types: Vec<DeviceType> = samples.iter().map(|&s| classify(s, &config())).collect();
        assert_eq!(
            types,
            vec![
                DeviceType::Ev3LargeMotor,
                DeviceType::Ev3MediumMotor,
                DeviceType::None,
                DeviceType::Ev3MediumMotor,
                DeviceType::Ev3LargeMotor,
            ]
        );
    }

    #[test]
    fn custom_calibration() {
        let config = ClassifierConfig::default()
            .with_none_nominal(1000)
            .with_none_tolerance(100)
            .with_medium(500, 1500)
            .with_large(300, 1700);
        assert_eq!(classify(1050, &config), DeviceType::None);
        assert_eq!(classify(401, &config), DeviceType::Ev3MediumMotor);
        assert_eq!(classify(400, &config), DeviceType::Ev3LargeMotor);
        assert_eq!(classify(1601, &config), DeviceType::Ev3LargeMotor);
        assert_eq!(classify(1600, &config), DeviceType::Ev3MediumMotor);
    }

    // =========================================================================
    // DeviceType Tests
    // =========================================================================

    #[test]
    fn device_type_default() {
        assert_eq!(DeviceType::default(), DeviceType::None);
        assert!(DeviceType::default().is_none());
        assert!(!DeviceType::Ev3LargeMotor.is_none());
    }

    #[test]
    fn device_type_as_str() {
        assert_eq!(DeviceType::None.as_str(), "none");
        assert_eq!(DeviceType::Ev3MediumMotor.as_str(), "ev3_medium_motor");
        assert_eq!(DeviceType::Ev3LargeMotor.as_str(), "ev3_large_motor");
    }
}
