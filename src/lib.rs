//! Platform-agnostic driver for the Melexis MLX90632 far-infrared thermometer.
//!
//! The sensor is read over I²C with 16-bit register addresses. Factory
//! calibration constants are loaded from EEPROM once, after which the ambient
//! and object temperatures are computed from the raw RAM samples.
//!
//! ```ignore
//! let mut sensor = MLX90632::new_primary(i2c);
//! sensor.init()?;
//! sensor.start_single_measurement()?;
//! while !sensor.is_new_data()? {}
//! let ambient = sensor.ambient_temperature()?;
//! let object = sensor.object_temperature()?;
//! sensor.reset_new_data()?;
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod mlx90632;

pub use crate::mlx90632::calibration::{CalibrationConstants, RawCalibration};
pub use crate::mlx90632::config::{Config, MeasurementSelect, Mode, RefreshRate};
pub use crate::mlx90632::engine::{FeedbackState, ObjectChannel, ObjectReading, ObjectSamples};
pub use crate::mlx90632::{Error, MLX90632};
