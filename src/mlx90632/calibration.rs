//! Factory calibration constants.
//!
//! The EEPROM holds 17 signed 32-bit words (each split over an LSW/MSW register
//! pair) and 5 signed 16-bit words. Every word is a fixed-point value with its
//! own power-of-two scale.

use num_traits::Float;

/// Calibration words as read from EEPROM, before scaling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawCalibration {
    pub p_r: u32,
    pub p_g: u32,
    pub p_t: u32,
    pub p_o: u32,
    pub aa: u32,
    pub ab: u32,
    pub ba: u32,
    pub bb: u32,
    pub ca: u32,
    pub cb: u32,
    pub da: u32,
    pub db: u32,
    pub ea: u32,
    pub eb: u32,
    pub fa: u32,
    pub fb: u32,
    pub ga: u32,
    pub gb: u16,
    pub ka: u16,
    pub kb: u16,
    pub ha: u16,
    pub hb: u16,
}

/// Calibration constants in physical scale.
///
/// Decoded once after the device is identified and owned by a single driver
/// instance afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConstants {
    pub p_r: f64,
    pub p_g: f64,
    pub p_t: f64,
    pub p_o: f64,
    pub aa: f64,
    pub ab: f64,
    pub ba: f64,
    pub bb: f64,
    pub ca: f64,
    pub cb: f64,
    pub da: f64,
    pub db: f64,
    pub ea: f64,
    pub eb: f64,
    pub fa: f64,
    pub fb: f64,
    pub ga: f64,
    pub gb: f64,
    pub ka: f64,
    /// Kept as the raw signed word, it has no scale.
    pub kb: i16,
    pub ha: f64,
    pub hb: f64,
}

impl CalibrationConstants {
    /// Scale raw EEPROM words into physical constants.
    pub fn decode(raw: &RawCalibration) -> Self {
        CalibrationConstants {
            p_r: scale_i32(raw.p_r, -8),
            p_g: scale_i32(raw.p_g, -20),
            p_t: scale_i32(raw.p_t, -44),
            p_o: scale_i32(raw.p_o, -8),
            aa: scale_i32(raw.aa, -16),
            ab: scale_i32(raw.ab, -8),
            ba: scale_i32(raw.ba, -16),
            bb: scale_i32(raw.bb, -8),
            ca: scale_i32(raw.ca, -16),
            cb: scale_i32(raw.cb, -8),
            da: scale_i32(raw.da, -16),
            db: scale_i32(raw.db, -8),
            ea: scale_i32(raw.ea, -16),
            eb: scale_i32(raw.eb, -8),
            fa: scale_i32(raw.fa, -46),
            fb: scale_i32(raw.fb, -36),
            ga: scale_i32(raw.ga, -36),
            gb: scale_i16(raw.gb, -10),
            ka: scale_i16(raw.ka, -10),
            kb: raw.kb as i16,
            ha: scale_i16(raw.ha, -14),
            hb: scale_i16(raw.hb, -10),
        }
    }
}

/// Join an LSW/MSW register pair into one 32-bit word.
#[inline]
pub(crate) fn join_words(lsw: u16, msw: u16) -> u32 {
    ((msw as u32) << 16) | lsw as u32
}

#[inline]
fn scale_i32(raw: u32, exponent: i32) -> f64 {
    raw as i32 as f64 * Float::powi(2.0f64, exponent)
}

#[inline]
fn scale_i16(raw: u16, exponent: i32) -> f64 {
    raw as i16 as f64 * Float::powi(2.0f64, exponent)
}
