//! Ambient and object temperature calculation.
//!
//! Everything here is a pure function of raw RAM words, calibration constants
//! and, for the object temperature, the previous result. The driver owns the
//! [`FeedbackState`] and threads it through [`object_temperature`].

use num_traits::Float;

use super::calibration::CalibrationConstants;
use super::config::MeasurementSelect;
use super::registers::*;

const KELVIN: f64 = 273.15;
/// 2^19
const RATIO_SCALE: f64 = 524288.0;
/// Raw channel words are averaged over 12 samples.
const SAMPLE_DIVIDER: f64 = 12.0;
/// Emissivity is fixed, there is no compensation for grey bodies.
const EMISSIVITY: f64 = 1.0;

/// Previous object temperature and ambient-drive temperature, fed back into
/// the next object calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeedbackState {
    /// TO0, °C
    pub object: f64,
    /// TA0, °C
    pub ambient_drive: f64,
}

impl Default for FeedbackState {
    fn default() -> Self {
        FeedbackState {
            object: 25.0,
            ambient_drive: 25.0,
        }
    }
}

/// Result of one object calculation along with the state for the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObjectReading {
    /// °C
    pub temperature: f64,
    pub feedback: FeedbackState,
}

/// Inputs of the object equation once the mode-specific front end has run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ObjectSamples {
    /// Differential object signal S
    pub signal: f64,
    pub ambient: i16,
    pub reference: i16,
}

/// Which RAM words hold a valid object signal and how to combine them.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ObjectChannel {
    /// RAM_52..RAM_59
    ExtendedRange,
    /// Medical table at cycle position 2, RAM_4 and RAM_5
    MedicalFirst,
    /// Medical table at cycle position 1, RAM_7 and RAM_8
    MedicalSecond,
}

const EXTENDED_SIGNAL: [u16; 6] = [RAM_52, RAM_53, RAM_55, RAM_56, RAM_58, RAM_59];
const MEDICAL_FIRST_SIGNAL: [u16; 2] = [RAM_4, RAM_5];
const MEDICAL_SECOND_SIGNAL: [u16; 2] = [RAM_7, RAM_8];

/// Most signal words any channel reads.
pub const MAX_SIGNAL_WORDS: usize = EXTENDED_SIGNAL.len();

impl ObjectChannel {
    /// Channel for a medical-table cycle position, `None` when the position
    /// holds no complete object sample.
    pub fn for_cycle_position(position: u8) -> Option<Self> {
        match position {
            2 => Some(ObjectChannel::MedicalFirst),
            1 => Some(ObjectChannel::MedicalSecond),
            _ => None,
        }
    }

    /// Signal registers, in the order the signal formula combines them.
    pub fn signal_registers(&self) -> &'static [u16] {
        match self {
            ObjectChannel::ExtendedRange => &EXTENDED_SIGNAL,
            ObjectChannel::MedicalFirst => &MEDICAL_FIRST_SIGNAL,
            ObjectChannel::MedicalSecond => &MEDICAL_SECOND_SIGNAL,
        }
    }

    /// `(ambient, reference)` registers paired with this channel.
    pub fn ambient_registers(&self) -> (u16, u16) {
        match self {
            ObjectChannel::ExtendedRange => ambient_registers(MeasurementSelect::ExtendedRange),
            _ => ambient_registers(MeasurementSelect::Medical),
        }
    }

    /// Combine raw words read from [`ObjectChannel::signal_registers`].
    ///
    /// # Panics
    /// If `raw` is shorter than the channel's register list.
    pub(crate) fn signal(&self, raw: &[i16]) -> f64 {
        match self {
            ObjectChannel::ExtendedRange => {
                let (r52, r53, r55, r56, r58, r59) = (
                    raw[0] as f64,
                    raw[1] as f64,
                    raw[2] as f64,
                    raw[3] as f64,
                    raw[4] as f64,
                    raw[5] as f64,
                );
                (r52 - r53 - r55 + r56) / 2.0 + r58 + r59
            }
            ObjectChannel::MedicalFirst | ObjectChannel::MedicalSecond => (raw[0] as f64 + raw[1] as f64) / 2.0,
        }
    }
}

/// `(ambient, reference)` registers for a measurement table.
pub fn ambient_registers(select: MeasurementSelect) -> (u16, u16) {
    match select {
        MeasurementSelect::ExtendedRange => (RAM_54, RAM_57),
        _ => (RAM_6, RAM_9),
    }
}

/// AMB, the ambient sensor ratio scaled to 2^19.
fn ambient_ratio(calibration: &CalibrationConstants, ambient: i16, reference: i16) -> f64 {
    let ambient = ambient as f64 / SAMPLE_DIVIDER;
    let vrta = reference as f64 + calibration.gb * ambient;
    trace!("VRTA = {}", vrta);
    ambient / vrta * RATIO_SCALE
}

/// Ambient temperature in °C. Does not touch the feedback state.
pub fn ambient_temperature(calibration: &CalibrationConstants, ambient: i16, reference: i16) -> f64 {
    let amb = ambient_ratio(calibration, ambient, reference);
    let diff = amb - calibration.p_r;
    let temperature = calibration.p_o + diff / calibration.p_g + calibration.p_t * diff * diff;
    debug!("ambient: AMB = {}, T = {}", amb, temperature);
    temperature
}

/// Ambient-drive temperature TADUT in °C.
pub fn ambient_drive_temperature(calibration: &CalibrationConstants, ambient: i16, reference: i16) -> f64 {
    let amb = ambient_ratio(calibration, ambient, reference);
    (amb - calibration.eb) / calibration.ea + 25.0
}

/// Object temperature in °C plus the feedback state for the next call.
///
/// A NaN result hands back `previous` unchanged as the next feedback state.
///
/// The object-drive temperature in the non-linearity term is approximated by
/// the ambient-drive temperature, no iteration is done.
pub fn object_temperature(
    calibration: &CalibrationConstants,
    samples: &ObjectSamples,
    previous: FeedbackState,
) -> ObjectReading {
    let ambient = samples.ambient as f64 / SAMPLE_DIVIDER;
    let vrto = samples.reference as f64 + calibration.ka * ambient;
    let sto = (samples.signal / SAMPLE_DIVIDER) / vrto * RATIO_SCALE;

    let tadut = ambient_drive_temperature(calibration, samples.ambient, samples.reference);
    let tak = tadut + KELVIN;
    let todut = tadut;

    let denominator = EMISSIVITY
        * calibration.fa
        * calibration.ha
        * (1.0 + calibration.ga * (todut - previous.object) + calibration.fb * (tadut - previous.ambient_drive));
    let to_k4 = sto / denominator + Float::powi(tak, 4);
    let temperature = Float::powf(to_k4, 0.25) - KELVIN - calibration.hb;

    debug!(
        "object: S = {}, VRTO = {}, STO = {}, TADUT = {}, denominator = {}, T = {}",
        samples.signal,
        vrto,
        sto,
        tadut,
        denominator,
        temperature
    );

    let feedback = if temperature.is_nan() {
        warn!("object result is NaN, keeping previous feedback");
        previous
    } else {
        FeedbackState {
            object: temperature,
            ambient_drive: tadut,
        }
    };

    ObjectReading { temperature, feedback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    // ambient 1200 / 12 = 100, reference 16384, Gb = 0  =>  AMB = 3200
    const AMBIENT: i16 = 1200;
    const REFERENCE: i16 = 16384;
    const AMB: f64 = 3200.0;

    fn calibration() -> CalibrationConstants {
        CalibrationConstants {
            p_r: 3100.0,
            p_g: 10.0,
            p_t: 0.0,
            p_o: 20.0,
            ea: 100.0,
            eb: AMB,
            fa: 1.0,
            ha: 1.0,
            ..CalibrationConstants::default()
        }
    }

    fn samples(signal: f64) -> ObjectSamples {
        ObjectSamples {
            signal,
            ambient: AMBIENT,
            reference: REFERENCE,
        }
    }

    #[test]
    fn ambient_polynomial() {
        let mut c = calibration();
        assert_eq!(ambient_temperature(&c, AMBIENT, REFERENCE), 30.0);

        c.p_t = 0.001;
        // 20 + 100 / 10 + 0.001 * 100^2
        assert!(approx_eq!(f64, ambient_temperature(&c, AMBIENT, REFERENCE), 40.0, epsilon = 1e-9));

        c.p_r = AMB;
        assert_eq!(ambient_temperature(&c, AMBIENT, REFERENCE), c.p_o);
    }

    #[test]
    fn ambient_gain_scales_reference() {
        let mut c = calibration();
        c.gb = 1.0;
        // VRTA = 16384 + 100, AMB = 100 / 16484 * 2^19
        let amb = 100.0 / 16484.0 * RATIO_SCALE;
        let expected = c.p_o + (amb - c.p_r) / c.p_g;
        assert!(approx_eq!(f64, ambient_temperature(&c, AMBIENT, REFERENCE), expected, epsilon = 1e-9));
    }

    #[test]
    fn ambient_is_idempotent() {
        let c = calibration();
        let first = ambient_temperature(&c, -321, 12000);
        let second = ambient_temperature(&c, -321, 12000);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn ambient_drive_offsets_from_25() {
        let mut c = calibration();
        assert_eq!(ambient_drive_temperature(&c, AMBIENT, REFERENCE), 25.0);
        c.eb = AMB - 500.0;
        assert_eq!(ambient_drive_temperature(&c, AMBIENT, REFERENCE), 30.0);
    }

    #[test]
    fn zero_signal_reads_ambient_drive() {
        let c = calibration();
        let reading = object_temperature(&c, &samples(0.0), FeedbackState::default());
        assert!(approx_eq!(f64, reading.temperature, 25.0, epsilon = 1e-9));
        assert_eq!(reading.feedback.ambient_drive, 25.0);
    }

    #[test]
    fn object_equation() {
        let mut c = calibration();
        c.ka = 1.0;
        c.hb = 0.5;
        let s = 6000.0;
        let reading = object_temperature(&c, &samples(s), FeedbackState::default());

        let vrto = REFERENCE as f64 + 100.0;
        let sto = (s / 12.0) / vrto * RATIO_SCALE;
        let tak: f64 = 25.0 + 273.15;
        let expected = (sto + tak.powi(4)).powf(0.25) - 273.15 - 0.5;
        assert!(approx_eq!(f64, reading.temperature, expected, epsilon = 1e-9));
    }

    #[test]
    fn feedback_carries_result_and_ambient_drive() {
        let mut c = calibration();
        c.eb = AMB - 300.0;
        c.ga = 0.01;
        c.fb = 0.02;
        let first = object_temperature(&c, &samples(9000.0), FeedbackState::default());
        assert_eq!(first.feedback.object, first.temperature);
        assert_eq!(first.feedback.ambient_drive, 28.0);

        let second = object_temperature(&c, &samples(9000.0), first.feedback);
        assert_ne!(first.temperature, second.temperature);
        assert_eq!(second.feedback.ambient_drive, 28.0);
    }

    #[test]
    fn feedback_terms_enter_denominator() {
        let mut c = calibration();
        c.ga = 0.01;
        c.fb = 0.02;
        let s = 9000.0;
        let previous = FeedbackState {
            object: 35.0,
            ambient_drive: 20.0,
        };
        let reading = object_temperature(&c, &samples(s), previous);

        let sto = (s / 12.0) / REFERENCE as f64 * RATIO_SCALE;
        let denominator = 1.0 + 0.01 * (25.0 - 35.0) + 0.02 * (25.0 - 20.0);
        let tak: f64 = 298.15;
        let expected = (sto / denominator + tak.powi(4)).powf(0.25) - 273.15;
        assert!(approx_eq!(f64, reading.temperature, expected, epsilon = 1e-9));
    }

    #[test]
    fn stable_feedback_is_a_fixed_point() {
        let c = calibration();
        // TADUT = 25 and S = 0 give TO = 25, matching the seed
        let first = object_temperature(&c, &samples(0.0), FeedbackState::default());
        let second = object_temperature(&c, &samples(0.0), first.feedback);
        assert!(approx_eq!(f64, first.temperature, second.temperature, epsilon = 1e-9));
    }

    #[test]
    fn nan_result_keeps_previous_feedback() {
        let mut c = calibration();
        c.fa = -1e-6;
        let previous = FeedbackState {
            object: 31.0,
            ambient_drive: 24.0,
        };
        let reading = object_temperature(&c, &samples(30000.0), previous);
        assert!(reading.temperature.is_nan());
        assert_eq!(reading.feedback, previous);

        // a later sane reading starts from the untouched state
        let sane = calibration();
        let next = object_temperature(&sane, &samples(30000.0), reading.feedback);
        assert!(!next.temperature.is_nan());
        assert_eq!(next, object_temperature(&sane, &samples(30000.0), previous));
    }

    #[test]
    fn cycle_position_selects_medical_words() {
        assert_eq!(ObjectChannel::for_cycle_position(2), Some(ObjectChannel::MedicalFirst));
        assert_eq!(ObjectChannel::for_cycle_position(1), Some(ObjectChannel::MedicalSecond));
        for position in [0u8, 3, 17, 31].iter() {
            assert_eq!(ObjectChannel::for_cycle_position(*position), None);
        }
        assert_eq!(ObjectChannel::MedicalFirst.signal_registers(), &[RAM_4, RAM_5]);
        assert_eq!(ObjectChannel::MedicalSecond.signal_registers(), &[RAM_7, RAM_8]);
        assert_eq!(ObjectChannel::MedicalFirst.ambient_registers(), (RAM_6, RAM_9));
        assert_eq!(ObjectChannel::ExtendedRange.ambient_registers(), (RAM_54, RAM_57));
    }

    #[test]
    fn signal_formulas() {
        assert_eq!(ObjectChannel::MedicalFirst.signal(&[100, -51]), 24.5);
        assert_eq!(ObjectChannel::MedicalSecond.signal(&[i16::MAX, i16::MAX]), i16::MAX as f64);
        // (10 - 4 - 2 + 8) / 2 + 3 + 5
        assert_eq!(ObjectChannel::ExtendedRange.signal(&[10, 4, 2, 8, 3, 5]), 14.0);
    }

    #[test]
    fn ambient_registers_follow_table() {
        assert_eq!(ambient_registers(MeasurementSelect::Medical), (RAM_6, RAM_9));
        assert_eq!(ambient_registers(MeasurementSelect::ExtendedRange), (RAM_54, RAM_57));
        assert_eq!(ambient_registers(MeasurementSelect::Reserved(0x0D)), (RAM_6, RAM_9));
    }
}
