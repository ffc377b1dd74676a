//! Measurement settings.

/// Device operating mode, control register bits [2:1].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// No measurements
    Halt = 0x00,
    /// Measure once per start command, sleeping in between
    SleepingStep = 0x01,
    /// Measure once per start command
    Step = 0x02,
    /// Free running
    Continuous = 0x03,
}

impl Mode {
    pub(crate) fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0x00 => Mode::Halt,
            0x01 => Mode::SleepingStep,
            0x02 => Mode::Step,
            _ => Mode::Continuous,
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Continuous
    }
}

/// Measurement table selection, control register bits [8:4].
///
/// Only the extended range table changes how temperatures are computed,
/// every other value takes the medical path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementSelect {
    /// Medical accuracy table, cycle-indexed RAM layout
    Medical,
    /// Extended range table, fixed RAM layout
    ExtendedRange,
    /// Any other encoding
    Reserved(u8),
}

impl MeasurementSelect {
    pub(crate) fn from_bits(bits: u16) -> Self {
        match (bits & 0x1F) as u8 {
            0x00 => MeasurementSelect::Medical,
            0x11 => MeasurementSelect::ExtendedRange,
            other => MeasurementSelect::Reserved(other),
        }
    }

    pub(crate) fn bits(&self) -> u16 {
        match self {
            MeasurementSelect::Medical => 0x00,
            MeasurementSelect::ExtendedRange => 0x11,
            MeasurementSelect::Reserved(raw) => (*raw & 0x1F) as u16,
        }
    }
}

impl Default for MeasurementSelect {
    fn default() -> Self {
        MeasurementSelect::Medical
    }
}

/// Refresh rate stored in the EEPROM measurement settings, bits [10:8].
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshRate {
    Hz0_5 = 0,
    Hz1,
    Hz2,
    Hz4,
    Hz8,
    Hz16,
    Hz32,
    Hz64,
}

impl RefreshRate {
    pub(crate) fn from_bits(bits: u16) -> Self {
        match bits & 0b111 {
            0 => RefreshRate::Hz0_5,
            1 => RefreshRate::Hz1,
            2 => RefreshRate::Hz2,
            3 => RefreshRate::Hz4,
            4 => RefreshRate::Hz8,
            5 => RefreshRate::Hz16,
            6 => RefreshRate::Hz32,
            _ => RefreshRate::Hz64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub mode: Mode,
    pub measurement_select: MeasurementSelect,
    /// `None` leaves the EEPROM untouched.
    pub refresh_rate: Option<RefreshRate>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Continuous,
            measurement_select: MeasurementSelect::Medical,
            refresh_rate: None,
        }
    }
}
