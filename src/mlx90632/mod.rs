//! MLX90632 far-infrared thermometer driver.
//!
//! Two measurement tables are supported: the medical table, where the object
//! signal moves between RAM words with the cycle position, and the extended
//! range table with a fixed RAM layout.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

pub mod calibration;
pub mod config;
pub mod engine;
pub mod registers;

use self::calibration::{join_words, CalibrationConstants, RawCalibration};
use self::config::{Config, MeasurementSelect, Mode, RefreshRate};
use self::engine::{FeedbackState, ObjectChannel, ObjectSamples, MAX_SIGNAL_WORDS};
use self::registers::*;

macro_rules! field_mask {
    ($width:expr) => {
        ((1u32 << $width) - 1) as u16
    };
}

macro_rules! set_bits {
    ($reg_data:expr, $width:expr, $pos:expr, $data:expr) => {
        ($reg_data & !(field_mask!($width) << $pos)) | (($data & field_mask!($width)) << $pos)
    };
}

/// MLX90632 errors
#[derive(Debug)]
pub enum Error<E> {
    /// I²C bus error
    I2c(E),
    /// Product code reads as all zeros or all ones, nothing answered
    NoDevice,
    /// No calibration data is available (probably forgot to call or check MLX90632::init for failure)
    NoCalibrationData,
}

/// Representation of an MLX90632
#[derive(Debug)]
pub struct MLX90632<I2C> {
    /// concrete I²C device implementation
    i2c: I2C,
    /// I²C device address
    address: u8,
    /// calibration data
    calibration: Option<CalibrationConstants>,
    /// previous object result, fed into the next one
    feedback: FeedbackState,
}

impl<I2C> MLX90632<I2C>
where
    I2C: I2c,
{
    /// Create a new MLX90632 struct using the primary I²C address `0x3A`
    pub fn new_primary(i2c: I2C) -> Self {
        Self::new(i2c, MLX90632_I2C_ADDR_PRIMARY)
    }

    /// Create a new MLX90632 struct using the secondary I²C address `0x3B`
    pub fn new_secondary(i2c: I2C) -> Self {
        Self::new(i2c, MLX90632_I2C_ADDR_SECONDARY)
    }

    /// Create a new MLX90632 struct using a custom I²C address
    pub fn new(i2c: I2C, address: u8) -> Self {
        MLX90632 {
            i2c,
            address,
            calibration: None,
            feedback: FeedbackState::default(),
        }
    }

    /// Checks that a device answers and loads its calibration constants.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.verify_product_code()?;
        self.read_calibration()?;
        Ok(())
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn verify_product_code(&mut self) -> Result<(), Error<I2C::Error>> {
        let code = self.product_code()?;
        if PRODUCT_CODE_ABSENT.contains(&code) {
            warn!("no device at {=u8:#x}, product code {=u16:#x}", self.address, code);
            Err(Error::NoDevice)
        } else {
            debug!("product code {=u16:#x}", code);
            Ok(())
        }
    }

    /// Applies mode and measurement table, and the refresh rate if one is given.
    pub fn configure(&mut self, config: Config) -> Result<(), Error<I2C::Error>> {
        self.set_measurement_select(config.measurement_select)?;
        self.set_mode(config.mode)?;
        if let Some(rate) = config.refresh_rate {
            self.set_refresh_rate(rate)?;
        }
        Ok(())
    }

    /// Addressed reset. The device needs 150us before it answers again.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address, &RESET_CMD).map_err(Error::I2c)?;
        delay.delay_us(RESET_DELAY_US);
        Ok(())
    }

    /// 48-bit chip ID
    pub fn product_id(&mut self) -> Result<u64, Error<I2C::Error>> {
        let id0 = self.read_register(EE_ID0)? as u64;
        let id1 = self.read_register(EE_ID1)? as u64;
        let id2 = self.read_register(EE_ID2)? as u64;
        Ok((id2 << 32) | (id1 << 16) | id0)
    }

    pub fn product_code(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_register(EE_PRODUCT_CODE)
    }

    pub fn eeprom_version(&mut self) -> Result<u16, Error<I2C::Error>> {
        self.read_register(EE_VERSION)
    }

    /// Start of conversion, one measurement in step modes.
    pub fn start_single_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_bits(REG_CONTROL, CONTROL_SOC, 1)
    }

    /// Start of burst, a whole measurement table in step modes.
    pub fn start_full_measurement(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_bits(REG_CONTROL, CONTROL_SOB, 1)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<I2C::Error>> {
        self.write_bits(REG_CONTROL, CONTROL_MODE, mode as u16)
    }

    pub fn mode(&mut self) -> Result<Mode, Error<I2C::Error>> {
        Ok(Mode::from_bits(self.read_bits(REG_CONTROL, CONTROL_MODE)?))
    }

    pub fn set_measurement_select(&mut self, select: MeasurementSelect) -> Result<(), Error<I2C::Error>> {
        self.write_bits(REG_CONTROL, CONTROL_MEAS_SELECT, select.bits())
    }

    pub fn measurement_select(&mut self) -> Result<MeasurementSelect, Error<I2C::Error>> {
        Ok(MeasurementSelect::from_bits(
            self.read_bits(REG_CONTROL, CONTROL_MEAS_SELECT)?,
        ))
    }

    pub fn is_busy(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_bits(REG_STATUS, STATUS_DEVICE_BUSY)? != 0)
    }

    pub fn is_eeprom_busy(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_bits(REG_STATUS, STATUS_EEPROM_BUSY)? != 0)
    }

    /// Position in the measurement table, 0..=31.
    pub fn cycle_position(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.read_bits(REG_STATUS, STATUS_CYCLE_POSITION)? as u8)
    }

    pub fn is_new_data(&mut self) -> Result<bool, Error<I2C::Error>> {
        Ok(self.read_bits(REG_STATUS, STATUS_NEW_DATA)? != 0)
    }

    pub fn reset_new_data(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_bits(REG_STATUS, STATUS_NEW_DATA, 0)
    }

    /// Writes the rate to both EEPROM measurement settings.
    pub fn set_refresh_rate(&mut self, rate: RefreshRate) -> Result<(), Error<I2C::Error>> {
        self.write_bits(EE_MEAS_1, MEAS_REFRESH_RATE, rate as u16)?;
        self.write_bits(EE_MEAS_2, MEAS_REFRESH_RATE, rate as u16)
    }

    pub fn refresh_rate(&mut self) -> Result<RefreshRate, Error<I2C::Error>> {
        Ok(RefreshRate::from_bits(self.read_bits(EE_MEAS_1, MEAS_REFRESH_RATE)?))
    }

    /// Reads and decodes the EEPROM calibration constants.
    pub fn read_calibration(&mut self) -> Result<CalibrationConstants, Error<I2C::Error>> {
        let raw = RawCalibration {
            p_r: self.read_register_u32(EE_P_R)?,
            p_g: self.read_register_u32(EE_P_G)?,
            p_t: self.read_register_u32(EE_P_T)?,
            p_o: self.read_register_u32(EE_P_O)?,
            aa: self.read_register_u32(EE_AA)?,
            ab: self.read_register_u32(EE_AB)?,
            ba: self.read_register_u32(EE_BA)?,
            bb: self.read_register_u32(EE_BB)?,
            ca: self.read_register_u32(EE_CA)?,
            cb: self.read_register_u32(EE_CB)?,
            da: self.read_register_u32(EE_DA)?,
            db: self.read_register_u32(EE_DB)?,
            ea: self.read_register_u32(EE_EA)?,
            eb: self.read_register_u32(EE_EB)?,
            fa: self.read_register_u32(EE_FA)?,
            fb: self.read_register_u32(EE_FB)?,
            ga: self.read_register_u32(EE_GA)?,
            gb: self.read_register(EE_GB)?,
            ka: self.read_register(EE_KA)?,
            kb: self.read_register(EE_KB)?,
            ha: self.read_register(EE_HA)?,
            hb: self.read_register(EE_HB)?,
        };
        let calibration = CalibrationConstants::decode(&raw);
        debug!("calibration: {}", calibration);
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    pub fn calibration(&self) -> Option<&CalibrationConstants> {
        self.calibration.as_ref()
    }

    /// State the next object calculation starts from.
    pub fn feedback(&self) -> FeedbackState {
        self.feedback
    }

    pub fn set_feedback(&mut self, feedback: FeedbackState) {
        self.feedback = feedback;
    }

    /// Ambient temperature in degrees celsius
    pub fn ambient_temperature(&mut self) -> Result<f64, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::NoCalibrationData)?;
        let (ambient_reg, reference_reg) = engine::ambient_registers(self.measurement_select()?);
        let ambient = self.read_register_i16(ambient_reg)?;
        let reference = self.read_register_i16(reference_reg)?;
        Ok(engine::ambient_temperature(&calibration, ambient, reference))
    }

    /// Object temperature in degrees celsius.
    ///
    /// Returns NaN when the medical table is selected and the current cycle
    /// position holds no complete object sample; the feedback state is left
    /// alone in that case.
    pub fn object_temperature(&mut self) -> Result<f64, Error<I2C::Error>> {
        let calibration = self.calibration.ok_or(Error::NoCalibrationData)?;
        let channel = match self.measurement_select()? {
            MeasurementSelect::ExtendedRange => ObjectChannel::ExtendedRange,
            _ => {
                let position = self.cycle_position()?;
                match ObjectChannel::for_cycle_position(position) {
                    Some(channel) => channel,
                    None => {
                        warn!("no object sample at cycle position {=u8}", position);
                        return Ok(f64::NAN);
                    }
                }
            }
        };

        let registers = channel.signal_registers();
        let mut raw = [0i16; MAX_SIGNAL_WORDS];
        let raw = &mut raw[..registers.len()];
        for (word, &register) in raw.iter_mut().zip(registers) {
            *word = self.read_register_i16(register)?;
        }
        let (ambient_reg, reference_reg) = channel.ambient_registers();
        let samples = ObjectSamples {
            signal: channel.signal(raw),
            ambient: self.read_register_i16(ambient_reg)?,
            reference: self.read_register_i16(reference_reg)?,
        };
        trace!("{} samples: {}", channel, samples);

        let reading = engine::object_temperature(&calibration, &samples, self.feedback);
        self.feedback = reading.feedback;
        Ok(reading.temperature)
    }

    fn read_register(&mut self, register: u16) -> Result<u16, Error<I2C::Error>> {
        let mut data: [u8; 2] = [0; 2];
        self.i2c
            .write_read(self.address, &register.to_be_bytes(), &mut data)
            .map_err(Error::I2c)?;
        Ok(u16::from_be_bytes(data))
    }

    fn read_register_i16(&mut self, register: u16) -> Result<i16, Error<I2C::Error>> {
        Ok(self.read_register(register)? as i16)
    }

    /// LSW at `register`, MSW at `register + 1`.
    fn read_register_u32(&mut self, register: u16) -> Result<u32, Error<I2C::Error>> {
        let lsw = self.read_register(register)?;
        let msw = self.read_register(register + 1)?;
        Ok(join_words(lsw, msw))
    }

    fn write_register(&mut self, register: u16, payload: u16) -> Result<(), Error<I2C::Error>> {
        let [reg_msb, reg_lsb] = register.to_be_bytes();
        let [msb, lsb] = payload.to_be_bytes();
        self.i2c
            .write(self.address, &[reg_msb, reg_lsb, msb, lsb])
            .map_err(Error::I2c)
    }

    fn read_bits(&mut self, register: u16, (width, pos): Field) -> Result<u16, Error<I2C::Error>> {
        let data = self.read_register(register)?;
        Ok((data >> pos) & field_mask!(width))
    }

    fn write_bits(&mut self, register: u16, (width, pos): Field, value: u16) -> Result<(), Error<I2C::Error>> {
        let data = self.read_register(register)?;
        let data = set_bits!(data, width, pos, value);
        self.write_register(register, data)
    }
}
