//! MLX90632 register map.
//!
//! Addresses are 16-bit and every register holds one 16-bit word, both sent
//! MSB first on the bus.

pub const MLX90632_I2C_ADDR_PRIMARY: u8 = 0x3A;
pub const MLX90632_I2C_ADDR_SECONDARY: u8 = 0x3B;

// EEPROM
pub const EE_ID0: u16 = 0x2405;
pub const EE_ID1: u16 = 0x2406;
pub const EE_ID2: u16 = 0x2407;
pub const EE_PRODUCT_CODE: u16 = 0x2409;
pub const EE_VERSION: u16 = 0x240B;

// 32-bit constants, LSW at the listed address and MSW right after it
pub const EE_P_R: u16 = 0x240C;
pub const EE_P_G: u16 = 0x240E;
pub const EE_P_T: u16 = 0x2410;
pub const EE_P_O: u16 = 0x2412;
pub const EE_AA: u16 = 0x2414;
pub const EE_AB: u16 = 0x2416;
pub const EE_BA: u16 = 0x2418;
pub const EE_BB: u16 = 0x241A;
pub const EE_CA: u16 = 0x241C;
pub const EE_CB: u16 = 0x241E;
pub const EE_DA: u16 = 0x2420;
pub const EE_DB: u16 = 0x2422;
pub const EE_EA: u16 = 0x2424;
pub const EE_EB: u16 = 0x2426;
pub const EE_FA: u16 = 0x2428;
pub const EE_FB: u16 = 0x242A;
pub const EE_GA: u16 = 0x242C;

// 16-bit constants
pub const EE_GB: u16 = 0x242E;
pub const EE_KA: u16 = 0x242F;
pub const EE_KB: u16 = 0x2430;
pub const EE_HA: u16 = 0x2481;
pub const EE_HB: u16 = 0x2482;

pub const EE_MEAS_1: u16 = 0x24E1;
pub const EE_MEAS_2: u16 = 0x24E2;

pub const REG_CONTROL: u16 = 0x3001;
pub const REG_STATUS: u16 = 0x3FFF;

// RAM
pub const RAM_4: u16 = 0x4003;
pub const RAM_5: u16 = 0x4004;
pub const RAM_6: u16 = 0x4005;
pub const RAM_7: u16 = 0x4006;
pub const RAM_8: u16 = 0x4007;
pub const RAM_9: u16 = 0x4008;
pub const RAM_52: u16 = 0x4033;
pub const RAM_53: u16 = 0x4034;
pub const RAM_54: u16 = 0x4035;
pub const RAM_55: u16 = 0x4036;
pub const RAM_56: u16 = 0x4037;
pub const RAM_57: u16 = 0x4038;
pub const RAM_58: u16 = 0x4039;
pub const RAM_59: u16 = 0x403A;

/// Bitfield inside a 16-bit register, as `(width, offset)`.
pub type Field = (u8, u8);

pub const CONTROL_SOC: Field = (1, 3);
pub const CONTROL_SOB: Field = (1, 11);
pub const CONTROL_MODE: Field = (2, 1);
pub const CONTROL_MEAS_SELECT: Field = (5, 4);

pub const STATUS_NEW_DATA: Field = (1, 0);
pub const STATUS_CYCLE_POSITION: Field = (5, 2);
pub const STATUS_EEPROM_BUSY: Field = (1, 9);
pub const STATUS_DEVICE_BUSY: Field = (1, 10);

pub const MEAS_REFRESH_RATE: Field = (3, 8);

/// Addressed reset: write 0x0006 to 0x3005.
pub const RESET_CMD: [u8; 4] = [0x30, 0x05, 0x00, 0x06];
pub const RESET_DELAY_US: u32 = 150;

/// Product code values that mean nobody answered.
pub const PRODUCT_CODE_ABSENT: [u16; 2] = [0x0000, 0xFFFF];
