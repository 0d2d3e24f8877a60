//! MPU6050 accelerometer over the FT232H libMPSSE I2C bridge
//!
//! Only the accelerometer is used. Readings are reported in milli-g so that
//! the default scale divisor of 1000 yields g.

use crate::error::{CaptureError, Result};
use crate::ffi::*;
use crate::sensor::{AccelSensor, RawSample};
use std::ptr;
use std::time::Duration;
use tracing::{debug, info};

const MPU6050_ADDRESS: u8 = 0x68;

const REG_SMPLRT_DIV: u8 = 0x19;
const REG_CONFIG: u8 = 0x1A;
const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;
const PWR_MGMT_1_SLEEP: u8 = 0x40;

/// Accelerometer registers never update faster than this
const ACCEL_MAX_RATE_HZ: f32 = 1000.0;
/// Gyro output rate with DLPF_CFG=1, the base for SMPLRT_DIV
const BASE_RATE_HZ: f32 = 1000.0;
/// Wake-up settling time after clearing the sleep bit
const WAKE_DELAY: Duration = Duration::from_millis(100);

/// AFS_SEL setting for a full-scale range in g
fn accel_range_bits(full_scale_g: f32) -> Option<u8> {
    [2.0, 4.0, 8.0, 16.0]
        .iter()
        .position(|&range| range == full_scale_g)
        .map(|bits| bits as u8)
}

/// SMPLRT_DIV for a requested output rate, capped at the accelerometer maximum
fn sample_rate_divider(output_rate_hz: f32) -> u8 {
    let rate = output_rate_hz.clamp(4.0, ACCEL_MAX_RATE_HZ);
    ((BASE_RATE_HZ / rate).round() - 1.0).clamp(0.0, 255.0) as u8
}

/// Convert a raw count to milli-g for a given range setting
fn counts_to_mg(raw: i16, afs_sel: u8) -> i32 {
    let lsb_per_g = 16384i32 >> afs_sel;
    i32::from(raw) * 1000 / lsb_per_g
}

/// MPU6050 accelerometer
pub struct Mpu6050 {
    handle: FT_HANDLE,
    address: u8,
    afs_sel: u8,
}

impl Mpu6050 {
    /// Open the I2C channel and check the device ID
    ///
    /// The sensor is left asleep until [`AccelSensor::enable`].
    pub fn new(channel_index: u32) -> Result<Self> {
        let mut num_channels: DWORD = 0;
        CaptureError::check_status(unsafe { I2C_GetNumChannels(&mut num_channels) })?;

        if num_channels == 0 {
            return Err(CaptureError::NoChannelsFound);
        }
        if channel_index >= num_channels {
            return Err(CaptureError::InvalidChannel(channel_index));
        }

        let mut handle: FT_HANDLE = ptr::null_mut();
        CaptureError::check_status(unsafe { I2C_OpenChannel(channel_index, &mut handle) })?;

        let mut config = ChannelConfig {
            ClockRate: I2C_CLOCK_FAST_MODE_PLUS,
            LatencyTimer: 1,
            Options: 0,
            Pin: 0,
            currentPinState: 0,
        };
        if let Err(e) = CaptureError::check_status(unsafe { I2C_InitChannel(handle, &mut config) }) {
            unsafe { I2C_CloseChannel(handle) };
            return Err(e);
        }

        let mut sensor = Mpu6050 {
            handle,
            address: MPU6050_ADDRESS,
            afs_sel: 0,
        };

        let who_am_i = sensor.read_register(REG_WHO_AM_I)?;
        if who_am_i != WHO_AM_I_VALUE {
            return Err(CaptureError::InvalidDeviceId(who_am_i));
        }

        info!(channel = channel_index, "MPU6050 found");
        Ok(sensor)
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        let buffer = [reg, value];
        let mut transferred: DWORD = 0;

        let options = I2C_TRANSFER_OPTIONS_START_BIT
            | I2C_TRANSFER_OPTIONS_STOP_BIT
            | I2C_TRANSFER_OPTIONS_FAST_TRANSFER_BYTES;

        // With FAST_TRANSFER_BYTES the transferred count is in bits; only status matters
        CaptureError::check_status(unsafe {
            I2C_DeviceWrite(
                self.handle,
                self.address,
                2,
                buffer.as_ptr(),
                &mut transferred,
                options,
            )
        })
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        let [value]: [u8; 1] = self.read_registers(reg)?;
        Ok(value)
    }

    /// Read `N` consecutive registers using a repeated START
    fn read_registers<const N: usize>(&mut self, reg: u8) -> Result<[u8; N]> {
        let reg_buf = [reg];
        let mut transferred: DWORD = 0;

        let options = I2C_TRANSFER_OPTIONS_START_BIT
            | I2C_TRANSFER_OPTIONS_BREAK_ON_NACK
            | I2C_TRANSFER_OPTIONS_FAST_TRANSFER_BYTES;

        CaptureError::check_status(unsafe {
            I2C_DeviceWrite(
                self.handle,
                self.address,
                1,
                reg_buf.as_ptr(),
                &mut transferred,
                options,
            )
        })?;

        let mut data = [0u8; N];
        transferred = 0;

        let options = I2C_TRANSFER_OPTIONS_START_BIT
            | I2C_TRANSFER_OPTIONS_STOP_BIT
            | I2C_TRANSFER_OPTIONS_NACK_LAST_BYTE
            | I2C_TRANSFER_OPTIONS_FAST_TRANSFER_BYTES;

        CaptureError::check_status(unsafe {
            I2C_DeviceRead(
                self.handle,
                self.address,
                N as DWORD,
                data.as_mut_ptr(),
                &mut transferred,
                options,
            )
        })?;

        Ok(data)
    }
}

impl AccelSensor for Mpu6050 {
    fn configure(&mut self, output_rate_hz: f32, full_scale_g: f32) -> Result<()> {
        let afs_sel = accel_range_bits(full_scale_g).ok_or_else(|| {
            CaptureError::InvalidParameter(format!(
                "MPU6050 full scale must be 2, 4, 8 or 16 g, got {}",
                full_scale_g
            ))
        })?;
        let divider = sample_rate_divider(output_rate_hz);

        // DLPF_CFG=1 sets the 1 kHz base rate
        self.write_register(REG_CONFIG, 0x01)?;
        self.write_register(REG_SMPLRT_DIV, divider)?;
        self.write_register(REG_ACCEL_CONFIG, afs_sel << 3)?;
        self.afs_sel = afs_sel;

        let actual_hz = BASE_RATE_HZ / (1.0 + f32::from(divider));
        debug!(requested_hz = output_rate_hz, actual_hz, full_scale_g, "accelerometer configured");
        Ok(())
    }

    fn enable(&mut self) -> Result<()> {
        self.write_register(REG_PWR_MGMT_1, 0x00)?;
        std::thread::sleep(WAKE_DELAY);
        Ok(())
    }

    fn read_axes(&mut self) -> Result<RawSample> {
        let data: [u8; 6] = self.read_registers(REG_ACCEL_XOUT_H)?;

        let x = i16::from_be_bytes([data[0], data[1]]);
        let y = i16::from_be_bytes([data[2], data[3]]);
        let z = i16::from_be_bytes([data[4], data[5]]);

        Ok(RawSample::new(
            counts_to_mg(x, self.afs_sel),
            counts_to_mg(y, self.afs_sel),
            counts_to_mg(z, self.afs_sel),
        ))
    }
}

impl Drop for Mpu6050 {
    fn drop(&mut self) {
        let _ = self.write_register(REG_PWR_MGMT_1, PWR_MGMT_1_SLEEP);

        unsafe {
            I2C_CloseChannel(self.handle);
        }
    }
}
