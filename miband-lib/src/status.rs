//! Date/time and battery characteristics.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{BATTERY_INFO_SIZE, DATE_TIME_MIN_SIZE, YEAR_BASE};
use crate::error::MiBandError;

/// Band clock as stored on the device: year offset, 0-based month, day,
/// hour, minute, second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl DeviceDateTime {
    /// Parse the date/time characteristic. Byte 0 is ignored.
    pub fn parse(data: &[u8]) -> Result<Self, MiBandError> {
        if data.len() < DATE_TIME_MIN_SIZE {
            return Err(MiBandError::InsufficientData {
                expected: DATE_TIME_MIN_SIZE,
                actual: data.len(),
            });
        }
        let stamp: [u8; 6] = data[1..7].try_into()?;
        Ok(Self::from_wire(stamp))
    }

    fn from_wire(stamp: [u8; 6]) -> Self {
        let [year_off, month0, day, hour, minute, second] = stamp;
        Self {
            year: YEAR_BASE + year_off as i32,
            month: month0 as u32 + 1,
            day: day as u32,
            hour: hour as u32,
            minute: minute as u32,
            second: second as u32,
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, self.second)
    }
}

impl fmt::Display for DeviceDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum BatteryStatus {
    Low = 1,
    Charging = 2,
    /// Full, still on the charger
    Full = 3,
    NotCharging = 4,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Battery characteristic (10 bytes)
///
/// Layout:
/// - 0: level in %
/// - 1-6: last charge date (same encoding as the date/time characteristic)
/// - 7-8: charge cycles (little-endian u16)
/// - 9: status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BatteryInfo {
    pub level_percent: u8,
    pub last_charge: DeviceDateTime,
    pub charge_cycles: u16,
    pub status: BatteryStatus,
}

impl BatteryInfo {
    pub fn parse(data: &[u8]) -> Result<Self, MiBandError> {
        if data.len() != BATTERY_INFO_SIZE {
            return Err(MiBandError::InvalidLength {
                expected: BATTERY_INFO_SIZE,
                actual: data.len(),
            });
        }
        let stamp: [u8; 6] = data[1..7].try_into()?;
        Ok(Self {
            level_percent: data[0],
            last_charge: DeviceDateTime::from_wire(stamp),
            charge_cycles: u16::from_le_bytes([data[7], data[8]]),
            status: BatteryStatus::from_primitive(data[9]),
        })
    }
}

impl fmt::Display for BatteryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}% ({}), {} cycles, last charged {}",
            self.level_percent, self.status, self.charge_cycles, self.last_charge
        )
    }
}
