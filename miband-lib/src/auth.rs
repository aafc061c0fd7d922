//! Authentication (user info) packet for the Mi Band 1A / 1S
//!
//! The band refuses every command until it receives a 20-byte user info
//! packet on the user-info handle. The packet carries the user's body
//! profile, a user id derived from the alias and a checksum bound to the
//! band's own Bluetooth address, so a packet built for one band does not
//! authenticate on another.
//!
//! # Layout
//!
//! | Offset | Size | Field            |
//! |--------|------|------------------|
//! | 0      | 4    | uid (LE)         |
//! | 4      | 1    | gender           |
//! | 5      | 1    | age              |
//! | 6      | 1    | height (cm)      |
//! | 7      | 1    | weight (kg)      |
//! | 8      | 1    | wrist side       |
//! | 9      | 1    | feature code     |
//! | 10     | 1    | appearance code  |
//! | 11     | 8    | normalized alias |
//! | 19     | 1    | magic checksum   |

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;
use zerocopy::byteorder::little_endian::I32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::checksum::crc8;
use crate::constants::{ALIAS_SIZE, AUTH_PACKET_SIZE, FEATURE_MI_BAND_1A};
use crate::error::MiBandError;
use crate::identity::{compute_uid, normalize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Gender {
    Female = 0,
    Male = 1,
    #[default]
    Other = 2,
}

/// Which wrist the band is worn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum WristSide {
    #[default]
    Left = 0,
    Right = 1,
}

/// 6-byte Bluetooth device address of the band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    pub fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Trailing octet, i.e. the address read as an integer masked to 8 bits
    pub fn last_byte(&self) -> u8 {
        self.0[5]
    }
}

/// Accepts `c80f10768f85`, `C8:0F:10:76:8F:85` and `c8-0f-10-76-8f-85`.
impl FromStr for DeviceAddress {
    type Err = MiBandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':' && *c != '-').collect();
        if digits.len() != 12 {
            return Err(MiBandError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 6];
        hex::decode_to_slice(&digits, &mut bytes).map_err(|_| MiBandError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Body profile and identity sent to the band during authentication.
///
/// Numeric fields are not range checked; values are encoded as given.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserProfile {
    address: DeviceAddress,
    gender: Gender,
    age: u8,
    height_cm: u8,
    weight_kg: u8,
    alias: String,
    wrist_side: WristSide,
    feature_code: u8,
    appearance_code: u8,
}

impl UserProfile {
    /// Profile for `alias` on the band at `address`, with neutral body defaults
    pub fn new(address: DeviceAddress, alias: impl Into<String>) -> Self {
        Self {
            address,
            gender: Gender::default(),
            age: 25,
            height_cm: 175,
            weight_kg: 70,
            alias: alias.into(),
            wrist_side: WristSide::default(),
            feature_code: FEATURE_MI_BAND_1A,
            appearance_code: 0,
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = age;
        self
    }

    pub fn with_height_cm(mut self, height_cm: u8) -> Self {
        self.height_cm = height_cm;
        self
    }

    pub fn with_weight_kg(mut self, weight_kg: u8) -> Self {
        self.weight_kg = weight_kg;
        self
    }

    pub fn with_wrist_side(mut self, wrist_side: WristSide) -> Self {
        self.wrist_side = wrist_side;
        self
    }

    pub fn with_feature_code(mut self, feature_code: u8) -> Self {
        self.feature_code = feature_code;
        self
    }

    pub fn with_appearance_code(mut self, appearance_code: u8) -> Self {
        self.appearance_code = appearance_code;
        self
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn height_cm(&self) -> u8 {
        self.height_cm
    }

    pub fn weight_kg(&self) -> u8 {
        self.weight_kg
    }

    pub fn wrist_side(&self) -> WristSide {
        self.wrist_side
    }

    pub fn feature_code(&self) -> u8 {
        self.feature_code
    }

    pub fn appearance_code(&self) -> u8 {
        self.appearance_code
    }
}

/// The 20-byte authentication packet, in wire layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct AuthenticationPacket {
    pub uid: I32,
    pub gender: u8,
    pub age: u8,
    pub height_cm: u8,
    pub weight_kg: u8,
    pub wrist_side: u8,
    pub feature_code: u8,
    pub appearance_code: u8,
    pub alias: [u8; ALIAS_SIZE],
    pub checksum: u8,
}

impl AuthenticationPacket {
    /// Build the packet for `profile`. Deterministic: the same profile always
    /// yields byte-identical output.
    pub fn build(profile: &UserProfile) -> Self {
        let mut packet = AuthenticationPacket {
            uid: I32::new(compute_uid(&profile.alias)),
            gender: profile.gender.into(),
            age: profile.age,
            height_cm: profile.height_cm,
            weight_kg: profile.weight_kg,
            wrist_side: profile.wrist_side.into(),
            feature_code: profile.feature_code,
            appearance_code: profile.appearance_code,
            alias: normalize(&profile.alias),
            checksum: 0,
        };

        // Checksum covers bytes 0..19, then gets bound to the band's address
        let crc = crc8(&packet.as_bytes()[..AUTH_PACKET_SIZE - 1]);
        packet.checksum = crc ^ profile.address.last_byte();
        packet
    }

    pub fn uid(&self) -> i32 {
        self.uid.get()
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn to_bytes(&self) -> [u8; AUTH_PACKET_SIZE] {
        let mut out = [0u8; AUTH_PACKET_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}

impl fmt::Display for AuthenticationPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.as_bytes()))
    }
}
