pub mod ack;
pub mod activity;
pub mod auth;
pub mod checksum;
pub mod constants;
pub mod device;
pub mod error;
pub mod identity;
pub mod session;
pub mod status;
pub mod transport;

#[cfg(test)]
mod tests;

// Re-export the main types for easy access
pub use ack::AcknowledgmentMessage;
pub use activity::{ActivityFrameDecoder, ActivityHeader, ActivitySampleBlock, HeaderFrame};
pub use auth::{AuthenticationPacket, DeviceAddress, Gender, UserProfile, WristSide};
pub use checksum::crc8;
pub use device::{DeviceConfig, MiBand};
pub use error::MiBandError;
pub use identity::{compute_uid, hash_code, normalize};
pub use session::{ActivitySample, ActivitySegment, ActivitySession, ReassemblerState, SessionConfig};
pub use status::{BatteryInfo, BatteryStatus, DeviceDateTime};
pub use transport::{Handle, Transport};
