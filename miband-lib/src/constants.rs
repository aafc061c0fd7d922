// Protocol constants for the Mi Band 1A / 1S

use uuid::Uuid;

use crate::transport::Handle;

// --- GATT ---

/// Primary Mi Band service (0xFEE0)
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0000fee0_0000_1000_8000_00805f9b34fb);

pub const DEVICE_INFO_UUID: Uuid = Uuid::from_u128(0x0000ff01_0000_1000_8000_00805f9b34fb);
pub const DEVICE_NAME_UUID: Uuid = Uuid::from_u128(0x0000ff02_0000_1000_8000_00805f9b34fb);
pub const NOTIFICATION_UUID: Uuid = Uuid::from_u128(0x0000ff03_0000_1000_8000_00805f9b34fb);
pub const USER_INFO_UUID: Uuid = Uuid::from_u128(0x0000ff04_0000_1000_8000_00805f9b34fb);
pub const CONTROL_POINT_UUID: Uuid = Uuid::from_u128(0x0000ff05_0000_1000_8000_00805f9b34fb);
pub const REALTIME_STEPS_UUID: Uuid = Uuid::from_u128(0x0000ff06_0000_1000_8000_00805f9b34fb);
/// Activity log notifications (header frames + sample blocks)
pub const ACTIVITY_DATA_UUID: Uuid = Uuid::from_u128(0x0000ff07_0000_1000_8000_00805f9b34fb);
pub const FIRMWARE_DATA_UUID: Uuid = Uuid::from_u128(0x0000ff08_0000_1000_8000_00805f9b34fb);
pub const LE_PARAMS_UUID: Uuid = Uuid::from_u128(0x0000ff09_0000_1000_8000_00805f9b34fb);
pub const DATE_TIME_UUID: Uuid = Uuid::from_u128(0x0000ff0a_0000_1000_8000_00805f9b34fb);
pub const STATISTICS_UUID: Uuid = Uuid::from_u128(0x0000ff0b_0000_1000_8000_00805f9b34fb);
pub const BATTERY_UUID: Uuid = Uuid::from_u128(0x0000ff0c_0000_1000_8000_00805f9b34fb);
pub const TEST_UUID: Uuid = Uuid::from_u128(0x0000ff0d_0000_1000_8000_00805f9b34fb);
pub const SENSOR_UUID: Uuid = Uuid::from_u128(0x0000ff0e_0000_1000_8000_00805f9b34fb);

// --- Attribute handles (firmware 1.0.x) ---

pub const HANDLE_DEVICE_INFO: Handle = Handle(0x0012);
/// CCCD of the notification characteristic
pub const HANDLE_NOTIFICATION_CCCD: Handle = Handle(0x0017);
pub const HANDLE_USER_INFO: Handle = Handle(0x0019);
pub const HANDLE_CONTROL_POINT: Handle = Handle(0x001b);
/// Written with [`SESSION_START_MAGIC`] before asking for activity data
pub const HANDLE_ACTIVITY_SESSION: Handle = Handle(0x001e);
/// CCCD of the activity data characteristic
pub const HANDLE_ACTIVITY_CCCD: Handle = Handle(0x0021);
pub const HANDLE_DATE_TIME: Handle = Handle(0x0028);
pub const HANDLE_BATTERY: Handle = Handle(0x002c);

// --- Command payloads ---

/// "Enable notifications" value written to a CCCD
pub const ENABLE_NOTIFICATIONS: [u8; 2] = [0x01, 0x00];

/// Written to [`HANDLE_ACTIVITY_SESSION`] before a fetch; meaning unknown, required by firmware
pub const SESSION_START_MAGIC: [u8; 2] = [0x01, 0x00];

/// Control point command: start streaming activity data
pub const CMD_FETCH_ACTIVITY: u8 = 0x06;

/// Control point command: acknowledge a transferred activity segment
pub const CMD_ACK_ACTIVITY: u8 = 0x0A;

// --- Frame sizes ---

/// Size of the authentication (user info) packet
pub const AUTH_PACKET_SIZE: usize = 20;

/// Size of the normalized alias field inside the authentication packet
pub const ALIAS_SIZE: usize = 8;

/// Size of an activity header frame
pub const ACTIVITY_HEADER_SIZE: usize = 11;

/// Size of one activity sample block (one minute)
pub const ACTIVITY_BLOCK_SIZE: usize = 3;

/// Size of an acknowledgment message
pub const ACK_SIZE: usize = 9;

/// Header data type for minute-resolution activity data
pub const ACTIVITY_DATA_TYPE: u8 = 1;

/// Size of the battery characteristic payload
pub const BATTERY_INFO_SIZE: usize = 10;

/// Minimum size of the date/time characteristic payload
pub const DATE_TIME_MIN_SIZE: usize = 7;

/// Year offsets on the wire are relative to this year
pub const YEAR_BASE: i32 = 2000;

// --- Feature codes ---

pub const FEATURE_MI_BAND_1A: u8 = 5;
pub const FEATURE_MI_BAND_1S: u8 = 4;
