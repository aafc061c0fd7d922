use std::time::Duration;

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::auth::{AuthenticationPacket, UserProfile};
use crate::constants::*;
use crate::error::MiBandError;
use crate::session::{ActivitySession, SessionConfig};
use crate::status::{BatteryInfo, DeviceDateTime};
use crate::transport::Transport;

// Default wait for the next activity notification
const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Driver settings
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// How long to wait for each activity fragment before giving up on the transfer
    pub notification_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }
}

/// A connected Mi Band 1A / 1S
pub struct MiBand<T: Transport> {
    transport: T,
    config: DeviceConfig,
}

impl<T: Transport> MiBand<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DeviceConfig::default())
    }

    pub fn with_config(transport: T, config: DeviceConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Enable notifications on the notification and activity characteristics
    pub async fn initialize(&mut self) -> Result<(), MiBandError> {
        info!("Initializing band");
        self.transport
            .write(HANDLE_NOTIFICATION_CCCD, &ENABLE_NOTIFICATIONS)
            .await?;
        self.transport.write(HANDLE_ACTIVITY_CCCD, &ENABLE_NOTIFICATIONS).await
    }

    /// Raw device information block
    pub async fn read_device_info(&mut self) -> Result<Bytes, MiBandError> {
        let data = self.transport.read(HANDLE_DEVICE_INFO).await?;
        debug!(info = %hex::encode(&data), "Read device information");
        Ok(data)
    }

    pub async fn authenticate(&mut self, profile: &UserProfile) -> Result<(), MiBandError> {
        let packet = AuthenticationPacket::build(profile);
        info!(address = %profile.address(), uid = packet.uid(), "Authenticating");
        debug!(packet = %packet, "User info packet");
        self.transport.write(HANDLE_USER_INFO, &packet.to_bytes()).await
    }

    pub async fn read_date_time(&mut self) -> Result<DeviceDateTime, MiBandError> {
        let data = self.transport.read(HANDLE_DATE_TIME).await?;
        DeviceDateTime::parse(&data)
    }

    pub async fn read_battery(&mut self) -> Result<BatteryInfo, MiBandError> {
        let data = self.transport.read(HANDLE_BATTERY).await?;
        BatteryInfo::parse(&data)
    }

    /// Download the activity log and acknowledge it.
    ///
    /// Runs [`MiBand::receive_activity`] then [`MiBand::send_acknowledgments`].
    /// If an acknowledgment write fails the session comes back inside
    /// [`MiBandError::AcknowledgmentFailed`] with the unsent acknowledgments
    /// still queued, so nothing decoded is lost.
    pub async fn fetch_activity(&mut self, session_config: SessionConfig) -> Result<ActivitySession, MiBandError> {
        let mut session = self.receive_activity(session_config).await?;

        let sent = match self.send_acknowledgments(&mut session).await {
            Ok(sent) => sent,
            Err(source) => {
                warn!(
                    unsent = session.pending_acknowledgments().len(),
                    "Acknowledgment write failed, returning session"
                );
                return Err(MiBandError::AcknowledgmentFailed {
                    session: Box::new(session),
                    source: Box::new(source),
                });
            }
        };

        info!(
            total_steps = session.total_steps(),
            segments = session.segments().len(),
            acknowledgments = sent,
            "Activity transfer finished"
        );
        Ok(session)
    }

    /// Subscribe to activity notifications, ask the band to start streaming
    /// and feed every fragment to a fresh [`ActivitySession`] until the final
    /// header arrives. Nothing is acknowledged.
    pub async fn receive_activity(&mut self, session_config: SessionConfig) -> Result<ActivitySession, MiBandError> {
        let mut notifications = self.transport.subscribe(ACTIVITY_DATA_UUID).await?;
        let mut session = ActivitySession::new(session_config);

        self.transport
            .write(HANDLE_ACTIVITY_SESSION, &SESSION_START_MAGIC)
            .await?;
        self.transport
            .write(HANDLE_CONTROL_POINT, &[CMD_FETCH_ACTIVITY])
            .await?;
        info!("Activity transfer started");

        while !session.is_complete() {
            let fragment = timeout(self.config.notification_timeout, notifications.recv())
                .await?
                .ok_or(MiBandError::TransferAborted)?;
            session.ingest(&fragment);
        }

        debug!(total_steps = session.total_steps(), "Activity stream received");
        Ok(session)
    }

    /// Write the session's pending acknowledgments to the control point in
    /// order. Each one leaves the queue only after its write succeeded.
    pub async fn send_acknowledgments(&mut self, session: &mut ActivitySession) -> Result<usize, MiBandError> {
        let mut sent = 0;
        while let Some(ack) = session.pending_acknowledgments().first().copied() {
            debug!(ack = %ack, "Sending acknowledgment");
            self.transport.write(HANDLE_CONTROL_POINT, &ack.to_bytes()).await?;
            session.confirm_acknowledgment();
            sent += 1;
        }
        Ok(sent)
    }

    pub async fn disconnect(&mut self) -> Result<(), MiBandError> {
        info!("Disconnecting");
        self.transport.disconnect().await
    }
}
