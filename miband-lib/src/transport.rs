//! Link abstraction the driver talks through.
//!
//! Discovery, connection management and GATT enumeration live outside this
//! crate. Anything that can write and read attribute handles and deliver the
//! activity notifications in order can drive a [`crate::MiBand`].

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::MiBandError;

/// ATT attribute handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u16);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

/// BLE link to a single band.
///
/// Implementations report their own failures as [`MiBandError::Transport`].
/// Nothing in this crate retries a failed operation.
pub trait Transport {
    /// Write without response
    fn write(&mut self, handle: Handle, data: &[u8]) -> impl Future<Output = Result<(), MiBandError>> + Send;

    fn read(&mut self, handle: Handle) -> impl Future<Output = Result<Bytes, MiBandError>> + Send;

    /// Enable notifications on `characteristic`. Fragments must arrive on
    /// the returned channel in the order the band sent them.
    fn subscribe(
        &mut self,
        characteristic: Uuid,
    ) -> impl Future<Output = Result<mpsc::Receiver<Bytes>, MiBandError>> + Send;

    fn disconnect(&mut self) -> impl Future<Output = Result<(), MiBandError>> + Send;
}
