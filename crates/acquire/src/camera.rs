//! Camera access and exclusive device ownership.

use crate::error::{CameraFault, ErrorKind, Result};
use async_trait::async_trait;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::instrument;

pub type CameraHandle = Arc<dyn Camera + Send + Sync>;

/// A single captured video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Result of polling an open camera for its current frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Ready(Frame),
    /// The video element has no decodable frame yet (still warming up, or
    /// between frames). Not an error: sample again.
    NotReady,
}

/// A video capture device.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Name of the device, for logging only.
    fn name(&self) -> &str;

    /// Ask for access to the camera and start streaming.
    ///
    /// Must fail with [`ErrorKind::CameraUnavailable`] when access is refused
    /// or there is no device to open. Dropping the returned source stops the
    /// stream and frees the device.
    async fn open(&self) -> Result<Box<dyn FrameSource>>;
}

/// An open video stream.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait until the stream can be sampled, then return its current frame.
    async fn next_frame(&mut self) -> Result<FrameStatus>;
}

/// Exclusive owner of a [`Camera`].
///
/// At most one [`DeviceHandle`] exists per `Device` at any time. Acquiring
/// the device while a handle is alive fails immediately with
/// [`CameraFault::Busy`] instead of waiting.
pub struct Device {
    camera: CameraHandle,
    held: Arc<AtomicBool>,
}

impl Device {
    pub fn new(camera: CameraHandle) -> Self {
        Self { camera, held: Arc::new(AtomicBool::new(false)) }
    }

    pub fn name(&self) -> &str {
        self.camera.name()
    }

    /// Whether a [`DeviceHandle`] is currently alive.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    #[instrument(skip_all, fields(camera = %self.camera.name()))]
    pub async fn acquire(&self) -> Result<DeviceHandle> {
        if self.held.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            exn::bail!(ErrorKind::CameraUnavailable(CameraFault::Busy));
        }
        match self.camera.open().await {
            Ok(source) => {
                tracing::debug!("Camera acquired");
                Ok(DeviceHandle {
                    name: self.camera.name().to_string(),
                    source,
                    held: Arc::clone(&self.held),
                })
            },
            Err(err) => {
                self.held.store(false, Ordering::Release);
                Err(err)
            },
        }
    }
}

/// The open stream of an acquired [`Device`].
///
/// Dropping the handle closes the stream and makes the device available
/// again. That happens exactly once, whichever way the owner goes away.
pub struct DeviceHandle {
    name: String,
    source: Box<dyn FrameSource>,
    held: Arc<AtomicBool>,
}

impl DeviceHandle {
    pub async fn next_frame(&mut self) -> Result<FrameStatus> {
        self.source.next_frame().await
    }
}

impl Debug for DeviceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DeviceHandle").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
        tracing::debug!(camera = %self.name, "Camera released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingCamera {
        fault: Option<CameraFault>,
        closed: Arc<AtomicUsize>,
    }
    struct CountingSource(Arc<AtomicUsize>);

    #[async_trait]
    impl Camera for CountingCamera {
        fn name(&self) -> &str {
            "counting"
        }
        async fn open(&self) -> Result<Box<dyn FrameSource>> {
            if let Some(fault) = self.fault {
                exn::bail!(ErrorKind::CameraUnavailable(fault));
            }
            Ok(Box::new(CountingSource(Arc::clone(&self.closed))))
        }
    }
    #[async_trait]
    impl FrameSource for CountingSource {
        async fn next_frame(&mut self) -> Result<FrameStatus> {
            Ok(FrameStatus::NotReady)
        }
    }
    impl Drop for CountingSource {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn device(fault: Option<CameraFault>) -> (Device, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        let camera = CountingCamera { fault, closed: Arc::clone(&closed) };
        (Device::new(Arc::new(camera)), closed)
    }

    #[tokio::test]
    async fn test_second_acquire_is_busy() {
        let (device, _) = device(None);
        let handle = device.acquire().await.unwrap();
        let err = device.acquire().await.unwrap_err();
        assert_eq!(*err, ErrorKind::CameraUnavailable(CameraFault::Busy));
        drop(handle);
        assert!(device.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn test_drop_releases_once() {
        let (device, closed) = device(None);
        let mut handle = device.acquire().await.unwrap();
        assert!(device.is_held());
        assert_eq!(handle.next_frame().await.unwrap(), FrameStatus::NotReady);
        drop(handle);
        assert!(!device.is_held());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_open_leaves_device_free() {
        let (device, closed) = device(Some(CameraFault::PermissionDenied));
        let err = device.acquire().await.unwrap_err();
        assert_eq!(*err, ErrorKind::CameraUnavailable(CameraFault::PermissionDenied));
        assert!(!device.is_held());
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }
}
