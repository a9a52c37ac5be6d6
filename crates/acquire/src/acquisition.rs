use crate::camera::{Device, DeviceHandle};
use crate::detector::DetectorHandle;
use crate::error::{CameraFault, ErrorKind};
use crate::sink::SinkHandle;
use crate::state::AcquisitionState;
use crate::stream::{EmissionFilter, detections};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// How long a value that was already emitted must go unseen before it can be
/// emitted again.
pub const DEFAULT_RESCAN_COOLDOWN: Duration = Duration::from_secs(2);

/// A running acquisition loop.
///
/// Feeds raw candidate identifiers detected by the camera into a
/// [`CandidateSink`](crate::CandidateSink). Manual entry goes to the same sink
/// directly, whenever [the state](AcquisitionState::accepts_manual_entry)
/// allows it. The camera is owned by a background sampling task and released
/// when the loop [stops](Self::stop) or is dropped.
pub struct Acquisition {
    state: watch::Sender<AcquisitionState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Acquisition {
    /// Start acquiring into `sink`.
    ///
    /// Without a `device` or without a `detector` there is nothing to scan
    /// with, and the loop goes straight to
    /// [`ManualOnly`](AcquisitionState::ManualOnly). A camera that refuses to
    /// open leaves the loop in [`Error`](AcquisitionState::Error) with manual
    /// entry still available.
    #[instrument(skip_all)]
    pub async fn start(
        device: Option<&Device>,
        detector: Option<DetectorHandle>,
        sink: SinkHandle,
        rescan_cooldown: Duration,
    ) -> Self {
        let (state, _) = watch::channel(AcquisitionState::Idle);
        let mut acquisition = Self { state, cancel: CancellationToken::new(), task: None };
        acquisition.set(AcquisitionState::Starting);

        let (Some(device), Some(detector)) = (device, detector) else {
            tracing::info!("No barcode detection available, manual entry only");
            acquisition.set(AcquisitionState::ManualOnly);
            return acquisition;
        };
        match device.acquire().await {
            Ok(handle) => {
                tracing::info!(camera = %device.name(), "Scanning");
                acquisition.set(AcquisitionState::Scanning);
                acquisition.task = Some(tokio::spawn(sample(
                    handle,
                    detector,
                    sink,
                    rescan_cooldown,
                    acquisition.cancel.clone(),
                )));
            },
            Err(e) => {
                let fault = match &*e {
                    ErrorKind::CameraUnavailable(fault) => *fault,
                    _ => CameraFault::NoDevice,
                };
                tracing::warn!(camera = %device.name(), error = ?e, "Camera unavailable, falling back to manual entry");
                acquisition.set(AcquisitionState::Error(fault));
            },
        }
        acquisition
    }

    pub fn state(&self) -> AcquisitionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn watch(&self) -> watch::Receiver<AcquisitionState> {
        self.state.subscribe()
    }

    /// Stop sampling and release the camera.
    ///
    /// The camera has been released by the time this returns.
    #[instrument(skip_all)]
    pub async fn stop(&mut self) {
        if self.state() == AcquisitionState::Idle {
            return;
        }
        self.set(AcquisitionState::Stopping);
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!(error = %e, "Sampling task did not exit cleanly");
        }
        self.set(AcquisitionState::Idle);
    }

    fn set(&self, state: AcquisitionState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Acquisition state changed");
        }
    }
}

impl Drop for Acquisition {
    fn drop(&mut self) {
        // The aborted task drops its device handle the next time the runtime
        // polls it.
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn sample(
    mut device: DeviceHandle,
    detector: DetectorHandle,
    sink: SinkHandle,
    rescan_cooldown: Duration,
    cancel: CancellationToken,
) {
    let mut filter = EmissionFilter::new(rescan_cooldown);
    {
        let detections = detections(&mut device, &*detector);
        futures::pin_mut!(detections);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(raw) = detections.next() => {
                    if filter.admit(&raw, |raw| sink.accepts(raw), Instant::now()) {
                        tracing::debug!(raw = %raw, "Barcode detected");
                        sink.submit(&raw);
                    }
                },
            }
        }
    }
    tracing::debug!(emitted = filter.len(), "Sampling stopped");
    drop(device);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraHandle, FrameStatus};
    use crate::mock::{MockCamera, TextDetector};
    use crate::sink::CandidateSink;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSink {
        submitted: Mutex<Vec<String>>,
        accepting: AtomicBool,
    }
    impl RecordingSink {
        fn submitted(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }
    }
    impl CandidateSink for RecordingSink {
        fn submit(&self, raw: &str) {
            self.submitted.lock().unwrap().push(raw.to_string());
        }
        fn accepts(&self, _raw: &str) -> bool {
            self.accepting.load(Ordering::SeqCst)
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition never became true");
    }

    fn setup(camera: MockCamera) -> (Arc<MockCamera>, Device, Arc<RecordingSink>) {
        let camera = Arc::new(camera);
        let device = Device::new(Arc::clone(&camera) as CameraHandle);
        (camera, device, Arc::new(RecordingSink::default()))
    }

    #[tokio::test]
    async fn test_manual_only_without_detector() {
        let (camera, device, sink) = setup(MockCamera::new([]));
        let mut acquisition = Acquisition::start(Some(&device), None, sink.clone(), DEFAULT_RESCAN_COOLDOWN).await;
        assert_eq!(acquisition.state(), AcquisitionState::ManualOnly);
        assert_eq!(camera.opens(), 0);
        assert!(acquisition.state().accepts_manual_entry());
        acquisition.stop().await;
        assert_eq!(acquisition.state(), AcquisitionState::Idle);
        assert!(!acquisition.state().accepts_manual_entry());
        assert!(sink.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_busy_camera_falls_back_to_manual() {
        let (camera, device, sink) = setup(MockCamera::new([]));
        let _held = device.acquire().await.unwrap();
        let acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink.clone(), DEFAULT_RESCAN_COOLDOWN)
                .await;
        assert_eq!(acquisition.state(), AcquisitionState::Error(CameraFault::Busy));
        assert_eq!(camera.opens(), 1);
        assert!(acquisition.state().accepts_manual_entry());
        assert!(sink.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let (camera, device, sink) = setup(MockCamera::new([]));
        camera.refuse(CameraFault::PermissionDenied);
        let acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink, DEFAULT_RESCAN_COOLDOWN).await;
        assert_eq!(acquisition.state(), AcquisitionState::Error(CameraFault::PermissionDenied));
        assert!(!device.is_held());
    }

    #[tokio::test]
    async fn test_detected_value_emitted_once() {
        let script = [FrameStatus::NotReady, MockCamera::frame("9780134685991"), MockCamera::garbled()];
        let (camera, device, sink) = setup(MockCamera::new(script).looping());
        let mut acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink.clone(), Duration::ZERO).await;
        assert_eq!(acquisition.state(), AcquisitionState::Scanning);
        wait_until(|| !sink.submitted().is_empty()).await;
        // Let the script loop a good few times.
        tokio::time::sleep(Duration::from_millis(20)).await;
        acquisition.stop().await;
        assert_eq!(sink.submitted(), ["9780134685991"]);
        assert_eq!((camera.opens(), camera.closes()), (1, 1));
        assert!(!device.is_held());
    }

    #[tokio::test]
    async fn test_decode_errors_do_not_stop_sampling() {
        let script = [MockCamera::garbled(), FrameStatus::NotReady, MockCamera::garbled(), MockCamera::frame("1,2")];
        let (_camera, device, sink) = setup(MockCamera::new(script));
        let _acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink.clone(), DEFAULT_RESCAN_COOLDOWN)
                .await;
        wait_until(|| sink.submitted().len() == 2).await;
        assert_eq!(sink.submitted(), ["1", "2"]);
    }

    #[tokio::test]
    async fn test_reemits_when_consumer_accepts() {
        let (_camera, device, sink) = setup(MockCamera::new([MockCamera::frame("0000000000000")]).looping());
        sink.accepting.store(true, Ordering::SeqCst);
        let mut acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink.clone(), Duration::ZERO).await;
        wait_until(|| sink.submitted().len() >= 3).await;
        acquisition.stop().await;
        assert!(sink.submitted().iter().all(|raw| raw == "0000000000000"));
    }

    #[tokio::test]
    async fn test_drop_releases_camera() {
        let (camera, device, sink) = setup(MockCamera::new([]));
        let acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink, DEFAULT_RESCAN_COOLDOWN).await;
        assert!(device.is_held());
        drop(acquisition);
        wait_until(|| !device.is_held()).await;
        assert_eq!(camera.closes(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (camera, device, sink) = setup(MockCamera::new([]));
        let mut acquisition =
            Acquisition::start(Some(&device), Some(Arc::new(TextDetector)), sink, DEFAULT_RESCAN_COOLDOWN).await;
        let mut states = acquisition.watch();
        acquisition.stop().await;
        acquisition.stop().await;
        drop(acquisition);
        assert_eq!(*states.borrow_and_update(), AcquisitionState::Idle);
        assert_eq!(camera.closes(), 1);
    }
}
