//! Scripted camera and detector for testing.

use crate::camera::{Camera, Frame, FrameSource, FrameStatus};
use crate::detector::Detector;
use crate::error::{CameraFault, ErrorKind, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Camera that plays back a fixed script of frames.
///
/// Once the script runs out the stream either starts over (when
/// [looping](Self::looping)) or never produces another frame. Opens and
/// closes are counted so tests can check the device is released exactly
/// once.
pub struct MockCamera {
    script: Vec<FrameStatus>,
    looping: bool,
    fault: Mutex<Option<CameraFault>>,
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MockCamera {
    pub fn new(script: impl IntoIterator<Item = FrameStatus>) -> Self {
        Self {
            script: script.into_iter().collect(),
            looping: false,
            fault: Mutex::new(None),
            opens: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    /// Make every subsequent open fail with `fault`.
    pub fn refuse(&self, fault: impl Into<Option<CameraFault>>) {
        *self.fault.lock().unwrap_or_else(PoisonError::into_inner) = fault.into();
    }

    /// A ready frame that [`TextDetector`] decodes to the comma-separated `values`.
    pub fn frame(values: &str) -> FrameStatus {
        FrameStatus::Ready(Frame {
            width: u32::try_from(values.len()).unwrap_or(u32::MAX),
            height: 1,
            pixels: values.as_bytes().to_vec(),
        })
    }

    /// A ready frame that [`TextDetector`] fails to decode.
    pub fn garbled() -> FrameStatus {
        FrameStatus::Ready(Frame { width: 2, height: 1, pixels: vec![0xff, 0xfe] })
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Camera for MockCamera {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open(&self) -> Result<Box<dyn FrameSource>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = *self.fault.lock().unwrap_or_else(PoisonError::into_inner) {
            exn::bail!(ErrorKind::CameraUnavailable(fault));
        }
        Ok(Box::new(MockSource {
            script: self.script.clone(),
            position: 0,
            looping: self.looping,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MockSource {
    script: Vec<FrameStatus>,
    position: usize,
    looping: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl FrameSource for MockSource {
    async fn next_frame(&mut self) -> Result<FrameStatus> {
        if self.position >= self.script.len() && self.looping {
            self.position = 0;
        }
        match self.script.get(self.position) {
            Some(status) => {
                self.position += 1;
                Ok(status.clone())
            },
            None => std::future::pending().await,
        }
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Detector that reads a frame's pixels as comma-separated UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDetector;

impl Detector for TextDetector {
    fn detect(&self, frame: &Frame) -> Result<Vec<String>> {
        let Ok(text) = std::str::from_utf8(&frame.pixels) else {
            exn::bail!(ErrorKind::Detection);
        };
        Ok(text.split(',').filter(|v| !v.is_empty()).map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_detector() {
        let FrameStatus::Ready(frame) = MockCamera::frame("9780134685991,9780262033848") else {
            unreachable!();
        };
        assert_eq!(TextDetector.detect(&frame).unwrap(), ["9780134685991", "9780262033848"]);
        let FrameStatus::Ready(frame) = MockCamera::garbled() else {
            unreachable!();
        };
        assert_eq!(*TextDetector.detect(&frame).unwrap_err(), ErrorKind::Detection);
    }

    #[tokio::test]
    async fn test_looping_script() {
        let camera = MockCamera::new([MockCamera::frame("1"), FrameStatus::NotReady]).looping();
        let mut source = camera.open().await.unwrap();
        assert!(matches!(source.next_frame().await.unwrap(), FrameStatus::Ready(_)));
        assert_eq!(source.next_frame().await.unwrap(), FrameStatus::NotReady);
        assert!(matches!(source.next_frame().await.unwrap(), FrameStatus::Ready(_)));
        drop(source);
        assert_eq!((camera.opens(), camera.closes()), (1, 1));
    }

    #[tokio::test]
    async fn test_refused() {
        let camera = MockCamera::new([]);
        camera.refuse(CameraFault::NoDevice);
        let err = camera.open().await.map(|_| ()).unwrap_err();
        assert_eq!(*err, ErrorKind::CameraUnavailable(CameraFault::NoDevice));
    }
}
