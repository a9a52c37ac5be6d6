//! Frame sampling.

use crate::camera::{DeviceHandle, FrameStatus};
use crate::detector::Detector;
use async_stream::stream;
use futures::Stream;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Streams every raw barcode value seen by `device`, frame after frame.
///
/// Sampling is cooperative: each iteration awaits the next frame and then
/// yields to the scheduler, so lookups spawned by the consumer get to run
/// between samples. Frames that aren't ready are skipped, and frames that
/// fail to read or decode are logged and skipped. The stream never ends on
/// its own; drop it to stop sampling.
pub fn detections<'a>(device: &'a mut DeviceHandle, detector: &'a dyn Detector) -> impl Stream<Item = String> + 'a {
    stream! {
        loop {
            match device.next_frame().await {
                Ok(FrameStatus::Ready(frame)) => match detector.detect(&frame) {
                    Ok(values) => {
                        for value in values {
                            yield value;
                        }
                    },
                    Err(e) => tracing::debug!(error = ?e, "Skipping undecodable frame"),
                },
                Ok(FrameStatus::NotReady) => {},
                Err(e) => tracing::warn!(error = ?e, "Failed to read camera frame"),
            }
            tokio::task::yield_now().await;
        }
    }
}

/// Session-scoped memory of which raw values have already been emitted.
///
/// A value is let through the first time it is seen. After that it is only
/// let through again if the consumer would start a new lookup for it *and*
/// the cooldown since its last emission has passed, so that a barcode held
/// in front of the camera doesn't fire once per frame.
#[derive(Debug)]
pub struct EmissionFilter {
    cooldown: Duration,
    emitted: HashMap<String, Instant>,
}

impl EmissionFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, emitted: HashMap::new() }
    }

    pub fn admit(&mut self, raw: &str, consumer_accepts: impl FnOnce(&str) -> bool, now: Instant) -> bool {
        match self.emitted.get_mut(raw) {
            None => {
                self.emitted.insert(raw.to_string(), now);
                true
            },
            Some(last) if now.saturating_duration_since(*last) >= self.cooldown && consumer_accepts(raw) => {
                *last = now;
                true
            },
            Some(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }
}
