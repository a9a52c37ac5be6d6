//! Barcode acquisition.
//!
//! An [`Acquisition`] turns a camera feed (or, failing that, manual entry)
//! into a stream of raw candidate identifiers handed to a [`CandidateSink`].
//! The camera itself is abstracted behind [`Camera`] and [`Detector`]; a
//! platform without either simply runs in manual-entry mode.
//!
//! Each distinct raw value seen by the camera is emitted once per loop. It is
//! only emitted again when the sink reports it would start a fresh lookup
//! (the previous one found nothing) and the rescan cooldown has passed.

mod acquisition;
mod camera;
mod detector;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod sink;
mod state;
mod stream;

pub use crate::acquisition::{Acquisition, DEFAULT_RESCAN_COOLDOWN};
pub use crate::camera::{Camera, CameraHandle, Device, DeviceHandle, Frame, FrameSource, FrameStatus};
pub use crate::detector::{Detector, DetectorHandle};
pub use crate::error::CameraFault;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockCamera, TextDetector};
pub use crate::sink::{CandidateSink, SinkHandle};
pub use crate::state::AcquisitionState;
pub use crate::stream::{EmissionFilter, detections};
