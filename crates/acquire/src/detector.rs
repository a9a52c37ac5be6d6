use crate::camera::Frame;
use crate::error::Result;
use std::sync::Arc;

pub type DetectorHandle = Arc<dyn Detector + Send + Sync>;

/// Linear barcode (EAN-13 / UPC family) detection.
///
/// Decoding is synchronous and CPU-bound; it runs between frame samples on
/// the sampling task.
pub trait Detector: Send + Sync {
    /// Raw values of every barcode visible in `frame`, possibly none.
    ///
    /// An error means this frame couldn't be decoded; the next one may be
    /// fine.
    fn detect(&self, frame: &Frame) -> Result<Vec<String>>;
}
