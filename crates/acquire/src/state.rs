use crate::error::CameraFault;
use derive_more::Display;

/// Lifecycle of an acquisition loop.
///
/// ```text
/// Idle ─► Starting ─┬─► Scanning ───┐
///                   ├─► Error       ├─► Stopping ─► Idle
///                   └─► ManualOnly ─┘
/// ```
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionState {
    #[default]
    #[display("idle")]
    Idle,
    #[display("starting camera")]
    Starting,
    #[display("scanning")]
    Scanning,
    /// The camera could not be opened. Manual entry still works.
    #[display("camera unavailable ({_0}), manual entry only")]
    Error(CameraFault),
    /// No camera or no barcode detection on this platform. Not an error.
    #[display("manual entry only")]
    ManualOnly,
    #[display("stopping")]
    Stopping,
}

impl AcquisitionState {
    /// Whether typed identifiers are accepted in this state.
    pub fn accepts_manual_entry(&self) -> bool {
        matches!(self, Self::Scanning | Self::Error(_) | Self::ManualOnly)
    }

    /// Whether the camera is (or is about to be) streaming.
    pub fn is_camera_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Scanning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AcquisitionState::Idle, false)]
    #[case(AcquisitionState::Starting, false)]
    #[case(AcquisitionState::Scanning, true)]
    #[case(AcquisitionState::Error(CameraFault::NoDevice), true)]
    #[case(AcquisitionState::ManualOnly, true)]
    #[case(AcquisitionState::Stopping, false)]
    fn test_accepts_manual_entry(#[case] state: AcquisitionState, #[case] expected: bool) {
        assert_eq!(state.accepts_manual_entry(), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            AcquisitionState::Error(CameraFault::PermissionDenied).to_string(),
            "camera unavailable (permission denied), manual entry only"
        );
    }
}
