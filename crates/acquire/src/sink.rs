use std::sync::Arc;

pub type SinkHandle = Arc<dyn CandidateSink + Send + Sync>;

/// Consumer of raw candidate identifiers.
///
/// Both methods must return without waiting on any lookup: the sampling loop
/// calls them between frames.
pub trait CandidateSink: Send + Sync {
    /// Hand over a raw scanned or typed value.
    fn submit(&self, raw: &str);

    /// Whether submitting `raw` right now would start a new lookup.
    ///
    /// The acquisition loop only re-emits a value it has already emitted when
    /// this says yes.
    fn accepts(&self, raw: &str) -> bool;
}
