//! What a consumer-driven load trigger did.

/// Result of `load_around`, `load_after` or `load_before`.
///
/// Triggers never fail; a refused trigger reports why it was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// A network fetch was started.
    Issued,
    /// Suppressed: another fetch for this resource is still running.
    InFlight,
    /// Suppressed: an earlier fetch failed and the resource stopped fetching.
    CircuitOpen,
    /// Suppressed: the configured maximum item count has been fetched.
    LimitReached,
    /// This direction is not supported by the resource.
    Unsupported,
    /// Backward load with the window already at position zero.
    AtOrigin,
    /// Served from the local store; no fetch was needed.
    Local,
}

impl LoadOutcome {
    /// Whether the trigger started a network fetch.
    pub fn is_issued(&self) -> bool {
        matches!(self, LoadOutcome::Issued)
    }
}
