//! Traits for diagnostic rule evaluation

/// Anything that can be checked for data-quality anomalies.
///
/// Reasons are recomputed on every call and never cached, so a value that is
/// enriched after assembly (e.g. by check matching) is always judged on its
/// current contents.
pub trait Suspicious {
    /// Human-readable anomaly descriptions; empty when nothing looks wrong
    fn suspicious_reasons(&self) -> Vec<String>;

    fn is_suspicious(&self) -> bool {
        !self.suspicious_reasons().is_empty()
    }
}
