//! Preferred provider routing.
//!
//! When a request names a provider, that provider is moved to position 0 in
//! the candidate list. Other providers remain in priority order as fallbacks.

use std::sync::Arc;

use super::traits::CodeAnalysisProvider;

/// Reorder a provider slice so the named provider is at index 0.
///
/// Names compare case-insensitively. If no provider matches `preferred`,
/// the slice is left unchanged.
pub(crate) fn promote_preferred<T: HasName>(providers: &mut [T], preferred: &str) {
    if let Some(idx) = providers
        .iter()
        .position(|p| p.name().eq_ignore_ascii_case(preferred))
        && idx > 0
    {
        // Rotate the preferred provider to position 0, preserving
        // relative order of the others.
        providers[..=idx].rotate_right(1);
    }
}

/// Trait for types that have a provider name, so `promote_preferred` can
/// work on registry entries and bare provider handles alike.
pub(crate) trait HasName {
    fn name(&self) -> &str;
}

impl HasName for Arc<dyn CodeAnalysisProvider> {
    fn name(&self) -> &str {
        CodeAnalysisProvider::name(self.as_ref())
    }
}
