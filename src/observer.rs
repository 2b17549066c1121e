//! Deferred loading driven by viewport visibility.
//!
//! One observer instance serves the whole page: it is created at init
//! and lives as long as the page does. Grids from any number of section
//! renders register their images with it; registrations are independent
//! and carry no cross-element ordering.
//!
//! The contract is one-shot: the first time an element reports at least
//! 10% visibility, the observer consumes its registration and tells the
//! caller what to do — swap in the staged deferred source (if one was
//! registered) or reveal the element as-is. Later visibility reports for
//! the same element are ignored; fade-in is not a recurring toggle.
//!
//! The observer does not track load outcomes. Whether the swapped
//! source loads or falls back is the grid cell's business
//! ([`crate::grid::GridItem::on_load_result`]).

use crate::grid::ImageHandle;
use std::collections::HashMap;

/// Fraction of the element that must be visible before it fires.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// What the caller should do with a newly visible element.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityAction {
    /// Swap in the staged deferred source, then await its load result.
    Swap(String),
    /// Nothing staged: mark the element loaded immediately.
    Reveal,
}

/// Process-wide visibility registry.
#[derive(Debug, Default)]
pub struct VisibilityObserver {
    registrations: HashMap<ImageHandle, Option<String>>,
}

impl VisibilityObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element, optionally staging a deferred source to be
    /// swapped in when it becomes visible. Re-registering replaces the
    /// staged source.
    pub fn observe(&mut self, handle: ImageHandle, staged: Option<String>) {
        self.registrations.insert(handle, staged);
    }

    /// Drop a registration without firing it. Used when a grid page is
    /// cleared before its images ever became visible.
    pub fn unobserve(&mut self, handle: &ImageHandle) {
        self.registrations.remove(handle);
    }

    pub fn is_observing(&self, handle: &ImageHandle) -> bool {
        self.registrations.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Report a visibility ratio for an element. Returns the action to
    /// apply the first time the element crosses the threshold, `None`
    /// otherwise. The registration is consumed on firing.
    pub fn on_visible(&mut self, handle: &ImageHandle, ratio: f32) -> Option<VisibilityAction> {
        if ratio < VISIBILITY_THRESHOLD || !self.registrations.contains_key(handle) {
            return None;
        }
        let staged = self.registrations.remove(handle)?;
        Some(match staged {
            Some(src) => VisibilityAction::Swap(src),
            None => VisibilityAction::Reveal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: usize) -> ImageHandle {
        ImageHandle::new("travel", i)
    }

    #[test]
    fn below_threshold_does_not_fire() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), None);
        assert_eq!(obs.on_visible(&handle(0), 0.05), None);
        assert!(obs.is_observing(&handle(0)));
    }

    #[test]
    fn fires_at_exactly_the_threshold() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), None);
        assert_eq!(
            obs.on_visible(&handle(0), VISIBILITY_THRESHOLD),
            Some(VisibilityAction::Reveal)
        );
    }

    #[test]
    fn fires_at_most_once_per_element() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), None);
        assert!(obs.on_visible(&handle(0), 1.0).is_some());
        assert_eq!(obs.on_visible(&handle(0), 1.0), None);
    }

    #[test]
    fn staged_source_is_returned_for_swapping() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), Some("full.webp".into()));
        assert_eq!(
            obs.on_visible(&handle(0), 0.5),
            Some(VisibilityAction::Swap("full.webp".into()))
        );
    }

    #[test]
    fn unregistered_elements_are_ignored() {
        let mut obs = VisibilityObserver::new();
        assert_eq!(obs.on_visible(&handle(7), 1.0), None);
    }

    #[test]
    fn registrations_are_independent() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), None);
        obs.observe(handle(1), Some("staged.webp".into()));
        assert!(obs.on_visible(&handle(1), 0.5).is_some());
        assert!(obs.is_observing(&handle(0)));
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn unobserve_drops_without_firing() {
        let mut obs = VisibilityObserver::new();
        obs.observe(handle(0), None);
        obs.unobserve(&handle(0));
        assert_eq!(obs.on_visible(&handle(0), 1.0), None);
        assert!(obs.is_empty());
    }
}
