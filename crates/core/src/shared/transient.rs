use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Kinds of per-request buffers that carry image-derived data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Upload,
    Pixels,
    FaceCrop,
}

/// Observes the lifetime of transient buffers.
///
/// Buffers report `acquired` once when tracking starts and `released` once
/// from their `Drop`, after their contents have been zeroed.
pub trait ReleaseObserver: Send + Sync {
    fn acquired(&self, kind: BufferKind);
    fn released(&self, kind: BufferKind);
}

/// Observer that discards all events. Used in production.
pub struct NullReleaseObserver;

impl ReleaseObserver for NullReleaseObserver {
    fn acquired(&self, _kind: BufferKind) {}
    fn released(&self, _kind: BufferKind) {}
}

/// Cloneable handle that buffers keep to report their release.
#[derive(Clone)]
pub struct ReleaseHook(Arc<dyn ReleaseObserver>);

impl ReleaseHook {
    pub fn new(observer: Arc<dyn ReleaseObserver>) -> Self {
        Self(observer)
    }

    pub fn null() -> Self {
        Self(Arc::new(NullReleaseObserver))
    }

    pub fn acquired(&self, kind: BufferKind) {
        self.0.acquired(kind);
    }

    pub fn released(&self, kind: BufferKind) {
        self.0.released(kind);
    }
}

impl std::fmt::Debug for ReleaseHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReleaseHook")
    }
}

/// Counts acquisitions and releases per buffer kind.
///
/// Instrumentation for test harnesses asserting that nothing created during
/// a verification outlives it.
#[derive(Default)]
pub struct CountingReleaseObserver {
    counts: Mutex<HashMap<BufferKind, (usize, usize)>>,
}

impl CountingReleaseObserver {
    pub fn acquired_count(&self, kind: BufferKind) -> usize {
        self.get(kind).0
    }

    pub fn released_count(&self, kind: BufferKind) -> usize {
        self.get(kind).1
    }

    /// Buffers of `kind` acquired but not yet released.
    pub fn live(&self, kind: BufferKind) -> usize {
        let (acquired, released) = self.get(kind);
        acquired.saturating_sub(released)
    }

    /// True when every acquired buffer has been released exactly once.
    pub fn all_released(&self) -> bool {
        self.lock().values().all(|(a, r)| a == r)
    }

    fn get(&self, kind: BufferKind) -> (usize, usize) {
        self.lock().get(&kind).copied().unwrap_or((0, 0))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<BufferKind, (usize, usize)>> {
        self.counts.lock()
    }
}

impl ReleaseObserver for CountingReleaseObserver {
    fn acquired(&self, kind: BufferKind) {
        self.lock().entry(kind).or_default().0 += 1;
    }

    fn released(&self, kind: BufferKind) {
        self.lock().entry(kind).or_default().1 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_observer_starts_empty() {
        let observer = CountingReleaseObserver::default();
        assert_eq!(observer.acquired_count(BufferKind::Upload), 0);
        assert_eq!(observer.live(BufferKind::Upload), 0);
        assert!(observer.all_released());
    }

    #[test]
    fn test_counting_observer_tracks_live_buffers() {
        let observer = CountingReleaseObserver::default();
        observer.acquired(BufferKind::Pixels);
        observer.acquired(BufferKind::Pixels);
        observer.released(BufferKind::Pixels);

        assert_eq!(observer.acquired_count(BufferKind::Pixels), 2);
        assert_eq!(observer.released_count(BufferKind::Pixels), 1);
        assert_eq!(observer.live(BufferKind::Pixels), 1);
        assert!(!observer.all_released());
    }

    #[test]
    fn test_hook_forwards_to_observer() {
        let observer = Arc::new(CountingReleaseObserver::default());
        let hook = ReleaseHook::new(observer.clone());
        let cloned = hook.clone();

        hook.acquired(BufferKind::FaceCrop);
        cloned.released(BufferKind::FaceCrop);

        assert_eq!(observer.acquired_count(BufferKind::FaceCrop), 1);
        assert_eq!(observer.released_count(BufferKind::FaceCrop), 1);
        assert!(observer.all_released());
    }

    #[test]
    fn test_null_hook_is_silent() {
        let hook = ReleaseHook::null();
        hook.acquired(BufferKind::Upload);
        hook.released(BufferKind::Upload);
    }
}
