//! Invalidation tokens.
//!
//! An [`Assumption`] is a monotonic boolean: valid until invalidated once,
//! never valid again. A [`CodeGeneration`] is the per-call-target counter that
//! every deoptimization event bumps; a compiled tier stays usable only while
//! the generation it was compiled against is still current.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

/// A cheap, monotonically invalidatable token gating a speculative fast path.
#[derive(Debug)]
pub struct Assumption {
    name: String,
    valid: AtomicBool,
}

impl Assumption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            valid: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Invalidate the assumption. Returns `true` only for the call that
    /// actually flipped it; repeated invalidation is a no-op.
    pub fn invalidate(&self) -> bool {
        let was_valid = self.valid.swap(false, Ordering::AcqRel);
        if was_valid {
            debug!(assumption = %self.name, "assumption invalidated");
        }
        was_valid
    }
}

/// Per-call-target generation counter.
///
/// Fast paths compare a remembered generation against [`current`]; slow paths
/// that change a speculated fact call [`invalidate`].
///
/// [`current`]: CodeGeneration::current
/// [`invalidate`]: CodeGeneration::invalidate
#[derive(Debug, Default)]
pub struct CodeGeneration(AtomicU64);

impl CodeGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Bump the generation, retiring any compilation made against an older one.
    pub fn invalidate(&self, reason: &'static str) -> u64 {
        let next = self.0.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation = next, reason, "code generation invalidated");
        next
    }
}

/// A boolean field read through an assumption that it was never changed.
///
/// While the assumption `"<name> is not requested"` holds, [`get`] folds to
/// `false` without touching the field. The first [`set`] that changes the
/// value invalidates the assumption for good.
///
/// [`get`]: StableFlag::get
/// [`set`]: StableFlag::set
#[derive(Debug)]
pub struct StableFlag {
    value: AtomicBool,
    unchanged: Arc<Assumption>,
}

impl StableFlag {
    pub fn new(name: &str) -> Self {
        Self {
            value: AtomicBool::new(false),
            unchanged: Arc::new(Assumption::new(format!("{name} is not requested"))),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        if self.unchanged.is_valid() {
            false
        } else {
            self.value.load(Ordering::Acquire)
        }
    }

    pub fn set(&self, value: bool) {
        if self.value.load(Ordering::Acquire) != value {
            self.unchanged.invalidate();
            self.value.store(value, Ordering::Release);
        }
    }

    /// The assumption guarding this flag, for call targets that depend on it.
    pub fn assumption(&self) -> &Arc<Assumption> {
        &self.unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assumption_invalidates_once() {
        let a = Assumption::new("stable");
        assert!(a.is_valid());
        assert!(a.invalidate());
        assert!(!a.is_valid());
        assert!(!a.invalidate());
        assert!(!a.is_valid());
    }

    #[test]
    fn test_generation_only_grows() {
        let g = CodeGeneration::new();
        assert_eq!(g.current(), 0);
        assert_eq!(g.invalidate("test"), 1);
        assert_eq!(g.invalidate("test"), 2);
        assert_eq!(g.current(), 2);
    }

    #[test]
    fn test_flag_folds_until_changed() {
        let flag = StableFlag::new("warm");
        assert!(!flag.get());

        // Setting the current value changes nothing.
        flag.set(false);
        assert!(flag.assumption().is_valid());

        flag.set(true);
        assert!(!flag.assumption().is_valid());
        assert!(flag.get());

        flag.set(false);
        assert!(!flag.get());
        assert!(!flag.assumption().is_valid());
    }
}
