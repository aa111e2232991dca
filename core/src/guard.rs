//! # Mount Guard
//!
//! A UI surface (a form, a dialog, a CLI command) owns one [`MountGuard`]
//! for as long as it is on screen. Anything that resumes after an `.await`
//! on the surface's behalf holds a [`MountedRef`] and must check
//! [`MountedRef::is_mounted`] before touching shared state.
//!
//! The guard does not lock, block, or queue. It only answers "is anyone
//! still here to receive this update?". Teardown happens in `Drop`, so an
//! early return, a `?`, or a panic all release it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Owning side of the flag. Exactly one per surface.
#[derive(Debug)]
pub struct MountGuard {
    flag: Arc<AtomicBool>,
}

impl MountGuard {
    /// Marks a new surface as mounted.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A read-only handle for deferred work.
    pub fn handle(&self) -> MountedRef {
        MountedRef {
            flag: Arc::clone(&self.flag),
        }
    }

    /// Tears the surface down now instead of at end of scope.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Default for MountGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        if self.flag.swap(false, Ordering::AcqRel) {
            debug!("surface unmounted");
        }
    }
}

/// Read-only view of a [`MountGuard`]. Cheap to clone.
#[derive(Clone, Debug)]
pub struct MountedRef {
    flag: Arc<AtomicBool>,
}

impl MountedRef {
    /// `true` until the owning guard is dropped. Never flips back.
    pub fn is_mounted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_see_teardown() {
        let guard = MountGuard::new();
        let a = guard.handle();
        let b = a.clone();
        assert!(a.is_mounted());
        assert!(b.is_mounted());

        guard.unmount();
        assert!(!a.is_mounted());
        assert!(!b.is_mounted());
    }

    #[test]
    fn early_return_releases_the_guard() {
        fn surface(out: &mut Option<MountedRef>, fail: bool) -> Result<(), &'static str> {
            let guard = MountGuard::new();
            *out = Some(guard.handle());
            if fail {
                return Err("bail");
            }
            Ok(())
        }

        let mut handle = None;
        assert!(surface(&mut handle, true).is_err());
        assert!(!handle.unwrap().is_mounted());
    }

    #[test]
    fn panic_releases_the_guard() {
        let guard = MountGuard::new();
        let handle = guard.handle();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = guard;
            panic!("render failed");
        }));
        assert!(result.is_err());
        assert!(!handle.is_mounted());
    }
}
