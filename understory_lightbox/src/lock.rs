// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-slot ownership of the page body.
//!
//! An open preview hides body overflow and may pad the body to compensate for
//! the scrollbar. Those mutations live on a shared element, so at most one
//! preview may hold them at a time. [`BodyLock`] is the token that enforces it.
//!
//! ```
//! use understory_lightbox::{BodyLock, LightboxError, PreviewId};
//!
//! let mut lock = BodyLock::new();
//! let a = PreviewId::new(1);
//! let b = PreviewId::new(2);
//!
//! lock.acquire(a).unwrap();
//! assert_eq!(lock.acquire(b), Err(LightboxError::ReentrantOpen { holder: a }));
//!
//! // Only the holder can release.
//! assert!(!lock.release(b));
//! assert!(lock.release(a));
//! assert!(lock.acquire(b).is_ok());
//! ```

use crate::error::LightboxError;

/// Identifier for one bound preview.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewId(u64);

impl PreviewId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ownership token for body overflow/padding side effects.
#[derive(Clone, Debug, Default)]
pub struct BodyLock {
    holder: Option<PreviewId>,
}

impl BodyLock {
    /// Creates an unheld lock.
    #[must_use]
    pub const fn new() -> Self {
        Self { holder: None }
    }

    /// Creates a lock already held by `holder`.
    ///
    /// Hosts that keep the holder outside the process, such as on the shared
    /// element itself, rebuild the token from it before each operation.
    #[must_use]
    pub const fn held_by(holder: PreviewId) -> Self {
        Self {
            holder: Some(holder),
        }
    }

    /// Takes the lock for `owner`.
    ///
    /// Fails with [`LightboxError::ReentrantOpen`] whenever the lock is held,
    /// including by `owner` itself.
    pub fn acquire(&mut self, owner: PreviewId) -> Result<(), LightboxError> {
        match self.holder {
            Some(holder) => Err(LightboxError::ReentrantOpen { holder }),
            None => {
                self.holder = Some(owner);
                Ok(())
            }
        }
    }

    /// Releases the lock if `owner` holds it. Returns whether it was released.
    pub fn release(&mut self, owner: PreviewId) -> bool {
        if self.holder == Some(owner) {
            self.holder = None;
            true
        } else {
            false
        }
    }

    /// Returns the current holder, if any.
    #[must_use]
    pub fn holder(&self) -> Option<PreviewId> {
        self.holder
    }

    /// Returns `true` while some preview holds the lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.holder.is_some()
    }
}
