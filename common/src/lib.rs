// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

pub mod board;
pub mod config;
pub mod csvlog;
pub mod keylistener;
pub mod sampler;

use std::sync::atomic::{AtomicBool, Ordering};

/// Convenience handle for asking the sampling loop to stop. For example from a thread
/// waiting on operator input to the one talking to the board.
///
/// The flag is only ever raised, never cleared. A stale read delays the stop by at most one
/// sample iteration.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(std::sync::Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop at the end of its current iteration.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested by any clone of this handle.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[test]
fn test_stop_flag_is_shared_between_clones() {
    let stop = StopFlag::new();
    let listener_side = stop.clone();
    assert!(!stop.is_requested());

    listener_side.request();
    assert!(stop.is_requested());

    // Raising it again is harmless.
    listener_side.request();
    assert!(stop.is_requested());
}
