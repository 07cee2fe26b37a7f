//! The bracket stack: one frame per open `[` that has not been closed yet.
//!
//! Each frame remembers where its `[` starts in the program stream so a
//! `]` can rewind to it, and whether the loop it opens is being skipped.
//! A frame opened while skipping is itself skipping, so "skip mode" is
//! simply the state of the innermost frame.

use std::collections::TryReserveError;

use crate::source::Bookmark;

/// Frames reserved up front; the stack doubles from here.
pub const INITIAL_STACK_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Stream position of the `[` that opened this frame.
    pub bookmark: Bookmark,
    /// Set when the loop body is being scanned without effect.
    pub skipping: bool,
}

#[derive(Debug, Clone)]
pub struct BracketStack {
    frames: Vec<Frame>,
}

impl BracketStack {
    pub fn new() -> Result<Self, TryReserveError> {
        let mut frames = Vec::new();
        frames.try_reserve_exact(INITIAL_STACK_SIZE)?;
        Ok(Self { frames })
    }

    /// Whether the interpreter is inside a loop whose header tested zero.
    pub fn is_skipping(&self) -> bool {
        self.frames.last().is_some_and(|f| f.skipping)
    }

    /// Push a frame for a `[` found at `bookmark`.
    ///
    /// The new frame starts a skip when nothing is skipping yet and the
    /// current cell is zero. Returns whether this push started a skip.
    pub fn open(&mut self, bookmark: Bookmark, cell_is_zero: bool) -> Result<bool, TryReserveError> {
        if self.frames.len() == self.frames.capacity() {
            self.frames.try_reserve_exact(self.frames.capacity().max(1))?;
        }
        let already_skipping = self.is_skipping();
        let skipping = already_skipping || cell_is_zero;
        self.frames.push(Frame { bookmark, skipping });
        Ok(skipping && !already_skipping)
    }

    /// Pop the innermost frame for a `]`. `None` means the `]` is unmatched.
    pub fn close(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn innermost(&self) -> Option<&Frame> {
        self.frames.last()
    }

}
