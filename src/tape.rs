//! The memory tape: a left-bounded, right-growing row of byte cells.

use std::collections::TryReserveError;

/// Number of zeroed cells every fresh tape starts with.
pub const INITIAL_TAPE_SIZE: usize = 1000;

/// Failures raised by tape movement.
#[derive(Debug, thiserror::Error)]
pub enum TapeError {
    /// The allocator refused to double the tape.
    #[error("tape could not grow past {len} cells: {source}")]
    Exhausted {
        len: usize,
        #[source]
        source: TryReserveError,
    },

    /// `<` was executed while the cursor sat on cell 0.
    #[error("cursor is already at the first cell")]
    LeftBound,
}

/// A growable byte tape with a cursor.
///
/// The cursor is an index, never a reference, so growing the backing
/// buffer can't invalidate it. `cursor < cells.len()` holds at all times.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    cursor: usize,
}

impl Tape {
    /// Allocate a tape of [`INITIAL_TAPE_SIZE`] zeroed cells.
    pub fn new() -> Result<Self, TryReserveError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(INITIAL_TAPE_SIZE)?;
        cells.resize(INITIAL_TAPE_SIZE, 0);
        Ok(Self { cells, cursor: 0 })
    }

    /// Advance the cursor, doubling the tape first when it sits on the last cell.
    ///
    /// Returns the new tape length when a growth happened.
    pub fn move_right(&mut self) -> Result<Option<usize>, TapeError> {
        let mut grown = None;
        if self.cursor == self.cells.len() - 1 {
            let len = self.cells.len();
            self.cells
                .try_reserve_exact(len)
                .map_err(|source| TapeError::Exhausted { len, source })?;
            self.cells.resize(len * 2, 0);
            grown = Some(self.cells.len());
        }
        self.cursor += 1;
        Ok(grown)
    }

    /// Step the cursor back one cell. Cell 0 is a hard wall.
    pub fn move_left(&mut self) -> Result<(), TapeError> {
        if self.cursor == 0 {
            return Err(TapeError::LeftBound);
        }
        self.cursor -= 1;
        Ok(())
    }

    pub fn increment(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.cursor] = self.cells[self.cursor].wrapping_sub(1);
    }

    pub fn read_cell(&self) -> u8 {
        self.cells[self.cursor]
    }

    pub fn write_cell(&mut self, value: u8) {
        self.cells[self.cursor] = value;
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a tape built by [`Tape::new`].
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Borrow a page-aligned window of `window` cells containing the cursor.
    pub fn view(&self, window: usize) -> TapeView<'_> {
        let window = window.max(1);
        let base = self.cursor - self.cursor % window;
        let end = (base + window).min(self.cells.len());
        TapeView {
            cursor: self.cursor,
            base,
            len: self.cells.len(),
            cells: &self.cells[base..end],
        }
    }
}

/// A read-only slice of the tape handed to tape observers.
#[derive(Debug, Clone, Copy)]
pub struct TapeView<'a> {
    /// Absolute cursor position.
    pub cursor: usize,
    /// Absolute index of `cells[0]`.
    pub base: usize,
    /// Total tape length at the time of the view.
    pub len: usize,
    pub cells: &'a [u8],
}
