//! The streaming interpreter.
//!
//! Instructions are read straight off the program stream, one byte at a
//! time. There is no parse pass and no jump table: every `[` pushes the
//! bookmark taken just before it, and a `]` that needs another iteration
//! rewinds the stream to that bookmark so the loop header is read and
//! tested again. A `[` that tests zero puts the interpreter in skip mode,
//! where the body is still scanned (nested brackets must be counted) but
//! nothing else takes effect until the matching `]`.

use std::collections::TryReserveError;
use std::fmt;
use std::io::{self, ErrorKind, Read, Seek, Write};

use crate::instruction::Instruction;
use crate::source::{Bookmark, ProgramSource};
use crate::stack::BracketStack;
use crate::tape::{Tape, TapeError, TapeView};

/// What the current cell is set to when `,` hits end of input.
pub const CELL_VALUE_EOF: u8 = 0;

/// Terminal status of a failed run.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The tape or the bracket stack could not grow.
    #[error("error while allocating memory for the {target}: {source}")]
    Allocation {
        target: Growth,
        /// Offset of the instruction that needed the memory; `None` at startup.
        offset: Option<u64>,
        #[source]
        source: TryReserveError,
    },

    /// `<` was executed on cell 0.
    #[error("the program went past the start of the tape at offset {offset}")]
    LeftBound { offset: u64 },

    /// A `]` with no open `[`, or a `[` still open at end of program.
    #[error("improperly nested jumps [ and ]: unmatched {kind} at offset {offset}")]
    Nesting { offset: u64, kind: BracketKind },

    /// Reading the program or input, or writing output, failed.
    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl ExecutionError {
    /// Offset in the program of the instruction the run stopped on.
    pub fn offset(&self) -> Option<u64> {
        match self {
            ExecutionError::Allocation { offset, .. } => *offset,
            ExecutionError::LeftBound { offset }
            | ExecutionError::Nesting { offset, .. }
            | ExecutionError::Io { offset, .. } => Some(*offset),
        }
    }
}

/// Which structure failed to grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Tape,
    BracketStack,
}

impl fmt::Display for Growth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Growth::Tape => write!(f, "tape"),
            Growth::BracketStack => write!(f, "bracket stack"),
        }
    }
}

/// Which side of a loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

/// The effect of one dispatched instruction, reported to trace observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MovedRight { to: usize, grown_to: Option<usize> },
    MovedLeft { to: usize },
    Incremented { from: u8, to: u8 },
    Decremented { from: u8, to: u8 },
    Wrote(u8),
    /// `None` is end of input.
    Read(Option<u8>),
    EnteredLoop,
    StartedSkip,
    /// A `[` inside a skipped body.
    OpenedWhileSkipping,
    /// A `]` inside a skipped body that closes a nested `[`.
    ClosedWhileSkipping,
    EndedSkip,
    Repeated { to: u64 },
    ExitedLoop,
    /// A non-bracket instruction inside a skipped body.
    Suppressed,
    Dumped,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::MovedRight { to, grown_to: None } => write!(f, "Moved pointer head to index {to}"),
            Action::MovedRight { to, grown_to: Some(len) } => {
                write!(f, "Grew tape to {len} cells; moved pointer head to index {to}")
            }
            Action::MovedLeft { to } => write!(f, "Moved pointer head to index {to}"),
            Action::Incremented { from, to } => write!(f, "Increment cell from {from} to {to}"),
            Action::Decremented { from, to } => write!(f, "Decrement cell from {from} to {to}"),
            Action::Wrote(b) => write!(f, "Output byte {b}"),
            Action::Read(Some(b)) => write!(f, "Read byte {b}"),
            Action::Read(None) => write!(f, "End of input; set cell to {CELL_VALUE_EOF}"),
            Action::EnteredLoop => write!(f, "Enter loop (cell != 0)"),
            Action::StartedSkip => write!(f, "Cell is 0; skip to matching ']'"),
            Action::OpenedWhileSkipping => write!(f, "Skipping; track nested '['"),
            Action::ClosedWhileSkipping => write!(f, "Skipping; close nested '['"),
            Action::EndedSkip => write!(f, "Reached matching ']'; stop skipping"),
            Action::Repeated { to } => write!(f, "Cell != 0; jump back to '[' at offset {to}"),
            Action::ExitedLoop => write!(f, "Exit loop (cell is 0)"),
            Action::Suppressed => write!(f, "Skipped"),
            Action::Dumped => write!(f, "Dumped tape"),
        }
    }
}

/// One row of an execution trace.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Zero-based count of dispatched instructions.
    pub index: u64,
    /// Offset of the instruction in the program.
    pub offset: u64,
    /// Cursor before the instruction ran.
    pub cursor: usize,
    /// Current cell before the instruction ran.
    pub cell: u8,
    pub instruction: Instruction,
    pub action: Action,
}

/// What a successful run leaves behind.
#[derive(Debug)]
pub struct RunSummary {
    pub tape: Tape,
    /// Number of instructions dispatched, including ones suppressed by skipping.
    pub steps: u64,
}

type TapeObserver = (usize, Box<dyn FnMut(&TapeView<'_>) + Send>);
type TraceObserver = Box<dyn FnMut(&Step) + Send>;

/// Runs one program from a seekable stream.
///
/// `,` reads from `input` and `.` writes to `output`. The tape and bracket
/// stack only live for the duration of [`Interpreter::run`].
pub struct Interpreter<R, I, W> {
    source: ProgramSource<R>,
    input: I,
    output: W,
    tape_observer: Option<TapeObserver>,
    trace_observer: Option<TraceObserver>,
}

impl<R, I, W> Interpreter<R, I, W>
where
    R: Read + Seek,
    I: Read,
    W: Write,
{
    pub fn new(program: R, input: I, output: W) -> Self {
        Self::from_source(ProgramSource::new(program), input, output)
    }

    pub fn from_source(source: ProgramSource<R>, input: I, output: W) -> Self {
        Self {
            source,
            input,
            output,
            tape_observer: None,
            trace_observer: None,
        }
    }

    /// Enable the `#` instruction. Each `#` outside skip mode hands the
    /// observer a page-aligned view of `window` cells around the cursor.
    pub fn set_tape_observer<F>(&mut self, window: usize, observer: F)
    where
        F: FnMut(&TapeView<'_>) + Send + 'static,
    {
        self.tape_observer = Some((window.max(1), Box::new(observer)));
    }

    /// Receive a [`Step`] for every dispatched instruction.
    pub fn set_trace_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Step) + Send + 'static,
    {
        self.trace_observer = Some(Box::new(observer));
    }

    /// Run the program to completion or to its first error.
    ///
    /// Output is flushed either way; bytes written before an error stay written.
    pub fn run(mut self) -> Result<RunSummary, ExecutionError> {
        let result = self.execute();
        let flushed = self.output.flush();
        let summary = result?;
        flushed.map_err(|source| ExecutionError::Io {
            offset: self.source.bookmark().offset(),
            source,
        })?;
        Ok(summary)
    }

    fn execute(&mut self) -> Result<RunSummary, ExecutionError> {
        let mut tape = Tape::new().map_err(|source| ExecutionError::Allocation {
            target: Growth::Tape,
            offset: None,
            source,
        })?;
        let mut stack = BracketStack::new().map_err(|source| ExecutionError::Allocation {
            target: Growth::BracketStack,
            offset: None,
            source,
        })?;

        let mut steps: u64 = 0;
        // Re-taken after every byte, so at a '[' this is the '[' itself.
        let mut mark = self.source.bookmark();

        while let Some(byte) = self
            .source
            .next_byte()
            .map_err(|source| ExecutionError::Io { offset: mark.offset(), source })?
        {
            let instruction = match Instruction::from_byte(byte) {
                Some(Instruction::Dump) if self.tape_observer.is_none() => None,
                other => other,
            };

            if let Some(instruction) = instruction {
                let (cursor, cell) = (tape.cursor(), tape.read_cell());
                let action = self.dispatch(instruction, mark, &mut tape, &mut stack)?;

                if let Some(observer) = self.trace_observer.as_mut() {
                    observer(&Step {
                        index: steps,
                        offset: mark.offset(),
                        cursor,
                        cell,
                        instruction,
                        action,
                    });
                }
                steps += 1;
            }

            mark = self.source.bookmark();
        }

        if let Some(frame) = stack.innermost() {
            return Err(ExecutionError::Nesting {
                offset: frame.bookmark.offset(),
                kind: BracketKind::Open,
            });
        }

        Ok(RunSummary { tape, steps })
    }

    fn dispatch(
        &mut self,
        instruction: Instruction,
        at: Bookmark,
        tape: &mut Tape,
        stack: &mut BracketStack,
    ) -> Result<Action, ExecutionError> {
        let offset = at.offset();
        let io_error = |source| ExecutionError::Io { offset, source };

        if stack.is_skipping()
            && !matches!(instruction, Instruction::JumpIfZero | Instruction::JumpIfNotZero)
        {
            return Ok(Action::Suppressed);
        }

        let action = match instruction {
            Instruction::Right => {
                let grown_to = tape.move_right().map_err(|e| tape_failure(e, offset))?;
                Action::MovedRight { to: tape.cursor(), grown_to }
            }
            Instruction::Left => {
                tape.move_left().map_err(|e| tape_failure(e, offset))?;
                Action::MovedLeft { to: tape.cursor() }
            }
            Instruction::Increment => {
                let from = tape.read_cell();
                tape.increment();
                Action::Incremented { from, to: tape.read_cell() }
            }
            Instruction::Decrement => {
                let from = tape.read_cell();
                tape.decrement();
                Action::Decremented { from, to: tape.read_cell() }
            }
            Instruction::Output => {
                let byte = tape.read_cell();
                self.output.write_all(&[byte]).map_err(io_error)?;
                Action::Wrote(byte)
            }
            Instruction::Input => {
                let byte = read_byte(&mut self.input).map_err(io_error)?;
                tape.write_cell(byte.unwrap_or(CELL_VALUE_EOF));
                Action::Read(byte)
            }
            Instruction::JumpIfZero => {
                let nested = stack.is_skipping();
                let started = stack
                    .open(at, tape.read_cell() == 0)
                    .map_err(|source| ExecutionError::Allocation {
                        target: Growth::BracketStack,
                        offset: Some(offset),
                        source,
                    })?;
                if nested {
                    Action::OpenedWhileSkipping
                } else if started {
                    Action::StartedSkip
                } else {
                    Action::EnteredLoop
                }
            }
            Instruction::JumpIfNotZero => {
                let frame = stack.close().ok_or(ExecutionError::Nesting {
                    offset,
                    kind: BracketKind::Close,
                })?;
                if frame.skipping {
                    // The cell that started the skip is still zero: nothing to repeat.
                    if stack.is_skipping() {
                        Action::ClosedWhileSkipping
                    } else {
                        Action::EndedSkip
                    }
                } else if tape.read_cell() != 0 {
                    self.source.rewind_to(frame.bookmark).map_err(io_error)?;
                    Action::Repeated { to: frame.bookmark.offset() }
                } else {
                    Action::ExitedLoop
                }
            }
            Instruction::Dump => {
                if let Some((window, observer)) = self.tape_observer.as_mut() {
                    observer(&tape.view(*window));
                }
                Action::Dumped
            }
        };

        Ok(action)
    }
}

fn tape_failure(err: TapeError, offset: u64) -> ExecutionError {
    match err {
        TapeError::Exhausted { source, .. } => ExecutionError::Allocation {
            target: Growth::Tape,
            offset: Some(offset),
            source,
        },
        TapeError::LeftBound => ExecutionError::LeftBound { offset },
    }
}

/// Read exactly one byte; `Ok(None)` on end of input.
fn read_byte<I: Read>(input: &mut I) -> io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match input.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn outcome(program: &[u8]) -> (Option<&'static str>, Vec<u8>) {
        let mut out = Vec::new();
        let result = Interpreter::new(Cursor::new(program), &b"in"[..], &mut out).run();
        let status = match result {
            Ok(_) => None,
            Err(ExecutionError::Allocation { .. }) => Some("allocation"),
            Err(ExecutionError::LeftBound { .. }) => Some("left bound"),
            Err(ExecutionError::Nesting { .. }) => Some("nesting"),
            Err(ExecutionError::Io { .. }) => Some("io"),
        };
        (status, out)
    }

    fn is_instruction(b: &u8) -> bool {
        b"><+-.,[]".contains(b)
    }

    proptest! {
        #[test]
        fn comments_are_transparent_in_straight_line_code(program in "[-+<>.,a-z #\n]{0,80}") {
            let stripped: Vec<u8> = program.bytes().filter(is_instruction).collect();
            prop_assert_eq!(outcome(program.as_bytes()), outcome(&stripped));
        }

        #[test]
        fn comments_are_transparent_inside_loops(
            noise in prop::collection::vec("[a-zA-Z0-9 \n!?#]{0,3}", 32)
        ) {
            let base = b"++++[>++++[>+++<-]<-]>>.>[This < is skipped].";
            let mut noisy = Vec::new();
            for (i, &b) in base.iter().enumerate() {
                noisy.extend_from_slice(noise[i % noise.len()].as_bytes());
                noisy.push(b);
            }
            prop_assert_eq!(outcome(&noisy), outcome(base));
        }

        #[test]
        fn unbalanced_brackets_are_nesting_errors(opens in prop::collection::vec(any::<bool>(), 1..48)) {
            let program: Vec<u8> = opens.iter().map(|&o| if o { b'[' } else { b']' }).collect();
            let open_count = opens.iter().filter(|&&o| o).count();
            prop_assume!(open_count * 2 != opens.len());
            prop_assert_eq!(outcome(&program).0, Some("nesting"));
        }
    }
}
