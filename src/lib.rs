//! MaxBF: a streaming Brainfuck interpreter.
//!
//! Programs are executed straight from a seekable byte stream, without a
//! parse pass or a precomputed jump table. Loops rewind the stream to the
//! position recorded before their `[` and re-read the body.
//!
//! Features and behaviors:
//! - Memory tape of 1000 zeroed cells that doubles whenever the pointer
//!   moves past its end.
//! - Moving left of cell 0 is an error; there is no wrap-around.
//! - Cells are bytes with wrap-around arithmetic.
//! - Input `,` reads a single byte; on end of input the current cell is set to 0.
//! - Output `.` writes the current cell as a raw byte.
//! - Unmatched `[` or `]` are reported as nesting errors.
//! - Any other byte is a comment and is ignored, even inside loops.
//! - Optional `#` tape dumps and step traces through observers.
//!
//! Quick start:
//!
//! ```
//! use std::io::Cursor;
//!
//! let code = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
//! let mut out = Vec::new();
//! maxbf::execute(Cursor::new(code), std::io::empty(), &mut out).expect("program should run");
//! assert_eq!(out, b"Hello World!\n");
//! ```

use std::io::{Read, Seek, Write};

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod dump;
pub mod instruction;
pub mod interpreter;
pub mod source;
pub mod stack;
pub mod tape;

pub use instruction::Instruction;
pub use interpreter::{
    Action, BracketKind, ExecutionError, Growth, Interpreter, RunSummary, Step, CELL_VALUE_EOF,
};
pub use source::{Bookmark, ProgramSource};
pub use stack::{BracketStack, Frame};
pub use tape::{Tape, TapeError, TapeView};

/// Run `program` with no observers attached.
pub fn execute<R, I, W>(program: R, input: I, output: W) -> Result<RunSummary, ExecutionError>
where
    R: Read + Seek,
    I: Read,
    W: Write,
{
    Interpreter::new(program, input, output).run()
}
