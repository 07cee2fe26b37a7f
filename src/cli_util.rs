use std::env;
use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;

use crate::config::{self, Colors};
use crate::interpreter::{BracketKind, ExecutionError};

/// Characters of source shown on either side of the error position.
const WINDOW_CHARS: usize = 32;

/// Styled output only for a terminal stderr; keep pipelines clean otherwise.
pub fn stderr_is_styled() -> bool {
    io::stderr().is_terminal() && env::var_os("NO_COLOR").is_none()
}

/// Pretty-print a run error to stderr, prefixed by the program name, with
/// a `path:line:column` pointer and a caret under the failing instruction
/// when the program text is available.
pub fn print_execution_error(program: &str, path: &str, code: Option<&[u8]>, err: &ExecutionError) {
    let colors = stderr_is_styled().then(|| &config::settings().colors);
    let mut stderr = io::stderr().lock();
    let _ = write_execution_error(&mut stderr, program, path, code, err, colors);
    let _ = stderr.flush();
}

pub fn write_execution_error<W: Write>(
    out: &mut W,
    program: &str,
    path: &str,
    code: Option<&[u8]>,
    err: &ExecutionError,
    colors: Option<&Colors>,
) -> io::Result<()> {
    let header = paint(colors.map(|c| c.error.bold()), "error");
    writeln!(out, "{program}: {header}: {}", describe(err))?;

    let (Some(code), Some(offset)) = (code, err.offset()) else {
        return Ok(());
    };
    let Some(loc) = locate(code, offset) else {
        return Ok(());
    };

    let arrow = paint(colors.map(|c| Style::new().fg(c.location)), "-->");
    writeln!(out, "  {arrow} {path}:{}:{}", loc.line, loc.column)?;
    writeln!(out, "  {}", loc.snippet)?;
    let caret = paint(colors.map(|c| c.caret.bold()), "^");
    writeln!(out, "  {}{caret}", " ".repeat(loc.caret))
}

/// One-line description of a terminal status, in the wording of the CLI.
pub fn describe(err: &ExecutionError) -> String {
    match err {
        ExecutionError::Allocation { target, source, .. } => {
            format!("error while allocating memory for the {target} ({source})")
        }
        ExecutionError::LeftBound { .. } => "the program went past the start of the tape".to_string(),
        ExecutionError::Nesting { kind: BracketKind::Close, .. } => {
            "improperly nested jumps [ and ]: ']' has no matching '['".to_string()
        }
        ExecutionError::Nesting { kind: BracketKind::Open, .. } => {
            "improperly nested jumps [ and ]: '[' is never closed".to_string()
        }
        ExecutionError::Io { source, .. } => format!("I/O error: {source}"),
    }
}

/// Where a byte offset falls in the program text.
#[derive(Debug, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// The surrounding part of the line, tabs flattened to spaces.
    pub snippet: String,
    /// Characters of `snippet` before the offending byte.
    pub caret: usize,
}

pub fn locate(code: &[u8], offset: u64) -> Option<Location> {
    let offset = usize::try_from(offset).ok().filter(|&o| o < code.len())?;

    let line_start = code[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let line_end = code[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(code.len(), |i| offset + i);
    let line = code[..line_start].iter().filter(|&&b| b == b'\n').count() + 1;

    let before: Vec<char> = String::from_utf8_lossy(&code[line_start..offset]).chars().collect();
    let after: Vec<char> = String::from_utf8_lossy(&code[offset..line_end]).chars().collect();

    let shown_before = &before[before.len().saturating_sub(WINDOW_CHARS)..];
    let shown_after = &after[..after.len().min(WINDOW_CHARS + 1)];
    let snippet = shown_before
        .iter()
        .chain(shown_after)
        .map(|&c| if c == '\t' { ' ' } else { c })
        .collect();

    Some(Location {
        line,
        column: before.len() + 1,
        snippet,
        caret: shown_before.len(),
    })
}

fn paint(style: Option<Style>, text: &str) -> String {
    match style {
        Some(style) => style.paint(text).to_string(),
        None => text.to_string(),
    }
}
