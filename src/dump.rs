//! Human-readable tape dumps for the `#` debug instruction.

use std::fmt;

use crate::tape::TapeView;

/// Cells printed per dump row.
pub const ROW_CELLS: usize = 16;

impl fmt::Display for TapeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tape: {} cells, cursor at {}", self.len, self.cursor)?;

        for (row, chunk) in self.cells.chunks(ROW_CELLS).enumerate() {
            let start = self.base + row * ROW_CELLS;
            write!(f, "  {start:06}:")?;
            for (i, &cell) in chunk.iter().enumerate() {
                if start + i == self.cursor {
                    write!(f, "[{cell:3}]")?;
                } else {
                    write!(f, " {cell:3} ")?;
                }
            }
            // Pad short rows so the gutters line up.
            for _ in chunk.len()..ROW_CELLS {
                write!(f, "     ")?;
            }

            write!(f, " |")?;
            for &cell in chunk {
                let shown = if cell.is_ascii_graphic() || cell == b' ' {
                    cell as char
                } else {
                    '.'
                };
                write!(f, "{shown}")?;
            }
            writeln!(f, "|")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::tape::Tape;

    #[test]
    fn marks_the_cursor_and_prints_a_gutter() {
        let mut tape = Tape::new().unwrap();
        tape.move_right().unwrap();
        for _ in 0..72 {
            tape.increment();
        }
        let text = tape.view(4).to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("tape: 1000 cells, cursor at 1"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("  000000:   0 [ 72]   0    0 "));
        assert!(row.ends_with(" |.H..|"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn wide_windows_wrap_into_rows() {
        let mut tape = Tape::new().unwrap();
        for _ in 0..40 {
            tape.move_right().unwrap();
        }
        let text = tape.view(64).to_string();
        assert_eq!(text.lines().count(), 1 + 64 / super::ROW_CELLS);
        assert!(text.contains("  000032:"));
        assert!(text.contains("[  0]"));
    }
}
