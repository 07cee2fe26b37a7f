use std::fmt;

/// One decoded program byte. Everything else in the source is a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    JumpIfZero,
    /// `]`
    JumpIfNotZero,
    /// `#`, only honoured when a tape observer is installed.
    Dump,
}

impl Instruction {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'>' => Instruction::Right,
            b'<' => Instruction::Left,
            b'+' => Instruction::Increment,
            b'-' => Instruction::Decrement,
            b'.' => Instruction::Output,
            b',' => Instruction::Input,
            b'[' => Instruction::JumpIfZero,
            b']' => Instruction::JumpIfNotZero,
            b'#' => Instruction::Dump,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::Right => '>',
            Instruction::Left => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
            Instruction::JumpIfZero => '[',
            Instruction::JumpIfNotZero => ']',
            Instruction::Dump => '#',
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_instruction_set() {
        for &b in b"><+-.,[]#" {
            let instr = Instruction::from_byte(b).unwrap();
            assert_eq!(instr.as_char(), b as char);
        }
    }

    #[test]
    fn everything_else_is_a_comment() {
        for b in (0..=u8::MAX).filter(|b| !b"><+-.,[]#".contains(b)) {
            assert_eq!(Instruction::from_byte(b), None);
        }
    }
}
