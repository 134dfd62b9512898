//! Components relating to the abstract syntax trees (ASTs)
//! used in representing LMC programs.
//!
//! These components together are used to construct...
//! - [`asm::Instr`] (a data structure holding one not-yet-encoded source line),
//! - and [`sim::SimInstr`] (a data structure holding a decoded mailbox word).

pub mod asm;
pub mod sim;

/// The number of mailboxes (memory cells) in the machine.
pub const NUM_MAILBOXES: usize = 100;

macro_rules! opcode_enum {
    ($($op:ident = $code:literal),+) => {
        /// An opcode mnemonic.
        ///
        /// Variants are declared in mnemonic-table order,
        /// which is also the order mnemonics are matched in.
        ///
        /// This is case-insensitive when parsed from source.
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub enum Opcode {
            $(
                #[allow(missing_docs)]
                $op
            ),+
        }

        impl Opcode {
            /// All opcodes, in declaration order.
            pub const ALL: &'static [Opcode] = &[$(Opcode::$op),+];

            /// The mnemonic of this opcode (e.g., `"ADD"`).
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$op => stringify!($op)),+
                }
            }

            /// The hundreds digit this opcode is encoded with.
            ///
            /// `INP` and `OUT` share code 9 and are told apart by their
            /// selector (see [`Opcode::selector`]).
            pub fn code(self) -> u8 {
                match self {
                    $(Opcode::$op => $code),+
                }
            }
        }
    };
}
opcode_enum! {
    HLT = 0, ADD = 1, SUB = 2, STA = 3, DAT = 4, LDA = 5,
    BRA = 6, BRZ = 7, BRP = 8, INP = 9, OUT = 9
}

impl Opcode {
    /// The fixed low two digits of opcodes that do not take an operand.
    ///
    /// This is `Some(1)` for `INP` and `Some(2)` for `OUT`, and `None` otherwise.
    pub fn selector(self) -> Option<u8> {
        match self {
            Opcode::INP => Some(1),
            Opcode::OUT => Some(2),
            _ => None
        }
    }
}
impl std::str::FromStr for Opcode {
    type Err = ();

    /// Matches a mnemonic, case-insensitively.
    ///
    /// Only exactly three-letter strings can match.
    /// When more than one mnemonic matches, the first one declared wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(());
        }

        Opcode::ALL.iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A 1-based line/column position in source code.
///
/// Columns count characters since the start of the line.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct SrcPos {
    /// The line number (starting at 1).
    pub line: usize,
    /// The column number (starting at 1).
    pub column: usize
}
impl SrcPos {
    /// Creates a new source position.
    pub fn new(line: usize, column: usize) -> Self {
        SrcPos { line, column }
    }
}
impl std::fmt::Display for SrcPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A label.
///
/// This borrows the name of the label from the source buffer
/// and records the position where it starts.
/// It is used both for label definitions and label references.
///
/// # Examples
/// ```text
///       INP
///       BRZ DONE
///           ~~~~
/// LOOP  OUT
/// ~~~~
///       BRA LOOP
///           ~~~~
/// DONE  HLT
/// ~~~~
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label<'s> {
    /// The label's identifier, as written in source.
    pub name: &'s str,
    /// Where the label starts in source.
    pub pos: SrcPos
}
impl<'s> Label<'s> {
    /// Creates a new label.
    pub fn new(name: &'s str, pos: SrcPos) -> Self {
        Label { name, pos }
    }

    /// Checks whether this label has the given name.
    ///
    /// Names are compared case-insensitively and must have the same length.
    pub fn matches(&self, name: &str) -> bool {
        self.name.len() == name.len() && self.name.eq_ignore_ascii_case(name)
    }
}
impl std::fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.name.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::{Label, Opcode, SrcPos};

    #[test]
    fn test_opcode_parse() {
        assert_eq!("ADD".parse(), Ok(Opcode::ADD));
        assert_eq!("add".parse(), Ok(Opcode::ADD));
        assert_eq!("bRz".parse(), Ok(Opcode::BRZ));
        assert_eq!("inp".parse(), Ok(Opcode::INP));
        assert_eq!("ADDX".parse::<Opcode>(), Err(()));
        assert_eq!("AD".parse::<Opcode>(), Err(()));
        assert_eq!("NOP".parse::<Opcode>(), Err(()));
        assert_eq!("A1D".parse::<Opcode>(), Err(()));
    }

    #[test]
    fn test_opcode_codes() {
        let codes: Vec<_> = Opcode::ALL.iter().map(|op| op.code()).collect();
        assert_eq!(codes, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9]);
        assert_eq!(Opcode::INP.selector(), Some(1));
        assert_eq!(Opcode::OUT.selector(), Some(2));
        assert_eq!(Opcode::ADD.selector(), None);
    }

    #[test]
    fn test_label_matches() {
        let label = Label::new("Loop", SrcPos::new(1, 1));
        assert!(label.matches("LOOP"));
        assert!(label.matches("loop"));
        assert!(!label.matches("LOOPS"));
        assert!(!label.matches("LOO"));
    }
}
