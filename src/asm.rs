//! Assembling LMC source code into mailboxes.
//!
//! This module is used to convert source code into a [`MailboxStore`]
//! that can be executed by the simulator.
//!
//! Assembly happens in two passes:
//! 1. The source is parsed into intermediate instructions (see [`crate::parse`]),
//!    which also defines every label in the [`SymbolTable`].
//! 2. Each intermediate instruction is encoded into its mailbox,
//!    resolving any label operands through the symbol table.
//!
//! The assembler module notably consists of:
//! - [`assemble`] and [`assemble_debug`]: The main functions which assemble source code into mailboxes.
//! - [`SymbolTable`]: a struct holding the label definitions found during the first pass

use std::borrow::Cow;

use crate::ast::asm::{Instr, Operand};
use crate::ast::{Label, SrcPos, NUM_MAILBOXES};
use crate::parse::lex::LexErr;
use crate::parse::parse_program;
use crate::sim::mem::MailboxStore;

/// Assembles source code into mailboxes.
///
/// On failure, no mailboxes are produced at all.
///
/// # Example
/// ```
/// use lmc_ensemble::asm::assemble;
///
/// let src = "
///     INP
///     STA 99
///     LDA 99
///     ADD 99
///     OUT
///     HLT
/// ";
/// let mem = assemble(src).unwrap();
/// assert_eq!(&mem.as_slice()[..6], &[901, 399, 599, 199, 902, 0]);
///
/// let err = assemble("INP\nSTA ?").unwrap_err();
/// assert_eq!(err.to_string(), "Unknown token on line 2:5: ?");
/// ```
pub fn assemble(src: &str) -> Result<MailboxStore, AsmErr> {
    assemble_debug(src).map(|(mem, _)| mem)
}

/// Assembles source code into mailboxes,
/// also returning the symbol table built while assembling.
///
/// # Example
/// ```
/// use lmc_ensemble::asm::assemble_debug;
///
/// let src = "
///     BRA DONE
///     OUT
/// DONE HLT
/// ";
/// let (mem, sym) = assemble_debug(src).unwrap();
/// assert_eq!(mem[0], 602);
/// assert_eq!(sym.lookup_label("DONE"), Some(2));
/// ```
pub fn assemble_debug(src: &str) -> Result<(MailboxStore, SymbolTable<'_>), AsmErr> {
    let mut sym = SymbolTable::new();
    let instrs = parse_program(src, &mut sym)?;

    let mut mem = MailboxStore::new();
    for (mailbox, instr) in mem.as_mut_slice().iter_mut().zip(&instrs) {
        *mailbox = encode(instr, &sym)?;
    }

    log::debug!("assembled {} mailbox(es), {} label(s)", instrs.len(), sym.label_iter().count());
    Ok((mem, sym))
}

/// Encodes an intermediate instruction into its mailbox word.
///
/// The word is `code * 100`, plus either the address of the label operand
/// or the literal offset.
fn encode(instr: &Instr<'_>, sym: &SymbolTable<'_>) -> Result<i16, AsmErr> {
    let low = match instr.operand {
        Operand::None => 0,
        Operand::Offset(off) => off % 100,
        Operand::Label(label) => sym.lookup_label(label.name)
            .ok_or_else(|| AsmErr::new(AsmErrKind::CouldNotFindLabel, label.pos, label.name))?,
    };

    Ok(i16::from(instr.code) * 100 + i16::from(low))
}

/// Kinds of errors that can occur from assembling given assembly code.
///
/// See [`AsmErr`] for this error type with position information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AsmErrKind {
    /// Token could not be lexed (pass 1).
    Lex(LexErr),
    /// Token does not fit where it appears in its line (pass 1).
    UnexpectedToken,
    /// A label was defined on a line without an instruction (pass 1).
    MissingOpcode,
    /// The program does not fit in the mailboxes (pass 1).
    ProgramTooLarge,
    /// There were multiple labels of the same name (pass 1).
    DuplicateLabel,
    /// Label operand was never defined (pass 2).
    CouldNotFindLabel,
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(e)            => e.fmt(f),
            Self::UnexpectedToken   => f.write_str("unexpected token"),
            Self::MissingOpcode     => f.write_str("label is missing an instruction"),
            Self::ProgramTooLarge   => f.write_str("program does not fit in memory"),
            Self::DuplicateLabel    => f.write_str("label was defined multiple times"),
            Self::CouldNotFindLabel => f.write_str("label could not be found"),
        }
    }
}

/// Error from assembling given assembly code.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// Where the offending token starts.
    pub pos: SrcPos,
    /// The text of the offending token.
    pub token: String
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, pos: SrcPos, token: impl Into<String>) -> Self {
        AsmErr { kind, pos, token: token.into() }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            AsmErrKind::ProgramTooLarge => f.write_str("Program is too large"),
            _ => write!(f, "Unknown token on line {}: {}", self.pos, self.token)
        }
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::Lex(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn pos(&self) -> Option<SrcPos> {
        Some(self.pos)
    }

    fn help(&self) -> Option<Cow<str>> {
        match &self.kind {
            AsmErrKind::Lex(e)            => e.help(),
            AsmErrKind::UnexpectedToken   => Some("a line holds an optional label, a mnemonic, and at most one operand".into()),
            AsmErrKind::MissingOpcode     => Some("add an instruction after this label".into()),
            AsmErrKind::ProgramTooLarge   => Some(format!("a program can hold at most {NUM_MAILBOXES} instructions").into()),
            AsmErrKind::DuplicateLabel    => Some("labels must be unique within a file, try renaming one of the labels".into()),
            AsmErrKind::CouldNotFindLabel => Some("try adding this label before an instruction".into()),
        }
    }
}

/// The symbol table created in the first assembler pass.
///
/// This maps each mailbox address to the label defined there (if any).
/// Lookups by name compare case-insensitively, and only match names of the same length.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SymbolTable<'s> {
    labels: [Option<Label<'s>>; NUM_MAILBOXES]
}
impl<'s> SymbolTable<'s> {
    /// Creates a new, empty symbol table.
    pub fn new() -> Self {
        SymbolTable { labels: [None; NUM_MAILBOXES] }
    }

    /// Defines a label at the given address.
    ///
    /// This fails if a label of the same name was already defined.
    pub(crate) fn add_label(&mut self, label: Label<'s>, addr: usize) -> Result<(), AsmErr> {
        if self.labels.iter().flatten().any(|l| l.matches(label.name)) {
            return Err(AsmErr::new(AsmErrKind::DuplicateLabel, label.pos, label.name));
        }

        let slot = self.labels.get_mut(addr)
            .ok_or_else(|| AsmErr::new(AsmErrKind::ProgramTooLarge, label.pos, label.name))?;
        *slot = Some(label);

        log::debug!("defined label {label} at {addr:02}");
        Ok(())
    }

    /// Gets the address of a given label (if it exists).
    ///
    /// ## Example
    /// ```
    /// use lmc_ensemble::asm::assemble_debug;
    ///
    /// let src = "
    /// LOOP  INP
    ///       BRZ DONE
    ///       OUT
    ///       BRA LOOP
    /// DONE  HLT
    /// ";
    /// let (_, sym) = assemble_debug(src).unwrap();
    /// assert_eq!(sym.lookup_label("LOOP"), Some(0));
    /// assert_eq!(sym.lookup_label("done"), Some(4));
    /// assert_eq!(sym.lookup_label("DON"), None);
    /// ```
    pub fn lookup_label(&self, name: &str) -> Option<u8> {
        self.labels.iter()
            .position(|l| l.is_some_and(|l| l.matches(name)))
            .map(|addr| addr as u8)
    }

    /// Gets the label at a given mailbox address (if it exists).
    ///
    /// ## Example
    /// ```
    /// use lmc_ensemble::asm::assemble_debug;
    ///
    /// let src = "
    /// LOOP  INP
    ///       OUT
    ///       BRA LOOP
    /// ";
    /// let (_, sym) = assemble_debug(src).unwrap();
    /// assert_eq!(sym.rev_lookup_label(0), Some("LOOP"));
    /// assert_eq!(sym.rev_lookup_label(1), None);
    /// ```
    pub fn rev_lookup_label(&self, addr: u8) -> Option<&'s str> {
        let label = self.labels.get(usize::from(addr))?.as_ref()?;
        Some(label.name)
    }

    /// Gets the source position of a given label's definition (if it exists).
    pub fn find_label_source(&self, name: &str) -> Option<SrcPos> {
        self.labels.iter()
            .flatten()
            .find(|l| l.matches(name))
            .map(|l| l.pos)
    }

    /// Gets an iterable of the mapping from labels to addresses, in address order.
    pub fn label_iter(&self) -> impl Iterator<Item=(&'s str, u8)> + '_ {
        self.labels.iter()
            .enumerate()
            .filter_map(|(addr, l)| l.map(|l| (l.name, addr as u8)))
    }
}
impl Default for SymbolTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::ast::SrcPos;
    use crate::err::Error;
    use crate::parse::lex::LexErr;
    use crate::sim::mem::MailboxStore;

    use super::{assemble, assemble_debug, AsmErr, AsmErrKind};

    fn assert_asm_fail<T: std::fmt::Debug>(r: Result<T, AsmErr>, kind: AsmErrKind) -> AsmErr {
        let err = r.unwrap_err();
        assert_eq!(err.kind, kind);
        err
    }
    #[track_caller]
    fn assert_words(mem: &MailboxStore, words: &[i16]) {
        assert_eq!(&mem.as_slice()[..words.len()], words);
        assert!(mem.as_slice()[words.len()..].iter().all(|&w| w == 0), "expected remaining mailboxes to be zero");
    }

    #[test]
    fn test_basic_words() {
        let src = "
            INP
            STA 99
            LDA 99
            ADD 99
            OUT
            HLT
        ";
        assert_words(&assemble(src).unwrap(), &[901, 399, 599, 199, 902, 0]);
    }

    #[test]
    fn test_all_opcodes() {
        let src = "hlt 5\nadd 1\nsub 2\nsta 3\nlda 5\nbra 6\nbrz 7\nbrp 8\ninp\nout";
        assert_words(&assemble(src).unwrap(), &[5, 101, 202, 303, 505, 606, 707, 808, 901, 902]);
    }

    #[test]
    fn test_forward_label() {
        let src = "
              BRA DONE
              OUT
              OUT
        DONE  HLT
        ";
        assert_words(&assemble(src).unwrap(), &[603, 902, 902, 0]);
    }

    #[test]
    fn test_data_words() {
        let src = "
              LDA X
              ADD Y
              OUT
              HLT
        X     DAT 123
        Y     DAT 7
        Z     DAT
        ";
        let (mem, sym) = assemble_debug(src).unwrap();
        assert_words(&mem, &[504, 105, 902, 0, 123, 7, 400]);
        assert_eq!(sym.lookup_label("z"), Some(6));
    }

    #[test]
    fn test_dat_label_operand() {
        // A label operand on DAT keeps DAT's code as the hundreds digit:
        assert_words(&assemble("HLT\nDAT A\nA LDA 1").unwrap(), &[0, 402, 501]);
        assert_words(&assemble("A HLT\nB DAT A\nLDA B").unwrap(), &[0, 400, 501]);
    }

    #[test]
    fn test_operand_mod_100() {
        // Literal operands on real instructions only keep their low two digits:
        assert_words(&assemble("ADD 250\nBRA 999").unwrap(), &[150, 699]);
    }

    #[test]
    fn test_sym_table() {
        let src = "
        A     INP
              OUT
        C     BRA A
        Bb    HLT
        ";
        let (_, sym) = assemble_debug(src).unwrap();
        assert_eq!(sym.lookup_label("A"), Some(0));
        assert_eq!(sym.lookup_label("c"), Some(2));
        assert_eq!(sym.lookup_label("BB"), Some(3));
        assert_eq!(sym.lookup_label("B"), None);
        assert_eq!(sym.rev_lookup_label(2), Some("C"));
        assert_eq!(sym.rev_lookup_label(99), None);
        assert_eq!(sym.rev_lookup_label(200), None);
        assert_eq!(sym.find_label_source("bb"), Some(SrcPos::new(5, 9)));

        let labels: Vec<_> = sym.label_iter().collect();
        assert_eq!(labels, [("A", 0), ("C", 2), ("Bb", 3)]);
    }

    #[test]
    fn test_program_size() {
        let full = "DAT 1\n".repeat(100);
        let mem = assemble(&full).unwrap();
        assert!(mem.as_slice().iter().all(|&w| w == 1));

        let over = format!("{full}  HLT\n");
        let err = assert_asm_fail(assemble(&over), AsmErrKind::ProgramTooLarge);
        assert_eq!(err.to_string(), "Program is too large");
        assert_eq!(err.pos, SrcPos::new(101, 3));

        // A label on the 101st line is also too much:
        assert_asm_fail(assemble(&format!("{full}X HLT")), AsmErrKind::ProgramTooLarge);
        // So is a word that doesn't lex, before it is even lexed:
        for tail in ["?", "LO-OP HLT", "1000", "  #5 ; data"] {
            let err = assert_asm_fail(assemble(&format!("{full}{tail}")), AsmErrKind::ProgramTooLarge);
            assert_eq!(err.pos.line, 101, "unexpected line for {tail:?}");
        }
        // Comments and blank lines past the end are fine:
        assert!(assemble(&format!("{full}\n\n; end")).is_ok());
    }

    #[test]
    fn test_unknown_token_messages() {
        let err = assert_asm_fail(assemble("INP\nSTA ?"), AsmErrKind::Lex(LexErr::InvalidSymbol));
        assert_eq!(err.to_string(), "Unknown token on line 2:5: ?");
        assert_eq!(err.pos(), Some(SrcPos::new(2, 5)));

        let err = assert_asm_fail(assemble("INP\n  OUT 7"), AsmErrKind::UnexpectedToken);
        assert_eq!(err.to_string(), "Unknown token on line 2:7: 7");
        assert!(err.help().is_some());
    }

    #[test]
    fn test_undefined_label() {
        let err = assert_asm_fail(assemble("INP\nBRZ NOPE\nHLT"), AsmErrKind::CouldNotFindLabel);
        assert_eq!(err.to_string(), "Unknown token on line 2:5: NOPE");

        // Labels match on length exactly:
        assert_asm_fail(assemble("LOOPS HLT\nBRA LOOP"), AsmErrKind::CouldNotFindLabel);
    }

    #[test]
    fn test_duplicate_label() {
        let err = assert_asm_fail(assemble("X DAT 1\nY DAT 2\nx DAT 3"), AsmErrKind::DuplicateLabel);
        assert_eq!(err.pos, SrcPos::new(3, 1));
    }

    #[test]
    fn test_dat_passthrough() {
        let mut rng = StdRng::seed_from_u64(0x1C);

        for _ in 0..200 {
            let value: u16 = rng.gen_range(0..1000);
            let mem = assemble(&format!("DAT {value}")).unwrap();
            assert_eq!(mem[0], value as i16, "DAT {value} did not assemble to itself");
        }
    }

    #[test]
    fn test_deterministic() {
        const WORDS: &[&str] = &["HLT", "ADD", "SUB", "STA", "LDA", "BRA", "BRZ", "BRP", "DAT"];
        let mut rng = StdRng::seed_from_u64(2110);

        for _ in 0..20 {
            // Every line is labeled, so any label L0..L{len} can be referenced.
            let len = rng.gen_range(1..=100);
            let mut src = String::new();
            for i in 0..len {
                let op = WORDS[rng.gen_range(0..WORDS.len())];
                match rng.gen_range(0..4) {
                    0 => src.push_str(&format!("L{i} {op} {}\n", rng.gen_range(0..1000))),
                    1 => src.push_str(&format!("L{i}  {op} L{}\n", rng.gen_range(0..len))),
                    2 => src.push_str(&format!("L{i}  INP ; read\n")),
                    _ => src.push_str(&format!("L{i} OUT\n")),
                }
            }

            let first = assemble(&src).unwrap();
            let second = assemble(&src).unwrap();
            assert_eq!(first, second);
        }
    }
}
