//! This module holds the intermediate instructions produced by the parser.
//!
//! An [`Instr`] is one assembled source line before its operand has been resolved.
//! The full program is simply a `Vec<Instr>`, where each instruction's address
//! is its index.

use super::{Label, Opcode};

/// The operand of an intermediate instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum Operand<'s> {
    /// No operand was given.
    #[default]
    None,
    /// A literal offset (always in `0..100`).
    ///
    /// ```text
    /// ADD 99
    ///     ~~
    /// ```
    Offset(u8),
    /// A reference to a label, resolved during encoding.
    ///
    /// ```text
    /// BRA LOOP
    ///     ~~~~
    /// ```
    Label(Label<'s>)
}

/// An intermediate instruction (one assembled source line).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Instr<'s> {
    /// The label defined on this line, if any.
    pub label: Option<Label<'s>>,
    /// The mnemonic written on this line.
    pub opcode: Opcode,
    /// The hundreds digit to encode.
    ///
    /// This is the opcode's code, except for `DAT` with a literal,
    /// where it is the hundreds digit of the literal.
    pub code: u8,
    /// The operand.
    pub operand: Operand<'s>
}
impl<'s> Instr<'s> {
    /// Creates an instruction with no operand for the given opcode.
    ///
    /// `INP` and `OUT` start with their selector as their operand.
    pub fn new(label: Option<Label<'s>>, opcode: Opcode) -> Self {
        let operand = match opcode.selector() {
            Some(sel) => Operand::Offset(sel),
            None => Operand::None,
        };

        Instr { label, opcode, code: opcode.code(), operand }
    }

    /// Whether this instruction can still accept an operand.
    pub fn accepts_operand(&self) -> bool {
        matches!(self.operand, Operand::None)
    }

    /// Sets a numeric literal as the operand.
    ///
    /// For `DAT`, the literal's hundreds digit replaces the encoded code,
    /// so the literal passes through encoding unchanged.
    /// Otherwise, only the low two digits are kept.
    pub fn set_literal(&mut self, value: u16) {
        if self.opcode == Opcode::DAT {
            self.code = ((value / 100) % 10) as u8;
        }
        self.operand = Operand::Offset((value % 100) as u8);
    }
}
