//! Parsing LMC assembly source into intermediate instructions.
//!
//! This module consists of:
//! - [`lex`]: the tokenizer, which splits source into whitespace-delimited tokens
//! - [`parse_program`]: the instruction builder, which classifies each token by its position in its line
//!
//! Each source line yields at most one instruction. Within a line, a token is classified
//! depending on what the line already holds:
//!
//! ```text
//! <empty> --label--> <labeled> --mnemonic--> <opcode> --operand--> <operand>
//!    |                                          ^
//!    +-----------------mnemonic-----------------+
//! ```
//!
//! Any token which does not fit the current state of the line is an error.

pub mod lex;

use logos::Logos;

use crate::asm::{AsmErr, AsmErrKind, SymbolTable};
use crate::ast::asm::{Instr, Operand};
use crate::ast::{Label, Opcode, SrcPos, NUM_MAILBOXES};
use lex::Token;

/// Parses source code into a list of intermediate instructions,
/// defining every label encountered in the provided symbol table.
///
/// The address of each instruction is its index in the returned list.
///
/// # Example
/// ```
/// use lmc_ensemble::asm::SymbolTable;
/// use lmc_ensemble::ast::Opcode;
/// use lmc_ensemble::parse::parse_program;
///
/// let src = "
/// LOOP INP
///      BRA LOOP ; forever
/// ";
/// let mut sym = SymbolTable::new();
/// let instrs = parse_program(src, &mut sym).unwrap();
///
/// assert_eq!(instrs.len(), 2);
/// assert_eq!(instrs[1].opcode, Opcode::BRA);
/// assert_eq!(sym.lookup_label("loop"), Some(0));
/// ```
pub fn parse_program<'s>(src: &'s str, sym: &mut SymbolTable<'s>) -> Result<Vec<Instr<'s>>, AsmErr> {
    let mut instrs = Vec::new();
    let mut state = LineState::Empty;
    let mut line = 1;
    let mut line_start = 0;

    for (result, span) in Token::lexer(src).spanned() {
        let text = &src[span.clone()];
        let pos = SrcPos::new(line, src[line_start..span.start].chars().count() + 1);

        // The line would start an instruction past the last mailbox.
        // This applies to any word, including ones that fail to lex.
        let starts_word = !matches!(result, Ok(Token::NewLine | Token::Comment));
        if starts_word && matches!(state, LineState::Empty) && instrs.len() >= NUM_MAILBOXES {
            return Err(AsmErr::new(AsmErrKind::ProgramTooLarge, pos, text));
        }

        match result {
            Ok(Token::NewLine) => {
                std::mem::take(&mut state).finish(&mut instrs)?;
                line += 1;
                line_start = span.end;
            },
            Ok(token) if token.is_trivia() => {},
            Ok(token) => state = state.push(Word { token, text, pos }, instrs.len(), sym)?,
            Err(e) => return Err(AsmErr::new(AsmErrKind::Lex(e), pos, text)),
        }
    }
    state.finish(&mut instrs)?;

    log::debug!("parsed {} instruction(s) over {line} line(s)", instrs.len());
    Ok(instrs)
}

/// A classified token with its source text and position.
struct Word<'s> {
    token: Token,
    text: &'s str,
    pos: SrcPos
}

/// What the current line holds so far.
#[derive(Debug, Default)]
enum LineState<'s> {
    #[default]
    Empty,
    Labeled(Label<'s>),
    Op(Instr<'s>)
}
impl<'s> LineState<'s> {
    /// Feeds the next token of the line into this state.
    ///
    /// `addr` is the address the line's instruction will take,
    /// which is where any label defined on this line points.
    fn push(self, word: Word<'s>, addr: usize, sym: &mut SymbolTable<'s>) -> Result<Self, AsmErr> {
        // Mnemonics are only recognized while the line has no opcode.
        let mnemonic = match (&self, word.token) {
            (LineState::Empty | LineState::Labeled(_), Token::Ident) => word.text.parse::<Opcode>().ok(),
            _ => None
        };

        match (self, word.token, mnemonic) {
            (LineState::Empty, _, Some(op)) => Ok(LineState::Op(Instr::new(None, op))),
            (LineState::Labeled(label), _, Some(op)) => Ok(LineState::Op(Instr::new(Some(label), op))),
            (LineState::Empty, Token::Ident, None) => {
                let label = Label::new(word.text, word.pos);
                sym.add_label(label, addr)?;
                Ok(LineState::Labeled(label))
            },
            (LineState::Op(mut instr), Token::Unsigned(value), _) if instr.accepts_operand() => {
                instr.set_literal(value);
                Ok(LineState::Op(instr))
            },
            (LineState::Op(mut instr), Token::Ident, _) if instr.accepts_operand() => {
                instr.operand = Operand::Label(Label::new(word.text, word.pos));
                Ok(LineState::Op(instr))
            },
            _ => Err(AsmErr::new(AsmErrKind::UnexpectedToken, word.pos, word.text))
        }
    }

    /// Ends the line, appending its instruction (if any).
    fn finish(self, instrs: &mut Vec<Instr<'s>>) -> Result<(), AsmErr> {
        match self {
            LineState::Empty => Ok(()),
            LineState::Labeled(label) => Err(AsmErr::new(AsmErrKind::MissingOpcode, label.pos, label.name)),
            LineState::Op(instr) => {
                instrs.push(instr);
                Ok(())
            }
        }
    }
}
