//! Tokenizing LMC assembly.
//!
//! This module holds the tokens that characterize LMC assembly ([`Token`]).
//! This module is used by the parser to facilitate the conversion of
//! assembly source code into intermediate instructions.
//!
//! The lexer only segments source into whitespace-delimited words.
//! Whether a word is a label, a mnemonic, or an operand depends on where it appears
//! in its line, so that is decided by the parser.

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

/// The largest literal that fits in a mailbox.
pub const MAX_LITERAL: u16 = 999;

/// A unit of information in LMC source code.
#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t\r\x0B\x0C\x00]+", error = LexErr)]
pub enum Token {
    // Note, these regexes span over whole words, including ones that are technically invalid
    // (e.g., 23trst matches for unsigned even though it shouldn't).
    // This is intended.
    // A word is one discernable unit, which is then validated by the validator function.

    /// An unsigned decimal value (e.g., `9`, `042`, `999`).
    #[regex(r"[0-9][^ \t\r\n\x0B\x0C\x00;]*", lex_unsigned_dec)]
    Unsigned(u16),

    /// An identifier.
    ///
    /// This can refer to either:
    /// - a label (e.g., `LOOP`, `DONE`, `ONE`)
    /// - an instruction (e.g. `ADD`, `BRZ`, `DAT`)
    ///
    /// The text is read from the token's span.
    #[regex(r"[A-Za-z][^ \t\r\n\x0B\x0C\x00;]*", lex_ident)]
    Ident,

    /// A word starting with a character that can't start any token.
    ///
    /// Its validator always fails, so this is never actually emitted.
    #[regex(r"[^ \t\r\n\x0B\x0C\x00;A-Za-z0-9][^ \t\r\n\x0B\x0C\x00;]*", lex_symbol)]
    Symbol,

    /// A comment, which starts with a semicolon and spans the remaining part of the line.
    #[regex(r";[^\n]*")]
    Comment,

    /// A new line
    #[token("\n")]
    NewLine
}
impl Token {
    pub(crate) fn is_trivia(&self) -> bool {
        matches!(self, Token::Comment)
    }
}

/// Any errors raised in attempting to tokenize an input stream.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LexErr {
    /// Numeric literal does not fit in a mailbox (0-999).
    DoesNotFitMailbox,
    /// Numeric literal could not be parsed as a decimal literal because it has invalid digits (i.e., not 0-9)
    InvalidNumeric,
    /// Identifier contained characters other than letters, digits, or underscores.
    InvalidIdent,
    /// Int parsing failed but the reason why is unknown
    UnknownIntErr,
    /// A symbol was used which is not allowed in LMC assembly files
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::DoesNotFitMailbox => f.write_str("numeric token does not fit in a mailbox"),
            LexErr::InvalidNumeric    => f.write_str("invalid decimal literal"),
            LexErr::InvalidIdent      => f.write_str("invalid identifier"),
            LexErr::UnknownIntErr     => f.write_str("could not parse integer"),
            LexErr::InvalidSymbol     => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::DoesNotFitMailbox => Some(format!("the range for a mailbox value is [0, {MAX_LITERAL}]").into()),
            LexErr::InvalidNumeric    => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidIdent      => Some("labels consist of letters, digits, and underscores, and start with a letter".into()),
            LexErr::UnknownIntErr     => None,
            LexErr::InvalidSymbol     => Some("tokens start with a letter or a digit".into()),
        }
    }
}

fn lex_unsigned_dec(lx: &Lexer<'_, Token>) -> Result<u16, LexErr> {
    let value = lx.slice().parse::<u16>()
        .map_err(|e| match e.kind() {
            IntErrorKind::InvalidDigit => LexErr::InvalidNumeric,
            IntErrorKind::PosOverflow  => LexErr::DoesNotFitMailbox,
            _ => LexErr::UnknownIntErr,
        })?;

    match value <= MAX_LITERAL {
        true  => Ok(value),
        false => Err(LexErr::DoesNotFitMailbox),
    }
}
fn lex_ident(lx: &Lexer<'_, Token>) -> Result<(), LexErr> {
    match lx.slice().chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        true  => Ok(()),
        false => Err(LexErr::InvalidIdent),
    }
}
fn lex_symbol(_lx: &Lexer<'_, Token>) -> Result<(), LexErr> {
    Err(LexErr::InvalidSymbol)
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::parse::lex::{LexErr, Token};

    #[test]
    fn test_numeric_dec_success() {
        let mut tokens = Token::lexer("0 123 456 789 042 007");
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(123))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(456))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(789))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(42))));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(7))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_numeric_dec_overflow() {
        assert_eq!(Token::lexer("999").next(), Some(Ok(Token::Unsigned(999))));
        assert_eq!(Token::lexer("1000").next(), Some(Err(LexErr::DoesNotFitMailbox)));
        assert_eq!(Token::lexer("65536").next(), Some(Err(LexErr::DoesNotFitMailbox)));
        assert_eq!(Token::lexer("999999999999999999999999999999").next(), Some(Err(LexErr::DoesNotFitMailbox)));
    }

    #[test]
    fn test_numeric_dec_invalid() {
        assert_eq!(Token::lexer("3Q").next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(Token::lexer("12-4").next(), Some(Err(LexErr::InvalidNumeric)));

        // The whole word is consumed by the error:
        let mut tokens = Token::lexer("3Q 5");
        assert_eq!(tokens.next(), Some(Err(LexErr::InvalidNumeric)));
        assert_eq!(tokens.next(), Some(Ok(Token::Unsigned(5))));
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_idents() {
        let mut tokens = Token::lexer("ADD loop Loop_2 x");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "ADD");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "loop");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "Loop_2");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "x");
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("LO-OP").next(), Some(Err(LexErr::InvalidIdent)));
        assert_eq!(Token::lexer("A.B").next(), Some(Err(LexErr::InvalidIdent)));
    }

    #[test]
    fn test_symbols() {
        for src in ["?", "-7", "#5", "_x", ".orig", "@@@"] {
            let mut tokens = Token::lexer(src);
            assert_eq!(tokens.next(), Some(Err(LexErr::InvalidSymbol)), "expected {src:?} to be an invalid symbol");
            assert_eq!(tokens.slice(), src, "expected {src:?} to be consumed as one word");
            assert_eq!(tokens.next(), None);
        }
    }

    #[test]
    fn test_comments_and_lines() {
        let mut tokens = Token::lexer("INP ; read it\nOUT;again\r\n\tHLT");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.next(), Some(Ok(Token::Comment)));
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "OUT");
        assert_eq!(tokens.next(), Some(Ok(Token::Comment)));
        assert_eq!(tokens.slice(), ";again\r");
        assert_eq!(tokens.next(), Some(Ok(Token::NewLine)));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "HLT");
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_nul_is_whitespace() {
        let mut tokens = Token::lexer("INP\0OUT");
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.next(), Some(Ok(Token::Ident)));
        assert_eq!(tokens.slice(), "OUT");
        assert_eq!(tokens.next(), None);
    }
}
