//! Error interface for this crate.
//!
//! Every phase has its own error type:
//! - [`LexErr`]: errors from tokenizing source code
//! - [`AsmErr`]: errors from parsing and assembling source code
//! - [`SimErr`]: errors from executing mailboxes
//!
//! All of them implement [`Error`], which exposes the source position of the error
//! (if it has one) and a short hint for how to fix it.

use std::borrow::Cow;

use crate::ast::SrcPos;
pub use crate::asm::{AsmErr, AsmErrKind};
pub use crate::parse::lex::LexErr;
pub use crate::sim::SimErr;

/// Unified error interface for all errors in this crate.
///
/// Note that the [`std::fmt::Display`] implementation is used for the brief message,
/// and [`Error::help`] is used for any help text.
pub trait Error: std::error::Error {
    /// The position in source where the error occurred (if there is one).
    fn pos(&self) -> Option<SrcPos> {
        None
    }

    /// Any help or hints for the user to fix the error.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// Renders an error as a one-line diagnostic, followed by a help line if it has one.
///
/// ```
/// use lmc_ensemble::asm::assemble;
/// use lmc_ensemble::err::report;
///
/// let err = assemble("INP\nLOOP\n").unwrap_err();
/// assert_eq!(
///     report(&err),
///     "Unknown token on line 2:1: LOOP\n  help: add an instruction after this label"
/// );
/// ```
pub fn report(err: &dyn Error) -> String {
    match err.help() {
        Some(help) => format!("{err}\n  help: {help}"),
        None => err.to_string(),
    }
}
