//! Memory handling for the LMC simulator.
//!
//! This module consists of:
//! - [`MailboxStore`]: The mailboxes, which hold both the program and its data.

use crate::ast::NUM_MAILBOXES;

/// The machine's memory: 100 mailboxes of signed 16-bit words.
///
/// A freshly created store is zeroed. After assembly, mailbox `n` holds the encoded
/// word of the `n`-th instruction and every mailbox past the program remains zero.
///
/// Mailboxes are indexed by their address:
/// ```
/// use lmc_ensemble::sim::mem::MailboxStore;
///
/// let mut mem = MailboxStore::new();
/// mem[42] = 901;
/// assert_eq!(mem[42], 901);
/// assert_eq!(mem[43], 0);
/// ```
///
/// Indexing with an address of 100 or more panics, as with slices.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MailboxStore([i16; NUM_MAILBOXES]);

impl MailboxStore {
    /// Creates a new, zeroed store.
    pub fn new() -> Self {
        Self([0; NUM_MAILBOXES])
    }

    /// Gets the mailboxes as a slice.
    pub fn as_slice(&self) -> &[i16] {
        &self.0
    }

    /// Gets the mailboxes as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [i16] {
        &mut self.0
    }

    /// Iterates over every mailbox along with its address.
    pub fn iter(&self) -> impl Iterator<Item=(u8, i16)> + '_ {
        self.0.iter()
            .enumerate()
            .map(|(addr, &word)| (addr as u8, word))
    }

    /// The number of mailboxes, up to and including the last nonzero one.
    ///
    /// This is the length of the assembled program,
    /// except where the program ends in zeroed mailboxes (`HLT` or `DAT 0`).
    pub fn used_len(&self) -> usize {
        self.0.iter()
            .rposition(|&w| w != 0)
            .map_or(0, |i| i + 1)
    }
}
impl Default for MailboxStore {
    fn default() -> Self {
        Self::new()
    }
}
impl From<[i16; NUM_MAILBOXES]> for MailboxStore {
    fn from(value: [i16; NUM_MAILBOXES]) -> Self {
        Self(value)
    }
}
impl std::ops::Index<u8> for MailboxStore {
    type Output = i16;

    fn index(&self, index: u8) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<u8> for MailboxStore {
    fn index_mut(&mut self, index: u8) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}
