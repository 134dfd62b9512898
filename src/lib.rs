//! A Little Man Computer (LMC) assembler and simulator.
//!
//! The LMC is a teaching machine with a single accumulator,
//! 100 decimal mailboxes, and an 11-instruction set.
//!
//! # Usage
//!
//! To convert LMC source code to mailboxes, it must be assembled:
//! ```
//! use lmc_ensemble::asm::{assemble, assemble_debug};
//!
//! let code = "
//!         INP
//!         BRZ DONE
//! LOOP    OUT
//!         SUB ONE
//!         BRZ DONE
//!         BRA LOOP
//! DONE    HLT
//! ONE     DAT 1
//! ";
//! let mem = assemble(code).unwrap();
//! assert_eq!(&mem.as_slice()[..8], &[901, 706, 902, 207, 706, 602, 0, 1]);
//!
//! // OR, to also keep the labels:
//! let (_, sym) = assemble_debug(code).unwrap();
//! assert_eq!(sym.lookup_label("LOOP"), Some(2));
//! ```
//!
//! Once assembled, the mailboxes can be executed with the simulator:
//! ```
//! # use lmc_ensemble::asm::assemble;
//! # let mem = assemble("INP\nOUT\nHLT").unwrap();
//! use lmc_ensemble::sim::Simulator;
//! use lmc_ensemble::sim::io::BufferedIO;
//!
//! let mut simulator = Simulator::new(Default::default());
//! simulator.load(&mem);
//!
//! let mut io = BufferedIO::with_input(["5"]);
//! simulator.run(&mut io).unwrap(); // <-- Result can be handled accordingly
//! assert_eq!(io.output(), "5\n");
//! ```
//!
//! If more granularity is needed for simulation, there are also step-in and limited run functions.
//! See the [`sim`] module for more details.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod sim;
pub mod err;
