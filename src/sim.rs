//! Simulating and execution for LMC programs.
//!
//! This module is focused on executing fully assembled mailboxes (i.e., [`MailboxStore`]).
//!
//! This module consists of:
//! - [`Simulator`]: The struct that simulates assembled code.
//! - [`execute`]: A shortcut which runs a mailbox store to completion over a pair of streams.
//! - [`mem`]: The module handling the mailboxes.
//! - [`io`]: The module handling the input and output of `INP` and `OUT`.
//!
//! # Usage
//!
//! To simulate some code, you need to instantiate a Simulator and load assembled mailboxes to it:
//!
//! ```
//! use lmc_ensemble::asm::assemble;
//! use lmc_ensemble::sim::Simulator;
//! use lmc_ensemble::sim::io::BufferedIO;
//!
//! let src = "
//!     INP
//!     ADD ONE
//!     OUT
//!     HLT
//! ONE DAT 1
//! ";
//! let mem = assemble(src).unwrap();
//!
//! let mut sim = Simulator::new(Default::default());
//! sim.load(&mem);
//!
//! let mut io = BufferedIO::with_input(["41"]);
//! sim.run(&mut io).unwrap();
//! assert_eq!(io.output(), "42\n");
//! assert!(sim.hit_halt());
//! ```
//!
//! ## Execution
//!
//! Beyond the basic [`Simulator::run`] (which runs until halting),
//! there are also:
//! - [`Simulator::step_in`]: manual step-by-step simulation
//! - [`Simulator::run_while`], [`Simulator::run_with_limit`]: more advanced programmatic execution
//!
//! ```
//! use lmc_ensemble::asm::assemble;
//! use lmc_ensemble::sim::Simulator;
//! use lmc_ensemble::sim::io::EmptyIO;
//!
//! let mem = assemble("LDA 3\nADD 3\nHLT\nDAT 5").unwrap();
//! let mut sim = Simulator::default();
//! sim.load(&mem);
//!
//! sim.step_in(&mut EmptyIO).unwrap();
//! assert_eq!(sim.acc, 5);
//! sim.step_in(&mut EmptyIO).unwrap();
//! assert_eq!(sim.acc, 10);
//! assert_eq!(sim.pc, 2);
//! ```

pub mod io;
pub mod mem;

use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::ast::sim::SimInstr;
use crate::ast::NUM_MAILBOXES;
use self::io::{IODevice, StreamIO};
use self::mem::MailboxStore;

/// The modulus of the accumulator.
const ACC_MOD: i32 = 1000;

/// Errors that can occur during simulation.
#[derive(Debug)]
pub enum SimErr {
    /// Word was fetched, but it does not decode to any instruction.
    UnknownOpcode {
        /// The address the word was fetched from.
        addr: u8,
        /// The word that was fetched.
        word: i16
    },
    /// `INP` was executed, but there was no more input.
    InputExhausted,
    /// `INP` was executed, but the input line was not a valid number.
    InvalidInput(String),
    /// The IO device failed to read or write.
    Io(std::io::Error),
}
impl std::fmt::Display for SimErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimErr::UnknownOpcode { addr, word } => write!(f, "unknown opcode {} (word {word:03}) at mailbox {addr:02}", word / 100),
            SimErr::InputExhausted  => f.write_str("input ended before INP could read a value"),
            SimErr::InvalidInput(s) => write!(f, "invalid input {s:?}"),
            SimErr::Io(e)           => write!(f, "io error: {e}"),
        }
    }
}
impl std::error::Error for SimErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimErr::Io(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for SimErr {
    fn help(&self) -> Option<Cow<str>> {
        match self {
            SimErr::UnknownOpcode { .. } => Some("make sure the program halts before it runs into its data".into()),
            SimErr::InputExhausted  => Some("provide one line of input for every INP".into()),
            SimErr::InvalidInput(_) => Some("input must be a number of up to 3 digits, optionally prefixed with + or -".into()),
            SimErr::Io(_)           => None,
        }
    }
}
impl From<std::io::Error> for SimErr {
    fn from(value: std::io::Error) -> Self {
        SimErr::Io(value)
    }
}

/// Anything that can cause a step to abruptly fail to finish.
enum StepBreak {
    /// `HLT` was executed.
    Halt,
    /// A simulation error occurred.
    Err(SimErr),
}
impl From<SimErr> for StepBreak {
    fn from(value: SimErr) -> Self {
        Self::Err(value)
    }
}

/// Reason for why execution paused if it wasn't due to an error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
enum PauseCondition {
    /// Program reached a halt.
    Halt,
    /// Program hit a tripwire condition.
    Tripwire,
    /// Program hit an error and did not pause successfully.
    #[default]
    Unsuccessful
}

/// Configuration flags for [`Simulator`].
///
/// These can be modified after the `Simulator` is created with [`Simulator::new`]
/// and their effects should still apply.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SimFlags {
    /// Whether `INP` only accepts exactly three digits.
    ///
    /// When this is `false`, one to three digits are accepted (e.g., `7`, `42`, `007`).
    ///
    /// By default, this flag is `false`.
    pub strict_input: bool,
}

/// Executes the mailboxes until `HLT`, reading `INP` lines from `input` and writing `OUT` values to `output`.
///
/// The mailboxes are executed in place: anything the program stores with `STA`
/// is visible in `mem` afterwards, including if execution fails.
///
/// ```
/// use lmc_ensemble::asm::assemble;
/// use lmc_ensemble::sim::execute;
///
/// let mut mem = assemble("INP\nSTA 10\nOUT\nHLT").unwrap();
/// let mut output = Vec::new();
/// execute(&mut mem, "-007\n".as_bytes(), &mut output).unwrap();
///
/// assert_eq!(output, b"7\n");
/// assert_eq!(mem[10], 7);
/// ```
pub fn execute<R: BufRead, W: Write>(mem: &mut MailboxStore, input: R, output: W) -> Result<(), SimErr> {
    let mut sim = Simulator::new(SimFlags::default());
    sim.load(mem);

    let mut io = StreamIO::new(input, output);
    let result = sim.run(&mut io);

    *mem = sim.mem;
    result
}

/// Executes assembled code.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The simulator's memory.
    ///
    /// Note that this is held in the simulator, so `STA` writes here
    /// and not to the store the simulator was loaded from.
    pub mem: MailboxStore,

    /// The program counter.
    ///
    /// This always points to the mailbox that executes next.
    pub pc: u8,

    /// The address register.
    ///
    /// This holds the low two digits of the last executed instruction.
    pub ar: u8,

    /// The accumulator.
    ///
    /// Arithmetic keeps this in `0..1000`.
    pub acc: i16,

    /// Whether the last `SUB` underflowed, or the last `INP` read a negative value.
    negative: bool,

    /// The number of instructions successfully run since this `Simulator` was initialized.
    ///
    /// This can be set to 0 to reset the counter.
    pub instructions_run: u64,

    /// Configuration settings for the simulator.
    ///
    /// These are preserved between resets.
    ///
    /// See [`SimFlags`] for more details on what configuration
    /// settings are available.
    pub flags: SimFlags,

    /// Indicates the reason why the last execution (via [`Simulator::run_while`] and adjacent)
    /// had paused.
    pause_condition: PauseCondition,
}

impl Simulator {
    /// Creates a new simulator with the provided initializers
    /// and with zeroed memory and registers.
    pub fn new(flags: SimFlags) -> Self {
        Self {
            mem: MailboxStore::new(),
            pc: 0,
            ar: 0,
            acc: 0,
            negative: false,
            instructions_run: 0,
            flags,
            pause_condition: Default::default(),
        }
    }

    /// Resets the simulator.
    ///
    /// This zeroes the memory and registers, but keeps the flags.
    pub fn reset(&mut self) {
        *self = Simulator::new(self.flags);
    }

    /// Resets the simulator and loads the mailboxes into its memory.
    pub fn load(&mut self, mem: &MailboxStore) {
        self.reset();
        self.mem.clone_from(mem);

        log::debug!("loaded {} mailbox(es)", mem.used_len());
    }

    /// Whether the negative flag is set.
    pub fn negative(&self) -> bool {
        self.negative
    }

    /// Sets the negative flag.
    pub fn set_negative(&mut self, negative: bool) {
        self.negative = negative;
    }

    /// Indicates whether the last execution of the simulator resulted in a halt.
    pub fn hit_halt(&self) -> bool {
        matches!(self.pause_condition, PauseCondition::Halt)
    }

    /// Runs until the tripwire condition returns false (or the program halts or errors).
    pub fn run_while(&mut self, io: &mut dyn IODevice, mut tripwire: impl FnMut(&mut Simulator) -> bool) -> Result<(), SimErr> {
        std::mem::take(&mut self.pause_condition);

        let result = loop {
            // Tripwire turned off:
            if !tripwire(self) {
                break Ok(PauseCondition::Tripwire);
            }

            match self.step(io) {
                Ok(()) => {},
                Err(StepBreak::Halt) => break Ok(PauseCondition::Halt),
                Err(StepBreak::Err(e)) => break Err(e)
            }
        };

        match &result {
            Ok(PauseCondition::Halt) => log::debug!("halted after {} instruction(s)", self.instructions_run),
            Ok(_) => log::debug!("paused at mailbox {:02}", self.pc),
            Err(e) => log::debug!("stopped at mailbox {:02}: {e}", self.pc),
        }
        self.pause_condition = result?;
        Ok(())
    }

    /// Execute the program.
    ///
    /// This blocks until the program ends.
    /// If you would like to limit the maximum number of steps to execute, consider [`Simulator::run_with_limit`].
    pub fn run(&mut self, io: &mut dyn IODevice) -> Result<(), SimErr> {
        self.run_while(io, |_| true)
    }

    /// Execute the program with a limit on how many steps to execute.
    ///
    /// This blocks until the program ends or until the number of steps to execute has been hit.
    pub fn run_with_limit(&mut self, io: &mut dyn IODevice, max_steps: u64) -> Result<(), SimErr> {
        let i = self.instructions_run;
        self.run_while(io, |sim| sim.instructions_run.wrapping_sub(i) < max_steps)
    }

    /// Simulate one step, executing one instruction.
    pub fn step_in(&mut self, io: &mut dyn IODevice) -> Result<(), SimErr> {
        match self.step(io) {
            Ok(()) => Ok(()),
            Err(StepBreak::Halt) => {
                self.pause_condition = PauseCondition::Halt;
                Ok(())
            },
            Err(StepBreak::Err(e)) => Err(e)
        }
    }

    /// Simulate one step, executing one instruction.
    ///
    /// This can return [`StepBreak::Halt`] as an error,
    /// whereas `step_in` will treat that as a successful step.
    fn step(&mut self, io: &mut dyn IODevice) -> Result<(), StepBreak> {
        // FETCH
        let addr = self.pc;
        let word = self.mem[addr];
        self.pc = (self.pc + 1) % NUM_MAILBOXES as u8;

        // DECODE
        let instr = SimInstr::decode(word).ok_or(SimErr::UnknownOpcode { addr, word })?;
        self.ar = (word % 100) as u8;
        self.instructions_run = self.instructions_run.wrapping_add(1);

        log::trace!("{addr:02}: {word:03} {instr} (acc={}, neg={})", self.acc, self.negative);

        // EXECUTE
        match instr {
            SimInstr::HLT => return Err(StepBreak::Halt),
            SimInstr::ADD(a) => {
                self.acc = wrap_acc(i32::from(self.acc) + i32::from(self.mem[a]));
                self.negative = false;
            },
            SimInstr::SUB(a) => {
                let operand = self.mem[a];
                self.negative = self.acc < operand;
                self.acc = wrap_acc(i32::from(self.acc) - i32::from(operand));
            },
            SimInstr::STA(a) => self.mem[a] = self.acc,
            SimInstr::LDA(a) => {
                self.acc = self.mem[a];
                self.negative = false;
            },
            SimInstr::BRA(a) => self.pc = a,
            SimInstr::BRZ(a) => if self.acc == 0 {
                self.pc = a;
            },
            SimInstr::BRP(a) => if !self.negative {
                self.pc = a;
            },
            SimInstr::INP => {
                let line = io.read_line()
                    .map_err(SimErr::from)?
                    .ok_or(SimErr::InputExhausted)?;
                let (negative, magnitude) = parse_input(&line, self.flags.strict_input)?;

                self.acc = magnitude;
                self.negative = negative;
            },
            SimInstr::OUT => io.write_value(self.acc).map_err(SimErr::from)?,
        }

        Ok(())
    }
}
impl Default for Simulator {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

fn wrap_acc(value: i32) -> i16 {
    value.rem_euclid(ACC_MOD) as i16
}

/// Parses a line of `INP` input into its sign and magnitude.
///
/// Surrounding whitespace is ignored.
fn parse_input(line: &str, strict: bool) -> Result<(bool, i16), SimErr> {
    let trimmed = line.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let len_ok = match strict {
        true  => digits.len() == 3,
        false => (1..=3).contains(&digits.len()),
    };
    if !len_ok || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SimErr::InvalidInput(line.to_string()));
    }

    let magnitude = digits.parse()
        .map_err(|_| SimErr::InvalidInput(line.to_string()))?;
    Ok((negative, magnitude))
}
