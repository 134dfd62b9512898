use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;

use lmc_ensemble::asm::{assemble_debug, SymbolTable};
use lmc_ensemble::ast::sim::SimInstr;
use lmc_ensemble::err::report;
use lmc_ensemble::sim::io::StreamIO;
use lmc_ensemble::sim::mem::MailboxStore;
use lmc_ensemble::sim::{SimFlags, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "lmcvm",
    version,
    about = "Assembler and simulator for Little Man Computer programs"
)]
struct Args {
    /// Assembly source file
    path: PathBuf,

    /// Only assemble the program, without running it
    #[arg(short, long)]
    check: bool,

    /// Print the assembled mailboxes
    #[arg(short, long)]
    dump: bool,

    /// Stop with an error if the program has not halted after this many instructions
    #[arg(short = 'n', long)]
    max_steps: Option<u64>,

    /// Only accept exactly three digits (after an optional sign) for INP
    #[arg(long)]
    strict_input: bool,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let src = std::fs::read_to_string(&args.path)
        .with_context(|| format!("could not read file {:?}", args.path))?;

    let (mem, sym) = assemble_debug(&src)
        .map_err(|e| anyhow::anyhow!(report(&e)))
        .with_context(|| format!("could not assemble {:?}", args.path))?;
    log::info!("assembled {:?}", args.path);

    if args.dump {
        dump(&mem, &sym);
    }
    if args.check {
        return Ok(());
    }

    let mut sim = Simulator::new(SimFlags { strict_input: args.strict_input });
    sim.load(&mem);

    let stdin = std::io::stdin();
    let mut io = StreamIO::new(stdin.lock(), std::io::stdout().lock());
    let result = match args.max_steps {
        Some(n) => sim.run_with_limit(&mut io, n),
        None => sim.run(&mut io),
    };
    result
        .map_err(|e| anyhow::anyhow!(report(&e)))
        .with_context(|| format!("execution stopped at mailbox {:02}", sim.pc))?;

    if !sim.hit_halt() {
        bail!("program did not halt within {} instructions", sim.instructions_run);
    }
    log::info!("halted after {} instruction(s)", sim.instructions_run);
    Ok(())
}

/// Prints every mailbox up to the last nonzero one.
fn dump(mem: &MailboxStore, sym: &SymbolTable<'_>) {
    let len = mem.used_len();

    for (addr, word) in mem.iter().take(len) {
        let label = sym.rev_lookup_label(addr).unwrap_or("");
        let instr = SimInstr::decode(word).map_or_else(|| String::from("-"), |i| i.to_string());
        println!("{addr:02}  {word:03}  {label:<10}{instr}");
    }
    if len < mem.as_slice().len() {
        println!("{len:02}..  000");
    }
}
