use clap::{Args, Parser, Subcommand};
use rvmc_core::{config, debug, hex, Machine, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rvmc", version = "0.1.0",
    about = "A cycle-stepped multicycle RV32I emulator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a hex program image
    Run(RunArgs),
    /// Run under a gdb remote debugger
    Debug(DebugArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the hex program image
    path: PathBuf,
    /// Clock transitions to run
    #[arg(short, long, default_value = "200")]
    cycles: u32,
    /// Dump all 32 registers instead of x1..x5
    #[arg(long)]
    all_regs: bool,
    /// Data words to dump after the run
    #[arg(long, default_value = "10")]
    ram_words: usize,
}

#[derive(Args, Debug)]
pub struct DebugArgs {
    /// Path to the hex program image
    path: PathBuf,
    /// Port to listen on for the debugger
    #[arg(short, long, default_value_t = config::GDB_PORT)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    rvmc_core::log::log_init(rvmc_core::log::Level::Debug);

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Debug(args) => cmd_debug(args),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let words = hex::load_hex_file(&args.path)?;

    let mut machine = Machine::new();
    machine.load_program(&words)?;
    machine.reset();

    if let Err(e) = machine.step(args.cycles) {
        eprintln!("[rvmc] stopped early: {}", e);
    }
    println!("[rvmc] ran {} cycles", machine.cycles());

    let regs = if args.all_regs { 0..32 } else { 1..6 };
    for i in regs {
        println!("R{}: 0x{:08x}", i, machine.read_register(i as u8));
    }
    for i in 0..args.ram_words {
        println!("Mem[{}]: 0x{:08x}", i, machine.read_data_word(i));
    }
    Ok(())
}

fn cmd_debug(args: DebugArgs) -> Result<()> {
    let words = hex::load_hex_file(&args.path)?;

    let mut machine = Machine::new();
    machine.load_program(&words)?;
    machine.reset();

    println!("[rvmc] serving gdb on port {}", args.port);
    debug::serve(&mut machine, args.port)
}
