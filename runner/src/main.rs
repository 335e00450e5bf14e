use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use retroscope_core::core::{ExecutionCompletionReason, MachineController};
use retroscope_core::debug::BreakpointInfo;
use retroscope_machines::{ProgramImage, registry};

mod config;

/// Headless runner: load a program into a machine and run it.
#[derive(Parser, Debug)]
#[command(name = "retroscope", version)]
struct Args {
    /// Registered machine name.
    #[arg(short, long, default_value = "simple6510")]
    machine: String,

    /// Program image to load.
    #[arg(required_unless_present = "list")]
    program: Option<PathBuf>,

    /// Treat the program as PRG (two-byte load address header). Implied by a
    /// `.prg` extension.
    #[arg(long)]
    prg: bool,

    /// Load address for raw images.
    #[arg(long, value_parser = parse_address, default_value = "$1000")]
    load_address: u16,

    /// Start address; defaults to the load address.
    #[arg(long, value_parser = parse_address)]
    start: Option<u16>,

    #[arg(long, value_enum, default_value_t = Mode::Halt)]
    mode: Mode,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// Execution breakpoint (repeatable). Implies debug mode.
    #[arg(short, long = "breakpoint", value_parser = parse_address)]
    breakpoints: Vec<u16>,

    /// Stop when execution reaches this address.
    #[arg(long, value_parser = parse_address)]
    run_to: Option<u16>,

    /// Pace frames to the machine's real clock.
    #[arg(long)]
    real_time: bool,

    /// Configuration file; defaults to <config dir>/retroscope/config.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List registered machines and exit.
    #[arg(long)]
    list: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run until the CPU halts.
    Halt,
    /// Run a single frame.
    Frame,
    /// Run with breakpoints enabled.
    Debug,
}

/// Parse `$1000`, `0x1000` or `1000` (hex).
fn parse_address(text: &str) -> Result<u16, String> {
    let digits = text
        .strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address '{text}': {e}"))
}

fn list_machines() {
    for entry in registry::all() {
        println!("{:<16} {}", entry.name, entry.description);
    }
}

fn load_image(args: &Args) -> Result<ProgramImage> {
    let Some(path) = args.program.as_deref() else {
        bail!("no program given");
    };
    let is_prg = args.prg
        || path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("prg"));
    let image = if is_prg {
        ProgramImage::load_prg_file(path)
    } else {
        ProgramImage::load_raw_file(path, args.load_address)
    };
    image.with_context(|| format!("failed to load {}", path.display()))
}

fn run(controller: &mut MachineController, args: &Args) -> Result<ExecutionCompletionReason> {
    for &address in &args.breakpoints {
        controller.add_breakpoint(BreakpointInfo::exec(address));
    }
    controller.set_frame_limit(args.frames);
    controller.set_real_time(args.real_time);

    let result = if let Some(address) = args.run_to {
        controller.run_to(None, address)
    } else if !args.breakpoints.is_empty() || args.mode == Mode::Debug {
        controller.start_debug()
    } else if args.mode == Mode::Frame {
        controller.run_single_frame()
    } else {
        controller.start()
    };
    Ok(result?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        list_machines();
        return Ok(());
    }

    let file_config = config::load(args.config.as_deref())?;
    let machine_config = file_config.to_machine_config();

    let Some(entry) = registry::find(&args.machine) else {
        let names: Vec<_> = registry::all().iter().map(|e| e.name).collect();
        bail!(
            "unknown machine '{}' (available: {})",
            args.machine,
            names.join(", ")
        );
    };
    let mut machine = (entry.create)(&machine_config)
        .with_context(|| format!("failed to create machine '{}'", entry.name))?;

    let image = load_image(&args)?;
    image.load_into(machine.as_mut(), args.start);
    log::info!(
        "loaded {} bytes at ${:04X}-${:04X} into {}",
        image.bytes.len(),
        image.load_address,
        image.end_address(),
        entry.name
    );

    let mut controller = MachineController::new(machine);
    let reason = run(&mut controller, &args)?;

    let cpu = controller.machine().cpu();
    let stats = controller.frame_stats();
    println!("completion: {reason:?}");
    println!(
        "pc: ${:04X}  opcode: ${:02X}  tacts: {}  frames: {}",
        cpu.pc(),
        cpu.opcode(),
        cpu.tacts(),
        cpu.clock().frames()
    );
    println!(
        "frames run: {}  avg frame time: {:?}",
        stats.frame_count, stats.avg_cpu_frame_time
    );
    controller.stop();
    Ok(())
}
