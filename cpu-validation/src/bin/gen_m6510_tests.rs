//! Regression vectors in the SingleStepTests format, recorded from this core.
//!
//! Each opcode gets a gzip-compressed JSON file of randomized single
//! instruction runs under `test_data/m6510`. The files are not part of the
//! tree: record them from a known-good build, then
//! `tests/m6510_recorded_test.rs` replays them against later changes. The
//! replay skips when the directory is absent.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use rand::Rng;
use retroscope_core::cpu::Cpu;
use retroscope_core::cpu::m6510::{M6510, M6510Config, mnemonic};
use retroscope_cpu_validation::{BusOp, M6510CpuState, M6510TestCase, TracingBus};

const NUM_TESTS: usize = 1000;
const OUT_DIR: &str = "test_data/m6510";

// --- Helpers ---

fn snapshot_cpu(cpu: &M6510) -> M6510CpuState {
    M6510CpuState {
        pc: cpu.pc,
        s: cpu.sp,
        a: cpu.a,
        x: cpu.x,
        y: cpu.y,
        p: cpu.p(),
        ram: Vec::new(),
    }
}

fn build_ram(memory: &[u8; 0x10000], addresses: &BTreeSet<u16>) -> Vec<(u16, u8)> {
    addresses
        .iter()
        .map(|&addr| (addr, memory[addr as usize]))
        .collect()
}

fn is_jam(opcode: u8) -> bool {
    mnemonic(opcode) == "JAM"
}

// --- Test Generation ---

fn generate_opcode(rng: &mut impl Rng, opcode: u8) -> Vec<M6510TestCase> {
    let mut tests = Vec::with_capacity(NUM_TESTS);

    while tests.len() < NUM_TESTS {
        let mut cpu = M6510::new(M6510Config::plain_6502());
        let mut bus = TracingBus::new();

        // Fill entire 64KB with random data
        rng.fill(&mut bus.memory[..]);

        // Randomize all registers
        cpu.a = rng.r#gen();
        cpu.x = rng.r#gen();
        cpu.y = rng.r#gen();
        cpu.sp = rng.r#gen();
        cpu.set_p(rng.r#gen());
        cpu.pc = rng.r#gen();

        let pc = cpu.pc;
        bus.memory[pc as usize] = opcode;

        let pre_memory = bus.memory;
        let mut initial = snapshot_cpu(&cpu);

        cpu.execute_cpu_cycle(&mut bus);

        let mut final_state = snapshot_cpu(&cpu);

        // Dummy cycles are recorded as reads, the way the hardware drives them.
        let addresses: BTreeSet<u16> = bus.cycles.iter().map(|c| c.addr).collect();
        initial.ram = build_ram(&pre_memory, &addresses);
        final_state.ram = build_ram(&bus.memory, &addresses);

        let cycles: Vec<(u16, u8, String)> = bus
            .cycles
            .iter()
            .map(|c| {
                let op = match c.op {
                    BusOp::Write => BusOp::Write,
                    BusOp::Read | BusOp::Internal => BusOp::Read,
                };
                (c.addr, c.data, op.as_str().to_string())
            })
            .collect();

        let name = (0..3u16)
            .map(|i| format!("{:02x}", pre_memory[pc.wrapping_add(i) as usize]))
            .collect::<Vec<_>>()
            .join(" ");

        tests.push(M6510TestCase {
            name,
            initial,
            final_state,
            cycles,
        });
    }

    tests
}

fn generate_and_write(rng: &mut impl Rng, opcode: u8, out_dir: &Path) -> std::io::Result<()> {
    let tests = generate_opcode(rng, opcode);
    let out_path = out_dir.join(format!("{opcode:02x}.json.gz"));
    let json = serde_json::to_vec(&tests)?;

    let mut encoder = GzEncoder::new(BufWriter::new(File::create(&out_path)?), Compression::best());
    encoder.write_all(&json)?;
    encoder.finish()?.flush()?;

    println!(
        "Generated {} tests for 0x{:02X} ({}) -> {}",
        tests.len(),
        opcode,
        mnemonic(opcode),
        out_path.display()
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: gen_m6510_tests <opcode | all>");
        eprintln!("Examples:");
        eprintln!("  gen_m6510_tests a9        # opcode 0xA9 (LDA imm)");
        eprintln!("  gen_m6510_tests all");
        std::process::exit(1);
    }

    let out_dir = Path::new(OUT_DIR);
    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create {}: {e}", out_dir.display());
        std::process::exit(1);
    }

    let mut rng = rand::thread_rng();

    let opcodes: Vec<u8> = if args[1] == "all" {
        (0..=0xFFu8).filter(|&op| !is_jam(op)).collect()
    } else {
        let arg = args[1].trim_start_matches("0x").trim_start_matches("0X");
        let opcode = u8::from_str_radix(arg, 16).unwrap_or_else(|_| {
            eprintln!("Invalid hex opcode: {}", args[1]);
            std::process::exit(1);
        });
        if is_jam(opcode) {
            eprintln!("Opcode 0x{opcode:02X} jams the CPU; nothing to record");
            std::process::exit(1);
        }
        vec![opcode]
    };

    for &opcode in &opcodes {
        if let Err(e) = generate_and_write(&mut rng, opcode, out_dir) {
            eprintln!("Failed to write vectors for 0x{opcode:02X}: {e}");
            std::process::exit(1);
        }
    }
    println!("Generated tests for {} opcodes", opcodes.len());
}
