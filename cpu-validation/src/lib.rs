use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use retroscope_core::core::{CpuBus, TactClock};
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory with cycle-by-cycle recording ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusOp {
    Read,
    Write,
    /// Address bus driven without a data transfer (6502 dummy cycles).
    Internal,
}

impl BusOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
            BusOp::Internal => "internal",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusCycle {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

/// Flat RAM that records one [`BusCycle`] per bus access. Port accesses are
/// recorded the same way as memory, so a 6510 and a plain 6502 trace alike.
pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub cycles: Vec<BusCycle>,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            cycles: Vec::new(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn clear_cycles(&mut self) {
        self.cycles.clear();
    }

    fn record(&mut self, addr: u16, data: u8, op: BusOp) {
        self.cycles.push(BusCycle { addr, data, op });
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBus for TracingBus {
    fn read_memory(&mut self, address: u16) -> u8 {
        let data = self.memory[address as usize];
        self.record(address, data, BusOp::Read);
        data
    }

    fn write_memory(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
        self.record(address, value, BusOp::Write);
    }

    fn read_port(&mut self, address: u16) -> u8 {
        self.read_memory(address)
    }

    fn write_port(&mut self, address: u16, value: u8) {
        self.write_memory(address, value);
    }

    fn delay_address_bus_access(&mut self, address: u16, _clock: &TactClock) -> u32 {
        let data = self.memory[address as usize];
        self.record(address, data, BusOp::Internal);
        0
    }
}

// --- M6510 JSON test vector types (SingleStepTests/65x02 format) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct M6510TestCase {
    pub name: String,
    pub initial: M6510CpuState,
    #[serde(rename = "final")]
    pub final_state: M6510CpuState,
    pub cycles: Vec<(u16, u8, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct M6510CpuState {
    pub pc: u16,
    pub s: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub ram: Vec<(u16, u8)>,
}

/// Load the vectors for one opcode from `dir`, preferring `{op}.json` and
/// falling back to `{op}.json.gz`. Returns `Ok(None)` when neither exists.
pub fn load_test_cases(dir: &Path, opcode: u8) -> io::Result<Option<Vec<M6510TestCase>>> {
    let plain = dir.join(format!("{opcode:02x}.json"));
    let gzipped = dir.join(format!("{opcode:02x}.json.gz"));

    let mut json = String::new();
    if plain.exists() {
        File::open(&plain)?.read_to_string(&mut json)?;
    } else if gzipped.exists() {
        GzDecoder::new(BufReader::new(File::open(&gzipped)?)).read_to_string(&mut json)?;
    } else {
        return Ok(None);
    }

    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_step_format() {
        let json = r#"[{
            "name": "a9 42",
            "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 36,
                        "ram": [[512, 169], [513, 66]]},
            "final": {"pc": 514, "s": 253, "a": 66, "x": 0, "y": 0, "p": 36,
                      "ram": [[512, 169], [513, 66]]},
            "cycles": [[512, 169, "read"], [513, 66, "read"]]
        }]"#;
        let cases: Vec<M6510TestCase> = serde_json::from_str(json).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].final_state.a, 0x42);
        assert_eq!(cases[0].cycles[1], (513, 66, "read".to_string()));
    }

    #[test]
    fn missing_vectors_are_not_an_error() {
        let dir = Path::new("/nonexistent/vectors");
        assert!(load_test_cases(dir, 0xA9).unwrap().is_none());
    }

    #[test]
    fn tracing_bus_records_accesses() {
        let mut bus = TracingBus::new();
        bus.load(0x10, &[0xAB]);
        assert_eq!(bus.read_memory(0x10), 0xAB);
        bus.write_port(0x01, 0x37);
        bus.delay_address_bus_access(0x10, &TactClock::new(100, 1_000_000));
        let ops: Vec<_> = bus.cycles.iter().map(|c| c.op).collect();
        assert_eq!(ops, vec![BusOp::Read, BusOp::Write, BusOp::Internal]);
        assert_eq!(bus.memory[0x01], 0x37);
        bus.clear_cycles();
        assert!(bus.cycles.is_empty());
    }
}
