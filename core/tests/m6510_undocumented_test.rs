use retroscope_core::cpu::m6510::M6510;
mod common;
use common::{TestBus, cpu_with_program, step};

const ORIGIN: u16 = 0x0200;
const ZP: u16 = 0x0010;

const C: u8 = 0x01;
const D: u8 = 0x08;

/// Run the one instruction at ORIGIN after `setup` has prepared registers
/// and memory.
fn exec(program: &[u8], setup: impl FnOnce(&mut M6510, &mut TestBus)) -> (M6510, TestBus) {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, program);
    cpu.set_p(0);
    setup(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    (cpu, bus)
}

// =============================================================================
// Shift/rotate then logic: the shift's carry survives
// =============================================================================

#[test]
fn test_slo_keeps_shift_carry() {
    // SLO $10
    let (cpu, bus) = exec(&[0x07, 0x10], |cpu, bus| {
        cpu.a = 0x00;
        bus.memory[ZP as usize] = 0x80;
    });
    assert_eq!(bus.memory[ZP as usize], 0x00);
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.is_carry_set());
    assert!(cpu.is_zero_set());

    let (cpu, bus) = exec(&[0x07, 0x10], |cpu, bus| {
        cpu.a = 0x01;
        bus.memory[ZP as usize] = 0x40;
    });
    assert_eq!(bus.memory[ZP as usize], 0x80);
    assert_eq!(cpu.a, 0x81);
    assert!(!cpu.is_carry_set());
    assert!(cpu.is_negative_set());
}

#[test]
fn test_rla_rotates_carry_in_and_out() {
    // RLA $10
    let (cpu, bus) = exec(&[0x27, 0x10], |cpu, bus| {
        cpu.set_p(C);
        cpu.a = 0xFF;
        bus.memory[ZP as usize] = 0x80;
    });
    assert_eq!(bus.memory[ZP as usize], 0x01);
    assert_eq!(cpu.a, 0x01);
    assert!(cpu.is_carry_set());
    assert!(!cpu.is_zero_set());
    assert!(!cpu.is_negative_set());
}

#[test]
fn test_sre_keeps_shift_carry() {
    // SRE $10
    let (cpu, bus) = exec(&[0x47, 0x10], |cpu, bus| {
        cpu.a = 0x80;
        bus.memory[ZP as usize] = 0x01;
    });
    assert_eq!(bus.memory[ZP as usize], 0x00);
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.is_carry_set());
    assert!(cpu.is_negative_set());
}

// =============================================================================
// Modify then arithmetic
// =============================================================================

#[test]
fn test_rra_feeds_rotate_carry_into_adc() {
    // RRA $10: $03 rotates to $01 with C=1, then $10 + $01 + 1
    let (cpu, bus) = exec(&[0x67, 0x10], |cpu, bus| {
        cpu.a = 0x10;
        bus.memory[ZP as usize] = 0x03;
    });
    assert_eq!(bus.memory[ZP as usize], 0x01);
    assert_eq!(cpu.a, 0x12);
    assert!(!cpu.is_carry_set());

    // C=1 rotates into bit 7; $80 + $80 overflows
    let (cpu, bus) = exec(&[0x67, 0x10], |cpu, bus| {
        cpu.set_p(C);
        cpu.a = 0x80;
        bus.memory[ZP as usize] = 0x00;
    });
    assert_eq!(bus.memory[ZP as usize], 0x80);
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.is_carry_set());
    assert!(cpu.is_overflow_set());
    assert!(cpu.is_zero_set());
}

#[test]
fn test_dcp_compares_decremented_value() {
    // DCP $10
    let (cpu, bus) = exec(&[0xC7, 0x10], |cpu, bus| {
        cpu.a = 0x10;
        bus.memory[ZP as usize] = 0x11;
    });
    assert_eq!(bus.memory[ZP as usize], 0x10);
    assert_eq!(cpu.a, 0x10);
    assert!(cpu.is_zero_set());
    assert!(cpu.is_carry_set());

    let (cpu, bus) = exec(&[0xC7, 0x10], |cpu, bus| {
        cpu.a = 0x05;
        bus.memory[ZP as usize] = 0x00;
    });
    assert_eq!(bus.memory[ZP as usize], 0xFF);
    assert_eq!(cpu.a, 0x05);
    assert!(!cpu.is_carry_set());
    assert!(!cpu.is_zero_set());
    assert!(!cpu.is_negative_set());
}

#[test]
fn test_isc_subtracts_incremented_value() {
    // ISC $10
    let (cpu, bus) = exec(&[0xE7, 0x10], |cpu, bus| {
        cpu.set_p(C);
        cpu.a = 0x10;
        bus.memory[ZP as usize] = 0x0F;
    });
    assert_eq!(bus.memory[ZP as usize], 0x10);
    assert_eq!(cpu.a, 0x00);
    assert!(cpu.is_zero_set());
    assert!(cpu.is_carry_set());
    assert!(!cpu.is_overflow_set());

    let (cpu, bus) = exec(&[0xE7, 0x10], |cpu, bus| {
        cpu.set_p(C);
        cpu.a = 0x80;
        bus.memory[ZP as usize] = 0x00;
    });
    assert_eq!(bus.memory[ZP as usize], 0x01);
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.is_overflow_set());
    assert!(cpu.is_carry_set());
    assert!(!cpu.is_negative_set());
}

// =============================================================================
// ARR
// =============================================================================

#[test]
fn test_arr_binary_flags() {
    // ARR #$FF with C=1: C from bit 6, V from bit 6 ^ bit 5
    let (cpu, _) = exec(&[0x6B, 0xFF], |cpu, _| {
        cpu.set_p(C);
        cpu.a = 0xFF;
    });
    assert_eq!(cpu.a, 0xFF);
    assert!(cpu.is_carry_set());
    assert!(!cpu.is_overflow_set());
    assert!(cpu.is_negative_set());

    let (cpu, _) = exec(&[0x6B, 0x80], |cpu, _| {
        cpu.a = 0xFF;
    });
    assert_eq!(cpu.a, 0x40);
    assert!(cpu.is_carry_set());
    assert!(cpu.is_overflow_set());
    assert!(!cpu.is_negative_set());
}

#[test]
fn test_arr_decimal_corrections() {
    // $7F & $7F = $7F: ROR gives $3F, both nibbles corrected to $95
    let (cpu, _) = exec(&[0x6B, 0x7F], |cpu, _| {
        cpu.set_p(D);
        cpu.a = 0xFF;
    });
    assert_eq!(cpu.a, 0x95);
    assert!(cpu.is_carry_set());
    assert!(cpu.is_overflow_set());
    // N is the carry rotated in, before correction
    assert!(!cpu.is_negative_set());

    // Small nibbles: no correction, no carry
    let (cpu, _) = exec(&[0x6B, 0xFF], |cpu, _| {
        cpu.set_p(D | C);
        cpu.a = 0x22;
    });
    assert_eq!(cpu.a, 0x91);
    assert!(!cpu.is_carry_set());
    assert!(!cpu.is_overflow_set());
    assert!(cpu.is_negative_set());
}

// =============================================================================
// SBX, LAS, TAS
// =============================================================================

#[test]
fn test_sbx_ignores_carry_and_decimal() {
    // SBX #$10: X = (A & X) - $10
    let (cpu, _) = exec(&[0xCB, 0x10], |cpu, _| {
        cpu.set_p(D);
        cpu.a = 0xF0;
        cpu.x = 0x3C;
    });
    assert_eq!(cpu.x, 0x20);
    assert_eq!(cpu.a, 0xF0);
    assert!(cpu.is_carry_set());

    let (cpu, _) = exec(&[0xCB, 0x06], |cpu, _| {
        cpu.set_p(C);
        cpu.a = 0xFF;
        cpu.x = 0x05;
    });
    assert_eq!(cpu.x, 0xFF);
    assert!(!cpu.is_carry_set());
    assert!(cpu.is_negative_set());
}

#[test]
fn test_las_ands_memory_with_stack_pointer() {
    // LAS $3000,Y
    let (cpu, _) = exec(&[0xBB, 0x00, 0x30], |cpu, bus| {
        cpu.sp = 0xF3;
        cpu.y = 0x00;
        bus.memory[0x3000] = 0x5F;
    });
    assert_eq!(cpu.a, 0x53);
    assert_eq!(cpu.x, 0x53);
    assert_eq!(cpu.sp, 0x53);
    assert!(!cpu.is_negative_set());
    assert!(!cpu.is_zero_set());
}

#[test]
fn test_tas_sets_stack_pointer_and_stores_high_and() {
    // TAS $3000,Y
    let (cpu, bus) = exec(&[0x9B, 0x00, 0x30], |cpu, _| {
        cpu.a = 0xF3;
        cpu.x = 0x3F;
        cpu.y = 0x10;
    });
    assert_eq!(cpu.sp, 0x33);
    assert_eq!(bus.memory[0x3010], 0x33 & 0x31);
    assert_eq!(cpu.p() & 0x82, 0x00);
}
