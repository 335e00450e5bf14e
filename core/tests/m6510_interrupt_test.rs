use retroscope_core::core::InterruptState;
use retroscope_core::cpu::Cpu;
use retroscope_core::cpu::m6510::StatusFlag;
mod common;
use common::{cpu_with_program, step};

const ORIGIN: u16 = 0x0200;

// =============================================================================
// NMI
// =============================================================================

#[test]
fn test_nmi_entry_then_instruction() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0xEA]);
    bus.set_nmi_vector(0x8000);
    bus.load(0x8000, &[0xEA]);
    cpu.request_nmi();
    let entry = step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x8000);
    let nop = step(&mut cpu, &mut bus);
    assert_eq!(entry + nop, 9);
    assert!(!cpu.is_nmi_requested());
}

#[test]
fn test_nmi_ignores_interrupt_disable() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0xEA]);
    bus.set_nmi_vector(0x8000);
    assert!(cpu.is_interrupt_disabled());
    cpu.signal_interrupt(InterruptState { nmi: true, irq: false });
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x8000);
}

#[test]
fn test_nmi_has_priority_over_irq() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0xEA]);
    bus.set_nmi_vector(0x8000);
    bus.set_irq_vector(0x9000);
    bus.load(0x8000, &[0x40]); // RTI
    cpu.set_p(0);
    cpu.signal_interrupt(InterruptState { nmi: true, irq: true });

    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x8000);
    assert!(cpu.is_irq_requested());

    // RTI restores I clear; the latched IRQ is taken next.
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, ORIGIN);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x9000);
    assert!(!cpu.is_irq_requested());
}

// =============================================================================
// IRQ
// =============================================================================

#[test]
fn test_irq_masked_when_i_set() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0xEA, 0xEA]);
    bus.set_irq_vector(0x9000);
    cpu.request_irq();
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, ORIGIN + 2);
    assert!(cpu.is_irq_requested());
    cpu.clear_irq();
    assert!(!cpu.is_irq_requested());
}

#[test]
fn test_irq_pushes_pc_and_p_with_b_clear() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0xEA]);
    bus.set_irq_vector(0x9000);
    cpu.set_p(StatusFlag::C as u8);
    cpu.request_irq();
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.sp, 0xFA);
    assert_eq!(bus.memory[0x01FD], 0x02); // PCH
    assert_eq!(bus.memory[0x01FC], 0x00); // PCL
    let pushed = bus.memory[0x01FB];
    assert_eq!(pushed & StatusFlag::B as u8, 0);
    assert_ne!(pushed & StatusFlag::U as u8, 0);
    assert_ne!(pushed & StatusFlag::C as u8, 0);
    assert!(cpu.is_interrupt_disabled());
}

// =============================================================================
// BRK / RTI and the status register
// =============================================================================

#[test]
fn test_brk_pushes_pc_plus_two_and_b_set() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0x00, 0xFF]);
    bus.set_irq_vector(0x9000);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(bus.memory[0x01FD], 0x02);
    assert_eq!(bus.memory[0x01FC], 0x02);
    let pushed = bus.memory[0x01FB];
    assert_ne!(pushed & StatusFlag::B as u8, 0);
    assert_ne!(pushed & StatusFlag::U as u8, 0);
}

#[test]
fn test_rti_returns_and_clears_b() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0x00, 0xFF, 0xEA]);
    bus.set_irq_vector(0x9000);
    bus.load(0x9000, &[0x40]);
    step(&mut cpu, &mut bus); // BRK
    step(&mut cpu, &mut bus); // RTI
    assert_eq!(cpu.pc, ORIGIN + 2);
    assert!(!cpu.is_break_set());
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn test_php_plp_status_bits() {
    // PHP; LDA #$FF; PHA; PLP
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0x08, 0xA9, 0xFF, 0x48, 0x28]);
    cpu.set_p(0);
    step(&mut cpu, &mut bus);
    assert_eq!(bus.memory[0x01FD], 0x30); // B and U pushed
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.p(), 0xEF);
}

#[test]
fn test_unused_flag_always_reads_set() {
    let (mut cpu, _bus) = cpu_with_program(ORIGIN, &[]);
    cpu.set_p(0x00);
    assert_eq!(cpu.p(), 0x20);
}

// =============================================================================
// Step-out bookkeeping
// =============================================================================

#[test]
fn test_jsr_and_interrupts_feed_step_out_stack() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0x20, 0x00, 0x30]);
    bus.set_irq_vector(0x9000);
    bus.load(0x3000, &[0x60]);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.step_out_stack().peek(), Some(ORIGIN + 3));

    cpu.set_p(0);
    cpu.request_irq();
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.step_out_stack().depth(), 2);
    assert_eq!(cpu.step_out_stack().peek(), Some(0x3000));
}

#[test]
fn test_rts_flags_return() {
    let (mut cpu, mut bus) = cpu_with_program(ORIGIN, &[0x20, 0x00, 0x30]);
    bus.load(0x3000, &[0x60]);
    step(&mut cpu, &mut bus);
    assert!(!cpu.step_out_stack().ret_executed);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, ORIGIN + 3);
    assert!(cpu.step_out_stack().ret_executed);
}

#[test]
fn test_call_instruction_length() {
    let (cpu, _bus) = cpu_with_program(ORIGIN, &[]);
    assert_eq!(cpu.call_instruction_length(0x20), 3);
    assert_eq!(cpu.call_instruction_length(0x00), 2);
    assert_eq!(cpu.call_instruction_length(0x4C), 0);
}
