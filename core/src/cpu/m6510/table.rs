use super::{M6510, Mode};
use crate::core::bus::CpuBus;

/// An opcode handler: runs the whole instruction after the opcode fetch.
pub type Operation = fn(&mut M6510, &mut dyn CpuBus);

macro_rules! handlers {
    ($($name:ident => $method:ident $(($mode:ident))?;)*) => {
        $(
            fn $name(cpu: &mut M6510, bus: &mut dyn CpuBus) {
                cpu.$method(bus $(, Mode::$mode)?);
            }
        )*
    };
}

handlers! {
    brk => brk;
    ora_izx => ora(IndX);
    jam => op_jam;
    slo_izx => slo(IndX);
    nop_zp => nop_read(Zp);
    ora_zp => ora(Zp);
    asl_zp => asl(Zp);
    slo_zp => slo(Zp);
    php => php;
    ora_imm => ora(Imm);
    asl_a => asl_a;
    anc_imm => anc(Imm);
    nop_abs => nop_read(Abs);
    ora_abs => ora(Abs);
    asl_abs => asl(Abs);
    slo_abs => slo(Abs);
    bpl => bpl;
    ora_izy => ora(IndY);
    slo_izy => slo(IndY);
    nop_zpx => nop_read(ZpX);
    ora_zpx => ora(ZpX);
    asl_zpx => asl(ZpX);
    slo_zpx => slo(ZpX);
    clc => clc;
    ora_aby => ora(AbsY);
    nop => nop;
    slo_aby => slo(AbsY);
    nop_abx => nop_read(AbsX);
    ora_abx => ora(AbsX);
    asl_abx => asl(AbsX);
    slo_abx => slo(AbsX);
    jsr => jsr;
    and_izx => and(IndX);
    rla_izx => rla(IndX);
    bit_zp => bit(Zp);
    and_zp => and(Zp);
    rol_zp => rol(Zp);
    rla_zp => rla(Zp);
    plp => plp;
    and_imm => and(Imm);
    rol_a => rol_a;
    bit_abs => bit(Abs);
    and_abs => and(Abs);
    rol_abs => rol(Abs);
    rla_abs => rla(Abs);
    bmi => bmi;
    and_izy => and(IndY);
    rla_izy => rla(IndY);
    and_zpx => and(ZpX);
    rol_zpx => rol(ZpX);
    rla_zpx => rla(ZpX);
    sec => sec;
    and_aby => and(AbsY);
    rla_aby => rla(AbsY);
    and_abx => and(AbsX);
    rol_abx => rol(AbsX);
    rla_abx => rla(AbsX);
    rti => rti;
    eor_izx => eor(IndX);
    sre_izx => sre(IndX);
    eor_zp => eor(Zp);
    lsr_zp => lsr(Zp);
    sre_zp => sre(Zp);
    pha => pha;
    eor_imm => eor(Imm);
    lsr_a => lsr_a;
    alr_imm => alr(Imm);
    jmp_abs => jmp_abs;
    eor_abs => eor(Abs);
    lsr_abs => lsr(Abs);
    sre_abs => sre(Abs);
    bvc => bvc;
    eor_izy => eor(IndY);
    sre_izy => sre(IndY);
    eor_zpx => eor(ZpX);
    lsr_zpx => lsr(ZpX);
    sre_zpx => sre(ZpX);
    cli => cli;
    eor_aby => eor(AbsY);
    sre_aby => sre(AbsY);
    eor_abx => eor(AbsX);
    lsr_abx => lsr(AbsX);
    sre_abx => sre(AbsX);
    rts => rts;
    adc_izx => adc(IndX);
    rra_izx => rra(IndX);
    adc_zp => adc(Zp);
    ror_zp => ror(Zp);
    rra_zp => rra(Zp);
    pla => pla;
    adc_imm => adc(Imm);
    ror_a => ror_a;
    arr_imm => arr(Imm);
    jmp_ind => jmp_ind;
    adc_abs => adc(Abs);
    ror_abs => ror(Abs);
    rra_abs => rra(Abs);
    bvs => bvs;
    adc_izy => adc(IndY);
    rra_izy => rra(IndY);
    adc_zpx => adc(ZpX);
    ror_zpx => ror(ZpX);
    rra_zpx => rra(ZpX);
    sei => sei;
    adc_aby => adc(AbsY);
    rra_aby => rra(AbsY);
    adc_abx => adc(AbsX);
    ror_abx => ror(AbsX);
    rra_abx => rra(AbsX);
    nop_imm => nop_read(Imm);
    sta_izx => sta(IndX);
    sax_izx => sax(IndX);
    sty_zp => sty(Zp);
    sta_zp => sta(Zp);
    stx_zp => stx(Zp);
    sax_zp => sax(Zp);
    dey => dey;
    txa => txa;
    ane_imm => ane(Imm);
    sty_abs => sty(Abs);
    sta_abs => sta(Abs);
    stx_abs => stx(Abs);
    sax_abs => sax(Abs);
    bcc => bcc;
    sta_izy => sta(IndY);
    sha_izy => sha(IndY);
    sty_zpx => sty(ZpX);
    sta_zpx => sta(ZpX);
    stx_zpy => stx(ZpY);
    sax_zpy => sax(ZpY);
    tya => tya;
    sta_aby => sta(AbsY);
    txs => txs;
    tas_aby => tas(AbsY);
    shy_abx => shy(AbsX);
    sta_abx => sta(AbsX);
    shx_aby => shx(AbsY);
    sha_aby => sha(AbsY);
    ldy_imm => ldy(Imm);
    lda_izx => lda(IndX);
    ldx_imm => ldx(Imm);
    lax_izx => lax(IndX);
    ldy_zp => ldy(Zp);
    lda_zp => lda(Zp);
    ldx_zp => ldx(Zp);
    lax_zp => lax(Zp);
    tay => tay;
    lda_imm => lda(Imm);
    tax => tax;
    lxa_imm => lxa(Imm);
    ldy_abs => ldy(Abs);
    lda_abs => lda(Abs);
    ldx_abs => ldx(Abs);
    lax_abs => lax(Abs);
    bcs => bcs;
    lda_izy => lda(IndY);
    lax_izy => lax(IndY);
    ldy_zpx => ldy(ZpX);
    lda_zpx => lda(ZpX);
    ldx_zpy => ldx(ZpY);
    lax_zpy => lax(ZpY);
    clv => clv;
    lda_aby => lda(AbsY);
    tsx => tsx;
    las_aby => las(AbsY);
    ldy_abx => ldy(AbsX);
    lda_abx => lda(AbsX);
    ldx_aby => ldx(AbsY);
    lax_aby => lax(AbsY);
    cpy_imm => cpy(Imm);
    cmp_izx => cmp(IndX);
    dcp_izx => dcp(IndX);
    cpy_zp => cpy(Zp);
    cmp_zp => cmp(Zp);
    dec_zp => dec(Zp);
    dcp_zp => dcp(Zp);
    iny => iny;
    cmp_imm => cmp(Imm);
    dex => dex;
    sbx_imm => sbx(Imm);
    cpy_abs => cpy(Abs);
    cmp_abs => cmp(Abs);
    dec_abs => dec(Abs);
    dcp_abs => dcp(Abs);
    bne => bne;
    cmp_izy => cmp(IndY);
    dcp_izy => dcp(IndY);
    cmp_zpx => cmp(ZpX);
    dec_zpx => dec(ZpX);
    dcp_zpx => dcp(ZpX);
    cld => cld;
    cmp_aby => cmp(AbsY);
    dcp_aby => dcp(AbsY);
    cmp_abx => cmp(AbsX);
    dec_abx => dec(AbsX);
    dcp_abx => dcp(AbsX);
    cpx_imm => cpx(Imm);
    sbc_izx => sbc(IndX);
    isc_izx => isc(IndX);
    cpx_zp => cpx(Zp);
    sbc_zp => sbc(Zp);
    inc_zp => inc(Zp);
    isc_zp => isc(Zp);
    inx => inx;
    sbc_imm => sbc(Imm);
    cpx_abs => cpx(Abs);
    sbc_abs => sbc(Abs);
    inc_abs => inc(Abs);
    isc_abs => isc(Abs);
    beq => beq;
    sbc_izy => sbc(IndY);
    isc_izy => isc(IndY);
    sbc_zpx => sbc(ZpX);
    inc_zpx => inc(ZpX);
    isc_zpx => isc(ZpX);
    sed => sed;
    sbc_aby => sbc(AbsY);
    isc_aby => isc(AbsY);
    sbc_abx => sbc(AbsX);
    inc_abx => inc(AbsX);
    isc_abx => isc(AbsX);
}

/// Opcode dispatch table, indexed by opcode byte.
#[rustfmt::skip]
pub static OPERATIONS: [Operation; 256] = [
    brk, ora_izx, jam, slo_izx, nop_zp, ora_zp, asl_zp, slo_zp, // 00
    php, ora_imm, asl_a, anc_imm, nop_abs, ora_abs, asl_abs, slo_abs, // 08
    bpl, ora_izy, jam, slo_izy, nop_zpx, ora_zpx, asl_zpx, slo_zpx, // 10
    clc, ora_aby, nop, slo_aby, nop_abx, ora_abx, asl_abx, slo_abx, // 18
    jsr, and_izx, jam, rla_izx, bit_zp, and_zp, rol_zp, rla_zp, // 20
    plp, and_imm, rol_a, anc_imm, bit_abs, and_abs, rol_abs, rla_abs, // 28
    bmi, and_izy, jam, rla_izy, nop_zpx, and_zpx, rol_zpx, rla_zpx, // 30
    sec, and_aby, nop, rla_aby, nop_abx, and_abx, rol_abx, rla_abx, // 38
    rti, eor_izx, jam, sre_izx, nop_zp, eor_zp, lsr_zp, sre_zp, // 40
    pha, eor_imm, lsr_a, alr_imm, jmp_abs, eor_abs, lsr_abs, sre_abs, // 48
    bvc, eor_izy, jam, sre_izy, nop_zpx, eor_zpx, lsr_zpx, sre_zpx, // 50
    cli, eor_aby, nop, sre_aby, nop_abx, eor_abx, lsr_abx, sre_abx, // 58
    rts, adc_izx, jam, rra_izx, nop_zp, adc_zp, ror_zp, rra_zp, // 60
    pla, adc_imm, ror_a, arr_imm, jmp_ind, adc_abs, ror_abs, rra_abs, // 68
    bvs, adc_izy, jam, rra_izy, nop_zpx, adc_zpx, ror_zpx, rra_zpx, // 70
    sei, adc_aby, nop, rra_aby, nop_abx, adc_abx, ror_abx, rra_abx, // 78
    nop_imm, sta_izx, nop_imm, sax_izx, sty_zp, sta_zp, stx_zp, sax_zp, // 80
    dey, nop_imm, txa, ane_imm, sty_abs, sta_abs, stx_abs, sax_abs, // 88
    bcc, sta_izy, jam, sha_izy, sty_zpx, sta_zpx, stx_zpy, sax_zpy, // 90
    tya, sta_aby, txs, tas_aby, shy_abx, sta_abx, shx_aby, sha_aby, // 98
    ldy_imm, lda_izx, ldx_imm, lax_izx, ldy_zp, lda_zp, ldx_zp, lax_zp, // A0
    tay, lda_imm, tax, lxa_imm, ldy_abs, lda_abs, ldx_abs, lax_abs, // A8
    bcs, lda_izy, jam, lax_izy, ldy_zpx, lda_zpx, ldx_zpy, lax_zpy, // B0
    clv, lda_aby, tsx, las_aby, ldy_abx, lda_abx, ldx_aby, lax_aby, // B8
    cpy_imm, cmp_izx, nop_imm, dcp_izx, cpy_zp, cmp_zp, dec_zp, dcp_zp, // C0
    iny, cmp_imm, dex, sbx_imm, cpy_abs, cmp_abs, dec_abs, dcp_abs, // C8
    bne, cmp_izy, jam, dcp_izy, nop_zpx, cmp_zpx, dec_zpx, dcp_zpx, // D0
    cld, cmp_aby, nop, dcp_aby, nop_abx, cmp_abx, dec_abx, dcp_abx, // D8
    cpx_imm, sbc_izx, nop_imm, isc_izx, cpx_zp, sbc_zp, inc_zp, isc_zp, // E0
    inx, sbc_imm, nop, sbc_imm, cpx_abs, sbc_abs, inc_abs, isc_abs, // E8
    beq, sbc_izy, jam, isc_izy, nop_zpx, sbc_zpx, inc_zpx, isc_zpx, // F0
    sed, sbc_aby, nop, isc_aby, nop_abx, sbc_abx, inc_abx, isc_abx, // F8
];

#[rustfmt::skip]
static MNEMONICS: [&str; 256] = [
    "BRK", "ORA", "JAM", "SLO", "NOP", "ORA", "ASL", "SLO", "PHP", "ORA", "ASL", "ANC", "NOP", "ORA", "ASL", "SLO", // 00
    "BPL", "ORA", "JAM", "SLO", "NOP", "ORA", "ASL", "SLO", "CLC", "ORA", "NOP", "SLO", "NOP", "ORA", "ASL", "SLO", // 10
    "JSR", "AND", "JAM", "RLA", "BIT", "AND", "ROL", "RLA", "PLP", "AND", "ROL", "ANC", "BIT", "AND", "ROL", "RLA", // 20
    "BMI", "AND", "JAM", "RLA", "NOP", "AND", "ROL", "RLA", "SEC", "AND", "NOP", "RLA", "NOP", "AND", "ROL", "RLA", // 30
    "RTI", "EOR", "JAM", "SRE", "NOP", "EOR", "LSR", "SRE", "PHA", "EOR", "LSR", "ALR", "JMP", "EOR", "LSR", "SRE", // 40
    "BVC", "EOR", "JAM", "SRE", "NOP", "EOR", "LSR", "SRE", "CLI", "EOR", "NOP", "SRE", "NOP", "EOR", "LSR", "SRE", // 50
    "RTS", "ADC", "JAM", "RRA", "NOP", "ADC", "ROR", "RRA", "PLA", "ADC", "ROR", "ARR", "JMP", "ADC", "ROR", "RRA", // 60
    "BVS", "ADC", "JAM", "RRA", "NOP", "ADC", "ROR", "RRA", "SEI", "ADC", "NOP", "RRA", "NOP", "ADC", "ROR", "RRA", // 70
    "NOP", "STA", "NOP", "SAX", "STY", "STA", "STX", "SAX", "DEY", "NOP", "TXA", "ANE", "STY", "STA", "STX", "SAX", // 80
    "BCC", "STA", "JAM", "SHA", "STY", "STA", "STX", "SAX", "TYA", "STA", "TXS", "TAS", "SHY", "STA", "SHX", "SHA", // 90
    "LDY", "LDA", "LDX", "LAX", "LDY", "LDA", "LDX", "LAX", "TAY", "LDA", "TAX", "LXA", "LDY", "LDA", "LDX", "LAX", // A0
    "BCS", "LDA", "JAM", "LAX", "LDY", "LDA", "LDX", "LAX", "CLV", "LDA", "TSX", "LAS", "LDY", "LDA", "LDX", "LAX", // B0
    "CPY", "CMP", "NOP", "DCP", "CPY", "CMP", "DEC", "DCP", "INY", "CMP", "DEX", "SBX", "CPY", "CMP", "DEC", "DCP", // C0
    "BNE", "CMP", "JAM", "DCP", "NOP", "CMP", "DEC", "DCP", "CLD", "CMP", "NOP", "DCP", "NOP", "CMP", "DEC", "DCP", // D0
    "CPX", "SBC", "NOP", "ISC", "CPX", "SBC", "INC", "ISC", "INX", "SBC", "NOP", "SBC", "CPX", "SBC", "INC", "ISC", // E0
    "BEQ", "SBC", "JAM", "ISC", "NOP", "SBC", "INC", "ISC", "SED", "SBC", "NOP", "ISC", "NOP", "SBC", "INC", "ISC", // F0
];

/// Assembler mnemonic of an opcode, undocumented ones included.
pub fn mnemonic(opcode: u8) -> &'static str {
    MNEMONICS[opcode as usize]
}
