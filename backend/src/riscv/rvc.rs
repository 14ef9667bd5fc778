//! 16-bit compressed encoders.
//!
//! Each function validates the operand restrictions of its compact form
//! and returns the finished instruction word. Nothing here decides
//! whether a compact form should be used; see [`super::compress`].

use rvjit_core::bits::{extract, nth_bit, patch, patch_bit, right_n_bits, sign_extend};
use rvjit_core::imm::{is_imm_in_range, is_unsigned_imm_in_range};

use super::format::{patch_compressed_reg, patch_reg};
use super::regs::{FReg, Reg, RegEncoding, SP, ZR};

pub const C_NOP: u16 = 0x0001;
pub const C_EBREAK: u16 = 0x9002;

#[inline]
fn base(funct3: u32, op: u32) -> u16 {
    let mut insn = 0u16;
    patch(&mut insn, 1, 0, op);
    patch(&mut insn, 15, 13, funct3);
    insn
}

/// CI layout: imm[5] at 12, imm[4:0] at 6:2.
#[inline]
fn patch_ci_imm(insn: &mut u16, imm: u32) {
    patch(insn, 6, 2, imm & right_n_bits(5));
    patch(insn, 12, 12, (imm >> 5) & 1);
}

fn ci_signed(funct3: u32, rd: Reg, imm: i32) -> u16 {
    assert!(is_imm_in_range(imm as i64, 6, 0), "compact immediate {imm} out of range");
    let mut insn = base(funct3, 0b01);
    patch_reg(&mut insn, 7, rd);
    patch_ci_imm(&mut insn, imm as u32);
    insn
}

pub fn c_nop() -> u16 {
    C_NOP
}

pub fn c_addi(rd: Reg, imm: i32) -> u16 {
    assert!(rd != ZR, "c.addi: rd must not be x0");
    assert!(imm != 0, "c.addi: zero immediate is reserved");
    ci_signed(0b000, rd, imm)
}

pub fn c_addiw(rd: Reg, imm: i32) -> u16 {
    assert!(rd != ZR, "c.addiw: rd must not be x0");
    ci_signed(0b001, rd, imm)
}

pub fn c_li(rd: Reg, imm: i32) -> u16 {
    assert!(rd != ZR, "c.li: rd must not be x0");
    ci_signed(0b010, rd, imm)
}

pub fn c_addi16sp(imm: i32) -> u16 {
    assert!(
        imm != 0 && is_imm_in_range(imm as i64, 6, 4),
        "c.addi16sp: {imm} is not a non-zero multiple of 16 in range"
    );
    let imm = imm as u32;
    let mut insn = base(0b011, 0b01);
    patch(&mut insn, 2, 2, (imm >> 5) & 1);
    patch(&mut insn, 4, 3, (imm >> 7) & right_n_bits(2));
    patch(&mut insn, 5, 5, (imm >> 6) & 1);
    patch(&mut insn, 6, 6, (imm >> 4) & 1);
    patch_reg(&mut insn, 7, SP);
    patch(&mut insn, 12, 12, (imm >> 9) & 1);
    insn
}

pub fn c_addi4spn(rd: Reg, uimm: u32) -> u16 {
    assert!(
        uimm != 0 && is_unsigned_imm_in_range(uimm as i64, 8, 2),
        "c.addi4spn: {uimm} is not a non-zero multiple of 4 below 1024"
    );
    let mut insn = base(0b000, 0b00);
    patch_compressed_reg(&mut insn, 2, rd);
    patch(&mut insn, 5, 5, (uimm >> 3) & 1);
    patch(&mut insn, 6, 6, (uimm >> 2) & 1);
    patch(&mut insn, 10, 7, (uimm >> 6) & right_n_bits(4));
    patch(&mut insn, 12, 11, (uimm >> 4) & right_n_bits(2));
    insn
}

pub fn c_slli(rd: Reg, shamt: u32) -> u16 {
    assert!(rd != ZR, "c.slli: rd must not be x0");
    assert!((1..64).contains(&shamt), "c.slli: shift amount {shamt} out of range");
    let mut insn = base(0b000, 0b10);
    patch_reg(&mut insn, 7, rd);
    patch_ci_imm(&mut insn, shamt);
    insn
}

/// CB-form arithmetic: `c.srli`, `c.srai`, `c.andi`.
fn cb_arith(funct2: u32, rd: Reg, imm: u32) -> u16 {
    let mut insn = base(0b100, 0b01);
    patch_compressed_reg(&mut insn, 7, rd);
    patch(&mut insn, 11, 10, funct2);
    patch_ci_imm(&mut insn, imm);
    insn
}

pub fn c_srli(rd: Reg, shamt: u32) -> u16 {
    assert!((1..64).contains(&shamt), "c.srli: shift amount {shamt} out of range");
    cb_arith(0b00, rd, shamt)
}

pub fn c_srai(rd: Reg, shamt: u32) -> u16 {
    assert!((1..64).contains(&shamt), "c.srai: shift amount {shamt} out of range");
    cb_arith(0b01, rd, shamt)
}

pub fn c_andi(rd: Reg, imm: i32) -> u16 {
    assert!(is_imm_in_range(imm as i64, 6, 0), "c.andi: immediate {imm} out of range");
    cb_arith(0b10, rd, imm as u32 & right_n_bits(6))
}

/// Register-register CA form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaOp {
    Sub,
    Xor,
    Or,
    And,
    Subw,
    Addw,
}

impl CaOp {
    const fn funct(self) -> (u32, u32) {
        match self {
            CaOp::Sub => (0b100011, 0b00),
            CaOp::Xor => (0b100011, 0b01),
            CaOp::Or => (0b100011, 0b10),
            CaOp::And => (0b100011, 0b11),
            CaOp::Subw => (0b100111, 0b00),
            CaOp::Addw => (0b100111, 0b01),
        }
    }
}

pub fn c_arith(op: CaOp, rd: Reg, rs2: Reg) -> u16 {
    let (funct6, funct2) = op.funct();
    let mut insn = 0u16;
    patch(&mut insn, 1, 0, 0b01);
    patch_compressed_reg(&mut insn, 2, rs2);
    patch(&mut insn, 6, 5, funct2);
    patch_compressed_reg(&mut insn, 7, rd);
    patch(&mut insn, 15, 10, funct6);
    insn
}

pub fn c_sub(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::Sub, rd, rs2)
}

pub fn c_xor(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::Xor, rd, rs2)
}

pub fn c_or(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::Or, rd, rs2)
}

pub fn c_and(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::And, rd, rs2)
}

pub fn c_subw(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::Subw, rd, rs2)
}

pub fn c_addw(rd: Reg, rs2: Reg) -> u16 {
    c_arith(CaOp::Addw, rd, rs2)
}

/// CR layout: funct4 at 15:12, rd/rs1 at 11:7, rs2 at 6:2.
fn cr(funct4: u32, rd: Reg, rs2: Reg) -> u16 {
    let mut insn = 0u16;
    patch(&mut insn, 1, 0, 0b10);
    patch_reg(&mut insn, 2, rs2);
    patch_reg(&mut insn, 7, rd);
    patch(&mut insn, 15, 12, funct4);
    insn
}

pub fn c_mv(rd: Reg, rs2: Reg) -> u16 {
    assert!(rd != ZR && rs2 != ZR, "c.mv: x0 operand");
    cr(0b1000, rd, rs2)
}

pub fn c_add(rd: Reg, rs2: Reg) -> u16 {
    assert!(rd != ZR && rs2 != ZR, "c.add: x0 operand");
    cr(0b1001, rd, rs2)
}

pub fn c_jr(rs1: Reg) -> u16 {
    assert!(rs1 != ZR, "c.jr: rs1 must not be x0");
    cr(0b1000, rs1, ZR)
}

pub fn c_jalr(rs1: Reg) -> u16 {
    assert!(rs1 != ZR, "c.jalr: rs1 must not be x0");
    cr(0b1001, rs1, ZR)
}

pub fn c_ebreak() -> u16 {
    C_EBREAK
}

pub fn c_lui(rd: Reg, imm: i32) -> u16 {
    assert!(rd != ZR && rd != SP, "c.lui: rd must not be x0 or sp");
    assert!(
        imm != 0 && imm & right_n_bits(12) as i32 == 0 && is_imm_in_range(imm as i64, 18, 0),
        "c.lui: immediate {imm:#x} out of range"
    );
    let imm = imm as u32;
    let mut insn = base(0b011, 0b01);
    patch(&mut insn, 6, 2, (imm & right_n_bits(17)) >> 12);
    patch_reg(&mut insn, 7, rd);
    patch(&mut insn, 12, 12, (imm & nth_bit(17)) >> 17);
    insn
}

// -- Control transfer --

pub fn c_j(offset: i32) -> u16 {
    let mut insn = base(0b101, 0b01);
    patch_cj_offset(&mut insn, offset);
    insn
}

fn cb_branch(funct3: u32, rs1: Reg, offset: i32) -> u16 {
    let mut insn = base(funct3, 0b01);
    patch_compressed_reg(&mut insn, 7, rs1);
    patch_cb_offset(&mut insn, offset);
    insn
}

pub fn c_beqz(rs1: Reg, offset: i32) -> u16 {
    cb_branch(0b110, rs1, offset)
}

pub fn c_bnez(rs1: Reg, offset: i32) -> u16 {
    cb_branch(0b111, rs1, offset)
}

/// Write a CJ-type offset (`c.j`) into an existing instruction.
pub fn patch_cj_offset(insn: &mut u16, offset: i32) {
    assert!(
        is_imm_in_range(offset as i64, 11, 1),
        "compact jump offset {offset} out of range"
    );
    let off = offset as u32;
    patch(insn, 2, 2, (off >> 5) & 1);
    patch(insn, 5, 3, (off >> 1) & right_n_bits(3));
    patch(insn, 6, 6, (off >> 7) & 1);
    patch(insn, 7, 7, (off >> 6) & 1);
    patch(insn, 8, 8, (off >> 10) & 1);
    patch(insn, 10, 9, (off >> 8) & right_n_bits(2));
    patch(insn, 11, 11, (off >> 4) & 1);
    patch(insn, 12, 12, (off >> 11) & 1);
}

/// Displacement carried by a CJ-type instruction.
pub fn cj_offset(insn: u16) -> i32 {
    let raw = extract(insn, 12, 12) << 11
        | extract(insn, 8, 8) << 10
        | extract(insn, 10, 9) << 8
        | extract(insn, 6, 6) << 7
        | extract(insn, 7, 7) << 6
        | extract(insn, 2, 2) << 5
        | extract(insn, 11, 11) << 4
        | extract(insn, 5, 3) << 1;
    sign_extend(raw, 12)
}

/// Write a CB-type branch offset (`c.beqz`/`c.bnez`).
pub fn patch_cb_offset(insn: &mut u16, offset: i32) {
    assert!(
        is_imm_in_range(offset as i64, 8, 1),
        "compact branch offset {offset} out of range"
    );
    let off = offset as u32;
    patch(insn, 2, 2, (off >> 5) & 1);
    patch(insn, 4, 3, (off >> 1) & right_n_bits(2));
    patch(insn, 6, 5, (off >> 6) & right_n_bits(2));
    patch(insn, 11, 10, (off >> 3) & right_n_bits(2));
    patch(insn, 12, 12, (off >> 8) & 1);
}

/// Displacement carried by a CB-type branch.
pub fn cb_offset(insn: u16) -> i32 {
    let raw = extract(insn, 12, 12) << 8
        | extract(insn, 6, 5) << 6
        | extract(insn, 2, 2) << 5
        | extract(insn, 11, 10) << 3
        | extract(insn, 4, 3) << 1;
    sign_extend(raw, 9)
}

// -- Loads and stores --

/// CL/CS layout for doubleword slots: uimm[5:3] at 12:10, uimm[7:6] at 6:5.
fn cl_d<R: RegEncoding>(funct3: u32, rd: R, rs1: Reg, uimm: u32) -> u16 {
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 5, 3),
        "compact doubleword offset {uimm} out of range"
    );
    let mut insn = base(funct3, 0b00);
    patch_compressed_reg(&mut insn, 2, rd);
    patch(&mut insn, 6, 5, (uimm >> 6) & right_n_bits(2));
    patch_compressed_reg(&mut insn, 7, rs1);
    patch(&mut insn, 12, 10, (uimm >> 3) & right_n_bits(3));
    insn
}

/// CL/CS layout for word slots: uimm[2] at 6, uimm[6] at 5.
fn cl_w(funct3: u32, rd: Reg, rs1: Reg, uimm: u32) -> u16 {
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 5, 2),
        "compact word offset {uimm} out of range"
    );
    let mut insn = base(funct3, 0b00);
    patch_compressed_reg(&mut insn, 2, rd);
    patch_bit(&mut insn, 5, (uimm >> 6) & 1);
    patch_bit(&mut insn, 6, (uimm >> 2) & 1);
    patch_compressed_reg(&mut insn, 7, rs1);
    patch(&mut insn, 12, 10, (uimm >> 3) & right_n_bits(3));
    insn
}

pub fn c_ld(rd: Reg, rs1: Reg, uimm: u32) -> u16 {
    cl_d(0b011, rd, rs1, uimm)
}

pub fn c_sd(rs2: Reg, rs1: Reg, uimm: u32) -> u16 {
    cl_d(0b111, rs2, rs1, uimm)
}

pub fn c_fld(rd: FReg, rs1: Reg, uimm: u32) -> u16 {
    cl_d(0b001, rd, rs1, uimm)
}

pub fn c_fsd(rs2: FReg, rs1: Reg, uimm: u32) -> u16 {
    cl_d(0b101, rs2, rs1, uimm)
}

pub fn c_lw(rd: Reg, rs1: Reg, uimm: u32) -> u16 {
    cl_w(0b010, rd, rs1, uimm)
}

pub fn c_sw(rs2: Reg, rs1: Reg, uimm: u32) -> u16 {
    cl_w(0b110, rs2, rs1, uimm)
}

/// CI stack load, doubleword: uimm[5] at 12, uimm[4:3] at 6:5, uimm[8:6] at 4:2.
fn ci_ldsp<R: RegEncoding>(funct3: u32, rd: R, uimm: u32) -> u16 {
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 6, 3),
        "compact stack doubleword offset {uimm} out of range"
    );
    let mut insn = base(funct3, 0b10);
    patch(&mut insn, 4, 2, (uimm >> 6) & right_n_bits(3));
    patch(&mut insn, 6, 5, (uimm >> 3) & right_n_bits(2));
    patch_reg(&mut insn, 7, rd);
    patch(&mut insn, 12, 12, (uimm >> 5) & 1);
    insn
}

/// CSS stack store, doubleword: uimm[5:3] at 12:10, uimm[8:6] at 9:7.
fn css_sdsp<R: RegEncoding>(funct3: u32, rs2: R, uimm: u32) -> u16 {
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 6, 3),
        "compact stack doubleword offset {uimm} out of range"
    );
    let mut insn = base(funct3, 0b10);
    patch_reg(&mut insn, 2, rs2);
    patch(&mut insn, 9, 7, (uimm >> 6) & right_n_bits(3));
    patch(&mut insn, 12, 10, (uimm >> 3) & right_n_bits(3));
    insn
}

pub fn c_ldsp(rd: Reg, uimm: u32) -> u16 {
    assert!(rd != ZR, "c.ldsp: rd must not be x0");
    ci_ldsp(0b011, rd, uimm)
}

pub fn c_fldsp(rd: FReg, uimm: u32) -> u16 {
    ci_ldsp(0b001, rd, uimm)
}

pub fn c_sdsp(rs2: Reg, uimm: u32) -> u16 {
    css_sdsp(0b111, rs2, uimm)
}

pub fn c_fsdsp(rs2: FReg, uimm: u32) -> u16 {
    css_sdsp(0b101, rs2, uimm)
}

pub fn c_lwsp(rd: Reg, uimm: u32) -> u16 {
    assert!(rd != ZR, "c.lwsp: rd must not be x0");
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 6, 2),
        "c.lwsp: offset {uimm} out of range"
    );
    let mut insn = base(0b010, 0b10);
    patch(&mut insn, 3, 2, (uimm >> 6) & right_n_bits(2));
    patch(&mut insn, 6, 4, (uimm >> 2) & right_n_bits(3));
    patch_reg(&mut insn, 7, rd);
    patch(&mut insn, 12, 12, (uimm >> 5) & 1);
    insn
}

pub fn c_swsp(rs2: Reg, uimm: u32) -> u16 {
    assert!(
        is_unsigned_imm_in_range(uimm as i64, 6, 2),
        "c.swsp: offset {uimm} out of range"
    );
    let mut insn = base(0b110, 0b10);
    patch_reg(&mut insn, 2, rs2);
    patch(&mut insn, 8, 7, (uimm >> 6) & right_n_bits(2));
    patch(&mut insn, 12, 9, (uimm >> 2) & right_n_bits(4));
    insn
}
