//! Generic encoders, one per canonical format family.
//!
//! Every encoder starts from a zero word and patches disjoint fields, so
//! reserved bits stay clear. Operand range violations panic: an
//! unencodable operand is a code generator bug.

use rvjit_core::bits::{extract, nth_bit, patch, patch_bit, right_n_bits, sign_extend, InsnWord};
use rvjit_core::imm::{is_imm_in_range, is_unsigned_imm_in_range};

use super::opcodes::{AMO, BRANCH, JAL, OP_FP, SYSTEM};
use super::regs::RegEncoding;

// -- Format rows --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RType {
    pub opcode: u32,
    pub funct3: u32,
    pub funct7: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IType {
    pub opcode: u32,
    pub funct3: u32,
}

/// I-type with the whole immediate field fixed (`sext.b`, `zext.h`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unary {
    pub opcode: u32,
    pub funct3: u32,
    pub funct12: u32,
}

/// Shift by immediate: `funct` sits above a `shamt_bits`-wide shamt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftImm {
    pub opcode: u32,
    pub funct3: u32,
    pub funct: u32,
    pub shamt_bits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SType {
    pub opcode: u32,
    pub funct3: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BType {
    pub funct3: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UType {
    pub opcode: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrType {
    pub funct3: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmoType {
    pub funct5: u32,
    pub funct3: u32,
}

/// OP-FP row. `funct3: None` means the field carries a rounding mode;
/// `rs2: Some(_)` fixes the rs2 field for single-source operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpOp {
    pub funct7: u32,
    pub funct3: Option<u32>,
    pub rs2: Option<u32>,
}

/// Fused multiply-add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct R4Type {
    pub opcode: u32,
    pub fmt: u32,
}

/// Floating-point rounding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundingMode {
    Rne = 0b000,
    Rtz = 0b001,
    Rdn = 0b010,
    Rup = 0b011,
    Rmm = 0b100,
    Dyn = 0b111,
}

/// Memory ordering bits for atomics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aqrl {
    pub aq: bool,
    pub rl: bool,
}

impl Aqrl {
    pub const RELAXED: Aqrl = Aqrl { aq: false, rl: false };
    pub const ACQUIRE: Aqrl = Aqrl { aq: true, rl: false };
    pub const RELEASE: Aqrl = Aqrl { aq: false, rl: true };
    pub const SEQ_CST: Aqrl = Aqrl { aq: true, rl: true };
}

// -- Register fields --

/// Patch a 5-bit register field at `[lsb + 4, lsb]`.
#[inline]
pub fn patch_reg<W: InsnWord, R: RegEncoding>(insn: &mut W, lsb: u32, reg: R) {
    patch(insn, lsb + 4, lsb, reg.encoding());
}

/// Patch a 3-bit compressed register field at `[lsb + 2, lsb]`.
#[inline]
pub fn patch_compressed_reg<W: InsnWord, R: RegEncoding>(insn: &mut W, lsb: u32, reg: R) {
    patch(insn, lsb + 2, lsb, reg.compressed_encoding());
}

#[inline]
fn patch_base(insn: &mut u32, opcode: u32, funct3: u32) {
    patch(insn, 6, 0, opcode);
    patch(insn, 14, 12, funct3);
}

// -- Encoders --

pub fn encode_r(row: RType, rd: u32, rs1: u32, rs2: u32) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2);
    patch(&mut insn, 31, 25, row.funct7);
    insn
}

pub fn encode_i(row: IType, rd: u32, rs1: u32, imm: i32) -> u32 {
    assert!(
        is_imm_in_range(imm as i64, 12, 0),
        "I-type immediate {imm} out of range"
    );
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 31, 20, imm as u32 & right_n_bits(12));
    insn
}

pub fn encode_unary(row: Unary, rd: u32, rs1: u32) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 31, 20, row.funct12);
    insn
}

pub fn encode_shift(row: ShiftImm, rd: u32, rs1: u32, shamt: u32) -> u32 {
    assert!(
        shamt <= right_n_bits(row.shamt_bits),
        "shift amount {shamt} exceeds {} bits",
        row.shamt_bits
    );
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 19 + row.shamt_bits, 20, shamt);
    patch(&mut insn, 31, 20 + row.shamt_bits, row.funct);
    insn
}

pub fn encode_s(row: SType, rs2: u32, rs1: u32, imm: i32) -> u32 {
    assert!(
        is_imm_in_range(imm as i64, 12, 0),
        "S-type offset {imm} out of range"
    );
    let imm = imm as u32;
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, row.funct3);
    patch(&mut insn, 11, 7, imm & right_n_bits(5));
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2);
    patch(&mut insn, 31, 25, (imm >> 5) & right_n_bits(7));
    insn
}

pub fn encode_b(row: BType, rs1: u32, rs2: u32, offset: i32) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, BRANCH, row.funct3);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2);
    patch_b_offset(&mut insn, offset);
    insn
}

/// Write a B-type branch offset into an existing instruction.
pub fn patch_b_offset(insn: &mut u32, offset: i32) {
    assert!(
        is_imm_in_range(offset as i64, 12, 1),
        "branch offset {offset} out of range"
    );
    let off = offset as u32;
    patch(insn, 7, 7, (off & nth_bit(11)) >> 11);
    patch(insn, 11, 8, (off >> 1) & right_n_bits(4));
    patch(insn, 30, 25, (off >> 5) & right_n_bits(6));
    patch(insn, 31, 31, (off & nth_bit(12)) >> 12);
}

/// Displacement carried by a B-type instruction.
pub fn b_offset(insn: u32) -> i32 {
    let raw = extract(insn, 31, 31) << 12
        | extract(insn, 7, 7) << 11
        | extract(insn, 30, 25) << 5
        | extract(insn, 11, 8) << 1;
    sign_extend(raw, 13)
}

pub fn encode_u(row: UType, rd: u32, imm: i32) -> u32 {
    assert!(
        imm as u32 & right_n_bits(12) == 0,
        "upper immediate {imm:#x} has low bits set"
    );
    let mut insn = 0u32;
    patch(&mut insn, 6, 0, row.opcode);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 31, 12, imm as u32 >> 12);
    insn
}

pub fn encode_j(rd: u32, offset: i32) -> u32 {
    let mut insn = 0u32;
    patch(&mut insn, 6, 0, JAL);
    patch(&mut insn, 11, 7, rd);
    patch_j_offset(&mut insn, offset);
    insn
}

/// Write a J-type jump offset into an existing instruction.
pub fn patch_j_offset(insn: &mut u32, offset: i32) {
    assert!(
        is_imm_in_range(offset as i64, 20, 1),
        "jump offset {offset} out of range"
    );
    let off = offset as u32;
    patch(insn, 19, 12, (off >> 12) & right_n_bits(8));
    patch(insn, 20, 20, (off & nth_bit(11)) >> 11);
    patch(insn, 30, 21, (off >> 1) & right_n_bits(10));
    patch(insn, 31, 31, (off & nth_bit(20)) >> 20);
}

/// Displacement carried by a J-type instruction.
pub fn j_offset(insn: u32) -> i32 {
    let raw = extract(insn, 31, 31) << 20
        | extract(insn, 19, 12) << 12
        | extract(insn, 20, 20) << 11
        | extract(insn, 30, 21) << 1;
    sign_extend(raw, 21)
}

pub fn encode_csr(row: CsrType, rd: u32, csr: u32, rs1_or_uimm: u32) -> u32 {
    assert!(csr <= right_n_bits(12), "csr {csr:#x} out of range");
    let mut insn = 0u32;
    patch_base(&mut insn, SYSTEM, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1_or_uimm);
    patch(&mut insn, 31, 20, csr);
    insn
}

pub fn encode_amo(row: AmoType, rd: u32, rs1: u32, rs2: u32, order: Aqrl) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, AMO, row.funct3);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2);
    patch_bit(&mut insn, 25, order.rl as u32);
    patch_bit(&mut insn, 26, order.aq as u32);
    patch(&mut insn, 31, 27, row.funct5);
    insn
}

pub fn encode_fp(row: FpOp, rd: u32, rs1: u32, rs2: u32, rm: RoundingMode) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, OP_FP, row.funct3.unwrap_or(rm as u32));
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, row.rs2.unwrap_or(rs2));
    patch(&mut insn, 31, 25, row.funct7);
    insn
}

pub fn encode_r4(row: R4Type, rd: u32, rs1: u32, rs2: u32, rs3: u32, rm: RoundingMode) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, row.opcode, rm as u32);
    patch(&mut insn, 11, 7, rd);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2);
    patch(&mut insn, 26, 25, row.fmt);
    patch(&mut insn, 31, 27, rs3);
    insn
}

/// `fence pred, succ` with 4-bit IORW sets.
pub fn encode_fence(pred: u32, succ: u32) -> u32 {
    let mut insn = 0u32;
    patch_base(&mut insn, super::opcodes::MISC_MEM, 0b000);
    patch(&mut insn, 23, 20, succ);
    patch(&mut insn, 27, 24, pred);
    insn
}

/// Whether `imm` is a valid unsigned CSR immediate.
#[inline]
pub fn is_csr_uimm(imm: u32) -> bool {
    is_unsigned_imm_in_range(imm as i64, 5, 0)
}
