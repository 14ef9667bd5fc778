//! Compression selector.
//!
//! One pure function per compressible mnemonic. Given the concrete
//! operands of the canonical instruction it returns the first compact
//! form whose legality predicate holds, or `None` when the canonical
//! encoding must be used. Whether compression is enabled at all is the
//! caller's business (see `Assembler::compression_active`).
//!
//! Branch and jump selectors require a non-zero offset: zero is the
//! placeholder written for an unbound label, and a forward reference is
//! never compressed because its final displacement is unknown.

use rvjit_core::imm::{is_imm_in_range, is_unsigned_imm_in_range};

use super::regs::{FReg, Reg, RegEncoding, RA, SP, ZR};
use super::rvc::{self, CaOp};

/// A selected compact instruction with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactForm {
    Addi { rd: Reg, imm: i32 },
    Addiw { rd: Reg, imm: i32 },
    Li { rd: Reg, imm: i32 },
    Addi16sp { imm: i32 },
    Addi4spn { rd: Reg, uimm: u32 },
    Slli { rd: Reg, shamt: u32 },
    Srli { rd: Reg, shamt: u32 },
    Srai { rd: Reg, shamt: u32 },
    Andi { rd: Reg, imm: i32 },
    Arith { op: CaOp, rd: Reg, rs2: Reg },
    Mv { rd: Reg, rs2: Reg },
    Add { rd: Reg, rs2: Reg },
    Lui { rd: Reg, imm: i32 },
    Jr { rs1: Reg },
    Jalr { rs1: Reg },
    J { offset: i32 },
    Beqz { rs1: Reg, offset: i32 },
    Bnez { rs1: Reg, offset: i32 },
    Ebreak,
    Ld { rd: Reg, rs1: Reg, uimm: u32 },
    Sd { rs2: Reg, rs1: Reg, uimm: u32 },
    Lw { rd: Reg, rs1: Reg, uimm: u32 },
    Sw { rs2: Reg, rs1: Reg, uimm: u32 },
    Fld { rd: FReg, rs1: Reg, uimm: u32 },
    Fsd { rs2: FReg, rs1: Reg, uimm: u32 },
    Ldsp { rd: Reg, uimm: u32 },
    Sdsp { rs2: Reg, uimm: u32 },
    Lwsp { rd: Reg, uimm: u32 },
    Swsp { rs2: Reg, uimm: u32 },
    Fldsp { rd: FReg, uimm: u32 },
    Fsdsp { rs2: FReg, uimm: u32 },
}

impl CompactForm {
    /// The 16-bit instruction word.
    pub fn encode(self) -> u16 {
        use CompactForm::*;
        match self {
            Addi { rd, imm } => rvc::c_addi(rd, imm),
            Addiw { rd, imm } => rvc::c_addiw(rd, imm),
            Li { rd, imm } => rvc::c_li(rd, imm),
            Addi16sp { imm } => rvc::c_addi16sp(imm),
            Addi4spn { rd, uimm } => rvc::c_addi4spn(rd, uimm),
            Slli { rd, shamt } => rvc::c_slli(rd, shamt),
            Srli { rd, shamt } => rvc::c_srli(rd, shamt),
            Srai { rd, shamt } => rvc::c_srai(rd, shamt),
            Andi { rd, imm } => rvc::c_andi(rd, imm),
            Arith { op, rd, rs2 } => rvc::c_arith(op, rd, rs2),
            Mv { rd, rs2 } => rvc::c_mv(rd, rs2),
            Add { rd, rs2 } => rvc::c_add(rd, rs2),
            Lui { rd, imm } => rvc::c_lui(rd, imm),
            Jr { rs1 } => rvc::c_jr(rs1),
            Jalr { rs1 } => rvc::c_jalr(rs1),
            J { offset } => rvc::c_j(offset),
            Beqz { rs1, offset } => rvc::c_beqz(rs1, offset),
            Bnez { rs1, offset } => rvc::c_bnez(rs1, offset),
            Ebreak => rvc::c_ebreak(),
            Ld { rd, rs1, uimm } => rvc::c_ld(rd, rs1, uimm),
            Sd { rs2, rs1, uimm } => rvc::c_sd(rs2, rs1, uimm),
            Lw { rd, rs1, uimm } => rvc::c_lw(rd, rs1, uimm),
            Sw { rs2, rs1, uimm } => rvc::c_sw(rs2, rs1, uimm),
            Fld { rd, rs1, uimm } => rvc::c_fld(rd, rs1, uimm),
            Fsd { rs2, rs1, uimm } => rvc::c_fsd(rs2, rs1, uimm),
            Ldsp { rd, uimm } => rvc::c_ldsp(rd, uimm),
            Sdsp { rs2, uimm } => rvc::c_sdsp(rs2, uimm),
            Lwsp { rd, uimm } => rvc::c_lwsp(rd, uimm),
            Swsp { rs2, uimm } => rvc::c_swsp(rs2, uimm),
            Fldsp { rd, uimm } => rvc::c_fldsp(rd, uimm),
            Fsdsp { rs2, uimm } => rvc::c_fsdsp(rs2, uimm),
        }
    }
}

#[inline]
fn both_compressed(a: Reg, b: Reg) -> bool {
    a.is_compressed_valid() && b.is_compressed_valid()
}

/// The source that is not `rd`, when one of the two sources is `rd`.
#[inline]
fn other_source(rd: Reg, rs1: Reg, rs2: Reg) -> Option<Reg> {
    if rs1 == rd {
        Some(rs2)
    } else if rs2 == rd {
        Some(rs1)
    } else {
        None
    }
}

// -- Register-register --

pub fn add(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    if rs1 == ZR || rs2 == ZR {
        return None;
    }
    other_source(rd, rs1, rs2).map(|rs2| CompactForm::Add { rd, rs2 })
}

fn sub_like(op: CaOp, rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    (rs1 == rd && both_compressed(rd, rs2)).then_some(CompactForm::Arith { op, rd, rs2 })
}

/// Commutative CA forms: either source may be the destination.
fn commutative(op: CaOp, rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    if !both_compressed(rs1, rs2) {
        return None;
    }
    other_source(rd, rs1, rs2).map(|rs2| CompactForm::Arith { op, rd, rs2 })
}

pub fn sub(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    sub_like(CaOp::Sub, rd, rs1, rs2)
}

pub fn subw(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    sub_like(CaOp::Subw, rd, rs1, rs2)
}

pub fn xor(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    commutative(CaOp::Xor, rd, rs1, rs2)
}

pub fn or(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    commutative(CaOp::Or, rd, rs1, rs2)
}

pub fn and(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    commutative(CaOp::And, rd, rs1, rs2)
}

pub fn addw(rd: Reg, rs1: Reg, rs2: Reg) -> Option<CompactForm> {
    commutative(CaOp::Addw, rd, rs1, rs2)
}

// -- Register-immediate --

/// `addi`, candidates in priority order: `c.addi`, `c.mv`, `c.addi16sp`,
/// `c.addi4spn`, `c.li`. A zero immediate never selects `c.addi`, whose
/// all-zero form is the dedicated no-op. GNU as tries `c.addi` before
/// `c.addi16sp` too; both give the same word for `addi sp, sp, imm`.
pub fn addi(rd: Reg, rs1: Reg, imm: i32) -> Option<CompactForm> {
    let imm64 = imm as i64;
    if rd == rs1 && rd != ZR && imm != 0 && is_imm_in_range(imm64, 6, 0) {
        return Some(CompactForm::Addi { rd, imm });
    }
    if imm == 0 && rd != ZR && rs1 != ZR {
        return Some(CompactForm::Mv { rd, rs2: rs1 });
    }
    if rs1 == SP && rd == SP && imm != 0 && is_imm_in_range(imm64, 6, 4) {
        return Some(CompactForm::Addi16sp { imm });
    }
    if rs1 == SP
        && rd.is_compressed_valid()
        && imm != 0
        && is_unsigned_imm_in_range(imm64, 8, 2)
    {
        return Some(CompactForm::Addi4spn { rd, uimm: imm as u32 });
    }
    if rs1 == ZR && rd != ZR && is_imm_in_range(imm64, 6, 0) {
        return Some(CompactForm::Li { rd, imm });
    }
    None
}

pub fn addiw(rd: Reg, rs1: Reg, imm: i32) -> Option<CompactForm> {
    (rd == rs1 && rd != ZR && is_imm_in_range(imm as i64, 6, 0))
        .then_some(CompactForm::Addiw { rd, imm })
}

pub fn andi(rd: Reg, rs1: Reg, imm: i32) -> Option<CompactForm> {
    (rd == rs1 && rd.is_compressed_valid() && is_imm_in_range(imm as i64, 6, 0))
        .then_some(CompactForm::Andi { rd, imm })
}

pub fn slli(rd: Reg, rs1: Reg, shamt: u32) -> Option<CompactForm> {
    (rd == rs1 && rd != ZR && shamt != 0).then_some(CompactForm::Slli { rd, shamt })
}

pub fn srli(rd: Reg, rs1: Reg, shamt: u32) -> Option<CompactForm> {
    (rd == rs1 && rd.is_compressed_valid() && shamt != 0)
        .then_some(CompactForm::Srli { rd, shamt })
}

pub fn srai(rd: Reg, rs1: Reg, shamt: u32) -> Option<CompactForm> {
    (rd == rs1 && rd.is_compressed_valid() && shamt != 0)
        .then_some(CompactForm::Srai { rd, shamt })
}

pub fn lui(rd: Reg, imm: i32) -> Option<CompactForm> {
    (rd != ZR && rd != SP && imm != 0 && is_imm_in_range(imm as i64, 18, 0))
        .then_some(CompactForm::Lui { rd, imm })
}

// -- Loads and stores --

pub fn ld(rd: Reg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && rd != ZR && is_unsigned_imm_in_range(off, 6, 3) {
        Some(CompactForm::Ldsp { rd, uimm: offset as u32 })
    } else if both_compressed(rd, rs1) && is_unsigned_imm_in_range(off, 5, 3) {
        Some(CompactForm::Ld { rd, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

pub fn sd(rs2: Reg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && is_unsigned_imm_in_range(off, 6, 3) {
        Some(CompactForm::Sdsp { rs2, uimm: offset as u32 })
    } else if both_compressed(rs2, rs1) && is_unsigned_imm_in_range(off, 5, 3) {
        Some(CompactForm::Sd { rs2, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

pub fn lw(rd: Reg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && rd != ZR && is_unsigned_imm_in_range(off, 6, 2) {
        Some(CompactForm::Lwsp { rd, uimm: offset as u32 })
    } else if both_compressed(rd, rs1) && is_unsigned_imm_in_range(off, 5, 2) {
        Some(CompactForm::Lw { rd, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

pub fn sw(rs2: Reg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && is_unsigned_imm_in_range(off, 6, 2) {
        Some(CompactForm::Swsp { rs2, uimm: offset as u32 })
    } else if both_compressed(rs2, rs1) && is_unsigned_imm_in_range(off, 5, 2) {
        Some(CompactForm::Sw { rs2, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

pub fn fld(rd: FReg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && is_unsigned_imm_in_range(off, 6, 3) {
        Some(CompactForm::Fldsp { rd, uimm: offset as u32 })
    } else if rd.is_compressed_valid()
        && rs1.is_compressed_valid()
        && is_unsigned_imm_in_range(off, 5, 3)
    {
        Some(CompactForm::Fld { rd, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

pub fn fsd(rs2: FReg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    let off = offset as i64;
    if rs1 == SP && is_unsigned_imm_in_range(off, 6, 3) {
        Some(CompactForm::Fsdsp { rs2, uimm: offset as u32 })
    } else if rs2.is_compressed_valid()
        && rs1.is_compressed_valid()
        && is_unsigned_imm_in_range(off, 5, 3)
    {
        Some(CompactForm::Fsd { rs2, rs1, uimm: offset as u32 })
    } else {
        None
    }
}

// -- Control transfer --

fn zero_branch(rs1: Reg, rs2: Reg, offset: i32) -> bool {
    offset != 0
        && rs2 == ZR
        && rs1.is_compressed_valid()
        && is_imm_in_range(offset as i64, 8, 1)
}

pub fn beq(rs1: Reg, rs2: Reg, offset: i32) -> Option<CompactForm> {
    zero_branch(rs1, rs2, offset).then_some(CompactForm::Beqz { rs1, offset })
}

pub fn bne(rs1: Reg, rs2: Reg, offset: i32) -> Option<CompactForm> {
    zero_branch(rs1, rs2, offset).then_some(CompactForm::Bnez { rs1, offset })
}

pub fn jal(rd: Reg, offset: i32) -> Option<CompactForm> {
    (offset != 0 && rd == ZR && is_imm_in_range(offset as i64, 11, 1))
        .then_some(CompactForm::J { offset })
}

pub fn jalr(rd: Reg, rs1: Reg, offset: i32) -> Option<CompactForm> {
    if offset != 0 || rs1 == ZR {
        return None;
    }
    match rd {
        RA => Some(CompactForm::Jalr { rs1 }),
        ZR => Some(CompactForm::Jr { rs1 }),
        _ => None,
    }
}

pub fn ebreak() -> Option<CompactForm> {
    Some(CompactForm::Ebreak)
}
