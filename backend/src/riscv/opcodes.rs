//! Instruction table: one row per mnemonic.
//!
//! Each row names its format family and the fixed opcode/funct bits; the
//! generic encoders in [`super::format`] place the operand fields.

#![allow(non_upper_case_globals)]

use super::format::{
    AmoType, BType, CsrType, FpOp, IType, R4Type, RType, SType, ShiftImm, UType, Unary,
};

// -- Major opcodes --

pub const LOAD: u32 = 0b0000011;
pub const LOAD_FP: u32 = 0b0000111;
pub const MISC_MEM: u32 = 0b0001111;
pub const OP_IMM: u32 = 0b0010011;
pub const AUIPC: u32 = 0b0010111;
pub const OP_IMM_32: u32 = 0b0011011;
pub const STORE: u32 = 0b0100011;
pub const STORE_FP: u32 = 0b0100111;
pub const AMO: u32 = 0b0101111;
pub const OP: u32 = 0b0110011;
pub const LUI: u32 = 0b0110111;
pub const OP_32: u32 = 0b0111011;
pub const MADD: u32 = 0b1000011;
pub const MSUB: u32 = 0b1000111;
pub const NMSUB: u32 = 0b1001011;
pub const NMADD: u32 = 0b1001111;
pub const OP_FP: u32 = 0b1010011;
pub const OP_V: u32 = 0b1010111;
pub const BRANCH: u32 = 0b1100011;
pub const JALR: u32 = 0b1100111;
pub const JAL: u32 = 0b1101111;
pub const SYSTEM: u32 = 0b1110011;

// -- Register-register --

const fn r(opcode: u32, funct3: u32, funct7: u32) -> RType {
    RType {
        opcode,
        funct3,
        funct7,
    }
}

pub const ADD: RType = r(OP, 0b000, 0b0000000);
pub const SUB: RType = r(OP, 0b000, 0b0100000);
pub const SLL: RType = r(OP, 0b001, 0b0000000);
pub const SLT: RType = r(OP, 0b010, 0b0000000);
pub const SLTU: RType = r(OP, 0b011, 0b0000000);
pub const XOR: RType = r(OP, 0b100, 0b0000000);
pub const SRL: RType = r(OP, 0b101, 0b0000000);
pub const SRA: RType = r(OP, 0b101, 0b0100000);
pub const OR: RType = r(OP, 0b110, 0b0000000);
pub const AND: RType = r(OP, 0b111, 0b0000000);

pub const ADDW: RType = r(OP_32, 0b000, 0b0000000);
pub const SUBW: RType = r(OP_32, 0b000, 0b0100000);
pub const SLLW: RType = r(OP_32, 0b001, 0b0000000);
pub const SRLW: RType = r(OP_32, 0b101, 0b0000000);
pub const SRAW: RType = r(OP_32, 0b101, 0b0100000);

// M extension
pub const MUL: RType = r(OP, 0b000, 0b0000001);
pub const MULH: RType = r(OP, 0b001, 0b0000001);
pub const MULHSU: RType = r(OP, 0b010, 0b0000001);
pub const MULHU: RType = r(OP, 0b011, 0b0000001);
pub const DIV: RType = r(OP, 0b100, 0b0000001);
pub const DIVU: RType = r(OP, 0b101, 0b0000001);
pub const REM: RType = r(OP, 0b110, 0b0000001);
pub const REMU: RType = r(OP, 0b111, 0b0000001);
pub const MULW: RType = r(OP_32, 0b000, 0b0000001);
pub const DIVW: RType = r(OP_32, 0b100, 0b0000001);
pub const DIVUW: RType = r(OP_32, 0b101, 0b0000001);
pub const REMW: RType = r(OP_32, 0b110, 0b0000001);
pub const REMUW: RType = r(OP_32, 0b111, 0b0000001);

// Bit manipulation
pub const ADD_UW: RType = r(OP_32, 0b000, 0b0000100);
pub const ROL: RType = r(OP, 0b001, 0b0110000);
pub const ROLW: RType = r(OP_32, 0b001, 0b0110000);
pub const ROR: RType = r(OP, 0b101, 0b0110000);
pub const RORW: RType = r(OP_32, 0b101, 0b0110000);

pub const SEXT_B: Unary = Unary {
    opcode: OP_IMM,
    funct3: 0b001,
    funct12: 0b011000000100,
};
pub const SEXT_H: Unary = Unary {
    opcode: OP_IMM,
    funct3: 0b001,
    funct12: 0b011000000101,
};
pub const ZEXT_H: Unary = Unary {
    opcode: OP_32,
    funct3: 0b100,
    funct12: 0b000010000000,
};

// -- Register-immediate --

const fn i(opcode: u32, funct3: u32) -> IType {
    IType { opcode, funct3 }
}

pub const ADDI: IType = i(OP_IMM, 0b000);
pub const SLTI: IType = i(OP_IMM, 0b010);
pub const SLTIU: IType = i(OP_IMM, 0b011);
pub const XORI: IType = i(OP_IMM, 0b100);
pub const ORI: IType = i(OP_IMM, 0b110);
pub const ANDI: IType = i(OP_IMM, 0b111);
pub const ADDIW: IType = i(OP_IMM_32, 0b000);
pub const JALR_I: IType = i(JALR, 0b000);

pub const LB: IType = i(LOAD, 0b000);
pub const LH: IType = i(LOAD, 0b001);
pub const LW: IType = i(LOAD, 0b010);
pub const LD: IType = i(LOAD, 0b011);
pub const LBU: IType = i(LOAD, 0b100);
pub const LHU: IType = i(LOAD, 0b101);
pub const LWU: IType = i(LOAD, 0b110);
pub const FLW: IType = i(LOAD_FP, 0b010);
pub const FLD: IType = i(LOAD_FP, 0b011);

const fn sh(opcode: u32, funct3: u32, funct: u32, shamt_bits: u32) -> ShiftImm {
    ShiftImm {
        opcode,
        funct3,
        funct,
        shamt_bits,
    }
}

pub const SLLI: ShiftImm = sh(OP_IMM, 0b001, 0b000000, 6);
pub const SRLI: ShiftImm = sh(OP_IMM, 0b101, 0b000000, 6);
pub const SRAI: ShiftImm = sh(OP_IMM, 0b101, 0b010000, 6);
pub const RORI: ShiftImm = sh(OP_IMM, 0b101, 0b011000, 6);
pub const SLLIW: ShiftImm = sh(OP_IMM_32, 0b001, 0b0000000, 5);
pub const SRLIW: ShiftImm = sh(OP_IMM_32, 0b101, 0b0000000, 5);
pub const SRAIW: ShiftImm = sh(OP_IMM_32, 0b101, 0b0100000, 5);
pub const RORIW: ShiftImm = sh(OP_IMM_32, 0b101, 0b0110000, 5);

// -- Stores --

const fn s(opcode: u32, funct3: u32) -> SType {
    SType { opcode, funct3 }
}

pub const SB: SType = s(STORE, 0b000);
pub const SH: SType = s(STORE, 0b001);
pub const SW: SType = s(STORE, 0b010);
pub const SD: SType = s(STORE, 0b011);
pub const FSW: SType = s(STORE_FP, 0b010);
pub const FSD: SType = s(STORE_FP, 0b011);

// -- Branches --

pub const BEQ: BType = BType { funct3: 0b000 };
pub const BNE: BType = BType { funct3: 0b001 };
pub const BLT: BType = BType { funct3: 0b100 };
pub const BGE: BType = BType { funct3: 0b101 };
pub const BLTU: BType = BType { funct3: 0b110 };
pub const BGEU: BType = BType { funct3: 0b111 };

// -- Upper immediate --

pub const LUI_U: UType = UType { opcode: LUI };
pub const AUIPC_U: UType = UType { opcode: AUIPC };

// -- CSR access --

pub const CSRRW: CsrType = CsrType { funct3: 0b001 };
pub const CSRRS: CsrType = CsrType { funct3: 0b010 };
pub const CSRRC: CsrType = CsrType { funct3: 0b011 };
pub const CSRRWI: CsrType = CsrType { funct3: 0b101 };
pub const CSRRSI: CsrType = CsrType { funct3: 0b110 };
pub const CSRRCI: CsrType = CsrType { funct3: 0b111 };

pub const CSR_FFLAGS: u32 = 0x001;
pub const CSR_FRM: u32 = 0x002;
pub const CSR_FCSR: u32 = 0x003;
pub const CSR_VSTART: u32 = 0x008;
pub const CSR_VXSAT: u32 = 0x009;
pub const CSR_VXRM: u32 = 0x00A;
pub const CSR_VCSR: u32 = 0x00F;
pub const CSR_CYCLE: u32 = 0xC00;
pub const CSR_TIME: u32 = 0xC01;
pub const CSR_INSTRET: u32 = 0xC02;
pub const CSR_VL: u32 = 0xC20;
pub const CSR_VTYPE: u32 = 0xC21;
pub const CSR_VLENB: u32 = 0xC22;

// -- Atomics --

const fn amo(funct5: u32, funct3: u32) -> AmoType {
    AmoType { funct5, funct3 }
}

const W: u32 = 0b010;
const D: u32 = 0b011;

pub const LR_W: AmoType = amo(0b00010, W);
pub const LR_D: AmoType = amo(0b00010, D);
pub const SC_W: AmoType = amo(0b00011, W);
pub const SC_D: AmoType = amo(0b00011, D);
pub const AMOSWAP_W: AmoType = amo(0b00001, W);
pub const AMOSWAP_D: AmoType = amo(0b00001, D);
pub const AMOADD_W: AmoType = amo(0b00000, W);
pub const AMOADD_D: AmoType = amo(0b00000, D);
pub const AMOXOR_W: AmoType = amo(0b00100, W);
pub const AMOXOR_D: AmoType = amo(0b00100, D);
pub const AMOAND_W: AmoType = amo(0b01100, W);
pub const AMOAND_D: AmoType = amo(0b01100, D);
pub const AMOOR_W: AmoType = amo(0b01000, W);
pub const AMOOR_D: AmoType = amo(0b01000, D);
pub const AMOMIN_W: AmoType = amo(0b10000, W);
pub const AMOMIN_D: AmoType = amo(0b10000, D);
pub const AMOMAX_W: AmoType = amo(0b10100, W);
pub const AMOMAX_D: AmoType = amo(0b10100, D);
pub const AMOMINU_W: AmoType = amo(0b11000, W);
pub const AMOMINU_D: AmoType = amo(0b11000, D);
pub const AMOMAXU_W: AmoType = amo(0b11100, W);
pub const AMOMAXU_D: AmoType = amo(0b11100, D);

// -- Floating point --

const FMT_S: u32 = 0b00;
const FMT_D: u32 = 0b01;

/// Arithmetic taking a rounding mode operand.
const fn fp_rm(funct5: u32, fmt: u32) -> FpOp {
    FpOp {
        funct7: funct5 << 2 | fmt,
        funct3: None,
        rs2: None,
    }
}

/// Fixed funct3, two register sources.
const fn fp_f3(funct5: u32, fmt: u32, funct3: u32) -> FpOp {
    FpOp {
        funct7: funct5 << 2 | fmt,
        funct3: Some(funct3),
        rs2: None,
    }
}

/// Single source with a fixed rs2 selector, rounding mode operand.
const fn fp_unary_rm(funct5: u32, fmt: u32, rs2: u32) -> FpOp {
    FpOp {
        funct7: funct5 << 2 | fmt,
        funct3: None,
        rs2: Some(rs2),
    }
}

/// Single source with fixed rs2 and funct3.
const fn fp_unary(funct5: u32, fmt: u32, rs2: u32, funct3: u32) -> FpOp {
    FpOp {
        funct7: funct5 << 2 | fmt,
        funct3: Some(funct3),
        rs2: Some(rs2),
    }
}

pub const FADD_S: FpOp = fp_rm(0b00000, FMT_S);
pub const FSUB_S: FpOp = fp_rm(0b00001, FMT_S);
pub const FMUL_S: FpOp = fp_rm(0b00010, FMT_S);
pub const FDIV_S: FpOp = fp_rm(0b00011, FMT_S);
pub const FADD_D: FpOp = fp_rm(0b00000, FMT_D);
pub const FSUB_D: FpOp = fp_rm(0b00001, FMT_D);
pub const FMUL_D: FpOp = fp_rm(0b00010, FMT_D);
pub const FDIV_D: FpOp = fp_rm(0b00011, FMT_D);

pub const FSGNJ_S: FpOp = fp_f3(0b00100, FMT_S, 0b000);
pub const FSGNJN_S: FpOp = fp_f3(0b00100, FMT_S, 0b001);
pub const FSGNJX_S: FpOp = fp_f3(0b00100, FMT_S, 0b010);
pub const FSGNJ_D: FpOp = fp_f3(0b00100, FMT_D, 0b000);
pub const FSGNJN_D: FpOp = fp_f3(0b00100, FMT_D, 0b001);
pub const FSGNJX_D: FpOp = fp_f3(0b00100, FMT_D, 0b010);
pub const FMIN_S: FpOp = fp_f3(0b00101, FMT_S, 0b000);
pub const FMAX_S: FpOp = fp_f3(0b00101, FMT_S, 0b001);
pub const FMIN_D: FpOp = fp_f3(0b00101, FMT_D, 0b000);
pub const FMAX_D: FpOp = fp_f3(0b00101, FMT_D, 0b001);
pub const FEQ_S: FpOp = fp_f3(0b10100, FMT_S, 0b010);
pub const FLT_S: FpOp = fp_f3(0b10100, FMT_S, 0b001);
pub const FLE_S: FpOp = fp_f3(0b10100, FMT_S, 0b000);
pub const FEQ_D: FpOp = fp_f3(0b10100, FMT_D, 0b010);
pub const FLT_D: FpOp = fp_f3(0b10100, FMT_D, 0b001);
pub const FLE_D: FpOp = fp_f3(0b10100, FMT_D, 0b000);

pub const FSQRT_S: FpOp = fp_unary_rm(0b01011, FMT_S, 0b00000);
pub const FSQRT_D: FpOp = fp_unary_rm(0b01011, FMT_D, 0b00000);
pub const FCVT_S_D: FpOp = fp_unary_rm(0b01000, FMT_S, 0b00001);
pub const FCVT_D_S: FpOp = fp_unary_rm(0b01000, FMT_D, 0b00000);

pub const FCVT_W_S: FpOp = fp_unary_rm(0b11000, FMT_S, 0b00000);
pub const FCVT_WU_S: FpOp = fp_unary_rm(0b11000, FMT_S, 0b00001);
pub const FCVT_L_S: FpOp = fp_unary_rm(0b11000, FMT_S, 0b00010);
pub const FCVT_LU_S: FpOp = fp_unary_rm(0b11000, FMT_S, 0b00011);
pub const FCVT_W_D: FpOp = fp_unary_rm(0b11000, FMT_D, 0b00000);
pub const FCVT_WU_D: FpOp = fp_unary_rm(0b11000, FMT_D, 0b00001);
pub const FCVT_L_D: FpOp = fp_unary_rm(0b11000, FMT_D, 0b00010);
pub const FCVT_LU_D: FpOp = fp_unary_rm(0b11000, FMT_D, 0b00011);
pub const FCVT_S_W: FpOp = fp_unary_rm(0b11010, FMT_S, 0b00000);
pub const FCVT_S_WU: FpOp = fp_unary_rm(0b11010, FMT_S, 0b00001);
pub const FCVT_S_L: FpOp = fp_unary_rm(0b11010, FMT_S, 0b00010);
pub const FCVT_S_LU: FpOp = fp_unary_rm(0b11010, FMT_S, 0b00011);
pub const FCVT_D_W: FpOp = fp_unary_rm(0b11010, FMT_D, 0b00000);
pub const FCVT_D_WU: FpOp = fp_unary_rm(0b11010, FMT_D, 0b00001);
pub const FCVT_D_L: FpOp = fp_unary_rm(0b11010, FMT_D, 0b00010);
pub const FCVT_D_LU: FpOp = fp_unary_rm(0b11010, FMT_D, 0b00011);

pub const FMV_X_W: FpOp = fp_unary(0b11100, FMT_S, 0b00000, 0b000);
pub const FMV_X_D: FpOp = fp_unary(0b11100, FMT_D, 0b00000, 0b000);
pub const FCLASS_S: FpOp = fp_unary(0b11100, FMT_S, 0b00000, 0b001);
pub const FCLASS_D: FpOp = fp_unary(0b11100, FMT_D, 0b00000, 0b001);
pub const FMV_W_X: FpOp = fp_unary(0b11110, FMT_S, 0b00000, 0b000);
pub const FMV_D_X: FpOp = fp_unary(0b11110, FMT_D, 0b00000, 0b000);

pub const FMADD_S: R4Type = R4Type { opcode: MADD, fmt: FMT_S };
pub const FMSUB_S: R4Type = R4Type { opcode: MSUB, fmt: FMT_S };
pub const FNMSUB_S: R4Type = R4Type { opcode: NMSUB, fmt: FMT_S };
pub const FNMADD_S: R4Type = R4Type { opcode: NMADD, fmt: FMT_S };
pub const FMADD_D: R4Type = R4Type { opcode: MADD, fmt: FMT_D };
pub const FMSUB_D: R4Type = R4Type { opcode: MSUB, fmt: FMT_D };
pub const FNMSUB_D: R4Type = R4Type { opcode: NMSUB, fmt: FMT_D };
pub const FNMADD_D: R4Type = R4Type { opcode: NMADD, fmt: FMT_D };

// -- Fixed words --

pub const ECALL: u32 = 0x0000_0073;
pub const EBREAK: u32 = 0x0010_0073;
pub const FENCE_I: u32 = 0x0000_100F;
