//! RISC-V instruction emitter.
//!
//! [`Assembler`] appends little-endian instruction words to a
//! [`CodeBuffer`]. Mnemonics with a compact counterpart go through the
//! compression selector when compression is active; each of them also
//! has a `_nc` variant that always emits the canonical 4-byte form.

use rvjit_core::label::{Label, RelocKind};
use rvjit_core::Features;
use tracing::debug;

use super::compress::{self, CompactForm};
use super::format::*;
use super::opcodes::*;
use super::region::RegionGuard;
use super::regs::{FReg, Reg, RegEncoding, RA, ZR};
use super::reloc;
use super::rvc;
use crate::CodeBuffer;

/// Where a branch or jump goes.
#[derive(Debug)]
pub enum BranchTarget<'l> {
    /// Fixed displacement from the branch instruction.
    Offset(i32),
    /// A label, bound or not.
    Label(&'l mut Label),
}

impl From<i32> for BranchTarget<'_> {
    fn from(offset: i32) -> Self {
        BranchTarget::Offset(offset)
    }
}

impl<'l> From<&'l mut Label> for BranchTarget<'l> {
    fn from(label: &'l mut Label) -> Self {
        BranchTarget::Label(label)
    }
}

/// Conditional branch comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCond {
    Eq,
    Ne,
    Lt,
    Ge,
    Ltu,
    Geu,
}

impl BranchCond {
    fn row(self) -> BType {
        match self {
            BranchCond::Eq => BEQ,
            BranchCond::Ne => BNE,
            BranchCond::Lt => BLT,
            BranchCond::Ge => BGE,
            BranchCond::Ltu => BLTU,
            BranchCond::Geu => BGEU,
        }
    }

    /// Compact form for this comparison, if one exists for the operands.
    fn compact(self, rs1: Reg, rs2: Reg, offset: i32) -> Option<CompactForm> {
        match self {
            BranchCond::Eq => compress::beq(rs1, rs2, offset),
            BranchCond::Ne => compress::bne(rs1, rs2, offset),
            _ => None,
        }
    }
}

#[inline]
fn displacement(from: usize, to: usize) -> i32 {
    (to as i64 - from as i64) as i32
}

pub struct Assembler<'a> {
    buf: &'a mut CodeBuffer,
    use_rvc: bool,
    in_compressible_region: bool,
}

macro_rules! r_type {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, rs2: Reg) {
            self.emit(encode_r($row, rd.encoding(), rs1.encoding(), rs2.encoding()));
        }
    )*};
}

macro_rules! r_type_rvc {
    ($($name:ident, $nc:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, rs2: Reg) {
            if !self.try_compress(|| compress::$name(rd, rs1, rs2)) {
                self.$nc(rd, rs1, rs2);
            }
        }

        pub fn $nc(&mut self, rd: Reg, rs1: Reg, rs2: Reg) {
            self.emit(encode_r($row, rd.encoding(), rs1.encoding(), rs2.encoding()));
        }
    )*};
}

macro_rules! i_type {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, imm: i32) {
            self.emit(encode_i($row, rd.encoding(), rs1.encoding(), imm));
        }
    )*};
}

macro_rules! i_type_rvc {
    ($($name:ident, $nc:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, imm: i32) {
            if !self.try_compress(|| compress::$name(rd, rs1, imm)) {
                self.$nc(rd, rs1, imm);
            }
        }

        pub fn $nc(&mut self, rd: Reg, rs1: Reg, imm: i32) {
            self.emit(encode_i($row, rd.encoding(), rs1.encoding(), imm));
        }
    )*};
}

macro_rules! shift {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, shamt: u32) {
            self.emit(encode_shift($row, rd.encoding(), rs1.encoding(), shamt));
        }
    )*};
}

macro_rules! shift_rvc {
    ($($name:ident, $nc:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg, shamt: u32) {
            if !self.try_compress(|| compress::$name(rd, rs1, shamt)) {
                self.$nc(rd, rs1, shamt);
            }
        }

        pub fn $nc(&mut self, rd: Reg, rs1: Reg, shamt: u32) {
            self.emit(encode_shift($row, rd.encoding(), rs1.encoding(), shamt));
        }
    )*};
}

macro_rules! unary {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: Reg, rs1: Reg) {
            self.emit(encode_unary($row, rd.encoding(), rs1.encoding()));
        }
    )*};
}

/// Loads: `name(rd, base, offset)`.
macro_rules! load {
    ($($name:ident => $row:expr, $rd:ty;)*) => {$(
        pub fn $name(&mut self, rd: $rd, rs1: Reg, offset: i32) {
            self.emit(encode_i($row, rd.encoding(), rs1.encoding(), offset));
        }
    )*};
}

macro_rules! load_rvc {
    ($($name:ident, $nc:ident => $row:expr, $rd:ty;)*) => {$(
        pub fn $name(&mut self, rd: $rd, rs1: Reg, offset: i32) {
            if !self.try_compress(|| compress::$name(rd, rs1, offset)) {
                self.$nc(rd, rs1, offset);
            }
        }

        pub fn $nc(&mut self, rd: $rd, rs1: Reg, offset: i32) {
            self.emit(encode_i($row, rd.encoding(), rs1.encoding(), offset));
        }
    )*};
}

/// Stores: `name(src, base, offset)`.
macro_rules! store {
    ($($name:ident => $row:expr, $rs2:ty;)*) => {$(
        pub fn $name(&mut self, rs2: $rs2, rs1: Reg, offset: i32) {
            self.emit(encode_s($row, rs2.encoding(), rs1.encoding(), offset));
        }
    )*};
}

macro_rules! store_rvc {
    ($($name:ident, $nc:ident => $row:expr, $rs2:ty;)*) => {$(
        pub fn $name(&mut self, rs2: $rs2, rs1: Reg, offset: i32) {
            if !self.try_compress(|| compress::$name(rs2, rs1, offset)) {
                self.$nc(rs2, rs1, offset);
            }
        }

        pub fn $nc(&mut self, rs2: $rs2, rs1: Reg, offset: i32) {
            self.emit(encode_s($row, rs2.encoding(), rs1.encoding(), offset));
        }
    )*};
}

macro_rules! amo {
    ($($name:ident => $row:expr;)*) => {$(
        /// `rd = *rs1; *rs1 = op(*rs1, rs2)`
        pub fn $name(&mut self, rd: Reg, rs1: Reg, rs2: Reg, order: Aqrl) {
            self.emit(encode_amo($row, rd.encoding(), rs1.encoding(), rs2.encoding(), order));
        }
    )*};
}

/// OP-FP rows. The operand classes differ per group, so each row names
/// the types of rd and of the sources, and whether it takes a rounding mode.
macro_rules! fp_binary {
    ($($name:ident => $row:expr, $rd:ty;)*) => {$(
        pub fn $name(&mut self, rd: $rd, rs1: FReg, rs2: FReg) {
            self.emit(encode_fp($row, rd.encoding(), rs1.encoding(), rs2.encoding(), RoundingMode::Dyn));
        }
    )*};
}

macro_rules! fp_binary_rm {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rm: RoundingMode) {
            self.emit(encode_fp($row, rd.encoding(), rs1.encoding(), rs2.encoding(), rm));
        }
    )*};
}

macro_rules! fp_unary_rm {
    ($($name:ident => $row:expr, $rd:ty, $rs1:ty;)*) => {$(
        pub fn $name(&mut self, rd: $rd, rs1: $rs1, rm: RoundingMode) {
            self.emit(encode_fp($row, rd.encoding(), rs1.encoding(), 0, rm));
        }
    )*};
}

macro_rules! fp_unary {
    ($($name:ident => $row:expr, $rd:ty, $rs1:ty;)*) => {$(
        pub fn $name(&mut self, rd: $rd, rs1: $rs1) {
            self.emit(encode_fp($row, rd.encoding(), rs1.encoding(), 0, RoundingMode::Dyn));
        }
    )*};
}

macro_rules! fp_fused {
    ($($name:ident => $row:expr;)*) => {$(
        pub fn $name(&mut self, rd: FReg, rs1: FReg, rs2: FReg, rs3: FReg, rm: RoundingMode) {
            self.emit(encode_r4(
                $row,
                rd.encoding(),
                rs1.encoding(),
                rs2.encoding(),
                rs3.encoding(),
                rm,
            ));
        }
    )*};
}

/// Explicit compact instructions. Operand restrictions are checked by
/// the encoders in [`rvc`].
macro_rules! compact {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {$(
        pub fn $name(&mut self, $($arg: $ty),*) {
            self.emit_c(rvc::$name($($arg),*));
        }
    )*};
}

impl<'a> Assembler<'a> {
    pub fn new(buf: &'a mut CodeBuffer, use_rvc: bool) -> Self {
        Self {
            buf,
            use_rvc,
            in_compressible_region: false,
        }
    }

    pub fn with_features(buf: &'a mut CodeBuffer, features: &Features) -> Self {
        Self::new(buf, features.use_rvc)
    }

    /// Current emission offset in the buffer.
    #[inline]
    pub fn pc(&self) -> usize {
        self.buf.offset()
    }

    pub fn buffer(&self) -> &CodeBuffer {
        self.buf
    }

    pub fn use_rvc(&self) -> bool {
        self.use_rvc
    }

    pub fn in_compressible_region(&self) -> bool {
        self.in_compressible_region
    }

    /// Whether the compression selector runs for the next instruction.
    #[inline]
    pub fn compression_active(&self) -> bool {
        self.use_rvc && self.in_compressible_region
    }

    /// Set the region flag, returning the previous value.
    pub(super) fn set_compressible_region(&mut self, on: bool) -> bool {
        std::mem::replace(&mut self.in_compressible_region, on)
    }

    /// Open a compressible region. It closes when the guard drops.
    pub fn compressible(&mut self) -> RegionGuard<'_, 'a> {
        RegionGuard::enter(self, true)
    }

    /// Open a region where every instruction keeps its canonical width,
    /// e.g. code that is patched after emission.
    pub fn incompressible(&mut self) -> RegionGuard<'_, 'a> {
        RegionGuard::enter(self, false)
    }

    /// Run `f` inside a compressible region.
    pub fn with_compressible<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut region = self.compressible();
        f(&mut region)
    }

    // -- Raw emission --

    #[inline]
    pub fn emit(&mut self, insn: u32) {
        self.buf.emit_u32(insn);
    }

    #[inline]
    pub fn emit_c(&mut self, insn: u16) {
        self.buf.emit_u16(insn);
    }

    /// Emit the compact form chosen by `select`, if compression is active
    /// and a form was chosen.
    fn try_compress(&mut self, select: impl FnOnce() -> Option<CompactForm>) -> bool {
        if !self.compression_active() {
            return false;
        }
        match select() {
            Some(form) => {
                self.emit_c(form.encode());
                true
            }
            None => false,
        }
    }

    // -- Labels --

    /// Displacement to `target` from the current pc. An unbound label
    /// records a use of `kind` here and yields the placeholder 0.
    fn resolve(&mut self, target: BranchTarget<'_>, kind: RelocKind) -> i32 {
        let pc = self.pc();
        match target {
            BranchTarget::Offset(offset) => offset,
            BranchTarget::Label(label) => match label.offset() {
                Some(bound) => displacement(pc, bound),
                None => {
                    label.add_use(pc, kind);
                    0
                }
            },
        }
    }

    /// Bind `label` to the current pc and patch every pending use.
    pub fn bind(&mut self, label: &mut Label) {
        let target = self.pc();
        let uses = label.bind(target);
        for site in &uses {
            reloc::patch_use(self.buf, *site, target);
        }
        debug!(label = label.id, target, patched = uses.len(), "bound label");
    }

    // -- Integer register-register --

    r_type_rvc! {
        add, add_nc => ADD;
        sub, sub_nc => SUB;
        xor, xor_nc => XOR;
        or, or_nc => OR;
        and, and_nc => AND;
        addw, addw_nc => ADDW;
        subw, subw_nc => SUBW;
    }

    r_type! {
        sll => SLL;
        slt => SLT;
        sltu => SLTU;
        srl => SRL;
        sra => SRA;
        sllw => SLLW;
        srlw => SRLW;
        sraw => SRAW;
        mul => MUL;
        mulh => MULH;
        mulhsu => MULHSU;
        mulhu => MULHU;
        div => DIV;
        divu => DIVU;
        rem => REM;
        remu => REMU;
        mulw => MULW;
        divw => DIVW;
        divuw => DIVUW;
        remw => REMW;
        remuw => REMUW;
        add_uw => ADD_UW;
        rol => ROL;
        rolw => ROLW;
        ror => ROR;
        rorw => RORW;
    }

    // -- Integer register-immediate --

    i_type_rvc! {
        addi, addi_nc => ADDI;
        addiw, addiw_nc => ADDIW;
        andi, andi_nc => ANDI;
    }

    i_type! {
        slti => SLTI;
        sltiu => SLTIU;
        xori => XORI;
        ori => ORI;
    }

    shift_rvc! {
        slli, slli_nc => SLLI;
        srli, srli_nc => SRLI;
        srai, srai_nc => SRAI;
    }

    shift! {
        slliw => SLLIW;
        srliw => SRLIW;
        sraiw => SRAIW;
        rori => RORI;
        roriw => RORIW;
    }

    unary! {
        sext_b => SEXT_B;
        sext_h => SEXT_H;
        zext_h => ZEXT_H;
    }

    /// `rd = imm`; `imm` must have its low 12 bits clear.
    pub fn lui(&mut self, rd: Reg, imm: i32) {
        if !self.try_compress(|| compress::lui(rd, imm)) {
            self.lui_nc(rd, imm);
        }
    }

    pub fn lui_nc(&mut self, rd: Reg, imm: i32) {
        self.emit(encode_u(LUI_U, rd.encoding(), imm));
    }

    pub fn auipc(&mut self, rd: Reg, imm: i32) {
        self.emit(encode_u(AUIPC_U, rd.encoding(), imm));
    }

    // -- Loads and stores --

    load_rvc! {
        lw, lw_nc => LW, Reg;
        ld, ld_nc => LD, Reg;
        fld, fld_nc => FLD, FReg;
    }

    load! {
        lb => LB, Reg;
        lh => LH, Reg;
        lbu => LBU, Reg;
        lhu => LHU, Reg;
        lwu => LWU, Reg;
        flw => FLW, FReg;
    }

    store_rvc! {
        sw, sw_nc => SW, Reg;
        sd, sd_nc => SD, Reg;
        fsd, fsd_nc => FSD, FReg;
    }

    store! {
        sb => SB, Reg;
        sh => SH, Reg;
        fsw => FSW, FReg;
    }

    // -- Control transfer --

    /// Emit a conditional branch. Only `beq`/`bne` against zero have a
    /// compact form, and only when `may_compress` is set.
    pub fn branch<'l>(
        &mut self,
        cond: BranchCond,
        rs1: Reg,
        rs2: Reg,
        target: impl Into<BranchTarget<'l>>,
        may_compress: bool,
    ) {
        let offset = self.resolve(target.into(), RelocKind::Branch);
        if may_compress && self.try_compress(|| cond.compact(rs1, rs2, offset)) {
            return;
        }
        self.emit(encode_b(cond.row(), rs1.encoding(), rs2.encoding(), offset));
    }

    pub fn beq<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Eq, rs1, rs2, target, true);
    }

    pub fn beq_nc<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Eq, rs1, rs2, target, false);
    }

    pub fn bne<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Ne, rs1, rs2, target, true);
    }

    pub fn bne_nc<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Ne, rs1, rs2, target, false);
    }

    pub fn blt<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Lt, rs1, rs2, target, true);
    }

    pub fn bge<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Ge, rs1, rs2, target, true);
    }

    pub fn bltu<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Ltu, rs1, rs2, target, true);
    }

    pub fn bgeu<'l>(&mut self, rs1: Reg, rs2: Reg, target: impl Into<BranchTarget<'l>>) {
        self.branch(BranchCond::Geu, rs1, rs2, target, true);
    }

    fn jump(&mut self, rd: Reg, target: BranchTarget<'_>, may_compress: bool) {
        let offset = self.resolve(target, RelocKind::Jal);
        if may_compress && self.try_compress(|| compress::jal(rd, offset)) {
            return;
        }
        self.emit(encode_j(rd.encoding(), offset));
    }

    pub fn jal<'l>(&mut self, rd: Reg, target: impl Into<BranchTarget<'l>>) {
        self.jump(rd, target.into(), true);
    }

    pub fn jal_nc<'l>(&mut self, rd: Reg, target: impl Into<BranchTarget<'l>>) {
        self.jump(rd, target.into(), false);
    }

    pub fn jalr(&mut self, rd: Reg, rs1: Reg, offset: i32) {
        if !self.try_compress(|| compress::jalr(rd, rs1, offset)) {
            self.jalr_nc(rd, rs1, offset);
        }
    }

    pub fn jalr_nc(&mut self, rd: Reg, rs1: Reg, offset: i32) {
        self.emit(encode_i(JALR_I, rd.encoding(), rs1.encoding(), offset));
    }

    // -- System --

    pub fn ecall(&mut self) {
        self.emit(ECALL);
    }

    pub fn ebreak(&mut self) {
        if !self.try_compress(compress::ebreak) {
            self.ebreak_nc();
        }
    }

    pub fn ebreak_nc(&mut self) {
        self.emit(EBREAK);
    }

    /// `fence pred, succ`; each set is a 4-bit I/O/R/W mask.
    pub fn fence(&mut self, pred: u32, succ: u32) {
        self.emit(encode_fence(pred, succ));
    }

    pub fn fence_i(&mut self) {
        self.emit(FENCE_I);
    }

    // -- CSR access --

    pub fn csrrw(&mut self, rd: Reg, csr: u32, rs1: Reg) {
        self.emit(encode_csr(CSRRW, rd.encoding(), csr, rs1.encoding()));
    }

    pub fn csrrs(&mut self, rd: Reg, csr: u32, rs1: Reg) {
        self.emit(encode_csr(CSRRS, rd.encoding(), csr, rs1.encoding()));
    }

    pub fn csrrc(&mut self, rd: Reg, csr: u32, rs1: Reg) {
        self.emit(encode_csr(CSRRC, rd.encoding(), csr, rs1.encoding()));
    }

    fn csr_imm(&mut self, row: CsrType, rd: Reg, csr: u32, uimm: u32) {
        assert!(is_csr_uimm(uimm), "csr immediate {uimm} out of range");
        self.emit(encode_csr(row, rd.encoding(), csr, uimm));
    }

    pub fn csrrwi(&mut self, rd: Reg, csr: u32, uimm: u32) {
        self.csr_imm(CSRRWI, rd, csr, uimm);
    }

    pub fn csrrsi(&mut self, rd: Reg, csr: u32, uimm: u32) {
        self.csr_imm(CSRRSI, rd, csr, uimm);
    }

    pub fn csrrci(&mut self, rd: Reg, csr: u32, uimm: u32) {
        self.csr_imm(CSRRCI, rd, csr, uimm);
    }

    pub fn csrr(&mut self, rd: Reg, csr: u32) {
        self.csrrs(rd, csr, ZR);
    }

    pub fn csrw(&mut self, csr: u32, rs: Reg) {
        self.csrrw(ZR, csr, rs);
    }

    pub fn csrwi(&mut self, csr: u32, uimm: u32) {
        self.csrrwi(ZR, csr, uimm);
    }

    // -- Atomics --

    pub fn lr_w(&mut self, rd: Reg, rs1: Reg, order: Aqrl) {
        self.emit(encode_amo(LR_W, rd.encoding(), rs1.encoding(), 0, order));
    }

    pub fn lr_d(&mut self, rd: Reg, rs1: Reg, order: Aqrl) {
        self.emit(encode_amo(LR_D, rd.encoding(), rs1.encoding(), 0, order));
    }

    /// `rd = 0` on success; stores `rs2` to `*rs1`.
    pub fn sc_w(&mut self, rd: Reg, rs1: Reg, rs2: Reg, order: Aqrl) {
        self.emit(encode_amo(SC_W, rd.encoding(), rs1.encoding(), rs2.encoding(), order));
    }

    pub fn sc_d(&mut self, rd: Reg, rs1: Reg, rs2: Reg, order: Aqrl) {
        self.emit(encode_amo(SC_D, rd.encoding(), rs1.encoding(), rs2.encoding(), order));
    }

    amo! {
        amoswap_w => AMOSWAP_W;
        amoswap_d => AMOSWAP_D;
        amoadd_w => AMOADD_W;
        amoadd_d => AMOADD_D;
        amoxor_w => AMOXOR_W;
        amoxor_d => AMOXOR_D;
        amoand_w => AMOAND_W;
        amoand_d => AMOAND_D;
        amoor_w => AMOOR_W;
        amoor_d => AMOOR_D;
        amomin_w => AMOMIN_W;
        amomin_d => AMOMIN_D;
        amomax_w => AMOMAX_W;
        amomax_d => AMOMAX_D;
        amominu_w => AMOMINU_W;
        amominu_d => AMOMINU_D;
        amomaxu_w => AMOMAXU_W;
        amomaxu_d => AMOMAXU_D;
    }

    // -- Floating point --

    fp_binary_rm! {
        fadd_s => FADD_S;
        fsub_s => FSUB_S;
        fmul_s => FMUL_S;
        fdiv_s => FDIV_S;
        fadd_d => FADD_D;
        fsub_d => FSUB_D;
        fmul_d => FMUL_D;
        fdiv_d => FDIV_D;
    }

    fp_binary! {
        fsgnj_s => FSGNJ_S, FReg;
        fsgnjn_s => FSGNJN_S, FReg;
        fsgnjx_s => FSGNJX_S, FReg;
        fsgnj_d => FSGNJ_D, FReg;
        fsgnjn_d => FSGNJN_D, FReg;
        fsgnjx_d => FSGNJX_D, FReg;
        fmin_s => FMIN_S, FReg;
        fmax_s => FMAX_S, FReg;
        fmin_d => FMIN_D, FReg;
        fmax_d => FMAX_D, FReg;
        feq_s => FEQ_S, Reg;
        flt_s => FLT_S, Reg;
        fle_s => FLE_S, Reg;
        feq_d => FEQ_D, Reg;
        flt_d => FLT_D, Reg;
        fle_d => FLE_D, Reg;
    }

    fp_unary_rm! {
        fsqrt_s => FSQRT_S, FReg, FReg;
        fsqrt_d => FSQRT_D, FReg, FReg;
        fcvt_s_d => FCVT_S_D, FReg, FReg;
        fcvt_d_s => FCVT_D_S, FReg, FReg;
        fcvt_w_s => FCVT_W_S, Reg, FReg;
        fcvt_wu_s => FCVT_WU_S, Reg, FReg;
        fcvt_l_s => FCVT_L_S, Reg, FReg;
        fcvt_lu_s => FCVT_LU_S, Reg, FReg;
        fcvt_w_d => FCVT_W_D, Reg, FReg;
        fcvt_wu_d => FCVT_WU_D, Reg, FReg;
        fcvt_l_d => FCVT_L_D, Reg, FReg;
        fcvt_lu_d => FCVT_LU_D, Reg, FReg;
        fcvt_s_w => FCVT_S_W, FReg, Reg;
        fcvt_s_wu => FCVT_S_WU, FReg, Reg;
        fcvt_s_l => FCVT_S_L, FReg, Reg;
        fcvt_s_lu => FCVT_S_LU, FReg, Reg;
        fcvt_d_w => FCVT_D_W, FReg, Reg;
        fcvt_d_wu => FCVT_D_WU, FReg, Reg;
        fcvt_d_l => FCVT_D_L, FReg, Reg;
        fcvt_d_lu => FCVT_D_LU, FReg, Reg;
    }

    fp_unary! {
        fmv_x_w => FMV_X_W, Reg, FReg;
        fmv_x_d => FMV_X_D, Reg, FReg;
        fclass_s => FCLASS_S, Reg, FReg;
        fclass_d => FCLASS_D, Reg, FReg;
        fmv_w_x => FMV_W_X, FReg, Reg;
        fmv_d_x => FMV_D_X, FReg, Reg;
    }

    fp_fused! {
        fmadd_s => FMADD_S;
        fmsub_s => FMSUB_S;
        fnmsub_s => FNMSUB_S;
        fnmadd_s => FNMADD_S;
        fmadd_d => FMADD_D;
        fmsub_d => FMSUB_D;
        fnmsub_d => FNMSUB_D;
        fnmadd_d => FNMADD_D;
    }

    // -- Compact instructions --

    compact! {
        c_nop();
        c_addi(rd: Reg, imm: i32);
        c_addiw(rd: Reg, imm: i32);
        c_li(rd: Reg, imm: i32);
        c_addi16sp(imm: i32);
        c_addi4spn(rd: Reg, uimm: u32);
        c_slli(rd: Reg, shamt: u32);
        c_srli(rd: Reg, shamt: u32);
        c_srai(rd: Reg, shamt: u32);
        c_andi(rd: Reg, imm: i32);
        c_sub(rd: Reg, rs2: Reg);
        c_xor(rd: Reg, rs2: Reg);
        c_or(rd: Reg, rs2: Reg);
        c_and(rd: Reg, rs2: Reg);
        c_subw(rd: Reg, rs2: Reg);
        c_addw(rd: Reg, rs2: Reg);
        c_mv(rd: Reg, rs2: Reg);
        c_add(rd: Reg, rs2: Reg);
        c_jr(rs1: Reg);
        c_jalr(rs1: Reg);
        c_ebreak();
        c_lui(rd: Reg, imm: i32);
        c_ld(rd: Reg, rs1: Reg, uimm: u32);
        c_sd(rs2: Reg, rs1: Reg, uimm: u32);
        c_lw(rd: Reg, rs1: Reg, uimm: u32);
        c_sw(rs2: Reg, rs1: Reg, uimm: u32);
        c_fld(rd: FReg, rs1: Reg, uimm: u32);
        c_fsd(rs2: FReg, rs1: Reg, uimm: u32);
        c_ldsp(rd: Reg, uimm: u32);
        c_sdsp(rs2: Reg, uimm: u32);
        c_lwsp(rd: Reg, uimm: u32);
        c_swsp(rs2: Reg, uimm: u32);
        c_fldsp(rd: FReg, uimm: u32);
        c_fsdsp(rs2: FReg, uimm: u32);
    }

    /// `c.beqz`. An unbound label is recorded as a compact use; binding
    /// panics if the label ends up out of compact range.
    pub fn c_beqz<'l>(&mut self, rs1: Reg, target: impl Into<BranchTarget<'l>>) {
        let offset = self.resolve(target.into(), RelocKind::CBranch);
        self.emit_c(rvc::c_beqz(rs1, offset));
    }

    pub fn c_bnez<'l>(&mut self, rs1: Reg, target: impl Into<BranchTarget<'l>>) {
        let offset = self.resolve(target.into(), RelocKind::CBranch);
        self.emit_c(rvc::c_bnez(rs1, offset));
    }

    pub fn c_j<'l>(&mut self, target: impl Into<BranchTarget<'l>>) {
        let offset = self.resolve(target.into(), RelocKind::CJump);
        self.emit_c(rvc::c_j(offset));
    }

    // -- Pseudo-instructions --

    pub fn nop(&mut self) {
        if self.compression_active() {
            self.emit_c(rvc::c_nop());
        } else {
            self.addi_nc(ZR, ZR, 0);
        }
    }

    pub fn mv(&mut self, rd: Reg, rs: Reg) {
        self.addi(rd, rs, 0);
    }

    pub fn not(&mut self, rd: Reg, rs: Reg) {
        self.xori(rd, rs, -1);
    }

    pub fn neg(&mut self, rd: Reg, rs: Reg) {
        self.sub(rd, ZR, rs);
    }

    pub fn negw(&mut self, rd: Reg, rs: Reg) {
        self.subw(rd, ZR, rs);
    }

    pub fn sext_w(&mut self, rd: Reg, rs: Reg) {
        self.addiw(rd, rs, 0);
    }

    pub fn zext_w(&mut self, rd: Reg, rs: Reg) {
        self.add_uw(rd, rs, ZR);
    }

    /// Load a 32-bit constant, sign-extended to 64 bits.
    pub fn li(&mut self, rd: Reg, imm: i32) {
        let lower = (imm << 20) >> 20;
        let upper = imm.wrapping_sub(lower);
        if upper == 0 {
            self.addi(rd, ZR, lower);
            return;
        }
        self.lui(rd, upper);
        if lower != 0 {
            self.addiw(rd, rd, lower);
        }
    }

    pub fn j<'l>(&mut self, target: impl Into<BranchTarget<'l>>) {
        self.jal(ZR, target);
    }

    pub fn jr(&mut self, rs: Reg) {
        self.jalr(ZR, rs, 0);
    }

    pub fn ret(&mut self) {
        self.jalr(ZR, RA, 0);
    }

    pub fn beqz<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.beq(rs, ZR, target);
    }

    pub fn bnez<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bne(rs, ZR, target);
    }

    pub fn blez<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bge(ZR, rs, target);
    }

    pub fn bgez<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bge(rs, ZR, target);
    }

    pub fn bltz<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.blt(rs, ZR, target);
    }

    pub fn bgtz<'l>(&mut self, rs: Reg, target: impl Into<BranchTarget<'l>>) {
        self.blt(ZR, rs, target);
    }

    pub fn bgt<'l>(&mut self, rs: Reg, rt: Reg, target: impl Into<BranchTarget<'l>>) {
        self.blt(rt, rs, target);
    }

    pub fn ble<'l>(&mut self, rs: Reg, rt: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bge(rt, rs, target);
    }

    pub fn bgtu<'l>(&mut self, rs: Reg, rt: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bltu(rt, rs, target);
    }

    pub fn bleu<'l>(&mut self, rs: Reg, rt: Reg, target: impl Into<BranchTarget<'l>>) {
        self.bgeu(rt, rs, target);
    }

    pub fn fmv_s(&mut self, rd: FReg, rs: FReg) {
        self.fsgnj_s(rd, rs, rs);
    }

    pub fn fmv_d(&mut self, rd: FReg, rs: FReg) {
        self.fsgnj_d(rd, rs, rs);
    }

    pub fn fneg_s(&mut self, rd: FReg, rs: FReg) {
        self.fsgnjn_s(rd, rs, rs);
    }

    pub fn fneg_d(&mut self, rd: FReg, rs: FReg) {
        self.fsgnjn_d(rd, rs, rs);
    }

    pub fn fabs_s(&mut self, rd: FReg, rs: FReg) {
        self.fsgnjx_s(rd, rs, rs);
    }

    pub fn fabs_d(&mut self, rd: FReg, rs: FReg) {
        self.fsgnjx_d(rd, rs, rs);
    }
}
