//! Vector extension encoders.
//!
//! Three formats: configuration (`vsetvli`, `vsetivli`, `vsetvl`),
//! arithmetic under OP-V, and loads/stores sharing the LOAD-FP and
//! STORE-FP major opcodes. Mnemonics are grouped by operand signature;
//! each row supplies funct6 and funct3 (and vs1 for unary forms).
//! Every masked instruction takes its [`VectorMask`] explicitly.

use rvjit_core::bits::{patch, patch_bit};
use rvjit_core::imm::{is_imm_in_range, is_unsigned_imm_in_range};

use super::assembler::Assembler;
use super::opcodes::{LOAD_FP, OP_V, STORE_FP};
use super::regs::{FReg, Reg, RegEncoding, VReg};

// funct3 operand categories.
pub const OPIVV: u32 = 0b000;
pub const OPFVV: u32 = 0b001;
pub const OPMVV: u32 = 0b010;
pub const OPIVI: u32 = 0b011;
pub const OPIVX: u32 = 0b100;
pub const OPFVF: u32 = 0b101;
pub const OPMVX: u32 = 0b110;
pub const OPCFG: u32 = 0b111;

// Memory addressing modes.
const MOP_UNIT: u32 = 0b00;
const MOP_INDEXED_UNORDERED: u32 = 0b01;
const MOP_STRIDED: u32 = 0b10;
const MOP_INDEXED_ORDERED: u32 = 0b11;

// Unit-stride lumop/sumop.
const UMOP_UNIT: u32 = 0b00000;
const UMOP_WHOLE: u32 = 0b01000;
const UMOP_MASK: u32 = 0b01011;
const UMOP_FAULT_FIRST: u32 = 0b10000;

/// Selected element width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Sew {
    E8 = 0,
    E16 = 1,
    E32 = 2,
    E64 = 3,
}

impl Sew {
    /// `width` field of a vector load/store with this element width.
    pub fn mem_width(self) -> u32 {
        match self {
            Sew::E8 => 0b000,
            Sew::E16 => 0b101,
            Sew::E32 => 0b110,
            Sew::E64 => 0b111,
        }
    }
}

/// Register group multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lmul {
    Mf8 = 0b101,
    Mf4 = 0b110,
    Mf2 = 0b111,
    M1 = 0b000,
    M2 = 0b001,
    M4 = 0b010,
    M8 = 0b011,
}

/// Mask policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Vma {
    Mu = 0,
    Ma = 1,
}

/// Tail policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Vta {
    Tu = 0,
    Ta = 1,
}

/// `vm` bit: 0 executes under `v0.t`, 1 is unmasked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VectorMask {
    V0t = 0,
    Unmasked = 1,
}

/// Segment field count, encoded as `fields - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Nf {
    G1 = 0,
    G2 = 1,
    G3 = 2,
    G4 = 3,
    G5 = 4,
    G6 = 5,
    G7 = 6,
    G8 = 7,
}

impl Nf {
    const ALL: [Nf; 8] = [
        Nf::G1,
        Nf::G2,
        Nf::G3,
        Nf::G4,
        Nf::G5,
        Nf::G6,
        Nf::G7,
        Nf::G8,
    ];

    /// Segment with `fields` fields (1-8).
    pub fn from_count(fields: u32) -> Self {
        assert!((1..=8).contains(&fields), "segment field count {fields} not in 1..=8");
        Self::ALL[fields as usize - 1]
    }

    pub fn fields(self) -> u32 {
        self as u32 + 1
    }
}

/// Contents of the `vtype` immediate of `vsetvli`/`vsetivli`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VType {
    pub sew: Sew,
    pub lmul: Lmul,
    pub vta: Vta,
    pub vma: Vma,
    pub vill: bool,
}

impl VType {
    pub const fn new(sew: Sew, lmul: Lmul) -> Self {
        Self {
            sew,
            lmul,
            vta: Vta::Tu,
            vma: Vma::Mu,
            vill: false,
        }
    }

    pub const fn tail(self, vta: Vta) -> Self {
        Self { vta, ..self }
    }

    pub const fn mask(self, vma: Vma) -> Self {
        Self { vma, ..self }
    }

    /// `vill` set; every other field is zero.
    pub const fn illegal() -> Self {
        Self {
            vill: true,
            ..Self::new(Sew::E8, Lmul::M1)
        }
    }

    /// Patch into `[hsb, lsb]`: lmul, sew, vta, vma from `lsb` upward,
    /// zeros up to `hsb - 1`, vill at `hsb`.
    fn patch_into(self, insn: &mut u32, hsb: u32, lsb: u32) {
        if self.vill {
            assert!(
                self == Self::illegal(),
                "the other bits in vtype shall be zero when vill is set"
            );
        }
        patch(insn, lsb + 2, lsb, self.lmul as u32);
        patch(insn, lsb + 5, lsb + 3, self.sew as u32);
        patch_bit(insn, lsb + 6, self.vta as u32);
        patch_bit(insn, lsb + 7, self.vma as u32);
        patch(insn, hsb - 1, lsb + 8, 0);
        patch_bit(insn, hsb, self.vill as u32);
    }
}

/// OP-V arithmetic word. `vs1` carries vs1, rs1 or a 5-bit immediate.
pub fn encode_varith(funct6: u32, funct3: u32, vd: u32, vs2: u32, vs1: u32, vm: VectorMask) -> u32 {
    let mut insn = 0u32;
    patch(&mut insn, 6, 0, OP_V);
    patch(&mut insn, 11, 7, vd);
    patch(&mut insn, 14, 12, funct3);
    patch(&mut insn, 19, 15, vs1);
    patch(&mut insn, 24, 20, vs2);
    patch_bit(&mut insn, 25, vm as u32);
    patch(&mut insn, 31, 26, funct6);
    insn
}

/// Vector load/store word. `rs2_or_umop` is the stride register, the
/// index register or the unit-stride sub-opcode depending on `mop`.
#[allow(clippy::too_many_arguments)]
pub fn encode_vldst(
    opcode: u32,
    width: u32,
    vd: u32,
    rs1: u32,
    rs2_or_umop: u32,
    vm: VectorMask,
    mop: u32,
    nf: Nf,
) -> u32 {
    let mut insn = 0u32;
    patch(&mut insn, 6, 0, opcode);
    patch(&mut insn, 11, 7, vd);
    patch(&mut insn, 14, 12, width);
    patch(&mut insn, 19, 15, rs1);
    patch(&mut insn, 24, 20, rs2_or_umop);
    patch_bit(&mut insn, 25, vm as u32);
    patch(&mut insn, 27, 26, mop);
    patch_bit(&mut insn, 28, 0);
    patch(&mut insn, 31, 29, nf as u32);
    insn
}

#[inline]
fn simm5(imm: i32) -> u32 {
    assert!(is_imm_in_range(imm as i64, 5, 0), "vector immediate {imm} out of range");
    imm as u32 & 0x1f
}

#[inline]
fn uimm5(imm: u32) -> u32 {
    assert!(
        is_unsigned_imm_in_range(imm as i64, 5, 0),
        "vector immediate {imm} out of range"
    );
    imm
}

fn check_segment(vd: VReg, nf: Nf) {
    assert!(
        vd.encoding() + nf.fields() <= 32,
        "segment of {} fields starting at v{} runs past v31",
        nf.fields(),
        vd.encoding()
    );
}

fn check_group(vd: VReg, nregs: u32) {
    assert!(
        vd.encoding() % nregs == 0,
        "v{} is not aligned to a group of {nregs} registers",
        vd.encoding()
    );
}

/// `name(vd, vs2, vs1, vm)`
macro_rules! vv {
    ($($name:ident => $funct6:expr, $funct3:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, vs1: VReg, vm: VectorMask) {
            self.emit(encode_varith($funct6, $funct3, vd.encoding(), vs2.encoding(), vs1.encoding(), vm));
        }
    )*};
}

/// `name(vd, vs2, rs1, vm)` with an integer or float scalar.
macro_rules! vx {
    ($($name:ident => $funct6:expr, $funct3:expr, $scalar:ty;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, rs1: $scalar, vm: VectorMask) {
            self.emit(encode_varith($funct6, $funct3, vd.encoding(), vs2.encoding(), rs1.encoding(), vm));
        }
    )*};
}

/// `name(vd, vs2, simm5, vm)`
macro_rules! vi {
    ($($name:ident => $funct6:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, imm: i32, vm: VectorMask) {
            self.emit(encode_varith($funct6, OPIVI, vd.encoding(), vs2.encoding(), simm5(imm), vm));
        }
    )*};
}

/// `name(vd, vs2, uimm5, vm)`
macro_rules! vi_unsigned {
    ($($name:ident => $funct6:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, uimm: u32, vm: VectorMask) {
            self.emit(encode_varith($funct6, OPIVI, vd.encoding(), vs2.encoding(), uimm5(uimm), vm));
        }
    )*};
}

/// Multiply-accumulate: `name(vd, vs1_or_rs1, vs2, vm)`.
macro_rules! vmac {
    ($($name:ident => $funct6:expr, $funct3:expr, $src:ty;)*) => {$(
        pub fn $name(&mut self, vd: VReg, rs1: $src, vs2: VReg, vm: VectorMask) {
            self.emit(encode_varith($funct6, $funct3, vd.encoding(), vs2.encoding(), rs1.encoding(), vm));
        }
    )*};
}

/// Single vector source with a fixed vs1 selector: `name(vd, vs2, vm)`.
macro_rules! vunary {
    ($($name:ident => $funct6:expr, $funct3:expr, $vs1:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, vm: VectorMask) {
            self.emit(encode_varith($funct6, $funct3, vd.encoding(), vs2.encoding(), $vs1, vm));
        }
    )*};
}

/// Mask-register logical: `name(vd, vs2, vs1)`, never masked.
macro_rules! vmask_logical {
    ($($name:ident => $funct6:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg, vs1: VReg) {
            self.emit(encode_varith(
                $funct6,
                OPMVV,
                vd.encoding(),
                vs2.encoding(),
                vs1.encoding(),
                VectorMask::Unmasked,
            ));
        }
    )*};
}

/// Whole-register move of `$nregs` registers.
macro_rules! vmv_whole {
    ($($name:ident => $nregs:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, vs2: VReg) {
            check_group(vd, $nregs);
            check_group(vs2, $nregs);
            self.emit(encode_varith(
                0b100111,
                OPIVI,
                vd.encoding(),
                vs2.encoding(),
                $nregs - 1,
                VectorMask::Unmasked,
            ));
        }
    )*};
}

/// Unit-stride: `name(vd, rs1, vm)`.
macro_rules! vmem_unit {
    ($($name:ident => $opcode:expr, $umop:expr, $eew:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, rs1: Reg, vm: VectorMask) {
            self.unit_stride($opcode, $umop, $eew, vd, rs1, vm, Nf::G1);
        }
    )*};
}

/// Strided: `name(vd, rs1, stride, vm)`.
macro_rules! vmem_strided {
    ($($name:ident => $opcode:expr, $eew:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, rs1: Reg, rs2: Reg, vm: VectorMask) {
            self.strided($opcode, $eew, vd, rs1, rs2, vm, Nf::G1);
        }
    )*};
}

/// Indexed: `name(vd, rs1, index, vm)`.
macro_rules! vmem_indexed {
    ($($name:ident => $opcode:expr, $mop:expr, $eew:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, rs1: Reg, vs2: VReg, vm: VectorMask) {
            self.indexed($opcode, $mop, $eew, vd, rs1, vs2, vm, Nf::G1);
        }
    )*};
}

/// Whole-register load `vl<n>re<eew>.v`.
macro_rules! vl_whole {
    ($($name:ident => $nregs:expr, $eew:expr;)*) => {$(
        pub fn $name(&mut self, vd: VReg, rs1: Reg) {
            self.whole_register(LOAD_FP, $eew, vd, rs1, $nregs);
        }
    )*};
}

impl Assembler<'_> {
    // -- Configuration --

    pub fn vsetvli(&mut self, rd: Reg, rs1: Reg, vtype: VType) {
        let mut insn = 0u32;
        patch(&mut insn, 6, 0, OP_V);
        patch(&mut insn, 11, 7, rd.encoding());
        patch(&mut insn, 14, 12, OPCFG);
        patch(&mut insn, 19, 15, rs1.encoding());
        vtype.patch_into(&mut insn, 30, 20);
        patch_bit(&mut insn, 31, 0);
        self.emit(insn);
    }

    pub fn vsetivli(&mut self, rd: Reg, avl: u32, vtype: VType) {
        let mut insn = 0u32;
        patch(&mut insn, 6, 0, OP_V);
        patch(&mut insn, 11, 7, rd.encoding());
        patch(&mut insn, 14, 12, OPCFG);
        patch(&mut insn, 19, 15, uimm5(avl));
        vtype.patch_into(&mut insn, 29, 20);
        patch(&mut insn, 31, 30, 0b11);
        self.emit(insn);
    }

    pub fn vsetvl(&mut self, rd: Reg, rs1: Reg, rs2: Reg) {
        let mut insn = 0u32;
        patch(&mut insn, 6, 0, OP_V);
        patch(&mut insn, 11, 7, rd.encoding());
        patch(&mut insn, 14, 12, OPCFG);
        patch(&mut insn, 19, 15, rs1.encoding());
        patch(&mut insn, 24, 20, rs2.encoding());
        patch(&mut insn, 31, 25, 0b1000000);
        self.emit(insn);
    }

    // -- Integer arithmetic --

    vv! {
        vadd_vv => 0b000000, OPIVV;
        vsub_vv => 0b000010, OPIVV;
        vminu_vv => 0b000100, OPIVV;
        vmin_vv => 0b000101, OPIVV;
        vmaxu_vv => 0b000110, OPIVV;
        vmax_vv => 0b000111, OPIVV;
        vand_vv => 0b001001, OPIVV;
        vor_vv => 0b001010, OPIVV;
        vxor_vv => 0b001011, OPIVV;
        vrgather_vv => 0b001100, OPIVV;
        vmseq_vv => 0b011000, OPIVV;
        vmsne_vv => 0b011001, OPIVV;
        vmsltu_vv => 0b011010, OPIVV;
        vmslt_vv => 0b011011, OPIVV;
        vmsleu_vv => 0b011100, OPIVV;
        vmsle_vv => 0b011101, OPIVV;
        vsaddu_vv => 0b100000, OPIVV;
        vsadd_vv => 0b100001, OPIVV;
        vssubu_vv => 0b100010, OPIVV;
        vssub_vv => 0b100011, OPIVV;
        vsll_vv => 0b100101, OPIVV;
        vsmul_vv => 0b100111, OPIVV;
        vsrl_vv => 0b101000, OPIVV;
        vsra_vv => 0b101001, OPIVV;
        vnsrl_wv => 0b101100, OPIVV;
        vnsra_wv => 0b101101, OPIVV;
        vmul_vv => 0b100101, OPMVV;
        vmulh_vv => 0b100111, OPMVV;
        vmulhu_vv => 0b100100, OPMVV;
        vmulhsu_vv => 0b100110, OPMVV;
        vdivu_vv => 0b100000, OPMVV;
        vdiv_vv => 0b100001, OPMVV;
        vremu_vv => 0b100010, OPMVV;
        vrem_vv => 0b100011, OPMVV;
        vwaddu_vv => 0b110000, OPMVV;
        vwadd_vv => 0b110001, OPMVV;
        vwmulu_vv => 0b111000, OPMVV;
        vwmul_vv => 0b111011, OPMVV;
        vredsum_vs => 0b000000, OPMVV;
        vredand_vs => 0b000001, OPMVV;
        vredor_vs => 0b000010, OPMVV;
        vredxor_vs => 0b000011, OPMVV;
        vredminu_vs => 0b000100, OPMVV;
        vredmin_vs => 0b000101, OPMVV;
        vredmaxu_vs => 0b000110, OPMVV;
        vredmax_vs => 0b000111, OPMVV;
    }

    vx! {
        vadd_vx => 0b000000, OPIVX, Reg;
        vsub_vx => 0b000010, OPIVX, Reg;
        vrsub_vx => 0b000011, OPIVX, Reg;
        vminu_vx => 0b000100, OPIVX, Reg;
        vmin_vx => 0b000101, OPIVX, Reg;
        vmaxu_vx => 0b000110, OPIVX, Reg;
        vmax_vx => 0b000111, OPIVX, Reg;
        vand_vx => 0b001001, OPIVX, Reg;
        vor_vx => 0b001010, OPIVX, Reg;
        vxor_vx => 0b001011, OPIVX, Reg;
        vrgather_vx => 0b001100, OPIVX, Reg;
        vslideup_vx => 0b001110, OPIVX, Reg;
        vslidedown_vx => 0b001111, OPIVX, Reg;
        vmseq_vx => 0b011000, OPIVX, Reg;
        vmsne_vx => 0b011001, OPIVX, Reg;
        vmsltu_vx => 0b011010, OPIVX, Reg;
        vmslt_vx => 0b011011, OPIVX, Reg;
        vmsleu_vx => 0b011100, OPIVX, Reg;
        vmsle_vx => 0b011101, OPIVX, Reg;
        vmsgtu_vx => 0b011110, OPIVX, Reg;
        vmsgt_vx => 0b011111, OPIVX, Reg;
        vsll_vx => 0b100101, OPIVX, Reg;
        vsrl_vx => 0b101000, OPIVX, Reg;
        vsra_vx => 0b101001, OPIVX, Reg;
        vnsrl_wx => 0b101100, OPIVX, Reg;
        vnsra_wx => 0b101101, OPIVX, Reg;
        vslide1up_vx => 0b001110, OPMVX, Reg;
        vslide1down_vx => 0b001111, OPMVX, Reg;
        vmul_vx => 0b100101, OPMVX, Reg;
        vmulh_vx => 0b100111, OPMVX, Reg;
        vmulhu_vx => 0b100100, OPMVX, Reg;
        vmulhsu_vx => 0b100110, OPMVX, Reg;
        vdivu_vx => 0b100000, OPMVX, Reg;
        vdiv_vx => 0b100001, OPMVX, Reg;
        vremu_vx => 0b100010, OPMVX, Reg;
        vrem_vx => 0b100011, OPMVX, Reg;
    }

    vi! {
        vadd_vi => 0b000000;
        vrsub_vi => 0b000011;
        vand_vi => 0b001001;
        vor_vi => 0b001010;
        vxor_vi => 0b001011;
        vmseq_vi => 0b011000;
        vmsne_vi => 0b011001;
        vmsleu_vi => 0b011100;
        vmsle_vi => 0b011101;
        vmsgtu_vi => 0b011110;
        vmsgt_vi => 0b011111;
    }

    vi_unsigned! {
        vrgather_vi => 0b001100;
        vslideup_vi => 0b001110;
        vslidedown_vi => 0b001111;
        vsll_vi => 0b100101;
        vsrl_vi => 0b101000;
        vsra_vi => 0b101001;
        vnsrl_wi => 0b101100;
        vnsra_wi => 0b101101;
    }

    vmac! {
        vmacc_vv => 0b101101, OPMVV, VReg;
        vnmsac_vv => 0b101111, OPMVV, VReg;
        vmadd_vv => 0b101001, OPMVV, VReg;
        vnmsub_vv => 0b101011, OPMVV, VReg;
        vmacc_vx => 0b101101, OPMVX, Reg;
        vnmsac_vx => 0b101111, OPMVX, Reg;
        vmadd_vx => 0b101001, OPMVX, Reg;
        vnmsub_vx => 0b101011, OPMVX, Reg;
        vfmacc_vv => 0b101100, OPFVV, VReg;
        vfnmacc_vv => 0b101101, OPFVV, VReg;
        vfmsac_vv => 0b101110, OPFVV, VReg;
        vfnmsac_vv => 0b101111, OPFVV, VReg;
        vfmadd_vv => 0b101000, OPFVV, VReg;
        vfnmadd_vv => 0b101001, OPFVV, VReg;
        vfmsub_vv => 0b101010, OPFVV, VReg;
        vfnmsub_vv => 0b101011, OPFVV, VReg;
        vfmacc_vf => 0b101100, OPFVF, FReg;
        vfnmacc_vf => 0b101101, OPFVF, FReg;
        vfmsac_vf => 0b101110, OPFVF, FReg;
        vfnmsac_vf => 0b101111, OPFVF, FReg;
        vfmadd_vf => 0b101000, OPFVF, FReg;
        vfnmadd_vf => 0b101001, OPFVF, FReg;
        vfmsub_vf => 0b101010, OPFVF, FReg;
        vfnmsub_vf => 0b101011, OPFVF, FReg;
    }

    // -- Floating point --

    vv! {
        vfadd_vv => 0b000000, OPFVV;
        vfsub_vv => 0b000010, OPFVV;
        vfmin_vv => 0b000100, OPFVV;
        vfmax_vv => 0b000110, OPFVV;
        vfsgnj_vv => 0b001000, OPFVV;
        vfsgnjn_vv => 0b001001, OPFVV;
        vfsgnjx_vv => 0b001010, OPFVV;
        vmfeq_vv => 0b011000, OPFVV;
        vmfle_vv => 0b011001, OPFVV;
        vmflt_vv => 0b011011, OPFVV;
        vmfne_vv => 0b011100, OPFVV;
        vfdiv_vv => 0b100000, OPFVV;
        vfmul_vv => 0b100100, OPFVV;
        vfredusum_vs => 0b000001, OPFVV;
        vfredosum_vs => 0b000011, OPFVV;
        vfredmin_vs => 0b000101, OPFVV;
        vfredmax_vs => 0b000111, OPFVV;
    }

    vx! {
        vfadd_vf => 0b000000, OPFVF, FReg;
        vfsub_vf => 0b000010, OPFVF, FReg;
        vfmin_vf => 0b000100, OPFVF, FReg;
        vfmax_vf => 0b000110, OPFVF, FReg;
        vfsgnj_vf => 0b001000, OPFVF, FReg;
        vfsgnjn_vf => 0b001001, OPFVF, FReg;
        vfsgnjx_vf => 0b001010, OPFVF, FReg;
        vfslide1up_vf => 0b001110, OPFVF, FReg;
        vfslide1down_vf => 0b001111, OPFVF, FReg;
        vmfeq_vf => 0b011000, OPFVF, FReg;
        vmfle_vf => 0b011001, OPFVF, FReg;
        vmflt_vf => 0b011011, OPFVF, FReg;
        vmfne_vf => 0b011100, OPFVF, FReg;
        vmfgt_vf => 0b011101, OPFVF, FReg;
        vmfge_vf => 0b011111, OPFVF, FReg;
        vfdiv_vf => 0b100000, OPFVF, FReg;
        vfrdiv_vf => 0b100001, OPFVF, FReg;
        vfmul_vf => 0b100100, OPFVF, FReg;
        vfrsub_vf => 0b100111, OPFVF, FReg;
    }

    // -- Unary --

    vunary! {
        vzext_vf8 => 0b010010, OPMVV, 0b00010;
        vsext_vf8 => 0b010010, OPMVV, 0b00011;
        vzext_vf4 => 0b010010, OPMVV, 0b00100;
        vsext_vf4 => 0b010010, OPMVV, 0b00101;
        vzext_vf2 => 0b010010, OPMVV, 0b00110;
        vsext_vf2 => 0b010010, OPMVV, 0b00111;
        vmsbf_m => 0b010100, OPMVV, 0b00001;
        vmsof_m => 0b010100, OPMVV, 0b00010;
        vmsif_m => 0b010100, OPMVV, 0b00011;
        viota_m => 0b010100, OPMVV, 0b10000;
        vfcvt_xu_f_v => 0b010010, OPFVV, 0b00000;
        vfcvt_x_f_v => 0b010010, OPFVV, 0b00001;
        vfcvt_f_xu_v => 0b010010, OPFVV, 0b00010;
        vfcvt_f_x_v => 0b010010, OPFVV, 0b00011;
        vfcvt_rtz_xu_f_v => 0b010010, OPFVV, 0b00110;
        vfcvt_rtz_x_f_v => 0b010010, OPFVV, 0b00111;
        vfwcvt_f_f_v => 0b010010, OPFVV, 0b01100;
        vfncvt_f_f_w => 0b010010, OPFVV, 0b10100;
        vfsqrt_v => 0b010011, OPFVV, 0b00000;
        vfclass_v => 0b010011, OPFVV, 0b10000;
    }

    /// Population count of the active mask bits.
    pub fn vcpop_m(&mut self, rd: Reg, vs2: VReg, vm: VectorMask) {
        self.emit(encode_varith(0b010000, OPMVV, rd.encoding(), vs2.encoding(), 0b10000, vm));
    }

    /// Index of the first set mask bit, or -1.
    pub fn vfirst_m(&mut self, rd: Reg, vs2: VReg, vm: VectorMask) {
        self.emit(encode_varith(0b010000, OPMVV, rd.encoding(), vs2.encoding(), 0b10001, vm));
    }

    pub fn vid_v(&mut self, vd: VReg, vm: VectorMask) {
        self.emit(encode_varith(0b010100, OPMVV, vd.encoding(), 0, 0b10001, vm));
    }

    // -- Masks --

    vmask_logical! {
        vmandn_mm => 0b011000;
        vmand_mm => 0b011001;
        vmor_mm => 0b011010;
        vmxor_mm => 0b011011;
        vmorn_mm => 0b011100;
        vmnand_mm => 0b011101;
        vmnor_mm => 0b011110;
        vmxnor_mm => 0b011111;
        vcompress_vm => 0b010111;
    }

    // -- Moves and merges --

    pub fn vmv_v_v(&mut self, vd: VReg, vs1: VReg) {
        self.emit(encode_varith(0b010111, OPIVV, vd.encoding(), 0, vs1.encoding(), VectorMask::Unmasked));
    }

    pub fn vmv_v_x(&mut self, vd: VReg, rs1: Reg) {
        self.emit(encode_varith(0b010111, OPIVX, vd.encoding(), 0, rs1.encoding(), VectorMask::Unmasked));
    }

    pub fn vmv_v_i(&mut self, vd: VReg, imm: i32) {
        self.emit(encode_varith(0b010111, OPIVI, vd.encoding(), 0, simm5(imm), VectorMask::Unmasked));
    }

    pub fn vfmv_v_f(&mut self, vd: VReg, rs1: FReg) {
        self.emit(encode_varith(0b010111, OPFVF, vd.encoding(), 0, rs1.encoding(), VectorMask::Unmasked));
    }

    /// `rd = vs2[0]`
    pub fn vmv_x_s(&mut self, rd: Reg, vs2: VReg) {
        self.emit(encode_varith(0b010000, OPMVV, rd.encoding(), vs2.encoding(), 0, VectorMask::Unmasked));
    }

    /// `vd[0] = rs1`
    pub fn vmv_s_x(&mut self, vd: VReg, rs1: Reg) {
        self.emit(encode_varith(0b010000, OPMVX, vd.encoding(), 0, rs1.encoding(), VectorMask::Unmasked));
    }

    pub fn vfmv_f_s(&mut self, rd: FReg, vs2: VReg) {
        self.emit(encode_varith(0b010000, OPFVV, rd.encoding(), vs2.encoding(), 0, VectorMask::Unmasked));
    }

    pub fn vfmv_s_f(&mut self, vd: VReg, rs1: FReg) {
        self.emit(encode_varith(0b010000, OPFVF, vd.encoding(), 0, rs1.encoding(), VectorMask::Unmasked));
    }

    /// `vd[i] = v0.mask[i] ? vs1[i] : vs2[i]`
    pub fn vmerge_vvm(&mut self, vd: VReg, vs2: VReg, vs1: VReg) {
        self.emit(encode_varith(0b010111, OPIVV, vd.encoding(), vs2.encoding(), vs1.encoding(), VectorMask::V0t));
    }

    pub fn vmerge_vxm(&mut self, vd: VReg, vs2: VReg, rs1: Reg) {
        self.emit(encode_varith(0b010111, OPIVX, vd.encoding(), vs2.encoding(), rs1.encoding(), VectorMask::V0t));
    }

    pub fn vmerge_vim(&mut self, vd: VReg, vs2: VReg, imm: i32) {
        self.emit(encode_varith(0b010111, OPIVI, vd.encoding(), vs2.encoding(), simm5(imm), VectorMask::V0t));
    }

    vmv_whole! {
        vmv1r_v => 1;
        vmv2r_v => 2;
        vmv4r_v => 4;
        vmv8r_v => 8;
    }

    // -- Loads and stores --

    #[allow(clippy::too_many_arguments)]
    fn unit_stride(
        &mut self,
        opcode: u32,
        umop: u32,
        eew: Sew,
        vd: VReg,
        rs1: Reg,
        vm: VectorMask,
        nf: Nf,
    ) {
        check_segment(vd, nf);
        self.emit(encode_vldst(
            opcode,
            eew.mem_width(),
            vd.encoding(),
            rs1.encoding(),
            umop,
            vm,
            MOP_UNIT,
            nf,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn strided(&mut self, opcode: u32, eew: Sew, vd: VReg, rs1: Reg, rs2: Reg, vm: VectorMask, nf: Nf) {
        check_segment(vd, nf);
        self.emit(encode_vldst(
            opcode,
            eew.mem_width(),
            vd.encoding(),
            rs1.encoding(),
            rs2.encoding(),
            vm,
            MOP_STRIDED,
            nf,
        ));
    }

    #[allow(clippy::too_many_arguments)]
    fn indexed(
        &mut self,
        opcode: u32,
        mop: u32,
        eew: Sew,
        vd: VReg,
        rs1: Reg,
        vs2: VReg,
        vm: VectorMask,
        nf: Nf,
    ) {
        check_segment(vd, nf);
        self.emit(encode_vldst(
            opcode,
            eew.mem_width(),
            vd.encoding(),
            rs1.encoding(),
            vs2.encoding(),
            vm,
            mop,
            nf,
        ));
    }

    fn whole_register(&mut self, opcode: u32, eew: Sew, vd: VReg, rs1: Reg, nregs: u32) {
        assert!(
            matches!(nregs, 1 | 2 | 4 | 8),
            "whole-register group of {nregs} registers"
        );
        check_group(vd, nregs);
        self.emit(encode_vldst(
            opcode,
            eew.mem_width(),
            vd.encoding(),
            rs1.encoding(),
            UMOP_WHOLE,
            VectorMask::Unmasked,
            MOP_UNIT,
            Nf::from_count(nregs),
        ));
    }

    vmem_unit! {
        vle8_v => LOAD_FP, UMOP_UNIT, Sew::E8;
        vle16_v => LOAD_FP, UMOP_UNIT, Sew::E16;
        vle32_v => LOAD_FP, UMOP_UNIT, Sew::E32;
        vle64_v => LOAD_FP, UMOP_UNIT, Sew::E64;
        vle8ff_v => LOAD_FP, UMOP_FAULT_FIRST, Sew::E8;
        vle16ff_v => LOAD_FP, UMOP_FAULT_FIRST, Sew::E16;
        vle32ff_v => LOAD_FP, UMOP_FAULT_FIRST, Sew::E32;
        vle64ff_v => LOAD_FP, UMOP_FAULT_FIRST, Sew::E64;
        vse8_v => STORE_FP, UMOP_UNIT, Sew::E8;
        vse16_v => STORE_FP, UMOP_UNIT, Sew::E16;
        vse32_v => STORE_FP, UMOP_UNIT, Sew::E32;
        vse64_v => STORE_FP, UMOP_UNIT, Sew::E64;
    }

    vmem_strided! {
        vlse8_v => LOAD_FP, Sew::E8;
        vlse16_v => LOAD_FP, Sew::E16;
        vlse32_v => LOAD_FP, Sew::E32;
        vlse64_v => LOAD_FP, Sew::E64;
        vsse8_v => STORE_FP, Sew::E8;
        vsse16_v => STORE_FP, Sew::E16;
        vsse32_v => STORE_FP, Sew::E32;
        vsse64_v => STORE_FP, Sew::E64;
    }

    vmem_indexed! {
        vluxei8_v => LOAD_FP, MOP_INDEXED_UNORDERED, Sew::E8;
        vluxei16_v => LOAD_FP, MOP_INDEXED_UNORDERED, Sew::E16;
        vluxei32_v => LOAD_FP, MOP_INDEXED_UNORDERED, Sew::E32;
        vluxei64_v => LOAD_FP, MOP_INDEXED_UNORDERED, Sew::E64;
        vloxei8_v => LOAD_FP, MOP_INDEXED_ORDERED, Sew::E8;
        vloxei16_v => LOAD_FP, MOP_INDEXED_ORDERED, Sew::E16;
        vloxei32_v => LOAD_FP, MOP_INDEXED_ORDERED, Sew::E32;
        vloxei64_v => LOAD_FP, MOP_INDEXED_ORDERED, Sew::E64;
        vsuxei8_v => STORE_FP, MOP_INDEXED_UNORDERED, Sew::E8;
        vsuxei16_v => STORE_FP, MOP_INDEXED_UNORDERED, Sew::E16;
        vsuxei32_v => STORE_FP, MOP_INDEXED_UNORDERED, Sew::E32;
        vsuxei64_v => STORE_FP, MOP_INDEXED_UNORDERED, Sew::E64;
        vsoxei8_v => STORE_FP, MOP_INDEXED_ORDERED, Sew::E8;
        vsoxei16_v => STORE_FP, MOP_INDEXED_ORDERED, Sew::E16;
        vsoxei32_v => STORE_FP, MOP_INDEXED_ORDERED, Sew::E32;
        vsoxei64_v => STORE_FP, MOP_INDEXED_ORDERED, Sew::E64;
    }

    vl_whole! {
        vl1re8_v => 1, Sew::E8;
        vl1re16_v => 1, Sew::E16;
        vl1re32_v => 1, Sew::E32;
        vl1re64_v => 1, Sew::E64;
        vl2re8_v => 2, Sew::E8;
        vl2re16_v => 2, Sew::E16;
        vl2re32_v => 2, Sew::E32;
        vl2re64_v => 2, Sew::E64;
        vl4re8_v => 4, Sew::E8;
        vl4re16_v => 4, Sew::E16;
        vl4re32_v => 4, Sew::E32;
        vl4re64_v => 4, Sew::E64;
        vl8re8_v => 8, Sew::E8;
        vl8re16_v => 8, Sew::E16;
        vl8re32_v => 8, Sew::E32;
        vl8re64_v => 8, Sew::E64;
    }

    /// Whole-register store of `nregs` registers (1, 2, 4 or 8).
    pub fn vsr_v(&mut self, nregs: u32, vs3: VReg, rs1: Reg) {
        self.whole_register(STORE_FP, Sew::E8, vs3, rs1, nregs);
    }

    pub fn vs1r_v(&mut self, vs3: VReg, rs1: Reg) {
        self.vsr_v(1, vs3, rs1);
    }

    pub fn vs2r_v(&mut self, vs3: VReg, rs1: Reg) {
        self.vsr_v(2, vs3, rs1);
    }

    pub fn vs4r_v(&mut self, vs3: VReg, rs1: Reg) {
        self.vsr_v(4, vs3, rs1);
    }

    pub fn vs8r_v(&mut self, vs3: VReg, rs1: Reg) {
        self.vsr_v(8, vs3, rs1);
    }

    /// Mask load, `ceil(vl / 8)` bytes.
    pub fn vlm_v(&mut self, vd: VReg, rs1: Reg) {
        self.unit_stride(LOAD_FP, UMOP_MASK, Sew::E8, vd, rs1, VectorMask::Unmasked, Nf::G1);
    }

    pub fn vsm_v(&mut self, vs3: VReg, rs1: Reg) {
        self.unit_stride(STORE_FP, UMOP_MASK, Sew::E8, vs3, rs1, VectorMask::Unmasked, Nf::G1);
    }

    // -- Segment loads and stores --

    /// `vlseg<nf>e<eew>.v`
    pub fn vlseg(&mut self, nf: Nf, eew: Sew, vd: VReg, rs1: Reg, vm: VectorMask) {
        self.unit_stride(LOAD_FP, UMOP_UNIT, eew, vd, rs1, vm, nf);
    }

    /// `vlseg<nf>e<eew>ff.v`
    pub fn vlsegff(&mut self, nf: Nf, eew: Sew, vd: VReg, rs1: Reg, vm: VectorMask) {
        self.unit_stride(LOAD_FP, UMOP_FAULT_FIRST, eew, vd, rs1, vm, nf);
    }

    /// `vsseg<nf>e<eew>.v`
    pub fn vsseg(&mut self, nf: Nf, eew: Sew, vs3: VReg, rs1: Reg, vm: VectorMask) {
        self.unit_stride(STORE_FP, UMOP_UNIT, eew, vs3, rs1, vm, nf);
    }

    /// `vlsseg<nf>e<eew>.v`
    pub fn vlsseg(&mut self, nf: Nf, eew: Sew, vd: VReg, rs1: Reg, rs2: Reg, vm: VectorMask) {
        self.strided(LOAD_FP, eew, vd, rs1, rs2, vm, nf);
    }

    /// `vssseg<nf>e<eew>.v`
    pub fn vssseg(&mut self, nf: Nf, eew: Sew, vs3: VReg, rs1: Reg, rs2: Reg, vm: VectorMask) {
        self.strided(STORE_FP, eew, vs3, rs1, rs2, vm, nf);
    }

    /// `vluxseg<nf>ei<eew>.v`
    pub fn vluxseg(&mut self, nf: Nf, eew: Sew, vd: VReg, rs1: Reg, vs2: VReg, vm: VectorMask) {
        self.indexed(LOAD_FP, MOP_INDEXED_UNORDERED, eew, vd, rs1, vs2, vm, nf);
    }

    /// `vloxseg<nf>ei<eew>.v`
    pub fn vloxseg(&mut self, nf: Nf, eew: Sew, vd: VReg, rs1: Reg, vs2: VReg, vm: VectorMask) {
        self.indexed(LOAD_FP, MOP_INDEXED_ORDERED, eew, vd, rs1, vs2, vm, nf);
    }

    /// `vsuxseg<nf>ei<eew>.v`
    pub fn vsuxseg(&mut self, nf: Nf, eew: Sew, vs3: VReg, rs1: Reg, vs2: VReg, vm: VectorMask) {
        self.indexed(STORE_FP, MOP_INDEXED_UNORDERED, eew, vs3, rs1, vs2, vm, nf);
    }

    /// `vsoxseg<nf>ei<eew>.v`
    pub fn vsoxseg(&mut self, nf: Nf, eew: Sew, vs3: VReg, rs1: Reg, vs2: VReg, vm: VectorMask) {
        self.indexed(STORE_FP, MOP_INDEXED_ORDERED, eew, vs3, rs1, vs2, vm, nf);
    }
}
