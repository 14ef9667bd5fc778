use rvjit_backend::code_buffer::CodeBuffer;
use rvjit_backend::riscv::regs::*;
use rvjit_backend::riscv::{Assembler, Lmul, Nf, Sew, VReg, VType, VectorMask, Vma, Vta};

use VectorMask::{Unmasked, V0t};

fn word(f: impl FnOnce(&mut Assembler<'_>)) -> u32 {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut asm = Assembler::new(&mut buf, true);
    f(&mut asm);
    assert_eq!(buf.offset(), 4);
    buf.read_u32(0)
}

#[test]
fn test_configuration() {
    let e32 = VType::new(Sew::E32, Lmul::M1).tail(Vta::Ta).mask(Vma::Ma);
    assert_eq!(word(|a| a.vsetvli(T0, A0, e32)), 0x0d05_72d7);
    let e8 = VType::new(Sew::E8, Lmul::M1);
    assert_eq!(word(|a| a.vsetivli(ZR, 4, e8)), 0xc002_7057);
    assert_eq!(word(|a| a.vsetvl(T0, A0, A1)), 0x80b5_72d7);
}

#[test]
fn test_vill_alone() {
    assert_eq!(word(|a| a.vsetvli(ZR, ZR, VType::illegal())), 0x4000_7057);
}

#[test]
#[should_panic(expected = "the other bits in vtype shall be zero when vill is set")]
fn test_vill_with_other_fields() {
    let vtype = VType {
        vill: true,
        ..VType::new(Sew::E32, Lmul::M1)
    };
    word(|a| a.vsetvli(ZR, A0, vtype));
}

#[test]
#[should_panic(expected = "vector immediate 32 out of range")]
fn test_vsetivli_avl_range() {
    word(|a| a.vsetivli(ZR, 32, VType::new(Sew::E8, Lmul::M1)));
}

#[test]
fn test_integer_arithmetic() {
    let (v1, v2, v3) = (VReg::V1, VReg::V2, VReg::V3);
    assert_eq!(word(|a| a.vadd_vv(v1, v2, v3, Unmasked)), 0x0221_80d7);
    assert_eq!(word(|a| a.vadd_vv(v1, v2, v3, V0t)), 0x0021_80d7);
    assert_eq!(word(|a| a.vadd_vx(v1, v2, A0, Unmasked)), 0x0225_40d7);
    assert_eq!(word(|a| a.vadd_vi(v1, v2, -1, Unmasked)), 0x022f_b0d7);
    assert_eq!(word(|a| a.vrsub_vx(v1, v2, A0, Unmasked)), 0x0e25_40d7);
    // vmacc.vv vd, vs1, vs2
    assert_eq!(word(|a| a.vmacc_vv(v1, v2, v3, Unmasked)), 0xb631_20d7);
}

#[test]
#[should_panic(expected = "vector immediate 16 out of range")]
fn test_simm5_range() {
    word(|a| a.vadd_vi(VReg::V1, VReg::V2, 16, Unmasked));
}

#[test]
fn test_moves_and_masks() {
    assert_eq!(word(|a| a.vmv_x_s(A0, VReg::V1)), 0x4210_2557);
    assert_eq!(word(|a| a.vid_v(VReg::V1, Unmasked)), 0x5208_a0d7);
    assert_eq!(word(|a| a.vcpop_m(A0, VReg::V1, Unmasked)), 0x4218_2557);
    assert_eq!(word(|a| a.vmv1r_v(VReg::V1, VReg::V2)), 0x9e20_30d7);
    assert_eq!(word(|a| a.vmv2r_v(VReg::V2, VReg::V4)), 0x9e40_b157);
}

#[test]
#[should_panic(expected = "not aligned")]
fn test_whole_move_alignment() {
    word(|a| a.vmv2r_v(VReg::V1, VReg::V2));
}

#[test]
fn test_unit_stride_memory() {
    let v8 = VReg::V8;
    assert_eq!(word(|a| a.vle32_v(v8, A0, Unmasked)), 0x0205_6407);
    assert_eq!(word(|a| a.vle32_v(v8, A0, V0t)), 0x0005_6407);
    assert_eq!(word(|a| a.vse32_v(v8, A0, Unmasked)), 0x0205_6427);
    assert_eq!(word(|a| a.vle32ff_v(v8, A0, Unmasked)), 0x0305_6407);
    assert_eq!(word(|a| a.vlm_v(VReg::V1, A0)), 0x02b5_0087);
}

#[test]
fn test_strided_and_indexed_memory() {
    let v8 = VReg::V8;
    assert_eq!(word(|a| a.vlse32_v(v8, A0, A1, Unmasked)), 0x0ab5_6407);
    assert_eq!(word(|a| a.vluxei32_v(v8, A0, VReg::V4, Unmasked)), 0x0645_6407);
}

#[test]
fn test_whole_register_memory() {
    assert_eq!(word(|a| a.vl1re8_v(VReg::V1, A0)), 0x0285_0087);
    assert_eq!(word(|a| a.vl2re32_v(VReg::V2, A0)), 0x2285_6107);
    assert_eq!(word(|a| a.vs1r_v(VReg::V1, A0)), 0x0285_00a7);
}

#[test]
fn test_segments() {
    assert_eq!(
        word(|a| a.vlseg(Nf::G2, Sew::E32, VReg::V8, A0, Unmasked)),
        0x2205_6407
    );
    // v24..v31 is the last group of eight that fits.
    let w = word(|a| a.vsseg(Nf::G8, Sew::E8, VReg::V24, A0, Unmasked));
    assert_eq!(w >> 29, 7);
}

#[test]
#[should_panic(expected = "runs past v31")]
fn test_segment_past_last_register() {
    word(|a| a.vlseg(Nf::G8, Sew::E8, VReg::V28, A0, Unmasked));
}

#[test]
fn test_element_helpers() {
    assert_eq!(Nf::from_count(3), Nf::G3);
    assert_eq!(Nf::G8.fields(), 8);
}

#[test]
#[should_panic(expected = "segment field count 9")]
fn test_nf_range() {
    Nf::from_count(9);
}
