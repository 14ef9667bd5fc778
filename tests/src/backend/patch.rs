use rvjit_backend::code_buffer::CodeBuffer;
use rvjit_backend::riscv::format::{b_offset, encode_b, encode_j, j_offset};
use rvjit_backend::riscv::opcodes::{BNE, BRANCH};
use rvjit_backend::riscv::regs::*;
use rvjit_backend::riscv::reloc::read_displacement;
use rvjit_backend::riscv::rvc::{self, cb_offset, cj_offset};
use rvjit_backend::riscv::Assembler;
use rvjit_core::label::{Label, LabelUse, RelocKind};

#[test]
fn test_forward_branch_bound_later() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, true);

    asm.beq(A0, A1, &mut label);
    assert_eq!(asm.pc(), 4);
    assert_eq!(
        label.uses(),
        &[LabelUse { offset: 0, kind: RelocKind::Branch }]
    );
    asm.nop();
    asm.nop();
    asm.bind(&mut label);
    assert_eq!(label.offset(), Some(12));
    assert!(!label.has_pending_uses());

    let site = LabelUse { offset: 0, kind: RelocKind::Branch };
    assert_eq!(read_displacement(&buf, site), 12);
    let insn = buf.read_u32(0);
    assert_eq!(insn, 0x00b5_0663);
    assert_eq!(b_offset(insn), 12);
    assert_eq!(buf.offset(), 12);
}

#[test]
fn test_forward_branch_in_region_stays_canonical() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, true);
    {
        let mut c = asm.compressible();
        c.beqz(A0, &mut label);
        assert_eq!(c.pc(), 4);
        c.addi_nc(A1, A1, 1);
        c.addi_nc(A1, A1, 2);
        c.bind(&mut label);
        c.addi_nc(A2, A2, 1);
        // Backward to a bound label: the displacement is known, so the
        // compact form is chosen.
        c.beqz(A0, &mut label);
        assert_eq!(c.pc(), 18);
    }

    let insn = buf.read_u32(0);
    assert_eq!(insn & 0x7f, BRANCH);
    assert_eq!(b_offset(insn), 12);
    assert_eq!(cb_offset(buf.read_u16(16)), -4);
    assert_eq!(buf.read_u16(16), rvc::c_beqz(A0, -4));
}

#[test]
fn test_one_label_many_kinds() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(7);
    let mut asm = Assembler::new(&mut buf, true);

    asm.j(&mut label);
    asm.bnez(A0, &mut label);
    asm.c_j(&mut label);
    asm.c_bnez(A0, &mut label);
    assert_eq!(
        label.uses().iter().map(|u| (u.offset, u.kind)).collect::<Vec<_>>(),
        vec![
            (0, RelocKind::Jal),
            (4, RelocKind::Branch),
            (8, RelocKind::CJump),
            (10, RelocKind::CBranch),
        ]
    );
    asm.nop();
    asm.bind(&mut label);

    assert_eq!(j_offset(buf.read_u32(0)), 16);
    assert_eq!(b_offset(buf.read_u32(4)), 12);
    assert_eq!(cj_offset(buf.read_u16(8)), 8);
    assert_eq!(cb_offset(buf.read_u16(10)), 6);

    // Patching leaves the words bit-identical to a direct encode.
    assert_eq!(buf.read_u32(0), encode_j(ZR.encoding(), 16));
    assert_eq!(buf.read_u32(4), encode_b(BNE, A0.encoding(), ZR.encoding(), 12));
    assert_eq!(buf.read_u16(8), rvc::c_j(8));
    assert_eq!(buf.read_u16(10), rvc::c_bnez(A0, 6));
}

#[test]
fn test_backward_branch_needs_no_patch() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, false);

    asm.bind(&mut label);
    asm.addi(A0, A0, -1);
    asm.bnez(A0, &mut label);
    assert!(!label.has_pending_uses());
    assert_eq!(b_offset(buf.read_u32(4)), -4);
}

#[test]
fn test_far_jump_patch() {
    let mut buf = CodeBuffer::new(64 * 1024).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, false);

    asm.jal(RA, &mut label);
    for _ in 0..2047 {
        asm.nop();
    }
    asm.bind(&mut label);
    assert_eq!(j_offset(buf.read_u32(0)), 8192);
    assert_eq!(buf.read_u32(0) & 0xfff, 0x0ef);
}

#[test]
#[should_panic(expected = "exceeds 9 bits")]
fn test_compact_use_out_of_range() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, true);

    asm.c_beqz(A0, &mut label);
    for _ in 0..64 {
        asm.nop();
    }
    asm.bind(&mut label);
}

#[test]
#[should_panic(expected = "already bound")]
fn test_bind_twice() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut label = Label::new(0);
    let mut asm = Assembler::new(&mut buf, true);
    asm.bind(&mut label);
    asm.nop();
    asm.bind(&mut label);
}
