use rvjit_backend::code_buffer::CodeBuffer;
use rvjit_backend::riscv::regs::*;
use rvjit_backend::riscv::{Assembler, BranchCond};

/// Emit through a fresh assembler and return the raw bytes.
fn emit(use_rvc: bool, f: impl FnOnce(&mut Assembler<'_>)) -> Vec<u8> {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut asm = Assembler::new(&mut buf, use_rvc);
    f(&mut asm);
    buf.as_slice().to_vec()
}

/// Emit one instruction inside a compressible region.
fn compact(f: impl FnOnce(&mut Assembler<'_>)) -> Vec<u8> {
    emit(true, |a| a.with_compressible(f))
}

fn half(code: &[u8]) -> u16 {
    assert_eq!(code.len(), 2, "expected a compact instruction, got {code:x?}");
    u16::from_le_bytes([code[0], code[1]])
}

fn full(code: &[u8]) -> u32 {
    assert_eq!(code.len(), 4, "expected a canonical instruction, got {code:x?}");
    u32::from_le_bytes([code[0], code[1], code[2], code[3]])
}

#[test]
fn test_mv_in_region_is_compact() {
    let code = compact(|a| a.mv(S1, S1));
    assert_eq!(half(&code), 0x84a6);
}

#[test]
fn test_mv_outside_region_is_canonical() {
    let code = emit(true, |a| a.mv(S1, S1));
    assert_eq!(full(&code), 0x0004_8493);
}

#[test]
fn test_rvc_disabled_ignores_region() {
    let code = emit(false, |a| {
        let mut c = a.compressible();
        assert!(c.in_compressible_region());
        assert!(!c.compression_active());
        c.mv(S1, S1);
    });
    assert_eq!(full(&code), 0x0004_8493);
}

#[test]
fn test_region_guards_nest() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut asm = Assembler::new(&mut buf, true);
    {
        let mut c = asm.compressible();
        assert!(c.compression_active());
        c.add(A0, A0, A1);
        assert_eq!(c.pc(), 2);
        {
            let mut n = c.incompressible();
            assert!(!n.compression_active());
            n.add(A0, A0, A1);
            assert_eq!(n.pc(), 6);
        }
        assert!(c.compression_active());
        c.add(A0, A0, A1);
        assert_eq!(c.pc(), 8);
    }
    assert!(!asm.in_compressible_region());
    assert_eq!(buf.read_u16(0), 0x952e);
    assert_eq!(buf.read_u32(2), 0x00b5_0533);
    assert_eq!(buf.read_u16(6), 0x952e);
}

#[test]
fn test_with_compressible_restores_flag() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut asm = Assembler::new(&mut buf, true);
    let inside = asm.with_compressible(|a| {
        a.nop();
        a.in_compressible_region()
    });
    assert!(inside);
    assert!(!asm.in_compressible_region());
    asm.nop();
    assert_eq!(asm.pc(), 6);
    assert_eq!(buf.read_u16(0), 0x0001);
    assert_eq!(buf.read_u32(2), 0x0000_0013);
}

#[test]
fn test_with_compressible_restores_flag_on_panic() {
    let mut buf = CodeBuffer::new(4096).unwrap();
    let mut asm = Assembler::new(&mut buf, true);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        asm.with_compressible(|a| a.c_lui(SP, 1))
    }));
    assert!(result.is_err());
    assert!(!asm.in_compressible_region());
    asm.mv(S1, S1);
    assert_eq!(asm.pc(), 4);
}

#[test]
fn test_stack_frame_sequence() {
    let code = emit(true, |a| {
        let mut c = a.compressible();
        c.addi(SP, SP, -16);
        c.sd(RA, SP, 8);
        c.ld(RA, SP, 8);
        c.addi(SP, SP, 16);
        c.ret();
    });
    let halves: Vec<u16> = code
        .chunks(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    assert_eq!(halves, vec![0x1141, 0xe406, 0x60a2, 0x0141, 0x8082]);
}

#[test]
fn test_addi_selection() {
    assert_eq!(half(&compact(|a| a.addi(SP, SP, -64))), 0x7139);
    assert_eq!(half(&compact(|a| a.addi(A0, A0, 1))), 0x0505);
    assert_eq!(half(&compact(|a| a.li(A0, 5))), 0x4515);
    assert_eq!(half(&compact(|a| a.li(A0, 0))), 0x4501);
    // rd != rs1 and neither is sp: nothing fits.
    assert_eq!(full(&compact(|a| a.addi(A0, A1, 1))), 0x0015_8513);
}

#[test]
fn test_zero_branches() {
    assert_eq!(half(&compact(|a| a.beqz(A0, 8))), 0xc501);
    assert_eq!(half(&compact(|a| a.j(16))), 0xa801);
    // A zero displacement never selects a compact branch.
    assert_eq!(full(&compact(|a| a.beqz(A0, 0))), 0x0005_0063);
    // x5 has no compressed encoding.
    assert_eq!(full(&compact(|a| a.beqz(T0, 8))), 0x0002_8463);
    // Only rd = x0 has a compact jump on RV64.
    assert_eq!(full(&compact(|a| a.jal(RA, 2048))), 0x0010_00ef);
}

#[test]
fn test_branch_cond_compaction() {
    assert_eq!(half(&compact(|a| a.branch(BranchCond::Ne, A0, ZR, 8, true))), 0xe501);
    assert_eq!(full(&compact(|a| a.branch(BranchCond::Ne, A0, ZR, 8, false))), 0x0005_1463);
    // Ordered comparisons have no compact form.
    assert_eq!(full(&compact(|a| a.branch(BranchCond::Lt, A0, ZR, 8, true))), 0x0005_4463);
}

#[test]
fn test_sub_requires_destination_first() {
    assert_eq!(half(&compact(|a| a.sub(A0, A0, A5))), 0x8d1d);
    assert_eq!(full(&compact(|a| a.sub(A0, A1, A0))), 0x40a5_8533);
}

#[test]
fn test_offset_out_of_compact_range() {
    assert_eq!(full(&compact(|a| a.lw(A0, A1, 128))), 0x0805_a503);
    assert_eq!(full(&compact(|a| a.ld(A0, A1, 4))), 0x0045_b503);
}

#[test]
fn test_misc_compact() {
    assert_eq!(half(&compact(|a| a.ebreak())), 0x9002);
    assert_eq!(half(&compact(|a| a.nop())), 0x0001);
    assert_eq!(half(&compact(|a| a.ret())), 0x8082);
    assert_eq!(full(&compact(|a| a.ebreak_nc())), 0x0010_0073);
}

#[test]
fn test_explicit_compact_ignores_region() {
    let code = emit(false, |a| {
        a.c_addi(A0, 1);
        a.c_mv(S1, S1);
    });
    assert_eq!(code, vec![0x05, 0x05, 0xa6, 0x84]);
}

#[test]
#[should_panic(expected = "c.lui: rd must not be x0 or sp")]
fn test_c_lui_rejects_sp() {
    emit(true, |a| a.c_lui(SP, 0x1000));
}

#[test]
#[should_panic(expected = "c.addi16sp")]
fn test_c_addi16sp_rejects_unaligned() {
    emit(true, |a| a.c_addi16sp(8));
}
