use rvjit_core::bits::*;

#[test]
fn extract_i_type_fields() {
    // addi a0, a0, 1
    let insn: u32 = 0x0015_0513;
    assert_eq!(extract(insn, 6, 0), 0x13);
    assert_eq!(extract(insn, 11, 7), 10);
    assert_eq!(extract(insn, 14, 12), 0);
    assert_eq!(extract(insn, 19, 15), 10);
    assert_eq!(sextract(insn, 31, 20), 1);
}

#[test]
fn sextract_negative_immediate() {
    // addi sp, sp, -16
    let insn: u32 = 0xff01_0113;
    assert_eq!(sextract(insn, 31, 20), -16);
    assert_eq!(extract(insn, 31, 20), 0xff0);
}

#[test]
fn extract_single_bits() {
    let insn: u32 = 0x8000_0001;
    assert_eq!(extract_bit(insn, 31), 1);
    assert_eq!(extract_bit(insn, 30), 0);
    assert_eq!(extract_bit(insn, 0), 1);
}

#[test]
fn patch_compact_word() {
    let mut w: u16 = 0;
    patch(&mut w, 15, 13, 0b100);
    patch(&mut w, 1, 0, 0b10);
    assert_eq!(w, 0x8002);
    patch(&mut w, 11, 7, 9);
    patch(&mut w, 6, 2, 9);
    patch_bit(&mut w, 12, 0);
    // c.mv s1, s1
    assert_eq!(w, 0x84a6);
}

#[test]
fn patch_overwrites_field() {
    let mut w: u32 = 0x0000_0f80;
    patch(&mut w, 11, 7, 3);
    assert_eq!(w, 0x0000_0180);
}

#[test]
fn patch_full_word() {
    let mut w: u32 = 0;
    patch(&mut w, 31, 0, 0xdead_beef);
    assert_eq!(w, 0xdead_beef);
}

#[test]
#[should_panic(expected = "field too big for insn")]
fn patch_rejects_wide_value() {
    let mut w: u32 = 0;
    patch(&mut w, 4, 0, 32);
}

#[test]
#[should_panic(expected = "outside 16-bit")]
fn patch_rejects_bit_past_compact_word() {
    let mut w: u16 = 0;
    patch(&mut w, 16, 12, 1);
}

#[test]
#[should_panic(expected = "msb")]
fn extract_rejects_inverted_range() {
    let _ = extract(0u32, 3, 7);
}

#[test]
fn sign_extend_edges() {
    assert_eq!(sign_extend(0x800, 12), -2048);
    assert_eq!(sign_extend(0x7ff, 12), 2047);
    assert_eq!(sign_extend(0x1f, 5), -1);
    assert_eq!(sign_extend(0xffff_ffff, 32), -1);
}

#[test]
fn masks() {
    assert_eq!(right_n_bits(0), 0);
    assert_eq!(right_n_bits(5), 0x1f);
    assert_eq!(right_n_bits(32), u32::MAX);
    assert_eq!(nth_bit(31), 0x8000_0000);
}
