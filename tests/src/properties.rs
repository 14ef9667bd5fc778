//! Property-based tests for the field codec, offset patching and the
//! compression selector.

use proptest::prelude::*;
use rvjit_backend::code_buffer::CodeBuffer;
use rvjit_backend::riscv::compress;
use rvjit_backend::riscv::format::{b_offset, encode_b, encode_j, j_offset};
use rvjit_backend::riscv::opcodes::BEQ;
use rvjit_backend::riscv::regs::{Reg, RegEncoding, SP, ZR};
use rvjit_backend::riscv::rvc::{self, cb_offset, cj_offset};
use rvjit_backend::riscv::{Assembler, CompactForm};
use rvjit_core::bits::{extract, patch, right_n_bits, sextract};
use rvjit_core::label::Label;

// ── Strategies ──────────────────────────────────────────────────────────

/// `(msb, lsb)` with `lsb <= msb < 32`.
fn bit_range() -> impl Strategy<Value = (u32, u32)> {
    (0u32..32).prop_flat_map(|lsb| (lsb..32).prop_map(move |msb| (msb, lsb)))
}

fn reg() -> impl Strategy<Value = Reg> {
    (0u8..32).prop_map(Reg::from_u8)
}

/// Registers biased towards the compressed subset `x8..=x15`.
fn data_reg() -> impl Strategy<Value = Reg> {
    prop_oneof![(8u8..16).prop_map(Reg::from_u8), reg()]
}

/// Base registers biased towards `sp` and the compressed subset.
fn base_reg() -> impl Strategy<Value = Reg> {
    prop_oneof![Just(SP), data_reg()]
}

/// Word-aligned memory offsets, a few of them negative.
fn mem_offset() -> impl Strategy<Value = i32> {
    (-4i32..160).prop_map(|v| v * 4)
}

/// Even offset in `[-(1 << (bits - 1)), (1 << (bits - 1)) - 2]`.
fn even_offset(bits: u32) -> impl Strategy<Value = i32> {
    let half = 1i32 << (bits - 2);
    (-half..half).prop_map(|v| v * 2)
}

// ── Compact decoding for the addi family ────────────────────────────────

/// `(rd, rs1, imm)` of the canonical `addi` a compact word stands for.
fn decode_addi_family(insn: u16) -> (u32, u32, i32) {
    let op = extract(insn, 1, 0);
    let funct3 = extract(insn, 15, 13);
    let rd = extract(insn, 11, 7);
    let ci_imm = || {
        let raw = extract(insn, 12, 12) << 5 | extract(insn, 6, 2);
        ((raw << 26) as i32) >> 26
    };
    match (op, funct3) {
        (0b01, 0b000) => (rd, rd, ci_imm()),
        (0b01, 0b010) => (rd, 0, ci_imm()),
        (0b01, 0b011) => {
            let raw = extract(insn, 12, 12) << 9
                | extract(insn, 4, 3) << 7
                | extract(insn, 5, 5) << 6
                | extract(insn, 2, 2) << 5
                | extract(insn, 6, 6) << 4;
            (2, 2, ((raw << 22) as i32) >> 22)
        }
        (0b00, 0b000) => {
            let uimm = extract(insn, 10, 7) << 6
                | extract(insn, 12, 11) << 4
                | extract(insn, 5, 5) << 3
                | extract(insn, 6, 6) << 2;
            (extract(insn, 4, 2) + 8, 2, uimm as i32)
        }
        (0b10, 0b100) => (rd, extract(insn, 6, 2), 0),
        _ => panic!("{insn:#06x} is not in the addi family"),
    }
}

// ── Compact decoding for loads and stores ───────────────────────────────

/// `(store, width, data, base, offset)` of the canonical load or store a
/// compact word stands for.
fn decode_mem(insn: u16) -> (bool, u32, u32, u32, u32) {
    let op = extract(insn, 1, 0);
    let funct3 = extract(insn, 15, 13);
    let creg = |hi: u32, lo: u32| extract(insn, hi, lo) + 8;
    match (op, funct3) {
        (0b00, 0b010) | (0b00, 0b110) => {
            let off = extract(insn, 12, 10) << 3 | extract(insn, 6, 6) << 2 | extract(insn, 5, 5) << 6;
            (funct3 == 0b110, 4, creg(4, 2), creg(9, 7), off)
        }
        (0b00, 0b011) | (0b00, 0b111) => {
            let off = extract(insn, 12, 10) << 3 | extract(insn, 6, 5) << 6;
            (funct3 == 0b111, 8, creg(4, 2), creg(9, 7), off)
        }
        (0b10, 0b010) => {
            let off = extract(insn, 12, 12) << 5 | extract(insn, 6, 4) << 2 | extract(insn, 3, 2) << 6;
            (false, 4, extract(insn, 11, 7), 2, off)
        }
        (0b10, 0b011) => {
            let off = extract(insn, 12, 12) << 5 | extract(insn, 6, 5) << 3 | extract(insn, 4, 2) << 6;
            (false, 8, extract(insn, 11, 7), 2, off)
        }
        (0b10, 0b110) => {
            let off = extract(insn, 12, 9) << 2 | extract(insn, 8, 7) << 6;
            (true, 4, extract(insn, 6, 2), 2, off)
        }
        (0b10, 0b111) => {
            let off = extract(insn, 12, 10) << 3 | extract(insn, 9, 7) << 6;
            (true, 8, extract(insn, 6, 2), 2, off)
        }
        _ => panic!("{insn:#06x} is not a compact load or store"),
    }
}

type ArithSelector = fn(Reg, Reg, Reg) -> Option<CompactForm>;
type BranchSelector = fn(Reg, Reg, i32) -> Option<CompactForm>;

/// CA-format selectors with their `insn[12]` and `funct2` bits.
const CA_FORMS: [(ArithSelector, u32, u32); 6] = [
    (compress::sub, 0, 0b00),
    (compress::xor, 0, 0b01),
    (compress::or, 0, 0b10),
    (compress::and, 0, 0b11),
    (compress::subw, 1, 0b00),
    (compress::addw, 1, 0b01),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn patch_then_extract((msb, lsb) in bit_range(), word in any::<u32>(), val in any::<u32>()) {
        let val = val & right_n_bits(msb - lsb + 1);
        let mut patched = word;
        patch(&mut patched, msb, lsb, val);
        prop_assert_eq!(extract(patched, msb, lsb), val);

        let outside = !(right_n_bits(msb - lsb + 1) << lsb);
        prop_assert_eq!(patched & outside, word & outside);
    }

    #[test]
    fn sextract_matches_sign_extension((msb, lsb) in bit_range(), word in any::<u32>()) {
        let width = msb - lsb + 1;
        let raw = extract(word, msb, lsb);
        let expected = if width == 32 {
            raw as i32
        } else {
            ((raw << (32 - width)) as i32) >> (32 - width)
        };
        prop_assert_eq!(sextract(word, msb, lsb), expected);
    }

    #[test]
    fn branch_offsets_decode(rs1 in 0u32..32, rs2 in 0u32..32, off in even_offset(13)) {
        let insn = encode_b(BEQ, rs1, rs2, off);
        prop_assert_eq!(b_offset(insn), off);
        prop_assert_eq!(extract(insn, 19, 15), rs1);
        prop_assert_eq!(extract(insn, 24, 20), rs2);
    }

    #[test]
    fn jump_offsets_decode(rd in 0u32..32, off in even_offset(21)) {
        let insn = encode_j(rd, off);
        prop_assert_eq!(j_offset(insn), off);
        prop_assert_eq!(extract(insn, 11, 7), rd);
    }

    #[test]
    fn compact_offsets_decode(cb in even_offset(9), cj in even_offset(12)) {
        prop_assert_eq!(cb_offset(rvc::c_bnez(Reg::X8, cb)), cb);
        prop_assert_eq!(cj_offset(rvc::c_j(cj)), cj);
    }

    #[test]
    fn bound_label_matches_direct_encode(rs1 in reg(), rs2 in reg(), halves in 2usize..2000) {
        let mut buf = CodeBuffer::new(8192).unwrap();
        let mut label = Label::new(0);
        let mut asm = Assembler::new(&mut buf, true);
        asm.beq(rs1, rs2, &mut label);
        for _ in 2..halves {
            asm.c_nop();
        }
        asm.bind(&mut label);

        let disp = (halves * 2) as i32;
        prop_assert_eq!(buf.read_u32(0), encode_b(BEQ, rs1.encoding(), rs2.encoding(), disp));
    }

    #[test]
    fn compressed_addi_keeps_operands(rd in reg(), rs1 in reg(), imm in -1024i32..1024) {
        if let Some(form) = compress::addi(rd, rs1, imm) {
            let decoded = decode_addi_family(form.encode());
            prop_assert_eq!(decoded, (rd.encoding(), rs1.encoding(), imm));
        }
    }

    #[test]
    fn compressed_add_keeps_operands(rd in reg(), rs1 in reg(), rs2 in reg()) {
        if let Some(form) = compress::add(rd, rs1, rs2) {
            let insn = form.encode();
            prop_assert_eq!(extract(insn, 15, 12), 0b1001);
            prop_assert_eq!(extract(insn, 11, 7), rd.encoding());
            let other = extract(insn, 6, 2);
            let mut sources = [rs1.encoding(), rs2.encoding()];
            let mut compact = [rd.encoding(), other];
            sources.sort_unstable();
            compact.sort_unstable();
            prop_assert_eq!(sources, compact);
        }
    }

    #[test]
    fn region_width_follows_selector(rd in reg(), rs1 in reg(), imm in -64i32..64) {
        let mut buf = CodeBuffer::new(4096).unwrap();
        let mut asm = Assembler::new(&mut buf, true);
        asm.with_compressible(|a| a.addi(rd, rs1, imm));
        let expected = if compress::addi(rd, rs1, imm).is_some() { 2 } else { 4 };
        prop_assert_eq!(buf.offset(), expected);
    }

    #[test]
    fn compressed_loads_keep_operands(rd in data_reg(), rs1 in base_reg(), off in mem_offset()) {
        if let Some(form) = compress::ld(rd, rs1, off) {
            prop_assert_eq!(decode_mem(form.encode()), (false, 8, rd.encoding(), rs1.encoding(), off as u32));
        }
        if let Some(form) = compress::lw(rd, rs1, off) {
            prop_assert_eq!(decode_mem(form.encode()), (false, 4, rd.encoding(), rs1.encoding(), off as u32));
        }
    }

    #[test]
    fn compressed_stores_keep_operands(rs2 in data_reg(), rs1 in base_reg(), off in mem_offset()) {
        if let Some(form) = compress::sd(rs2, rs1, off) {
            prop_assert_eq!(decode_mem(form.encode()), (true, 8, rs2.encoding(), rs1.encoding(), off as u32));
        }
        if let Some(form) = compress::sw(rs2, rs1, off) {
            prop_assert_eq!(decode_mem(form.encode()), (true, 4, rs2.encoding(), rs1.encoding(), off as u32));
        }
    }

    #[test]
    fn compressed_branches_keep_operands(rs1 in data_reg(), off in even_offset(10)) {
        for (select, funct3) in [
            (compress::beq as BranchSelector, 0b110u32),
            (compress::bne as BranchSelector, 0b111),
        ] {
            if let Some(form) = select(rs1, ZR, off) {
                let insn = form.encode();
                prop_assert_eq!(extract(insn, 15, 13), funct3);
                prop_assert_eq!(extract(insn, 1, 0), 0b01);
                prop_assert_eq!(extract(insn, 9, 7) + 8, rs1.encoding());
                prop_assert_eq!(cb_offset(insn), off);
            }
        }
    }

    #[test]
    fn compressed_jump_keeps_offset(off in even_offset(13)) {
        if let Some(form) = compress::jal(ZR, off) {
            let insn = form.encode();
            prop_assert_eq!(extract(insn, 15, 13), 0b101);
            prop_assert_eq!(extract(insn, 1, 0), 0b01);
            prop_assert_eq!(cj_offset(insn), off);
        }
    }

    #[test]
    fn compressed_arith_keeps_operands(
        rd in data_reg(),
        rs1 in data_reg(),
        rs2 in data_reg(),
        which in 0usize..CA_FORMS.len(),
    ) {
        let (select, bit12, funct2) = CA_FORMS[which];
        if let Some(form) = select(rd, rs1, rs2) {
            let insn = form.encode();
            prop_assert_eq!(extract(insn, 15, 10), 0b100011 | bit12 << 2);
            prop_assert_eq!(extract(insn, 6, 5), funct2);
            prop_assert_eq!(extract(insn, 1, 0), 0b01);
            prop_assert_eq!(extract(insn, 9, 7) + 8, rd.encoding());
            let other = extract(insn, 4, 2) + 8;
            if funct2 == 0b00 {
                // sub and subw keep their operand order.
                prop_assert_eq!((rs1.encoding(), rs2.encoding()), (rd.encoding(), other));
            } else {
                let mut sources = [rs1.encoding(), rs2.encoding()];
                let mut compact = [rd.encoding(), other];
                sources.sort_unstable();
                compact.sort_unstable();
                prop_assert_eq!(sources, compact);
            }
        }
    }
}
