//! Bit-field access on instruction words.
//!
//! Every encoder builds its instruction by patching inclusive bit ranges
//! into a zeroed word. `patch` is a read-modify-write: it clears the
//! target range and ORs in the shifted value, so bits outside
//! `[lsb, msb]` are never touched.

/// A fixed-width instruction word: 16-bit compact or 32-bit canonical.
pub trait InsnWord: Copy + Eq + std::fmt::Debug {
    /// Width of the word in bits.
    const BITS: u32;

    fn to_u32(self) -> u32;
    fn from_u32(val: u32) -> Self;
}

impl InsnWord for u16 {
    const BITS: u32 = 16;

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_u32(val: u32) -> Self {
        val as u16
    }
}

impl InsnWord for u32 {
    const BITS: u32 = 32;

    #[inline]
    fn to_u32(self) -> u32 {
        self
    }

    #[inline]
    fn from_u32(val: u32) -> Self {
        val
    }
}

/// Mask of the low `nbits` bits.
#[inline]
pub const fn right_n_bits(nbits: u32) -> u32 {
    if nbits >= 32 {
        u32::MAX
    } else {
        (1u32 << nbits) - 1
    }
}

/// Single bit `n` set.
#[inline]
pub const fn nth_bit(n: u32) -> u32 {
    1u32 << n
}

#[inline]
fn check_range<W: InsnWord>(msb: u32, lsb: u32) {
    assert!(msb >= lsb, "bit range msb {msb} < lsb {lsb}");
    assert!(
        msb < W::BITS,
        "bit {msb} outside {}-bit instruction word",
        W::BITS
    );
}

/// Read the unsigned field `[lsb, msb]` of `word`.
#[inline]
pub fn extract<W: InsnWord>(word: W, msb: u32, lsb: u32) -> u32 {
    check_range::<W>(msb, lsb);
    (word.to_u32() >> lsb) & right_n_bits(msb - lsb + 1)
}

/// Read the field `[lsb, msb]` of `word` as a sign-extended value.
#[inline]
pub fn sextract<W: InsnWord>(word: W, msb: u32, lsb: u32) -> i32 {
    check_range::<W>(msb, lsb);
    let shl = 31 - msb;
    ((word.to_u32() << shl) as i32) >> (shl + lsb)
}

/// Read a single bit.
#[inline]
pub fn extract_bit<W: InsnWord>(word: W, bit: u32) -> u32 {
    extract(word, bit, bit)
}

/// Write `val` into the field `[lsb, msb]` of `word`.
///
/// Panics if the range is inverted, exceeds the word, or `val` does not
/// fit in `msb - lsb + 1` bits.
#[inline]
pub fn patch<W: InsnWord>(word: &mut W, msb: u32, lsb: u32, val: u32) {
    check_range::<W>(msb, lsb);
    let nbits = msb - lsb + 1;
    let mask = right_n_bits(nbits);
    assert!(
        val <= mask,
        "field too big for insn: {val:#x} does not fit in bits [{msb}:{lsb}]"
    );
    let target = (word.to_u32() & !(mask << lsb)) | (val << lsb);
    *word = W::from_u32(target);
}

/// Write a single bit.
#[inline]
pub fn patch_bit<W: InsnWord>(word: &mut W, bit: u32, val: u32) {
    patch(word, bit, bit, val);
}

/// Sign-extend the low `bits` bits of `val`.
#[inline]
pub const fn sign_extend(val: u32, bits: u32) -> i32 {
    let shl = 32 - bits;
    ((val << shl) as i32) >> shl
}
