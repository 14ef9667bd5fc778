//! Immediate operand predicates.
//!
//! Range checks follow the convention `(value, bits, align_bits)`: the
//! value must be a multiple of `1 << align_bits` and, once the alignment
//! bits are dropped, fit in `bits` bits. A conditional branch offset
//! (13 bits, always even) is therefore checked with `(offset, 12, 1)`.

/// Whether `value` fits a signed field of `bits + align_bits` bits with
/// the low `align_bits` bits clear.
#[inline]
pub const fn is_imm_in_range(value: i64, bits: u32, align_bits: u32) -> bool {
    let total = bits + align_bits;
    if total >= 64 {
        return value & ((1i64 << align_bits) - 1) == 0;
    }
    let high = value >> (total - 1);
    let aligned = align_bits == 0 || value & ((1i64 << align_bits) - 1) == 0;
    (high == 0 || high == -1) && aligned
}

/// Unsigned variant of [`is_imm_in_range`]. Negative values never fit.
#[inline]
pub const fn is_unsigned_imm_in_range(value: i64, bits: u32, align_bits: u32) -> bool {
    if value < 0 {
        return false;
    }
    let total = bits + align_bits;
    let aligned = align_bits == 0 || value & ((1i64 << align_bits) - 1) == 0;
    (total >= 63 || value >> total == 0) && aligned
}

/// Immediate with its encoding constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Imm {
    pub value: i64,
    /// Field width in bits, alignment bits included.
    pub width: u32,
    pub signed: bool,
    /// Required alignment in bytes (1 = none). Must be a power of two.
    pub align: u32,
}

impl Imm {
    pub const fn signed(value: i64, width: u32) -> Self {
        Self {
            value,
            width,
            signed: true,
            align: 1,
        }
    }

    pub const fn unsigned(value: i64, width: u32) -> Self {
        Self {
            value,
            width,
            signed: false,
            align: 1,
        }
    }

    pub const fn aligned(self, align: u32) -> Self {
        Self { align, ..self }
    }

    pub const fn fits(&self) -> bool {
        fits(self.value, self.width, self.signed, self.align)
    }
}

/// `fits(value, width, signed, alignment)`: whether `value` is encodable
/// in a `width`-bit field and is a multiple of `align` bytes.
pub const fn fits(value: i64, width: u32, signed: bool, align: u32) -> bool {
    assert!(align.is_power_of_two(), "alignment must be a power of two");
    let align_bits = align.trailing_zeros();
    if width < align_bits || width == 0 {
        return false;
    }
    if signed {
        is_imm_in_range(value, width - align_bits, align_bits)
    } else {
        is_unsigned_imm_in_range(value, width - align_bits, align_bits)
    }
}
