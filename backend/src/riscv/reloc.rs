//! Label use resolution.
//!
//! A use is resolved by rewriting only the displacement field of the
//! instruction already in the buffer, with the same field patchers the
//! encoders use, so a patched word is bit-identical to a direct encode.

use rvjit_core::label::{LabelUse, RelocKind};

use super::format::{b_offset, j_offset, patch_b_offset, patch_j_offset};
use super::rvc::{cb_offset, cj_offset, patch_cb_offset, patch_cj_offset};
use crate::CodeBuffer;

/// Rewrite the displacement of `site` so it reaches `target`.
///
/// Panics if the displacement does not fit the field width recorded for
/// the use.
pub fn patch_use(buf: &mut CodeBuffer, site: LabelUse, target: usize) {
    let disp = target as i64 - site.offset as i64;
    assert!(
        site.kind.fits(disp),
        "{:?} at {:#x}: displacement {disp} exceeds {} bits",
        site.kind,
        site.offset,
        site.kind.offset_bits()
    );
    let disp = disp as i32;
    match site.kind {
        RelocKind::Branch => {
            let mut insn = buf.read_u32(site.offset);
            patch_b_offset(&mut insn, disp);
            buf.patch_u32(site.offset, insn);
        }
        RelocKind::Jal => {
            let mut insn = buf.read_u32(site.offset);
            patch_j_offset(&mut insn, disp);
            buf.patch_u32(site.offset, insn);
        }
        RelocKind::CBranch => {
            let mut insn = buf.read_u16(site.offset);
            patch_cb_offset(&mut insn, disp);
            buf.patch_u16(site.offset, insn);
        }
        RelocKind::CJump => {
            let mut insn = buf.read_u16(site.offset);
            patch_cj_offset(&mut insn, disp);
            buf.patch_u16(site.offset, insn);
        }
    }
}

/// Displacement currently encoded at `site`.
pub fn read_displacement(buf: &CodeBuffer, site: LabelUse) -> i32 {
    match site.kind {
        RelocKind::Branch => b_offset(buf.read_u32(site.offset)),
        RelocKind::Jal => j_offset(buf.read_u32(site.offset)),
        RelocKind::CBranch => cb_offset(buf.read_u16(site.offset)),
        RelocKind::CJump => cj_offset(buf.read_u16(site.offset)),
    }
}
