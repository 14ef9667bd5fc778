use std::ops::{Deref, DerefMut};

use super::assembler::Assembler;

/// Scoped compressible/incompressible region.
///
/// Created by [`Assembler::compressible`] or [`Assembler::incompressible`].
/// Dereferences to the assembler so instructions are emitted through the
/// guard; dropping it restores the region state that was active before.
/// Guards nest strictly: the borrow checker keeps an outer guard unusable
/// while an inner one is alive.
pub struct RegionGuard<'r, 'a> {
    asm: &'r mut Assembler<'a>,
    saved: bool,
}

impl<'r, 'a> RegionGuard<'r, 'a> {
    pub(super) fn enter(asm: &'r mut Assembler<'a>, compressible: bool) -> Self {
        let saved = asm.set_compressible_region(compressible);
        Self { asm, saved }
    }
}

impl<'a> Deref for RegionGuard<'_, 'a> {
    type Target = Assembler<'a>;

    fn deref(&self) -> &Self::Target {
        self.asm
    }
}

impl DerefMut for RegionGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.asm
    }
}

impl Drop for RegionGuard<'_, '_> {
    fn drop(&mut self) {
        self.asm.set_compressible_region(self.saved);
    }
}
