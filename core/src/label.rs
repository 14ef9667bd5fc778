/// A branch or jump target inside one code buffer.
///
/// Labels support forward references: a branch can name a label before
/// it is bound, in which case the emitter writes a placeholder and
/// records a [`LabelUse`]. Binding resolves every recorded use exactly
/// once; a bound label never moves.
#[derive(Debug, Clone)]
pub struct Label {
    pub id: u32,
    state: LabelState,
}

#[derive(Debug, Clone)]
enum LabelState {
    Unbound { uses: Vec<LabelUse> },
    Bound { offset: usize },
}

/// A forward reference to a label: where the placeholder was emitted
/// and how its displacement field is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelUse {
    /// Offset in the code buffer of the branch instruction.
    pub offset: usize,
    pub kind: RelocKind,
}

/// Branch kinds that can reference a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelocKind {
    /// Conditional branch, B-type, 13-bit signed offset.
    Branch,
    /// `jal`, J-type, 21-bit signed offset.
    Jal,
    /// `c.beqz`/`c.bnez`, CB-type, 9-bit signed offset.
    CBranch,
    /// `c.j`, CJ-type, 12-bit signed offset.
    CJump,
}

impl RelocKind {
    /// Width in bytes of the instruction carrying this relocation.
    pub const fn insn_len(self) -> usize {
        match self {
            RelocKind::Branch | RelocKind::Jal => 4,
            RelocKind::CBranch | RelocKind::CJump => 2,
        }
    }

    /// Signed offset width in bits (the implicit low zero bit included).
    pub const fn offset_bits(self) -> u32 {
        match self {
            RelocKind::Branch => 13,
            RelocKind::Jal => 21,
            RelocKind::CBranch => 9,
            RelocKind::CJump => 12,
        }
    }

    /// Whether `disp` is encodable by this kind.
    pub const fn fits(self, disp: i64) -> bool {
        crate::imm::is_imm_in_range(disp, self.offset_bits() - 1, 1)
    }
}

impl Label {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            state: LabelState::Unbound { uses: Vec::new() },
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, LabelState::Bound { .. })
    }

    /// Bound offset, if any.
    pub fn offset(&self) -> Option<usize> {
        match self.state {
            LabelState::Bound { offset } => Some(offset),
            LabelState::Unbound { .. } => None,
        }
    }

    /// Record a forward reference. Only valid while unbound.
    pub fn add_use(&mut self, offset: usize, kind: RelocKind) {
        match &mut self.state {
            LabelState::Unbound { uses } => uses.push(LabelUse { offset, kind }),
            LabelState::Bound { .. } => {
                panic!("label {} already bound; cannot add a forward use", self.id)
            }
        }
    }

    /// Pending forward references.
    pub fn uses(&self) -> &[LabelUse] {
        match &self.state {
            LabelState::Unbound { uses } => uses,
            LabelState::Bound { .. } => &[],
        }
    }

    /// Whether there are unresolved forward references.
    pub fn has_pending_uses(&self) -> bool {
        !self.uses().is_empty()
    }

    /// Bind the label to `offset` and hand back the uses that must now be
    /// patched. Binding twice is a contract violation.
    pub fn bind(&mut self, offset: usize) -> Vec<LabelUse> {
        let uses = match &mut self.state {
            LabelState::Unbound { uses } => std::mem::take(uses),
            LabelState::Bound { offset: prev } => {
                panic!("label {} already bound at {prev:#x}", self.id)
            }
        };
        self.state = LabelState::Bound { offset };
        uses
    }
}
