use rvjit_core::label::*;

#[test]
fn new_label_is_unbound() {
    let label = Label::new(3);
    assert_eq!(label.id, 3);
    assert!(!label.is_bound());
    assert_eq!(label.offset(), None);
    assert!(!label.has_pending_uses());
}

#[test]
fn bind_returns_pending_uses() {
    let mut label = Label::new(0);
    label.add_use(0, RelocKind::Branch);
    label.add_use(8, RelocKind::Jal);
    label.add_use(12, RelocKind::CBranch);
    assert_eq!(label.uses().len(), 3);

    let uses = label.bind(32);
    assert!(label.is_bound());
    assert_eq!(label.offset(), Some(32));
    assert_eq!(
        uses,
        vec![
            LabelUse { offset: 0, kind: RelocKind::Branch },
            LabelUse { offset: 8, kind: RelocKind::Jal },
            LabelUse { offset: 12, kind: RelocKind::CBranch },
        ]
    );
    assert!(!label.has_pending_uses());
    assert!(label.uses().is_empty());
}

#[test]
#[should_panic(expected = "already bound")]
fn bind_twice_panics() {
    let mut label = Label::new(1);
    label.bind(0);
    label.bind(4);
}

#[test]
fn failed_rebind_keeps_offset() {
    let mut label = Label::new(4);
    label.bind(4);
    let rebind = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| label.bind(40)));
    assert!(rebind.is_err());
    assert_eq!(label.offset(), Some(4));
}

#[test]
#[should_panic(expected = "already bound")]
fn add_use_after_bind_panics() {
    let mut label = Label::new(2);
    label.bind(0);
    label.add_use(4, RelocKind::Branch);
}

#[test]
fn reloc_kind_widths() {
    assert_eq!(RelocKind::Branch.insn_len(), 4);
    assert_eq!(RelocKind::Jal.insn_len(), 4);
    assert_eq!(RelocKind::CBranch.insn_len(), 2);
    assert_eq!(RelocKind::CJump.insn_len(), 2);
}

#[test]
fn reloc_kind_ranges() {
    assert!(RelocKind::Branch.fits(4094));
    assert!(RelocKind::Branch.fits(-4096));
    assert!(!RelocKind::Branch.fits(4096));
    assert!(!RelocKind::Branch.fits(3));

    assert!(RelocKind::Jal.fits(1_048_574));
    assert!(!RelocKind::Jal.fits(1_048_576));

    assert!(RelocKind::CBranch.fits(254));
    assert!(RelocKind::CBranch.fits(-256));
    assert!(!RelocKind::CBranch.fits(256));

    assert!(RelocKind::CJump.fits(2046));
    assert!(RelocKind::CJump.fits(-2048));
    assert!(!RelocKind::CJump.fits(2048));
}
