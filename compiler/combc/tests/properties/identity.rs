//! A name repeated in the match pattern is captured once and compared.

use pretty_assertions::assert_eq;

use combc_ir::{InsnId, MatchOp};

use crate::common::{pat, r, rule, Compiled};

#[test]
fn and_of_same_operand() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "and_self",
            "root",
            vec![pat("G_AND", vec![r("root"), r("x"), r("x")])],
            vec![pat("COPY", vec![r("root"), r("x")])],
        )],
    );
    let x = compiled.name("x");
    let ops = &compiled.program("and_self").branches[0].matcher.ops;

    let captures: Vec<_> = ops
        .iter()
        .filter(|op| matches!(op, MatchOp::Capture { name, .. } if *name == x))
        .collect();
    let identities: Vec<_> = ops
        .iter()
        .filter(|op| matches!(op, MatchOp::CheckSameOperand { .. }))
        .collect();

    assert_eq!(
        captures,
        vec![&MatchOp::Capture {
            name: x,
            insn: InsnId::new(0),
            operand: 1,
        }]
    );
    assert_eq!(
        identities,
        vec![&MatchOp::CheckSameOperand {
            insn: InsnId::new(0),
            operand: 2,
            other_insn: InsnId::new(0),
            other_operand: 1,
        }]
    );
}

#[test]
fn identity_across_instructions() {
    // (G_SUB $dst, $a, $t) where $t = (G_ADD $t, $a, $b): $a is compared
    // against its capture in the root.
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "sub_of_add",
            "dst",
            vec![
                pat("G_ADD", vec![r("t"), r("a"), r("b")]),
                pat("G_SUB", vec![r("dst"), r("a"), r("t")]),
            ],
            vec![pat("COPY", vec![r("dst"), r("b")])],
        )],
    );
    let ops = &compiled.program("sub_of_add").branches[0].matcher.ops;
    assert!(ops.contains(&MatchOp::CheckSameOperand {
        insn: InsnId::new(1),
        operand: 1,
        other_insn: InsnId::new(0),
        other_operand: 1,
    }));
}
