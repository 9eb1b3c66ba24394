//! The apply program redefines the declared root exactly once.

use pretty_assertions::assert_eq;

use combc_diagnostic::ErrorCode;
use combc_ir::{ApplyOp, InsnId};

use crate::common::{lit, pat, r, rule, t, Compiled};

#[test]
fn every_compiled_rule_redefines_its_root() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![
            rule(
                "mul_one",
                "dst",
                vec![pat("G_MUL", vec![r("dst"), r("x"), lit(1)])],
                vec![pat("COPY", vec![r("dst"), r("x")])],
            ),
            rule(
                "via_temp",
                "dst",
                vec![pat("G_SUB", vec![r("dst"), r("x"), r("y")])],
                vec![
                    pat("G_ADD", vec![t("s32", "tmp"), r("x"), r("y")]),
                    pat("COPY", vec![r("dst"), r("tmp")]),
                ],
            ),
        ],
    );
    assert!(compiled.codes().is_empty());

    for program in &compiled.report.programs {
        for branch in &program.branches {
            let root_copies = branch
                .apply
                .ops
                .iter()
                .filter(|op| {
                    matches!(
                        op,
                        ApplyOp::CopyOperand {
                            insn,
                            operand: 0,
                            ..
                        } if *insn == InsnId::new(0)
                    )
                })
                .count();
            assert_eq!(root_copies, 1);
            assert_eq!(branch.apply.ops.last(), Some(&ApplyOp::EraseRoot));
        }
    }
}

#[test]
fn apply_without_root_fails() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "forgets_root",
            "dst",
            vec![pat("G_MUL", vec![r("dst"), r("x"), lit(1)])],
            vec![pat("G_ADD", vec![t("s32", "tmp"), r("x"), r("x")])],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E4001]);
    assert!(compiled.report.programs.is_empty());
}

#[test]
fn rewriting_another_match_fails() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "rewrites_operand",
            "dst",
            vec![
                pat("G_ZEXT", vec![r("t"), r("a")]),
                pat("G_ADD", vec![r("dst"), r("t"), r("a")]),
            ],
            vec![
                pat("COPY", vec![r("t"), r("a")]),
                pat("COPY", vec![r("dst"), r("a")]),
            ],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E4002]);
}
