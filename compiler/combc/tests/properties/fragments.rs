//! Fragment alternatives become ordered branches; boundness is checked
//! against every alternative.

use pretty_assertions::assert_eq;

use combc_diagnostic::ErrorCode;
use combc_ir::dag::FragmentDecl;
use combc_ir::{MatchOp, MatchTable, Name, TableEntry};

use crate::common::{fragment, lit, pat, r, rule, t, Compiled};

fn first_opcode(ops: &[MatchOp]) -> Option<Name> {
    ops.iter().find_map(|op| match op {
        MatchOp::CheckStructure { opcode, .. } => Some(*opcode),
        _ => None,
    })
}

/// `(outs root:$r) (ins $x)` with one alternative per opcode.
fn unary_choice(name: &str, opcodes: &[&str]) -> FragmentDecl {
    fragment(
        name,
        vec![t("root", "r")],
        vec![r("x")],
        opcodes
            .iter()
            .map(|op| vec![pat(op, vec![r("r"), r("x")])])
            .collect(),
    )
}

#[test]
fn k_alternatives_give_k_branches_in_order() {
    let opcodes = ["G_ZEXT", "G_SEXT", "G_ANYEXT", "G_TRUNC"];
    let compiled = Compiled::new(
        vec![unary_choice("any_cast", &opcodes)],
        vec![rule(
            "strip_cast",
            "dst",
            vec![pat("any_cast", vec![r("dst"), r("src")])],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    );
    let program = compiled.program("strip_cast");

    let tried: Vec<_> = program
        .branches
        .iter()
        .map(|branch| first_opcode(&branch.matcher.ops))
        .collect();
    let expected: Vec<_> = opcodes.iter().map(|op| Some(compiled.name(op))).collect();
    assert_eq!(tried, expected);

    let alternatives: Vec<_> = program
        .branches
        .iter()
        .map(|branch| branch.alternatives.clone())
        .collect();
    assert_eq!(alternatives, vec![vec![0], vec![1], vec![2], vec![3]]);
}

#[test]
fn table_tries_branches_until_one_accepts() {
    let compiled = Compiled::new(
        vec![unary_choice("ext", &["G_ZEXT", "G_SEXT"])],
        vec![rule(
            "strip_ext",
            "dst",
            vec![pat("ext", vec![r("dst"), r("src")])],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    );
    let table: MatchTable = compiled.report.table();

    let starts: Vec<_> = table.branch_starts().collect();
    assert_eq!(starts.len(), 2);
    // The first branch falls through to the second, the second to Reject.
    let on_fail: Vec<_> = starts
        .iter()
        .map(|&index| match &table.entries[index] {
            TableEntry::Try { on_fail, .. } => *on_fail,
            other => panic!("expected Try, found {other:?}"),
        })
        .collect();
    assert_eq!(on_fail, vec![starts[1], table.len() - 1]);
    assert_eq!(table.entries[starts[1] - 1], TableEntry::Accept);
}

#[test]
fn param_bound_everywhere_accepts_unbound_actual() {
    let compiled = Compiled::new(
        vec![unary_choice("ext", &["G_ZEXT", "G_SEXT"])],
        vec![rule(
            "uses_ext",
            "dst",
            vec![pat("ext", vec![r("dst"), r("fresh")])],
            vec![pat("COPY", vec![r("dst"), r("fresh")])],
        )],
    );
    assert!(compiled.codes().is_empty());
    assert_eq!(compiled.program("uses_ext").branches.len(), 2);
}

#[test]
fn param_unbound_in_any_alternative_rejects_unbound_actual() {
    // Only the last alternative leaves `$x` unbound.
    let maybe_ext = fragment(
        "maybe_ext",
        vec![t("root", "r")],
        vec![r("x")],
        vec![
            vec![pat("G_ZEXT", vec![r("r"), r("x")])],
            vec![pat("G_SEXT", vec![r("r"), r("x")])],
            vec![pat("G_IMPLICIT_DEF", vec![r("r")])],
        ],
    );
    let compiled = Compiled::new(
        vec![maybe_ext],
        vec![rule(
            "uses_maybe",
            "dst",
            vec![pat("maybe_ext", vec![r("dst"), r("fresh")])],
            vec![pat("COPY", vec![r("dst"), r("fresh")])],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E2002]);
    let diag = compiled.report.diagnostics.iter().next().map(ToString::to_string);
    assert!(diag.is_some_and(|text| text.contains("$fresh") && text.contains("alternative 2")));
}

#[test]
fn bound_actual_is_accepted_regardless() {
    let maybe_ext = fragment(
        "maybe_ext",
        vec![t("root", "r")],
        vec![r("x")],
        vec![
            vec![pat("G_ZEXT", vec![r("r"), r("x")])],
            vec![pat("G_IMPLICIT_DEF", vec![r("r")])],
        ],
    );
    let compiled = Compiled::new(
        vec![maybe_ext],
        vec![rule(
            "bound_first",
            "dst",
            vec![
                pat("maybe_ext", vec![r("t"), r("a")]),
                pat("G_ADD", vec![r("dst"), r("t"), r("a")]),
            ],
            vec![pat("COPY", vec![r("dst"), r("a")])],
        )],
    );
    assert!(compiled.codes().is_empty(), "{:?}", compiled.codes());
    assert_eq!(compiled.program("bound_first").branches.len(), 2);
}

#[test]
fn immediate_params_take_literals() {
    let shift = fragment(
        "shift_by",
        vec![t("root", "r")],
        vec![r("x"), t("gi_imm", "k")],
        vec![vec![pat("G_SHL", vec![r("r"), r("x"), r("k")])]],
    );
    let compiled = Compiled::new(
        vec![shift],
        vec![
            rule(
                "shift_zero",
                "dst",
                vec![pat("shift_by", vec![r("dst"), r("a"), lit(0)])],
                vec![pat("COPY", vec![r("dst"), r("a")])],
            ),
            rule(
                "shift_reg",
                "dst",
                vec![pat("shift_by", vec![r("dst"), r("a"), r("n")])],
                vec![pat("COPY", vec![r("dst"), r("a")])],
            ),
        ],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E1005]);
    assert!(compiled.program("shift_zero").branches[0]
        .matcher
        .ops
        .iter()
        .any(|op| matches!(op, MatchOp::CheckImm { value: 0, .. })));
}
