//! One typed occurrence types every occurrence, including the use-site
//! operands of a fragment.

use proptest::prelude::*;

use combc_diagnostic::ErrorCode;
use combc_ir::dag::{DagArg, FragmentDecl};
use combc_ir::{Llt, MatchOp};

use crate::common::{fragment, pat, r, rule, t, Compiled};

/// `(G_BUILD_VECTOR $dst, $x, ..., s:$x, ..., $x)` with `uses` occurrences
/// of `$x` and the typed one at `typed_at`.
fn build_vector(uses: usize, typed_at: usize, ty: &str) -> Compiled {
    let mut operands = vec![r("dst")];
    operands.extend((0..uses).map(|index| if index == typed_at { t(ty, "x") } else { r("x") }));
    Compiled::new(
        Vec::new(),
        vec![rule(
            "splat",
            "dst",
            vec![pat("G_BUILD_VECTOR", operands)],
            vec![pat("COPY", vec![r("dst"), r("x")])],
        )],
    )
}

fn type_checks(compiled: &Compiled) -> Vec<(u32, Llt)> {
    compiled.program("splat").branches[0]
        .matcher
        .ops
        .iter()
        .filter_map(|op| match op {
            MatchOp::CheckType { operand, ty, .. } => Some((*operand, *ty)),
            _ => None,
        })
        .collect()
}

#[test]
fn typed_use_types_every_use() {
    let compiled = build_vector(3, 2, "s16");
    let s16 = Llt::Scalar(16);
    assert_eq!(type_checks(&compiled), vec![(1, s16), (2, s16), (3, s16)]);
}

#[test]
fn conflicting_types_are_rejected() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "conflict",
            "dst",
            vec![pat("G_ADD", vec![r("dst"), t("s32", "x"), t("s64", "x")])],
            vec![pat("COPY", vec![r("dst"), r("x")])],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E2001]);
}

/// `(outs root:$r) (ins $x)` zero-extending s32 to s64.
fn zext_to_s64() -> FragmentDecl {
    fragment(
        "zext64",
        vec![t("root", "r")],
        vec![r("x")],
        vec![vec![pat("G_ZEXT", vec![t("s64", "r"), t("s32", "x")])]],
    )
}

/// `(outs root:$r) (ins s32:$x)` whose only alternative ignores `$x`.
fn undef_of_s32() -> FragmentDecl {
    fragment(
        "undef32",
        vec![t("root", "r")],
        vec![t("s32", "x")],
        vec![vec![pat("G_IMPLICIT_DEF", vec![r("r")])]],
    )
}

#[test]
fn typed_input_actual_must_agree_with_fragment_body() {
    let compiled = Compiled::new(
        vec![zext_to_s64()],
        vec![rule(
            "narrow_src",
            "dst",
            vec![pat("zext64", vec![r("dst"), t("s16", "src")])],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E2001]);
}

#[test]
fn typed_output_actual_must_agree_with_fragment_body() {
    let compiled = Compiled::new(
        vec![zext_to_s64()],
        vec![rule(
            "narrow_dst",
            "dst",
            vec![pat("zext64", vec![t("s32", "dst"), r("src")])],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    );
    assert_eq!(compiled.codes(), vec![ErrorCode::E2001]);
}

#[test]
fn agreeing_use_site_type_compiles() {
    let compiled = Compiled::new(
        vec![zext_to_s64()],
        vec![rule(
            "wide_src",
            "dst",
            vec![pat("zext64", vec![r("dst"), t("s32", "src")])],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    );
    let ops = &compiled.program("wide_src").branches[0].matcher.ops;
    assert!(ops.iter().any(|op| matches!(
        op,
        MatchOp::CheckType { operand: 1, ty: Llt::Scalar(32), .. }
    )));
}

/// `(G_ADD $dst, $u, $src)` with `$u` produced by `undef32` from `src`.
fn add_of_undef(src: DagArg) -> Compiled {
    Compiled::new(
        vec![undef_of_s32()],
        vec![rule(
            "add_undef",
            "dst",
            vec![
                pat("undef32", vec![r("u"), src]),
                pat("G_ADD", vec![r("dst"), r("u"), r("src")]),
            ],
            vec![pat("COPY", vec![r("dst"), r("src")])],
        )],
    )
}

#[test]
fn typed_parameter_the_body_ignores_still_types_the_actual() {
    let compiled = add_of_undef(r("src"));
    let program = compiled.program("add_undef");
    let src_checks: Vec<_> = program.branches[0]
        .matcher
        .ops
        .iter()
        .filter_map(|op| match op {
            MatchOp::CheckType { operand: 2, ty, .. } => Some(*ty),
            _ => None,
        })
        .collect();
    assert_eq!(src_checks, vec![Llt::Scalar(32)]);
}

#[test]
fn typed_parameter_the_body_ignores_conflicts_with_actual() {
    let compiled = add_of_undef(t("s64", "src"));
    assert_eq!(compiled.codes(), vec![ErrorCode::E2001]);
}

proptest! {
    #[test]
    fn propagation_is_position_independent(
        uses in 1usize..12,
        typed_seed in any::<usize>(),
        bits in prop::sample::select(vec![1u16, 8, 16, 32, 64, 128]),
    ) {
        let typed_at = typed_seed % uses;
        let compiled = build_vector(uses, typed_at, &format!("s{bits}"));
        let checks = type_checks(&compiled);

        prop_assert_eq!(checks.len(), uses);
        for (position, (operand, ty)) in checks.into_iter().enumerate() {
            prop_assert_eq!(operand as usize, position + 1);
            prop_assert_eq!(ty, Llt::Scalar(bits));
        }
    }
}
