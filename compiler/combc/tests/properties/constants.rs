//! Typed literals in apply are materialized unless the instruction
//! already defines a constant.

use pretty_assertions::assert_eq;

use combc_ir::{ApplyOp, InsnId, Llt, OutInsnId, TempRegId};

use crate::common::{lit, pat, r, rule, typed_lit, Compiled};

fn zero_rule(apply_opcode: &str) -> Compiled {
    Compiled::new(
        Vec::new(),
        vec![rule(
            "to_zero",
            "dst",
            vec![pat("G_MUL", vec![r("dst"), r("x"), lit(0)])],
            vec![pat(apply_opcode, vec![r("dst"), typed_lit("i32", 0)])],
        )],
    )
}

#[test]
fn copy_of_literal_builds_a_constant_first() {
    let compiled = zero_rule("COPY");
    let apply = &compiled.program("to_zero").branches[0].apply.ops;
    let s32 = Llt::Scalar(32);
    assert_eq!(
        apply,
        &vec![
            ApplyOp::MakeTempReg {
                temp: TempRegId::new(0),
                ty: s32,
            },
            ApplyOp::BuildInstr {
                out: OutInsnId::new(0),
                opcode: compiled.name("G_CONSTANT"),
            },
            ApplyOp::AddTempReg {
                out: OutInsnId::new(0),
                temp: TempRegId::new(0),
                is_def: true,
            },
            ApplyOp::AddCImm {
                out: OutInsnId::new(0),
                ty: s32,
                value: 0,
            },
            ApplyOp::BuildInstr {
                out: OutInsnId::new(1),
                opcode: compiled.name("COPY"),
            },
            ApplyOp::CopyOperand {
                out: OutInsnId::new(1),
                insn: InsnId::new(0),
                operand: 0,
            },
            ApplyOp::AddTempReg {
                out: OutInsnId::new(1),
                temp: TempRegId::new(0),
                is_def: false,
            },
            ApplyOp::EraseRoot,
        ]
    );
}

#[test]
fn constant_carries_the_literal_directly() {
    let compiled = zero_rule("G_CONSTANT");
    let apply = &compiled.program("to_zero").branches[0].apply.ops;
    assert_eq!(
        apply,
        &vec![
            ApplyOp::BuildInstr {
                out: OutInsnId::new(0),
                opcode: compiled.name("G_CONSTANT"),
            },
            ApplyOp::CopyOperand {
                out: OutInsnId::new(0),
                insn: InsnId::new(0),
                operand: 0,
            },
            ApplyOp::AddCImm {
                out: OutInsnId::new(0),
                ty: Llt::Scalar(32),
                value: 0,
            },
            ApplyOp::EraseRoot,
        ]
    );
}

#[test]
fn literal_too_wide_for_its_type() {
    let compiled = Compiled::new(
        Vec::new(),
        vec![rule(
            "too_wide",
            "dst",
            vec![pat("G_MUL", vec![r("dst"), r("x"), lit(0)])],
            vec![pat("G_CONSTANT", vec![r("dst"), typed_lit("i8", 256)])],
        )],
    );
    assert_eq!(compiled.codes(), vec![combc_diagnostic::ErrorCode::E1003]);
}
