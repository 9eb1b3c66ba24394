//! `x * 1 => x`, from declaration file to table.

use pretty_assertions::assert_eq;

use combc::{CompileOptions, Declarations, Registry};
use combc_ir::dag::RuleDecl;
use combc_ir::{ApplyOp, DisplayWith, InsnId, MatchOp, OutInsnId};

use crate::common::{lit, pat, r, rule, Compiled};

fn mul_one() -> RuleDecl {
    rule(
        "mul_by_one",
        "dst",
        vec![pat("G_MUL", vec![r("dst"), r("x"), lit(1)])],
        vec![pat("COPY", vec![r("dst"), r("x")])],
    )
}

#[test]
fn mul_by_one_programs() {
    let compiled = Compiled::new(Vec::new(), vec![mul_one()]);
    let program = compiled.program("mul_by_one");
    assert_eq!(program.branches.len(), 1);
    let branch = &program.branches[0];
    let mi0 = InsnId::new(0);
    let out0 = OutInsnId::new(0);

    assert_eq!(
        branch.matcher.ops,
        vec![
            MatchOp::CheckStructure {
                insn: mi0,
                opcode: compiled.name("G_MUL"),
                num_defs: 1,
                num_uses: 2,
            },
            MatchOp::Capture {
                name: compiled.name("dst"),
                insn: mi0,
                operand: 0,
            },
            MatchOp::Capture {
                name: compiled.name("x"),
                insn: mi0,
                operand: 1,
            },
            MatchOp::CheckImm {
                insn: mi0,
                operand: 2,
                value: 1,
            },
        ]
    );
    assert_eq!(
        branch.apply.ops,
        vec![
            ApplyOp::BuildInstr {
                out: out0,
                opcode: compiled.name("COPY"),
            },
            ApplyOp::CopyOperand {
                out: out0,
                insn: mi0,
                operand: 0,
            },
            ApplyOp::CopyOperand {
                out: out0,
                insn: mi0,
                operand: 1,
            },
            ApplyOp::EraseRoot,
        ]
    );
}

#[test]
fn mul_by_one_from_json() {
    let text = r#"{
        "rules": [{
            "name": "mul_by_one",
            "defs": { "operator": "defs", "args": [{ "ref": { "name": "$dst", "ty": "root" } }] },
            "match": { "operator": "match", "args": [{ "dag": { "operator": "G_MUL",
                "args": [{ "ref": { "name": "$dst" } }, { "ref": { "name": "$x" } }, { "literal": 1 }] } }] },
            "apply": { "operator": "apply", "args": [{ "dag": { "operator": "COPY",
                "args": [{ "ref": { "name": "$dst" } }, { "ref": { "name": "$x" } }] } }] }
        }]
    }"#;
    let decls = Declarations::from_json(text).unwrap();
    assert_eq!(decls.rules, vec![mul_one()]);

    let mut registry = Registry::with_generic_opcodes();
    registry.register(decls);
    let report = registry.compile(&CompileOptions::default());
    assert!(report.has_errors().is_none());

    let rendered = report.table().display(registry.interner()).to_string();
    assert_eq!(
        rendered,
        "   0: Try on_fail=10 ; mul_by_one\n\
         \x20  1:   CheckStructure MIs[0] G_MUL defs=1 uses=2\n\
         \x20  2:   Capture $dst <- MIs[0].op0\n\
         \x20  3:   Capture $x <- MIs[0].op1\n\
         \x20  4:   CheckImm MIs[0].op2 == 1\n\
         \x20  5:   BuildInstr OutMIs[0] COPY\n\
         \x20  6:   CopyOperand OutMIs[0] <- MIs[0].op0\n\
         \x20  7:   CopyOperand OutMIs[0] <- MIs[0].op1\n\
         \x20  8:   EraseRoot\n\
         \x20  9:   Accept\n\
         \x20 10: Reject\n"
    );
}
