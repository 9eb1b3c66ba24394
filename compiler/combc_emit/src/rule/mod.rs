//! Per-rule compilation driver.
//!
//! Expands the match list, then for every expansion runs joint type
//! inference over match and apply (seeded with the use-site types the
//! expansion replaced), emits the matcher and finally the apply
//! program. Expansions are independent: each gets its own copy of the
//! apply list.

use combc_ir::{CombineRule, InstrInfo, RuleBranch, RuleProgram, StringInterner};
use combc_patterns::{
    ensure_concrete, expand_fragments, infer_types, FragmentSet, PatternProblem,
};

use crate::{emit_apply, emit_matcher};

/// Compile `rule` into one branch per fragment-alternative combination.
///
/// Fails on the first problem found in any branch.
pub fn compile_rule(
    rule: &CombineRule,
    fragments: &FragmentSet,
    instrs: &dyn InstrInfo,
    interner: &StringInterner,
) -> Result<RuleProgram, PatternProblem> {
    ensure_concrete(&rule.apply_patterns)?;
    let expansions = expand_fragments(&rule.match_patterns, fragments, interner)?;

    let mut branches = Vec::with_capacity(expansions.len());
    for expansion in expansions {
        let mut matched = expansion.list;
        let mut apply = rule.apply_patterns.clone();
        infer_types(&mut [&mut matched, &mut apply], &expansion.seeds)?;

        let (matcher, bindings) =
            emit_matcher(&matched, rule.root, &rule.match_data, interner)?;
        let apply = emit_apply(
            &apply,
            rule.root,
            &bindings,
            &rule.match_data,
            instrs,
            interner,
        )?;

        branches.push(RuleBranch {
            alternatives: expansion.choices.to_vec(),
            matcher,
            apply,
        });
    }

    tracing::debug!(
        rule = interner.lookup(rule.name),
        branches = branches.len(),
        "compiled rule"
    );
    Ok(RuleProgram {
        rule: rule.name,
        branches,
    })
}
