//! Declaration registry and the compile phase.
//!
//! Declarations are registered first and compiled together: fragments are
//! lowered and validated once, up front, and are read-only while rules
//! compile. Rules share nothing else, so with
//! [`CompileOptions::parallel`] they are compiled on the rayon pool.
//! Results are collected back in declaration order either way.

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use combc_diagnostic::{DiagnosticConfig, DiagnosticQueue, ErrorGuaranteed};
use combc_emit::compile_rule;
use combc_ir::dag::{FragmentDecl, RuleDecl};
use combc_ir::{
    GenericInstrTable, InstrInfo, MatchTable, Name, RuleProgram, SharedInterner, StringInterner,
};
use combc_patterns::{FragmentSet, Lowerer, Owner, PatternError, PatternProblem};

use crate::{CompileOptions, Declarations};

/// Holds every registered declaration until [`compile`](Self::compile).
pub struct Registry {
    interner: SharedInterner,
    instrs: Box<dyn InstrInfo + Send + Sync>,
    fragments: Vec<FragmentDecl>,
    rules: Vec<RuleDecl>,
}

impl Registry {
    pub fn new(instrs: impl InstrInfo + Send + Sync + 'static) -> Self {
        Registry {
            interner: SharedInterner::new(),
            instrs: Box::new(instrs),
            fragments: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Registry over the built-in generic opcode table.
    pub fn with_generic_opcodes() -> Self {
        Self::new(GenericInstrTable::new())
    }

    pub fn register_fragment(&mut self, decl: FragmentDecl) {
        self.fragments.push(decl);
    }

    pub fn register_rule(&mut self, decl: RuleDecl) {
        self.rules.push(decl);
    }

    pub fn register(&mut self, decls: Declarations) {
        self.fragments.extend(decls.fragments);
        self.rules.extend(decls.rules);
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Shared handle on the interner, for output produced after the
    /// registry is gone.
    pub fn shared_interner(&self) -> SharedInterner {
        self.interner.clone()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Compile every registered rule.
    pub fn compile(&self, options: &CompileOptions) -> CompileReport {
        let interner: &StringInterner = &self.interner;
        let instrs: &(dyn InstrInfo + Send + Sync) = &*self.instrs;

        let fragments = FragmentSet::build(&self.fragments, interner, instrs);
        let mut report = CompileReport {
            programs: Vec::with_capacity(self.rules.len()),
            diagnostics: DiagnosticQueue::with_config(DiagnosticConfig::limited(
                options.error_limit,
            )),
            failed_rules: Vec::new(),
            failed_fragments: Vec::new(),
        };
        for (name, problem) in fragments.failures() {
            report
                .diagnostics
                .add(problem.to_diagnostic(Owner::Fragment(name), interner));
            report.failed_fragments.push(name);
        }

        let mut seen = FxHashSet::default();
        let jobs: Vec<(Name, &RuleDecl, bool)> = self
            .rules
            .iter()
            .map(|decl| {
                let name = interner.intern(&decl.name);
                (name, decl, !seen.insert(name))
            })
            .collect();

        let compile_one = |&(name, decl, duplicate): &(Name, &RuleDecl, bool)| -> Result<RuleProgram, PatternProblem> {
            if duplicate {
                return Err(PatternProblem::from(PatternError::DuplicateDefinition {
                    name,
                }));
            }
            let rule =
                Lowerer::new(interner, instrs, fragments.signatures()).lower_rule(decl)?;
            compile_rule(&rule, &fragments, instrs, interner)
        };

        let results: Vec<_> = if options.parallel {
            jobs.par_iter().map(&compile_one).collect()
        } else {
            jobs.iter().map(&compile_one).collect()
        };

        for (&(name, _, _), result) in jobs.iter().zip(results) {
            match result {
                Ok(program) => report.programs.push(program),
                Err(problem) => {
                    tracing::debug!(
                        rule = interner.lookup(name),
                        code = %problem.code(),
                        "rule failed"
                    );
                    report
                        .diagnostics
                        .add(problem.to_diagnostic(Owner::Rule(name), interner));
                    report.failed_rules.push(name);
                }
            }
        }

        tracing::info!(
            rules = self.rules.len(),
            compiled = report.programs.len(),
            failed_rules = report.failed_rules.len(),
            failed_fragments = report.failed_fragments.len(),
            parallel = options.parallel,
            "compilation finished"
        );
        report
    }
}

/// Outcome of [`Registry::compile`].
#[derive(Clone, Debug)]
pub struct CompileReport {
    /// Successfully compiled rules, in declaration order.
    pub programs: Vec<RuleProgram>,
    pub diagnostics: DiagnosticQueue,
    pub failed_rules: Vec<Name>,
    pub failed_fragments: Vec<Name>,
}

impl CompileReport {
    /// The compiled program of rule `name`.
    pub fn program(&self, name: Name) -> Option<&RuleProgram> {
        self.programs.iter().find(|program| program.rule == name)
    }

    /// Linear match table over every compiled rule.
    pub fn table(&self) -> MatchTable {
        MatchTable::from_programs(&self.programs)
    }

    pub fn branch_count(&self) -> usize {
        self.programs.iter().map(|program| program.branches.len()).sum()
    }

    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        self.diagnostics.has_errors()
    }
}
