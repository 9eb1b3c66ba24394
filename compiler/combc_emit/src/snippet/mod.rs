//! Placeholder resolution for native code snippets.
//!
//! At emission time every `${name}` becomes an accessor expression the
//! runtime interpreter understands. Lookup order: matched instruction,
//! matched operand, match data, built instruction, temporary register.

use rustc_hash::FxHashMap;

use combc_ir::{CodeSnippet, MatchData, Name, OutInsnId, StringInterner, TempRegId};
use combc_patterns::PatternError;

use crate::MatchBindings;

/// Everything a placeholder may refer to at one point of emission.
pub struct SnippetScope<'a> {
    pub interner: &'a StringInterner,
    pub bindings: &'a MatchBindings,
    pub match_data: &'a [MatchData],
    /// Apply patterns built so far.
    pub built: Option<&'a FxHashMap<Name, OutInsnId>>,
    /// Apply-side temporary registers.
    pub temps: Option<&'a FxHashMap<Name, TempRegId>>,
}

impl<'a> SnippetScope<'a> {
    /// Scope for match-side predicates.
    pub fn matcher(
        interner: &'a StringInterner,
        bindings: &'a MatchBindings,
        match_data: &'a [MatchData],
    ) -> Self {
        SnippetScope {
            interner,
            bindings,
            match_data,
            built: None,
            temps: None,
        }
    }

    /// Accessor expression for `name`.
    pub fn accessor(&self, name: Name) -> Result<String, PatternError> {
        if let Some(insn) = self.bindings.pattern(name) {
            return Ok(format!("*State.MIs[{}]", insn.raw()));
        }
        if let Some((insn, operand)) = self.bindings.operand(name) {
            return Ok(format!(
                "State.MIs[{}]->getOperand({operand})",
                insn.raw()
            ));
        }
        if self.match_data.iter().any(|data| data.name == name) {
            return Ok(format!("MatchInfos.{}", self.interner.lookup(name)));
        }
        if let Some(out) = self.built.and_then(|built| built.get(&name)) {
            return Ok(format!("OutMIs[{}]", out.raw()));
        }
        if let Some(temp) = self.temps.and_then(|temps| temps.get(&name)) {
            return Ok(format!("State.TempRegisters[{}]", temp.raw()));
        }
        Err(PatternError::UnknownPlaceholder { placeholder: name })
    }

    /// Resolve every placeholder of `snippet`.
    pub fn render(&self, snippet: &CodeSnippet) -> Result<String, PatternError> {
        snippet.render(|name| self.accessor(name))
    }
}
