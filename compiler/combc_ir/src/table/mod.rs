//! Linear match table.
//!
//! Flattens compiled rules into the form the interpreter walks: every branch
//! is wrapped in a `Try` whose `on_fail` target is the next branch, and the
//! table ends with a `Reject` that is reached when nothing matched.
//!
//! ```text
//!  0: Try on_fail=5        ; rule A, branch 0
//!  1:   Match ...
//!  3:   Apply ...
//!  4:   Accept
//!  5: Try on_fail=9        ; rule A, branch 1
//!  ...
//!  9: Reject
//! ```

use std::fmt;

use crate::program::{ApplyOp, DisplayWith, MatchOp, RuleProgram};
use crate::{Name, StringInterner};

/// One entry of the linear table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TableEntry {
    /// Start of a branch; any failing check jumps to `on_fail`.
    Try { rule: Name, on_fail: usize },
    Match(MatchOp),
    Apply(ApplyOp),
    /// The branch matched and its rewrite has been performed.
    Accept,
    /// No branch matched.
    Reject,
}

/// Flat list of table entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct MatchTable {
    pub entries: Vec<TableEntry>,
}

impl MatchTable {
    /// Lay out `programs` in order, branches in declaration order.
    pub fn from_programs<'a>(programs: impl IntoIterator<Item = &'a RuleProgram>) -> Self {
        let mut entries = Vec::new();
        for program in programs {
            for branch in &program.branches {
                let try_at = entries.len();
                entries.push(TableEntry::Try {
                    rule: program.rule,
                    on_fail: 0,
                });
                entries.extend(branch.matcher.ops.iter().cloned().map(TableEntry::Match));
                entries.extend(branch.apply.ops.iter().cloned().map(TableEntry::Apply));
                entries.push(TableEntry::Accept);
                let next = entries.len();
                if let Some(TableEntry::Try { on_fail, .. }) = entries.get_mut(try_at) {
                    *on_fail = next;
                }
            }
        }
        entries.push(TableEntry::Reject);
        MatchTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of every `Try` entry.
    pub fn branch_starts(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| matches!(entry, TableEntry::Try { .. }))
            .map(|(index, _)| index)
    }
}

impl DisplayWith for MatchTable {
    fn fmt_with(&self, interner: &StringInterner, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            match entry {
                TableEntry::Try { rule, on_fail } => writeln!(
                    f,
                    "{index:4}: Try on_fail={on_fail} ; {}",
                    interner.lookup(*rule)
                )?,
                TableEntry::Match(op) => writeln!(f, "{index:4}:   {}", op.display(interner))?,
                TableEntry::Apply(op) => writeln!(f, "{index:4}:   {}", op.display(interner))?,
                TableEntry::Accept => writeln!(f, "{index:4}:   Accept")?,
                TableEntry::Reject => writeln!(f, "{index:4}: Reject")?,
            }
        }
        Ok(())
    }
}
