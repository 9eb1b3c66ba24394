//! Native code snippet templates.
//!
//! Snippets are opaque native code with `${name}` placeholders. The compiler
//! never parses the native syntax: it only substitutes placeholders, first
//! with actual operand names when a fragment is instantiated, then with
//! accessor expressions at emission time.

use crate::{Name, StringInterner};

/// One piece of a snippet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SnippetPart {
    Text(String),
    Placeholder(Name),
}

/// A code template with named placeholder slots.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CodeSnippet {
    parts: Vec<SnippetPart>,
}

impl CodeSnippet {
    /// Split `code` into text and `${name}` placeholders.
    ///
    /// An unterminated `${` is kept as text.
    pub fn parse(code: &str, interner: &StringInterner) -> Self {
        let mut snippet = CodeSnippet::default();
        let mut rest = code;
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            snippet.push_text(&rest[..start]);
            let name = after[..end].trim().trim_start_matches('$');
            snippet
                .parts
                .push(SnippetPart::Placeholder(interner.intern(name)));
            rest = &after[end + 1..];
        }
        snippet.push_text(rest);
        snippet
    }

    /// Snippet without placeholders.
    pub fn from_text(text: &str) -> Self {
        let mut snippet = CodeSnippet::default();
        snippet.push_text(text);
        snippet
    }

    pub fn parts(&self) -> &[SnippetPart] {
        &self.parts
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = Name> + '_ {
        self.parts.iter().filter_map(|part| match part {
            SnippetPart::Placeholder(name) => Some(*name),
            SnippetPart::Text(_) => None,
        })
    }

    /// Rewrite every placeholder through `f`, which may rename it or turn
    /// it into literal text.
    #[must_use]
    pub fn map_placeholders(&self, mut f: impl FnMut(Name) -> SnippetPart) -> CodeSnippet {
        let mut out = CodeSnippet::default();
        for part in &self.parts {
            match part {
                SnippetPart::Text(text) => out.push_text(text),
                SnippetPart::Placeholder(name) => match f(*name) {
                    SnippetPart::Text(text) => out.push_text(&text),
                    placeholder @ SnippetPart::Placeholder(_) => out.parts.push(placeholder),
                },
            }
        }
        out
    }

    /// Produce the final string, resolving every placeholder.
    ///
    /// Stops at the first placeholder `resolve` rejects.
    pub fn render<E>(
        &self,
        mut resolve: impl FnMut(Name) -> Result<String, E>,
    ) -> Result<String, E> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                SnippetPart::Text(text) => out.push_str(text),
                SnippetPart::Placeholder(name) => out.push_str(&resolve(*name)?),
            }
        }
        Ok(out)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(SnippetPart::Text(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(SnippetPart::Text(text.to_owned()));
        }
    }
}
