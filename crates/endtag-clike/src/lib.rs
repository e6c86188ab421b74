#![warn(missing_docs)]
//! `endtag-clike` - a regex-based host for `endtag-core`.
//!
//! Editors normally hand `endtag-core` their own classifier and syntax tree. This crate provides
//! both for C-family sources (C#, Java, JavaScript/TypeScript, C/C++) when no richer host
//! exists: a single-regex tokenizer and a brace structure built from its tokens. It is *not* a
//! parser; it only knows enough about headers to put end tags on the right braces.
//!
//! ```
//! use endtag_clike::{CLikeHost, Language};
//! use endtag_core::{EndTagOptions, scan};
//! use tokio_util::sync::CancellationToken;
//!
//! let host = CLikeHost::new(Language::Java).unwrap();
//! let services = host.services("class A {\n  void f() {\n  }\n}\n", 1);
//! let generation = scan(&services, &EndTagOptions::default(), &CancellationToken::new()).unwrap();
//! let headers: Vec<&str> = generation.regions().iter().map(|r| r.header.as_str()).collect();
//! assert_eq!(headers, vec!["void f()", "class A"]);
//! ```

pub mod lexer;
pub mod structure;

pub use lexer::{Language, Lexer, Token};
pub use structure::{build_structure, navigator};

use endtag_core::{ClassificationIndex, DocumentServices, RopeSnapshot};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Builds [`DocumentServices`] for one language.
#[derive(Debug, Clone)]
pub struct CLikeHost {
    language: Language,
    lexer: Lexer,
}

impl CLikeHost {
    /// Host for `language`. Fails only if the token pattern does not compile.
    pub fn new(language: Language) -> Result<Self, regex::Error> {
        Ok(Self {
            language,
            lexer: Lexer::new(language)?,
        })
    }

    /// Host for the language implied by `path`'s extension.
    pub fn for_path(path: &Path) -> Option<Result<Self, regex::Error>> {
        let language = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)?;
        Some(Self::new(language))
    }

    /// The language this host tokenizes.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Content type to pass to `EndTagTagger::with_content_type`.
    pub fn content_type(&self) -> &'static str {
        self.language.content_type()
    }

    /// Tokenize and structure `text` as snapshot `version`.
    pub fn services(&self, text: &str, version: u64) -> DocumentServices {
        let tokens = self.lexer.tokenize(text);
        let classifications = tokens.iter().map(Token::classification).collect();
        let navigator = navigator(&tokens);
        debug!(
            target: "endtag.clike",
            version,
            language = self.content_type(),
            tokens = tokens.len(),
            structure = navigator.len(),
            "document_indexed"
        );
        DocumentServices::new(
            Arc::new(RopeSnapshot::new(text, version)),
            Arc::new(ClassificationIndex::new(classifications)),
            Arc::new(navigator),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use endtag_core::TextSnapshot;

    #[test]
    fn test_for_path_picks_language() {
        let host = CLikeHost::for_path(Path::new("src/Widget.cs")).unwrap().unwrap();
        assert_eq!(host.language(), Language::CSharp);
        assert_eq!(host.content_type(), "csharp");
        assert!(CLikeHost::for_path(Path::new("README")).is_none());
    }

    #[test]
    fn test_services_carry_version_and_text() {
        let host = CLikeHost::new(Language::C).unwrap();
        let services = host.services("int f() { }", 9);
        assert_eq!(services.version(), 9);
        assert_eq!(services.snapshot.len_chars(), 11);
    }
}
