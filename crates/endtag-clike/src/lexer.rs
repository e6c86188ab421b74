//! Regex tokenizer for C-family source.
//!
//! One alternation regex runs over the whole document (block comments and verbatim strings span
//! lines). Match byte offsets are converted to character offsets incrementally, so the cost is a
//! single pass over the text.

use endtag_core::{ClassificationKind, ClassificationSpan, TextSpan};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Source languages the lexer knows keywords for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// C#
    CSharp,
    /// Java
    Java,
    /// JavaScript / TypeScript
    JavaScript,
    /// C / C++
    C,
}

impl Language {
    /// Guess the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "cs" | "csx" => Some(Self::CSharp),
            "java" => Some(Self::Java),
            "js" | "mjs" | "cjs" | "ts" | "tsx" | "jsx" => Some(Self::JavaScript),
            "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" => Some(Self::C),
            _ => None,
        }
    }

    /// Content type name, as used in the end tag language list.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::CSharp => "csharp",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::C => "c/c++",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::CSharp => CSHARP_KEYWORDS,
            Self::Java => JAVA_KEYWORDS,
            Self::JavaScript => JAVASCRIPT_KEYWORDS,
            Self::C => C_KEYWORDS,
        }
    }
}

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "add", "as", "async", "await", "base", "bool", "break", "byte", "case", "catch",
    "char", "checked", "class", "const", "continue", "decimal", "default", "delegate", "do",
    "double", "else", "enum", "event", "explicit", "extern", "false", "file", "finally", "fixed",
    "float", "for", "foreach", "get", "goto", "if", "implicit", "in", "init", "int", "interface",
    "internal", "is", "lock", "long", "namespace", "new", "null", "object", "operator", "out",
    "override", "params", "partial", "private", "protected", "public", "readonly", "record", "ref",
    "remove", "required", "return", "sbyte", "sealed", "set", "short", "sizeof", "stackalloc",
    "static", "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint",
    "ulong", "unchecked", "unsafe", "ushort", "using", "var", "virtual", "void", "volatile",
    "when", "where", "while", "yield",
];

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
    "float", "for", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "null", "package", "private", "protected", "public", "record", "return",
    "short", "static", "super", "switch", "synchronized", "this", "throw", "throws", "true",
    "try", "var", "void", "volatile", "while",
];

const JAVASCRIPT_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "default", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "get", "if",
    "import", "in", "instanceof", "interface", "let", "new", "null", "of", "private",
    "protected", "public", "return", "set", "static", "super", "switch", "this", "throw", "true",
    "try", "typeof", "undefined", "var", "void", "while", "yield",
];

const C_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "continue", "default",
    "delete", "do", "double", "else", "enum", "explicit", "extern", "false", "float", "for",
    "friend", "if", "inline", "int", "long", "namespace", "new", "nullptr", "private",
    "protected", "public", "return", "short", "signed", "sizeof", "static", "struct", "switch",
    "template", "this", "throw", "true", "try", "typedef", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "while",
];

const PATTERN: &str = r#"(?x)
    (?P<comment> //[^\n]* | /\*(?s:.*?)\*/ )
  | (?P<pre> (?m:^[\ \t]*\#[^\n]*) )
  | (?P<string> @"(?:[^"]|"")*" | "(?:\\.|[^"\\\n])*" | '(?:\\.|[^'\\\n])*' | `(?:\\.|[^`\\])*` )
  | (?P<annotation> @[\p{L}_][\p{L}\p{N}_.]* )
  | (?P<number> 0[xX][0-9a-fA-F_]+[uUlL]* | \d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?[fFdDmMuUlL]* )
  | (?P<ident> [\p{L}_$][\p{L}\p{N}_$]* )
  | (?P<arrow> => )
  | (?P<punct> [{}()\[\];,.] )
  | (?P<op> [+\-*/%=<>!&|^~?:]+ )
"#;

const PREPROCESSOR: &str = "preprocessor";
const ANNOTATION: &str = "annotation";

/// A classified token with its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Character range.
    pub span: TextSpan,
    /// Classification.
    pub kind: ClassificationKind,
    /// Source text.
    pub text: String,
}

impl Token {
    /// Whether this is the punctuation token `text`.
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == ClassificationKind::Punctuation && self.text == text
    }

    /// Whether the token carries no syntax (comments, preprocessor lines).
    pub fn is_trivia(&self) -> bool {
        match &self.kind {
            ClassificationKind::Comment => true,
            ClassificationKind::Other(name) => name == PREPROCESSOR,
            _ => false,
        }
    }

    /// Whether this is a Java-style `@Annotation`.
    pub fn is_annotation(&self) -> bool {
        matches!(&self.kind, ClassificationKind::Other(name) if name == ANNOTATION)
    }

    /// The token as a classification span.
    pub fn classification(&self) -> ClassificationSpan {
        ClassificationSpan {
            span: self.span,
            kind: self.kind.clone(),
        }
    }
}

/// Tokenizer for one [`Language`].
#[derive(Debug, Clone)]
pub struct Lexer {
    regex: Regex,
    keywords: FxHashSet<&'static str>,
}

impl Lexer {
    /// Build the lexer for `language`.
    pub fn new(language: Language) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(PATTERN)?,
            keywords: language.keywords().iter().copied().collect(),
        })
    }

    /// Tokenize `text`. Whitespace and unrecognised characters produce no token.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut byte_cursor = 0;
        let mut char_cursor = 0;

        for caps in self.regex.captures_iter(text) {
            let Some(m) = caps.get(0) else {
                continue;
            };
            let start = char_cursor + text[byte_cursor..m.start()].chars().count();
            let len = m.as_str().chars().count();
            byte_cursor = m.end();
            char_cursor = start + len;
            if len == 0 {
                continue;
            }

            let kind = if caps.name("comment").is_some() {
                ClassificationKind::Comment
            } else if caps.name("pre").is_some() {
                ClassificationKind::Other(PREPROCESSOR.to_string())
            } else if caps.name("string").is_some() {
                ClassificationKind::String
            } else if caps.name("annotation").is_some() {
                ClassificationKind::Other(ANNOTATION.to_string())
            } else if caps.name("number").is_some() {
                ClassificationKind::Number
            } else if caps.name("ident").is_some() {
                if self.keywords.contains(m.as_str()) {
                    ClassificationKind::Keyword
                } else {
                    ClassificationKind::Identifier
                }
            } else if caps.name("punct").is_some() {
                ClassificationKind::Punctuation
            } else {
                ClassificationKind::Operator
            };

            tokens.push(Token {
                span: TextSpan::with_len(start, len),
                kind,
                text: m.as_str().to_string(),
            });
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(tokens: &[Token]) -> Vec<(&str, ClassificationKind)> {
        tokens
            .iter()
            .map(|t| (t.text.as_str(), t.kind.clone()))
            .collect()
    }

    #[test]
    fn test_tokenize_method_header() {
        let lexer = Lexer::new(Language::CSharp).unwrap();
        let tokens = lexer.tokenize("public void Run(int x) {");
        assert_eq!(
            kinds(&tokens),
            vec![
                ("public", ClassificationKind::Keyword),
                ("void", ClassificationKind::Keyword),
                ("Run", ClassificationKind::Identifier),
                ("(", ClassificationKind::Punctuation),
                ("int", ClassificationKind::Keyword),
                ("x", ClassificationKind::Identifier),
                (")", ClassificationKind::Punctuation),
                ("{", ClassificationKind::Punctuation),
            ]
        );
    }

    #[test]
    fn test_arrow_is_one_operator() {
        let lexer = Lexer::new(Language::CSharp).unwrap();
        let tokens = lexer.tokenize("(a)=>a >= 1");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["(", "a", ")", "=>", "a", ">=", "1"]);
        assert_eq!(tokens[3].kind, ClassificationKind::Operator);
    }

    #[test]
    fn test_comments_and_strings_hide_braces() {
        let lexer = Lexer::new(Language::CSharp).unwrap();
        let text = "/* { */ var s = \"}\"; // {\n#region x {\n";
        let tokens = lexer.tokenize(text);
        assert!(!tokens.iter().any(|t| t.is_punct("{") || t.is_punct("}")));
        assert_eq!(tokens[0].kind, ClassificationKind::Comment);
        assert!(tokens.iter().any(|t| t.kind == ClassificationKind::String));
        assert!(
            tokens
                .iter()
                .any(|t| t.kind == ClassificationKind::Other("preprocessor".to_string()))
        );
    }

    #[test]
    fn test_offsets_are_characters() {
        let lexer = Lexer::new(Language::Java).unwrap();
        let tokens = lexer.tokenize("// ü\nif (ä) {");
        let brace = tokens.iter().find(|t| t.is_punct("{")).unwrap();
        assert_eq!(brace.span, TextSpan::new(12, 13));
        let ident = tokens.iter().find(|t| t.text == "ä").unwrap();
        assert_eq!(ident.span, TextSpan::new(9, 10));
    }

    #[test]
    fn test_annotation_is_not_trivia() {
        let lexer = Lexer::new(Language::Java).unwrap();
        let tokens = lexer.tokenize("@Override\n@SuppressWarnings(\"x\") void f()");
        assert!(tokens[0].is_annotation());
        assert!(!tokens[0].is_trivia());
        assert_eq!(tokens[1].text, "@SuppressWarnings");
        assert_eq!(tokens[3].kind, ClassificationKind::String);
    }

    #[test]
    fn test_verbatim_string_spans_lines() {
        let lexer = Lexer::new(Language::CSharp).unwrap();
        let tokens = lexer.tokenize("var s = @\"a\n}\"\"\";");
        assert_eq!(tokens[3].kind, ClassificationKind::String);
        assert_eq!(tokens[3].text, "@\"a\n}\"\"\"");
        assert!(tokens[4].is_punct(";"));
    }

    #[test]
    fn test_language_keywords_differ() {
        let java = Lexer::new(Language::Java).unwrap().tokenize("synchronized");
        let csharp = Lexer::new(Language::CSharp).unwrap().tokenize("synchronized");
        assert_eq!(java[0].kind, ClassificationKind::Keyword);
        assert_eq!(csharp[0].kind, ClassificationKind::Identifier);
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("CS"), Some(Language::CSharp));
        assert_eq!(Language::from_extension("tsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("rs"), None);
        assert_eq!(Language::C.content_type(), "c/c++");
    }
}
