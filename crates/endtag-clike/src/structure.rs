//! Brace structure for C-family token streams.
//!
//! The structure is a flat list of nested spans:
//!
//! - every matched `( )` and `[ ]` group,
//! - every matched `{ }` block,
//! - the construct owning each block, from its first header token to the closing brace,
//! - for `else if`, one more span starting at `else`.
//!
//! Declarations of types (and `switch`) own their braces directly: they get the construct span
//! but no separate block span. Comments and preprocessor lines are skipped, so braces inside them
//! never count.

use crate::lexer::Token;
use endtag_core::{ClassificationKind, NestedSpanNavigator, TextSpan};
use tracing::trace;

/// Keywords that always begin a statement. The header walk never goes past them.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "try", "catch", "finally", "lock",
    "synchronized", "using", "case",
];

/// Keywords whose declaration contains its braces without a nested block.
const TYPE_KEYWORDS: &[&str] = &[
    "class", "struct", "interface", "enum", "namespace", "record", "union", "switch",
];

/// Words that may precede a type keyword.
const DECLARATION_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "sealed", "abstract", "partial",
    "readonly", "ref", "unsafe", "file", "final", "export", "default", "new", "extern", "typedef",
    "strictfp",
];

/// A comma before these markers belongs to a base or constraint list, not to an argument list.
const BASE_LIST_MARKERS: &[&str] = &[
    "class", "struct", "interface", "record", "enum", "extends", "implements", "where",
];

/// Build the structural spans for `tokens`.
pub fn build_structure(tokens: &[Token]) -> Vec<TextSpan> {
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.is_trivia()).collect();
    let mut pair: Vec<Option<usize>> = vec![None; significant.len()];
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();

    for (i, token) in significant.iter().enumerate() {
        if token.kind != ClassificationKind::Punctuation {
            continue;
        }
        let opener = match token.text.as_str() {
            "(" | "[" | "{" => {
                open.push(i);
                continue;
            }
            ")" => "(",
            "]" => "[",
            "}" => "{",
            _ => continue,
        };

        // Unclosed openers between here and the match are abandoned.
        let Some(depth) = open.iter().rposition(|&o| significant[o].text == opener) else {
            trace!(target: "endtag.clike", offset = token.span.start, "unmatched_closer");
            continue;
        };
        let o = open[depth];
        open.truncate(depth);
        pair[o] = Some(i);
        pair[i] = Some(o);

        let span = TextSpan::new(significant[o].span.start, token.span.end);
        if opener != "{" {
            spans.push(span);
            continue;
        }

        let start = construct_start(&significant, &pair, o);
        if start == o {
            spans.push(span);
            continue;
        }
        spans.push(TextSpan::new(significant[start].span.start, token.span.end));
        if !is_type_declaration(&significant[start..o]) {
            spans.push(span);
        }
        if start > 0
            && significant[start].text == "if"
            && significant[start - 1].text == "else"
            && significant[start - 1].kind == ClassificationKind::Keyword
        {
            spans.push(TextSpan::new(significant[start - 1].span.start, token.span.end));
        }
    }

    spans
}

/// The navigator over [`build_structure`].
pub fn navigator(tokens: &[Token]) -> NestedSpanNavigator {
    NestedSpanNavigator::new(build_structure(tokens))
}

/// Index of the first header token for the block opened at `open`, or `open` when the block
/// has no header.
fn construct_start(tokens: &[&Token], pair: &[Option<usize>], open: usize) -> usize {
    let mut j = open;
    let mut soft = None;
    let mut angle = 0usize;

    while j > 0 {
        let prev = tokens[j - 1];
        if prev.is_punct(")") || prev.is_punct("]") {
            match pair[j - 1] {
                Some(opener) => {
                    j = opener;
                    continue;
                }
                None => break,
            }
        }
        if ["(", "[", "{", "}", ";"].iter().any(|p| prev.is_punct(p)) {
            break;
        }
        if prev.is_punct(",") {
            if angle == 0 && soft.is_none() {
                soft = Some(j);
            }
            j -= 1;
            continue;
        }
        if prev.kind == ClassificationKind::Operator {
            if is_assignment(&prev.text) {
                break;
            }
            if prev.text.chars().all(|c| c == '>') {
                angle += prev.text.len();
            } else if prev.text.chars().all(|c| c == '<') {
                angle = angle.saturating_sub(prev.text.len());
            }
        }
        j -= 1;
        if prev.kind == ClassificationKind::Keyword
            && STATEMENT_KEYWORDS.contains(&prev.text.as_str())
        {
            break;
        }
    }

    if let Some(soft) = soft
        && !tokens[j..soft].iter().any(|t| is_base_list_marker(t))
    {
        j = soft;
    }
    skip_leading_attributes(tokens, pair, j, open)
}

fn skip_leading_attributes(
    tokens: &[&Token],
    pair: &[Option<usize>],
    mut j: usize,
    open: usize,
) -> usize {
    while j < open {
        let token = tokens[j];
        if token.is_punct("[") {
            match pair[j] {
                Some(close) if close < open => j = close + 1,
                _ => break,
            }
        } else if token.is_annotation() {
            j += 1;
            if j < open
                && tokens[j].is_punct("(")
                && let Some(close) = pair[j]
                && close < open
            {
                j = close + 1;
            }
        } else {
            break;
        }
    }
    j
}

fn is_assignment(op: &str) -> bool {
    op.ends_with('=') && !matches!(op, "==" | "!=" | "<=" | ">=" | "===" | "!==")
}

fn is_base_list_marker(token: &Token) -> bool {
    let word = matches!(
        token.kind,
        ClassificationKind::Keyword | ClassificationKind::Identifier
    );
    (word && BASE_LIST_MARKERS.contains(&token.text.as_str()))
        || (token.kind == ClassificationKind::Operator && token.text == ":")
}

fn is_type_declaration(header: &[&Token]) -> bool {
    header
        .iter()
        .find(|t| !DECLARATION_MODIFIERS.contains(&t.text.as_str()))
        .is_some_and(|t| {
            t.kind == ClassificationKind::Keyword && TYPE_KEYWORDS.contains(&t.text.as_str())
        })
}
