//! A toy host for integration tests: a character-level classifier and a brace-only structure
//! where every block is nested in a "construct" starting after the previous `;`, `{` or `}`.

#![allow(dead_code)]

use endtag_core::{
    ClassificationIndex, ClassificationKind, ClassificationSpan, DocumentServices,
    NestedSpanNavigator, RopeSnapshot, TextSpan,
};
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "namespace", "class", "public", "private", "int", "void", "return", "if", "else", "while",
    "get", "set",
];

pub const SAMPLE: &str = "namespace App
{
    public class Widget
    {
        public int Count
        {
            get { return 1; }
        }

        public void Run(int x)
        {
            if (x > 0)
            {
                x = 1;
            }
            else if (x < 0)
            {
                x = 2;
            }
            while (x > 0)
            {
                x--;
            }
        }
    }
}
";

pub const SAMPLE_HEADERS: &[&str] = &[
    "public int Count",
    "if (x > 0)",
    "else if (x < 0)",
    "while (x > 0)",
    "public void Run(int x)",
    "public class Widget",
    "namespace App",
];

pub fn toy_services(text: &str, version: u64) -> DocumentServices {
    let chars: Vec<char> = text.chars().collect();
    DocumentServices::new(
        Arc::new(RopeSnapshot::new(text, version)),
        Arc::new(ClassificationIndex::new(classify(&chars))),
        Arc::new(NestedSpanNavigator::new(structure(&chars))),
    )
}

fn classify(chars: &[char]) -> Vec<ClassificationSpan> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            let kind = if KEYWORDS.contains(&word.as_str()) {
                ClassificationKind::Keyword
            } else {
                ClassificationKind::Identifier
            };
            tokens.push(ClassificationSpan::new(start, i - start, kind));
            continue;
        }
        if c == '=' && chars.get(i + 1) == Some(&'>') {
            tokens.push(ClassificationSpan::new(i, 2, ClassificationKind::Operator));
            i += 2;
            continue;
        }
        let kind = if "{}()[];,".contains(c) {
            ClassificationKind::Punctuation
        } else {
            ClassificationKind::Operator
        };
        tokens.push(ClassificationSpan::new(i, 1, kind));
        i += 1;
    }
    tokens
}

fn structure(chars: &[char]) -> Vec<TextSpan> {
    let mut spans = vec![TextSpan::new(0, chars.len())];
    let mut open = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '{' => open.push(i),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push(TextSpan::new(start, i + 1));
                    let construct = construct_start(chars, start);
                    if construct < start {
                        spans.push(TextSpan::new(construct, i + 1));
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

fn construct_start(chars: &[char], open: usize) -> usize {
    let mut j = open;
    while j > 0 && !matches!(chars[j - 1], ';' | '{' | '}') {
        j -= 1;
    }
    while j < open && chars[j].is_whitespace() {
        j += 1;
    }
    j
}
