//! Icon categories for end tags.
//!
//! The icon is a hint about what kind of construct a block closes. It is picked from the header
//! text alone: strip leading modifiers, look the first keyword up in a static table, and fall back
//! to shape heuristics (lambda arrow, parameter list, `type name` pair).

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// `public`
    Public,
    /// `protected` (including `protected internal`)
    Protected,
    /// `internal`
    Internal,
    /// `private` (including `private protected`)
    Private,
}

/// What kind of construct a closing brace ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconCategory {
    /// `namespace` / `package` / `module`
    Namespace,
    /// `class` / `record`
    Class(Visibility),
    /// `struct`
    Struct(Visibility),
    /// `enum`
    Enum(Visibility),
    /// `interface`
    Interface(Visibility),
    /// `event` declarations with accessor bodies.
    Event(Visibility),
    /// Methods, constructors, operators and local functions.
    Method(Visibility),
    /// Properties and their `get` / `set` / `init` accessors.
    Property(Visibility),
    /// Lambdas and anonymous methods.
    Lambda,
    /// `if` / `else`
    Conditional,
    /// `switch` / `case` / `default`
    Switch,
    /// `for` / `foreach` / `while` / `do`
    Loop,
    /// `try` / `catch` / `finally`
    Exception,
    /// `using` blocks.
    Using,
    /// `lock` / `synchronized` blocks.
    Lock,
    /// No rule matched.
    Unknown,
}

impl IconCategory {
    /// Short stable name, e.g. `"method-public"` or `"loop"`.
    pub fn name(&self) -> String {
        let (base, visibility) = match self {
            Self::Namespace => ("namespace", None),
            Self::Class(v) => ("class", Some(v)),
            Self::Struct(v) => ("struct", Some(v)),
            Self::Enum(v) => ("enum", Some(v)),
            Self::Interface(v) => ("interface", Some(v)),
            Self::Event(v) => ("event", Some(v)),
            Self::Method(v) => ("method", Some(v)),
            Self::Property(v) => ("property", Some(v)),
            Self::Lambda => ("lambda", None),
            Self::Conditional => ("conditional", None),
            Self::Switch => ("switch", None),
            Self::Loop => ("loop", None),
            Self::Exception => ("exception", None),
            Self::Using => ("using", None),
            Self::Lock => ("lock", None),
            Self::Unknown => ("unknown", None),
        };
        match visibility {
            Some(Visibility::Public) => format!("{base}-public"),
            Some(Visibility::Protected) => format!("{base}-protected"),
            Some(Visibility::Internal) => format!("{base}-internal"),
            Some(Visibility::Private) => format!("{base}-private"),
            None => base.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Shape {
    Fixed(IconCategory),
    Type(fn(Visibility) -> IconCategory),
    Member(fn(Visibility) -> IconCategory),
}

const KEYWORDS: &[(&str, Shape)] = &[
    ("namespace", Shape::Fixed(IconCategory::Namespace)),
    ("package", Shape::Fixed(IconCategory::Namespace)),
    ("module", Shape::Fixed(IconCategory::Namespace)),
    ("class", Shape::Type(IconCategory::Class)),
    ("record", Shape::Type(IconCategory::Class)),
    ("struct", Shape::Type(IconCategory::Struct)),
    ("enum", Shape::Type(IconCategory::Enum)),
    ("interface", Shape::Type(IconCategory::Interface)),
    ("event", Shape::Member(IconCategory::Event)),
    ("get", Shape::Member(IconCategory::Property)),
    ("set", Shape::Member(IconCategory::Property)),
    ("init", Shape::Member(IconCategory::Property)),
    ("add", Shape::Member(IconCategory::Event)),
    ("remove", Shape::Member(IconCategory::Event)),
    ("if", Shape::Fixed(IconCategory::Conditional)),
    ("else", Shape::Fixed(IconCategory::Conditional)),
    ("switch", Shape::Fixed(IconCategory::Switch)),
    ("case", Shape::Fixed(IconCategory::Switch)),
    ("default", Shape::Fixed(IconCategory::Switch)),
    ("for", Shape::Fixed(IconCategory::Loop)),
    ("foreach", Shape::Fixed(IconCategory::Loop)),
    ("while", Shape::Fixed(IconCategory::Loop)),
    ("do", Shape::Fixed(IconCategory::Loop)),
    ("try", Shape::Fixed(IconCategory::Exception)),
    ("catch", Shape::Fixed(IconCategory::Exception)),
    ("finally", Shape::Fixed(IconCategory::Exception)),
    ("using", Shape::Fixed(IconCategory::Using)),
    ("lock", Shape::Fixed(IconCategory::Lock)),
    ("synchronized", Shape::Fixed(IconCategory::Lock)),
    ("delegate", Shape::Fixed(IconCategory::Lambda)),
    ("function", Shape::Fixed(IconCategory::Lambda)),
];

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "const",
    "readonly",
    "sealed",
    "abstract",
    "virtual",
    "override",
    "async",
    "extern",
    "unsafe",
    "new",
    "partial",
    "volatile",
    "implicit",
    "explicit",
    "required",
    "file",
    "final",
    "export",
];

fn visibility_of(word: &str) -> Option<Visibility> {
    match word {
        "public" => Some(Visibility::Public),
        "protected" => Some(Visibility::Protected),
        "internal" => Some(Visibility::Internal),
        "private" => Some(Visibility::Private),
        _ => None,
    }
}

/// `default` before a declaration (Java interface methods), as opposed to the switch label.
fn is_default_modifier(word: &str, tail: &[&str]) -> bool {
    word == "default" && tail.first().is_some_and(|next| !next.starts_with(':'))
}

fn keyword_of(word: &str) -> &str {
    let cut = word.find(['(', '[', '<', ':']).unwrap_or(word.len());
    &word[..cut]
}

fn has_balanced_parens(text: &str) -> bool {
    let mut depth = 0usize;
    let mut seen = false;
    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                seen = true;
            }
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    seen && depth == 0
}

/// Pick the icon category for a header. Total: anything unrecognised is [`IconCategory::Unknown`].
pub fn select_category(header: &str) -> IconCategory {
    let words: Vec<&str> = header.split_whitespace().collect();

    // The first explicit accessibility wins (`protected internal` -> protected).
    let mut visibility = None;
    let mut rest = words.as_slice();
    while let Some((first, tail)) = rest.split_first() {
        if !MODIFIERS.contains(first) && !is_default_modifier(first, tail) {
            break;
        }
        visibility = visibility.or_else(|| visibility_of(first));
        rest = tail;
    }

    if let Some(first) = rest.first() {
        let keyword = keyword_of(first);
        if let Some((_, shape)) = KEYWORDS.iter().find(|(k, _)| *k == keyword) {
            return match *shape {
                Shape::Fixed(category) => category,
                Shape::Type(make) => make(visibility.unwrap_or(Visibility::Internal)),
                Shape::Member(make) => make(visibility.unwrap_or(Visibility::Private)),
            };
        }
    }

    if header.contains("=>") {
        return IconCategory::Lambda;
    }
    let member_visibility = visibility.unwrap_or(Visibility::Private);
    if has_balanced_parens(header) {
        return IconCategory::Method(member_visibility);
    }
    if rest.len() == 2 {
        return IconCategory::Property(member_visibility);
    }
    IconCategory::Unknown
}
