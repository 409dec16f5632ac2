//! Line classification: decides what the scanner does with the line under
//! the cursor. Exactly one kind is returned per line; priority runs from
//! trivia down to declaration candidate.

use crate::config::Config;
use regex::Regex;
use std::sync::LazyLock;

// -- Patterns -----------------------------------------------------------------

/// Single-line pure virtual declaration. Multi-line pure virtuals are caught
/// later, after parameter-list reassembly.
static RE_PURE_VIRTUAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*virtual\s+(?:const\s+)?[\w:]+[ \t&*]+[\w:~]+\s*\([^()]*\)\s*(?:const\s*)?=\s*0\s*;\s*$")
        .unwrap()
});

/// Namespace opener with the brace on the same line. Covers `inline` and
/// nested (`namespace a::b`) forms; aliases carry `;` and never match.
static RE_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:inline\s+)?namespace\b[^;{}]*\{").unwrap());

static RE_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*template\b").unwrap());

/// Class or struct opener. An all-caps export macro may sit between the
/// keyword and the name; a trailing `<` marks an explicit specialization
/// whose arguments are completed by `class_opener`.
static RE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:class|struct)\s+(?:[A-Z][A-Z0-9_]*\s+)?([A-Za-z_]\w*<?)").unwrap()
});

// -- Classification -----------------------------------------------------------

/// What the scanner should do with one line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    LineComment,
    BlockCommentStart,
    /// Preprocessor directive, possibly continued with trailing backslashes.
    Directive,
    PureVirtual,
    NamespaceOpen,
    TemplateStart,
    ClassOpen { name: String },
    /// Carries `{` or `}` and matched nothing above: brace accounting only.
    Brace,
    /// Possibly the first line of a declaration.
    Candidate,
}

pub fn classify(line: &str, cfg: &Config) -> LineKind {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with("//") {
        return LineKind::LineComment;
    }
    if trimmed.starts_with("/*") {
        return LineKind::BlockCommentStart;
    }
    if trimmed.starts_with('#') {
        return LineKind::Directive;
    }
    if RE_PURE_VIRTUAL.is_match(line) {
        return LineKind::PureVirtual;
    }
    if RE_NAMESPACE.is_match(line) {
        return LineKind::NamespaceOpen;
    }
    if RE_TEMPLATE.is_match(line) {
        return LineKind::TemplateStart;
    }
    if let Some(name) = class_opener(line, cfg) {
        return LineKind::ClassOpen { name };
    }
    if line.contains('{') || line.contains('}') {
        return LineKind::Brace;
    }
    LineKind::Candidate
}

/// Extracts the class name from an opener line, or `None` when the line is a
/// forward declaration or no opener at all. Explicit specialization arguments
/// (`class Foo<int>`) are completed by balancing angle brackets.
pub fn class_opener(line: &str, cfg: &Config) -> Option<String> {
    let stripped = cfg.visibility.replace_all(line, "");
    if stripped.contains(';') {
        return None;
    }
    let caps = RE_CLASS.captures(&stripped)?;
    let m = caps.get(1)?;
    let mut name = m.as_str().to_string();
    if name.ends_with('<') {
        let rest = &stripped[m.end()..];
        let mut depth = 1usize;
        let mut taken = rest.len();
        for (i, ch) in rest.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        taken = i + ch.len_utf8();
                        break;
                    }
                }
                _ => {}
            }
        }
        name.push_str(&rest[..taken]);
    }
    Some(name)
}

/// True when a block comment closes on this line.
pub fn is_block_comment_end(line: &str) -> bool {
    line.trim_end().ends_with("*/")
}

/// True when a template preamble's parameter list closes on this line.
pub fn is_template_end(line: &str) -> bool {
    line.trim_end().ends_with('>')
}

/// True when a preprocessor line continues onto the next one.
pub fn has_continuation(line: &str) -> bool {
    line.trim_end().ends_with('\\')
}
