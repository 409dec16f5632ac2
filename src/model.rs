//! Data model shared across the scanning pipeline: scope frames, assembled
//! declarations, normalized signatures, and synthesized stubs.

/// One open scope on the tracker stack.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeFrame {
    /// `namespace x {` — the opener is echoed to output, and the matching
    /// closer is echoed on pop.
    Namespace { line: usize },
    /// `class X {` / `struct X {` together with the template preamble that
    /// immediately preceded it, if any.
    Class {
        name: String,
        template: Option<String>,
        line: usize,
    },
    /// Any other braced region whose contents are skipped wholesale:
    /// function bodies, enums, `extern "C"` blocks.
    Block { line: usize },
}

impl ScopeFrame {
    /// Human-readable description for end-of-file diagnostics.
    pub fn describe(&self) -> String {
        match self {
            ScopeFrame::Namespace { line } => format!("namespace opened at line {line}"),
            ScopeFrame::Class { name, line, .. } => {
                format!("class `{name}` opened at line {line}")
            }
            ScopeFrame::Block { line } => format!("block opened at line {line}"),
        }
    }
}

/// One declaration's source text, reassembled across physical lines.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawDeclaration {
    /// From the first token up to (not including) the terminating `;`.
    /// Inner line breaks are preserved; shared leading indentation is not.
    pub text: String,
    /// Comment block found directly above the declaration: a contiguous run
    /// of `//` lines or a single `/*...*/` block. Ends with a newline when
    /// non-empty.
    pub leading_comment: String,
    /// 1-based source line of the declaration's first line.
    pub line: usize,
}

/// A normalized declaration ready for body synthesis and emission.
#[derive(Debug, Default, Clone)]
pub struct Signature {
    /// Emission-ready header: template preamble lines plus the qualified
    /// declaration, possibly spanning several lines. No trailing newline.
    pub text: String,
    /// Normalized return type: leading `const` dropped, `&`/`*` attached to
    /// the type. Empty for constructors and destructors.
    pub return_type: String,
    /// Innermost enclosing class without template arguments; empty for free
    /// functions.
    pub class_name: String,
    /// Enclosing class chain (with template arguments) plus function name,
    /// `::`-joined; just the name for free functions.
    pub qualified_name: String,
    pub func_name: String,
    /// Text between the parameter parens, defaults stripped.
    pub parameters: String,
    /// Merged class + method template preamble placed above the header.
    pub template_preamble: String,
    pub is_template: bool,
    /// Constructor or destructor: stubs carry no return statement.
    pub is_ctor_like: bool,
}

impl Signature {
    /// Deduplication key: qualified name plus parameter list, whitespace
    /// collapsed. The return type is deliberately excluded so that layout
    /// differences between duplicate declarations cannot split the key.
    pub fn dedup_key(&self) -> String {
        let raw = format!("{}({})", self.qualified_name, self.parameters);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// A synthesized stub ready to be written.
#[derive(Debug, Default, Clone)]
pub struct StubDefinition {
    pub signature: Signature,
    /// Body block: optional constructor prologue, braces, indented
    /// statements, trailing blank line.
    pub body: String,
    pub comment: String,
}

/// Counters reported after scanning one file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    pub emitted: usize,
    pub skipped_duplicates: usize,
    pub unresolved: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_collapses_layout() {
        let a = Signature {
            qualified_name: "OpDef::SetType".to_string(),
            parameters: "const char *type,\n    int priority".to_string(),
            ..Signature::default()
        };
        let b = Signature {
            qualified_name: "OpDef::SetType".to_string(),
            parameters: "const char *type, int priority".to_string(),
            ..Signature::default()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_ignores_return_type() {
        let a = Signature {
            return_type: "int".to_string(),
            qualified_name: "Baz::Count".to_string(),
            ..Signature::default()
        };
        let b = Signature {
            return_type: "int64_t".to_string(),
            qualified_name: "Baz::Count".to_string(),
            ..Signature::default()
        };
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn frame_descriptions_name_the_construct() {
        let frame = ScopeFrame::Class {
            name: "OpDef".to_string(),
            template: None,
            line: 12,
        };
        assert_eq!(frame.describe(), "class `OpDef` opened at line 12");
    }
}
