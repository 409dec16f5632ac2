//! Declaration extraction: reassembles a declaration that may span several
//! physical lines, decides whether it is a stubbable prototype, and captures
//! the comment block sitting above it.

use crate::model::RawDeclaration;
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Return type on the line above the declaration proper, as in
/// `int\nabc(int a, int b);`. A lone, possibly `::`-qualified identifier.
static RE_DETACHED_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:inline\s+)?[A-Za-z_]\w*(?:::\w+)*\s*$").unwrap());

/// `= 0` left at the end of a reassembled declaration.
static RE_PURE_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"=\s*0$").unwrap());

/// What became of the lines starting at the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// No declaration here; resume at `next`.
    None { next: usize },
    /// The declaration carries an inline body and needs no stub. When the
    /// body's braces stay open past the last consumed line the caller must
    /// push a block frame.
    InlineBody { opens_block: bool, next: usize },
    /// Assembled, then filtered out.
    Skipped { reason: SkipReason, next: usize },
    /// A complete prototype ready for normalization.
    Declaration { raw: RawDeclaration, next: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    Defaulted,
    Deleted,
    PureVirtual,
    TypeAlias,
}

/// Reassembles the declaration starting at `lines[start]`. `comment_anchor`
/// is the first line of the declaration's template preamble when one was
/// consumed; the comment walk starts above it.
pub fn extract(lines: &[&str], start: usize, comment_anchor: Option<usize>) -> Result<Extraction> {
    let first = lines[start];
    if !first.contains('(') {
        return Ok(Extraction::None { next: start + 1 });
    }

    let indent: String = first.chars().take_while(|c| c.is_whitespace()).collect();
    let mut text = first[indent.len()..].to_string();
    let mut cursor = start;

    // Accumulate until every parenthesis opened so far has closed. Tracking
    // depth instead of scanning for a bare `)` keeps parameters that are
    // themselves function types from ending the list early.
    while paren_depth(&text) > 0 {
        cursor += 1;
        if cursor >= lines.len() {
            bail!(
                "parameter list starting at line {} never closes",
                start + 1
            );
        }
        let continuation = lines[cursor].strip_prefix(indent.as_str()).unwrap_or(lines[cursor]);
        text.push('\n');
        text.push_str(continuation);
    }

    let next = cursor + 1;
    let close = match last_balanced_close(&text) {
        Some(idx) => idx,
        None => return Ok(Extraction::None { next }),
    };
    let tail = &text[close + 1..];

    if tail.contains('{') {
        let opens_block = tail.matches('{').count() > tail.matches('}').count();
        return Ok(Extraction::InlineBody { opens_block, next });
    }
    let semi = match tail.find(';') {
        Some(idx) => idx,
        None => return Ok(Extraction::None { next }),
    };
    let mut decl = text[..close + 1 + semi].to_string();

    // Reattach a return type stranded on the previous line.
    if start > 0 && RE_DETACHED_TYPE.is_match(lines[start - 1]) {
        decl = format!("{}\n{}", lines[start - 1].trim(), decl);
    }

    let trimmed = decl.trim();
    if RE_PURE_TAIL.is_match(trimmed) {
        return Ok(Extraction::Skipped {
            reason: SkipReason::PureVirtual,
            next,
        });
    }
    if trimmed.ends_with("default") {
        return Ok(Extraction::Skipped {
            reason: SkipReason::Defaulted,
            next,
        });
    }
    if trimmed.ends_with("delete") {
        return Ok(Extraction::Skipped {
            reason: SkipReason::Deleted,
            next,
        });
    }
    if trimmed.starts_with("typedef") || trimmed.starts_with("using ") {
        return Ok(Extraction::Skipped {
            reason: SkipReason::TypeAlias,
            next,
        });
    }

    let line = start + 1;
    let leading_comment = leading_comment(lines, comment_anchor.unwrap_or(start));
    Ok(Extraction::Declaration {
        raw: RawDeclaration {
            text: decl,
            leading_comment,
            line,
        },
        next,
    })
}

fn paren_depth(text: &str) -> i32 {
    let mut depth = 0i32;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Byte index of the `)` that closes the outermost group, i.e. the last
/// position where the running depth returns to zero.
fn last_balanced_close(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut close = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                }
            }
            _ => {}
        }
    }
    close
}

/// Collects the comment block directly above `anchor`: either a `/*...*/`
/// block ending on the line above, or a contiguous run of `//` lines. Lines
/// are dedented; the result ends with a newline when non-empty.
fn leading_comment(lines: &[&str], anchor: usize) -> String {
    if anchor == 0 {
        return String::new();
    }
    let mut collected: Vec<String> = Vec::new();
    let mut k = anchor - 1;
    if lines[k].trim_end().ends_with("*/") {
        loop {
            let line = lines[k];
            collected.push(line.trim_start().to_string());
            if line.trim_start().starts_with("/*") {
                break;
            }
            if k == 0 {
                // Opening never found; drop the fragment.
                return String::new();
            }
            k -= 1;
        }
    } else {
        loop {
            let line = lines[k];
            if !line.trim_start().starts_with("//") {
                break;
            }
            collected.push(line.trim_start().to_string());
            if k == 0 {
                break;
            }
            k -= 1;
        }
    }
    if collected.is_empty() {
        return String::new();
    }
    collected.reverse();
    let mut out = collected.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<&str> {
        input.lines().collect()
    }

    #[test]
    fn single_line_declaration() {
        let src = lines("  Status Check() const;");
        match extract(&src, 0, None).unwrap() {
            Extraction::Declaration { raw, next } => {
                assert_eq!(raw.text, "Status Check() const");
                assert_eq!(raw.line, 1);
                assert_eq!(next, 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn multi_line_parameters_reassemble_into_one_declaration() {
        let src = lines("  Status Normalize(const OpDef &def,\n                     int64_t count,\n                     bool strict);");
        match extract(&src, 0, None).unwrap() {
            Extraction::Declaration { raw, next } => {
                assert!(raw.text.starts_with("Status Normalize(const OpDef &def,"));
                assert!(raw.text.ends_with("bool strict)"));
                assert_eq!(raw.text.lines().count(), 3);
                assert_eq!(next, 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn function_typed_parameter_does_not_end_the_list_early() {
        let src = lines("  void Register(const std::function<void(int)> &cb,\n                int priority);");
        match extract(&src, 0, None).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert!(raw.text.ends_with("int priority)"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unterminated_parameter_list_is_fatal() {
        let src = lines("  Status Broken(int a,\n                int b,");
        let err = extract(&src, 0, None).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn inline_bodies_are_not_declarations() {
        let src = lines("  bool Ready(int a,\n             int b) {\n    return a < b;\n  }");
        match extract(&src, 0, None).unwrap() {
            Extraction::InlineBody { opens_block, next } => {
                assert!(opens_block);
                assert_eq!(next, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn braced_default_argument_is_still_a_declaration() {
        let src = lines("  void Init(std::vector<int> v = {});");
        match extract(&src, 0, None).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert!(raw.text.ends_with("= {})"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn filtered_declarations() {
        let cases: &[(&str, SkipReason)] = &[
            ("  OpDef &operator=(const OpDef &) = delete;", SkipReason::Deleted),
            ("  OpDef(const OpDef &) = default;", SkipReason::Defaulted),
            ("  virtual Status Run(int a,\n                     int b) = 0;", SkipReason::PureVirtual),
            ("typedef void (*Callback)(int);", SkipReason::TypeAlias),
            ("using Fn = OpDef (*)(int);", SkipReason::TypeAlias),
        ];
        for (src, expected) in cases {
            let src = lines(src);
            match extract(&src, 0, None).unwrap() {
                Extraction::Skipped { reason, .. } => assert_eq!(reason, *expected, "for {src:?}"),
                other => panic!("unexpected for {src:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn detached_return_type_is_reattached() {
        let src = lines("inline ge::graphStatus\nGetVersion(int &major);");
        match extract(&src, 1, None).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert_eq!(raw.text, "inline ge::graphStatus\nGetVersion(int &major)");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn access_specifiers_are_not_declarations() {
        let src = lines(" public:");
        assert_eq!(
            extract(&src, 0, None).unwrap(),
            Extraction::None { next: 1 }
        );
    }

    #[test]
    fn line_comment_block_is_captured_and_dedented() {
        let src = lines("  // Computes the checksum.\n  // Stateless.\n  uint32_t Checksum() const;");
        match extract(&src, 2, None).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert_eq!(raw.leading_comment, "// Computes the checksum.\n// Stateless.\n");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn block_comment_is_captured_above_the_anchor() {
        let src = lines("  /**\n   * Registers the op.\n   */\n  template <typename T>\n  Status Register(const T &op);");
        match extract(&src, 4, Some(3)).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert_eq!(raw.leading_comment, "/**\n* Registers the op.\n*/\n");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_comment_when_line_above_is_code() {
        let src = lines("  int64_t count_;\n  int64_t Count();");
        match extract(&src, 1, None).unwrap() {
            Extraction::Declaration { raw, .. } => {
                assert!(raw.leading_comment.is_empty());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
