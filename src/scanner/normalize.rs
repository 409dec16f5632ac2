//! Signature normalization: turns a reassembled prototype into an
//! emission-ready definition header. Strips declaration-only keywords and
//! default arguments, qualifies members with their class chain (merging
//! template arguments), and extracts the normalized return type driving body
//! synthesis.

use crate::config::Config;
use crate::model::{RawDeclaration, Signature};
use crate::scanner::scope::ScopeStack;
use regex::Regex;
use std::sync::LazyLock;

static RE_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:virtual|explicit|friend|static)\s+").unwrap());

static RE_OVERRIDE_FINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?:override|final)\b").unwrap());

static RE_FRIEND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfriend\s").unwrap());

static RE_OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\boperator\b").unwrap());

/// `template <>` once dedented: an explicit specialization preamble that
/// carries no parameters into the qualification.
static RE_EMPTY_ANGLES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\s*>").unwrap());

/// Normalizes one declaration against the current scopes. `method_template`
/// is the preamble consumed immediately before the declaration, if any.
/// `None` means no function name could be located; the caller reports it.
pub fn normalize(
    raw: &RawDeclaration,
    scopes: &ScopeStack,
    method_template: Option<&str>,
    cfg: &Config,
) -> Option<Signature> {
    // Friendship is decided on the raw text, before the keyword strip
    // removes the evidence.
    let is_friend = RE_FRIEND.is_match(&raw.text);

    let mut line = cfg.visibility.replace_all(&raw.text, "").into_owned();
    line = RE_OVERRIDE_FINAL.replace_all(&line, "").into_owned();
    line = RE_KEYWORD.replace_all(&line, "").into_owned();
    line = strip_default_args(&line);

    let found = find_function_name(&line)?;
    let close = matching_paren(&line, found.param_open)?;
    // `(*name)(..)` declarators are variables, not prototypes.
    if line[close + 1..].trim_start().starts_with('(') {
        return None;
    }
    let params = line[found.param_open + 1..close].to_string();
    let head = line[..found.insert_at].to_string();

    let method_preamble = method_template
        .map(normalize_preamble)
        .filter(|p| !p.is_empty());

    let chain = scopes.class_chain();
    let is_member = !chain.is_empty() && !is_friend;

    let mut preamble = String::new();
    let mut text;
    let return_type;
    let qualified_name;
    let class_name;
    let is_ctor_like;

    if is_member {
        let mut qual = String::new();
        for (name, template) in &chain {
            qual.push_str(name);
            if !name.contains('<') {
                if let Some(t) = template {
                    let norm = normalize_preamble(t);
                    if !RE_EMPTY_ANGLES.is_match(&norm) {
                        qual.push_str(&template_args(&norm));
                    }
                }
            }
            qual.push_str("::");
        }
        for (_, template) in &chain {
            if let Some(t) = template {
                let norm = normalize_preamble(t);
                if !RE_EMPTY_ANGLES.is_match(&norm) {
                    preamble.push_str(&norm);
                    preamble.push('\n');
                }
            }
        }
        if let Some(p) = &method_preamble {
            preamble.push_str(p);
            preamble.push('\n');
        }

        let candidate = format!(
            "{}{}{}",
            &line[..found.insert_at],
            qual,
            &line[found.insert_at..]
        );
        text = if candidate.len() >= cfg.max_line_width {
            format!(
                "{}{}\n{}",
                &line[..found.insert_at],
                qual,
                &line[found.insert_at..]
            )
        } else {
            candidate
        };
        text = format!("{preamble}{text}");
        for (re, rep) in cfg.type_rewrites {
            text = re.replace_all(&text, *rep).into_owned();
        }

        let bare = chain
            .last()
            .map(|&(name, _)| name.split('<').next().unwrap_or(name))
            .unwrap_or_default();
        is_ctor_like = found.name == bare || found.name.starts_with('~');
        return_type = if is_ctor_like {
            String::new()
        } else {
            normalized_return_type(&head, cfg.type_rewrites)
        };
        class_name = bare.to_string();
        qualified_name = format!("{qual}{}", found.name);
    } else {
        if let Some(p) = &method_preamble {
            preamble.push_str(p);
            preamble.push('\n');
        }
        text = format!("{preamble}{line}");
        let (type_head, qual) = split_literal_qualification(&head);
        return_type = normalized_return_type(type_head, &[]);
        class_name = qual
            .trim_end_matches(':')
            .rsplit("::")
            .next()
            .unwrap_or("")
            .to_string();
        qualified_name = format!("{qual}{}", found.name);
        is_ctor_like = false;
    }

    Some(Signature {
        text,
        return_type,
        class_name,
        qualified_name,
        func_name: found.name,
        parameters: params,
        is_template: !preamble.is_empty(),
        template_preamble: preamble,
        is_ctor_like,
    })
}

// -- Name location ------------------------------------------------------------

struct FoundName {
    /// Byte offset where the class qualification is inserted.
    insert_at: usize,
    name: String,
    /// Byte offset of the `(` opening the parameter list.
    param_open: usize,
}

/// Locates the function name and its parameter list. Operators are searched
/// first since their symbol may contain `<`, `>`, or `(` which would confuse
/// the generic scan.
fn find_function_name(text: &str) -> Option<FoundName> {
    if let Some(m) = RE_OPERATOR.find(text) {
        let after = &text[m.end()..];
        if after.trim_start().starts_with("()") {
            // operator() — its own parens come before the parameter list
            let rel = after.find("()")?;
            let name_end = m.end() + rel + 2;
            let param_open = text[name_end..].find('(').map(|i| name_end + i)?;
            return Some(FoundName {
                insert_at: m.start(),
                name: text[m.start()..name_end].to_string(),
                param_open,
            });
        }
        let rel = after.find('(')?;
        let name_end = m.end() + rel;
        return Some(FoundName {
            insert_at: m.start(),
            name: text[m.start()..name_end].trim_end().to_string(),
            param_open: name_end,
        });
    }

    let param_open = first_top_level_paren(text)?;
    let head = &text[..param_open];
    let mut name_start = None;
    let mut name_end = None;
    for (i, ch) in head.char_indices().rev() {
        if name_end.is_none() {
            if ch.is_whitespace() {
                continue;
            }
            if !is_ident_char(ch) {
                return None;
            }
            name_end = Some(i + ch.len_utf8());
            name_start = Some(i);
        } else if is_ident_char(ch) {
            name_start = Some(i);
        } else {
            break;
        }
    }
    let (start, end) = (name_start?, name_end?);
    Some(FoundName {
        insert_at: start,
        name: text[start..end].to_string(),
        param_open,
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '~'
}

/// First `(` outside any template argument list.
fn first_top_level_paren(text: &str) -> Option<usize> {
    let mut angle = 0i32;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => angle += 1,
            '>' => angle = (angle - 1).max(0),
            '(' if angle == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

// -- Default arguments --------------------------------------------------------

/// Removes default arguments from the outermost parameter list. Works per
/// parameter: an `=` at parameter depth is dropped together with its value
/// expression, up to the next top-level `,` or the closing `)`. Parameters
/// without defaults pass through untouched wherever they sit in the list.
fn strip_default_args(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut paren = 0i32;
    let mut angle = 0i32;
    let mut brace = 0i32;
    let mut bracket = 0i32;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '(' => paren += 1,
            ')' => paren -= 1,
            '<' => angle += 1,
            '>' => angle = (angle - 1).max(0),
            '{' => brace += 1,
            '}' => brace -= 1,
            '[' => bracket += 1,
            ']' => bracket -= 1,
            '=' if paren >= 1 && angle == 0 && brace == 0 && bracket == 0 => {
                while out.ends_with(' ') {
                    out.pop();
                }
                consume_default(&mut chars, Delimiter::ParamList);
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}

/// Strips defaults from a template preamble, where the list is delimited by
/// angle brackets instead of parens.
fn strip_template_defaults(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut angle = 0i32;
    let mut paren = 0i32;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '<' => angle += 1,
            '>' => angle = (angle - 1).max(0),
            '(' => paren += 1,
            ')' => paren -= 1,
            '=' if angle >= 1 && paren == 0 => {
                while out.ends_with(' ') {
                    out.pop();
                }
                consume_default(&mut chars, Delimiter::TemplateList);
                continue;
            }
            _ => {}
        }
        out.push(ch);
    }
    out
}

enum Delimiter {
    ParamList,
    TemplateList,
}

/// Advances past a default value expression, leaving the terminating `,`,
/// `)`, or `>` for the caller.
fn consume_default(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, kind: Delimiter) {
    let mut paren = 0i32;
    let mut angle = 0i32;
    let mut brace = 0i32;
    let mut bracket = 0i32;
    while let Some(&c) = chars.peek() {
        let nested = paren > 0 || angle > 0 || brace > 0 || bracket > 0;
        match c {
            '(' => paren += 1,
            ')' => {
                if paren == 0 {
                    if matches!(kind, Delimiter::ParamList) {
                        return;
                    }
                } else {
                    paren -= 1;
                }
            }
            '<' => angle += 1,
            '>' => {
                if angle == 0 {
                    if matches!(kind, Delimiter::TemplateList) {
                        return;
                    }
                } else {
                    angle -= 1;
                }
            }
            '{' => brace += 1,
            '}' => {
                if brace > 0 {
                    brace -= 1;
                }
            }
            '[' => bracket += 1,
            ']' => {
                if bracket > 0 {
                    bracket -= 1;
                }
            }
            ',' => {
                if !nested {
                    return;
                }
            }
            _ => {}
        }
        chars.next();
    }
}

// -- Template preambles -------------------------------------------------------

/// Dedents the preamble and removes its parameter defaults.
fn normalize_preamble(text: &str) -> String {
    strip_template_defaults(text.trim_start())
}

/// `template <class T, typename... Args>` → `<T, Args>`. Empty when the
/// preamble carries no parameters.
fn template_args(preamble: &str) -> String {
    let open = match preamble.find('<') {
        Some(i) => i,
        None => return String::new(),
    };
    let mut depth = 1i32;
    let mut close = preamble.len();
    for (i, ch) in preamble[open + 1..].char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    close = open + 1 + i;
                    break;
                }
            }
            _ => {}
        }
    }
    let inner = &preamble[open + 1..close];
    if inner.trim().is_empty() {
        return String::new();
    }
    let mut names = Vec::new();
    for param in split_top_level(inner) {
        let last = param
            .split_whitespace()
            .last()
            .unwrap_or(param)
            .trim_start_matches('.');
        if !last.is_empty() {
            names.push(last.to_string());
        }
    }
    format!("<{}>", names.join(", "))
}

/// Splits on commas outside any nested brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

// -- Return types -------------------------------------------------------------

/// Splits a literal `Baz::` qualifier off the head of a namespace-scope
/// redeclaration. The qualifier belongs to the name, not the return type.
fn split_literal_qualification(head: &str) -> (&str, &str) {
    if !head.ends_with("::") {
        return (head, "");
    }
    let mut cut = head
        .rfind(|c: char| c.is_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    while head[cut..].starts_with(['&', '*']) {
        cut += 1;
    }
    (&head[..cut], &head[cut..])
}

/// Everything before the function name, normalized: qualification rewrites
/// applied, leading `const` dropped, loose `&`/`*` glued onto the type.
fn normalized_return_type(head: &str, rewrites: &[(Regex, &'static str)]) -> String {
    let mut s = head.to_string();
    for (re, rep) in rewrites {
        s = re.replace_all(&s, *rep).into_owned();
    }
    let mut out: Vec<String> = Vec::new();
    for token in s.split_whitespace() {
        if out.is_empty() && token == "const" {
            continue;
        }
        if !out.is_empty() && token.chars().all(|c| c == '&' || c == '*') {
            if let Some(last) = out.last_mut() {
                last.push_str(token);
            }
            continue;
        }
        out.push(token.to_string());
    }
    out.join(" ")
}
