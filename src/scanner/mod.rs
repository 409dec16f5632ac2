//! Header scanning driver: walks a declaration-only header line by line and
//! produces the stub definitions for one output unit.
//!
//! The cursor moves through four kinds of territory:
//! - trivia: blank lines, comments, preprocessor directives
//! - namespace openers and closers, echoed verbatim into the output
//! - class openers, which feed the scope stack; other braced regions are
//!   skipped with plain brace accounting
//! - declaration candidates, extracted and normalized into stubs
//!
//! Scanning is strict about nesting: a scope still open at end of file, or a
//! closing brace with nothing to close, fails the whole file.

pub mod classify;
pub mod extract;
pub mod normalize;
pub mod scope;

use crate::config::Config;
use crate::emit::{EmitOutcome, Emitter};
use crate::model::{ScanStats, ScopeFrame, StubDefinition};
use crate::synth;
use anyhow::{bail, Result};
use classify::LineKind;
use extract::Extraction;
use scope::ScopeStack;
use tracing::{debug, warn};

/// Result of scanning one header.
#[derive(Debug)]
pub struct ScanOutput {
    /// Namespace echoes and stub definitions, in declaration order. The
    /// include prologue and any trailer are the caller's business.
    pub body: String,
    pub stats: ScanStats,
}

pub fn scan(cfg: &Config, input: &str) -> Result<ScanOutput> {
    Scanner::new(cfg, input).run()
}

/// A template preamble waiting for the construct it belongs to.
struct Pending {
    text: String,
    start: usize,
}

struct Scanner<'a> {
    cfg: &'a Config,
    lines: Vec<&'a str>,
    idx: usize,
    scopes: ScopeStack,
    pending_template: Option<Pending>,
    emitter: Emitter,
    out: String,
    stats: ScanStats,
}

impl<'a> Scanner<'a> {
    fn new(cfg: &'a Config, input: &'a str) -> Self {
        Scanner {
            cfg,
            lines: input.lines().collect(),
            idx: 0,
            scopes: ScopeStack::default(),
            pending_template: None,
            emitter: Emitter::default(),
            out: String::new(),
            stats: ScanStats::default(),
        }
    }

    fn run(mut self) -> Result<ScanOutput> {
        while self.idx < self.lines.len() {
            let line = self.lines[self.idx];
            match classify::classify(line, self.cfg) {
                LineKind::Blank | LineKind::LineComment => self.idx += 1,
                LineKind::BlockCommentStart => self.skip_block_comment()?,
                LineKind::Directive => self.skip_directive(),
                LineKind::PureVirtual => self.idx += 1,
                // Inside a skipped region only braces matter.
                _ if self.scopes.in_block() => self.brace_line(line)?,
                LineKind::NamespaceOpen => {
                    self.out.push_str(line);
                    self.out.push_str("\n\n");
                    self.scopes.push(ScopeFrame::Namespace {
                        line: self.idx + 1,
                    });
                    self.pending_template = None;
                    self.idx += 1;
                }
                LineKind::TemplateStart => self.take_template()?,
                LineKind::ClassOpen { name } => self.open_class(name)?,
                LineKind::Brace => {
                    self.pending_template = None;
                    self.brace_line(line)?;
                }
                LineKind::Candidate => self.candidate()?,
            }
        }
        if let Some(frame) = self.scopes.innermost() {
            bail!("unbalanced scopes at end of file: {}", frame.describe());
        }
        Ok(ScanOutput {
            body: self.out,
            stats: self.stats,
        })
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.idx;
        loop {
            if classify::is_block_comment_end(self.lines[self.idx]) {
                self.idx += 1;
                return Ok(());
            }
            self.idx += 1;
            if self.idx >= self.lines.len() {
                bail!("block comment starting at line {} never closes", start + 1);
            }
        }
    }

    fn skip_directive(&mut self) {
        while self.idx < self.lines.len() && classify::has_continuation(self.lines[self.idx]) {
            self.idx += 1;
        }
        self.idx += 1;
    }

    fn take_template(&mut self) -> Result<()> {
        let start = self.idx;
        let mut text = String::new();
        loop {
            let line = self.lines[self.idx];
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(line);
            if classify::is_template_end(line) {
                break;
            }
            self.idx += 1;
            if self.idx >= self.lines.len() {
                bail!(
                    "template parameter list starting at line {} never closes",
                    start + 1
                );
            }
        }
        self.idx += 1;
        self.pending_template = Some(Pending { text, start });
        Ok(())
    }

    fn open_class(&mut self, name: String) -> Result<()> {
        let start = self.idx;
        let template = self.pending_template.take().map(|p| p.text);
        self.scopes.push(ScopeFrame::Class {
            name,
            template,
            line: start + 1,
        });
        while !self.lines[self.idx].contains('{') {
            self.idx += 1;
            if self.idx >= self.lines.len() {
                bail!("class declared at line {} never opens its body", start + 1);
            }
        }
        self.idx += 1;
        Ok(())
    }

    /// Brace accounting for one line: `{` opens a skipped block, `}` closes
    /// the innermost frame. A namespace closer is echoed to the output.
    fn brace_line(&mut self, line: &str) -> Result<()> {
        let mut echoed = false;
        for ch in line.chars() {
            match ch {
                '{' => self.scopes.push(ScopeFrame::Block {
                    line: self.idx + 1,
                }),
                '}' => match self.scopes.pop() {
                    Some(ScopeFrame::Namespace { .. }) => {
                        if !echoed {
                            self.out.push_str(line);
                            self.out.push_str("\n\n");
                            echoed = true;
                        }
                    }
                    Some(_) => {}
                    None => bail!("unmatched `}}` at line {}", self.idx + 1),
                },
                _ => {}
            }
        }
        self.idx += 1;
        Ok(())
    }

    fn candidate(&mut self) -> Result<()> {
        let anchor = self.pending_template.as_ref().map(|p| p.start);
        match extract::extract(&self.lines, self.idx, anchor)? {
            Extraction::None { next } => {
                self.pending_template = None;
                self.idx = next;
            }
            Extraction::InlineBody { opens_block, next } => {
                if opens_block {
                    self.scopes.push(ScopeFrame::Block { line: next });
                }
                self.pending_template = None;
                self.idx = next;
            }
            Extraction::Skipped { reason, next } => {
                debug!("declaration at line {} skipped: {reason:?}", self.idx + 1);
                self.pending_template = None;
                self.idx = next;
            }
            Extraction::Declaration { raw, next } => {
                let pending = self.pending_template.take();
                let method_template = pending.as_ref().map(|p| p.text.as_str());
                match normalize::normalize(&raw, &self.scopes, method_template, self.cfg) {
                    Some(sig) => {
                        let (body, missed) = synth::body_block(self.cfg, &sig);
                        if missed {
                            warn!(
                                "unresolved return type `{}` for `{}`",
                                sig.return_type,
                                sig.dedup_key()
                            );
                            self.stats.unresolved += 1;
                        }
                        let def = StubDefinition {
                            comment: raw.leading_comment.clone(),
                            signature: sig,
                            body,
                        };
                        match self.emitter.emit(&mut self.out, &def) {
                            EmitOutcome::Written => {
                                debug!("stub for `{}`", def.signature.dedup_key());
                                self.stats.emitted += 1;
                            }
                            EmitOutcome::SkippedDuplicate => {
                                self.stats.skipped_duplicates += 1;
                            }
                        }
                    }
                    None => {
                        warn!("no function name found in declaration at line {}", raw.line);
                    }
                }
                self.idx = next;
            }
        }
        Ok(())
    }
}
