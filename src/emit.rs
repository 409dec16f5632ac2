//! Deduplicating emitter: each signature is written at most once per output
//! unit, first declaration wins.

use crate::model::StubDefinition;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmitOutcome {
    Written,
    SkippedDuplicate,
}

/// Tracks the signatures already written to one unit.
#[derive(Debug, Default)]
pub struct Emitter {
    seen: HashSet<String>,
}

impl Emitter {
    /// Appends comment, definition header, and body to `out`, unless an
    /// equivalent signature was already emitted.
    pub fn emit(&mut self, out: &mut String, def: &StubDefinition) -> EmitOutcome {
        if !self.seen.insert(def.signature.dedup_key()) {
            return EmitOutcome::SkippedDuplicate;
        }
        out.push_str(&def.comment);
        out.push_str(&def.signature.text);
        out.push('\n');
        out.push_str(&def.body);
        EmitOutcome::Written
    }
}
