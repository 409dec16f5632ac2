//! Scope tracking: the stack of currently open namespace, class, and block
//! frames. The stack is the single source of truth for whether a declaration
//! is a class member and which classes enclose it.

use crate::model::ScopeFrame;

/// Well-nested stack of open scopes.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl ScopeStack {
    pub fn push(&mut self, frame: ScopeFrame) {
        self.frames.push(frame);
    }

    /// Pops the innermost frame. `None` on an already-empty stack, which the
    /// caller reports as a stray closing brace.
    pub fn pop(&mut self) -> Option<ScopeFrame> {
        self.frames.pop()
    }

    /// Number of currently open frames. Zero at end-of-input for well-formed
    /// files.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost open frame, used for end-of-file diagnostics.
    pub fn innermost(&self) -> Option<&ScopeFrame> {
        self.frames.last()
    }

    /// True when the innermost frame is a skipped braced region, in which
    /// case only brace accounting happens.
    pub fn in_block(&self) -> bool {
        matches!(self.frames.last(), Some(ScopeFrame::Block { .. }))
    }

    /// Enclosing class frames, outermost first, as (name, template preamble).
    pub fn class_chain(&self) -> Vec<(&str, Option<&str>)> {
        self.frames
            .iter()
            .filter_map(|frame| match frame {
                ScopeFrame::Class { name, template, .. } => {
                    Some((name.as_str(), template.as_deref()))
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_lists_classes_outermost_first() {
        let mut scopes = ScopeStack::default();
        scopes.push(ScopeFrame::Namespace { line: 1 });
        scopes.push(ScopeFrame::Class {
            name: "Outer".to_string(),
            template: None,
            line: 2,
        });
        scopes.push(ScopeFrame::Class {
            name: "Inner".to_string(),
            template: Some("template <typename T>".to_string()),
            line: 5,
        });
        let chain = scopes.class_chain();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0], ("Outer", None));
        assert_eq!(chain[1], ("Inner", Some("template <typename T>")));
    }

    #[test]
    fn block_frames_do_not_count_as_classes() {
        let mut scopes = ScopeStack::default();
        scopes.push(ScopeFrame::Block { line: 3 });
        assert!(scopes.in_block());
        assert!(scopes.class_chain().is_empty());
    }

    #[test]
    fn pop_on_empty_stack_is_none() {
        let mut scopes = ScopeStack::default();
        assert!(scopes.pop().is_none());
        scopes.push(ScopeFrame::Block { line: 1 });
        assert!(scopes.pop().is_some());
        assert_eq!(scopes.depth(), 0);
    }
}
