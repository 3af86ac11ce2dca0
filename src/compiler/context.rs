//! Per-invocation compile state

use crate::compiler::pattern::{CompileMode, VarId};

/// A specifier the compiler dropped because its tag was not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Surface text of the phrase owning the specifier
    pub parent: String,
    /// Surface text of the dropped specifier
    pub specifier: String,
    /// The unrecognized relation-question tag
    pub tag: String,
}

/// State threaded through one top-level compile.
///
/// Variable ids are unique within a context and contexts share nothing,
/// so concurrent compiles never interfere.
#[derive(Debug)]
pub struct CompileContext {
    mode: CompileMode,
    next_var: usize,
    strict_tags: bool,
    diagnostics: Vec<Diagnostic>,
}

impl CompileContext {
    pub fn new(mode: CompileMode) -> Self {
        Self {
            mode,
            next_var: 0,
            strict_tags: false,
            diagnostics: Vec::new(),
        }
    }

    /// Fail on unrecognized specifier tags instead of dropping them
    pub fn strict(mut self, strict_tags: bool) -> Self {
        self.strict_tags = strict_tags;
        self
    }

    pub fn mode(&self) -> CompileMode {
        self.mode
    }

    pub fn is_strict(&self) -> bool {
        self.strict_tags
    }

    pub fn fresh_var(&mut self) -> VarId {
        let var = VarId(self.next_var);
        self.next_var += 1;
        var
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_vars_are_sequential() {
        let mut ctx = CompileContext::new(CompileMode::Create);
        assert_eq!(ctx.fresh_var(), VarId(0));
        assert_eq!(ctx.fresh_var(), VarId(1));

        // A new context starts over
        let mut other = CompileContext::new(CompileMode::Match);
        assert_eq!(other.fresh_var(), VarId(0));
        assert_eq!(ctx.fresh_var(), VarId(2));
    }

    #[test]
    fn test_defaults() {
        let ctx = CompileContext::new(CompileMode::Match);
        assert_eq!(ctx.mode(), CompileMode::Match);
        assert!(!ctx.is_strict());
        assert!(ctx.diagnostics().is_empty());
        assert!(CompileContext::new(CompileMode::Create).strict(true).is_strict());
    }
}
