//! Parsing scope shared by the tokenizer and the assemblers.
//!
//! A [`Scope`] is a small set of [`ScopeFlag`]s. Transitions follow one
//! pattern: keep a subset of the current flags, then add one.

/// One aspect of where the parser currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScopeFlag {
    Spec,
    Scenario,
    Comment,
    Tags,
    Table,
    TableData,
    Step,
    Context,
    TearDown,
    Concept,
}

impl ScopeFlag {
    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Scope {
    flags: u16,
}

impl Scope {
    pub(crate) fn has(self, flag: ScopeFlag) -> bool {
        self.flags & flag.bit() != 0
    }

    pub(crate) fn has_any(self, flags: &[ScopeFlag]) -> bool {
        flags.iter().any(|flag| self.has(*flag))
    }

    pub(crate) fn add(&mut self, flag: ScopeFlag) {
        self.flags |= flag.bit();
    }

    pub(crate) fn remove(&mut self, flag: ScopeFlag) {
        self.flags &= !flag.bit();
    }

    /// Drop every flag not listed in `keep`.
    pub(crate) fn retain(&mut self, keep: &[ScopeFlag]) {
        let mask = keep.iter().fold(0, |mask, flag| mask | flag.bit());
        self.flags &= mask;
    }

    /// Keep the listed flags, then add `flag`.
    pub(crate) fn retain_then_add(&mut self, keep: &[ScopeFlag], flag: ScopeFlag) {
        self.retain(keep);
        self.add(flag);
    }

    /// Reset to exactly `flag`.
    pub(crate) fn reset_to(&mut self, flag: ScopeFlag) {
        self.flags = flag.bit();
    }
}
