/// What went wrong while compiling a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PatternErrorKind {
    /// A `[` expression ran out of input before its `]`.
    #[error("unterminated bracket expression")]
    UnterminatedBracketExpression,
    /// A `<` tag list ran out of input before its `>`.
    #[error("unterminated tag list")]
    UnterminatedTagList,
    /// A run of `@`, `+` or `-` ran out of input.
    #[error("unterminated '{0}' run")]
    UnterminatedRepeatToken(char),
    #[error("unrecognized token '{0}'")]
    UnrecognizedToken(char),
    /// Ring-closure mark opened and never closed.
    #[error("ring mark {0} never closed")]
    UnclosedRingMark(u8),
    /// `)` with no open branch.
    #[error("branch closed with no open branch")]
    BranchStackUnderflow,
    /// `(` never closed.
    #[error("branch never closed")]
    DanglingBranch,
    #[error("pattern contains no atoms")]
    EmptyPattern,
    /// `<` not directly after an atom or bond.
    #[error("tag list must follow an atom or bond")]
    MisplacedTagList,
    /// Ring-closure mark written before any atom of its fragment.
    #[error("ring mark {0} has no atom to attach to")]
    MarkWithoutAtom(u8),
}

/// A compile failure at a character offset.
///
/// Offsets count `char`s, not bytes. Failures caused by running out of input
/// report the input length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at position {pos}")]
pub struct PatternError {
    pub pos: usize,
    pub kind: PatternErrorKind,
}

impl PatternError {
    pub fn new(pos: usize, kind: PatternErrorKind) -> Self {
        Self { pos, kind }
    }
}
