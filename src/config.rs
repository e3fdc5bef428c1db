//! Parser-wide toggles. Kept deliberately tiny: almost everything in the
//! grammar is unconditional, so this only covers the two carve-outs the
//! surrounding tooling (REPL, strict-mode linter) actually needs.

/// Controls optional front-end behavior that callers may want to disable
/// (e.g. a strict-mode linter that rejects deprecated syntax).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Accept the legacy `tag HAS_DIRECT_TEXT 'needle'` shorthand that
    /// desugars to `self.tag = 'tag' AND DIRECT_TEXT(tag) LIKE '%needle%'`.
    /// Enabled by default for compatibility with existing statements. When
    /// disabled, `tag HAS_DIRECT_TEXT 'needle'` still parses, but as the
    /// plain `CompareOp::HasDirectText` tail on whatever operand `tag`
    /// resolves to, rather than the two-comparison desugaring.
    pub allow_legacy_has_direct_text: bool,
    /// In [`crate::lint_with_config`], treat a line beginning with `.` or
    /// `:` (a REPL command, not MarkQL) as producing zero diagnostics
    /// instead of the syntax error the parser would otherwise report.
    /// Enabled by default, since a REPL transcript interleaves command
    /// lines with real statements and a linter watching it shouldn't flag
    /// every command as broken MarkQL.
    pub skip_repl_commands_in_lint: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            allow_legacy_has_direct_text: true,
            skip_repl_commands_in_lint: true,
        }
    }
}
