//! Line classification: which lines are directives, and how an inline
//! `# @IF … # @ENDIF` line splits apart.
//!
//! Directives are written as line comments so templates stay valid source
//! files. The `# ` leader is part of every marker.

pub(crate) const IF: &str = "# @IF ";
pub(crate) const ELSEIF: &str = "# @ELSEIF ";
pub(crate) const ELSE: &str = "# @ELSE";
pub(crate) const ENDIF: &str = "# @ENDIF";
pub(crate) const LOOP: &str = "# @LOOP ";
pub(crate) const ENDLOOP: &str = "# @ENDLOOP";

const LOOP_SEPARATOR: &str = " in ";

/// A directive line, borrowed from the trimmed source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive<'a> {
    If(&'a str),
    ElseIf(&'a str),
    Else,
    EndIf,
    /// Header text after `# @LOOP `, not yet validated.
    Loop(&'a str),
    EndLoop,
}

/// Classify a line. Order matters: `# @ELSEIF` must win over `# @ELSE`.
///
/// A line that opens with `# @IF ` and closes the condition on the same
/// line is an inline conditional, not a block start.
pub(crate) fn classify(line: &str) -> Option<Directive<'_>> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix(IF) {
        if rest.contains(ENDIF) {
            return None;
        }
        return Some(Directive::If(rest.trim()));
    }
    if let Some(rest) = trimmed.strip_prefix(ELSEIF) {
        return Some(Directive::ElseIf(rest.trim()));
    }
    if trimmed.starts_with(ELSE) {
        return Some(Directive::Else);
    }
    if trimmed.starts_with(ENDIF) {
        return Some(Directive::EndIf);
    }
    if let Some(rest) = trimmed.strip_prefix(LOOP) {
        return Some(Directive::Loop(rest.trim()));
    }
    if trimmed.starts_with(ENDLOOP) {
        return Some(Directive::EndLoop);
    }
    None
}

/// `<var> in <iterable>` split on the single ` in ` separator.
///
/// Returns `None` for anything else: no separator, more than one, or a
/// loop variable that is not an identifier.
pub(crate) fn split_loop_header(header: &str) -> Option<(&str, &str)> {
    let mut parts = header.split(LOOP_SEPARATOR);
    let var = parts.next()?.trim();
    let iterable = parts.next()?.trim();
    if parts.next().is_some() || !is_identifier(var) || iterable.is_empty() {
        return None;
    }
    Some((var, iterable))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Pieces of a line carrying an inline conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InlineIf<'a> {
    /// Text before the marker, right-trimmed.
    pub pre: &'a str,
    /// Condition source.
    pub condition: &'a str,
    /// Text after an inline `# @ENDIF`, left-trimmed; empty when absent.
    pub post: &'a str,
}

/// Split `pre # @IF cond [# @ENDIF post]`; `None` when the line has no
/// inline marker.
pub(crate) fn split_inline_if(line: &str) -> Option<InlineIf<'_>> {
    let (pre, rest) = line.split_once(IF)?;
    let rest = rest.trim();
    let spaced = format!(" {ENDIF}");
    let (condition, post) = rest
        .split_once(spaced.as_str())
        .or_else(|| rest.split_once(ENDIF))
        .map(|(cond, post)| (cond.trim(), post.trim_start()))
        .unwrap_or((rest, ""));
    Some(InlineIf {
        pre: pre.trim_end(),
        condition,
        post,
    })
}

/// Whether a line opens a nested loop body (any `# @LOOP ` header counts,
/// so a malformed header still pairs with its own `# @ENDLOOP`).
pub(crate) fn opens_loop(line: &str) -> bool {
    line.trim().starts_with(LOOP)
}

pub(crate) fn closes_loop(line: &str) -> bool {
    line.trim().starts_with(ENDLOOP)
}
