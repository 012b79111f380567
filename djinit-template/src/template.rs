//! Compiled templates and the line interpreter.
//!
//! [`Template::parse`] turns text into a flat program of [`Line`]s. Loop
//! bodies are compiled once into nested programs; conditionals stay flat
//! and are driven by a per-render branch stack, so unbalanced
//! `@IF`/`@ENDIF` pairs degrade exactly like the line-by-line original.
//!
//! Rendering never fails. Expressions that do not parse or evaluate fall
//! back to: the literal `[[ expr ]]` marker (substitution), `false`
//! (conditions) and zero iterations (loops).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::context::{Context, Lookup, Scope};
use crate::directive::{self, Directive};
use crate::error::ExprError;
use crate::eval;
use crate::expr::Expr;
use crate::value;

static SUBSTITUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\s*(.*?)\s*\]\]").expect("substitution pattern is valid")
});

/// Render `text` against `ctx`. Shorthand for parse + render.
pub fn render(text: &str, ctx: &Context) -> String {
    Template::parse(text).render(ctx)
}

/// A template compiled for repeated rendering.
#[derive(Debug, Clone)]
pub struct Template {
    lines: Vec<Line>,
}

impl Template {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Template {
            lines: compile(&lines),
        }
    }

    /// Render against `ctx`. Lines are joined with `\n`; the context is
    /// never modified.
    pub fn render(&self, ctx: &Context) -> String {
        let mut scope = Scope::new(ctx);
        let mut out = Vec::new();
        execute(&self.lines, &mut scope, &mut out);
        out.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Compiled program
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Compiled {
    source: String,
    expr: Result<Expr, ExprError>,
}

impl Compiled {
    fn new(source: &str) -> Self {
        Compiled {
            source: source.to_string(),
            expr: Expr::parse(source),
        }
    }

    fn evaluate<L: Lookup>(&self, scope: &L) -> Result<Value, ExprError> {
        let expr = self.expr.as_ref().map_err(Clone::clone)?;
        eval::evaluate(expr, scope)
    }

    /// Condition value; failures count as false.
    fn holds<L: Lookup>(&self, scope: &L) -> bool {
        let result = match &self.expr {
            Ok(expr) => eval::eval_condition(expr, scope),
            Err(err) => Err(err.clone()),
        };
        match result {
            Ok(holds) => holds,
            Err(err) => {
                tracing::debug!(expr = %self.source, error = %err, "condition treated as false");
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Subst(Compiled),
}

/// A run of text with `[[ … ]]` markers pre-parsed.
#[derive(Debug, Clone)]
struct Segments(Vec<Segment>);

impl Segments {
    fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in SUBSTITUTION.captures_iter(text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(text[last..whole.start()].to_string()));
            }
            segments.push(Segment::Subst(Compiled::new(inner.as_str())));
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Text(text[last..].to_string()));
        }
        Segments(segments)
    }

    fn render<L: Lookup>(&self, scope: &L) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Subst(compiled) => match compiled.evaluate(scope) {
                    Ok(v) => out.push_str(&value::to_display(&v)),
                    Err(err) => {
                        tracing::debug!(expr = %compiled.source, error = %err, "substitution left as literal");
                        out.push_str("[[ ");
                        out.push_str(&compiled.source);
                        out.push_str(" ]]");
                    }
                },
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
struct InlineIf {
    pre: Segments,
    condition: Compiled,
    post: Segments,
}

#[derive(Debug, Clone)]
struct Loop {
    var: String,
    iterable: Compiled,
    body: Vec<Line>,
}

#[derive(Debug, Clone)]
enum Line {
    Content(Segments),
    Inline(InlineIf),
    /// Emitted verbatim, subject to the branch stack (malformed loop headers).
    Verbatim(String),
    If(Compiled),
    /// The raw line is kept for passthrough when no `@IF` is open.
    ElseIf { raw: String, condition: Compiled },
    Else { raw: String },
    EndIf { raw: String },
    Loop(Loop),
    EndLoop,
}

fn compile(lines: &[&str]) -> Vec<Line> {
    let mut program = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        let compiled = match directive::classify(line) {
            Some(Directive::If(cond)) => Line::If(Compiled::new(cond)),
            Some(Directive::ElseIf(cond)) => Line::ElseIf {
                raw: line.to_string(),
                condition: Compiled::new(cond),
            },
            Some(Directive::Else) => Line::Else { raw: line.to_string() },
            Some(Directive::EndIf) => Line::EndIf { raw: line.to_string() },
            Some(Directive::EndLoop) => Line::EndLoop,
            Some(Directive::Loop(header)) => match directive::split_loop_header(header) {
                Some((var, iterable)) => {
                    let (body_end, resume_at) = find_loop_end(lines, i);
                    let body = compile(&lines[i..body_end]);
                    i = resume_at;
                    Line::Loop(Loop {
                        var: var.to_string(),
                        iterable: Compiled::new(iterable),
                        body,
                    })
                }
                None => Line::Verbatim(line.to_string()),
            },
            None => match directive::split_inline_if(line) {
                Some(inline) => Line::Inline(InlineIf {
                    pre: Segments::parse(inline.pre),
                    condition: Compiled::new(inline.condition),
                    post: Segments::parse(inline.post),
                }),
                None => Line::Content(Segments::parse(line)),
            },
        };
        program.push(compiled);
    }
    program
}

/// Find the `# @ENDLOOP` closing a body that starts at `start`.
///
/// Returns `(body_end, resume_at)`: the body is `start..body_end` and
/// compilation continues at `resume_at`, just past the closer. An
/// unclosed loop runs to the end of the template.
fn find_loop_end(lines: &[&str], start: usize) -> (usize, usize) {
    let mut depth = 1usize;
    for (offset, line) in lines[start..].iter().enumerate() {
        if directive::opens_loop(line) {
            depth += 1;
        } else if directive::closes_loop(line) {
            depth -= 1;
            if depth == 0 {
                let end = start + offset;
                return (end, end + 1);
            }
        }
    }
    (lines.len(), lines.len())
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Branch {
    active: bool,
    taken: bool,
}

fn execute(program: &[Line], scope: &mut Scope<'_>, out: &mut Vec<String>) {
    let mut stack: Vec<Branch> = Vec::new();
    let enabled = |stack: &[Branch]| stack.iter().all(|b| b.active);

    for line in program {
        match line {
            Line::If(condition) => {
                // Branches under an inactive parent never render; skip evaluation.
                let branch = if enabled(&stack) {
                    let result = condition.holds(&*scope);
                    Branch { active: result, taken: result }
                } else {
                    Branch { active: false, taken: true }
                };
                stack.push(branch);
            }
            Line::ElseIf { raw, condition } => {
                let parent_enabled = enabled(&stack[..stack.len().saturating_sub(1)]);
                match stack.last_mut() {
                    None => out.push(raw.clone()),
                    Some(top) if top.taken => top.active = false,
                    Some(top) => {
                        let result = parent_enabled && condition.holds(&*scope);
                        top.active = result;
                        top.taken = result;
                    }
                }
            }
            Line::Else { raw } => match stack.last_mut() {
                None => out.push(raw.clone()),
                Some(top) => {
                    top.active = !top.taken;
                    top.taken = true;
                }
            },
            Line::EndIf { raw } => {
                if stack.pop().is_none() {
                    out.push(raw.clone());
                }
            }
            Line::EndLoop => {
                tracing::debug!("stray @ENDLOOP skipped");
            }
            Line::Loop(lp) => {
                if enabled(&stack) {
                    run_loop(lp, scope, out);
                }
            }
            Line::Verbatim(raw) => {
                if enabled(&stack) {
                    tracing::debug!(line = %raw, "malformed directive passed through");
                    out.push(raw.clone());
                }
            }
            Line::Content(segments) => {
                if enabled(&stack) {
                    out.push(segments.render(&*scope));
                }
            }
            Line::Inline(inline) => {
                if enabled(&stack) && inline.condition.holds(&*scope) {
                    // Either side may be empty: `content # @IF c` keeps the
                    // content, `# @IF c # @ENDIF content` gates it.
                    let mut line = inline.pre.render(&*scope);
                    line.push_str(&inline.post.render(&*scope));
                    out.push(line);
                }
            }
        }
    }
}

fn run_loop(lp: &Loop, scope: &mut Scope<'_>, out: &mut Vec<String>) {
    let items = match lp.iterable.evaluate(&*scope).and_then(|v| value::iterate(&v)) {
        Ok(items) => items,
        Err(err) => {
            tracing::debug!(expr = %lp.iterable.source, error = %err, "loop iterable treated as empty");
            return;
        }
    };
    // Each iteration is joined and re-split: an empty body adds nothing
    // and trailing blank lines are dropped.
    let mut body_out = Vec::new();
    for item in items {
        scope.push(&lp.var, item);
        execute(&lp.body, scope, &mut body_out);
        scope.pop();
        out.extend(body_out.join("\n").lines().map(str::to_string));
        body_out.clear();
    }
}
