//! Template context — the name → value mapping expressions resolve against.
//!
//! A [`Context`] is borrowed immutably for a whole render. Loop variables
//! are bound in a [`Scope`] layered on top of it, so nothing a template
//! does is visible to the caller once rendering returns.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ExprError, RenderError};
use crate::eval;
use crate::expr::Expr;
use crate::value::type_name;

/// Anything expression names can be resolved against.
pub trait Lookup {
    /// Resolve a bare identifier; `None` when the name is not bound.
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// Caller-owned rendering variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from any value that serializes to a map
    /// (a struct, a `HashMap`, a `serde_json` object).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, RenderError> {
        match serde_json::to_value(value)? {
            Value::Object(vars) => Ok(Self { vars }),
            other => Err(RenderError::NotAMap(type_name(&other))),
        }
    }

    /// Bind `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Parse and evaluate a single expression against this context.
    pub fn eval(&self, source: &str) -> Result<Value, ExprError> {
        let expr = Expr::parse(source)?;
        eval::evaluate(&expr, self)
    }
}

impl Lookup for Context {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

impl From<Map<String, Value>> for Context {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Loop-variable overlay for one render call.
///
/// Bindings are a stack searched from the top, so an inner loop variable
/// shadows both outer loop variables and context entries of the same name.
pub(crate) struct Scope<'a> {
    base: &'a Context,
    locals: Vec<(String, Value)>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(base: &'a Context) -> Self {
        Self {
            base,
            locals: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.locals.push((name.to_string(), value));
    }

    pub(crate) fn pop(&mut self) {
        self.locals.pop();
    }
}

impl Lookup for Scope<'_> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .or_else(|| self.base.lookup(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Project {
        project_name: String,
        app_names: Vec<String>,
    }

    #[test]
    fn from_serialize_struct() {
        let ctx = Context::from_serialize(&Project {
            project_name: "shop".to_string(),
            app_names: vec!["users".to_string()],
        })
        .expect("context");
        assert_eq!(ctx.get("project_name"), Some(&json!("shop")));
        assert_eq!(ctx.get("app_names"), Some(&json!(["users"])));
    }

    #[test]
    fn from_serialize_rejects_non_maps() {
        let err = Context::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(matches!(err, RenderError::NotAMap("list")), "got: {err}");
    }

    #[test]
    fn from_hash_map() {
        let mut map = HashMap::new();
        map.insert("debug", true);
        let ctx = Context::from_serialize(&map).unwrap();
        assert_eq!(ctx.get("debug"), Some(&json!(true)));
    }

    #[test]
    fn scope_shadows_and_unwinds() {
        let ctx: Context = [("app", "outer")].into_iter().collect();
        let mut scope = Scope::new(&ctx);
        assert_eq!(scope.lookup("app"), Some(&json!("outer")));

        scope.push("app", json!("first"));
        scope.push("app", json!("second"));
        assert_eq!(scope.lookup("app"), Some(&json!("second")));

        scope.pop();
        assert_eq!(scope.lookup("app"), Some(&json!("first")));
        scope.pop();
        assert_eq!(scope.lookup("app"), Some(&json!("outer")));
        assert_eq!(scope.lookup("missing"), None);
    }

    #[test]
    fn eval_shortcut() {
        let mut ctx = Context::new();
        ctx.insert("apps", vec!["users", "orders"]);
        assert_eq!(ctx.eval("'users' in apps"), Ok(json!(true)));
        assert!(matches!(ctx.eval("nope"), Err(ExprError::UndefinedName(_))));
    }
}
