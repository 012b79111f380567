//! # djinit-template
//!
//! Line-oriented template interpreter for djinit's `-tpl` files.
//!
//! Control flow lives in comment directives so templates stay valid Python:
//!
//! ```text
//! # @IF use_database_url
//! import dj_database_url
//! # @ENDIF
//! # @LOOP app in app_configs
//!     "[[ app ]]",
//! # @ENDLOOP
//! DEBUG = True  # @IF debug
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use djinit_template::{render, Context};
//!
//! let mut ctx = Context::new();
//! ctx.insert("apps", vec!["users", "orders"]);
//! let out = render("# @LOOP app in apps\n- [[ app ]]\n# @ENDLOOP", &ctx);
//! assert_eq!(out, "- users\n- orders");
//! ```

pub mod context;
mod directive;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod template;
pub mod value;

pub use context::{Context, Lookup};
pub use engine::TemplateEngine;
pub use error::{ExprError, RenderError};
pub use expr::Expr;
pub use template::{render, Template};
