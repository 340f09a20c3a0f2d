//! Expression and template language used to wire data between workflow nodes.
//!
//! The language supports arithmetic, comparisons, boolean logic, property and
//! index access into JSON values, a small standard library of builtin
//! functions (string, math, array, object, conversion, datetime), and
//! higher-order array functions (`filter`, `map`, `reduce`, `find`, `every`,
//! `some`) driven by inline lambdas (`x => x.value`).
//!
//! [`ExpressionEngine`] parses and evaluates a single `expr` string;
//! [`Template`] renders `{{ expr }}` interpolations embedded in a larger
//! string, such as a node parameter value.
//!
//! ```
//! use nebula_expression::{EvaluationContext, ExpressionEngine};
//!
//! let engine = ExpressionEngine::new();
//! let context = EvaluationContext::new();
//! let result = engine.evaluate("1 + 2 * 3", &context).unwrap();
//! assert_eq!(result, serde_json::json!(7));
//! ```

pub mod builtins;
pub mod context;
pub mod engine;
pub mod error_formatter;
pub mod template;
pub mod value_utils;

#[doc(hidden)]
pub mod core;
#[doc(hidden)]
pub mod eval;
mod error;

pub use context::{EvaluationContext, EvaluationContextBuilder};
pub use engine::ExpressionEngine;
pub use error::{ExpressionError, ExpressionErrorExt, ExpressionResult};
pub use template::{MaybeTemplate, Position, Template, TemplatePart};

#[doc(hidden)]
pub use core::ast::{BinaryOp, Expr};
#[doc(hidden)]
pub use error_formatter::{ErrorFormatter, format_template_error};

/// Common imports for consumers wiring expressions into node execution.
pub mod prelude {
    pub use crate::{
        EvaluationContext, EvaluationContextBuilder, ExpressionEngine, ExpressionError,
        ExpressionErrorExt, ExpressionResult, MaybeTemplate, Template,
    };
}
