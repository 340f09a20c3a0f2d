//! Parameter values — the four ways a node's input can be specified.
//!
//! A [`ParamValue`] is resolved into a concrete [`serde_json::Value`] at
//! execution time by `nebula-engine`'s context builder, against an
//! [`nebula_expression::EvaluationContext`] carrying `$input`/`$node`/
//! `$execution`/`$workflow` scopes.

use nebula_core::id::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A node parameter value: either static, or resolved at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamValue {
    /// A static JSON value, used as-is.
    Literal {
        /// The literal value.
        value: Value,
    },
    /// An `{{ expr }}`-language expression, evaluated against the context.
    Expression {
        /// The expression source.
        expr: String,
    },
    /// A string containing zero or more `{{ expr }}` interpolations.
    Template {
        /// The template source.
        template: String,
    },
    /// A reference to another node's output, addressed by a dotted path.
    Reference {
        /// The producing node.
        node_id: NodeId,
        /// Dotted path into that node's output (`""` for the whole value).
        output_path: String,
    },
}

impl ParamValue {
    /// Build a [`ParamValue::Literal`] from anything JSON-serializable.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// Build a [`ParamValue::Expression`].
    #[must_use]
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::Expression { expr: expr.into() }
    }

    /// Build a [`ParamValue::Template`].
    #[must_use]
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
        }
    }

    /// Build a [`ParamValue::Reference`].
    #[must_use]
    pub fn reference(node_id: NodeId, output_path: impl Into<String>) -> Self {
        Self::Reference {
            node_id,
            output_path: output_path.into(),
        }
    }

    /// Whether resolving this value can fail only on a missing/invalid
    /// upstream output (as opposed to an expression/template syntax error
    /// that the compiler can catch ahead of time).
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }
}
