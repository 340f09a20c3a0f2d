//! Abstract Syntax Tree (AST) node types
//!
//! This module defines the AST structure for parsed expressions.

use serde_json::Value;
use std::sync::Arc;

/// An expression node in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal(Value),

    /// Variable reference (e.g., $node, $execution)
    Variable(Arc<str>),

    /// Identifier (for function names, lambda parameters, etc.)
    Identifier(Arc<str>),

    /// Unary negation (-expr)
    Negate(Box<Expr>),

    /// Logical NOT (!expr)
    Not(Box<Expr>),

    /// Binary operation (left op right)
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// Property access (object.property)
    PropertyAccess {
        object: Box<Expr>,
        property: Arc<str>,
    },

    /// Index access (array[index])
    IndexAccess { object: Box<Expr>, index: Box<Expr> },

    /// Function call (functionName(args...))
    FunctionCall { name: Arc<str>, args: Vec<Expr> },

    /// Pipeline operation (expr | function(args...))
    Pipeline {
        value: Box<Expr>,
        function: Arc<str>,
        args: Vec<Expr>,
    },

    /// Conditional expression (if condition then value1 else value2)
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// Lambda expression (param => body), used by filter/map/reduce/find/every/some
    Lambda { param: Arc<str>, body: Box<Expr> },

    /// Array literal ([expr1, expr2, ...])
    Array(Vec<Expr>),

    /// Object literal ({key1: value1, key2: value2, ...})
    Object(Vec<(Arc<str>, Expr)>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,

    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    RegexMatch,

    And,
    Or,
}

impl BinaryOp {
    /// Get a human-readable name for the operator
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::RegexMatch => "=~",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Precedence for precedence-climbing parsing (higher binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Equal | BinaryOp::NotEqual => 3,
            BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual
            | BinaryOp::RegexMatch => 4,
            BinaryOp::Add | BinaryOp::Subtract => 5,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 6,
            BinaryOp::Power => 7,
        }
    }

    /// Whether this operator associates right-to-left
    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOp::Power)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Expr {
    /// Check if this expression is a literal constant
    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Try to extract a literal value if this is a literal expression
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(val) => Some(val),
            _ => None,
        }
    }
}
