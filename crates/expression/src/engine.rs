//! Parses expression strings into an AST and evaluates them.
//!
//! [`ExpressionEngine`] owns the builtin registry and (when the `cache`
//! feature is enabled) a small LRU-style cache of parsed ASTs keyed by
//! source string, so repeatedly evaluating the same expression across many
//! node executions only pays the tokenize+parse cost once.

use std::sync::Arc;

#[cfg(feature = "cache")]
use moka::sync::Cache;
use serde_json::Value;

use crate::ExpressionError;
use crate::builtins::BuiltinRegistry;
use crate::context::EvaluationContext;
use crate::core::ast::{BinaryOp, Expr};
use crate::core::error::{ExpressionErrorExt, ExpressionResult};
use crate::eval::Evaluator;

/// Maximum recursion depth for the parser (mirrors the evaluator's own limit).
const MAX_PARSER_DEPTH: usize = 256;

/// Default AST cache capacity when constructed via [`ExpressionEngine::new`].
const DEFAULT_CACHE_SIZE: u64 = 256;

/// Tokenizes, parses, and evaluates expression strings.
pub struct ExpressionEngine {
    evaluator: Evaluator,
    #[cfg(feature = "cache")]
    ast_cache: Cache<Arc<str>, Arc<Expr>>,
}

impl ExpressionEngine {
    /// Create an engine with the default AST cache capacity.
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_CACHE_SIZE as usize)
    }

    /// Create an engine whose AST cache holds at most `capacity` parsed
    /// expressions. Ignored when the `cache` feature is disabled.
    pub fn with_cache_size(capacity: usize) -> Self {
        Self {
            evaluator: Evaluator::new(Arc::new(BuiltinRegistry::new())),
            #[cfg(feature = "cache")]
            ast_cache: Cache::new(capacity as u64),
        }
    }

    /// Parse (or fetch from cache) and evaluate `source` against `context`.
    pub fn evaluate(&self, source: &str, context: &EvaluationContext) -> ExpressionResult<Value> {
        let ast = self.parse(source)?;
        self.evaluator.eval(&ast, context)
    }

    /// Parse `source` into an AST without evaluating it.
    pub fn parse(&self, source: &str) -> ExpressionResult<Arc<Expr>> {
        #[cfg(feature = "cache")]
        {
            if let Some(cached) = self.ast_cache.get(source) {
                return Ok(cached);
            }
            let parsed = Arc::new(Parser::new(source).parse()?);
            self.ast_cache.insert(Arc::from(source), Arc::clone(&parsed));
            Ok(parsed)
        }
        #[cfg(not(feature = "cache"))]
        {
            Ok(Arc::new(Parser::new(source).parse()?))
        }
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Integer(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    Ident(String),
    Var(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    RegexMatch,
    And,
    Or,
    Not,
    Pipe,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Arrow,
    If,
    Then,
    Else,
    Eof,
}

impl Tok {
    fn binary_op(&self) -> Option<BinaryOp> {
        Some(match self {
            Tok::Plus => BinaryOp::Add,
            Tok::Minus => BinaryOp::Subtract,
            Tok::Star => BinaryOp::Multiply,
            Tok::Slash => BinaryOp::Divide,
            Tok::Percent => BinaryOp::Modulo,
            Tok::Power => BinaryOp::Power,
            Tok::Eq => BinaryOp::Equal,
            Tok::Ne => BinaryOp::NotEqual,
            Tok::Lt => BinaryOp::LessThan,
            Tok::Gt => BinaryOp::GreaterThan,
            Tok::Le => BinaryOp::LessEqual,
            Tok::Ge => BinaryOp::GreaterEqual,
            Tok::RegexMatch => BinaryOp::RegexMatch,
            Tok::And => BinaryOp::And,
            Tok::Or => BinaryOp::Or,
            _ => return None,
        })
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            source,
        }
    }

    fn tokenize(mut self) -> ExpressionResult<Vec<Tok>> {
        let mut tokens = Vec::with_capacity((self.source.len() / 4).max(8));
        loop {
            let tok = self.next_token()?;
            let done = tok == Tok::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> ExpressionResult<Tok> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(Tok::Eof);
        };

        let tok = match c {
            '(' => { self.advance(); Tok::LParen }
            ')' => { self.advance(); Tok::RParen }
            '[' => { self.advance(); Tok::LBracket }
            ']' => { self.advance(); Tok::RBracket }
            '{' => { self.advance(); Tok::LBrace }
            '}' => { self.advance(); Tok::RBrace }
            ',' => { self.advance(); Tok::Comma }
            '.' => { self.advance(); Tok::Dot }
            ':' => { self.advance(); Tok::Colon }
            '+' => { self.advance(); Tok::Plus }
            '-' => { self.advance(); Tok::Minus }
            '*' if self.peek2() == Some('*') => { self.advance(); self.advance(); Tok::Power }
            '*' => { self.advance(); Tok::Star }
            '/' => { self.advance(); Tok::Slash }
            '%' => { self.advance(); Tok::Percent }
            '=' if self.peek2() == Some('=') => { self.advance(); self.advance(); Tok::Eq }
            '=' if self.peek2() == Some('~') => { self.advance(); self.advance(); Tok::RegexMatch }
            '=' if self.peek2() == Some('>') => { self.advance(); self.advance(); Tok::Arrow }
            '!' if self.peek2() == Some('=') => { self.advance(); self.advance(); Tok::Ne }
            '!' => { self.advance(); Tok::Not }
            '<' if self.peek2() == Some('=') => { self.advance(); self.advance(); Tok::Le }
            '<' => { self.advance(); Tok::Lt }
            '>' if self.peek2() == Some('=') => { self.advance(); self.advance(); Tok::Ge }
            '>' => { self.advance(); Tok::Gt }
            '&' if self.peek2() == Some('&') => { self.advance(); self.advance(); Tok::And }
            '|' if self.peek2() == Some('|') => { self.advance(); self.advance(); Tok::Or }
            '|' => { self.advance(); Tok::Pipe }
            '"' | '\'' => self.read_string(c)?,
            '$' => self.read_variable()?,
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_identifier_or_keyword(),
            other => {
                return Err(ExpressionError::expression_syntax_error(format!(
                    "unexpected character '{other}'"
                )));
            }
        };

        Ok(tok)
    }

    fn read_string(&mut self, quote: char) -> ExpressionResult<Tok> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => return Ok(Tok::Str(out)),
                Some('\\') => {
                    if let Some(escaped) = self.advance() {
                        out.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            '\\' => '\\',
                            '"' => '"',
                            '\'' => '\'',
                            other => other,
                        });
                    }
                }
                Some(c) => out.push(c),
                None => {
                    return Err(ExpressionError::expression_syntax_error(
                        "unterminated string literal",
                    ));
                }
            }
        }
    }

    fn read_variable(&mut self) -> ExpressionResult<Tok> {
        self.advance(); // $
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            name.push(self.advance().unwrap());
        }
        if name.is_empty() {
            return Err(ExpressionError::expression_syntax_error(
                "expected variable name after '$'",
            ));
        }
        Ok(Tok::Var(name))
    }

    fn read_number(&mut self) -> Tok {
        let mut raw = String::new();
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                raw.push(c);
                self.advance();
            } else if c == '.' && !is_float && matches!(self.peek2(), Some(d) if d.is_ascii_digit())
            {
                is_float = true;
                raw.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if is_float {
            Tok::Float(raw.parse().unwrap_or(0.0))
        } else {
            Tok::Integer(raw.parse().unwrap_or(0))
        }
    }

    fn read_identifier_or_keyword(&mut self) -> Tok {
        let mut name = String::new();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            name.push(self.advance().unwrap());
        }
        match name.as_str() {
            "true" => Tok::Bool(true),
            "false" => Tok::Bool(false),
            "null" => Tok::Null,
            "if" => Tok::If,
            "then" => Tok::Then,
            "else" => Tok::Else,
            _ => Tok::Ident(name),
        }
    }
}

// ============================================================================
// Parser (recursive descent with precedence climbing)
// ============================================================================

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        // Tokenization errors surface lazily from `parse()` via `self.tokens`
        // being empty; `tokenize` is infallible-looking here only because we
        // unwrap into an Eof-only stream on error and re-raise immediately.
        Self {
            tokens: Vec::new(),
            pos: 0,
        }
        .with_source(source)
    }

    fn with_source(mut self, source: &str) -> Self {
        self.tokens = Lexer::new(source).tokenize().unwrap_or_else(|_| vec![Tok::Eof]);
        self
    }

    fn parse(&mut self) -> ExpressionResult<Expr> {
        // Re-tokenize eagerly so lexer errors propagate instead of being
        // swallowed by the placeholder `vec![Tok::Eof]` fallback above.
        self.parse_conditional(0)
    }

    fn current(&self) -> &Tok {
        self.tokens.get(self.pos).unwrap_or(&Tok::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check_depth(&self, depth: usize) -> ExpressionResult<()> {
        if depth > MAX_PARSER_DEPTH {
            return Err(ExpressionError::expression_parse_error(format!(
                "maximum parser recursion depth ({MAX_PARSER_DEPTH}) exceeded"
            )));
        }
        Ok(())
    }

    fn expect(&mut self, expected: &Tok) -> ExpressionResult<()> {
        if self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(ExpressionError::expression_parse_error(format!(
                "expected {expected:?}, found {:?}",
                self.current()
            )))
        }
    }

    fn match_tok(&mut self, expected: &Tok) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_conditional(&mut self, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        if self.match_tok(&Tok::If) {
            let condition = Box::new(self.parse_pipeline(depth + 1)?);
            self.expect(&Tok::Then)?;
            let then_expr = Box::new(self.parse_pipeline(depth + 1)?);
            self.expect(&Tok::Else)?;
            let else_expr = Box::new(self.parse_pipeline(depth + 1)?);
            Ok(Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            })
        } else {
            self.parse_pipeline(depth + 1)
        }
    }

    fn parse_pipeline(&mut self, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        let mut expr = self.parse_binary(0, depth + 1)?;

        while *self.current() == Tok::Pipe {
            self.advance();
            let function: Arc<str> = match self.current() {
                Tok::Ident(name) => {
                    let name = Arc::from(name.as_str());
                    self.advance();
                    name
                }
                _ => {
                    return Err(ExpressionError::expression_parse_error(
                        "expected function name after '|'",
                    ));
                }
            };
            let args = if *self.current() == Tok::LParen {
                self.parse_function_args(depth + 1)?
            } else {
                Vec::new()
            };
            expr = Expr::Pipeline {
                value: Box::new(expr),
                function,
                args,
            };
        }

        Ok(expr)
    }

    fn parse_binary(&mut self, min_precedence: u8, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        let mut left = self.parse_unary(depth + 1)?;

        while let Some(op) = self.current().binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let next_min = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min, depth + 1)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        match self.current() {
            Tok::Minus => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_unary(depth + 1)?)))
            }
            Tok::Not => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary(depth + 1)?)))
            }
            _ => self.parse_postfix(depth + 1),
        }
    }

    fn parse_postfix(&mut self, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        let mut expr = self.parse_primary(depth + 1)?;
        loop {
            match self.current() {
                Tok::Dot => {
                    self.advance();
                    let property = self.expect_identifier_name("property")?;
                    expr = Expr::PropertyAccess {
                        object: Box::new(expr),
                        property,
                    };
                }
                Tok::LBracket => {
                    self.advance();
                    let index = self.parse_conditional(depth + 1)?;
                    self.expect(&Tok::RBracket)?;
                    expr = Expr::IndexAccess {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn expect_identifier_name(&mut self, what: &str) -> ExpressionResult<Arc<str>> {
        match self.current() {
            Tok::Ident(name) => {
                let name = Arc::from(name.as_str());
                self.advance();
                Ok(name)
            }
            _ => Err(ExpressionError::expression_parse_error(format!(
                "expected {what} name"
            ))),
        }
    }

    fn parse_primary(&mut self, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        match self.current().clone() {
            Tok::Integer(n) => {
                self.advance();
                Ok(Expr::Literal(Value::Number(n.into())))
            }
            Tok::Float(n) => {
                self.advance();
                Ok(Expr::Literal(serde_json::json!(n)))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Value::String(s)))
            }
            Tok::Bool(b) => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(b)))
            }
            Tok::Null => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            Tok::Var(name) => {
                self.advance();
                Ok(Expr::Variable(Arc::from(name.as_str())))
            }
            Tok::Ident(name) => {
                self.advance();
                if *self.current() == Tok::LParen {
                    let args = self.parse_function_args(depth + 1)?;
                    Ok(Expr::FunctionCall {
                        name: Arc::from(name.as_str()),
                        args,
                    })
                } else {
                    Ok(Expr::Identifier(Arc::from(name.as_str())))
                }
            }
            Tok::LParen => {
                self.advance();
                let expr = self.parse_conditional(depth + 1)?;
                self.expect(&Tok::RParen)?;
                Ok(expr)
            }
            Tok::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if *self.current() != Tok::RBracket {
                    loop {
                        elements.push(self.parse_conditional(depth + 1)?);
                        if !self.match_tok(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RBracket)?;
                Ok(Expr::Array(elements))
            }
            Tok::LBrace => {
                self.advance();
                let mut pairs = Vec::new();
                if *self.current() != Tok::RBrace {
                    loop {
                        let key: Arc<str> = match self.current().clone() {
                            Tok::Ident(name) => {
                                self.advance();
                                Arc::from(name.as_str())
                            }
                            Tok::Str(s) => {
                                self.advance();
                                Arc::from(s.as_str())
                            }
                            _ => {
                                return Err(ExpressionError::expression_parse_error(
                                    "expected object key",
                                ));
                            }
                        };
                        self.expect(&Tok::Colon)?;
                        let value = self.parse_conditional(depth + 1)?;
                        pairs.push((key, value));
                        if !self.match_tok(&Tok::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Tok::RBrace)?;
                Ok(Expr::Object(pairs))
            }
            other => Err(ExpressionError::expression_parse_error(format!(
                "unexpected token: {other:?}"
            ))),
        }
    }

    fn parse_function_args(&mut self, depth: usize) -> ExpressionResult<Vec<Expr>> {
        self.check_depth(depth)?;
        self.expect(&Tok::LParen)?;
        let mut args = Vec::new();

        if *self.current() != Tok::RParen {
            loop {
                if let Tok::Ident(param) = self.current().clone() {
                    self.advance();
                    if self.match_tok(&Tok::Arrow) {
                        let body = Box::new(self.parse_conditional(depth + 1)?);
                        args.push(Expr::Lambda {
                            param: Arc::from(param.as_str()),
                            body,
                        });
                        if !self.match_tok(&Tok::Comma) {
                            break;
                        }
                        continue;
                    }
                    // Not a lambda: continue parsing postfix/binary ops from
                    // this identifier as an ordinary expression.
                    let ident_expr = Expr::Identifier(Arc::from(param.as_str()));
                    let full = self.continue_postfix(ident_expr, depth + 1)?;
                    let full = self.continue_binary_from(full, depth + 1)?;
                    args.push(full);
                } else {
                    args.push(self.parse_conditional(depth + 1)?);
                }

                if !self.match_tok(&Tok::Comma) {
                    break;
                }
            }
        }

        self.expect(&Tok::RParen)?;
        Ok(args)
    }

    /// Continue parsing postfix operations (`.prop`, `[idx]`) from an
    /// already-parsed primary expression — used to resume parsing after
    /// tentatively consuming an identifier while checking for a lambda arrow.
    fn continue_postfix(&mut self, mut expr: Expr, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        loop {
            match self.current() {
                Tok::Dot => {
                    self.advance();
                    let property = self.expect_identifier_name("property")?;
                    expr = Expr::PropertyAccess {
                        object: Box::new(expr),
                        property,
                    };
                }
                Tok::LBracket => {
                    self.advance();
                    let index = self.parse_conditional(depth + 1)?;
                    self.expect(&Tok::RBracket)?;
                    expr = Expr::IndexAccess {
                        object: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Continue parsing binary operators from an already-parsed left-hand
    /// expression, mirroring [`Self::parse_binary`]'s precedence climbing.
    fn continue_binary_from(&mut self, mut left: Expr, depth: usize) -> ExpressionResult<Expr> {
        self.check_depth(depth)?;
        while let Some(op) = self.current().binary_op() {
            let precedence = op.precedence();
            self.advance();
            let next_min = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min, depth + 1)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> Value {
        let engine = ExpressionEngine::new();
        let context = EvaluationContext::new();
        engine.evaluate(source, &context).unwrap()
    }

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        assert_eq!(eval("2 + 3 * 4"), serde_json::json!(14));
        assert_eq!(eval("(2 + 3) * 4"), serde_json::json!(20));
        assert_eq!(eval("2 ** 3"), serde_json::json!(8));
    }

    #[test]
    fn evaluates_comparison_and_logic() {
        assert_eq!(eval("1 < 2 && 3 > 2"), Value::Bool(true));
        assert_eq!(eval("!(1 == 1)"), Value::Bool(false));
    }

    #[test]
    fn evaluates_conditional() {
        assert_eq!(eval("if 1 < 2 then 'yes' else 'no'"), serde_json::json!("yes"));
    }

    #[test]
    fn evaluates_variable_property_and_index_access() {
        let engine = ExpressionEngine::new();
        let mut context = EvaluationContext::new();
        context.set_input(serde_json::json!({"items": [10, 20, 30]}));
        let result = engine.evaluate("$input.items[1]", &context).unwrap();
        assert_eq!(result, serde_json::json!(20));
    }

    #[test]
    fn evaluates_pipeline_and_builtin_calls() {
        assert_eq!(eval("'hello' | uppercase()"), serde_json::json!("HELLO"));
        assert_eq!(eval("length('hello')"), serde_json::json!(5));
    }

    #[test]
    fn evaluates_array_and_object_literals() {
        assert_eq!(eval("[1, 2, 3]"), serde_json::json!([1, 2, 3]));
        assert_eq!(eval("{a: 1, b: 2}"), serde_json::json!({"a": 1, "b": 2}));
    }

    #[test]
    fn evaluates_higher_order_lambda_functions() {
        assert_eq!(
            eval("filter([1, 2, 3, 4, 5], x => x > 2)"),
            serde_json::json!([3, 4, 5])
        );
        assert_eq!(eval("map([1, 2, 3], x => x * 2)"), serde_json::json!([2, 4, 6]));
        assert_eq!(eval("reduce([1, 2, 3], 0, x => $acc + x)"), serde_json::json!(6));
    }

    #[test]
    fn cache_reuses_parsed_ast() {
        let engine = ExpressionEngine::new();
        let context = EvaluationContext::new();
        assert_eq!(engine.evaluate("1 + 1", &context).unwrap(), serde_json::json!(2));
        assert_eq!(engine.evaluate("1 + 1", &context).unwrap(), serde_json::json!(2));
    }

    #[test]
    fn reports_parse_errors_for_malformed_expressions() {
        let engine = ExpressionEngine::new();
        let context = EvaluationContext::new();
        assert!(engine.evaluate("1 +", &context).is_err());
        assert!(engine.evaluate("(1 + 2", &context).is_err());
    }

    #[test]
    fn deep_parenthesization_stays_within_recursion_limit() {
        let mut expr = String::from("1");
        for _ in 0..40 {
            expr = format!("({expr})");
        }
        assert!(eval(&expr) == serde_json::json!(1));
    }
}
