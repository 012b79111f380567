//! Expression language used by `[[ … ]]`, `@IF`, `@ELSEIF` and `@LOOP`.
//!
//! A deliberately small, Python-flavoured grammar: literals, names,
//! dotted / subscript access, comparisons, membership and boolean
//! operators. There are no calls and no ambient names; only what the
//! context binds can be reached.
//!
//! ```text
//! expr       := or
//! or         := and ( "or" and )*
//! and        := not ( "and" not )*
//! not        := "not" not | comparison
//! comparison := unary ( cmp_op unary )?
//! unary      := "-" unary | postfix
//! postfix    := primary ( "." IDENT | "[" expr "]" )*
//! primary    := IDENT | STRING | NUMBER | bool | none | list | "(" expr ")"
//! ```

use std::fmt;

use serde_json::{Number, Value};

use crate::error::ExprError;

/// Comparison and membership operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    List(Vec<Expr>),
    Name(String),
    Attr(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse a complete expression; trailing tokens are an error.
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_or()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(ExprError::UnexpectedToken(tok.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Minus,
    Op(CmpOp),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => f.write_str(s),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(n) => write!(f, "{n}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::Minus => f.write_str("-"),
            Token::Op(op) => f.write_str(op.symbol()),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '[' | ']' | '.' | ',' | '-' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '.' => Token::Dot,
                    ',' => Token::Comma,
                    _ => Token::Minus,
                });
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let eq = chars.next_if(|&(_, n)| n == '=').is_some();
                let op = match (c, eq) {
                    ('=', true) => CmpOp::Eq,
                    ('!', true) => CmpOp::Ne,
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    ('>', false) => CmpOp::Gt,
                    ('>', true) => CmpOp::Ge,
                    _ => return Err(ExprError::UnexpectedChar { ch: c, offset }),
                };
                tokens.push(Token::Op(op));
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(Token::Str(lex_string(&mut chars, c)?));
            }
            c if c.is_ascii_digit() => {
                let mut text = String::new();
                let mut is_float = false;
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '_' {
                        text.push(d);
                    } else if d == '.' && !is_float {
                        is_float = true;
                        text.push(d);
                    } else {
                        break;
                    }
                    chars.next();
                }
                let clean = text.replace('_', "");
                let token = if is_float {
                    clean.parse().map(Token::Float)
                        .map_err(|_| ExprError::InvalidNumber(text.clone()))?
                } else {
                    clean.parse().map(Token::Int)
                        .map_err(|_| ExprError::InvalidNumber(text.clone()))?
                };
                tokens.push(token);
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(ExprError::UnexpectedChar { ch: other, offset }),
        }
    }

    Ok(tokens)
}

fn lex_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
) -> Result<String, ExprError> {
    let mut out = String::new();
    loop {
        let Some((_, c)) = chars.next() else {
            return Err(ExprError::UnterminatedString);
        };
        match c {
            c if c == quote => return Ok(out),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(ExprError::UnterminatedString);
                };
                out.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            c => out.push(c),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Result<Token, ExprError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(ExprError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, want: Token) -> Result<(), ExprError> {
        let tok = self.next()?;
        if tok == want {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken(tok.to_string()))
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == kw)
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.at_keyword("or") {
            self.pos += 1;
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_not()?;
        while self.at_keyword("and") {
            self.pos += 1;
            let right = self.parse_not()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.at_keyword("not") {
            self.pos += 1;
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let left = self.parse_unary()?;
        let op = match self.peek() {
            Some(Token::Op(op)) => {
                let op = *op;
                self.pos += 1;
                op
            }
            Some(Token::Ident(s)) if s == "in" => {
                self.pos += 1;
                CmpOp::In
            }
            Some(Token::Ident(s))
                if s == "not" && matches!(self.peek_at(1), Some(Token::Ident(n)) if n == "in") =>
            {
                self.pos += 2;
                CmpOp::NotIn
            }
            _ => return Ok(left),
        };
        let right = self.parse_unary()?;
        Ok(Expr::Compare(op, Box::new(left), Box::new(right)))
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    match self.next()? {
                        Token::Ident(name) => expr = Expr::Attr(Box::new(expr), name),
                        other => return Err(ExprError::UnexpectedToken(other.to_string())),
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_or()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next()? {
            Token::Ident(name) => {
                if matches!(name.as_str(), "and" | "or" | "not" | "in") {
                    return Err(ExprError::UnexpectedToken(name));
                }
                Ok(match keyword_literal(&name) {
                    Some(value) => Expr::Literal(value),
                    None => Expr::Name(name),
                })
            }
            Token::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Token::Int(n) => Ok(Expr::Literal(Value::Number(n.into()))),
            Token::Float(f) => Number::from_f64(f)
                .map(|n| Expr::Literal(Value::Number(n)))
                .ok_or_else(|| ExprError::InvalidNumber(f.to_string())),
            Token::LParen => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => {
                let mut items = Vec::new();
                loop {
                    if matches!(self.peek(), Some(Token::RBracket)) {
                        self.pos += 1;
                        break;
                    }
                    items.push(self.parse_or()?);
                    match self.next()? {
                        Token::Comma => continue,
                        Token::RBracket => break,
                        other => return Err(ExprError::UnexpectedToken(other.to_string())),
                    }
                }
                Ok(Expr::List(items))
            }
            other => Err(ExprError::UnexpectedToken(other.to_string())),
        }
    }
}

fn keyword_literal(word: &str) -> Option<Value> {
    match word {
        "True" | "true" => Some(Value::Bool(true)),
        "False" | "false" => Some(Value::Bool(false)),
        "None" | "null" => Some(Value::Null),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name(s: &str) -> Box<Expr> {
        Box::new(Expr::Name(s.to_string()))
    }

    #[test]
    fn parses_dotted_and_subscript_access() {
        let expr = Expr::parse("settings['db'].name").unwrap();
        assert_eq!(
            expr,
            Expr::Attr(
                Box::new(Expr::Index(name("settings"), Box::new(Expr::Literal(json!("db"))))),
                "name".to_string()
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = Expr::parse("a or b and c").unwrap();
        assert_eq!(
            expr,
            Expr::Or(name("a"), Box::new(Expr::And(name("b"), name("c"))))
        );
    }

    #[test]
    fn not_in_is_one_operator() {
        let expr = Expr::parse("app not in apps").unwrap();
        assert_eq!(expr, Expr::Compare(CmpOp::NotIn, name("app"), name("apps")));

        let negated = Expr::parse("not app in apps").unwrap();
        assert_eq!(
            negated,
            Expr::Not(Box::new(Expr::Compare(CmpOp::In, name("app"), name("apps"))))
        );
    }

    #[test]
    fn literals() {
        assert_eq!(Expr::parse("True").unwrap(), Expr::Literal(json!(true)));
        assert_eq!(Expr::parse("None").unwrap(), Expr::Literal(json!(null)));
        assert_eq!(Expr::parse("1_000").unwrap(), Expr::Literal(json!(1000)));
        assert_eq!(Expr::parse("2.5").unwrap(), Expr::Literal(json!(2.5)));
        assert_eq!(Expr::parse(r#""a\"b""#).unwrap(), Expr::Literal(json!("a\"b")));
        assert_eq!(
            Expr::parse("['x', 1,]").unwrap(),
            Expr::List(vec![Expr::Literal(json!("x")), Expr::Literal(json!(1))])
        );
    }

    #[test]
    fn rejects_calls_and_garbage() {
        assert!(matches!(Expr::parse("open('x')"), Err(ExprError::UnexpectedToken(_))));
        assert!(matches!(Expr::parse("a +"), Err(ExprError::UnexpectedChar { ch: '+', .. })));
        assert_eq!(Expr::parse("   "), Err(ExprError::Empty));
        assert_eq!(Expr::parse("'open"), Err(ExprError::UnterminatedString));
        assert_eq!(Expr::parse("(a"), Err(ExprError::UnexpectedEnd));
        assert!(matches!(Expr::parse("a = b"), Err(ExprError::UnexpectedChar { ch: '=', .. })));
    }
}
