//! # Mask Expressions
//!
//! A deliberately small boolean row-filter language:
//!
//! ```text
//! expr       := or
//! or         := and ( "or" and )*
//! and        := unary ( "and" unary )*
//! unary      := "not" unary | primary
//! primary    := "(" expr ")" | comparison
//! comparison := operand ( cmp_op operand | "is" ["not"] "null" )
//! operand    := identifier | number | string
//! cmp_op     := "==" | "=" | "!=" | "<" | "<=" | ">" | ">="
//! ```
//!
//! Keywords are case-insensitive. An expression is compiled once per
//! application and evaluated row-wise against the current chunk. Comparisons
//! involving null are false; `is null` / `is not null` are the only null
//! tests. The grammar is intentionally tiny — this is a row filter, not a
//! query engine.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::table::{Table, Value};

/// A mask parse or evaluation failure. Never fatal: callers fall back to
/// applying the strategy to all rows and record a warning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MaskError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Literal(Value),
}

/// Compiled mask expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskExpr {
    And(Box<MaskExpr>, Box<MaskExpr>),
    Or(Box<MaskExpr>, Box<MaskExpr>),
    Not(Box<MaskExpr>),
    Compare {
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
    },
    NullTest {
        operand: Operand,
        negated: bool,
    },
}

impl MaskExpr {
    /// Compile a mask expression. The whole input must be consumed.
    pub fn parse(input: &str) -> Result<MaskExpr, MaskError> {
        let tokens = lex(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(MaskError(format!(
                "unexpected trailing input at token {:?}",
                parser.tokens[parser.pos]
            )));
        }
        Ok(expr)
    }

    /// Evaluate against every row of `table`, producing one bool per row.
    pub fn evaluate(&self, table: &Table) -> Result<Vec<bool>, MaskError> {
        // Column existence is checked once, not per row.
        self.check_columns(table)?;
        (0..table.row_count())
            .map(|row| self.eval_row(table, row))
            .collect()
    }

    fn check_columns(&self, table: &Table) -> Result<(), MaskError> {
        match self {
            MaskExpr::And(a, b) | MaskExpr::Or(a, b) => {
                a.check_columns(table)?;
                b.check_columns(table)
            }
            MaskExpr::Not(inner) => inner.check_columns(table),
            MaskExpr::Compare { lhs, rhs, .. } => {
                check_operand(lhs, table)?;
                check_operand(rhs, table)
            }
            MaskExpr::NullTest { operand, .. } => check_operand(operand, table),
        }
    }

    fn eval_row(&self, table: &Table, row: usize) -> Result<bool, MaskError> {
        match self {
            MaskExpr::And(a, b) => Ok(a.eval_row(table, row)? && b.eval_row(table, row)?),
            MaskExpr::Or(a, b) => Ok(a.eval_row(table, row)? || b.eval_row(table, row)?),
            MaskExpr::Not(inner) => Ok(!inner.eval_row(table, row)?),
            MaskExpr::Compare { lhs, op, rhs } => {
                let l = resolve(lhs, table, row);
                let r = resolve(rhs, table, row);
                Ok(match op {
                    CmpOp::Eq => l.loose_eq(&r),
                    CmpOp::Ne => !l.is_null() && !r.is_null() && !l.loose_eq(&r),
                    CmpOp::Lt => l.compare(&r) == Some(Ordering::Less),
                    CmpOp::Le => matches!(
                        l.compare(&r),
                        Some(Ordering::Less) | Some(Ordering::Equal)
                    ),
                    CmpOp::Gt => l.compare(&r) == Some(Ordering::Greater),
                    CmpOp::Ge => matches!(
                        l.compare(&r),
                        Some(Ordering::Greater) | Some(Ordering::Equal)
                    ),
                })
            }
            MaskExpr::NullTest { operand, negated } => {
                let v = resolve(operand, table, row);
                Ok(v.is_null() != *negated)
            }
        }
    }
}

fn check_operand(op: &Operand, table: &Table) -> Result<(), MaskError> {
    if let Operand::Column(name) = op {
        if !table.contains_column(name) {
            return Err(MaskError(format!("unknown column '{}'", name)));
        }
    }
    Ok(())
}

fn resolve(op: &Operand, table: &Table, row: usize) -> Value {
    match op {
        Operand::Column(name) => table.cell(name, row).cloned().unwrap_or(Value::Null),
        Operand::Literal(v) => v.clone(),
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(Value),
    Str(String),
    Op(CmpOp),
    And,
    Or,
    Not,
    Is,
    Null,
    LParen,
    RParen,
}

fn lex(input: &str) -> Result<Vec<Token>, MaskError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                // Accept both `=` and `==`.
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                } else {
                    i += 1;
                }
                tokens.push(Token::Op(CmpOp::Eq));
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Ne));
                    i += 2;
                } else {
                    return Err(MaskError("expected '=' after '!'".into()));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Le));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Lt));
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Op(CmpOp::Ge));
                    i += 2;
                } else {
                    tokens.push(Token::Op(CmpOp::Gt));
                    i += 1;
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                        None => return Err(MaskError("unterminated string literal".into())),
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() || c == '-' || c == '.' => {
                let start = i;
                i += 1;
                while i < chars.len()
                    && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == 'e')
                {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = if text.contains('.') || text.contains('e') {
                    text.parse::<f64>()
                        .map(Value::Float)
                        .map_err(|_| MaskError(format!("bad number '{}'", text)))?
                } else {
                    text.parse::<i64>()
                        .map(Value::Int)
                        .map_err(|_| MaskError(format!("bad number '{}'", text)))?
                };
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "is" => Token::Is,
                    "null" => Token::Null,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(MaskError(format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
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

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expr(&mut self) -> Result<MaskExpr, MaskError> {
        let mut lhs = self.and_expr()?;
        while self.peek() == Some(&Token::Or) {
            self.bump();
            let rhs = self.and_expr()?;
            lhs = MaskExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<MaskExpr, MaskError> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.bump();
            let rhs = self.unary()?;
            lhs = MaskExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<MaskExpr, MaskError> {
        if self.peek() == Some(&Token::Not) {
            self.bump();
            let inner = self.unary()?;
            return Ok(MaskExpr::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<MaskExpr, MaskError> {
        if self.peek() == Some(&Token::LParen) {
            self.bump();
            let inner = self.expr()?;
            match self.bump() {
                Some(Token::RParen) => return Ok(inner),
                _ => return Err(MaskError("expected ')'".into())),
            }
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<MaskExpr, MaskError> {
        let lhs = self.operand()?;

        match self.peek() {
            Some(Token::Op(_)) => {
                let op = match self.bump() {
                    Some(Token::Op(op)) => op,
                    _ => unreachable!(),
                };
                let rhs = self.operand()?;
                Ok(MaskExpr::Compare { lhs, op, rhs })
            }
            Some(Token::Is) => {
                self.bump();
                let negated = if self.peek() == Some(&Token::Not) {
                    self.bump();
                    true
                } else {
                    false
                };
                match self.bump() {
                    Some(Token::Null) => Ok(MaskExpr::NullTest {
                        operand: lhs,
                        negated,
                    }),
                    other => Err(MaskError(format!("expected 'null', got {:?}", other))),
                }
            }
            other => Err(MaskError(format!(
                "expected a comparison operator, got {:?}",
                other
            ))),
        }
    }

    fn operand(&mut self) -> Result<Operand, MaskError> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(Operand::Column(name)),
            Some(Token::Number(v)) => Ok(Operand::Literal(v)),
            Some(Token::Str(s)) => Ok(Operand::Literal(Value::Text(Cow::Owned(s)))),
            other => Err(MaskError(format!("expected an operand, got {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DataKind;

    fn sample_table() -> Table {
        let mut t = Table::empty(&["age", "name", "score"], 4);
        t.set_column(
            "age",
            DataKind::Integer,
            vec![
                Value::Int(10),
                Value::Int(25),
                Value::Int(40),
                Value::Null,
            ],
        );
        t.set_column(
            "name",
            DataKind::Text,
            vec![
                Value::Text("ada".into()),
                Value::Text("bob".into()),
                Value::Text("cyd".into()),
                Value::Text("dee".into()),
            ],
        );
        t.set_column(
            "score",
            DataKind::Float,
            vec![
                Value::Float(0.5),
                Value::Float(1.5),
                Value::Float(2.5),
                Value::Float(3.5),
            ],
        );
        t
    }

    fn eval(mask: &str) -> Vec<bool> {
        MaskExpr::parse(mask).unwrap().evaluate(&sample_table()).unwrap()
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(eval("age > 20"), vec![false, true, true, false]);
        assert_eq!(eval("age <= 25"), vec![true, true, false, false]);
    }

    #[test]
    fn test_equality_both_spellings() {
        assert_eq!(eval("name = 'bob'"), vec![false, true, false, false]);
        assert_eq!(eval("name == \"bob\""), vec![false, true, false, false]);
    }

    #[test]
    fn test_not_equal_skips_null() {
        // Row 3 has a null age: != never matches null.
        assert_eq!(eval("age != 25"), vec![true, false, true, false]);
    }

    #[test]
    fn test_and_or_not_precedence() {
        // and binds tighter than or
        assert_eq!(
            eval("age > 30 or age < 20 and score < 1"),
            vec![true, false, true, false]
        );
        assert_eq!(eval("not age > 20"), vec![true, false, false, true]);
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            eval("(age > 30 or age < 20) and score < 1"),
            vec![true, false, false, false]
        );
    }

    #[test]
    fn test_null_tests() {
        assert_eq!(eval("age is null"), vec![false, false, false, true]);
        assert_eq!(eval("age is not null"), vec![true, true, true, false]);
    }

    #[test]
    fn test_column_to_column() {
        assert_eq!(eval("score < age"), vec![true, true, true, false]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            eval("age IS NOT NULL AND age > 20"),
            vec![false, true, true, false]
        );
    }

    #[test]
    fn test_unknown_column_is_error() {
        let expr = MaskExpr::parse("missing > 1").unwrap();
        let err = expr.evaluate(&sample_table()).unwrap_err();
        assert!(err.0.contains("missing"), "error should name the column: {}", err);
    }

    #[test]
    fn test_parse_errors() {
        assert!(MaskExpr::parse("age >").is_err());
        assert!(MaskExpr::parse("age ! 3").is_err());
        assert!(MaskExpr::parse("(age > 1").is_err());
        assert!(MaskExpr::parse("age > 1 extra").is_err());
        assert!(MaskExpr::parse("name = 'unterminated").is_err());
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(eval("score >= 2.5"), vec![false, false, true, true]);
    }

    #[test]
    fn test_negative_number() {
        let mut t = Table::empty(&["delta"], 2);
        t.set_column(
            "delta",
            DataKind::Integer,
            vec![Value::Int(-5), Value::Int(5)],
        );
        let got = MaskExpr::parse("delta < -1").unwrap().evaluate(&t).unwrap();
        assert_eq!(got, vec![true, false]);
    }
}
