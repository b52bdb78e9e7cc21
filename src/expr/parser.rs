//! Recursive descent parser for filter expressions.
//!
//! One method per precedence level, lowest first: `||`, `&&`, `!`,
//! comparison, `+ -`, `* / %`, unary minus, method call. Comparisons do not
//! chain; `a < b < c` is rejected with a pointer at the second operator.

use super::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use super::error::ParseError;
use super::lexer::{self, Lexed, Token};

/// Parse a rule block into an untyped syntax tree.
pub(crate) fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let expr = parser.expression()?;

    let trailing = parser.peek().clone();
    if trailing.token != Token::Eof {
        return Err(ParseError::new(
            format!("unexpected {} after expression", trailing.token.describe()),
            trailing.offset,
        ));
    }
    Ok(expr)
}

struct Parser {
    // Always terminated by Eof; pos never moves past it.
    tokens: Vec<Lexed>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Lexed>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Lexed {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Lexed {
        let lexed = self.tokens[self.pos].clone();
        if lexed.token != Token::Eof {
            self.pos += 1;
        }
        lexed
    }

    fn expect(&mut self, expected: &Token, context: &str) -> Result<Lexed, ParseError> {
        let lexed = self.peek().clone();
        if &lexed.token == expected {
            Ok(self.advance())
        } else {
            Err(ParseError::new(
                format!(
                    "expected {} {context}, found {}",
                    expected.describe(),
                    lexed.token.describe()
                ),
                lexed.offset,
            ))
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.and_expr()?;
        while self.peek().token == Token::Or {
            let offset = self.advance().offset;
            let rhs = self.and_expr()?;
            lhs = binary(BinaryOp::Or, lhs, rhs, offset);
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.not_expr()?;
        while self.peek().token == Token::And {
            let offset = self.advance().offset;
            let rhs = self.not_expr()?;
            lhs = binary(BinaryOp::And, lhs, rhs, offset);
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, ParseError> {
        if self.peek().token == Token::Not {
            let offset = self.advance().offset;
            let operand = self.not_expr()?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                offset,
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.additive()?;
        let Some(op) = comparison_op(&self.peek().token) else {
            return Ok(lhs);
        };
        let offset = self.advance().offset;
        let rhs = self.additive()?;

        if comparison_op(&self.peek().token).is_some() {
            let chained = self.peek().clone();
            return Err(ParseError::new(
                "comparisons cannot be chained; combine them with `&&`",
                chained.offset,
            ));
        }
        Ok(binary(op, lhs, rhs, offset))
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            let offset = self.advance().offset;
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs, offset);
        }
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            let offset = self.advance().offset;
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs, offset);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek().token == Token::Minus {
            let offset = self.advance().offset;
            let operand = self.unary()?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                },
                offset,
            });
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        while self.peek().token == Token::Dot {
            self.advance();

            let name = self.peek().clone();
            let method = match &name.token {
                Token::Ident(m) => m.clone(),
                other => {
                    return Err(ParseError::new(
                        format!("expected a method name after `.`, found {}", other.describe()),
                        name.offset,
                    ));
                }
            };
            self.advance();

            self.expect(&Token::LParen, "to open the argument list")?;
            let mut args = Vec::new();
            if self.peek().token != Token::RParen {
                loop {
                    args.push(self.expression()?);
                    if self.peek().token == Token::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(&Token::RParen, "to close the argument list")?;

            expr = Expr {
                kind: ExprKind::MethodCall {
                    recv: Box::new(expr),
                    method,
                    args,
                },
                offset: name.offset,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let lexed = self.peek().clone();
        match lexed.token {
            Token::Str(s) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Str(s),
                    offset: lexed.offset,
                })
            }
            Token::Int(n) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Int(n),
                    offset: lexed.offset,
                })
            }
            Token::Float(n) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Float(n),
                    offset: lexed.offset,
                })
            }
            Token::Bool(b) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Bool(b),
                    offset: lexed.offset,
                })
            }
            Token::Ident(name) => {
                self.advance();
                Ok(Expr {
                    kind: ExprKind::Ident(name),
                    offset: lexed.offset,
                })
            }
            Token::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(&Token::RParen, "to close the group")?;
                Ok(expr)
            }
            other => Err(ParseError::new(
                format!("expected a value, found {}", other.describe()),
                lexed.offset,
            )),
        }
    }
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, offset: usize) -> Expr {
    Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        offset,
    }
}

fn comparison_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::Eq => Some(BinaryOp::Eq),
        Token::Ne => Some(BinaryOp::Ne),
        Token::Lt => Some(BinaryOp::Lt),
        Token::Le => Some(BinaryOp::Le),
        Token::Gt => Some(BinaryOp::Gt),
        Token::Ge => Some(BinaryOp::Ge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Expr {
        parse(input).unwrap()
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_ok("IsIdentified || IsCorrupted && true");
        let ExprKind::Binary { op: BinaryOp::Or, rhs, .. } = expr.kind else {
            panic!("expected `||` at the root, got {:?}", expr.kind);
        };
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary { op: BinaryOp::And, .. }
        ));
    }

    #[test]
    fn not_applies_to_following_comparison() {
        let expr = parse_ok("!Quality > 10 && IsCorrupted");
        let ExprKind::Binary { op: BinaryOp::And, lhs, .. } = expr.kind else {
            panic!("expected `&&` at the root, got {:?}", expr.kind);
        };
        let ExprKind::Unary { op: UnaryOp::Not, operand } = lhs.kind else {
            panic!("expected `!` on the left, got {:?}", lhs.kind);
        };
        assert!(matches!(
            operand.kind,
            ExprKind::Binary { op: BinaryOp::Gt, .. }
        ));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_ok("ItemLevel + Quality * 2 >= 100");
        let ExprKind::Binary { op: BinaryOp::Ge, lhs, .. } = expr.kind else {
            panic!("expected `>=` at the root, got {:?}", expr.kind);
        };
        let ExprKind::Binary { op: BinaryOp::Add, rhs, .. } = lhs.kind else {
            panic!("expected `+` below it, got {:?}", lhs.kind);
        };
        assert!(matches!(
            rhs.kind,
            ExprKind::Binary { op: BinaryOp::Mul, .. }
        ));
    }

    #[test]
    fn unary_minus_nests_under_multiplication() {
        let expr = parse_ok("-Quality * 2 < 0");
        let ExprKind::Binary { op: BinaryOp::Lt, lhs, .. } = expr.kind else {
            panic!("expected `<` at the root, got {:?}", expr.kind);
        };
        let ExprKind::Binary { op: BinaryOp::Mul, lhs: factor, .. } = lhs.kind else {
            panic!("expected `*` below it, got {:?}", lhs.kind);
        };
        assert!(matches!(
            factor.kind,
            ExprKind::Unary { op: UnaryOp::Neg, .. }
        ));
    }

    #[test]
    fn method_call_on_field() {
        let expr = parse_ok(r#"BaseName.Contains("Orb")"#);
        let ExprKind::MethodCall { recv, method, args } = expr.kind else {
            panic!("expected a method call, got {:?}", expr.kind);
        };
        assert_eq!(method, "Contains");
        assert_eq!(args.len(), 1);
        assert!(matches!(recv.kind, ExprKind::Ident(ref n) if n == "BaseName"));
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse_ok("(IsIdentified || IsCorrupted) && true");
        let ExprKind::Binary { op: BinaryOp::And, lhs, .. } = expr.kind else {
            panic!("expected `&&` at the root, got {:?}", expr.kind);
        };
        assert!(matches!(
            lhs.kind,
            ExprKind::Binary { op: BinaryOp::Or, .. }
        ));
    }

    #[test]
    fn chained_comparison_is_rejected() {
        let err = parse("1 < StackSize < 10").unwrap_err();
        assert!(err.message().contains("chained"));
        assert_eq!(err.offset(), 14);
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse("IsIdentified IsCorrupted").unwrap_err();
        assert!(err.message().contains("after expression"));
        assert_eq!(err.offset(), 13);
    }

    #[test]
    fn missing_close_paren_is_rejected() {
        let err = parse("(IsIdentified && true").unwrap_err();
        assert!(err.message().contains("`)`"));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse("").unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(err.message().contains("expected a value"));
    }

    #[test]
    fn operator_offsets_point_into_source() {
        let expr = parse_ok("StackSize >= 5");
        assert!(matches!(
            expr.kind,
            ExprKind::Binary { op: BinaryOp::Ge, .. }
        ));
        assert_eq!(expr.offset, 10);
    }
}
