//! Lexer for filter expressions.
//!
//! Every token carries the byte offset it started at so that parse and type
//! errors can point back into the rule text.

use winnow::ascii::multispace0;
use winnow::combinator::alt;
use winnow::prelude::*;
use winnow::token::take_while;

use super::error::ParseError;

/// Token types for the expression language.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    // Literals and names
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),

    // Comparison operators
    Eq, // == (or =)
    Ne, // !=
    Lt, // <
    Le, // <=
    Gt, // >
    Ge, // >=

    // Boolean operators
    And, // && (or `and`)
    Or,  // || (or `or`)
    Not, // ! (or `not`)

    // Arithmetic operators
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %

    // Punctuation
    LParen, // (
    RParen, // )
    Dot,    // .
    Comma,  // ,

    // End of input
    Eof,
}

impl Token {
    /// Human-readable form for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("`{name}`"),
            Token::Str(_) => "string literal".to_string(),
            Token::Int(n) => format!("`{n}`"),
            Token::Float(n) => format!("`{n}`"),
            Token::Bool(b) => format!("`{b}`"),
            Token::Eq => "`==`".to_string(),
            Token::Ne => "`!=`".to_string(),
            Token::Lt => "`<`".to_string(),
            Token::Le => "`<=`".to_string(),
            Token::Gt => "`>`".to_string(),
            Token::Ge => "`>=`".to_string(),
            Token::And => "`&&`".to_string(),
            Token::Or => "`||`".to_string(),
            Token::Not => "`!`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Slash => "`/`".to_string(),
            Token::Percent => "`%`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Eof => "end of rule".to_string(),
        }
    }
}

/// A token plus the byte offset it started at.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexed {
    pub token: Token,
    pub offset: usize,
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn backtrack() -> winnow::error::ErrMode<winnow::error::ContextError> {
    winnow::error::ErrMode::Backtrack(winnow::error::ContextError::default())
}

/// Lex an identifier or word-form keyword (`and`, `or`, `not`, `true`,
/// `false`).
fn lex_ident(input: &mut &str) -> PResult<Token> {
    let first = take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_').parse_next(input)?;
    let rest = take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;

    let word = format!("{first}{rest}");
    let token = match word.as_str() {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        _ => Token::Ident(word),
    };
    Ok(token)
}

/// Lex a number. The fractional part is only consumed when a digit follows
/// the dot, so `1.5` is one float token while a stray trailing dot is left
/// for the parser to reject.
fn lex_number(input: &mut &str) -> PResult<Token> {
    let start = *input;
    let int_part = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;

    let has_fraction = input.starts_with('.')
        && input[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit());

    if has_fraction {
        let _ = '.'.parse_next(input)?;
        let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
        let text = &start[..start.len() - input.len()];
        let n: f64 = text.parse().map_err(|_| backtrack())?;
        Ok(Token::Float(n))
    } else {
        let n: i64 = int_part.parse().map_err(|_| backtrack())?;
        Ok(Token::Int(n))
    }
}

/// Lex a double-quoted string literal with `\"`, `\\`, `\n`, `\t` escapes.
fn lex_string(input: &mut &str) -> PResult<Token> {
    let _ = '"'.parse_next(input)?;

    let rest = *input;
    let mut out = String::new();
    let mut chars = rest.char_indices();
    loop {
        let Some((idx, c)) = chars.next() else {
            return Err(backtrack()); // unterminated
        };
        match c {
            '"' => {
                *input = &rest[idx + 1..];
                return Ok(Token::Str(out));
            }
            '\\' => match chars.next() {
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                _ => return Err(backtrack()),
            },
            c => out.push(c),
        }
    }
}

fn lex_operator(input: &mut &str) -> PResult<Token> {
    alt((
        // Multi-char operators first
        "&&".value(Token::And),
        "||".value(Token::Or),
        "==".value(Token::Eq),
        "!=".value(Token::Ne),
        "<=".value(Token::Le),
        ">=".value(Token::Ge),
        // Single-char operators
        "=".value(Token::Eq),
        "<".value(Token::Lt),
        ">".value(Token::Gt),
        "!".value(Token::Not),
        "+".value(Token::Plus),
        "-".value(Token::Minus),
        "*".value(Token::Star),
        "/".value(Token::Slash),
        "%".value(Token::Percent),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        ".".value(Token::Dot),
        ",".value(Token::Comma),
    ))
    .parse_next(input)
}

fn lex_token(input: &mut &str) -> PResult<Token> {
    alt((lex_operator, lex_number, lex_string, lex_ident)).parse_next(input)
}

fn skip_whitespace(input: &mut &str) {
    let _: PResult<&str> = multispace0.parse_next(input);
}

fn error_message(rest: &str) -> String {
    let Some(first) = rest.chars().next() else {
        return "unexpected end of input".to_string();
    };
    if first == '"' {
        "unterminated or malformed string literal".to_string()
    } else if first.is_ascii_digit() {
        "invalid numeric literal".to_string()
    } else {
        format!("unexpected character `{first}`")
    }
}

/// Tokenize an entire rule block. Newlines are plain whitespace, so a rule
/// may span multiple physical lines.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Lexed>, ParseError> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        skip_whitespace(&mut remaining);
        let offset = input.len() - remaining.len();

        if remaining.is_empty() {
            tokens.push(Lexed {
                token: Token::Eof,
                offset,
            });
            return Ok(tokens);
        }

        match lex_token(&mut remaining) {
            Ok(token) => tokens.push(Lexed { token, offset }),
            Err(_) => return Err(ParseError::new(error_message(remaining), offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn simple_comparison() {
        assert_eq!(
            kinds(r#"BaseName == "Chaos Orb""#),
            vec![
                Token::Ident("BaseName".into()),
                Token::Eq,
                Token::Str("Chaos Orb".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn offsets_track_token_starts() {
        let lexed = tokenize("StackSize >= 5").unwrap();
        let offsets: Vec<usize> = lexed.iter().map(|l| l.offset).collect();
        assert_eq!(offsets, vec![0, 10, 13, 14]);
    }

    #[test]
    fn word_operators_and_bools() {
        assert_eq!(
            kinds("not IsIdentified and true or false"),
            vec![
                Token::Not,
                Token::Ident("IsIdentified".into()),
                Token::And,
                Token::Bool(true),
                Token::Or,
                Token::Bool(false),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn numbers_int_and_float() {
        assert_eq!(
            kinds("Quality * 1.5 >= 20"),
            vec![
                Token::Ident("Quality".into()),
                Token::Star,
                Token::Float(1.5),
                Token::Ge,
                Token::Int(20),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn single_equals_is_equality() {
        assert_eq!(
            kinds("Rarity = Unique"),
            vec![
                Token::Ident("Rarity".into()),
                Token::Eq,
                Token::Ident("Unique".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\n""#),
            vec![Token::Str("a\"b\\c\n".into()), Token::Eof]
        );
    }

    #[test]
    fn newlines_are_whitespace() {
        assert_eq!(
            kinds("IsCorrupted\n&& Quality > 0\n"),
            vec![
                Token::Ident("IsCorrupted".into()),
                Token::And,
                Token::Ident("Quality".into()),
                Token::Gt,
                Token::Int(0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn method_call_tokens() {
        assert_eq!(
            kinds(r#"BaseName.Contains("Orb")"#),
            vec![
                Token::Ident("BaseName".into()),
                Token::Dot,
                Token::Ident("Contains".into()),
                Token::LParen,
                Token::Str("Orb".into()),
                Token::RParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_offset() {
        let err = tokenize(r#"BaseName == "oops"#).unwrap_err();
        assert_eq!(err.offset(), 12);
        assert!(err.message().contains("string literal"));
    }

    #[test]
    fn unexpected_character_reports_offset() {
        let err = tokenize("StackSize >= #5").unwrap_err();
        assert_eq!(err.offset(), 13);
        assert!(err.message().contains('#'));
    }
}
