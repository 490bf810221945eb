//! Token definitions

use crate::decimal::Decimal;
use logos::{Lexer, Logos};
use serde::Serialize;

/// Lexical failure raised from inside a token callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    UnknownChar,
    UnterminatedString,
    UnterminatedComment,
    UnterminatedRegex,
    ExponentNotInteger,
    ExponentOutOfRange,
    InvalidBinary,
    InvalidOctal,
}

impl LexErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            LexErrorKind::UnknownChar => "unknown char",
            LexErrorKind::UnterminatedString => "unterminated string",
            LexErrorKind::UnterminatedComment => "unterminated comment",
            LexErrorKind::UnterminatedRegex => "unterminated regex",
            LexErrorKind::ExponentNotInteger => "exponent must be integer",
            LexErrorKind::ExponentOutOfRange => "exponent out of range",
            LexErrorKind::InvalidBinary => "invalid binary",
            LexErrorKind::InvalidOctal => "invalid octal",
        }
    }
}

/// Token category reported alongside every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Keyword,
    Punctuation,
    Operator,
    Identifier,
    Number,
    BigInt,
    String,
    Regex,
}

/// `/body/flags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexLiteral {
    pub body: String,
    pub flags: String,
}

impl RegexLiteral {
    pub fn new(body: &str, flags: &str) -> Self {
        Self {
            body: body.to_string(),
            flags: flags.to_string(),
        }
    }
}

/// SnippetJS token
#[derive(Logos, Debug, Clone, PartialEq, Serialize)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f\v]+")]
pub enum Token {
    // Keywords
    #[token("function")]
    Function,
    #[token("var")]
    Var,
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("typeof")]
    Typeof,
    #[token("void")]
    Void,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Literals
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", decimal_literal, priority = 3)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", decimal_literal, priority = 3)]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| radix_literal(lex, 16), priority = 3)]
    #[regex(r"0[oO][0-9]+", |lex| radix_literal(lex, 8), priority = 3)]
    #[regex(r"0[bB][0-9]+", |lex| radix_literal(lex, 2), priority = 3)]
    // An exponent followed by a fraction or bigint suffix, or a sign with no digits
    #[regex(r"[0-9]+(\.[0-9]*)?[eE][+-]?[0-9]+[.n]", malformed_exponent, priority = 4)]
    #[regex(r"\.[0-9]+[eE][+-]?[0-9]+[.n]", malformed_exponent, priority = 4)]
    #[regex(r"[0-9]+(\.[0-9]*)?[eE][+-]", malformed_exponent, priority = 4)]
    Number(Decimal),

    #[regex(r"[0-9]+n", bigint_literal, priority = 3)]
    BigInt(Decimal),

    #[token("'", |lex| string_literal(lex, b'\''))]
    #[token("\"", |lex| string_literal(lex, b'"'))]
    Str(String),

    /// Produced by `tokenize` where a regex may start
    Regex(RegexLiteral),

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 2)]
    // A number run into identifier characters (`1e12a`, `0xFG`) is a plain word
    #[regex(r"[0-9][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[token("//", line_comment)]
    #[token("/*", block_comment)]
    Comment,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,

    // Operators
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("**=")]
    StarStarEq,
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token(">>>=")]
    GtGtGtEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token(">>>")]
    GtGtGt,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
}

fn decimal_literal(lex: &mut Lexer<Token>) -> Result<Decimal, LexErrorKind> {
    let text = lex.slice();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(pos) => {
            let exponent = text[pos + 1..]
                .parse::<i64>()
                .map_err(|_| LexErrorKind::ExponentOutOfRange)?;
            (&text[..pos], exponent)
        }
        None => (text, 0),
    };
    if exponent == 0 && is_legacy_octal(mantissa) {
        return Decimal::from_radix(&mantissa[1..], 8).ok_or(LexErrorKind::InvalidOctal);
    }
    let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    Decimal::from_parts(int_digits, frac_digits, exponent).ok_or(LexErrorKind::ExponentOutOfRange)
}

fn is_legacy_octal(text: &str) -> bool {
    text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| (b'0'..=b'7').contains(&b))
}

fn radix_literal(lex: &mut Lexer<Token>, radix: u32) -> Result<Decimal, LexErrorKind> {
    let digits = &lex.slice()[2..];
    let invalid = match radix {
        2 => LexErrorKind::InvalidBinary,
        8 => LexErrorKind::InvalidOctal,
        _ => LexErrorKind::UnknownChar,
    };
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid);
    }
    Decimal::from_radix(digits, radix).ok_or(invalid)
}

fn malformed_exponent(_lex: &mut Lexer<Token>) -> Result<Decimal, LexErrorKind> {
    Err(LexErrorKind::ExponentNotInteger)
}

fn bigint_literal(lex: &mut Lexer<Token>) -> Result<Decimal, LexErrorKind> {
    let text = lex.slice();
    Decimal::from_radix(&text[..text.len() - 1], 10).ok_or(LexErrorKind::UnknownChar)
}

/// Scan a quoted string. Escapes are kept verbatim, backslash included;
/// a backslash only stops the following character from closing the string.
fn string_literal(lex: &mut Lexer<Token>, quote: u8) -> Result<String, LexErrorKind> {
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b if !b.is_ascii() => return Err(LexErrorKind::UnknownChar),
            b'\n' => return Err(LexErrorKind::UnterminatedString),
            b'\\' => {
                match rest.get(i + 1) {
                    None | Some(b'\n') => return Err(LexErrorKind::UnterminatedString),
                    Some(b) if !b.is_ascii() => return Err(LexErrorKind::UnknownChar),
                    Some(_) => i += 2,
                }
            }
            b if b == quote => {
                let body = lex.remainder()[..i].to_string();
                lex.bump(i + 1);
                return Ok(body);
            }
            _ => i += 1,
        }
    }
    Err(LexErrorKind::UnterminatedString)
}

fn line_comment(lex: &mut Lexer<Token>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder().as_bytes();
    let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    if !rest[..len].is_ascii() {
        return Err(LexErrorKind::UnknownChar);
    }
    lex.bump(len);
    Ok(())
}

fn block_comment(lex: &mut Lexer<Token>) -> Result<(), LexErrorKind> {
    let rest = lex.remainder();
    let Some(end) = rest.find("*/") else {
        return Err(LexErrorKind::UnterminatedComment);
    };
    if !rest[..end].is_ascii() {
        return Err(LexErrorKind::UnknownChar);
    }
    lex.bump(end + 2);
    Ok(())
}

/// Scan `/body/flags` starting at the opening slash. Returns the literal and its byte length.
pub(crate) fn scan_regex(source: &str) -> Result<(Token, usize), LexErrorKind> {
    let bytes = source.as_bytes();
    let mut i = 1;
    let mut in_class = false;
    loop {
        match bytes.get(i) {
            None | Some(b'\n') => return Err(LexErrorKind::UnterminatedRegex),
            Some(b) if !b.is_ascii() => return Err(LexErrorKind::UnknownChar),
            Some(b'\\') => {
                match bytes.get(i + 1) {
                    None | Some(b'\n') => return Err(LexErrorKind::UnterminatedRegex),
                    Some(_) => i += 2,
                }
                continue;
            }
            Some(b'[') => in_class = true,
            Some(b']') => in_class = false,
            Some(b'/') if !in_class => break,
            Some(_) => {}
        }
        i += 1;
    }
    let body = source[1..i].to_string();
    let flags_start = i + 1;
    let flags_len = bytes[flags_start..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
        .count();
    let flags = source[flags_start..flags_start + flags_len].to_string();
    Ok((Token::Regex(RegexLiteral { body, flags }), flags_start + flags_len))
}

impl Token {
    pub fn category(&self) -> Category {
        match self {
            Token::Function
            | Token::Var
            | Token::Let
            | Token::Const
            | Token::If
            | Token::Else
            | Token::For
            | Token::While
            | Token::Break
            | Token::Continue
            | Token::Return
            | Token::Typeof
            | Token::Void
            | Token::True
            | Token::False
            | Token::Null
            | Token::Undefined => Category::Keyword,
            Token::Number(_) => Category::Number,
            Token::BigInt(_) => Category::BigInt,
            Token::Str(_) => Category::String,
            Token::Regex(_) => Category::Regex,
            Token::Ident(_) => Category::Identifier,
            Token::LParen
            | Token::RParen
            | Token::LBrace
            | Token::RBrace
            | Token::LBracket
            | Token::RBracket
            | Token::Comma
            | Token::Semi
            | Token::Dot
            | Token::Colon => Category::Punctuation,
            _ => Category::Operator,
        }
    }

    /// Whether a regex literal may directly follow this token
    pub fn allows_following_regex(&self) -> bool {
        match self {
            Token::RParen | Token::RBracket | Token::RBrace => false,
            Token::True | Token::False | Token::Null | Token::Undefined => false,
            Token::PlusPlus | Token::MinusMinus => false,
            _ => matches!(
                self.category(),
                Category::Keyword | Category::Punctuation | Category::Operator
            ),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Token::Number(n) | Token::BigInt(n) => return write!(f, "{n}"),
            Token::Str(s) => return write!(f, "'{s}'"),
            Token::Regex(regex) => return write!(f, "/{}/{}", regex.body, regex.flags),
            Token::Ident(name) => return write!(f, "{name}"),
            Token::Function => "function",
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Return => "return",
            Token::Typeof => "typeof",
            Token::Void => "void",
            Token::True => "true",
            Token::False => "false",
            Token::Null => "null",
            Token::Undefined => "undefined",
            Token::Comment => "comment",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::Dot => ".",
            Token::Colon => ":",
            Token::Question => "?",
            Token::Eq => "=",
            Token::PlusEq => "+=",
            Token::MinusEq => "-=",
            Token::StarEq => "*=",
            Token::SlashEq => "/=",
            Token::PercentEq => "%=",
            Token::StarStarEq => "**=",
            Token::LtLtEq => "<<=",
            Token::GtGtEq => ">>=",
            Token::GtGtGtEq => ">>>=",
            Token::AmpEq => "&=",
            Token::PipeEq => "|=",
            Token::CaretEq => "^=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::StarStar => "**",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::EqEqEq => "===",
            Token::NotEqEq => "!==",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::LtEq => "<=",
            Token::GtEq => ">=",
            Token::LtLt => "<<",
            Token::GtGt => ">>",
            Token::GtGtGt => ">>>",
            Token::Amp => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::Tilde => "~",
            Token::Bang => "!",
            Token::AmpAmp => "&&",
            Token::PipePipe => "||",
        };
        write!(f, "{text}")
    }
}
