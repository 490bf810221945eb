//! Lexer implementation using logos

mod token;

pub use token::{Category, LexErrorKind, RegexLiteral, Token};

use crate::ast::Span;
use crate::error::{Result, SnippetError};
use logos::Logos;
use serde::Serialize;

/// A token with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct SourceToken {
    pub token: Token,
    pub span: Span,
    /// 1-based line of the token start
    pub line: usize,
}

impl SourceToken {
    pub fn category(&self) -> Category {
        self.token.category()
    }
}

/// Flat token record used for dumps
#[derive(Debug, Serialize)]
pub struct TokenRecord {
    pub category: Category,
    pub raw: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl From<&SourceToken> for TokenRecord {
    fn from(t: &SourceToken) -> Self {
        TokenRecord {
            category: t.category(),
            raw: t.token.to_string(),
            line: t.line,
            start: t.span.start,
            end: t.span.end,
        }
    }
}

/// Tokenize source code
///
/// Comments are dropped. A `/` or `/=` in a position where a value may
/// start is re-read as a regex literal.
pub fn tokenize(source: &str) -> Result<Vec<SourceToken>> {
    let mut tokens: Vec<SourceToken> = Vec::new();
    let mut lexer = Token::lexer(source);
    let mut line = 1;
    let mut line_scanned = 0;

    while let Some(result) = lexer.next() {
        let start = lexer.span().start;
        line += source[line_scanned..start].bytes().filter(|&b| b == b'\n').count();
        line_scanned = start;

        let token = match result {
            Ok(token) => token,
            Err(kind) => {
                return Err(SnippetError::lex(kind.message(), lexer.span().into()));
            }
        };

        let token = match token {
            Token::Comment => continue,
            Token::Slash | Token::SlashEq
                if tokens.last().is_none_or(|prev| prev.token.allows_following_regex()) =>
            {
                let (regex, len) = token::scan_regex(&source[start..]).map_err(|kind| {
                    SnippetError::lex(kind.message(), Span::new(start, source.len()))
                })?;
                lexer.bump(len - lexer.span().len());
                regex
            }
            other => other,
        };

        tokens.push(SourceToken {
            token,
            span: lexer.span().into(),
            line,
        });
    }

    log::debug!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    fn lex_error(source: &str) -> String {
        tokenize(source).unwrap_err().message().to_string()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  // only a comment\n/* and another */").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_function_header() {
        assert_eq!(
            kinds("function f(a, b = 1) {}"),
            vec![
                Token::Function,
                Token::Ident("f".to_string()),
                Token::LParen,
                Token::Ident("a".to_string()),
                Token::Comma,
                Token::Ident("b".to_string()),
                Token::Eq,
                Token::Number(1.into()),
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn test_tokenize_categories() {
        let tokens = tokenize("var x = 'a' + 12n; x.y").unwrap();
        let categories: Vec<_> = tokens.iter().map(SourceToken::category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Keyword,
                Category::Identifier,
                Category::Operator,
                Category::String,
                Category::Operator,
                Category::BigInt,
                Category::Punctuation,
                Category::Identifier,
                Category::Punctuation,
                Category::Identifier,
            ]
        );
    }

    #[test]
    fn test_tokenize_tracks_lines() {
        let tokens = tokenize("a\n/* two\nlines */ b\n\nc").unwrap();
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 5]);
    }

    #[test]
    fn test_tokenize_division_after_value() {
        assert_eq!(
            kinds("a / b / 2"),
            vec![
                Token::Ident("a".to_string()),
                Token::Slash,
                Token::Ident("b".to_string()),
                Token::Slash,
                Token::Number(2.into()),
            ]
        );
        assert_eq!(kinds("(1) /= 2")[3], Token::SlashEq);
    }

    #[test]
    fn test_comments_do_not_decide_regex_position() {
        assert_eq!(
            kinds("a /* note */ / 2"),
            vec![Token::Ident("a".to_string()), Token::Slash, Token::Number(2.into())]
        );
        let tokens = kinds("x = // note\n /r/");
        assert_eq!(tokens[2], Token::Regex(RegexLiteral::new("r", "")));
        assert!(!tokens.contains(&Token::Comment));
    }

    #[test]
    fn test_tokenize_regex_where_value_starts() {
        let tokens = kinds("x = /ab+c/i;");
        assert_eq!(tokens[2], Token::Regex(RegexLiteral::new("ab+c", "i")));
        assert_eq!(tokens[3], Token::Semi);

        let tokens = kinds("return /=/");
        assert_eq!(tokens[1], Token::Regex(RegexLiteral::new("=", "")));
    }

    #[test]
    fn test_tokenize_errors() {
        assert_eq!(lex_error("var s = '#あ';"), "unknown char");
        assert_eq!(lex_error("x = 'abc"), "unterminated string");
        assert_eq!(lex_error("x = /abc"), "unterminated regex");
        assert_eq!(lex_error("/* open"), "unterminated comment");
        assert_eq!(lex_error("0b12"), "invalid binary");
        assert_eq!(lex_error("0o78"), "invalid octal");
        assert_eq!(lex_error("1e1.1"), "exponent must be integer");
        assert_eq!(lex_error("// comment ü"), "unknown char");
        assert_eq!(lex_error("@"), "unknown char");
    }

    #[test]
    fn test_tokenize_error_span_points_at_token() {
        let err = tokenize("a = 0b2").unwrap_err();
        assert_eq!(err.span(), Some(Span::new(4, 7)));
    }

    #[test]
    fn test_token_record_raw_text() {
        let tokens = tokenize("x >>>= 0.50").unwrap();
        let records: Vec<TokenRecord> = tokens.iter().map(TokenRecord::from).collect();
        assert_eq!(records[1].raw, ">>>=");
        assert_eq!(records[2].raw, "0.5");
        assert_eq!(records[2].category, Category::Number);
    }
}
