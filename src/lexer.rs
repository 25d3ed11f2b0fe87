use std::str::Chars;

use crate::error::LexError;
use crate::token::{Pos, Token, TokenKind, KEYWORDS};

/// Maps the source input into a sequence of tokens, ending with [`TokenKind::Eof`].
///
/// Lexing is fatal on the first malformed input; no recovery is attempted.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    chars: Chars<'src>,
    line: u32,
    col: u32,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Lexer<'src> {
        Lexer {
            chars: source.chars(),
            line: 1,
            col: 0,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let Some(ch) = self.advance() else {
                tokens.push(Token::new(TokenKind::Eof, Pos::new(self.line, self.col + 1)));
                return Ok(tokens);
            };
            if ch.is_ascii_whitespace() {
                continue;
            }

            let pos = self.here();
            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                '.' => TokenKind::Dot,
                ';' => TokenKind::Semicolon,
                '+' => TokenKind::Plus,
                '*' => TokenKind::Star,
                '^' => TokenKind::Caret,
                ':' => self.either('=', TokenKind::Assign, TokenKind::Colon),
                '=' => self.either('=', TokenKind::EqEq, TokenKind::Eq),
                '-' => self.either('>', TokenKind::Arrow, TokenKind::Minus),
                '&' => self.either('&', TokenKind::AndAnd, TokenKind::Amp),
                '!' => self.either('=', TokenKind::NotEq, TokenKind::Bang),
                '<' => self.either('=', TokenKind::LessEq, TokenKind::Less),
                '>' => self.either('=', TokenKind::GreaterEq, TokenKind::Greater),
                // A lone `|` is not an operator of the language.
                '|' => match self.peek() {
                    Some('|') => {
                        self.advance();
                        TokenKind::OrOr
                    }
                    _ => return Err(LexError::UnexpectedChar { ch: '|', pos }),
                },
                '/' => match self.peek() {
                    Some('/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        self.skip_block_comment(pos)?;
                        continue;
                    }
                    _ => TokenKind::Slash,
                },
                '"' => self.lex_string(pos)?,
                '#' => self.lex_meta_identifier(pos)?,
                '0'..='9' => self.lex_number(ch)?,
                ch if is_ident_start(ch) => self.lex_identifier(ch),
                other => return Err(LexError::UnexpectedChar { ch: other, pos }),
            };
            tokens.push(Token::new(kind, pos));
        }
    }

    /// If the next character is `next`, consumes it and yields `double`.
    fn either(&mut self, next: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self, pos: Pos) -> Result<(), LexError> {
        self.advance(); // the `*`
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment { pos }),
            }
        }
    }

    fn lex_string(&mut self, pos: Pos) -> Result<TokenKind, LexError> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(TokenKind::Str(text)),
                Some('\\') => {
                    let escape_pos = self.here();
                    let resolved = match self.advance() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(other) => {
                            return Err(LexError::BadEscape {
                                ch: other,
                                pos: escape_pos,
                            })
                        }
                        None => return Err(LexError::UnterminatedString { pos }),
                    };
                    text.push(resolved);
                }
                Some(ch) => text.push(ch),
                None => return Err(LexError::UnterminatedString { pos }),
            }
        }
    }

    fn lex_meta_identifier(&mut self, pos: Pos) -> Result<TokenKind, LexError> {
        if !self.peek().is_some_and(is_ident_start) {
            return Err(LexError::UnexpectedChar { ch: '#', pos });
        }
        let mut name = String::from("#");
        while let Some(ch) = self.peek() {
            if !is_ident_continue(ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        Ok(TokenKind::MetaIdentifier(name))
    }

    fn lex_number(&mut self, first: char) -> Result<TokenKind, LexError> {
        let mut text = String::from(first);
        self.take_digits(&mut text);

        let mut decimal = false;
        if self.peek() == Some('.') {
            if !self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) {
                return Err(LexError::MalformedNumber { pos: self.here() });
            }
            decimal = true;
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }

        // The `f` suffix turns any numeric literal into a float.
        if self.peek() == Some('f') {
            self.advance();
            return Ok(TokenKind::Float(text));
        }
        if decimal {
            Ok(TokenKind::Decimal(text))
        } else {
            Ok(TokenKind::Int(text))
        }
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    fn lex_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);
        while let Some(ch) = self.peek() {
            if !is_ident_continue(ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        match KEYWORDS.get(&name) {
            Some(kind) => kind.clone(),
            None => TokenKind::Identifier(name),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Position of the most recently consumed character.
    fn here(&self) -> Pos {
        Pos::new(self.line, self.col)
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lexing should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn lexes_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("( ) { } , . ; : := = -> &"),
            vec![
                LParen, RParen, LBrace, RBrace, Comma, Dot, Semicolon, Colon, Assign, Eq, Arrow,
                Amp, Eof
            ]
        );
    }

    #[test]
    fn lexes_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("+ - * / ^ == != < > <= >= ! && ||"),
            vec![
                Plus, Minus, Star, Slash, Caret, EqEq, NotEq, Less, Greater, LessEq, GreaterEq,
                Bang, AndAnd, OrOr, Eof
            ]
        );
    }

    #[test]
    fn rejects_a_lone_pipe() {
        assert_eq!(
            lex("a | b"),
            Err(LexError::UnexpectedChar {
                ch: '|',
                pos: Pos::new(1, 3)
            })
        );
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("fn return type if unless then else let True False truthy"),
            vec![
                Fn,
                Return,
                Type,
                If,
                Unless,
                Then,
                Else,
                Let,
                True,
                False,
                Identifier("truthy".into()),
                Eof
            ]
        );
        // Keywords are case sensitive.
        assert_eq!(
            kinds("true Let"),
            vec![Identifier("true".into()), Identifier("Let".into()), Eof]
        );
    }

    #[test]
    fn lexes_numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds("123 1.25 3f 1.25f 0.5"),
            vec![
                Int("123".into()),
                Decimal("1.25".into()),
                Float("3".into()),
                Float("1.25".into()),
                Decimal("0.5".into()),
                Eof
            ]
        );
    }

    #[test]
    fn rejects_trailing_decimal_point() {
        assert_eq!(
            lex("1."),
            Err(LexError::MalformedNumber {
                pos: Pos::new(1, 1)
            })
        );
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            kinds(r#""hi\n\t\"quoted\" \\""#),
            vec![TokenKind::Str("hi\n\t\"quoted\" \\".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn rejects_bad_escape_and_unterminated_string() {
        assert_eq!(
            lex(r#""\q""#),
            Err(LexError::BadEscape {
                ch: 'q',
                pos: Pos::new(1, 2)
            })
        );
        assert_eq!(
            lex("\"never closed"),
            Err(LexError::UnterminatedString {
                pos: Pos::new(1, 1)
            })
        );
    }

    #[test]
    fn lexes_meta_identifiers() {
        assert_eq!(
            kinds(r#"#cpp("x")"#),
            vec![
                TokenKind::MetaIdentifier("#cpp".into()),
                TokenKind::LParen,
                TokenKind::Str("x".into()),
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            lex("# lonely"),
            Err(LexError::UnexpectedChar {
                ch: '#',
                pos: Pos::new(1, 1)
            })
        );
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            kinds("1 // rest of line\n2 /* inline\nspanning */ 3"),
            vec![
                TokenKind::Int("1".into()),
                TokenKind::Int("2".into()),
                TokenKind::Int("3".into()),
                TokenKind::Eof
            ]
        );
        assert_eq!(
            lex("/* open"),
            Err(LexError::UnterminatedComment {
                pos: Pos::new(1, 1)
            })
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let tokens = lex("fn Main\n  { }").expect("lexing should succeed");
        let positions: Vec<_> = tokens.iter().map(|token| token.pos).collect();
        assert_eq!(
            positions,
            vec![
                Pos::new(1, 1),
                Pos::new(1, 4),
                Pos::new(2, 3),
                Pos::new(2, 5),
                Pos::new(2, 6),
            ]
        );
    }
}
