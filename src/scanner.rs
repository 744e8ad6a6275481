// Scanner/tokenizer for source programs.

use std::fmt;

pub const MAX_IDENT_LEN: usize = 11;
pub const MAX_NUMBER_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// End-of-stream sentinel; the cursor yields it forever once the
    /// token vector is exhausted.
    Eof,
    Ident,
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Period,
    Becomes,
    OddKw,
    BeginKw,
    EndKw,
    IfKw,
    ThenKw,
    ElseKw,
    WhileKw,
    DoKw,
    CallKw,
    ConstKw,
    VarKw,
    ProcedureKw,
    ReadKw,
    WriteKw,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

impl Token {
    pub fn eof(line: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
        }
    }
}

/// Lexical error with its 1-based source line.
#[derive(Debug, Clone)]
pub struct ScanError {
    pub line: u32,
    pub message: String,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScanError {}

#[derive(Debug)]
pub struct Scanner {
    source: Vec<u8>,
    cursor: usize,
    line: u32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.as_bytes().to_vec(),
            cursor: 0,
            line: 1,
        }
    }

    /// Scan the whole source into a token vector.
    ///
    /// The vector does not include the end-of-stream sentinel; the token
    /// cursor synthesizes it.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks_and_comments()?;
            let c = match self.current_byte() {
                Some(c) => c,
                None => return Ok(tokens),
            };
            let token = if is_alpha(c) {
                self.scan_word()?
            } else if c.is_ascii_digit() {
                self.scan_number()?
            } else {
                self.scan_symbol()?
            };
            tokens.push(token);
        }
    }

    fn current_byte(&self) -> Option<u8> {
        self.source.get(self.cursor).copied()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.source.get(self.cursor + 1).copied()
    }

    fn advance(&mut self) {
        if self.current_byte() == Some(b'\n') {
            self.line += 1;
        }
        self.cursor += 1;
    }

    fn skip_blanks_and_comments(&mut self) -> Result<(), ScanError> {
        loop {
            match self.current_byte() {
                Some(c) if c.is_ascii_whitespace() => self.advance(),
                Some(b'/') if self.peek_byte() == Some(b'*') => {
                    let open_line = self.line;
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_byte() {
                            Some(b'*') if self.peek_byte() == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                            None => {
                                return Err(ScanError {
                                    line: open_line,
                                    message: "unterminated comment".to_string(),
                                })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_word(&mut self) -> Result<Token, ScanError> {
        let line = self.line;
        let mut text = String::new();
        while let Some(c) = self.current_byte() {
            if is_alpha(c) || c.is_ascii_digit() {
                text.push(c as char);
                self.advance();
            } else {
                break;
            }
        }
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Ident);
        if kind == TokenKind::Ident && text.len() > MAX_IDENT_LEN {
            return Err(self.failure(line, &format!("identifier too long: {text}")));
        }
        Ok(Token { kind, text, line })
    }

    fn scan_number(&mut self) -> Result<Token, ScanError> {
        let line = self.line;
        let mut text = String::new();
        while let Some(c) = self.current_byte() {
            if c.is_ascii_digit() {
                text.push(c as char);
                self.advance();
            } else {
                break;
            }
        }
        if text.len() > MAX_NUMBER_LEN {
            return Err(self.failure(line, &format!("number too long: {text}")));
        }
        Ok(Token {
            kind: TokenKind::Number,
            text,
            line,
        })
    }

    fn scan_symbol(&mut self) -> Result<Token, ScanError> {
        let line = self.line;
        let c = match self.current_byte() {
            Some(c) => c,
            None => return Ok(Token::eof(line)),
        };
        let (kind, len) = match c {
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' => (TokenKind::Star, 1),
            b'/' => (TokenKind::Slash, 1),
            b'=' => (TokenKind::Eql, 1),
            b'(' => (TokenKind::LParen, 1),
            b')' => (TokenKind::RParen, 1),
            b',' => (TokenKind::Comma, 1),
            b';' => (TokenKind::Semicolon, 1),
            b'.' => (TokenKind::Period, 1),
            b'<' => match self.peek_byte() {
                Some(b'>') => (TokenKind::Neq, 2),
                Some(b'=') => (TokenKind::Leq, 2),
                _ => (TokenKind::Lss, 1),
            },
            b'>' => match self.peek_byte() {
                Some(b'=') => (TokenKind::Geq, 2),
                _ => (TokenKind::Gtr, 1),
            },
            b':' => match self.peek_byte() {
                Some(b'=') => (TokenKind::Becomes, 2),
                _ => {
                    return Err(self.failure(line, "':' must be followed by '='"));
                }
            },
            _ => {
                return Err(self.failure(line, &format!("invalid character '{}'", c as char)));
            }
        };
        let mut text = String::new();
        for _ in 0..len {
            if let Some(c) = self.current_byte() {
                text.push(c as char);
            }
            self.advance();
        }
        Ok(Token { kind, text, line })
    }

    fn failure(&self, line: u32, message: &str) -> ScanError {
        ScanError {
            line,
            message: message.to_string(),
        }
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "odd" => TokenKind::OddKw,
        "begin" => TokenKind::BeginKw,
        "end" => TokenKind::EndKw,
        "if" => TokenKind::IfKw,
        "then" => TokenKind::ThenKw,
        "else" => TokenKind::ElseKw,
        "while" => TokenKind::WhileKw,
        "do" => TokenKind::DoKw,
        "call" => TokenKind::CallKw,
        "const" => TokenKind::ConstKw,
        "var" => TokenKind::VarKw,
        "procedure" => TokenKind::ProcedureKw,
        "read" => TokenKind::ReadKw,
        "write" => TokenKind::WriteKw,
        _ => return None,
    };
    Some(kind)
}
