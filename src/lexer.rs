/// The kinds of tokens a sentence template breaks into.
#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// Represents the end of the input.
    Eof,
    /// A run of text outside any field block. Never empty.
    Literal(String),
    /// The inner text of a `{...}` block, without the braces.
    Field(String),
    /// A `{` that was never closed. The block runs to the end of the input.
    Unterminated(String),
}

/// A token with its type and byte position in the template.
#[derive(Debug, Clone)]
pub struct Token {
    pub ttype: TokenType,
    pub pos_start: usize,
    pub pos_end: usize,
}

impl Token {
    pub fn new(ttype: TokenType, pos_start: usize, pos_end: usize) -> Token {
        Token {
            ttype,
            pos_start,
            pos_end,
        }
    }
}

/// Splits a template into literal runs and field blocks.
///
/// Braces do not nest: the first `}` after a `{` closes the block. A `}` seen
/// outside a block is ordinary literal text.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            log::trace!(
                "token {:?} at {}..{}",
                token.ttype,
                token.pos_start,
                token.pos_end
            );
            if token.ttype == TokenType::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    pub fn next_token(&mut self) -> Token {
        let start_pos = self.position;

        let ttype = match self.peek() {
            None => TokenType::Eof,
            Some('{') => {
                self.advance();
                self.read_field()
            }
            Some(_) => self.read_literal(),
        };

        Token::new(ttype, start_pos, self.position)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn read_literal(&mut self) -> TokenType {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '{' {
                break;
            }
            text.push(c);
            self.advance();
        }
        TokenType::Literal(text)
    }

    fn read_field(&mut self) -> TokenType {
        let mut inner = String::new();
        while let Some(c) = self.advance() {
            if c == '}' {
                return TokenType::Field(inner);
            }
            inner.push(c);
        }
        TokenType::Unterminated(inner)
    }
}
