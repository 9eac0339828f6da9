//! Tokenizer and tolerant tree builder for the parenthesized record syntax.
//!
//! The tree builder never fails: unclosed groups are closed at end of input
//! and stray closing parentheses are dropped. Balance problems are reported
//! separately by the syntax checks, which work on the raw text.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Open,
    Close,
    Comma,
    Equals,
    Quoted(&'a str),
    Atom(&'a str),
}

pub(crate) struct Lexed<'a> {
    pub(crate) tokens: Vec<Token<'a>>,
    pub(crate) unterminated_string: bool,
}

pub(crate) fn tokenize(input: &str) -> Lexed<'_> {
    let mut tokens = Vec::new();
    let mut unterminated_string = false;
    let bytes = input.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            b'(' => {
                tokens.push(Token::Open);
                index += 1;
            }
            b')' => {
                tokens.push(Token::Close);
                index += 1;
            }
            b',' => {
                tokens.push(Token::Comma);
                index += 1;
            }
            b'=' => {
                tokens.push(Token::Equals);
                index += 1;
            }
            b'"' => {
                let start = index + 1;
                match input[start..].find('"') {
                    Some(len) => {
                        tokens.push(Token::Quoted(&input[start..start + len]));
                        index = start + len + 1;
                    }
                    None => {
                        unterminated_string = true;
                        tokens.push(Token::Quoted(&input[start..]));
                        index = bytes.len();
                    }
                }
            }
            byte if byte.is_ascii_whitespace() => index += 1,
            _ => {
                let start = index;
                while index < bytes.len() && !is_boundary(bytes[index]) {
                    index += 1;
                }
                tokens.push(Token::Atom(&input[start..index]));
            }
        }
    }

    Lexed { tokens, unterminated_string }
}

fn is_boundary(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b',' | b'=' | b'"') || byte.is_ascii_whitespace()
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Node {
    Quoted(String),
    Bare(String),
    List(Vec<Item>),
    /// Nothing between a `=` or separator and the next delimiter.
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Item {
    pub(crate) key: Option<String>,
    pub(crate) value: Node,
}

impl Node {
    pub(crate) fn items(&self) -> &[Item] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    /// First value stored under `key` in this list.
    pub(crate) fn field(&self, key: &str) -> Option<&Node> {
        self.items().iter().find(|item| item.key.as_deref() == Some(key)).map(|item| &item.value)
    }

    pub(crate) fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Scalar text with quotes removed; `None` for lists and empty values.
    pub(crate) fn text(&self) -> Option<&str> {
        match self {
            Self::Quoted(text) | Self::Bare(text) => Some(text),
            Self::List(_) | Self::Empty => None,
        }
    }

    /// Flattens a possibly nested single-element list, e.g. `(20)` or `((20))`.
    pub(crate) fn innermost(&self) -> &Node {
        match self {
            Self::List(items) if items.len() == 1 && items[0].key.is_none() => {
                items[0].value.innermost()
            }
            _ => self,
        }
    }
}

/// Builds the tree for one record. The returned list holds the record's
/// top-level items, normally a single `Key=(...)` assignment.
pub(crate) fn parse_tree(tokens: &[Token<'_>]) -> Node {
    let mut cursor = Cursor { tokens, position: 0 };
    let mut items = Vec::new();
    while !cursor.at_end() {
        match cursor.peek() {
            Some(Token::Comma) | Some(Token::Close) => cursor.advance(),
            _ => items.push(cursor.item()),
        }
    }
    Node::List(items)
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
}

impl<'a> Cursor<'_, 'a> {
    fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn peek_second(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn item(&mut self) -> Item {
        if let (Some(Token::Atom(key)), Some(Token::Equals)) = (self.peek(), self.peek_second()) {
            let key = key.to_string();
            self.position += 2;
            return Item { key: Some(key), value: self.value() };
        }
        Item { key: None, value: self.value() }
    }

    fn value(&mut self) -> Node {
        match self.peek() {
            Some(Token::Open) => {
                self.advance();
                self.list()
            }
            Some(Token::Quoted(text)) => {
                let text = text.to_string();
                self.advance();
                Node::Quoted(text)
            }
            Some(Token::Atom(text)) => {
                let text = text.to_string();
                self.advance();
                Node::Bare(text)
            }
            Some(Token::Equals) => {
                self.advance();
                self.value()
            }
            Some(Token::Comma) | Some(Token::Close) | None => Node::Empty,
        }
    }

    fn list(&mut self) -> Node {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(Token::Close) => {
                    self.advance();
                    break;
                }
                Some(Token::Comma) => self.advance(),
                Some(_) => items.push(self.item()),
            }
        }
        Node::List(items)
    }
}
