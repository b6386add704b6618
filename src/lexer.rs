//! A streaming lexer for JSONPath query expressions.
//!
//! [`tokenize`] produces a vector of tokens ending with either an `Eoq`
//! token or an `Error` token describing the first lexical fault. [`lex`]
//! converts a trailing `Error` token into a [`JSONPathError`].

use crate::{
    errors::JSONPathError,
    token::{Token, TokenKind, EOQ},
};

use std::str::CharIndices;

/// Lexer state. Each state knows which characters and operators are
/// legal at the current position in the query.
#[derive(Debug, Clone, Copy)]
enum State {
    Root,
    Segment,
    DescendantSegment,
    ShorthandSegment,
    BracketedSegment,
    Filter,
    Str { quote: char, filter: bool },
}

struct Lexer<'q> {
    query: &'q str,
    tokens: Vec<Token>,

    chars: CharIndices<'q>,
    start: usize,
    pos: usize,

    // Nesting of `?` filter selectors.
    filter_depth: u32,
    // One entry per open function call, counting parens opened inside it.
    paren_stack: Vec<u32>,
}

pub fn tokenize(query: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(query);
    lexer.run();
    lexer.tokens
}

pub fn lex(query: &str) -> Result<Vec<Token>, JSONPathError> {
    let tokens = tokenize(query);
    match tokens.last() {
        Some(Token {
            kind: TokenKind::Error { msg },
            span,
        }) => Err(JSONPathError::syntax((*msg).to_string(), *span)),
        _ => Ok(tokens),
    }
}

impl<'q> Lexer<'q> {
    fn new(query: &'q str) -> Self {
        Self {
            query,
            tokens: Vec::new(),
            chars: query.char_indices(),
            start: 0,
            pos: 0,
            filter_depth: 0,
            paren_stack: Vec::new(),
        }
    }

    fn run(&mut self) {
        let mut state = State::Root;
        loop {
            let next_state = match state {
                State::Root => self.lex_root(),
                State::Segment => self.lex_segment(),
                State::DescendantSegment => self.lex_descendant_segment(),
                State::ShorthandSegment => self.lex_shorthand_segment(),
                State::BracketedSegment => self.lex_bracketed_segment(),
                State::Filter => self.lex_filter(),
                State::Str { quote, filter } => self.lex_string(quote, filter),
            };

            match next_state {
                Some(s) => state = s,
                None => break,
            }
        }
    }

    fn emit(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.start, self.pos));
        self.start = self.pos;
    }

    fn error(&mut self, msg: String) -> Option<State> {
        self.tokens.push(Token::new(
            TokenKind::Error {
                msg: msg.into_boxed_str(),
            },
            self.start,
            self.pos,
        ));
        None
    }

    /// The text between the last emit/ignore and the current position.
    fn text(&self) -> &str {
        &self.query[self.start..self.pos]
    }

    fn boxed_text(&self) -> Box<str> {
        self.text().to_string().into_boxed_str()
    }

    fn next(&mut self) -> Option<char> {
        let (pos, ch) = self.chars.next()?;
        self.pos = pos + ch.len_utf8();
        Some(ch)
    }

    fn peek(&self) -> char {
        self.chars.clone().next().map(|(_, ch)| ch).unwrap_or(EOQ)
    }

    /// Drop the pending text without emitting a token.
    fn ignore(&mut self) {
        self.start = self.pos;
    }

    fn accept(&mut self, ch: char) -> bool {
        if self.peek() == ch {
            self.next();
            true
        } else {
            false
        }
    }

    fn accept_if(&mut self, pred: impl FnOnce(char) -> bool) -> bool {
        if pred(self.peek()) {
            self.next();
            true
        } else {
            false
        }
    }

    fn accept_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let mut accepted = false;
        while pred(self.peek()) {
            self.next();
            accepted = true;
        }
        accepted
    }

    fn skip_whitespace(&mut self) -> bool {
        debug_assert!(
            self.pos == self.start,
            "must emit or ignore before skipping whitespace"
        );
        if self.accept_while(is_whitespace) {
            self.ignore();
            true
        } else {
            false
        }
    }

    fn lex_root(&mut self) -> Option<State> {
        if self.accept('$') {
            self.emit(TokenKind::Root);
            Some(State::Segment)
        } else {
            let msg = format!("expected '$', found '{}'", self.next().unwrap_or(EOQ));
            self.error(msg)
        }
    }

    fn lex_segment(&mut self) -> Option<State> {
        if self.skip_whitespace() && self.peek() == EOQ {
            return self.error(String::from("unexpected trailing whitespace"));
        }

        if self.accept('.') {
            if self.accept('.') {
                self.emit(TokenKind::DoubleDot);
                Some(State::DescendantSegment)
            } else {
                Some(State::ShorthandSegment)
            }
        } else if self.accept('[') {
            self.emit(TokenKind::LBracket);
            Some(State::BracketedSegment)
        } else if self.filter_depth > 0 {
            // A filter subquery has run out of segments.
            Some(State::Filter)
        } else if self.peek() == EOQ {
            self.emit(TokenKind::Eoq);
            None
        } else {
            let msg = format!(
                "expected '.', '..' or a bracketed selection, found '{}'",
                self.next().unwrap_or(EOQ)
            );
            self.error(msg)
        }
    }

    fn lex_descendant_segment(&mut self) -> Option<State> {
        if self.accept('*') {
            self.emit(TokenKind::Wild);
            Some(State::Segment)
        } else if self.accept('[') {
            self.emit(TokenKind::LBracket);
            Some(State::BracketedSegment)
        } else if self.accept_if(is_name_first) {
            self.accept_while(is_name_char);
            self.emit(TokenKind::Name {
                value: self.boxed_text(),
            });
            Some(State::Segment)
        } else {
            let msg = format!("unexpected descendant selection token '{}'", self.peek());
            self.error(msg)
        }
    }

    fn lex_shorthand_segment(&mut self) -> Option<State> {
        self.ignore(); // drop the dot

        if self.accept_while(is_whitespace) {
            return self.error(String::from("unexpected whitespace after dot"));
        }

        if self.accept('*') {
            self.emit(TokenKind::Wild);
            Some(State::Segment)
        } else if self.accept_if(is_name_first) {
            self.accept_while(is_name_char);
            self.emit(TokenKind::Name {
                value: self.boxed_text(),
            });
            Some(State::Segment)
        } else {
            let msg = format!(
                "unexpected shorthand selector '{}'",
                self.next().unwrap_or(EOQ)
            );
            self.error(msg)
        }
    }

    fn lex_bracketed_segment(&mut self) -> Option<State> {
        self.skip_whitespace();

        match self.peek() {
            ']' => {
                self.next();
                self.emit(TokenKind::RBracket);
                if self.filter_depth > 0 {
                    Some(State::Filter)
                } else {
                    Some(State::Segment)
                }
            }
            '*' => {
                self.next();
                self.emit(TokenKind::Wild);
                Some(State::BracketedSegment)
            }
            '?' => {
                self.next();
                self.emit(TokenKind::Filter);
                self.filter_depth += 1;
                Some(State::Filter)
            }
            ',' => {
                self.next();
                self.emit(TokenKind::Comma);
                Some(State::BracketedSegment)
            }
            ':' => {
                self.next();
                self.emit(TokenKind::Colon);
                Some(State::BracketedSegment)
            }
            '\'' => {
                self.next();
                Some(State::Str {
                    quote: '\'',
                    filter: false,
                })
            }
            '"' => {
                self.next();
                Some(State::Str {
                    quote: '"',
                    filter: false,
                })
            }
            '-' => {
                // A negative array index or slice component.
                self.next();
                if self.accept_while(is_digit) {
                    self.emit(TokenKind::Index {
                        value: self.boxed_text(),
                    });
                    Some(State::BracketedSegment)
                } else {
                    let msg = format!("expected a digit after '-', found '{}'", self.peek());
                    self.error(msg)
                }
            }
            EOQ => self.error(String::from("unclosed bracketed selection")),
            _ => {
                if self.accept_while(is_digit) {
                    self.emit(TokenKind::Index {
                        value: self.boxed_text(),
                    });
                    Some(State::BracketedSegment)
                } else {
                    let msg = format!("unexpected '{}' in bracketed selection", self.peek());
                    self.error(msg)
                }
            }
        }
    }

    fn lex_filter(&mut self) -> Option<State> {
        self.skip_whitespace();

        match self.peek() {
            EOQ => self.error(String::from("unclosed bracketed selection")),
            ']' => {
                // End of this filter selector. The bracketed segment state
                // consumes the bracket.
                self.filter_depth -= 1;
                if !self.paren_stack.is_empty() {
                    self.error(String::from("unbalanced parentheses"))
                } else {
                    Some(State::BracketedSegment)
                }
            }
            ',' => {
                self.next();
                self.emit(TokenKind::Comma);
                // Inside a function call a comma separates arguments,
                // otherwise it separates selectors and ends this filter.
                if self.paren_stack.is_empty() {
                    self.filter_depth -= 1;
                    Some(State::BracketedSegment)
                } else {
                    Some(State::Filter)
                }
            }
            '\'' => {
                self.next();
                Some(State::Str {
                    quote: '\'',
                    filter: true,
                })
            }
            '"' => {
                self.next();
                Some(State::Str {
                    quote: '"',
                    filter: true,
                })
            }
            '(' => {
                self.next();
                self.emit(TokenKind::LParen);
                if let Some(count) = self.paren_stack.last_mut() {
                    // A parenthesized expression inside a function call.
                    *count += 1;
                }
                Some(State::Filter)
            }
            ')' => {
                self.next();
                self.emit(TokenKind::RParen);
                match self.paren_stack.last_mut() {
                    Some(1) => {
                        // Closes the current function call.
                        self.paren_stack.pop();
                    }
                    Some(count) => *count -= 1,
                    None => (),
                }
                Some(State::Filter)
            }
            '$' => {
                self.next();
                self.emit(TokenKind::Root);
                Some(State::Segment)
            }
            '@' => {
                self.next();
                self.emit(TokenKind::Current);
                Some(State::Segment)
            }
            '.' => Some(State::Segment),
            '!' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Ne);
                } else {
                    self.emit(TokenKind::Not);
                }
                Some(State::Filter)
            }
            '=' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Eq);
                    Some(State::Filter)
                } else {
                    self.error(String::from("expected '==', found '='"))
                }
            }
            '<' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Le);
                } else {
                    self.emit(TokenKind::Lt);
                }
                Some(State::Filter)
            }
            '>' => {
                self.next();
                if self.accept('=') {
                    self.emit(TokenKind::Ge);
                } else {
                    self.emit(TokenKind::Gt);
                }
                Some(State::Filter)
            }
            '&' => {
                self.next();
                if self.accept('&') {
                    self.emit(TokenKind::And);
                    Some(State::Filter)
                } else {
                    self.error(String::from("unexpected '&', did you mean '&&'?"))
                }
            }
            '|' => {
                self.next();
                if self.accept('|') {
                    self.emit(TokenKind::Or);
                    Some(State::Filter)
                } else {
                    self.error(String::from("unexpected '|', did you mean '||'?"))
                }
            }
            '-' => {
                self.next();
                self.lex_number()
            }
            ch => {
                if is_digit(ch) {
                    self.lex_number()
                } else if self.accept_while(is_function_name_first) {
                    self.accept_while(is_function_name_char);
                    match self.text() {
                        "true" => self.emit(TokenKind::True),
                        "false" => self.emit(TokenKind::False),
                        "null" => self.emit(TokenKind::Null),
                        _ => {
                            if self.peek() == '(' {
                                self.paren_stack.push(1);
                                self.emit(TokenKind::Function {
                                    name: self.boxed_text(),
                                });
                                self.next();
                                self.ignore(); // drop the open paren
                            } else {
                                return self
                                    .error(String::from("expected a keyword or function call"));
                            }
                        }
                    }
                    Some(State::Filter)
                } else {
                    let msg = format!("unexpected filter expression token '{}'", ch);
                    self.error(msg)
                }
            }
        }
    }

    /// Lex an int or float literal inside a filter. A leading hyphen, if
    /// any, has already been accepted.
    fn lex_number(&mut self) -> Option<State> {
        if !self.accept_while(is_digit) {
            let msg = format!("expected a digit, found '{}'", self.peek());
            return self.error(msg);
        }

        if self.accept('.') {
            if !self.accept_while(is_digit) {
                return self.error(String::from(
                    "a fractional digit is required after a decimal point",
                ));
            }

            if self.accept_if(|ch| ch == 'e' || ch == 'E') {
                self.accept_if(|ch| ch == '+' || ch == '-');
                if !self.accept_while(is_digit) {
                    return self.error(String::from("at least one exponent digit is required"));
                }
            }

            self.emit(TokenKind::Float {
                value: self.boxed_text(),
            });
        } else if self.accept_if(|ch| ch == 'e' || ch == 'E') {
            if self.accept('-') {
                // A negative exponent makes this a float.
                if !self.accept_while(is_digit) {
                    return self.error(String::from("at least one exponent digit is required"));
                }
                self.emit(TokenKind::Float {
                    value: self.boxed_text(),
                });
            } else {
                self.accept('+');
                if !self.accept_while(is_digit) {
                    return self.error(String::from("at least one exponent digit is required"));
                }
                self.emit(TokenKind::Int {
                    value: self.boxed_text(),
                });
            }
        } else {
            self.emit(TokenKind::Int {
                value: self.boxed_text(),
            });
        }

        Some(State::Filter)
    }

    /// Lex a string literal. The opening quote has been consumed. The
    /// emitted token covers the raw text between the quotes, escape
    /// sequences intact; the parser unescapes and validates further.
    fn lex_string(&mut self, quote: char, filter: bool) -> Option<State> {
        self.ignore(); // drop the open quote

        loop {
            match self.peek() {
                '\\' => {
                    self.next();
                    if !self.accept_if(|ch| is_escapable(ch) || ch == quote) {
                        return self.error(String::from("invalid escape sequence"));
                    }
                }
                EOQ => {
                    let msg = format!("unclosed string starting at index {}", self.start);
                    return self.error(msg);
                }
                ch if ch == quote => {
                    self.emit(match quote {
                        '\'' => TokenKind::SingleQuoteString {
                            value: self.boxed_text(),
                        },
                        _ => TokenKind::DoubleQuoteString {
                            value: self.boxed_text(),
                        },
                    });
                    self.next();
                    self.ignore(); // drop the closing quote
                    return Some(if filter {
                        State::Filter
                    } else {
                        State::BracketedSegment
                    });
                }
                _ => {
                    self.next();
                }
            }
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

// name-first per RFC 9535: ALPHA / "_" / %x80 and up.
fn is_name_first(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch as u32 >= 0x80
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch as u32 >= 0x80
}

// Function names are LCALPHA / "_" / DIGIT, starting with LCALPHA.
fn is_function_name_first(ch: char) -> bool {
    ch.is_ascii_lowercase()
}

fn is_function_name_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_'
}

fn is_escapable(ch: char) -> bool {
    matches!(ch, 'b' | 'f' | 'n' | 'r' | 't' | 'u' | '/' | '\\')
}
