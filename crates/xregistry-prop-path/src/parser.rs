//! UI-form property path parser.
//!
//! The grammar is small but irregular (bare names, bracket indices, quoted
//! bracket keys, a leading `#` for meta properties), so it is tokenized by an
//! explicit state machine driven by a `(state, character class)` table.

use thiserror::Error;

use crate::types::{PathSegment, PropPath};
use crate::util::META_PREFIX;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at position {pos} in \"{path}\"")]
    UnexpectedChar { ch: char, pos: usize, path: String },
    #[error("unexpected end of property in \"{path}\"")]
    UnexpectedEnd { path: String },
    #[error("expecting an integer at position {pos} in \"{path}\"")]
    ExpectedInteger { pos: usize, path: String },
    #[error("expecting a close-quote at position {pos} in \"{path}\"")]
    ExpectedCloseQuote { pos: usize, path: String },
    #[error("empty property name at position {pos} in \"{path}\"")]
    EmptyName { pos: usize, path: String },
    #[error("array index too large at position {pos} in \"{path}\"")]
    IndexTooLarge { pos: usize, path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Ident,
    Dot,
    BracketStart,
    Index,
    BracketEnd,
    QuoteStart,
    QuotedKey,
    QuoteEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Letter,
    Digit,
    Dash,
    Underscore,
    Dot,
    Open,
    Close,
    Quote,
    End,
    Other,
}

const CLASS_COUNT: usize = 10;
const STATE_COUNT: usize = 9;

impl CharClass {
    fn of(ch: Option<char>) -> Self {
        match ch {
            None => CharClass::End,
            Some(c) if c.is_ascii_alphabetic() || c == '*' => CharClass::Letter,
            Some(c) if c.is_ascii_digit() => CharClass::Digit,
            Some('-') => CharClass::Dash,
            Some('_') => CharClass::Underscore,
            Some('.') => CharClass::Dot,
            Some('[') => CharClass::Open,
            Some(']') => CharClass::Close,
            Some('\'') => CharClass::Quote,
            Some(_) => CharClass::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Go(State),
    Done,
    Unexpected,
    UnexpectedEnd,
    ExpectInteger,
    ExpectCloseQuote,
    EmptyName,
}

const ID: Step = Step::Go(State::Ident);
const DOT: Step = Step::Go(State::Dot);
const BRA: Step = Step::Go(State::BracketStart);
const IDX: Step = Step::Go(State::Index);
const KET: Step = Step::Go(State::BracketEnd);
const QST: Step = Step::Go(State::QuoteStart);
const KEY: Step = Step::Go(State::QuotedKey);
const QND: Step = Step::Go(State::QuoteEnd);
const FIN: Step = Step::Done;
const UNX: Step = Step::Unexpected;
const EOS: Step = Step::UnexpectedEnd;
const INT: Step = Step::ExpectInteger;
const CLQ: Step = Step::ExpectCloseQuote;
const EMP: Step = Step::EmptyName;

// Rows follow `State`, columns follow `CharClass`:
//   letter digit  -     _     .     [     ]     '     end   other
#[rustfmt::skip]
const TRANSITIONS: [[Step; CLASS_COUNT]; STATE_COUNT] = [
    /* Start        */ [ID,  ID,   UNX,  ID,   EMP,  BRA,  UNX,  UNX,  FIN,  UNX],
    /* Ident        */ [ID,  ID,   ID,   ID,   DOT,  BRA,  UNX,  UNX,  FIN,  UNX],
    /* Dot          */ [ID,  ID,   UNX,  ID,   EMP,  UNX,  UNX,  UNX,  EOS,  UNX],
    /* BracketStart */ [INT, IDX,  INT,  INT,  INT,  INT,  INT,  QST,  EOS,  INT],
    /* Index        */ [INT, IDX,  INT,  INT,  INT,  INT,  KET,  INT,  EOS,  INT],
    /* BracketEnd   */ [UNX, UNX,  UNX,  UNX,  DOT,  BRA,  UNX,  UNX,  FIN,  UNX],
    /* QuoteStart   */ [KEY, KEY,  KEY,  KEY,  KEY,  KEY,  KEY,  EMP,  CLQ,  KEY],
    /* QuotedKey    */ [KEY, KEY,  KEY,  KEY,  KEY,  KEY,  KEY,  QND,  CLQ,  KEY],
    /* QuoteEnd     */ [UNX, UNX,  UNX,  UNX,  UNX,  UNX,  KET,  UNX,  EOS,  UNX],
];

/// Parser for the human-facing path form: `a.b[3]['x.y'].c`.
pub struct PropPathParser<'a> {
    input: &'a str,
    state: State,
    token: String,
    token_start: usize,
    segments: Vec<PathSegment>,
}

impl<'a> PropPathParser<'a> {
    /// Parse a UI-form path.
    ///
    /// A string starting with `#` names a registry meta property and is
    /// returned whole as a single named segment. The empty string is the
    /// empty path.
    ///
    /// # Example
    ///
    /// ```
    /// use xregistry_prop_path::{PathSegment, PropPathParser};
    ///
    /// let path = PropPathParser::parse("arr[1].sub['k.1']").unwrap();
    /// assert_eq!(
    ///     path.segments(),
    ///     &[
    ///         PathSegment::Name("arr".into()),
    ///         PathSegment::Index(1),
    ///         PathSegment::Name("sub".into()),
    ///         PathSegment::Name("k.1".into()),
    ///     ]
    /// );
    /// assert!(PropPathParser::parse("a[x]").is_err());
    /// ```
    pub fn parse(input: &'a str) -> Result<PropPath, ParseError> {
        if input.starts_with(META_PREFIX) {
            return Ok(PropPath::from_segments(vec![PathSegment::Name(
                input.to_string(),
            )]));
        }

        let mut parser = Self {
            input,
            state: State::Start,
            token: String::new(),
            token_start: 0,
            segments: Vec::new(),
        };
        let result = parser.run();
        match &result {
            Ok(path) => tracing::trace!(input, segments = path.len(), "parsed property path"),
            Err(err) => tracing::trace!(input, %err, "rejected property path"),
        }
        result
    }

    fn run(&mut self) -> Result<PropPath, ParseError> {
        let input = self.input;
        let chars = input.chars().map(Some).chain(std::iter::once(None));
        for (i, ch) in chars.enumerate() {
            let pos = i + 1;
            let class = CharClass::of(ch);
            match TRANSITIONS[self.state as usize][class as usize] {
                Step::Go(next) => self.advance(next, ch, pos)?,
                Step::Done => {
                    if self.state == State::Ident {
                        self.push_name();
                    }
                    break;
                }
                Step::Unexpected => {
                    return Err(match ch {
                        Some(ch) => ParseError::UnexpectedChar {
                            ch,
                            pos,
                            path: self.input.to_string(),
                        },
                        None => self.unexpected_end(),
                    })
                }
                Step::UnexpectedEnd => return Err(self.unexpected_end()),
                Step::ExpectInteger => {
                    return Err(ParseError::ExpectedInteger {
                        pos,
                        path: self.input.to_string(),
                    })
                }
                Step::ExpectCloseQuote => {
                    return Err(ParseError::ExpectedCloseQuote {
                        pos,
                        path: self.input.to_string(),
                    })
                }
                Step::EmptyName => {
                    return Err(ParseError::EmptyName {
                        pos,
                        path: self.input.to_string(),
                    })
                }
            }
        }
        Ok(PropPath::from_segments(std::mem::take(&mut self.segments)))
    }

    fn advance(&mut self, next: State, ch: Option<char>, pos: usize) -> Result<(), ParseError> {
        if matches!(next, State::Ident | State::Index | State::QuotedKey) {
            if let Some(ch) = ch {
                if self.token.is_empty() {
                    self.token_start = pos;
                }
                self.token.push(ch);
            }
        } else {
            match self.state {
                State::Ident | State::QuotedKey => self.push_name(),
                State::Index => self.push_index()?,
                _ => {}
            }
        }
        self.state = next;
        Ok(())
    }

    fn push_name(&mut self) {
        let name = std::mem::take(&mut self.token);
        self.segments.push(PathSegment::Name(name));
    }

    fn push_index(&mut self) -> Result<(), ParseError> {
        let idx = self
            .token
            .parse::<usize>()
            .map_err(|_| ParseError::IndexTooLarge {
                pos: self.token_start,
                path: self.input.to_string(),
            })?;
        self.token.clear();
        self.segments.push(PathSegment::Index(idx));
        Ok(())
    }

    fn unexpected_end(&self) -> ParseError {
        ParseError::UnexpectedEnd {
            path: self.input.to_string(),
        }
    }
}
