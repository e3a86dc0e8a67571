//! Tokenizing intrinsic definitions and call scripts.
//!
//! The table definition file and call scripts share one token language:
//! identifiers, decimal integers, single-character symbols, and a handful of
//! keywords. Multi-character operators like `<<=` are assembled by the
//! parsers from adjacent symbols.

use unicode_xid::UnicodeXID;

use crate::ast::Span;

use std::str::FromStr;


#[derive(Debug, PartialEq)]
pub struct Token<'s> {
    pub kind: TokenKind<'s>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind<'s> {
    End,
    Symbol(char),
    Number(u32),
    Ident(&'s str),

    // Call scripts.
    Const,
    Runtime,
    Operator,

    // Definition files.
    Match,
    Fn,
    Op,
    Ctor,
    Conv,

    /// `abstract-int`, which is spelled with a hyphen.
    AbstractInt,

    /// `abstract-float`, which is spelled with a hyphen.
    AbstractFloat,
}

pub type TokenResult<'s> = std::result::Result<Token<'s>, TokenError>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenError {
    pub kind: TokenErrorKind,
    pub span: Span,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenErrorKind {
    NumberOutOfRange,
}

/// Positions in which brackets could occur.
///
/// This isn't really used in tokenizing itself, but it's useful when
/// talking about tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BracketPosition {
    Open,
    Close,
}

#[derive(Debug)]
pub struct Input<'s> {
    /// The full text of the input.
    text: &'s str,

    /// The tail of `text` that remains to be processed.
    rest: &'s str,

    /// The id of the source from which the input is drawn.
    source_id: usize,
}

impl<'s> Input<'s> {
    pub fn new(text: &'s str, source_id: usize) -> Input {
        Input {
            text,
            rest: text,
            source_id,
        }
    }

    pub fn get_token(&mut self) -> TokenResult<'s> {
        let token_start;

        let token = loop {
            self.rest = self.rest.trim_start();
            if self.rest.is_empty() {
                // End of input.
                token_start = self.offset(self.rest);
                break TokenKind::End;
            } else if let Some(comment) = self.rest.strip_prefix("//") {
                // Comment until end of line.
                if let Some((_text, end)) = comment.split_once('\n') {
                    self.rest = end;
                } else {
                    self.rest = "";
                }
            } else if self.rest.starts_with(|ch: char| ch.is_ascii_digit()) {
                return self.get_number();
            } else if self
                .rest
                .starts_with(|ch: char| ch == '_' || ch.is_xid_start())
            {
                return Ok(self.get_ident());
            } else {
                // Single-character symbol.
                token_start = self.offset(self.rest);
                let mut chars = self.rest.chars();
                match chars.next() {
                    Some(first) => {
                        self.rest = chars.as_str();
                        break TokenKind::Symbol(first);
                    }
                    None => break TokenKind::End,
                }
            }
        };

        let token_end = self.offset(self.rest);

        Ok(Token {
            kind: token,
            span: (self.source_id, token_start..token_end),
        })
    }

    /// Return the offset of the start of `rest` within `self.text`.
    ///
    /// `rest` must be a complete tail of `self.text`. This restriction lets us
    /// use the slices' lengths, rather than their pointers, to compute the
    /// offset.
    #[inline]
    fn offset(&self, rest: &str) -> usize {
        self.text.len() - rest.len()
    }

    /// Accept `new_rest` as the new substring of `self.text` remaining to process.
    ///
    /// Return the substring that this update advances over, and a
    /// `Span` describing its position in `self.text`.
    fn advance_to(&mut self, new_rest: &'s str) -> (&'s str, Span) {
        let span = self.offset(self.rest)..self.offset(new_rest);
        let text = &self.text[span.clone()];
        self.rest = new_rest;
        (text, (self.source_id, span))
    }

    fn get_number(&mut self) -> TokenResult<'s> {
        let rest = self.rest.trim_start_matches(|ch: char| ch.is_ascii_digit());
        let (number_text, span) = self.advance_to(rest);

        // The text is all ASCII digits, so the only possible failure is
        // overflow.
        match u32::from_str(number_text) {
            Ok(n) => Ok(Token {
                kind: TokenKind::Number(n),
                span,
            }),
            Err(_) => Err(TokenError {
                kind: TokenErrorKind::NumberOutOfRange,
                span,
            }),
        }
    }

    fn get_ident(&mut self) -> Token<'s> {
        let mut rest = self
            .rest
            .trim_start_matches(|ch: char| ch.is_xid_continue());

        // The abstract numeric types are the only identifiers containing
        // hyphens.
        if self.rest.len() - rest.len() == "abstract".len() && self.rest.starts_with("abstract") {
            for suffix in ["-int", "-float"] {
                if let Some(after) = rest.strip_prefix(suffix) {
                    if !after.starts_with(|ch: char| ch.is_xid_continue()) {
                        rest = after;
                        break;
                    }
                }
            }
        }

        let (ident, span) = self.advance_to(rest);

        let kind = match ident {
            "const" => TokenKind::Const,
            "runtime" => TokenKind::Runtime,
            "operator" => TokenKind::Operator,
            "match" => TokenKind::Match,
            "fn" => TokenKind::Fn,
            "op" => TokenKind::Op,
            "ctor" => TokenKind::Ctor,
            "conv" => TokenKind::Conv,
            "abstract-int" => TokenKind::AbstractInt,
            "abstract-float" => TokenKind::AbstractFloat,
            _ => TokenKind::Ident(ident),
        };

        Token { kind, span }
    }
}

impl<'s> TokenKind<'s> {
    pub fn description(&self) -> String {
        let s = match *self {
            TokenKind::End => "end of file",
            TokenKind::Symbol(ch) => return format!("`{}`", ch),
            TokenKind::Number(_) => "a number",
            TokenKind::Ident(ident) => return format!("`{}`", ident),
            TokenKind::Const => "`const`",
            TokenKind::Runtime => "`runtime`",
            TokenKind::Operator => "`operator`",
            TokenKind::Match => "`match`",
            TokenKind::Fn => "`fn`",
            TokenKind::Op => "`op`",
            TokenKind::Ctor => "`ctor`",
            TokenKind::Conv => "`conv`",
            TokenKind::AbstractInt => "`abstract-int`",
            TokenKind::AbstractFloat => "`abstract-float`",
        };

        s.to_string()
    }
}

impl TokenError {
    pub fn message(&self) -> &'static str {
        match self.kind {
            TokenErrorKind::NumberOutOfRange => "number out of range",
        }
    }
}

impl BracketPosition {
    pub fn angle_token(self) -> TokenKind<'static> {
        TokenKind::Symbol(self.angle_char())
    }

    pub fn angle_char(self) -> char {
        match self {
            BracketPosition::Open => '<',
            BracketPosition::Close => '>',
        }
    }

    pub fn angle_description(self) -> &'static str {
        match self {
            BracketPosition::Open => "opening '<'",
            BracketPosition::Close => "closing '>'",
        }
    }
}
