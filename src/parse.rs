//! Parsing call scripts.
//!
//! The recursive descent [`Context`] defined here is also used by the table
//! loader in [`crate::table`] to read the intrinsic definition file.

use crate::ast::{Program, Span};
use crate::lex::{Input, Token, TokenKind};

mod call;
mod error;
mod ty;


pub use error::{ParseError, ParseErrorKind};
pub(crate) use ty::{matrix_shape_from_name, scalar_from_name};

pub fn parse(source: &str, source_id: usize) -> Result<Program, ParseError> {
    let mut context = Context::new(source, source_id)?;

    let mut program = vec![];
    while context.peek().kind != TokenKind::End {
        program.push(context.parse_call()?);
    }

    Ok(program)
}

/// Ambient arguments for the recursive descent parser.
#[derive(Debug)]
pub(crate) struct Context<'s> {
    /// The source we're parsing.
    input: Input<'s>,

    /// The next token. At end of file, this is `TokenKind::End`.
    next: Token<'s>,
}

impl<'s> Context<'s> {
    pub fn new(source: &'s str, source_id: usize) -> Result<Self, ParseError> {
        let mut input = Input::new(source, source_id);
        let next = input.get_token()?;
        Ok(Context { input, next })
    }

    pub fn peek(&self) -> &Token<'s> {
        &self.next
    }

    /// Consume the next token and return it.
    pub fn next(&mut self) -> Result<Token<'s>, ParseError> {
        let following = self.input.get_token()?;
        Ok(std::mem::replace(&mut self.next, following))
    }

    /// If the next token is `kind`, consume it and return its span.
    pub fn take_if(&mut self, kind: &TokenKind) -> Result<Option<Span>, ParseError> {
        if self.next.kind == *kind {
            let token = self.next()?;
            Ok(Some(token.span))
        } else {
            Ok(None)
        }
    }

    /// Consume a token of the given `kind`, or report the error `error`
    /// produces at the next token.
    pub fn expect<F>(&mut self, kind: &TokenKind, error: F) -> Result<Span, ParseError>
    where
        F: FnOnce() -> ParseErrorKind,
    {
        match self.take_if(kind)? {
            Some(span) => Ok(span),
            None => Err(ParseError {
                kind: error(),
                span: self.next.span.clone(),
            }),
        }
    }

    /// Consume the symbol `ch`, or report that `context` needed it.
    pub fn expect_symbol(&mut self, ch: char, context: &'static str) -> Result<Span, ParseError> {
        let found = self.next.kind.description();
        self.expect(&TokenKind::Symbol(ch), || ParseErrorKind::ExpectedSymbol {
            symbol: ch,
            context,
            found,
        })
    }

    /// Consume an identifier, or report that `what` was expected.
    pub fn expect_ident(&mut self, what: &'static str) -> Result<(&'s str, Span), ParseError> {
        match self.next.kind {
            TokenKind::Ident(ident) => {
                let token = self.next()?;
                Ok((ident, token.span))
            }
            ref other => Err(ParseError {
                kind: ParseErrorKind::Expected {
                    what,
                    found: other.description(),
                },
                span: self.next.span.clone(),
            }),
        }
    }

    /// Parse a comma-separated list of items ending with `close`, which is
    /// consumed. The opening bracket must already have been consumed.
    ///
    /// Returns the items and the span of the closing bracket.
    pub fn parse_list<T, F>(
        &mut self,
        close: char,
        context: &'static str,
        mut item: F,
    ) -> Result<(Vec<T>, Span), ParseError>
    where
        F: FnMut(&mut Self) -> Result<T, ParseError>,
    {
        let mut items = vec![];
        loop {
            if let Some(span) = self.take_if(&TokenKind::Symbol(close))? {
                return Ok((items, span));
            }
            items.push(item(self)?);
            if self.take_if(&TokenKind::Symbol(','))?.is_none() {
                let span = self.expect_symbol(close, context)?;
                return Ok((items, span));
            }
        }
    }

    /// Consume a run of symbol characters, such as `<<=`, stopping before
    /// any character in `stop`.
    pub fn take_symbols(&mut self, stop: &[char]) -> Result<Option<(String, Span)>, ParseError> {
        let mut text = String::new();
        let mut span: Option<Span> = None;
        while let TokenKind::Symbol(ch) = self.next.kind {
            if stop.contains(&ch) {
                break;
            }
            let token = self.next()?;
            text.push(ch);
            span = Some(match span {
                Some(start) => crate::ast::join_spans(&start, &token.span),
                None => token.span,
            });
        }
        Ok(span.map(|span| (text, span)))
    }
}
