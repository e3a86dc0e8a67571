//! Resolution errors.

use crate::ast::Span;
use crate::error;

use std::io;

/// A call that could not be resolved.
///
/// The `Display` form is the plain diagnostic, as golden tests expect it:
///
/// ```text
/// error: no matching overload for operator - (bool)
///
/// 2 candidate operators:
///   operator - (T) -> T  where: T is abstract-float, abstract-int, f32, i32 or f16
///   operator - (vecN<T>) -> vecN<T>  where: T is abstract-float, abstract-int, f32, i32 or f16
/// ```
#[derive(Debug, thiserror::Error)]
#[error("error: {kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub span: Span,
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No candidate matched. `message` is the full text: headline, then the
    /// candidate lists.
    #[error("{message}")]
    NoMatch { signature: String, message: String },

    /// The table or the matcher broke one of its own invariants.
    #[error("internal error while matching {signature}: {detail}")]
    Internal { signature: String, detail: String },
}

impl error::AriadneReport for Error {
    fn write_with_config<W>(
        &self,
        stream: W,
        cache: &mut error::Cache,
        config: ariadne::Config,
    ) -> io::Result<()>
    where
        W: io::Write,
    {
        use ariadne::{Label, Report, ReportKind};

        let (source_id, range) = self.span.clone();
        let mut builder =
            Report::build(ReportKind::Error, source_id, range.start).with_config(config);

        let label = match self.kind {
            ErrorKind::NoMatch { ref message, .. } => {
                // The headline becomes the report message; the candidate
                // lists follow as a note.
                let (headline, candidates) = message.split_once('\n').unwrap_or((message, ""));
                builder.set_message(headline);
                let candidates = candidates.trim();
                if !candidates.is_empty() {
                    builder.set_note(candidates);
                }
                "no overload matches this call"
            }
            ErrorKind::Internal { ref detail, .. } => {
                builder.set_message(format!("Internal error: {}", detail));
                "while resolving this call"
            }
        };

        builder.add_label(Label::new(self.span.clone()).with_message(label));
        builder.finish().write(cache, stream)
    }
}
