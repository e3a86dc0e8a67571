//! Syntax tree for call scripts.
//!
//! A call script is a list of calls, one per statement, each naming an
//! intrinsic and the types of its arguments. Types are kept syntactic here;
//! [`crate::run`] interns them.

use crate::ty::{Access, AddressSpace, Scalar, TexelFormat, TextureDimension, VectorSize};
use std::ops::Range;

/// A source location: a source id, as registered with an
/// [`error::Cache`], and a byte range within that source.
///
/// [`error::Cache`]: crate::error::Cache
pub type Span = (usize, Range<usize>);

pub type Program = Vec<Call>;

/// A call to resolve.
///
/// ```text
/// call = [ "const" | "runtime" ] target [ "<" type { "," type } ">" ]
///        "(" [ type { "," type } ] ")"
/// ```
#[derive(Debug)]
pub struct Call {
    /// The explicitly requested stage, if any.
    pub stage: Option<(StageKeyword, Span)>,
    pub target: Target,
    pub template_args: Vec<Type>,
    pub args: Vec<Type>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StageKeyword {
    Const,
    Runtime,
}

#[derive(Debug)]
pub enum Target {
    /// A builtin function or a type constructor, looked up by name.
    Named { name: String, span: Span },

    /// `operator OP`: the operator's spelling, and its span.
    Operator { symbol: String, span: Span },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    Scalar(Scalar),
    Vector {
        size: VectorSize,
        component: Box<Type>,
    },
    Matrix {
        columns: VectorSize,
        rows: VectorSize,
        component: Box<Type>,
    },
    Atomic(Box<Type>),
    Array {
        element_type: Box<Type>,
        length: Option<u32>,
    },
    Pointer {
        space: AddressSpace,
        store: Box<Type>,
        access: Access,
    },
    Reference {
        space: AddressSpace,
        store: Box<Type>,
        access: Access,
    },
    Sampler {
        comparison: bool,
    },
    SampledTexture {
        dim: TextureDimension,
        multisampled: bool,
        sampled: Box<Type>,
    },
    DepthTexture {
        dim: TextureDimension,
        multisampled: bool,
    },
    StorageTexture {
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    },
    ExternalTexture,
}

pub fn join_spans(left: &Span, right: &Span) -> Span {
    assert_eq!(left.0, right.0);
    (left.0, left.1.start..right.1.end)
}
