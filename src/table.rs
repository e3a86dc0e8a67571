//! The overload signature table.
//!
//! Every builtin function, operator, and type constructor is described by a
//! list of [`OverloadInfo`] records, in declaration order. Overloads are
//! written in a small definition language, embedded in the crate as
//! [`DEFINITIONS`] and read by [`def`] when the table is loaded.
//!
//! Signatures are [`Pattern`]s over the overload's templates. A type template
//! stands for a whole type, and may be constrained to a set of scalar types
//! by a [`Constraint`]. A number template stands for a vector width, a matrix
//! dimension, or a WGSL enumerant like an access mode.

pub mod def;


use crate::ty::{Access, AddressSpace, Enumerant, Scalar, TexelFormat, TextureDimension};

use indexmap::IndexMap;

pub use def::{DefError, DefErrorKind};

/// The builtin definitions.
pub const DEFINITIONS: &str = include_str!("table/intrinsics.def");

/// A builtin function, as found by [`Table::builtin`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BuiltinFn(usize);

/// A type constructor and conversion family, as found by
/// [`Table::ctor_conv`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CtorConv(usize);

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UnaryOp {
    Complement,
    Negation,
    Not,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    LogicalAnd,
    LogicalOr,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    ShiftLeft,
    ShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl UnaryOp {
    pub const ALL: &'static [UnaryOp] = &[UnaryOp::Complement, UnaryOp::Negation, UnaryOp::Not];

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Complement => "~",
            UnaryOp::Negation => "-",
            UnaryOp::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }
}

impl BinaryOp {
    pub const ALL: &'static [BinaryOp] = &[
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::LogicalAnd,
        BinaryOp::LogicalOr,
        BinaryOp::Equal,
        BinaryOp::NotEqual,
        BinaryOp::LessThan,
        BinaryOp::GreaterThan,
        BinaryOp::LessThanEqual,
        BinaryOp::GreaterThanEqual,
        BinaryOp::ShiftLeft,
        BinaryOp::ShiftRight,
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Modulo,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThanEqual => "<=",
            BinaryOp::GreaterThanEqual => ">=",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        Self::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// True if this operator has a compound assignment form, like `+=`.
    pub fn has_compound(self) -> bool {
        !matches!(
            self,
            BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
                | BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessThanEqual
                | BinaryOp::GreaterThanEqual
        )
    }
}

/// The set of values a template may be bound to.
#[derive(Debug)]
pub struct Constraint {
    pub name: String,
    pub members: Members,
}

#[derive(Debug, PartialEq)]
pub enum Members {
    /// Scalar types, in declaration order.
    Types(Vec<Scalar>),

    /// Enumerant codes of the given kind, in declaration order.
    Numbers { kind: NumberKind, codes: Vec<u32> },
}

/// What a number template's value means.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NumberKind {
    /// A vector width or matrix dimension.
    Count,
    AddressSpace,
    Access,
    TexelFormat,
}

impl NumberKind {
    /// The name of the value `code`, as written in WGSL.
    pub fn value_name(self, code: u32) -> String {
        fn enumerant_name<E: Enumerant>(code: u32) -> Option<&'static str> {
            E::from_code(code).map(E::name)
        }
        let name = match self {
            NumberKind::Count => None,
            NumberKind::AddressSpace => enumerant_name::<AddressSpace>(code),
            NumberKind::Access => enumerant_name::<Access>(code),
            NumberKind::TexelFormat => enumerant_name::<TexelFormat>(code),
        };
        match name {
            Some(name) => name.to_string(),
            None => code.to_string(),
        }
    }

    /// A description of this kind of value, for error messages.
    pub fn description(self) -> &'static str {
        match self {
            NumberKind::Count => "a number",
            NumberKind::AddressSpace => "an address space",
            NumberKind::Access => "an access mode",
            NumberKind::TexelFormat => "a texel format",
        }
    }
}

#[derive(Debug)]
pub struct TemplateInfo {
    pub name: String,
    pub kind: TemplateKind,

    /// Index of this template's constraint in [`Table::constraints`].
    pub constraint: Option<usize>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TemplateKind {
    Type,
    Number(NumberKind),
}

/// A type expression over an overload's templates.
#[derive(Debug, PartialEq)]
pub enum Pattern {
    /// The type bound to the template with the given index.
    Template(usize),
    Scalar(Scalar),
    Vector {
        size: Number,
        element: Box<Pattern>,
    },
    Matrix {
        columns: Number,
        rows: Number,
        element: Box<Pattern>,
    },
    Atomic(Box<Pattern>),
    /// A runtime-sized array.
    RuntimeArray(Box<Pattern>),
    Pointer {
        space: Number,
        store: Box<Pattern>,
        access: Number,
    },
    Sampler {
        comparison: bool,
    },
    SampledTexture {
        dim: TextureDimension,
        multisampled: bool,
        sampled: Box<Pattern>,
    },
    DepthTexture {
        dim: TextureDimension,
        multisampled: bool,
    },
    StorageTexture {
        dim: TextureDimension,
        format: Number,
        access: Number,
    },
    ExternalTexture,

    // These only appear as return types.
    ModfResult(Box<Pattern>),
    FrexpResult(Box<Pattern>),
    AtomicCompareExchangeResult(Box<Pattern>),
}

/// A number within a [`Pattern`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// The value bound to the number template with the given index.
    Template(usize),
    Fixed(u32),
}

macro_rules! usages {
    ( $( $variant:ident => $text:literal, )* ) => {
        /// The role a parameter plays, for code generators.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum ParameterUsage {
            $( $variant, )*
        }

        impl ParameterUsage {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( ParameterUsage::$variant => $text, )*
                }
            }

            pub fn from_name(name: &str) -> Option<ParameterUsage> {
                match name {
                    $( $text => Some(ParameterUsage::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

usages! {
    ArrayIndex => "array_index",
    Bias => "bias",
    Component => "component",
    Coords => "coords",
    Count => "count",
    Ddx => "ddx",
    Ddy => "ddy",
    DepthRef => "depth_ref",
    E => "e",
    E1 => "e1",
    E2 => "e2",
    E3 => "e3",
    Exp => "exp",
    Fract => "fract",
    High => "high",
    Level => "level",
    Low => "low",
    Newbits => "newbits",
    Offset => "offset",
    SampleIndex => "sample_index",
    Sampler => "sampler",
    Texture => "texture",
    Value => "value",
    W => "w",
    X => "x",
    Xy => "xy",
    Xyz => "xyz",
    Y => "y",
    Yz => "yz",
    Yzw => "yzw",
    Z => "z",
    Zw => "zw",
}

#[derive(Debug)]
pub struct ParameterInfo {
    pub usage: Option<ParameterUsage>,
    pub pattern: Pattern,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OverloadKind {
    Builtin,
    Operator,
    Constructor,
    Converter,
}

/// The pipeline stages in which an overload may be used.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PipelineStages {
    pub vertex: bool,
    pub fragment: bool,
    pub compute: bool,
}

impl Default for PipelineStages {
    fn default() -> Self {
        PipelineStages {
            vertex: true,
            fragment: true,
            compute: true,
        }
    }
}

#[derive(Debug)]
pub struct OverloadInfo {
    pub kind: OverloadKind,

    /// Explicit templates first, then implicit ones.
    pub templates: Vec<TemplateInfo>,
    pub num_explicit: usize,

    /// True if every explicit template is used by some parameter, so that
    /// calls may leave the template arguments off and have them inferred.
    pub infers_explicit: bool,

    pub parameters: Vec<ParameterInfo>,
    pub return_type: Option<Pattern>,

    pub must_use: bool,
    pub deprecated: bool,
    pub stages: PipelineStages,

    /// The name of the constant evaluation function, forwarded to callers
    /// untouched.
    pub const_eval: Option<String>,
}

impl OverloadInfo {
    pub fn explicit_templates(&self) -> &[TemplateInfo] {
        &self.templates[..self.num_explicit]
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == OverloadKind::Constructor
    }

    pub fn is_converter(&self) -> bool {
        self.kind == OverloadKind::Converter
    }
}

/// All overloads, grouped by the function, operator, or type they belong to.
#[derive(Debug, Default)]
pub struct Table {
    pub constraints: Vec<Constraint>,
    builtins: IndexMap<String, Vec<OverloadInfo>>,
    unary_ops: IndexMap<UnaryOp, Vec<OverloadInfo>>,
    binary_ops: IndexMap<BinaryOp, Vec<OverloadInfo>>,
    ctor_conv: IndexMap<String, Vec<OverloadInfo>>,
}

impl Table {
    /// Load the builtin definitions, attributing any errors to `source_id`.
    pub fn load(source_id: usize) -> Result<Table, DefError> {
        Table::parse(DEFINITIONS, source_id)
    }

    pub fn parse(source: &str, source_id: usize) -> Result<Table, DefError> {
        def::parse(source, source_id)
    }

    pub fn builtin(&self, name: &str) -> Option<BuiltinFn> {
        self.builtins.get_index_of(name).map(BuiltinFn)
    }

    pub fn ctor_conv(&self, name: &str) -> Option<CtorConv> {
        self.ctor_conv.get_index_of(name).map(CtorConv)
    }

    pub fn builtins(&self) -> impl Iterator<Item = (BuiltinFn, &str)> + '_ {
        self.builtins
            .keys()
            .enumerate()
            .map(|(index, name)| (BuiltinFn(index), name.as_str()))
    }

    pub fn ctor_convs(&self) -> impl Iterator<Item = (CtorConv, &str)> + '_ {
        self.ctor_conv
            .keys()
            .enumerate()
            .map(|(index, name)| (CtorConv(index), name.as_str()))
    }

    pub fn builtin_name(&self, builtin: BuiltinFn) -> &str {
        self.builtins
            .get_index(builtin.0)
            .map_or("", |(name, _)| name.as_str())
    }

    pub fn ctor_conv_name(&self, ctor_conv: CtorConv) -> &str {
        self.ctor_conv
            .get_index(ctor_conv.0)
            .map_or("", |(name, _)| name.as_str())
    }

    pub fn builtin_overloads(&self, builtin: BuiltinFn) -> &[OverloadInfo] {
        self.builtins
            .get_index(builtin.0)
            .map(|(_, overloads)| overloads.as_slice())
            .unwrap_or(&[])
    }

    pub fn ctor_conv_overloads(&self, ctor_conv: CtorConv) -> &[OverloadInfo] {
        self.ctor_conv
            .get_index(ctor_conv.0)
            .map(|(_, overloads)| overloads.as_slice())
            .unwrap_or(&[])
    }

    pub fn unary_overloads(&self, op: UnaryOp) -> &[OverloadInfo] {
        self.unary_ops.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn binary_overloads(&self, op: BinaryOp) -> &[OverloadInfo] {
        self.binary_ops.get(&op).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of overloads of every kind.
    pub fn num_overloads(&self) -> usize {
        self.builtins.values().map(Vec::len).sum::<usize>()
            + self.unary_ops.values().map(Vec::len).sum::<usize>()
            + self.binary_ops.values().map(Vec::len).sum::<usize>()
            + self.ctor_conv.values().map(Vec::len).sum::<usize>()
    }

    /// Every overload in the table, with the name it is printed under.
    pub fn all_overloads(&self) -> impl Iterator<Item = (String, &OverloadInfo)> + '_ {
        fn named(map: &IndexMap<String, Vec<OverloadInfo>>) -> Vec<(String, &OverloadInfo)> {
            map.iter()
                .flat_map(|(name, overloads)| overloads.iter().map(move |o| (name.clone(), o)))
                .collect()
        }

        let mut all = named(&self.builtins);
        for (op, overloads) in &self.unary_ops {
            all.extend(overloads.iter().map(|o| (unary_name(*op), o)));
        }
        for (op, overloads) in &self.binary_ops {
            all.extend(overloads.iter().map(|o| (binary_name(*op, false), o)));
        }
        all.extend(named(&self.ctor_conv));
        all.into_iter()
    }
}

/// The name under which a unary operator's candidates are printed.
pub fn unary_name(op: UnaryOp) -> String {
    format!("operator {} ", op.symbol())
}

/// The name under which a binary operator's candidates are printed.
///
/// `is_compound` selects the compound assignment spelling, like
/// `operator += `, for operators that have one.
pub fn binary_name(op: BinaryOp, is_compound: bool) -> String {
    if is_compound && op.has_compound() {
        format!("operator {}= ", op.symbol())
    } else {
        format!("operator {} ", op.symbol())
    }
}
