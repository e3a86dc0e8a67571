//! Conversion rank and common-type computation.
//!
//! WGSL permits exactly one kind of implicit conversion: an abstract numeric
//! value may be materialized as a concrete type (or abstract-int as
//! abstract-float). Nothing ever converts back to an abstract type.

use super::{Handle, Scalar, Type, Types};

/// How well an argument type fits a parameter type.
///
/// Ordered from best to worst, so the rank of a whole call is the maximum of
/// its arguments' ranks.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Rank {
    /// The types are identical.
    Exact,
    /// An abstract numeric type is promoted without loss.
    Promoted,
    /// No implicit conversion exists.
    Never,
}

impl Scalar {
    /// The rank of converting a value of type `self` to type `to`.
    pub fn conversion_rank(self, to: Scalar) -> Rank {
        use Scalar as Sc;
        match (self, to) {
            (from, to) if from == to => Rank::Exact,
            (Sc::AbstractInt, Sc::AbstractFloat | Sc::I32 | Sc::U32 | Sc::F32 | Sc::F16) => {
                Rank::Promoted
            }
            (Sc::AbstractFloat, Sc::F32 | Sc::F16) => Rank::Promoted,
            _ => Rank::Never,
        }
    }
}

impl Types {
    /// The rank of implicitly converting a value of type `from` to type `to`.
    ///
    /// Vectors and matrices convert element-wise, and only between equal
    /// shapes.
    pub fn conversion_rank(&self, from: Handle, to: Handle) -> Rank {
        if from == to {
            return Rank::Exact;
        }
        match (self.get(from), self.get(to)) {
            (&Type::Scalar(from), &Type::Scalar(to)) => from.conversion_rank(to),
            (
                &Type::Vector {
                    size: from_size,
                    element: from,
                },
                &Type::Vector {
                    size: to_size,
                    element: to,
                },
            ) if from_size == to_size => self.conversion_rank(from, to),
            (
                &Type::Matrix {
                    columns: from_columns,
                    rows: from_rows,
                    element: from,
                },
                &Type::Matrix {
                    columns: to_columns,
                    rows: to_rows,
                    element: to,
                },
            ) if from_columns == to_columns && from_rows == to_rows => {
                self.conversion_rank(from, to)
            }
            _ => Rank::Never,
        }
    }

    /// The type both `a` and `b` can be converted to, if there is one.
    ///
    /// This is how a template binding is refined by later arguments: binding
    /// `T` to abstract-int and then meeting a `u32` yields `u32`, whereas
    /// meeting `f32` after `u32` fails.
    pub fn common(&mut self, a: Handle, b: Handle) -> Option<Handle> {
        if a == b {
            return Some(a);
        }
        match (self.get(a).clone(), self.get(b).clone()) {
            (Type::Scalar(sa), Type::Scalar(sb)) => {
                if sa.conversion_rank(sb) != Rank::Never {
                    Some(b)
                } else if sb.conversion_rank(sa) != Rank::Never {
                    Some(a)
                } else {
                    None
                }
            }
            (
                Type::Vector {
                    size: size_a,
                    element: ea,
                },
                Type::Vector {
                    size: size_b,
                    element: eb,
                },
            ) if size_a == size_b => {
                let element = self.common(ea, eb)?;
                Some(self.vector(size_a, element))
            }
            (
                Type::Matrix {
                    columns: columns_a,
                    rows: rows_a,
                    element: ea,
                },
                Type::Matrix {
                    columns: columns_b,
                    rows: rows_b,
                    element: eb,
                },
            ) if columns_a == columns_b && rows_a == rows_b => {
                let element = self.common(ea, eb)?;
                Some(self.matrix(columns_a, rows_a, element))
            }
            _ => None,
        }
    }
}
