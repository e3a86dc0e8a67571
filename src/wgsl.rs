//! Producing WGSL spellings of types.

use crate::ty::{Enumerant, Handle, Scalar, Texture, Type, Types};
use std::fmt;

/// A wrapper for types that can be formatted as WGSL source code.
///
/// If a value `v` of some type `T` has a natural representation as WGSL source,
/// then `Wgsl(v)` implements `std::fmt::Display` by formatting `v` as WGSL
/// source.
///
/// A [`Handle`] needs its [`Types`] manager to be interpreted, so for those we
/// use a `(handle, types)` pair as `T`.
pub struct Wgsl<T>(pub T);

/// Format a type as a WGSL `type_specifier`.
///
/// Abstract numeric types have no WGSL spelling; they are written
/// `abstract-int` and `abstract-float`, as in compiler diagnostics.
impl fmt::Display for Wgsl<(Handle, &'_ Types)> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Wgsl((handle, types)) = *self;
        let ty = |handle| Wgsl((handle, types));

        match *types.get(handle) {
            Type::Scalar(scalar) => Wgsl(scalar).fmt(f),
            Type::Vector { size, element } => {
                write!(f, "vec{}<{}>", size as u8, ty(element))
            }
            Type::Matrix {
                columns,
                rows,
                element,
            } => {
                write!(
                    f,
                    "mat{}x{}<{}>",
                    columns as u8,
                    rows as u8,
                    ty(element)
                )
            }
            Type::Atomic(element) => write!(f, "atomic<{}>", ty(element)),
            Type::Array { element, count } => match count {
                Some(count) => write!(f, "array<{}, {}>", ty(element), count),
                None => write!(f, "array<{}>", ty(element)),
            },
            Type::Pointer {
                space,
                store,
                access,
            } => write!(
                f,
                "ptr<{}, {}, {}>",
                space.name(),
                ty(store),
                access.name()
            ),
            Type::Reference {
                space,
                store,
                access,
            } => write!(
                f,
                "ref<{}, {}, {}>",
                space.name(),
                ty(store),
                access.name()
            ),
            Type::Sampler { comparison } => {
                write!(f, "sampler{}", if comparison { "_comparison" } else { "" })
            }
            Type::Texture(ref texture) => match *texture {
                Texture::Sampled { dim, sampled } => {
                    write!(f, "texture_{}<{}>", dim.name(), ty(sampled))
                }
                Texture::Multisampled { dim, sampled } => {
                    write!(f, "texture_multisampled_{}<{}>", dim.name(), ty(sampled))
                }
                Texture::Depth(dim) => write!(f, "texture_depth_{}", dim.name()),
                Texture::DepthMultisampled(dim) => {
                    write!(f, "texture_depth_multisampled_{}", dim.name())
                }
                Texture::Storage {
                    dim,
                    format,
                    access,
                } => write!(
                    f,
                    "texture_storage_{}<{}, {}>",
                    dim.name(),
                    format.name(),
                    access.name()
                ),
                Texture::External => f.write_str("texture_external"),
            },
            Type::Struct(ref st) => f.write_str(&st.name),
        }
    }
}

impl fmt::Display for Wgsl<Scalar> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.0 {
            Scalar::Bool => "bool",
            Scalar::AbstractInt => "abstract-int",
            Scalar::AbstractFloat => "abstract-float",
            Scalar::I32 => "i32",
            Scalar::U32 => "u32",
            Scalar::F32 => "f32",
            Scalar::F16 => "f16",
        })
    }
}

/// Format a list of types, separated by commas.
impl fmt::Display for Wgsl<(&'_ [Handle], &'_ Types)> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Wgsl((handles, types)) = *self;
        for (i, &handle) in handles.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Wgsl((handle, types)).fmt(f)?;
        }
        Ok(())
    }
}
