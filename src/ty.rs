//! The type model: interned WGSL type descriptors.
//!
//! Every type is owned by a [`Types`] manager and referred to by [`Handle`].
//! The manager hash-conses its contents, so structurally equal types always
//! receive the same handle, and the matcher can compare types by handle alone.

use indexmap::IndexSet;

mod convert;

pub use convert::Rank;

/// A reference to a type interned in a [`Types`] manager.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Handle(u32);

impl Handle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Scalar kinds, including the abstract numeric kinds used for literals.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scalar {
    Bool,
    AbstractInt,
    AbstractFloat,
    I32,
    U32,
    F32,
    F16,
}

impl Scalar {
    pub fn is_abstract(self) -> bool {
        matches!(self, Scalar::AbstractInt | Scalar::AbstractFloat)
    }

    /// The concrete type an abstract scalar takes when it must be
    /// materialized: abstract-int becomes `i32`, abstract-float becomes
    /// `f32`. Concrete scalars are returned unchanged.
    pub fn default_concrete(self) -> Scalar {
        match self {
            Scalar::AbstractInt => Scalar::I32,
            Scalar::AbstractFloat => Scalar::F32,
            other => other,
        }
    }

    /// Size and alignment in bytes, for laying out builtin result structures.
    fn size_align(self) -> (u32, u32) {
        match self {
            Scalar::F16 => (2, 2),
            Scalar::AbstractInt | Scalar::AbstractFloat => (8, 8),
            Scalar::Bool | Scalar::I32 | Scalar::U32 | Scalar::F32 => (4, 4),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum VectorSize {
    Vec2 = 2,
    Vec3 = 3,
    Vec4 = 4,
}

impl VectorSize {
    pub fn from_u32(n: u32) -> Option<VectorSize> {
        match n {
            2 => Some(VectorSize::Vec2),
            3 => Some(VectorSize::Vec3),
            4 => Some(VectorSize::Vec4),
            _ => None,
        }
    }
}

/// WGSL enumerations whose values can bind to number templates.
///
/// A number template holds a `u32`; these are the codes used for each
/// enumerant, and the names used to spell them.
pub trait Enumerant: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
    fn code(self) -> u32;

    fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|value| value.name() == name)
    }
}

macro_rules! enumerant {
    ( $( #[$meta:meta] )* pub enum $name:ident { $( $variant:ident => $text:literal, )* } ) => {
        $( #[$meta] )*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $( $variant, )*
        }

        impl Enumerant for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant, )* ];

            fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )*
                }
            }

            fn code(self) -> u32 {
                self as u32
            }
        }
    };
}

enumerant! {
    pub enum AddressSpace {
        Function => "function",
        Private => "private",
        Workgroup => "workgroup",
        Uniform => "uniform",
        Storage => "storage",
    }
}

enumerant! {
    pub enum Access {
        Read => "read",
        Write => "write",
        ReadWrite => "read_write",
    }
}

enumerant! {
    pub enum TexelFormat {
        Bgra8Unorm => "bgra8unorm",
        Rgba8Unorm => "rgba8unorm",
        Rgba8Snorm => "rgba8snorm",
        Rgba8Uint => "rgba8uint",
        Rgba8Sint => "rgba8sint",
        Rgba16Uint => "rgba16uint",
        Rgba16Sint => "rgba16sint",
        Rgba16Float => "rgba16float",
        R32Uint => "r32uint",
        R32Sint => "r32sint",
        R32Float => "r32float",
        Rg32Uint => "rg32uint",
        Rg32Sint => "rg32sint",
        Rg32Float => "rg32float",
        Rgba32Uint => "rgba32uint",
        Rgba32Sint => "rgba32sint",
        Rgba32Float => "rgba32float",
    }
}

enumerant! {
    pub enum TextureDimension {
        D1 => "1d",
        D2 => "2d",
        D2Array => "2d_array",
        D3 => "3d",
        Cube => "cube",
        CubeArray => "cube_array",
    }
}

/// The earliest stage at which a call's value can be computed.
///
/// Abstract numeric types may only survive resolution at `Constant` stage.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Stage {
    Constant,
    Runtime,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    Scalar(Scalar),
    Vector {
        size: VectorSize,
        element: Handle,
    },
    Matrix {
        columns: VectorSize,
        rows: VectorSize,
        element: Handle,
    },
    Atomic(Handle),
    /// An array. A `count` of `None` is a runtime-sized array.
    Array {
        element: Handle,
        count: Option<u32>,
    },
    Pointer {
        space: AddressSpace,
        store: Handle,
        access: Access,
    },
    /// The type of a memory view, as produced by naming a variable.
    ///
    /// Calls load through references implicitly; see
    /// [`Types::unwrap_ref`].
    Reference {
        space: AddressSpace,
        store: Handle,
        access: Access,
    },
    Sampler {
        comparison: bool,
    },
    Texture(Texture),
    Struct(Struct),
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Texture {
    Sampled {
        dim: TextureDimension,
        sampled: Handle,
    },
    Multisampled {
        dim: TextureDimension,
        sampled: Handle,
    },
    Depth(TextureDimension),
    DepthMultisampled(TextureDimension),
    Storage {
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    },
    External,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Struct {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Member {
    pub name: String,
    pub ty: Handle,
    pub offset: u32,
}

/// The type manager.
///
/// Owns every type used during one compilation. Types are never mutated or
/// removed once inserted; inserting a type that is already present returns
/// the existing handle.
#[derive(Debug, Default)]
pub struct Types {
    types: IndexSet<Type>,
}

impl Types {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `ty`, returning its handle.
    pub fn insert(&mut self, ty: Type) -> Handle {
        let (index, _) = self.types.insert_full(ty);
        Handle(index as u32)
    }

    /// Return the type `handle` refers to.
    ///
    /// `handle` must have been produced by this manager.
    pub fn get(&self, handle: Handle) -> &Type {
        &self.types[handle.index()]
    }

    /// Number of distinct types interned so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn scalar(&mut self, scalar: Scalar) -> Handle {
        self.insert(Type::Scalar(scalar))
    }

    pub fn vector(&mut self, size: VectorSize, element: Handle) -> Handle {
        self.insert(Type::Vector { size, element })
    }

    pub fn matrix(&mut self, columns: VectorSize, rows: VectorSize, element: Handle) -> Handle {
        self.insert(Type::Matrix {
            columns,
            rows,
            element,
        })
    }

    pub fn pointer(&mut self, space: AddressSpace, store: Handle, access: Access) -> Handle {
        self.insert(Type::Pointer {
            space,
            store,
            access,
        })
    }

    pub fn reference(&mut self, space: AddressSpace, store: Handle, access: Access) -> Handle {
        self.insert(Type::Reference {
            space,
            store,
            access,
        })
    }

    pub fn texture(&mut self, texture: Texture) -> Handle {
        self.insert(Type::Texture(texture))
    }

    /// If `handle` is a scalar type, return its kind.
    pub fn as_scalar(&self, handle: Handle) -> Option<Scalar> {
        match *self.get(handle) {
            Type::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Strip one level of vector or matrix wrapping, returning the scalar
    /// element type. Other types are returned unchanged.
    pub fn element_type(&self, handle: Handle) -> Handle {
        match *self.get(handle) {
            Type::Vector { element, .. } | Type::Matrix { element, .. } => element,
            _ => handle,
        }
    }

    /// True if `handle` is an abstract scalar, or a vector or matrix of one.
    pub fn is_abstract(&self, handle: Handle) -> bool {
        let element = self.element_type(handle);
        self.as_scalar(element)
            .map_or(false, |scalar| scalar.is_abstract())
    }

    /// True if an abstract numeric type appears anywhere within `handle`.
    pub fn contains_abstract(&self, handle: Handle) -> bool {
        match *self.get(handle) {
            Type::Scalar(scalar) => scalar.is_abstract(),
            Type::Vector { element, .. }
            | Type::Matrix { element, .. }
            | Type::Atomic(element)
            | Type::Array { element, .. } => self.contains_abstract(element),
            Type::Pointer { store, .. } | Type::Reference { store, .. } => {
                self.contains_abstract(store)
            }
            Type::Struct(ref st) => st
                .members
                .iter()
                .any(|member| self.contains_abstract(member.ty)),
            Type::Sampler { .. } | Type::Texture(_) => false,
        }
    }

    /// Replace every abstract numeric type within `handle` by its default
    /// concrete type.
    ///
    /// Builtin result structures are rebuilt around their defaulted members,
    /// so that `__frexp_result_abstract` becomes `__frexp_result_f32`.
    pub fn default_type(&mut self, handle: Handle) -> Handle {
        if !self.contains_abstract(handle) {
            return handle;
        }
        match self.get(handle).clone() {
            Type::Scalar(scalar) => self.scalar(scalar.default_concrete()),
            Type::Vector { size, element } => {
                let element = self.default_type(element);
                self.vector(size, element)
            }
            Type::Matrix {
                columns,
                rows,
                element,
            } => {
                let element = self.default_type(element);
                self.matrix(columns, rows, element)
            }
            Type::Atomic(element) => {
                let element = self.default_type(element);
                self.insert(Type::Atomic(element))
            }
            Type::Array { element, count } => {
                let element = self.default_type(element);
                self.insert(Type::Array { element, count })
            }
            Type::Struct(st) => {
                let fract = match st.members.first() {
                    Some(member) => self.default_type(member.ty),
                    None => return handle,
                };
                if st.name.starts_with("__modf_result") {
                    self.modf_result(fract)
                } else if st.name.starts_with("__frexp_result") {
                    self.frexp_result(fract)
                } else {
                    handle
                }
            }
            Type::Pointer { .. }
            | Type::Reference { .. }
            | Type::Sampler { .. }
            | Type::Texture(_) => handle,
        }
    }

    /// Load through one level of reference.
    ///
    /// Only references are unwrapped, and only once: a reference to a
    /// pointer yields the pointer.
    pub fn unwrap_ref(&self, handle: Handle) -> Handle {
        match *self.get(handle) {
            Type::Reference { store, .. } => store,
            _ => handle,
        }
    }

    /// The result of `modf(x)` where `x` has type `fract`.
    pub fn modf_result(&mut self, fract: Handle) -> Handle {
        let name = format!("__modf_result_{}", self.result_suffix(fract));
        self.builtin_struct(name, &[("fract", fract), ("whole", fract)])
    }

    /// The result of `frexp(x)` where `x` has type `fract`.
    pub fn frexp_result(&mut self, fract: Handle) -> Handle {
        let exp_scalar = if self.is_abstract(fract) {
            Scalar::AbstractInt
        } else {
            Scalar::I32
        };
        let exp_scalar = self.scalar(exp_scalar);
        let exp = match *self.get(fract) {
            Type::Vector { size, .. } => self.vector(size, exp_scalar),
            _ => exp_scalar,
        };
        let name = format!("__frexp_result_{}", self.result_suffix(fract));
        self.builtin_struct(name, &[("fract", fract), ("exp", exp)])
    }

    /// The result of `atomicCompareExchangeWeak` on an `atomic<T>`.
    pub fn atomic_compare_exchange_result(&mut self, value: Handle) -> Handle {
        let name = format!(
            "__atomic_compare_exchange_result_{}",
            self.result_suffix(value)
        );
        let exchanged = self.scalar(Scalar::Bool);
        self.builtin_struct(name, &[("old_value", value), ("exchanged", exchanged)])
    }

    fn result_suffix(&self, handle: Handle) -> String {
        let scalar_suffix = |types: &Types, element: Handle| match types.as_scalar(element) {
            Some(scalar) if scalar.is_abstract() => "abstract".to_string(),
            _ => crate::wgsl::Wgsl((element, types)).to_string(),
        };
        match *self.get(handle) {
            Type::Vector { size, element } => {
                format!("vec{}_{}", size as u8, scalar_suffix(self, element))
            }
            _ => scalar_suffix(self, handle),
        }
    }

    fn builtin_struct(&mut self, name: String, members: &[(&str, Handle)]) -> Handle {
        let mut offset = 0;
        let mut laid_out = Vec::with_capacity(members.len());
        for &(member_name, ty) in members {
            let (size, align) = self.size_align(ty).unwrap_or((4, 4));
            offset = round_up(offset, align);
            laid_out.push(Member {
                name: member_name.to_string(),
                ty,
                offset,
            });
            offset += size;
        }
        self.insert(Type::Struct(Struct {
            name,
            members: laid_out,
        }))
    }

    /// Size and alignment of `handle` under the host-shareable layout rules,
    /// for the types that can appear in builtin result structures.
    fn size_align(&self, handle: Handle) -> Option<(u32, u32)> {
        match *self.get(handle) {
            Type::Scalar(scalar) => Some(scalar.size_align()),
            Type::Atomic(element) => self.size_align(element),
            Type::Vector { size, element } => {
                let (scalar_size, _) = self.size_align(element)?;
                let count = size as u32;
                let align = match size {
                    VectorSize::Vec2 => 2 * scalar_size,
                    VectorSize::Vec3 | VectorSize::Vec4 => 4 * scalar_size,
                };
                Some((count * scalar_size, align))
            }
            _ => None,
        }
    }
}

fn round_up(value: u32, align: u32) -> u32 {
    (value + align - 1) / align * align
}
