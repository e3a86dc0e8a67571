use super::*;
use crate::table::{BinaryOp, Table, UnaryOp};
use crate::ty::{Access, AddressSpace, Scalar, Stage, Texture, TextureDimension, Type, Types};
use crate::ty::VectorSize::{Vec2, Vec3};
use crate::wgsl::Wgsl;

struct Fixture {
    table: Table,
    types: Types,
}

/// The parts of an [`Overload`] the tests look at, with types spelled out.
#[derive(Debug)]
struct Resolved {
    return_type: String,
    parameters: Vec<String>,
    decided_by: Decision,
    defaulted: bool,
    is_constructor: bool,
    const_eval: Option<String>,
}

/// A resolved call, or its diagnostic as text.
type Outcome = std::result::Result<Resolved, String>;

fn span() -> Span {
    (0, 0..0)
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            table: Table::load(0).expect("builtin definitions should load"),
            types: Types::new(),
        }
    }

    fn scalar(&mut self, scalar: Scalar) -> Handle {
        self.types.scalar(scalar)
    }

    fn vec(&mut self, size: crate::ty::VectorSize, scalar: Scalar) -> Handle {
        let element = self.types.scalar(scalar);
        self.types.vector(size, element)
    }

    fn summarize(&self, overload: Overload) -> Resolved {
        Resolved {
            return_type: overload.return_type.map_or("()".to_string(), |ty| {
                Wgsl((ty, &self.types)).to_string()
            }),
            parameters: overload
                .parameters
                .iter()
                .map(|param| Wgsl((param.ty, &self.types)).to_string())
                .collect(),
            decided_by: overload.decided_by,
            defaulted: overload.defaulted,
            is_constructor: overload.info.is_constructor(),
            const_eval: overload.const_eval.map(str::to_string),
        }
    }

    fn func(&mut self, name: &str, args: &[Handle], stage: Stage) -> Outcome {
        self.func_templated(name, &[], args, stage)
    }

    fn func_templated(
        &mut self,
        name: &str,
        template_args: &[Handle],
        args: &[Handle],
        stage: Stage,
    ) -> Outcome {
        let builtin = self.table.builtin(name).expect("no such builtin");
        let mut context = Context::new(&self.table, &mut self.types);
        let result = context.lookup_fn(builtin, template_args, args, stage, span());
        result
            .map(|overload| self.summarize(overload))
            .map_err(|error| error.to_string())
    }

    fn ctor(
        &mut self,
        name: &str,
        template_args: &[Handle],
        args: &[Handle],
        stage: Stage,
    ) -> Outcome {
        let ctor_conv = self.table.ctor_conv(name).expect("no such type");
        let mut context = Context::new(&self.table, &mut self.types);
        let result = context.lookup_ctor_conv(ctor_conv, template_args, args, stage, span());
        result
            .map(|overload| self.summarize(overload))
            .map_err(|error| error.to_string())
    }

    fn unary(&mut self, op: UnaryOp, arg: Handle, stage: Stage) -> Outcome {
        let mut context = Context::new(&self.table, &mut self.types);
        let result = context.lookup_unary(op, arg, stage, span());
        result
            .map(|overload| self.summarize(overload))
            .map_err(|error| error.to_string())
    }

    fn binary(
        &mut self,
        op: BinaryOp,
        lhs: Handle,
        rhs: Handle,
        is_compound: bool,
    ) -> Outcome {
        let mut context = Context::new(&self.table, &mut self.types);
        let result = context.lookup_binary(op, lhs, rhs, Stage::Constant, span(), is_compound);
        result
            .map(|overload| self.summarize(overload))
            .map_err(|error| error.to_string())
    }
}

#[test]
fn cos_f32() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let resolved = fx.func("cos", &[f32], Stage::Constant).unwrap();
    assert_eq!(resolved.return_type, "f32");
    assert_eq!(resolved.parameters, ["f32"]);
    assert_eq!(resolved.decided_by, Decision::Unique);
    assert!(!resolved.defaulted);
    assert_eq!(resolved.const_eval.as_deref(), Some("cos"));
}

#[test]
fn cos_i32() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);
    let error = fx.func("cos", &[i32], Stage::Constant).unwrap_err();
    assert!(error.starts_with("error: no matching call to cos(i32)\n"));
    assert!(error.contains("\n2 candidate functions:\n"));
}

#[test]
fn clamp_conflicting_binding() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let u32 = fx.scalar(Scalar::U32);
    let error = fx.func("clamp", &[f32, u32, f32], Stage::Constant).unwrap_err();
    assert!(error.contains("no matching call to clamp(f32, u32, f32)"));
}

#[test]
fn clamp_refines_abstract_binding() {
    let mut fx = Fixture::new();
    let ai = fx.scalar(Scalar::AbstractInt);
    let u32 = fx.scalar(Scalar::U32);
    let resolved = fx.func("clamp", &[ai, u32, ai], Stage::Constant).unwrap();
    assert_eq!(resolved.return_type, "u32");
    assert_eq!(resolved.parameters, ["u32", "u32", "u32"]);
}

#[test]
fn select_abstract_float() {
    let mut fx = Fixture::new();
    let af = fx.scalar(Scalar::AbstractFloat);
    let bool_ = fx.scalar(Scalar::Bool);

    let constant = fx.func("select", &[af, af, bool_], Stage::Constant).unwrap();
    assert_eq!(constant.return_type, "abstract-float");
    assert_eq!(constant.parameters, ["abstract-float", "abstract-float", "bool"]);
    assert!(!constant.defaulted);

    let runtime = fx.func("select", &[af, af, bool_], Stage::Runtime).unwrap();
    assert_eq!(runtime.return_type, "f32");
    assert_eq!(runtime.parameters, ["f32", "f32", "bool"]);
    assert!(runtime.defaulted);
}

#[test]
fn texture_dimensions_bool_bool() {
    let mut fx = Fixture::new();
    let bool_ = fx.scalar(Scalar::Bool);
    let error = fx
        .func("textureDimensions", &[bool_, bool_], Stage::Constant)
        .unwrap_err();
    assert_eq!(
        error,
        "error: no matching call to textureDimensions(bool, bool)

27 candidate functions:
  textureDimensions(texture: texture_1d<T>, level: L) -> u32  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_2d<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_2d_array<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_3d<T>, level: L) -> vec3<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_cube<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_cube_array<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_depth_2d, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_2d_array, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_cube, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_cube_array, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_1d<T>) -> u32  where: T is f32, i32 or u32
  textureDimensions(texture: texture_2d<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_2d_array<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_3d<T>) -> vec3<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_cube<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_cube_array<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_multisampled_2d<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_depth_2d) -> vec2<u32>
  textureDimensions(texture: texture_depth_2d_array) -> vec2<u32>
  textureDimensions(texture: texture_depth_cube) -> vec2<u32>
  textureDimensions(texture: texture_depth_cube_array) -> vec2<u32>
  textureDimensions(texture: texture_depth_multisampled_2d) -> vec2<u32>
  textureDimensions(texture: texture_storage_1d<F, A>) -> u32
  textureDimensions(texture: texture_storage_2d<F, A>) -> vec2<u32>
  textureDimensions(texture: texture_storage_2d_array<F, A>) -> vec2<u32>
  textureDimensions(texture: texture_storage_3d<F, A>) -> vec3<u32>
  textureDimensions(texture: texture_external) -> vec2<u32>
"
    );
}

#[test]
fn texture_dimensions_closest_first() {
    let mut fx = Fixture::new();
    let depth = fx.types.texture(Texture::Depth(TextureDimension::D2));
    let bool_ = fx.scalar(Scalar::Bool);
    let error = fx
        .func("textureDimensions", &[depth, bool_], Stage::Constant)
        .unwrap_err();
    assert_eq!(
        error,
        "error: no matching call to textureDimensions(texture_depth_2d, bool)

27 candidate functions:
  textureDimensions(texture: texture_depth_2d, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_1d<T>, level: L) -> u32  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_2d<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_2d_array<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_3d<T>, level: L) -> vec3<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_cube<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_cube_array<T>, level: L) -> vec2<u32>  where: T is f32, i32 or u32, L is i32 or u32
  textureDimensions(texture: texture_depth_2d_array, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_cube, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_cube_array, level: L) -> vec2<u32>  where: L is i32 or u32
  textureDimensions(texture: texture_depth_2d) -> vec2<u32>
  textureDimensions(texture: texture_1d<T>) -> u32  where: T is f32, i32 or u32
  textureDimensions(texture: texture_2d<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_2d_array<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_3d<T>) -> vec3<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_cube<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_cube_array<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_multisampled_2d<T>) -> vec2<u32>  where: T is f32, i32 or u32
  textureDimensions(texture: texture_depth_2d_array) -> vec2<u32>
  textureDimensions(texture: texture_depth_cube) -> vec2<u32>
  textureDimensions(texture: texture_depth_cube_array) -> vec2<u32>
  textureDimensions(texture: texture_depth_multisampled_2d) -> vec2<u32>
  textureDimensions(texture: texture_storage_1d<F, A>) -> u32
  textureDimensions(texture: texture_storage_2d<F, A>) -> vec2<u32>
  textureDimensions(texture: texture_storage_2d_array<F, A>) -> vec2<u32>
  textureDimensions(texture: texture_storage_3d<F, A>) -> vec3<u32>
  textureDimensions(texture: texture_external) -> vec2<u32>
"
    );
}

#[test]
fn texture_dimensions_with_level() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let texture = fx.types.texture(Texture::Sampled {
        dim: TextureDimension::D3,
        sampled: f32,
    });
    let ai = fx.scalar(Scalar::AbstractInt);
    let resolved = fx
        .func("textureDimensions", &[texture, ai], Stage::Runtime)
        .unwrap();
    assert_eq!(resolved.return_type, "vec3<u32>");
    assert_eq!(resolved.parameters, ["texture_3d<f32>", "i32"]);
    assert!(resolved.defaulted);
}

#[test]
fn unary_negation() {
    let mut fx = Fixture::new();
    let vec3_i32 = fx.vec(Vec3, Scalar::I32);
    let resolved = fx.unary(UnaryOp::Negation, vec3_i32, Stage::Constant).unwrap();
    assert_eq!(resolved.return_type, "vec3<i32>");

    let ai = fx.scalar(Scalar::AbstractInt);
    let constant = fx.unary(UnaryOp::Negation, ai, Stage::Constant).unwrap();
    assert_eq!(constant.return_type, "abstract-int");
    let runtime = fx.unary(UnaryOp::Negation, ai, Stage::Runtime).unwrap();
    assert_eq!(runtime.return_type, "i32");
    assert!(runtime.defaulted);
}

#[test]
fn unary_negation_mismatch() {
    let mut fx = Fixture::new();
    let bool_ = fx.scalar(Scalar::Bool);
    let error = fx
        .unary(UnaryOp::Negation, bool_, Stage::Constant)
        .unwrap_err();
    assert_eq!(
        error,
        "error: no matching overload for operator - (bool)

2 candidate operators:
  operator - (T) -> T  where: T is abstract-float, abstract-int, f32, i32 or f16
  operator - (vecN<T>) -> vecN<T>  where: T is abstract-float, abstract-int, f32, i32 or f16
"
    );
}

#[test]
fn binary_multiply() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);
    let vec3_i32 = fx.vec(Vec3, Scalar::I32);
    for is_compound in [false, true] {
        let resolved = fx
            .binary(BinaryOp::Multiply, i32, vec3_i32, is_compound)
            .unwrap();
        assert_eq!(resolved.return_type, "vec3<i32>");
        assert_eq!(resolved.parameters, ["i32", "vec3<i32>"]);
    }
}

const MULTIPLY_CANDIDATES: &str = "
9 candidate operators:
  operator * (T, T) -> T  where: T is abstract-float, abstract-int, f32, i32, u32 or f16
  operator * (vecN<T>, T) -> vecN<T>  where: T is abstract-float, abstract-int, f32, i32, u32 or f16
  operator * (T, vecN<T>) -> vecN<T>  where: T is abstract-float, abstract-int, f32, i32, u32 or f16
  operator * (T, matNxM<T>) -> matNxM<T>  where: T is abstract-float, f32 or f16
  operator * (matNxM<T>, T) -> matNxM<T>  where: T is abstract-float, f32 or f16
  operator * (vecN<T>, vecN<T>) -> vecN<T>  where: T is abstract-float, abstract-int, f32, i32, u32 or f16
  operator * (matCxR<T>, vecC<T>) -> vecR<T>  where: T is abstract-float, f32 or f16
  operator * (vecR<T>, matCxR<T>) -> vecC<T>  where: T is abstract-float, f32 or f16
  operator * (matKxR<T>, matCxK<T>) -> matCxR<T>  where: T is abstract-float, f32 or f16
";

#[test]
fn binary_multiply_mismatch() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let bool_ = fx.scalar(Scalar::Bool);

    let error = fx
        .binary(BinaryOp::Multiply, f32, bool_, false)
        .unwrap_err();
    assert_eq!(
        error,
        format!(
            "error: no matching overload for operator * (f32, bool)\n{}",
            MULTIPLY_CANDIDATES
        )
    );

    let error = fx.binary(BinaryOp::Multiply, f32, bool_, true).unwrap_err();
    assert_eq!(
        error,
        format!(
            "error: no matching overload for operator *= (f32, bool)\n{}",
            MULTIPLY_CANDIDATES.replace("operator * ", "operator *= ")
        )
    );
}

#[test]
fn comparison_has_no_compound_spelling() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let bool_ = fx.scalar(Scalar::Bool);
    let error = fx.binary(BinaryOp::LessThan, f32, bool_, true).unwrap_err();
    assert!(error.starts_with("error: no matching overload for operator < (f32, bool)\n"));
}

#[test]
fn abstract_addition() {
    use Scalar::{AbstractFloat as Af, AbstractInt as Ai, F32, I32};

    let cases = [
        (Af, Af, Some("abstract-float")),
        (Af, Ai, Some("abstract-float")),
        (Ai, Af, Some("abstract-float")),
        (Ai, Ai, Some("abstract-int")),
        (Af, F32, Some("f32")),
        (F32, Af, Some("f32")),
        (Af, I32, None),
        (I32, Af, None),
    ];

    let mut fx = Fixture::new();
    for (lhs, rhs, expected) in cases {
        let lhs_ty = fx.scalar(lhs);
        let rhs_ty = fx.scalar(rhs);
        let result = fx.binary(BinaryOp::Add, lhs_ty, rhs_ty, false);
        match expected {
            Some(expected) => {
                let resolved = result.unwrap();
                assert_eq!(resolved.return_type, expected, "{:?} + {:?}", lhs, rhs);
                assert_eq!(resolved.parameters, [expected, expected]);
            }
            None => assert!(result.is_err(), "{:?} + {:?} should not match", lhs, rhs),
        }

        let lhs_vec = fx.vec(Vec2, lhs);
        let rhs_vec = fx.vec(Vec2, rhs);
        let result = fx.binary(BinaryOp::Add, lhs_vec, rhs_vec, false);
        match expected {
            Some(expected) => {
                let expected = format!("vec2<{}>", expected);
                assert_eq!(result.unwrap().return_type, expected);
            }
            None => assert!(result.is_err()),
        }
    }
}

#[test]
fn vector_constructors() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);

    let implicit = fx.ctor("vec3", &[], &[i32, i32, i32], Stage::Constant).unwrap();
    assert_eq!(implicit.return_type, "vec3<i32>");
    assert_eq!(implicit.parameters, ["i32", "i32", "i32"]);
    assert!(implicit.is_constructor);
    assert_eq!(implicit.const_eval.as_deref(), Some("VecInitS"));

    let explicit = fx.ctor("vec3", &[i32], &[i32, i32, i32], Stage::Constant).unwrap();
    assert_eq!(explicit.return_type, "vec3<i32>");
    assert_eq!(explicit.parameters, ["i32", "i32", "i32"]);
    assert!(explicit.is_constructor);

    let vec3_ai = fx.vec(Vec3, Scalar::AbstractInt);
    let identity = fx.ctor("vec3", &[], &[vec3_ai], Stage::Constant).unwrap();
    assert_eq!(identity.return_type, "vec3<abstract-int>");
    assert_eq!(identity.parameters, ["vec3<abstract-int>"]);

    let zero = fx.ctor("vec3", &[], &[], Stage::Constant).unwrap();
    assert_eq!(zero.return_type, "vec3<abstract-int>");
    let zero = fx.ctor("vec3", &[], &[], Stage::Runtime).unwrap();
    assert_eq!(zero.return_type, "vec3<i32>");
    assert!(zero.defaulted);
}

#[test]
fn vector_constructor_stage() {
    let mut fx = Fixture::new();
    let ai = fx.scalar(Scalar::AbstractInt);

    let constant = fx.ctor("vec3", &[], &[ai, ai, ai], Stage::Constant).unwrap();
    assert_eq!(constant.return_type, "vec3<abstract-int>");
    assert_eq!(constant.parameters, ["abstract-int"; 3]);

    let runtime = fx.ctor("vec3", &[], &[ai, ai, ai], Stage::Runtime).unwrap();
    assert_eq!(runtime.return_type, "vec3<i32>");
    assert_eq!(runtime.parameters, ["i32"; 3]);
}

#[test]
fn matrix_from_abstract_columns() {
    let mut fx = Fixture::new();
    let vec2_ai = fx.vec(Vec2, Scalar::AbstractInt);
    let resolved = fx
        .ctor("mat2x2", &[], &[vec2_ai, vec2_ai], Stage::Constant)
        .unwrap();
    assert_eq!(resolved.return_type, "mat2x2<abstract-float>");
    assert_eq!(resolved.parameters, ["vec2<abstract-float>"; 2]);
    assert!(resolved.is_constructor);
}

const VEC3_CONVERSIONS: &str = "
5 candidate conversions:
  vec3<T>(vec3<U>) -> vec3<f32>  where: T is f32, U is abstract-int, abstract-float, i32, f16, u32 or bool
  vec3<T>(vec3<U>) -> vec3<f16>  where: T is f16, U is abstract-int, abstract-float, f32, i32, u32 or bool
  vec3<T>(vec3<U>) -> vec3<i32>  where: T is i32, U is abstract-int, abstract-float, f32, f16, u32 or bool
  vec3<T>(vec3<U>) -> vec3<u32>  where: T is u32, U is abstract-int, abstract-float, f32, f16, i32 or bool
  vec3<T>(vec3<U>) -> vec3<bool>  where: T is bool, U is abstract-int, abstract-float, f32, f16, i32 or u32
";

#[test]
fn vector_constructor_mismatch() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);
    let f32 = fx.scalar(Scalar::F32);

    let error = fx
        .ctor("vec3", &[], &[i32, f32, i32], Stage::Constant)
        .unwrap_err();
    let expected = "error: no matching constructor for vec3(i32, f32, i32)

7 candidate constructors:
  vec3(x: T, y: T, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(xy: vec2<T>, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(x: T, yz: vec2<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(vec3<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3() -> vec3<abstract-int>
  vec3<T>() -> vec3<T>  where: T is f32, f16, i32, u32 or bool
";
    assert_eq!(error, format!("{}{}", expected, VEC3_CONVERSIONS));

    let error = fx
        .ctor("vec3", &[i32], &[i32, f32, i32], Stage::Constant)
        .unwrap_err();
    let expected = "error: no matching constructor for vec3<i32>(i32, f32, i32)

7 candidate constructors:
  vec3(x: T, y: T, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(x: T, yz: vec2<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(xy: vec2<T>, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(vec3<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3() -> vec3<abstract-int>
  vec3<T>() -> vec3<T>  where: T is f32, f16, i32, u32 or bool
";
    assert_eq!(error, format!("{}{}", expected, VEC3_CONVERSIONS));
}

#[test]
fn vector_conversion() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);
    let vec3_f32 = fx.vec(Vec3, Scalar::F32);
    let resolved = fx.ctor("vec3", &[i32], &[vec3_f32], Stage::Constant).unwrap();
    assert_eq!(resolved.return_type, "vec3<i32>");
    assert_eq!(resolved.parameters, ["vec3<f32>"]);
    assert!(!resolved.is_constructor);
}

#[test]
fn vector_conversion_mismatch() {
    let mut fx = Fixture::new();
    let u32 = fx.scalar(Scalar::U32);
    let array = fx.types.insert(Type::Array {
        element: u32,
        count: None,
    });
    let f32 = fx.scalar(Scalar::F32);
    let error = fx
        .ctor("vec3", &[f32], &[array], Stage::Constant)
        .unwrap_err();
    let expected = "error: no matching constructor for vec3<f32>(array<u32>)

7 candidate constructors:
  vec3(vec3<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3() -> vec3<abstract-int>
  vec3<T>() -> vec3<T>  where: T is f32, f16, i32, u32 or bool
  vec3(xy: vec2<T>, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(x: T, yz: vec2<T>) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
  vec3(x: T, y: T, z: T) -> vec3<T>  where: T is abstract-int, abstract-float, f32, f16, i32, u32 or bool
";
    assert_eq!(error, format!("{}{}", expected, VEC3_CONVERSIONS));
}

#[test]
fn abstract_conversion_keeps_declaration_order() {
    // Converting to f32 and to f16 are equally good; the f32 conversion is
    // declared first.
    let mut fx = Fixture::new();
    let af = fx.scalar(Scalar::AbstractFloat);
    let vec3_ai = fx.vec(Vec3, Scalar::AbstractInt);
    let resolved = fx.ctor("vec3", &[af], &[vec3_ai], Stage::Constant).unwrap();
    assert_eq!(resolved.return_type, "vec3<f32>");
    assert_eq!(resolved.parameters, ["vec3<abstract-int>"]);
    assert!(!resolved.is_constructor);
    assert_eq!(resolved.decided_by, Decision::DeclarationOrder);
}

#[test]
fn conversion_of_equal_rank_loses_to_constructor() {
    let mut fx = Fixture::new();
    let ai = fx.scalar(Scalar::AbstractInt);

    // At constant stage the conversion takes the argument as is, which
    // beats the constructor's promotion to i32.
    let constant = fx.ctor("i32", &[], &[ai], Stage::Constant).unwrap();
    assert_eq!(constant.return_type, "i32");
    assert_eq!(constant.parameters, ["abstract-int"]);
    assert_eq!(constant.decided_by, Decision::Rank);

    // At runtime both promote the argument.
    let runtime = fx.ctor("f32", &[], &[ai], Stage::Runtime).unwrap();
    assert_eq!(runtime.return_type, "f32");
    assert_eq!(runtime.parameters, ["f32"]);
    assert!(runtime.is_constructor);
    assert_eq!(runtime.decided_by, Decision::ConstructorPreferred);
}

#[test]
fn explicit_template_argument() {
    let mut fx = Fixture::new();
    let f32 = fx.scalar(Scalar::F32);
    let u32 = fx.scalar(Scalar::U32);
    let resolved = fx
        .func_templated("bitcast", &[f32], &[u32], Stage::Constant)
        .unwrap();
    assert_eq!(resolved.return_type, "f32");
    assert_eq!(resolved.parameters, ["u32"]);

    // The result type can't be inferred.
    let error = fx.func("bitcast", &[u32], Stage::Constant).unwrap_err();
    assert!(error.contains("bitcast<T>(S) -> T  where: T is f32, i32 or u32"));
}

#[test]
fn builtin_result_structures() {
    let mut fx = Fixture::new();
    let af = fx.scalar(Scalar::AbstractFloat);

    let constant = fx.func("modf", &[af], Stage::Constant).unwrap();
    assert_eq!(constant.return_type, "__modf_result_abstract");
    let runtime = fx.func("modf", &[af], Stage::Runtime).unwrap();
    assert_eq!(runtime.return_type, "__modf_result_f32");

    let vec2_f32 = fx.vec(Vec2, Scalar::F32);
    let frexp = fx.func("frexp", &[vec2_f32], Stage::Runtime).unwrap();
    assert_eq!(frexp.return_type, "__frexp_result_vec2_f32");
}

#[test]
fn pointers_and_references() {
    let mut fx = Fixture::new();
    let i32 = fx.scalar(Scalar::I32);
    let atomic = fx.types.insert(Type::Atomic(i32));
    let pointer = fx
        .types
        .pointer(AddressSpace::Storage, atomic, Access::ReadWrite);
    let resolved = fx.func("atomicLoad", &[pointer], Stage::Runtime).unwrap();
    assert_eq!(resolved.return_type, "i32");
    assert_eq!(resolved.parameters, ["ptr<storage, atomic<i32>, read_write>"]);

    // Arguments are loaded through references.
    let f32 = fx.scalar(Scalar::F32);
    let reference = fx
        .types
        .reference(AddressSpace::Function, f32, Access::ReadWrite);
    let resolved = fx.func("abs", &[reference], Stage::Runtime).unwrap();
    assert_eq!(resolved.parameters, ["f32"]);
}

#[test]
fn repeated_resolution_is_stable() {
    let mut fx = Fixture::new();
    let bool_ = fx.scalar(Scalar::Bool);
    let af = fx.scalar(Scalar::AbstractFloat);

    let first = fx.func("select", &[af, af, bool_], Stage::Runtime).unwrap();
    let count = fx.types.len();
    let second = fx.func("select", &[af, af, bool_], Stage::Runtime).unwrap();
    assert_eq!(fx.types.len(), count);
    assert_eq!(first.return_type, second.return_type);
    assert_eq!(first.parameters, second.parameters);

    let first = fx.func("cos", &[bool_], Stage::Constant).unwrap_err();
    let second = fx.func("cos", &[bool_], Stage::Constant).unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn acceptance() {
    use matcher::accepts;
    use Scalar::*;

    assert!(accepts(AbstractInt, AbstractInt, Stage::Constant));
    assert!(!accepts(AbstractInt, AbstractInt, Stage::Runtime));
    assert!(accepts(AbstractFloat, AbstractInt, Stage::Constant));
    assert!(!accepts(AbstractFloat, F32, Stage::Constant));
    assert!(accepts(U32, AbstractInt, Stage::Runtime));
    assert!(!accepts(U32, AbstractFloat, Stage::Runtime));
    assert!(accepts(F16, AbstractFloat, Stage::Runtime));
    assert!(!accepts(Bool, AbstractInt, Stage::Constant));
}

#[test]
fn concrete_calls_are_never_ambiguous() {
    use Scalar::{Bool, F16, F32, I32, U32};

    let mut fx = Fixture::new();
    let mut pool = vec![];
    for scalar in [Bool, I32, U32, F32, F16] {
        pool.push(fx.scalar(scalar));
    }
    for scalar in [I32, F32] {
        pool.push(fx.vec(Vec2, scalar));
        pool.push(fx.vec(Vec3, scalar));
    }

    let mut calls: Vec<Vec<Handle>> = pool.iter().map(|&ty| vec![ty]).collect();
    for &first in &pool {
        for &second in &pool {
            calls.push(vec![first, second]);
        }
    }

    let builtins: Vec<String> = fx.table.builtins().map(|(_, name)| name.to_string()).collect();
    let types: Vec<String> = fx.table.ctor_convs().map(|(_, name)| name.to_string()).collect();
    for stage in [Stage::Constant, Stage::Runtime] {
        for args in &calls {
            for name in &builtins {
                if let Ok(resolved) = fx.func(name, args, stage) {
                    assert_ne!(resolved.decided_by, Decision::DeclarationOrder, "{}", name);
                }
            }
            for name in &types {
                if let Ok(resolved) = fx.ctor(name, &[], args, stage) {
                    assert_ne!(resolved.decided_by, Decision::DeclarationOrder, "{}", name);
                }
            }
            match *args.as_slice() {
                [arg] => {
                    for &op in UnaryOp::ALL {
                        if let Ok(resolved) = fx.unary(op, arg, stage) {
                            assert_ne!(resolved.decided_by, Decision::DeclarationOrder);
                        }
                    }
                }
                [lhs, rhs] => {
                    for &op in BinaryOp::ALL {
                        if let Ok(resolved) = fx.binary(op, lhs, rhs, false) {
                            assert_ne!(resolved.decided_by, Decision::DeclarationOrder);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
