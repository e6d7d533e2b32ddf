//! Type descriptors attached to every symbol and expression node.
//!
//! A [`Type`] combines a basic type, a precision, a storage qualifier, a
//! nominal size (1 for scalars and samplers, 2-4 for vectors and matrices)
//! and an optional array size.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The element type of a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicType {
    Void,
    Float,
    Int,
    Bool,
    #[serde(rename = "sampler2d")]
    Sampler2D,
    SamplerCube,
}

impl BasicType {
    pub fn is_sampler(self) -> bool {
        matches!(self, BasicType::Sampler2D | BasicType::SamplerCube)
    }

    /// Short code used in mangled function names.
    fn mangle_code(self) -> &'static str {
        match self {
            BasicType::Void => "",
            BasicType::Float => "f",
            BasicType::Int => "i",
            BasicType::Bool => "b",
            BasicType::Sampler2D => "s2",
            BasicType::SamplerCube => "sC",
        }
    }
}

/// Precision qualifier. Ordered from lowest to highest so the wider of two
/// operands can be picked with `max`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "undefined")]
    Undefined,
    #[serde(rename = "lowp")]
    Low,
    #[serde(rename = "mediump")]
    Medium,
    #[serde(rename = "highp")]
    High,
}

impl Precision {
    pub fn keyword(self) -> &'static str {
        match self {
            Precision::Undefined => "",
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Undefined => write!(f, "undefined"),
            other => write!(f, "{}", other.keyword()),
        }
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowp" | "low" => Ok(Precision::Low),
            "mediump" | "medium" => Ok(Precision::Medium),
            "highp" | "high" => Ok(Precision::High),
            "undefined" => Ok(Precision::Undefined),
            _ => Err(format!(
                "invalid precision '{s}', expected lowp, mediump, highp or undefined"
            )),
        }
    }
}

/// Storage qualifier of a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// Expression results and function locals.
    Temporary,
    /// Plain global variable.
    Global,
    Const,
    Attribute,
    VaryingIn,
    VaryingOut,
    Uniform,
    In,
    Out,
    InOut,
    ConstReadOnly,
    // Fragment shader built-ins.
    FragColor,
    FragData,
    FragCoord,
    FrontFacing,
    PointCoord,
    // Vertex shader built-ins.
    Position,
    PointSize,
}

impl Qualifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Qualifier::Temporary => "",
            Qualifier::Global => "global",
            Qualifier::Const => "const",
            Qualifier::Attribute => "attribute",
            Qualifier::VaryingIn => "varying in",
            Qualifier::VaryingOut => "varying out",
            Qualifier::Uniform => "uniform",
            Qualifier::In => "in",
            Qualifier::Out => "out",
            Qualifier::InOut => "inout",
            Qualifier::ConstReadOnly => "const in",
            Qualifier::FragColor => "FragColor",
            Qualifier::FragData => "FragData",
            Qualifier::FragCoord => "FragCoord",
            Qualifier::FrontFacing => "FrontFacing",
            Qualifier::PointCoord => "PointCoord",
            Qualifier::Position => "Position",
            Qualifier::PointSize => "PointSize",
        }
    }
}

/// A complete type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub basic: BasicType,
    pub precision: Precision,
    pub qualifier: Qualifier,
    /// Component count for vectors, column count for matrices, 1 otherwise.
    pub size: u8,
    #[serde(default)]
    pub matrix: bool,
    #[serde(default)]
    pub array_size: Option<u32>,
}

impl Type {
    pub fn new(basic: BasicType, precision: Precision, qualifier: Qualifier, size: u8) -> Self {
        Type {
            basic,
            precision,
            qualifier,
            size,
            matrix: false,
            array_size: None,
        }
    }

    pub fn void() -> Self {
        Type::new(BasicType::Void, Precision::Undefined, Qualifier::Temporary, 1)
    }

    pub fn bool() -> Self {
        Type::new(BasicType::Bool, Precision::Undefined, Qualifier::Temporary, 1)
    }

    /// A float vector with `size` components (1 means a plain `float`).
    pub fn vec(size: u8, precision: Precision, qualifier: Qualifier) -> Self {
        Type::new(BasicType::Float, precision, qualifier, size)
    }

    pub fn sampler2d(qualifier: Qualifier) -> Self {
        Type::new(BasicType::Sampler2D, Precision::Undefined, qualifier, 1)
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn is_vector(&self) -> bool {
        self.size > 1 && !self.matrix
    }

    pub fn is_scalar(&self) -> bool {
        self.size == 1 && !self.matrix && self.array_size.is_none() && !self.basic.is_sampler()
    }

    /// The GLSL spelling of the type without qualifier or precision,
    /// e.g. `vec4`, `mat3`, `sampler2D`, `float[4]`.
    pub fn glsl_name(&self) -> String {
        let base = match (self.basic, self.matrix, self.size) {
            (BasicType::Void, _, _) => "void".to_string(),
            (BasicType::Sampler2D, _, _) => "sampler2D".to_string(),
            (BasicType::SamplerCube, _, _) => "samplerCube".to_string(),
            (BasicType::Float, true, n) => format!("mat{n}"),
            (BasicType::Float, false, 1) => "float".to_string(),
            (BasicType::Int, _, 1) => "int".to_string(),
            (BasicType::Bool, _, 1) => "bool".to_string(),
            (BasicType::Float, false, n) => format!("vec{n}"),
            (BasicType::Int, _, n) => format!("ivec{n}"),
            (BasicType::Bool, _, n) => format!("bvec{n}"),
        };
        match self.array_size {
            Some(len) => format!("{base}[{len}]"),
            None => base,
        }
    }

    /// Encoded form used inside mangled function names: `vf4` for `vec4`,
    /// `s21` for `sampler2D`, `m` prefix for matrices, `[n]` suffix for
    /// arrays.
    pub fn mangled_name(&self) -> String {
        let mut out = String::new();
        if self.matrix {
            out.push('m');
        } else if self.is_vector() {
            out.push('v');
        }
        out.push_str(self.basic.mangle_code());
        out.push_str(&self.size.to_string());
        if let Some(len) = self.array_size {
            out.push_str(&format!("[{len}]"));
        }
        out
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glsl = self.glsl_name();
        let parts = [self.qualifier.keyword(), self.precision.keyword(), glsl.as_str()];
        let mut first = true;
        for part in parts.iter().filter(|p| !p.is_empty()) {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{part}")?;
            first = false;
        }
        Ok(())
    }
}

/// Builds the mangled name of a function: the plain name, an opening
/// parenthesis, then each parameter's mangled type followed by `;`.
///
/// `void main()` becomes `main(` and `texture2D(sampler2D, vec2)` becomes
/// `texture2D(s21;vf2;`.
pub fn mangle_function_name(name: &str, params: &[Type]) -> String {
    let mut out = format!("{name}(");
    for param in params {
        out.push_str(&param.mangled_name());
        out.push(';');
    }
    out
}
