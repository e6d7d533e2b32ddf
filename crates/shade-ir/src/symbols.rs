//! Symbol registry: the front end's name → declaration mapping.
//!
//! The rewrite pass only ever reads it through [`SymbolRegistry`]. The
//! concrete [`SymbolTable`] is a stack of scopes, with the outermost scope
//! holding built-in variables and functions.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::span::Span;
use crate::types::{mangle_function_name, BasicType, Precision, Qualifier, Type};

/// What the front end knows about one declared name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: Type,
    /// Declaration site in the shader source, if it has one.
    #[serde(default)]
    pub span: Option<Span>,
    #[serde(default)]
    pub builtin: bool,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            span: None,
            builtin: false,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    fn builtin(name: impl Into<String>, ty: Type) -> Self {
        Self {
            builtin: true,
            ..Self::new(name, ty)
        }
    }
}

/// Read-only view over declared names.
pub trait SymbolRegistry {
    /// Find the innermost declaration of `name`.
    fn lookup(&self, name: &str) -> Option<&SymbolInfo>;

    fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Type of a built-in variable or function, `None` for user symbols.
    fn builtin_type(&self, name: &str) -> Option<&Type> {
        self.lookup(name).filter(|info| info.builtin).map(|info| &info.ty)
    }
}

/// Scoped symbol table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, SymbolInfo>>,
}

impl SymbolTable {
    /// A table with a single, empty global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// A table whose outer scope holds the fragment-shader built-ins,
    /// followed by an empty global scope for user declarations.
    pub fn with_fragment_builtins() -> Self {
        let mut builtins = FxHashMap::default();
        let mut add = |info: SymbolInfo| {
            builtins.insert(info.name.clone(), info);
        };

        add(SymbolInfo::builtin(
            "gl_FragColor",
            Type::vec(4, Precision::Medium, Qualifier::FragColor),
        ));
        let mut frag_data = Type::vec(4, Precision::Medium, Qualifier::FragData);
        frag_data.array_size = Some(1);
        add(SymbolInfo::builtin("gl_FragData", frag_data));
        add(SymbolInfo::builtin(
            "gl_FragCoord",
            Type::vec(4, Precision::Medium, Qualifier::FragCoord),
        ));
        add(SymbolInfo::builtin(
            "gl_FrontFacing",
            Type::bool().with_qualifier(Qualifier::FrontFacing),
        ));
        add(SymbolInfo::builtin(
            "gl_PointCoord",
            Type::vec(2, Precision::Medium, Qualifier::PointCoord),
        ));

        let sampler = Type::sampler2d(Qualifier::In);
        let coord = Type::vec(2, Precision::Undefined, Qualifier::In);
        add(SymbolInfo::builtin(
            mangle_function_name("texture2D", &[sampler.clone(), coord]),
            Type::vec(4, Precision::Low, Qualifier::Temporary),
        ));
        let cube = Type::new(BasicType::SamplerCube, Precision::Undefined, Qualifier::In, 1);
        let dir = Type::vec(3, Precision::Undefined, Qualifier::In);
        add(SymbolInfo::builtin(
            mangle_function_name("textureCube", &[cube, dir]),
            Type::vec(4, Precision::Low, Qualifier::Temporary),
        ));

        Self {
            scopes: vec![builtins, FxHashMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the innermost scope. The outermost scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Declare `info` in the innermost scope. Returns the existing entry
    /// when the name is already declared at that level.
    pub fn declare(&mut self, info: SymbolInfo) -> Result<(), SymbolInfo> {
        if self.scopes.is_empty() {
            self.scopes.push(FxHashMap::default());
        }
        let innermost = self.scopes.len() - 1;
        let scope = &mut self.scopes[innermost];
        if let Some(existing) = scope.get(&info.name) {
            return Err(existing.clone());
        }
        scope.insert(info.name.clone(), info);
        Ok(())
    }
}

impl SymbolRegistry for SymbolTable {
    fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_visible_and_typed() {
        let table = SymbolTable::with_fragment_builtins();
        let ty = table.builtin_type("gl_FragColor").expect("gl_FragColor is built in");
        assert_eq!(ty.qualifier, Qualifier::FragColor);
        assert_eq!(ty.size, 4);
        assert!(table.is_declared("texture2D(s21;vf2;"));
    }

    #[test]
    fn user_symbols_are_not_builtin() {
        let mut table = SymbolTable::with_fragment_builtins();
        table
            .declare(SymbolInfo::new("u_color", Type::vec(4, Precision::High, Qualifier::Uniform)))
            .unwrap();
        assert!(table.is_declared("u_color"));
        assert!(table.builtin_type("u_color").is_none());
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        let info = SymbolInfo::new("x", Type::bool());
        table.declare(info.clone()).unwrap();
        assert_eq!(table.declare(info.clone()), Err(info));
    }

    #[test]
    fn inner_scope_shadows_and_pops() {
        let mut table = SymbolTable::new();
        table.declare(SymbolInfo::new("x", Type::bool())).unwrap();
        table.push_scope();
        table
            .declare(SymbolInfo::new("x", Type::vec(2, Precision::Low, Qualifier::Temporary)))
            .unwrap();
        assert_eq!(table.lookup("x").map(|i| i.ty.size), Some(2));
        table.pop_scope();
        assert_eq!(table.lookup("x").map(|i| i.ty.size), Some(1));

        table.pop_scope();
        assert_eq!(table.depth(), 1, "global scope survives");
    }
}
