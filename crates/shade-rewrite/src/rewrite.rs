//! The rewrite orchestrator.
//!
//! Sequences the pass over one compilation unit:
//! 1. Pre-flight: the root must be the global sequence, the entry function
//!    must exist (unless configured otherwise) and no synthetic name may
//!    already be declared or referenced.
//! 2. Declare the texture sampler uniform.
//! 3. Declare the texture-coordinate varying (unless the host does).
//! 4. Declare the output-color alias, initialized to opaque white.
//! 5. Run the traversal once.
//!
//! The declarations end up first in the global scope, in that order.

use rustc_hash::FxHashSet;
use shade_ir::{NodeId, Precision, Qualifier, SymbolRegistry, Tree, Type};

use crate::config::{RewriteConfig, ENTRY_FUNCTION, OUTPUT_COLOR, TEXTURE2D};
use crate::error::RewriteError;
use crate::factory::NodeFactory;
use crate::insert::{insert_at_top_of_shader, root_sequence};
use crate::traverse::{traverse, Composition, RewriteReport};

/// One rewrite of one tree. Borrows the tree and the registry for its
/// lifetime and may run at most once.
pub struct Rewriter<'a> {
    tree: &'a mut Tree,
    symbols: &'a dyn SymbolRegistry,
    config: RewriteConfig,
    rewritten: bool,
}

impl<'a> Rewriter<'a> {
    pub fn new(tree: &'a mut Tree, symbols: &'a dyn SymbolRegistry, config: RewriteConfig) -> Self {
        Self {
            tree,
            symbols,
            config,
            rewritten: false,
        }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Graft the compositing pattern onto the tree.
    ///
    /// Pre-flight errors leave the tree untouched. A malformed entry function
    /// is only found during the walk; the tree is then partially rewritten
    /// and must be discarded.
    /// A second call always fails with [`RewriteError::AlreadyRewritten`].
    pub fn rewrite(&mut self) -> Result<RewriteReport, RewriteError> {
        if self.rewritten {
            return Err(RewriteError::AlreadyRewritten);
        }
        self.rewritten = true;

        root_sequence(&*self.tree)?;
        if self.config.require_entry_function && self.tree.find_function(ENTRY_FUNCTION).is_none() {
            return Err(RewriteError::MissingEntryFunction {
                entry: ENTRY_FUNCTION.to_string(),
            });
        }
        self.check_synthetic_names()?;

        let mut declarations = Vec::with_capacity(3);
        declarations.push(self.texture_uniform_declaration());
        if self.config.declare_tex_coord_varying {
            declarations.push(self.tex_coord_varying_declaration());
        } else {
            log::debug!(
                "host declares '{}', skipping varying",
                self.config.tex_coord_varying_name()
            );
        }
        declarations.push(self.frag_color_alias_declaration());
        // Prepending stacks in reverse, so insert the last one first.
        for declaration in declarations.into_iter().rev() {
            insert_at_top_of_shader(self.tree, declaration)?;
        }

        let composition = self.composition();
        let report = traverse(self.tree, &composition)?;
        log::debug!(
            "redirected {} reference(s) to '{}', composed {} entry function(s)",
            report.renamed_references,
            composition.alias_name,
            report.entry_functions
        );

        if report.entry_functions == 0 {
            if self.config.require_entry_function {
                return Err(RewriteError::MissingEntryFunction {
                    entry: ENTRY_FUNCTION.to_string(),
                });
            }
            log::warn!("no entry function '{ENTRY_FUNCTION}', output is not composited");
        }
        Ok(report)
    }

    /// Root of the (possibly rewritten) tree, for the code generator.
    pub fn rewritten_root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    /// Names this rewrite will declare, in declaration order.
    fn synthetic_names(&self) -> Vec<String> {
        let mut names = vec![self.config.texture_uniform_name()];
        if self.config.declare_tex_coord_varying {
            names.push(self.config.tex_coord_varying_name());
        }
        names.push(self.config.frag_color_alias_name());
        names
    }

    fn check_synthetic_names(&self) -> Result<(), RewriteError> {
        let used: FxHashSet<&str> = self
            .tree
            .preorder()
            .into_iter()
            .filter_map(|id| self.tree.symbol_name(id))
            .collect();

        for name in self.synthetic_names() {
            if let Some(info) = self.symbols.lookup(&name) {
                return Err(RewriteError::SyntheticNameCollision {
                    name,
                    span: info.span,
                });
            }
            if used.contains(name.as_str()) {
                return Err(RewriteError::SyntheticNameCollision { name, span: None });
            }
        }
        Ok(())
    }

    // Inserts "uniform sampler2D css_u_texture<suffix>".
    fn texture_uniform_declaration(&mut self) -> NodeId {
        let name = self.config.texture_uniform_name();
        let mut f = NodeFactory::new(self.tree);
        let sampler = f.uniform_sampler2d(name);
        f.declaration(sampler)
    }

    // Inserts "varying highp vec2 css_v_texCoord<suffix>".
    fn tex_coord_varying_declaration(&mut self) -> NodeId {
        let name = self.config.tex_coord_varying_name();
        let mut f = NodeFactory::new(self.tree);
        let coord = f.varying_vec2(name);
        f.declaration(coord)
    }

    // Inserts "<precision> vec4 css_gl_FragColor<suffix> = vec4(1.0)".
    fn frag_color_alias_declaration(&mut self) -> NodeId {
        let name = self.config.frag_color_alias_name();
        let precision = self.config.alias_precision;
        let mut f = NodeFactory::new(self.tree);
        let white = f.vec4_constant(1.0, 1.0, 1.0, 1.0);
        let init = f.initialized_global_vec4(name, precision, white);
        f.declaration(init)
    }

    fn composition(&self) -> Composition {
        let output_ty = self
            .symbols
            .builtin_type(OUTPUT_COLOR)
            .cloned()
            .unwrap_or_else(|| Type::vec(4, Precision::Medium, Qualifier::FragColor));
        let sample_ty = self
            .symbols
            .builtin_type(TEXTURE2D)
            .cloned()
            .unwrap_or_else(|| Type::vec(4, Precision::Low, Qualifier::Temporary));
        Composition {
            output_ty,
            alias_name: self.config.frag_color_alias_name(),
            alias_precision: self.config.alias_precision,
            texture_uniform: self.config.texture_uniform_name(),
            tex_coord_varying: self.config.tex_coord_varying_name(),
            sample_ty,
        }
    }
}

/// Run a single rewrite over `tree`.
pub fn rewrite_shader(
    tree: &mut Tree,
    symbols: &dyn SymbolRegistry,
    config: RewriteConfig,
) -> Result<RewriteReport, RewriteError> {
    Rewriter::new(tree, symbols, config).rewrite()
}
