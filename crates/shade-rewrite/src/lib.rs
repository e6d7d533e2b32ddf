//! Texture compositing for compiled fragment shaders.
//!
//! Takes the type-checked tree of a fragment shader and grafts a texture
//! multiply onto its output color:
//!
//! - every reference to `gl_FragColor` is redirected to a hidden global
//!   alias initialized to opaque white,
//! - a sampler uniform and a texture-coordinate varying are declared,
//! - `main` ends with `gl_FragColor = alias * texture2D(sampler, texCoord)`.
//!
//! The entry point is [`Rewriter`] (or [`rewrite_shader`] for one-shot use).
//! Errors render through [`diagnostics::render_diagnostic`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod insert;
pub mod rewrite;
pub mod traverse;

pub use config::RewriteConfig;
pub use error::RewriteError;
pub use factory::NodeFactory;
pub use rewrite::{rewrite_shader, Rewriter};
pub use traverse::{rename_function, Composition, RewriteReport};
