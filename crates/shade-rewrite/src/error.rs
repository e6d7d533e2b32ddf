//! Errors raised by the rewrite pass.
//!
//! Every error is fatal for the current compilation: the tree handed over
//! by the front end is either malformed or cannot take the graft. Hosts
//! discard the tree and report the error; nothing is retried.

use std::fmt;

use shade_ir::Span;

#[derive(Clone, Debug, PartialEq)]
pub enum RewriteError {
    /// The root is not a global `Sequence`.
    MissingRootSequence { found: &'static str },
    /// A function definition has neither one child (parameters) nor two
    /// (parameters and body).
    MalformedFunction { name: String, children: usize },
    /// A function's second child is not a `Sequence`.
    MalformedFunctionBody { name: String, found: &'static str },
    /// A synthetic name is already declared or referenced by the shader.
    SyntheticNameCollision { name: String, span: Option<Span> },
    /// The shader defines no entry function, so the output is never
    /// composited.
    MissingEntryFunction { entry: String },
    /// `rewrite` was called a second time on the same instance.
    AlreadyRewritten,
}

impl RewriteError {
    /// Source location to label in diagnostics, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            RewriteError::SyntheticNameCollision { span, .. } => *span,
            _ => None,
        }
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::MissingRootSequence { found } => {
                write!(f, "tree root must be a global sequence, found {found}")
            }
            RewriteError::MalformedFunction { name, children } => write!(
                f,
                "function '{name}' has {children} children, expected parameters and an optional body"
            ),
            RewriteError::MalformedFunctionBody { name, found } => {
                write!(f, "body of function '{name}' must be a sequence, found {found}")
            }
            RewriteError::SyntheticNameCollision { name, .. } => {
                write!(f, "synthetic name '{name}' collides with a shader symbol")
            }
            RewriteError::MissingEntryFunction { entry } => {
                write!(f, "no entry function '{entry}' found")
            }
            RewriteError::AlreadyRewritten => write!(f, "shader has already been rewritten"),
        }
    }
}

impl std::error::Error for RewriteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_malformed_function() {
        let err = RewriteError::MalformedFunction {
            name: "main(".into(),
            children: 3,
        };
        assert_eq!(
            err.to_string(),
            "function 'main(' has 3 children, expected parameters and an optional body"
        );
    }

    #[test]
    fn display_all_variants() {
        assert_eq!(
            RewriteError::MissingRootSequence { found: "symbol" }.to_string(),
            "tree root must be a global sequence, found symbol"
        );
        assert_eq!(
            RewriteError::MalformedFunctionBody {
                name: "main(".into(),
                found: "constant"
            }
            .to_string(),
            "body of function 'main(' must be a sequence, found constant"
        );
        assert_eq!(
            RewriteError::SyntheticNameCollision {
                name: "css_u_texture".into(),
                span: None
            }
            .to_string(),
            "synthetic name 'css_u_texture' collides with a shader symbol"
        );
        assert_eq!(
            RewriteError::MissingEntryFunction {
                entry: "main(".into()
            }
            .to_string(),
            "no entry function 'main(' found"
        );
        assert_eq!(
            RewriteError::AlreadyRewritten.to_string(),
            "shader has already been rewritten"
        );
    }

    #[test]
    fn only_collisions_carry_spans() {
        let span = Span::new(4, 17);
        let err = RewriteError::SyntheticNameCollision {
            name: "css_v_texCoord".into(),
            span: Some(span),
        };
        assert_eq!(err.span(), Some(span));
        assert_eq!(RewriteError::AlreadyRewritten.span(), None);
    }
}
