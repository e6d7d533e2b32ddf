//! Ariadne-based rendering of rewrite errors.
//!
//! Each error gets a stable code. Collisions with a user declaration are
//! labeled at the declaration when the front end recorded its span; the
//! other errors describe the tree as a whole and render without labels.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::RewriteError;

/// Rendering options.
#[derive(Clone, Debug)]
pub struct DiagnosticOptions {
    pub color: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

impl DiagnosticOptions {
    /// Colorless output, for logs and snapshot tests.
    pub fn colorless() -> Self {
        Self { color: false }
    }
}

// ── Error Codes ────────────────────────────────────────────────────────

pub fn error_code(err: &RewriteError) -> &'static str {
    match err {
        RewriteError::MissingRootSequence { .. } => "E0101",
        RewriteError::MalformedFunction { .. } => "E0102",
        RewriteError::MalformedFunctionBody { .. } => "E0103",
        RewriteError::SyntheticNameCollision { .. } => "E0104",
        RewriteError::MissingEntryFunction { .. } => "E0105",
        RewriteError::AlreadyRewritten => "E0106",
    }
}

fn help(err: &RewriteError) -> String {
    match err {
        RewriteError::MissingRootSequence { .. } | RewriteError::MalformedFunction { .. } => {
            "the front end produced an invalid tree; this is a compiler bug".to_string()
        }
        RewriteError::MalformedFunctionBody { .. } => {
            "a function body must be a statement sequence".to_string()
        }
        RewriteError::SyntheticNameCollision { .. } => {
            "rename the shader symbol or use a different hidden symbol suffix".to_string()
        }
        RewriteError::MissingEntryFunction { .. } => {
            "define `void main()` in the fragment shader".to_string()
        }
        RewriteError::AlreadyRewritten => {
            "create a new rewriter for each compilation".to_string()
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Render `error` against the shader `source` into a string.
pub fn render_diagnostic(error: &RewriteError, source: &str, opts: &DiagnosticOptions) -> String {
    let config = Config::default().with_color(opts.color);
    let source_len = source.len();

    // Clamp a span into the source; ariadne wants at least one character
    // when the source has any.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    // Without source text there is nothing to point at.
    let labeled = error
        .span()
        .filter(|_| !source.is_empty())
        .map(|span| clamp(span.start as usize..span.end as usize));
    let anchor = labeled.clone().unwrap_or(0..0);

    let mut builder = Report::build(ReportKind::Error, anchor)
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config)
        .with_help(help(error));

    if let Some(range) = labeled {
        let message = match error {
            RewriteError::SyntheticNameCollision { name, .. } => {
                format!("'{name}' is already declared here")
            }
            other => other.to_string(),
        };
        builder.add_label(Label::new(range).with_message(message).with_color(Color::Red));
    }

    let mut buf = Vec::new();
    builder
        .finish()
        .write(Source::from(source), &mut buf)
        .expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}
