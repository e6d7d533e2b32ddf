//! End-to-end tests for the `shadec` binary.
//!
//! Shader units are built with `shade-ir`, serialized to a temp directory
//! and fed to the binary; assertions look at exit status, stdout and stderr.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use shade_ir::{
    AggregateOp, BinaryOp, ConstantValue, Node, Precision, Qualifier, Span, SymbolInfo,
    SymbolTable, Tree, Type,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn shadec_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_shadec"))
}

/// `void main() { gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0); }`, or the same
/// statement inside `name` when it is not `main(`.
fn red_tree(function_name: &str) -> Tree {
    let mut tree = Tree::new();
    let lhs = tree.alloc(Node::symbol(
        "gl_FragColor",
        Type::vec(4, Precision::Medium, Qualifier::FragColor),
    ));
    let rhs = tree.alloc(Node::constant(
        [1.0, 0.0, 0.0, 1.0].into_iter().map(ConstantValue::Float).collect(),
        Type::vec(4, Precision::Undefined, Qualifier::Const),
    ));
    let assign = tree.alloc(Node::binary(
        BinaryOp::Assign,
        lhs,
        rhs,
        Type::vec(4, Precision::Medium, Qualifier::Temporary),
    ));
    let params = tree.alloc(Node::aggregate(AggregateOp::Parameters, "", vec![], Type::void()));
    let body = tree.alloc(Node::aggregate(AggregateOp::Sequence, "", vec![assign], Type::void()));
    let main = tree.alloc(Node::aggregate(
        AggregateOp::Function,
        function_name,
        vec![params, body],
        Type::void(),
    ));
    let root = tree.root();
    tree.sequence_mut(root).unwrap().push(main);
    tree
}

fn write_unit(dir: &Path, unit: &serde_json::Value) -> PathBuf {
    let path = dir.join("unit.json");
    std::fs::write(&path, serde_json::to_string(unit).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(shadec_bin())
        .args(args)
        .output()
        .expect("failed to run shadec")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ── rewrite ────────────────────────────────────────────────────────────

#[test]
fn test_rewrite_emits_ir() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("main(") }));

    let output = run(&["rewrite", input.to_str().unwrap(), "--suffix", "_t"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let ir = stdout(&output);
    assert!(ir.starts_with("Sequence\n"), "{ir}");
    assert!(ir.contains("'css_u_texture_t' (uniform sampler2D)"), "{ir}");
    assert!(ir.contains("'css_gl_FragColor_t' (global highp vec4)"), "{ir}");
    assert!(!ir.contains("(global mediump vec4)"), "{ir}");
    assert!(ir.contains("Call 'texture2D(s21;vf2;' (lowp vec4)"), "{ir}");
}

#[test]
fn test_rewrite_json_round_trips_through_dump() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("main(") }));
    let rewritten = dir.path().join("out.json");

    let output = run(&[
        "rewrite",
        input.to_str().unwrap(),
        "--emit",
        "json",
        "-o",
        rewritten.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let dumped = run(&["dump", rewritten.to_str().unwrap()]);
    assert!(dumped.status.success(), "stderr: {}", stderr(&dumped));
    let ir = stdout(&dumped);
    assert!(ir.contains("'css_v_texCoord' (varying in highp vec2)"), "{ir}");
    assert!(ir.contains("multiply (highp vec4)"), "{ir}");
}

#[test]
fn test_config_file_is_overridden_by_flags() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("main(") }));
    let config = dir.path().join("rewrite.toml");
    std::fs::write(
        &config,
        "hidden_symbol_suffix = \"_cfg\"\nalias_precision = \"lowp\"\ndeclare_tex_coord_varying = false\n",
    )
    .unwrap();

    let output = run(&[
        "rewrite",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--precision",
        "mediump",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let ir = stdout(&output);
    assert!(ir.contains("initialize (mediump vec4)"), "{ir}");
    assert!(ir.contains("'css_u_texture_cfg'"), "{ir}");
    // The varying is only referenced by the composition, never declared.
    assert!(!ir.contains("Declaration\n    'css_v_texCoord_cfg'"), "{ir}");
}

#[test]
fn test_missing_entry_fails_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("helper(") }));

    let output = run(&["rewrite", input.to_str().unwrap(), "--no-color"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("E0105"), "{err}");
    assert!(err.contains("error: rewrite failed"), "{err}");
}

#[test]
fn test_missing_entry_can_be_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("helper(") }));

    let output = run(&["rewrite", input.to_str().unwrap(), "--allow-missing-entry"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("output is not composited"));
}

#[test]
fn test_collision_reported_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut symbols = SymbolTable::with_fragment_builtins();
    symbols
        .declare(
            SymbolInfo::new("css_u_texture", Type::sampler2d(Qualifier::Uniform))
                .with_span(Span::new(18, 31)),
        )
        .unwrap();
    let input = write_unit(
        dir.path(),
        &serde_json::json!({ "tree": red_tree("main("), "symbols": symbols }),
    );

    let output = run(&["rewrite", input.to_str().unwrap(), "--json"]);

    assert!(!output.status.success());
    // stderr holds exactly one JSON object and nothing else.
    let err = stderr(&output);
    let json: serde_json::Value = serde_json::from_str(&err).unwrap();
    assert_eq!(json["code"], "E0104");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["spans"][0]["start"], 18);
    assert_eq!(json["spans"][0]["end"], 31);
}

#[test]
fn test_collision_labeled_in_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut symbols = SymbolTable::with_fragment_builtins();
    symbols
        .declare(
            SymbolInfo::new("css_u_texture", Type::sampler2d(Qualifier::Uniform))
                .with_span(Span::new(18, 31)),
        )
        .unwrap();
    let input = write_unit(
        dir.path(),
        &serde_json::json!({ "tree": red_tree("main("), "symbols": symbols }),
    );
    let source = dir.path().join("shader.frag");
    std::fs::write(
        &source,
        "uniform sampler2D css_u_texture;\nvoid main() { gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0); }\n",
    )
    .unwrap();

    let output = run(&[
        "rewrite",
        input.to_str().unwrap(),
        "--source",
        source.to_str().unwrap(),
        "--no-color",
    ]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("E0104"), "{err}");
    assert!(err.contains("'css_u_texture' is already declared here"), "{err}");
}

// ── Input Errors ───────────────────────────────────────────────────────

#[test]
fn test_unreadable_input_reported_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    let output = run(&["rewrite", missing.to_str().unwrap(), "--json"]);

    assert!(!output.status.success());
    let err = stderr(&output);
    let json: serde_json::Value = serde_json::from_str(&err).unwrap();
    assert_eq!(json["severity"], "error");
    assert!(
        json["message"].as_str().unwrap().starts_with("Failed to read"),
        "{err}"
    );
}

#[test]
fn test_dangling_child_is_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut unit = serde_json::json!({ "tree": red_tree("main(") });
    // Point the root at a node that does not exist.
    unit["tree"]["nodes"][0]["children"] = serde_json::json!([99]);
    let input = write_unit(dir.path(), &unit);

    let output = run(&["dump", input.to_str().unwrap()]);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Failed to parse shader unit"), "{err}");
    assert!(err.contains("missing child [99]"), "{err}");
}

#[test]
fn test_invalid_precision_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("main(") }));

    let output = run(&["rewrite", input.to_str().unwrap(), "--precision", "undefined"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("expected lowp, mediump, or highp"));
}

#[test]
fn test_verbose_logs_steps() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_unit(dir.path(), &serde_json::json!({ "tree": red_tree("main(") }));

    let output = run(&["--verbose", "rewrite", input.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("debug:"), "{err}");
    assert!(err.contains("redirected 1 output reference(s)"), "{err}");
}
