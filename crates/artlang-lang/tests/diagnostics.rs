//! Error mapping: lines attached to console errors, and the standalone
//! `locate_line` heuristics against realistic sketches.

use std::rc::Rc;

use artlang_lang::diagnostics::locate_line;
use artlang_lang::{Engine, EngineConfig, Host, Message, MessageKind, RecordingHost};
use tokio::task::LocalSet;

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Runs `src` through setup and returns the error messages sent to the host.
async fn reported(src: &str) -> Vec<Message> {
    let host = Rc::new(RecordingHost::new());
    let dyn_host: Rc<dyn Host> = host.clone();
    let engine = Engine::new(dyn_host, EngineConfig::default());
    let _ = LocalSet::new().run_until(engine.execute(src)).await;
    host.messages().into_iter().filter(|m| m.kind == MessageKind::Error).collect()
}

const SKETCH: &str = "\
x = 0
function setup() {
  size(200, 200)
}

function loop() {
  background(255)
  drawThing(x)
}
";

// ─── Engine-reported lines ───────────────────────────────────────────────────

#[tokio::test]
async fn runtime_error_points_at_the_failing_statement() {
    let errs = reported("a = 1\nfunction setup() {\n  b = a +\n    nope\n}").await;
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].line, Some(4));
    assert!(errs[0].text.starts_with("undefined variable `nope`"));
}

#[tokio::test]
async fn nested_call_reports_the_innermost_line() {
    let src = "function helper(v) {\n  return getItem(v, 9)\n}\nfunction setup() {\n  helper([1])\n}";
    let errs = reported(src).await;
    assert_eq!(errs[0].line, Some(2));
    assert!(errs[0].text.contains("at helper (sketch:2:3)"));
    assert!(errs[0].text.contains("at setup (sketch:5:3)"));
}

#[tokio::test]
async fn syntax_error_line_and_column() {
    let errs = reported("function setup() {\n  x = 1 +* 2\n}").await;
    assert_eq!(errs[0].line, Some(2));
    assert!(errs[0].text.contains("line 2:"));
}

#[tokio::test]
async fn every_lexer_error_is_reported() {
    let errs = reported("a = @\nb = 2\nc = #").await;
    let lines: Vec<_> = errs.iter().map(|m| m.line).collect();
    assert_eq!(lines, vec![Some(1), Some(3)]);
}

// ─── Heuristics ──────────────────────────────────────────────────────────────

#[test]
fn explicit_line_wins_over_everything() {
    let stack = "    at loop (sketch:8:3)";
    assert_eq!(locate_line("failure on line 3", stack, SKETCH, 0), Some(3));
}

#[test]
fn stack_marker_used_when_message_is_silent() {
    assert_eq!(locate_line("boom", "    at loop (sketch:8:3)", SKETCH, 0), Some(8));
}

#[test]
fn wrapper_offset_shifts_stack_lines() {
    assert_eq!(locate_line("boom", "    at <anonymous>:9:14", SKETCH, 2), Some(7));
}

#[test]
fn undefined_function_found_by_name() {
    assert_eq!(locate_line("undefined function `drawThing`", "", SKETCH, 0), Some(8));
}

#[test]
fn host_style_not_defined_message() {
    assert_eq!(locate_line("drawThing is not defined", "", SKETCH, 0), Some(8));
}

#[test]
fn unknown_name_gives_no_line() {
    assert_eq!(locate_line("undefined variable `ghost`", "", SKETCH, 0), None);
}
