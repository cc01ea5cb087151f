//! Engine lifecycle tests.
//!
//! Every test runs on a paused tokio clock inside a `LocalSet`, so ticks
//! advance deterministically with `sleep`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use artlang_lang::types::draw::Color;
use artlang_lang::{
    DrawCommand, Engine, EngineConfig, EngineError, EngineStatus, Host, InputFuture, Message,
    MessageKind, RecordingHost, RuntimeErrorKind, ShapeDesc, Value,
};
use tokio::task::LocalSet;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn engine_with(host: RecordingHost) -> (Engine, Rc<RecordingHost>) {
    let host = Rc::new(host);
    let dyn_host: Rc<dyn Host> = host.clone();
    (Engine::new(dyn_host, EngineConfig::default().with_frame_rate(10.0)), host)
}

fn engine() -> (Engine, Rc<RecordingHost>) {
    engine_with(RecordingHost::new())
}

/// Runs `f` inside a fresh `LocalSet` so the engine can spawn its loop.
async fn local<F: std::future::Future<Output = ()>>(f: F) {
    LocalSet::new().run_until(f).await;
}

async fn ticks(n: u64) {
    // first tick fires immediately, the rest every 100ms
    tokio::time::sleep(Duration::from_millis(100 * n - 50)).await;
}

fn errors(host: &RecordingHost) -> Vec<Message> {
    host.messages().into_iter().filter(|m| m.kind == MessageKind::Error).collect()
}

// ─── Setup only ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn scenario_setup_draws_once() {
    local(async {
        let (engine, host) = engine();
        let src = "function setup() {\n\
                     background(255, 255, 255)\n\
                     fill(255, 0, 0)\n\
                     ellipse(100, 100, 50, 50)\n\
                     print(\"ok\")\n\
                   }";
        engine.execute(src).await.unwrap();

        assert_eq!(host.texts(MessageKind::Info), vec!["Running code...", "ok"]);
        assert_eq!(host.texts(MessageKind::Success), vec!["Execution finished"]);
        assert_eq!(host.resizes(), vec![(400.0, 300.0)]);

        let cmds = host.commands();
        assert!(matches!(cmds.last(), Some(DrawCommand::Shape(_))));
        let DrawCommand::Shape(circle) = &cmds[cmds.len() - 1] else { unreachable!() };
        assert_eq!(circle.desc, ShapeDesc::Ellipse { center: (100.0, 100.0), size: (50.0, 50.0) });
        assert_eq!(circle.style.fill, Some(Color::rgb(255.0, 0.0, 0.0)));
        assert!(matches!(&cmds[cmds.len() - 2], DrawCommand::Clear { color, .. } if *color == Color::WHITE));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.frame_count(), 0);
        assert_eq!(engine.status(), EngineStatus::Idle);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn top_level_runs_before_setup() {
    local(async {
        let (engine, host) = engine();
        engine.execute("print(\"a\")\nfunction setup() { print(\"b\") }\nprint(\"c\")").await.unwrap();
        assert_eq!(host.texts(MessageKind::Info), vec!["Running code...", "a", "c", "b"]);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn program_without_entry_points_finishes() {
    local(async {
        let (engine, host) = engine();
        engine.execute("x = 1 + 1").await.unwrap();
        assert_eq!(engine.global("x"), Some(Value::Number(2.0)));
        assert_eq!(host.texts(MessageKind::Success), vec!["Execution finished"]);
    })
    .await;
}

// ─── Looping ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn scenario_loop_counts_frames() {
    local(async {
        let (engine, host) = engine();
        engine.execute("x = 0\nfunction setup() { }\nfunction loop() { x = x + 1 }").await.unwrap();
        assert_eq!(engine.status(), EngineStatus::Looping);
        assert_eq!(host.texts(MessageKind::Success), vec!["Execution started"]);

        ticks(5).await;
        assert_eq!(engine.frame_count(), 5);
        assert_eq!(engine.global("x"), Some(Value::Number(5.0)));
        engine.stop();
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn frame_count_visible_to_sketch() {
    local(async {
        let (engine, _) = engine();
        engine.execute("seen = []\nfunction draw() { seen.push(frameCount) }").await.unwrap();
        ticks(3).await;
        engine.stop();
        assert_eq!(engine.global("seen").map(|v| v.to_string()), Some("[0, 1, 2]".into()));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn loop_wins_over_draw() {
    local(async {
        let (engine, host) = engine();
        engine.execute("a = 0\nb = 0\nfunction loop() { a += 1 }\nfunction draw() { b += 1 }").await.unwrap();
        ticks(2).await;
        engine.stop();
        assert_eq!(engine.global("a"), Some(Value::Number(2.0)));
        assert_eq!(engine.global("b"), Some(Value::Number(0.0)));
        assert_eq!(host.messages().iter().filter(|m| m.kind == MessageKind::Warning && m.text.contains("W003")).count(), 1);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn delay_in_loop_never_overlaps_ticks() {
    local(async {
        let (engine, _) = engine();
        engine.execute("inside = 0\npeak = 0\nfunction loop() {\n  inside += 1\n  if inside > peak { peak = inside }\n  delay(0.25)\n  inside -= 1\n}").await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        engine.stop();
        assert_eq!(engine.global("peak"), Some(Value::Number(1.0)));
        // 250ms per tick at most, no catch-up burst
        let frames = engine.frame_count();
        assert!((6..=8).contains(&frames), "{frames}");
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn presents_after_setup_and_each_tick() {
    local(async {
        let (engine, host) = engine();
        engine.execute("function loop() { }").await.unwrap();
        let after_setup = host.presented_frames();
        ticks(3).await;
        engine.stop();
        assert_eq!(host.presented_frames(), after_setup + 3);
    })
    .await;
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn scenario_bounds_error_in_setup() {
    local(async {
        let (engine, host) = engine();
        let src = "function setup() {\n  x = getItem(createList(1, 2, 3), 5)\n}\nfunction loop() { }";
        let err = engine.execute(src).await.unwrap_err();
        let EngineError::Runtime(e) = &err else { panic!("expected runtime error, got {err:?}") };
        assert_eq!(e.kind, RuntimeErrorKind::Bounds);
        assert_eq!(err.line(), Some(2));

        let errs = errors(&host);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].text.starts_with("Index 5 is out of bounds. List has 3 items."));
        assert_eq!(errs[0].line, Some(2));
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(host.texts(MessageKind::Success).is_empty());
        assert_eq!(engine.global("x"), None);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn compile_errors_are_returned_and_reported() {
    local(async {
        let (engine, host) = engine();
        let err = engine.execute("function setup() {\n  x = (1 + \n}").await.unwrap_err();
        assert!(matches!(err, EngineError::Compile(_)));
        let errs = errors(&host);
        assert!(!errs.is_empty());
        assert!(errs.iter().all(|m| m.line.is_some()));
        assert_eq!(engine.status(), EngineStatus::Idle);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn read_only_assignment_fails_compile() {
    local(async {
        let (engine, _) = engine();
        let err = engine.execute("function loop() {\n  mouseX = 1\n}").await.unwrap_err();
        assert_eq!(err.line(), Some(2));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn loop_error_is_fatal_to_the_run() {
    local(async {
        let (engine, host) = engine();
        engine.execute("function loop() {\n  if frameCount == 1 {\n    x = [] * 2\n  }\n}").await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert_eq!(engine.frame_count(), 1);
        let errs = errors(&host);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].line, Some(3));
        assert!(errs[0].text.contains("at loop (sketch:3:5)"), "{}", errs[0].text);

        // a fresh execute recovers
        engine.execute("function loop() { }").await.unwrap();
        assert_eq!(engine.status(), EngineStatus::Looping);
        engine.stop();
    })
    .await;
}

// ─── Stop and re-entry ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_cancels_next_tick() {
    local(async {
        let (engine, host) = engine();
        engine.execute("n = 0\nfunction loop() { n += 1 }").await.unwrap();
        ticks(2).await;
        engine.stop();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.global("n"), Some(Value::Number(2.0)));
        assert_eq!(host.texts(MessageKind::Warning), vec!["Execution stopped"]);
        assert_eq!(engine.status(), EngineStatus::Idle);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn stop_during_delayed_tick() {
    local(async {
        let (engine, _) = engine();
        engine.execute("a = 0\nfunction loop() {\n  a += 1\n  delay(10)\n  a += 100\n}").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.stop();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(engine.global("a"), Some(Value::Number(1.0)));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn new_execute_tears_down_the_old_run() {
    local(async {
        let (engine, host) = engine();
        engine.execute("old = 0\nfunction loop() { old += 1 }").await.unwrap();
        ticks(2).await;
        engine.execute("fresh = 0\nfunction loop() { fresh += 1 }").await.unwrap();
        ticks(3).await;
        engine.stop();
        assert_eq!(engine.global("old"), None);
        assert_eq!(engine.global("fresh"), Some(Value::Number(3.0)));
        // replacing a run is not reported as a stop
        assert_eq!(host.texts(MessageKind::Warning), vec!["Execution stopped"]);
    })
    .await;
}

// ─── Input prompts ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn input_in_setup_uses_host_reply() {
    local(async {
        let (engine, host) = engine_with(RecordingHost::with_replies([Some("Ada")]));
        engine.execute("function setup() {\n  name = input(\"Who?\")\n  print(\"hi \" + name)\n}").await.unwrap();
        assert_eq!(host.prompts(), vec!["Who?"]);
        assert_eq!(host.texts(MessageKind::Info), vec!["Running code...", "Input: Ada", "hi Ada"]);
    })
    .await;
}

/// Host whose prompts never resolve on their own.
#[derive(Default)]
struct StuckPromptHost {
    prompts: RefCell<Vec<String>>,
    messages: RefCell<Vec<Message>>,
}

impl Host for StuckPromptHost {
    fn draw(&self, _cmd: DrawCommand) {}
    fn message(&self, msg: Message) {
        self.messages.borrow_mut().push(msg);
    }
    fn resize(&self, _width: f64, _height: f64) {}
    fn request_input(&self, prompt: &str) -> InputFuture {
        self.prompts.borrow_mut().push(prompt.to_string());
        Box::pin(std::future::pending())
    }
}

#[tokio::test(start_paused = true)]
async fn stop_releases_a_pending_prompt() {
    local(async {
        let host = Rc::new(StuckPromptHost::default());
        let dyn_host: Rc<dyn Host> = host.clone();
        let engine = Rc::new(Engine::new(dyn_host, EngineConfig::default()));

        let runner = engine.clone();
        let run = tokio::task::spawn_local(async move {
            runner.execute("function setup() {\n  v = input(\"?\")\n  after = 1\n}").await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(engine.status(), EngineStatus::Executing);
        assert_eq!(*host.prompts.borrow(), vec!["?"]);

        engine.stop();
        assert!(matches!(run.await, Ok(Ok(()))));
        assert_eq!(engine.global("after"), None);
        assert_eq!(engine.status(), EngineStatus::Idle);
    })
    .await;
}
