//! Run lifecycle: compile, top-level statements, `setup` once, then
//! `loop` / `draw` once per tick on a tokio interval.
//!
//! Everything here is single-threaded. `execute` must be awaited inside a
//! `tokio::task::LocalSet`, because the loop is spawned with `spawn_local`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::EngineConfig;
use crate::diagnostics::locate_line;
use crate::error::{EngineError, RuntimeError};
use crate::host::{Host, Message};
use crate::namespaces::RuntimeState;
use crate::runtime::input::InputHandle;
use crate::runtime::interpreter::Interpreter;
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    /// Top-level statements and `setup` are running.
    Executing,
    /// `loop` / `draw` is scheduled.
    Looping,
}

/// State of the current (or most recent) run.
struct Run {
    interp: Rc<Interpreter>,
    task: Option<JoinHandle<()>>,
}

pub struct Engine {
    host: Rc<dyn Host>,
    config: EngineConfig,
    input: InputHandle,
    status: Rc<Cell<EngineStatus>>,
    run: RefCell<Option<Run>>,
}

impl Engine {
    pub fn new(host: Rc<dyn Host>, config: EngineConfig) -> Self {
        Self {
            host,
            config,
            input: InputHandle::new(),
            status: Rc::new(Cell::new(EngineStatus::Idle)),
            run: RefCell::new(None),
        }
    }

    /// Where the host sends mouse and keyboard events.
    pub fn input(&self) -> InputHandle {
        self.input.clone()
    }

    pub fn status(&self) -> EngineStatus {
        self.status.get()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reads a global of the current or most recent run.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.run.borrow().as_ref().and_then(|r| r.interp.global(name))
    }

    pub fn frame_count(&self) -> u64 {
        self.run.borrow().as_ref().map_or(0, |r| r.interp.frame_count())
    }

    /// Tears down any previous run, then compiles and starts `source`.
    ///
    /// Resolves once `setup` has finished. Compile errors and errors raised
    /// before the loop starts are both reported to the host and returned;
    /// errors in later ticks only reach the host.
    pub async fn execute(&self, source: &str) -> Result<(), EngineError> {
        self.teardown();
        log::debug!("execute: {} bytes", source.len());
        self.host.message(Message::info("Running code..."));

        self.input.discard_edges();
        let mut state = RuntimeState::new(&self.config, self.input.mouse_position());
        state.take_outbox().deliver(self.host.as_ref());

        let program = match crate::compile(source) {
            Ok((program, warnings)) => {
                for w in warnings {
                    self.host.message(Message { line: Some(w.line), ..Message::warning(w.to_string()) });
                }
                program
            }
            Err(errors) => {
                for e in &errors {
                    self.host.message(Message::error(e.to_string(), Some(e.line)));
                }
                log::debug!("compile failed with {} error(s)", errors.len());
                return Err(EngineError::Compile(errors));
            }
        };

        let interp = Rc::new(Interpreter::new(program, state, self.host.clone(), &self.config));
        let source: Rc<str> = Rc::from(source);
        *self.run.borrow_mut() = Some(Run { interp: interp.clone(), task: None });
        self.status.set(EngineStatus::Executing);

        log::debug!("running top level and setup");
        let setup = async {
            interp.run_top_level().await?;
            interp.call_entry("setup").await
        }
        .await;

        // a stop() or a newer execute() already owns status and messages
        if interp.is_cancelled() {
            return Ok(());
        }
        self.host.present();

        if let Err(e) = setup {
            report(self.host.as_ref(), &e, &source, self.config.wrapper_offset);
            self.status.set(EngineStatus::Idle);
            return Err(e.into());
        }

        match interp.frame_function() {
            Some(frame_fn) => {
                log::debug!("scheduling `{frame_fn}` every {:?}", self.config.frame_period());
                let task = tokio::task::spawn_local(run_loop(
                    interp,
                    frame_fn,
                    self.input.clone(),
                    self.host.clone(),
                    self.status.clone(),
                    source,
                    self.config.clone(),
                ));
                if let Some(run) = self.run.borrow_mut().as_mut() {
                    run.task = Some(task);
                }
                self.status.set(EngineStatus::Looping);
                self.host.message(Message::success("Execution started"));
            }
            None => {
                self.status.set(EngineStatus::Idle);
                self.host.message(Message::success("Execution finished"));
            }
        }
        Ok(())
    }

    /// Cancels the scheduled loop and any suspended `setup`. Idempotent.
    pub fn stop(&self) {
        let was_running = self.status.get() != EngineStatus::Idle;
        self.teardown();
        if was_running {
            log::debug!("stopped");
            self.host.message(Message::warning("Execution stopped"));
        }
    }

    fn teardown(&self) {
        if let Some(run) = self.run.borrow_mut().as_mut() {
            if let Some(task) = run.task.take() {
                task.abort();
            }
            run.interp.cancel();
        }
        self.status.set(EngineStatus::Idle);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// One tick per interval period. A tick that suspends delays the next one
/// instead of causing a burst of catch-up ticks.
async fn run_loop(
    interp: Rc<Interpreter>,
    frame_fn: &'static str,
    input: InputHandle,
    host: Rc<dyn Host>,
    status: Rc<Cell<EngineStatus>>,
    source: Rc<str>,
    config: EngineConfig,
) {
    let mut ticker = tokio::time::interval(config.frame_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        log::trace!("tick {}", interp.frame_count());
        if let Err(e) = tick(&interp, frame_fn, &input, host.as_ref()).await {
            if e.is_stopped() || interp.is_cancelled() {
                break;
            }
            log::warn!("`{frame_fn}` failed on frame {}: {e}", interp.frame_count());
            report(host.as_ref(), &e, &source, config.wrapper_offset);
            status.set(EngineStatus::Idle);
            break;
        }
    }
}

/// Clear button clicks, snapshot input, run the frame function, then roll
/// the mouse forward and count the frame.
async fn tick(
    interp: &Interpreter,
    frame_fn: &str,
    input: &InputHandle,
    host: &dyn Host,
) -> Result<(), RuntimeError> {
    interp.with_state(|st| {
        st.buttons.clear_clicks();
        input.snapshot(&mut st.input);
    });

    let result = interp.call_entry(frame_fn).await;
    host.present();
    result?;

    interp.with_state(|st| {
        st.input.advance(input.mouse_position());
        st.frame_count += 1;
    });
    Ok(())
}

/// Sends a runtime error to the console with the best line we can find.
fn report(host: &dyn Host, e: &RuntimeError, source: &str, wrapper_offset: usize) {
    let stack = e.stack();
    let line = if e.line > 0 {
        Some(e.line)
    } else {
        locate_line(&e.message, &stack, source, wrapper_offset)
    };
    let text = if stack.is_empty() { e.message.clone() } else { format!("{}\n{stack}", e.message) };
    host.message(Message::error(text, line));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MessageKind, RecordingHost};
    use std::time::Duration;
    use tokio::task::LocalSet;

    fn engine() -> (Engine, Rc<RecordingHost>) {
        let host = Rc::new(RecordingHost::new());
        let dyn_host: Rc<dyn Host> = host.clone();
        (Engine::new(dyn_host, EngineConfig::default().with_frame_rate(10.0)), host)
    }

    #[tokio::test(start_paused = true)]
    async fn setup_only_finishes() {
        LocalSet::new().run_until(async {
            let (engine, host) = engine();
            engine.execute("function setup() { print(\"hi\") }").await.unwrap();
            assert_eq!(engine.status(), EngineStatus::Idle);
            assert_eq!(
                host.texts(MessageKind::Success),
                vec!["Execution finished"]
            );
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(engine.frame_count(), 0);
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn loop_ticks_and_stops() {
        LocalSet::new().run_until(async {
            let (engine, host) = engine();
            engine.execute("n = 0\nfunction loop() { n += 1 }").await.unwrap();
            assert_eq!(engine.status(), EngineStatus::Looping);

            // ticks at 0, 100, 200ms
            tokio::time::sleep(Duration::from_millis(250)).await;
            assert_eq!(engine.frame_count(), 3);
            assert_eq!(engine.global("n"), Some(Value::Number(3.0)));

            engine.stop();
            engine.stop();
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert_eq!(engine.frame_count(), 3);
            assert_eq!(host.texts(MessageKind::Warning), vec!["Execution stopped"]);
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_silent() {
        let (engine, host) = engine();
        engine.stop();
        assert!(host.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_error_halts_scheduling() {
        LocalSet::new().run_until(async {
            let (engine, host) = engine();
            engine.execute("function loop() {\n  if frameCount == 2 { boom() }\n}").await.unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(engine.status(), EngineStatus::Idle);
            assert_eq!(engine.frame_count(), 2);
            let errors: Vec<_> = host.messages().into_iter().filter(|m| m.kind == MessageKind::Error).collect();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].line, Some(2));
            assert!(errors[0].text.starts_with("undefined function `boom`"));
        }).await;
    }

    #[tokio::test(start_paused = true)]
    async fn execute_replaces_previous_run() {
        LocalSet::new().run_until(async {
            let (engine, _) = engine();
            engine.execute("a = 0\nfunction loop() { a += 1 }").await.unwrap();
            tokio::time::sleep(Duration::from_millis(150)).await;
            engine.execute("b = 0\nfunction loop() { b += 1 }").await.unwrap();
            assert_eq!(engine.global("a"), None);
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert_eq!(engine.global("b"), Some(Value::Number(1.0)));
        }).await;
    }
}
