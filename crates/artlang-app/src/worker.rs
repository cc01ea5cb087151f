//! The engine thread.
//!
//! `Engine` is single-threaded (`Rc` state, `spawn_local` ticks), so it lives
//! on its own thread with a current-thread tokio runtime and a `LocalSet`.
//! The UI talks to it only through the two flume channels.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use artlang_lang::{
    DrawCommand, Engine, EngineConfig, EngineStatus, Host, InputFuture, Message, MouseButton, ENGINE_STACK_SIZE,
};
use eframe::egui;
use tokio::task::LocalSet;

/// UI to engine.
#[derive(Debug)]
pub enum Command {
    Run(String),
    Stop,
    /// Answer to the last `Event::Prompt`; `None` when dismissed.
    Reply(Option<String>),
    MouseMoved(f64, f64),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    KeyDown(String),
    KeyUp(String),
}

/// Engine to UI.
#[derive(Debug)]
pub enum Event {
    /// Everything drawn since the previous frame, in order.
    Frame(Vec<DrawCommand>),
    Message(Message),
    Resize(f64, f64),
    Prompt(String),
    Status(EngineStatus),
}

/// How often the worker checks for engine status changes.
const STATUS_POLL: Duration = Duration::from_millis(50);

pub fn spawn(ctx: egui::Context, config: EngineConfig) -> std::io::Result<(flume::Sender<Command>, flume::Receiver<Event>)> {
    let (cmd_tx, cmd_rx) = flume::unbounded();
    let (event_tx, event_rx) = flume::unbounded();

    std::thread::Builder::new()
        .name("artlang-engine".into())
        .stack_size(ENGINE_STACK_SIZE)
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("could not start engine runtime: {e}");
                    return;
                }
            };
            let host = Rc::new(ChannelHost::new(event_tx, ctx));
            LocalSet::new().block_on(&runtime, serve(host, config, cmd_rx));
            log::debug!("engine thread exiting");
        })?;

    Ok((cmd_tx, event_rx))
}

async fn serve(host: Rc<ChannelHost>, config: EngineConfig, commands: flume::Receiver<Command>) {
    let dyn_host: Rc<dyn Host> = host.clone();
    let engine = Rc::new(Engine::new(dyn_host, config));
    let input = engine.input();
    let mut poll = tokio::time::interval(STATUS_POLL);
    let mut last_status = engine.status();

    loop {
        tokio::select! {
            cmd = commands.recv_async() => {
                let Ok(cmd) = cmd else { break };
                match cmd {
                    Command::Run(source) => {
                        let engine = engine.clone();
                        tokio::task::spawn_local(async move {
                            // already reported to the console by the engine
                            if let Err(e) = engine.execute(&source).await {
                                log::debug!("run ended early: {e}");
                            }
                        });
                    }
                    Command::Stop => {
                        host.dismiss_prompt();
                        engine.stop();
                    }
                    Command::Reply(answer) => host.reply(answer),
                    Command::MouseMoved(x, y) => input.mouse_moved(x, y),
                    Command::MouseDown(button) => input.mouse_down(button),
                    Command::MouseUp(button) => input.mouse_up(button),
                    Command::KeyDown(key) => input.key_down(&key),
                    Command::KeyUp(key) => input.key_up(&key),
                }
            }
            _ = poll.tick() => {}
        }

        let status = engine.status();
        if status != last_status {
            last_status = status;
            host.send(Event::Status(status));
        }
    }

    engine.stop();
}

// ─── Host ─────────────────────────────────────────────────────────────────────

/// Forwards everything the engine produces to the UI thread.
///
/// Draw commands are batched until `present`. Any other event flushes the
/// batch first so the UI sees everything in engine order.
struct ChannelHost {
    events: flume::Sender<Event>,
    ctx: egui::Context,
    batch: RefCell<Vec<DrawCommand>>,
    reply: RefCell<Option<flume::Sender<Option<String>>>>,
}

impl ChannelHost {
    fn new(events: flume::Sender<Event>, ctx: egui::Context) -> Self {
        Self { events, ctx, batch: RefCell::new(Vec::new()), reply: RefCell::new(None) }
    }

    fn send(&self, event: Event) {
        self.flush();
        self.push(event);
    }

    fn flush(&self) {
        let batch = std::mem::take(&mut *self.batch.borrow_mut());
        if !batch.is_empty() {
            self.push(Event::Frame(batch));
        }
    }

    fn push(&self, event: Event) {
        if self.events.send(event).is_err() {
            log::debug!("ui is gone, dropping event");
            return;
        }
        self.ctx.request_repaint();
    }

    fn reply(&self, answer: Option<String>) {
        match self.reply.borrow_mut().take() {
            Some(tx) => {
                let _ = tx.send(answer);
            }
            None => log::warn!("input reply with no pending prompt"),
        }
    }

    fn dismiss_prompt(&self) {
        if let Some(tx) = self.reply.borrow_mut().take() {
            let _ = tx.send(None);
        }
    }
}

impl Host for ChannelHost {
    fn draw(&self, cmd: DrawCommand) {
        self.batch.borrow_mut().push(cmd);
    }

    fn message(&self, msg: Message) {
        self.send(Event::Message(msg));
    }

    fn resize(&self, width: f64, height: f64) {
        self.send(Event::Resize(width, height));
    }

    fn request_input(&self, prompt: &str) -> InputFuture {
        let (tx, rx) = flume::bounded(1);
        // a newer prompt replaces one that was never answered
        if let Some(old) = self.reply.borrow_mut().replace(tx) {
            let _ = old.send(None);
        }
        self.send(Event::Prompt(prompt.to_string()));
        Box::pin(async move { rx.recv_async().await.ok().flatten() })
    }

    fn present(&self) {
        self.flush();
    }
}
