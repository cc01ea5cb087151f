//! The narrow contract between the engine and whatever displays a sketch.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;

use crate::types::draw::DrawCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
    Success,
}

/// A console line. `line` is the 1-based sketch line an error points at.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub line: Option<usize>,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Info, text: text.into(), line: None }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Warning, text: text.into(), line: None }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Success, text: text.into(), line: None }
    }

    pub fn error(text: impl Into<String>, line: Option<usize>) -> Self {
        Self { kind: MessageKind::Error, text: text.into(), line }
    }
}

/// Resolves to the user's reply, or `None` when the prompt was dismissed.
pub type InputFuture = Pin<Box<dyn Future<Output = Option<String>>>>;

/// Drawing surface, message sink, resize notification and input provider.
pub trait Host {
    fn draw(&self, cmd: DrawCommand);
    fn message(&self, msg: Message);
    fn resize(&self, width: f64, height: f64);
    fn request_input(&self, prompt: &str) -> InputFuture;

    /// Called after every completed frame (and after setup) so a host can
    /// present what was drawn as one unit.
    fn present(&self) {}
}

// ─── Recording host ───────────────────────────────────────────────────────────

/// In-memory host for tests and headless runs. Replies to `input()` are
/// taken from a queue; an empty queue behaves like a dismissed prompt.
#[derive(Debug, Default)]
pub struct RecordingHost {
    commands: RefCell<Vec<DrawCommand>>,
    messages: RefCell<Vec<Message>>,
    resizes: RefCell<Vec<(f64, f64)>>,
    prompts: RefCell<Vec<String>>,
    replies: RefCell<VecDeque<Option<String>>>,
    frames: RefCell<usize>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let host = Self::default();
        host.replies.borrow_mut().extend(replies.into_iter().map(|r| r.map(Into::into)));
        host
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    /// Message texts of one kind, in arrival order.
    pub fn texts(&self, kind: MessageKind) -> Vec<String> {
        self.messages.borrow().iter().filter(|m| m.kind == kind).map(|m| m.text.clone()).collect()
    }

    pub fn resizes(&self) -> Vec<(f64, f64)> {
        self.resizes.borrow().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn presented_frames(&self) -> usize {
        *self.frames.borrow()
    }

    pub fn clear(&self) {
        self.commands.borrow_mut().clear();
        self.messages.borrow_mut().clear();
        self.resizes.borrow_mut().clear();
    }
}

impl Host for RecordingHost {
    fn draw(&self, cmd: DrawCommand) {
        self.commands.borrow_mut().push(cmd);
    }

    fn message(&self, msg: Message) {
        self.messages.borrow_mut().push(msg);
    }

    fn resize(&self, width: f64, height: f64) {
        self.resizes.borrow_mut().push((width, height));
    }

    fn request_input(&self, prompt: &str) -> InputFuture {
        self.prompts.borrow_mut().push(prompt.to_string());
        let reply = self.replies.borrow_mut().pop_front().flatten();
        Box::pin(std::future::ready(reply))
    }

    fn present(&self) {
        *self.frames.borrow_mut() += 1;
    }
}
