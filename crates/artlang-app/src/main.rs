mod worker;

use std::path::PathBuf;

use artlang_lang::{Color, EngineConfig, EngineStatus, Message, MessageKind, MouseButton, TextBaseline, format_source};
use artlang_renderer::{Primitive, Scene};
use eframe::egui::{self, Color32, RichText};

use crate::worker::{Command, Event};

const DEFAULT_SKETCH: &str = "// move the mouse, click to change color
hue = 0

function setup() {
  size(400, 300)
}

function draw() {
  background(30)
  if mouseClicked() {
    hue = random(255)
  }
  noStroke()
  fill(hue, 120, 200)
  circle(mouseX, mouseY, 20)
  fill(255)
  text(\"frame \" + frameCount, 10, 20)
}
";

fn main() -> eframe::Result {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let (source, load_error) = match &path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(src) => (src, None),
            Err(e) => (String::new(), Some(format!("could not open {}: {e}", p.display()))),
        },
        None => (DEFAULT_SKETCH.to_string(), None),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "ArtLang",
        options,
        Box::new(move |cc| {
            let mut app = App::new(&cc.egui_ctx, source, path)?;
            if let Some(msg) = load_error {
                app.console.push(Message::error(msg, None));
            }
            Ok(Box::new(app))
        }),
    )
}

// ─── App state ────────────────────────────────────────────────────────────────

struct App {
    source: String,
    path: Option<PathBuf>,
    commands: flume::Sender<Command>,
    events: flume::Receiver<Event>,
    scene: Scene,
    console: Vec<Message>,
    status: EngineStatus,
    prompt: Option<Prompt>,
    last_mouse: Option<(f64, f64)>,
}

struct Prompt {
    text: String,
    answer: String,
}

impl App {
    fn new(ctx: &egui::Context, source: String, path: Option<PathBuf>) -> std::io::Result<Self> {
        let config = EngineConfig::default();
        let scene = Scene::new(config.canvas_width, config.canvas_height);
        let (commands, events) = worker::spawn(ctx.clone(), config)?;
        Ok(Self {
            source,
            path,
            commands,
            events,
            scene,
            console: Vec::new(),
            status: EngineStatus::Idle,
            prompt: None,
            last_mouse: None,
        })
    }

    fn send(&self, cmd: Command) {
        if self.commands.send(cmd).is_err() {
            log::warn!("engine thread is gone");
        }
    }

    fn run(&mut self) {
        self.console.clear();
        self.prompt = None;
        self.send(Command::Run(self.source.clone()));
    }

    fn stop(&mut self) {
        self.prompt = None;
        self.send(Command::Stop);
    }

    fn save(&mut self) {
        let Some(path) = &self.path else { return };
        match std::fs::write(path, &self.source) {
            Ok(()) => self.console.push(Message::info(format!("Saved {}", path.display()))),
            Err(e) => self.console.push(Message::error(format!("could not save {}: {e}", path.display()), None)),
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                Event::Frame(cmds) => self.scene.extend(&cmds),
                Event::Message(msg) => self.console.push(msg),
                Event::Resize(w, h) => self.scene.resize(w, h),
                Event::Prompt(text) => self.prompt = Some(Prompt { text, answer: String::new() }),
                Event::Status(status) => self.status = status,
            }
        }
    }
}

// ─── UI ───────────────────────────────────────────────────────────────────────

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        let run_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Enter);
        let save_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
        if ctx.input_mut(|i| i.consume_shortcut(&run_shortcut)) {
            self.run();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&save_shortcut)) {
            self.save();
        }

        // ── Toolbar ───────────────────────────────────────────────────────────
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("▶ run").clicked() {
                    self.run();
                }
                if ui.add_enabled(self.status != EngineStatus::Idle, egui::Button::new("■ stop")).clicked() {
                    self.stop();
                }
                if ui.button("format").clicked() {
                    self.source = format_source(&self.source);
                }
                if self.path.is_some() && ui.button("save").clicked() {
                    self.save();
                }
                ui.separator();
                let (label, color) = match self.status {
                    EngineStatus::Idle      => ("idle", Color32::GRAY),
                    EngineStatus::Executing => ("running setup", Color32::from_rgb(220, 180, 60)),
                    EngineStatus::Looping   => ("looping", Color32::from_rgb(80, 200, 80)),
                };
                ui.label(RichText::new(label).color(color));
                if let Some(path) = &self.path {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(RichText::new(path.display().to_string()).monospace().color(Color32::GRAY));
                    });
                }
            });
        });

        // ── Console ───────────────────────────────────────────────────────────
        egui::TopBottomPanel::bottom("console")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Console").strong());
                    if ui.small_button("clear").clicked() {
                        self.console.clear();
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| show_console(ui, &self.console));
            });

        // ── Left: editor ──────────────────────────────────────────────────────
        egui::SidePanel::left("editor")
            .resizable(true)
            .default_width(560.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut self.source)
                            .font(egui::TextStyle::Monospace)
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(40),
                    );
                });
            });

        // ── Right: canvas ─────────────────────────────────────────────────────
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| self.show_canvas(ui));
        });

        self.show_prompt(ctx);
    }
}

impl App {
    fn show_canvas(&mut self, ui: &mut egui::Ui) {
        let desired = egui::vec2(self.scene.width as f32, self.scene.height as f32);
        let (rect, _response) = ui.allocate_exact_size(desired, egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, 0.0, color32(self.scene.background));
        let offset = rect.min.to_vec2();
        for prim in &self.scene.primitives {
            paint(&painter, prim, offset);
        }

        self.forward_input(ui.ctx(), rect);
    }

    /// Pointer events over the canvas and key events while no text field
    /// has focus go to the engine.
    fn forward_input(&mut self, ctx: &egui::Context, rect: egui::Rect) {
        let (events, pointer) = ctx.input(|i| (i.events.clone(), i.pointer.latest_pos()));
        let held = ctx.input(|i| i.pointer.any_down());

        if let Some(pos) = pointer.filter(|p| held || rect.contains(*p)) {
            let local = ((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
            if self.last_mouse != Some(local) {
                self.last_mouse = Some(local);
                self.send(Command::MouseMoved(local.0, local.1));
            }
        }

        let typing = ctx.wants_keyboard_input() || self.prompt.is_some();
        for event in events {
            match event {
                egui::Event::PointerButton { pos, button, pressed, .. } => {
                    let Some(button) = mouse_button(button) else { continue };
                    if !pressed {
                        self.send(Command::MouseUp(button));
                    } else if rect.contains(pos) {
                        self.send(Command::MouseDown(button));
                    }
                }
                egui::Event::Key { key, pressed, repeat, .. } if !typing => {
                    let name = key_name(key);
                    if !pressed {
                        self.send(Command::KeyUp(name));
                    } else if !repeat {
                        self.send(Command::KeyDown(name));
                    }
                }
                _ => {}
            }
        }
    }

    fn show_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = &mut self.prompt else { return };
        let mut reply: Option<Option<String>> = None;

        egui::Window::new("Input")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&prompt.text);
                let edit = ui.text_edit_singleline(&mut prompt.answer);
                edit.request_focus();
                let entered = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || entered {
                        reply = Some(Some(prompt.answer.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        reply = Some(None);
                    }
                });
            });

        if let Some(answer) = reply {
            self.prompt = None;
            self.send(Command::Reply(answer));
        }
    }
}

// ─── Painting ─────────────────────────────────────────────────────────────────

fn paint(painter: &egui::Painter, prim: &Primitive, offset: egui::Vec2) {
    let to_screen = |pts: &[(f64, f64)]| -> Vec<egui::Pos2> {
        pts.iter().map(|(x, y)| egui::pos2(*x as f32, *y as f32) + offset).collect()
    };

    match prim {
        Primitive::Polygon { points, fill, stroke } => {
            let pts = to_screen(points);
            if let Some(fill) = fill {
                painter.add(egui::Shape::convex_polygon(pts.clone(), color32(*fill), egui::Stroke::NONE));
            }
            if let Some(s) = stroke {
                painter.add(egui::Shape::closed_line(pts, egui::Stroke::new(s.width as f32, color32(s.color))));
            }
        }
        Primitive::Polyline { points, stroke } => {
            let stroke = egui::Stroke::new(stroke.width as f32, color32(stroke.color));
            painter.add(egui::Shape::line(to_screen(points), stroke));
        }
        Primitive::Text { text, pos, size, angle, baseline, color } => {
            let color = color32(*color);
            let galley = painter.layout_no_wrap(text.clone(), egui::FontId::proportional(*size as f32), color);
            // galleys are placed by their top-left corner
            let rise = match baseline {
                TextBaseline::Alphabetic => *size as f32 * 0.8,
                TextBaseline::Middle     => galley.size().y / 2.0,
            };
            let (sin, cos) = (*angle as f32).sin_cos();
            let top_left = egui::pos2(pos.0 as f32, pos.1 as f32) + offset + egui::vec2(rise * sin, -rise * cos);
            painter.add(egui::epaint::TextShape::new(top_left, galley, color).with_angle(*angle as f32));
        }
    }
}

fn color32(c: Color) -> Color32 {
    let [r, g, b, a] = c.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn mouse_button(button: egui::PointerButton) -> Option<MouseButton> {
    match button {
        egui::PointerButton::Primary   => Some(MouseButton::Left),
        egui::PointerButton::Middle    => Some(MouseButton::Middle),
        egui::PointerButton::Secondary => Some(MouseButton::Right),
        _ => None,
    }
}

/// Letters come through lower-case, space as " ", everything else by name
/// ("Enter", "ArrowUp", ...).
fn key_name(key: egui::Key) -> String {
    match key {
        egui::Key::Space => " ".to_string(),
        _ => {
            let name = key.name();
            if name.chars().count() == 1 { name.to_lowercase() } else { name.to_string() }
        }
    }
}

// ─── Console ──────────────────────────────────────────────────────────────────

fn show_console(ui: &mut egui::Ui, messages: &[Message]) {
    if messages.is_empty() {
        ui.label(RichText::new("No output.").color(Color32::GRAY));
        return;
    }
    for msg in messages {
        let color = match msg.kind {
            MessageKind::Info    => Color32::from_rgb(200, 200, 200),
            MessageKind::Warning => Color32::from_rgb(220, 180, 60),
            MessageKind::Error   => Color32::from_rgb(220, 80, 80),
            MessageKind::Success => Color32::from_rgb(80, 200, 80),
        };
        let text = match msg.line {
            Some(line) => format!("[line {line}] {}", msg.text),
            None => msg.text.clone(),
        };
        ui.label(RichText::new(text).monospace().color(color));
    }
}
