//! Mouse, keyboard and button-widget queries over the current frame's
//! input snapshot.

use crate::error::RuntimeError;
use crate::runtime::input::{MouseButton, hit_test};
use crate::types::draw::{Color, ShapeDesc, Style, TextBaseline};
use crate::Value;
use super::{Export, NamespaceInfo, NamespaceProvider, RuntimeState, arg, check_argc, num_arg};

const BUTTON_FACE: Color = Color { r: 200.0, g: 200.0, b: 200.0, a: 1.0 };
const BUTTON_BORDER: Color = Color { r: 100.0, g: 100.0, b: 100.0, a: 1.0 };
const BUTTON_LABEL_SIZE: f64 = 14.0;

pub struct InputNamespace;

impl NamespaceInfo for InputNamespace {
    fn name(&self) -> &'static str { "input" }

    fn exports(&self) -> Vec<Export> {
        vec![
            Export::function("isKeyPressed"),
            Export::function("keyPressed"),
            Export::function("keyClicked"),
            Export::function("keyHeld"),
            Export::function("isLeftMouse"),
            Export::function("isRightMouse"),
            Export::function("mouseClicked"),
            Export::function("button"),
            Export::function("buttonClicked"),
            Export::function("clearButtons"),
            Export::variable("mouseX"),
            Export::variable("mouseY"),
            Export::variable("pmouseX"),
            Export::variable("pmouseY"),
            Export::variable("mousePressed"),
            Export::variable("mouseClicked"),
            Export::variable("mouseButton"),
            Export::variable("keyPressed"),
            Export::variable("key"),
            Export::variable("keyClicked"),
            Export::variable("clickedKey"),
            Export::variable("frameCount"),
            Export::constant("leftMouse"),
            Export::constant("middleMouse"),
            Export::constant("rightMouse"),
        ]
    }
}

impl NamespaceProvider for InputNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        let input = &state.input;

        let result = match name {
            "isKeyPressed" => {
                check_argc(name, args, 1, line)?;
                input.is_key_down(&arg(args, 0).to_string())
            }
            // all of the given keys held; no keys means any key
            "keyPressed" | "keyHeld" => {
                if args.is_empty() {
                    !input.keys_down.is_empty()
                } else {
                    args.iter().all(|k| input.is_key_down(&k.to_string()))
                }
            }
            // any of the given keys went down this frame
            "keyClicked" => match args {
                [] => !input.keys_clicked.is_empty(),
                [Value::List(keys)] => keys.borrow().iter().any(|k| input.was_key_clicked(&k.to_string())),
                _ => args.iter().any(|k| input.was_key_clicked(&k.to_string())),
            },
            "isLeftMouse" => {
                check_argc(name, args, 0, line)?;
                input.mouse_button.unwrap_or(MouseButton::Left) == MouseButton::Left
            }
            "isRightMouse" => {
                check_argc(name, args, 0, line)?;
                input.mouse_button == Some(MouseButton::Right)
            }
            "mouseClicked" => {
                if args.is_empty() {
                    input.any_mouse_clicked()
                } else {
                    let mut any = false;
                    for b in args {
                        if input.was_mouse_clicked(mouse_button_arg(b, line)?) {
                            any = true;
                        }
                    }
                    any
                }
            }
            "button" => {
                check_argc(name, args, 5, line)?;
                let n = |i: usize| num_arg(name, args, i, line);
                let (x, y, w, h) = (n(0)?, n(1)?, n(2)?, n(3)?);
                let id = arg(args, 4).to_string();
                button(state, x, y, w, h, &id)
            }
            "buttonClicked" => {
                check_argc(name, args, 1, line)?;
                state.buttons.clicked(&arg(args, 0).to_string())
            }
            "clearButtons" => {
                check_argc(name, args, 0, line)?;
                state.buttons.clear_clicks();
                return Ok(Some(Value::Null));
            }
            _ => return Ok(None),
        };

        Ok(Some(Value::Bool(result)))
    }

    fn get_constant(&self, name: &str) -> Option<Value> {
        let button = match name {
            "leftMouse"   => MouseButton::Left,
            "middleMouse" => MouseButton::Middle,
            "rightMouse"  => MouseButton::Right,
            _ => return None,
        };
        Some(Value::Number(button.code() as f64))
    }

    fn get_variable(&self, name: &str, state: &RuntimeState) -> Option<Value> {
        let input = &state.input;
        Some(match name {
            "mouseX"       => Value::Number(input.mouse_x),
            "mouseY"       => Value::Number(input.mouse_y),
            "pmouseX"      => Value::Number(input.pmouse_x),
            "pmouseY"      => Value::Number(input.pmouse_y),
            "mousePressed" => Value::Bool(input.mouse_pressed),
            "mouseClicked" => Value::Bool(input.any_mouse_clicked()),
            "mouseButton"  => Value::Number(input.mouse_button.map_or(0, MouseButton::code) as f64),
            "keyPressed"   => Value::Bool(!input.keys_down.is_empty()),
            "key"          => Value::str(input.key.clone().unwrap_or_default()),
            "keyClicked"   => Value::Bool(!input.keys_clicked.is_empty()),
            "clickedKey"   => input.clicked_key.clone().map_or(Value::Null, Value::Str),
            "frameCount"   => Value::Number(state.frame_count as f64),
            _ => return None,
        })
    }
}

/// `0`/`1`/`2`, `leftMouse`, or `"left"` / `"leftMouse"` style names.
fn mouse_button_arg(v: &Value, line: usize) -> Result<MouseButton, RuntimeError> {
    let button = match v {
        Value::Number(n) => MouseButton::from_code(*n),
        Value::Str(s) => MouseButton::from_name(s.strip_suffix("Mouse").unwrap_or(s)),
        _ => None,
    };
    button.ok_or_else(|| RuntimeError::new(line, format!("`mouseClicked` got an unknown mouse button: {v}")))
}

/// Draws a labelled button and records whether this frame's click hit it.
fn button(state: &mut RuntimeState, x: f64, y: f64, w: f64, h: f64, id: &str) -> bool {
    let hit = state.input.any_mouse_clicked()
        && hit_test(state.input.mouse_x, state.input.mouse_y, x, y, w, h);
    let clicked = state.buttons.record(id, hit);

    let face = match state.style.fill {
        Some(c) if c != Color::BLACK => c,
        _ => BUTTON_FACE,
    };
    state.draw_styled(
        ShapeDesc::Rect { x, y, w, h },
        Style { fill: Some(face), stroke: Some(BUTTON_BORDER), stroke_weight: 1.0 },
    );
    state.draw_styled(
        ShapeDesc::Text {
            text: id.to_string(),
            at: (x + 10.0, y + h / 2.0),
            size: BUTTON_LABEL_SIZE,
            baseline: TextBaseline::Middle,
        },
        Style { fill: Some(Color::BLACK), stroke: None, stroke_weight: 1.0 },
    );
    clicked
}
