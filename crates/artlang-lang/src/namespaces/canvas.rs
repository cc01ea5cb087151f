//! Canvas and drawing built-ins: sizing, paint state, shapes, text and the
//! transform stack.

use crate::error::RuntimeError;
use crate::types::draw::{ShapeDesc, TextBaseline};
use crate::types::mat::{m3_mul, m3_rotate2d, m3_scale2d, m3_translate2d};
use crate::Value;
use super::{
    Export, NamespaceInfo, NamespaceProvider, RuntimeState, SavedContext,
    arg, check_arg_range, check_argc, color_args, num_arg, opt_num_arg,
};

pub struct CanvasNamespace;

impl NamespaceInfo for CanvasNamespace {
    fn name(&self) -> &'static str { "canvas" }

    fn exports(&self) -> Vec<Export> {
        vec![
            Export::function("size"),
            Export::function("background"),
            Export::function("fill"),
            Export::function("noFill"),
            Export::function("stroke"),
            Export::function("noStroke"),
            Export::function("strokeWeight"),
            Export::function("textSize"),
            Export::function("rect"),
            Export::function("ellipse"),
            Export::function("circle"),
            Export::function("line"),
            Export::function("point"),
            Export::function("triangle"),
            Export::function("quad"),
            Export::function("arc"),
            Export::function("text"),
            Export::function("push"),
            Export::function("pop"),
            Export::function("translate"),
            Export::function("rotate"),
            Export::function("scale"),
            Export::variable("width"),
            Export::variable("height"),
        ]
    }
}

impl NamespaceProvider for CanvasNamespace {
    fn call(
        &self,
        name: &str,
        args: &[Value],
        state: &mut RuntimeState,
        line: usize,
    ) -> Result<Option<Value>, RuntimeError> {
        let n = |i: usize| num_arg(name, args, i, line);

        match name {
            // ── surface ──────────────────────────────────────────────────────
            "size" => {
                check_argc(name, args, 2, line)?;
                let (w, h) = (n(0)?, n(1)?);
                if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
                    return Err(RuntimeError::new(line, format!(
                        "`size` needs a positive width and height, got {w} x {h}"
                    )));
                }
                state.resize(w.round(), h.round());
                state.clear(crate::types::draw::Color::WHITE);
            }
            "background" => {
                let color = color_args(name, args, line)?;
                state.clear(color);
            }

            // ── paint state ──────────────────────────────────────────────────
            "fill" => state.style.fill = Some(color_args(name, args, line)?),
            "noFill" => {
                check_argc(name, args, 0, line)?;
                state.style.fill = None;
            }
            "stroke" => state.style.stroke = Some(color_args(name, args, line)?),
            "noStroke" => {
                check_argc(name, args, 0, line)?;
                state.style.stroke = None;
            }
            "strokeWeight" => {
                check_argc(name, args, 1, line)?;
                state.style.stroke_weight = n(0)?.max(0.0);
            }
            "textSize" => {
                check_argc(name, args, 1, line)?;
                state.text_size = n(0)?.max(0.0);
            }

            // ── shapes ───────────────────────────────────────────────────────
            "rect" => {
                check_argc(name, args, 4, line)?;
                state.draw(ShapeDesc::Rect { x: n(0)?, y: n(1)?, w: n(2)?, h: n(3)? });
            }
            "ellipse" => {
                check_arg_range(name, args, 3, 4, line)?;
                let w = n(2)?;
                let h = opt_num_arg(name, args, 3, line)?.unwrap_or(w);
                state.draw(ShapeDesc::Ellipse { center: (n(0)?, n(1)?), size: (w, h) });
            }
            "circle" => {
                check_argc(name, args, 3, line)?;
                let d = n(2)? * 2.0;
                state.draw(ShapeDesc::Ellipse { center: (n(0)?, n(1)?), size: (d, d) });
            }
            "line" => {
                check_argc(name, args, 4, line)?;
                state.draw(ShapeDesc::Line { from: (n(0)?, n(1)?), to: (n(2)?, n(3)?) });
            }
            "point" => {
                check_argc(name, args, 2, line)?;
                state.draw(ShapeDesc::Point((n(0)?, n(1)?)));
            }
            "triangle" => {
                check_argc(name, args, 6, line)?;
                state.draw(ShapeDesc::Triangle([(n(0)?, n(1)?), (n(2)?, n(3)?), (n(4)?, n(5)?)]));
            }
            "quad" => {
                check_argc(name, args, 8, line)?;
                state.draw(ShapeDesc::Quad([
                    (n(0)?, n(1)?), (n(2)?, n(3)?), (n(4)?, n(5)?), (n(6)?, n(7)?),
                ]));
            }
            "arc" => {
                check_argc(name, args, 6, line)?;
                state.draw(ShapeDesc::Arc {
                    center: (n(0)?, n(1)?),
                    size: (n(2)?, n(3)?),
                    start: n(4)?,
                    stop: n(5)?,
                });
            }
            "text" => {
                check_arg_range(name, args, 3, 4, line)?;
                let size = opt_num_arg(name, args, 3, line)?.unwrap_or(state.text_size);
                state.draw(ShapeDesc::Text {
                    text: arg(args, 0).to_string(),
                    at: (n(1)?, n(2)?),
                    size,
                    baseline: TextBaseline::Alphabetic,
                });
            }

            // ── transform stack ──────────────────────────────────────────────
            "push" => {
                check_argc(name, args, 0, line)?;
                state.saved.push(SavedContext {
                    style: state.style.clone(),
                    transform: state.transform,
                    text_size: state.text_size,
                });
            }
            "pop" => {
                check_argc(name, args, 0, line)?;
                // popping an empty stack is a no-op, like a canvas restore
                if let Some(saved) = state.saved.pop() {
                    state.style = saved.style;
                    state.transform = saved.transform;
                    state.text_size = saved.text_size;
                }
            }
            "translate" => {
                check_argc(name, args, 2, line)?;
                state.transform = m3_mul(&state.transform, &m3_translate2d(n(0)?, n(1)?));
            }
            "rotate" => {
                check_argc(name, args, 1, line)?;
                state.transform = m3_mul(&state.transform, &m3_rotate2d(n(0)?));
            }
            "scale" => {
                check_arg_range(name, args, 1, 2, line)?;
                let sx = n(0)?;
                let sy = opt_num_arg(name, args, 1, line)?.unwrap_or(sx);
                state.transform = m3_mul(&state.transform, &m3_scale2d(sx, sy));
            }

            _ => return Ok(None),
        }

        Ok(Some(Value::Null))
    }

    fn get_variable(&self, name: &str, state: &RuntimeState) -> Option<Value> {
        match name {
            "width"  => Some(Value::Number(state.width)),
            "height" => Some(Value::Number(state.height)),
            _ => None,
        }
    }
}
