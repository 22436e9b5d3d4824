//! Animated shader background.
//!
//! The GPU program itself is opaque: anything implementing
//! [`ShaderProgram`]. This module owns its lifecycle: start it sized to
//! the viewport, draw once per frame, forward pointer position and
//! resizes, and stop it on teardown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{on_pointer_move, on_resize, CleanupList, FrameLoop, Node, NodeRole, NodeStyle};
use crate::error::LoadError;
use crate::pipeline::loader::{Enhancement, EnhancementContext};
use crate::types::Cleanup;

pub const CANVAS_ID: &str = "shader-canvas";

/// A GPU program driven by the background.
pub trait ShaderProgram {
    /// Compile and allocate. An error makes the background unavailable.
    fn start(&mut self, width: f64, height: f64) -> Result<(), LoadError>;
    /// Render one frame. `pointer` is normalised to `[0, 1]` with y up.
    fn draw(&mut self, time_s: f64, pointer: (f64, f64));
    fn resize(&mut self, width: f64, height: f64);
    /// Release GPU resources.
    fn stop(&mut self);
}

/// Produces the program once the background chunk has loaded.
pub type ShaderFactory = Box<dyn FnOnce() -> Result<Box<dyn ShaderProgram>, LoadError>>;

pub struct ShaderBackground {
    program: RefCell<Option<Box<dyn ShaderProgram>>>,
}

impl ShaderBackground {
    pub fn new(program: Box<dyn ShaderProgram>) -> Self {
        Self {
            program: RefCell::new(Some(program)),
        }
    }
}

impl Enhancement for ShaderBackground {
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
        let Some(mut program) = self.program.borrow_mut().take() else {
            return Err(LoadError::mount("shader", "program already in use"));
        };
        let document = ctx.document.clone();
        let (width, height) = document.viewport();
        program.start(width, height)?;

        document.insert(
            Node::new(CANVAS_ID, NodeRole::Overlay)
                .with_area(width * height)
                .with_style(NodeStyle::overlay(0)),
        );

        let program = Rc::new(RefCell::new(program));
        let pointer = Rc::new(Cell::new((0.5, 0.5)));
        let cleanups = CleanupList::new();

        let draw_loop = {
            let program = program.clone();
            let pointer = pointer.clone();
            FrameLoop::new(move |ts| {
                program.borrow_mut().draw(ts / 1000.0, pointer.get());
                true
            })
        };
        draw_loop.start();
        cleanups.add(move || draw_loop.stop());

        {
            let document = document.clone();
            let pointer = pointer.clone();
            cleanups.add(on_pointer_move(move |event| {
                let (w, h) = document.viewport();
                if w > 0.0 && h > 0.0 {
                    pointer.set((event.x / w, 1.0 - event.y / h));
                }
            }));
        }
        {
            let document = document.clone();
            let program = program.clone();
            cleanups.add(on_resize(move || {
                let (w, h) = document.viewport();
                program.borrow_mut().resize(w, h);
            }));
        }

        Ok(Box::new(move || {
            cleanups.run();
            program.borrow_mut().stop();
            document.remove(CANVAS_ID);
        }))
    }
}
