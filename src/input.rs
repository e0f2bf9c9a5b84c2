use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels scrolled per wheel line or arrow key
pub const LINE_HEIGHT_PX: f32 = 40.0;

/// What a window event asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerInput {
    /// Page scroll in pixels; positive moves down the page
    Scroll(f32),
    /// Page scroll in viewport heights
    ScrollPages(f32),
    ScrollToStart,
    ScrollToEnd,
    /// Camera drag in pixels
    Orbit { dx: f32, dy: f32 },
    /// Camera zoom in wheel steps; positive moves closer
    Zoom(f32),
    /// Flip the scroll playback gate
    TogglePlayback,
}

/// Adapter that turns winit events into viewer input
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    dragging: bool,
    cursor: Option<(f32, f32)>,
    /// Ctrl held: the wheel zooms instead of scrolling
    zoom_modifier: bool,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn process_event(&mut self, event: &WindowEvent) -> Option<ViewerInput> {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.zoom_modifier = modifiers.state().control_key();
                None
            }
            WindowEvent::MouseWheel { delta, .. } => Some(self.wheel(*delta)),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.dragging = false;
                None
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(code) => key_input(code),
                    PhysicalKey::Unidentified(_) => None,
                }
            }
            _ => None,
        }
    }

    fn wheel(&self, delta: MouseScrollDelta) -> ViewerInput {
        let pixels = wheel_pixels(delta);
        if self.zoom_modifier {
            ViewerInput::Zoom(-pixels / LINE_HEIGHT_PX)
        } else {
            ViewerInput::Scroll(pixels)
        }
    }

    fn cursor_moved(&mut self, x: f32, y: f32) -> Option<ViewerInput> {
        let previous = self.cursor.replace((x, y));
        match previous {
            Some((px, py)) if self.dragging => Some(ViewerInput::Orbit { dx: x - px, dy: y - py }),
            _ => None,
        }
    }
}

/// Wheel delta as page pixels; wheel-up scrolls towards the top
pub fn wheel_pixels(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => -lines * LINE_HEIGHT_PX,
        MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
    }
}

pub fn key_input(code: KeyCode) -> Option<ViewerInput> {
    match code {
        KeyCode::ArrowDown => Some(ViewerInput::Scroll(LINE_HEIGHT_PX)),
        KeyCode::ArrowUp => Some(ViewerInput::Scroll(-LINE_HEIGHT_PX)),
        KeyCode::PageDown | KeyCode::Space => Some(ViewerInput::ScrollPages(1.0)),
        KeyCode::PageUp => Some(ViewerInput::ScrollPages(-1.0)),
        KeyCode::Home => Some(ViewerInput::ScrollToStart),
        KeyCode::End => Some(ViewerInput::ScrollToEnd),
        KeyCode::KeyP => Some(ViewerInput::TogglePlayback),
        _ => None,
    }
}
