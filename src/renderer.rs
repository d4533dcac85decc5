//! Macroquad backend: replays the desktop's command list and builds
//! [`InputFrame`]s from macroquad's input state.
//!
//! Only this module touches a graphics API; the core stays backend-free.

use macroquad::prelude::*;

use crate::assets::ImageHandle;
use crate::control::TextStyle;
use crate::input::{
    InputFrame, Key, KeyModifiers, MouseButton as UiMouseButton, MouseButtons,
};
use crate::math::{Point, Rect as UiRect, Size, Vector2 as UiVector2};
use crate::render_commands::RenderCommand;
use crate::transform::Transform;

/// Textures registered by handle id. The desktop only ever sees handles;
/// the backend owns the pixels.
#[derive(Default)]
pub struct TextureRegistry {
    textures: rustc_hash::FxHashMap<u64, Texture2D>,
    next_id: u64,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture and returns the handle layout uses for sizing.
    pub fn register(&mut self, texture: Texture2D) -> ImageHandle {
        let id = self.next_id;
        self.next_id += 1;
        let size = Size::new(texture.width() as i32, texture.height() as i32);
        self.textures.insert(id, texture);
        ImageHandle { id, size }
    }

    pub fn get(&self, handle: ImageHandle) -> Option<&Texture2D> {
        self.textures.get(&handle.id)
    }

    pub fn unregister(&mut self, handle: ImageHandle) {
        self.textures.remove(&handle.id);
    }
}

fn to_macroquad_color(color: &crate::color::Color, opacity: f32) -> Color {
    Color {
        r: color.r / 255.0,
        g: color.g / 255.0,
        b: color.b / 255.0,
        a: color.a / 255.0 * opacity,
    }
}

struct ReplayState {
    clip_stack: Vec<UiRect>,
    opacity_stack: Vec<f32>,
    transform_stack: Vec<Transform>,
}

impl ReplayState {
    fn new() -> Self {
        Self {
            clip_stack: Vec::new(),
            opacity_stack: Vec::new(),
            transform_stack: Vec::new(),
        }
    }

    fn opacity(&self) -> f32 {
        self.opacity_stack.iter().product()
    }

    fn transform(&self) -> Transform {
        let mut composed = Transform::IDENTITY;
        for t in &self.transform_stack {
            composed = composed.then(t);
        }
        composed
    }

    fn apply_clip(&self) {
        let clip = self
            .clip_stack
            .iter()
            .copied()
            .reduce(|a, b| a.intersect(b));
        unsafe {
            get_internal_gl()
                .quad_gl
                .scissor(clip.map(|c| (c.x, c.y, c.width, c.height)));
        }
    }
}

fn transformed_corners(rect: UiRect, transform: &Transform) -> [Vec2; 4] {
    let map = |x: i32, y: i32| {
        let p = transform.apply(UiVector2::new(x as f32, y as f32));
        Vec2::new(p.x, p.y)
    };
    [
        map(rect.x, rect.y),
        map(rect.right(), rect.y),
        map(rect.right(), rect.bottom()),
        map(rect.x, rect.bottom()),
    ]
}

fn fill_rect(rect: UiRect, transform: &Transform, color: Color) {
    if *transform == Transform::IDENTITY {
        draw_rectangle(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
            color,
        );
        return;
    }
    let [a, b, c, d] = transformed_corners(rect, transform);
    draw_triangle(a, b, c, color);
    draw_triangle(a, c, d, color);
}

/// Replays one frame of commands. Fonts are indexed by `FontHandle`;
/// textures resolved through the registry.
pub fn render(
    commands: &[RenderCommand],
    fonts: &[Font],
    textures: &TextureRegistry,
) {
    let mut state = ReplayState::new();
    for command in commands {
        match command {
            RenderCommand::PushScissor(rect) => {
                state.clip_stack.push(*rect);
                state.apply_clip();
            }
            RenderCommand::PopScissor => {
                state.clip_stack.pop();
                state.apply_clip();
            }
            RenderCommand::PushOpacity(opacity) => {
                state.opacity_stack.push(*opacity);
            }
            RenderCommand::PopOpacity => {
                state.opacity_stack.pop();
            }
            RenderCommand::PushTransform(transform) => {
                state.transform_stack.push(*transform);
            }
            RenderCommand::PopTransform => {
                state.transform_stack.pop();
            }
            RenderCommand::Rectangle { bounds, color } => {
                fill_rect(
                    *bounds,
                    &state.transform(),
                    to_macroquad_color(color, state.opacity()),
                );
            }
            RenderCommand::Border {
                bounds,
                color,
                thickness,
            } => {
                let transform = state.transform();
                let color = to_macroquad_color(color, state.opacity());
                let edges = [
                    UiRect::new(bounds.x, bounds.y, bounds.width, thickness.top),
                    UiRect::new(
                        bounds.x,
                        bounds.bottom() - thickness.bottom,
                        bounds.width,
                        thickness.bottom,
                    ),
                    UiRect::new(
                        bounds.x,
                        bounds.y + thickness.top,
                        thickness.left,
                        bounds.height - thickness.top - thickness.bottom,
                    ),
                    UiRect::new(
                        bounds.right() - thickness.right,
                        bounds.y + thickness.top,
                        thickness.right,
                        bounds.height - thickness.top - thickness.bottom,
                    ),
                ];
                for edge in edges {
                    if !edge.is_empty() {
                        fill_rect(edge, &transform, color);
                    }
                }
            }
            RenderCommand::Image {
                bounds,
                handle,
                tint,
            } => {
                let Some(texture) = textures.get(*handle) else {
                    continue;
                };
                let origin = state
                    .transform()
                    .apply(UiVector2::new(bounds.x as f32, bounds.y as f32));
                draw_texture_ex(
                    texture,
                    origin.x,
                    origin.y,
                    to_macroquad_color(tint, state.opacity()),
                    DrawTextureParams {
                        dest_size: Some(Vec2::new(bounds.width as f32, bounds.height as f32)),
                        ..Default::default()
                    },
                );
            }
            RenderCommand::Text {
                position,
                text,
                font,
                size,
                color,
            } => {
                let Some(font) = fonts.get(font.0 as usize) else {
                    continue;
                };
                let origin = state
                    .transform()
                    .apply(UiVector2::new(position.x as f32, position.y as f32));
                draw_text_ex(
                    text,
                    origin.x,
                    origin.y + *size as f32,
                    TextParams {
                        font_size: *size,
                        font: Some(font),
                        color: to_macroquad_color(color, state.opacity()),
                        ..Default::default()
                    },
                );
            }
        }
    }
    unsafe {
        get_internal_gl().quad_gl.scissor(None);
    }
}

/// Measure callback over macroquad's font metrics, for
/// [`crate::desktop::Desktop::set_measure_text_function`].
pub fn create_measure_text_function(
    fonts: Vec<Font>,
) -> impl Fn(&str, &TextStyle) -> Size + 'static {
    move |text: &str, style: &TextStyle| {
        let Some(font) = style.font.and_then(|f| fonts.get(f.0 as usize)) else {
            return Size::ZERO;
        };
        let measured = macroquad::text::measure_text(text, Some(font), style.size, 1.0);
        Size::new(measured.width.ceil() as i32, style.size as i32)
    }
}

fn map_key(key: KeyCode) -> Option<Key> {
    Some(match key {
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    })
}

const TRACKED_KEYS: [KeyCode; 15] = [
    KeyCode::Tab,
    KeyCode::Enter,
    KeyCode::Escape,
    KeyCode::Space,
    KeyCode::Backspace,
    KeyCode::Delete,
    KeyCode::Insert,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::PageUp,
    KeyCode::PageDown,
];

/// Snapshots macroquad's input into a frame for
/// [`crate::desktop::Desktop::update_input`].
pub fn gather_input() -> InputFrame {
    let (mouse_x, mouse_y) = mouse_position();
    let (wheel_x, wheel_y) = mouse_wheel();

    let mut buttons = MouseButtons::NONE;
    if is_mouse_button_down(MouseButton::Left) {
        buttons |= MouseButtons::LEFT;
    }
    if is_mouse_button_down(MouseButton::Right) {
        buttons |= MouseButtons::RIGHT;
    }
    if is_mouse_button_down(MouseButton::Middle) {
        buttons |= MouseButtons::MIDDLE;
    }

    let mut modifiers = KeyModifiers::NONE;
    if is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift) {
        modifiers |= KeyModifiers::SHIFT;
    }
    if is_key_down(KeyCode::LeftControl) || is_key_down(KeyCode::RightControl) {
        modifiers |= KeyModifiers::CTRL;
    }
    if is_key_down(KeyCode::LeftAlt) || is_key_down(KeyCode::RightAlt) {
        modifiers |= KeyModifiers::ALT;
    }

    let mut keys_down: Vec<Key> = TRACKED_KEYS
        .iter()
        .filter(|&&code| is_key_down(code))
        .filter_map(|&code| map_key(code))
        .collect();
    while let Some(character) = get_char_pressed() {
        if !character.is_control() {
            keys_down.push(Key::Character(character));
        }
    }

    InputFrame {
        mouse_position: Point::new(mouse_x as i32, mouse_y as i32),
        buttons,
        wheel_delta: UiVector2::new(wheel_x, wheel_y),
        keys_down,
        modifiers,
        text_events: Vec::new(),
        viewport: UiRect::new(0, 0, screen_width() as i32, screen_height() as i32),
    }
}

/// The reference mapping from macroquad's mouse buttons.
pub fn map_mouse_button(button: MouseButton) -> Option<UiMouseButton> {
    Some(match button {
        MouseButton::Left => UiMouseButton::Left,
        MouseButton::Right => UiMouseButton::Right,
        MouseButton::Middle => UiMouseButton::Middle,
        MouseButton::Unknown => return None,
    })
}
