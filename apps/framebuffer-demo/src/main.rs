//! End-to-end demo against an in-memory framebuffer.
//!
//! Builds a three-button screen, replays a recorded input trace through
//! the real reader thread (a tap on the middle button, then tabbing to
//! the last button and confirming it), and prints the final framebuffer
//! as ASCII art. Run with `RUST_LOG=debug` to watch the pipeline.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use trellis_geometry::{Rect, Region, Size};
use trellis_input::trace::TracePlayback;
use trellis_input::InputConfig;
use trellis_layout::{LayoutParams, MATCH_PARENT};
use trellis_render::{Canvas, Color, Drawable, StateColorDrawable, StateSet, Surface};
use trellis_runtime::StdClock;
use trellis_shell::{Shell, ShellConfig};
use trellis_view::{linear_column, EmptyWidget};

const WIDTH: i32 = 96;
const HEIGHT: i32 = 72;

const BACKDROP: u32 = 0xff10_1018;

/// The scripted session: `M device action x y time` and
/// `K device action keycode repeat time`. Times are milliseconds.
const SESSION: &str = "\
# tap the middle button
M 1 0 48 37 10
M 1 1 48 37 90
# tab three times: red, green, blue
K 1 0 61 0 200
K 1 1 61 0 260
K 1 0 61 0 300
K 1 1 61 0 360
K 1 0 61 0 400
K 1 1 61 0 460
# confirm the focused button
K 1 0 66 0 500
K 1 1 66 0 560
";

#[derive(Clone, Copy)]
struct DrawState {
    dx: f32,
    dy: f32,
    sx: f32,
    sy: f32,
    clip: Rect,
}

/// A software canvas over one ARGB pixel buffer. Translation, scale and
/// clipping are honored; rotation is not worth the trouble here.
struct Framebuffer {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
    state: DrawState,
    stack: Vec<DrawState>,
    warned_rotate: bool,
}

impl Framebuffer {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKDROP; (width * height) as usize],
            state: DrawState {
                dx: 0.0,
                dy: 0.0,
                sx: 1.0,
                sy: 1.0,
                clip: Rect::new(0, 0, width, height),
            },
            stack: Vec::new(),
            warned_rotate: false,
        }
    }

    fn device_rect(&self, rect: Rect) -> Rect {
        Rect::new(
            (rect.left as f32 * self.state.sx + self.state.dx).round() as i32,
            (rect.top as f32 * self.state.sy + self.state.dy).round() as i32,
            (rect.width as f32 * self.state.sx).round() as i32,
            (rect.height as f32 * self.state.sy).round() as i32,
        )
    }
}

impl Canvas for Framebuffer {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.dx += dx * self.state.sx;
        self.state.dy += dy * self.state.sy;
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.state.sx *= sx;
        self.state.sy *= sy;
    }

    fn rotate(&mut self, _degrees: f32) {
        if !self.warned_rotate {
            log::warn!("framebuffer canvas ignores rotation");
            self.warned_rotate = true;
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.state.clip = self.state.clip.intersection(&self.device_rect(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let rect = self
            .device_rect(rect)
            .intersection(&self.state.clip)
            .intersection(&Rect::new(0, 0, self.width, self.height));
        for y in rect.top..rect.top + rect.height {
            let row = (y * self.width) as usize;
            for x in rect.left..rect.left + rect.width {
                self.pixels[row + x as usize] = color.0;
            }
        }
    }
}

#[derive(Default)]
struct FrontBuffer {
    pixels: Vec<u32>,
    frames: u32,
}

/// Double buffer: draws land in the back [`Framebuffer`], flips copy the
/// damaged rows to the shared front buffer the way a real display
/// controller would take a partial update.
struct FramebufferSurface {
    back: Framebuffer,
    front: Rc<RefCell<FrontBuffer>>,
}

impl Surface for FramebufferSurface {
    fn size(&self) -> Size {
        Size::new(self.back.width, self.back.height)
    }

    fn canvas(&mut self) -> &mut dyn Canvas {
        &mut self.back
    }

    fn flip(&mut self, damage: &Region) {
        let mut front = self.front.borrow_mut();
        front.pixels.resize(self.back.pixels.len(), BACKDROP);
        for rect in damage.iter() {
            let rect = rect.intersection(&Rect::new(0, 0, self.back.width, self.back.height));
            for y in rect.top..rect.top + rect.height {
                let start = (y * self.back.width + rect.left) as usize;
                let end = start + rect.width as usize;
                front.pixels[start..end].copy_from_slice(&self.back.pixels[start..end]);
            }
        }
        front.frames += 1;
        info!(
            "flip {}: {} rects, bounds {:?}",
            front.frames,
            damage.len(),
            damage.bounds()
        );
    }
}

fn button_background(base: u32, pressed: u32, focused: u32) -> Box<dyn Drawable> {
    Box::new(StateColorDrawable::new(
        vec![
            (StateSet::PRESSED, Color(pressed)),
            (StateSet::FOCUSED, Color(focused)),
        ],
        Color(base),
    ))
}

fn glyph(argb: u32) -> char {
    let r = (argb >> 16) & 0xff;
    let g = (argb >> 8) & 0xff;
    let b = argb & 0xff;
    if r + g + b < 0xc0 {
        ' '
    } else if r >= g && r >= b {
        'r'
    } else if g >= r && g >= b {
        'g'
    } else {
        'b'
    }
}

fn dump(front: &FrontBuffer, width: i32, height: i32) {
    for y in (0..height).step_by(4) {
        let mut line = String::with_capacity((width / 2) as usize);
        for x in (0..width).step_by(2) {
            line.push(glyph(front.pixels[(y * width + x) as usize]));
        }
        println!("{line}");
    }
}

fn main() {
    env_logger::init();

    let front = Rc::new(RefCell::new(FrontBuffer::default()));
    let surface = FramebufferSurface {
        back: Framebuffer::new(WIDTH, HEIGHT),
        front: front.clone(),
    };
    let clock = Arc::new(StdClock::new());
    let mut shell = Shell::with_config(
        Box::new(surface),
        clock,
        ShellConfig {
            poll_interval: Duration::from_millis(2),
            input: InputConfig {
                poll_interval: Duration::from_millis(2),
                ..InputConfig::default()
            },
            ..ShellConfig::default()
        },
    );

    let clicks: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    shell.with_window(|window| {
        window.set_sound_player(|effect| info!("sound cue: {effect:?}"));
        let tree = window.tree_mut();
        let column = linear_column(tree);
        tree.set_padding(column, 4, 4, 4, 4);
        let palette = [
            ("red", 0xffc0_4040, 0xffff_9090, 0xffe0_6060),
            ("green", 0xff40_a060, 0xff90_ffb0, 0xff60_c080),
            ("blue", 0xff40_60c0, 0xff90_b0ff, 0xff60_80e0),
        ];
        for (label, base, pressed, focused) in palette {
            let button = tree.create_view(Box::new(EmptyWidget));
            tree.set_background(button, Some(button_background(base, pressed, focused)));
            tree.set_focusable(button, true);
            let log = clicks.clone();
            tree.add_click_listener(button, move |_, _| {
                info!("clicked the {label} button");
                log.borrow_mut().push(label);
            });
            tree.add_child_with_params(
                column,
                button,
                LayoutParams::new(MATCH_PARENT, 18).with_margins(2, 2, 2, 2),
            )
            .expect("fresh view already parented");
        }
        window.set_content(column).expect("column already parented");
    });

    shell
        .attach_input(Box::new(TracePlayback::from_text(SESSION)))
        .expect("spawning the input reader");

    let done = clicks.clone();
    if !shell.run_until(5_000, || done.borrow().len() >= 2) {
        eprintln!("session never finished; got {:?}", clicks.borrow());
        std::process::exit(1);
    }
    // Let the frames provoked by the last click settle.
    for _ in 0..50 {
        if shell.tick() == 0 {
            break;
        }
    }

    println!("clicked: {:?}", clicks.borrow());
    println!("frames:  {}", front.borrow().frames);
    dump(&front.borrow(), WIDTH, HEIGHT);
    shell.shutdown();
}
