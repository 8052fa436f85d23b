//! Ties a view tree to a surface and drives it frame by frame.
//!
//! A [`Window`] owns the tree, the surface it paints onto and a
//! [`Handler`] for posted work. [`Window::do_frame`] runs one unit of
//! the pipeline: due callbacks, then layout over the accumulated
//! requesters, then a draw pass clipped to the damage region, then a
//! flip. [`WindowEventSource`] adapts a shared window to the looper so
//! frames only run while there is actually work to do.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::{trace, warn};
use trellis_input::{keycodes, DispatcherState, KeyAction, KeyEvent, MotionEvent, META_SHIFT_ON};
use trellis_layout::MeasureSpec;
use trellis_render::Surface;
use trellis_runtime::{CallbackToken, Clock, EventSource, Handler};

use crate::focus::{FocusDirection, SoundEffect};
use crate::tree::{ViewError, ViewId, ViewTree};

/// Per-frame limits.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    /// Layout passes run in one frame before carrying the rest over.
    /// A widget that requests layout from inside `on_layout` would
    /// otherwise never let the frame end.
    pub max_layout_passes: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_layout_passes: 3,
        }
    }
}

/// One on-screen window: a view tree bound to a surface.
pub struct Window {
    tree: ViewTree,
    surface: Box<dyn Surface>,
    clock: Arc<dyn Clock>,
    handler: Handler<Window>,
    key_state: DispatcherState,
    config: WindowConfig,
    sound_player: Option<Box<dyn FnMut(SoundEffect)>>,
    frames: u64,
}

impl Window {
    pub fn new(surface: Box<dyn Surface>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(surface, clock, WindowConfig::default())
    }

    pub fn with_config(
        surface: Box<dyn Surface>,
        clock: Arc<dyn Clock>,
        config: WindowConfig,
    ) -> Self {
        Self {
            tree: ViewTree::new(),
            surface,
            clock,
            handler: Handler::new(),
            key_state: DispatcherState::new(),
            config,
            sound_player: None,
            frames: 0,
        }
    }

    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    /// Makes `root` the content of this window. The first frame after
    /// this lays it out against the surface size and draws it in full.
    pub fn set_content(&mut self, root: ViewId) -> Result<(), ViewError> {
        self.tree.set_root(root)
    }

    /// Installs the hook that focus navigation feeds its cue sounds to.
    pub fn set_sound_player(&mut self, player: impl FnMut(SoundEffect) + 'static) {
        self.sound_player = Some(Box::new(player));
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Schedules `run` for the next frame.
    pub fn post(&mut self, run: impl FnOnce(&mut Window) + 'static) -> CallbackToken {
        let now = self.clock.uptime_millis();
        self.handler.post(now, run)
    }

    /// Schedules `run` to fire once `delay_millis` have passed.
    pub fn post_delayed(
        &mut self,
        delay_millis: u64,
        run: impl FnOnce(&mut Window) + 'static,
    ) -> CallbackToken {
        let now = self.clock.uptime_millis();
        self.handler.post_delayed(now, delay_millis, run)
    }

    /// Drops a posted callback before it fires. Returns whether it was
    /// still pending.
    pub fn remove_callbacks(&mut self, token: CallbackToken) -> bool {
        self.handler.remove(token)
    }

    /// Feeds a key through the tree; unhandled navigation keys move
    /// focus instead.
    pub fn dispatch_key(&mut self, event: &mut KeyEvent) -> bool {
        if self.tree.dispatch_key_event(event, &mut self.key_state) {
            return true;
        }
        if event.action() != KeyAction::Down {
            return false;
        }
        let Some(direction) = direction_for_key(event) else {
            return false;
        };
        let from = match self.tree.focused_view().or_else(|| self.tree.root()) {
            Some(view) => view,
            None => return false,
        };
        let Some(found) = self.tree.focus_search(from, direction) else {
            return false;
        };
        if self.tree.request_focus(found) {
            self.play_sound(SoundEffect::for_focus_direction(direction));
            return true;
        }
        false
    }

    /// Feeds a pointer sample to the tree in window coordinates.
    pub fn dispatch_pointer(&mut self, event: &MotionEvent) -> bool {
        self.tree.dispatch_pointer_event(event)
    }

    /// Runs one frame: due callbacks, layout, draw, flip.
    pub fn do_frame(&mut self, now: u64) {
        let due = self.handler.take_due(now);
        for run in due {
            run(self);
        }

        let size = self.surface.size();
        let mut passes = 0;
        while self.tree.has_pending_layout() && passes < self.config.max_layout_passes {
            let _requesters = self.tree.take_layout_requesters();
            let Some(root) = self.tree.root() else {
                break;
            };
            self.tree.measure(
                root,
                MeasureSpec::exactly(size.width),
                MeasureSpec::exactly(size.height),
            );
            self.tree.layout(root, 0, 0, size.width, size.height);
            passes += 1;
        }
        if self.tree.has_pending_layout() {
            warn!("layout still pending after {passes} passes, carrying over to the next frame");
        }

        let damage = self.tree.take_damage();
        if !damage.is_empty() {
            let Self { tree, surface, .. } = self;
            tree.draw(surface.canvas(), &damage);
            surface.flip(&damage);
            trace!(
                "frame {frame}: {passes} layout passes, {rects} damage rects",
                frame = self.frames,
                rects = damage.len()
            );
        }
        if self.surface.needs_compose() {
            self.surface.compose();
        }

        // Invalidations deferred during the draw walk become next
        // frame's damage here, after the flip.
        self.tree.flush_deferred_invalidates();
        self.frames += 1;
    }

    /// Whether the next [`Window::do_frame`] would do anything at `now`.
    pub fn has_pending_work(&self, now: u64) -> bool {
        self.tree.has_damage()
            || self.tree.has_pending_layout()
            || self.tree.has_pending_redraws()
            || self.handler.has_due(now)
            || self.surface.needs_compose()
    }

    /// Earliest uptime at which a posted callback comes due.
    pub fn next_callback_deadline(&self) -> Option<u64> {
        self.handler.next_deadline()
    }

    fn play_sound(&mut self, effect: SoundEffect) {
        if let Some(player) = &mut self.sound_player {
            player(effect);
        }
    }
}

fn direction_for_key(event: &KeyEvent) -> Option<FocusDirection> {
    match event.keycode() {
        keycodes::KEYCODE_DPAD_LEFT => Some(FocusDirection::Left),
        keycodes::KEYCODE_DPAD_RIGHT => Some(FocusDirection::Right),
        keycodes::KEYCODE_DPAD_UP => Some(FocusDirection::Up),
        keycodes::KEYCODE_DPAD_DOWN => Some(FocusDirection::Down),
        keycodes::KEYCODE_TAB => {
            if event.meta_state() & META_SHIFT_ON != 0 {
                Some(FocusDirection::Backward)
            } else {
                Some(FocusDirection::Forward)
            }
        }
        _ => None,
    }
}

/// Looper adapter: ready whenever the window has pending work.
pub struct WindowEventSource {
    window: Rc<RefCell<Window>>,
}

impl WindowEventSource {
    pub fn new(window: Rc<RefCell<Window>>) -> Self {
        Self { window }
    }
}

impl EventSource for WindowEventSource {
    fn check(&mut self) -> bool {
        let window = self.window.borrow();
        let now = window.clock.uptime_millis();
        window.has_pending_work(now)
    }

    fn handle(&mut self) {
        let mut window = self.window.borrow_mut();
        let now = window.clock.uptime_millis();
        window.do_frame(now);
    }
}
