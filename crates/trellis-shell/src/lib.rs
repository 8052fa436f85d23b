//! Wires the pieces of a Trellis application together.
//!
//! A [`Shell`] is the explicit context object an app drives: it owns the
//! looper, a shared window handle and the input queues, plus the reader
//! thread feeding them once a backend is attached. Nothing in here is a
//! global; every collaborator is built in [`Shell::with_config`] and
//! passed along explicitly.
//!
//! One [`Shell::tick`] is one looper poll. The input source drains ahead
//! of the window source, so a queued event and the frame it provokes fit
//! in a single poll.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use log::trace;
use trellis_input::{
    trace as event_trace, DeviceQueues, InputConfig, InputEvent, InputReader, RawInputSource,
};
use trellis_render::Surface;
use trellis_runtime::{Clock, EventSource, Looper, DEFAULT_POLL_INTERVAL};
use trellis_view::{Window, WindowConfig, WindowEventSource};

/// Tunables for a whole shell. The defaults suit an interactive app.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub window: WindowConfig,
    pub input: InputConfig,
    /// Idle sleep between looper polls.
    pub poll_interval: Duration,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            input: InputConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// One running application: looper, window and input plumbing.
pub struct Shell {
    looper: Looper,
    window: Rc<RefCell<Window>>,
    queues: Arc<DeviceQueues>,
    clock: Arc<dyn Clock>,
    input_config: InputConfig,
    reader: Option<InputReader>,
}

impl Shell {
    pub fn new(surface: Box<dyn Surface>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(surface, clock, ShellConfig::default())
    }

    pub fn with_config(
        surface: Box<dyn Surface>,
        clock: Arc<dyn Clock>,
        config: ShellConfig,
    ) -> Self {
        let window = Rc::new(RefCell::new(Window::with_config(
            surface,
            clock.clone(),
            config.window,
        )));
        let queues = DeviceQueues::new(&config.input);
        let mut looper = Looper::with_poll_interval(config.poll_interval);
        looper.add_source(Box::new(InputEventSource {
            queues: queues.clone(),
            window: window.clone(),
            scratch: Vec::new(),
        }));
        looper.add_source(Box::new(WindowEventSource::new(window.clone())));
        Self {
            looper,
            window,
            queues,
            clock,
            input_config: config.input,
            reader: None,
        }
    }

    /// Shared handle to the window; clone freely.
    pub fn window(&self) -> Rc<RefCell<Window>> {
        self.window.clone()
    }

    /// Runs `f` against the window. Not callable from inside a window
    /// callback, where the handle is already borrowed.
    pub fn with_window<R>(&self, f: impl FnOnce(&mut Window) -> R) -> R {
        f(&mut self.window.borrow_mut())
    }

    /// The queues the reader thread feeds. Tests push events here
    /// directly instead of attaching a backend.
    pub fn queues(&self) -> Arc<DeviceQueues> {
        self.queues.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Spawns the reader thread polling `source`. Replaces any earlier
    /// reader; the old thread winds down on its own.
    pub fn attach_input(&mut self, source: Box<dyn RawInputSource>) -> io::Result<()> {
        let reader = InputReader::spawn(
            source,
            self.queues.clone(),
            self.clock.clone(),
            self.input_config.clone(),
        )?;
        self.reader = Some(reader);
        Ok(())
    }

    /// One looper poll: drain input, then frame if anything is pending.
    /// Returns how many sources had work.
    pub fn tick(&mut self) -> usize {
        self.looper.poll_once()
    }

    /// Polls until `done` returns true, giving up after `max_polls`.
    pub fn run_until(&mut self, max_polls: usize, done: impl FnMut() -> bool) -> bool {
        self.looper.run_until(max_polls, done)
    }

    /// Stops the reader thread (if any) and waits for it to exit.
    pub fn shutdown(mut self) {
        if let Some(reader) = self.reader.take() {
            reader.shutdown();
        }
    }
}

/// Looper source that moves queued events into the window and returns
/// them to their pools.
struct InputEventSource {
    queues: Arc<DeviceQueues>,
    window: Rc<RefCell<Window>>,
    scratch: Vec<InputEvent>,
}

impl EventSource for InputEventSource {
    fn check(&mut self) -> bool {
        !self.queues.is_empty()
    }

    fn handle(&mut self) {
        self.queues.drain(&mut self.scratch);
        let mut window = self.window.borrow_mut();
        for event in self.scratch.drain(..) {
            trace!("{}", event_trace::record(&event));
            match event {
                InputEvent::Key(mut key) => {
                    window.dispatch_key(&mut key);
                    self.queues.recycle(InputEvent::Key(key));
                }
                InputEvent::Motion(motion) => {
                    window.dispatch_pointer(&motion);
                    self.queues.recycle(InputEvent::Motion(motion));
                }
            }
        }
    }
}
