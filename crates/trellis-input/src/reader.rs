use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use indexmap::IndexMap;
use log::{debug, warn};
use trellis_runtime::Clock;

use crate::events::{InputEvent, KeyAction, KeyEvent, MotionAction, MotionEvent, Pointer};
use crate::pool::{EventPool, DEFAULT_POOL_CAPACITY};

type AHashMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Tunables for the input pipeline. Everything has a conservative
/// default; construct with `..Default::default()`.
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Upper bound for one blocking poll of the raw source.
    pub poll_interval: Duration,
    /// A pointer device silent this long mid-gesture gets a synthesized
    /// cancel.
    pub cancel_timeout_millis: u64,
    /// Free-list bound for each event pool.
    pub pool_capacity: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(20),
            cancel_timeout_millis: 2000,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

/// What a platform input backend hands the reader thread: decoded
/// transitions plus device lifecycle notices.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Key {
        device_id: i32,
        action: KeyAction,
        keycode: i32,
        repeat: i32,
        meta_state: u32,
        time: u64,
    },
    Pointer {
        device_id: i32,
        action: u32,
        x: f32,
        y: f32,
        time: u64,
    },
    DeviceAdded {
        device_id: i32,
    },
    DeviceRemoved {
        device_id: i32,
    },
}

/// The blocking side of the input pipeline, implemented by platform
/// backends and test scripts.
pub trait RawInputSource: Send {
    /// Appends any available records to `out`, blocking up to `timeout`
    /// when there is nothing yet.
    fn poll(&mut self, out: &mut Vec<RawRecord>, timeout: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
struct DeviceState {
    gesture_active: bool,
    gesture_down_time: u64,
    last_pointer_time: u64,
    key_down_time: u64,
}

struct QueuesInner {
    queues: IndexMap<i32, VecDeque<InputEvent>>,
    states: AHashMap<i32, DeviceState>,
    key_pool: EventPool<KeyEvent>,
    motion_pool: EventPool<MotionEvent>,
}

/// Per-device event queues plus the event pools, all behind one mutex.
///
/// The reader thread pushes; the UI thread drains and recycles. Order is
/// preserved within a device and unspecified across devices.
pub struct DeviceQueues {
    inner: Mutex<QueuesInner>,
}

impl DeviceQueues {
    pub fn new(config: &InputConfig) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(QueuesInner {
                queues: IndexMap::new(),
                states: AHashMap::default(),
                key_pool: EventPool::with_capacity(config.pool_capacity),
                motion_pool: EventPool::with_capacity(config.pool_capacity),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, QueuesInner> {
        // A panicking reader must not wedge the UI thread.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_device(&self, device_id: i32) {
        let mut inner = self.lock();
        if inner.queues.insert(device_id, VecDeque::new()).is_none() {
            debug!("input device {device_id} added");
        }
        inner.states.entry(device_id).or_default();
    }

    pub fn remove_device(&self, device_id: i32) {
        let mut inner = self.lock();
        if let Some(queue) = inner.queues.shift_remove(&device_id) {
            debug!(
                "input device {device_id} removed, {} queued events dropped",
                queue.len()
            );
        }
        inner.states.remove(&device_id);
    }

    pub fn device_count(&self) -> usize {
        self.lock().queues.len()
    }

    /// Decodes a key record into a pooled event and queues it. Unknown
    /// devices are registered on first use.
    pub fn push_key(
        &self,
        device_id: i32,
        action: KeyAction,
        keycode: i32,
        repeat: i32,
        meta_state: u32,
        time: u64,
    ) {
        let mut inner = self.lock();
        let state = inner.states.entry(device_id).or_default();
        if action == KeyAction::Down && repeat == 0 {
            state.key_down_time = time;
        }
        let down_time = state.key_down_time;
        let mut event = inner.key_pool.obtain();
        event.init(device_id, action, keycode, repeat, meta_state, 0, down_time, time);
        inner
            .queues
            .entry(device_id)
            .or_default()
            .push_back(InputEvent::Key(event));
    }

    /// Decodes a single-pointer motion record, maintaining the device's
    /// gesture bookkeeping for the stuck-pointer watchdog.
    pub fn push_pointer(&self, device_id: i32, action: u32, x: f32, y: f32, time: u64) {
        let mut inner = self.lock();
        let state = inner.states.entry(device_id).or_default();
        let masked = MotionAction::from_masked(action & crate::events::ACTION_MASK);
        match masked {
            Some(MotionAction::Down) => {
                state.gesture_active = true;
                state.gesture_down_time = time;
            }
            Some(MotionAction::Up) | Some(MotionAction::Cancel) => {
                state.gesture_active = false;
            }
            _ => {}
        }
        state.last_pointer_time = time;
        let down_time = state.gesture_down_time;

        let mut event = inner.motion_pool.obtain();
        event.init(device_id, action, vec![Pointer { id: 0, x, y }], down_time, time);
        inner
            .queues
            .entry(device_id)
            .or_default()
            .push_back(InputEvent::Motion(event));
    }

    /// Queues an already-built event; used by tests and trace playback.
    pub fn push_event(&self, event: InputEvent) {
        let mut inner = self.lock();
        let device_id = event.device_id();
        inner.states.entry(device_id).or_default();
        inner.queues.entry(device_id).or_default().push_back(event);
    }

    /// Synthesizes a cancel for every device whose gesture has been
    /// silent longer than `timeout_millis`. Returns how many were
    /// injected.
    pub fn synthesize_cancels(&self, now: u64, timeout_millis: u64) -> usize {
        let mut inner = self.lock();
        let stuck: Vec<i32> = inner
            .states
            .iter()
            .filter(|(_, s)| {
                s.gesture_active && now.saturating_sub(s.last_pointer_time) > timeout_millis
            })
            .map(|(id, _)| *id)
            .collect();
        for device_id in &stuck {
            let device_id = *device_id;
            let (down_time, last) = {
                let state = inner
                    .states
                    .get_mut(&device_id)
                    .expect("stuck device state vanished");
                state.gesture_active = false;
                (state.gesture_down_time, state.last_pointer_time)
            };
            warn!(
                "pointer device {device_id} silent for {}ms mid-gesture, synthesizing cancel",
                now.saturating_sub(last)
            );
            let mut event = inner.motion_pool.obtain();
            event.init(
                device_id,
                MotionAction::Cancel as u32,
                vec![Pointer {
                    id: 0,
                    x: 0.0,
                    y: 0.0,
                }],
                down_time,
                now,
            );
            inner
                .queues
                .entry(device_id)
                .or_default()
                .push_back(InputEvent::Motion(event));
        }
        stuck.len()
    }

    /// Moves every queued event into `out`, device by device in
    /// registration order.
    pub fn drain(&self, out: &mut Vec<InputEvent>) {
        let mut inner = self.lock();
        for queue in inner.queues.values_mut() {
            while let Some(event) = queue.pop_front() {
                out.push(event);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queues.values().all(VecDeque::is_empty)
    }

    /// Returns a dispatched event to its pool.
    pub fn recycle(&self, event: InputEvent) {
        let mut inner = self.lock();
        match event {
            InputEvent::Key(e) => inner.key_pool.recycle(e),
            InputEvent::Motion(e) => inner.motion_pool.recycle(e),
        }
    }
}

/// The background thread feeding [`DeviceQueues`] from a
/// [`RawInputSource`].
///
/// The only other thread in the process. It decodes, queues and runs the
/// stuck-gesture watchdog; everything downstream happens on the UI
/// thread.
pub struct InputReader {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl InputReader {
    pub fn spawn(
        mut source: Box<dyn RawInputSource>,
        queues: Arc<DeviceQueues>,
        clock: Arc<dyn Clock>,
        config: InputConfig,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();
        let handle = std::thread::Builder::new()
            .name("trellis-input".into())
            .spawn(move || {
                let mut batch = Vec::new();
                while thread_running.load(Ordering::Relaxed) {
                    batch.clear();
                    let started = Instant::now();
                    source.poll(&mut batch, config.poll_interval);
                    for record in batch.drain(..) {
                        match record {
                            RawRecord::Key {
                                device_id,
                                action,
                                keycode,
                                repeat,
                                meta_state,
                                time,
                            } => queues.push_key(device_id, action, keycode, repeat, meta_state, time),
                            RawRecord::Pointer {
                                device_id,
                                action,
                                x,
                                y,
                                time,
                            } => queues.push_pointer(device_id, action, x, y, time),
                            RawRecord::DeviceAdded { device_id } => queues.add_device(device_id),
                            RawRecord::DeviceRemoved { device_id } => {
                                queues.remove_device(device_id)
                            }
                        }
                    }
                    queues.synthesize_cancels(clock.uptime_millis(), config.cancel_timeout_millis);
                    // Sources that return immediately must not spin the
                    // thread.
                    let elapsed = started.elapsed();
                    if elapsed < config.poll_interval {
                        std::thread::sleep(config.poll_interval - elapsed);
                    }
                }
            })?;
        Ok(Self {
            handle: Some(handle),
            running,
        })
    }

    /// Stops the thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("input reader thread panicked before shutdown");
            }
        }
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        // Detaches rather than joins; shutdown() is the orderly path.
        self.running.store(false, Ordering::Relaxed);
    }
}
