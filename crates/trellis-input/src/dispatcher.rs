use hashbrown::HashSet;

use crate::events::{
    KeyAction, KeyEvent, FLAG_CANCELED, FLAG_CANCELED_LONG_PRESS, FLAG_START_TRACKING,
    FLAG_TRACKING,
};

type AHashSet<T> = HashSet<T, ahash::RandomState>;

/// The hooks a key event is offered to, in dispatch order.
///
/// Handlers that claim a down event and want the rest of that key's
/// lifetime call [`KeyEvent::start_tracking`] from `on_key_down`.
pub trait KeyEventReceiver {
    fn on_key_down(&mut self, keycode: i32, event: &mut KeyEvent) -> bool;

    fn on_key_up(&mut self, keycode: i32, event: &KeyEvent) -> bool;

    fn on_key_long_press(&mut self, _keycode: i32, _event: &KeyEvent) -> bool {
        false
    }

    fn on_key_multiple(&mut self, _keycode: i32, _count: i32, _event: &KeyEvent) -> bool {
        false
    }
}

/// Per-window bookkeeping that ties a key's down, long-press and up
/// events together across dispatches.
///
/// At most one key is tracked at a time, remembered together with an
/// opaque target token so a tree can forget state for a disappearing
/// receiver without touching the rest.
#[derive(Debug, Default)]
pub struct DispatcherState {
    down_key_code: i32,
    down_target: Option<u64>,
    active_long_presses: AHashSet<i32>,
}

impl DispatcherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything; used when focus moves between windows.
    pub fn reset(&mut self) {
        self.down_key_code = 0;
        self.down_target = None;
        self.active_long_presses.clear();
    }

    /// Forgets tracking state held for one target only.
    pub fn reset_target(&mut self, target: u64) {
        if self.down_target == Some(target) {
            self.down_key_code = 0;
            self.down_target = None;
        }
    }

    /// Begins tracking the key of a down event for `target`.
    ///
    /// Panics when handed anything but a down event; that is a dispatch
    /// bug, not a runtime condition.
    pub fn start_tracking(&mut self, event: &KeyEvent, target: u64) {
        if event.action() != KeyAction::Down {
            panic!("can only start tracking on a down event");
        }
        self.down_key_code = event.keycode();
        self.down_target = Some(target);
    }

    /// True when `event`'s key is the one currently tracked.
    pub fn is_tracking(&self, event: &KeyEvent) -> bool {
        self.down_key_code != 0 && self.down_key_code == event.keycode()
    }

    /// Records that a long press fired for `event`'s key, so the coming
    /// up event gets canceled.
    pub fn performed_long_press(&mut self, event: &KeyEvent) {
        self.active_long_presses.insert(event.keycode());
    }

    /// Stamps an up event with the outcome of its key's tracking:
    /// cancellation flags when a long press already fired, the tracking
    /// flag when this up matches the tracked down.
    pub fn handle_up_event(&mut self, event: &mut KeyEvent) {
        let keycode = event.keycode();
        if self.active_long_presses.remove(&keycode) {
            event.add_flags(FLAG_CANCELED | FLAG_CANCELED_LONG_PRESS);
        }
        if self.down_key_code == keycode {
            event.add_flags(FLAG_TRACKING);
            self.down_key_code = 0;
            self.down_target = None;
        }
    }
}

impl KeyEvent {
    /// Routes this event through `receiver`, updating the shared
    /// dispatcher `state` when one is supplied. `target` identifies the
    /// receiver for tracking purposes.
    ///
    /// Down events clear any stale start-tracking request before the
    /// handler runs; a handled, non-repeated down that asked for tracking
    /// begins it, and a long-press repeat of a tracked key is offered to
    /// `on_key_long_press`. Up events are stamped by the state before the
    /// handler sees them, so a long-pressed key arrives canceled.
    pub fn dispatch(
        &mut self,
        receiver: &mut dyn KeyEventReceiver,
        state: Option<&mut DispatcherState>,
        target: u64,
    ) -> bool {
        match self.action() {
            KeyAction::Down => {
                self.clear_flags(FLAG_START_TRACKING);
                let keycode = self.keycode();
                let mut handled = receiver.on_key_down(keycode, self);
                if let Some(state) = state {
                    if handled && self.repeat_count() == 0 && self.flags() & FLAG_START_TRACKING != 0
                    {
                        state.start_tracking(self, target);
                    } else if self.is_long_press() && state.is_tracking(self) {
                        if receiver.on_key_long_press(keycode, self) {
                            state.performed_long_press(self);
                            handled = true;
                        }
                    }
                }
                handled
            }
            KeyAction::Up => {
                if let Some(state) = state {
                    state.handle_up_event(self);
                }
                receiver.on_key_up(self.keycode(), self)
            }
            KeyAction::Multiple => {
                let count = self.repeat_count();
                let keycode = self.keycode();
                if receiver.on_key_multiple(keycode, count, self) {
                    return true;
                }
                if keycode != crate::events::keycodes::KEYCODE_UNKNOWN {
                    // Fall back to a synthesized press for receivers that
                    // only implement down/up.
                    self.set_action(KeyAction::Down);
                    self.set_repeat_count(0);
                    let handled = receiver.on_key_down(keycode, self);
                    if handled {
                        self.set_action(KeyAction::Up);
                        receiver.on_key_up(keycode, self);
                    }
                    self.set_action(KeyAction::Multiple);
                    self.set_repeat_count(count);
                    return handled;
                }
                false
            }
        }
    }
}
