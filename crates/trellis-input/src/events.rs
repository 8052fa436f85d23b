use trellis_render::Matrix;

/// Key codes for the keys the toolkit routes specially. Values match the
/// usual embedded scancode tables so traces stay comparable.
pub mod keycodes {
    pub const KEYCODE_UNKNOWN: i32 = 0;
    pub const KEYCODE_BACK: i32 = 4;
    pub const KEYCODE_DPAD_UP: i32 = 19;
    pub const KEYCODE_DPAD_DOWN: i32 = 20;
    pub const KEYCODE_DPAD_LEFT: i32 = 21;
    pub const KEYCODE_DPAD_RIGHT: i32 = 22;
    pub const KEYCODE_DPAD_CENTER: i32 = 23;
    pub const KEYCODE_TAB: i32 = 61;
    pub const KEYCODE_SPACE: i32 = 62;
    pub const KEYCODE_ENTER: i32 = 66;
    pub const KEYCODE_ESCAPE: i32 = 111;
}

/// Set on a repeated down event once the repeat crossed the long-press
/// threshold.
pub const FLAG_LONG_PRESS: u32 = 0x80;
/// The sequence this key was part of was canceled; handlers must not act.
pub const FLAG_CANCELED: u32 = 0x20;
/// [`FLAG_CANCELED`] because a long press already fired for this key.
pub const FLAG_CANCELED_LONG_PRESS: u32 = 0x100;
/// Set on the up event of a key whose down handler started tracking.
pub const FLAG_TRACKING: u32 = 0x200;
/// Set by a down handler to ask the dispatcher to track this key.
pub const FLAG_START_TRACKING: u32 = 0x4000_0000;

pub const META_NONE: u32 = 0;
pub const META_SHIFT_ON: u32 = 0x1;
pub const META_ALT_ON: u32 = 0x2;
pub const META_CTRL_ON: u32 = 0x1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down = 0,
    Up = 1,
    /// A batched repeat; `repeat_count` carries how many.
    Multiple = 2,
}

impl KeyAction {
    pub fn from_raw(raw: u32) -> Option<KeyAction> {
        match raw {
            0 => Some(KeyAction::Down),
            1 => Some(KeyAction::Up),
            2 => Some(KeyAction::Multiple),
            _ => None,
        }
    }
}

/// One key transition. Times are clock uptime milliseconds; `down_time`
/// is when the key first went down, so a release carries its press time.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    device_id: i32,
    seq: u32,
    action: KeyAction,
    keycode: i32,
    repeat_count: i32,
    meta_state: u32,
    flags: u32,
    down_time: u64,
    event_time: u64,
}

impl Default for KeyEvent {
    fn default() -> Self {
        Self::new(KeyAction::Down, keycodes::KEYCODE_UNKNOWN)
    }
}

impl KeyEvent {
    pub fn new(action: KeyAction, keycode: i32) -> Self {
        Self {
            device_id: -1,
            seq: 0,
            action,
            keycode,
            repeat_count: 0,
            meta_state: META_NONE,
            flags: 0,
            down_time: 0,
            event_time: 0,
        }
    }

    /// Re-initializes every field; used when an instance comes out of a
    /// pool.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        device_id: i32,
        action: KeyAction,
        keycode: i32,
        repeat_count: i32,
        meta_state: u32,
        flags: u32,
        down_time: u64,
        event_time: u64,
    ) {
        self.device_id = device_id;
        self.action = action;
        self.keycode = keycode;
        self.repeat_count = repeat_count;
        self.meta_state = meta_state;
        self.flags = flags;
        self.down_time = down_time;
        self.event_time = event_time;
    }

    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub(crate) fn set_seq(&mut self, seq: u32) {
        self.seq = seq;
    }

    pub fn action(&self) -> KeyAction {
        self.action
    }

    pub(crate) fn set_action(&mut self, action: KeyAction) {
        self.action = action;
    }

    pub fn keycode(&self) -> i32 {
        self.keycode
    }

    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }

    pub(crate) fn set_repeat_count(&mut self, count: i32) {
        self.repeat_count = count;
    }

    pub fn meta_state(&self) -> u32 {
        self.meta_state
    }

    pub fn has_no_modifiers(&self) -> bool {
        self.meta_state & (META_SHIFT_ON | META_ALT_ON | META_CTRL_ON) == 0
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn add_flags(&mut self, flags: u32) {
        self.flags |= flags;
    }

    pub(crate) fn clear_flags(&mut self, flags: u32) {
        self.flags &= !flags;
    }

    pub fn down_time(&self) -> u64 {
        self.down_time
    }

    pub fn event_time(&self) -> u64 {
        self.event_time
    }

    /// Called by a down handler that wants the matching long press and up
    /// routed back to it.
    pub fn start_tracking(&mut self) {
        self.flags |= FLAG_START_TRACKING;
    }

    pub fn is_tracking(&self) -> bool {
        self.flags & FLAG_TRACKING != 0
    }

    pub fn is_long_press(&self) -> bool {
        self.flags & FLAG_LONG_PRESS != 0
    }

    pub fn is_canceled(&self) -> bool {
        self.flags & FLAG_CANCELED != 0
    }
}

pub const ACTION_MASK: u32 = 0xff;
pub const ACTION_POINTER_INDEX_MASK: u32 = 0xff00;
pub const ACTION_POINTER_INDEX_SHIFT: u32 = 8;

/// The masked part of a motion action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAction {
    Down = 0,
    Up = 1,
    Move = 2,
    Cancel = 3,
    /// A non-primary pointer went down; the index bits say which.
    PointerDown = 5,
    PointerUp = 6,
}

impl MotionAction {
    pub fn from_masked(masked: u32) -> Option<MotionAction> {
        match masked {
            0 => Some(MotionAction::Down),
            1 => Some(MotionAction::Up),
            2 => Some(MotionAction::Move),
            3 => Some(MotionAction::Cancel),
            5 => Some(MotionAction::PointerDown),
            6 => Some(MotionAction::PointerUp),
            _ => None,
        }
    }
}

/// One touch pointer: stable id for the finger, current position in the
/// coordinate space of whoever holds the event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

/// One pointer-stream sample. Coordinates are rewritten as the event
/// descends the view tree, so a handler always sees its own local space.
#[derive(Debug, Clone)]
pub struct MotionEvent {
    device_id: i32,
    seq: u32,
    /// Masked action plus pointer-index bits.
    action: u32,
    pointers: Vec<Pointer>,
    down_time: u64,
    event_time: u64,
}

impl Default for MotionEvent {
    fn default() -> Self {
        Self::new(MotionAction::Cancel as u32, 0.0, 0.0)
    }
}

impl MotionEvent {
    pub fn new(action: u32, x: f32, y: f32) -> Self {
        Self {
            device_id: -1,
            seq: 0,
            action,
            pointers: vec![Pointer { id: 0, x, y }],
            down_time: 0,
            event_time: 0,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(MotionAction::Down as u32, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(MotionAction::Up as u32, x, y)
    }

    pub fn move_to(x: f32, y: f32) -> Self {
        Self::new(MotionAction::Move as u32, x, y)
    }

    pub fn cancel() -> Self {
        Self::new(MotionAction::Cancel as u32, 0.0, 0.0)
    }

    pub fn init(
        &mut self,
        device_id: i32,
        action: u32,
        pointers: Vec<Pointer>,
        down_time: u64,
        event_time: u64,
    ) {
        self.device_id = device_id;
        self.action = action;
        self.pointers = pointers;
        self.down_time = down_time;
        self.event_time = event_time;
    }

    pub fn device_id(&self) -> i32 {
        self.device_id
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub(crate) fn set_seq(&mut self, seq: u32) {
        self.seq = seq;
    }

    pub fn raw_action(&self) -> u32 {
        self.action
    }

    pub fn set_action(&mut self, action: u32) {
        self.action = action;
    }

    pub fn action_masked(&self) -> MotionAction {
        MotionAction::from_masked(self.action & ACTION_MASK).unwrap_or(MotionAction::Cancel)
    }

    /// Which pointer a `PointerDown`/`PointerUp` refers to.
    pub fn action_index(&self) -> usize {
        ((self.action & ACTION_POINTER_INDEX_MASK) >> ACTION_POINTER_INDEX_SHIFT) as usize
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer_id(&self, index: usize) -> i32 {
        self.pointers[index].id
    }

    pub fn find_pointer_index(&self, id: i32) -> Option<usize> {
        self.pointers.iter().position(|p| p.id == id)
    }

    pub fn x(&self) -> f32 {
        self.pointers[0].x
    }

    pub fn y(&self) -> f32 {
        self.pointers[0].y
    }

    pub fn x_at(&self, index: usize) -> f32 {
        self.pointers[index].x
    }

    pub fn y_at(&self, index: usize) -> f32 {
        self.pointers[index].y
    }

    pub fn down_time(&self) -> u64 {
        self.down_time
    }

    pub fn event_time(&self) -> u64 {
        self.event_time
    }

    pub fn set_times(&mut self, down_time: u64, event_time: u64) {
        self.down_time = down_time;
        self.event_time = event_time;
    }

    /// Bitset of all pointer ids in the event.
    pub fn id_bits(&self) -> u32 {
        self.pointers.iter().fold(0, |bits, p| bits | (1 << p.id))
    }

    pub fn offset_location(&mut self, dx: f32, dy: f32) {
        for p in &mut self.pointers {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Maps every pointer through `matrix`, switching the event into
    /// another coordinate space.
    pub fn transform(&mut self, matrix: &Matrix) {
        for p in &mut self.pointers {
            let (x, y) = matrix.map(p.x, p.y);
            p.x = x;
            p.y = y;
        }
    }

    /// Copies the event down to the pointers in `id_bits`, remapping the
    /// action so the subset tells a consistent story: a pointer
    /// transition outside the subset becomes a plain move, and the last
    /// pointer of the subset going up or down becomes a primary up/down.
    pub fn split(&self, id_bits: u32) -> MotionEvent {
        let kept: Vec<Pointer> = self
            .pointers
            .iter()
            .filter(|p| id_bits & (1 << p.id) != 0)
            .copied()
            .collect();
        let masked = self.action_masked();
        let action = match masked {
            MotionAction::PointerDown | MotionAction::PointerUp => {
                let changed_id = self.pointer_id(self.action_index());
                match kept.iter().position(|p| p.id == changed_id) {
                    None => MotionAction::Move as u32,
                    Some(new_index) => {
                        if kept.len() == 1 {
                            if masked == MotionAction::PointerDown {
                                MotionAction::Down as u32
                            } else {
                                MotionAction::Up as u32
                            }
                        } else {
                            (masked as u32)
                                | ((new_index as u32) << ACTION_POINTER_INDEX_SHIFT)
                        }
                    }
                }
            }
            other => other as u32,
        };
        MotionEvent {
            device_id: self.device_id,
            seq: self.seq,
            action,
            pointers: kept,
            down_time: self.down_time,
            event_time: self.event_time,
        }
    }
}

/// Either flavor of input event, boxed so pooled instances move between
/// threads without copying their payload.
#[derive(Debug)]
pub enum InputEvent {
    Key(Box<KeyEvent>),
    Motion(Box<MotionEvent>),
}

impl InputEvent {
    pub fn device_id(&self) -> i32 {
        match self {
            InputEvent::Key(e) => e.device_id(),
            InputEvent::Motion(e) => e.device_id(),
        }
    }

    pub fn event_time(&self) -> u64 {
        match self {
            InputEvent::Key(e) => e.event_time(),
            InputEvent::Motion(e) => e.event_time(),
        }
    }

    pub fn seq(&self) -> u32 {
        match self {
            InputEvent::Key(e) => e.seq(),
            InputEvent::Motion(e) => e.seq(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pointer_event(action: u32) -> MotionEvent {
        let mut ev = MotionEvent::default();
        ev.init(
            1,
            action,
            vec![
                Pointer {
                    id: 0,
                    x: 10.0,
                    y: 10.0,
                },
                Pointer {
                    id: 1,
                    x: 50.0,
                    y: 50.0,
                },
            ],
            100,
            120,
        );
        ev
    }

    #[test]
    fn action_index_unpacks_pointer_bits() {
        let action = (MotionAction::PointerDown as u32) | (1 << ACTION_POINTER_INDEX_SHIFT);
        let ev = two_pointer_event(action);
        assert_eq!(ev.action_masked(), MotionAction::PointerDown);
        assert_eq!(ev.action_index(), 1);
        assert_eq!(ev.pointer_id(ev.action_index()), 1);
    }

    #[test]
    fn offset_moves_all_pointers() {
        let mut ev = two_pointer_event(MotionAction::Move as u32);
        ev.offset_location(-5.0, 3.0);
        assert_eq!(ev.x_at(0), 5.0);
        assert_eq!(ev.y_at(1), 53.0);
    }

    #[test]
    fn split_to_remaining_pointer_demotes_transition_to_move() {
        let action = (MotionAction::PointerDown as u32) | (1 << ACTION_POINTER_INDEX_SHIFT);
        let ev = two_pointer_event(action);
        let only_first = ev.split(1 << 0);
        assert_eq!(only_first.pointer_count(), 1);
        assert_eq!(only_first.action_masked(), MotionAction::Move);
    }

    #[test]
    fn split_to_transitioning_pointer_promotes_to_primary() {
        let action = (MotionAction::PointerDown as u32) | (1 << ACTION_POINTER_INDEX_SHIFT);
        let ev = two_pointer_event(action);
        let only_second = ev.split(1 << 1);
        assert_eq!(only_second.pointer_count(), 1);
        assert_eq!(only_second.action_masked(), MotionAction::Down);
        assert_eq!(only_second.x(), 50.0);
    }

    #[test]
    fn id_bits_cover_all_pointers() {
        let ev = two_pointer_event(MotionAction::Move as u32);
        assert_eq!(ev.id_bits(), 0b11);
    }

    #[test]
    fn key_tracking_flag_round_trip() {
        let mut key = KeyEvent::new(KeyAction::Down, keycodes::KEYCODE_ENTER);
        assert!(!key.is_tracking());
        key.start_tracking();
        assert_ne!(key.flags() & FLAG_START_TRACKING, 0);
        key.add_flags(FLAG_TRACKING);
        assert!(key.is_tracking());
    }
}
