//! Key routing into the tree.
//!
//! Keys go to the focused view (the root when nothing is focused): first
//! its listeners, then its widget hooks through the tracking state
//! machine, then the built-in confirm-key press handling.

use trellis_input::{keycodes, DispatcherState, KeyEvent, KeyEventReceiver};

use crate::tree::{ViewId, ViewTree};
use crate::widget::ViewScope;

impl ViewTree {
    /// Dispatches one key event, using `state` to tie its down, long
    /// press and up together across calls.
    pub fn dispatch_key_event(
        &mut self,
        event: &mut KeyEvent,
        state: &mut DispatcherState,
    ) -> bool {
        let Some(target) = self.focused_view().or_else(|| self.root()) else {
            return false;
        };
        if self.is_enabled(target) {
            let listeners: Vec<crate::tree::KeyListener> = match self.node(target) {
                Some(node) => node.listeners.key.iter().map(|(_, l)| l.clone()).collect(),
                None => return false,
            };
            for listener in listeners {
                if (listener.borrow_mut())(self, target, event) {
                    return true;
                }
            }
        }
        let token = target.token();
        let mut receiver = NodeReceiver {
            tree: self,
            id: target,
        };
        event.dispatch(&mut receiver, Some(state), token)
    }

    /// Confirm keys press a clickable view; anything else falls through.
    /// A disabled view swallows the key so the press does not leak past
    /// an inert control.
    fn default_key_down(&mut self, id: ViewId, keycode: i32, event: &mut KeyEvent) -> bool {
        if !is_confirm_key(keycode) || !event.has_no_modifiers() {
            return false;
        }
        if !self.is_enabled(id) {
            return true;
        }
        if self.is_clickable(id) && event.repeat_count() == 0 {
            self.set_pressed(id, true);
            event.start_tracking();
            return true;
        }
        false
    }

    fn default_key_up(&mut self, id: ViewId, keycode: i32, event: &KeyEvent) -> bool {
        if !is_confirm_key(keycode) || !event.has_no_modifiers() {
            return false;
        }
        if !self.is_enabled(id) {
            return true;
        }
        if self.is_clickable(id) && self.is_pressed(id) {
            self.set_pressed(id, false);
            if !event.is_canceled() {
                return self.perform_click(id);
            }
        }
        false
    }
}

fn is_confirm_key(keycode: i32) -> bool {
    matches!(
        keycode,
        keycodes::KEYCODE_ENTER | keycodes::KEYCODE_DPAD_CENTER | keycodes::KEYCODE_SPACE
    )
}

/// Adapts one view to the receiver side of the key state machine:
/// widget hooks first, tree defaults behind them.
struct NodeReceiver<'a> {
    tree: &'a mut ViewTree,
    id: ViewId,
}

impl KeyEventReceiver for NodeReceiver<'_> {
    fn on_key_down(&mut self, keycode: i32, event: &mut KeyEvent) -> bool {
        let id = self.id;
        let widget_handled = crate::widget::with_widget(self.tree, id, |widget, tree| {
            widget.on_key_down(&mut ViewScope::new(tree, id), keycode, event)
        })
        .unwrap_or(false);
        widget_handled || self.tree.default_key_down(id, keycode, event)
    }

    fn on_key_up(&mut self, keycode: i32, event: &KeyEvent) -> bool {
        let id = self.id;
        let widget_handled = crate::widget::with_widget(self.tree, id, |widget, tree| {
            widget.on_key_up(&mut ViewScope::new(tree, id), keycode, event)
        })
        .unwrap_or(false);
        widget_handled || self.tree.default_key_up(id, keycode, event)
    }

    fn on_key_long_press(&mut self, keycode: i32, event: &KeyEvent) -> bool {
        let id = self.id;
        crate::widget::with_widget(self.tree, id, |widget, tree| {
            widget.on_key_long_press(&mut ViewScope::new(tree, id), keycode, event)
        })
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use trellis_input::{keycodes, DispatcherState, KeyAction, KeyEvent, FLAG_LONG_PRESS};

    use crate::tree::{ViewId, ViewTree};
    use crate::widget::{EmptyWidget, ViewScope, Widget};

    fn down(keycode: i32) -> KeyEvent {
        KeyEvent::new(KeyAction::Down, keycode)
    }

    fn up(keycode: i32) -> KeyEvent {
        KeyEvent::new(KeyAction::Up, keycode)
    }

    fn long_press_repeat(keycode: i32) -> KeyEvent {
        let mut event = KeyEvent::default();
        event.init(-1, KeyAction::Down, keycode, 1, 0, FLAG_LONG_PRESS, 0, 600);
        event
    }

    fn clickable_button(tree: &mut ViewTree, clicks: &Rc<RefCell<u32>>) -> ViewId {
        let button = tree.create_view(Box::new(EmptyWidget));
        tree.set_focusable(button, true);
        let sink = clicks.clone();
        tree.add_click_listener(button, move |_, _| *sink.borrow_mut() += 1);
        button
    }

    fn rooted(tree: &mut ViewTree, child: ViewId) {
        let root = tree.create_view(Box::new(EmptyWidget));
        tree.set_root(root).unwrap();
        tree.add_child(root, child).unwrap();
    }

    #[test]
    fn confirm_key_clicks_the_focused_view() {
        let mut tree = ViewTree::new();
        let clicks = Rc::new(RefCell::new(0));
        let button = clickable_button(&mut tree, &clicks);
        rooted(&mut tree, button);
        tree.request_focus(button);
        let mut state = DispatcherState::new();

        let mut press = down(keycodes::KEYCODE_ENTER);
        assert!(tree.dispatch_key_event(&mut press, &mut state));
        assert!(tree.is_pressed(button));
        assert!(state.is_tracking(&press));

        let mut release = up(keycodes::KEYCODE_ENTER);
        assert!(tree.dispatch_key_event(&mut release, &mut state));
        assert!(!tree.is_pressed(button));
        assert_eq!(*clicks.borrow(), 1);
        assert!(!state.is_tracking(&release));
    }

    #[test]
    fn long_press_suppresses_the_click() {
        struct LongPressWidget {
            fired: Rc<RefCell<u32>>,
        }
        impl Widget for LongPressWidget {
            fn on_key_long_press(
                &mut self,
                _view: &mut ViewScope<'_>,
                _keycode: i32,
                _event: &KeyEvent,
            ) -> bool {
                *self.fired.borrow_mut() += 1;
                true
            }
        }

        let mut tree = ViewTree::new();
        let fired = Rc::new(RefCell::new(0));
        let button = tree.create_view(Box::new(LongPressWidget {
            fired: fired.clone(),
        }));
        tree.set_focusable(button, true);
        let clicks = Rc::new(RefCell::new(0));
        let sink = clicks.clone();
        tree.add_click_listener(button, move |_, _| *sink.borrow_mut() += 1);
        rooted(&mut tree, button);
        tree.request_focus(button);
        let mut state = DispatcherState::new();

        let mut press = down(keycodes::KEYCODE_ENTER);
        assert!(tree.dispatch_key_event(&mut press, &mut state));

        let mut repeat = long_press_repeat(keycodes::KEYCODE_ENTER);
        assert!(tree.dispatch_key_event(&mut repeat, &mut state));
        assert_eq!(*fired.borrow(), 1);

        let mut release = up(keycodes::KEYCODE_ENTER);
        tree.dispatch_key_event(&mut release, &mut state);
        assert!(release.is_canceled());
        assert!(!tree.is_pressed(button));
        assert_eq!(*clicks.borrow(), 0);
        assert!(!state.is_tracking(&release));
    }

    #[test]
    fn key_listener_outranks_widget_hooks() {
        struct CountingKeys {
            downs: Rc<RefCell<u32>>,
        }
        impl Widget for CountingKeys {
            fn on_key_down(
                &mut self,
                _view: &mut ViewScope<'_>,
                _keycode: i32,
                _event: &mut KeyEvent,
            ) -> bool {
                *self.downs.borrow_mut() += 1;
                true
            }
        }

        let mut tree = ViewTree::new();
        let downs = Rc::new(RefCell::new(0));
        let view = tree.create_view(Box::new(CountingKeys {
            downs: downs.clone(),
        }));
        tree.set_focusable(view, true);
        rooted(&mut tree, view);
        tree.request_focus(view);

        let listener_hits = Rc::new(RefCell::new(0));
        let sink = listener_hits.clone();
        tree.add_key_listener(view, move |_, _, _| {
            *sink.borrow_mut() += 1;
            true
        });

        let mut state = DispatcherState::new();
        let mut press = down(keycodes::KEYCODE_SPACE);
        assert!(tree.dispatch_key_event(&mut press, &mut state));
        assert_eq!(*listener_hits.borrow(), 1);
        assert_eq!(*downs.borrow(), 0);
    }

    #[test]
    fn unfocused_tree_routes_to_the_root() {
        let mut tree = ViewTree::new();
        let clicks = Rc::new(RefCell::new(0));
        let root = tree.create_view(Box::new(EmptyWidget));
        let sink = clicks.clone();
        tree.add_click_listener(root, move |_, _| *sink.borrow_mut() += 1);
        tree.set_root(root).unwrap();
        let mut state = DispatcherState::new();

        let mut press = down(keycodes::KEYCODE_DPAD_CENTER);
        assert!(tree.dispatch_key_event(&mut press, &mut state));
        let mut release = up(keycodes::KEYCODE_DPAD_CENTER);
        tree.dispatch_key_event(&mut release, &mut state);
        assert_eq!(*clicks.borrow(), 1);
    }

    #[test]
    fn directional_keys_fall_through_unhandled() {
        let mut tree = ViewTree::new();
        let clicks = Rc::new(RefCell::new(0));
        let button = clickable_button(&mut tree, &clicks);
        rooted(&mut tree, button);
        tree.request_focus(button);
        let mut state = DispatcherState::new();

        let mut press = down(keycodes::KEYCODE_DPAD_RIGHT);
        assert!(!tree.dispatch_key_event(&mut press, &mut state));
    }

    #[test]
    fn empty_tree_handles_nothing() {
        let mut tree = ViewTree::new();
        let mut state = DispatcherState::new();
        let mut press = down(keycodes::KEYCODE_ENTER);
        assert!(!tree.dispatch_key_event(&mut press, &mut state));
    }
}
