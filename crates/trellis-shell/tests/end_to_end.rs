//! Whole-stack tests: scripted raw records through the reader thread,
//! the device queues and the window, out to a surface.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use trellis_input::{keycodes, InputConfig, KeyAction, MotionAction, RawRecord};
use trellis_shell::{Shell, ShellConfig};
use trellis_testing::{ScriptedInput, TestClock, TestSurface};
use trellis_view::EmptyWidget;

fn fast_config() -> ShellConfig {
    ShellConfig {
        poll_interval: Duration::ZERO,
        input: InputConfig {
            poll_interval: Duration::from_millis(1),
            ..InputConfig::default()
        },
        ..ShellConfig::default()
    }
}

#[test]
fn a_scripted_tap_lands_as_a_click_and_a_frame() {
    let surface = TestSurface::new(200, 100);
    let probe = surface.probe();
    let clock = Arc::new(TestClock::new(0));
    let mut shell = Shell::with_config(Box::new(surface), clock, fast_config());

    let clicks = Rc::new(RefCell::new(0u32));
    let sink = clicks.clone();
    shell.with_window(|window| {
        let root = window.tree_mut().create_view(Box::new(EmptyWidget));
        window.set_content(root).unwrap();
        window
            .tree_mut()
            .add_click_listener(root, move |_, _| *sink.borrow_mut() += 1);
    });

    shell
        .attach_input(Box::new(ScriptedInput::new(vec![
            RawRecord::DeviceAdded { device_id: 7 },
            RawRecord::Pointer {
                device_id: 7,
                action: MotionAction::Down as u32,
                x: 20.0,
                y: 20.0,
                time: 5,
            },
            RawRecord::Pointer {
                device_id: 7,
                action: MotionAction::Up as u32,
                x: 20.0,
                y: 20.0,
                time: 80,
            },
        ])))
        .unwrap();

    let done = clicks.clone();
    assert!(shell.run_until(100_000, || *done.borrow() > 0));
    assert!(!probe.flips().is_empty());
    shell.shutdown();
}

#[test]
fn scripted_tabs_walk_focus_through_the_stack() {
    let surface = TestSurface::new(200, 100);
    let clock = Arc::new(TestClock::new(0));
    let mut shell = Shell::with_config(Box::new(surface), clock, fast_config());

    let (_first, second) = shell.with_window(|window| {
        let tree = window.tree_mut();
        let root = tree.create_view(Box::new(EmptyWidget));
        let first = tree.create_view(Box::new(EmptyWidget));
        let second = tree.create_view(Box::new(EmptyWidget));
        tree.add_child(root, first).unwrap();
        tree.add_child(root, second).unwrap();
        tree.set_focusable(first, true);
        tree.set_focusable(second, true);
        window.set_content(root).unwrap();
        (first, second)
    });

    let tab_down = |time| RawRecord::Key {
        device_id: 3,
        action: KeyAction::Down,
        keycode: keycodes::KEYCODE_TAB,
        repeat: 0,
        meta_state: 0,
        time,
    };
    let tab_up = |time| RawRecord::Key {
        device_id: 3,
        action: KeyAction::Up,
        keycode: keycodes::KEYCODE_TAB,
        repeat: 0,
        meta_state: 0,
        time,
    };
    shell
        .attach_input(Box::new(ScriptedInput::batches(vec![
            vec![tab_down(10), tab_up(60)],
            vec![tab_down(200), tab_up(260)],
        ])))
        .unwrap();

    let window = shell.window();
    let landed = window.clone();
    assert!(shell.run_until(100_000, move || {
        landed.borrow().tree().focused_view() == Some(second)
    }));
    assert_eq!(window.borrow().tree().focused_view(), Some(second));
    shell.shutdown();
}
