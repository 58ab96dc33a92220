use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typometer::clock::ManualClock;
use typometer::runtime::{key_input, AppEvent, FixedTicker, Runner, TestEventSource};
use typometer::session::{Session, Status};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn send_text(tx: &mpsc::Sender<AppEvent>, text: &str) {
    for c in text.chars() {
        tx.send(AppEvent::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::NONE,
        )))
        .unwrap();
    }
}

// Headless integration using the runtime and a Session without a TTY
#[test]
fn headless_typing_flow_completes() {
    let clock = ManualClock::new();
    let mut session = Session::start_with_clock(words(&["cat", "dog"]), clock.clone()).unwrap();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    send_text(&tx, "cat dog");

    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick => {
                session.tick();
            }
            AppEvent::Resize => {}
            AppEvent::Closed => break,
            AppEvent::Key(key) => {
                if let Some(input) = key_input(&key) {
                    clock.advance(Duration::from_secs(1));
                    session.on_key(input);
                    if session.has_finished() {
                        break;
                    }
                }
            }
        }
    }

    assert_eq!(session.status(), Status::Finished);
    let result = session.finalize().unwrap();
    assert_eq!(result.correct_chars, 7);
    assert_eq!(result.correct_words, 2);
    assert_eq!(result.accuracy, 100.0);
    // first key starts the clock, six more seconds to finish
    assert_eq!(result.elapsed, Duration::from_secs(6));
    assert_eq!(result.cpm, 70.0);
}

#[test]
fn headless_session_times_out_on_tick() {
    let clock = ManualClock::new();
    let mut session = Session::start_with_clock(words(&["casa", "gato"]), clock.clone())
        .unwrap()
        .with_duration_limit(Duration::from_secs(3));

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    send_text(&tx, "cas");

    for _ in 0..50u32 {
        match runner.step() {
            AppEvent::Key(key) => {
                if let Some(input) = key_input(&key) {
                    session.on_key(input);
                }
            }
            AppEvent::Tick => {
                clock.advance(Duration::from_millis(500));
                session.tick();
                if session.has_finished() {
                    break;
                }
            }
            AppEvent::Resize => {}
            AppEvent::Closed => break,
        }
    }

    assert!(session.has_finished());
    let result = session.finalize().unwrap();
    assert_eq!(result.elapsed, Duration::from_secs(3));
    assert_eq!(result.correct_chars, 3);
    assert_eq!(result.correct_words, 0);
    assert_eq!(result.cpm, 60.0);
}

#[test]
fn headless_modified_keys_are_not_typed() {
    let mut session = Session::start(words(&["hi"])).unwrap();

    let ctrl_h = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::CONTROL);
    assert!(key_input(&ctrl_h).is_none());

    let plain = KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE);
    session.on_key(key_input(&plain).unwrap());
    assert_eq!(session.typed_text(), "h");
    assert_eq!(session.status(), Status::Running);
}
