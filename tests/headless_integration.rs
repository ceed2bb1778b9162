use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use typerace::{
    paragraphs::FixedParagraph,
    race::Race,
    report_store::DiscardSink,
    runtime::{keystroke_from, FixedTicker, RaceEvent, Runner, TestEventSource},
    sound::Silent,
    Gamemode,
};

fn race(text: &str, mode: Gamemode) -> Race {
    Race::start(
        mode,
        Box::new(FixedParagraph::new(text)),
        Box::new(DiscardSink::default()),
        None,
        Box::new(Silent),
    )
    .unwrap()
}

fn send_str(tx: &mpsc::Sender<RaceEvent>, s: &str) {
    for c in s.chars() {
        tx.send(RaceEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
            .unwrap();
    }
}

/// Pump the runner until the race finishes or the step budget runs out.
fn drive(race: &mut Race, runner: &Runner<TestEventSource, FixedTicker>, steps: u32) -> bool {
    for _ in 0..steps {
        match runner.step() {
            RaceEvent::Tick => {
                race.on_tick(Local::now());
            }
            RaceEvent::Resize => {}
            RaceEvent::Key(key) => {
                if let Some(keystroke) = keystroke_from(key) {
                    if race.handle_key(keystroke) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

#[test]
fn headless_typing_flow_completes() {
    let mut race = race("hi", Gamemode::Standard);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    send_str(&tx, "hi");

    assert!(drive(&mut race, &runner, 100), "race should have finished");

    let report = race.last_report().unwrap();
    assert_eq!(report.typed_char_count, 2);
    assert_eq!(report.wrongful_char_count, 0);
    assert_eq!(report.accuracy(), 100.0);
    assert!(report.wpm() >= 0.0);
}

#[test]
fn headless_corrected_mistake_is_counted_once() {
    let mut race = race("cat dog", Gamemode::Standard);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    send_str(&tx, "cx");
    tx.send(RaceEvent::Key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE)))
        .unwrap();
    send_str(&tx, "at dog");

    assert!(drive(&mut race, &runner, 100));

    let report = race.last_report().unwrap();
    assert_eq!(report.typed_word_count, 2);
    assert_eq!(report.wrongful_char_count, 1);
    assert_eq!(report.per_word_timing[0].mistake_count, 1);
    assert_eq!(report.per_word_timing[1].mistake_count, 0);
}

#[test]
fn headless_hardcore_ends_on_first_mistake() {
    let mut race = race("abc", Gamemode::Hardcore);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    send_str(&tx, "x");

    assert!(drive(&mut race, &runner, 50));
    assert!(race.is_finished());

    // input after the finish is ignored
    send_str(&tx, "abc");
    assert!(!drive(&mut race, &runner, 10));
    assert_eq!(race.session().state().cursor, 1);
}

#[test]
fn headless_ticks_without_input_leave_clock_stopped() {
    let mut race = race("hello", Gamemode::Short);

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    assert!(!drive(&mut race, &runner, 5));
    assert!(!race.session().clock().is_started());
    assert_eq!(race.elapsed_secs(), 0);
}

#[test]
fn headless_control_chords_are_not_typed() {
    let mut race = race("ab", Gamemode::Standard);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );
    tx.send(RaceEvent::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)))
        .unwrap();
    tx.send(RaceEvent::Resize).unwrap();

    assert!(!drive(&mut race, &runner, 5));
    assert_eq!(race.session().state().cursor, 0);
}
