use std::fs;

use tempfile::tempdir;

use typerace::{
    artifact::CsvArtifactGenerator,
    matcher::Key,
    paragraphs::FixedParagraph,
    race::Race,
    report_store::ReportStore,
    session::Keystroke,
    sound::Silent,
    Gamemode,
};

fn type_str(race: &mut Race, s: &str) -> bool {
    let mut finished = false;
    for c in s.chars() {
        finished = race.handle_key(Keystroke::now(Key::Char(c)));
    }
    finished
}

#[test]
fn finished_race_is_stored_and_exported() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("state").join("results.db");
    let out_dir = dir.path().join("artifacts");

    let mut race = Race::start(
        Gamemode::Standard,
        Box::new(FixedParagraph::new("one two")),
        Box::new(ReportStore::open(&db_path).unwrap()),
        Some(Box::new(CsvArtifactGenerator::new(&db_path, &out_dir))),
        Box::new(Silent),
    )
    .unwrap();

    assert!(type_str(&mut race, "one two"));

    let id = race.session_id().expect("session stored");
    assert!(race.notice().is_none());
    assert!(race
        .artifact_message()
        .unwrap()
        .starts_with("word timings saved to"));

    let store = ReportStore::open(&db_path).unwrap();
    let stored = store.load_report(id).unwrap().unwrap();
    assert_eq!(&stored, race.last_report().unwrap());

    let csv = fs::read_to_string(out_dir.join(format!("session-{id}.csv"))).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "position,word,begin,end,duration_ms,wpm,mistakes"
    );
    assert_eq!(lines.count(), 2);
}

#[test]
fn leaderboard_only_counts_its_own_mode() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("results.db");

    for (mode, text) in [
        (Gamemode::Standard, "ab"),
        (Gamemode::Standard, "cd"),
        (Gamemode::Hardcore, "ef"),
    ] {
        let mut race = Race::start(
            mode,
            Box::new(FixedParagraph::new(text)),
            Box::new(ReportStore::open(&db_path).unwrap()),
            None,
            Box::new(Silent),
        )
        .unwrap();
        assert!(type_str(&mut race, text));
    }

    let store = ReportStore::open(&db_path).unwrap();
    let standard = store.leaderboard(Gamemode::Standard, 10).unwrap();
    let hardcore = store.leaderboard(Gamemode::Hardcore, 10).unwrap();
    let short = store.leaderboard(Gamemode::Short, 10).unwrap();

    assert_eq!(standard.entries.len(), 2);
    assert!(standard.entries[0].wpm >= standard.entries[1].wpm);
    assert_eq!(standard.average_accuracy, Some(100.0));
    assert_eq!(hardcore.entries.len(), 1);
    assert!(short.entries.is_empty());
    assert_eq!(short.average_wpm, None);
}

#[test]
fn missing_session_fails_artifact_but_keeps_result() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("results.db");
    // the generator reads from a different database than the sink writes to
    let other_db = dir.path().join("other.db");

    let mut race = Race::start(
        Gamemode::Short,
        Box::new(FixedParagraph::new("go")),
        Box::new(ReportStore::open(&db_path).unwrap()),
        Some(Box::new(CsvArtifactGenerator::new(&other_db, dir.path()))),
        Box::new(Silent),
    )
    .unwrap();

    assert!(type_str(&mut race, "go"));

    assert!(race.session_id().is_some());
    assert!(race.last_report().is_some());
    assert!(race.artifact_message().is_none());
    assert!(race.notice().unwrap().starts_with("could not create artifact"));
}
