//! State file lifecycle: create, load, run, update, reload.

use bitnigma::store::{self, MachineState};
use bitnigma::{
    BitnigmaError, ConfigBuilder, Machine, Mode, PartialSave, RotorSetting, RunOutcome,
    SaveReport, StateStore, WiringCatalog,
};
use tempfile::TempDir;

fn catalog() -> WiringCatalog {
    WiringCatalog::historical().expect("historical catalog is valid")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn classic_config(catalog: &WiringCatalog) -> bitnigma::MachineConfiguration {
    ConfigBuilder::new(Mode::Classic)
        .rotors(["enig1", "enig2", "enig3"].map(RotorSetting::new))
        .reflector("ref-b")
        .plug_letters(&["AQ", "PL"])
        .unwrap()
        .build(catalog)
        .unwrap()
}

#[test]
fn create_load_round_trip() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog);

    let config = classic_config(&catalog);
    store.create(&path, &config).unwrap();
    assert_eq!(store.load(&path).unwrap(), config);
}

#[test]
fn create_refuses_to_clobber() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog);
    let config = classic_config(&catalog);

    store.create(&path, &config).unwrap();
    let err = store.create(&path, &config).unwrap_err();
    assert!(matches!(err, BitnigmaError::StateIo { .. }));
}

#[test]
fn update_persists_final_positions() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog);
    store.create(&path, &classic_config(&catalog)).unwrap();

    // First session.
    let mut machine = Machine::new(store.load(&path).unwrap());
    let mut stream = machine.stream(b"HELLO".iter().copied());
    let first: Vec<u8> = stream.by_ref().collect();
    let outcome = stream.outcome();
    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(
        store.update(&path, &machine, outcome).unwrap(),
        SaveReport::Saved
    );

    // Second session continues where the first stopped.
    let mut resumed = Machine::new(store.load(&path).unwrap());
    assert_eq!(resumed.positions(), vec![0, 0, 5]);
    let second = resumed.encipher_chunk(b"WORLD");

    let mut straight = Machine::new(classic_config(&catalog));
    let expected = straight.encipher_chunk(b"HELLOWORLD");
    assert_eq!([first, second].concat(), expected);
}

#[test]
fn aborted_run_is_skipped_by_default() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog);
    store.create(&path, &classic_config(&catalog)).unwrap();

    let mut machine = Machine::new(store.load(&path).unwrap());
    let mut stream = machine.stream(b"ABCDEF".iter().copied());
    stream.next();
    stream.next();
    let outcome = stream.outcome();
    assert_eq!(outcome, RunOutcome::Aborted);

    assert_eq!(
        store.update(&path, &machine, outcome).unwrap(),
        SaveReport::Skipped
    );
    assert_eq!(store.load(&path).unwrap().positions(), vec![0, 0, 0]);
}

#[test]
fn aborted_run_can_be_flagged_partial() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog).with_partial_save(PartialSave::Flagged);
    store.create(&path, &classic_config(&catalog)).unwrap();

    let mut machine = Machine::new(store.load(&path).unwrap());
    let mut chunks = machine.chunks([b"ABC".to_vec(), b"DEF".to_vec()]);
    chunks.next();
    let outcome = chunks.outcome();

    assert_eq!(
        store.update(&path, &machine, outcome).unwrap(),
        SaveReport::SavedPartial
    );
    let err = store.load(&path).unwrap_err();
    assert!(matches!(err, BitnigmaError::PartialState { .. }));
    assert_eq!(store.load_partial(&path).unwrap().positions(), vec![0, 0, 3]);
}

#[test]
fn load_reports_bad_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();

    let mut state = classic_config(&catalog).to_state();
    state.rotors[1].ring = 40;
    std::fs::write(&path, store::encode(&state).unwrap()).unwrap();

    let err = StateStore::new(&catalog).load(&path).unwrap_err();
    match err {
        BitnigmaError::StateParse { field, .. } => assert_eq!(field, "rotors[1].ring"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn load_rejects_unknown_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("machine.state");
    let catalog = catalog();

    let mut state: MachineState = classic_config(&catalog).to_state();
    state.version = 99;
    std::fs::write(&path, store::encode(&state).unwrap()).unwrap();

    let err = StateStore::new(&catalog).load(&path).unwrap_err();
    assert!(matches!(err, BitnigmaError::StateParse { ref field, .. } if field == "version"));
}

#[test]
fn load_missing_file() {
    let dir = TempDir::new().unwrap();
    let catalog = catalog();
    let err = StateStore::new(&catalog)
        .load(dir.path().join("absent.state"))
        .unwrap_err();
    assert!(matches!(err, BitnigmaError::StateIo { .. }));
}

#[test]
fn seeded_state_survives_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("seeded.state");
    let catalog = catalog();
    let store = StateStore::new(&catalog);

    let config = store.seed("TEST", Mode::Byte).unwrap();
    store.create(&path, &config).unwrap();
    let loaded = store.load(&path).unwrap();
    assert_eq!(loaded, config);

    let data: Vec<u8> = (0..=255).collect();
    let cipher = Machine::new(config).encipher_chunk(&data);
    assert_eq!(Machine::new(loaded).encipher_chunk(&cipher), data);
}
