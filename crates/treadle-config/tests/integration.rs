//! Integration tests for an on-disk treadle installation.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use treadle_config::{
    BoardList, ConfigError, DaemonConfig, DirectorySource, Layout, read_active_preset, select_board,
    write_active_preset,
};
use treadle_core::{MemoryGraph, PresetName, PresetStore, RoutingEngine};

/// Creates `<root>/PEDALS` with pedal files, a board list and A/B/C links.
fn install(root: &Path) -> Layout {
    let layout = Layout::new(root);
    fs::create_dir_all(layout.pedals_dir()).unwrap();
    fs::write(layout.pedal_path("Clean"), "system:capture_1 system:playback_1\n").unwrap();
    fs::write(
        layout.pedal_path("Fuzz"),
        "system:capture_1 fuzz:in\nfuzz:out system:playback_1\n",
    )
    .unwrap();
    fs::write(layout.pedal_path("Mute"), "# silence\n").unwrap();
    fs::write(
        layout.board_list_path(),
        "# boards\nstandard: Clean Fuzz Mute\nloud: Fuzz Fuzz Fuzz\nghost: Clean Missing\n",
    )
    .unwrap();

    let list = BoardList::load(layout.board_list_path()).unwrap();
    select_board(&layout, list.get("standard").unwrap()).unwrap();
    layout
}

#[test]
fn test_board_links_feed_the_store() {
    let temp = TempDir::new().unwrap();
    let layout = install(temp.path());

    let store = PresetStore::load(&DirectorySource::from_layout(&layout)).unwrap();
    assert_eq!(store.get(PresetName::A).len(), 1);
    assert_eq!(store.get(PresetName::B).len(), 2);
    assert!(store.get(PresetName::C).is_empty());
    assert_eq!(
        fs::read_link(layout.definition_path(PresetName::B)).unwrap(),
        Path::new("Fuzz")
    );
}

#[test]
fn test_select_board_then_reload() {
    let temp = TempDir::new().unwrap();
    let layout = install(temp.path());
    let source = DirectorySource::from_layout(&layout);

    let mut engine = RoutingEngine::new(MemoryGraph::new(), PresetStore::load(&source).unwrap());
    engine.select(PresetName::A).unwrap();

    let list = BoardList::load(layout.board_list_path()).unwrap();
    select_board(&layout, list.get("loud").unwrap()).unwrap();
    let outcome = engine.reload(&source).unwrap();
    assert_eq!(outcome.changed, vec![PresetName::A, PresetName::C]);

    // Graph still carries the old A until the next switch.
    assert!(engine.graph().links().contains(&(
        "system:capture_1".to_string(),
        "system:playback_1".to_string()
    )));
    engine.select(PresetName::B).unwrap();
    assert_eq!(engine.graph().links().len(), 2);
}

#[test]
fn test_board_with_missing_pedal_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let layout = install(temp.path());
    let list = BoardList::load(layout.board_list_path()).unwrap();

    let err = select_board(&layout, list.get("ghost").unwrap()).unwrap_err();
    assert!(matches!(err, ConfigError::PedalNotFound { ref board, .. } if board == "ghost"));
    assert_eq!(
        fs::read_link(layout.definition_path(PresetName::A)).unwrap(),
        Path::new("Clean")
    );
}

#[test]
fn test_active_preset_file_in_layout() {
    let temp = TempDir::new().unwrap();
    let layout = install(temp.path());
    write_active_preset(layout.active_preset_path(), PresetName::B).unwrap();
    assert_eq!(
        read_active_preset(layout.active_preset_path()).unwrap(),
        Some(PresetName::B)
    );
}

#[test]
fn test_config_file_roundtrip_on_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/treadle.toml");
    let config = DaemonConfig {
        root: Some(temp.path().to_path_buf()),
        heartbeat_secs: 7,
        ..DaemonConfig::default()
    };
    config.save(&path).unwrap();

    let (loaded, found) = DaemonConfig::discover(Some(&path)).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(found.as_deref(), Some(path.as_path()));
    assert_eq!(loaded.layout().root(), temp.path());
}

#[test]
fn test_explicit_missing_config_is_error() {
    let temp = TempDir::new().unwrap();
    let err = DaemonConfig::discover(Some(&temp.path().join("absent.toml"))).unwrap_err();
    assert!(err.is_not_found());
}
