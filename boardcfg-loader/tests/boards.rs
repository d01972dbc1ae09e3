//! Loading the board definitions shipped in `boards/`

use std::path::{Path, PathBuf};
use std::thread;

use boardcfg_core::boards::spotpear_c3;
use boardcfg_core::config::{DisplayController, PinConfig};
use boardcfg_core::{mcu, validate, PeripheralKind, Registry};
use boardcfg_loader::header::parse_board_header;
use boardcfg_loader::toml::parse_board_toml;
use boardcfg_loader::{build_registry, bundle, load_board_dir, load_board_file};
use static_cell::StaticCell;

fn boards_dir() -> PathBuf {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../boards")).to_path_buf()
}

fn pin(board: &boardcfg_core::BoardDescriptor, peripheral: &str, role: &str) -> Option<u8> {
    board
        .find_peripheral(peripheral)?
        .config()
        .pin(role)
        .map(|p| p.pin)
}

#[test]
fn spotpear_header_keeps_commented_display() {
    let board = load_board_file(&boards_dir().join("SPOTPEARC3/mpconfigboard.h")).unwrap();

    assert_eq!(board.identifier.as_str(), "SPOTPEARC3");
    assert_eq!(board.board_name(), Some("Spotpear C3-1.44 MiniTV"));
    assert_eq!(board.mcu_name(), Some("ESP32C3"));
    assert_eq!(board.find_feature("sdcard").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(board.find_feature("i2s").and_then(|v| v.as_bool()), Some(false));

    let display = board.find_peripheral("display").unwrap();
    assert!(!display.is_enabled());
    assert_eq!(display.kind(), PeripheralKind::Display);
    assert_eq!(pin(&board, "display", "sck"), Some(3));
    assert_eq!(pin(&board, "display", "mosi"), Some(4));
    assert_eq!(pin(&board, "display", "cs"), Some(2));
    assert_eq!(pin(&board, "display", "dc"), Some(0));
    assert_eq!(pin(&board, "display", "rst"), Some(5));

    let c3 = mcu::profile("ESP32C3").unwrap();
    assert_eq!(validate(&board, &c3), Ok(()));
}

#[test]
fn header_and_toml_describe_the_same_board() {
    let header = std::fs::read_to_string(boards_dir().join("SPOTPEARC3/mpconfigboard.h")).unwrap();
    let from_header = parse_board_header("SPOTPEARC3", &header).unwrap();

    let from_toml = parse_board_toml(
        r#"
identifier = "SPOTPEARC3"
board_name = "Spotpear C3-1.44 MiniTV"
mcu_name = "ESP32C3"

[features]
sdcard = false
i2s = false

[peripheral.display]
enabled = false
mosi = 4
sck = 3
cs = 2
dc = 0
rst = 5
"#,
        "unused",
    )
    .unwrap();

    assert_eq!(from_header, from_toml);
}

#[test]
fn lcd_variant_enables_display() {
    let board = load_board_file(&boards_dir().join("SPOTPEARC3_LCD.toml")).unwrap();

    assert_eq!(board.identifier.as_str(), "SPOTPEARC3_LCD");
    assert!(board.find_peripheral("display").unwrap().is_enabled());
    assert_eq!(
        board.find_peripheral("button1").unwrap().config().pin("pin"),
        Some(&PinConfig::with_pullup(8))
    );

    let display = board.display.unwrap();
    assert_eq!(display.controller, DisplayController::St7735);
    assert_eq!((display.width, display.height), (128, 128));
}

#[test]
fn boards_directory_registers_cleanly() {
    let (boards, failed) = load_board_dir(&boards_dir()).unwrap();
    assert!(failed.is_empty(), "failed: {:?}", failed);
    let (registry, rejected) = build_registry(boards);

    assert!(rejected.is_empty(), "rejected: {:?}", rejected);
    assert_eq!(
        registry.identifiers().collect::<Vec<_>>(),
        ["SPOTPEARC3", "SPOTPEARC3_LCD"]
    );
}

#[test]
fn bundle_preserves_registry_contents() {
    let (boards, _) = load_board_dir(&boards_dir()).unwrap();
    let bytes = bundle::encode(&boards).unwrap();
    let decoded = bundle::decode(&bytes).unwrap();
    assert_eq!(decoded, boards);

    let (registry, rejected) = build_registry(decoded);
    assert!(rejected.is_empty());
    assert_eq!(registry.len(), 2);
}

#[test]
fn built_in_table_matches_header_facts() {
    let header = load_board_file(&boards_dir().join("SPOTPEARC3/mpconfigboard.h")).unwrap();
    let builtin = spotpear_c3().unwrap();

    assert_eq!(header.board_name(), builtin.board_name());
    assert_eq!(header.mcu_name(), builtin.mcu_name());
    for role in ["sck", "mosi", "cs", "dc", "rst"] {
        assert_eq!(pin(&header, "display", role), pin(&builtin, "display", role));
    }
}

#[test]
fn frozen_registry_is_shared_across_threads() {
    static REGISTRY: StaticCell<Registry> = StaticCell::new();

    let (boards, _) = load_board_dir(&boards_dir()).unwrap();
    let (registry, rejected) = build_registry(boards);
    assert!(rejected.is_empty());
    let registry: &'static Registry = registry.freeze(&REGISTRY).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let board = registry.lookup("SPOTPEARC3").unwrap();
                assert_eq!(board.mcu_name(), Some("ESP32C3"));
                assert!(registry.lookup("SPOTPEARC3_LCD").is_ok());
                assert!(registry.lookup("NOPE").is_err());
            });
        }
    });

    assert!(Registry::new().freeze(&REGISTRY).is_err());
}
