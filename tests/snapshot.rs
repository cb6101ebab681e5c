//! Captures and restores whole machines through the JSON snapshot format
use chirp8::*;

/// Runs a small program which touches every part of the machine
fn busy_machine() -> Chip8 {
    let mut ch8 = Chip8::with_seed(0xc0ffee);
    ch8.load_program(&[
        0x60, 0x0a, // 200: mov  #0a, v0
        0xf0, 0x29, // 202: font v0, I
        0xd1, 0x25, // 204: draw #5, v1, v2
        0xc3, 0xff, // 206: rand #ff, v3
        0xf0, 0x15, // 208: mov  v0, DT
        0xf0, 0x18, // 20a: mov  v0, ST
        0xa3, 0x00, // 20c: mov  $300, I
        0xf3, 0x55, // 20e: dmao v3
        0x22, 0x14, // 210: call 214
        0x12, 0x12, // 212: jmp  212
        0x12, 0x14, // 214: jmp  214
    ])
    .unwrap();
    ch8.press(0x7).unwrap();
    for _ in 0..12 {
        ch8.step().unwrap();
    }
    ch8.tick();
    ch8
}

#[test]
fn round_trip() {
    let ch8 = busy_machine();
    let snapshot = ch8.capture();
    assert_eq!(1, snapshot.sp);
    assert_eq!(0x214, snapshot.pc);
    assert_eq!(0x212, snapshot.stack[0]);
    assert_eq!(1, snapshot.keypad[7]);
    assert_eq!(9, snapshot.delay_timer);

    let mut other = Chip8::default();
    other.restore(&snapshot).unwrap();
    assert_eq!(snapshot, other.capture());
    assert_eq!(ch8.screen, other.screen);
    assert_eq!(ch8.cpu.state(), other.cpu.state());
}

#[test]
fn round_trip_json() {
    let snapshot = busy_machine().capture();
    for json in [snapshot.to_json().unwrap(), snapshot.to_json_pretty().unwrap()] {
        let decoded = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, decoded);
        let mut ch8 = Chip8::default();
        ch8.restore(&decoded).unwrap();
        assert_eq!(snapshot, ch8.capture());
    }
}

#[test]
fn round_trip_io() {
    let snapshot = busy_machine().capture();
    let mut buffer = vec![];
    snapshot.to_writer(&mut buffer).unwrap();
    assert_eq!(snapshot, Snapshot::from_reader(&buffer[..]).unwrap());
}

#[test]
fn restored_machine_keeps_running() {
    let mut original = busy_machine();
    let mut restored = Chip8::with_seed(0xc0ffee);
    restored.restore(&original.capture()).unwrap();
    for _ in 0..8 {
        original.step().unwrap().tick();
        restored.step().unwrap().tick();
        assert_eq!(original.capture(), restored.capture());
    }
}

#[test]
fn wire_field_names() {
    let json = Chip8::default().capture().to_json().unwrap();
    for field in [
        "pc",
        "index",
        "sp",
        "delayTimer",
        "soundTimer",
        "registers",
        "keypad",
        "stack",
        "memory",
        "video",
    ] {
        assert!(json.contains(&format!("\"{field}\":")), "missing {field}");
    }
}

#[test]
fn malformed_json() {
    assert!(matches!(Snapshot::from_json("{"), Err(Error::Json(_))));
    assert!(matches!(Snapshot::from_json("{\"pc\": 5x}"), Err(Error::Json(_))));
    assert!(matches!(
        Snapshot::from_reader(&b"[1, 2"[..]),
        Err(Error::Json(_))
    ));
}

fn document_error(json: &str) -> String {
    match Snapshot::from_json(json) {
        Err(Error::InvalidSnapshot { field, reason }) => {
            assert_eq!("document", field);
            reason
        }
        other => panic!("expected InvalidSnapshot, got {other:?}"),
    }
}

#[test]
fn wellformed_json_which_isnt_a_snapshot() {
    let json = Chip8::default().capture().to_json().unwrap();
    // Missing fields
    assert!(document_error(r#"{"pc": 512}"#).contains("missing field"));
    // Integers too large for 64 bits
    for huge in ["18446744073709551616", "99999999999999999999"] {
        document_error(&json.replacen("\"pc\":512", &format!("\"pc\":{huge}"), 1));
    }
    // Not integers at all
    document_error(&json.replacen("\"sp\":0", "\"sp\":0.5", 1));
    document_error(&json.replacen("\"sp\":0", "\"sp\":\"0\"", 1));
    // The reader takes the same path
    let huge = json.replacen("\"index\":0", "\"index\":99999999999999999999", 1);
    assert!(matches!(
        Snapshot::from_reader(huge.as_bytes()),
        Err(Error::InvalidSnapshot { field: "document", .. })
    ));
}

#[test]
fn invalid_snapshot_changes_nothing() {
    let mut ch8 = busy_machine();
    let before = ch8.clone();
    let mut snapshot = ch8.capture();
    snapshot.registers = vec![0; 15];
    snapshot.pc = 0x300;
    match ch8.restore(&snapshot).map(|_| ()) {
        Err(Error::InvalidSnapshot { field, .. }) => assert_eq!("registers", field),
        other => panic!("{other:?}"),
    }
    assert_eq!(before, ch8);
}

#[test]
fn restore_releases_keypause() {
    let mut ch8 = Chip8::default();
    ch8.load_program(&[0xf0, 0x0a]).unwrap();
    ch8.step().unwrap();
    assert!(ch8.cpu.flags.is_waiting());
    let snapshot = ch8.capture();
    ch8.restore(&snapshot).unwrap();
    assert!(!ch8.cpu.flags.is_waiting());
    // and the wait simply starts again
    ch8.step().unwrap();
    assert!(ch8.cpu.flags.is_waiting());
    assert_eq!(0x200, ch8.cpu.pc());
}
