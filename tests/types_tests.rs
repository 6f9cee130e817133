//! Type System Tests
//!
//! Tests for the shared pin, state and indicator types.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test types_tests

use nrf24_firmware::types::{Edge, LedChannels, LedColor, PinId, Port, SharedSystemState, SystemState};

// ============================================================================
// PinId Tests
// ============================================================================

#[test]
fn pin_id_accessors() {
    let pin = PinId::new(Port::C, 7);
    assert_eq!(pin.port(), Port::C);
    assert_eq!(pin.pin(), 7);
    assert_eq!(pin.mask(), 0x0080);
}

#[test]
fn pin_id_masks_pin_number() {
    let pin = PinId::new(Port::A, 0x13);
    assert_eq!(pin.pin(), 3);
}

#[test]
fn pin_id_display() {
    assert_eq!(PinId::new(Port::B, 0).to_string(), "PB0");
    assert_eq!(format!("{:?}", PinId::new(Port::C, 13)), "PC13");
}

#[test]
fn port_index_follows_exti_mux() {
    assert_eq!(Port::A.index(), 0);
    assert_eq!(Port::C.index(), 2);
    assert_eq!(Port::G.index(), 6);
}

#[test]
fn edge_trigger_bits() {
    assert!(Edge::Falling.falling());
    assert!(!Edge::Falling.rising());
    assert!(Edge::Rising.rising());
    assert!(!Edge::Rising.falling());
    assert!(Edge::Both.falling() && Edge::Both.rising());
}

// ============================================================================
// SystemState Tests
// ============================================================================

#[test]
fn system_state_default_is_normal() {
    assert_eq!(SystemState::default(), SystemState::Normal);
}

#[test]
fn system_state_raw_values() {
    assert_eq!(SystemState::Normal.as_raw(), 0);
    assert_eq!(SystemState::Warning.as_raw(), 1);
    assert_eq!(SystemState::Fail.as_raw(), 2);
    assert_eq!(SystemState::from_raw(1), SystemState::Warning);
}

#[test]
fn unknown_raw_state_is_fail() {
    assert_eq!(SystemState::from_raw(3), SystemState::Fail);
    assert_eq!(SystemState::from_raw(0xFF), SystemState::Fail);
}

#[test]
fn system_state_display() {
    assert_eq!(SystemState::Normal.to_string(), "NORMAL");
    assert_eq!(SystemState::Warning.to_string(), "WARNING");
    assert_eq!(SystemState::Fail.to_string(), "FAIL");
}

#[test]
fn shared_state_set_returns_previous() {
    let shared = SharedSystemState::new(SystemState::Normal);
    assert_eq!(shared.set(SystemState::Warning), SystemState::Normal);
    assert_eq!(shared.set(SystemState::Fail), SystemState::Warning);
    assert_eq!(shared.get(), SystemState::Fail);
}

#[test]
fn shared_state_default_is_normal() {
    assert_eq!(SharedSystemState::default().get(), SystemState::Normal);
}

// ============================================================================
// LED Color Tests
// ============================================================================

#[test]
fn color_bits_match_board_wiring() {
    assert_eq!(LedColor::Off.bits(), 0x00);
    assert_eq!(LedColor::Red.bits(), 0x02);
    assert_eq!(LedColor::Blue.bits(), 0x04);
    assert_eq!(LedColor::Green.bits(), 0x08);
    assert_eq!(LedColor::ALL_BITS, 0x0E);
}

#[test]
fn yellow_is_red_plus_green() {
    assert_eq!(LedColor::Yellow.bits(), LedColor::Red.bits() | LedColor::Green.bits());
}

#[test]
fn channels_from_bits_drops_unknown_bits() {
    assert_eq!(LedChannels::from_bits(0xFF).bits(), LedColor::ALL_BITS);
    assert_eq!(LedChannels::from_bits(0x01), LedChannels::OFF);
}

#[test]
fn channels_toggle_only_touches_color() {
    let start = LedChannels::from_color(LedColor::Blue);
    let toggled = start.toggle(LedColor::Red);
    assert!(toggled.blue());
    assert!(toggled.red());
    assert!(!toggled.green());
}

#[test]
fn channels_contains() {
    let yellow = LedChannels::from_color(LedColor::Yellow);
    assert!(yellow.contains(LedColor::Red));
    assert!(yellow.contains(LedColor::Green));
    assert!(yellow.contains(LedColor::Off));
    assert!(!yellow.contains(LedColor::Blue));
}

#[test]
fn channels_named_color() {
    for color in [LedColor::Off, LedColor::Red, LedColor::Blue, LedColor::Green, LedColor::Yellow] {
        assert_eq!(LedChannels::from_color(color).color(), Some(color));
    }
    assert_eq!(LedChannels::from_bits(0x0E).color(), None);
}

#[test]
fn channels_debug_shows_bits() {
    assert_eq!(format!("{:?}", LedChannels::from_color(LedColor::Yellow)), "LedChannels(0x0a)");
}
