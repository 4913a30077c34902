use promptdeck_core::hotkey_runtime::{
    HotkeyRegistrar, HotkeyRegistration, HotkeyRuntimeError, MockHotkeyRegistrar,
};

#[test]
fn mock_registrar_tracks_registrations() {
    let mut registrar = MockHotkeyRegistrar::default();

    let first = registrar.register_hotkey("ctrl+b").unwrap();
    let second = registrar.register_hotkey("ctrl+alt+1").unwrap();
    assert_eq!(registrar.registrations(), ["ctrl+b", "ctrl+alt+1"]);

    assert_eq!(first, HotkeyRegistration::Noop("ctrl+b".to_string()));
    assert_eq!(second, HotkeyRegistration::Noop("ctrl+alt+1".to_string()));
}

#[test]
fn unregister_releases_only_the_named_chord() {
    let mut registrar = MockHotkeyRegistrar::default();
    registrar.register_hotkey("ctrl+b").unwrap();
    let kept = registrar.register_hotkey("ctrl+alt+1").unwrap();

    registrar
        .unregister_hotkey(&HotkeyRegistration::Noop("ctrl+b".to_string()))
        .unwrap();
    assert_eq!(registrar.registrations(), ["ctrl+alt+1"]);

    registrar.unregister_hotkey(&kept).unwrap();
    assert!(registrar.registrations().is_empty());
}

#[test]
fn unregister_all_clears_every_registration() {
    let mut registrar = MockHotkeyRegistrar::default();
    registrar.register_hotkey("ctrl+b").unwrap();
    registrar.register_hotkey("ctrl+alt+1").unwrap();

    registrar.unregister_all().unwrap();
    assert!(registrar.registrations().is_empty());
}

#[test]
fn registrar_rejects_chords_without_a_modifier() {
    let mut registrar = MockHotkeyRegistrar::default();
    match registrar.register_hotkey("b") {
        Err(HotkeyRuntimeError::InvalidChord(_)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(registrar.registrations().is_empty());
}

#[cfg(not(target_os = "windows"))]
mod non_windows {
    use promptdeck_core::hotkey_runtime::{default_hotkey_registrar, run_message_loop};

    use super::{HotkeyRegistrar, HotkeyRuntimeError};

    #[test]
    fn default_registrar_accepts_chords_without_os_side_effects() {
        let mut registrar = default_hotkey_registrar();
        registrar.register_hotkey("ctrl+b").unwrap();
        registrar.unregister_all().unwrap();
    }

    #[test]
    fn message_loop_reports_the_platform_as_unsupported() {
        let result = run_message_loop(|_| {});
        assert_eq!(result, Err(HotkeyRuntimeError::UnsupportedPlatform));
    }
}
