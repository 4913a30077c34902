use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use promptdeck_core::config::Config;
use promptdeck_core::hotkey_runtime::MockHotkeyRegistrar;
use promptdeck_core::model::Prompt;
use promptdeck_core::registry::HotkeyRegistry;
use promptdeck_core::runtime::{self, register_startup_bindings, RuntimeOptions};
use promptdeck_core::store::PromptStore;

fn temp_base(tag: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("promptdeck-runtime-{tag}-{unique}"))
}

fn test_config(base: &PathBuf) -> Config {
    Config {
        data_dir: base.join("data"),
        include_subdirs: true,
        record_extension: ".json".to_string(),
        global_hotkey: "ctrl+b".to_string(),
        config_path: base.join("user_config.json"),
    }
}

fn prompt_with_shortcut(name: &str, chord: &str) -> Prompt {
    let mut prompt = Prompt::with_basics(name, "content", "common");
    prompt.shortcut = chord.to_string();
    prompt
}

#[test]
fn startup_pass_registers_global_ambient_and_slot_chords() {
    let base = temp_base("startup");
    let config = test_config(&base);
    let store = PromptStore::open(&config).unwrap();

    store
        .create("Alpha", &prompt_with_shortcut("Alpha", "ctrl+alt+a"))
        .unwrap();
    store
        .create("Bravo", &prompt_with_shortcut("Bravo", "Control + Alt + B"))
        .unwrap();
    // No shortcut; must not be registered.
    store
        .create("Plain", &Prompt::with_basics("Plain", "content", "common"))
        .unwrap();

    let bindings_path = base.join("hotkey_bindings.json");
    std::fs::write(
        &bindings_path,
        r#"{"2": {"hotkey": "ctrl+alt+2", "filename": "Alpha.json"}}"#,
    )
    .unwrap();

    let mut registry = HotkeyRegistry::new(Box::new(MockHotkeyRegistrar::default()), bindings_path);
    register_startup_bindings(&mut registry, &config, &store);

    let mut chords = registry.registered_chords();
    chords.sort();
    assert_eq!(chords, vec!["ctrl+alt+2", "ctrl+alt+a", "ctrl+alt+b", "ctrl+b"]);
}

#[test]
fn startup_pass_skips_conflicting_and_invalid_chords() {
    let base = temp_base("conflicts");
    let config = test_config(&base);
    let store = PromptStore::open(&config).unwrap();

    // Collides with the global default; registration order is sorted by id,
    // so the global chord wins and this record is skipped.
    store
        .create("Clash", &prompt_with_shortcut("Clash", "CTRL+B"))
        .unwrap();
    store
        .create("Broken", &prompt_with_shortcut("Broken", "not-a-chord"))
        .unwrap();
    store
        .create("Fine", &prompt_with_shortcut("Fine", "ctrl+alt+f"))
        .unwrap();

    let mut registry = HotkeyRegistry::new(
        Box::new(MockHotkeyRegistrar::default()),
        base.join("hotkey_bindings.json"),
    );
    register_startup_bindings(&mut registry, &config, &store);

    let mut chords = registry.registered_chords();
    chords.sort();
    assert_eq!(chords, vec!["ctrl+alt+f", "ctrl+b"]);
}

// The only test in this file allowed to touch process environment.
#[test]
fn startup_without_listener_writes_the_default_config_and_exits() {
    let home = temp_base("home");
    std::env::set_var("PROMPTDECK_HOME", &home);

    let base = temp_base("headless");
    let config_path = base.join("user_config.json");
    let options = RuntimeOptions {
        config_path: Some(config_path.clone()),
        run_listener: false,
    };

    runtime::run_with_options(options).unwrap();
    assert!(config_path.exists());

    std::env::remove_var("PROMPTDECK_HOME");
}

#[cfg(not(target_os = "windows"))]
#[test]
fn listener_thread_exits_cleanly_where_hotkeys_are_unsupported() {
    use promptdeck_core::runtime::HotkeyListener;
    use promptdeck_core::service::PromptService;

    let base = temp_base("listener");
    let config = test_config(&base);
    let service = PromptService::new(config.clone()).unwrap();

    let listener = HotkeyListener::spawn(config, service);
    listener.join().unwrap();
}
