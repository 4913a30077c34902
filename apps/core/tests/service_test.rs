use std::time::{SystemTime, UNIX_EPOCH};

use promptdeck_core::config::Config;
use promptdeck_core::model::Prompt;
use promptdeck_core::search::SearchScope;
use promptdeck_core::service::{PromptService, ServiceError};

fn test_service(tag: &str) -> PromptService {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let base = std::env::temp_dir().join(format!("promptdeck-service-{tag}-{unique}"));
    let config = Config {
        data_dir: base.join("data"),
        include_subdirs: true,
        record_extension: ".json".to_string(),
        global_hotkey: "ctrl+b".to_string(),
        config_path: base.join("user_config.json"),
    };
    PromptService::new(config).unwrap()
}

#[test]
fn rejects_invalid_configuration() {
    let mut config = Config::default();
    config.global_hotkey = String::new();
    match PromptService::new(config) {
        Err(ServiceError::Config(_)) => {}
        other => panic!(
            "unexpected result: {:?}",
            other.map(|_| "service constructed")
        ),
    }
}

#[test]
fn viewing_and_saving_refresh_the_content_cache() {
    let service = test_service("cache");

    let id = service
        .create_prompt(&Prompt::with_basics("Greet", "Hello {name}", "common"))
        .unwrap();
    assert_eq!(service.store().read_cached_content(), "Hello {name}");

    service
        .save_prompt(&id, &Prompt::with_basics("Greet", "Hi there", "common"))
        .unwrap();
    assert_eq!(service.store().read_cached_content(), "Hi there");

    let other = service
        .create_prompt(&Prompt::with_basics("Review", "Check the diff.", "coding"))
        .unwrap();
    assert_eq!(service.store().read_cached_content(), "Check the diff.");

    // Loading an older record moves the cache back to it.
    let prompt = service.load_prompt(&id).unwrap();
    assert_eq!(prompt.content, "Hi there");
    assert_eq!(service.store().read_cached_content(), "Hi there");

    service.delete_prompt(&other).unwrap();
}

#[test]
fn create_derives_suffixed_ids_for_duplicate_names() {
    let service = test_service("suffix");

    let first = service
        .create_prompt(&Prompt::with_basics("Greet", "Hello {name}", "common"))
        .unwrap();
    let second = service
        .create_prompt(&Prompt::with_basics("Greet", "Hi there", "common"))
        .unwrap();

    assert_eq!(first, "Greet.json");
    assert_eq!(second, "Greet_0001.json");
}

#[test]
fn search_is_scoped_and_case_insensitive() {
    let service = test_service("search");

    service
        .create_prompt(&Prompt::with_basics("Greet", "Hello {name}", "common"))
        .unwrap();
    service
        .create_prompt(&Prompt::with_basics("Greet", "Hi there", "common"))
        .unwrap();
    service
        .create_prompt(&Prompt::with_basics("Review", "Check the diff.", "coding"))
        .unwrap();

    let hits = service.search(&SearchScope::All, "hello");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, "Greet.json");

    let hits = service.search(&SearchScope::Group("common".to_string()), "greet");
    assert_eq!(hits.len(), 2);

    assert!(service.search(&SearchScope::All, "").is_empty());
}

#[test]
fn groups_and_statistics_reflect_the_stored_records() {
    let service = test_service("stats");

    service
        .create_prompt(&Prompt::with_basics("A", "x", "coding"))
        .unwrap();
    service
        .create_prompt(&Prompt::with_basics("B", "x", "writing"))
        .unwrap();

    assert_eq!(service.groups(), vec!["coding", "writing"]);
    assert_eq!(service.records_in_group("coding"), vec!["A.json"]);

    let stats = service.statistics();
    assert_eq!(stats.total_prompts, 2);
    assert_eq!(stats.total_groups, 2);
}

#[test]
fn export_import_and_shortcut_reset_go_through_the_store() {
    let source = test_service("exporter");
    let mut bound = Prompt::with_basics("Bound", "x", "common");
    bound.shortcut = "ctrl+alt+1".to_string();
    source.create_prompt(&bound).unwrap();
    source
        .create_prompt(&Prompt::with_basics("Plain", "y", "common"))
        .unwrap();

    let aggregate = source.config().data_dir.join("..").join("export.json");
    assert_eq!(source.export(&aggregate).unwrap(), 2);

    let target = test_service("importer");
    assert_eq!(target.import(&aggregate).unwrap(), 2);
    assert_eq!(target.statistics().total_prompts, 2);

    assert_eq!(source.clear_all_shortcuts(), 2);
    assert!(source.store().prompts_with_shortcut().is_empty());
}

#[test]
fn backup_produces_a_directory_containing_every_record() {
    let service = test_service("backup");
    service
        .create_prompt(&Prompt::with_basics("Keep", "x", "common"))
        .unwrap();

    let backup_dir = service.backup().unwrap();
    assert!(backup_dir.join("Keep.json").exists());
}
