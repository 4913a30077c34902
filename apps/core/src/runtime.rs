use std::path::PathBuf;
use std::thread::JoinHandle;

use crate::clipboard;
use crate::config::{self, Config, ConfigError};
use crate::hotkey_runtime::{self, default_hotkey_registrar, HotkeyRuntimeError};
use crate::logging;
use crate::registry::{self, HotkeyRegistry};
use crate::service::{PromptService, ServiceError};
use crate::store::PromptStore;

#[derive(Debug)]
pub enum RuntimeError {
    Config(ConfigError),
    Service(ServiceError),
    Listener(String),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(error) => write!(f, "config error: {error}"),
            Self::Service(error) => write!(f, "service error: {error}"),
            Self::Listener(error) => write!(f, "listener error: {error}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ServiceError> for RuntimeError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub run_listener: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            run_listener: true,
        }
    }
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config requires a path argument")?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--no-listener" => options.run_listener = false,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

pub fn run() -> Result<(), RuntimeError> {
    run_with_options(RuntimeOptions::default())
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    if let Err(error) = logging::init() {
        eprintln!("[promptdeck-core] file logging unavailable: {error}");
    }

    let config = config::load(options.config_path.clone())?;
    if !config.config_path.exists() {
        config::save(&config)?;
        println!(
            "[promptdeck-core] wrote default config to {}",
            config.config_path.display()
        );
    }
    println!(
        "[promptdeck-core] startup mode={} global_hotkey={} data_dir={} config_path={}",
        runtime_mode(),
        config.global_hotkey,
        config.data_dir.display(),
        config.config_path.display(),
    );

    let service = PromptService::new(config.clone())?;
    let stats = service.statistics();
    let summary = format!(
        "startup prompts={} groups={}",
        stats.total_prompts, stats.total_groups
    );
    println!("[promptdeck-core] {summary}");
    logging::info(&summary);

    if !options.run_listener {
        println!("[promptdeck-core] hotkey listener disabled; exiting after startup checks");
        return Ok(());
    }

    let listener = HotkeyListener::spawn(config, service);
    println!("[promptdeck-core] hotkey listener running");
    listener.join().map_err(RuntimeError::Listener)
}

fn runtime_mode() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "windows-hotkey-runtime"
    }

    #[cfg(not(target_os = "windows"))]
    {
        "non-windows-noop"
    }
}

pub fn bindings_file_path() -> PathBuf {
    config::stable_app_data_dir().join(registry::BINDINGS_FILE_NAME)
}

/// Performs the startup registration pass: the global default chord first,
/// then every record with an ambient shortcut in sorted id order, then the
/// persisted slot table. Failures are logged and skipped; startup never
/// aborts because of one bad chord.
pub fn register_startup_bindings(
    registry: &mut HotkeyRegistry,
    config: &Config,
    store: &PromptStore,
) {
    match registry.register_global(&config.global_hotkey) {
        Ok(()) => logging::info(&format!(
            "global chord '{}' registered",
            config.global_hotkey
        )),
        Err(error) => logging::error(&format!(
            "failed to register global chord '{}': {error}",
            config.global_hotkey
        )),
    }

    let mut ambient = store.prompts_with_shortcut();
    ambient.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, prompt) in ambient {
        match registry.register_record(&prompt.shortcut, &id) {
            Ok(()) => logging::info(&format!("chord '{}' bound to {id}", prompt.shortcut)),
            Err(error) => logging::warn(&format!("skipping shortcut on {id}: {error}")),
        }
    }

    let restored = registry.load_slot_bindings();
    logging::info(&format!("restored {restored} slot bindings"));
}

/// Owns the background key-event listener for the process lifetime. The
/// thread registers every chord, then blocks on the OS message queue; chord
/// callbacks only read one file and write the clipboard.
pub struct HotkeyListener {
    handle: JoinHandle<Result<(), HotkeyRuntimeError>>,
    #[cfg(target_os = "windows")]
    thread_id: std::sync::Arc<std::sync::OnceLock<u32>>,
}

impl HotkeyListener {
    pub fn spawn(config: Config, service: PromptService) -> Self {
        #[cfg(target_os = "windows")]
        let thread_id = std::sync::Arc::new(std::sync::OnceLock::new());
        #[cfg(target_os = "windows")]
        let thread_id_slot = thread_id.clone();

        let handle = std::thread::spawn(move || {
            #[cfg(target_os = "windows")]
            {
                let _ = thread_id_slot.set(hotkey_runtime::current_thread_id());
            }

            let mut registry =
                HotkeyRegistry::new(default_hotkey_registrar(), bindings_file_path());
            register_startup_bindings(&mut registry, &config, service.store());

            let mut clipboard = clipboard::default_clipboard();
            let result = hotkey_runtime::run_message_loop(|native_id| {
                if let Err(error) =
                    registry.fire_native(native_id, service.store(), clipboard.as_mut())
                {
                    logging::warn(&format!("hotkey dispatch failed: {error}"));
                }
            });
            registry.release_all();

            match result {
                Err(HotkeyRuntimeError::UnsupportedPlatform) => {
                    logging::info("no global hotkey loop on this platform");
                    Ok(())
                }
                other => other,
            }
        });

        Self {
            handle,
            #[cfg(target_os = "windows")]
            thread_id,
        }
    }

    /// Posts a quit message to the listener loop and waits for it. Normally
    /// the listener runs until process exit; this path exists for tests.
    pub fn shutdown(self) -> Result<(), String> {
        #[cfg(target_os = "windows")]
        if let Some(id) = self.thread_id.get() {
            hotkey_runtime::post_quit(*id);
        }
        self.join()
    }

    pub fn join(self) -> Result<(), String> {
        match self.handle.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(format!("hotkey listener failed: {error}")),
            Err(_) => Err("hotkey listener panicked".to_string()),
        }
    }
}
