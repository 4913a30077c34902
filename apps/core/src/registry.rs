use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clipboard::Clipboard;
use crate::hotkey::canonical_chord;
use crate::hotkey_runtime::{HotkeyRegistrar, HotkeyRegistration, HotkeyRuntimeError};
use crate::logging;
use crate::store::PromptStore;

pub const BINDINGS_FILE_NAME: &str = "hotkey_bindings.json";
/// Size of the indexed "frequently used" table; slots are numbered 1..=15.
pub const SLOT_COUNT: u32 = 15;

#[derive(Debug)]
pub enum HotkeyError {
    InvalidChord(String),
    ChordInUse { chord: String, owner: String },
    SlotOutOfRange(u32),
    Registration(HotkeyRuntimeError),
    UnboundChord(String),
    Dispatch(String),
    Io { path: PathBuf, source: std::io::Error },
    Encode(serde_json::Error),
}

impl Display for HotkeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChord(error) => write!(f, "invalid chord: {error}"),
            Self::ChordInUse { chord, owner } => {
                write!(f, "chord '{chord}' is already bound to {owner}")
            }
            Self::SlotOutOfRange(index) => {
                write!(f, "slot {index} is out of range (1..={SLOT_COUNT})")
            }
            Self::Registration(error) => write!(f, "registration error: {error}"),
            Self::UnboundChord(chord) => write!(f, "chord '{chord}' is not bound"),
            Self::Dispatch(error) => write!(f, "dispatch error: {error}"),
            Self::Io { path, source } => {
                write!(f, "io error at {}: {source}", path.display())
            }
            Self::Encode(error) => write!(f, "encode error: {error}"),
        }
    }
}

impl std::error::Error for HotkeyError {}

impl From<HotkeyRuntimeError> for HotkeyError {
    fn from(value: HotkeyRuntimeError) -> Self {
        Self::Registration(value)
    }
}

/// What a chord does when it fires. Record targets hold only the record id;
/// the content is re-read from disk at fire time so edits apply without
/// re-registering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyTarget {
    CachedContent,
    Record(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingOwner {
    Global,
    Record(String),
    Slot(u32),
}

impl Display for BindingOwner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Global => write!(f, "the global default"),
            Self::Record(id) => write!(f, "record {id}"),
            Self::Slot(index) => write!(f, "slot {index}"),
        }
    }
}

/// One persisted slot entry, matching the on-disk bindings file shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotBinding {
    pub hotkey: String,
    pub filename: String,
}

#[derive(Debug)]
struct BindingEntry {
    registration: HotkeyRegistration,
    chord: String,
    owner: BindingOwner,
    target: HotkeyTarget,
}

/// Single unified mapping from canonical chord to owner and target. Keeping
/// the global default, ambient per-record shortcuts, and the indexed slot
/// table in one structure makes collisions detectable instead of silently
/// shadowed.
pub struct HotkeyRegistry {
    registrar: Box<dyn HotkeyRegistrar>,
    entries: Vec<BindingEntry>,
    bindings_path: PathBuf,
}

impl HotkeyRegistry {
    pub fn new(registrar: Box<dyn HotkeyRegistrar>, bindings_path: PathBuf) -> Self {
        Self {
            registrar,
            entries: Vec::new(),
            bindings_path,
        }
    }

    pub fn bindings_path(&self) -> &Path {
        &self.bindings_path
    }

    pub fn registered_chords(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.chord.clone()).collect()
    }

    fn find_chord(&self, canonical: &str) -> Option<&BindingEntry> {
        self.entries.iter().find(|entry| entry.chord == canonical)
    }

    fn install(
        &mut self,
        canonical: String,
        owner: BindingOwner,
        target: HotkeyTarget,
    ) -> Result<(), HotkeyError> {
        if let Some(existing) = self.find_chord(&canonical) {
            return Err(HotkeyError::ChordInUse {
                chord: canonical,
                owner: existing.owner.to_string(),
            });
        }

        let registration = self.registrar.register_hotkey(&canonical)?;
        self.entries.push(BindingEntry {
            registration,
            chord: canonical,
            owner,
            target,
        });
        Ok(())
    }

    /// The distinguished always-present chord: copies the last-viewed cache
    /// to the clipboard.
    pub fn register_global(&mut self, chord: &str) -> Result<(), HotkeyError> {
        let canonical = canonical_chord(chord).map_err(HotkeyError::InvalidChord)?;
        self.install(canonical, BindingOwner::Global, HotkeyTarget::CachedContent)
    }

    /// Ambient per-record shortcut from the record's own `shortcut` field.
    /// Duplicate chords are rejected, never silently replaced.
    pub fn register_record(&mut self, chord: &str, record_id: &str) -> Result<(), HotkeyError> {
        let canonical = canonical_chord(chord).map_err(HotkeyError::InvalidChord)?;
        self.install(
            canonical,
            BindingOwner::Record(record_id.to_string()),
            HotkeyTarget::Record(record_id.to_string()),
        )
    }

    /// Binds an indexed slot, releasing its previous chord first. On
    /// registration failure the previous binding is restored, so the slot
    /// never ends up half-bound. Persists the slot table on success.
    pub fn bind_slot(&mut self, index: u32, chord: &str, record_id: &str) -> Result<(), HotkeyError> {
        if index == 0 || index > SLOT_COUNT {
            return Err(HotkeyError::SlotOutOfRange(index));
        }

        let canonical = canonical_chord(chord).map_err(HotkeyError::InvalidChord)?;
        if let Some(existing) = self.find_chord(&canonical) {
            if existing.owner != BindingOwner::Slot(index) {
                return Err(HotkeyError::ChordInUse {
                    chord: canonical,
                    owner: existing.owner.to_string(),
                });
            }
        }

        let previous = self.remove_owner(&BindingOwner::Slot(index));
        let installed = self.install(
            canonical,
            BindingOwner::Slot(index),
            HotkeyTarget::Record(record_id.to_string()),
        );

        match installed {
            Ok(()) => {
                self.persist_slots()?;
                Ok(())
            }
            Err(error) => {
                if let Some((old_chord, old_target)) = previous {
                    if let Err(restore_error) =
                        self.install(old_chord.clone(), BindingOwner::Slot(index), old_target)
                    {
                        logging::warn(&format!(
                            "failed to restore slot {index} chord '{old_chord}': {restore_error}"
                        ));
                    }
                }
                Err(error)
            }
        }
    }

    /// Releases a slot. Unbinding an empty slot is not an error.
    pub fn unbind_slot(&mut self, index: u32) -> Result<(), HotkeyError> {
        if index == 0 || index > SLOT_COUNT {
            return Err(HotkeyError::SlotOutOfRange(index));
        }
        self.remove_owner(&BindingOwner::Slot(index));
        self.persist_slots()
    }

    fn remove_owner(&mut self, owner: &BindingOwner) -> Option<(String, HotkeyTarget)> {
        let position = self.entries.iter().position(|entry| &entry.owner == owner)?;
        let entry = self.entries.remove(position);
        if let Err(error) = self.registrar.unregister_hotkey(&entry.registration) {
            logging::warn(&format!(
                "failed to release chord '{}': {error}",
                entry.chord
            ));
        }
        Some((entry.chord, entry.target))
    }

    /// Current slot table in persisted form.
    pub fn slot_bindings(&self) -> BTreeMap<u32, SlotBinding> {
        let mut table = BTreeMap::new();
        for entry in &self.entries {
            if let (BindingOwner::Slot(index), HotkeyTarget::Record(id)) =
                (&entry.owner, &entry.target)
            {
                table.insert(
                    *index,
                    SlotBinding {
                        hotkey: entry.chord.clone(),
                        filename: id.clone(),
                    },
                );
            }
        }
        table
    }

    fn persist_slots(&self) -> Result<(), HotkeyError> {
        let table: BTreeMap<String, SlotBinding> = self
            .slot_bindings()
            .into_iter()
            .map(|(index, binding)| (index.to_string(), binding))
            .collect();
        let encoded = serde_json::to_string_pretty(&table).map_err(HotkeyError::Encode)?;

        if let Some(parent) = self.bindings_path.parent() {
            fs::create_dir_all(parent).map_err(|e| HotkeyError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.bindings_path, encoded).map_err(|e| HotkeyError::Io {
            path: self.bindings_path.clone(),
            source: e,
        })
    }

    /// Re-registers the persisted slot table at startup. An absent or
    /// unreadable side file means an empty table; individual failures are
    /// logged and skipped. Returns how many slots were restored.
    pub fn load_slot_bindings(&mut self) -> usize {
        let raw = match fs::read_to_string(&self.bindings_path) {
            Ok(raw) => raw,
            Err(_) => return 0,
        };

        let table: BTreeMap<String, SlotBinding> = match serde_json::from_str(&raw) {
            Ok(table) => table,
            Err(error) => {
                logging::warn(&format!(
                    "ignoring unreadable bindings file {}: {error}",
                    self.bindings_path.display()
                ));
                return 0;
            }
        };

        let mut restored = 0;
        for (key, binding) in table {
            let Ok(index) = key.parse::<u32>() else {
                logging::warn(&format!("ignoring bindings entry with bad slot '{key}'"));
                continue;
            };
            if index == 0 || index > SLOT_COUNT {
                logging::warn(&format!("ignoring out-of-range slot {index}"));
                continue;
            }

            let canonical = match canonical_chord(&binding.hotkey) {
                Ok(canonical) => canonical,
                Err(error) => {
                    logging::warn(&format!(
                        "ignoring slot {index} chord '{}': {error}",
                        binding.hotkey
                    ));
                    continue;
                }
            };

            match self.install(
                canonical,
                BindingOwner::Slot(index),
                HotkeyTarget::Record(binding.filename.clone()),
            ) {
                Ok(()) => restored += 1,
                Err(error) => {
                    logging::warn(&format!("could not restore slot {index}: {error}"));
                }
            }
        }
        restored
    }

    pub fn resolve_chord(&self, chord: &str) -> Option<&HotkeyTarget> {
        let canonical = canonical_chord(chord).ok()?;
        self.find_chord(&canonical).map(|entry| &entry.target)
    }

    fn resolve_native(&self, native_id: i32) -> Option<&BindingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.registration == HotkeyRegistration::Native(native_id))
    }

    /// Dispatch for the OS message loop: the id comes from WM_HOTKEY.
    pub fn fire_native(
        &self,
        native_id: i32,
        store: &PromptStore,
        clipboard: &mut dyn Clipboard,
    ) -> Result<(), HotkeyError> {
        let entry = self
            .resolve_native(native_id)
            .ok_or_else(|| HotkeyError::UnboundChord(format!("native id {native_id}")))?;
        self.fire_target(&entry.target, store, clipboard)
    }

    /// Dispatch by chord string, used by tests and the mock path.
    pub fn fire_chord(
        &self,
        chord: &str,
        store: &PromptStore,
        clipboard: &mut dyn Clipboard,
    ) -> Result<(), HotkeyError> {
        let target = self
            .resolve_chord(chord)
            .ok_or_else(|| HotkeyError::UnboundChord(chord.to_string()))?
            .clone();
        self.fire_target(&target, store, clipboard)
    }

    fn fire_target(
        &self,
        target: &HotkeyTarget,
        store: &PromptStore,
        clipboard: &mut dyn Clipboard,
    ) -> Result<(), HotkeyError> {
        let text = match target {
            HotkeyTarget::CachedContent => store.read_cached_content(),
            HotkeyTarget::Record(id) => store
                .read(id)
                .map_err(|error| HotkeyError::Dispatch(format!("failed to read {id}: {error}")))?
                .content,
        };

        clipboard
            .copy_text(&text)
            .map_err(|error| HotkeyError::Dispatch(error.to_string()))
    }

    /// Releases every OS registration; used when the listener loop exits.
    pub fn release_all(&mut self) {
        if let Err(error) = self.registrar.unregister_all() {
            logging::warn(&format!("failed to release registered chords: {error}"));
        }
        self.entries.clear();
    }
}
