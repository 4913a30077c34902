use crate::hotkey::parse_chord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyRegistration {
    Native(i32),
    Noop(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotkeyRuntimeError {
    InvalidChord(String),
    RegistrationFailed(String),
    EventLoopFailed(String),
    UnsupportedPlatform,
}

impl std::fmt::Display for HotkeyRuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidChord(error) => write!(f, "invalid chord: {error}"),
            Self::RegistrationFailed(error) => write!(f, "registration failed: {error}"),
            Self::EventLoopFailed(error) => write!(f, "event loop failed: {error}"),
            Self::UnsupportedPlatform => write!(f, "unsupported platform"),
        }
    }
}

impl std::error::Error for HotkeyRuntimeError {}

/// OS-level chord registration. Releasing a single registration is part of
/// the contract because rebinding a slot must first release its previous
/// chord, else the stale callback keeps firing.
pub trait HotkeyRegistrar: Send {
    fn register_hotkey(&mut self, chord: &str) -> Result<HotkeyRegistration, HotkeyRuntimeError>;
    fn unregister_hotkey(
        &mut self,
        registration: &HotkeyRegistration,
    ) -> Result<(), HotkeyRuntimeError>;
    fn unregister_all(&mut self) -> Result<(), HotkeyRuntimeError>;
}

#[derive(Default)]
pub struct MockHotkeyRegistrar {
    registrations: Vec<String>,
}

impl MockHotkeyRegistrar {
    pub fn registrations(&self) -> &[String] {
        &self.registrations
    }
}

impl HotkeyRegistrar for MockHotkeyRegistrar {
    fn register_hotkey(&mut self, chord: &str) -> Result<HotkeyRegistration, HotkeyRuntimeError> {
        parse_chord(chord).map_err(HotkeyRuntimeError::InvalidChord)?;
        self.registrations.push(chord.to_string());
        Ok(HotkeyRegistration::Noop(chord.to_string()))
    }

    fn unregister_hotkey(
        &mut self,
        registration: &HotkeyRegistration,
    ) -> Result<(), HotkeyRuntimeError> {
        if let HotkeyRegistration::Noop(chord) = registration {
            self.registrations.retain(|registered| registered != chord);
        }
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), HotkeyRuntimeError> {
        self.registrations.clear();
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
#[derive(Default)]
pub struct NoopHotkeyRegistrar {
    registrations: Vec<String>,
}

#[cfg(not(target_os = "windows"))]
impl NoopHotkeyRegistrar {
    pub fn registrations(&self) -> &[String] {
        &self.registrations
    }
}

#[cfg(not(target_os = "windows"))]
impl HotkeyRegistrar for NoopHotkeyRegistrar {
    fn register_hotkey(&mut self, chord: &str) -> Result<HotkeyRegistration, HotkeyRuntimeError> {
        parse_chord(chord).map_err(HotkeyRuntimeError::InvalidChord)?;
        self.registrations.push(chord.to_string());
        Ok(HotkeyRegistration::Noop(chord.to_string()))
    }

    fn unregister_hotkey(
        &mut self,
        registration: &HotkeyRegistration,
    ) -> Result<(), HotkeyRuntimeError> {
        if let HotkeyRegistration::Noop(chord) = registration {
            self.registrations.retain(|registered| registered != chord);
        }
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), HotkeyRuntimeError> {
        self.registrations.clear();
        Ok(())
    }
}

#[cfg(target_os = "windows")]
pub struct WindowsHotkeyRegistrar {
    next_id: i32,
    registered_ids: Vec<i32>,
}

#[cfg(target_os = "windows")]
impl Default for WindowsHotkeyRegistrar {
    fn default() -> Self {
        Self {
            next_id: 1,
            registered_ids: Vec::new(),
        }
    }
}

#[cfg(target_os = "windows")]
impl HotkeyRegistrar for WindowsHotkeyRegistrar {
    fn register_hotkey(&mut self, chord: &str) -> Result<HotkeyRegistration, HotkeyRuntimeError> {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
            RegisterHotKey, MOD_ALT, MOD_CONTROL, MOD_SHIFT, MOD_WIN, VK_F1, VK_SPACE,
        };

        let parsed = parse_chord(chord).map_err(HotkeyRuntimeError::InvalidChord)?;

        let mut modifiers = 0_u32;
        for modifier in &parsed.modifiers {
            match modifier.as_str() {
                "alt" => modifiers |= MOD_ALT,
                "ctrl" | "control" => modifiers |= MOD_CONTROL,
                "shift" => modifiers |= MOD_SHIFT,
                "win" | "windows" | "meta" | "super" => modifiers |= MOD_WIN,
                other => {
                    return Err(HotkeyRuntimeError::InvalidChord(format!(
                        "unsupported modifier: {other}"
                    )))
                }
            }
        }

        let vk: u32 = match parsed.key.as_str() {
            "space" => VK_SPACE as u32,
            key if key.len() == 1 && key.as_bytes()[0].is_ascii_alphanumeric() => {
                key.to_ascii_uppercase().as_bytes()[0] as u32
            }
            key => match key.strip_prefix('f').and_then(|n| n.parse::<u32>().ok()) {
                Some(number) if (1..=12).contains(&number) => VK_F1 as u32 + (number - 1),
                _ => {
                    return Err(HotkeyRuntimeError::InvalidChord(format!(
                        "unsupported key: {key}"
                    )))
                }
            },
        };

        let id = self.next_id;
        self.next_id += 1;

        let ok = unsafe { RegisterHotKey(std::ptr::null_mut(), id, modifiers, vk) };
        if ok == 0 {
            return Err(HotkeyRuntimeError::RegistrationFailed(format!(
                "RegisterHotKey failed for '{chord}'"
            )));
        }

        self.registered_ids.push(id);
        Ok(HotkeyRegistration::Native(id))
    }

    fn unregister_hotkey(
        &mut self,
        registration: &HotkeyRegistration,
    ) -> Result<(), HotkeyRuntimeError> {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::UnregisterHotKey;

        if let HotkeyRegistration::Native(id) = registration {
            unsafe {
                UnregisterHotKey(std::ptr::null_mut(), *id);
            }
            self.registered_ids.retain(|registered| registered != id);
        }
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), HotkeyRuntimeError> {
        use windows_sys::Win32::UI::Input::KeyboardAndMouse::UnregisterHotKey;

        for id in self.registered_ids.drain(..) {
            unsafe {
                UnregisterHotKey(std::ptr::null_mut(), id);
            }
        }
        Ok(())
    }
}

pub fn default_hotkey_registrar() -> Box<dyn HotkeyRegistrar> {
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsHotkeyRegistrar::default())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(NoopHotkeyRegistrar::default())
    }
}

/// Blocks on the thread's message queue, invoking `on_hotkey` with the
/// native registration id for every WM_HOTKEY. Returns when WM_QUIT arrives
/// (see [`post_quit`]).
#[cfg(target_os = "windows")]
pub fn run_message_loop<F>(mut on_hotkey: F) -> Result<(), HotkeyRuntimeError>
where
    F: FnMut(i32),
{
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, GetMessageW, TranslateMessage, MSG, WM_HOTKEY,
    };

    let mut msg: MSG = unsafe { std::mem::zeroed() };
    loop {
        let status = unsafe { GetMessageW(&mut msg, std::ptr::null_mut(), 0, 0) };
        if status == -1 {
            return Err(HotkeyRuntimeError::EventLoopFailed(
                "GetMessageW returned -1".to_string(),
            ));
        }

        if status == 0 {
            return Ok(());
        }

        if msg.message == WM_HOTKEY {
            on_hotkey(msg.wParam as i32);
        }

        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(not(target_os = "windows"))]
pub fn run_message_loop<F>(_on_hotkey: F) -> Result<(), HotkeyRuntimeError>
where
    F: FnMut(i32),
{
    Err(HotkeyRuntimeError::UnsupportedPlatform)
}

#[cfg(target_os = "windows")]
pub fn current_thread_id() -> u32 {
    unsafe { windows_sys::Win32::System::Threading::GetCurrentThreadId() }
}

/// Posts WM_QUIT to the listener thread so its message loop returns. Normally
/// unused; exists so tests and shutdown paths can tear the listener down.
#[cfg(target_os = "windows")]
pub fn post_quit(thread_id: u32) {
    use windows_sys::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};

    unsafe {
        PostThreadMessageW(thread_id, WM_QUIT, 0, 0);
    }
}
