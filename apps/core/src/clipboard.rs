use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardError {
    message: String,
}

impl ClipboardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for ClipboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ClipboardError {}

/// Seam over the system clipboard so chord callbacks can be exercised in
/// tests without touching OS state.
pub trait Clipboard: Send {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError>;
    fn read_text(&mut self) -> Result<Option<String>, ClipboardError>;
}

/// In-memory clipboard holding the last copied string.
#[derive(Default)]
pub struct MockClipboard {
    slot: Option<String>,
}

impl Clipboard for MockClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.slot = Some(text.to_string());
        Ok(())
    }

    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.slot.clone())
    }
}

pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        sys::write_text(text)
    }

    fn read_text(&mut self) -> Result<Option<String>, ClipboardError> {
        sys::read_text()
    }
}

pub fn default_clipboard() -> Box<dyn Clipboard> {
    Box::new(SystemClipboard)
}

#[cfg(target_os = "windows")]
mod sys {
    use super::ClipboardError;

    use windows_sys::Win32::System::DataExchange::{
        CloseClipboard, EmptyClipboard, GetClipboardData, IsClipboardFormatAvailable,
        OpenClipboard, SetClipboardData, CF_UNICODETEXT,
    };
    use windows_sys::Win32::System::Memory::{
        GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, GMEM_MOVEABLE,
    };

    // Closes the clipboard when dropped so every early return releases it.
    struct OpenClipboardGuard;

    impl OpenClipboardGuard {
        fn acquire() -> Result<Self, ClipboardError> {
            if unsafe { OpenClipboard(std::ptr::null_mut()) } == 0 {
                return Err(ClipboardError::new("failed to open clipboard"));
            }
            Ok(Self)
        }
    }

    impl Drop for OpenClipboardGuard {
        fn drop(&mut self) {
            unsafe {
                CloseClipboard();
            }
        }
    }

    pub fn read_text() -> Result<Option<String>, ClipboardError> {
        let _guard = OpenClipboardGuard::acquire()?;

        unsafe {
            if IsClipboardFormatAvailable(CF_UNICODETEXT) == 0 {
                return Ok(None);
            }

            let handle = GetClipboardData(CF_UNICODETEXT);
            if handle.is_null() {
                return Ok(None);
            }

            let ptr = GlobalLock(handle) as *const u16;
            if ptr.is_null() {
                return Ok(None);
            }

            let mut len = 0usize;
            while *ptr.add(len) != 0 {
                len += 1;
            }
            let text = String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len));
            GlobalUnlock(handle);
            Ok(Some(text))
        }
    }

    pub fn write_text(value: &str) -> Result<(), ClipboardError> {
        let wide: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
        let bytes = wide.len() * std::mem::size_of::<u16>();

        let _guard = OpenClipboardGuard::acquire()?;
        unsafe {
            if EmptyClipboard() == 0 {
                return Err(ClipboardError::new("failed to clear clipboard"));
            }

            let mem = GlobalAlloc(GMEM_MOVEABLE, bytes);
            if mem.is_null() {
                return Err(ClipboardError::new("failed to allocate clipboard memory"));
            }

            let ptr = GlobalLock(mem) as *mut u16;
            if ptr.is_null() {
                GlobalFree(mem);
                return Err(ClipboardError::new("failed to lock clipboard memory"));
            }
            std::ptr::copy_nonoverlapping(wide.as_ptr(), ptr, wide.len());
            GlobalUnlock(mem);

            if SetClipboardData(CF_UNICODETEXT, mem).is_null() {
                GlobalFree(mem);
                return Err(ClipboardError::new("failed to set clipboard data"));
            }
        }
        Ok(())
    }
}

#[cfg(not(target_os = "windows"))]
mod sys {
    use super::ClipboardError;

    pub fn read_text() -> Result<Option<String>, ClipboardError> {
        Ok(None)
    }

    pub fn write_text(_value: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::new(
            "system clipboard is unsupported on this platform",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{Clipboard, MockClipboard};

    #[test]
    fn mock_clipboard_round_trips_last_copy() {
        let mut clipboard = MockClipboard::default();
        assert_eq!(clipboard.read_text().unwrap(), None);

        clipboard.copy_text("Hi there").unwrap();
        clipboard.copy_text("Hello {name}").unwrap();
        assert_eq!(
            clipboard.read_text().unwrap(),
            Some("Hello {name}".to_string())
        );
    }
}
