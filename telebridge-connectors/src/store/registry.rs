//! Windows Registry Store
//!
//! Writes `REG_SZ` values below a key under `HKEY_CURRENT_USER`. The key is
//! created on open and kept open for the lifetime of the store. If another
//! process deletes it while we hold the handle, the next write fails with
//! `ERROR_KEY_DELETED`; the key is then recreated and the write retried once.

use std::ptr;

use telebridge_core::KeyValueSink;
use windows_sys::Win32::Foundation::{ERROR_KEY_DELETED, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegSetValueExW, HKEY, HKEY_CURRENT_USER, KEY_WRITE,
    REG_OPTION_NON_VOLATILE, REG_SZ,
};

use crate::ConnectorError;

/// Sink writing string values to one registry key
#[derive(Debug)]
pub struct RegistryStore {
    subkey: String,
    location: String,
    hkey: HKEY,
}

impl RegistryStore {
    /// Open or create `HKEY_CURRENT_USER\<subkey>`
    pub fn open(subkey: &str) -> Result<Self, ConnectorError> {
        let hkey = create_key(subkey)?;
        Ok(Self {
            subkey: subkey.to_string(),
            location: format!(r"HKEY_CURRENT_USER\{}", subkey),
            hkey,
        })
    }

    fn reopen(&mut self) -> Result<(), ConnectorError> {
        let hkey = create_key(&self.subkey)?;
        close_key(self.hkey);
        self.hkey = hkey;
        Ok(())
    }

    fn set_value(&self, name: &str, value: &str) -> u32 {
        let name = to_wide(name);
        let data = to_wide(value);
        let byte_len = (data.len() * std::mem::size_of::<u16>()) as u32;

        // SAFETY: both buffers are NUL-terminated UTF-16 that outlive the call,
        // and `byte_len` covers exactly `data` including the terminator.
        unsafe {
            RegSetValueExW(
                self.hkey,
                name.as_ptr(),
                0,
                REG_SZ,
                data.as_ptr().cast::<u8>(),
                byte_len,
            )
        }
    }
}

impl KeyValueSink for RegistryStore {
    type Error = ConnectorError;

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        let mut status = self.set_value(name, value);
        if status == ERROR_KEY_DELETED {
            log::warn!("{} was deleted, recreating", self.location);
            self.reopen()?;
            status = self.set_value(name, value);
        }

        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(ConnectorError::Registry {
                code: status,
                context: format!(r"RegSetValueExW {}\{}", self.location, name),
            })
        }
    }

    fn location(&self) -> &str {
        &self.location
    }
}

impl Drop for RegistryStore {
    fn drop(&mut self) {
        close_key(self.hkey);
    }
}

fn create_key(subkey: &str) -> Result<HKEY, ConnectorError> {
    let wide = to_wide(subkey);
    let mut hkey: HKEY = 0;

    // SAFETY: `wide` is NUL-terminated and `hkey` is a valid out-pointer; the
    // optional class, security and disposition arguments are null.
    let status = unsafe {
        RegCreateKeyExW(
            HKEY_CURRENT_USER,
            wide.as_ptr(),
            0,
            ptr::null(),
            REG_OPTION_NON_VOLATILE,
            KEY_WRITE,
            ptr::null(),
            &mut hkey,
            ptr::null_mut(),
        )
    };

    if status == ERROR_SUCCESS {
        Ok(hkey)
    } else {
        Err(ConnectorError::Registry {
            code: status,
            context: format!(r"RegCreateKeyExW HKEY_CURRENT_USER\{}", subkey),
        })
    }
}

fn close_key(hkey: HKEY) {
    // SAFETY: `hkey` came from a successful RegCreateKeyExW and is closed once
    let status = unsafe { RegCloseKey(hkey) };
    if status != ERROR_SUCCESS {
        log::warn!("RegCloseKey failed with code {}", status);
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
