//! Invoking-user resolution.
//!
//! An override environment variable (set by CI runners such as Jenkins)
//! wins over the OS account the process runs as.

use tracing::debug;

use super::error::AuditError;

/// Resolve the user from the process environment and the OS account table
pub fn resolve_user(override_var: &str) -> Result<String, AuditError> {
    resolve_user_with(override_var, |name| std::env::var(name).ok(), os_user_name)
}

/// Resolve the user from injected sources.
///
/// An override that is set but blank counts as unset.
pub fn resolve_user_with<E, O>(
    override_var: &str,
    env: E,
    os_lookup: O,
) -> Result<String, AuditError>
where
    E: Fn(&str) -> Option<String>,
    O: FnOnce() -> Option<String>,
{
    if let Some(user) = env(override_var).filter(|u| !u.trim().is_empty()) {
        debug!(source = override_var, "Resolved user from override");
        return Ok(user);
    }

    os_lookup()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AuditError::IdentityResolution {
            override_var: override_var.to_string(),
        })
}

/// Login name of the real user id, from the passwd database
#[cfg(unix)]
pub fn os_user_name() -> Option<String> {
    use std::ffi::CStr;

    let mut buf: Vec<libc::c_char> = vec![0; 1024];

    unsafe {
        let uid = libc::getuid();
        let mut pwd: libc::passwd = std::mem::zeroed();
        let mut result: *mut libc::passwd = std::ptr::null_mut();

        loop {
            let rc = libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result);

            if rc == libc::ERANGE && buf.len() < 64 * 1024 {
                buf.resize(buf.len() * 2, 0);
                continue;
            }

            if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
                return None;
            }

            let name = CStr::from_ptr(pwd.pw_name).to_string_lossy().into_owned();
            return Some(name);
        }
    }
}

#[cfg(not(unix))]
pub fn os_user_name() -> Option<String> {
    None
}
