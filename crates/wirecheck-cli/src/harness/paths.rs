//! Mailbox directory resolution.
//!
//! Priority for the mailbox directory:
//! 1. `WIRECHECK_MAILBOX_DIR` (explicit override)
//! 2. `XDG_RUNTIME_DIR/wirecheck` (Linux standard)
//! 3. `~/.wirecheck/mailbox` (home directory fallback)
//! 4. System temp dir (last resort)
//!
//! An explicit `--dir` flag on the CLI beats all of these.

use std::env;
use std::path::PathBuf;

/// Resolve the mailbox directory, preferring an explicit flag value.
pub fn resolve_mailbox_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(default_mailbox_dir)
}

/// Default mailbox directory with priority fallback.
///
/// Empty environment values are ignored, so `WIRECHECK_MAILBOX_DIR=""`
/// falls through rather than resolving to the current directory.
pub fn default_mailbox_dir() -> PathBuf {
    // 1. Explicit override (ignore empty)
    if let Ok(dir) = env::var("WIRECHECK_MAILBOX_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    // 2. XDG_RUNTIME_DIR (Linux standard, ignore empty)
    if let Ok(runtime_dir) = env::var("XDG_RUNTIME_DIR") {
        if !runtime_dir.is_empty() {
            return PathBuf::from(runtime_dir).join("wirecheck");
        }
    }

    // 3. Home directory fallback
    if let Some(home) = dirs::home_dir() {
        return home.join(".wirecheck").join("mailbox");
    }

    // 4. Last resort: temp dir
    env::temp_dir().join("wirecheck")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{default_mailbox_dir, resolve_mailbox_dir};

    // Env var manipulation is process-global, so these tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    // Saves and restores env vars for the duration of a test, holding the
    // mutex guard so access stays serialized.
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn new(var_names: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let vars = var_names
                .iter()
                .map(|name| (name.to_string(), std::env::var(name).ok()))
                .collect();
            Self { vars, _lock: lock }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (name, value) in &self.vars {
                match value {
                    Some(v) => std::env::set_var(name, v),
                    None => std::env::remove_var(name),
                }
            }
        }
    }

    #[test]
    fn test_explicit_flag_wins() {
        let _guard = EnvGuard::new(&["WIRECHECK_MAILBOX_DIR"]);
        std::env::set_var("WIRECHECK_MAILBOX_DIR", "/somewhere/else");

        assert_eq!(
            resolve_mailbox_dir(Some("/from/flag".into())),
            std::path::PathBuf::from("/from/flag")
        );
    }

    #[test]
    fn test_env_override() {
        let _guard = EnvGuard::new(&["WIRECHECK_MAILBOX_DIR", "XDG_RUNTIME_DIR"]);
        std::env::set_var("WIRECHECK_MAILBOX_DIR", "/custom/mailbox");
        std::env::remove_var("XDG_RUNTIME_DIR");

        assert_eq!(
            default_mailbox_dir(),
            std::path::PathBuf::from("/custom/mailbox")
        );
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let _guard = EnvGuard::new(&["WIRECHECK_MAILBOX_DIR", "XDG_RUNTIME_DIR"]);
        std::env::set_var("WIRECHECK_MAILBOX_DIR", "");
        std::env::remove_var("XDG_RUNTIME_DIR");

        // Should fall through to the home dir ladder, never to "".
        assert_ne!(default_mailbox_dir(), std::path::PathBuf::from(""));
    }

    #[test]
    fn test_xdg_runtime_dir() {
        let _guard = EnvGuard::new(&["WIRECHECK_MAILBOX_DIR", "XDG_RUNTIME_DIR"]);
        std::env::remove_var("WIRECHECK_MAILBOX_DIR");
        std::env::set_var("XDG_RUNTIME_DIR", "/run/user/1000");

        assert_eq!(
            default_mailbox_dir(),
            std::path::PathBuf::from("/run/user/1000/wirecheck")
        );
    }

    #[test]
    fn test_home_fallback() {
        let _guard = EnvGuard::new(&["WIRECHECK_MAILBOX_DIR", "XDG_RUNTIME_DIR"]);
        std::env::remove_var("WIRECHECK_MAILBOX_DIR");
        std::env::remove_var("XDG_RUNTIME_DIR");

        let result = default_mailbox_dir();
        let tail: Vec<_> = result
            .components()
            .rev()
            .take(2)
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        assert!(
            tail == ["mailbox", ".wirecheck"] || result.starts_with(std::env::temp_dir()),
            "unexpected fallback dir: {result:?}"
        );
    }
}
