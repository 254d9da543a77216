//! Provider credential references.
//!
//! The API key for the LLM provider is never stored inline in the main
//! config by default; it is referenced and resolved exactly once when the
//! [`crate::session::ChatClient`] is constructed. A reference that cannot be
//! resolved is a fatal configuration error at startup, not a retried one.

use crate::error::{ChatError, Result};
use serde::{Deserialize, Serialize};

/// Reference to a provider API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretRef {
    /// No API key. Explicit opt-in for keyless local servers
    /// (Ollama, LM Studio, vLLM).
    None,
    /// Inline literal key (discouraged; use env/command when possible).
    Literal { value: String },
    /// Resolve the API key from an environment variable.
    Env { var: String },
    /// Resolve the API key by running a local command.
    Command { cmd: String },
}

impl Default for SecretRef {
    fn default() -> Self {
        Self::Env {
            var: "GEMINI_API_KEY".to_owned(),
        }
    }
}

impl SecretRef {
    /// Resolve the referenced key.
    ///
    /// Returns `Ok(None)` only for the explicit [`SecretRef::None`] variant.
    /// A missing or empty environment variable, or a failing command, is an
    /// error — callers treat this as fatal.
    pub fn resolve(&self) -> Result<Option<String>> {
        match self {
            Self::None => Ok(None),
            Self::Literal { value } => Ok(Some(value.clone())),
            Self::Env { var } => {
                let value = std::env::var(var).map_err(|_| {
                    ChatError::Config(format!("provider credential env var is missing: {var}"))
                })?;
                if value.trim().is_empty() {
                    return Err(ChatError::Config(format!(
                        "provider credential env var is empty: {var}"
                    )));
                }
                Ok(Some(value))
            }
            Self::Command { cmd } => {
                if cmd.trim().is_empty() {
                    return Err(ChatError::Config(
                        "provider credential command is empty".to_owned(),
                    ));
                }
                let output = std::process::Command::new("/bin/sh")
                    .arg("-lc")
                    .arg(cmd)
                    .output()
                    .map_err(|e| {
                        ChatError::Config(format!("failed to run provider credential command: {e}"))
                    })?;

                if !output.status.success() {
                    return Err(ChatError::Config(format!(
                        "provider credential command failed with status {}",
                        output
                            .status
                            .code()
                            .map_or_else(|| "unknown".to_owned(), |c| c.to_string())
                    )));
                }

                let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
                if value.is_empty() {
                    return Err(ChatError::Config(
                        "provider credential command returned empty output".to_owned(),
                    ));
                }

                Ok(Some(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    struct EnvGuard {
        key: &'static str,
        old: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let old = std::env::var_os(key);
            unsafe { std::env::set_var(key, value) };
            Self { key, old }
        }

        fn unset(key: &'static str) -> Self {
            let old = std::env::var_os(key);
            unsafe { std::env::remove_var(key) };
            Self { key, old }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old {
                Some(v) => unsafe { std::env::set_var(self.key, v) },
                None => unsafe { std::env::remove_var(self.key) },
            }
        }
    }

    #[test]
    fn none_resolves_to_no_key() {
        assert_eq!(SecretRef::None.resolve().unwrap(), None);
    }

    #[test]
    fn literal_resolves() {
        let secret = SecretRef::Literal {
            value: "sk-inline".to_owned(),
        };
        assert_eq!(secret.resolve().unwrap(), Some("sk-inline".to_owned()));
    }

    #[test]
    fn env_resolves() {
        let _env = EnvGuard::set("DOST_TEST_KEY", "secret-123");
        let secret = SecretRef::Env {
            var: "DOST_TEST_KEY".to_owned(),
        };
        assert_eq!(secret.resolve().unwrap(), Some("secret-123".to_owned()));
    }

    #[test]
    fn env_missing_errors() {
        let _env = EnvGuard::unset("DOST_TEST_KEY_MISSING");
        let secret = SecretRef::Env {
            var: "DOST_TEST_KEY_MISSING".to_owned(),
        };
        assert!(secret.resolve().is_err());
    }

    #[test]
    fn env_empty_errors() {
        let _env = EnvGuard::set("DOST_TEST_KEY_EMPTY", "  ");
        let secret = SecretRef::Env {
            var: "DOST_TEST_KEY_EMPTY".to_owned(),
        };
        assert!(secret.resolve().is_err());
    }

    #[test]
    fn empty_command_errors() {
        let secret = SecretRef::Command {
            cmd: "   ".to_owned(),
        };
        assert!(secret.resolve().is_err());
    }
}
