use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variables forced onto every launch so the backend emits
/// UTF-8-decodable output regardless of the host locale. These are applied
/// after the spec's own overrides and always win.
pub const FORCED_ENV: [(&str, &str); 2] = [("PYTHONIOENCODING", "utf-8"), ("PYTHONUTF8", "1")];

/// Launch configuration for the supervised backend process.
///
/// A `LaunchSpec` is immutable once handed to `ProcessSupervisor::start`.
/// It is supplied by the embedding config collaborator; the serde derives
/// let that collaborator persist it as JSON without this crate owning a
/// file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct LaunchSpec {
    /// Executable name or path of the backend.
    #[serde(default = "default_command")]
    #[builder(default = "default_command()")]
    pub command: String,

    /// Arguments as a single shell-style string, split at launch time.
    #[serde(default = "default_arguments")]
    #[builder(default = "default_arguments()")]
    pub arguments: String,

    /// Working directory for the backend. Empty means the user's home
    /// directory.
    #[serde(default)]
    #[builder(default)]
    pub working_directory: String,

    /// Extra environment variables merged over the inherited environment.
    #[serde(default)]
    #[builder(default)]
    #[builder(setter(custom))]
    pub env: HashMap<String, String>,
}

impl Default for LaunchSpec {
    fn default() -> Self {
        Self {
            command: default_command(),
            arguments: default_arguments(),
            working_directory: String::new(),
            env: HashMap::new(),
        }
    }
}

impl LaunchSpec {
    pub fn builder() -> LaunchSpecBuilder {
        LaunchSpecBuilder::default()
    }

    /// The directory the backend should run in: the configured one, or the
    /// user's home directory when none is configured.
    ///
    /// Returns `None` only when no directory is configured and the platform
    /// cannot report a home directory; the caller then inherits its own.
    pub fn effective_working_directory(&self) -> Option<PathBuf> {
        if self.working_directory.trim().is_empty() {
            dirs::home_dir()
        } else {
            Some(PathBuf::from(&self.working_directory))
        }
    }

    /// Split the argument string into individual arguments, honoring
    /// shell-style quoting.
    pub fn split_arguments(&self) -> Result<Vec<String>, shell_words::ParseError> {
        shell_words::split(&self.arguments)
    }
}

impl LaunchSpecBuilder {
    pub fn env<T: ToString>(&mut self, key: T, value: T) -> &mut Self {
        let map = self.env.get_or_insert_with(HashMap::new);
        map.insert(key.to_string(), value.to_string());

        self
    }

    pub fn env_multi<T: ToString, I: IntoIterator<Item = (T, T)>>(&mut self, iter: I) -> &mut Self {
        let env = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in iter {
            env.insert(key.to_string(), value.to_string());
        }
        self
    }
}

// Default value functions for serde
fn default_command() -> String {
    "open-webui".to_string()
}
fn default_arguments() -> String {
    "serve".to_string()
}
