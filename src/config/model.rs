// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// Example:
///
/// ```toml
/// [server]
/// host = "127.0.0.1"
/// port = 3333
///
/// [repos]
/// root = "/home/me/projects"
///
/// [deploy]
/// cwd_marker = "infra-gcp"
///
/// [assistant]
/// bin = "aicommits"
/// clear_env = ["GOOGLE_APPLICATION_CREDENTIALS"]
///
/// [assistant.env]
/// GIT_AUTHOR_NAME = "Deploy Bot"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Listen address from `[server]`.
    #[serde(default)]
    pub server: ServerSection,

    /// Repository discovery settings from `[repos]`.
    #[serde(default)]
    pub repos: ReposSection,

    /// Deploy endpoint settings from `[deploy]`.
    #[serde(default)]
    pub deploy: DeploySection,

    /// Assistant CLI settings from `[assistant]`.
    #[serde(default)]
    pub assistant: AssistantSection,

    /// Image conversion settings from `[convert]`.
    #[serde(default)]
    pub convert: ConvertSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3333
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[repos]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReposSection {
    /// Directory scanned one level deep for git checkouts.
    #[serde(default = "default_repos_root")]
    pub root: PathBuf,
}

fn default_repos_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReposSection {
    fn default() -> Self {
        Self {
            root: default_repos_root(),
        }
    }
}

/// `[deploy]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeploySection {
    /// Path component that marks the infra subtree of a project. When a
    /// deploy script lives under it, the prefix before the marker becomes
    /// the script's working directory; otherwise the script's own directory
    /// is used.
    #[serde(default)]
    pub cwd_marker: Option<String>,
}

/// `[assistant]` section: the external CLI used for commit generation.
///
/// The binary path is resolved here, in config, never hardcoded in the
/// engine; it travels to the runner as part of the `Operation` value.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSection {
    #[serde(default = "default_assistant_bin")]
    pub bin: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment for the assistant child process only (e.g. a
    /// substituted identity credential).
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Variables removed from the assistant child's environment (e.g. a
    /// service-account credential that must not leak into the call).
    #[serde(default)]
    pub clear_env: Vec<String>,
}

fn default_assistant_bin() -> String {
    "aicommits".to_string()
}

impl Default for AssistantSection {
    fn default() -> Self {
        Self {
            bin: default_assistant_bin(),
            args: Vec::new(),
            env: BTreeMap::new(),
            clear_env: Vec::new(),
        }
    }
}

/// `[convert]` section: the image conversion binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertSection {
    #[serde(default = "default_convert_bin")]
    pub bin: String,
}

fn default_convert_bin() -> String {
    "magick".to_string()
}

impl Default for ConvertSection {
    fn default() -> Self {
        Self {
            bin: default_convert_bin(),
        }
    }
}
