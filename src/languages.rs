//! Language backends for compilation and execution

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

/// A supported submission language. The set is closed; callers holding a
/// free-form name go through [`Language::from_name`] and treat `None` as an
/// unsupported-language compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    Cpp,
    Java,
    JavaScript,
}

impl Language {
    /// Parse a language name, accepting common aliases. Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "python" | "py" | "python3" => Some(Language::Python),
            "cpp" | "c++" => Some(Language::Cpp),
            "java" => Some(Language::Java),
            "javascript" | "js" | "node" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Canonical key into the backend table
    pub fn key(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::JavaScript => "javascript",
        }
    }
}

/// Backend descriptor for one language
#[derive(Debug, Clone)]
pub struct Backend {
    /// Required source file name. Fixed per language; Java enforces the
    /// `Main.java` / `Main` entry-point convention regardless of caller input.
    pub source_file: String,
    /// Build command tokens (None for interpreted languages)
    pub compile_command: Option<Vec<String>>,
    /// Run command tokens
    pub run_command: Vec<String>,
    /// Shown to the caller when the toolchain is missing from the host
    pub install_hint: Option<String>,
}

impl Backend {
    pub fn has_build_step(&self) -> bool {
        self.compile_command.is_some()
    }
}

/// Raw TOML configuration for a language backend
#[derive(Debug, Deserialize)]
struct RawBackend {
    source_file: String,
    compile_command: Option<String>,
    run_command: String,
    install_hint: Option<String>,
}

/// Global backend table, loaded once from the embedded descriptor file
static BACKENDS: OnceLock<HashMap<String, Backend>> = OnceLock::new();

fn load_backends() -> HashMap<String, Backend> {
    let content = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/files/languages.toml"
    ));
    parse_backends(content).expect("embedded languages.toml is well-formed")
}

fn parse_backends(content: &str) -> anyhow::Result<HashMap<String, Backend>> {
    let raw: HashMap<String, RawBackend> = toml::from_str(content)?;

    let backends = raw
        .into_iter()
        .map(|(name, raw)| {
            let backend = Backend {
                source_file: raw.source_file,
                compile_command: raw.compile_command.map(|cmd| into_command(&cmd)),
                run_command: into_command(&raw.run_command),
                install_hint: raw.install_hint,
            };
            (name.to_lowercase(), backend)
        })
        .collect();

    Ok(backends)
}

/// Look up the backend descriptor for a language. Absence is a request-time
/// condition the judge reports as a compile error, not a panic.
pub fn backend_for(language: Language) -> Option<Backend> {
    BACKENDS
        .get_or_init(load_backends)
        .get(language.key())
        .cloned()
}

/// Expand `{src}` / `{exe}` / `{dir}` placeholders in a command template.
pub fn expand_command(tokens: &[String], src: &Path, exe: &Path, dir: &Path) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            token
                .replace("{src}", &src.to_string_lossy())
                .replace("{exe}", &exe.to_string_lossy())
                .replace("{dir}", &dir.to_string_lossy())
        })
        .collect()
}

fn into_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(|s| s.to_string()).collect()
}
