//! Parser configuration, optionally loaded from a TOML file.
//!
//! The config file is optional. A missing file yields `ParserConfig::default()`.
//! Unknown keys are accepted (serde with `deny_unknown_fields` off), though we
//! log a warning when the file contains potential typos.
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::xml::MAX_DEPTH_LIMIT;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Unknown hash algorithm: {0}")]
    UnknownHashAlgorithm(String),

    #[error("max_depth must be between 1 and {max}, got {value}")]
    InvalidMaxDepth { value: usize, max: usize },
}

// ============================================================================
// Hash Algorithm
// ============================================================================

/// Digest used to derive item identifiers.
///
/// The default is SHA-256 and must never change: item ids are persisted by
/// consumers, and a different default would make every stored item look new.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum HashAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Sha512_256,
}

impl HashAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha512_256 => "sha512_256",
        }
    }

    /// Hashes the concatenation of `parts` and returns lowercase hex.
    ///
    /// # Examples
    ///
    /// ```
    /// use feednorm::config::HashAlgorithm;
    ///
    /// // Concatenation, not a separator-joined string
    /// assert_eq!(
    ///     HashAlgorithm::Sha256.digest(&["ab", "c"]),
    ///     HashAlgorithm::Sha256.digest(&["abc"])
    /// );
    /// assert_eq!(
    ///     HashAlgorithm::Sha256.digest(&[]),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    pub fn digest(self, parts: &[&str]) -> String {
        match self {
            HashAlgorithm::Sha224 => hex_digest::<sha2::Sha224>(parts),
            HashAlgorithm::Sha256 => hex_digest::<sha2::Sha256>(parts),
            HashAlgorithm::Sha384 => hex_digest::<sha2::Sha384>(parts),
            HashAlgorithm::Sha512 => hex_digest::<sha2::Sha512>(parts),
            HashAlgorithm::Sha512_256 => hex_digest::<sha2::Sha512_256>(parts),
        }
    }
}

fn hex_digest<D: Digest>(parts: &[&str]) -> String
where
    sha2::digest::Output<D>: std::fmt::LowerHex,
{
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the common spellings: "SHA-256", "sha512/256", "sha512_256"
        let normalized = s.trim().to_ascii_lowercase().replace('-', "").replace('/', "_");
        match normalized.as_str() {
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "sha512_256" => Ok(HashAlgorithm::Sha512_256),
            _ => Err(ConfigError::UnknownHashAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<String> for HashAlgorithm {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Tunables for [`FeedParser`](crate::feed::FeedParser).
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Digest used for item identifiers.
    pub hash_algorithm: HashAlgorithm,

    /// SEC-003: Maximum element nesting depth accepted by the document builder,
    /// between 1 and [`MAX_DEPTH_LIMIT`].
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            max_depth: 256,
        }
    }
}

impl ParserConfig {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 2] = ["hash_algorithm", "max_depth"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(ParserConfig::default())`
    /// - Empty file → `Ok(ParserConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            hash_algorithm = %config.hash_algorithm,
            max_depth = config.max_depth,
            "Loaded parser configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text. Blank text yields the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use feednorm::config::{HashAlgorithm, ParserConfig};
    ///
    /// let config = ParserConfig::from_toml_str("hash_algorithm = \"SHA512\"").unwrap();
    /// assert_eq!(config.hash_algorithm, HashAlgorithm::Sha512);
    /// assert_eq!(config.max_depth, 256);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a `max_depth` no document could satisfy or one above
    /// [`MAX_DEPTH_LIMIT`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=MAX_DEPTH_LIMIT).contains(&self.max_depth) {
            Ok(())
        } else {
            Err(ConfigError::InvalidMaxDepth {
                value: self.max_depth,
                max: MAX_DEPTH_LIMIT,
            })
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
