//! Configuration schema for the routing engine.
//!
//! A configuration document is a JSON object with the router's settings
//! under the `aace.logger` key:
//!
//! ```json
//! {
//!   "aace.logger": {
//!     "sinks": [
//!       {
//!         "id": "default",
//!         "type": "file",
//!         "config": {
//!           "path": "/var/log/app",
//!           "prefix": "aace",
//!           "maxSize": 5242880,
//!           "maxFiles": 3,
//!           "append": true
//!         },
//!         "rules": [{ "level": "Info" }]
//!       }
//!     ],
//!     "rules": [
//!       { "sink": "default", "rule": { "level": "Warn", "source": "aace\\..*" } }
//!     ]
//!   }
//! }
//! ```
//!
//! Rules may be declared inline under a sink or as top-level bindings that
//! name a sink id; both append to that sink's rule list. The configuration
//! is parsed and validated once at startup and is immutable afterwards.

mod validation;

use crate::domain::Level;
use crate::rules::RuleError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Key the router's section lives under in a configuration document.
pub const CONFIG_KEY: &str = "aace.logger";

pub const DEFAULT_FILE_PREFIX: &str = "aace";
pub const DEFAULT_MAX_SIZE: u64 = 5_242_880;
pub const DEFAULT_MAX_FILES: u32 = 3;
pub const DEFAULT_APPEND: bool = true;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("sink '{sink}': {source}")]
    Filter {
        sink: String,
        #[source]
        source: RuleError,
    },
    #[error("rule references unknown sink '{0}'")]
    DanglingRule(String),
    #[error("sink '{sink}': {reason}")]
    InvalidSink { sink: String, reason: String },
    #[error("sink '{sink}': {source}")]
    Io {
        sink: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkType {
    Console,
    Syslog,
    File,
}

/// File sink settings. `path` must name an existing writable directory;
/// the active log file is `<path>/<prefix>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSinkSpec {
    pub path: PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(rename = "maxSize", default = "default_max_size")]
    pub max_size: u64,
    #[serde(rename = "maxFiles", default = "default_max_files")]
    pub max_files: u32,
    #[serde(default = "default_append")]
    pub append: bool,
}

/// One admission rule as declared in configuration. Absent filters are
/// wildcards; the level is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub level: Level,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub message: String,
}

/// A top-level rule binding: appends `rule` to the rule list of the sink
/// named by `sink`, which must exist in the same configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBinding {
    pub sink: String,
    pub rule: RuleSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SinkType,
    #[serde(default)]
    pub config: Option<FileSinkSpec>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// The full router configuration: an ordered sink list plus top-level rule
/// bindings. Built once at startup, immutable for the router's lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub sinks: Vec<SinkSpec>,
    #[serde(default)]
    pub rules: Vec<RuleBinding>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigDocument {
    #[serde(rename = "aace.logger")]
    logger: RouterConfig,
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration document out of its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = serde_json::from_str(json)?;
        Ok(doc.logger)
    }

    /// Parses a configuration document out of an already-decoded value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = serde_json::from_value(value)?;
        Ok(doc.logger)
    }

    /// Adds a console sink admitting events at or above `level`.
    pub fn console_sink(self, id: impl Into<String>, level: Level) -> Self {
        self.sink_with_level(id, SinkType::Console, None, level)
    }

    /// Adds a syslog sink admitting events at or above `level`.
    pub fn syslog_sink(self, id: impl Into<String>, level: Level) -> Self {
        self.sink_with_level(id, SinkType::Syslog, None, level)
    }

    /// Adds a file sink with the default rotation settings (prefix "aace",
    /// 5 MiB, 3 files, append).
    pub fn file_sink(self, id: impl Into<String>, level: Level, path: impl Into<PathBuf>) -> Self {
        self.file_sink_with(
            id,
            level,
            path,
            DEFAULT_FILE_PREFIX,
            DEFAULT_MAX_SIZE,
            DEFAULT_MAX_FILES,
            DEFAULT_APPEND,
        )
    }

    /// Adds a file sink with explicit rotation settings.
    #[allow(clippy::too_many_arguments)]
    pub fn file_sink_with(
        self,
        id: impl Into<String>,
        level: Level,
        path: impl Into<PathBuf>,
        prefix: impl Into<String>,
        max_size: u64,
        max_files: u32,
        append: bool,
    ) -> Self {
        let spec = FileSinkSpec {
            path: path.into(),
            prefix: prefix.into(),
            max_size,
            max_files,
            append,
        };
        self.sink_with_level(id, SinkType::File, Some(spec), level)
    }

    /// Adds a top-level rule binding admitting events at or above `level`.
    pub fn rule(self, sink: impl Into<String>, level: Level) -> Self {
        self.rule_with(sink, level, "", "", "")
    }

    /// Adds a top-level rule binding with explicit field filters.
    pub fn rule_with(
        mut self,
        sink: impl Into<String>,
        level: Level,
        source: impl Into<String>,
        tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(RuleBinding {
            sink: sink.into(),
            rule: RuleSpec {
                level,
                source: source.into(),
                tag: tag.into(),
                message: message.into(),
            },
        });
        self
    }

    fn sink_with_level(
        mut self,
        id: impl Into<String>,
        kind: SinkType,
        config: Option<FileSinkSpec>,
        level: Level,
    ) -> Self {
        self.sinks.push(SinkSpec {
            id: id.into(),
            kind,
            config,
            rules: vec![RuleSpec {
                level,
                source: String::new(),
                tag: String::new(),
                message: String::new(),
            }],
        });
        self
    }

    /// Sink list with duplicate ids resolved: registering an id again
    /// replaces the earlier entry in place (last write wins).
    pub(crate) fn resolved_sinks(&self) -> Vec<SinkSpec> {
        let mut resolved: Vec<SinkSpec> = Vec::with_capacity(self.sinks.len());
        for spec in &self.sinks {
            if let Some(existing) = resolved.iter_mut().find(|s| s.id == spec.id) {
                *existing = spec.clone();
            } else {
                resolved.push(spec.clone());
            }
        }
        resolved
    }
}

fn default_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

fn default_max_files() -> u32 {
    DEFAULT_MAX_FILES
}

fn default_append() -> bool {
    DEFAULT_APPEND
}

pub(crate) fn file_sink_spec_or_err(spec: &SinkSpec) -> Result<&FileSinkSpec, ConfigError> {
    spec.config.as_ref().ok_or_else(|| ConfigError::InvalidSink {
        sink: spec.id.clone(),
        reason: "file sink requires a config block".to_string(),
    })
}
