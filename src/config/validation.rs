use super::{ConfigError, RouterConfig, SinkType, file_sink_spec_or_err};

impl RouterConfig {
    /// Checks the structural invariants that regex compilation and sink
    /// construction rely on. Runs before any sink is opened, so a failed
    /// validation leaves no half-built state behind.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sinks = self.resolved_sinks();

        for spec in &sinks {
            if spec.kind != SinkType::File {
                continue;
            }
            let file = file_sink_spec_or_err(spec)?;

            if file.max_size == 0 {
                return Err(ConfigError::InvalidSink {
                    sink: spec.id.clone(),
                    reason: "maxSize must be greater than 0".to_string(),
                });
            }
            if file.max_files == 0 {
                return Err(ConfigError::InvalidSink {
                    sink: spec.id.clone(),
                    reason: "maxFiles must be greater than 0".to_string(),
                });
            }
            if !file.path.is_dir() {
                return Err(ConfigError::InvalidSink {
                    sink: spec.id.clone(),
                    reason: format!("path is not an existing directory: {}", file.path.display()),
                });
            }
        }

        // A binding naming an absent sink is a configuration error, never
        // silently dropped.
        for binding in &self.rules {
            if !sinks.iter().any(|s| s.id == binding.sink) {
                return Err(ConfigError::DanglingRule(binding.sink.clone()));
            }
        }

        Ok(())
    }
}
