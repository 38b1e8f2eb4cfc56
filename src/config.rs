use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Path of the corpus JSON file the pipeline produces and the engine reads.
    pub corpus_file: PathBuf,
    pub pipeline: PipelineConfig,
    pub search: SearchConfig,
}

/// External rebuild pipeline: an ordered list of commands run to regenerate
/// the corpus file from source documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<PipelineStage>,
    /// Working directory for every stage. `None` inherits the process CWD.
    pub working_dir: Option<PathBuf>,
    /// Wall-clock budget for each stage.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_top_k: usize,
}

impl EngineConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.corpus_file.as_os_str().is_empty() {
            return Err("corpus_file must not be empty".into());
        }
        if self.search.default_top_k == 0 {
            return Err("search.default_top_k must be >= 1".into());
        }
        if self.pipeline.timeout_secs == 0 {
            return Err("pipeline.timeout_secs must be > 0".into());
        }
        if self.pipeline.stages.iter().any(|s| s.command.is_empty()) {
            return Err("pipeline stages must have a non-empty command".into());
        }
        Ok(())
    }

    /// Load and validate config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("helpdesk-rag");

        Self {
            corpus_file: data_dir.join("embeddings_data.json"),
            pipeline: PipelineConfig {
                stages: vec![
                    PipelineStage {
                        command: "python3".to_string(),
                        args: vec!["ImagesExtract.py".to_string()],
                    },
                    PipelineStage {
                        command: "python3".to_string(),
                        args: vec!["export_to_json.py".to_string()],
                    },
                ],
                working_dir: Some(data_dir.clone()),
                timeout_secs: 600,
            },
            search: SearchConfig { default_top_k: 3 },
            data_dir,
        }
    }
}
