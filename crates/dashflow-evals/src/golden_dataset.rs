//! Golden Dataset - Test scenarios for evaluation framework
//!
//! This module provides the data structures and loading utilities for golden datasets,
//! which contain curated test scenarios with expected outputs and validation criteria.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A single test scenario with input, expected output, and evaluation criteria
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoldenScenario {
    /// Unique identifier for this scenario (e.g., "`01_simple_tokio_query`")
    pub id: String,

    /// Human-readable description of what this scenario tests
    pub description: String,

    /// The user query or input message
    pub query: String,

    /// Additional context (e.g., "First turn, no conversation history")
    #[serde(default)]
    pub context: Option<String>,

    /// Strings that MUST appear in the output
    #[serde(default)]
    pub expected_output_contains: Vec<String>,

    /// Strings that MUST NOT appear in the output
    #[serde(default)]
    pub expected_output_not_contains: Vec<String>,

    /// Minimum quality score threshold (0.0-1.0)
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Maximum allowed latency in milliseconds
    #[serde(default)]
    pub max_latency_ms: Option<u64>,

    /// Expected tool calls (for validation)
    #[serde(default)]
    pub expected_tool_calls: Vec<String>,

    /// Maximum allowed cost in USD
    #[serde(default)]
    pub max_cost_usd: Option<f64>,

    /// Maximum number of tokens allowed
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Per-dimension quality thresholds
    #[serde(default)]
    pub accuracy_threshold: Option<f64>,

    #[serde(default)]
    pub relevance_threshold: Option<f64>,

    #[serde(default)]
    pub completeness_threshold: Option<f64>,

    #[serde(default)]
    pub safety_threshold: Option<f64>,

    #[serde(default)]
    pub coherence_threshold: Option<f64>,

    #[serde(default)]
    pub conciseness_threshold: Option<f64>,

    /// Use case-insensitive matching for `expected_output_contains/not_contains`
    #[serde(default)]
    pub case_insensitive_validation: bool,

    /// Difficulty level of this scenario (optional)
    #[serde(default)]
    pub difficulty: Option<crate::test_generation::Difficulty>,
}

fn default_quality_threshold() -> f64 {
    0.85
}

/// Collection of golden scenarios loaded from JSON files
#[derive(Debug, Clone)]
pub struct GoldenDataset {
    /// All loaded scenarios
    pub scenarios: Vec<GoldenScenario>,

    /// Source directory path
    pub source_dir: PathBuf,
}

impl GoldenDataset {
    /// Load all golden scenarios from a directory
    ///
    /// This recursively searches the directory for `*.json` files and loads them as scenarios.
    ///
    /// # Arguments
    /// * `dir` - Directory to search for golden dataset JSON files
    ///
    /// # Returns
    /// * `Ok(GoldenDataset)` - Successfully loaded dataset
    /// * `Err(...)` - If directory doesn't exist or no JSON files found
    ///
    /// # Example
    /// ```no_run
    /// use dashflow_evals::golden_dataset::GoldenDataset;
    ///
    /// let dataset = GoldenDataset::load("examples/apps/librarian/data/golden_dataset")
    ///     .expect("Failed to load golden dataset");
    /// println!("Loaded {} scenarios", dataset.scenarios.len());
    /// ```
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.exists() {
            anyhow::bail!("Golden dataset directory does not exist: {}", dir.display());
        }

        if !dir.is_dir() {
            anyhow::bail!("Path is not a directory: {}", dir.display());
        }

        let mut scenarios = Vec::new();

        // Recursively find all .json files
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            let path = entry.path();

            // Skip if not a JSON file
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            // Load and parse the JSON file
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            let scenario: GoldenScenario = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

            scenarios.push(scenario);
        }

        if scenarios.is_empty() {
            anyhow::bail!("No JSON files found in directory: {}", dir.display());
        }

        // Sort scenarios by ID for consistent ordering
        scenarios.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self {
            scenarios,
            source_dir: dir.to_path_buf(),
        })
    }

    /// Get number of scenarios in the dataset
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Check if dataset is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Filter scenarios by ID prefix
    #[must_use]
    pub fn filter_by_prefix(&self, prefix: &str) -> Vec<&GoldenScenario> {
        self.scenarios
            .iter()
            .filter(|s| s.id.starts_with(prefix))
            .collect()
    }

    /// Get scenario by ID
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&GoldenScenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}
