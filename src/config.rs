//! Resolved file locations for a retrieval run

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::HistogramMethod;
use crate::error::{CbirError, Result};

/// Where the image database, ground truth and outputs live.
///
/// Passed explicitly to whatever needs it; nothing here is read from the
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub image_dir: PathBuf,
    pub image_index_file: PathBuf,
    pub class_catalog_file: PathBuf,
    pub class_index_file: PathBuf,
    pub descriptor_dir: PathBuf,
    pub pr_dir: PathBuf,
    pub search_dir: PathBuf,
}

impl Config {
    /// Read a JSON config file. Missing keys stay empty until overridden.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        serde_json::from_slice(&bytes).map_err(|e| CbirError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CbirError::Serialization(e.to_string()))
    }

    /// Check that the paths needed for indexing are set.
    pub fn validate_for_index(&self) -> Result<()> {
        require(&[
            ("image_dir", &self.image_dir),
            ("image_index_file", &self.image_index_file),
            ("descriptor_dir", &self.descriptor_dir),
        ])
    }

    pub fn validate_for_search(&self) -> Result<()> {
        require(&[
            ("image_dir", &self.image_dir),
            ("image_index_file", &self.image_index_file),
            ("search_dir", &self.search_dir),
        ])
    }

    pub fn validate_for_eval(&self) -> Result<()> {
        require(&[
            ("image_dir", &self.image_dir),
            ("image_index_file", &self.image_index_file),
            ("class_catalog_file", &self.class_catalog_file),
            ("class_index_file", &self.class_index_file),
            ("pr_dir", &self.pr_dir),
        ])
    }

    /// `<descriptor_dir>/<image index stem>_<METHOD>_<bins>`
    pub fn descriptor_path(&self, method: &HistogramMethod) -> PathBuf {
        let stem = self
            .image_index_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.descriptor_dir.join(format!(
            "{}_{}_{}",
            stem,
            method.name(),
            method.bins_label()
        ))
    }

    /// `<pr_dir>/<descriptor file name>_<n>_<class name or "all">.txt`
    pub fn pr_output_path(&self, desc_file: &Path, n: usize, class_label: &str) -> PathBuf {
        self.pr_dir
            .join(format!("{}_{}_{}.txt", file_name(desc_file), n, class_label))
    }

    /// `<search_dir>/<descriptor file name>_<query stem>_<k>.json`
    pub fn search_output_path(&self, desc_file: &Path, query: &str, k: usize) -> PathBuf {
        let query_stem = query.split('.').next().unwrap_or(query);
        self.search_dir
            .join(format!("{}_{}_{}.json", file_name(desc_file), query_stem, k))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn require(fields: &[(&str, &PathBuf)]) -> Result<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, p)| p.as_os_str().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CbirError::InvalidConfig(format!(
            "missing {}",
            missing.join(", ")
        )))
    }
}
