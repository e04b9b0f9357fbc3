//! Image catalog: the ordered id <-> file name mapping

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CbirError, Result};

/// A cataloged image. `score` is only set on search results (lower = closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: usize,
    pub name: String,
    pub path: PathBuf,
    pub score: Option<f64>,
}

impl ImageRecord {
    /// Copy of this record carrying a search score.
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            score: Some(score),
            ..self.clone()
        }
    }
}

/// Ordered list of image names. A name's position is its id.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    image_dir: PathBuf,
    names: Vec<String>,
}

impl ImageCatalog {
    /// Create a catalog from names already in id order.
    pub fn new(image_dir: impl Into<PathBuf>, names: Vec<String>) -> Self {
        Self {
            image_dir: image_dir.into(),
            names,
        }
    }

    /// Load the whitespace-separated image index file.
    pub fn from_file(image_dir: impl Into<PathBuf>, index_file: impl AsRef<Path>) -> Result<Self> {
        let index_file = index_file.as_ref();
        let names: Vec<String> = read_text(index_file)?
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        debug!("loaded {} image names from {}", names.len(), index_file.display());
        Ok(Self::new(image_dir, names))
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// All records in id order. Each call starts a fresh pass.
    pub fn all(&self) -> impl ExactSizeIterator<Item = ImageRecord> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(move |(id, name)| self.record(id, name))
    }

    pub fn get_by_id(&self, id: usize) -> Option<ImageRecord> {
        self.names.get(id).map(|name| self.record(id, name))
    }

    /// First record whose name matches. Linear scan.
    pub fn get_by_name(&self, name: &str) -> Option<ImageRecord> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|id| self.record(id, name))
    }

    pub fn get_by_id_or_err(&self, id: usize) -> Result<ImageRecord> {
        self.get_by_id(id)
            .ok_or_else(|| CbirError::not_found(format!("image id {}", id)))
    }

    pub fn get_by_name_or_err(&self, name: &str) -> Result<ImageRecord> {
        self.get_by_name(name)
            .ok_or_else(|| CbirError::not_found(format!("image {}", name)))
    }

    fn record(&self, id: usize, name: &str) -> ImageRecord {
        ImageRecord {
            id,
            name: name.to_owned(),
            path: self.image_dir.join(name),
            score: None,
        }
    }
}

/// Read a UTF-8 text file, reporting undecodable content as a corrupt index.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| {
        CbirError::corrupt(path, 0, format!("not valid UTF-8: {}", e.utf8_error()))
    })
}
