//! Labeled ground-truth classes

use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::catalog::read_text;
use crate::error::{CbirError, Result};

/// A labeled class: an ordered list of member image names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLabel {
    id: usize,
    name: String,
    members: Vec<String>,
}

impl ClassLabel {
    pub fn new(id: usize, name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of members, duplicates included.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, image_name: &str) -> bool {
        self.members.iter().any(|m| m == image_name)
    }

    /// The member used as query image during evaluation.
    pub fn first_member(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }
}

/// Class names plus one membership line per class, both in id order.
#[derive(Debug, Clone)]
pub struct GroundTruthCatalog {
    class_names: Vec<String>,
    members: Vec<Vec<String>>,
}

impl GroundTruthCatalog {
    /// Build a catalog from in-memory data.
    ///
    /// Every class needs a membership list; extra lists are ignored.
    pub fn new(class_names: Vec<String>, members: Vec<Vec<String>>) -> Result<Self> {
        if members.len() < class_names.len() {
            return Err(CbirError::corrupt(
                "<class membership>",
                members.len() + 1,
                format!(
                    "{} classes but only {} membership lines",
                    class_names.len(),
                    members.len()
                ),
            ));
        }
        if members.len() > class_names.len() {
            warn!(
                "ignoring {} membership lines without a class name",
                members.len() - class_names.len()
            );
        }
        Ok(Self {
            class_names,
            members,
        })
    }

    /// Load the class catalog file (whitespace-separated names) and the
    /// membership file (one line of image names per class).
    pub fn from_files(class_file: impl AsRef<Path>, index_file: impl AsRef<Path>) -> Result<Self> {
        let class_file = class_file.as_ref();
        let index_file = index_file.as_ref();

        let class_names: Vec<String> = read_text(class_file)?
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        let members: Vec<Vec<String>> = read_text(index_file)?
            .lines()
            .map(|line| line.split_whitespace().map(str::to_owned).collect())
            .collect();
        debug!(
            "loaded {} classes from {}",
            class_names.len(),
            class_file.display()
        );

        Self::new(class_names, members).map_err(|e| match e {
            CbirError::CorruptIndex { line, reason, .. } => {
                CbirError::corrupt(index_file, line, reason)
            }
            other => other,
        })
    }

    pub fn count(&self) -> usize {
        self.class_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_names.is_empty()
    }

    /// All classes in id order. Each call starts a fresh pass.
    pub fn all(&self) -> impl ExactSizeIterator<Item = ClassLabel> + '_ {
        self.class_names
            .iter()
            .zip(&self.members)
            .enumerate()
            .map(|(id, (name, members))| ClassLabel::new(id, name.as_str(), members.clone()))
    }

    /// Class by name, linear scan.
    pub fn get(&self, name: &str) -> Option<ClassLabel> {
        let id = self.class_names.iter().position(|n| n == name)?;
        let members = self.members.get(id)?;
        Some(ClassLabel::new(id, name, members.clone()))
    }

    pub fn get_or_err(&self, name: &str) -> Result<ClassLabel> {
        self.get(name)
            .ok_or_else(|| CbirError::not_found(format!("class {}", name)))
    }
}
