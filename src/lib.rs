//! # CBIR Histogram
//!
//! Content-based image retrieval with color histograms.
//!
//! This library provides:
//! - Gray-level and joint RGB histogram descriptors
//! - A flat, line-oriented descriptor index
//! - Linear nearest-neighbor search by Euclidean distance
//! - Precision/recall evaluation against labeled ground-truth classes
//!
//! ## Example
//!
//! ```rust
//! use cbir_histogram::{Descriptor, DescriptorIndex, ImageCatalog, SearchEngine};
//!
//! let catalog = ImageCatalog::new("images", vec!["a".into(), "b".into(), "c".into()]);
//! let index = DescriptorIndex::new(vec![
//!     Descriptor::new(vec![0.0, 0.0]),
//!     Descriptor::new(vec![1.0, 0.0]),
//!     Descriptor::new(vec![5.0, 5.0]),
//! ])
//! .unwrap();
//! let engine = SearchEngine::new(catalog, index).unwrap();
//!
//! let results = engine.search("a", Some(2));
//! assert_eq!(results[0].name, "a");
//! assert_eq!(results[1].score, Some(1.0));
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod descriptor_index;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ground_truth;
pub mod progress;
pub mod search;
pub mod vector;

pub use catalog::{ImageCatalog, ImageRecord};
pub use config::Config;
pub use descriptor::{ColorDescriptor, HistogramMethod};
pub use descriptor_index::{build_descriptor_index, DescriptorIndex, DescriptorWriter};
pub use error::{CbirError, Result};
pub use evaluation::{Curve, Evaluator, PrecisionRecallPoint};
pub use ground_truth::{ClassLabel, GroundTruthCatalog};
pub use search::SearchEngine;
pub use vector::Descriptor;
