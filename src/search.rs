//! Linear similarity search over the whole catalog

use std::path::Path;

use log::debug;
use rayon::prelude::*;

use crate::catalog::{ImageCatalog, ImageRecord};
use crate::descriptor_index::DescriptorIndex;
use crate::distance::euclidean_distance;
use crate::error::{CbirError, Result};

/// Ranks every cataloged image by Euclidean distance to a query image.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    catalog: ImageCatalog,
    index: DescriptorIndex,
}

impl SearchEngine {
    /// Pair a catalog with the descriptor index built against it.
    ///
    /// Fails if the index does not hold exactly one vector per image.
    pub fn new(catalog: ImageCatalog, index: DescriptorIndex) -> Result<Self> {
        if index.len() != catalog.count() {
            return Err(CbirError::corrupt(
                "<descriptor index>",
                index.len(),
                format!(
                    "index holds {} vectors but the catalog lists {} images",
                    index.len(),
                    catalog.count()
                ),
            ));
        }
        Ok(Self { catalog, index })
    }

    /// Load the image catalog and descriptor file and pair them.
    pub fn open(
        image_dir: impl AsRef<Path>,
        image_index_file: impl AsRef<Path>,
        desc_file: impl AsRef<Path>,
    ) -> Result<Self> {
        let desc_file = desc_file.as_ref();
        let catalog = ImageCatalog::from_file(image_dir.as_ref(), image_index_file)?;
        let index = DescriptorIndex::load_all(desc_file)?;
        Self::new(catalog, index).map_err(|e| match e {
            CbirError::CorruptIndex { line, reason, .. } => {
                CbirError::corrupt(desc_file, line, reason)
            }
            other => other,
        })
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &DescriptorIndex {
        &self.index
    }

    /// The `k` images closest to `query_name`, closest first.
    ///
    /// `k = None` returns the whole catalog. An unknown query yields no results.
    /// Equal scores keep catalog order, so the query itself ranks first
    /// unless an earlier image is an exact duplicate.
    pub fn search(&self, query_name: &str, k: Option<usize>) -> Vec<ImageRecord> {
        let k = k.unwrap_or_else(|| self.catalog.count());
        let Some(target) = self.catalog.get_by_name(query_name) else {
            debug!("query {} is not cataloged", query_name);
            return Vec::new();
        };
        let query = self.index[target.id].as_slice();

        let mut results: Vec<ImageRecord> = (0..self.catalog.count())
            .into_par_iter()
            .filter_map(|id| self.catalog.get_by_id(id))
            .map(|record| {
                let score = euclidean_distance(query, self.index[record.id].as_slice());
                record.with_score(score)
            })
            .collect();

        results.sort_by(|a, b| score_of(a).total_cmp(&score_of(b)));
        results.truncate(k);
        results
    }
}

fn score_of(record: &ImageRecord) -> f64 {
    record.score.unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Descriptor;
    use approx::assert_relative_eq;

    fn engine(names: &[&str], vectors: Vec<Vec<f64>>) -> SearchEngine {
        let catalog = ImageCatalog::new("/db", names.iter().map(|s| s.to_string()).collect());
        let index =
            DescriptorIndex::new(vectors.into_iter().map(Descriptor::new).collect()).unwrap();
        SearchEngine::new(catalog, index).unwrap()
    }

    fn abc() -> SearchEngine {
        engine(
            &["a", "b", "c"],
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![5.0, 5.0]],
        )
    }

    #[test]
    fn test_search_top_two() {
        let results = abc().search("a", Some(2));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "a");
        assert_eq!(results[0].score, Some(0.0));
        assert_eq!(results[1].name, "b");
        assert_eq!(results[1].score, Some(1.0));
    }

    #[test]
    fn test_search_defaults_to_whole_catalog() {
        let results = abc().search("c", None);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
        assert_relative_eq!(results[1].score.unwrap(), 41f64.sqrt());
    }

    #[test]
    fn test_search_k_larger_than_catalog() {
        assert_eq!(abc().search("b", Some(50)).len(), 3);
    }

    #[test]
    fn test_search_k_zero() {
        assert!(abc().search("b", Some(0)).is_empty());
    }

    #[test]
    fn test_unknown_query_yields_nothing() {
        assert!(abc().search("zzz", None).is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let e = engine(
            &["dup", "query", "other", "twin"],
            vec![vec![1.0], vec![1.0], vec![3.0], vec![1.0]],
        );
        let names: Vec<String> = e.search("query", None).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["dup", "query", "twin", "other"]);
    }

    #[test]
    fn test_results_carry_paths_and_ids() {
        let results = abc().search("a", Some(3));
        assert_eq!(results[2].id, 2);
        assert_eq!(results[2].path, Path::new("/db/c"));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let catalog = ImageCatalog::new("/db", vec!["a".into(), "b".into()]);
        let index = DescriptorIndex::new(vec![Descriptor::new(vec![0.0])]).unwrap();
        assert!(matches!(
            SearchEngine::new(catalog, index),
            Err(CbirError::CorruptIndex { .. })
        ));
    }
}
