//! Flat on-disk descriptor index
//!
//! One line per image id, space-separated floats. Rebuilding always starts
//! from an empty file; records are only ever appended.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::ops::Index;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{debug, info};

use crate::catalog::{read_text, ImageCatalog};
use crate::descriptor::{ColorDescriptor, HistogramMethod};
use crate::error::{CbirError, Result};
use crate::vector::{encode_row, Descriptor};

/// Appends rows of floats to a freshly truncated text file.
pub struct DescriptorWriter {
    path: PathBuf,
    sep: String,
    out: BufWriter<File>,
    rows: usize,
}

impl DescriptorWriter {
    /// Remove any existing file at `path` and start a new one.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_separator(path, " ")
    }

    pub fn with_separator(path: impl AsRef<Path>, sep: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            debug!("removing previous index {}", path.display());
            fs::remove_file(&path)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            sep: sep.to_owned(),
            out: BufWriter::new(file),
            rows: 0,
        })
    }

    /// Write one record at the end of the file.
    pub fn append(&mut self, values: &[f64]) -> Result<()> {
        writeln!(self.out, "{}", encode_row(values, &self.sep))?;
        self.rows += 1;
        Ok(())
    }

    pub fn append_descriptor(&mut self, descriptor: &Descriptor) -> Result<()> {
        self.append(descriptor.as_slice())
    }

    /// Append every row in order.
    pub fn write_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a [f64]>) -> Result<()> {
        for row in rows {
            self.append(row)?;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered records. Records are guaranteed visible only after this.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.out.flush()?;
        Ok(self.path)
    }
}

/// All descriptors of one index file, held in memory. Position `i` is image id `i`.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    vectors: Vec<Descriptor>,
}

impl DescriptorIndex {
    pub fn new(vectors: Vec<Descriptor>) -> Result<Self> {
        if let Some(first) = vectors.first() {
            for v in &vectors {
                first.check_dimension(v)?;
            }
        }
        Ok(Self { vectors })
    }

    /// Read and validate the whole index file.
    ///
    /// Every line must parse as floats and all lines must share one length.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = read_text(path)?;

        let mut vectors: Vec<Descriptor> = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let v = Descriptor::parse_line(line)
                .map_err(|reason| CbirError::corrupt(path, i + 1, reason))?;
            if let Some(first) = vectors.first() {
                if !first.has_same_dimension(&v) {
                    return Err(CbirError::corrupt(
                        path,
                        i + 1,
                        format!(
                            "vector length {} differs from {} on line 1",
                            v.dimension(),
                            first.dimension()
                        ),
                    ));
                }
            }
            vectors.push(v);
        }

        debug!("loaded {} descriptors from {}", vectors.len(), path.display());
        Ok(Self { vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Shared vector length, `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Descriptor::dimension)
    }

    pub fn get(&self, id: usize) -> Option<&Descriptor> {
        self.vectors.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.vectors.iter()
    }
}

impl Index<usize> for DescriptorIndex {
    type Output = Descriptor;

    fn index(&self, id: usize) -> &Descriptor {
        &self.vectors[id]
    }
}

/// Extract `method` for every cataloged image, in id order, into `writer`.
///
/// Stops at the first image that fails; rows already appended stay written.
pub fn build_descriptor_index(
    catalog: &ImageCatalog,
    method: HistogramMethod,
    writer: &mut DescriptorWriter,
    progress: Option<&ProgressBar>,
) -> Result<()> {
    method.vector_len()?;
    info!(
        "indexing {} images with {} into {}",
        catalog.count(),
        method,
        writer.path().display()
    );

    for record in catalog.all() {
        let descriptor = ColorDescriptor::open(&record.path)?.compute(method)?;
        writer.append_descriptor(&descriptor)?;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }
    Ok(())
}
