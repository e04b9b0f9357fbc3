//! CLI interface for building descriptor indexes, searching and evaluating

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use cbir_histogram::progress::{progress_bar, readable_duration};
use cbir_histogram::{
    build_descriptor_index, Config, DescriptorWriter, Evaluator, GroundTruthCatalog,
    HistogramMethod, ImageCatalog, SearchEngine,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

#[derive(Parser)]
#[command(name = "cbir")]
#[command(about = "Color histogram image retrieval and evaluation", long_about = None)]
struct Cli {
    /// JSON file with the database and output locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    paths: PathOverrides,

    #[command(subcommand)]
    command: Commands,
}

/// Per-path overrides applied on top of the config file.
#[derive(Args)]
struct PathOverrides {
    #[arg(long, global = true)]
    image_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    image_index_file: Option<PathBuf>,
    #[arg(long, global = true)]
    class_catalog_file: Option<PathBuf>,
    #[arg(long, global = true)]
    class_index_file: Option<PathBuf>,
    #[arg(long, global = true)]
    descriptor_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    pr_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    search_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy)]
enum Method {
    Histgrey,
    Histrgb,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a descriptor for every cataloged image
    Index {
        #[arg(long, value_enum)]
        method: Method,
        /// Gray bins, or red bins for the RGB histogram
        #[arg(long, default_value = "256")]
        xbins: usize,
        /// Green bins (RGB only)
        #[arg(long, default_value = "256")]
        ybins: usize,
        /// Blue bins (RGB only)
        #[arg(long, default_value = "256")]
        zbins: usize,
    },
    /// Rank the catalog by similarity to a cataloged image
    Search {
        /// Image name as listed in the image index
        name: String,
        /// Descriptor index file to search
        #[arg(long)]
        desc_file: PathBuf,
        /// Number of results to return
        #[arg(short, long, default_value = "10")]
        k: usize,
    },
    /// Compute mean precision/recall curves against the ground truth
    Eval {
        /// Descriptor index file to evaluate
        #[arg(long)]
        desc_file: PathBuf,
        /// Evaluate a single class instead of all of them
        #[arg(long)]
        class: Option<String>,
        /// Retrieval depth, defaults to the catalog size
        #[arg(short)]
        n: Option<usize>,
        /// Append an F1 column
        #[arg(long)]
        f1: bool,
    },
}

impl PathOverrides {
    fn apply(self, config: &mut Config) {
        let fields = [
            (self.image_dir, &mut config.image_dir),
            (self.image_index_file, &mut config.image_index_file),
            (self.class_catalog_file, &mut config.class_catalog_file),
            (self.class_index_file, &mut config.class_index_file),
            (self.descriptor_dir, &mut config.descriptor_dir),
            (self.pr_dir, &mut config.pr_dir),
            (self.search_dir, &mut config.search_dir),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

fn run_index(config: &Config, method: HistogramMethod) -> Result<()> {
    config.validate_for_index()?;
    let catalog = ImageCatalog::from_file(&config.image_dir, &config.image_index_file)
        .with_context(|| format!("reading {}", config.image_index_file.display()))?;
    fs::create_dir_all(&config.descriptor_dir)?;

    let desc_file = config.descriptor_path(&method);
    let mut writer = DescriptorWriter::create(&desc_file)
        .with_context(|| format!("creating {}", desc_file.display()))?;

    let start = Instant::now();
    let pb = progress_bar(catalog.count());
    build_descriptor_index(&catalog, method, &mut writer, Some(&pb))?;
    pb.finish();
    let path = writer.finish()?;

    println!("Wrote {} descriptors to {}", catalog.count(), path.display());
    println!("Duration: {}", readable_duration(start.elapsed()));
    Ok(())
}

fn run_search(config: &Config, name: &str, desc_file: &Path, k: usize) -> Result<()> {
    config.validate_for_search()?;
    let engine = SearchEngine::open(&config.image_dir, &config.image_index_file, desc_file)
        .with_context(|| format!("loading {}", desc_file.display()))?;

    let results = engine.search(name, Some(k));
    if results.is_empty() {
        println!("No results found ({} is not in the image index)", name);
        return Ok(());
    }

    println!("Top {} results:", results.len());
    for (i, record) in results.iter().enumerate() {
        println!(
            "{}. {} (distance: {:.6})",
            i + 1,
            record.name,
            record.score.unwrap_or_default()
        );
    }

    fs::create_dir_all(&config.search_dir)?;
    let output = config.search_output_path(desc_file, name, k);
    fs::write(&output, serde_json::to_vec_pretty(&results)?)
        .with_context(|| format!("writing {}", output.display()))?;
    info!("search results written to {}", output.display());
    Ok(())
}

fn run_eval(
    config: &Config,
    desc_file: &Path,
    class: Option<&str>,
    n: Option<usize>,
    f1: bool,
) -> Result<()> {
    config.validate_for_eval()?;
    let engine = SearchEngine::open(&config.image_dir, &config.image_index_file, desc_file)
        .with_context(|| format!("loading {}", desc_file.display()))?;
    let ground_truth =
        GroundTruthCatalog::from_files(&config.class_catalog_file, &config.class_index_file)
            .with_context(|| format!("reading {}", config.class_index_file.display()))?;
    let evaluator = Evaluator::new(engine, ground_truth);

    let n = n
        .filter(|&n| n > 0)
        .unwrap_or_else(|| evaluator.engine().catalog().count());
    let class_count = if class.is_some() {
        1
    } else {
        evaluator.catalog().count()
    };

    let start = Instant::now();
    let pb = progress_bar(class_count);
    let curve = evaluator.evaluate(class, Some(n), Some(&pb))?;
    pb.finish();

    fs::create_dir_all(&config.pr_dir)?;
    let output = config.pr_output_path(desc_file, n, class.unwrap_or("all"));
    let mut writer = DescriptorWriter::create(&output)?;
    if f1 {
        writer.write_rows(curve.with_f1().iter().map(|row| row.as_slice()))?;
    } else {
        writer.write_rows(curve.rows().iter().map(|row| row.as_slice()))?;
    }
    let path = writer.finish()?;

    println!("Wrote {} points to {}", curve.len(), path.display());
    println!("Duration: {}", readable_duration(start.elapsed()));
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => Config::default(),
    };
    cli.paths.apply(&mut config);

    match cli.command {
        Commands::Index {
            method,
            xbins,
            ybins,
            zbins,
        } => {
            let method = match method {
                Method::Histgrey => HistogramMethod::Gray { bins: xbins },
                Method::Histrgb => HistogramMethod::Rgb {
                    r_bins: xbins,
                    g_bins: ybins,
                    b_bins: zbins,
                },
            };
            run_index(&config, method)
        }
        Commands::Search { name, desc_file, k } => run_search(&config, &name, &desc_file, k),
        Commands::Eval {
            desc_file,
            class,
            n,
            f1,
        } => run_eval(&config, &desc_file, class.as_deref(), n, f1),
    }
}
