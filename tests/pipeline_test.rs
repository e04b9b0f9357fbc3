//! End-to-end tests: build an index from image files, search it, evaluate it

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use cbir_histogram::{
    build_descriptor_index, CbirError, DescriptorIndex, DescriptorWriter, Evaluator,
    GroundTruthCatalog, HistogramMethod, ImageCatalog, SearchEngine,
};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

/// Six near-solid images in two color families: reds and blues.
fn write_database(dir: &Path) {
    let images = [
        ("red1.png", [250, 10, 10]),
        ("blue1.png", [10, 10, 250]),
        ("red2.png", [230, 30, 20]),
        ("blue2.png", [20, 40, 230]),
        ("red3.png", [200, 0, 40]),
        ("blue3.png", [0, 20, 200]),
    ];
    let mut names = Vec::new();
    for (name, color) in images {
        let mut img = RgbImage::from_pixel(8, 8, Rgb(color));
        // a gray corner shared by every image
        for x in 0..2 {
            img.put_pixel(x, 0, Rgb([128, 128, 128]));
        }
        img.save(dir.join(name)).unwrap();
        names.push(name);
    }
    fs::write(dir.join("index.txt"), names.join("\n")).unwrap();
    fs::write(dir.join("classes.txt"), "red blue").unwrap();
    fs::write(
        dir.join("class_index.txt"),
        "red1.png red2.png red3.png\nblue1.png blue2.png blue3.png\n",
    )
    .unwrap();
}

fn build(dir: &Path, method: HistogramMethod) -> std::path::PathBuf {
    let catalog = ImageCatalog::from_file(dir, dir.join("index.txt")).unwrap();
    let desc = dir.join(format!("index_{}", method));
    let mut writer = DescriptorWriter::create(&desc).unwrap();
    build_descriptor_index(&catalog, method, &mut writer, None).unwrap();
    writer.finish().unwrap()
}

#[test]
fn test_rgb_pipeline_separates_color_families() {
    let dir = TempDir::new().unwrap();
    write_database(dir.path());
    let method = HistogramMethod::Rgb {
        r_bins: 4,
        g_bins: 4,
        b_bins: 4,
    };
    let desc = build(dir.path(), method);

    let index = DescriptorIndex::load_all(&desc).unwrap();
    assert_eq!(index.len(), 6);
    assert_eq!(index.dimension(), Some(64));
    for v in index.iter() {
        assert_relative_eq!(v.sum(), 1.0, epsilon = 1e-9);
    }

    let engine = SearchEngine::open(dir.path(), dir.path().join("index.txt"), &desc).unwrap();
    // every red lands in the same bins, so ties resolve in catalog order
    let results = engine.search("red2.png", Some(3));
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["red1.png", "red2.png", "red3.png"]);
    assert!(results.iter().all(|r| r.score == Some(0.0)));

    let gt = GroundTruthCatalog::from_files(
        dir.path().join("classes.txt"),
        dir.path().join("class_index.txt"),
    )
    .unwrap();
    let evaluator = Evaluator::new(engine, gt);
    let curve = evaluator.evaluate(None, None, None).unwrap();

    assert_eq!(curve.len(), 6);
    assert_eq!(curve.points()[0].precision, 1.0);
    assert_relative_eq!(curve.points()[2].precision, 1.0);
    assert_relative_eq!(curve.points()[2].recall, 1.0);
    assert_relative_eq!(curve.points()[5].recall, 1.0);
    assert_relative_eq!(curve.points()[5].precision, 0.5);
}

#[test]
fn test_gray_pipeline_and_rebuild_truncates() {
    let dir = TempDir::new().unwrap();
    write_database(dir.path());
    let method = HistogramMethod::Gray { bins: 16 };

    let first = build(dir.path(), method);
    let second = build(dir.path(), method);
    assert_eq!(first, second);

    let index = DescriptorIndex::load_all(&second).unwrap();
    assert_eq!(index.len(), 6);
    assert_eq!(index.dimension(), Some(16));
}

#[test]
fn test_index_catalog_length_mismatch_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_database(dir.path());
    let desc = dir.path().join("short_desc");
    fs::write(&desc, "1 0\n0 1\n").unwrap();

    match SearchEngine::open(dir.path(), dir.path().join("index.txt"), &desc) {
        Err(CbirError::CorruptIndex { path, .. }) => assert_eq!(path, desc),
        other => panic!("expected corrupt index, got {other:?}"),
    }
}

#[test]
fn test_undecodable_image_aborts_build() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    let catalog = ImageCatalog::new(dir.path(), vec!["broken.png".into()]);

    let mut writer = DescriptorWriter::create(dir.path().join("desc")).unwrap();
    let result = build_descriptor_index(
        &catalog,
        HistogramMethod::Gray { bins: 8 },
        &mut writer,
        None,
    );
    match result {
        Err(CbirError::InvalidImage { image, .. }) => assert!(image.ends_with("broken.png")),
        other => panic!("expected invalid image, got {other:?}"),
    }
}
