use icedge::config::{ProductSpec, OPERATIONAL_PROJ4};
use icedge::core::projection::synthetic::IdentityTransform;
use icedge::io::GridWriter;
use icedge::{ClassGrid, EdgeValidator, GeoTransform, ProductReader, RasterLayer};
use ndarray::Array2;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_geotiff_roundtrip_through_reader() {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("classes.tif");

    let grid: ClassGrid = Array2::from_shape_fn((12, 7), |(r, c)| [0i16, 1, 2, 9, 10][(r + c) % 5]);
    let gt = GeoTransform::north_up(-3950000.0, 4350000.0, 10000.0);
    GridWriter::new(gt, OPERATIONAL_PROJ4)
        .write(&grid, &path)
        .expect("Failed to write GeoTIFF");

    let spec = ProductSpec {
        layer: None,
        confidence_layer: None,
        projection: OPERATIONAL_PROJ4.to_string(),
        geo_transform: None,
    };
    let layer = ProductReader::read_layer(&path, None, &spec).expect("Failed to read GeoTIFF");

    assert_eq!(layer.data, grid);
    assert_eq!(layer.geo_transform, gt);
    assert_eq!(layer.raster_size(), (7, 12));
}

#[test]
fn test_configured_geotransform_overrides_file() {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("confidence.tif");

    let grid: ClassGrid = Array2::from_elem((4, 4), 5);
    GridWriter::new(GeoTransform::north_up(0.0, 0.0, 1.0), OPERATIONAL_PROJ4)
        .write(&grid, &path)
        .expect("Failed to write GeoTIFF");

    let mut spec = ProductSpec::operational();
    spec.layer = None;
    let layer = ProductReader::read_layer(&path, None, &spec).expect("Failed to read GeoTIFF");
    assert_eq!(layer.geo_transform, spec.geo_transform.unwrap());
}

#[test]
fn test_intermediate_products_written() {
    init_logging();
    let reference = RasterLayer::new(
        Array2::from_shape_fn((100, 100), |(_, c)| if c < 50 { 2i16 } else { 1 }),
        OPERATIONAL_PROJ4,
        GeoTransform::north_up(0.0, 100000.0, 1000.0),
    );
    let gt = GeoTransform::north_up(0.0, 100000.0, 10000.0);
    let operational = RasterLayer::new(
        Array2::from_shape_fn((10, 10), |(_, c)| if c < 5 { 2i16 } else { 1 }),
        OPERATIONAL_PROJ4,
        gt,
    );
    let confidence = RasterLayer::new(Array2::from_elem((10, 10), 3), OPERATIONAL_PROJ4, gt);

    let validator = EdgeValidator::standard();
    let (products, bundle) = validator
        .compare_layers(&reference, &operational, &confidence, &IdentityTransform, &IdentityTransform)
        .expect("Comparison failed");
    assert_eq!(bundle.agreement.agree, Some(1.0));
    assert_eq!(bundle.average_pixel_dist, 0.0);
    assert_eq!(bundle.confidence[3].relevant, 100);

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    validator
        .write_products(&products, &operational, dir.path())
        .expect("Failed to write products");

    for name in [
        "reference_aggregated.tif",
        "operational_crop.tif",
        "mask.tif",
        "reference_edge.tif",
        "operational_edge.tif",
        "reference_edge_distance.tif",
        "nodata_distance.tif",
    ] {
        assert!(dir.path().join(name).exists(), "{} not written", name);
    }
}
