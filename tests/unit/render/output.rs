use image::Rgba;

use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "adcraft_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn thumbnail_dims_bound_the_longer_side() {
    assert_eq!(thumbnail_dims(1080, 1080, 400), (400, 400));
    assert_eq!(thumbnail_dims(1080, 1920, 400), (225, 400));
    assert_eq!(thumbnail_dims(300, 200, 400), (300, 200));
    assert_eq!(thumbnail_dims(4000, 1, 400), (400, 1));
}

#[test]
fn render_ids_are_unique_and_timestamped() {
    let a = OutputStore::new_render_id();
    let b = OutputStore::new_render_id();
    assert_ne!(a, b);
    let (ts, suffix) = a.split_once('_').unwrap();
    assert!(ts.parse::<u64>().is_ok());
    assert_eq!(suffix.len(), 8);
}

#[test]
fn persist_writes_image_and_thumbnail() {
    let tmp = temp_dir("output_persist");
    let store = OutputStore::open(&tmp, 16).unwrap();
    let img = RgbaImage::from_pixel(64, 32, Rgba([200, 10, 10, 255]));

    let stored = store.persist(&img, 90).unwrap();
    assert_eq!(
        stored.image_path.file_name().unwrap().to_str().unwrap(),
        format!("{}.jpg", stored.render_id)
    );
    let thumb = image::open(&stored.thumbnail_path).unwrap();
    assert_eq!((thumb.width(), thumb.height()), (16, 8));
    let main = image::open(&stored.image_path).unwrap();
    assert_eq!((main.width(), main.height()), (64, 32));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn thumbnail_failure_removes_main_image() {
    let tmp = temp_dir("output_orphan");
    let store = OutputStore::open(&tmp, 16).unwrap();
    // A directory squatting on the thumbnail path makes that write fail.
    std::fs::create_dir_all(tmp.join("fixed_thumb.jpg")).unwrap();

    let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
    let err = store.persist_as("fixed", &img, 80).unwrap_err();
    assert!(matches!(err, AdcraftError::Storage(_)));
    assert!(!tmp.join("fixed.jpg").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn open_rejects_zero_thumbnail_bound() {
    let tmp = temp_dir("output_zero");
    assert!(OutputStore::open(&tmp, 0).is_err());
}
