use std::error::Error;
use std::path::Path;

use tempfile::TempDir;

use assetforge::cache::{FileState, IncrementalCache};
use assetforge_test_utils::builders::write_file;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn cache_path_derives_from_config_path() {
    let cache = IncrementalCache::for_config(Path::new("/project/Assetforge.toml"));
    assert_eq!(cache.path(), Path::new("/project/Assetforge.cache"));
}

#[test]
fn unseen_file_is_added_then_unchanged() -> TestResult {
    let dir = TempDir::new()?;
    let file = write_file(dir.path(), "a.png", "pixels");
    let mut cache = IncrementalCache::for_config(&dir.path().join("build.toml"));

    assert_eq!(cache.classify(&file)?, FileState::Added);
    // Same mtime on the second observation.
    assert_eq!(cache.classify(&file)?, FileState::Unchanged);
    Ok(())
}

#[test]
fn forward_mtime_is_modified_exactly_once() {
    let mut cache = IncrementalCache::for_config(Path::new("/project/build.toml"));
    let file = Path::new("/assets/textures/a.png");

    assert_eq!(cache.classify_at(file, 100.0), FileState::Added);
    assert_eq!(cache.classify_at(file, 100.0), FileState::Unchanged);
    assert_eq!(cache.classify_at(file, 200.0), FileState::Modified);
    assert_eq!(cache.classify_at(file, 200.0), FileState::Unchanged);
    // A backwards mtime is not a change.
    assert_eq!(cache.classify_at(file, 150.0), FileState::Unchanged);
}

#[test]
fn save_then_load_reproduces_the_mapping() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("build.toml");

    let mut cache = IncrementalCache::for_config(&config);
    cache.classify_at(Path::new("/assets/a.png"), 100.5);
    cache.classify_at(Path::new("/assets/b.wav"), 42.25);
    cache.save()?;

    let mut reloaded = IncrementalCache::for_config(&config);
    reloaded.load()?;

    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.recorded_mtime(Path::new("/assets/a.png")),
        Some(100.5)
    );
    assert_eq!(
        reloaded.recorded_mtime(Path::new("/assets/b.wav")),
        Some(42.25)
    );

    // And the reloaded timestamps drive classification as before.
    assert_eq!(
        reloaded.classify_at(Path::new("/assets/a.png"), 100.5),
        FileState::Unchanged
    );
    assert_eq!(
        reloaded.classify_at(Path::new("/assets/b.wav"), 43.0),
        FileState::Modified
    );
    Ok(())
}

#[test]
fn clear_removes_the_cache_file() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("build.toml");

    let mut cache = IncrementalCache::for_config(&config);
    cache.classify_at(Path::new("/assets/a.png"), 1.0);
    cache.save()?;
    assert!(cache.path().exists());

    cache.clear()?;
    assert!(!cache.path().exists());

    // Loading after a clear starts empty.
    let mut fresh = IncrementalCache::for_config(&config);
    fresh.load()?;
    assert!(fresh.is_empty());
    Ok(())
}

#[test]
fn missing_cache_file_loads_empty() -> TestResult {
    let dir = TempDir::new()?;
    let mut cache = IncrementalCache::for_config(&dir.path().join("build.toml"));
    cache.load()?;
    assert!(cache.is_empty());
    Ok(())
}
