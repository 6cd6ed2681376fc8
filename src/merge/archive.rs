//! Archive merging
//!
//! Extracts every included package's archives into one scratch directory,
//! later extractions overwriting earlier ones on path collision, then
//! repacks every regular file into a single deflate-compressed archive.
//!
//! The scratch directory is a `TempDir`, so it is removed on every exit
//! path, including errors.

use crate::domain::Package;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt or unreadable archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("scratch walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Merge the archives of every included package into one at `output`.
///
/// Packages are taken in the inclusion set's sorted name order and each
/// package's archives in sorted file-name order, so on a path collision the
/// lexicographically last contributor wins. Returns false (and writes
/// nothing) when no included package has an archive.
pub fn merge_archives(
    included: &BTreeSet<String>,
    packages: &BTreeMap<String, Package>,
    output: &Path,
) -> Result<bool, ArchiveError> {
    let archives: Vec<&PathBuf> = included
        .iter()
        .filter_map(|name| packages.get(name))
        .flat_map(|package| package.archives.iter())
        .collect();
    if archives.is_empty() {
        return Ok(false);
    }

    let scratch = tempfile::tempdir()?;
    for archive in &archives {
        tracing::debug!("Extracting {}", archive.display());
        extract_into(archive, scratch.path())?;
    }

    repack(scratch.path(), output)?;
    Ok(true)
}

/// Extract an archive fully into `dest`, overwriting existing files.
fn extract_into(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = fs::File::open(archive)?;
    let mut zip = ZipArchive::new(file)?;
    zip.extract(dest)?;
    Ok(())
}

/// Walk `scratch` recursively and write every regular file into a new
/// deflate-compressed archive at `output`, using paths relative to the
/// scratch root as entry names.
fn repack(scratch: &Path, output: &Path) -> Result<(), ArchiveError> {
    let file = fs::File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(scratch).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(scratch)
            .map_err(|_| io::Error::other("walk entry escaped the scratch root"))?;
        let name = relative.to_string_lossy().replace('\\', "/");

        writer.start_file(name, options)?;
        let mut source = fs::File::open(entry.path())?;
        io::copy(&mut source, &mut writer)?;
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    /// Build a package whose single archive holds the given entries.
    fn package_with_archive(root: &Path, name: &str, entries: &[(&str, &str)]) -> Package {
        let dir = root.join(name);
        let data = dir.join("Data");
        fs::create_dir_all(&data).expect("mkdir");
        let pak = data.join(format!("{}.pak", name));

        let file = fs::File::create(&pak).expect("create pak");
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (entry_name, content) in entries {
            writer.start_file(*entry_name, options).expect("start entry");
            writer.write_all(content.as_bytes()).expect("write entry");
        }
        writer.finish().expect("finish pak");

        Package { name: name.to_string(), dir, cfg_path: None, archives: vec![pak] }
    }

    fn as_map(packages: Vec<Package>) -> BTreeMap<String, Package> {
        packages.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    fn read_entry(archive: &Path, name: &str) -> String {
        let file = fs::File::open(archive).expect("open merged");
        let mut zip = ZipArchive::new(file).expect("read merged");
        let mut entry = zip.by_name(name).expect("entry present");
        let mut content = String::new();
        entry.read_to_string(&mut content).expect("read entry");
        content
    }

    #[test]
    fn test_merges_disjoint_archives() {
        let tmp = TempDir::new().expect("tmp");
        let packages = as_map(vec![
            package_with_archive(tmp.path(), "p1", &[("a.txt", "alpha")]),
            package_with_archive(tmp.path(), "p2", &[("sub/b.txt", "beta")]),
        ]);
        let included: BTreeSet<String> = packages.keys().cloned().collect();
        let output = tmp.path().join("merged.pak");

        let wrote = merge_archives(&included, &packages, &output).expect("merge");
        assert!(wrote);
        assert_eq!(read_entry(&output, "a.txt"), "alpha");
        assert_eq!(read_entry(&output, "sub/b.txt"), "beta");
    }

    #[test]
    fn test_path_collision_last_package_wins() {
        let tmp = TempDir::new().expect("tmp");
        let packages = as_map(vec![
            package_with_archive(tmp.path(), "p1", &[("textures/x.png", "from p1")]),
            package_with_archive(tmp.path(), "p2", &[("textures/x.png", "from p2")]),
        ]);
        let included: BTreeSet<String> = packages.keys().cloned().collect();
        let output = tmp.path().join("merged.pak");

        merge_archives(&included, &packages, &output).expect("merge");
        // p2 sorts after p1 and is extracted later, so its entry wins.
        assert_eq!(read_entry(&output, "textures/x.png"), "from p2");
    }

    #[test]
    fn test_excluded_package_does_not_contribute() {
        let tmp = TempDir::new().expect("tmp");
        let packages = as_map(vec![
            package_with_archive(tmp.path(), "kept", &[("f.txt", "kept")]),
            package_with_archive(tmp.path(), "zz_dropped", &[("f.txt", "dropped")]),
        ]);
        let included: BTreeSet<String> = ["kept".to_string()].into();
        let output = tmp.path().join("merged.pak");

        merge_archives(&included, &packages, &output).expect("merge");
        assert_eq!(read_entry(&output, "f.txt"), "kept");
    }

    #[test]
    fn test_no_archives_writes_nothing() {
        let tmp = TempDir::new().expect("tmp");
        let dir = tmp.path().join("cfg_only");
        fs::create_dir_all(&dir).expect("mkdir");
        let packages = as_map(vec![Package {
            name: "cfg_only".to_string(),
            dir,
            cfg_path: None,
            archives: Vec::new(),
        }]);
        let included: BTreeSet<String> = packages.keys().cloned().collect();
        let output = tmp.path().join("merged.pak");

        let wrote = merge_archives(&included, &packages, &output).expect("merge");
        assert!(!wrote);
        assert!(!output.exists());
    }

    #[test]
    fn test_corrupt_archive_fails() {
        let tmp = TempDir::new().expect("tmp");
        let dir = tmp.path().join("broken");
        let data = dir.join("Data");
        fs::create_dir_all(&data).expect("mkdir");
        let pak = data.join("broken.pak");
        fs::write(&pak, b"this is not a zip archive").expect("write");

        let packages = as_map(vec![Package {
            name: "broken".to_string(),
            dir,
            cfg_path: None,
            archives: vec![pak],
        }]);
        let included: BTreeSet<String> = packages.keys().cloned().collect();
        let output = tmp.path().join("merged.pak");

        let result = merge_archives(&included, &packages, &output);
        assert!(matches!(result, Err(ArchiveError::Zip(_))));
    }

    #[test]
    fn test_multiple_archives_within_one_package() {
        let tmp = TempDir::new().expect("tmp");
        let dir = tmp.path().join("multi");
        let data = dir.join("Data");
        fs::create_dir_all(&data).expect("mkdir");

        let mut archives = Vec::new();
        for (pak_name, entry, content) in
            [("a.pak", "one.txt", "1"), ("b.pak", "two.txt", "2")]
        {
            let pak = data.join(pak_name);
            let file = fs::File::create(&pak).expect("create pak");
            let mut writer = ZipWriter::new(file);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(entry, options).expect("start entry");
            writer.write_all(content.as_bytes()).expect("write entry");
            writer.finish().expect("finish pak");
            archives.push(pak);
        }

        let packages = as_map(vec![Package {
            name: "multi".to_string(),
            dir,
            cfg_path: None,
            archives,
        }]);
        let included: BTreeSet<String> = packages.keys().cloned().collect();
        let output = tmp.path().join("merged.pak");

        merge_archives(&included, &packages, &output).expect("merge");
        assert_eq!(read_entry(&output, "one.txt"), "1");
        assert_eq!(read_entry(&output, "two.txt"), "2");
    }
}
