use std::fs;
use std::io::{self, Read};

use camino::Utf8Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::GenarcError;

/// Writes a deflate-compressed zip at `dest` with one top-level entry
/// per source file, named after the source's file name, in the given
/// order. An existing file at `dest` is truncated.
pub fn create_zip(dest: &Utf8Path, sources: &[&Utf8Path]) -> Result<(), GenarcError> {
    let file = fs::File::create(dest.as_std_path())
        .map_err(|err| GenarcError::Filesystem(format!("create archive {dest}: {err}")))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for source in sources {
        let name = source
            .file_name()
            .ok_or_else(|| GenarcError::Archive(format!("source has no file name: {source}")))?;
        writer
            .start_file(name, options)
            .map_err(|err| GenarcError::Archive(format!("start entry {name}: {err}")))?;
        let mut input = fs::File::open(source.as_std_path())
            .map_err(|err| GenarcError::Filesystem(format!("open {source}: {err}")))?;
        io::copy(&mut input, &mut writer)
            .map_err(|err| GenarcError::Archive(format!("write entry {name}: {err}")))?;
    }

    writer
        .finish()
        .map_err(|err| GenarcError::Archive(format!("finish archive {dest}: {err}")))?;
    Ok(())
}

pub fn list_zip_entries(path: &Utf8Path) -> Result<Vec<String>, GenarcError> {
    let file = fs::File::open(path.as_std_path())
        .map_err(|err| GenarcError::Filesystem(format!("open archive {path}: {err}")))?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| GenarcError::Archive(err.to_string()))?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|err| GenarcError::Archive(err.to_string()))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}

pub fn read_zip_entry(path: &Utf8Path, entry_name: &str) -> Result<String, GenarcError> {
    let file = fs::File::open(path.as_std_path())
        .map_err(|err| GenarcError::Filesystem(format!("open archive {path}: {err}")))?;
    let mut archive =
        ZipArchive::new(file).map_err(|err| GenarcError::Archive(err.to_string()))?;

    let mut entry = archive
        .by_name(entry_name)
        .map_err(|err| GenarcError::Archive(format!("entry {entry_name} in {path}: {err}")))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|err| GenarcError::Archive(format!("read entry {entry_name}: {err}")))?;
    Ok(content)
}
