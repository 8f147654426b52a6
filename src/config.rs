use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::GenomeId;
use crate::error::GenarcError;
use crate::packager::ArchiveRequest;

pub const DEFAULT_MANIFEST: &str = "genarc.json";

/// Declarative archive request, read from `genarc.json`. Keys mirror
/// the descriptor vocabulary.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fasta: Option<Utf8PathBuf>,
    #[serde(default)]
    pub gene_file: Option<Utf8PathBuf>,
    #[serde(default)]
    pub cytoband: Option<Utf8PathBuf>,
    #[serde(default)]
    pub chr_alias: Option<Utf8PathBuf>,
    #[serde(default)]
    pub sequence_location: Option<String>,
    #[serde(default)]
    pub location_override: Option<String>,
    #[serde(default)]
    pub output_dir: Option<Utf8PathBuf>,
    #[serde(default)]
    pub archive_name: Option<String>,
}

pub struct ManifestLoader;

impl ManifestLoader {
    pub fn resolve(path: Option<&str>) -> Result<ArchiveRequest, GenarcError> {
        let manifest_path = Utf8PathBuf::from(path.unwrap_or(DEFAULT_MANIFEST));
        if path.is_none() && !manifest_path.as_std_path().exists() {
            return Err(GenarcError::MissingManifest);
        }

        let content = fs::read_to_string(manifest_path.as_std_path())
            .map_err(|_| GenarcError::ManifestRead(manifest_path.clone()))?;
        let manifest: Manifest = serde_json::from_str(&content)
            .map_err(|err| GenarcError::ManifestParse(err.to_string()))?;

        Self::resolve_manifest(manifest)
    }

    pub fn resolve_manifest(manifest: Manifest) -> Result<ArchiveRequest, GenarcError> {
        let genome_id: GenomeId = manifest.id.parse()?;
        let file_name = manifest
            .archive_name
            .unwrap_or_else(|| format!("{genome_id}.genome"));

        Ok(ArchiveRequest {
            output_dir: manifest.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
            file_name,
            genome_id,
            display_name: manifest.name,
            sequence_location: manifest.sequence_location,
            fasta: manifest.fasta,
            gene_file: manifest.gene_file,
            cytoband: manifest.cytoband,
            chr_alias: manifest.chr_alias,
            location_override: manifest.location_override,
        })
    }
}
