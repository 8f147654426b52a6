use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::Serialize;

use crate::cytoband;
use crate::descriptor::Descriptor;
use crate::domain::GenomeId;
use crate::error::GenarcError;
use crate::fai::FastaIndex;
use crate::fs_util;
use crate::workdir::Workdir;

pub const DESCRIPTOR_FILE_NAME: &str = "property.txt";

/// Compressed inputs are refused outright: the archive format has no
/// re-compression semantics for them.
const REJECTED_SEQUENCE_EXTENSIONS: &[&str] = &[".zip", ".gz"];

/// Everything a single archive build needs. Optional members are real
/// options, never sentinel paths; an absent member is simply left out
/// of the archive and the descriptor.
#[derive(Debug, Clone)]
pub struct ArchiveRequest {
    pub output_dir: Utf8PathBuf,
    pub file_name: String,
    pub genome_id: GenomeId,
    pub display_name: String,
    pub sequence_location: Option<String>,
    pub fasta: Option<Utf8PathBuf>,
    pub gene_file: Option<Utf8PathBuf>,
    pub cytoband: Option<Utf8PathBuf>,
    pub chr_alias: Option<Utf8PathBuf>,
    pub location_override: Option<String>,
}

impl ArchiveRequest {
    fn validate(&self) -> Result<(), GenarcError> {
        if self.output_dir.as_str().trim().is_empty() {
            return Err(GenarcError::MissingField("output_dir"));
        }
        if self.file_name.trim().is_empty() {
            return Err(GenarcError::MissingField("file_name"));
        }
        if self.display_name.trim().is_empty() {
            return Err(GenarcError::MissingField("display_name"));
        }
        if let Some(fasta) = &self.fasta {
            let name = fasta.file_name().unwrap_or_default().to_ascii_lowercase();
            for extension in REJECTED_SEQUENCE_EXTENSIONS {
                if name.ends_with(extension) {
                    return Err(GenarcError::UnsupportedSequence(format!(
                        "{name}: compressed sequence files are not supported, select an uncompressed fasta"
                    )));
                }
            }
        }
        Ok(())
    }

    /// A non-empty override replaces the recorded location; it never
    /// affects where the sequence actually lives.
    fn effective_location(&self) -> Option<&str> {
        match &self.location_override {
            Some(location) if !location.trim().is_empty() => Some(location),
            _ => self.sequence_location.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct PackResult {
    pub archive_path: String,
    pub entries: Vec<String>,
    pub cytoband_generated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectResult {
    pub archive_path: String,
    pub entries: Vec<String>,
    pub properties: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct Packager {
    workdir_base: Utf8PathBuf,
}

impl Packager {
    pub fn new() -> Result<Self, GenarcError> {
        let workdir_base = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("genome-archiver"))
                    .ok()
            })
            .ok_or_else(|| {
                GenarcError::Filesystem("unable to resolve cache directory".to_string())
            })?;
        Ok(Self { workdir_base })
    }

    pub fn with_workdir_base(workdir_base: Utf8PathBuf) -> Self {
        Self { workdir_base }
    }

    /// Builds the archive at `<output_dir>/<file_name>`, overwriting any
    /// file already there. The staging directory and every intermediate
    /// file are gone by the time this returns, on success and failure
    /// alike; a partially written archive may remain after a failure.
    pub fn create_archive(
        &self,
        request: &ArchiveRequest,
        sink: &dyn ProgressSink,
    ) -> Result<PackResult, GenarcError> {
        sink.event(ProgressEvent {
            message: "phase=Validate; checking request".to_string(),
        });
        request.validate()?;

        let workdir = Workdir::create(&self.workdir_base, &format!("{}_tmp", request.file_name))?;

        let mut cytoband_path = request.cytoband.clone();
        let mut cytoband_generated = false;

        if let Some(fasta) = &request.fasta {
            let fai_path = FastaIndex::sibling_path(fasta);
            let built = if fai_path.as_std_path().exists() {
                None
            } else {
                sink.event(ProgressEvent {
                    message: format!("phase=Index; indexing {fasta}"),
                });
                Some(FastaIndex::build(fasta, &fai_path)?)
            };

            if cytoband_path.is_none() {
                let index = match built {
                    Some(index) => index,
                    None => {
                        sink.event(ProgressEvent {
                            message: format!("phase=Index; loading {fai_path}"),
                        });
                        FastaIndex::load(&fai_path)?
                    }
                };
                let path = workdir.join(&format!("{}_cytoband.txt", request.genome_id));
                sink.event(ProgressEvent {
                    message: format!("phase=Cytoband; deriving {} bands", index.len()),
                });
                cytoband::write_cytoband(&index, &path)?;
                cytoband_path = Some(path);
                cytoband_generated = true;
            }
        }

        sink.event(ProgressEvent {
            message: "phase=Descriptor; writing property.txt".to_string(),
        });
        let descriptor = Descriptor::build(
            &request.genome_id,
            &request.display_name,
            cytoband_path.as_deref().and_then(Utf8Path::file_name),
            request.gene_file.as_deref().and_then(Utf8Path::file_name),
            request.chr_alias.as_deref().and_then(Utf8Path::file_name),
            request.effective_location(),
        );
        let descriptor_path = workdir.join(DESCRIPTOR_FILE_NAME);
        descriptor.write(&descriptor_path)?;

        let mut members: Vec<&Utf8Path> = Vec::new();
        if let Some(file) = &request.gene_file {
            members.push(file);
        }
        if let Some(file) = &cytoband_path {
            members.push(file);
        }
        members.push(&descriptor_path);
        if let Some(file) = &request.chr_alias {
            members.push(file);
        }

        let archive_path = request.output_dir.join(&request.file_name);
        sink.event(ProgressEvent {
            message: format!("phase=Archive; writing {archive_path}"),
        });
        fs_util::create_zip(&archive_path, &members)?;

        let entries = members
            .iter()
            .filter_map(|path| path.file_name())
            .map(str::to_string)
            .collect();

        workdir.close()?;

        Ok(PackResult {
            archive_path: archive_path.to_string(),
            entries,
            cytoband_generated,
        })
    }
}

pub fn inspect_archive(path: &Utf8Path) -> Result<InspectResult, GenarcError> {
    let entries = fs_util::list_zip_entries(path)?;
    let text = fs_util::read_zip_entry(path, DESCRIPTOR_FILE_NAME)?;
    let descriptor = Descriptor::parse(&text)?;
    Ok(InspectResult {
        archive_path: path.to_string(),
        entries,
        properties: descriptor.pairs().to_vec(),
    })
}
