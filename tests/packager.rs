use std::fs;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use genome_archiver::descriptor::{Descriptor, KEY_CYTOBAND_FILE, KEY_SEQUENCE_LOCATION};
use genome_archiver::error::GenarcError;
use genome_archiver::fs_util;
use genome_archiver::packager::{
    ArchiveRequest, DESCRIPTOR_FILE_NAME, Packager, ProgressEvent, ProgressSink, inspect_archive,
};

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
    out: Utf8PathBuf,
    work: Utf8PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let out = root.join("out");
    let work = root.join("work");
    fs::create_dir_all(out.as_std_path()).unwrap();
    Fixture {
        _dir: dir,
        root,
        out,
        work,
    }
}

fn base_request(fx: &Fixture) -> ArchiveRequest {
    ArchiveRequest {
        output_dir: fx.out.clone(),
        file_name: "hg18.genome".to_string(),
        genome_id: "hg18".parse().unwrap(),
        display_name: "Human 18".to_string(),
        sequence_location: None,
        fasta: None,
        gene_file: None,
        cytoband: None,
        chr_alias: None,
        location_override: None,
    }
}

fn write_fasta(fx: &Fixture) -> Utf8PathBuf {
    let fasta = fx.root.join("genome.fa");
    // chr1 has 500 bases over ten lines, chr2 has 300 over six.
    let mut content = String::from(">chr1\n");
    for _ in 0..10 {
        content.push_str(&"A".repeat(50));
        content.push('\n');
    }
    content.push_str(">chr2\n");
    for _ in 0..6 {
        content.push_str(&"C".repeat(50));
        content.push('\n');
    }
    fs::write(fasta.as_std_path(), content).unwrap();
    fasta
}

#[test]
fn minimal_request_archives_descriptor_only() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());
    let sink = RecordingSink::default();

    let result = packager.create_archive(&base_request(&fx), &sink).unwrap();

    assert_eq!(result.entries, [DESCRIPTOR_FILE_NAME]);
    assert!(!result.cytoband_generated);

    let archive = fx.out.join("hg18.genome");
    assert_eq!(
        fs_util::read_zip_entry(&archive, DESCRIPTOR_FILE_NAME).unwrap(),
        "ordered=true\nid=hg18\nname=Human 18\n"
    );
}

#[test]
fn derives_cytoband_from_fasta() {
    let fx = fixture();
    let fasta = write_fasta(&fx);
    let packager = Packager::with_workdir_base(fx.work.clone());

    let mut request = base_request(&fx);
    request.fasta = Some(fasta.clone());
    let result = packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap();

    assert!(result.cytoband_generated);
    assert_eq!(result.entries, ["hg18_cytoband.txt", DESCRIPTOR_FILE_NAME]);

    // The index was materialized next to the fasta.
    assert!(fasta.with_file_name("genome.fa.fai").as_std_path().exists());

    let archive = fx.out.join("hg18.genome");
    assert_eq!(
        fs_util::read_zip_entry(&archive, "hg18_cytoband.txt").unwrap(),
        "chr1\t0\t500\nchr2\t0\t300\n"
    );
    let descriptor =
        Descriptor::parse(&fs_util::read_zip_entry(&archive, DESCRIPTOR_FILE_NAME).unwrap())
            .unwrap();
    assert_eq!(descriptor.get(KEY_CYTOBAND_FILE), Some("hg18_cytoband.txt"));
}

#[test]
fn supplied_files_keep_their_names_and_order() {
    let fx = fixture();
    let gene_file = fx.root.join("genes.refflat");
    let cytoband = fx.root.join("bands.txt");
    let chr_alias = fx.root.join("alias.tab");
    fs::write(gene_file.as_std_path(), "gene\tchr1\t0\t100\n").unwrap();
    fs::write(cytoband.as_std_path(), "chr1\t0\t500\n").unwrap();
    fs::write(chr_alias.as_std_path(), "1\tchr1\n").unwrap();

    let mut request = base_request(&fx);
    request.gene_file = Some(gene_file.clone());
    request.cytoband = Some(cytoband.clone());
    request.chr_alias = Some(chr_alias.clone());

    let packager = Packager::with_workdir_base(fx.work.clone());
    let result = packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap();

    assert!(!result.cytoband_generated);
    assert_eq!(
        result.entries,
        ["genes.refflat", "bands.txt", DESCRIPTOR_FILE_NAME, "alias.tab"]
    );

    // Caller-supplied inputs survive the run.
    assert!(gene_file.as_std_path().exists());
    assert!(cytoband.as_std_path().exists());
    assert!(chr_alias.as_std_path().exists());
}

#[test]
fn location_override_wins_and_is_normalized() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());

    let mut request = base_request(&fx);
    request.sequence_location = Some("C:\\data\\genome.fa".to_string());
    packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap();

    let archive = fx.out.join("hg18.genome");
    let descriptor =
        Descriptor::parse(&fs_util::read_zip_entry(&archive, DESCRIPTOR_FILE_NAME).unwrap())
            .unwrap();
    assert_eq!(
        descriptor.get(KEY_SEQUENCE_LOCATION),
        Some("C:/data/genome.fa")
    );

    request.location_override = Some("http://example.org/hg18.fa".to_string());
    packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap();
    let descriptor =
        Descriptor::parse(&fs_util::read_zip_entry(&archive, DESCRIPTOR_FILE_NAME).unwrap())
            .unwrap();
    assert_eq!(
        descriptor.get(KEY_SEQUENCE_LOCATION),
        Some("http://example.org/hg18.fa")
    );
}

#[test]
fn blank_display_name_fails_before_any_io() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());

    let mut request = base_request(&fx);
    request.display_name = "  ".to_string();
    let err = packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap_err();

    assert_matches!(err, GenarcError::MissingField("display_name"));
    assert!(err.is_validation());
    assert!(!fx.work.as_std_path().exists());
    assert!(!fx.out.join("hg18.genome").as_std_path().exists());
}

#[test]
fn compressed_fasta_is_rejected_before_any_io() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());

    for name in ["reads.zip", "genome.fasta.gz", "genome.FA.GZ"] {
        let mut request = base_request(&fx);
        request.fasta = Some(fx.root.join(name));
        let err = packager
            .create_archive(&request, &RecordingSink::default())
            .unwrap_err();
        assert_matches!(err, GenarcError::UnsupportedSequence(_));
    }
    assert!(!fx.work.as_std_path().exists());
}

#[test]
fn workdir_is_gone_after_success() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());

    packager
        .create_archive(&base_request(&fx), &RecordingSink::default())
        .unwrap();

    assert!(!fx.work.join("hg18.genome_tmp").as_std_path().exists());
}

#[test]
fn workdir_is_gone_after_failure() {
    let fx = fixture();
    let packager = Packager::with_workdir_base(fx.work.clone());

    // Fasta path that does not exist: indexing fails mid-operation.
    let mut request = base_request(&fx);
    request.fasta = Some(fx.root.join("missing.fa"));
    let err = packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap_err();

    assert_matches!(err, GenarcError::Filesystem(_));
    assert!(!fx.work.join("hg18.genome_tmp").as_std_path().exists());
}

#[test]
fn stale_workdir_is_replaced() {
    let fx = fixture();
    let stale = fx.work.join("hg18.genome_tmp");
    fs::create_dir_all(stale.as_std_path()).unwrap();
    fs::write(stale.join("leftover.txt").as_std_path(), "x").unwrap();

    let packager = Packager::with_workdir_base(fx.work.clone());
    let result = packager
        .create_archive(&base_request(&fx), &RecordingSink::default())
        .unwrap();

    assert_eq!(result.entries, [DESCRIPTOR_FILE_NAME]);
    assert!(!stale.as_std_path().exists());
}

#[test]
fn existing_archive_is_overwritten() {
    let fx = fixture();
    let archive = fx.out.join("hg18.genome");
    fs::write(archive.as_std_path(), "not a zip").unwrap();

    let packager = Packager::with_workdir_base(fx.work.clone());
    packager
        .create_archive(&base_request(&fx), &RecordingSink::default())
        .unwrap();

    let entries = fs_util::list_zip_entries(&archive).unwrap();
    assert_eq!(entries, [DESCRIPTOR_FILE_NAME]);
}

#[test]
fn progress_reports_each_phase() {
    let fx = fixture();
    let fasta = write_fasta(&fx);
    let packager = Packager::with_workdir_base(fx.work.clone());
    let sink = RecordingSink::default();

    let mut request = base_request(&fx);
    request.fasta = Some(fasta);
    packager.create_archive(&request, &sink).unwrap();

    let messages = sink.messages.lock().unwrap();
    for phase in ["Validate", "Index", "Cytoband", "Descriptor", "Archive"] {
        assert!(
            messages.iter().any(|m| m.contains(phase)),
            "missing phase {phase} in {messages:?}"
        );
    }
}

#[test]
fn inspect_reads_back_the_archive() {
    let fx = fixture();
    let fasta = write_fasta(&fx);
    let packager = Packager::with_workdir_base(fx.work.clone());

    let mut request = base_request(&fx);
    request.fasta = Some(fasta);
    request.sequence_location = Some("/data/genome.fa".to_string());
    packager
        .create_archive(&request, &RecordingSink::default())
        .unwrap();

    let result = inspect_archive(&fx.out.join("hg18.genome")).unwrap();
    assert_eq!(result.entries, ["hg18_cytoband.txt", DESCRIPTOR_FILE_NAME]);
    assert_eq!(
        result.properties.first(),
        Some(&("ordered".to_string(), "true".to_string()))
    );
    assert!(
        result
            .properties
            .contains(&("sequenceLocation".to_string(), "/data/genome.fa".to_string()))
    );
}
