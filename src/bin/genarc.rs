use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use genome_archiver::config::ManifestLoader;
use genome_archiver::domain::GenomeId;
use genome_archiver::error::GenarcError;
use genome_archiver::output::{JsonOutput, OutputMode};
use genome_archiver::packager::{
    self, ArchiveRequest, Packager, ProgressEvent, ProgressSink,
};

#[derive(Parser)]
#[command(name = "genarc")]
#[command(about = "Package reference-genome metadata into a distributable .genome archive")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a genome archive")]
    Pack(PackArgs),
    #[command(about = "List the contents of an existing archive")]
    Inspect(InspectArgs),
}

#[derive(Args)]
struct PackArgs {
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    fasta: Option<Utf8PathBuf>,

    #[arg(long)]
    gene_file: Option<Utf8PathBuf>,

    #[arg(long)]
    cytoband: Option<Utf8PathBuf>,

    #[arg(long)]
    chr_alias: Option<Utf8PathBuf>,

    #[arg(long)]
    sequence_location: Option<String>,

    #[arg(long)]
    location_override: Option<String>,

    #[arg(long, default_value = ".")]
    output_dir: Utf8PathBuf,

    #[arg(long)]
    archive_name: Option<String>,
}

#[derive(Args)]
struct InspectArgs {
    archive: Utf8PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GenarcError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GenarcError) -> u8 {
    if error.is_validation() {
        return 2;
    }
    match error {
        GenarcError::MissingManifest
        | GenarcError::ManifestRead(_)
        | GenarcError::ManifestParse(_) => 2,
        GenarcError::Filesystem(_)
        | GenarcError::Archive(_)
        | GenarcError::FastaParse { .. }
        | GenarcError::IndexParse { .. }
        | GenarcError::TooManyContigs { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Pack(args) => run_pack(args, output_mode),
        Commands::Inspect(args) => run_inspect(args, output_mode),
    }
}

fn run_pack(args: PackArgs, output_mode: OutputMode) -> miette::Result<()> {
    let request = build_request(args).into_diagnostic()?;
    let packager = Packager::new().into_diagnostic()?;

    match output_mode {
        OutputMode::NonInteractive => {
            let result = packager
                .create_archive(&request, &JsonOutput)
                .into_diagnostic()?;
            JsonOutput::print_pack(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            let result = packager
                .create_archive(&request, &StderrProgress)
                .into_diagnostic()?;
            print_pack_summary(&result);
        }
    }
    Ok(())
}

fn run_inspect(args: InspectArgs, output_mode: OutputMode) -> miette::Result<()> {
    let result = packager::inspect_archive(&args.archive).into_diagnostic()?;

    match output_mode {
        OutputMode::NonInteractive => {
            JsonOutput::print_inspect(&result).into_diagnostic()?;
        }
        OutputMode::Interactive => {
            print_inspect_summary(&result);
        }
    }
    Ok(())
}

fn build_request(args: PackArgs) -> Result<ArchiveRequest, GenarcError> {
    if args.id.is_none() && args.name.is_none() {
        return ManifestLoader::resolve(args.config.as_deref());
    }

    let id = args.id.ok_or(GenarcError::MissingField("id"))?;
    let name = args.name.ok_or(GenarcError::MissingField("name"))?;
    let genome_id: GenomeId = id.parse()?;
    let file_name = args
        .archive_name
        .unwrap_or_else(|| format!("{genome_id}.genome"));

    Ok(ArchiveRequest {
        output_dir: args.output_dir,
        file_name,
        genome_id,
        display_name: name,
        sequence_location: args.sequence_location,
        fasta: args.fasta,
        gene_file: args.gene_file,
        cytoband: args.cytoband,
        chr_alias: args.chr_alias,
        location_override: args.location_override,
    })
}

struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn event(&self, event: ProgressEvent) {
        eprintln!("{}", event.message);
    }
}

fn print_pack_summary(result: &genome_archiver::packager::PackResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}📦 genarc summary{reset}");
    println!("{green}✅ Archive: {}{reset}", result.archive_path);
    for entry in &result.entries {
        let note = if result.cytoband_generated && entry.ends_with("_cytoband.txt") {
            " (generated)"
        } else {
            ""
        };
        println!("{green}   📁 {entry}{note}{reset}");
    }
}

fn print_inspect_summary(result: &genome_archiver::packager::InspectResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}📦 {}{reset}", result.archive_path);
    for entry in &result.entries {
        println!("{green}   📁 {entry}{reset}");
    }
    for (key, value) in &result.properties {
        println!("{cyan}   {key}={value}{reset}");
    }
}
