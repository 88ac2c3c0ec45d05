//! Command-line interface for the retriever.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::batch::{process_files, total_summary};
use crate::classify::Classifier;
use crate::config::{OutputFormat, RetrieverConfig};
use crate::error::{RetrieverError, Result};
use crate::processor::{RunReport, StreamProcessor};
use crate::retriever::retrieve;
use crate::sink::{DryRunSink, FilesystemSink, Sink};
use crate::status::{save_status, RunStatusFile, StreamStatus};
use crate::trigger::{ArchiveKind, ArchiveName, TriggerPayload};
use crate::types::RunSummary;

/// USPTO bulk retriever - Split bulk XML files and keep the relevant documents.
#[derive(Parser)]
#[command(name = "uspto-retriever")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split local bulk XML files and store the relevant documents.
    Process {
        /// Bulk XML files (e.g., ipg200107.xml)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum number of files processed at the same time
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Download a weekly archive from USPTO and process it.
    Fetch {
        /// Archive to download
        #[arg(short, long, value_enum, default_value_t = ArchiveKind::Grant)]
        kind: ArchiveKind,

        /// Publication year (default: current week)
        #[arg(long, requires = "week")]
        year: Option<i32>,

        /// ISO week of the publication year
        #[arg(long, requires = "year")]
        week: Option<u32>,

        /// Job payload as JSON, e.g. '{"year":2020,"week":2}'
        #[arg(long, conflicts_with_all = ["year", "week"])]
        payload: Option<String>,

        /// Scratch directory for the archive (default: ./tmp)
        #[arg(long)]
        tmp_dir: Option<PathBuf>,

        /// Keep the downloaded archive and extracted file
        #[arg(long)]
        keep_tmp: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Options shared by all commands that store documents.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output directory (default: ./output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Storage format of forwarded documents
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// IPC sections whose grants and applications are kept (default: A,C)
    #[arg(long, value_delimiter = ',')]
    pub sections: Vec<String>,

    /// Classify documents without storing them
    #[arg(long)]
    pub dry_run: bool,
}

impl OutputArgs {
    fn apply(&self, mut config: RetrieverConfig) -> RetrieverConfig {
        if let Some(output) = &self.output {
            config = config.with_output_dir(output);
        }
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        config
    }

    fn classifier(&self) -> Classifier {
        if self.sections.is_empty() {
            Classifier::default()
        } else {
            Classifier::new(self.sections.iter().cloned())
        }
    }

    fn sink(&self, config: &RetrieverConfig) -> Arc<dyn Sink> {
        if self.dry_run {
            Arc::new(DryRunSink::new(config.format))
        } else {
            Arc::new(FilesystemSink::new(&config.output_dir, config.format))
        }
    }
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = RetrieverConfig::from_env()?;

    match cli.command {
        Commands::Process {
            files,
            jobs,
            output,
        } => {
            let mut config = output.apply(config);
            if let Some(jobs) = jobs {
                config = config.with_max_concurrency(jobs);
            }
            process_command(files, &config, &output).await
        }
        Commands::Fetch {
            kind,
            year,
            week,
            payload,
            tmp_dir,
            keep_tmp,
            output,
        } => {
            let payload = match payload {
                Some(body) => TriggerPayload::from_json(&body)?,
                None => TriggerPayload { year, week },
            };
            let mut config = output.apply(config);
            if let Some(tmp_dir) = tmp_dir {
                config = config.with_tmp_dir(tmp_dir);
            }
            if keep_tmp {
                config = config.with_keep_tmp(true);
            }
            fetch_command(kind, payload, config, &output).await
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Execute the process command.
async fn process_command(
    files: Vec<PathBuf>,
    config: &RetrieverConfig,
    args: &OutputArgs,
) -> Result<()> {
    println!(
        "{} {} bulk file(s) into {}",
        style("Processing").bold(),
        style(files.len()).cyan(),
        style(config.output_dir.display()).green()
    );
    println!();

    let pb = spinner(format!("Splitting {} file(s)...", files.len()));
    let reports = process_files(
        files,
        args.sink(config),
        args.classifier(),
        config.max_concurrency,
    )
    .await;
    pb.finish_and_clear();

    for file in &reports {
        print_report(&file_label(&file.path), &file.report);
    }

    let total = total_summary(&reports);
    if reports.len() > 1 {
        print_summary("Total", &total);
    }

    if !args.dry_run {
        let status = RunStatusFile::new(
            reports
                .iter()
                .map(|file| StreamStatus::from_report(file.path.display().to_string(), &file.report))
                .collect(),
        );
        let path = save_status(&status, &config.output_dir)?;
        println!();
        println!("{} {}", style("Summary:").green().bold(), path.display());
    }

    match reports.into_iter().find_map(|file| file.report.error) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Execute the fetch command.
async fn fetch_command(
    kind: ArchiveKind,
    payload: TriggerPayload,
    config: RetrieverConfig,
    args: &OutputArgs,
) -> Result<()> {
    let archive = payload.archive(kind)?;

    println!(
        "{} {} ({})",
        style("Retrieving").bold(),
        style(archive.zip_file_name()).cyan(),
        style(archive.date).green()
    );
    println!();

    let sink = args.sink(&config);
    let classifier = args.classifier();
    let pb = spinner("Downloading and processing archive...".to_string());

    let task_config = config.clone();
    let report = tokio::task::spawn_blocking(move || {
        let processor = StreamProcessor::new(sink.as_ref()).with_classifier(classifier);
        retrieve(&archive, &task_config, &processor)
    })
    .await
    .map_err(|e| RetrieverError::Task(e.to_string()));
    pb.finish_and_clear();

    let report = report??;
    let source = archive.xml_file_name();
    print_report(&source, &report);

    if !args.dry_run {
        let status = RunStatusFile::new(vec![StreamStatus::from_report(source, &report)]);
        let path = save_status(&status, &config.output_dir)?;
        println!();
        println!("{} {}", style("Summary:").green().bold(), path.display());
    }

    report.into_result().map(|_| ())
}

/// Path of a bulk file, with kind and date when the name is a USPTO one.
fn file_label(path: &Path) -> String {
    let archive = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(ArchiveName::parse_file_name);
    match archive {
        Some(archive) => format!("{} ({:?}, {})", path.display(), archive.kind, archive.date),
        None => path.display().to_string(),
    }
}

fn print_report(source: &str, report: &RunReport) {
    print_summary(source, &report.summary);
    if let Some(e) = &report.error {
        println!("    {} {}", style("Aborted:").red().bold(), e);
    }
}

fn print_summary(source: &str, summary: &RunSummary) {
    println!("  {}", style(source).cyan());
    println!("    Lines read: {}", summary.lines_read);
    println!(
        "    Documents: {} parsed, {} malformed",
        summary.documents_parsed, summary.documents_malformed
    );
    println!(
        "    Forwarded: {} sequence listings, {} documents",
        style(summary.forwarded_sequence).green(),
        style(summary.forwarded_document).green()
    );
    if summary.documents_skipped > 0 {
        println!(
            "    Skipped: {}",
            style(summary.documents_skipped).yellow().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_process() {
        let cli = Cli::parse_from(["uspto-retriever", "process", "ipg200107.xml", "ipg200114.xml"]);

        let Commands::Process {
            files,
            jobs,
            output,
        } = cli.command
        else {
            panic!("expected process command");
        };
        assert_eq!(
            files,
            vec![PathBuf::from("ipg200107.xml"), PathBuf::from("ipg200114.xml")]
        );
        assert!(jobs.is_none());
        assert!(output.output.is_none());
        assert!(!output.dry_run);
    }

    #[test]
    fn test_cli_parse_process_requires_files() {
        assert!(Cli::try_parse_from(["uspto-retriever", "process"]).is_err());
    }

    #[test]
    fn test_cli_parse_fetch() {
        let cli = Cli::parse_from([
            "uspto-retriever",
            "fetch",
            "--kind",
            "application",
            "--year",
            "2020",
            "--week",
            "2",
            "--format",
            "json",
            "--sections",
            "A,C,G",
        ]);

        let Commands::Fetch {
            kind,
            year,
            week,
            keep_tmp,
            output,
            ..
        } = cli.command
        else {
            panic!("expected fetch command");
        };
        assert_eq!(kind, ArchiveKind::Application);
        assert_eq!(year, Some(2020));
        assert_eq!(week, Some(2));
        assert!(!keep_tmp);
        assert_eq!(output.format, Some(OutputFormat::Json));
        assert_eq!(output.sections, vec!["A", "C", "G"]);
    }

    #[test]
    fn test_cli_year_requires_week() {
        assert!(Cli::try_parse_from(["uspto-retriever", "fetch", "--year", "2020"]).is_err());
    }

    #[test]
    fn test_cli_payload_conflicts_with_week() {
        assert!(Cli::try_parse_from([
            "uspto-retriever",
            "fetch",
            "--payload",
            "{}",
            "--year",
            "2020",
            "--week",
            "2",
        ])
        .is_err());
    }

    #[test]
    fn test_file_label() {
        assert_eq!(
            file_label(Path::new("data/ipa200102.xml")),
            "data/ipa200102.xml (Application, 2020-01-02)"
        );
        assert_eq!(file_label(Path::new("other.xml")), "other.xml");
    }

    #[test]
    fn test_output_args_apply() {
        let cli = Cli::parse_from([
            "uspto-retriever",
            "process",
            "a.xml",
            "--output",
            "out",
            "--format",
            "json",
        ]);
        let Commands::Process { output, .. } = cli.command else {
            panic!("expected process command");
        };

        let config = output.apply(RetrieverConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(output.classifier().relevant_sections(), ["A", "C"]);
    }
}
