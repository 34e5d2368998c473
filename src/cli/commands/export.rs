//! Export command implementation
//!
//! Exports the records of a JSON dataset into a CSV document using the
//! export definitions of the configured definitions directory.

use crate::adapters::dataset::JsonDataset;
use crate::adapters::definitions::FsDefinitionStore;
use crate::adapters::sink::CsvSink;
use crate::cli::exit_code_for;
use crate::config::{load_config, TabulaConfig};
use crate::core::export::{ExportContext, ExportOrchestrator, ExportSummary};
use crate::core::resolve::FieldResolver;
use crate::core::template::MiniJinjaEngine;
use crate::definition::{ColumnConfigLoader, ExportOptions};
use crate::domain::context::ResultExt;
use crate::domain::{
    DefinitionId, ExportIssue, FilterCondition, ModelName, RecordFilter, Result, SortDirection,
    SortSpec, TabulaError,
};
use crate::log_error_with_context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Model to export, e.g. Addressbook_Model_Contact
    #[arg(short, long)]
    pub model: ModelName,

    /// JSON dataset holding the records
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// Definition file to use instead of the definitions directory
    #[arg(long, conflicts_with = "definition_id")]
    pub definition_file: Option<PathBuf>,

    /// Id of the definition to use (file stem in the definitions directory)
    #[arg(long)]
    pub definition_id: Option<DefinitionId>,

    /// Document template overriding the definition's
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Date-time format overriding the definition's
    #[arg(long)]
    pub datetime_format: Option<String>,

    /// Filter condition (field=value, field!=value, field~value, field^value); repeatable
    #[arg(short, long = "filter", value_parser = FilterCondition::parse)]
    pub filters: Vec<FilterCondition>,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction (ASC or DESC)
    #[arg(long, requires = "sort")]
    pub direction: Option<SortDirection>,

    /// Output file; `-` writes to stdout. Defaults to the definition's download file name
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Records fetched per page, overriding the configuration
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(model = %self.model, "Starting export command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                log_error_with_context!(&e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        match self.run(&config, shutdown_signal).await {
            Ok((summary, destination)) => Ok(report(&summary, &destination)),
            Err(e) => {
                log_error_with_context!(&e, "Export failed");
                eprintln!("Export failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    fn options(&self) -> ExportOptions {
        ExportOptions {
            definition_file: self.definition_file.clone(),
            definition_id: self.definition_id.clone(),
            preference_key: None,
            template: self.template.clone(),
            datetime_format: self.datetime_format.clone(),
        }
    }

    fn filter(&self) -> RecordFilter {
        self.filters
            .iter()
            .cloned()
            .fold(RecordFilter::all(self.model.clone()), RecordFilter::with_condition)
    }

    async fn run(
        &self,
        config: &TabulaConfig,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<(ExportSummary, String)> {
        let account = config
            .account
            .to_account()
            .map_err(TabulaError::Configuration)?;
        let delimiter = config
            .export
            .delimiter()
            .map_err(TabulaError::Configuration)?;

        let dataset = Arc::new(JsonDataset::load(&self.dataset).await?);
        let store = FsDefinitionStore::open(&config.export.definitions_dir)
            .await?
            .with_preferences(config.preferences.clone());

        let loader = ColumnConfigLoader::new(Arc::new(store))
            .with_default_export_name(&config.export.default_export_name);
        let mut options = self.options();
        options.preference_key = config.export.preference_key.clone();

        let mut export_config = loader.load(&self.model, &options).await?;
        if export_config.format.is_none() {
            export_config.format = Some(config.export.default_format.clone());
        }
        let format = export_config.format()?;
        if format != "csv" {
            return Err(TabulaError::FormatNotFound(format!(
                "{} (unsupported format '{format}')",
                export_config.name
            )));
        }

        let destination = match &self.output {
            Some(path) => path.display().to_string(),
            None => export_config.download_filename(self.model.application())?,
        };
        tracing::debug!(
            destination = %destination,
            content_type = export_config.content_type()?,
            "Export destination"
        );
        let key_order = export_config
            .template_mapping
            .iter()
            .map(|entry| entry.output_key.clone())
            .collect();
        let sink = CsvSink::new(Vec::new(), delimiter).with_key_order(key_order);

        let resolver = FieldResolver::new(dataset.clone(), dataset.clone(), dataset.clone());
        let context = ExportContext::new(account).with_branding(config.branding.clone());
        let orchestrator = ExportOrchestrator::new(
            dataset,
            resolver,
            Arc::new(MiniJinjaEngine::new()),
            context,
        )
        .with_page_size(self.page_size.unwrap_or(config.export.page_size))
        .with_shutdown(shutdown_signal);

        let sort = self
            .sort
            .as_ref()
            .map(|field| SortSpec::new(field, self.direction));

        let outcome = orchestrator
            .generate(&self.filter(), sort.as_ref(), &export_config, sink)
            .await?;
        write_document(&destination, &outcome.document).await?;

        Ok((outcome.summary, destination))
    }
}

/// Writes the finished document; the destination is only touched once the
/// export succeeded
async fn write_document(destination: &str, document: &[u8]) -> Result<()> {
    if destination == "-" {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(document).await?;
        stdout.flush().await?;
        return Ok(());
    }
    tokio::fs::write(destination, document)
        .await
        .with_context(|| format!("writing {destination}"))
}

/// Prints the summary to stderr and picks the exit code
fn report(summary: &ExportSummary, destination: &str) -> i32 {
    eprintln!();
    eprintln!("Export Summary:");
    eprintln!("  Model: {}", summary.model);
    eprintln!("  Definition: {}", summary.definition);
    eprintln!("  Records: {}/{}", summary.records_written, summary.total_count);
    eprintln!("  Pages: {}", summary.pages);
    eprintln!("  Output: {destination}");
    eprintln!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    if !summary.is_clean() {
        eprintln!("  Issues:");
        for issue in [
            ExportIssue::InvalidTemplateOutput,
            ExportIssue::MissingMappedValue,
            ExportIssue::MisconfiguredColumn,
        ] {
            let count = summary.issue_count(issue);
            if count > 0 {
                eprintln!("    {}: {count}", issue.as_str());
            }
        }
    }
    eprintln!();

    if summary.interrupted {
        eprintln!("Export interrupted; the document holds the pages written so far.");
        tracing::info!("Export interrupted by user signal");
        130
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const DATASET: &str = r#"{
        "model": "Addressbook_Model_Contact",
        "fields": ["id", "name"],
        "records": [{"id": "1", "name": "Alice"}, {"id": "2", "name": "Bob"}]
    }"#;

    fn definition(expression: &str) -> String {
        format!(
            "<config><name>default</name><model>Addressbook_Model_Contact</model>\
             <columns><column><header>Name</header><recordProperty>name</recordProperty></column>\
             <column><header>Id</header><expression>{expression}</expression></column>\
             </columns></config>"
        )
    }

    struct Workspace {
        dir: TempDir,
        config: TabulaConfig,
        output: PathBuf,
    }

    fn workspace(expression: &str) -> Workspace {
        let dir = TempDir::new().unwrap();
        let definitions = dir.path().join("definitions");
        fs::create_dir(&definitions).unwrap();
        fs::write(definitions.join("adb_default.xml"), definition(expression)).unwrap();
        fs::write(dir.path().join("contacts.json"), DATASET).unwrap();

        let mut config = TabulaConfig::default();
        config.export.definitions_dir = definitions;
        let output = dir.path().join("out.csv");
        Workspace { dir, config, output }
    }

    fn export_args(workspace: &Workspace) -> ExportArgs {
        Harness::parse_from([
            "export".to_string(),
            "--model".to_string(),
            "Addressbook_Model_Contact".to_string(),
            "--dataset".to_string(),
            workspace.dir.path().join("contacts.json").display().to_string(),
            "--sort".to_string(),
            "name".to_string(),
            "-o".to_string(),
            workspace.output.display().to_string(),
        ])
        .args
    }

    #[tokio::test]
    async fn test_run_writes_csv_document() {
        let workspace = workspace("{{ record.id }}");
        let (_tx, rx) = watch::channel(false);

        let (summary, destination) = export_args(&workspace)
            .run(&workspace.config, rx)
            .await
            .unwrap();

        assert_eq!(summary.records_written, 2);
        assert_eq!(destination, workspace.output.display().to_string());
        assert_eq!(
            fs::read_to_string(&workspace.output).unwrap(),
            "Name,Id\nAlice,1\nBob,2\n"
        );
    }

    #[tokio::test]
    async fn test_failed_export_leaves_destination_untouched() {
        let workspace = workspace("{{ record.name ");
        fs::write(&workspace.output, "previous export\n").unwrap();
        let (_tx, rx) = watch::channel(false);

        let result = export_args(&workspace).run(&workspace.config, rx).await;

        assert!(matches!(result, Err(TabulaError::Template(_))));
        assert_eq!(
            fs::read_to_string(&workspace.output).unwrap(),
            "previous export\n"
        );
    }

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ExportArgs,
    }

    #[test]
    fn test_filters_and_sort_parse() {
        let harness = Harness::parse_from([
            "export",
            "--model",
            "Addressbook_Model_Contact",
            "--dataset",
            "contacts.json",
            "-f",
            "email~example.com",
            "-f",
            "n_fn!=Bob",
            "--sort",
            "n_fn",
            "--direction",
            "desc",
        ]);
        let args = harness.args;

        let filter = args.filter();
        assert_eq!(filter.conditions.len(), 2);
        assert_eq!(filter.model.application(), "Addressbook");
        assert_eq!(args.direction, Some(SortDirection::Desc));
    }

    #[test]
    fn test_definition_file_conflicts_with_id() {
        let result = Harness::try_parse_from([
            "export",
            "--model",
            "Crm_Model_Lead",
            "--dataset",
            "leads.json",
            "--definition-file",
            "a.xml",
            "--definition-id",
            "crm_default",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_exit_codes() {
        let mut summary = ExportSummary::new("Crm_Model_Lead", "default");
        assert_eq!(report(&summary, "-"), 0);

        summary.record_issue(ExportIssue::MissingMappedValue);
        assert_eq!(report(&summary, "-"), 0);

        summary.interrupted = true;
        assert_eq!(report(&summary, "-"), 130);
    }
}
