//! labelrepo CLI - read-only access to an annotation repository

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use labelrepo::config::{self, LabelrepoConfig};
use labelrepo::records::{self, AnnotationsFile, Record};
use labelrepo::ui::{self, Icons};
use labelrepo::{LabelStore, RepoPaths, layout, tabular};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Widest cell in text tables
const MAX_CELL_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "labelrepo")]
#[command(version)]
#[command(about = "Read annotations, labels and the generated database of an annotation repository")]
#[command(long_about = r#"
The repository keeps one directory per project:
  projects/<project>/annotations/<annotator>.jsonl
  projects/<project>/labels/<label_set>.json

`make database` and `make csv` build analysis/data/database.sqlite3 and
analysis/data/detailed_annotation.csv from those files.

Example usage:
  labelrepo annotations participant_demographics Jerome_Dockes --limit 4
  labelrepo labels autism_mri Article_Terms
  labelrepo detailed --limit 10
  labelrepo snippets --label Diagnosis
  labelrepo query "SELECT label_name, COUNT(*) FROM detailed_annotation GROUP BY label_name"
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository root (defaults to $LABELREPO_ROOT, then the repository containing this tool)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved repository paths
    Paths,

    /// List projects with their annotators and label sets
    Projects,

    /// Print the records of an annotations file
    Annotations {
        /// Project name
        project: Option<String>,

        /// Annotator name (file stem of the .jsonl file); lists annotators when omitted
        annotator: Option<String>,

        /// Read this .jsonl file instead of a project file
        #[arg(long, conflicts_with_all = ["project", "annotator"])]
        file: Option<PathBuf>,

        /// Stop after this many records
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print a label-set file
    Labels {
        /// Project name
        project: Option<String>,

        /// Label set name (file stem of the .json file); lists label sets when omitted
        label_set: Option<String>,

        /// Read this .json file instead of a project file
        #[arg(long, conflicts_with_all = ["project", "label_set"])]
        file: Option<PathBuf>,
    },

    /// Show rows of the detailed_annotation view
    Detailed {
        /// Maximum number of rows
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Count the distinct texts annotated with a label
    Snippets {
        /// Label name, e.g. Diagnosis
        #[arg(short, long)]
        label: String,
    },

    /// Run a SQL query against the database
    Query {
        /// SQL to run
        sql: String,
    },

    /// Show the first rows of the detailed_annotation.csv export
    Csv {
        /// Number of rows to read
        #[arg(short, long, default_value = "3")]
        nrows: usize,
    },

    /// Show row counts of the database tables
    Stats,

    /// Write a labelrepo.toml with the default paths at the repository root
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let root = cli.root;
    let repo = move || RepoPaths::resolve(root.as_deref());

    match cli.command {
        Commands::Paths => {
            let paths = repo()?;
            let database = paths.database_path();
            let csv = paths.csv_path();
            if format == Format::Json {
                return emit_json(&serde_json::json!({
                    "root": paths.root(),
                    "projects": paths.projects_dir(),
                    "data_dir": paths.data_dir(),
                    "database": database,
                    "database_exists": database.is_file(),
                    "csv": csv,
                    "csv_exists": csv.is_file(),
                }));
            }

            ui::header(Icons::FOLDER, "Repository paths");
            ui::summary_row("Root:     ", &paths.root().display().to_string());
            ui::summary_row("Projects: ", &paths.projects_dir().display().to_string());
            ui::summary_row("Data:     ", &paths.data_dir().display().to_string());
            ui::summary_row("Database: ", &existence(&database));
            ui::summary_row("CSV:      ", &existence(&csv));
            if !database.is_file() {
                ui::warn("Database not built yet - run `make database`");
            }
        }

        Commands::Projects => {
            let paths = repo()?;
            let mut summaries = Vec::new();
            for project in layout::projects(&paths)? {
                summaries.push(ProjectSummary {
                    annotators: project
                        .annotator_files()?
                        .into_iter()
                        .map(|f| f.annotator_name)
                        .collect(),
                    label_sets: project.label_sets()?.into_iter().map(|f| f.label_set).collect(),
                    name: project.name,
                });
            }

            if format == Format::Json {
                return emit_json(&summaries);
            }

            ui::header(Icons::FOLDER, &format!("{} projects", summaries.len()));
            for summary in &summaries {
                ui::section(&summary.name);
                ui::summary_row(Icons::PERSON, &join_or_none(&summary.annotators));
                ui::summary_row(Icons::LABEL, &join_or_none(&summary.label_sets));
            }
        }

        Commands::Annotations { project, annotator, file, limit } => {
            let path = match (file, project, annotator) {
                (Some(file), _, _) => file,
                (None, Some(project), Some(annotator)) => repo()?.annotations_file(&project, &annotator),
                (None, Some(project), None) => {
                    let annotators = layout::project(&repo()?, &project)?.annotator_files()?;
                    let names: Vec<String> = annotators.into_iter().map(|f| f.annotator_name).collect();
                    if format == Format::Json {
                        return emit_json(&names);
                    }
                    ui::header(Icons::PERSON, &format!("Annotators of {project}"));
                    for name in names {
                        println!("{name}");
                    }
                    return Ok(());
                }
                (None, None, _) => anyhow::bail!("give a project and annotator, or --file"),
            };

            let file = AnnotationsFile::open(path)?;
            let records = file.records()?.take(limit.unwrap_or(usize::MAX));

            if format == Format::Json {
                let records = records.collect::<labelrepo::Result<Vec<Record>>>()?;
                return emit_json(&records);
            }

            ui::header(Icons::FILE, &file.path().display().to_string());
            for record in records {
                println!("{}", serde_json::to_string(&record?)?);
            }
        }

        Commands::Labels { project, label_set, file } => {
            let path = match (file, project, label_set) {
                (Some(file), _, _) => file,
                (None, Some(project), Some(label_set)) => repo()?.labels_file(&project, &label_set),
                (None, Some(project), None) => {
                    let sets = layout::project(&repo()?, &project)?.label_sets()?;
                    let names: Vec<String> = sets.into_iter().map(|f| f.label_set).collect();
                    if format == Format::Json {
                        return emit_json(&names);
                    }
                    ui::header(Icons::LABEL, &format!("Label sets of {project}"));
                    for name in names {
                        println!("{name}");
                    }
                    return Ok(());
                }
                (None, None, _) => anyhow::bail!("give a project and label set, or --file"),
            };

            let labels = records::read_labels(&path)?;
            if format == Format::Text {
                ui::header(
                    Icons::LABEL,
                    &format!("{} ({} definitions)", path.display(), labels.len()),
                );
            }
            emit_json(&labels.into_value())?;
        }

        Commands::Detailed { limit } => {
            let paths = repo()?;
            let store = LabelStore::open(&paths)?;
            let rows = store.detailed_annotations(limit)?;
            if format == Format::Json {
                return emit_json(&rows);
            }

            let columns = ["selected_text", "context", "label_name", "annotator_name"];
            print_table(&columns, &to_records(&rows)?);
        }

        Commands::Snippets { label } => {
            let paths = repo()?;
            let store = LabelStore::open(&paths)?;
            let counts = store.snippet_counts(&label)?;
            if format == Format::Json {
                return emit_json(&counts);
            }

            ui::header(Icons::SEARCH, &format!("Snippets annotated with \"{label}\""));
            if counts.is_empty() {
                println!("{}", ui::muted("No annotations with this label."));
            } else {
                print_table(&["selected_text", "occurrences"], &to_records(&counts)?);
            }
        }

        Commands::Query { sql } => {
            let paths = repo()?;
            let store = LabelStore::open(&paths)?;
            let result = store.query_records(&sql)?;
            if format == Format::Json {
                return emit_json(&result.rows);
            }

            println!("{}", ui::records_table(&result.columns, &result.rows, MAX_CELL_WIDTH));
            println!("{}", ui::dim(&format!("{} rows", result.rows.len())));
        }

        Commands::Csv { nrows } => {
            let paths = repo()?;
            let table = tabular::read_repo_csv(&paths, Some(nrows))?;
            if format == Format::Json {
                return emit_json(&serde_json::json!({
                    "columns": table.columns,
                    "rows": table.rows,
                }));
            }

            ui::info("Columns", &table.columns.join(", "));
            let columns = ["selected_text", "context", "label_name", "annotator_name"];
            print_table(&columns, &to_records(&table.rows)?);
        }

        Commands::Stats => {
            let paths = repo()?;
            let store = LabelStore::open(&paths)?;
            let stats = store.stats()?;
            if format == Format::Json {
                return emit_json(&stats);
            }

            ui::header(Icons::STATS, &format!("labelrepo statistics ({})", store.path().display()));
            println!(
                "{}",
                ui::stats_table(&[
                    ("Documents", stats.documents.to_string().as_str()),
                    ("Labels", stats.labels.to_string().as_str()),
                    ("Annotations", stats.annotations.to_string().as_str()),
                ])
            );
        }

        Commands::InitConfig { force } => {
            let paths = repo()?;
            let path = config::config_path_in(paths.root());
            config::write_config(&path, &LabelrepoConfig::with_defaults(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ProjectSummary {
    name: String,
    annotators: Vec<String>,
    label_sets: Vec<String>,
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn to_records<T: Serialize>(items: &[T]) -> anyhow::Result<Vec<Record>> {
    items
        .iter()
        .map(|item| match serde_json::to_value(item)? {
            serde_json::Value::Object(record) => Ok(record),
            other => anyhow::bail!("expected an object row, got {other}"),
        })
        .collect()
}

fn print_table(columns: &[&str], rows: &[Record]) {
    let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    println!("{}", ui::records_table(&columns, rows, MAX_CELL_WIDTH));
}

fn existence(path: &std::path::Path) -> String {
    if path.is_file() {
        path.display().to_string()
    } else {
        format!("{} {}", path.display(), ui::muted("(missing)"))
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        ui::muted("none")
    } else {
        items.join(", ")
    }
}
