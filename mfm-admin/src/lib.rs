//! Command surface of the catalog operator tool.
//!
//! Every command opens the SQLite catalog, performs one operation and
//! writes a plain-text result. The binary only parses arguments and sets up
//! logging; everything else lives here so it can be driven from tests.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use mfm_engine::{
    CatalogConfig, CatalogError, ImportRequest, NameScope, PointsResolver, RevisionIngestor,
    VersionCatalog,
};
use mfm_model::RevisionData;
use mfm_storage::SqliteStore;
use mfm_types::{VersionId, VersionSelector};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mfm-admin")]
#[command(about = "Manage points manual revisions and look up points")]
pub struct Cli {
    /// Path to the SQLite catalog
    #[arg(long, default_value = "mfm.sqlite")]
    pub db: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install a revision from a JSON file
    Import {
        file: PathBuf,
        #[arg(long)]
        label: String,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release_date: NaiveDate,
        /// Make this revision the latest
        #[arg(long)]
        latest: bool,
        /// Install as an unpublished draft
        #[arg(long)]
        draft: bool,
        /// Replace an existing draft with the same label
        #[arg(long)]
        replace_draft: bool,
    },
    /// List revisions
    Versions {
        /// Include deactivated revisions
        #[arg(long)]
        all: bool,
    },
    /// Move the latest pointer
    MarkLatest { label: String },
    /// Publish a draft
    Publish { label: String },
    /// Hide a revision from "latest" resolution
    Deactivate { label: String },
    Reactivate { label: String },
    /// Points for a unit at a model count
    UnitPoints {
        faction: String,
        unit: String,
        model_count: u32,
        /// Revision label, or "latest"
        #[arg(long, default_value = "latest")]
        at: VersionSelector,
    },
    /// Points for an enhancement
    EnhancementPoints {
        faction: String,
        detachment: String,
        enhancement: String,
        #[arg(long, default_value = "latest")]
        at: VersionSelector,
    },
    /// List names for a selection screen
    List {
        #[command(subcommand)]
        scope: ListScope,
        #[arg(long, default_value = "latest", global = true)]
        at: VersionSelector,
    },
    /// Write a revision back out as JSON
    Export {
        label: String,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListScope {
    Factions,
    Detachments { faction: String },
    Enhancements { faction: String, detachment: String },
    Units { faction: String },
    ModelCounts { faction: String, unit: String },
}

impl From<&ListScope> for NameScope {
    fn from(scope: &ListScope) -> Self {
        match scope {
            ListScope::Factions => NameScope::Factions,
            ListScope::Detachments { faction } => NameScope::detachments(faction.as_str()),
            ListScope::Enhancements {
                faction,
                detachment,
            } => NameScope::enhancements(faction.as_str(), detachment.as_str()),
            ListScope::Units { faction } => NameScope::units(faction.as_str()),
            ListScope::ModelCounts { faction, unit } => {
                NameScope::model_counts(faction.as_str(), unit.as_str())
            }
        }
    }
}

/// Opens the catalog at `cli.db` and runs the command, writing results to `out`.
pub fn execute(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("Failed to open catalog at {}", cli.db.display()))?;
    let catalog = Arc::new(
        VersionCatalog::open(Arc::new(store), CatalogConfig::default())
            .context("Failed to load catalog")?,
    );

    match &cli.command {
        Command::Import {
            file,
            label,
            release_date,
            latest,
            draft,
            replace_draft,
        } => {
            let json = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let data = RevisionData::from_json(&json)
                .with_context(|| format!("Failed to parse {}", file.display()))?;

            let mut request =
                ImportRequest::new(label.as_str(), *release_date, data).with_mark_latest(*latest);
            if *draft {
                request = request.as_draft();
            }
            if *replace_draft {
                request = request.replacing_draft();
            }

            let id = RevisionIngestor::new(catalog.clone())
                .import_revision(request)
                .map_err(explain)?;
            info!(version = %label, "Import finished");
            writeln!(out, "imported {label} ({id})")?;
        }
        Command::Versions { all } => {
            for version in catalog.snapshot().versions() {
                if !*all && !version.is_active {
                    continue;
                }
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}{}",
                    version.label,
                    version.release_date,
                    version.status.as_str(),
                    if version.is_active { "active" } else { "inactive" },
                    if version.is_latest { "\tlatest" } else { "" },
                )?;
            }
        }
        Command::MarkLatest { label } => {
            catalog.mark_latest(version_id(&catalog, label)?)?;
            writeln!(out, "{label} is now latest")?;
        }
        Command::Publish { label } => {
            catalog.publish(version_id(&catalog, label)?)?;
            writeln!(out, "published {label}")?;
        }
        Command::Deactivate { label } => {
            catalog.deactivate(version_id(&catalog, label)?)?;
            writeln!(out, "deactivated {label}")?;
        }
        Command::Reactivate { label } => {
            catalog.reactivate(version_id(&catalog, label)?)?;
            writeln!(out, "reactivated {label}")?;
        }
        Command::UnitPoints {
            faction,
            unit,
            model_count,
            at,
        } => {
            let points = PointsResolver::new(catalog)
                .resolve_unit_variant_points(faction, unit, *model_count, at)
                .map_err(explain)?;
            writeln!(out, "{points}")?;
        }
        Command::EnhancementPoints {
            faction,
            detachment,
            enhancement,
            at,
        } => {
            let points = PointsResolver::new(catalog)
                .resolve_enhancement_points(faction, detachment, enhancement, at)
                .map_err(explain)?;
            writeln!(out, "{points}")?;
        }
        Command::List { scope, at } => {
            let names = PointsResolver::new(catalog)
                .list_names(at, &NameScope::from(scope))
                .map_err(explain)?;
            for name in names {
                writeln!(out, "{name}")?;
            }
        }
        Command::Export { label, output } => {
            let id = version_id(&catalog, label)?;
            let tree = catalog
                .tree(&id)
                .ok_or_else(|| anyhow!("no tree stored for {label}"))?;
            let json = tree.to_revision_data().to_json()?;
            match output {
                Some(path) => {
                    fs::write(path, &json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    writeln!(out, "exported {label} to {}", path.display())?;
                }
                None => writeln!(out, "{json}")?,
            }
        }
    }
    Ok(())
}

fn version_id(catalog: &VersionCatalog, label: &str) -> Result<VersionId> {
    catalog
        .find_by_label(label)
        .map(|v| v.id)
        .ok_or_else(|| anyhow!("version not found: {label}"))
}

/// Lists every violation instead of the one-line summary.
fn explain(error: CatalogError) -> anyhow::Error {
    let details: Vec<String> = error.violations().iter().map(|v| format!("  {v}")).collect();
    if details.len() > 1 {
        anyhow!("{error}\n{}", details.join("\n"))
    } else {
        error.into()
    }
}
