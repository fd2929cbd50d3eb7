//! Classroom Planner CLI.
//!
//! Generate rosters, build group assignments and inspect saved activities.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use classroom_planner::generator::RosterGeneratorConfig;
use classroom_planner::plan::{PlanConfig, build_session, render};
use classroom_planner::store::Activity;
use classroom_planner::RosterGenerator;
use group_kernel::invariants;
use group_kernel::{AssignmentSession, EngineConfig, TemplateCatalog};

#[derive(Parser)]
#[command(name = "classroom-planner")]
#[command(about = "Plan student groups for classroom activities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (JSON)
    #[arg(long, env = "CLASSROOM_PLANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Template catalog file (JSON); the built-in catalog is used otherwise
    #[arg(long)]
    templates_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and display a roster.
    Roster {
        /// Class size: small, medium, large
        #[arg(short, long, default_value = "medium")]
        size: String,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Build a group plan for a generated roster.
    Plan {
        /// Class size: small, medium, large
        #[arg(short, long, default_value = "medium")]
        size: String,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Template ids (comma-separated)
        #[arg(short, long, default_value = "")]
        templates: String,
        /// Number of custom groups to add
        #[arg(short, long, default_value = "0")]
        custom: usize,
        /// Distribute students evenly across the groups
        #[arg(short, long)]
        balance: bool,
        /// Lead each group with a staff member
        #[arg(long)]
        leads: bool,
        /// Save as a whole-class activity
        #[arg(long)]
        whole_class: bool,
        /// Activity id used when saving
        #[arg(long, default_value = "activity")]
        activity: String,
        /// Output file for the activity (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a saved activity and check its groups.
    Inspect {
        /// Activity file (JSON)
        file: PathBuf,
        /// Class size the activity was planned for
        #[arg(short, long, default_value = "medium")]
        size: String,
        /// Seed the roster was generated with
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn parse_size(s: &str) -> RosterGeneratorConfig {
    RosterGeneratorConfig::parse(s).unwrap_or_else(|| {
        eprintln!("Unknown size: {}. Using 'medium'.", s);
        RosterGeneratorConfig::medium()
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let catalog = match &cli.templates_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            TemplateCatalog::from_json_str(&json)?
        }
        None => TemplateCatalog::builtin(),
    };

    match cli.command {
        Commands::Roster { size, seed } => {
            let roster = RosterGenerator::new(parse_size(&size), seed).generate();
            println!("{}", serde_json::to_string_pretty(&roster)?);
        }

        Commands::Plan {
            size,
            seed,
            templates,
            custom,
            balance,
            leads,
            whole_class,
            activity,
            output,
        } => {
            let roster = RosterGenerator::new(parse_size(&size), seed).generate();
            let plan = PlanConfig {
                templates: templates
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                custom_groups: custom,
                balance,
                assign_leads: leads,
                whole_class,
                notes: None,
            };
            info!(?plan, size = %size, seed, "Planning groups");

            let session = build_session(roster, catalog, config, &plan)?;
            println!("{}", render(&session));

            if let Some(output) = output {
                let mut record = Activity::new(activity, format!("{} class, seed {}", size, seed));
                record.assignment = Some(session.save()?);
                std::fs::create_dir_all(output.parent().unwrap_or(&PathBuf::from(".")))?;
                record.save(&output)?;
                println!("Activity written to: {}", output.display());
            }
        }

        Commands::Inspect { file, size, seed } => {
            let activity = Activity::load(&file)?;
            let roster = RosterGenerator::new(parse_size(&size), seed).generate();
            let Some(record) = activity.assignment else {
                bail!("activity {} has no saved assignment", activity.id);
            };

            let session = AssignmentSession::load(roster, catalog, &record, config)?;
            invariants::verify(session.registry(), session.roster())?;

            println!("=== {} ({}) ===", activity.name, activity.id);
            if !record.notes.is_empty() {
                println!("Notes: {}", record.notes);
            }
            println!("{}", render(&session));
            println!("Invariants: ok");
        }
    }

    Ok(())
}
