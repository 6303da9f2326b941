use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use thesis_core::config::BackendKind;
use thesis_core::gateway::DetailsUpdate;
use thesis_core::listing::ThesisQuery;
use thesis_core::thesis::{
    ActorRole, CommissionReport, Decision, DefenseSchedule, SecretaryPhase, StageKind,
    ThesisDocument, ThesisId, ThesisSubmission, Transition,
};
use thesis_infrastructure::{ConfigService, ThesisPaths};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::Desk;
use commands::{auth, config as config_cmd, listing, render, workflow};

#[derive(Parser)]
#[command(name = "thesis")]
#[command(about = "Thesis Desk - multi-stage thesis approval workflow client", long_about = None)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG and config
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the configured backend (remote or local)
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the credential
    Login {
        /// Username or email
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account (does not log in)
    Register {
        email: String,
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<ActorRole>,
    },
    /// Clear the stored credential
    Logout,
    /// Show the current session
    Whoami,
    /// Submit a new thesis
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        student: String,
        #[arg(long)]
        mentor: String,
        #[arg(long)]
        department: String,
    },
    /// Edit title, description and department before the first validation
    Edit {
        id: ThesisId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        department: String,
    },
    /// Record a validation decision
    Validate {
        #[command(subcommand)]
        actor: ValidateAs,
    },
    /// Assign commission members
    AssignCommission {
        id: ThesisId,
        #[arg(required = true)]
        members: Vec<String>,
    },
    /// Schedule the defense
    Schedule {
        id: ThesisId,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM (24h, UTC)
        #[arg(long)]
        time: String,
        #[arg(long)]
        location: String,
        #[arg(long = "member", required = true)]
        members: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// File the commission report
    Report {
        id: ThesisId,
        #[arg(long)]
        report: String,
        #[arg(long)]
        grade: Option<String>,
    },
    /// Attach a thesis document; --revision resubmits after a rejection or conditional decision
    Upload {
        id: ThesisId,
        document: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        revision: bool,
    },
    /// Mark a defended thesis
    MarkDefended { id: ThesisId },
    /// Archive a marked thesis
    Archive { id: ThesisId },
    /// List theses
    List {
        /// Case-insensitive match on title or student name
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        stage: Option<StageKind>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one thesis with its history
    Show { id: ThesisId },
    /// Show or write the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ValidateAs {
    Mentor {
        id: ThesisId,
        /// approved, rejected or needs-revision
        decision: Decision,
        #[arg(long)]
        comments: String,
    },
    Secretary {
        id: ThesisId,
        phase: SecretaryPhase,
        /// approved or rejected
        decision: Decision,
        #[arg(long)]
        comments: String,
    },
    Administration {
        id: ThesisId,
        /// approved, rejected or pending
        decision: Decision,
        #[arg(long)]
        comments: String,
    },
    Commission {
        id: ThesisId,
        /// approved, rejected or conditional
        decision: Decision,
        #[arg(long)]
        comments: String,
    },
}

impl ValidateAs {
    fn into_transition(self) -> (ThesisId, Transition) {
        match self {
            Self::Mentor {
                id,
                decision,
                comments,
            } => (id, Transition::MentorDecision { decision, comments }),
            Self::Secretary {
                id,
                phase,
                decision,
                comments,
            } => (
                id,
                Transition::SecretaryDecision {
                    phase,
                    decision,
                    comments,
                },
            ),
            Self::Administration {
                id,
                decision,
                comments,
            } => (id, Transition::AdministrationDecision { decision, comments }),
            Self::Commission {
                id,
                decision,
                comments,
            } => (id, Transition::CommissionDecision { decision, comments }),
        }
    }
}

fn init_tracing(default_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let paths = ThesisPaths::new();
    let service = ConfigService::new(&paths)?;
    let mut config = service.get_config()?;
    if let Some(kind) = cli.backend {
        config.backend.kind = kind;
    }
    init_tracing(&config.log_level, cli.verbose);

    let desk = Desk::open(&paths, &config).await?;

    let notice = match cli.command {
        Commands::Login {
            identifier,
            password,
        } => auth::login(&desk, &identifier, &password).await,
        Commands::Register {
            email,
            username,
            password,
            role,
        } => auth::register(&desk, &email, &username, &password, role).await,
        Commands::Logout => auth::logout(&desk).await,
        Commands::Whoami => auth::whoami(&desk).await,
        Commands::Submit {
            title,
            description,
            student,
            mentor,
            department,
        } => {
            let submission = ThesisSubmission {
                title,
                description,
                student_name: student,
                mentor_name: mentor,
                department,
            };
            workflow::submit(&desk, submission).await
        }
        Commands::Edit {
            id,
            title,
            description,
            department,
        } => {
            let update = DetailsUpdate {
                thesis_id: id,
                title,
                description,
                department,
            };
            workflow::edit(&desk, update).await
        }
        Commands::Validate { actor } => {
            let (id, transition) = actor.into_transition();
            workflow::transition(&desk, id, transition).await
        }
        Commands::AssignCommission { id, members } => {
            workflow::transition(&desk, id, Transition::AssignCommission { members }).await
        }
        Commands::Schedule {
            id,
            date,
            time,
            location,
            members,
            notes,
        } => {
            let schedule = DefenseSchedule {
                date,
                time,
                location,
                commission_members: members,
                notes,
            };
            workflow::transition(&desk, id, Transition::ScheduleDefense(schedule)).await
        }
        Commands::Report { id, report, grade } => {
            let report = CommissionReport { report, grade };
            workflow::transition(&desk, id, Transition::SubmitCommissionReport(report)).await
        }
        Commands::Upload {
            id,
            document,
            notes,
            revision,
        } => {
            let document = ThesisDocument { document, notes };
            let transition = if revision {
                Transition::UploadRevision(document)
            } else {
                Transition::UploadDocument(document)
            };
            workflow::transition(&desk, id, transition).await
        }
        Commands::MarkDefended { id } => {
            workflow::transition(&desk, id, Transition::MarkDefended).await
        }
        Commands::Archive { id } => workflow::transition(&desk, id, Transition::Archive).await,
        Commands::List {
            search,
            stage,
            limit,
        } => {
            let mut query = ThesisQuery::new().with_search(search).with_stage(stage);
            if let Some(limit) = limit {
                query = query.with_limit(limit);
            }
            listing::list(&desk, query).await
        }
        Commands::Show { id } => listing::show(&desk, id).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(&service, &config),
            ConfigAction::Init { force } => config_cmd::init(&service, &config, force),
        },
    };

    render::notice(&notice);
    Ok(if notice.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_secretary_validation() {
        let cli = Cli::try_parse_from([
            "thesis",
            "validate",
            "secretary",
            "12",
            "second",
            "approved",
            "--comments",
            "forms complete",
        ])
        .unwrap();
        let Commands::Validate { actor } = cli.command else {
            panic!("expected validate");
        };
        let (id, transition) = actor.into_transition();
        assert_eq!(id.as_str(), "12");
        assert_eq!(
            transition,
            Transition::SecretaryDecision {
                phase: SecretaryPhase::Second,
                decision: Decision::Approved,
                comments: "forms complete".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::try_parse_from([
            "thesis",
            "--backend",
            "local",
            "list",
            "--stage",
            "secretary-review",
            "--search",
            "doe",
        ])
        .unwrap();
        assert_eq!(cli.backend, Some(BackendKind::Local));
        let Commands::List { search, stage, .. } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(search, "doe");
        assert_eq!(stage, Some(StageKind::SecretaryReview));
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["thesis", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn test_unknown_decision_rejected() {
        assert!(Cli::try_parse_from([
            "thesis", "validate", "mentor", "1", "maybe", "--comments", "x"
        ])
        .is_err());
    }
}
