//! Roster CLI - track students, house groups, and group points.

use clap::Parser;
use roster::cli::{Cli, Commands, ConfigCommands, GroupCommands, StudentCommands};
use roster::commands::{self, GroupUpdate, Output, StudentFields};
use roster::config::{self, ConfigOverrides, OutputFormat, ResolvedConfig, RosterConfig};
use roster::store::{GroupEvent, Roster, StudentEvent};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `roster=trace`).
const LOG_ENV: &str = "ROSTER_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let mut human = cli.human_readable;

    if let Err(e) = run(cli, &mut human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve configuration, open the roster, and dispatch the command.
///
/// `human` is updated once the output format is resolved so errors are
/// reported in the same format as regular output.
fn run(cli: Cli, human: &mut bool) -> Result<(), roster::Error> {
    let config_path = config::config_path()?;
    let file_config = match RosterConfig::read(&config_path) {
        // `config set` rewrites an unreadable file instead of failing on it
        Err(e) if matches!(cli.command, Some(Commands::Config { command: ConfigCommands::Set { .. } })) => {
            debug!(error = %e, "ignoring unreadable config file");
            RosterConfig::new()
        }
        result => result?,
    };

    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if let Some(dir) = cli.data_dir {
        overrides = overrides.with_data_dir(dir);
    }
    if let Some(backend) = cli.backend {
        overrides = overrides.with_backend(backend);
    }
    let resolved = config::resolve_config(&file_config, &overrides)?;
    *human = resolved.output_format() == OutputFormat::Human;

    debug!(command = ?cli.command, backend = %resolved.backend(), "dispatching");
    match cli.command {
        Some(Commands::Config { command }) => run_config(command, &config_path, &resolved, *human),
        command => {
            let mut roster = open_roster(&resolved);
            run_command(command, &mut roster, *human)
        }
    }
}

fn open_roster(resolved: &ResolvedConfig) -> Roster {
    let mut roster = Roster::open(resolved.backend(), resolved.data_dir(), resolved.cascade());
    roster.students_mut().subscribe(|event: &StudentEvent| {
        debug!(?event, "student collection changed");
    });
    roster.groups_mut().subscribe(|event: &GroupEvent| {
        debug!(?event, "group collection changed");
    });
    roster
}

fn run_config(
    command: ConfigCommands,
    config_path: &Path,
    resolved: &ResolvedConfig,
    human: bool,
) -> Result<(), roster::Error> {
    match command {
        ConfigCommands::Show => {
            let result = commands::config_show(config_path, resolved)?;
            output(&result, human);
        }
        ConfigCommands::Set { key, value } => {
            let result = commands::config_set(config_path, &key, &value)?;
            output(&result, human);
        }
    }
    Ok(())
}

fn run_command(command: Option<Commands>, roster: &mut Roster, human: bool) -> Result<(), roster::Error> {
    match command {
        None => {
            let result = commands::status(roster)?;
            output(&result, human);
        }

        Some(Commands::Student { command }) => match command {
            StudentCommands::Add {
                first_name,
                last_name,
                phone,
                email,
                gender,
                birth_date,
                grade,
                points,
            } => {
                let fields = StudentFields {
                    first_name: Some(first_name),
                    last_name: Some(last_name),
                    phone,
                    email,
                    gender,
                    birth_date,
                    grade,
                    points,
                };
                let result = commands::student_add(roster, fields)?;
                output(&result, human);
            }

            StudentCommands::List { search } => {
                let result = commands::student_list(roster, search.as_deref())?;
                output(&result, human);
            }

            StudentCommands::Show { id } => {
                let result = commands::student_show(roster, &id)?;
                output(&result, human);
            }

            StudentCommands::Update {
                id,
                first_name,
                last_name,
                phone,
                email,
                gender,
                birth_date,
                grade,
                points,
            } => {
                let fields = StudentFields {
                    first_name,
                    last_name,
                    phone,
                    email,
                    gender,
                    birth_date,
                    grade,
                    points,
                };
                let result = commands::student_update(roster, &id, fields)?;
                output(&result, human);
            }

            StudentCommands::Remove { id } => {
                let result = commands::student_remove(roster, &id)?;
                output(&result, human);
            }
        },

        Some(Commands::Group { command }) => match command {
            GroupCommands::Create {
                name,
                description,
                color,
                students,
            } => {
                let result = commands::group_create(roster, &name, &description, color, students)?;
                output(&result, human);
            }

            GroupCommands::List => {
                let result = commands::group_list(roster)?;
                output(&result, human);
            }

            GroupCommands::Ranking => {
                let result = commands::group_ranking(roster)?;
                output(&result, human);
            }

            GroupCommands::Show { id } => {
                let result = commands::group_show(roster, &id)?;
                output(&result, human);
            }

            GroupCommands::Update {
                id,
                name,
                description,
                color,
            } => {
                let update = GroupUpdate {
                    name,
                    description,
                    color,
                };
                let result = commands::group_update(roster, &id, update)?;
                output(&result, human);
            }

            GroupCommands::Remove { id } => {
                let result = commands::group_remove(roster, &id)?;
                output(&result, human);
            }

            GroupCommands::AddStudent { group_id, student_ids } => {
                let result = commands::group_add_students(roster, &group_id, &student_ids)?;
                output(&result, human);
            }

            GroupCommands::RemoveStudent { group_id, student_id } => {
                let result = commands::group_remove_student(roster, &group_id, &student_id)?;
                output(&result, human);
            }

            GroupCommands::Points { group_id, points } => {
                let result = commands::group_set_points(roster, &group_id, points)?;
                output(&result, human);
            }

            GroupCommands::Available { group_id, search } => {
                let result = commands::group_available(roster, &group_id, search.as_deref())?;
                output(&result, human);
            }
        },

        Some(Commands::Doctor { fix }) => {
            let result = commands::doctor(roster, fix)?;
            output(&result, human);
        }

        // Handled before the roster is opened
        Some(Commands::Config { .. }) => {}
    }

    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
