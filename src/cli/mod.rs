//! CLI argument definitions for roster.

use crate::models::{Gender, GroupColor};
use crate::storage::BackendType;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("ROSTER_GIT_COMMIT"),
    ", built ",
    env!("ROSTER_BUILD_TIMESTAMP"),
    ")"
);

/// Roster - keep track of students and the house groups they compete in.
///
/// Run `roster` with no arguments for a summary of what is stored.
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, long_version = LONG_VERSION, about = "Track students, house groups, and group points", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding the stored collections (also ROSTER_DATA_DIR)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Storage backend: file or memory (also ROSTER_BACKEND)
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendType>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Student management commands
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Group management commands (membership, points, ranking)
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Check stored data for memberships pointing at removed students
    Doctor {
        /// Remove the dangling memberships that were found
        #[arg(long)]
        fix: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Student subcommands
#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// Add a new student
    Add {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Contact phone (defaults to a placeholder number)
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// male or female
        #[arg(long, value_parser = parse_gender)]
        gender: Option<Gender>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        birth_date: Option<NaiveDate>,

        /// Grade or class label
        #[arg(long)]
        grade: Option<String>,

        /// Personal score
        #[arg(long)]
        points: Option<u32>,
    },

    /// List students, optionally filtered by name
    List {
        /// Case-insensitive substring of first or last name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a student and the groups they belong to
    Show {
        /// Student ID
        id: String,
    },

    /// Update a student's fields
    Update {
        /// Student ID
        id: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// New email (empty string clears it)
        #[arg(long)]
        email: Option<String>,

        #[arg(long, value_parser = parse_gender)]
        gender: Option<Gender>,

        #[arg(long, value_parser = parse_date)]
        birth_date: Option<NaiveDate>,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long)]
        points: Option<u32>,
    },

    /// Remove a student
    Remove {
        /// Student ID
        id: String,
    },
}

/// Group subcommands
#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a new group
    Create {
        /// Group name
        name: String,

        #[arg(short, long)]
        description: String,

        /// gryffindor, slytherin, ravenclaw, or hufflepuff
        #[arg(short, long, value_parser = parse_color, default_value = "gryffindor")]
        color: GroupColor,

        /// Initial member (repeatable)
        #[arg(short = 's', long = "student")]
        students: Vec<String>,
    },

    /// List groups in stored order
    List,

    /// Rank groups by points, highest first
    Ranking,

    /// Show a group with its roster ranked by points
    Show {
        /// Group ID
        id: String,
    },

    /// Update a group's name, description, or color
    Update {
        /// Group ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, value_parser = parse_color)]
        color: Option<GroupColor>,
    },

    /// Remove a group
    Remove {
        /// Group ID
        id: String,
    },

    /// Add students to a group
    AddStudent {
        /// Group ID
        group_id: String,

        /// Student IDs
        #[arg(required = true)]
        student_ids: Vec<String>,
    },

    /// Remove a student from a group
    RemoveStudent {
        /// Group ID
        group_id: String,

        /// Student ID
        student_id: String,
    },

    /// Set a group's points
    Points {
        /// Group ID
        group_id: String,

        /// New point total (replaces the current value)
        points: u32,
    },

    /// List students not yet in a group
    Available {
        /// Group ID
        group_id: String,

        /// Case-insensitive substring of first or last name
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,

    /// Set a configuration value in config.kdl
    Set {
        /// Key: output-format, data-dir, storage-backend, or cascade-membership
        key: String,

        value: String,
    },
}

fn parse_backend(s: &str) -> Result<BackendType, String> {
    BackendType::parse(s).ok_or_else(|| format!("unknown backend '{}' (expected file or memory)", s))
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    Gender::parse(s).ok_or_else(|| format!("unknown gender '{}' (expected male or female)", s))
}

fn parse_color(s: &str) -> Result<GroupColor, String> {
    GroupColor::parse(s).ok_or_else(|| {
        let names: Vec<&str> = GroupColor::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown color '{}' (expected one of: {})", s, names.join(", "))
    })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_group_create() {
        let cli = Cli::try_parse_from([
            "roster", "group", "create", "Test", "-d", "Desc", "-c", "ravenclaw", "-s", "1", "-s", "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Group {
                command:
                    GroupCommands::Create {
                        name,
                        description,
                        color,
                        students,
                    },
            }) => {
                assert_eq!(name, "Test");
                assert_eq!(description, "Desc");
                assert_eq!(color, GroupColor::Ravenclaw);
                assert_eq!(students, vec!["1".to_string(), "2".to_string()]);
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["roster", "student", "list", "-H", "--backend", "memory"]).unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.backend, Some(BackendType::Memory));
    }

    #[test]
    fn test_rejects_unknown_color_and_bad_date() {
        assert!(Cli::try_parse_from(["roster", "group", "create", "X", "-d", "D", "-c", "teal"]).is_err());
        assert!(
            Cli::try_parse_from([
                "roster",
                "student",
                "add",
                "--first-name",
                "A",
                "--last-name",
                "B",
                "--birth-date",
                "12/03/2005"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_points_must_be_non_negative() {
        assert!(Cli::try_parse_from(["roster", "group", "points", "1", "-5"]).is_err());
        assert!(Cli::try_parse_from(["roster", "group", "points", "1", "1300"]).is_ok());
    }
}
