use std::path::PathBuf;

use domain::models::GeofenceId;

use crate::error::ConsoleError;

pub const USAGE: &str = "\
Usage: geofence-console <command>

Commands:
  validate <script.json>   Replay an editor script and report validation errors
  save <script.json>       Replay an editor script and save the result
  show <id>                Print a stored geofence
  list                     List stored geofences
  delete <id>              Delete a stored geofence
  help                     Show this message
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Validate(PathBuf),
    Save(PathBuf),
    Show(GeofenceId),
    List,
    Delete(GeofenceId),
    Help,
}

impl Command {
    /// Whether the command always talks to the backend. Scripts that load a
    /// geofence reach it too.
    pub fn needs_backend(&self) -> bool {
        !matches!(self, Command::Validate(_) | Command::Help)
    }
}

/// Parses process arguments, program name included.
pub fn parse_args(args: &[String]) -> Result<Command, ConsoleError> {
    let operand = |what: &str| {
        args.get(2)
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .ok_or_else(|| ConsoleError::usage(format!("Missing {}\n\n{}", what, USAGE)))
    };

    let command = match args.get(1).map(|s| s.as_str()) {
        Some("validate") => Command::Validate(PathBuf::from(operand("script path")?)),
        Some("save") => Command::Save(PathBuf::from(operand("script path")?)),
        Some("show") => Command::Show(GeofenceId::new(operand("geofence id")?)),
        Some("delete") => Command::Delete(GeofenceId::new(operand("geofence id")?)),
        Some("list") => Command::List,
        Some("help") | Some("--help") | Some("-h") | None => Command::Help,
        Some(other) => {
            return Err(ConsoleError::usage(format!(
                "Unknown command '{}'\n\n{}",
                other, USAGE
            )))
        }
    };
    Ok(command)
}
