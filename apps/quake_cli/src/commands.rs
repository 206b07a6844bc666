//! Interactive commands typed at the prompt.

use quake_core::SessionCommand;
use shared::domain::{EventId, MagnitudeThreshold, TimeRangeSelector};

pub const HELP: &str = "commands: range <hour|day|week|month|year>, min <0-8>, \
                        select <event id>, list, help, quit";

#[derive(Debug)]
pub enum CliCommand {
    Session(SessionCommand),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<CliCommand>, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("range", Some(raw)) => {
            let range = raw
                .parse::<TimeRangeSelector>()
                .map_err(|err| err.to_string())?;
            CliCommand::Session(SessionCommand::ChangeRange(range))
        }
        ("min", Some(raw)) => {
            let value = raw
                .parse::<f64>()
                .map_err(|err| format!("invalid magnitude '{raw}': {err}"))?;
            let threshold = MagnitudeThreshold::new(value).map_err(|err| err.to_string())?;
            CliCommand::Session(SessionCommand::ChangeThreshold(threshold))
        }
        ("select", Some(id)) => CliCommand::Session(SessionCommand::SelectEvent(EventId::from(id))),
        ("list" | "ls", None) => CliCommand::List,
        ("help" | "?", None) => CliCommand::Help,
        ("quit" | "exit" | "q", None) => CliCommand::Quit,
        (other, _) => return Err(format!("unrecognized command '{other}'; {HELP}")),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_range_and_threshold() {
        assert!(matches!(
            parse_command("range week"),
            Ok(Some(CliCommand::Session(SessionCommand::ChangeRange(
                TimeRangeSelector::Week
            ))))
        ));
        match parse_command("min 4.56") {
            Ok(Some(CliCommand::Session(SessionCommand::ChangeThreshold(threshold)))) => {
                assert_eq!(threshold.value(), 4.6)
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_selection() {
        match parse_command("select us7000abcd") {
            Ok(Some(CliCommand::Session(SessionCommand::SelectEvent(id)))) => {
                assert_eq!(id.as_str(), "us7000abcd")
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn blank_line_is_ignored() {
        assert!(matches!(parse_command("   "), Ok(None)));
    }

    #[test]
    fn rejects_unknown_range_and_verbs() {
        let err = parse_command("range century").expect_err("should fail");
        assert!(err.contains("unsupported time range"));
        assert!(parse_command("min lots").is_err());
        assert!(parse_command("zoom 3").is_err());
        assert!(matches!(parse_command("quit"), Ok(Some(CliCommand::Quit))));
    }
}
