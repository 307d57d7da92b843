//! Command parsing for the console.
//!
//! This module parses command strings into structured [`Command`] values.

use motion_proto::MotionState;

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Attach the loopback native module.
    Init,

    /// Simulate `SESSION_READY` from the native side.
    Ready {
        /// Session token.
        token: String,
    },

    /// Simulate `HANDSHAKE_CONFIRMED`.
    Confirm,

    /// Request a state by raw tag.
    State {
        /// State tag, validated by the dispatcher.
        tag: String,
        /// Optional hero id.
        hero: Option<String>,
    },

    /// One of the named state shortcuts.
    Enter {
        /// Target state.
        state: MotionState,
        /// Optional hero id.
        hero: Option<String>,
    },

    /// Set intensity.
    Intensity {
        /// Requested value, clamped by the dispatcher.
        value: f64,
    },

    /// Set speed.
    Speed {
        /// Requested value, clamped by the dispatcher.
        value: f64,
    },

    /// Stop motion.
    Stop,

    /// Reset to idle.
    Reset,

    /// Print bridge and dispatcher status.
    Status,

    /// Tear the bridge down.
    Cleanup,

    /// Deliver a raw JSON payload as if sent by the native view.
    Raw {
        /// Payload.
        json: String,
    },

    /// List commands.
    Help,

    /// Quit the console.
    Quit,

    /// Blank line.
    Empty,

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse a user input string into a command.
///
/// Commands start with `/`.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Empty;
    }

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Unknown { input: input.to_string() };
    };

    let parts: Vec<&str> = cmd_str.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");
    let hero = parts.get(1).map(|h| (*h).to_string());

    if let Ok(state) = command.parse::<MotionState>() {
        return Command::Enter { state, hero };
    }

    match command {
        "init" => Command::Init,

        "ready" => match parts.get(1) {
            Some(token) => Command::Ready { token: (*token).to_string() },
            None => Command::InvalidArgs {
                command: "ready".into(),
                error: "Usage: /ready <token>".into(),
            },
        },

        "confirm" => Command::Confirm,

        "state" => match parts.get(1) {
            Some(tag) => {
                Command::State { tag: (*tag).to_string(), hero: parts.get(2).map(|h| (*h).to_string()) }
            },
            None => Command::InvalidArgs {
                command: "state".into(),
                error: "Usage: /state <tag> [hero_id]".into(),
            },
        },

        "intensity" => parse_scalar("intensity", parts.get(1))
            .map_or_else(|error| invalid("intensity", error), |value| Command::Intensity { value }),

        "speed" => parse_scalar("speed", parts.get(1))
            .map_or_else(|error| invalid("speed", error), |value| Command::Speed { value }),

        "stop" => Command::Stop,

        "reset" => Command::Reset,

        "status" => Command::Status,

        "cleanup" => Command::Cleanup,

        "raw" => match cmd_str.strip_prefix("raw").map(str::trim) {
            Some(json) if !json.is_empty() => Command::Raw { json: json.to_string() },
            _ => Command::InvalidArgs { command: "raw".into(), error: "Usage: /raw <json>".into() },
        },

        "help" | "h" => Command::Help,

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}

fn parse_scalar(name: &str, arg: Option<&&str>) -> Result<f64, String> {
    let raw = arg.ok_or_else(|| format!("Usage: /{name} <number>"))?;
    raw.parse::<f64>().map_err(|_| format!("Invalid number: {raw}"))
}

fn invalid(command: &str, error: String) -> Command {
    Command::InvalidArgs { command: command.to_string(), error }
}

/// One line per command, for `/help`.
pub const HELP: &str = "\
/init                      attach the loopback native module
/ready <token>             simulate SESSION_READY
/confirm                   simulate HANDSHAKE_CONFIRMED
/state <tag> [hero]        request a state by tag
/idle /combat /banner ...  named state shortcuts, optional hero id
/intensity <f>             set intensity (clamped)
/speed <f>                 set speed (clamped)
/stop /reset               stop motion, reset to idle
/raw <json>                deliver a native payload
/status /cleanup /quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init_and_ready() {
        assert_eq!(parse("/init"), Command::Init);
        assert_eq!(parse("/ready tok123"), Command::Ready { token: "tok123".into() });
    }

    #[test]
    fn parse_ready_missing_token() {
        assert!(matches!(parse("/ready"), Command::InvalidArgs { command, .. } if command == "ready"));
    }

    #[test]
    fn parse_named_states() {
        assert_eq!(
            parse("/combat aethon"),
            Command::Enter { state: MotionState::Combat, hero: Some("aethon".into()) }
        );
        assert_eq!(parse("/dialogue"), Command::Enter { state: MotionState::Dialogue, hero: None });
    }

    #[test]
    fn parse_state_keeps_raw_tag() {
        assert_eq!(parse("/state moonwalk"), Command::State { tag: "moonwalk".into(), hero: None });
    }

    #[test]
    fn parse_scalars() {
        assert_eq!(parse("/intensity 0.25"), Command::Intensity { value: 0.25 });
        assert_eq!(parse("/speed 9"), Command::Speed { value: 9.0 });
        assert!(matches!(parse("/speed fast"), Command::InvalidArgs { .. }));
        assert!(matches!(parse("/intensity"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn parse_raw_keeps_spaces() {
        assert_eq!(
            parse(r#"/raw {"type": "BLEND_COMPLETE"}"#),
            Command::Raw { json: r#"{"type": "BLEND_COMPLETE"}"#.into() }
        );
        assert!(matches!(parse("/raw"), Command::InvalidArgs { .. }));
    }

    #[test]
    fn parse_quit() {
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/q"), Command::Quit);
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(matches!(parse("/dance"), Command::Unknown { .. }));
        assert!(matches!(parse("combat"), Command::Unknown { .. }));
        assert_eq!(parse("   "), Command::Empty);
    }
}
