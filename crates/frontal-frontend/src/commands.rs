//! Parsing of typed console commands.

use chrono::NaiveDate;
use frontal_bridge::{
    MessageToBackend,
    navigation::{Route, UnknownRoute},
    progress::ProgressInput,
};

pub const HELP: &str = "\
commands:
  config                          show the configuration
  relax | leave                   open or close the relaxation screen
  category <id>                   select a category and its first scene
  video <id> | audio <id>         select a scene or an audio track
  play                            toggle play/pause
  login <email> <password>        sign in
  signup <email> <password>       create an account
  reset <email>                   send a password reset email
  logout                          sign out
  progress <steps> <hours> <quality>
                                  save today's progress
  progress-on <YYYY-MM-DD>        show progress of a day
  history                         show all progress
  chat <text>                     talk to the companion
  go <route>                      home, login, chat, relax or physical-health
  help | quit";

/// What a console line asks for.
#[derive(Debug, Clone)]
pub enum Command {
    Backend(MessageToBackend),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, type `help` for the list of commands")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Route(#[from] UnknownRoute),
}

/// Parses one input line. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let (name, rest) = line
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let message = match (name, args.as_slice()) {
        ("", _) => return Ok(None),
        ("help" | "?", _) => return Ok(Some(Command::Help)),
        ("quit" | "exit", _) => return Ok(Some(Command::Quit)),

        ("config", []) => MessageToBackend::ConfigurationRequest,
        ("relax", []) => MessageToBackend::Navigate(Route::Relax),
        ("leave", []) => MessageToBackend::Navigate(Route::Home),
        ("category", [id]) => MessageToBackend::SelectCategory(id.to_string()),
        ("category", _) => return Err(CommandError::Usage("category <id>")),
        ("video", [id]) => MessageToBackend::SelectVideo(id.to_string()),
        ("video", _) => return Err(CommandError::Usage("video <id>")),
        ("audio", [id]) => MessageToBackend::SelectAudio(id.to_string()),
        ("audio", _) => return Err(CommandError::Usage("audio <id>")),
        ("play", []) => MessageToBackend::TogglePlayback,

        ("login", [email, password]) => MessageToBackend::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        },
        ("login", _) => return Err(CommandError::Usage("login <email> <password>")),
        ("signup", [email, password]) => MessageToBackend::SignUp {
            email: email.to_string(),
            password: password.to_string(),
        },
        ("signup", _) => return Err(CommandError::Usage("signup <email> <password>")),
        ("reset", [email]) => MessageToBackend::ResetPassword {
            email: email.to_string(),
        },
        ("reset", _) => return Err(CommandError::Usage("reset <email>")),
        ("logout", []) => MessageToBackend::SignOut,

        ("progress", [steps, hours, quality @ ..]) if !quality.is_empty() => {
            const USAGE: &str = "progress <steps> <hours> <quality>";
            MessageToBackend::SaveProgress(ProgressInput {
                steps: steps.parse().map_err(|_| CommandError::Usage(USAGE))?,
                hours_slept: hours
                    .parse::<f32>()
                    .ok()
                    .filter(|hours| hours.is_finite() && *hours >= 0.0)
                    .ok_or(CommandError::Usage(USAGE))?,
                sleep_quality: quality.join(" "),
            })
        }
        ("progress", _) => return Err(CommandError::Usage("progress <steps> <hours> <quality>")),
        ("progress-on", [date]) => MessageToBackend::ProgressForDateRequest(
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| CommandError::Usage("progress-on <YYYY-MM-DD>"))?,
        ),
        ("progress-on", _) => return Err(CommandError::Usage("progress-on <YYYY-MM-DD>")),
        ("history", []) => MessageToBackend::ProgressHistoryRequest,

        // chat keeps the text as typed
        ("chat", _) if !rest.is_empty() => MessageToBackend::SendChatMessage(rest.to_string()),
        ("chat", _) => return Err(CommandError::Usage("chat <text>")),
        ("go", [route]) => MessageToBackend::Navigate(route.parse()?),
        ("go", _) => return Err(CommandError::Usage("go <route>")),

        (name, _) => return Err(CommandError::Unknown(name.to_string())),
    };

    Ok(Some(Command::Backend(message)))
}
