//! Shell command parsing

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Queue the whole catalog and play from an index
    Play(usize),
    /// Play one catalog track on its own
    One(usize),
    /// Queue the catalog without starting playback
    Stage,
    Toggle,
    Next,
    Previous,
    Seek(f64),
    Volume(f32),
    Mute,
    Shuffle,
    /// Like/unlike a catalog track, or the current one
    Like(Option<usize>),
    /// Sign in; a guest identity when no name is given
    Login(Option<String>),
    Logout,
    /// Advance the simulated clock
    Tick(f64),
    /// Make a catalog track's media unresolvable
    Break(usize),
    Status,
    Queue,
    Source,
    History,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid argument '{0}'")]
    InvalidArgument(String),
}

impl Command {
    /// Parse one input line, `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => Command::Play(optional(arg)?.unwrap_or(0)),
            "one" => Command::One(required(arg, "one", "a track number")?),
            "stage" => Command::Stage,
            "toggle" | "p" => Command::Toggle,
            "next" | "n" => Command::Next,
            "prev" | "previous" | "b" => Command::Previous,
            "seek" => Command::Seek(required(arg, "seek", "a position in seconds")?),
            "vol" | "volume" => Command::Volume(required(arg, "vol", "a level between 0 and 1")?),
            "mute" => Command::Mute,
            "shuffle" => Command::Shuffle,
            "like" => Command::Like(optional(arg)?),
            "login" => Command::Login(arg.map(str::to_string)),
            "logout" => Command::Logout,
            "tick" => Command::Tick(optional(arg)?.unwrap_or(1.0)),
            "break" => Command::Break(required(arg, "break", "a track number")?),
            "status" | "s" => Command::Status,
            "queue" | "q" => Command::Queue,
            "source" => Command::Source,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn optional<T: std::str::FromStr>(arg: Option<&str>) -> Result<Option<T>, ParseError> {
    arg.map(|raw| {
        raw.parse()
            .map_err(|_| ParseError::InvalidArgument(raw.to_string()))
    })
    .transpose()
}

fn required<T: std::str::FromStr>(
    arg: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<T, ParseError> {
    optional(arg)?.ok_or(ParseError::MissingArgument { command, expected })
}

pub const HELP: &str = "\
commands:
  play [n]      queue the catalog, start at track n (default 0)
  one <n>       play track n on its own
  stage         queue the catalog without playing
  toggle | p    play/pause
  next | n      next track
  prev | b      previous track (restarts after 3s)
  seek <secs>   seek within the current track
  vol <0-1>     set volume
  mute          toggle mute
  shuffle       toggle shuffle
  like [n]      like/unlike track n or the current track
  login [name]  sign in (guest when no name)
  logout        sign out
  tick [secs]   advance the simulated clock (default 1s)
  break <n>     make track n fail to load
  status | s    show player state
  queue | q     show the queue
  source        where 'go to source' would lead
  history       recently played for the signed-in user
  quit          exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(Command::parse("   "), Ok(None));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(Command::parse("play 2"), Ok(Some(Command::Play(2))));
        assert_eq!(Command::parse("play"), Ok(Some(Command::Play(0))));
        assert_eq!(Command::parse("seek 42.5"), Ok(Some(Command::Seek(42.5))));
        assert_eq!(Command::parse("vol 0.3"), Ok(Some(Command::Volume(0.3))));
        assert_eq!(Command::parse("like"), Ok(Some(Command::Like(None))));
        assert_eq!(Command::parse("like 4"), Ok(Some(Command::Like(Some(4)))));
        assert_eq!(
            Command::parse("login alice"),
            Ok(Some(Command::Login(Some("alice".to_string()))))
        );
        assert_eq!(Command::parse("tick"), Ok(Some(Command::Tick(1.0))));
    }

    #[test]
    fn aliases_and_case() {
        assert_eq!(Command::parse("N"), Ok(Some(Command::Next)));
        assert_eq!(Command::parse("b"), Ok(Some(Command::Previous)));
        assert_eq!(Command::parse("Exit"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            Command::parse("dance"),
            Err(ParseError::Unknown("dance".to_string()))
        );
        assert_eq!(
            Command::parse("seek"),
            Err(ParseError::MissingArgument {
                command: "seek",
                expected: "a position in seconds"
            })
        );
        assert_eq!(
            Command::parse("one x"),
            Err(ParseError::InvalidArgument("x".to_string()))
        );
    }
}
