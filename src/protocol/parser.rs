//! Command parser.
//!
//! Parses incoming protocol commands from raw text into structured
//! `Command` variants that the engine main loop can dispatch on.

/// How `position` names the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSpec {
    StartPos,
    Id(String),
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Protocol handshake.
    Tavla,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Clear the current position.
    NewGame,

    /// Set the board from `startpos` or a position ID.
    Position(PositionSpec),

    /// Set the side on roll. Kept raw so the engine can reject it.
    Side { which: i32 },

    /// Print the feature vector of the current position.
    Features,

    /// Print the per-side metrics and position class.
    Summary,

    /// Print the position class.
    Classify,

    /// Print the position ID of the current board.
    Encode,

    /// Print the name of every feature.
    Names,

    /// Extract features for several position IDs at once.
    Batch { ids: Vec<String> },

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    match head {
        "tavla" => Some(Command::Tavla),
        "isready" => Some(Command::IsReady),
        "newgame" => Some(Command::NewGame),
        "features" => Some(Command::Features),
        "summary" => Some(Command::Summary),
        "classify" => Some(Command::Classify),
        "encode" => Some(Command::Encode),
        "names" => Some(Command::Names),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(args),
        "position" => parse_position(args),
        "side" => parse_side(args),
        "batch" => parse_batch(args),

        other => {
            log::warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        log::warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let rest = &args[1..];
    let (name_parts, value_parts) = match rest.iter().position(|&t| t == "value") {
        Some(vi) => (&rest[..vi], Some(&rest[vi + 1..])),
        None => (rest, None),
    };
    if name_parts.is_empty() {
        log::warn!("malformed setoption: empty name");
        return None;
    }

    Some(Command::SetOption {
        name: name_parts.join(" "),
        value: value_parts
            .filter(|parts| !parts.is_empty())
            .map(|parts| parts.join(" ")),
    })
}

/// Parses `position startpos` or `position <id>`.
fn parse_position(args: &[&str]) -> Option<Command> {
    match args {
        ["startpos"] => Some(Command::Position(PositionSpec::StartPos)),
        [id] => Some(Command::Position(PositionSpec::Id(id.to_string()))),
        _ => {
            log::warn!("malformed position: expected 'position startpos|<position-id>'");
            None
        }
    }
}

/// Parses `side <n>`.
fn parse_side(args: &[&str]) -> Option<Command> {
    let [raw] = args else {
        log::warn!("malformed side: expected 'side <n>'");
        return None;
    };
    match raw.parse::<i32>() {
        Ok(which) => Some(Command::Side { which }),
        Err(_) => {
            log::warn!("invalid side value: '{}'", raw);
            None
        }
    }
}

/// Parses `batch <id> [<id> ...]`.
fn parse_batch(args: &[&str]) -> Option<Command> {
    if args.is_empty() {
        log::warn!("malformed batch: expected 'batch <id> [<id> ...]'");
        return None;
    }
    Some(Command::Batch {
        ids: args.iter().map(|s| s.to_string()).collect(),
    })
}
