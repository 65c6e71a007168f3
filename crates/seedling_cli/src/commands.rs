//! Slash-command parsing for the chat prompt.

pub const COMMANDS_HELP: &str = "\
/spark                         let the companion speak first
/wake                          gently wake the companion from a dream
/garden                        open or close the memory garden
/gallery                       open or close the gallery of creations
/calendar                      open or close the calendar
/calendar add DATE TITLE [| NOTE]   add an event (DATE is YYYY-MM-DD)
/calendar toggle N             mark event N done or not done
/calendar delete N             remove event N
/growth                        see how the companion has grown
/reset                         start over with a new seed
/quit                          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Spark,
    Wake,
    Garden,
    Gallery,
    Calendar(CalendarCommand),
    Growth,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCommand {
    Toggle,
    Add {
        date: String,
        title: String,
        note: Option<String>,
    },
    /// 1-based position in the listed calendar.
    Complete(usize),
    Delete(usize),
}

/// Parse one line from the chat prompt. Anything not starting with `/` is speech.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "spark" => Ok(Command::Spark),
        "wake" => Ok(Command::Wake),
        "garden" | "memories" => Ok(Command::Garden),
        "gallery" => Ok(Command::Gallery),
        "calendar" | "cal" => parse_calendar(args).map(Command::Calendar),
        "growth" | "tree" => Ok(Command::Growth),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command /{other}. Type /help for the list.")),
    }
}

fn parse_calendar(args: &str) -> Result<CalendarCommand, String> {
    if args.is_empty() {
        return Ok(CalendarCommand::Toggle);
    }
    let (verb, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let rest = rest.trim();

    match verb {
        "add" => {
            let (date, text) = rest
                .split_once(char::is_whitespace)
                .ok_or("Usage: /calendar add YYYY-MM-DD TITLE [| NOTE]")?;
            let (title, note) = match text.split_once('|') {
                Some((title, note)) => (title.trim(), Some(note.trim().to_string())),
                None => (text.trim(), None),
            };
            Ok(CalendarCommand::Add {
                date: date.to_string(),
                title: title.to_string(),
                note,
            })
        }
        "toggle" | "done" => position(rest).map(CalendarCommand::Complete),
        "delete" | "rm" => position(rest).map(CalendarCommand::Delete),
        other => Err(format!("Unknown calendar action '{other}'.")),
    }
}

fn position(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Expected an event number, got '{raw}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_speech() {
        assert_eq!(parse("  hello there "), Ok(Command::Say("hello there".into())));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/spark"), Ok(Command::Spark));
        assert_eq!(parse("/WAKE"), Ok(Command::Wake));
        assert_eq!(parse("/quit"), Ok(Command::Quit));
        assert!(parse("/dance").is_err());
    }

    #[test]
    fn test_calendar_add_with_note() {
        assert_eq!(
            parse("/calendar add 2026-04-01 Water the garden | before noon"),
            Ok(Command::Calendar(CalendarCommand::Add {
                date: "2026-04-01".into(),
                title: "Water the garden".into(),
                note: Some("before noon".into()),
            }))
        );
    }

    #[test]
    fn test_calendar_positions() {
        assert_eq!(parse("/calendar"), Ok(Command::Calendar(CalendarCommand::Toggle)));
        assert_eq!(parse("/cal done 2"), Ok(Command::Calendar(CalendarCommand::Complete(2))));
        assert_eq!(parse("/calendar delete 1"), Ok(Command::Calendar(CalendarCommand::Delete(1))));
        assert!(parse("/calendar delete 0").is_err());
        assert!(parse("/calendar add 2026-04-01").is_err());
    }
}
