//! Chat command grammar.

use nudge_store::Weekday;

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    PlanToday,
    NextTask,
    Add {
        day: Weekday,
        time: String,
        task: String,
    },
    List {
        day: Weekday,
    },
    Del {
        day: Weekday,
        index: usize,
    },
}

/// Why a recognized command could not be used as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownDay(String),
    BadTime(String),
    BadIndex(String),
    Usage(&'static str),
}

impl ParseError {
    /// The user-facing rejection message.
    pub fn reply(&self) -> String {
        match self {
            ParseError::UnknownDay(day) => format!(
                "❌ Unknown day \"{day}\". Use: monday, tuesday, wednesday, thursday, friday, saturday, sunday."
            ),
            ParseError::BadTime(time) => {
                format!("❌ \"{time}\" is not a valid time. Use 24h HH:MM, e.g. 09:30.")
            }
            ParseError::BadIndex(index) => {
                format!("❌ \"{index}\" is not a task number. Use /list <day> to see the numbers.")
            }
            ParseError::Usage(usage) => (*usage).to_string(),
        }
    }
}

const ADD_USAGE: &str = "Usage: `/add <day> <HH:MM> <text>`";
const LIST_USAGE: &str = "Usage: `/list <day>`";
const DEL_USAGE: &str = "Usage: `/del <day> <number>`";

impl Command {
    /// Parse a message text. `None` when the text is not one of the bot's
    /// commands; such messages are ignored entirely.
    pub fn parse(text: &str) -> Option<Result<Command, ParseError>> {
        let mut parts = text.trim().split_whitespace();
        let head = parts.next()?;
        if !head.starts_with('/') {
            return None;
        }
        // group chats address the bot as /add@botname
        let head = head.split('@').next().unwrap_or(head);
        let args: Vec<&str> = parts.collect();

        Some(match head {
            "/start" => Ok(Command::Start),
            "/plan_today" => Ok(Command::PlanToday),
            "/next_task" => Ok(Command::NextTask),
            "/add" => parse_add(&args),
            "/list" => parse_list(&args),
            "/del" => parse_del(&args),
            _ => return None,
        })
    }
}

fn parse_day(s: &str) -> Result<Weekday, ParseError> {
    s.parse().map_err(|_| ParseError::UnknownDay(s.to_string()))
}

/// Zero-padded 24h "HH:MM" with in-range hour and minute.
fn parse_time(s: &str) -> Result<String, ParseError> {
    let bad = || ParseError::BadTime(s.to_string());
    let (hh, mm) = s.split_once(':').ok_or_else(bad)?;
    if hh.len() != 2 || mm.len() != 2 {
        return Err(bad());
    }
    let hour: u32 = hh.parse().map_err(|_| bad())?;
    let minute: u32 = mm.parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }
    Ok(s.to_string())
}

fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    if args.len() < 3 {
        return Err(ParseError::Usage(ADD_USAGE));
    }
    Ok(Command::Add {
        day: parse_day(args[0])?,
        time: parse_time(args[1])?,
        task: args[2..].join(" "),
    })
}

fn parse_list(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [day] => Ok(Command::List {
            day: parse_day(day)?,
        }),
        _ => Err(ParseError::Usage(LIST_USAGE)),
    }
}

fn parse_del(args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [day, index] => Ok(Command::Del {
            day: parse_day(day)?,
            index: index
                .parse()
                .ok()
                .filter(|i| *i >= 1)
                .ok_or_else(|| ParseError::BadIndex(index.to_string()))?,
        }),
        _ => Err(ParseError::Usage(DEL_USAGE)),
    }
}
