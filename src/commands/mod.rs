//! `!command` routing.
//!
//! A line is split into a command name and its arguments, the name is looked
//! up in [`COMMAND_TABLE`], and the matching parser builds a [`Command`].
//! Handlers live next to the plugin they drive.

pub mod args;
pub mod components;
pub mod panel;
pub mod reply;
pub mod summary;

use crate::app::App;
use crate::plugins::projects::types::{Member, NewProject};
use crate::plugins::{projects, reminders, schedule, server, stocks, weather};
use crate::shared::errors::{BotError, BotResult, DenyReason};
use args::Args;
use components::{Action, ComponentId};
pub use reply::{Button, Reply};

pub const PREFIX: char = '!';

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTask { category: String, date: String, description: String },
    AddSubtask { category: String, date: String, number: i64, subtask: String },
    Schedule { category: Option<String>, date: Option<String> },
    RemoveTask { category: String, date: String, number: i64 },
    EditTask { category: String, date: String, number: i64, description: String },
    Week,
    Weather { city: Option<String> },
    AddStock { symbol: String, buy_below: Option<f64>, sell_above: Option<f64> },
    RemoveStock { symbol: String },
    Stocks,
    Remind { due: String, message: String },
    Reminders,
    CancelReminder { id: u64 },
    Stats,
    Daily,
    Say { message: String },
    Rcon { command: String },
    Status,
    Players,
    Plugins,
    Worlds,
    Tps,
    Seed,
    Ip,
    Map,
    SizeWorld,
    SizeMap,
    SizeMine,
    Panel,
    Projects,
    Project { id: String },
    MyProjects,
    NewProject(NewProject),
    Progress { id: String, progress: String, status: String, note: Option<String> },
    Materials { id: String, list: String },
    Collab { id: String, username: String },
    Note { id: String, note: String },
    DeleteProject { id: String },
    Help,
    Press(ComponentId),
}

pub struct CommandDef {
    pub name: &'static str,
    /// Invocation without the prefix, e.g. `weather [city]`.
    pub usage: &'static str,
    pub summary: &'static str,
    pub parse: fn(&mut Args<'_>) -> BotResult<Command>,
}

pub static COMMAND_TABLE: [CommandDef; 40] = [
    CommandDef {
        name: "addtask",
        usage: "addtask <category> <YYYY-MM-DD> <task>",
        summary: "Add a task to a category on a date.",
        parse: parse_addtask,
    },
    CommandDef {
        name: "addsubtask",
        usage: "addsubtask <category> <YYYY-MM-DD> <task_number> <subtask>",
        summary: "Add a subtask under an existing task.",
        parse: parse_addsubtask,
    },
    CommandDef {
        name: "schedule",
        usage: "schedule [category] [YYYY-MM-DD]",
        summary: "View tasks by category and/or date.",
        parse: parse_schedule,
    },
    CommandDef {
        name: "removetask",
        usage: "removetask <category> <YYYY-MM-DD> <task_number>",
        summary: "Remove a task by number.",
        parse: parse_removetask,
    },
    CommandDef {
        name: "edittask",
        usage: "edittask <category> <YYYY-MM-DD> <task_number> <new task>",
        summary: "Replace a task's text.",
        parse: parse_edittask,
    },
    CommandDef {
        name: "week",
        usage: "week",
        summary: "Tasks for today and the next two days.",
        parse: |_| Ok(Command::Week),
    },
    CommandDef {
        name: "weather",
        usage: "weather [city]",
        summary: "Current weather (defaults to the home city).",
        parse: parse_weather,
    },
    CommandDef {
        name: "addstock",
        usage: "addstock <symbol> [buy_below] [sell_above]",
        summary: "Watch a stock with optional price thresholds.",
        parse: parse_addstock,
    },
    CommandDef {
        name: "removestock",
        usage: "removestock <symbol>",
        summary: "Stop watching a stock.",
        parse: parse_removestock,
    },
    CommandDef {
        name: "stocks",
        usage: "stocks",
        summary: "List the stock watchlist.",
        parse: |_| Ok(Command::Stocks),
    },
    CommandDef {
        name: "remind",
        usage: "remind <YYYY-MM-DD> <HH:MM> <message>",
        summary: "Set a reminder.",
        parse: parse_remind,
    },
    CommandDef {
        name: "reminders",
        usage: "reminders",
        summary: "List active reminders.",
        parse: |_| Ok(Command::Reminders),
    },
    CommandDef {
        name: "cancelreminder",
        usage: "cancelreminder <id>",
        summary: "Cancel a reminder by id.",
        parse: parse_cancelreminder,
    },
    CommandDef {
        name: "stats",
        usage: "stats",
        summary: "Usage statistics.",
        parse: |_| Ok(Command::Stats),
    },
    CommandDef {
        name: "daily",
        usage: "daily",
        summary: "Weather, stocks, tasks and reminders for today.",
        parse: |_| Ok(Command::Daily),
    },
    CommandDef {
        name: "say",
        usage: "say <message>",
        summary: "Broadcast a message to all players.",
        parse: parse_say,
    },
    CommandDef {
        name: "command",
        usage: "command <rcon_command>",
        summary: "Run any RCON command directly.",
        parse: parse_rcon,
    },
    CommandDef {
        name: "status",
        usage: "status",
        summary: "Server status, player count and ping.",
        parse: |_| Ok(Command::Status),
    },
    CommandDef {
        name: "players",
        usage: "players",
        summary: "List online players.",
        parse: |_| Ok(Command::Players),
    },
    CommandDef {
        name: "plugins",
        usage: "plugins",
        summary: "List installed plugins.",
        parse: |_| Ok(Command::Plugins),
    },
    CommandDef {
        name: "worlds",
        usage: "worlds",
        summary: "List loaded worlds (requires Multiverse).",
        parse: |_| Ok(Command::Worlds),
    },
    CommandDef {
        name: "tps",
        usage: "tps",
        summary: "Current server TPS.",
        parse: |_| Ok(Command::Tps),
    },
    CommandDef {
        name: "seed",
        usage: "seed",
        summary: "The world seed.",
        parse: |_| Ok(Command::Seed),
    },
    CommandDef {
        name: "ip",
        usage: "ip",
        summary: "The server address.",
        parse: |_| Ok(Command::Ip),
    },
    CommandDef {
        name: "map",
        usage: "map",
        summary: "Link to the live map.",
        parse: |_| Ok(Command::Map),
    },
    CommandDef {
        name: "sizeworld",
        usage: "sizeworld",
        summary: "Sizes of the world folders, with the total.",
        parse: |_| Ok(Command::SizeWorld),
    },
    CommandDef {
        name: "sizemap",
        usage: "sizemap",
        summary: "Size of the live-map tile folder.",
        parse: |_| Ok(Command::SizeMap),
    },
    CommandDef {
        name: "sizemine",
        usage: "sizemine",
        summary: "Size of the whole server folder.",
        parse: |_| Ok(Command::SizeMine),
    },
    CommandDef {
        name: "panel",
        usage: "panel",
        summary: "Buttons for every feature.",
        parse: |_| Ok(Command::Panel),
    },
    CommandDef {
        name: "projects",
        usage: "projects",
        summary: "Show the project board.",
        parse: |_| Ok(Command::Projects),
    },
    CommandDef {
        name: "project",
        usage: "project <project_id>",
        summary: "Show one project in detail.",
        parse: parse_project,
    },
    CommandDef {
        name: "myprojects",
        usage: "myprojects",
        summary: "Projects you created.",
        parse: |_| Ok(Command::MyProjects),
    },
    CommandDef {
        name: "newproject",
        usage: "newproject \"<name>\" \"<description>\" [\"dimensions\"] [\"coordinates\"] [\"estimated time\"]",
        summary: "Create a project.",
        parse: parse_newproject,
    },
    CommandDef {
        name: "progress",
        usage: "progress <project_id> <0-100> <Planning|In Progress|On Hold|Completed> [note]",
        summary: "Update a project's progress and status.",
        parse: parse_progress,
    },
    CommandDef {
        name: "materials",
        usage: "materials <project_id> <item; item; ...>",
        summary: "Replace a project's materials list.",
        parse: parse_materials,
    },
    CommandDef {
        name: "collab",
        usage: "collab <project_id> <username>",
        summary: "Add a collaborator.",
        parse: parse_collab,
    },
    CommandDef {
        name: "note",
        usage: "note <project_id> <note>",
        summary: "Add a note to a project.",
        parse: parse_note,
    },
    CommandDef {
        name: "deleteproject",
        usage: "deleteproject <project_id>",
        summary: "Delete a project you created.",
        parse: parse_deleteproject,
    },
    CommandDef {
        name: "help",
        usage: "help",
        summary: "Show this command reference.",
        parse: |_| Ok(Command::Help),
    },
    CommandDef {
        name: "press",
        usage: "press <button_id>",
        summary: "Press a button from an earlier reply.",
        parse: parse_press,
    },
];

pub fn lookup(name: &str) -> Option<&'static CommandDef> {
    COMMAND_TABLE.iter().find(|def| def.name == name)
}

// ============================================================================
// Parsers
// ============================================================================

fn parse_addtask(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::AddTask {
        category: args.required("category")?,
        date: args.required("date")?,
        description: args.rest_required("task")?,
    })
}

fn parse_addsubtask(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::AddSubtask {
        category: args.required("category")?,
        date: args.required("date")?,
        number: args.parsed("task_number")?,
        subtask: args.rest_required("subtask")?,
    })
}

fn parse_schedule(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Schedule {
        category: args.next_arg(),
        date: args.next_arg(),
    })
}

fn parse_removetask(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::RemoveTask {
        category: args.required("category")?,
        date: args.required("date")?,
        number: args.parsed("task_number")?,
    })
}

fn parse_edittask(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::EditTask {
        category: args.required("category")?,
        date: args.required("date")?,
        number: args.parsed("task_number")?,
        description: args.rest_required("new_task")?,
    })
}

fn parse_weather(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Weather { city: args.rest() })
}

fn parse_addstock(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::AddStock {
        symbol: args.required("symbol")?,
        buy_below: args.parsed_opt("buy_below")?,
        sell_above: args.parsed_opt("sell_above")?,
    })
}

fn parse_removestock(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::RemoveStock {
        symbol: args.required("symbol")?,
    })
}

fn parse_remind(args: &mut Args<'_>) -> BotResult<Command> {
    let date = args.required("date")?;
    let time = args.required("time")?;
    Ok(Command::Remind {
        due: format!("{} {}", date, time),
        message: args.rest_required("message")?,
    })
}

fn parse_cancelreminder(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::CancelReminder {
        id: args.parsed("reminder_id")?,
    })
}

fn parse_say(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Say {
        message: args.rest_required("message")?,
    })
}

fn parse_rcon(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Rcon {
        command: args.rest_required("cmd")?,
    })
}

fn parse_project(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Project {
        id: args.required("project_id")?,
    })
}

fn parse_newproject(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::NewProject(NewProject {
        name: args.required("name")?,
        description: args.required("description")?,
        dimensions: args.next_arg(),
        coordinates: args.next_arg(),
        estimated_time: args.next_arg(),
    }))
}

/// Reads a status, accepting the two-word labels unquoted.
fn status_arg(args: &mut Args<'_>) -> BotResult<String> {
    let first = args.required("status")?;
    let second = args.peek().map(|s| s.to_lowercase());
    let joined = match (first.to_lowercase().as_str(), second.as_deref()) {
        ("in", Some("progress")) | ("on", Some("hold")) => {
            let second = args.required("status")?;
            format!("{} {}", first, second)
        }
        _ => first,
    };
    Ok(joined)
}

fn parse_progress(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Progress {
        id: args.required("project_id")?,
        progress: args.required("progress")?,
        status: status_arg(args)?,
        note: args.rest(),
    })
}

fn parse_materials(args: &mut Args<'_>) -> BotResult<Command> {
    let id = args.required("project_id")?;
    let list = args.rest_required("materials")?.replace(';', "\n");
    Ok(Command::Materials { id, list })
}

fn parse_collab(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Collab {
        id: args.required("project_id")?,
        username: args.rest_required("username")?,
    })
}

fn parse_note(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Note {
        id: args.required("project_id")?,
        note: args.rest_required("note")?,
    })
}

fn parse_deleteproject(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::DeleteProject {
        id: args.required("project_id")?,
    })
}

fn parse_press(args: &mut Args<'_>) -> BotResult<Command> {
    Ok(Command::Press(args.required("button_id")?.parse()?))
}

/// Parses a `!name args...` line. Lines without the prefix are not commands.
pub fn parse_line(line: &str) -> Option<BotResult<Command>> {
    let body = line.trim().strip_prefix(PREFIX)?;
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest),
        None => (body, ""),
    };

    let result = match lookup(&name.to_lowercase()) {
        Some(def) => (def.parse)(&mut Args::new(rest)),
        None => Err(BotError::not_found(
            "Command not found! Use `!help` to see available commands.",
        )),
    };
    Some(result)
}

// ============================================================================
// Dispatch
// ============================================================================

pub fn help() -> Reply {
    let mut body = String::from("🛠 **Bot Commands**\n");
    for def in COMMAND_TABLE.iter() {
        body.push_str(&format!("`{}{}` - {}\n", PREFIX, def.usage, def.summary));
    }
    Reply::text(body.trim_end())
}

/// Runs one command on behalf of `caller`.
pub async fn execute(app: &App, caller: &Member, command: Command) -> BotResult<Reply> {
    let command = match command {
        Command::Press(component) => match component.action() {
            Action::Run(command) => command,
            Action::Prompt(text) => return Ok(Reply::text(text)),
        },
        other => other,
    };

    match command {
        Command::AddTask { category, date, description } => {
            schedule::commands::add_task(&app.schedule, &category, &date, &description)
        }
        Command::AddSubtask { category, date, number, subtask } => {
            schedule::commands::add_subtask(&app.schedule, &category, &date, number, &subtask)
        }
        Command::Schedule { category, date } => {
            schedule::commands::view(&app.schedule, category.as_deref(), date.as_deref())
        }
        Command::RemoveTask { category, date, number } => {
            schedule::commands::remove_task(&app.schedule, &category, &date, number)
        }
        Command::EditTask { category, date, number, description } => {
            schedule::commands::edit_task(&app.schedule, &category, &date, number, &description)
        }
        Command::Week => Ok(schedule::commands::week(&app.schedule, app.today())),
        Command::Weather { city } => weather::commands::weather(app, city.as_deref()).await,
        Command::AddStock { symbol, buy_below, sell_above } => {
            stocks::commands::add_stock(&app.stocks, &symbol, buy_below, sell_above)
        }
        Command::RemoveStock { symbol } => stocks::commands::remove_stock(&app.stocks, &symbol),
        Command::Stocks => Ok(stocks::commands::list_stocks(&app.stocks)),
        Command::Remind { due, message } => {
            reminders::commands::set_reminder(&app.reminders, &due, &message, app.now())
        }
        Command::Reminders => Ok(reminders::commands::list_reminders(&app.reminders)),
        Command::CancelReminder { id } => reminders::commands::cancel_reminder(&app.reminders, id),
        Command::Stats => Ok(summary::stats(app)),
        Command::Daily => Ok(summary::daily(app).await),
        Command::Say { message } => server::commands::say(app, caller, &message).await,
        Command::Rcon { command } => server::commands::raw(app, &command).await,
        Command::Status => Ok(server::commands::status(app).await),
        Command::Players => server::commands::players(app).await,
        Command::Plugins => server::commands::plugins(app).await,
        Command::Worlds => server::commands::worlds(app).await,
        Command::Tps => server::commands::tps(app).await,
        Command::Seed => server::commands::seed(app).await,
        Command::Ip => Ok(server::commands::ip(app)),
        Command::Map => Ok(server::commands::map(app)),
        Command::SizeWorld => server::commands::size_worlds(app).await,
        Command::SizeMap => server::commands::size_map(app).await,
        Command::SizeMine => server::commands::size_mine(app).await,
        Command::Panel => Ok(panel::control_panel()),
        Command::Projects => Ok(projects::commands::board(&app.projects)),
        Command::Project { id } => projects::commands::view(&app.projects, caller, &id),
        Command::MyProjects => Ok(projects::commands::mine(&app.projects, caller)),
        Command::NewProject(new) => projects::commands::create(&app.projects, caller, new, app.now()),
        Command::Progress { id, progress, status, note } => projects::commands::progress(
            &app.projects,
            caller,
            &id,
            &progress,
            &status,
            note.as_deref(),
            app.now(),
        ),
        Command::Materials { id, list } => projects::commands::materials(&app.projects, &id, &list),
        Command::Collab { id, username } => projects::commands::collab(&app.projects, &id, &username),
        Command::Note { id, note } => projects::commands::note(&app.projects, caller, &id, &note, app.now()),
        Command::DeleteProject { id } => projects::commands::delete(&app.projects, caller, &id),
        Command::Help => Ok(help()),
        Command::Press(_) => Err(BotError::validation("Buttons cannot press other buttons.")),
    }
}

/// User-facing text for a failed command.
pub fn render_error(error: &BotError) -> String {
    match error {
        BotError::Validation(msg) | BotError::NotFound(msg) | BotError::PermissionDenied(msg) => {
            format!("❌ {}", msg)
        }
        BotError::RateLimited(DenyReason::HardLimitReached) => {
            "❌ Monthly weather API limit reached. Try again next month.".to_string()
        }
        BotError::RateLimited(DenyReason::RateLimited) => {
            "❌ Weather API rate limit reached. Please wait a minute.".to_string()
        }
        BotError::External(msg) => format!("❌ {}", msg),
        BotError::Storage(e) => {
            tracing::error!(target: "system", "Storage failure: {}", e);
            "❌ An error occurred: could not save your changes.".to_string()
        }
    }
}

/// Handles one input line. Returns `None` for lines that are not commands.
pub async fn dispatch(app: &App, caller: &Member, line: &str) -> Option<Reply> {
    let parsed = parse_line(line)?;
    let result = match parsed {
        Ok(command) => execute(app, caller, command).await,
        Err(e) => Err(e),
    };

    Some(result.unwrap_or_else(|e| {
        tracing::debug!(target: "system", line, "Command failed: {}", e);
        Reply::text(render_error(&e))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn parse(line: &str) -> BotResult<Command> {
        parse_line(line).expect("line has the prefix")
    }

    #[test]
    fn test_command_names_are_unique() {
        let names: HashSet<_> = COMMAND_TABLE.iter().map(|def| def.name).collect();
        assert_eq!(names.len(), COMMAND_TABLE.len());
        for def in COMMAND_TABLE.iter() {
            assert!(def.usage.starts_with(def.name), "usage of {} must start with its name", def.name);
        }
    }

    #[test]
    fn test_non_command_lines_are_ignored() {
        assert!(parse_line("hello there").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn test_unknown_command() {
        match parse("!dance") {
            Err(BotError::NotFound(msg)) => assert!(msg.contains("!help")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_addtask_keeps_free_text() {
        assert_eq!(
            parse("!addtask Work 2025-07-10 Call the plumber").unwrap(),
            Command::AddTask {
                category: "Work".into(),
                date: "2025-07-10".into(),
                description: "Call the plumber".into(),
            }
        );
    }

    #[test]
    fn test_parse_names_are_case_insensitive() {
        assert_eq!(parse("!STOCKS").unwrap(), Command::Stocks);
    }

    #[test]
    fn test_parse_remind_joins_date_and_time() {
        assert_eq!(
            parse("!remind 2025-07-10 14:30 Dentist").unwrap(),
            Command::Remind {
                due: "2025-07-10 14:30".into(),
                message: "Dentist".into(),
            }
        );
    }

    #[test]
    fn test_parse_addstock_optional_thresholds() {
        assert_eq!(
            parse("!addstock aapl 150").unwrap(),
            Command::AddStock {
                symbol: "aapl".into(),
                buy_below: Some(150.0),
                sell_above: None,
            }
        );
        assert!(matches!(parse("!addstock aapl cheap"), Err(BotError::Validation(_))));
    }

    #[test]
    fn test_parse_progress_two_word_status() {
        assert_eq!(
            parse("!progress proj_001 40 in progress walls are up").unwrap(),
            Command::Progress {
                id: "proj_001".into(),
                progress: "40".into(),
                status: "in progress".into(),
                note: Some("walls are up".into()),
            }
        );
        assert_eq!(
            parse(r#"!progress proj_001 100 "Completed""#).unwrap(),
            Command::Progress {
                id: "proj_001".into(),
                progress: "100".into(),
                status: "Completed".into(),
                note: None,
            }
        );
    }

    #[test]
    fn test_parse_newproject_quoted_fields() {
        let command = parse(r#"!newproject "Castle" "Big stone castle" "64x64""#).unwrap();
        assert_eq!(
            command,
            Command::NewProject(NewProject {
                name: "Castle".into(),
                description: "Big stone castle".into(),
                dimensions: Some("64x64".into()),
                coordinates: None,
                estimated_time: None,
            })
        );
    }

    #[test]
    fn test_parse_materials_splits_on_semicolons() {
        assert_eq!(
            parse("!materials proj_002 64 stone; 12 glass").unwrap(),
            Command::Materials {
                id: "proj_002".into(),
                list: "64 stone\n 12 glass".into(),
            }
        );
    }

    #[test]
    fn test_parse_missing_argument() {
        match parse("!removetask work 2025-07-10") {
            Err(BotError::Validation(msg)) => assert!(msg.contains("task_number")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_press() {
        assert_eq!(
            parse("!press board:refresh").unwrap(),
            Command::Press(ComponentId::BoardRefresh)
        );
        assert!(parse("!press board:explode").is_err());
    }

    #[test]
    fn test_help_lists_every_command() {
        let body = help().body;
        for def in COMMAND_TABLE.iter() {
            assert!(body.contains(&format!("!{}", def.usage)));
        }
    }

    #[test]
    fn test_render_error_by_kind() {
        assert_eq!(render_error(&BotError::validation("Bad date")), "❌ Bad date");
        assert!(render_error(&BotError::RateLimited(DenyReason::HardLimitReached)).contains("Monthly"));
        assert!(render_error(&BotError::RateLimited(DenyReason::RateLimited)).contains("minute"));
    }
}
