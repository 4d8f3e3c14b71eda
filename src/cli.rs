//! Command line definition.
//!
//! `build` describes the interface with clap; `parse` turns the matches into
//! a typed `Command` so the rest of the application never sees strings.

use crate::error::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::inventory::{Condition, ItemId, TaskId};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Flags that apply to every command.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub config_dir: Option<String>,
    pub verbose: bool,
    pub memory: bool,
}

/// Optional annotations given on the command line.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub location: Option<String>,
    pub notes: Option<String>,
    pub condition: Option<Condition>,
}

/// Specify every command the binary accepts.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    TaskNew { name: String },
    TaskList,
    TaskShow { task: TaskId },
    TaskRename { task: TaskId, name: String },
    TaskDelete { task: TaskId },
    ItemAdd { task: TaskId, code: String, fields: ItemFields },
    ItemList { task: TaskId },
    ItemEdit { task: TaskId, item: ItemId, fields: ItemFields },
    ItemDelete { task: TaskId, item: ItemId },
    Scan { task: TaskId, continuous: bool },
    Export { task: TaskId, format: ExportFormat, out: Option<PathBuf> },
    Summary { task: TaskId },
    Reset { confirmed: bool },
}

fn annotation_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name("location")
            .long("location")
            .short("l")
            .value_name("LOCATION")
            .takes_value(true)
            .help("Where the item was found"),
        Arg::with_name("notes")
            .long("notes")
            .short("n")
            .value_name("NOTES")
            .takes_value(true)
            .help("Free-form notes"),
        Arg::with_name("condition")
            .long("condition")
            .short("c")
            .value_name("CONDITION")
            .takes_value(true)
            .help("Excellent, Good, Fair, Poor or Damaged"),
    ]
}

fn task_id_arg(name: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name)
        .value_name("TASK_ID")
        .required(true)
        .help("Task identifier")
}

/// Describe the command line interface.
///
pub fn build() -> App<'static, 'static> {
    App::new("inventory-scan")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("DIR")
                .takes_value(true)
                .global(true)
                .help("Directory holding config.yml"),
        )
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .short("v")
                .global(true)
                .help("Log at debug level"),
        )
        .arg(
            Arg::with_name("memory")
                .long("memory")
                .global(true)
                .help("Keep data in memory for this run only"),
        )
        .subcommand(
            SubCommand::with_name("task")
                .about("Manage inventory tasks")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("new")
                        .about("Create a task")
                        .arg(Arg::with_name("name").value_name("NAME").required(true)),
                )
                .subcommand(SubCommand::with_name("list").about("List tasks, newest first"))
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Show a task with its items")
                        .arg(task_id_arg("task")),
                )
                .subcommand(
                    SubCommand::with_name("rename")
                        .about("Rename a task")
                        .arg(task_id_arg("task"))
                        .arg(Arg::with_name("name").value_name("NAME").required(true)),
                )
                .subcommand(
                    SubCommand::with_name("delete")
                        .about("Delete a task and its items")
                        .arg(task_id_arg("task")),
                ),
        )
        .subcommand(
            SubCommand::with_name("item")
                .about("Manage scanned items")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("add")
                        .about("Record a manual entry")
                        .arg(task_id_arg("task"))
                        .arg(Arg::with_name("code").value_name("CODE").required(true))
                        .args(&annotation_args()),
                )
                .subcommand(
                    SubCommand::with_name("list")
                        .about("List the items of a task")
                        .arg(task_id_arg("task")),
                )
                .subcommand(
                    SubCommand::with_name("edit")
                        .about("Change the annotations of an item")
                        .arg(Arg::with_name("item").value_name("ITEM_ID").required(true))
                        .arg(
                            Arg::with_name("task")
                                .long("task")
                                .value_name("TASK_ID")
                                .takes_value(true)
                                .required(true),
                        )
                        .args(&annotation_args()),
                )
                .subcommand(
                    SubCommand::with_name("delete")
                        .about("Delete an item")
                        .arg(Arg::with_name("item").value_name("ITEM_ID").required(true))
                        .arg(
                            Arg::with_name("task")
                                .long("task")
                                .value_name("TASK_ID")
                                .takes_value(true)
                                .required(true),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("scan")
                .about("Record codes read line by line from stdin")
                .arg(task_id_arg("task"))
                .arg(
                    Arg::with_name("continuous")
                        .long("continuous")
                        .help("Keep scanning after the first code"),
                ),
        )
        .subcommand(
            SubCommand::with_name("export")
                .about("Export a task to a file")
                .arg(task_id_arg("task"))
                .arg(
                    Arg::with_name("format")
                        .long("format")
                        .short("f")
                        .value_name("FORMAT")
                        .takes_value(true)
                        .default_value("xlsx")
                        .help("csv or xlsx"),
                )
                .arg(
                    Arg::with_name("out")
                        .long("out")
                        .short("o")
                        .value_name("DIR")
                        .takes_value(true)
                        .help("Output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("summary")
                .about("Summarize the items of a task")
                .arg(task_id_arg("task")),
        )
        .subcommand(
            SubCommand::with_name("reset")
                .about("Delete every task and item")
                .arg(
                    Arg::with_name("yes")
                        .long("yes")
                        .help("Confirm that all data should be deleted"),
                ),
        )
}

/// Parse a required value, naming the argument on failure.
///
fn value<T>(matches: &ArgMatches, name: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = matches
        .value_of(name)
        .ok_or_else(|| AppError::Other(format!("Missing value for '{}'", name)))?;
    raw.parse::<T>()
        .map_err(|e| AppError::Other(format!("Invalid value for '{}': {}", name, e)))
}

fn item_fields(matches: &ArgMatches) -> AppResult<ItemFields> {
    let condition = match matches.value_of("condition") {
        Some(_) => Some(value::<Condition>(matches, "condition")?),
        None => None,
    };
    Ok(ItemFields {
        location: matches.value_of("location").map(str::to_string),
        notes: matches.value_of("notes").map(str::to_string),
        condition,
    })
}

/// Global arguments land on whichever subcommand they were typed after.
///
fn global_flag(matches: &ArgMatches, name: &str) -> bool {
    matches.is_present(name)
        || matches
            .subcommand()
            .1
            .map_or(false, |sub| global_flag(sub, name))
}

fn global_value(matches: &ArgMatches, name: &str) -> Option<String> {
    matches
        .subcommand()
        .1
        .and_then(|sub| global_value(sub, name))
        .or_else(|| matches.value_of(name).map(str::to_string))
}

/// Split matches into global options and the command to run.
///
pub fn parse(matches: &ArgMatches) -> AppResult<(Options, Command)> {
    let options = Options {
        config_dir: global_value(matches, "config"),
        verbose: global_flag(matches, "verbose"),
        memory: global_flag(matches, "memory"),
    };

    let command = match matches.subcommand() {
        ("task", Some(task)) => match task.subcommand() {
            ("new", Some(m)) => Command::TaskNew {
                name: value(m, "name")?,
            },
            ("list", Some(_)) => Command::TaskList,
            ("show", Some(m)) => Command::TaskShow {
                task: value(m, "task")?,
            },
            ("rename", Some(m)) => Command::TaskRename {
                task: value(m, "task")?,
                name: value(m, "name")?,
            },
            ("delete", Some(m)) => Command::TaskDelete {
                task: value(m, "task")?,
            },
            (other, _) => return Err(unknown(other)),
        },
        ("item", Some(item)) => match item.subcommand() {
            ("add", Some(m)) => Command::ItemAdd {
                task: value(m, "task")?,
                code: value(m, "code")?,
                fields: item_fields(m)?,
            },
            ("list", Some(m)) => Command::ItemList {
                task: value(m, "task")?,
            },
            ("edit", Some(m)) => Command::ItemEdit {
                task: value(m, "task")?,
                item: value(m, "item")?,
                fields: item_fields(m)?,
            },
            ("delete", Some(m)) => Command::ItemDelete {
                task: value(m, "task")?,
                item: value(m, "item")?,
            },
            (other, _) => return Err(unknown(other)),
        },
        ("scan", Some(m)) => Command::Scan {
            task: value(m, "task")?,
            continuous: m.is_present("continuous"),
        },
        ("export", Some(m)) => Command::Export {
            task: value(m, "task")?,
            format: value(m, "format")?,
            out: m.value_of("out").map(PathBuf::from),
        },
        ("summary", Some(m)) => Command::Summary {
            task: value(m, "task")?,
        },
        ("reset", Some(m)) => Command::Reset {
            confirmed: m.is_present("yes"),
        },
        (other, _) => return Err(unknown(other)),
    };

    Ok((options, command))
}

fn unknown(name: &str) -> AppError {
    AppError::Other(format!("Unknown command '{}'", name))
}
