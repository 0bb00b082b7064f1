use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    conf::settings,
    pkg::{
        client::{
            api::{HttpJobApi, JobApi},
            board::Board,
            tracker::{Field, StatusFilter, Tracker},
        },
        internal::adaptors::jobs::spec::Status,
    },
    prelude::Result,
};

const HELP: &str = "\
commands:
  title <text> | company <text> | location <text>   fill the form
  status <Applied|Interview|Offer|Rejected>          form status
  submit                                             add or update
  edit <n> | delete <n>                              act on card n
  type <text>                                        type into the search box
  search [text]                                      apply the search box
  filter <All|Applied|Interview|Offer|Rejected>      status filter
  refresh | help | quit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Set(Field, String),
    Status(Status),
    Submit,
    Edit(usize),
    Delete(usize),
    Type(String),
    Search(Option<String>),
    Filter(StatusFilter),
    Refresh,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let card = || {
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("expected a card number, got {:?}", rest))
        };
        match word {
            "title" => Ok(Command::Set(Field::Title, rest.to_string())),
            "company" => Ok(Command::Set(Field::Company, rest.to_string())),
            "location" => Ok(Command::Set(Field::Location, rest.to_string())),
            "status" => rest.parse().map(Command::Status),
            "submit" => Ok(Command::Submit),
            "edit" => card().map(Command::Edit),
            "delete" => card().map(Command::Delete),
            "type" => Ok(Command::Type(rest.to_string())),
            "search" if rest.is_empty() => Ok(Command::Search(None)),
            "search" => Ok(Command::Search(Some(rest.to_string()))),
            "filter" => rest.parse().map(Command::Filter),
            "refresh" => Ok(Command::Refresh),
            "help" | "" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command {:?}", other)),
        }
    }
}

/// Applies one command. Card numbers are resolved against what is on screen.
pub async fn apply<A: JobApi>(tracker: &mut Tracker<A>, command: Command) {
    let position = |tracker: &Tracker<A>, number: usize| Board::new(tracker).position_of(number);
    match command {
        Command::Set(field, value) => tracker.set_field(field, value),
        Command::Status(status) => tracker.set_status(status),
        Command::Submit => tracker.submit().await,
        Command::Edit(number) => match position(tracker, number) {
            Some(index) => {
                tracker.edit(index);
            }
            None => tracing::warn!("no card {}", number),
        },
        Command::Delete(number) => match position(tracker, number) {
            Some(index) => tracker.delete(index).await,
            None => tracing::warn!("no card {}", number),
        },
        Command::Type(text) => tracker.type_search(text),
        Command::Search(text) => {
            if let Some(text) = text {
                tracker.type_search(text);
            }
            tracker.commit_search();
        }
        Command::Filter(filter) => tracker.set_status_filter(filter),
        Command::Refresh => tracker.hydrate().await,
        Command::Help | Command::Quit => {}
    }
}

pub async fn run(api_url: Option<String>) -> Result<()> {
    let api_url = api_url.unwrap_or_else(|| settings.api_url.clone());
    tracing::info!("using jobs api at {}", api_url);
    let mut tracker = Tracker::new(HttpJobApi::new(&api_url)?);
    tracker.hydrate().await;
    println!("{}", Board::new(&tracker).draw()?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(command) => {
                apply(&mut tracker, command).await;
                println!("{}", Board::new(&tracker).draw()?);
            }
            Err(message) => println!("{}\n{}", message, HELP),
        }
    }
    Ok(())
}
