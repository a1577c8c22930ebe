//! Interactive Pokedex command loop
//!
//! Reads commands from stdin, dispatches them against the PokeAPI client, and
//! prints results. Pagination state for the `map`/`mapb` commands and the
//! session Pokedex live here.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::pokedex::Pokedex;

/// Command names and descriptions shown by `help`
const COMMANDS: &[(&str, &str)] = &[
    ("help", "Displays a help message"),
    ("exit", "Exit the Pokedex"),
    ("map", "Displays the names of the next 20 location areas"),
    ("mapb", "Displays the names of the previous 20 location areas"),
    ("explore <area>", "Lists the Pokemon found in a location area"),
    ("catch <pokemon>", "Throws a Pokeball at a Pokemon"),
    ("inspect <pokemon>", "Shows details of a caught Pokemon"),
    ("pokedex", "Lists all the Pokemon you have caught"),
];

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Exit,
}

/// Which way `map`/`mapb` pages through the listing
#[derive(Debug, Clone, Copy)]
enum PageDirection {
    Forward,
    Backward,
}

/// Pagination links carried between `map`/`mapb` invocations
#[derive(Debug)]
struct PageState {
    next: Option<String>,
    previous: Option<String>,
}

/// The interactive Pokedex session
pub struct Repl {
    api: ApiClient,
    pokedex: Pokedex,
    page: PageState,
}

/// Splits user input into lowercased words, dropping empty fragments.
pub fn clean_input(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect()
}

impl Repl {
    /// Creates a REPL session around an API client.
    ///
    /// The `map` command starts at the first page of the location-area
    /// listing; `mapb` before any `map` reports being on the first page.
    pub fn new(api: ApiClient) -> Self {
        let first_page = api.location_areas_url();
        Self {
            api,
            pokedex: Pokedex::new(),
            page: PageState {
                next: Some(first_page),
                previous: None,
            },
        }
    }

    /// Runs the read-dispatch-print loop until `exit` or end of input.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        prompt()?;
        while let Some(line) = lines.next_line().await? {
            if self.execute(&line).await == ReplAction::Exit {
                break;
            }
            prompt()?;
        }

        self.api.shutdown().await;
        Ok(())
    }

    /// Parses and runs a single input line.
    ///
    /// Command failures are printed and the loop continues; only `exit` (or
    /// end of input) ends the session.
    pub async fn execute(&mut self, line: &str) -> ReplAction {
        let words = clean_input(line);
        let Some((command, args)) = words.split_first() else {
            return ReplAction::Continue;
        };
        debug!(command = %command, "dispatching");

        let result = match command.as_str() {
            "help" => {
                self.command_help();
                Ok(())
            }
            "exit" => {
                println!("Closing the Pokedex... Goodbye!");
                return ReplAction::Exit;
            }
            "map" => self.command_map(PageDirection::Forward).await,
            "mapb" => self.command_map(PageDirection::Backward).await,
            "explore" => self.command_explore(args).await,
            "catch" => self.command_catch(args).await,
            "inspect" => {
                self.command_inspect(args);
                Ok(())
            }
            "pokedex" => {
                self.command_pokedex();
                Ok(())
            }
            _ => {
                println!("Invalid command. Please try again.");
                return ReplAction::Continue;
            }
        };

        if let Err(err) = result {
            println!("Error while executing {} command: {}", command, err);
        }
        ReplAction::Continue
    }

    fn command_help(&self) {
        println!("Welcome to the Pokedex!");
        println!("Usage:");
        println!();
        for (name, description) in COMMANDS {
            println!("{}: {}", name, description);
        }
    }

    /// Pages through the location-area listing and prints "{id}. {name}"
    /// for each area on the page.
    async fn command_map(&mut self, direction: PageDirection) -> Result<(), ApiError> {
        let url = match direction {
            PageDirection::Forward => self.page.next.clone(),
            PageDirection::Backward => self.page.previous.clone(),
        };
        let Some(url) = url else {
            match direction {
                PageDirection::Forward => println!("you're on the last page"),
                PageDirection::Backward => println!("you're on the first page"),
            }
            return Ok(());
        };

        let page = self.api.location_areas_page(&url).await?;
        self.page.next = page.next;
        self.page.previous = page.previous;

        for area in &page.results {
            println!("{}. {}", area.id().unwrap_or("?"), area.name);
        }
        Ok(())
    }

    async fn command_explore(&self, args: &[String]) -> Result<(), ApiError> {
        let Some(name) = args.first() else {
            println!("usage: explore <area>");
            return Ok(());
        };

        println!("Exploring {}...", name);
        let area = self.api.location_area(name).await?;

        println!("Found Pokemon:");
        for encounter in &area.pokemon_encounters {
            println!(" - {}", encounter.pokemon.name);
        }
        Ok(())
    }

    async fn command_catch(&mut self, args: &[String]) -> Result<(), ApiError> {
        let Some(name) = args.first() else {
            println!("usage: catch <pokemon>");
            return Ok(());
        };

        println!("Throwing a Pokeball at {}...", name);
        let pokemon = self.api.pokemon(name).await?;

        let mut rng = rand::thread_rng();
        if self.pokedex.attempt_catch(&mut rng, &pokemon) {
            println!("{} was caught!", pokemon.name);
            println!("You may now inspect it with the inspect command.");
        } else {
            println!("{} escaped!", pokemon.name);
        }
        Ok(())
    }

    fn command_inspect(&self, args: &[String]) {
        let Some(name) = args.first() else {
            println!("usage: inspect <pokemon>");
            return;
        };
        let Some(caught) = self.pokedex.get(name) else {
            println!("you have not caught that pokemon");
            return;
        };

        let pokemon = &caught.pokemon;
        println!("Name: {}", pokemon.name);
        println!("Height: {}", pokemon.height);
        println!("Weight: {}", pokemon.weight);
        println!("Stats:");
        for stat in &pokemon.stats {
            println!("  -{}: {}", stat.stat.name, stat.base_stat);
        }
        println!("Types:");
        for slot in &pokemon.types {
            println!("  - {}", slot.kind.name);
        }
    }

    fn command_pokedex(&self) {
        if self.pokedex.is_empty() {
            println!("Your Pokedex is empty. Go catch some Pokemon!");
            return;
        }
        println!("Your Pokedex:");
        for name in self.pokedex.names() {
            println!(" - {}", name);
        }
    }
}

/// Prints the input prompt without a trailing newline.
fn prompt() -> std::io::Result<()> {
    print!("Pokedex > ");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_repl() -> Repl {
        Repl::new(ApiClient::with_base_url(
            "http://127.0.0.1:9",
            Duration::from_secs(60),
        ))
    }

    #[test]
    fn test_clean_input_trims_and_splits() {
        let cases: &[(&str, &[&str])] = &[
            ("  hello world  ", &["hello", "world"]),
            ("hello world", &["hello", "world"]),
            ("hello  world", &["hello", "world"]),
            ("hello  WORLd ", &["hello", "world"]),
            ("", &[]),
            ("   ", &[]),
        ];

        for (input, expected) in cases {
            let actual = clean_input(input);
            assert_eq!(&actual, expected, "input: {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_empty_line_continues() {
        let mut repl = test_repl();
        assert_eq!(repl.execute("   ").await, ReplAction::Continue);
    }

    #[tokio::test]
    async fn test_exit_ends_loop() {
        let mut repl = test_repl();
        assert_eq!(repl.execute("exit").await, ReplAction::Exit);
    }

    #[tokio::test]
    async fn test_unknown_command_continues() {
        let mut repl = test_repl();
        assert_eq!(repl.execute("blorp").await, ReplAction::Continue);
    }

    #[tokio::test]
    async fn test_command_is_case_insensitive() {
        let mut repl = test_repl();
        assert_eq!(repl.execute("  EXIT  ").await, ReplAction::Exit);
    }

    #[tokio::test]
    async fn test_mapb_on_first_page_does_not_fetch() {
        // previous is None at start, so this must short-circuit without
        // touching the (unroutable) API endpoint.
        let mut repl = test_repl();
        assert_eq!(repl.execute("mapb").await, ReplAction::Continue);
        assert!(repl.page.previous.is_none());
    }

    #[test]
    fn test_help_table_covers_all_commands() {
        for name in ["help", "exit", "map", "mapb", "explore", "catch", "inspect", "pokedex"] {
            assert!(
                COMMANDS.iter().any(|(cmd, _)| cmd.starts_with(name)),
                "missing help entry for {}",
                name
            );
        }
    }
}
