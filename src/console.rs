//! Interactive console front-end (`coachline chat`)
//!
//! Plays the presentation layer for the engine: reads lines, maps slash
//! commands to engine actions, prints new turns and keeps the pin board
//! panel in sync with pin-store events.

use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use tokio::sync::broadcast::error::TryRecvError;

use crate::Error;
use crate::engine::{ContextEngine, ExportOutcome};
use crate::pins::{BoardPanel, PinCategory, PinEvent, PinOutcome};
use crate::profile::{ActivityLevel, Goal, ProfileForm};
use crate::transcript::{Role, Turn, TurnState};

const HELP: &str = "\
Commands:
  /pin <n> [preference|medical|goal]  pin answer number n
  /unpin <id>                         remove a pin
  /pins                               list pinned items
  /board                              show or hide the pin board
  /templates                          list quick-start templates
  /profile                            edit your profile
  /use <n>                            send quick-start template n
  /reset                              clear the chat (pins are kept)
  /export                             save the pin board as plain text
  /help                               show this help
  /quit                               leave";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Plain text to send
    Message(String),
    Pin {
        turn: usize,
        category: Option<PinCategory>,
    },
    Unpin(String),
    Pins,
    Board,
    Templates,
    Profile,
    UseTemplate(usize),
    Reset,
    Export,
    Help,
    Quit,
    /// Unrecognised or malformed command, with a hint
    Invalid(String),
}

/// Parse one input line
#[must_use]
pub fn parse_command(line: &str) -> ConsoleCommand {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ConsoleCommand::Message(line.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    match (name.as_str(), args.as_slice()) {
        ("pin", [n]) => parse_index(n).map_or_else(invalid_index, |turn| ConsoleCommand::Pin {
            turn,
            category: None,
        }),
        ("pin", [n, category]) => match (parse_index(n), category.parse::<PinCategory>()) {
            (Some(turn), Ok(category)) => ConsoleCommand::Pin {
                turn,
                category: Some(category),
            },
            (None, _) => invalid_index(),
            (_, Err(e)) => ConsoleCommand::Invalid(e.to_string()),
        },
        ("unpin", [id]) => ConsoleCommand::Unpin((*id).to_string()),
        ("pins", []) => ConsoleCommand::Pins,
        ("board", []) => ConsoleCommand::Board,
        ("templates", []) => ConsoleCommand::Templates,
        ("profile", []) => ConsoleCommand::Profile,
        ("use", [n]) => parse_index(n).map_or_else(invalid_index, ConsoleCommand::UseTemplate),
        ("reset" | "clear", []) => ConsoleCommand::Reset,
        ("export", []) => ConsoleCommand::Export,
        ("help" | "?", []) => ConsoleCommand::Help,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        _ => ConsoleCommand::Invalid(format!("unknown command: /{rest}, try /help")),
    }
}

/// 1-based index as typed by the user
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0)
}

fn invalid_index() -> ConsoleCommand {
    ConsoleCommand::Invalid("expected a number starting at 1".to_string())
}

/// Format a turn for display
#[must_use]
pub fn render_turn(number: usize, turn: &Turn, pinned: bool) -> String {
    let who = match turn.role {
        Role::User => "you",
        Role::Assistant => "coach",
    };
    let marker = if pinned { " [pinned]" } else { "" };
    format!("[{number}] {who}{marker}\n{}\n", turn.content)
}

/// Run the console until the user quits
///
/// # Errors
///
/// Returns error if terminal interaction fails
pub async fn run(mut engine: ContextEngine, export_dir: &Path) -> anyhow::Result<()> {
    let mut events = engine.subscribe_pins();
    let mut panel = BoardPanel::new(false);

    println!("coachline ({} coach). Type /help for commands.\n", engine.config().variant);

    if engine.config().profile_required && engine.profile().is_none() {
        println!("A profile is needed before we can chat.");
        edit_profile(&mut engine)?;
    }

    let mut shown = print_new_turns(&engine, 0);
    print_quick_starts(&engine);

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;

        match parse_command(&line) {
            ConsoleCommand::Message(text) => {
                engine.set_input(text);
                if !engine.can_send(engine.input()) {
                    if !engine.chat_enabled() {
                        println!("Set up your profile first (/profile).");
                    }
                    continue;
                }
                println!("...");
                if engine.submit_input().await == Some(TurnState::Failed) {
                    tracing::debug!("turn failed, error turn shown");
                }
            }
            ConsoleCommand::Pin { turn, category } => pin_turn(&mut engine, turn, category),
            ConsoleCommand::Unpin(id) => {
                let target = resolve_pin_id(&engine, &id);
                if !engine.unpin(&target) {
                    println!("No pin with id {id}.");
                }
            }
            ConsoleCommand::Pins => print_board(&engine),
            ConsoleCommand::Templates => {
                if engine.quick_starts().is_empty() {
                    println!("No templates on offer right now.");
                }
            }
            ConsoleCommand::Board => {
                panel.toggle();
                if panel.is_open() {
                    print_board(&engine);
                }
            }
            ConsoleCommand::Profile => edit_profile(&mut engine)?,
            ConsoleCommand::UseTemplate(n) => {
                if engine.send_template(n - 1).await.is_none() {
                    println!("No template {n} on offer.");
                }
            }
            ConsoleCommand::Reset => {
                let confirmed = Confirm::new()
                    .with_prompt("Start fresh? This clears the chat.")
                    .default(false)
                    .interact()?;
                if engine.reset(confirmed) {
                    shown = 0;
                }
            }
            ConsoleCommand::Export => match engine.export() {
                ExportOutcome::Empty(notice) => println!("{notice}"),
                ExportOutcome::Ready(artifact) => {
                    let path = artifact.save_in(export_dir)?;
                    println!("Saved {} ({}).", path.display(), artifact.mime_type);
                }
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => break,
            ConsoleCommand::Invalid(hint) => println!("{hint}"),
        }

        if drain_pin_events(&mut events, &mut panel) {
            print_board(&engine);
        }
        shown = print_new_turns(&engine, shown);
        print_quick_starts(&engine);
    }

    Ok(())
}

/// Apply pending pin events to the panel; true if the panel just opened
fn drain_pin_events(
    events: &mut tokio::sync::broadcast::Receiver<PinEvent>,
    panel: &mut BoardPanel,
) -> bool {
    let mut opened = false;
    loop {
        match events.try_recv() {
            Ok(event) => opened |= panel.apply(&event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "pin events lagged");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return opened,
        }
    }
}

fn pin_turn(engine: &mut ContextEngine, number: usize, category: Option<PinCategory>) {
    let Some(turn_id) = engine
        .transcript()
        .turns()
        .get(number - 1)
        .map(|t| t.id.clone())
    else {
        println!("There is no message {number}.");
        return;
    };

    match engine.pin(&turn_id, category) {
        Some(PinOutcome::Pinned(id)) => println!("Pinned as {id}."),
        Some(PinOutcome::Unpinned(id)) => println!("Unpinned {id}."),
        None => println!("Only coach answers can be pinned."),
    }
}

/// Accept either a pin id or its 1-based position on the board
fn resolve_pin_id(engine: &ContextEngine, raw: &str) -> String {
    parse_index(raw)
        .and_then(|n| engine.pins().items().get(n - 1))
        .filter(|_| !engine.pins().contains(raw))
        .map_or_else(|| raw.to_string(), |item| item.id.clone())
}

fn print_new_turns(engine: &ContextEngine, already_shown: usize) -> usize {
    let turns = engine.transcript().turns();
    for (i, turn) in turns.iter().enumerate().skip(already_shown) {
        println!("{}", render_turn(i + 1, turn, engine.pins().contains(&turn.id)));
    }
    turns.len()
}

fn print_quick_starts(engine: &ContextEngine) {
    let templates = engine.quick_starts();
    if templates.is_empty() {
        return;
    }
    println!("Quick start:");
    for (i, t) in templates.iter().enumerate() {
        println!("  /use {}  {} - {}", i + 1, t.title, t.subtitle);
    }
    println!();
}

fn print_board(engine: &ContextEngine) {
    let items = engine.pins().items();
    println!("-- Pin board ({} items) --", items.len());
    if items.is_empty() {
        println!("Nothing pinned yet. Use /pin <n> on a coach answer.");
    }
    for (i, item) in items.iter().enumerate() {
        let category = item.category.map(|c| format!(" [{c}]")).unwrap_or_default();
        println!("{}. {}{category}\n{}\n", i + 1, item.id, item.content);
    }
}

fn edit_profile(engine: &mut ContextEngine) -> anyhow::Result<()> {
    if !engine.uses_profile() {
        println!("This coach does not use a profile.");
        return Ok(());
    }

    loop {
        let form = prompt_profile_form()?;
        match engine.submit_profile_form(&form) {
            Ok(_) => return Ok(()),
            Err(Error::Profile(reason)) => println!("{reason}. Let's try again."),
            Err(e) => return Err(e.into()),
        }
    }
}

fn prompt_profile_form() -> anyhow::Result<ProfileForm> {
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let age: String = Input::new().with_prompt("Age").interact_text()?;
    let gender: String = Input::new().with_prompt("Gender").interact_text()?;
    let height_cm: String = Input::new().with_prompt("Height (cm)").interact_text()?;
    let weight_kg: String = Input::new().with_prompt("Weight (kg)").interact_text()?;

    let levels: Vec<String> = ActivityLevel::ALL.iter().map(ToString::to_string).collect();
    let level_idx = Select::new()
        .with_prompt("Activity level")
        .items(&levels)
        .default(2)
        .interact()?;

    let goals: Vec<String> = Goal::ALL.iter().map(ToString::to_string).collect();
    let goal_idx = Select::new()
        .with_prompt("Primary goal")
        .items(&goals)
        .default(0)
        .interact()?;

    let restrictions: String = Input::new()
        .with_prompt("Dietary restrictions (blank for none)")
        .allow_empty(true)
        .interact_text()?;

    Ok(ProfileForm {
        name,
        age,
        gender,
        height_cm,
        weight_kg,
        activity_level: levels[level_idx].clone(),
        goal: goals[goal_idx].clone(),
        restrictions: Some(restrictions),
    })
}
