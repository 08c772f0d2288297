//! Line-oriented operator console.
//!
//! Each input line is parsed into a [`ConsoleCommand`] and forwarded to the
//! runtime. World commands act on the in-memory world the runtime owns.

use std::str::FromStr;

use anyhow::Result;
use hunter_core::{
    AbilityId, Activation, EntityId, Location, SelectionOutcome, Teardown, WorldId,
};
use hunter_runtime::RuntimeHandle;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  spawn <id> <x> <y> <z> [world]   place an actor in the world
  move <id> <x> <y> <z> [world]    move an actor
  online <id> <on|off>             connect or disconnect an actor
  hunter add|remove <id>           register or remove a hunter
  hunter clear                     remove every hunter
  runner <id>|none                 designate the runner
  start                            start a fresh run
  select <id> <ability>            click an ability in the selection surface
  confirm <id>                     confirm the pending selection
  close <id>                       close the selection surface
  use <id> <ability>               trigger an ability directly
  state <id>                       show ability status
  help | quit";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid {what}: `{value}`")]
    Invalid { what: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleCommand {
    Spawn { actor: EntityId, at: Location },
    Move { actor: EntityId, to: Location },
    SetOnline { actor: EntityId, online: bool },
    AddHunter(EntityId),
    RemoveHunter(EntityId),
    ClearHunters,
    SetRunner(Option<EntityId>),
    StartRun,
    Select { actor: EntityId, ability: AbilityId },
    Confirm(EntityId),
    Close(EntityId),
    Use { actor: EntityId, ability: AbilityId },
    State(EntityId),
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = line.split_whitespace();
        let command = args.next().ok_or(ParseError::Empty)?;

        let parsed = match command {
            "spawn" => ConsoleCommand::Spawn {
                actor: entity(&mut args)?,
                at: location(&mut args)?,
            },
            "move" => ConsoleCommand::Move {
                actor: entity(&mut args)?,
                to: location(&mut args)?,
            },
            "online" => {
                let actor = entity(&mut args)?;
                let online = match args.next().ok_or(ParseError::MissingArgument("on|off"))? {
                    "on" => true,
                    "off" => false,
                    other => return Err(invalid("on|off", other)),
                };
                ConsoleCommand::SetOnline { actor, online }
            }
            "hunter" => match args.next().ok_or(ParseError::MissingArgument("add|remove|clear"))? {
                "add" => ConsoleCommand::AddHunter(entity(&mut args)?),
                "remove" => ConsoleCommand::RemoveHunter(entity(&mut args)?),
                "clear" => ConsoleCommand::ClearHunters,
                other => return Err(invalid("hunter subcommand", other)),
            },
            "runner" => match args.next().ok_or(ParseError::MissingArgument("runner"))? {
                "none" => ConsoleCommand::SetRunner(None),
                id => ConsoleCommand::SetRunner(Some(parse_entity(id)?)),
            },
            "start" => ConsoleCommand::StartRun,
            "select" => ConsoleCommand::Select {
                actor: entity(&mut args)?,
                ability: ability(&mut args)?,
            },
            "confirm" => ConsoleCommand::Confirm(entity(&mut args)?),
            "close" => ConsoleCommand::Close(entity(&mut args)?),
            "use" => ConsoleCommand::Use {
                actor: entity(&mut args)?,
                ability: ability(&mut args)?,
            },
            "state" => ConsoleCommand::State(entity(&mut args)?),
            "help" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_owned())),
        };
        Ok(parsed)
    }
}

fn invalid(what: &'static str, value: &str) -> ParseError {
    ParseError::Invalid {
        what,
        value: value.to_owned(),
    }
}

fn parse_entity(value: &str) -> Result<EntityId, ParseError> {
    value
        .trim_start_matches('#')
        .parse()
        .map(EntityId)
        .map_err(|_| invalid("actor id", value))
}

fn entity<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<EntityId, ParseError> {
    parse_entity(args.next().ok_or(ParseError::MissingArgument("actor id"))?)
}

fn ability<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<AbilityId, ParseError> {
    let value = args.next().ok_or(ParseError::MissingArgument("ability"))?;
    value.parse().map_err(|_| invalid("ability", value))
}

fn coordinate<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<f64, ParseError> {
    let value = args.next().ok_or(ParseError::MissingArgument(name))?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid(name, value))
}

fn location<'a>(args: &mut impl Iterator<Item = &'a str>) -> Result<Location, ParseError> {
    let x = coordinate(args, "x")?;
    let y = coordinate(args, "y")?;
    let z = coordinate(args, "z")?;
    let world = match args.next() {
        Some(value) => WorldId(value.parse().map_err(|_| invalid("world", value))?),
        None => WorldId::OVERWORLD,
    };
    Ok(Location::new(world, x, y, z))
}

/// Whether the console loop should keep reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Executes one command, printing its outcome.
pub async fn execute(handle: &RuntimeHandle, command: ConsoleCommand) -> Result<Flow> {
    match command {
        ConsoleCommand::Spawn { actor, at } => {
            handle
                .with_world(move |world| {
                    world.spawn(actor, at);
                })
                .await?;
            println!("spawned {actor} at {at}");
        }
        ConsoleCommand::Move { actor, to } => {
            let moved = handle.with_world(move |world| world.move_to(actor, to)).await?;
            if moved {
                println!("moved {actor} to {to}");
            } else {
                println!("no such actor {actor}");
            }
        }
        ConsoleCommand::SetOnline { actor, online } => {
            handle
                .with_world(move |world| world.set_online(actor, online))
                .await?;
            println!("{actor} is now {}", if online { "online" } else { "offline" });
        }
        ConsoleCommand::AddHunter(actor) => {
            if handle.register_hunter(actor).await? {
                println!("{actor} is now a hunter");
            } else {
                println!("{actor} already is a hunter");
            }
        }
        ConsoleCommand::RemoveHunter(actor) => match handle.remove_hunter(actor).await? {
            Some(teardown) => print_teardown(&teardown),
            None => println!("{actor} is not a hunter"),
        },
        ConsoleCommand::ClearHunters => {
            let teardowns = handle.clear_all_hunters().await?;
            teardowns.iter().for_each(print_teardown);
            println!("cleared {} hunter(s)", teardowns.len());
        }
        ConsoleCommand::SetRunner(runner) => {
            handle.set_runner(runner).await?;
            match runner {
                Some(runner) => println!("runner is {runner}"),
                None => println!("no runner"),
            }
        }
        ConsoleCommand::StartRun => {
            let at = handle.start_run().await?;
            println!("run started at {}ms", at.as_millis());
        }
        ConsoleCommand::Select { actor, ability } => {
            report(handle.select_ability(actor, ability).await.map(|outcome| match outcome {
                SelectionOutcome::Pending(ability) => {
                    println!("{actor} selected {}", ability.label());
                }
                SelectionOutcome::Triggered(activation) => print_activation(&activation),
            }))?;
        }
        ConsoleCommand::Confirm(actor) => {
            report(handle.confirm_selection(actor).await.map(|activation| {
                match activation {
                    Some(activation) => print_activation(&activation),
                    None => println!("{actor} has nothing selected"),
                }
            }))?;
        }
        ConsoleCommand::Close(actor) => {
            report(handle.close_selection(actor).await.map(|activation| {
                if let Some(activation) = activation {
                    print_activation(&activation);
                }
            }))?;
        }
        ConsoleCommand::Use { actor, ability } => {
            report(
                handle
                    .trigger(actor, ability)
                    .await
                    .map(|activation| print_activation(&activation)),
            )?;
        }
        ConsoleCommand::State(actor) => {
            for line in handle.render_state(actor).await? {
                println!("  {:<18} {}", line.label, line.status);
                for lore in line.lore {
                    println!("      {lore}");
                }
            }
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Prints engine rejections; passes infrastructure failures through.
fn report(result: hunter_runtime::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.as_ability().is_some() => {
            println!("rejected ({}): {err}", err.severity().as_str());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_activation(activation: &Activation) {
    print!("{} used {}", activation.actor, activation.ability.label());
    if let Some(done) = activation.completes_at {
        print!(" (completes at {}ms)", done.as_millis());
    }
    println!(": {:?}", activation.report);
}

fn print_teardown(teardown: &Teardown) {
    println!(
        "{} removed, reverted {:?}",
        teardown.actor, teardown.reverted
    );
}
