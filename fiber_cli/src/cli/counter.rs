//! `counter`: persistent stitch/row counters.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use fiber_core::counter::{Counter, CounterAction, CounterEvent, CounterOptions, CounterUpdate, PersistedBoard};
use fiber_core::errors::{FiberError, FiberResult};
use fiber_core::store::StorageBackend;

use super::{print_json, Context};

#[derive(Debug, Clone, Args)]
pub struct CounterArgs {
    #[command(subcommand)]
    pub command: CounterCommand,
}

/// Options for a new counter
#[derive(Debug, Clone, Args)]
pub struct OptionArgs {
    /// Amount added or removed per click
    #[arg(long, default_value_t = 1)]
    pub step: u32,

    /// Row count to aim for
    #[arg(long)]
    pub target: Option<u32>,

    /// Remind every N rows
    #[arg(long, value_name = "N")]
    pub remind_every: Option<u32>,
}

impl From<&OptionArgs> for CounterOptions {
    fn from(args: &OptionArgs) -> Self {
        CounterOptions {
            step: args.step,
            target: args.target,
            reminder_interval: args.remind_every,
        }
    }
}

/// Settings changed by `set`; flags left out keep their current value
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Amount added or removed per click
    #[arg(long)]
    pub step: Option<u32>,

    /// Row count to aim for
    #[arg(long, conflicts_with = "no_target")]
    pub target: Option<u32>,

    /// Remove the target
    #[arg(long)]
    pub no_target: bool,

    /// Remind every N rows
    #[arg(long, value_name = "N", conflicts_with = "no_reminder")]
    pub remind_every: Option<u32>,

    /// Turn the row reminder off
    #[arg(long)]
    pub no_reminder: bool,
}

impl From<&SetArgs> for CounterUpdate {
    fn from(args: &SetArgs) -> Self {
        CounterUpdate {
            step: args.step,
            target: if args.no_target { Some(None) } else { args.target.map(Some) },
            reminder_interval: if args.no_reminder {
                Some(None)
            } else {
                args.remind_every.map(Some)
            },
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum CounterCommand {
    /// List all counters
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a counter
    Add {
        label: String,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Change a counter's step, target or reminder
    Set {
        /// Counter label, id, or id prefix
        counter: String,
        #[command(flatten)]
        options: SetArgs,
    },
    /// Count up by the counter's step
    Inc { counter: String },
    /// Count down by the counter's step (never below zero)
    Dec { counter: String },
    /// Set the count back to zero
    Reset { counter: String },
    Undo { counter: String },
    Redo { counter: String },
    /// Delete a counter and its history
    Delete { counter: String },
    /// Show one counter
    Show {
        counter: String,
        #[arg(long)]
        json: bool,
    },
}

fn describe(counter: &Counter) -> String {
    let mut text = format!("{}: {}", counter.label, counter.count());
    if let Some(target) = counter.target {
        text.push_str(&format!(" / {}", target));
    }
    if counter.step() > 1 {
        text.push_str(&format!("  (step {})", counter.step()));
    }
    if let Some(every) = counter.reminder_interval() {
        text.push_str(&format!("  (remind every {})", every));
    }
    text
}

fn report(label: &str, event: &CounterEvent) {
    if !event.applied {
        println!("{}: nothing to {}", label, event.action);
        return;
    }
    println!("{}: {} -> {}", label, event.previous, event.count);
    if event.reminder {
        println!("  reminder: row {}", event.count);
    }
    if event.target_reached {
        println!("  target reached");
    }
}

/// Write failures get a note that the change was lost; lookup errors pass
/// through as they are.
fn saved<T>(result: FiberResult<T>) -> Result<T> {
    result.map_err(|e| match e {
        FiberError::FileError { .. } | FiberError::SerializationError { .. } => {
            anyhow::Error::new(e).context("Counter change was not saved")
        }
        other => other.into(),
    })
}

fn apply<B: StorageBackend>(board: &mut PersistedBoard<B>, selector: &str, action: CounterAction) -> Result<()> {
    let event = saved(board.apply(selector, action))?;
    let label = board.board().find(selector)?.label.clone();
    report(&label, &event);
    Ok(())
}

pub fn run(ctx: &Context, args: CounterArgs) -> Result<()> {
    let mut board = PersistedBoard::open(ctx.backend(), ctx.settings.history_capacity);

    match args.command {
        CounterCommand::List { json } => {
            let counters = board.board().counters();
            if json {
                return print_json(counters);
            }
            if counters.is_empty() {
                println!("No counters yet. Add one with `fibertools counter add <label>`.");
            }
            for counter in counters {
                let id = counter.id.to_string();
                println!("{}  {}", &id[..8], describe(counter));
            }
        }
        CounterCommand::Add { label, options } => {
            let counter = saved(board.add(label, CounterOptions::from(&options)))?;
            println!("Added {} ({})", counter.label, counter.id);
        }
        CounterCommand::Set { counter, options } => {
            let update = CounterUpdate::from(&options);
            if update.is_empty() {
                bail!("Nothing to change; pass --step, --target, --remind-every, --no-target or --no-reminder");
            }
            let updated = saved(board.configure(&counter, update))?;
            println!("{}", describe(&updated));
        }
        CounterCommand::Inc { counter } => apply(&mut board, &counter, CounterAction::Increment)?,
        CounterCommand::Dec { counter } => apply(&mut board, &counter, CounterAction::Decrement)?,
        CounterCommand::Reset { counter } => apply(&mut board, &counter, CounterAction::Reset)?,
        CounterCommand::Undo { counter } => apply(&mut board, &counter, CounterAction::Undo)?,
        CounterCommand::Redo { counter } => apply(&mut board, &counter, CounterAction::Redo)?,
        CounterCommand::Delete { counter } => {
            let removed = saved(board.remove(&counter))?;
            println!("Deleted {}", removed.label);
        }
        CounterCommand::Show { counter, json } => {
            let counter = board.board().find(&counter)?;
            if json {
                return print_json(counter);
            }
            println!("{}", describe(counter));
            println!("  id:      {}", counter.id);
            println!("  created: {}", counter.created.format("%Y-%m-%d %H:%M"));
            println!(
                "  undo:    {} step(s), redo: {} step(s)",
                counter.history().undo_depth(),
                counter.history().redo_depth()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiber_core::store::MemoryBackend;

    #[test]
    fn test_describe() {
        let mut board = PersistedBoard::open(MemoryBackend::new(), 10);
        let counter = board.add(
            "Yoke",
            CounterOptions {
                step: 2,
                target: Some(40),
                reminder_interval: Some(6),
            },
        )
        .unwrap();
        assert_eq!(describe(&counter), "Yoke: 0 / 40  (step 2)  (remind every 6)");
    }

    #[test]
    fn test_counts_survive_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            settings: Default::default(),
            data_dir: dir.path().to_path_buf(),
        };
        let command = |command| CounterArgs { command };
        let options = OptionArgs {
            step: 1,
            target: None,
            remind_every: None,
        };

        run(&ctx, command(CounterCommand::Add { label: "Sleeve".into(), options })).unwrap();
        run(&ctx, command(CounterCommand::Inc { counter: "sleeve".into() })).unwrap();
        run(&ctx, command(CounterCommand::Inc { counter: "sleeve".into() })).unwrap();
        run(&ctx, command(CounterCommand::Undo { counter: "sleeve".into() })).unwrap();

        let board = PersistedBoard::open(ctx.backend(), 10);
        let counter = board.board().find("Sleeve").unwrap();
        assert_eq!(counter.count(), 1);
        assert!(counter.history().can_redo());
    }

    #[test]
    fn test_apply_unknown_counter() {
        let mut board = PersistedBoard::open(MemoryBackend::new(), 10);
        let err = apply(&mut board, "ghost", CounterAction::Increment).unwrap_err();
        assert!(!err.to_string().contains("not saved"));
    }

    #[test]
    fn test_set_changes_only_given_flags() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            settings: Default::default(),
            data_dir: dir.path().to_path_buf(),
        };
        let command = |command| CounterArgs { command };
        let add = OptionArgs {
            step: 2,
            target: None,
            remind_every: Some(6),
        };
        let set = SetArgs {
            step: None,
            target: Some(40),
            no_target: false,
            remind_every: None,
            no_reminder: false,
        };

        run(&ctx, command(CounterCommand::Add { label: "Yoke".into(), options: add })).unwrap();
        run(&ctx, command(CounterCommand::Set { counter: "Yoke".into(), options: set })).unwrap();

        let board = PersistedBoard::open(ctx.backend(), 10);
        let counter = board.board().find("Yoke").unwrap();
        assert_eq!(counter.step(), 2);
        assert_eq!(counter.reminder_interval(), Some(6));
        assert_eq!(counter.target, Some(40));
    }

    #[test]
    fn test_set_clear_flags() {
        let args = SetArgs {
            step: None,
            target: None,
            no_target: true,
            remind_every: None,
            no_reminder: true,
        };
        let update = CounterUpdate::from(&args);
        assert_eq!(update.step, None);
        assert_eq!(update.target, Some(None));
        assert_eq!(update.reminder_interval, Some(None));
        assert!(CounterUpdate::from(&SetArgs {
            no_target: false,
            no_reminder: false,
            ..args
        })
        .is_empty());
    }

    #[test]
    fn test_unwritable_data_dir_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let ctx = Context {
            settings: Default::default(),
            data_dir: file.path().to_path_buf(),
        };
        let options = OptionArgs {
            step: 1,
            target: None,
            remind_every: None,
        };
        let result = run(&ctx, CounterArgs { command: CounterCommand::Add { label: "Sleeve".into(), options } });
        assert!(result.unwrap_err().to_string().contains("not saved"));
        assert!(PersistedBoard::open(ctx.backend(), 10).board().is_empty());
    }
}
