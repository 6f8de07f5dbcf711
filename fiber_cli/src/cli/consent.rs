//! `consent`: view or record the cookie consent decision.

use anyhow::Result;
use clap::{Args, Subcommand};

use fiber_core::consent::{ConsentChoice, ConsentRecord, ConsentState};
use fiber_core::store::StateStore;

use super::{print_json, Context};

#[derive(Debug, Clone, Args)]
pub struct ConsentArgs {
    #[command(subcommand)]
    pub command: ConsentCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConsentCommand {
    /// Show the stored decision
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Grant analytics and ads
    Accept,
    /// Deny analytics and ads
    Reject,
    /// Record a custom decision
    Set {
        /// granted or denied
        #[arg(long)]
        analytics: ConsentChoice,
        /// granted or denied
        #[arg(long)]
        ads: ConsentChoice,
    },
    /// Forget the decision so the banner shows again
    Clear,
}

fn print_state(state: &ConsentState) {
    match &state.record {
        Some(record) => println!(
            "analytics: {}, ads: {} (decided {})",
            record.analytics,
            record.ads,
            record.timestamp.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("No decision recorded; the consent banner would be shown."),
    }
}

pub fn run(ctx: &Context, args: ConsentArgs) -> Result<()> {
    let store: StateStore<ConsentState, _> = StateStore::new(ctx.backend());
    let mut state = store.load();

    let record = match args.command {
        ConsentCommand::Show { json } => {
            if json {
                return print_json(&state);
            }
            print_state(&state);
            return Ok(());
        }
        ConsentCommand::Clear => {
            store.reset()?;
            println!("Consent cleared.");
            return Ok(());
        }
        ConsentCommand::Accept => ConsentRecord::accept_all(),
        ConsentCommand::Reject => ConsentRecord::reject_all(),
        ConsentCommand::Set { analytics, ads } => ConsentRecord::custom(analytics, ads),
    };

    state.decide(record);
    store.save(&state)?;
    print_state(&state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_persisted_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context {
            settings: Default::default(),
            data_dir: dir.path().to_path_buf(),
        };

        run(&ctx, ConsentArgs { command: ConsentCommand::Reject }).unwrap();
        assert!(dir.path().join("consent.json").exists());
        let state: ConsentState = StateStore::new(ctx.backend()).load();
        assert_eq!(state.record.unwrap().analytics, ConsentChoice::Denied);

        run(&ctx, ConsentArgs { command: ConsentCommand::Clear }).unwrap();
        assert!(StateStore::<ConsentState, _>::new(ctx.backend()).load().needs_prompt());
    }
}
