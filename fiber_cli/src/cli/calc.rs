//! `calc` and `fields`: drive a calculator session from the command line.

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;

use fiber_core::input::EditOutcome;
use fiber_core::session::{open_session, Session, SessionMessage};
use fiber_core::tools;
use fiber_core::units::UnitSystem;

use super::{parse_assignment, print_json, Assignment, Context};

#[derive(Debug, Clone, Args)]
pub struct CalcArgs {
    /// Calculator slug (see `fibertools tools`)
    pub slug: String,

    /// Numeric input, in the display unit system (repeatable)
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Enumerated input (repeatable); applied before numeric inputs
    #[arg(long, value_name = "FIELD=OPTION", value_parser = parse_assignment)]
    pub choose: Vec<Assignment>,

    /// Show and enter values in metric units
    #[arg(long, conflicts_with = "imperial")]
    pub metric: bool,

    /// Show and enter values in imperial units
    #[arg(long)]
    pub imperial: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FieldsArgs {
    pub slug: String,

    #[arg(long)]
    pub metric: bool,

    #[arg(long)]
    pub json: bool,
}

fn units_for(ctx: &Context, metric: bool, imperial: bool) -> UnitSystem {
    if metric {
        UnitSystem::Metric
    } else if imperial {
        UnitSystem::Imperial
    } else {
        ctx.settings.units
    }
}

#[derive(Debug, Serialize)]
struct EditReport {
    field: String,
    value: String,
    #[serde(flatten)]
    outcome: EditOutcome,
}

#[derive(Debug, Serialize)]
struct CalcReport {
    slug: &'static str,
    units: UnitSystem,
    edits: Vec<EditReport>,
    input: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Apply edits in order: choices first, then numbers.
fn apply_edits(session: &mut dyn Session, args: &CalcArgs) -> Vec<EditReport> {
    let choices = args
        .choose
        .iter()
        .map(|a| (a, SessionMessage::set_choice(&a.field, &a.value)));
    let numbers = args
        .set
        .iter()
        .map(|a| (a, SessionMessage::set_number(&a.field, &a.value)));

    choices
        .chain(numbers)
        .map(|(assignment, message)| EditReport {
            field: assignment.field.clone(),
            value: assignment.value.clone(),
            outcome: session.handle(message),
        })
        .collect()
}

fn warn_edit(edit: &EditReport, session: &dyn Session) {
    match &edit.outcome {
        EditOutcome::Accepted => {}
        EditOutcome::Clamped { .. } => {
            let shown = session
                .display_value(&edit.field)
                .map(|v| format!("{}", v))
                .unwrap_or_default();
            eprintln!("warning: {}={} is out of range, using {}", edit.field, edit.value, shown);
        }
        EditOutcome::Rejected { reason } => {
            eprintln!("warning: ignored {}={}: {}", edit.field, edit.value, reason);
        }
    }
}

pub fn run(ctx: &Context, args: CalcArgs) -> Result<()> {
    let units = units_for(ctx, args.metric, args.imperial);
    let mut session = open_session(&args.slug, units).context("Cannot open calculator")?;
    let edits = apply_edits(session.as_mut(), &args);

    if args.json {
        let (result, error) = match session.result_json() {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e.to_string())),
        };
        return print_json(&CalcReport {
            slug: session.slug(),
            units,
            edits,
            input: session.input_json()?,
            result,
            error,
        });
    }

    for edit in &edits {
        warn_edit(edit, session.as_ref());
    }

    let name = tools::find(session.slug()).map(|t| t.name).unwrap_or(session.slug());
    println!("{} [{}]", name, units);
    match session.lines() {
        Ok(lines) => {
            let width = lines.iter().map(|l| l.label.len()).max().unwrap_or(0);
            for line in lines {
                println!("  {:width$}  {}", line.label, line.value, width = width);
            }
        }
        Err(message) => println!("  (no result) {}", message),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct FieldInfo {
    name: &'static str,
    label: &'static str,
    unit: &'static str,
    min: f64,
    max: f64,
    integer: bool,
    value: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChoiceInfo {
    name: &'static str,
    label: &'static str,
    value: Option<String>,
    options: Vec<String>,
}

pub fn run_fields(ctx: &Context, args: FieldsArgs) -> Result<()> {
    let units = units_for(ctx, args.metric, false);
    let session = open_session(&args.slug, units).context("Cannot open calculator")?;

    let fields: Vec<FieldInfo> = session
        .fields()
        .iter()
        .map(|spec| FieldInfo {
            name: spec.name,
            label: spec.label,
            unit: spec.dimension.unit_label(units),
            min: spec.dimension.to_display(spec.min, units),
            max: spec.dimension.to_display(spec.max, units),
            integer: spec.integer,
            value: session.display_value(spec.name),
        })
        .collect();
    let choices: Vec<ChoiceInfo> = session
        .choices()
        .iter()
        .map(|spec| ChoiceInfo {
            name: spec.name,
            label: spec.label,
            value: session.choice_value(spec.name),
            options: session.choice_options(spec.name),
        })
        .collect();

    if args.json {
        return print_json(&serde_json::json!({ "fields": fields, "choices": choices }));
    }

    for f in &fields {
        let kind = if f.integer { "whole" } else { "number" };
        println!(
            "{:<24} {:<28} {} {}..{} {}  (now {})",
            f.name,
            f.label,
            kind,
            f.min,
            f.max,
            f.unit,
            f.value.map(|v| v.to_string()).unwrap_or_default()
        );
    }
    for c in &choices {
        println!(
            "{:<24} {:<28} one of: {}  (now {})",
            c.name,
            c.label,
            c.options.join(", "),
            c.value.clone().unwrap_or_default()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(choose: &[&str], set: &[&str]) -> CalcArgs {
        CalcArgs {
            slug: "needle-size-converter".to_string(),
            set: set.iter().map(|s| parse_assignment(s).unwrap()).collect(),
            choose: choose.iter().map(|s| parse_assignment(s).unwrap()).collect(),
            metric: false,
            imperial: false,
            json: false,
        }
    }

    #[test]
    fn test_choices_applied_before_numbers() {
        let mut session = open_session("needle-size-converter", UnitSystem::Imperial).unwrap();
        let edits = apply_edits(session.as_mut(), &args(&["kind=crochet", "system=us", "size=H-8"], &["x=1"]));
        assert_eq!(edits.len(), 4);
        assert_eq!(edits[0].outcome, EditOutcome::Accepted);
        assert_eq!(edits[2].outcome, EditOutcome::Accepted);
        assert!(matches!(edits[3].outcome, EditOutcome::Rejected { .. }));
        assert_eq!(session.choice_value("size").as_deref(), Some("H-8"));
    }

    #[test]
    fn test_edit_report_json() {
        let report = EditReport {
            field: "width_in".to_string(),
            value: "900".to_string(),
            outcome: EditOutcome::Clamped {
                requested: 900.0,
                applied: 120.0,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "clamped");
        assert_eq!(json["applied"], 120.0);
    }
}
