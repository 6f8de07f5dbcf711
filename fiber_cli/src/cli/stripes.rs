//! `stripes`: generate a stripe pattern.

use anyhow::Result;
use clap::Args;

use fiber_core::stripes::{generate_seeded, PaletteColor, StripeInput, StripeMode};
use fiber_core::units::{Dimension, UnitSystem};

use super::{print_json, Context};

#[derive(Debug, Clone, Args)]
pub struct StripesArgs {
    /// Total rows to fill
    #[arg(long)]
    pub total: u32,

    /// Palette color as NAME or NAME:WEIGHT (repeatable)
    #[arg(long, value_name = "NAME[:WEIGHT]", required = true, value_parser = parse_color)]
    pub color: Vec<PaletteColor>,

    /// Pick colors in proportion to their weights
    #[arg(long)]
    pub weighted: bool,

    /// Narrowest stripe in rows
    #[arg(long)]
    pub min: Option<u32>,

    /// Widest stripe in rows
    #[arg(long)]
    pub max: Option<u32>,

    /// Yarn used per row, in yards
    #[arg(long)]
    pub yards_per_row: Option<f64>,

    /// Seed for a reproducible pattern
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show yardage in meters
    #[arg(long)]
    pub metric: bool,

    #[arg(long)]
    pub json: bool,
}

/// clap value parser for palette colors
pub fn parse_color(raw: &str) -> Result<PaletteColor, String> {
    match raw.rsplit_once(':') {
        Some((name, weight)) => {
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|_| format!("invalid weight '{}' for color '{}'", weight, name))?;
            Ok(PaletteColor::weighted(name.trim(), weight))
        }
        None => Ok(PaletteColor::new(raw.trim())),
    }
}

impl StripesArgs {
    fn to_input(&self, ctx: &Context) -> StripeInput {
        let defaults = &ctx.settings.stripes;
        StripeInput {
            mode: if self.weighted { StripeMode::Weighted } else { StripeMode::Random },
            palette: self.color.clone(),
            total_rows: self.total,
            min_width: self.min.unwrap_or(defaults.min_width),
            max_width: self.max.unwrap_or(defaults.max_width),
            yards_per_row: self.yards_per_row.unwrap_or(defaults.yards_per_row),
        }
    }
}

pub fn run(ctx: &Context, args: StripesArgs) -> Result<()> {
    let input = args.to_input(ctx);
    let sequence = generate_seeded(&input, args.seed)?;

    if args.json {
        return print_json(&sequence);
    }

    let units = if args.metric { UnitSystem::Metric } else { ctx.settings.units };
    println!("{} stripes, {} rows ({})", sequence.segments.len(), sequence.total_rows, input.mode.display_name());
    for (i, segment) in sequence.segments.iter().enumerate() {
        println!("{:>4}. {:<16} {:>3} rows", i + 1, segment.color, segment.rows);
    }
    println!();
    println!("Yarn:");
    for color in &sequence.yardage {
        println!(
            "  {:<16} {:>4} rows  {}",
            color.color,
            color.rows,
            Dimension::Yardage.format(color.yards, units)
        );
    }
    println!("  {:<16} {:>4} rows  {}", "Total", sequence.total_rows, Dimension::Yardage.format(sequence.total_yards, units));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("Navy").unwrap(), PaletteColor::new("Navy"));
        assert_eq!(parse_color("Sea Green:2.5").unwrap(), PaletteColor::weighted("Sea Green", 2.5));
        assert!(parse_color("Red:lots").is_err());
    }

    #[test]
    fn test_settings_fill_missing_widths() {
        let mut settings = fiber_core::Settings::default();
        settings.stripes.min_width = 3;
        let ctx = Context {
            settings,
            data_dir: std::path::PathBuf::from("/tmp"),
        };
        let args = StripesArgs {
            total: 30,
            color: vec![PaletteColor::new("A"), PaletteColor::new("B")],
            weighted: false,
            min: None,
            max: Some(6),
            yards_per_row: None,
            seed: Some(1),
            metric: false,
            json: false,
        };
        let input = args.to_input(&ctx);
        assert_eq!(input.min_width, 3);
        assert_eq!(input.max_width, 6);
        assert!(generate_seeded(&input, args.seed).is_ok());
    }
}
