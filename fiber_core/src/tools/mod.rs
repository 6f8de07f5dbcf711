//! # Tool Registry
//!
//! Static descriptors for every tool, used for navigation and related-tool
//! suggestions. The table is built once on first use and never changes.

pub mod route;

pub use route::{LegalPage, Route};

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::calculations::cross_stitch::CrossStitchCalculator;
use crate::calculations::gauge::GaugeCalculator;
use crate::calculations::needles::NeedleConverter;
use crate::calculations::shaping::ShapingCalculator;
use crate::calculations::spinning::SpinningCalculator;
use crate::calculations::weaving::WeavingCalculator;
use crate::calculations::yardage::YardageCalculator;
use crate::calculations::Calculator;
use crate::errors::{FiberError, FiberResult};

pub const COUNTER_SLUG: &str = "stitch-row-counter";
pub const STRIPES_SLUG: &str = "stripe-generator";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    Knitting,
    Crochet,
    Weaving,
    Spinning,
    CrossStitch,
    General,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 6] = [
        ToolCategory::Knitting,
        ToolCategory::Crochet,
        ToolCategory::Weaving,
        ToolCategory::Spinning,
        ToolCategory::CrossStitch,
        ToolCategory::General,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ToolCategory::Knitting => "Knitting",
            ToolCategory::Crochet => "Crochet",
            ToolCategory::Weaving => "Weaving",
            ToolCategory::Spinning => "Spinning",
            ToolCategory::CrossStitch => "Cross-Stitch",
            ToolCategory::General => "General",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ToolCategory::Knitting => "knitting",
            ToolCategory::Crochet => "crochet",
            ToolCategory::Weaving => "weaving",
            ToolCategory::Spinning => "spinning",
            ToolCategory::CrossStitch => "cross-stitch",
            ToolCategory::General => "general",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What drives a tool page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Backed by a [`Calculator`], opened through `session::open_session`
    Calculator,
    Counter,
    Stripes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub slug: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub icon: &'static str,
    pub category: ToolCategory,
    pub kind: ToolKind,
    pub description: &'static str,
    /// Not ready tools are listed but never suggested
    pub ready: bool,
    /// Lower is more prominent
    pub tier: u8,
}

const fn tool(
    slug: &'static str,
    name: &'static str,
    short_name: &'static str,
    icon: &'static str,
    category: ToolCategory,
    kind: ToolKind,
    description: &'static str,
    tier: u8,
) -> ToolDescriptor {
    ToolDescriptor {
        slug,
        name,
        short_name,
        icon,
        category,
        kind,
        description,
        ready: true,
        tier,
    }
}

static TOOLS: Lazy<Vec<ToolDescriptor>> = Lazy::new(|| {
    vec![
        tool(
            NeedleConverter::SLUG,
            "Needle & Hook Size Converter",
            "Needle Sizes",
            "🪡",
            ToolCategory::Knitting,
            ToolKind::Calculator,
            "Convert knitting needle and crochet hook sizes between US, UK, metric and Japanese systems.",
            1,
        ),
        tool(
            GaugeCalculator::SLUG,
            "Gauge Calculator",
            "Gauge",
            "📏",
            ToolCategory::Knitting,
            ToolKind::Calculator,
            "Compare your swatch to the pattern gauge and adjust stitch and row counts.",
            1,
        ),
        tool(
            YardageCalculator::SLUG,
            "Yarn Yardage Calculator",
            "Yardage",
            "🧶",
            ToolCategory::General,
            ToolKind::Calculator,
            "Estimate how much yarn a piece needs, with waste allowance and skein count.",
            1,
        ),
        tool(
            ShapingCalculator::SLUG,
            "Increase / Decrease Evenly",
            "Inc/Dec",
            "➕",
            ToolCategory::Knitting,
            ToolKind::Calculator,
            "Space increases or decreases evenly across a row.",
            2,
        ),
        tool(
            COUNTER_SLUG,
            "Stitch & Row Counter",
            "Counter",
            "🔢",
            ToolCategory::General,
            ToolKind::Counter,
            "Keep several row counters with undo, targets and repeat reminders.",
            1,
        ),
        tool(
            STRIPES_SLUG,
            "Stripe Pattern Generator",
            "Stripes",
            "🌈",
            ToolCategory::Knitting,
            ToolKind::Stripes,
            "Generate random or weighted stripe sequences and the yarn each color needs.",
            2,
        ),
        tool(
            CrossStitchCalculator::SLUG,
            "Cross-Stitch Fabric Calculator",
            "Cross-Stitch",
            "✖",
            ToolCategory::CrossStitch,
            ToolKind::Calculator,
            "Finished design size and fabric cut size for any Aida or evenweave count.",
            1,
        ),
        tool(
            WeavingCalculator::SLUG,
            "Weaving Warp Calculator",
            "Warp",
            "🧵",
            ToolCategory::Weaving,
            ToolKind::Calculator,
            "Warp ends, warp length and yarn requirements from sett and project size.",
            1,
        ),
        tool(
            SpinningCalculator::SLUG,
            "Spinning Twist Calculator",
            "Twist",
            "🌀",
            ToolCategory::Spinning,
            ToolKind::Calculator,
            "Twists per inch and treadling rate for a target twist angle.",
            1,
        ),
        ToolDescriptor {
            ready: false,
            ..tool(
                "blanket-size-calculator",
                "Blanket Size Calculator",
                "Blankets",
                "🛏",
                ToolCategory::Crochet,
                ToolKind::Calculator,
                "Standard blanket dimensions from baby to king.",
                3,
            )
        },
    ]
});

static BY_SLUG: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| TOOLS.iter().enumerate().map(|(i, t)| (t.slug, i)).collect());

/// Every tool in navigation order
pub fn all() -> &'static [ToolDescriptor] {
    &TOOLS
}

pub fn find(slug: &str) -> FiberResult<&'static ToolDescriptor> {
    BY_SLUG
        .get(slug.trim())
        .map(|&i| &TOOLS[i])
        .ok_or_else(|| FiberError::unknown_tool(slug))
}

pub fn by_category(category: ToolCategory) -> Vec<&'static ToolDescriptor> {
    TOOLS.iter().filter(|t| t.category == category).collect()
}

/// Up to `limit` ready tools to suggest next to `slug`: same category first,
/// then the rest, each group by tier. Never includes `slug` itself.
pub fn related(slug: &str, limit: usize) -> FiberResult<Vec<&'static ToolDescriptor>> {
    let current = find(slug)?;
    let mut candidates: Vec<(usize, &'static ToolDescriptor)> = TOOLS
        .iter()
        .enumerate()
        .filter(|(_, t)| t.ready && t.slug != current.slug)
        .collect();
    // Stable on navigation order within a tier
    candidates.sort_by_key(|(i, t)| (t.category != current.category, t.tier, *i));
    Ok(candidates.into_iter().take(limit).map(|(_, t)| t).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{open_session, CALCULATOR_SLUGS};
    use crate::units::UnitSystem;

    #[test]
    fn test_slugs_unique() {
        assert_eq!(BY_SLUG.len(), all().len());
    }

    #[test]
    fn test_every_ready_calculator_opens() {
        for t in all().iter().filter(|t| t.kind == ToolKind::Calculator && t.ready) {
            assert!(open_session(t.slug, UnitSystem::Imperial).is_ok(), "{}", t.slug);
        }
        for slug in CALCULATOR_SLUGS {
            assert_eq!(find(slug).unwrap().kind, ToolKind::Calculator);
        }
    }

    #[test]
    fn test_find_unknown() {
        assert_eq!(find("loom-simulator").unwrap_err().error_code(), "UNKNOWN_TOOL");
    }

    #[test]
    fn test_related_never_self() {
        for t in all() {
            for limit in 0..all().len() + 2 {
                let related = related(t.slug, limit).unwrap();
                assert!(related.len() <= limit);
                assert!(related.iter().all(|r| r.slug != t.slug && r.ready));
            }
        }
    }

    #[test]
    fn test_related_prefers_same_category() {
        let related = related(GaugeCalculator::SLUG, 3).unwrap();
        assert!(related.iter().all(|r| r.category == ToolCategory::Knitting));
        // Tier 1 before tier 2
        assert_eq!(related[0].slug, NeedleConverter::SLUG);
    }

    #[test]
    fn test_by_category() {
        let weaving = by_category(ToolCategory::Weaving);
        assert_eq!(weaving.len(), 1);
        assert_eq!(weaving[0].slug, "weaving-warp-calculator");
        assert_eq!(ToolCategory::from_key("cross_stitch"), Some(ToolCategory::CrossStitch));
    }
}
