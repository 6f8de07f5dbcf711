//! `tools`, `tool` and `route`.

use anyhow::{bail, Result};
use clap::Args;

use fiber_core::tools::{self, Route, ToolCategory, ToolDescriptor};

use super::print_json;

#[derive(Debug, Clone, Args)]
pub struct ToolsArgs {
    /// Only tools in this category (knitting, crochet, weaving, spinning, cross-stitch, general)
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ToolArgs {
    pub slug: String,

    /// How many related tools to suggest
    #[arg(long, default_value_t = 3)]
    pub related: usize,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// URL path, e.g. /gauge-calculator
    pub path: String,

    #[arg(long)]
    pub json: bool,
}

fn print_row(tool: &ToolDescriptor) {
    let status = if tool.ready { "" } else { "  (coming soon)" };
    println!(
        "{} {:<30} {:<14} {}{}",
        tool.icon, tool.slug, tool.category.display_name(), tool.name, status
    );
}

pub fn run_list(args: ToolsArgs) -> Result<()> {
    let listed: Vec<&ToolDescriptor> = match &args.category {
        Some(key) => match ToolCategory::from_key(key) {
            Some(category) => tools::by_category(category),
            None => bail!("Unknown category '{}'", key),
        },
        None => tools::all().iter().collect(),
    };

    if args.json {
        return print_json(&listed);
    }
    for tool in listed {
        print_row(tool);
    }
    Ok(())
}

pub fn run_show(args: ToolArgs) -> Result<()> {
    let tool = tools::find(&args.slug)?;
    let related = tools::related(tool.slug, args.related)?;

    if args.json {
        return print_json(&serde_json::json!({ "tool": tool, "related": related }));
    }

    println!("{} {}", tool.icon, tool.name);
    println!("  {}", tool.description);
    println!("  category: {}", tool.category);
    if !tool.ready {
        println!("  status:   coming soon");
    }
    if !related.is_empty() {
        println!();
        println!("Related:");
        for r in related {
            print_row(r);
        }
    }
    Ok(())
}

pub fn run_route(args: RouteArgs) -> Result<()> {
    let route = Route::resolve(&args.path);
    if args.json {
        return print_json(&route);
    }
    match route {
        Route::Home => println!("home"),
        Route::Tool(tool) => println!("tool {}", tool.slug),
        Route::Blog(post) if post.is_empty() => println!("blog index"),
        Route::Blog(post) => println!("blog {}", post),
        Route::Legal(page) => println!("page {}", page.path()),
        Route::NotFound => println!("not found"),
    }
    Ok(())
}
