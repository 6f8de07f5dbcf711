//! # fiber_core - Fiber-Arts Calculation Engine
//!
//! `fiber_core` holds everything behind the FiberTools pages: the calculators
//! for knitting, crochet, weaving, spinning and cross-stitch, the stitch/row
//! counter, and the stripe generator. All inputs and outputs are
//! JSON-serializable so any front end can drive it.
//!
//! ## Design Philosophy
//!
//! - **Pure calculations**: every formula is a function from input to result
//! - **Clamped input**: edits are range-checked once, in [`input`], for every tool
//! - **Canonical units**: inputs are stored imperial and projected for display
//! - **Recoverable state**: stored records that fail to load start fresh
//!
//! ## Quick Start
//!
//! ```rust
//! use fiber_core::session::{open_session, SessionMessage};
//! use fiber_core::units::UnitSystem;
//!
//! let mut session = open_session("needle-size-converter", UnitSystem::Imperial).unwrap();
//! session.handle(SessionMessage::set_choice("size", "8"));
//!
//! for line in session.lines().unwrap() {
//!     println!("{}: {}", line.label, line.value);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Per-tool formulas
//! - [`input`] - Field specs and edit handling
//! - [`session`] - Live recomputation and unit projection
//! - [`tools`] - Tool registry and route resolution
//! - [`counter`] - Stitch/row counters with undo/redo
//! - [`stripes`] - Stripe pattern generator
//! - [`store`] - Versioned local state with atomic saves
//! - [`consent`] - Cookie consent record
//! - [`settings`] - User settings (TOML)
//! - [`units`] - Unit systems and type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod consent;
pub mod counter;
pub mod errors;
pub mod input;
pub mod session;
pub mod settings;
pub mod store;
pub mod stripes;
pub mod tools;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use counter::{CounterAction, CounterBoard, PersistedBoard};
pub use errors::{FiberError, FiberResult};
pub use session::{open_session, Session, SessionMessage, ToolSession};
pub use settings::Settings;
pub use store::{DirectoryBackend, MemoryBackend, StateStore};
pub use units::UnitSystem;
