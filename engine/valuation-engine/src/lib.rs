//! # Valuation Engine
//!
//! Converts player attributes and draft picks into a single trade-value scale.
//!
//! The scale is the 224-pick draft chart: pick 1 is worth 3000 points and the
//! value falls off with every pick until it reaches a floor of 2. Players are
//! valued by mapping their overall rating onto that chart and adjusting the
//! result for position, age, youth, development trait and physical ratings.
//! Future picks are discounted versions of current picks.
//!
//! ## Architecture
//!
//! - **pick_table**: the static draft pick chart and nearest-pick lookup
//! - **anchor**: overall rating to reference-position value
//! - **multipliers**: position, age, youth and development-trait factors
//! - **physical**: speed, throw power, height and ability-slot factors
//! - **gravity**: soft cap for outsized values
//! - **future_picks**: discounted value of picks one or two drafts out
//! - **settings** / **merge**: the tunable parameter tree and deep-merge patches
//! - **pipeline**: the full player valuation
//!
//! Every calculation is a pure function of its inputs and an immutable
//! [`Settings`] snapshot.
//!
//! ## Usage
//!
//! ```rust
//! use valuation_engine::{compute_player_value, DevTrait, PlayerAttributes, Position, Settings};
//!
//! let settings = Settings::default();
//! let player = PlayerAttributes::new(92, 24, Position::WR, DevTrait::Star);
//! let result = compute_player_value(&player, &settings);
//! assert!(result.value > 0.0);
//! assert!(result.nearest_pick.pick >= 1);
//! ```

pub mod anchor;
pub mod error;
pub mod future_picks;
pub mod gravity;
pub mod merge;
pub mod multipliers;
pub mod physical;
pub mod pick_table;
pub mod pipeline;
pub mod settings;
pub mod types;


pub use anchor::anchor_value;
pub use error::{Result, ValuationError};
pub use future_picks::{compute_future_pick_value, value_pick, FuturePickValue, PickValuation};
pub use gravity::gravity;
pub use merge::{merge_settings, Merge, SettingsPatch};
pub use multipliers::{age_multiplier, dev_trait_multiplier, position_multiplier, youth_buffer};
pub use physical::{physical_multiplier, PhysicalKind};
pub use pick_table::{nearest_pick, pick_chart, value_at, NearestPick, PickChartRow};
pub use pipeline::compute_player_value;
pub use settings::Settings;
pub use types::{
    DevTrait, PhysicalAttributes, PickDescriptor, PlayerAttributes, Position, ValuationResult, ValuationTrace,
};

/// Current version of the valuation engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
