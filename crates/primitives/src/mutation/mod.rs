//! Document mutations and position mapping.
//!
//! A [`Mutation`] is the host's notification that content changed; a
//! [`PositionMap`] is its compiled form, used to carry tracked spans across
//! the change. [`TextEdit`] is the opposite direction: an instruction the
//! engine hands back to the host.

mod position_map;
mod types;


pub use position_map::{Operation, PositionMap};
pub use types::{Bias, Deletion, Insertion, Mutation, TextEdit};
