//! Override shadowing for calendar-bound writes.

mod group;
mod resolver;

pub use group::GroupKey;
pub use resolver::{resolve_action, resolve_overrides};
