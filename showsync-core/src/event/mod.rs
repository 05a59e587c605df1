//! Provider-neutral event model.
//!
//! Ingestion converts scheduler entries and calendar entries into these
//! types; the diff engine and override resolver work exclusively with them.

mod days;
mod identity;
mod manifest_event;
mod sub_event;
mod timing;

pub use days::DaySet;
pub use identity::{EventKind, Identity};
pub use manifest_event::{EventDraft, ManifestEvent, Ownership};
pub use sub_event::{Behavior, Payload, RepeatPolicy, StopPolicy, SubEvent, SubEventDraft};
pub use timing::{Dual, DualDate, DualTime, Timing};
