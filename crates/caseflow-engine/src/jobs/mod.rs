//! Concrete migration jobs.
//!
//! Each job is one [`crate::unit::MigrationUnit`] implementation paired with
//! a stable name. The two jobs here cover the two candidate-sourcing
//! styles: `hearing_channel` finds its cases by querying the search index,
//! `venue_backfill` is handed a pre-computed roster.

pub mod hearing_channel;
pub mod venue_backfill;

pub use hearing_channel::HearingChannelUnit;
pub use venue_backfill::VenueBackfillUnit;
