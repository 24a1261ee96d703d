//! Render-pass (AOV) separation for multi-channel EXR files.
//!
//! Classification is pure and works on channel names only ([`classify`]); [`split`] does the
//! EXR reading and writing.

pub mod classify;
pub mod split;

pub use classify::{AovGroup, ChannelRef, MATTE_GROUP, PartChannels, classify_parts};
pub use split::{SplitOpts, SplitOutcome, SplitOutput, split_aovs, split_aovs_batch};
