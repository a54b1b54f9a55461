//! Data models for the meetings tool endpoints

mod flex;
mod group;
mod live;
mod meeting;
mod recording;
mod settings;

pub use group::*;
pub use live::*;
pub use meeting::*;
pub use recording::*;
pub use settings::*;
