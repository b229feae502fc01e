//! Small page behaviors that share no state with the engines.

pub mod clock;
pub mod playback;
pub mod scramble;
pub mod theme;
