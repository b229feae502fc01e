//! Play a video only while it is fully on screen.

/// Fraction of the element that has to be visible.
pub const VISIBILITY_THRESHOLD: f64 = 1.0;
/// Videos this selector matches are gated.
pub const VIDEO_SELECTOR: &str = ".work-card video";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Play,
    Pause,
}

/// Decide from one intersection observation.
pub fn decide(is_intersecting: bool, ratio: f64) -> Playback {
    // Observers report ratios a hair under 1 for fully visible elements.
    if is_intersecting && ratio >= VISIBILITY_THRESHOLD - 1e-3 {
        Playback::Play
    } else {
        Playback::Pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_full_visibility_plays() {
        assert_eq!(decide(true, 1.0), Playback::Play);
        assert_eq!(decide(true, 0.9995), Playback::Play);
        assert_eq!(decide(true, 0.5), Playback::Pause);
        assert_eq!(decide(false, 1.0), Playback::Pause);
    }
}
