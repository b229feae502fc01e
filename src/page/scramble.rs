//! Text scramble: a string resolves left to right out of random glyphs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Steps each letter stays scrambled.
pub const CYCLES_PER_LETTER: usize = 2;
/// Milliseconds between steps.
pub const STEP_MS: i32 = 38;
/// Delay before an auto-start scramble begins.
pub const AUTO_START_DELAY_MS: i32 = 100;

/// Step-by-step reveal of one string.
#[derive(Debug, Clone)]
pub struct Scrambler {
    target: Vec<char>,
    alphabet: Vec<char>,
    pinned: Option<usize>,
    pos: usize,
    rng: SmallRng,
}

impl Scrambler {
    /// `pinned` is an index that never scrambles.
    pub fn new(target: &str, pinned: Option<usize>, seed: u64) -> Self {
        let target: Vec<char> = target.chars().collect();
        let mut alphabet: Vec<char> = Vec::new();
        for &c in &target {
            if !c.is_whitespace() && !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }
        Self {
            target,
            alphabet,
            pinned,
            pos: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Labels keep their first character.
    pub fn label(target: &str, seed: u64) -> Self {
        Self::new(target, Some(0), seed)
    }

    /// Clock readouts keep their first digit.
    pub fn clock(target: &str, seed: u64) -> Self {
        let first_digit = target.chars().position(|c| c.is_ascii_digit());
        Self::new(target, first_digit, seed)
    }

    pub fn target(&self) -> String {
        self.target.iter().collect()
    }

    pub fn total_steps(&self) -> usize {
        self.target.len() * CYCLES_PER_LETTER
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.total_steps()
    }

    pub fn restart(&mut self) {
        self.pos = 0;
    }

    /// Next frame of text, or `None` once finished. The final frame is
    /// always the target itself.
    pub fn step(&mut self) -> Option<String> {
        if self.is_done() {
            return None;
        }
        let pos = self.pos;
        let frame: String = (0..self.target.len())
            .map(|i| self.glyph(i, pos))
            .collect();
        self.pos += 1;

        if self.is_done() {
            Some(self.target())
        } else {
            Some(frame)
        }
    }

    fn glyph(&mut self, index: usize, pos: usize) -> char {
        let c = self.target[index];
        if self.pinned == Some(index) || pos > index * CYCLES_PER_LETTER || c == ' ' {
            return c;
        }
        if self.alphabet.is_empty() {
            return c;
        }
        self.alphabet[self.rng.gen_range(0..self.alphabet.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishes_on_target_after_two_steps_per_letter() {
        let mut s = Scrambler::label("Hello world", 1);
        let frames: Vec<String> = std::iter::from_fn(|| s.step()).collect();
        assert_eq!(frames.len(), 22);
        assert_eq!(frames.last().map(String::as_str), Some("Hello world"));
        assert!(s.is_done());
    }

    #[test]
    fn pinned_and_spaces_never_scramble() {
        let mut s = Scrambler::label("ab cd", 9);
        while let Some(frame) = s.step() {
            let chars: Vec<char> = frame.chars().collect();
            assert_eq!(chars[0], 'a');
            assert_eq!(chars[2], ' ');
            assert!(chars.iter().all(|c| "abcd ".contains(*c)));
        }
    }

    #[test]
    fn revealed_prefix_grows() {
        let mut s = Scrambler::new("abcdef", None, 4);
        for _ in 0..5 {
            s.step();
        }
        // pos = 5 reveals indices 0, 1 and 2.
        let frame = s.step().unwrap_or_default();
        assert!(frame.starts_with("abc"));
    }

    #[test]
    fn clock_pins_first_digit() {
        let s = Scrambler::clock("at 09:41 PST", 0);
        assert_eq!(s.pinned, Some(3));
    }
}
