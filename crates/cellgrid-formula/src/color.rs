//! Marker colors for formula references

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Supplies highlight colors for newly referenced cells
///
/// Colors are six hex digits without a leading `#`. An implementation should
/// avoid returning `previous`, so adjacent references stay distinguishable.
pub trait ColorSource: fmt::Debug {
    fn next_color(&mut self, previous: Option<&str>) -> String;
}

/// Random colors, re-rolled when they collide with the previous one
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    const MAX_REROLLS: usize = 8;

    /// Seed from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn roll(&mut self) -> String {
        format!("{:06x}", self.rng.gen_range(0..=0xFF_FFFFu32))
    }
}

impl Default for RandomColors {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RandomColors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomColors").finish_non_exhaustive()
    }
}

impl ColorSource for RandomColors {
    fn next_color(&mut self, previous: Option<&str>) -> String {
        let mut color = self.roll();
        for _ in 0..Self::MAX_REROLLS {
            if previous != Some(color.as_str()) {
                break;
            }
            color = self.roll();
        }
        color
    }
}

/// Deterministic colors cycling through a fixed palette
#[derive(Debug, Clone)]
pub struct PaletteColors {
    palette: Vec<String>,
    next: usize,
}

impl PaletteColors {
    pub fn new<I, S>(palette: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            palette: palette.into_iter().map(Into::into).collect(),
            next: 0,
        }
    }

    fn advance(&mut self) -> String {
        let color = self.palette[self.next % self.palette.len()].clone();
        self.next += 1;
        color
    }
}

impl Default for PaletteColors {
    fn default() -> Self {
        Self::new([
            "1a73e8", "d93025", "188038", "f9ab00", "a142f4", "e8710a", "12b5cb", "e52592",
        ])
    }
}

impl ColorSource for PaletteColors {
    fn next_color(&mut self, previous: Option<&str>) -> String {
        if self.palette.is_empty() {
            return "000000".to_string();
        }
        let color = self.advance();
        if previous == Some(color.as_str()) && self.palette.len() > 1 {
            return self.advance();
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hex_color(s: &str) -> bool {
        s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn test_random_colors_are_hex() {
        let mut colors = RandomColors::seeded(7);
        for _ in 0..32 {
            assert!(is_hex_color(&colors.next_color(None)));
        }
    }

    #[test]
    fn test_random_colors_avoid_previous() {
        let mut colors = RandomColors::seeded(42);
        let mut previous = colors.next_color(None);
        for _ in 0..64 {
            let color = colors.next_color(Some(&previous));
            assert_ne!(color, previous);
            previous = color;
        }
    }

    #[test]
    fn test_seeded_colors_repeat() {
        let a: Vec<_> = {
            let mut c = RandomColors::seeded(3);
            (0..4).map(|_| c.next_color(None)).collect()
        };
        let b: Vec<_> = {
            let mut c = RandomColors::seeded(3);
            (0..4).map(|_| c.next_color(None)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_palette_cycles_and_skips_previous() {
        let mut colors = PaletteColors::new(["aaaaaa", "bbbbbb"]);
        assert_eq!(colors.next_color(None), "aaaaaa");
        assert_eq!(colors.next_color(None), "bbbbbb");
        assert_eq!(colors.next_color(Some("aaaaaa")), "bbbbbb");
    }
}
