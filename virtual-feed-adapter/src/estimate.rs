/// Content-length height heuristic for feed cards.
///
/// This approximates layout; it does not measure it. Pair it with
/// [`crate::MeasuredHeights`] when exact positions matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentHeightEstimator {
    /// Card chrome: avatar row, action bar, padding.
    pub base: u32,
    pub chars_per_line: u32,
    pub line_height: u32,
    pub safety_margin: u32,
    pub max: u32,
    /// Estimate for an index with no item behind it.
    pub missing: u32,
}

impl Default for ContentHeightEstimator {
    fn default() -> Self {
        Self {
            base: 180,
            chars_per_line: 65,
            line_height: 24,
            safety_margin: 20,
            max: 600,
            missing: 250,
        }
    }
}

impl ContentHeightEstimator {
    pub fn estimate_chars(&self, chars: usize) -> u32 {
        let per_line = self.chars_per_line.max(1) as usize;
        let lines = u32::try_from(chars.div_ceil(per_line)).unwrap_or(u32::MAX);
        let height = self
            .base
            .saturating_add(lines.saturating_mul(self.line_height))
            .saturating_add(self.safety_margin);
        height.min(self.max)
    }

    pub fn estimate_text(&self, text: &str) -> u32 {
        self.estimate_chars(text.chars().count())
    }

    pub fn estimate(&self, text: Option<&str>) -> u32 {
        text.map_or(self.missing, |t| self.estimate_text(t))
    }
}
