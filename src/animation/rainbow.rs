//! Rainbow interpolator: step counter → colour along a configured spectrum.
//!
//! A spectrum is an ordered list of anchor colours spread evenly over the
//! stop range `[1, N]`.  With `k + 1` anchors the range is split into `k`
//! equal segments and each segment blends linearly between its two anchors.
//!
//! ```text
//!  step:   1 ............ N/2 ............ N | N+1 ...
//!  colour: blue ───────▶ purple ───────▶ blue | blue ...   (wraps)
//! ```
//!
//! Steps wrap cyclically: `colour_at(s) == colour_at(s + N)` for every
//! integer `s`, including negatives.

use core::fmt;

use palette::{Mix, Srgb};

use crate::config::SpectrumConfig;

/// 8-bit sRGB colour written to the LED strips.
pub type Colour = Srgb<u8>;

/// Resolve a colour name (`"purple"`) or hex code (`"#800080"`).
pub fn parse_colour(name: &str) -> Option<Colour> {
    let name = name.trim();
    if name.starts_with('#') {
        return name.parse::<Colour>().ok();
    }
    palette::named::from_str(&name.to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpectrumError {
    /// Fewer than two anchors.
    TooFewAnchors,
    /// Range must hold at least two stops.
    RangeTooSmall,
    /// An anchor is neither a known colour name nor a hex code.
    UnknownColour(String),
}

impl fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewAnchors => write!(f, "spectrum needs at least two anchors"),
            Self::RangeTooSmall => write!(f, "spectrum range must be >= 2"),
            Self::UnknownColour(name) => write!(f, "unknown colour '{name}'"),
        }
    }
}

/// Immutable spectrum.  One instance per zone; nothing is shared between
/// instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    anchors: Vec<Srgb<f32>>,
    range: u32,
}

impl Spectrum {
    pub fn new(anchors: &[Colour], range: u32) -> Result<Self, SpectrumError> {
        if anchors.len() < 2 {
            return Err(SpectrumError::TooFewAnchors);
        }
        if range < 2 {
            return Err(SpectrumError::RangeTooSmall);
        }
        Ok(Self {
            anchors: anchors.iter().map(|c| c.into_format()).collect(),
            range,
        })
    }

    pub fn from_config(cfg: &SpectrumConfig) -> Result<Self, SpectrumError> {
        let anchors = cfg
            .anchors
            .iter()
            .map(|name| parse_colour(name).ok_or_else(|| SpectrumError::UnknownColour(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&anchors, cfg.range)
    }

    /// Colour for `step`, wrapped into `[1, N]`.
    pub fn colour_at(&self, step: i64) -> Colour {
        let n = i128::from(self.range);
        // 0-based offset inside the range; i128 keeps `step - 1` total.
        let offset = (i128::from(step) - 1).rem_euclid(n) as f32;
        let span = (self.range - 1) as f32;

        let segments = self.anchors.len() - 1;
        let width = span / segments as f32;
        let index = ((offset / width) as usize).min(segments - 1);
        let t = ((offset - index as f32 * width) / width).clamp(0.0, 1.0);

        self.anchors[index]
            .mix(self.anchors[index + 1], t)
            .into_format()
    }

    /// Same as [`colour_at`](Self::colour_at) for the unsigned animation clock.
    pub fn colour_at_step(&self, step: u64) -> Colour {
        // Reduce first so the cast to i64 cannot overflow.
        let reduced = step % u64::from(self.range);
        self.colour_at(reduced as i64)
    }
}
