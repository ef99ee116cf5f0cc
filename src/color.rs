use std::fmt;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// Single colors
// ---------------------------------------------------------------------------

/// Parse a `#rrggbb` (or `#rgb`) hex color.
pub fn parse_hex(s: &str) -> Result<Srgb<u8>> {
    Srgb::<u8>::from_str(s.trim())
        .map_err(|e| ExploreError::invalid("color", format!("'{s}' is not a hex color ({e})")))
}

pub fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

pub fn to_color32(c: Srgb<u8>) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}

pub fn from_color32(c: Color32) -> Srgb<u8> {
    Srgb::new(c.r(), c.g(), c.b())
}

// ---------------------------------------------------------------------------
// Sequential palettes for categorical bars
// ---------------------------------------------------------------------------

/// Perceptually uniform colormaps offered for bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Magma,
    Viridis,
    Rocket,
    Mako,
}

impl Palette {
    pub const ALL: [Palette; 4] = [Palette::Magma, Palette::Viridis, Palette::Rocket, Palette::Mako];

    pub fn name(self) -> &'static str {
        match self {
            Palette::Magma => "magma",
            Palette::Viridis => "viridis",
            Palette::Rocket => "rocket",
            Palette::Mako => "mako",
        }
    }

    /// Evenly spaced anchor colors from dark to light.
    fn stops(self) -> &'static [[u8; 3]] {
        match self {
            Palette::Magma => &[
                [0, 0, 4],
                [30, 11, 59],
                [69, 13, 103],
                [118, 25, 126],
                [170, 45, 131],
                [215, 75, 118],
                [245, 129, 116],
                [253, 188, 153],
                [252, 253, 191],
            ],
            Palette::Viridis => &[
                [68, 1, 84],
                [72, 36, 117],
                [65, 68, 135],
                [53, 95, 141],
                [42, 120, 142],
                [33, 145, 140],
                [34, 168, 132],
                [68, 191, 112],
                [122, 209, 81],
                [189, 223, 38],
                [253, 231, 37],
            ],
            Palette::Rocket => &[
                [3, 5, 26],
                [47, 23, 58],
                [92, 30, 81],
                [139, 28, 91],
                [190, 23, 79],
                [230, 64, 60],
                [243, 120, 83],
                [246, 171, 136],
                [250, 235, 221],
            ],
            Palette::Mako => &[
                [11, 4, 5],
                [39, 27, 48],
                [62, 53, 107],
                [59, 91, 154],
                [53, 123, 162],
                [53, 155, 172],
                [73, 193, 173],
                [153, 221, 181],
                [222, 245, 229],
            ],
        }
    }

    /// Sample the colormap at `t` in `[0, 1]`, mixing stops in linear RGB.
    pub fn sample(self, t: f32) -> Srgb<u8> {
        let stops = self.stops();
        let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(stops.len() - 1);

        let a = linear(stops[lo]);
        let b = linear(stops[hi]);
        let mixed: LinSrgb = a.mix(b, pos - lo as f32);
        Srgb::<f32>::from_linear(mixed).into_format()
    }

    /// `n` colors drawn from the interior of the colormap, so neither
    /// extreme end is used.
    pub fn colors(self, n: usize) -> Vec<Srgb<u8>> {
        (0..n)
            .map(|i| self.sample((i + 1) as f32 / (n + 1) as f32))
            .collect()
    }
}

fn linear([r, g, b]: [u8; 3]) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = ExploreError;

    fn from_str(s: &str) -> Result<Self> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ExploreError::invalid("palette", format!("unknown palette '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        let c = parse_hex("#69b3a2").unwrap();
        assert_eq!((c.red, c.green, c.blue), (0x69, 0xb3, 0xa2));
        assert_eq!(to_hex(c), "#69b3a2");
        assert_eq!(to_color32(c), Color32::from_rgb(0x69, 0xb3, 0xa2));
        assert_eq!(from_color32(to_color32(c)), c);
    }

    #[test]
    fn rejects_bad_colors() {
        assert!(matches!(
            parse_hex("teal-ish"),
            Err(ExploreError::InvalidParameter { name: "color", .. })
        ));
        assert!(parse_hex("#12345").is_err());
    }

    #[test]
    fn palette_names_round_trip() {
        for p in Palette::ALL {
            assert_eq!(p.name().parse::<Palette>().unwrap(), p);
        }
        assert!("unknown".parse::<Palette>().is_err());
        assert_eq!(Palette::default(), Palette::Magma);
    }

    #[test]
    fn palette_endpoints_match_stops() {
        let first = Palette::Viridis.sample(0.0);
        let last = Palette::Viridis.sample(1.0);
        assert_eq!((first.red, first.green, first.blue), (68, 1, 84));
        assert_eq!((last.red, last.green, last.blue), (253, 231, 37));
    }

    #[test]
    fn interior_colors_get_lighter() {
        let colors = Palette::Magma.colors(4);
        assert_eq!(colors.len(), 4);
        let lum = |c: &Srgb<u8>| c.red as u32 + c.green as u32 + c.blue as u32;
        assert!(colors.windows(2).all(|w| lum(&w[0]) < lum(&w[1])));
        assert_ne!(colors[0], Palette::Magma.sample(0.0));
        assert!(Palette::Mako.colors(0).is_empty());
    }
}
