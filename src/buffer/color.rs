//! Color: Terminal color representation and capability-based downgrade.
//!
//! A [`Color`] is one of three variants: the terminal's default, an index
//! into the 256-color palette, or a 24-bit RGB triple. Before a color is
//! translated to SGR it is passed through [`Color::downgrade`] with the
//! terminal's [`ColorDepth`], a pure function with fixed thresholds.

/// Terminal color model, from least to most capable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ColorDepth {
    /// No color at all; everything renders with the default colors.
    Mono,
    /// The 16 basic ANSI colors.
    Basic,
    /// The xterm 256-color palette.
    Color256,
    /// 24-bit RGB.
    #[default]
    TrueColor,
}

/// A cell foreground or background color.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// The terminal's default color (SGR 39/49).
    #[default]
    Default,
    /// A palette index (0-255).
    Indexed(u8),
    /// A 24-bit color.
    Rgb(u8, u8, u8),
}

/// Canonical RGB values of the 16 basic colors (xterm defaults).
const ANSI16_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// Channel levels of the 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Channel spread below which an RGB color is mapped onto the gray ramp.
const GRAY_SPREAD: u8 = 16;

impl Color {
    /// Basic black (index 0).
    pub const BLACK: Self = Self::Indexed(0);
    /// Basic red (index 1).
    pub const RED: Self = Self::Indexed(1);
    /// Basic green (index 2).
    pub const GREEN: Self = Self::Indexed(2);
    /// Basic yellow (index 3).
    pub const YELLOW: Self = Self::Indexed(3);
    /// Basic blue (index 4).
    pub const BLUE: Self = Self::Indexed(4);
    /// Basic magenta (index 5).
    pub const MAGENTA: Self = Self::Indexed(5);
    /// Basic cyan (index 6).
    pub const CYAN: Self = Self::Indexed(6);
    /// Basic white (index 7).
    pub const WHITE: Self = Self::Indexed(7);

    /// Create an RGB color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(r, g, b)
    }

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::Rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Check if this is the terminal default.
    #[inline]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// Resolve to an RGB triple.
    ///
    /// Returns `None` for [`Color::Default`], whose value only the terminal knows.
    pub const fn to_rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Self::Default => None,
            Self::Rgb(r, g, b) => Some((r, g, b)),
            Self::Indexed(idx) => Some(index_to_rgb(idx)),
        }
    }

    /// Map this color onto what a terminal with `depth` can display.
    ///
    /// - `Mono`: always [`Color::Default`].
    /// - `Basic`: indices below 16 are kept; anything else is thresholded
    ///   per channel at 128, made bright when the strongest channel reaches
    ///   192, and dark results averaging 64 or more become bright black.
    /// - `Color256`: RGB becomes the 24-step gray ramp when the channel
    ///   spread is below 16, otherwise the nearest 6x6x6 cube entry.
    /// - `TrueColor`: identity.
    #[must_use]
    pub const fn downgrade(self, depth: ColorDepth) -> Self {
        match (depth, self) {
            (ColorDepth::TrueColor, _) | (_, Self::Default) => self,
            (ColorDepth::Mono, _) => Self::Default,
            (ColorDepth::Color256, Self::Indexed(_)) => self,
            (ColorDepth::Color256, Self::Rgb(r, g, b)) => Self::Indexed(rgb_to_256(r, g, b)),
            (ColorDepth::Basic, Self::Indexed(idx)) if idx < 16 => self,
            (ColorDepth::Basic, Self::Indexed(idx)) => {
                let (r, g, b) = index_to_rgb(idx);
                Self::Indexed(rgb_to_16(r, g, b))
            }
            (ColorDepth::Basic, Self::Rgb(r, g, b)) => Self::Indexed(rgb_to_16(r, g, b)),
        }
    }
}

impl std::fmt::Debug for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Indexed(idx) => write!(f, "idx({idx})"),
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::Rgb(r, g, b)
    }
}

impl From<u32> for Color {
    /// Convert from a 24-bit hex color (e.g., 0xFF5500)
    #[inline]
    fn from(hex: u32) -> Self {
        Self::from_u32(hex)
    }
}

/// Average of the three channels, rounded down.
#[inline]
const fn average(r: u8, g: u8, b: u8) -> u8 {
    ((r as u16 + g as u16 + b as u16) / 3) as u8
}

/// Convert a palette index to its canonical RGB value.
pub const fn index_to_rgb(index: u8) -> (u8, u8, u8) {
    if index < 16 {
        return ANSI16_PALETTE[index as usize];
    }
    if index >= 232 {
        let gray = 8 + 10 * (index - 232);
        return (gray, gray, gray);
    }
    let idx = index - 16;
    (
        CUBE_LEVELS[(idx / 36) as usize],
        CUBE_LEVELS[((idx / 6) % 6) as usize],
        CUBE_LEVELS[(idx % 6) as usize],
    )
}

/// Convert an RGB color to the nearest 256-color palette index.
pub const fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    let max = max3(r, g, b);
    let min = min3(r, g, b);

    if max - min < GRAY_SPREAD {
        let avg = average(r, g, b);
        if avg < 8 {
            return 16;
        }
        if avg > 248 {
            return 231;
        }
        let step = (avg - 8) / 10;
        return 232 + if step > 23 { 23 } else { step };
    }

    16 + 36 * cube_index(r) + 6 * cube_index(g) + cube_index(b)
}

/// Convert an RGB color to one of the 16 basic colors.
pub const fn rgb_to_16(r: u8, g: u8, b: u8) -> u8 {
    let base = (r >= 128) as u8 | ((g >= 128) as u8) << 1 | ((b >= 128) as u8) << 2;
    if base == 0 {
        return if average(r, g, b) >= 64 { 8 } else { 0 };
    }
    if max3(r, g, b) >= 192 {
        base + 8
    } else {
        base
    }
}

/// Map one channel onto the cube, splitting at the midpoints between levels.
const fn cube_index(v: u8) -> u8 {
    if v < 48 {
        0
    } else if v < 115 {
        1
    } else if v < 155 {
        2
    } else if v < 195 {
        3
    } else if v < 235 {
        4
    } else {
        5
    }
}

const fn max3(a: u8, b: u8, c: u8) -> u8 {
    let ab = if a > b { a } else { b };
    if ab > c {
        ab
    } else {
        c
    }
}

const fn min3(a: u8, b: u8, c: u8) -> u8 {
    let ab = if a < b { a } else { b };
    if ab < c {
        ab
    } else {
        c
    }
}
