use thiserror::Error;

use crate::contact::ContactId;

/// Marker colors, handed out by contact id modulo the palette size.
pub const MARKER_COLORS: [&str; 10] = [
    "#FF6B6B", // coral red
    "#4ECDC4", // turquoise
    "#45B7D1", // sky blue
    "#96CEB4", // sage green
    "#FFBE0B", // golden yellow
    "#FF006E", // hot pink
    "#8338EC", // purple
    "#3A86FF", // bright blue
    "#FB5607", // orange
    "#FFFFFF", // white
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Blend towards black; `alpha` of 1.0 keeps the color, 0.0 gives black.
    pub fn dim(self, alpha: f64) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f64 * a).round() as u8;
        Rgb {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
}

/// Parses `#rgb` / `#rrggbb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Result<Rgb, ColorError> {
    let h = hex.trim_start_matches('#');
    let invalid = || ColorError::InvalidHex(hex.to_string());

    if !h.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match h.len() {
        3 => {
            let doubled: Vec<String> = h.chars().map(|c| format!("{c}{c}")).collect();
            Ok(Rgb {
                r: channel(&doubled[0])?,
                g: channel(&doubled[1])?,
                b: channel(&doubled[2])?,
            })
        }
        6 => Ok(Rgb {
            r: channel(&h[0..2])?,
            g: channel(&h[2..4])?,
            b: channel(&h[4..6])?,
        }),
        _ => Err(invalid()),
    }
}

pub fn marker_color(id: ContactId) -> Rgb {
    let idx = (id.color_seed() % MARKER_COLORS.len() as u64) as usize;
    parse_hex(MARKER_COLORS[idx]).unwrap_or(Rgb::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_forms() {
        assert_eq!(
            parse_hex("#FF6B6B"),
            Ok(Rgb {
                r: 255,
                g: 107,
                b: 107
            })
        );
        assert_eq!(parse_hex("fff"), Ok(Rgb::WHITE));
        assert_eq!(parse_hex("#000"), Ok(Rgb { r: 0, g: 0, b: 0 }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn rejects_signs_inside_channels() {
        assert!(parse_hex("+FFFFF").is_err());
        assert!(parse_hex("#FF+FFF").is_err());
        assert!(parse_hex("#+FF").is_err());
        assert!(parse_hex("#ÿÿ").is_err());
    }

    #[test]
    fn whole_palette_parses() {
        for hex in MARKER_COLORS {
            assert!(parse_hex(hex).is_ok(), "{hex}");
        }
    }

    #[test]
    fn colors_cycle_by_id() {
        assert_eq!(marker_color(ContactId::Touch(0)), marker_color(ContactId::Touch(10)));
        assert_ne!(marker_color(ContactId::Touch(0)), marker_color(ContactId::Touch(1)));
        // 'a' is 97, so it lands on the same slot as touch 7
        assert_eq!(marker_color(ContactId::Key('a')), marker_color(ContactId::Touch(7)));
    }

    #[test]
    fn dim_scales_channels() {
        let c = Rgb {
            r: 200,
            g: 100,
            b: 0,
        };
        assert_eq!(c.dim(0.5), Rgb { r: 100, g: 50, b: 0 });
        assert_eq!(c.dim(1.0), c);
        assert_eq!(c.dim(-1.0), Rgb { r: 0, g: 0, b: 0 });
    }
}
