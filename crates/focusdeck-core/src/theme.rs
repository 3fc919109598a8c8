//! Light/dark colour palette shared by every screen.

use serde::{Deserialize, Serialize};

/// Hex colour strings for each UI role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub border: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}

pub const DARK: Palette = Palette {
    background: "#121212",
    card: "#1e1e1e",
    text: "#ffffff",
    border: "#2a2a2a",
    primary: "#3b82f6",
    secondary: "#60a5fa",
};

pub const LIGHT: Palette = Palette {
    background: "#f5f5f5",
    card: "#ffffff",
    text: "#000000",
    border: "#e0e0e0",
    primary: "#3b82f6",
    secondary: "#60a5fa",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeStore {
    dark: bool,
}

impl Default for ThemeStore {
    fn default() -> Self {
        Self { dark: true }
    }
}

impl ThemeStore {
    pub fn new(dark: bool) -> Self {
        Self { dark }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn toggle(&mut self) {
        self.dark = !self.dark;
        tracing::debug!(dark = self.dark, "theme toggled");
    }

    pub fn colors(&self) -> &'static Palette {
        if self.dark {
            &DARK
        } else {
            &LIGHT
        }
    }
}

/// Parse `#rrggbb` into its RGB components
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}
