use ratatui::style::Color;

use crate::model::config::ColumnConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub green: Color,
    pub selection_bg: Color,
    /// Border color per configured column, in board order
    pub column_colors: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            column_colors: Vec::new(),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Build a theme whose column borders follow the configured colors.
    /// Columns without a valid color use the default text color.
    pub fn from_columns(columns: &[ColumnConfig]) -> Self {
        let mut theme = Theme::default();
        theme.column_colors = columns
            .iter()
            .map(|c| {
                c.color
                    .as_deref()
                    .and_then(parse_hex_color)
                    .unwrap_or(theme.text)
            })
            .collect();
        theme
    }

    pub fn column_color(&self, index: usize) -> Color {
        self.column_colors.get(index).copied().unwrap_or(self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::default_columns;

    #[test]
    fn parse_hex() {
        assert_eq!(parse_hex_color("#f87171"), Some(Color::Rgb(0xF8, 0x71, 0x71)));
        assert_eq!(parse_hex_color("f87171"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#gggggg"), None);
    }

    #[test]
    fn column_colors_from_config() {
        let mut columns = default_columns();
        columns[1].color = Some("bogus".into());
        let theme = Theme::from_columns(&columns);
        assert_eq!(theme.column_color(0), Color::Rgb(0xF8, 0x71, 0x71));
        assert_eq!(theme.column_color(1), theme.text);
        assert_eq!(theme.column_color(9), theme.text);
    }
}
