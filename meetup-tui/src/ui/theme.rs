use ratatui::style::Color;

pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub background: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

/// Warm palette for the meetup client
pub fn theme_colors() -> ThemeColors {
    ThemeColors {
        primary: Color::Rgb(255, 140, 90),    // Coral
        secondary: Color::Rgb(255, 200, 120), // Sand
        accent: Color::Rgb(120, 200, 255),    // Sky
        text: Color::Rgb(230, 230, 230),
        text_dim: Color::Rgb(130, 130, 130),
        background: Color::Black,
        border: Color::Rgb(200, 110, 70),
        success: Color::Rgb(120, 220, 120),
        warning: Color::Rgb(255, 210, 0),
        error: Color::Rgb(255, 80, 80),
        highlight_bg: Color::Rgb(60, 35, 25),
    }
}
