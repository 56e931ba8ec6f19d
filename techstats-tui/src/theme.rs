//! Terminal theme and color utilities.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct DashboardTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl DashboardTheme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(15, 17, 23),
            bg_highlight: Color::Rgb(38, 42, 54),
            primary: Color::Rgb(139, 92, 246),
            secondary: Color::Rgb(6, 182, 212),
            success: Color::Rgb(16, 185, 129),
            warning: Color::Rgb(245, 158, 11),
            error: Color::Rgb(239, 68, 68),
            text: Color::Rgb(229, 231, 235),
            text_dim: Color::Rgb(156, 163, 175),
            text_muted: Color::Rgb(75, 85, 99),
            border: Color::Rgb(55, 65, 81),
            border_focus: Color::Rgb(139, 92, 246),
        }
    }
}

/// Terminal colour for a series colour.
pub fn series_color(color: techstats_charts::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

pub fn notification_color(level: NotificationLevel, theme: &DashboardTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.secondary,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Colour for a signed change: green up, red down, dim when flat or unknown.
pub fn trend_color(diff: Option<f64>, theme: &DashboardTheme) -> Color {
    match diff {
        Some(d) if d > 0.0 => theme.success,
        Some(d) if d < 0.0 => theme.error,
        _ => theme.text_dim,
    }
}
