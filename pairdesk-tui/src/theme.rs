//! Parrot/neon theme tokens for the PairDesk dashboard
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (primary highlights, focus)
//! - **Positive**: Neon green (gains, success, buys)
//! - **Negative**: Hot pink (losses, failures, sells)
//! - **Warning**: Neon orange (alerts, sample data)
//! - **Neutral**: Cool purple (secondary info, selection)
//! - **Muted**: Steel blue (hints, secondary text)

use ratatui::style::{Color, Modifier, Style};

use pairdesk_core::Side;

use crate::notify::NoticeKind;

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

/// Parrot/neon theme
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: BACKGROUND,
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            neutral: NEUTRAL,
            muted: MUTED,
            text_primary: Color::White,
            text_secondary: TEXT_SECONDARY,
        }
    }

    /// Green for gains (and flat), pink for losses.
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    pub fn side_color(&self, side: Side) -> Color {
        match side {
            Side::Long => self.positive,
            Side::Short => self.negative,
        }
    }

    /// Win rate in percent.
    pub fn win_rate_color(&self, win_rate: f64) -> Color {
        match win_rate {
            w if w >= 70.0 => self.positive,
            w if w >= 50.0 => self.accent,
            w if w >= 40.0 => self.neutral,
            _ => self.warning,
        }
    }

    pub fn notice_color(&self, kind: NoticeKind) -> Color {
        match kind {
            NoticeKind::Info => self.accent,
            NoticeKind::Success => self.positive,
            NoticeKind::Error => self.negative,
        }
    }

    /// Verdict colours for strategy compliance checks.
    pub fn verdict_color(&self, verdict: &str) -> Color {
        match verdict {
            "YES" => self.positive,
            "NO" => self.negative,
            "PARTIAL" => self.warning,
            _ => self.text_secondary,
        }
    }
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn pnl(value: f64) -> Style {
    Style::default().fg(Theme::default().pnl_color(value))
}

pub fn selected() -> Style {
    Style::default()
        .bg(NEUTRAL)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}
