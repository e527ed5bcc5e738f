use queuedeck_core::{BadgeClass, Connectivity, IndicatorColor};
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct DeckTheme {
    pub bg: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub paused: Color,
    pub partial: Color,
}

pub fn deck_theme() -> DeckTheme {
    DeckTheme {
        bg: Color::Rgb(11, 18, 32),
        border: Color::Rgb(71, 85, 105),
        title: Color::Rgb(191, 219, 254),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(148, 163, 184),
        accent: Color::Rgb(56, 189, 248),
        ok: Color::Rgb(34, 197, 94),
        warn: Color::Rgb(245, 158, 11),
        critical: Color::Rgb(239, 68, 68),
        paused: Color::Rgb(192, 132, 252),
        partial: Color::Rgb(45, 212, 191),
    }
}

impl DeckTheme {
    pub fn badge(&self, class: BadgeClass) -> Style {
        let fg = match class {
            BadgeClass::Waiting | BadgeClass::Cancelled => self.muted,
            BadgeClass::Processing => self.warn,
            BadgeClass::Paused => self.paused,
            BadgeClass::PartiallyDone => self.partial,
            BadgeClass::Done => self.ok,
            BadgeClass::Failed => self.critical,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    /// Same hues as the web badges.
    pub fn server(&self, connectivity: Option<Connectivity>) -> Style {
        let fg = match connectivity {
            None => Color::Rgb(156, 163, 175),
            Some(Connectivity::Offline) => Color::Rgb(114, 76, 76),
            Some(Connectivity::Unauthorized) => Color::Rgb(192, 87, 5),
            Some(Connectivity::Error) => Color::Rgb(222, 39, 6),
            Some(Connectivity::Ok) => Color::Rgb(100, 116, 139),
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn indicator(&self, color: IndicatorColor) -> Style {
        let fg = match color {
            IndicatorColor::Idle => self.muted,
            IndicatorColor::Gray => Color::Rgb(213, 213, 213),
            IndicatorColor::Violet => Color::Rgb(139, 92, 246),
            IndicatorColor::Yellow => Color::Rgb(255, 242, 0),
            IndicatorColor::Green => Color::Rgb(0, 255, 0),
            IndicatorColor::Red => Color::Rgb(255, 0, 0),
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn block_title(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }
}
