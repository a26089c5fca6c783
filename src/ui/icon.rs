// Icon set.
// A closed set of symbolic icons, each rendered as a terminal glyph.

use ratatui::style::Style;
use ratatui::text::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Search,
    Moon,
    Sun,
    Close,
    Bookmark,
    Mail,
    AlertTriangle,
    Refresh,
    ExternalLink,
    User,
    MapPin,
    Globe,
    Edit,
    FileText,
    Save,
    Info,
    AlertCircle,
    Check,
    HelpCircle,
    Filter,
    TrendingUp,
}

impl Icon {
    #[cfg(test)]
    pub const ALL: [Icon; 21] = [
        Icon::Search,
        Icon::Moon,
        Icon::Sun,
        Icon::Close,
        Icon::Bookmark,
        Icon::Mail,
        Icon::AlertTriangle,
        Icon::Refresh,
        Icon::ExternalLink,
        Icon::User,
        Icon::MapPin,
        Icon::Globe,
        Icon::Edit,
        Icon::FileText,
        Icon::Save,
        Icon::Info,
        Icon::AlertCircle,
        Icon::Check,
        Icon::HelpCircle,
        Icon::Filter,
        Icon::TrendingUp,
    ];

    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Search => "⌕",
            Icon::Moon => "☾",
            Icon::Sun => "☀",
            Icon::Close => "✕",
            Icon::Bookmark => "★",
            Icon::Mail => "✉",
            Icon::AlertTriangle => "⚠",
            Icon::Refresh => "↻",
            Icon::ExternalLink => "↗",
            Icon::User => "☺",
            Icon::MapPin => "⌖",
            Icon::Globe => "◍",
            Icon::Edit => "✎",
            Icon::FileText => "▤",
            Icon::Save => "⎙",
            Icon::Info => "ℹ",
            Icon::AlertCircle => "⊘",
            Icon::Check => "✓",
            Icon::HelpCircle => "⍰",
            Icon::Filter => "⧩",
            Icon::TrendingUp => "▲",
        }
    }

    /// Glyph followed by a space, ready to prefix a label.
    pub fn span(&self, style: Style) -> Span<'static> {
        Span::styled(format!("{} ", self.glyph()), style)
    }
}
