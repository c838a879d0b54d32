use eframe::egui::{self, Color32, CornerRadius, Frame, Margin, Shadow, Stroke, Vec2, Visuals};
use toolflow_core::PortKind;
use toolflow_engine::NotificationLevel;

// =============================================================================
// Color Palette
// =============================================================================

pub const BG_DARK: Color32 = Color32::from_rgb(26, 26, 26); // #1a1a1a - main canvas
pub const BG_PANEL: Color32 = Color32::from_rgb(36, 36, 36); // #242424 - panels
pub const BG_HEADER: Color32 = Color32::from_rgb(45, 45, 45); // #2d2d2d - headers
pub const BG_HOVER: Color32 = Color32::from_rgb(55, 55, 55);
pub const BG_ACTIVE: Color32 = Color32::from_rgb(65, 65, 65);

pub const ACCENT_CORAL: Color32 = Color32::from_rgb(255, 109, 90); // primary buttons
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(80, 200, 120); // success / completed steps
pub const ACCENT_BLUE: Color32 = Color32::from_rgb(76, 158, 232); // info / links
pub const ACCENT_AMBER: Color32 = Color32::from_rgb(236, 178, 64); // warnings
pub const ACCENT_RED: Color32 = Color32::from_rgb(220, 90, 90); // field errors

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(240, 240, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(160, 160, 160);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(100, 100, 100);

pub const BORDER_DARK: Color32 = Color32::from_rgb(50, 50, 50);
pub const BORDER_LIGHT: Color32 = Color32::from_rgb(70, 70, 70);

pub fn port_color(kind: PortKind) -> Color32 {
    match kind {
        PortKind::Text => Color32::from_rgb(76, 158, 232),
        PortKind::Number => Color32::from_rgb(150, 120, 230),
        PortKind::Boolean => Color32::from_rgb(230, 120, 180),
        PortKind::Image => Color32::from_rgb(80, 200, 120),
        PortKind::Audio => Color32::from_rgb(236, 178, 64),
        PortKind::Video => Color32::from_rgb(255, 109, 90),
        PortKind::File => Color32::from_rgb(160, 160, 160),
        PortKind::Json => Color32::from_rgb(90, 200, 200),
        PortKind::Any => TEXT_PRIMARY,
    }
}

pub fn notification_color(level: NotificationLevel) -> Color32 {
    match level {
        NotificationLevel::Success => ACCENT_GREEN,
        NotificationLevel::Info => ACCENT_BLUE,
        NotificationLevel::Warning => ACCENT_AMBER,
        NotificationLevel::Error => ACCENT_RED,
    }
}

// =============================================================================
// Theme Application
// =============================================================================

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.visuals = Visuals::dark();

    style.visuals.window_fill = BG_PANEL;
    style.visuals.panel_fill = BG_PANEL;
    style.visuals.extreme_bg_color = BG_DARK;
    style.visuals.faint_bg_color = Color32::from_rgb(40, 40, 40);
    style.visuals.code_bg_color = BG_DARK;
    style.visuals.hyperlink_color = ACCENT_BLUE;

    style.visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    style.visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_DARK);

    style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(50, 50, 50);
    style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_DARK);

    style.visuals.widgets.hovered.bg_fill = BG_HOVER;
    style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, BORDER_LIGHT);

    style.visuals.widgets.active.bg_fill = BG_ACTIVE;
    style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT_CORAL);

    style.visuals.selection.bg_fill = Color32::from_rgba_unmultiplied(255, 109, 90, 60);
    style.visuals.selection.stroke = Stroke::new(1.0, ACCENT_CORAL);

    style.visuals.window_corner_radius = CornerRadius::same(8);
    style.visuals.window_shadow = Shadow::NONE;

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.button_padding = Vec2::new(12.0, 6.0);
    style.spacing.window_margin = Margin::same(12);

    ctx.set_style(style);
}

// =============================================================================
// Panel Frames
// =============================================================================

pub fn header_frame() -> Frame {
    Frame {
        fill: BG_HEADER,
        stroke: Stroke::new(1.0, BORDER_DARK),
        inner_margin: Margin::symmetric(16, 12),
        outer_margin: Margin::ZERO,
        corner_radius: CornerRadius::ZERO,
        shadow: Shadow::NONE,
    }
}

pub fn footer_frame() -> Frame {
    Frame {
        fill: BG_PANEL,
        stroke: Stroke::new(1.0, BORDER_DARK),
        inner_margin: Margin::symmetric(16, 10),
        outer_margin: Margin::ZERO,
        corner_radius: CornerRadius::ZERO,
        shadow: Shadow::NONE,
    }
}

pub fn content_frame() -> Frame {
    Frame {
        fill: BG_DARK,
        stroke: Stroke::NONE,
        inner_margin: Margin::symmetric(32, 24),
        outer_margin: Margin::ZERO,
        corner_radius: CornerRadius::ZERO,
        shadow: Shadow::NONE,
    }
}

/// Rounded card used for dashboard tiles, templates and graph nodes.
pub fn card_frame(highlighted: bool) -> Frame {
    Frame {
        fill: BG_PANEL,
        stroke: Stroke::new(1.0, if highlighted { ACCENT_CORAL } else { BORDER_LIGHT }),
        inner_margin: Margin::same(12),
        outer_margin: Margin::ZERO,
        corner_radius: CornerRadius::same(8),
        shadow: Shadow::NONE,
    }
}

pub fn toast_frame(level: NotificationLevel) -> Frame {
    Frame {
        fill: BG_HEADER,
        stroke: Stroke::new(1.0, notification_color(level)),
        inner_margin: Margin::symmetric(14, 10),
        outer_margin: Margin::ZERO,
        corner_radius: CornerRadius::same(8),
        shadow: Shadow {
            offset: [0, 4],
            blur: 12,
            spread: 0,
            color: Color32::from_black_alpha(80),
        },
    }
}
