//! Navigation controls and page indicator.

use crate::session::FlipbookSession;
use std::fmt::Write;

/// A navigation button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Previous,
    First,
    Next,
    Last,
    Fullscreen,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::Previous,
        Control::First,
        Control::Next,
        Control::Last,
        Control::Fullscreen,
    ];

    pub fn css_class(&self) -> &'static str {
        match self {
            Control::Previous => "flipbook-prev",
            Control::First => "flipbook-first",
            Control::Next => "flipbook-next",
            Control::Last => "flipbook-last",
            Control::Fullscreen => "flipbook-fullscreen",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Control::Previous => "Previous page",
            Control::First => "First page",
            Control::Next => "Next page",
            Control::Last => "Last page",
            Control::Fullscreen => "Fullscreen",
        }
    }

    fn button_class(&self) -> &'static str {
        match self {
            Control::Previous | Control::Next => "btn btn-primary",
            Control::First | Control::Last => "btn btn-secondary",
            Control::Fullscreen => "btn btn-info",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Control::Previous => "fa-chevron-left",
            Control::First => "fa-fast-backward",
            Control::Next => "fa-chevron-right",
            Control::Last => "fa-fast-forward",
            Control::Fullscreen => "fa-expand",
        }
    }
}

/// The single controller operation a control dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Previous,
    Next,
    GotoPage(usize),
    ToggleFullscreen,
}

/// Control bar bound to a session's page counters.
#[derive(Debug, Clone)]
pub struct NavigationOverlay {
    current_page: usize,
    total_pages: usize,
    renders: usize,
}

impl NavigationOverlay {
    pub fn new(session: &FlipbookSession) -> Self {
        let mut overlay = Self {
            current_page: 0,
            total_pages: 0,
            renders: 0,
        };
        overlay.refresh(session);
        overlay
    }

    pub fn action(&self, control: Control) -> NavAction {
        match control {
            Control::Previous => NavAction::Previous,
            Control::Next => NavAction::Next,
            Control::First => NavAction::GotoPage(1),
            Control::Last => NavAction::GotoPage(self.total_pages),
            Control::Fullscreen => NavAction::ToggleFullscreen,
        }
    }

    /// Re-render the page indicator from `session`.
    pub fn refresh(&mut self, session: &FlipbookSession) {
        self.current_page = session.current_page;
        self.total_pages = session.total_pages;
        self.renders += 1;
    }

    /// Number of indicator renders so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn indicator(&self) -> (usize, usize) {
        (self.current_page, self.total_pages)
    }

    pub fn indicator_text(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }

    /// Control bar markup: prev, first, indicator, last, next, fullscreen.
    pub fn render_html(&self) -> String {
        let mut html = String::from("<div class=\"flipbook-controls\">");

        let button = |html: &mut String, control: Control| {
            let _ = write!(
                html,
                "<button class=\"{} {}\" title=\"{}\"><i class=\"fa {}\"></i></button>",
                control.button_class(),
                control.css_class(),
                control.title(),
                control.icon()
            );
        };

        button(&mut html, Control::Previous);
        button(&mut html, Control::First);
        let _ = write!(
            html,
            "<span class=\"flipbook-page-info\">Page <span class=\"current-page\">{}</span> \
             of <span class=\"total-pages\">{}</span></span>",
            self.current_page, self.total_pages
        );
        button(&mut html, Control::Last);
        button(&mut html, Control::Next);
        button(&mut html, Control::Fullscreen);

        html.push_str("</div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(current: usize, total: usize) -> FlipbookSession {
        FlipbookSession {
            current_page: current,
            total_pages: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_each_control_maps_to_one_action() {
        let overlay = NavigationOverlay::new(&session(2, 9));
        assert_eq!(overlay.action(Control::Previous), NavAction::Previous);
        assert_eq!(overlay.action(Control::Next), NavAction::Next);
        assert_eq!(overlay.action(Control::First), NavAction::GotoPage(1));
        assert_eq!(overlay.action(Control::Last), NavAction::GotoPage(9));
        assert_eq!(
            overlay.action(Control::Fullscreen),
            NavAction::ToggleFullscreen
        );
    }

    #[test]
    fn test_refresh_updates_indicator() {
        let mut overlay = NavigationOverlay::new(&session(1, 4));
        assert_eq!(overlay.render_count(), 1);

        overlay.refresh(&session(3, 4));
        assert_eq!(overlay.indicator(), (3, 4));
        assert_eq!(overlay.indicator_text(), "Page 3 of 4");
        assert_eq!(overlay.render_count(), 2);
    }

    #[test]
    fn test_render_html_has_all_controls() {
        let html = NavigationOverlay::new(&session(5, 12)).render_html();
        for control in Control::ALL {
            assert!(html.contains(control.css_class()), "{:?}", control);
        }
        assert!(html.contains("<span class=\"current-page\">5</span>"));
        assert!(html.contains("<span class=\"total-pages\">12</span>"));

        let prev = html.find("flipbook-prev").unwrap();
        let info = html.find("flipbook-page-info").unwrap();
        let next = html.find("flipbook-next").unwrap();
        assert!(prev < info && info < next);
    }
}
