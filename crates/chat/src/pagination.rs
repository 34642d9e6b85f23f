use crate::command::ServerCommand;
use crate::config::ChatConfig;
use crate::patterns::{HeaderKind, LineKind, PatternTable};
use crate::Result;

const PAGE: &str = r"^Page (?P<current>\d+)/(?P<total>\d+)$";

pub(crate) fn register_patterns(table: &mut PatternTable) -> Result<()> {
    table.register(LineKind::Page, PAGE)?;
    for header in HeaderKind::ALL {
        table.register(LineKind::Header(header), header.pattern())?;
    }
    Ok(())
}

/// Tracks the page position of the result set currently being received.
///
/// `Page n/m` is sent before a page's results, so the continuation decision
/// is made when the next result line arrives, not on the page line itself.
/// Both counters are zero when no pageable session is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageController {
    current_page: u32,
    page_count: u32,
}

impl PageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a `Page current/total` line. A result set with more pages than
    /// the configured cap ends the session.
    pub fn on_page(&mut self, current: u32, total: u32, config: &ChatConfig) {
        if total <= config.max_auto_pages {
            self.current_page = current;
            self.page_count = total;
        } else {
            log::debug!("not auto-paging {total} pages (cap {})", config.max_auto_pages);
            self.reset();
        }
    }

    /// Any header starts a new result set.
    pub fn on_header(&mut self) {
        self.reset();
    }

    /// Called after a result line is parsed. Returns the request for the
    /// following page at most once per page line.
    pub fn next_page(&mut self, config: &ChatConfig) -> Option<ServerCommand> {
        if config.auto_page
            && self.current_page > 0
            && self.current_page < self.page_count
            && self.page_count <= config.max_auto_pages
        {
            let next = self.current_page + 1;
            self.reset();
            Some(ServerCommand::Page(next))
        } else {
            None
        }
    }

    /// `(current_page, page_count)`
    pub fn session(&self) -> (u32, u32) {
        (self.current_page, self.page_count)
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.page_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn requests_following_page_once() {
        let config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(1, 3, &config);
        assert_eq!(pages.next_page(&config), Some(ServerCommand::Page(2)));
        assert_eq!(pages.next_page(&config), None);
        assert_eq!(pages.session(), (0, 0));
    }

    #[test]
    fn last_page_requests_nothing() {
        let config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(3, 3, &config);
        assert_eq!(pages.next_page(&config), None);
    }

    #[test]
    fn too_many_pages_are_ignored() {
        let config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(1, 4, &config);
        assert_eq!(pages.session(), (0, 0));
        assert_eq!(pages.next_page(&config), None);
    }

    #[test]
    fn over_cap_page_ends_open_session() {
        let config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(1, 2, &config);
        pages.on_page(1, 5, &config);
        assert_eq!(pages.session(), (0, 0));
        assert_eq!(pages.next_page(&config), None);
    }

    #[test]
    fn header_ends_session() {
        let config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(1, 2, &config);
        pages.on_header();
        assert_eq!(pages.next_page(&config), None);
    }

    #[test]
    fn auto_page_off_keeps_session() {
        let config = ChatConfig {
            auto_page: false,
            ..ChatConfig::default()
        };
        let mut pages = PageController::new();
        pages.on_page(1, 2, &config);
        assert_eq!(pages.next_page(&config), None);
        assert_eq!(pages.session(), (1, 2));
    }

    #[test]
    fn lowered_cap_applies_to_open_session() {
        let mut config = ChatConfig::default();
        let mut pages = PageController::new();
        pages.on_page(1, 3, &config);
        config.max_auto_pages = 2;
        assert_eq!(pages.next_page(&config), None);
    }
}
