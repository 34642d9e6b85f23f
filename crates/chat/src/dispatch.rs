use crate::clock::{Clock, SystemClock};
use crate::colour::ColourCycle;
use crate::command::{CommandSink, ServerCommand};
use crate::config::ChatConfig;
use crate::echo::Echo;
use crate::pagination::PageController;
use crate::patterns::{strip_formatting, LineKind, PatternTable};
use crate::query_results::{self, QueryResult};
use crate::region_info::RegionInfoIssuer;
use crate::Result;
use lbtrace_edit_store::{BlockTypeRegistry, EditDb};
use regex::Captures;
use std::sync::Arc;

/// Counters for the lines seen by one dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Lines passed to `dispatch`
    pub lines: usize,

    /// Lines that matched no pattern
    pub unmatched: usize,

    /// Results stored as new edits
    pub edits: usize,

    /// Results already present in the store
    pub duplicates: usize,

    /// Matched lines whose fields could not be decoded
    pub malformed: usize,

    /// `/lb page` requests sent
    pub continuations: usize,

    /// `/region info` requests sent
    pub region_queries: usize,
}

/// What the dispatcher made of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    /// Matched kind, `None` for ordinary chat
    pub kind: Option<LineKind>,
    pub echo: Echo,
}

impl ChatOutcome {
    fn verbatim(kind: Option<LineKind>) -> Self {
        Self {
            kind,
            echo: Echo::Verbatim,
        }
    }
}

/// Single entry point for received chat lines.
///
/// Each line is matched against the pattern table and handed to exactly one
/// handler. Pagination and rate limiting state live here, so a dispatcher
/// serves one connection; several dispatchers may share one `EditDb`.
pub struct ChatDispatcher {
    patterns: PatternTable,
    config: ChatConfig,
    registry: Arc<BlockTypeRegistry>,
    edits: Arc<EditDb>,
    sink: Arc<dyn CommandSink>,
    clock: Arc<dyn Clock>,
    colours: ColourCycle,
    pages: PageController,
    region_info: RegionInfoIssuer,
    stats: DispatchStats,
}

impl ChatDispatcher {
    pub fn new(
        config: ChatConfig,
        registry: Arc<BlockTypeRegistry>,
        edits: Arc<EditDb>,
        sink: Arc<dyn CommandSink>,
    ) -> Result<Self> {
        Ok(Self {
            patterns: PatternTable::logblock()?,
            config,
            registry,
            edits,
            sink,
            clock: Arc::new(SystemClock),
            colours: ColourCycle::new(),
            pages: PageController::new(),
            region_info: RegionInfoIssuer::new(),
            stats: DispatchStats::default(),
        })
    }

    /// Replace the wall clock, e.g. with a `ManualClock` in tests or replays.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn edits(&self) -> &Arc<EditDb> {
        &self.edits
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn page_session(&self) -> (u32, u32) {
        self.pages.session()
    }

    pub fn dispatch(&mut self, line: &str) -> ChatOutcome {
        self.stats.lines += 1;
        let plain = strip_formatting(line);
        let Some((kind, caps)) = self.patterns.classify(&plain) else {
            self.stats.unmatched += 1;
            return ChatOutcome::verbatim(None);
        };
        log::debug!("{kind}: {plain}");

        match kind {
            LineKind::Coords | LineKind::KillCoords | LineKind::ReplacedCoords => {
                self.on_query_result(kind, &caps, &plain)
            }
            LineKind::Page => self.on_page(&caps),
            LineKind::Header(_) => {
                self.pages.on_header();
                ChatOutcome::verbatim(Some(kind))
            }
            LineKind::ApplicableRegions => self.on_regions(&caps),
        }
    }

    fn on_query_result(&mut self, kind: LineKind, caps: &Captures<'_>, plain: &str) -> ChatOutcome {
        let year = self.clock.current_year();
        let result = match query_results::parse(kind, caps, &self.registry, year) {
            Ok(result) => result,
            Err(err) => {
                log::info!("{err}");
                self.stats.malformed += 1;
                return ChatOutcome::verbatim(Some(kind));
            }
        };

        let echo = self.store_result(&result, plain);
        if let Some(command) = self.pages.next_page(&self.config) {
            log::info!("requesting next page: {command}");
            self.stats.continuations += 1;
            self.send(command);
        }
        ChatOutcome {
            kind: Some(kind),
            echo,
        }
    }

    fn store_result(&mut self, result: &QueryResult, plain: &str) -> Echo {
        if self.edits.insert(result.edit.clone()) {
            self.stats.edits += 1;
        } else {
            self.stats.duplicates += 1;
        }
        let (x, y, z) = result.edit.position();
        let colour = self.colours.next_colour(x, y, z);
        result.echo(&self.config, colour, plain)
    }

    fn on_page(&mut self, caps: &Captures<'_>) -> ChatOutcome {
        let current = caps.name("current").and_then(|m| m.as_str().parse().ok());
        let total = caps.name("total").and_then(|m| m.as_str().parse().ok());
        match (current, total) {
            (Some(current), Some(total)) => self.pages.on_page(current, total, &self.config),
            _ => {
                log::info!("unreadable page numbers; ending page session");
                self.pages.reset();
            }
        }
        ChatOutcome::verbatim(Some(LineKind::Page))
    }

    fn on_regions(&mut self, caps: &Captures<'_>) -> ChatOutcome {
        let list = caps.name("regions").map_or("", |m| m.as_str());
        let now = self.clock.now_millis();
        let commands = self.region_info.on_regions(list, now, &self.config);
        if !commands.is_empty() {
            log::info!("requesting info for {} region(s)", commands.len());
        }
        for command in commands {
            self.stats.region_queries += 1;
            self.send(command);
        }
        ChatOutcome::verbatim(Some(LineKind::ApplicableRegions))
    }

    fn send(&self, command: ServerCommand) {
        self.sink.send(command);
    }
}

impl std::fmt::Debug for ChatDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDispatcher")
            .field("config", &self.config)
            .field("pages", &self.pages)
            .field("region_info", &self.region_info)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
