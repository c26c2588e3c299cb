use crate::dom::fragment::{assign_section_id, normalize_section};
use crate::dom::parse::parse_fragment;
use crate::dom::{Document, Fragment, NodeId};
use crate::error::FolioError;
use crate::fetch::{load_json, load_text, Fetch};
use crate::models::section::{parse_section_list, SectionItem, SectionSource};

/// Lifecycle of one configured section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Pending,
    Loading,
    Inserted,
    Skipped,
    Failed,
}

impl SectionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Loading => "loading",
            Self::Inserted => "inserted",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome {
    pub label: String,
    pub state: SectionState,
    pub error: Option<FolioError>,
}

/// Builds the page skeleton from the sections configuration.
pub struct SectionComposer<'a> {
    fetcher: &'a dyn Fetch,
    host: NodeId,
    src: String,
}

impl<'a> SectionComposer<'a> {
    pub fn new(fetcher: &'a dyn Fetch, host: NodeId, src: &str) -> Self {
        SectionComposer {
            fetcher,
            host,
            src: src.to_string(),
        }
    }

    /// Load the configuration document and compose every entry, then hand the
    /// host to `on_stable` so widgets can look for their mount points.
    /// A configuration that cannot be loaded composes nothing.
    pub fn load<F>(&self, doc: &mut Document, on_stable: F) -> Vec<SectionOutcome>
    where
        F: FnOnce(&mut Document, NodeId),
    {
        let outcomes = match load_json(self.fetcher, &self.src) {
            Ok(value) => self.compose(doc, &parse_section_list(&value)),
            Err(e) => {
                log::warn!("[sections] cannot load configuration {}: {}", self.src, e);
                Vec::new()
            }
        };
        on_stable(doc, self.host);
        outcomes
    }

    /// Compose `items` into the host strictly in order; each item finishes
    /// before the next one starts, and a failing item never stops the rest.
    pub fn compose(&self, doc: &mut Document, items: &[SectionItem]) -> Vec<SectionOutcome> {
        let outcomes: Vec<SectionOutcome> = items.iter().map(|item| self.insert_section(doc, item)).collect();
        let inserted = outcomes
            .iter()
            .filter(|o| o.state == SectionState::Inserted)
            .count();
        log::info!(
            "[sections] composed {} of {} section(s) from {}",
            inserted,
            outcomes.len(),
            self.src
        );
        outcomes
    }

    fn insert_section(&self, doc: &mut Document, item: &SectionItem) -> SectionOutcome {
        let label = item.label();
        let mut state = SectionState::Pending;

        let Some(source) = item.source() else {
            log::warn!("[sections] skip item without src/template/html: {}", label);
            return SectionOutcome {
                label,
                state: SectionState::Skipped,
                error: Some(FolioError::Configuration(
                    "section has no src, template or html".into(),
                )),
            };
        };

        transition(&label, &mut state, SectionState::Loading);
        match self.resolve(doc, item, source) {
            Ok(frag) => {
                frag.append_to(doc, self.host);
                transition(&label, &mut state, SectionState::Inserted);
                SectionOutcome {
                    label,
                    state,
                    error: None,
                }
            }
            Err(e) => {
                log::warn!("[sections] failed to load {}: {}", label, e);
                transition(&label, &mut state, SectionState::Failed);
                SectionOutcome {
                    label,
                    state,
                    error: Some(e),
                }
            }
        }
    }

    fn resolve(
        &self,
        doc: &mut Document,
        item: &SectionItem,
        source: SectionSource<'_>,
    ) -> Result<Fragment, FolioError> {
        let frag = match source {
            SectionSource::Fragment(url) => {
                let html = load_text(self.fetcher, url)?;
                let frag = parse_fragment(doc, &html);
                // Full fragments are trusted to be well formed; only the id is filled in.
                assign_section_id(doc, &frag, item.id());
                frag
            }
            SectionSource::Template(url) => {
                let html = load_text(self.fetcher, url)?;
                let frag = parse_fragment(doc, &html);
                normalize_section(doc, &frag, item.id());
                frag
            }
            SectionSource::Inline(html) => {
                let frag = parse_fragment(doc, html);
                normalize_section(doc, &frag, item.id());
                frag
            }
        };
        Ok(frag)
    }
}

fn transition(label: &str, state: &mut SectionState, next: SectionState) {
    log::debug!("[sections] {}: {} -> {}", label, state.name(), next.name());
    *state = next;
}
