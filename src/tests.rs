#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use serde_json::json;

use crate::cards::{CardOptions, CARD_CLASS, TRIGGER_CLASS};
use crate::config::FolioConfig;
use crate::dom::fragment::CONTAINER_CLASS;
use crate::dom::parse::parse_fragment;
use crate::dom::{Document, NodeId};
use crate::error::FolioError;
use crate::fetch::Fetch;
use crate::gallery::{self, GalleryLoader, GalleryTarget};
use crate::models::section::parse_section_list;
use crate::modal::input::{Action, Key};
use crate::page::{document_from_html, Page};
use crate::sections::{SectionComposer, SectionState};

/// In-memory site. Each entry can carry a delay so tests can make responses
/// complete out of request order.
#[derive(Default)]
struct MapFetcher {
    files: HashMap<String, (String, u64)>,
    requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn with(mut self, url: &str, body: &str) -> Self {
        self.files.insert(url.to_string(), (body.to_string(), 0));
        self
    }

    fn slow(mut self, url: &str, body: &str, delay_ms: u64) -> Self {
        self.files.insert(url.to_string(), (body.to_string(), delay_ms));
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetch for MapFetcher {
    fn fetch(&self, url: &str, _content_type: &str) -> Result<String, FolioError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.files.get(url) {
            Some((body, delay)) => {
                if *delay > 0 {
                    thread::sleep(Duration::from_millis(*delay));
                }
                Ok(body.clone())
            }
            None => Err(FolioError::load(url, "status 404")),
        }
    }
}

/// A document whose body holds `html`.
fn doc_with(html: &str) -> Document {
    let mut doc = Document::new();
    let frag = parse_fragment(&mut doc, html);
    let body = doc.body();
    frag.append_to(&mut doc, body);
    doc
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(id).unwrap()
}

fn section_ids(doc: &Document, host: NodeId) -> Vec<String> {
    doc.find_all(host, |el| el.tag() == "section")
        .into_iter()
        .map(|s| doc.attr(s, "id").unwrap_or("").to_string())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════

#[test]
fn sections_keep_configured_order_despite_latency() {
    let fetcher = MapFetcher::new()
        .with(
            "data/sections.json",
            r#"[
                {"id": "hero", "src": "sections/hero.html"},
                {"id": "about", "template": "sections/about.html"},
                {"id": "contact", "html": "<section><p>Say hi</p></section>"}
            ]"#,
        )
        .slow("sections/hero.html", r#"<section class="hero"><div class="container">Hi</div></section>"#, 120)
        .with("sections/about.html", "<section><h2>About</h2></section>");

    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let composer = SectionComposer::new(&fetcher, host, "data/sections.json");
    let outcomes = composer.load(&mut doc, |_, _| {});

    assert_eq!(section_ids(&doc, host), vec!["hero", "about", "contact"]);
    assert!(outcomes.iter().all(|o| o.state == SectionState::Inserted));
    assert_eq!(
        fetcher.requests(),
        vec!["data/sections.json", "sections/hero.html", "sections/about.html"]
    );
}

#[test]
fn sections_template_gets_one_container() {
    let fetcher = MapFetcher::new().with(
        "skills.html",
        "<section><h2>Skills</h2><ul><li>Rust</li></ul></section>",
    );
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let items = parse_section_list(&json!([{"id": "skills", "template": "skills.html"}]));
    SectionComposer::new(&fetcher, host, "inline").compose(&mut doc, &items);

    let sec = by_id(&doc, "skills");
    let kids = doc.element_children(sec);
    assert_eq!(kids.len(), 1);
    assert!(doc.has_class(kids[0], CONTAINER_CLASS));
    assert!(doc.find_by_tag(kids[0], "h2").is_some());
}

#[test]
fn sections_src_keeps_existing_id_and_structure() {
    let fetcher = MapFetcher::new().with("a.html", r#"<section id="own"><h2>A</h2></section>"#);
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let items = parse_section_list(&json!([{"id": "other", "src": "a.html"}]));
    SectionComposer::new(&fetcher, host, "inline").compose(&mut doc, &items);

    let sec = by_id(&doc, "own");
    assert!(doc.get_element_by_id("other").is_none());
    assert!(doc.find_by_class(sec, CONTAINER_CLASS).is_none());
}

#[test]
fn sections_item_without_source_is_skipped() {
    let fetcher = MapFetcher::new();
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let items = parse_section_list(&json!([{"id": "ghost"}, 42]));
    let outcomes = SectionComposer::new(&fetcher, host, "inline").compose(&mut doc, &items);

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.state == SectionState::Skipped));
    assert!(matches!(outcomes[0].error, Some(FolioError::Configuration(_))));
    assert!(doc.children(host).is_empty());
    assert!(fetcher.requests().is_empty());
}

#[test]
fn sections_failure_does_not_stop_later_items() {
    let fetcher = MapFetcher::new().with("b.html", r#"<section id="b"></section>"#);
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let items = parse_section_list(&json!([{"src": "missing.html"}, {"src": "b.html"}]));
    let outcomes = SectionComposer::new(&fetcher, host, "inline").compose(&mut doc, &items);

    assert_eq!(outcomes[0].state, SectionState::Failed);
    assert_eq!(outcomes[0].label, "missing.html");
    match &outcomes[0].error {
        Some(FolioError::Load { url, reason }) => {
            assert_eq!(url, "missing.html");
            assert!(reason.contains("404"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(outcomes[1].state, SectionState::Inserted);
    assert_eq!(section_ids(&doc, host), vec!["b"]);
}

#[test]
fn sections_accept_wrapped_configuration() {
    let fetcher = MapFetcher::new().with(
        "cfg.json",
        r#"{"sections": [{"id": "one", "html": "<section>1</section>"}]}"#,
    );
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let outcomes = SectionComposer::new(&fetcher, host, "cfg.json").load(&mut doc, |_, _| {});

    assert_eq!(outcomes.len(), 1);
    assert_eq!(section_ids(&doc, host), vec!["one"]);
}

#[test]
fn sections_signal_stable_even_when_configuration_fails() {
    let fetcher = MapFetcher::new().with("cfg.json", "{ not json");
    let mut doc = doc_with(r#"<main id="app-main"></main>"#);
    let host = by_id(&doc, "app-main");
    let mut signalled = None;
    let outcomes = SectionComposer::new(&fetcher, host, "cfg.json").load(&mut doc, |_, h| signalled = Some(h));

    assert!(outcomes.is_empty());
    assert_eq!(signalled, Some(host));
}

// ═══════════════════════════════════════════════════════════
// Gallery
// ═══════════════════════════════════════════════════════════

fn cards_in(doc: &Document, container: NodeId) -> Vec<NodeId> {
    doc.element_children(container)
        .into_iter()
        .filter(|c| doc.has_class(*c, CARD_CLASS))
        .collect()
}

#[test]
fn gallery_renders_name_and_description() {
    let fetcher = MapFetcher::new().with(
        "p.json",
        r#"[{"name": "Lumen", "description": "A tiny renderer", "skills": ["Rust"]}]"#,
    );
    let opts = CardOptions::default();
    let mut doc = doc_with(r#"<div id="g"></div>"#);
    let g = by_id(&doc, "g");
    let rendered = GalleryLoader::new(&fetcher, &opts).load_and_render(&mut doc, g, "p.json").unwrap();

    assert_eq!(rendered.len(), 1);
    let card = rendered[0].card;
    let h3 = doc.find_by_tag(card, "h3").unwrap();
    assert_eq!(doc.text_content(h3), "Lumen");
    let p = doc.find_by_tag(card, "p").unwrap();
    assert!(doc.text_content(p).starts_with("A tiny renderer"));
    let img = doc.find_by_tag(card, "img").unwrap();
    assert_eq!(doc.attr(img, "src"), Some("assets/Wow-gif.gif"));
    assert_eq!(doc.attr(img, "alt"), Some("Lumen"));
}

#[test]
fn gallery_applies_styles_and_tag_filter() {
    let fetcher = MapFetcher::new().with(
        "p.json",
        r##"{
            "widgetStyles": {"--card-bg": "#111", "--bad": 3},
            "projects": [
                {"title": "A", "tags": ["Web"]},
                {"title": "B", "tags": ["cli"]},
                {"title": "C", "tags": ["web", "cli"]}
            ]
        }"##,
    );
    let opts = CardOptions::default();
    let mut doc = doc_with(r#"<div id="g" data-projects-tag="web"></div>"#);
    let g = by_id(&doc, "g");
    let rendered = GalleryLoader::new(&fetcher, &opts).load_and_render(&mut doc, g, "p.json").unwrap();

    let titles: Vec<_> = rendered.iter().map(|r| r.record.display_title().to_string()).collect();
    assert_eq!(titles, vec!["A", "C"]);
    assert_eq!(doc.style_property(g, "--card-bg").as_deref(), Some("#111"));
    assert_eq!(doc.style_property(g, "--bad"), None);
    assert_eq!(cards_in(&doc, g).len(), 2);
}

#[test]
fn gallery_load_error_reports_url() {
    let fetcher = MapFetcher::new().with("bad.json", "[1,");
    let opts = CardOptions::default();
    let mut doc = doc_with(r#"<div id="g"></div>"#);
    let g = by_id(&doc, "g");
    let err = GalleryLoader::new(&fetcher, &opts)
        .load_and_render(&mut doc, g, "bad.json")
        .unwrap_err();
    assert!(matches!(err, FolioError::Load { ref url, .. } if url == "bad.json"));
    assert!(cards_in(&doc, g).is_empty());
}

#[test]
fn gallery_init_auto_isolates_failures_and_renders_in_completion_order() {
    let fetcher = MapFetcher::new()
        .slow("slow.json", r#"[{"title": "Slow"}]"#, 150)
        .with("fast.json", r#"[{"title": "Fast"}]"#);
    let opts = CardOptions::default();
    let mut doc = doc_with(
        r#"<div id="a" data-projects-src="slow.json"></div>
<div id="b" data-projects-src="missing.json"></div>
<div id="c" data-projects-src="fast.json"></div>"#,
    );
    let targets = gallery::discover(&doc, "project-gallery-json", "data/projects.json");
    assert_eq!(targets.len(), 3);

    let rendered = GalleryLoader::new(&fetcher, &opts).init_auto(&mut doc, &targets);
    let titles: Vec<_> = rendered.iter().map(|r| r.record.display_title().to_string()).collect();
    assert_eq!(titles, vec!["Fast", "Slow"]);
    assert_eq!(cards_in(&doc, by_id(&doc, "a")).len(), 1);
    assert!(cards_in(&doc, by_id(&doc, "b")).is_empty());
    assert_eq!(cards_in(&doc, by_id(&doc, "c")).len(), 1);
}

#[test]
fn gallery_discovers_legacy_container_once() {
    let doc = doc_with(
        r#"<div id="project-gallery-json"></div>
<div id="tagged" data-projects-src="data/other.json"></div>
<div id="project-gallery-json-2" data-projects-src=" "></div>"#,
    );
    let targets = gallery::discover(&doc, "project-gallery-json", "data/projects.json");
    assert_eq!(
        targets,
        vec![
            GalleryTarget {
                container: by_id(&doc, "project-gallery-json"),
                url: "data/projects.json".into(),
            },
            GalleryTarget {
                container: by_id(&doc, "tagged"),
                url: "data/other.json".into(),
            },
        ]
    );

    let doc = doc_with(r#"<div id="project-gallery-json" data-projects-src="mine.json"></div>"#);
    let targets = gallery::discover(&doc, "project-gallery-json", "data/projects.json");
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].url, "mine.json");
}

// ═══════════════════════════════════════════════════════════
// Page
// ═══════════════════════════════════════════════════════════

const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>Folio</title></head>
<body class="site">
  <main id="app-main" data-sections-src="data/layout.json"></main>
  <div id="project-modal" class="modal" hidden aria-hidden="true">
    <div class="modal__dialog">
      <button class="modal__close">x</button>
      <h2 id="project-modal-title"></h2>
      <time class="modal__time"></time>
      <button class="gallery__prev">prev</button>
      <div class="gallery__viewport"><div class="gallery__track"></div></div>
      <button class="gallery__next">next</button>
      <p class="gallery__caption"></p>
      <p class="modal__desc"></p>
      <div class="modal__skills"></div>
      <div class="modal__links"></div>
    </div>
  </div>
  <footer>&copy; <span id="y"></span></footer>
</body>
</html>"#;

fn site() -> MapFetcher {
    MapFetcher::new()
        .with(
            "data/layout.json",
            r#"[
                {"id": "intro", "html": "<section><h1>Hello</h1></section>"},
                {"id": "work", "template": "sections/work.html"}
            ]"#,
        )
        .with(
            "sections/work.html",
            r#"<section><h2>Work</h2><div class="gallery" data-projects-src="data/work.json"></div></section>"#,
        )
        .with(
            "data/work.json",
            r#"{"projects": [{
                "id": "orbit",
                "title": "Orbit",
                "summary": "Short",
                "description": "Long form",
                "images": [
                    {"src": "o1.png", "alt": "one"},
                    {"src": "o2.png", "alt": "two", "caption": "Second"}
                ],
                "links": [{"type": "github", "href": "https://github.com/x/orbit"}]
            }]}"#,
        )
}

#[test]
fn page_bootstrap_composes_everything() {
    let fetcher = site();
    let page = Page::bootstrap(document_from_html(INDEX), &fetcher, FolioConfig::default());
    let doc = &page.doc;

    assert_eq!(doc.attr(doc.body(), "class"), Some("site"));
    let year = doc.text_content(by_id(doc, "y"));
    assert_eq!(year.len(), 4);
    assert!(year.chars().all(|c| c.is_ascii_digit()));

    let host = by_id(doc, "app-main");
    assert_eq!(section_ids(doc, host), vec!["intro", "work"]);
    assert_eq!(page.sections.len(), 2);

    let cards = doc.find_all(doc.body(), |el| el.has_class(CARD_CLASS));
    assert_eq!(cards.len(), 1);
    assert_eq!(page.record_for(cards[0]).map(|r| r.display_title()), Some("Orbit"));
    assert!(page.modal().is_some());
    assert!(fetcher.requests().contains(&"data/work.json".to_string()));
}

#[test]
fn page_click_opens_and_navigates_modal() {
    let fetcher = site();
    let mut page = Page::bootstrap(document_from_html(INDEX), &fetcher, FolioConfig::default());
    let card = page.doc.find(page.doc.body(), |el| el.has_class(CARD_CLASS)).unwrap();
    let thumb = page.doc.find_by_tag(card, "img").unwrap();

    page.click(thumb, 0.0, 0.0);
    let modal = page.modal().unwrap();
    assert!(modal.is_open());
    let slots = modal.slots().clone();
    assert_eq!(page.doc.text_content(slots.title), "Orbit");
    assert_eq!(page.doc.text_content(slots.desc), "Long form");

    assert_eq!(page.click(slots.next.unwrap(), 0.0, 0.0), Action::Step(1));
    assert_eq!(page.doc.text_content(slots.desc), "Second");

    assert_eq!(page.click(slots.track, 10.0, 400.0), Action::Step(-1));
    assert_eq!(page.modal().unwrap().state().current_index, 0);

    assert_eq!(page.key(Key::Escape), Action::Close);
    assert!(!page.modal().unwrap().is_open());
    assert_eq!(page.key(Key::ArrowRight), Action::Ignore);
}

#[test]
fn page_opens_static_card_from_markup() {
    let opts = CardOptions::default();
    let record = serde_json::from_value(json!({
        "title": "Static",
        "description": "From the template",
        "images": [{"src": "s.png", "caption": "Cap"}]
    }))
    .unwrap();
    let mut scratch = Document::new();
    let card = crate::cards::render_card(&mut scratch, &record, &opts);
    let card_html = scratch.outer_html(card);
    let html = INDEX.replace(
        r#"<main id="app-main" data-sections-src="data/layout.json"></main>"#,
        &format!(r#"<main id="app-main" data-sections-src="none.json"></main>{}"#, card_html),
    );

    let fetcher = MapFetcher::new();
    let mut page = Page::bootstrap(document_from_html(&html), &fetcher, FolioConfig::default());
    let card = page.doc.find(page.doc.body(), |el| el.has_class(CARD_CLASS)).unwrap();
    assert!(page.record_for(card).is_none());

    let trigger = page.doc.find_by_class(card, TRIGGER_CLASS).unwrap();
    page.click(trigger, 0.0, 0.0);
    let modal = page.modal().unwrap();
    assert!(modal.is_open());
    assert_eq!(page.doc.text_content(modal.slots().title), "Static");
    // The only image has a caption, so it replaces the description.
    assert_eq!(page.doc.text_content(modal.slots().desc), "Cap");
}

#[test]
fn page_without_modal_or_host_still_boots() {
    let fetcher = MapFetcher::new();
    let mut page = Page::bootstrap(
        document_from_html("<p>plain</p>"),
        &fetcher,
        FolioConfig::default(),
    );
    assert!(page.sections.is_empty());
    assert!(page.modal().is_none());
    assert_eq!(page.key(Key::Escape), Action::Ignore);
    assert!(fetcher.requests().is_empty());
}
