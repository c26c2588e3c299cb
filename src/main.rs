use std::time::Duration;

use folio::config::FolioConfig;
use folio::fetch::{load_text, Fetch, FileFetcher, HttpFetcher};
use folio::page::{document_from_html, Page};

fn main() {
    env_logger::init();

    let mut config = FolioConfig::load();
    // `folio [BASE]` overrides the configured base for one run
    if let Some(base) = std::env::args().nth(1) {
        config.base = base;
    }

    let fetcher: Box<dyn Fetch> = if config.is_remote() {
        match HttpFetcher::new(&config.base, Duration::from_secs(config.timeout_secs)) {
            Ok(f) => Box::new(f),
            Err(e) => {
                log::error!("[page] {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Box::new(FileFetcher::new(&config.base))
    };

    let html = match load_text(fetcher.as_ref(), &config.index) {
        Ok(html) => html,
        Err(e) => {
            log::error!("[page] {}", e);
            std::process::exit(1);
        }
    };

    let page = Page::bootstrap(document_from_html(&html), fetcher.as_ref(), config);
    for outcome in &page.sections {
        if let Some(e) = &outcome.error {
            eprintln!("section {}: {}", outcome.label, e);
        }
    }
    println!("{}", page.doc.outer_html(page.doc.body()));
}
