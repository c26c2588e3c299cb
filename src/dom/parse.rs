use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{Document, Fragment, NodeId, VOID_ELEMENTS};

/// Elements whose body is raw text up to the matching end tag. Their content
/// never goes through the tokenizer, so `a<b` inside them stays text.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Elements dropped together with everything inside them.
/// Fragments are markup only; nothing they carry is ever run.
const DROPPED_ELEMENTS: &[&str] = &["script"];

/// Where one tokenizer run stopped.
enum Stop {
    End,
    /// A raw-text element opened; its body starts `body_start` bytes into the run.
    RawText {
        tag: String,
        node: Option<NodeId>,
        body_start: usize,
    },
}

/// Parse an HTML string into detached nodes owned by `doc`.
///
/// The tokenizer is quick-xml in a lenient setup: mismatched or stray end
/// tags are tolerated, HTML-style attributes (unquoted, valueless) are
/// accepted, and void elements never open a scope. Raw-text elements are cut
/// out of the input before tokenizing resumes after their end tag. Comments,
/// doctypes and processing instructions are dropped. On a tokenizer error,
/// whatever was parsed up to that point is kept.
pub fn parse_fragment(doc: &mut Document, html: &str) -> Fragment {
    let src = html.trim();
    let mut roots: Vec<NodeId> = Vec::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut pos = 0;

    while pos < src.len() {
        let Stop::RawText {
            tag,
            node,
            body_start,
        } = tokenize(doc, &src[pos..], &mut roots, &mut stack)
        else {
            break;
        };
        let start = pos + body_start;
        let (body, consumed) = split_raw_text(&src[start..], &tag);
        match node {
            Some(node) => {
                let text = if tag == "textarea" {
                    unescape_with(body, resolve_html_entity)
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| body.to_string())
                } else {
                    body.to_string()
                };
                if !text.is_empty() {
                    let id = doc.create_text(&text);
                    doc.append_child(node, id);
                }
            }
            None => log::debug!("[dom] dropping <{}> from fragment", tag),
        }
        pos = start + consumed;
    }

    Fragment { roots }
}

/// Tokenize `src` until it ends or a raw-text element opens. `stack` holds
/// the open elements and carries over from one run to the next.
fn tokenize(
    doc: &mut Document,
    src: &str,
    roots: &mut Vec<NodeId>,
    stack: &mut Vec<NodeId>,
) -> Stop {
    let mut reader = Reader::from_str(src);
    {
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.check_comments = false;
    }

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return Stop::End,
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e.name().as_ref());
                if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                    let node = if DROPPED_ELEMENTS.contains(&tag.as_str()) {
                        None
                    } else {
                        let id = open_element(doc, e, &tag);
                        attach(doc, roots, stack, id);
                        Some(id)
                    };
                    return Stop::RawText {
                        tag,
                        node,
                        body_start: reader.buffer_position() as usize,
                    };
                }
                let id = open_element(doc, e, &tag);
                attach(doc, roots, stack, id);
                if !VOID_ELEMENTS.contains(&tag.as_str()) {
                    stack.push(id);
                }
            }
            Ok(Event::Empty(ref e)) => {
                let tag = tag_name(e.name().as_ref());
                if DROPPED_ELEMENTS.contains(&tag.as_str()) {
                    continue;
                }
                let id = open_element(doc, e, &tag);
                attach(doc, roots, stack, id);
            }
            Ok(Event::End(ref e)) => {
                let tag = tag_name(e.name().as_ref());
                // Close the nearest open element with this name; stray ends are ignored.
                if let Some(pos) = stack
                    .iter()
                    .rposition(|id| doc.tag(*id) == Some(tag.as_str()))
                {
                    stack.truncate(pos);
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = match e.unescape_with(resolve_html_entity) {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
                };
                if text.is_empty() {
                    continue;
                }
                let id = doc.create_text(&text);
                attach(doc, roots, stack, id);
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                let id = doc.create_text(&text);
                attach(doc, roots, stack, id);
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!(
                    "[dom] markup error at byte {}: {} (keeping what was parsed)",
                    reader.buffer_position(),
                    e
                );
                return Stop::End;
            }
        }
    }
}

/// Split a raw-text body off `rest` at the first `</tag` (any case). Returns
/// the body and the number of bytes consumed, end tag included. An unclosed
/// element runs to the end of the input.
fn split_raw_text<'a>(rest: &'a str, tag: &str) -> (&'a str, usize) {
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{}", tag);
    match lower.find(&needle) {
        Some(at) => {
            let after = at + needle.len();
            let consumed = lower[after..].find('>').map_or(rest.len(), |gt| after + gt + 1);
            (&rest[..at], consumed)
        }
        None => (rest, rest.len()),
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

fn open_element(doc: &mut Document, e: &BytesStart, tag: &str) -> NodeId {
    let id = doc.create_element(tag);
    for attr in e.html_attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        doc.set_attr(id, &key, &value);
    }
    id
}

fn attach(doc: &mut Document, roots: &mut Vec<NodeId>, stack: &[NodeId], id: NodeId) {
    match stack.last() {
        Some(parent) => doc.append_child(*parent, id),
        None => roots.push(id),
    }
}

/// Named references beyond the XML five that show up in hand-written pages.
fn resolve_html_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "middot" => "\u{b7}",
        "bull" => "\u{2022}",
        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "times" => "\u{d7}",
        _ => return None,
    };
    Some(s)
}
