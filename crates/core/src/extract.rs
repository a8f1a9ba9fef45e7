use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};

use crate::normalization::{normalize_key, LookupMode};
use crate::reference::{ExtractContext, Reference};
use crate::token::decode_token;

static PLAY: Lazy<Selector> = Lazy::new(|| Selector::parse(".play").expect("play selector"));
static WITH_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("[id]").expect("id selector"));
static CONTRIBUTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".ofLink").expect("contributor selector"));
static ORIGIN: Lazy<Selector> = Lazy::new(|| Selector::parse(".from").expect("origin selector"));

const WORD_AUDIO_ROUTE: &str = "mp3";
const PHRASE_AUDIO_ROUTE: &str = "phrases/mp3";

pub fn extract_references(
    document: &str,
    mode: LookupMode,
    ctx: &ExtractContext<'_>,
) -> Vec<Reference> {
    let html = Html::parse_document(document);
    let refs = match mode {
        LookupMode::Word => extract_word(&html, ctx),
        LookupMode::Phrase => extract_phrase(&html, ctx),
    };
    debug!(
        query = ctx.query,
        mode = mode.as_str(),
        count = refs.len(),
        "extracted references"
    );
    refs
}

fn extract_word(html: &Html, ctx: &ExtractContext<'_>) -> Vec<Reference> {
    let Some(section) = html
        .select(&WITH_ID)
        .find(|el| el.value().id() == Some(ctx.dialect))
    else {
        return Vec::new();
    };
    let Some(article) = closest(section, "article") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for play in article.select(&PLAY) {
        let (contributor, origin) = match closest(play, "li") {
            Some(item) => (
                first_fragment(item, &CONTRIBUTOR),
                first_fragment(item, &ORIGIN),
            ),
            None => (String::new(), String::new()),
        };
        let Some(fragment) = decoded_fragment(play, ctx.query) else {
            continue;
        };
        out.push(Reference {
            url: audio_url(ctx.audio_base, WORD_AUDIO_ROUTE, &fragment),
            display_name: format!(
                "_{} - by {} {}.{}",
                file_safe(ctx.query),
                file_safe(&contributor),
                file_safe(&origin),
                ctx.file_type
            ),
        });
    }
    out
}

fn extract_phrase(html: &Html, ctx: &ExtractContext<'_>) -> Vec<Reference> {
    let expected = format!("Listen{}pronunciation", normalize_key(ctx.query));
    let mut out = Vec::new();
    let matching = html.select(&PLAY).filter(|el| {
        el.value()
            .attr("title")
            .map(|title| normalize_key(title) == expected)
            .unwrap_or(false)
    });
    for (idx, play) in matching.enumerate() {
        let Some(fragment) = decoded_fragment(play, ctx.query) else {
            continue;
        };
        out.push(Reference {
            url: audio_url(ctx.audio_base, PHRASE_AUDIO_ROUTE, &fragment),
            display_name: format!(
                "_{} - by Forvo ({}).{}",
                file_safe(ctx.query),
                idx,
                ctx.file_type
            ),
        });
    }
    out
}

fn decoded_fragment(play: ElementRef<'_>, query: &str) -> Option<String> {
    let onclick = play.value().attr("onclick").unwrap_or_default();
    match decode_token(onclick) {
        Ok(fragment) => Some(fragment),
        Err(err) => {
            warn!(query, error = %err, "skipping undecodable play control");
            None
        }
    }
}

/// Scraped text ends up inside a local filename; separators and control
/// characters must not survive, or the name would leave the target directory.
fn file_safe(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn audio_url(base: &str, route: &str, fragment: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), route, fragment)
}

/// Nearest element named `tag`, starting with `el` itself.
fn closest<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|candidate| candidate.value().name() == tag)
}

/// Text of the first child node of the first element matching `selector`.
/// Trailing markup such as nested counters is ignored.
fn first_fragment(scope: ElementRef<'_>, selector: &Selector) -> String {
    let Some(target) = scope.select(selector).next() else {
        return String::new();
    };
    let Some(child) = target.first_child() else {
        return String::new();
    };
    match child.value() {
        Node::Text(text) => String::from(&**text),
        Node::Element(_) => ElementRef::wrap(child)
            .map(|el| el.text().collect())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
