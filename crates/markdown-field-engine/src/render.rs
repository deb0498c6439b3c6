use std::sync::OnceLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;

static UNDERLINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn underline_regex() -> &'static Regex {
    UNDERLINE_REGEX.get_or_init(|| Regex::new(r"(?s)__(.+?)__").expect("Invalid underline regex"))
}

/// Render Markdown to HTML for the preview tab.
///
/// Standard CommonMark via pulldown-cmark, except that `__text__` always
/// renders as `<u>`. Where CommonMark parses it as strong emphasis the inner
/// content is rendered normally, so `__a *b*__` nests; anywhere else
/// (intraword, space-flanked) the literal text run is split around `<u>`.
pub fn render(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    // One entry per open strong span: was it written with `__`?
    let mut strong_stack: Vec<bool> = Vec::new();

    let events = Parser::new_ext(text, options)
        .into_offset_iter()
        .map(|(event, range)| match event {
            Event::Start(Tag::Strong) => {
                let underline = text.get(range).is_some_and(|raw| raw.starts_with("__"));
                strong_stack.push(underline);
                if underline {
                    Event::InlineHtml(CowStr::Borrowed("<u>"))
                } else {
                    Event::Start(Tag::Strong)
                }
            }
            Event::End(TagEnd::Strong) => {
                if strong_stack.pop() == Some(true) {
                    Event::InlineHtml(CowStr::Borrowed("</u>"))
                } else {
                    Event::End(TagEnd::Strong)
                }
            }
            other => other,
        });

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, underline_text_runs(events).into_iter());
    output
}

/// Merge adjacent text events and underline any `__…__` left inside them.
///
/// Code blocks are passed through untouched.
fn underline_text_runs<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut run = String::new();
    let mut in_code_block = false;

    for event in events {
        if !in_code_block && let Event::Text(text) = &event {
            run.push_str(text);
            continue;
        }
        flush_run(&mut run, &mut out);
        match &event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            _ => {}
        }
        out.push(event);
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut String, out: &mut Vec<Event<'_>>) {
    if run.is_empty() {
        return;
    }
    let text = std::mem::take(run);
    let mut last = 0;
    for caps in underline_regex().captures_iter(&text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Event::Text(CowStr::from(text[last..whole.start()].to_string())));
        }
        out.push(Event::InlineHtml(CowStr::Borrowed("<u>")));
        out.push(Event::Text(CowStr::from(inner.as_str().to_string())));
        out.push(Event::InlineHtml(CowStr::Borrowed("</u>")));
        last = whole.end();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}
