mod app;
mod keys;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_field_config::{Config, PlatformSetting};
use markdown_field_engine::{EditorSession, Mode, Platform, SessionOptions, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};
use std::{
    env,
    io::{Stdout, stdout},
    ops::Range,
    path::PathBuf,
    process,
    time::{Duration, Instant},
};
use unicode_width::UnicodeWidthStr;

use app::App;

/// Poll interval while no history record is waiting
const IDLE_POLL: Duration = Duration::from_millis(500);

struct Args {
    config_path: Option<PathBuf>,
    file: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut parsed = Args {
        config_path: None,
        file: None,
    };
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => parsed.config_path = Some(PathBuf::from(iter.next()?)),
            flag if flag.starts_with("--") => return None,
            file if parsed.file.is_none() => parsed.file = Some(PathBuf::from(file)),
            _ => return None,
        }
    }
    Some(parsed)
}

fn resolve_platform(setting: PlatformSetting) -> Platform {
    match setting {
        PlatformSetting::Mac => Platform::Mac,
        PlatformSetting::Other => Platform::Other,
        PlatformSetting::Auto if cfg!(target_os = "macos") => Platform::Mac,
        PlatformSetting::Auto => Platform::Other,
    }
}

/// Log to the file named by `MARKDOWN_FIELD_LOG`; stderr belongs to the terminal UI
fn init_logging() {
    let Some(log_path) = env::var_os("MARKDOWN_FIELD_LOG") else {
        return;
    };
    match std::fs::File::create(&log_path) {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!(
            "Warning: cannot open log file '{}': {e}",
            PathBuf::from(&log_path).display()
        ),
    }
}

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let Some(parsed) = parse_args(&args) else {
        eprintln!("Usage: {} [--config PATH] [FILE]", args[0]);
        process::exit(1);
    };

    let config_path = parsed.config_path.unwrap_or_else(Config::config_path);
    let config = match Config::load_from_path(&config_path) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let file = parsed.file.or_else(|| config.default_file.clone());
    let text = match &file {
        Some(path) => io::load_document(path)
            .with_context(|| format!("Failed to open '{}'", path.display()))?
            .text(),
        None => String::new(),
    };

    let options = SessionOptions {
        platform: resolve_platform(config.platform),
        debounce: config.debounce(),
        history_limit: config.history_limit(),
        field_name: config.field_name.clone(),
    };
    log::info!(
        "starting editor for {:?} with {:?}",
        file.as_deref().map(|p| p.display().to_string()),
        options
    );
    let session = EditorSession::new(&text, options);
    let mut app = App::new(session, file);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;
        // The new text is on screen, so the pending caret can land
        app.session.acknowledge_layout();

        let timeout = app
            .session
            .next_deadline(Instant::now())
            .unwrap_or(IDLE_POLL);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && let Some(input) = keys::to_key_input(&key)
        {
            app.handle_key(input, Instant::now())?;
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let mode = app.session.mode();
    let selected_tab = match mode {
        Mode::Write => 0,
        Mode::Preview => 1,
    };
    let tabs = Tabs::new(vec![Mode::Write.label(), Mode::Preview.label()])
        .select(selected_tab)
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_widget(tabs, chunks[0]);

    match mode {
        Mode::Write => draw_editor(f, app, chunks[1]),
        Mode::Preview => draw_preview(f, app, chunks[1]),
    }

    let history = app.session.history();
    let position = history.position().map_or(0, |p| p + 1);
    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", app.session.field().name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "| history {position}/{} | {}{} | Tab: Write/Preview  Alt+1-6/B/I/U/L/-/O: toolbar  Ctrl+S: save  Esc: quit",
            history.len(),
            app.status,
            if app.modified { " [+]" } else { "" },
        )),
    ]);
    f.render_widget(Paragraph::new(status), chunks[2]);
}

fn draw_editor(f: &mut Frame, app: &mut App, area: ratatui::layout::Rect) {
    let block = Block::default().borders(Borders::ALL).title("Write");
    let inner = block.inner(area);

    let text = app.session.text();
    let selection = app.session.selection();
    let (caret_row, _) = app.session.document().point_of(selection.end);
    let caret_line = app.session.document().line_at(selection.end);
    let caret_col = display_column(&text, caret_line.start, selection.end);
    app.scroll_to_caret(caret_row, inner.height as usize);

    let highlight = Style::default().add_modifier(Modifier::REVERSED);
    let mut lines = Vec::new();
    let mut line_start = 0;
    for line in text.split('\n') {
        let line_range = line_start..line_start + line.len();
        lines.push(highlighted_line(line, line_range, &selection, highlight));
        line_start += line.len() + 1;
    }

    let editor = Paragraph::new(lines)
        .block(block)
        .scroll((app.editor_scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(editor, area);

    let row = caret_row.saturating_sub(app.editor_scroll);
    if row < inner.height as usize && caret_col < inner.width as usize {
        f.set_cursor_position((inner.x + caret_col as u16, inner.y + row as u16));
    }
}

/// Terminal cells between the line start and the caret
fn display_column(text: &str, line_start: usize, caret: usize) -> usize {
    text.get(line_start..caret).map_or(0, |before| before.width())
}

/// Split one source line into plain and selected spans
fn highlighted_line<'a>(
    line: &'a str,
    line_range: Range<usize>,
    selection: &Range<usize>,
    highlight: Style,
) -> Line<'a> {
    let start = selection.start.clamp(line_range.start, line_range.end) - line_range.start;
    let end = selection.end.clamp(line_range.start, line_range.end) - line_range.start;
    if start == end {
        return Line::from(line);
    }
    Line::from(vec![
        Span::raw(&line[..start]),
        Span::styled(&line[start..end], highlight),
        Span::raw(&line[end..]),
    ])
}

fn draw_preview(f: &mut Frame, app: &mut App, area: ratatui::layout::Rect) {
    let scroll = app.preview_scroll;
    let html = app.session.rendered_html();
    let lines: Vec<Line> = html.lines().map(Line::from).collect();
    let preview = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Preview (HTML)"))
        .scroll((scroll, 0));
    f.render_widget(preview, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("markdown-field-cli")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["--config", "/tmp/c.toml", "notes.md"])).unwrap();
        assert_eq!(parsed.config_path, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(parsed.file, Some(PathBuf::from("notes.md")));

        let parsed = parse_args(&args(&[])).unwrap();
        assert_eq!(parsed.file, None);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&["--config"])).is_none());
        assert!(parse_args(&args(&["--verbose"])).is_none());
        assert!(parse_args(&args(&["a.md", "b.md"])).is_none());
    }

    #[test]
    fn test_resolve_platform() {
        assert_eq!(resolve_platform(PlatformSetting::Mac), Platform::Mac);
        assert_eq!(resolve_platform(PlatformSetting::Other), Platform::Other);
        let expected = if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        };
        assert_eq!(resolve_platform(PlatformSetting::Auto), expected);
    }

    #[test]
    fn test_display_column_counts_wide_chars_twice() {
        let text = "ab\n日本x";
        assert_eq!(display_column(text, 0, 2), 2);
        assert_eq!(display_column(text, 3, 9), 4);
        assert_eq!(display_column(text, 3, 10), 5);
    }

    #[test]
    fn test_highlighted_line_splits_on_selection() {
        let style = Style::default().add_modifier(Modifier::REVERSED);
        let line = highlighted_line("hello", 6..11, &(8..20), style);
        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["he", "llo", ""]);

        let untouched = highlighted_line("hello", 6..11, &(0..3), style);
        assert_eq!(untouched.spans.len(), 1);
    }
}
