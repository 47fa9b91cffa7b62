mod app;

use anyhow::{Context, Result, bail};
use app::{App, DetailFn};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, warn};
use marksmith_config::Config;
use marksmith_engine::{MarkdownOptions, formula, markdown};
use marksmith_syntax::{Parse, Tag};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::{
    env,
    fmt::Display,
    hash::Hash,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

#[derive(Debug, PartialEq, Eq)]
struct Args {
    formula: bool,
    dump: bool,
    path: PathBuf,
}

impl Args {
    /// Parse a full argument vector, program name first.
    fn from_argv(argv: &[String]) -> Result<Self> {
        let Some((_, rest)) = argv.split_first() else {
            bail!("empty argument list");
        };
        Self::parse(rest)
    }

    fn parse(args: &[String]) -> Result<Self> {
        let mut formula = false;
        let mut dump = false;
        let mut path = None;
        for arg in args {
            match arg.as_str() {
                "--formula" => formula = true,
                "--dump" => dump = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                file if path.is_none() => path = Some(PathBuf::from(file)),
                extra => bail!("unexpected argument {extra}"),
            }
        }
        let Some(path) = path else {
            bail!("no input file given");
        };
        Ok(Self {
            formula,
            dump,
            path,
        })
    }
}

fn markdown_options() -> MarkdownOptions {
    match Config::load() {
        Ok(Some(config)) => config.markdown,
        Ok(None) => {
            debug!(
                "no config file at {}, using defaults",
                Config::config_path().display()
            );
            MarkdownOptions::default()
        }
        Err(e) => {
            warn!("{e}; using default options");
            MarkdownOptions::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let argv: Vec<String> = env::args().collect();
    let args = match Args::from_argv(&argv) {
        Ok(args) => args,
        Err(e) => {
            let program = argv.first().map_or("marksmith", String::as_str);
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} [--formula] [--dump] <file>");
            process::exit(1);
        }
    };

    let source = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    if args.formula {
        run(formula::parse(&source), app::no_details, args.dump)
    } else {
        let options = markdown_options();
        run(
            markdown::parse(&source, &options),
            app::formula_details,
            args.dump,
        )
    }
}

fn run<T: Tag, N: Tag + Display + Hash>(
    parse: Parse<'_, T, N>,
    extra: DetailFn<N>,
    dump: bool,
) -> Result<()> {
    debug!(
        "parsed {} tokens into {} nodes, {} error(s)",
        parse.tokens.len(),
        parse.tree.len(),
        parse.errors().count()
    );

    if dump {
        print!("{}", app::dump(&parse));
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(parse, extra);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<T, N: Tag + Display + Hash>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<'_, T, N>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn lines(text: Vec<String>) -> Vec<Line<'static>> {
    text.into_iter().map(|line| Line::from(vec![Span::raw(line)])).collect()
}

fn ui<T, N: Tag + Display + Hash>(f: &mut Frame, app: &mut App<'_, T, N>) {
    let errors = app.errors();
    let error_height = (errors.len().clamp(1, 6) + 2) as u16;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Min(0),
                Constraint::Length(error_height),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[0]);

    // Tree panel
    let tree_items: Vec<ListItem> = app
        .rows()
        .iter()
        .map(|row| ListItem::new(vec![Line::from(vec![Span::raw(row.clone())])]))
        .collect();

    let tree_list = List::new(tree_items)
        .block(Block::default().borders(Borders::ALL).title("Tree"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(tree_list, panes[0], &mut app.list_state);

    // Node panel
    let details = Paragraph::new(lines(app.details()))
        .block(Block::default().borders(Borders::ALL).title("Node"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(details, panes[1]);

    // Errors panel
    let title = format!("Errors ({})", errors.len());
    let error_text = if errors.is_empty() {
        vec![Line::from("No errors")]
    } else {
        lines(errors)
    };
    let error_list =
        Paragraph::new(error_text).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(error_list, rows[1]);

    let help_text = Line::from(vec![
        Span::raw("q/Esc: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next"),
    ]);

    f.render_widget(Paragraph::new(vec![help_text]), rows[2]);
}
