//! main.rs - Interactive demo of two accordion views over one model
//!
//! Both columns render the same model. Activating a panel in one column
//! writes the selected index back to the model and the other column follows.
//! Child views are materialized with an artificial delay so placeholders are
//! visible.
//!
//! Usage:
//!   omni-accordion --pages 4 --delay-ms 500
//!   omni-accordion --config accordion.toml
//!   omni-accordion --headless
//!
//! Keys: Tab switch column, Up/Down move, Enter open, a add page,
//! f add broken page, x remove page, t retitle page, q quit.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event as CEvent, EventStream, KeyCode, KeyEventKind};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use futures::future::{FutureExt, LocalBoxFuture};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Line,
};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use omni_accordion::{
    AccordionBinding, AccordionConfig, AccordionModel, AccordionWidget, ChildId, ChildViewFactory,
    MaterializeError, Materializer,
};

const TICK: Duration = Duration::from_millis(100);

/// Accordion demo - two synchronized views over one model
#[derive(clap::Parser, Debug)]
#[command(name = "omni-accordion")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of pages to start with
    #[arg(short, long, default_value_t = 3)]
    pages: usize,

    /// Artificial delay before a child view is ready, in milliseconds
    #[arg(long, default_value_t = 300)]
    delay_ms: u64,

    /// Run a scripted session without a terminal and log the result
    #[arg(long, default_value = "false")]
    headless: bool,
}

/// Factory producing text pages after a delay
#[derive(Debug, Clone)]
struct SlowPages {
    delay: Duration,
}

impl ChildViewFactory for SlowPages {
    type View = String;

    fn create(&self, id: &ChildId) -> LocalBoxFuture<'static, Result<String, MaterializeError>> {
        let delay = self.delay;
        let id = id.clone();
        async move {
            tokio::time::sleep(delay).await;
            if id.as_str().starts_with("broken") {
                return Err(MaterializeError::new(format!("no renderer for {id}")));
            }
            Ok(format!("Contents of {id}\n\nCreated after {}ms", delay.as_millis()))
        }
        .boxed_local()
    }
}

type DemoBinding = AccordionBinding<Materializer<SlowPages>>;

struct Demo {
    model: Arc<AccordionModel>,
    views: [DemoBinding; 2],
    cursors: [usize; 2],
    focus: usize,
    next_page: usize,
    quit: bool,
}

impl Demo {
    fn new(config: AccordionConfig, pages: usize, delay: Duration) -> Self {
        let model = AccordionModel::new(config);
        let factory = SlowPages { delay };
        let views = [
            AccordionBinding::attach(Arc::clone(&model), Materializer::new(factory.clone())),
            AccordionBinding::attach(Arc::clone(&model), Materializer::new(factory)),
        ];
        let mut demo = Self {
            model,
            views,
            cursors: [0; 2],
            focus: 0,
            next_page: 0,
            quit: false,
        };
        for _ in 0..pages {
            demo.add_page("page");
        }
        demo
    }

    fn add_page(&mut self, prefix: &str) {
        self.model.push_child(format!("{prefix}-{}", self.next_page));
        self.next_page += 1;
    }

    /// Apply model changes and finished materializations to both views
    fn process(&mut self) -> Result<()> {
        for (binding, cursor) in self.views.iter_mut().zip(self.cursors.iter_mut()) {
            binding.process_pending()?;
            binding.poll_materialized();
            *cursor = (*cursor).min(binding.view().len().saturating_sub(1));
        }
        Ok(())
    }

    fn on_key(&mut self, code: KeyCode) {
        let cursor = self.cursors[self.focus];
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                info!("User pressed quit");
                self.quit = true;
            }
            KeyCode::Tab => self.focus = 1 - self.focus,
            KeyCode::Up => self.cursors[self.focus] = cursor.saturating_sub(1),
            KeyCode::Down => {
                let last = self.views[self.focus].view().len().saturating_sub(1);
                self.cursors[self.focus] = (cursor + 1).min(last);
            }
            KeyCode::Enter => {
                if let Err(e) = self.views[self.focus].activate(cursor) {
                    warn!("Couldn't open panel {cursor}: {e}");
                }
            }
            KeyCode::Char('a') => self.add_page("page"),
            KeyCode::Char('f') => self.add_page("broken"),
            KeyCode::Char('x') => {
                if let Some(id) = self.model.children().get(cursor) {
                    self.model.remove_child(id);
                }
            }
            KeyCode::Char('t') => {
                self.model.set_title(cursor, format!("Renamed {cursor}"));
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [header, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());
        let columns: [_; 2] =
            Layout::horizontal([Constraint::Percentage(50); 2]).areas(body);

        frame.render_widget(
            Line::styled(
                format!(
                    " selected_index={}  Tab switch  ↑/↓ move  Enter open  a/f add  x remove  t retitle  q quit",
                    self.model.selected_index()
                ),
                Style::default().fg(Color::Yellow),
            ),
            header,
        );

        for (i, (binding, area)) in self.views.iter().zip(columns).enumerate() {
            let focused = (i == self.focus).then_some(self.cursors[i]);
            frame.render_widget(AccordionWidget::new(binding.view()).focused(focused), area);
        }
    }

    fn teardown(&mut self) {
        for binding in &mut self.views {
            binding.teardown();
        }
    }
}

async fn run_terminal(mut demo: Demo) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventStream::new();

    let result: Result<()> = async {
        loop {
            demo.process()?;
            terminal.draw(|f| demo.draw(f))?;
            if demo.quit {
                return Ok(());
            }

            // Materializations advance whenever the loop polls, so a tick keeps them moving
            tokio::select! {
                event = events.next() => match event {
                    Some(Ok(CEvent::Key(key))) if key.kind == KeyEventKind::Press => demo.on_key(key.code),
                    Some(Err(e)) => return Err(anyhow::Error::from(e)),
                    None => return Ok(()),
                    _ => {}
                },
                () = tokio::time::sleep(TICK) => {}
            }
        }
    }
    .await;

    demo.teardown();
    disable_raw_mode()?;
    execute!(stdout(), Clear(ClearType::All))?;
    result
}

/// Scripted session: open a page in the first view, then let the second follow
async fn run_headless(mut demo: Demo) -> Result<Vec<Vec<usize>>> {
    demo.process()?;
    for binding in &mut demo.views {
        binding.settle().await;
    }
    demo.views[0].activate(demo.model.children().len().saturating_sub(1))?;
    demo.process()?;
    demo.model.set_title(0, "Overview");
    demo.process()?;

    let open: Vec<Vec<usize>> = demo.views.iter().map(|b| b.view().open_ordinals()).collect();
    for (i, binding) in demo.views.iter().enumerate() {
        info!(
            "View {i}: labels={:?} open={:?}",
            binding.view().labels(),
            binding.view().open_ordinals()
        );
    }
    demo.teardown();
    Ok(open)
}

fn main() -> Result<()> {
    omni_accordion::init_logger();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AccordionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AccordionConfig::default(),
    };
    info!("Starting omni-accordion with {} pages", args.pages);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async {
        let demo = Demo::new(config, args.pages, Duration::from_millis(args.delay_ms));
        if args.headless {
            info!("Running in headless mode (--headless flag set)");
            run_headless(demo).await.map(|_| ())
        } else {
            run_terminal(demo).await
        }
    })?;

    info!("omni-accordion shutdown complete");
    Ok(())
}

#[cfg(test)]
mod demo_tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["omni-accordion"]);
        assert_eq!(args.pages, 3);
        assert_eq!(args.delay_ms, 300);
        assert!(args.config.is_none());
        assert!(!args.headless);
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "omni-accordion",
            "--config",
            "/tmp/accordion.toml",
            "--pages",
            "5",
            "--delay-ms",
            "0",
            "--headless",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/accordion.toml")));
        assert_eq!(args.pages, 5);
        assert_eq!(args.delay_ms, 0);
        assert!(args.headless);
    }

    #[tokio::test]
    async fn test_headless_session_syncs_both_views() {
        let demo = Demo::new(AccordionConfig::default(), 3, Duration::ZERO);
        let open = run_headless(demo).await.unwrap();
        assert_eq!(open, vec![vec![2], vec![2]]);
    }

    #[test]
    fn test_keys_edit_the_shared_model() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut demo = Demo::new(AccordionConfig::default(), 2, Duration::ZERO);
            demo.process().unwrap();

            demo.on_key(KeyCode::Char('a'));
            demo.on_key(KeyCode::Tab);
            demo.on_key(KeyCode::Down);
            demo.on_key(KeyCode::Enter);
            demo.process().unwrap();

            assert_eq!(demo.model.children().len(), 3);
            assert_eq!(demo.views[0].view().open_ordinals(), vec![1]);
            assert_eq!(demo.views[1].view().open_ordinals(), vec![1]);

            demo.on_key(KeyCode::Char('q'));
            assert!(demo.quit);
        });
    }
}
