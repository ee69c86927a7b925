use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{mpsc, Notify};
use tracing::info;

use crate::config::Config;
use crate::event::{self, AppEvent};
use crate::poller;
use crate::procmon::ProcmonClient;
use crate::status::StatusFields;
use crate::tui::{ScreenMode, Tui};
use crate::ui;

pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub endpoint: String,
    /// Read side of the bar's slots; the poller holds the write side.
    pub fields: StatusFields,
    pub last_refresh: Option<DateTime<Local>>,
    /// Reason the fields are stale, cleared by the next good refresh.
    pub stale: Option<String>,
    refresh_trigger: Arc<Notify>,
}

impl App {
    pub fn new(
        config: Config,
        endpoint: String,
        fields: StatusFields,
        refresh_trigger: Arc<Notify>,
    ) -> Self {
        Self {
            should_quit: false,
            config,
            endpoint,
            fields,
            last_refresh: None,
            stale: None,
            refresh_trigger,
        }
    }

    pub async fn run(config: Config) -> anyhow::Result<()> {
        let client = ProcmonClient::new(&config.procmon.url, config.procmon.timeout())?;
        let fields = StatusFields::with_placeholders();
        let trigger = Arc::new(Notify::new());

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        event::start_event_loop(event_tx.clone());

        info!(
            "polling {} every {}s",
            client.endpoint(),
            config.procmon.interval_secs
        );
        let mut app = App::new(
            config.clone(),
            client.endpoint().to_string(),
            fields.clone(),
            trigger.clone(),
        );
        let poller = poller::start_procmon_poller(
            client,
            fields,
            event_tx,
            config.procmon.interval_secs,
            trigger,
        );

        let mut tui = Tui::new(ScreenMode::from_inline(config.status_bar.inline))?;
        tui.enter()?;

        loop {
            tui.draw(|frame| ui::render(&app, frame))?;

            match event_rx.recv().await {
                Some(event) => app.handle_event(event),
                None => break,
            }

            if app.should_quit {
                break;
            }
        }

        poller.abort();
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::StatusRefreshed(at) => {
                self.last_refresh = Some(at);
                self.stale = None;
            }
            AppEvent::RefreshFailed(reason) => {
                self.stale = Some(reason);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('r') => self.refresh_trigger.notify_one(),
            _ => {}
        }
    }
}
