use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal size changed; the next draw picks up the new area.
    Resize,
    /// All five fields were rewritten.
    StatusRefreshed(DateTime<Local>),
    /// Fields kept their previous text; carries a short reason.
    RefreshFailed(String),
}

pub fn start_event_loop(event_tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    let app_event = match event {
                        Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                        Event::Resize(_, _) => AppEvent::Resize,
                        _ => continue,
                    };
                    if event_tx.send(app_event).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });
}
