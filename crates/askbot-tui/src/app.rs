use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use askbot_core::{ChatSurface, ExchangeController, Responder};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::panel::ChatPanel;

pub struct App {
    pub should_quit: bool,
    pub endpoint: String,

    // Chat state, shared with the exchange task
    panel: Arc<Mutex<ChatPanel>>,
    exchange: Arc<ExchangeController<ChatPanel>>,
    pub exchange_task: Option<JoinHandle<()>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub toggle_area: Option<Rect>,
    pub panel_area: Option<Rect>,
    pub close_area: Option<Rect>,
    pub send_area: Option<Rect>,
    pub transcript_area: Option<Rect>,
}

impl App {
    pub fn new(responder: Arc<dyn Responder>, endpoint: impl Into<String>) -> Self {
        let panel = Arc::new(Mutex::new(ChatPanel::new()));
        let exchange = Arc::new(ExchangeController::new(responder, panel.clone()));

        Self {
            should_quit: false,
            endpoint: endpoint.into(),
            panel,
            exchange,
            exchange_task: None,
            animation_frame: 0,
            toggle_area: None,
            panel_area: None,
            close_area: None,
            send_area: None,
            transcript_area: None,
        }
    }

    pub fn panel(&self) -> MutexGuard<'_, ChatPanel> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start an exchange for the current input. The user message is echoed
    /// and the input cleared before this returns; only the responder call
    /// runs on the background task, so the event loop keeps going.
    pub fn submit(&mut self) {
        let raw_input = self.panel().input_text();
        if let Some(exchange) = self.exchange.begin(&raw_input) {
            self.exchange_task = Some(tokio::spawn(exchange.finish()));
        }
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;

        if self.exchange_task.as_ref().is_some_and(|t| t.is_finished()) {
            self.exchange_task = None;
        }
    }
}
