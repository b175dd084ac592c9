//! The send/receive message exchange.
//!
//! One exchange is: validate input, echo the user message, ask the responder,
//! render the reply (or an error), then hand control back to the user.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::responder::Responder;
use crate::state::ChatMessage;

/// Bot text used when the responder replies without any text.
pub const NO_RESPONSE: &str = "No response received";

/// The UI affordances an exchange drives.
pub trait ChatSurface: Send {
    /// Current contents of the input field.
    fn input_text(&self) -> String;
    fn clear_input(&mut self);
    fn focus_input(&mut self);
    /// Add a message at the end of the transcript.
    fn append(&mut self, message: ChatMessage);
    /// Show or hide the "bot is composing" indicator.
    fn set_composing(&mut self, composing: bool);
    fn set_send_enabled(&mut self, enabled: bool);
}

pub struct ExchangeController<S> {
    responder: Arc<dyn Responder>,
    surface: Arc<Mutex<S>>,
    in_flight: AtomicBool,
}

impl<S: ChatSurface> ExchangeController<S> {
    pub fn new(responder: Arc<dyn Responder>, surface: Arc<Mutex<S>>) -> Self {
        Self {
            responder,
            surface,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one exchange for `raw_input`.
    ///
    /// Blank input and submissions made while another exchange is in flight
    /// are ignored without touching the surface. Otherwise exactly one user
    /// message and one bot message are appended, and the send affordance and
    /// input focus are restored on every path.
    pub async fn submit_user_message(self: &Arc<Self>, raw_input: &str) {
        if let Some(exchange) = self.begin(raw_input) {
            exchange.finish().await;
        }
    }

    /// Start an exchange without waiting on the responder: claim the
    /// in-flight slot, disable sending, echo the user message, clear the
    /// input and show the composing indicator. The surface reflects all of
    /// this when `begin` returns; `PendingExchange::finish` does the rest.
    pub fn begin(self: &Arc<Self>, raw_input: &str) -> Option<PendingExchange<S>> {
        let query = raw_input.trim();
        if query.is_empty() {
            return None;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("exchange already in flight, ignoring submission");
            return None;
        }
        let exchange = PendingExchange {
            controller: Arc::clone(self),
            query: query.to_string(),
        };

        self.with_surface(|surface| {
            surface.set_send_enabled(false);
            surface.append(ChatMessage::user(query));
            surface.clear_input();
            surface.set_composing(true);
        });
        info!(chars = query.chars().count(), "exchange started");

        Some(exchange)
    }

    fn with_surface<T>(&self, f: impl FnOnce(&mut S) -> T) -> T {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut surface)
    }
}

/// An exchange whose user message is already on screen. Holds the in-flight
/// slot; dropping it re-enables sending and refocuses the input.
pub struct PendingExchange<S: ChatSurface> {
    controller: Arc<ExchangeController<S>>,
    query: String,
}

impl<S: ChatSurface> PendingExchange<S> {
    /// Ask the responder and append its reply, or the error text.
    pub async fn finish(self) {
        let reply_text = match self.controller.responder.ask(&self.query).await {
            Ok(reply) => reply.text().unwrap_or(NO_RESPONSE).to_string(),
            Err(err) => {
                warn!(error = %err, connectivity = err.is_connectivity(), "exchange failed");
                err.user_message().to_string()
            }
        };

        self.controller.with_surface(|surface| {
            surface.set_composing(false);
            surface.append(ChatMessage::bot(reply_text));
        });
        info!("exchange finished");
    }
}

impl<S: ChatSurface> Drop for PendingExchange<S> {
    fn drop(&mut self) {
        self.controller.with_surface(|surface| {
            surface.set_send_enabled(true);
            surface.focus_input();
        });
        self.controller.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AskError, CONNECTIVITY_MESSAGE, GENERIC_MESSAGE};
    use crate::responder::AskReply;
    use crate::state::Origin;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{oneshot, Notify};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Append(Origin, String),
        ClearInput,
        FocusInput,
        Composing(bool),
        SendEnabled(bool),
    }

    struct FakeSurface {
        input: String,
        events: Vec<Event>,
        send_enabled: bool,
        composing: bool,
        /// Input contents observed right after each append
        input_after_append: Vec<String>,
    }

    impl FakeSurface {
        fn new(input: &str) -> Arc<Mutex<Self>> {
            Arc::new(Mutex::new(Self {
                input: input.to_string(),
                events: Vec::new(),
                send_enabled: true,
                composing: false,
                input_after_append: Vec::new(),
            }))
        }

        fn appended(&self) -> Vec<(Origin, String)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Append(origin, text) => Some((*origin, text.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    impl ChatSurface for FakeSurface {
        fn input_text(&self) -> String {
            self.input.clone()
        }

        fn clear_input(&mut self) {
            self.input.clear();
            self.events.push(Event::ClearInput);
        }

        fn focus_input(&mut self) {
            self.events.push(Event::FocusInput);
        }

        fn append(&mut self, message: ChatMessage) {
            self.events
                .push(Event::Append(message.origin(), message.text().to_string()));
            self.input_after_append.push(self.input.clone());
        }

        fn set_composing(&mut self, composing: bool) {
            self.composing = composing;
            self.events.push(Event::Composing(composing));
        }

        fn set_send_enabled(&mut self, enabled: bool) {
            self.send_enabled = enabled;
            self.events.push(Event::SendEnabled(enabled));
        }
    }

    /// Answers every query with a fixed result.
    struct CannedResponder {
        result: fn() -> Result<AskReply, AskError>,
        queries: Mutex<Vec<String>>,
    }

    impl CannedResponder {
        fn new(result: fn() -> Result<AskReply, AskError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Responder for CannedResponder {
        async fn ask(&self, query: &str) -> Result<AskReply, AskError> {
            self.queries.lock().unwrap().push(query.to_string());
            (self.result)()
        }
    }

    /// Blocks until the test releases it, so in-flight state can be observed.
    struct GatedResponder {
        started: Notify,
        gate: Mutex<Option<oneshot::Receiver<Result<AskReply, AskError>>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Responder for GatedResponder {
        async fn ask(&self, _query: &str) -> Result<AskReply, AskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.lock().unwrap().take().expect("asked twice");
            self.started.notify_one();
            gate.await.expect("gate dropped")
        }
    }

    async fn run(
        responder: Arc<dyn Responder>,
        input: &str,
    ) -> Arc<Mutex<FakeSurface>> {
        let surface = FakeSurface::new(input);
        let controller = Arc::new(ExchangeController::new(responder, surface.clone()));
        let raw_input = surface.lock().unwrap().input_text();
        controller.submit_user_message(&raw_input).await;
        assert!(!controller.is_in_flight());
        surface
    }

    #[tokio::test]
    async fn test_blank_input_does_nothing() {
        let responder = CannedResponder::new(|| Ok(AskReply::new("unused")));
        let surface = run(responder.clone(), "   ").await;

        let surface = surface.lock().unwrap();
        assert!(surface.events.is_empty());
        assert!(surface.send_enabled);
        assert_eq!(surface.input, "   ");
        assert!(responder.queries().is_empty());
    }

    #[tokio::test]
    async fn test_successful_exchange_runs_steps_in_order() {
        let responder = CannedResponder::new(|| Ok(AskReply::new("hello")));
        let surface = run(responder.clone(), "  hi ").await;

        let surface = surface.lock().unwrap();
        assert_eq!(
            surface.events,
            vec![
                Event::SendEnabled(false),
                Event::Append(Origin::User, "hi".into()),
                Event::ClearInput,
                Event::Composing(true),
                Event::Composing(false),
                Event::Append(Origin::Bot, "hello".into()),
                Event::SendEnabled(true),
                Event::FocusInput,
            ]
        );
        assert_eq!(responder.queries(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_input_is_empty_once_user_message_is_echoed() {
        let responder = CannedResponder::new(|| Ok(AskReply::new("hello")));
        let surface = run(responder, "hi").await;

        let surface = surface.lock().unwrap();
        // User echo is appended before clearing; the bot reply sees an empty field
        assert_eq!(surface.input_after_append, vec!["hi".to_string(), String::new()]);
        assert!(surface.input.is_empty());
    }

    #[tokio::test]
    async fn test_missing_reply_text_uses_fallback() {
        let responder = CannedResponder::new(|| Ok(AskReply::default()));
        let surface = run(responder, "hi").await;

        assert_eq!(
            surface.lock().unwrap().appended(),
            vec![
                (Origin::User, "hi".to_string()),
                (Origin::Bot, NO_RESPONSE.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_server_error_appends_generic_message_and_restores_input() {
        let responder =
            CannedResponder::new(|| Err(AskError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
        let surface = run(responder, "price?").await;

        let surface = surface.lock().unwrap();
        assert_eq!(
            surface.appended(),
            vec![
                (Origin::User, "price?".to_string()),
                (Origin::Bot, GENERIC_MESSAGE.to_string()),
            ]
        );
        assert!(surface.send_enabled);
        assert!(!surface.composing);
        assert_eq!(surface.events.last(), Some(&Event::FocusInput));
    }

    #[tokio::test]
    async fn test_connectivity_failure_has_its_own_message() {
        let responder =
            CannedResponder::new(|| Err(AskError::Connect("connection refused".into())));
        let surface = run(responder, "hi").await;

        let appended = surface.lock().unwrap().appended();
        assert_eq!(appended[1], (Origin::Bot, CONNECTIVITY_MESSAGE.to_string()));
        assert_ne!(appended[1].1, GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn test_send_is_disabled_only_while_in_flight() {
        let (tx, rx) = oneshot::channel();
        let responder = Arc::new(GatedResponder {
            started: Notify::new(),
            gate: Mutex::new(Some(rx)),
            calls: AtomicUsize::new(0),
        });
        let surface = FakeSurface::new("first");
        let controller = Arc::new(ExchangeController::new(
            responder.clone() as Arc<dyn Responder>,
            surface.clone(),
        ));

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit_user_message("first").await }
        });
        responder.started.notified().await;

        {
            let surface = surface.lock().unwrap();
            assert!(!surface.send_enabled);
            assert!(surface.composing);
            assert_eq!(surface.appended(), vec![(Origin::User, "first".to_string())]);
        }
        assert!(controller.is_in_flight());

        // A second submission racing the first one is dropped
        controller.submit_user_message("second").await;
        assert_eq!(surface.lock().unwrap().appended().len(), 1);

        tx.send(Ok(AskReply::new("done"))).unwrap();
        task.await.unwrap();

        let surface = surface.lock().unwrap();
        assert!(surface.send_enabled);
        assert!(!controller.is_in_flight());
        assert_eq!(responder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            surface.appended(),
            vec![
                (Origin::User, "first".to_string()),
                (Origin::Bot, "done".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_consecutive_exchanges_each_append_a_pair() {
        let responder = CannedResponder::new(|| Ok(AskReply::new("ok")));
        let surface = FakeSurface::new("");
        let controller = Arc::new(ExchangeController::new(responder.clone(), surface.clone()));

        controller.submit_user_message("one").await;
        controller.submit_user_message("two").await;

        assert_eq!(surface.lock().unwrap().appended().len(), 4);
        assert_eq!(responder.queries(), vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn test_begin_echoes_before_any_await() {
        let responder = CannedResponder::new(|| Ok(AskReply::new("unused")));
        let surface = FakeSurface::new("hi");
        let controller = Arc::new(ExchangeController::new(responder.clone(), surface.clone()));

        let pending = controller.begin("hi").expect("exchange should start");
        {
            let surface = surface.lock().unwrap();
            assert_eq!(surface.appended(), vec![(Origin::User, "hi".to_string())]);
            assert!(surface.input.is_empty());
            assert!(!surface.send_enabled);
            assert!(surface.composing);
        }
        assert!(controller.begin("again").is_none());

        // Dropping an unfinished exchange still hands control back
        drop(pending);
        assert!(surface.lock().unwrap().send_enabled);
        assert!(!controller.is_in_flight());
        assert!(responder.queries().is_empty());
    }
}
