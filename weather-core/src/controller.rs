//! Drives one lookup from raw input to a rendered card or an error message.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    classify::Failure,
    model::{QueryError, WeatherQuery, WeatherView},
    normalize::normalize,
    sink::PresentationSink,
    transport::WeatherTransport,
};

/// What happened to a single submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Rendered(WeatherView),
    /// Input failed validation; nothing was sent.
    Rejected(QueryError),
    Failed(Failure),
    /// A newer submission was issued before this one finished; its result was dropped.
    Superseded,
}

pub struct WeatherController<T, S> {
    transport: T,
    sink: S,
    latest: AtomicU64,
}

impl<T, S> WeatherController<T, S>
where
    T: WeatherTransport,
    S: PresentationSink,
{
    pub fn new(transport: T, sink: S) -> Self {
        Self { transport, sink, latest: AtomicU64::new(0) }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The user edited the input; any visible error goes away.
    pub fn input_changed(&self) {
        self.sink.hide_error();
    }

    /// Validate `raw`, fetch, classify, normalize and present the result.
    ///
    /// Each accepted submission takes a new ticket. Only the holder of the latest
    /// ticket may touch the sink once its request completes, so a slow response can
    /// never overwrite a newer one.
    pub async fn submit(&self, raw: &str) -> SubmitOutcome {
        let query = match WeatherQuery::parse(raw) {
            Ok(query) => query,
            Err(err) => {
                self.sink.clear();
                self.sink.show_error(&err.to_string());
                return SubmitOutcome::Rejected(err);
            }
        };

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(ticket, city = query.city(), "submitting weather lookup");

        self.sink.show_loading();
        self.sink.hide_error();
        self.sink.clear();
        let _loading = LoadingGuard { sink: &self.sink, latest: &self.latest, ticket };

        let result = self.transport.fetch(&query).await.and_then(|payload| normalize(&payload));

        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "discarding superseded weather response");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(view) => {
                self.sink.render(&view);
                SubmitOutcome::Rendered(view)
            }
            Err(failure) => {
                tracing::info!(kind = ?failure.kind, status = ?failure.status, "weather lookup failed");
                self.sink.show_error(&failure.message);
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

/// Hides the loading indicator when the latest request exits, however it exits.
struct LoadingGuard<'a, S: PresentationSink> {
    sink: &'a S,
    latest: &'a AtomicU64,
    ticket: u64,
}

impl<S: PresentationSink> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        if self.latest.load(Ordering::SeqCst) == self.ticket {
            self.sink.hide_loading();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureKind, classify::NOT_FOUND_MSG};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        ShowLoading,
        HideLoading,
        ShowError(String),
        HideError,
        Render(String),
        Clear,
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<Event>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl PresentationSink for RecordingSink {
        fn show_loading(&self) {
            self.push(Event::ShowLoading)
        }
        fn hide_loading(&self) {
            self.push(Event::HideLoading)
        }
        fn show_error(&self, message: &str) {
            self.push(Event::ShowError(message.to_owned()))
        }
        fn hide_error(&self) {
            self.push(Event::HideError)
        }
        fn render(&self, view: &WeatherView) {
            self.push(Event::Render(view.location_label.clone()))
        }
        fn clear(&self) {
            self.push(Event::Clear)
        }
    }

    /// Answers per city, optionally after a delay, and counts calls.
    #[derive(Debug, Default)]
    struct FakeTransport {
        calls: Arc<Mutex<Vec<String>>>,
        delays: Vec<(String, Duration)>,
    }

    #[async_trait]
    impl WeatherTransport for FakeTransport {
        async fn fetch(&self, query: &WeatherQuery) -> Result<Value, Failure> {
            self.calls.lock().unwrap().push(query.city().to_owned());

            if let Some((_, delay)) = self.delays.iter().find(|(c, _)| c == query.city()) {
                tokio::time::sleep(*delay).await;
            }

            match query.city() {
                "Atlantis" => crate::classify(404, br#"{"cod":"404","message":"city not found"}"#),
                "Nowhere" => Ok(json!({ "name": "Nowhere", "weather": [] })),
                city => Ok(payload(city)),
            }
        }
    }

    fn payload(city: &str) -> Value {
        json!({
            "name": city,
            "sys": { "country": "GB" },
            "weather": [{ "icon": "01d", "description": "clear sky" }],
            "main": { "temp": 18.2, "humidity": 60, "feels_like": 17.9 },
            "wind": { "speed": 3.1 },
            "visibility": 10000
        })
    }

    #[tokio::test]
    async fn london_renders_and_clears_loading() {
        let controller = WeatherController::new(FakeTransport::default(), RecordingSink::default());

        let outcome = controller.submit("London").await;

        let view = match outcome {
            SubmitOutcome::Rendered(view) => view,
            other => panic!("expected a rendered view, got {other:?}"),
        };
        assert_eq!(view.location_label, "London, United Kingdom");
        assert_eq!(view.temperature_text(), "18");
        assert_eq!(view.humidity_text(), "60%");
        assert_eq!(view.wind_text(), "3.1 m/s");
        assert_eq!(view.feels_like_text(), "18°C");
        assert_eq!(view.visibility_text(), "10.0 km");

        assert_eq!(
            controller.sink().events(),
            vec![
                Event::ShowLoading,
                Event::HideError,
                Event::Clear,
                Event::Render("London, United Kingdom".into()),
                Event::HideLoading,
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_sends_nothing() {
        let transport = FakeTransport::default();
        let calls = transport.calls.clone();
        let controller = WeatherController::new(transport, RecordingSink::default());

        for raw in ["", "   ", "\t"] {
            let outcome = controller.submit(raw).await;
            assert_eq!(outcome, SubmitOutcome::Rejected(QueryError::EmptyInput));
        }

        assert!(calls.lock().unwrap().is_empty());
        let rejected = [Event::Clear, Event::ShowError("Please enter a city name".into())];
        assert_eq!(controller.sink().events(), rejected.iter().cloned().cycle().take(rejected.len() * 3).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn rejected_input_hides_previous_card() {
        let controller = WeatherController::new(FakeTransport::default(), RecordingSink::default());

        assert!(matches!(controller.submit("London").await, SubmitOutcome::Rendered(_)));
        let before = controller.sink().events().len();

        let outcome = controller.submit("  ").await;
        assert_eq!(outcome, SubmitOutcome::Rejected(QueryError::EmptyInput));

        let events = controller.sink().events();
        assert_eq!(
            &events[before..],
            &[Event::Clear, Event::ShowError("Please enter a city name".into())]
        );
    }

    #[tokio::test]
    async fn not_found_shows_message_and_keeps_card_hidden() {
        let controller = WeatherController::new(FakeTransport::default(), RecordingSink::default());

        let outcome = controller.submit("Atlantis").await;
        assert!(matches!(outcome, SubmitOutcome::Failed(ref f) if f.kind == FailureKind::NotFound));

        let events = controller.sink().events();
        assert!(events.contains(&Event::ShowError(NOT_FOUND_MSG.into())));
        assert!(!events.iter().any(|e| matches!(e, Event::Render(_))));
        assert_eq!(events.last(), Some(&Event::HideLoading));
    }

    #[tokio::test]
    async fn malformed_payload_never_renders() {
        let controller = WeatherController::new(FakeTransport::default(), RecordingSink::default());

        let outcome = controller.submit("Nowhere").await;
        assert!(
            matches!(outcome, SubmitOutcome::Failed(ref f) if f.kind == FailureKind::MalformedPayload)
        );
        assert!(!controller.sink().events().iter().any(|e| matches!(e, Event::Render(_))));
        assert_eq!(controller.sink().events().last(), Some(&Event::HideLoading));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_does_not_overwrite_newer_one() {
        let transport = FakeTransport {
            delays: vec![("Paris".into(), Duration::from_secs(5))],
            ..FakeTransport::default()
        };
        let controller = WeatherController::new(transport, RecordingSink::default());

        let (slow, fast) = tokio::join!(controller.submit("Paris"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            controller.submit("Oslo").await
        });

        assert_eq!(slow, SubmitOutcome::Superseded);
        assert!(matches!(fast, SubmitOutcome::Rendered(ref v) if v.location_label.starts_with("Oslo")));

        let events = controller.sink().events();
        let renders: Vec<_> = events.iter().filter(|e| matches!(e, Event::Render(_))).collect();
        assert_eq!(renders, vec![&Event::Render("Oslo, United Kingdom".into())]);
        assert_eq!(events.iter().filter(|e| **e == Event::HideLoading).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_submission_still_hides_loading() {
        let transport = FakeTransport {
            delays: vec![("Paris".into(), Duration::from_secs(60))],
            ..FakeTransport::default()
        };
        let controller = WeatherController::new(transport, RecordingSink::default());

        let timed_out =
            tokio::time::timeout(Duration::from_secs(1), controller.submit("Paris")).await;
        assert!(timed_out.is_err());

        assert_eq!(controller.sink().events().last(), Some(&Event::HideLoading));
    }

    #[tokio::test]
    async fn typing_clears_error() {
        let controller = WeatherController::new(FakeTransport::default(), RecordingSink::default());
        controller.input_changed();
        assert_eq!(controller.sink().events(), vec![Event::HideError]);
    }
}
