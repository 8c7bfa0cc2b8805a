//! Registration subscribers.
//!
//! Handlers take no payload: a notification only says "the registry grew",
//! and subscribers re-query whatever they display. Each handler runs in
//! isolation so one failing subscriber cannot starve the rest.

use std::panic::{catch_unwind, AssertUnwindSafe};

pub type SubscriberResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Handler = Box<dyn Fn() -> SubscriberResult + Send + Sync>;

/// Handle returned by [`Subscribers::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// Outcome of one notification round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct Subscribers {
    next_token: u64,
    handlers: Vec<(SubscriptionToken, Handler)>,
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl Subscribers {
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionToken
    where
        F: Fn() -> SubscriberResult + Send + Sync + 'static,
    {
        let token = SubscriptionToken(self.next_token);
        self.next_token += 1;
        self.handlers.push((token, Box::new(handler)));
        token
    }

    /// Returns `false` when `token` was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, token: SubscriptionToken) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(t, _)| *t != token);
        self.handlers.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Calls every handler once, in subscription order.
    ///
    /// Errors and panics are logged and counted; they never stop the round.
    pub fn notify_all(&self) -> NotifyReport {
        let mut report = NotifyReport::default();
        for (token, handler) in &self.handlers {
            match catch_unwind(AssertUnwindSafe(|| handler())) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    tracing::warn!(subscriber = token.0, error = %e, "subscriber failed");
                    report.failed += 1;
                }
                Err(payload) => {
                    tracing::error!(
                        subscriber = token.0,
                        panic = %panic_message(payload.as_ref()),
                        "subscriber panicked"
                    );
                    report.failed += 1;
                }
            }
        }
        report
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unexpected panic without message".to_string()
    }
}
