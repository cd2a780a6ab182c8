use crate::error::VizError;
use crate::model::{DenseModel, DetailTicket, MainOutcome, MainTicket};
use crate::source::DenseDataSource;
use gpui::*;
use std::sync::Arc;

/// Runs data-source calls on the background executor and feeds results back
/// into the model on the foreground.
#[derive(Clone)]
pub struct DataFetcher {
    pub model: Entity<DenseModel>,
    pub source: Arc<dyn DenseDataSource>,
}

impl DataFetcher {
    pub fn new(model: Entity<DenseModel>, source: Arc<dyn DenseDataSource>) -> Self {
        Self { model, source }
    }

    /// Runs `f` against the model and dispatches the main ticket it returns, if any.
    pub fn request(&self, cx: &mut App, f: impl FnOnce(&mut DenseModel) -> Option<MainTicket>) {
        let ticket = self.model.update(cx, |m, cx| {
            let ticket = f(m);
            cx.notify();
            ticket
        });
        if let Some(ticket) = ticket {
            self.main(ticket, cx);
        }
    }

    pub fn main(&self, ticket: MainTicket, cx: &mut App) {
        let MainTicket { seq, request } = ticket;
        let source = self.source.clone();
        let task = cx.background_spawn(async move { source.fetch_main(&request) });
        let model = self.model.downgrade();
        let fetcher = self.clone();
        cx.spawn(async move |cx| {
            let result = task.await.map_err(|e| VizError::transport(&e));
            let outcome = model.update(cx, |m, cx| {
                let outcome = m.complete_main(seq, result);
                cx.notify();
                outcome
            });
            if let Ok(MainOutcome::Applied { details }) = outcome {
                cx.update(|cx| {
                    for ticket in details {
                        fetcher.detail(ticket, cx);
                    }
                })
                .ok();
            }
        })
        .detach();
    }

    pub fn detail(&self, ticket: DetailTicket, cx: &mut App) {
        let DetailTicket {
            key,
            context,
            request,
        } = ticket;
        let source = self.source.clone();
        let task = cx.background_spawn(async move { source.fetch_detail(&context, &request) });
        let model = self.model.downgrade();
        cx.spawn(async move |cx| {
            let result = task.await.map_err(|e| VizError::transport(&e));
            model
                .update(cx, |m, cx| {
                    m.complete_detail(key, result);
                    cx.notify();
                })
                .ok();
        })
        .detach();
    }
}
