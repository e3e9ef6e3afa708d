use neurofin_core::{InsightContext, Reply, Router};
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub request_id: u64,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ChatEvent {
    Thinking { request_id: u64 },
    Replied { request_id: u64, reply: Reply },
}

/// Answer each request after `delay`. Requests overlap: a second message
/// while one is pending gets its own reply, nothing is cancelled.
pub async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<ChatRequest>,
    tx: std::sync::mpsc::Sender<ChatEvent>,
    router: Router,
    ctx: InsightContext,
    rng: StdRng,
    delay: Duration,
) {
    let shared = Arc::new(std::sync::Mutex::new((router, ctx, rng)));
    let mut pending = tokio::task::JoinSet::new();

    while let Some(req) = rx.recv().await {
        let _ = tx.send(ChatEvent::Thinking {
            request_id: req.request_id,
        });

        let tx2 = tx.clone();
        let shared = Arc::clone(&shared);
        pending.spawn(async move {
            tokio::time::sleep(delay).await;

            let reply = {
                let Ok(mut guard) = shared.lock() else {
                    tracing::error!(request_id = req.request_id, "responder state poisoned");
                    return;
                };
                let (router, ctx, rng) = &mut *guard;
                router.respond(&req.text, ctx, rng)
            };
            tracing::debug!(request_id = req.request_id, topic = ?reply.topic, "reply ready");
            let _ = tx2.send(ChatEvent::Replied {
                request_id: req.request_id,
                reply,
            });
        });
    }

    // Input closed: let in-flight replies land before exiting.
    while pending.join_next().await.is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurofin_core::{ProgressPolicy, Topic};
    use neurofin_ledger::sample;
    use rand::SeedableRng;

    fn spawn(delay: Duration) -> (mpsc::UnboundedSender<ChatRequest>, std::sync::mpsc::Receiver<ChatEvent>, tokio::task::JoinHandle<()>) {
        let ctx = InsightContext::build(&sample::transactions(), sample::saving_goal(), ProgressPolicy::Clamped).unwrap();
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = std::sync::mpsc::channel();
        let handle = tokio::spawn(run_worker(
            req_rx,
            ev_tx,
            Router::default(),
            ctx,
            StdRng::seed_from_u64(1),
            delay,
        ));
        (req_tx, ev_rx, handle)
    }

    fn replies(events: &std::sync::mpsc::Receiver<ChatEvent>) -> Vec<(u64, Topic)> {
        events
            .try_iter()
            .filter_map(|e| match e {
                ChatEvent::Replied { request_id, reply } => Some((request_id, reply.topic)),
                ChatEvent::Thinking { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_reply_after_delay() {
        let (req_tx, events, handle) = spawn(Duration::from_millis(5));
        req_tx
            .send(ChatRequest {
                request_id: 1,
                text: "Show my spending breakdown".to_string(),
            })
            .unwrap();
        drop(req_tx);
        handle.await.unwrap();

        assert_eq!(replies(&events), vec![(1, Topic::Spending)]);
    }

    #[tokio::test]
    async fn test_overlapping_requests_both_answered() {
        let (req_tx, events, handle) = spawn(Duration::from_millis(5));
        for (id, text) in [(1, "tips please"), (2, "how is my goal")] {
            req_tx
                .send(ChatRequest {
                    request_id: id,
                    text: text.to_string(),
                })
                .unwrap();
        }
        drop(req_tx);
        handle.await.unwrap();

        let mut got = replies(&events);
        got.sort_by_key(|(id, _)| *id);
        assert_eq!(got, vec![(1, Topic::Tips), (2, Topic::Goal)]);
    }
}
