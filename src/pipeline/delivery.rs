//! Outbound delivery: notifier trait and background worker
//!
//! The poller never waits on a chat platform. It enqueues deliveries on an
//! unbounded channel; a worker drains it with bounded parallelism and a
//! fixed pause after every item. A failed delivery is logged and skipped.

use super::catalog::Genre;
use super::error::{PipelineError, Result};
use super::boards::MatchBoard;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

/// Renders and sends payloads to chat channels
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, channels: &[String], text: &str) -> Result<()>;

    async fn send_scoreboard(&self, channels: &[String], board: &MatchBoard) -> Result<()>;

    /// Replace the pinned status content of each channel
    async fn update_status(&self, channels: &[String], genre: Genre, content: &str) -> Result<()>;
}

/// Notifier that writes every payload to the log
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, channels: &[String], text: &str) -> Result<()> {
        for line in text.lines() {
            log::info!("💬 [{}] {}", channels.join(","), line);
        }
        Ok(())
    }

    async fn send_scoreboard(&self, channels: &[String], board: &MatchBoard) -> Result<()> {
        let json = serde_json::to_string(board)?;
        log::info!("🏆 [{}] {}", channels.join(","), board.summary());
        log::debug!("   └─ {}", json);
        Ok(())
    }

    async fn update_status(&self, channels: &[String], genre: Genre, content: &str) -> Result<()> {
        log::info!("📌 [{}] {} status:\n{}", channels.join(","), genre, content);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Delivery {
    Message {
        channels: Vec<String>,
        text: String,
    },
    Scoreboard {
        channels: Vec<String>,
        board: Box<MatchBoard>,
    },
    Status {
        channels: Vec<String>,
        genre: Genre,
        content: String,
    },
}

impl Delivery {
    fn describe(&self) -> String {
        match self {
            Delivery::Message { channels, .. } => format!("message to {} channels", channels.len()),
            Delivery::Scoreboard { board, .. } => {
                format!("{} scoreboard of session {}", board.genre(), board.session_id())
            }
            Delivery::Status { genre, .. } => format!("{} status", genre),
        }
    }

    async fn send(&self, notifier: &dyn Notifier) -> Result<()> {
        match self {
            Delivery::Message { channels, text } => notifier.send_message(channels, text).await,
            Delivery::Scoreboard { channels, board } => notifier.send_scoreboard(channels, board).await,
            Delivery::Status { channels, genre, content } => {
                notifier.update_status(channels, *genre, content).await
            }
        }
    }
}

/// Producer side of the delivery worker
#[derive(Clone)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<Delivery>,
    pending: Arc<AtomicUsize>,
}

impl DeliveryQueue {
    pub fn enqueue(&self, delivery: Delivery) -> Result<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(delivery).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            PipelineError::QueueClosed
        })
    }

    /// Items queued or in flight
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Start the worker; it stops once every queue handle is dropped and the
/// backlog is drained
pub fn spawn_delivery_worker(
    notifier: Arc<dyn Notifier>,
    parallelism: usize,
    delay: Duration,
) -> (DeliveryQueue, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Delivery>();
    let pending = Arc::new(AtomicUsize::new(0));
    let queue = DeliveryQueue { tx, pending: pending.clone() };
    let parallelism = parallelism.max(1);

    let handle = tokio::spawn(async move {
        log::info!(
            "📮 Starting delivery worker (parallelism: {}, delay: {}ms)",
            parallelism,
            delay.as_millis()
        );
        let semaphore = Arc::new(Semaphore::new(parallelism));

        while let Some(delivery) = rx.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let notifier = notifier.clone();
            let pending = pending.clone();

            tokio::spawn(async move {
                if let Err(e) = delivery.send(notifier.as_ref()).await {
                    log::error!("❌ Failed to deliver {}: {}", delivery.describe(), e);
                }
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                pending.fetch_sub(1, Ordering::SeqCst);
                drop(permit);
            });
        }

        // Wait for in-flight deliveries
        let _ = semaphore.acquire_many(parallelism as u32).await;
        log::info!("✅ Delivery worker stopped");
    });

    (queue, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::racing;
    use crate::pipeline::testing::{at, session};
    use crate::pipeline::types::RaceReport;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, channels: &[String], text: &str) -> Result<()> {
            if text == "boom" {
                return Err(PipelineError::Delivery("channel gone".to_string()));
            }
            self.sent.lock().unwrap().push(format!("{}:{}", channels.join(","), text));
            Ok(())
        }

        async fn send_scoreboard(&self, _channels: &[String], board: &MatchBoard) -> Result<()> {
            self.sent.lock().unwrap().push(format!("board:{}", board.session_id()));
            Ok(())
        }

        async fn update_status(&self, _channels: &[String], genre: Genre, _content: &str) -> Result<()> {
            self.sent.lock().unwrap().push(format!("status:{}", genre));
            Ok(())
        }
    }

    fn message(text: &str) -> Delivery {
        Delivery::Message { channels: vec!["c1".to_string()], text: text.to_string() }
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_stop_worker() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (queue, handle) = spawn_delivery_worker(notifier.clone(), 1, Duration::ZERO);

        queue.enqueue(message("first")).unwrap();
        queue.enqueue(message("boom")).unwrap();
        queue.enqueue(message("third")).unwrap();
        queue
            .enqueue(Delivery::Status {
                channels: vec!["c2".to_string()],
                genre: Genre::Golf,
                content: "## Golf".to_string(),
            })
            .unwrap();
        drop(queue);
        handle.await.unwrap();

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent, vec!["c1:first", "c1:third", "status:GOLF"]);
    }

    #[tokio::test]
    async fn test_pending_counts_drain_to_zero() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (queue, handle) = spawn_delivery_worker(notifier.clone(), 4, Duration::from_millis(1));

        for i in 0..10 {
            queue.enqueue(message(&format!("m{}", i))).unwrap();
        }
        assert!(queue.pending() > 0);
        let pending = queue.pending.clone();
        drop(queue);
        handle.await.unwrap();

        assert_eq!(pending.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.sent.lock().unwrap().len(), 10);
    }

    fn race_board(session_id: i64) -> MatchBoard {
        let race = session(session_id, "PSP/NFS07", "", at(0), Some(at(60)));
        let reports = vec![RaceReport { position: Some(1), persona_name: "r".to_string(), ..Default::default() }];
        MatchBoard::Race(racing::build(&race, &reports, None).unwrap())
    }

    #[tokio::test]
    async fn test_scoreboards_go_through_the_worker() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (queue, handle) = spawn_delivery_worker(notifier.clone(), 2, Duration::ZERO);

        let delivery = Delivery::Scoreboard { channels: vec!["boards".to_string()], board: Box::new(race_board(9)) };
        assert_eq!(delivery.describe(), "RACING scoreboard of session 9");
        queue.enqueue(delivery).unwrap();
        drop(queue);
        handle.await.unwrap();

        assert_eq!(notifier.sent.lock().unwrap().clone(), vec!["board:9"]);
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_everything() {
        let notifier = LogNotifier;
        notifier.send_message(&["c".to_string()], "line one\nline two").await.unwrap();
        notifier.update_status(&[], Genre::Fps, "## Medal of Honor: Heroes").await.unwrap();
        notifier.send_scoreboard(&["c".to_string()], &race_board(1)).await.unwrap();
    }
}
