//! Weekly period rotation actor and its timer.

use crate::{RotationConfig, RotationPolicy};
use std::time::Duration;
use tally_core::WeeklyWindow;
use tally_database::{DatabaseResult, WeeklyPeriodManager};
use tally_error::{SchedulerError, TallyResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, instrument, warn};

/// Message types for the rotation bot.
#[derive(Debug)]
pub enum RotationMessage {
    /// Timer tick
    Tick,
    /// Run one rotation now and report the outcome
    RotateNow(oneshot::Sender<DatabaseResult<Option<WeeklyWindow>>>),
    /// Shutdown the bot
    Shutdown,
}

/// Actor that owns weekly rotation.
pub struct RotationBot {
    periods: WeeklyPeriodManager,
    policy: RotationPolicy,
    rx: mpsc::Receiver<RotationMessage>,
}

impl RotationBot {
    /// Creates a new rotation bot.
    pub fn new(
        periods: WeeklyPeriodManager,
        policy: RotationPolicy,
        rx: mpsc::Receiver<RotationMessage>,
    ) -> Self {
        Self {
            periods,
            policy,
            rx,
        }
    }

    /// Runs the rotation loop until shutdown or until every sender is gone.
    #[instrument(skip(self), fields(policy = %self.policy))]
    pub async fn run(mut self) {
        info!("Rotation bot started");

        while let Some(msg) = self.rx.recv().await {
            match msg {
                RotationMessage::Tick => {
                    if let Err(e) = self.rotate().await {
                        error!(error = ?e, "Weekly rotation failed");
                    }
                }
                RotationMessage::RotateNow(reply) => {
                    let outcome = self.rotate().await;
                    if reply.send(outcome).is_err() {
                        debug!("Rotation requester went away");
                    }
                }
                RotationMessage::Shutdown => {
                    info!("Rotation bot shutting down");
                    break;
                }
            }
        }
    }

    async fn rotate(&self) -> DatabaseResult<Option<WeeklyWindow>> {
        match self.policy {
            RotationPolicy::EveryTick => self.periods.rotate().await.map(Some),
            RotationPolicy::WhenDue => self.periods.rotate_if_due().await,
        }
    }
}

/// Spawns the rotation bot and the timer that drives it.
///
/// The first tick fires immediately, so a fresh database gets its first
/// period at startup.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    periods: WeeklyPeriodManager,
    policy: RotationPolicy,
    every: Duration,
}

impl RotationScheduler {
    /// Creates a scheduler ticking every `every`.
    pub fn new(periods: WeeklyPeriodManager, policy: RotationPolicy, every: Duration) -> Self {
        Self {
            periods,
            policy,
            every,
        }
    }

    /// Creates a scheduler from the rotation settings.
    pub fn from_config(periods: WeeklyPeriodManager, config: &RotationConfig) -> TallyResult<Self> {
        Ok(Self::new(periods, config.policy, config.interval()?))
    }

    /// Starts the bot and its timer.
    #[instrument(skip(self), fields(every_secs = self.every.as_secs()))]
    pub fn start(self) -> RotationHandle {
        let (tx, rx) = mpsc::channel(8);

        let bot = RotationBot::new(self.periods, self.policy, rx);
        let actor = tokio::spawn(async move {
            bot.run().await;
        });

        let ticker = Self::spawn_ticker(self.every, tx.clone());

        info!("Rotation scheduler started");
        RotationHandle { tx, actor, ticker }
    }

    fn spawn_ticker(every: Duration, tx: mpsc::Sender<RotationMessage>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(RotationMessage::Tick).await.is_err() {
                    warn!("Rotation bot channel closed");
                    break;
                }
            }
        })
    }
}

/// Handle to a running rotation scheduler.
#[derive(Debug)]
pub struct RotationHandle {
    tx: mpsc::Sender<RotationMessage>,
    actor: JoinHandle<()>,
    ticker: JoinHandle<()>,
}

impl RotationHandle {
    /// Ask the bot to rotate now, following its policy, and wait for the outcome.
    pub async fn rotate_now(&self) -> TallyResult<Option<WeeklyWindow>> {
        let (reply, outcome) = oneshot::channel();
        self.tx
            .send(RotationMessage::RotateNow(reply))
            .await
            .map_err(|_| SchedulerError::new("Rotation bot is not running"))?;

        let window = outcome
            .await
            .map_err(|_| SchedulerError::new("Rotation bot stopped before replying"))??;
        Ok(window)
    }

    /// Stop the timer, let the bot finish its queue, and wait for it to exit.
    pub async fn shutdown(self) {
        self.ticker.abort();
        if self.tx.send(RotationMessage::Shutdown).await.is_err() {
            debug!("Rotation bot already stopped");
        }
        if let Err(e) = self.actor.await {
            error!(error = ?e, "Rotation bot task failed");
        }
    }
}
