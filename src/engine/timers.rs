use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::state::Timer;

/// Runs each scheduled timer as its own task and hands it back on a channel
/// once it is due. Dropping the scheduler aborts whatever is still pending.
pub struct Scheduler {
    fired: mpsc::UnboundedSender<Timer>,
    tasks: JoinSet<()>,
}

impl Scheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Timer>) {
        let (fired, receiver) = mpsc::unbounded_channel();
        (
            Self {
                fired,
                tasks: JoinSet::new(),
            },
            receiver,
        )
    }

    pub fn schedule(&mut self, delay: Duration, timer: Timer) {
        // Reap finished tasks so the set does not grow without bound.
        while self.tasks.try_join_next().is_some() {}

        let fired = self.fired.clone();
        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = fired.send(timer) {
                log::debug!("Timer fired after engine stopped: {:?}", err.0);
            }
        });
    }

    /// Number of tasks still tracked, including finished ones not yet reaped.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Aborts every pending timer and waits for the tasks to wind down.
    pub async fn cancel_all(&mut self) {
        let pending = self.tasks.len();
        self.tasks.shutdown().await;
        if pending > 0 {
            log::debug!("Cancelled {pending} pending timers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(chat_id: &str) -> Timer {
        Timer::CounterpartReply {
            chat_id: chat_id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timers_arrive_in_deadline_order() {
        let (mut scheduler, mut fired) = Scheduler::new();
        scheduler.schedule(Duration::from_secs(5), reply("late"));
        scheduler.schedule(Duration::from_secs(2), reply("early"));

        assert_eq!(fired.recv().await, Some(reply("early")));
        assert_eq!(fired.recv().await, Some(reply("late")));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timers_never_fire() {
        let (mut scheduler, mut fired) = Scheduler::new();
        scheduler.schedule(Duration::from_secs(1), reply("chat-1"));
        scheduler.schedule(Duration::from_secs(3), reply("chat-2"));
        assert_eq!(scheduler.pending(), 2);

        scheduler.cancel_all().await;
        assert_eq!(scheduler.pending(), 0);

        let outcome = tokio::time::timeout(Duration::from_secs(10), fired.recv()).await;
        assert!(outcome.is_err());
    }
}
