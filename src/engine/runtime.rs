use chrono::Utc;
use tokio::sync::mpsc;

use crate::common::{ChatCommand, ChatEvent};

use super::state::{ChatState, Effect, Timer};
use super::timers::Scheduler;

/// Owns the chat state and serialises every mutation onto one task.
pub struct ChatEngine {
    state: ChatState,
    event_sender: mpsc::Sender<ChatEvent>,
    command_receiver: mpsc::Receiver<ChatCommand>,
}

impl ChatEngine {
    pub fn new(
        state: ChatState,
        event_sender: mpsc::Sender<ChatEvent>,
        command_receiver: mpsc::Receiver<ChatCommand>,
    ) -> Self {
        Self {
            state,
            event_sender,
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        let (mut scheduler, mut timer_receiver) = Scheduler::new();
        log::info!(
            "Chat engine started for {} with {} chats",
            self.state.viewer().name,
            self.state.chats().len()
        );
        self.emit(ChatEvent::Ready(self.state.snapshot())).await;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ChatCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command, &mut scheduler).await,
                    }
                }
                Some(timer) = timer_receiver.recv() => {
                    self.handle_timer(timer, &mut scheduler).await;
                }
            }
        }

        scheduler.cancel_all().await;
        log::info!("Chat engine stopped");
    }

    async fn handle_command(&mut self, command: ChatCommand, scheduler: &mut Scheduler) {
        let name = command.name();
        match self.state.apply(command, Utc::now()) {
            Ok(effects) => self.run_effects(effects, scheduler).await,
            Err(err) => log::debug!("Ignoring {name}: {err}"),
        }
    }

    async fn handle_timer(&mut self, timer: Timer, scheduler: &mut Scheduler) {
        let effects = self.state.fire(timer, Utc::now());
        self.run_effects(effects, scheduler).await;
    }

    async fn run_effects(&mut self, effects: Vec<Effect>, scheduler: &mut Scheduler) {
        for effect in effects {
            match effect {
                Effect::Emit(event) => self.emit(event).await,
                Effect::Schedule { delay, timer } => scheduler.schedule(delay, timer),
            }
        }
    }

    async fn emit(&self, event: ChatEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("Failed to notify front end: {err:?}");
        }
    }
}
