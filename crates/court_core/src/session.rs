//! Session driver.
//!
//! One tokio task owns the [`PlaybackController`] and waits on three things:
//! user commands, the single in-flight service call and the next timer
//! deadline. The rest of the application talks to it through a
//! [`SessionHandle`] and watches a [`StatusView`] snapshot republished after
//! every step.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, info_span, Instrument};

use crate::api::{HttpPlayService, PlayService};
use crate::config::{ClientConfig, PlaybackConfig};
use crate::error::{CourtError, MatchError, Result, SequenceError};
use crate::models::{EntityId, FrameSequence, MatchDescriptor, Roster};
use crate::playback::{Effect, PlaybackController, Ticket};
use crate::status::StatusView;
use crate::store::EntityStore;

/// User input accepted by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Drag { id: EntityId, x: f32, y: f32 },
    FindBestPlay,
    Stop,
    Dismiss,
    HideResult,
    Shutdown,
}

enum Reply {
    Match(Ticket, std::result::Result<MatchDescriptor, MatchError>),
    Sequence(Ticket, std::result::Result<FrameSequence, SequenceError>),
}

type InFlight = Pin<Box<dyn Future<Output = Reply> + Send>>;

/// Cloneable front end of a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<StatusView>,
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| CourtError::SessionClosed)
    }

    pub fn drag(&self, id: EntityId, x: f32, y: f32) -> Result<()> {
        self.send(Command::Drag { id, x, y })
    }

    pub fn find_best_play(&self) -> Result<()> {
        self.send(Command::FindBestPlay)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn dismiss(&self) -> Result<()> {
        self.send(Command::Dismiss)
    }

    pub fn hide_result(&self) -> Result<()> {
        self.send(Command::HideResult)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    /// Latest published snapshot.
    pub fn status(&self) -> StatusView {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusView> {
        self.status.clone()
    }

    /// Resolves with the first published snapshot matching `predicate`,
    /// the current one included.
    pub async fn wait_for(&self, predicate: impl FnMut(&StatusView) -> bool) -> Result<StatusView> {
        let mut status = self.status.clone();
        let view = status.wait_for(predicate).await.map_err(|_| CourtError::SessionClosed)?;
        Ok(view.clone())
    }
}

pub struct Session<P: PlayService> {
    service: Arc<P>,
    controller: PlaybackController,
    commands: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<StatusView>,
    origin: Instant,
    in_flight: Option<InFlight>,
}

impl Session<HttpPlayService> {
    /// Session against the HTTP match service named by `config`.
    pub fn connect(config: &ClientConfig, roster: Roster) -> Result<(Self, SessionHandle)> {
        config.validate().map_err(CourtError::Config)?;
        let service = HttpPlayService::new(&config.service)?;
        Ok(Session::new(service, roster, &config.playback))
    }
}

impl<P: PlayService> Session<P> {
    pub fn new(service: P, roster: Roster, timing: &PlaybackConfig) -> (Self, SessionHandle) {
        let controller = PlaybackController::new(EntityStore::new(roster), timing.clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(StatusView::project(&controller));

        let session = Self {
            service: Arc::new(service),
            controller,
            commands: command_rx,
            status: status_tx,
            origin: Instant::now(),
            in_flight: None,
        };
        let handle = SessionHandle { commands: command_tx, status: status_rx };
        (session, handle)
    }

    /// Runs until [`Command::Shutdown`] or every handle is dropped, then hands
    /// back the controller.
    pub async fn run(mut self) -> PlaybackController {
        info!(players = self.controller.store().entities().len(), "session started");

        loop {
            let deadline = self.controller.next_deadline().map(|d| self.origin + d);

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                reply = next_reply(&mut self.in_flight) => {
                    self.in_flight = None;
                    self.on_reply(reply);
                }
                _ = sleep_until(deadline) => {
                    let effects = self.controller.advance(self.now());
                    for effect in effects {
                        self.dispatch(effect);
                    }
                }
            }

            self.status.send_replace(StatusView::project(&self.controller));
        }

        info!("session stopped");
        self.controller
    }

    fn now(&self) -> Duration {
        Instant::now().duration_since(self.origin)
    }

    fn handle(&mut self, command: Command) {
        let now = self.now();
        match command {
            Command::Drag { id, x, y } => {
                self.controller.drag(id, x, y);
            }
            Command::FindBestPlay => {
                if let Some(request) = self.controller.start_search(now) {
                    self.dispatch(Effect::RequestMatch(request));
                }
            }
            Command::Stop => {
                if self.controller.user_stop(now) {
                    // Abandon the call; its reply would be stale anyway
                    self.in_flight = None;
                }
            }
            Command::Dismiss => {
                self.controller.dismiss(now);
            }
            Command::HideResult => self.controller.hide_result(),
            Command::Shutdown => {}
        }
    }

    fn on_reply(&mut self, reply: Reply) {
        let now = self.now();
        match reply {
            Reply::Match(ticket, result) => {
                if let Some(fetch) = self.controller.on_match_result(ticket, result, now) {
                    self.dispatch(Effect::FetchSequence(fetch));
                }
            }
            Reply::Sequence(ticket, result) => self.controller.on_sequence_result(ticket, result, now),
        }
    }

    fn dispatch(&mut self, effect: Effect) {
        let service = Arc::clone(&self.service);
        let call: InFlight = match effect {
            Effect::RequestMatch(request) => {
                let span = info_span!("match_request", request_id = %request.request_id);
                Box::pin(
                    async move {
                        let result = service.request_match(&request.roster).await;
                        Reply::Match(request.ticket, result)
                    }
                    .instrument(span),
                )
            }
            Effect::FetchSequence(request) => {
                let span = info_span!(
                    "sequence_request",
                    request_id = %request.request_id,
                    match_id = %request.match_id,
                    event_id = %request.event_id
                );
                Box::pin(
                    async move {
                        let result = service
                            .fetch_sequence(&request.match_id, &request.event_id, &request.roster)
                            .await;
                        Reply::Sequence(request.ticket, result)
                    }
                    .instrument(span),
                )
            }
        };

        if self.in_flight.replace(call).is_some() {
            debug!("dropped superseded in-flight request");
        }
    }
}

async fn next_reply(in_flight: &mut Option<InFlight>) -> Reply {
    match in_flight {
        Some(call) => call.await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
