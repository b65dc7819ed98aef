//! Voice session controller
//!
//! Runs one voice-command session at a time on a dedicated worker thread:
//! - A start request begins a capture on the platform recognizer
//! - The transcript is echoed to the status banner, then dispatched after
//!   the configured delay (1500 ms by default)
//! - Errors and captures that end without a transcript return to idle
//!
//! The worker owns the [`VoiceSession`] record. Commands from the page and
//! recognizer callbacks reach it over channels, and the dispatch delay is a
//! deadline in the worker's `select!` loop, so cancelling it is just
//! forgetting the deadline.

use crate::config::{StartPolicy, VoiceConfig};
use crate::dispatch::{ActionDispatcher, DispatchOutcome};
use crate::error::RECOGNITION_UNSUPPORTED_NOTICE;
use crate::intent::{classify, normalize, Intent};
use crate::platform::Platform;
use crate::session::{ResetReason, SessionState, SharedStatus, VoiceSession};
use crate::speech::{
    CaptureHandle, RecognitionEvent, RecognitionSink, SessionEvent, SessionId, SpeechAnnouncer,
    SpeechRecognizer,
};
use crate::{Result, VoiceError};
use crossbeam_channel::{at, bounded, never, select, unbounded, Receiver, Sender, TrySendError};
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Commands accepted by the controller worker
#[derive(Debug, Clone)]
pub enum ControllerCommand {
    /// Begin a new capture
    StartListening,
    /// Stop the worker
    Shutdown,
}

/// Events emitted by the controller
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    /// Message for the user (e.g. recognition unsupported)
    Notice { message: String },
    /// A capture has been requested from the recognizer
    ListeningStarted { session: SessionId },
    /// A start request was dropped because a session is active
    StartIgnored { state: SessionState },
    /// A transcript arrived and is waiting for the dispatch delay
    TranscriptReceived {
        session: SessionId,
        transcript: String,
    },
    /// The transcript's intent was executed
    ActionDispatched {
        session: SessionId,
        intent: Intent,
        outcome: DispatchOutcome,
    },
    /// The session returned to idle
    SessionReset {
        session: Option<SessionId>,
        reason: ResetReason,
    },
    /// The worker has stopped
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeadlineKind {
    Dispatch,
    ListenTimeout,
}

#[derive(Clone, Copy, Debug)]
struct Deadline {
    at: Instant,
    kind: DeadlineKind,
}

/// Handle for the page side of the controller
pub struct VoiceController {
    command_tx: Sender<ControllerCommand>,
    event_tx: Sender<ControllerEvent>,
    event_rx: Receiver<ControllerEvent>,
    status: SharedStatus,
    recognition_available: bool,
}

impl VoiceController {
    /// Create a controller
    ///
    /// Returns both the handle (for sending commands and receiving events)
    /// and the worker (to be started on its own thread).
    pub fn new(config: VoiceConfig, platform: Platform) -> Result<(Self, VoiceControllerWorker)> {
        config.validate()?;

        let (command_tx, command_rx) = bounded(config.queue_size);
        let (event_tx, event_rx) = bounded(config.queue_size);
        let (recognition_tx, recognition_rx) = unbounded();
        let status = SharedStatus::new();

        info!(
            "Voice controller created (recognition: {}, synthesis: {})",
            platform.supports_recognition(),
            platform.supports_synthesis()
        );

        let announcer = SpeechAnnouncer::new(platform.synthesizer.clone(), config.speech);
        let dispatcher =
            ActionDispatcher::new(platform.navigation.clone(), announcer, config.sections.clone());

        let controller = Self {
            command_tx,
            event_tx: event_tx.clone(),
            event_rx,
            status: status.clone(),
            recognition_available: platform.supports_recognition(),
        };

        let worker = VoiceControllerWorker {
            config,
            recognizer: platform.recognizer,
            dispatcher,
            command_rx,
            recognition_tx,
            recognition_rx,
            event_tx,
            status,
            session: VoiceSession::new(),
            capture: None,
            deadline: None,
        };

        Ok((controller, worker))
    }

    /// Request a new capture
    ///
    /// Fails synchronously with [`VoiceError::CapabilityUnavailable`] when the
    /// host has no speech recognition; a `Notice` event is emitted as well.
    pub fn start_listening(&self) -> Result<()> {
        if !self.recognition_available {
            warn!("Speech recognition unavailable, not starting capture");
            let _ = self.event_tx.try_send(ControllerEvent::Notice {
                message: RECOGNITION_UNSUPPORTED_NOTICE.to_string(),
            });
            return Err(VoiceError::CapabilityUnavailable(
                "speech recognition".to_string(),
            ));
        }

        self.send(ControllerCommand::StartListening)
    }

    /// Request shutdown
    pub fn shutdown(&self) -> Result<()> {
        self.send(ControllerCommand::Shutdown)
    }

    fn send(&self, cmd: ControllerCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| VoiceError::Channel(format!("Failed to send command: {}", e)))
    }

    /// Current banner text
    pub fn status(&self) -> Option<String> {
        self.status.get()
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.status.state()
    }

    /// Shared status slot for the presentation layer
    pub fn shared_status(&self) -> SharedStatus {
        self.status.clone()
    }

    /// Check if the host can recognize speech
    pub fn is_recognition_available(&self) -> bool {
        self.recognition_available
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<ControllerEvent> {
        self.event_rx.clone()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ControllerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> Result<ControllerEvent> {
        self.event_rx
            .recv()
            .map_err(|e| VoiceError::Channel(format!("Failed to receive event: {}", e)))
    }

    /// Receive an event, giving up after `timeout`
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<ControllerEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Worker that owns the session and runs the state machine
pub struct VoiceControllerWorker {
    config: VoiceConfig,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    dispatcher: ActionDispatcher,
    command_rx: Receiver<ControllerCommand>,
    recognition_tx: Sender<SessionEvent>,
    recognition_rx: Receiver<SessionEvent>,
    event_tx: Sender<ControllerEvent>,
    status: SharedStatus,
    session: VoiceSession,
    capture: Option<Box<dyn CaptureHandle>>,
    deadline: Option<Deadline>,
}

impl VoiceControllerWorker {
    /// Start the worker thread
    pub fn start(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    /// Main worker loop
    fn run(mut self) {
        info!("Voice controller worker starting");

        let command_rx = self.command_rx.clone();
        let recognition_rx = self.recognition_rx.clone();

        loop {
            let timer = match self.deadline {
                Some(deadline) => at(deadline.at),
                None => never(),
            };

            select! {
                recv(command_rx) -> cmd => match cmd {
                    Ok(ControllerCommand::StartListening) => self.start_capture(),
                    Ok(ControllerCommand::Shutdown) => {
                        info!("Voice controller received shutdown command");
                        break;
                    }
                    Err(_) => {
                        warn!("Command channel disconnected");
                        break;
                    }
                },
                recv(recognition_rx) -> event => {
                    // The worker holds a sender, so this never disconnects
                    if let Ok(event) = event {
                        self.on_recognition(event);
                    }
                },
                recv(timer) -> _ => self.on_deadline(),
            }
        }

        if self.session.state.is_active() {
            self.abort_capture();
            self.reset(ResetReason::Shutdown);
        }
        self.emit(ControllerEvent::Shutdown);
        info!("Voice controller worker stopped");
    }

    fn start_capture(&mut self) {
        if self.session.state.is_active() {
            match self.config.start_policy {
                StartPolicy::SingleFlight => {
                    debug!(
                        "Start ignored, session already {}",
                        self.session.state
                    );
                    self.emit(ControllerEvent::StartIgnored {
                        state: self.session.state,
                    });
                    return;
                }
                StartPolicy::Permissive => {
                    debug!("New capture supersedes {} session", self.session.state);
                    self.abort_capture();
                    self.reset(ResetReason::Superseded);
                }
            }
        }

        let Some(recognizer) = self.recognizer.clone() else {
            warn!("Speech recognition unavailable, not starting capture");
            self.emit(ControllerEvent::Notice {
                message: RECOGNITION_UNSUPPORTED_NOTICE.to_string(),
            });
            return;
        };

        let id = SessionId::new();
        self.session.begin(id);
        self.publish();

        let sink = RecognitionSink::new(id, self.recognition_tx.clone());
        match recognizer.start_capture(&self.config.recognition, sink) {
            Ok(handle) => {
                info!("Listening (session {})", id);
                self.capture = Some(handle);
                if let Some(timeout) = self.config.listen_timeout() {
                    self.arm(DeadlineKind::ListenTimeout, timeout);
                }
                self.emit(ControllerEvent::ListeningStarted { session: id });
            }
            Err(e) => {
                error!("Failed to start speech recognition: {}", e);
                self.reset(ResetReason::StartFailed(e.to_string()));
            }
        }
    }

    fn on_recognition(&mut self, SessionEvent { session, event }: SessionEvent) {
        if !self.session.is_current(session) {
            debug!("Ignoring {:?} from stale session {}", event, session);
            return;
        }

        match event {
            RecognitionEvent::Started => {
                if self.session.capture_started() {
                    self.publish();
                }
            }
            RecognitionEvent::Result(transcript) => {
                let transcript = normalize(&transcript);
                if !self.session.receive_transcript(transcript.clone()) {
                    debug!("Ignoring transcript while {}", self.session.state);
                    return;
                }
                info!("Heard: \"{}\"", transcript);
                self.publish();
                self.arm(DeadlineKind::Dispatch, self.config.dispatch_delay());
                self.emit(ControllerEvent::TranscriptReceived {
                    session,
                    transcript,
                });
            }
            RecognitionEvent::Error(code) => {
                if !self.session.abandon() {
                    debug!("Ignoring recognition error '{}' while {}", code, self.session.state);
                    return;
                }
                error!("Speech recognition error: {}", code);
                self.finish(Some(session), ResetReason::RecognitionError(code));
            }
            RecognitionEvent::End => {
                self.capture = None;
                if !self.session.abandon() {
                    // Platforms close the capture right after the result
                    debug!("Capture ended while {}", self.session.state);
                    return;
                }
                debug!("Capture ended without a transcript");
                self.finish(Some(session), ResetReason::EndedWithoutResult);
            }
        }
    }

    fn on_deadline(&mut self) {
        let Some(deadline) = self.deadline.take() else {
            return;
        };

        match deadline.kind {
            DeadlineKind::Dispatch => {
                let Some(id) = self.session.id else {
                    return;
                };
                let Some(transcript) = self.session.complete() else {
                    return;
                };
                let intent = classify(&transcript);
                debug!("Classified \"{}\" as {}", transcript, intent);
                let outcome = self.dispatcher.dispatch(intent);
                self.emit(ControllerEvent::ActionDispatched {
                    session: id,
                    intent,
                    outcome,
                });
                self.reset(ResetReason::Completed);
            }
            DeadlineKind::ListenTimeout => {
                if !self.session.state.is_listening() {
                    return;
                }
                warn!("No speech recognized before the listen timeout");
                self.abort_capture();
                self.reset(ResetReason::TimedOut);
            }
        }
    }

    fn arm(&mut self, kind: DeadlineKind, after: Duration) {
        self.deadline = Some(Deadline {
            at: Instant::now() + after,
            kind,
        });
    }

    fn abort_capture(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.abort();
        }
    }

    /// Return to idle, dropping any pending deadline
    fn reset(&mut self, reason: ResetReason) {
        let session = self.session.id;
        self.session.reset();
        self.finish(session, reason);
    }

    fn finish(&mut self, session: Option<SessionId>, reason: ResetReason) {
        self.deadline = None;
        self.capture = None;
        self.publish();
        debug!("Session reset: {:?}", reason);
        self.emit(ControllerEvent::SessionReset { session, reason });
    }

    fn publish(&self) {
        self.status.publish(&self.session);
    }

    fn emit(&self, event: ControllerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => debug!("Event queue full, dropping {:?}", event),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}
