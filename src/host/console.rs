//! Terminal host
//!
//! Stands in for the browser: typed lines are transcripts, spoken phrases
//! and page actions are printed. Lets the controller run end-to-end from a
//! shell.

use crate::dispatch::NavigationSurface;
use crate::speech::{
    CaptureHandle, RecognitionConfig, RecognitionSink, SessionId, SpeechRecognizer,
    SpeechSynthesizer, UtteranceOptions,
};
use crate::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

/// Input read from the terminal but not yet handed to a capture
#[derive(Debug)]
enum ConsoleInput {
    Line(String),
    Failed(String),
}

#[derive(Debug, Default)]
struct InputState {
    /// Capture waiting for the next line, if any
    live: Option<RecognitionSink>,
    /// Lines typed while no capture was listening
    backlog: VecDeque<ConsoleInput>,
    /// The reader hit end of input or a read error
    closed: bool,
}

/// Turns typed lines into transcripts, one line per capture
///
/// A single reader thread owns the input for the recognizer's whole life.
/// Each line goes to the capture that is live when it arrives, or waits for
/// the next capture. Aborted captures never consume input.
#[derive(Debug)]
pub struct ConsoleRecognizer {
    state: Arc<Mutex<InputState>>,
}

impl ConsoleRecognizer {
    /// Read transcripts from stdin
    pub fn new() -> Self {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    /// Read transcripts from any line source
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let state = Arc::new(Mutex::new(InputState::default()));
        let reader_state = Arc::clone(&state);
        thread::spawn(move || read_input(reader, reader_state));
        Self { state }
    }

    /// Check if input has ended and every typed line has been handed out
    pub fn is_input_closed(&self) -> bool {
        let state = self.state.lock();
        state.closed && state.backlog.is_empty()
    }
}

impl Default for ConsoleRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

fn read_input<R: BufRead>(mut reader: R, state: Arc<Mutex<InputState>>) {
    loop {
        let mut line = String::new();
        let input = match reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(ConsoleInput::Line(line.trim().to_string())),
            Err(e) => {
                warn!("Failed to read console input: {}", e);
                Some(ConsoleInput::Failed("audio-capture".to_string()))
            }
        };

        let mut guard = state.lock();
        match input {
            Some(input) => {
                let failed = matches!(input, ConsoleInput::Failed(_));
                match guard.live.take() {
                    Some(sink) => deliver(&sink, input),
                    None => guard.backlog.push_back(input),
                }
                if !failed {
                    continue;
                }
            }
            None => debug!("Console input closed"),
        }

        guard.closed = true;
        if let Some(sink) = guard.live.take() {
            end_without_input(&sink);
        }
        return;
    }
}

fn deliver(sink: &RecognitionSink, input: ConsoleInput) {
    let delivered = match input {
        ConsoleInput::Line(line) if line.is_empty() => {
            sink.error("no-speech").and_then(|_| sink.end())
        }
        ConsoleInput::Line(line) => sink.result(line).and_then(|_| sink.end()),
        ConsoleInput::Failed(code) => sink.error(code),
    };
    if let Err(e) = delivered {
        debug!("Controller gone before console input was delivered: {}", e);
    }
}

fn end_without_input(sink: &RecognitionSink) {
    if let Err(e) = sink.end() {
        debug!("Controller gone before end of input was delivered: {}", e);
    }
}

struct ConsoleCapture {
    session: SessionId,
    state: Arc<Mutex<InputState>>,
}

impl CaptureHandle for ConsoleCapture {
    fn abort(&mut self) {
        let mut state = self.state.lock();
        if state.live.as_ref().map(|sink| sink.session()) == Some(self.session) {
            debug!("Console capture {} aborted", self.session);
            state.live = None;
        }
    }
}

impl SpeechRecognizer for ConsoleRecognizer {
    fn start_capture(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionSink,
    ) -> Result<Box<dyn CaptureHandle>> {
        let session = sink.session();
        debug!("Console capture ({}) for session {}", config.language, session);

        sink.started()?;
        print!("🎤 ");
        let _ = io::stdout().flush();

        let mut state = self.state.lock();
        if let Some(input) = state.backlog.pop_front() {
            deliver(&sink, input);
        } else if state.closed {
            end_without_input(&sink);
        } else {
            state.live = Some(sink);
        }

        Ok(Box::new(ConsoleCapture {
            session,
            state: Arc::clone(&self.state),
        }))
    }
}

/// Prints announcements instead of speaking them
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&self, text: &str, options: &UtteranceOptions) -> Result<()> {
        debug!("Speaking at rate {} pitch {}", options.rate, options.pitch);
        println!("🔊 {}", text);
        Ok(())
    }
}

/// Prints page actions for a page with the given sections
#[derive(Debug)]
pub struct ConsolePage {
    sections: Vec<String>,
}

impl ConsolePage {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }
}

impl NavigationSurface for ConsolePage {
    fn scroll_to_element(&self, id: &str) -> bool {
        if !self.sections.iter().any(|s| s == id) {
            return false;
        }
        println!("↪ scrolled to #{}", id);
        true
    }

    fn scroll_to_top(&self) {
        println!("↪ scrolled to top");
    }

    fn open_booking_dialog(&self) {
        println!("↪ opened booking dialog");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::{RecognitionEvent, SessionEvent};
    use crossbeam_channel::{unbounded, Receiver, Sender};
    use std::io::{BufReader, Cursor, Read};
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(2);

    /// Line source fed by the test; dropping the sender ends the input
    struct TypedInput {
        chunks: Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for TypedInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.chunks.recv() {
                    Ok(chunk) => self.pending = chunk,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending = self.pending.split_off(n);
            Ok(n)
        }
    }

    fn typed() -> (Sender<Vec<u8>>, ConsoleRecognizer) {
        let (tx, rx) = unbounded();
        let input = TypedInput {
            chunks: rx,
            pending: Vec::new(),
        };
        (tx, ConsoleRecognizer::from_reader(BufReader::new(input)))
    }

    fn capture(
        recognizer: &ConsoleRecognizer,
    ) -> (Box<dyn CaptureHandle>, Receiver<SessionEvent>) {
        let (tx, rx) = unbounded();
        let sink = RecognitionSink::new(SessionId::new(), tx);
        let handle = recognizer
            .start_capture(&RecognitionConfig::default(), sink)
            .unwrap();
        (handle, rx)
    }

    fn next_event(rx: &Receiver<SessionEvent>) -> RecognitionEvent {
        rx.recv_timeout(WAIT).unwrap().event
    }

    fn wait_until_closed(recognizer: &ConsoleRecognizer) {
        let deadline = Instant::now() + WAIT;
        while !recognizer.is_input_closed() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(recognizer.is_input_closed());
    }

    #[test]
    fn test_console_page_knows_its_sections() {
        let page = ConsolePage::new(["pricing", "about"]);
        assert!(page.scroll_to_element("about"));
        assert!(!page.scroll_to_element("contact"));
    }

    #[test]
    fn test_each_capture_takes_one_line() {
        let recognizer =
            ConsoleRecognizer::from_reader(Cursor::new("Show me pricing\n\n".to_string()));

        let (_first, events) = capture(&recognizer);
        assert_eq!(next_event(&events), RecognitionEvent::Started);
        assert_eq!(
            next_event(&events),
            RecognitionEvent::Result("Show me pricing".to_string())
        );
        assert_eq!(next_event(&events), RecognitionEvent::End);

        let (_second, events) = capture(&recognizer);
        assert_eq!(next_event(&events), RecognitionEvent::Started);
        assert_eq!(
            next_event(&events),
            RecognitionEvent::Error("no-speech".to_string())
        );
        assert_eq!(next_event(&events), RecognitionEvent::End);

        wait_until_closed(&recognizer);
        let (_third, events) = capture(&recognizer);
        assert_eq!(next_event(&events), RecognitionEvent::Started);
        assert_eq!(next_event(&events), RecognitionEvent::End);
    }

    #[test]
    fn test_aborted_capture_leaves_next_line_for_the_next_capture() {
        let (keys, recognizer) = typed();

        let (mut first, first_events) = capture(&recognizer);
        first.abort();
        let (_second, second_events) = capture(&recognizer);

        keys.send(b"contact us\n".to_vec()).unwrap();
        assert_eq!(next_event(&second_events), RecognitionEvent::Started);
        assert_eq!(
            next_event(&second_events),
            RecognitionEvent::Result("contact us".to_string())
        );
        assert_eq!(next_event(&second_events), RecognitionEvent::End);

        let first_seen: Vec<_> = first_events.try_iter().map(|e| e.event).collect();
        assert_eq!(first_seen, vec![RecognitionEvent::Started]);
    }

    #[test]
    fn test_repeated_aborts_do_not_swallow_input() {
        let (keys, recognizer) = typed();
        for _ in 0..3 {
            let (mut handle, _events) = capture(&recognizer);
            handle.abort();
        }

        keys.send(b"go home\n".to_vec()).unwrap();
        // Give the reader time to queue the line with no capture listening
        thread::sleep(Duration::from_millis(50));

        let (_live, events) = capture(&recognizer);
        assert_eq!(next_event(&events), RecognitionEvent::Started);
        assert_eq!(
            next_event(&events),
            RecognitionEvent::Result("go home".to_string())
        );
    }

    #[test]
    fn test_end_of_input_closes_live_capture() {
        let (keys, recognizer) = typed();
        let (_handle, events) = capture(&recognizer);
        assert!(!recognizer.is_input_closed());

        drop(keys);
        assert_eq!(next_event(&events), RecognitionEvent::Started);
        assert_eq!(next_event(&events), RecognitionEvent::End);
        wait_until_closed(&recognizer);
    }
}
