use std::{
    collections::{HashMap, HashSet},
    future::Future,
    time::Duration,
};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use super::error::{Error, Result};

/// Status reported asynchronously by a loaded audio resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStatus {
    Progress {
        position: Duration,
        duration: Option<Duration>,
    },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaEvent {
    pub generation: u64,
    pub status: MediaStatus,
}

/// Channel end handed to a backend on load. Every event it sends is tagged
/// with the generation of the resource it belongs to.
#[derive(Debug, Clone)]
pub struct StatusSink {
    generation: u64,
    tx: mpsc::UnboundedSender<MediaEvent>,
}

impl StatusSink {
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<MediaEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns false once the receiving session is gone.
    pub fn send(&self, status: MediaStatus) -> bool {
        self.tx
            .send(MediaEvent {
                generation: self.generation,
                status,
            })
            .is_ok()
    }
}

/// One loaded audio resource.
pub trait MediaHandle: Send + 'static {
    fn play(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn pause(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn seek(&mut self, position: Duration) -> impl Future<Output = Result<()>> + Send;

    /// Length of the resource, when the backend knows it.
    fn duration(&self) -> Option<Duration>;

    fn release(self) -> impl Future<Output = ()> + Send;
}

/// Produces audio resources for URLs.
pub trait MediaBackend: Send + Sync + 'static {
    type Handle: MediaHandle;

    fn load(
        &self,
        url: &str,
        sink: StatusSink,
    ) -> impl Future<Output = Result<Self::Handle>> + Send;
}

/// Headless backend that "plays" tracks against the tokio clock, emitting a
/// progress event every tick and a completion event at the end.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    default_length: Duration,
    tick: Duration,
    lengths: HashMap<String, Duration>,
    unplayable: HashSet<String>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(180))
    }
}

impl SimulatedBackend {
    pub fn new(default_length: Duration) -> Self {
        Self {
            default_length,
            tick: Duration::from_secs(1),
            lengths: HashMap::new(),
            unplayable: HashSet::new(),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_track(mut self, url: impl Into<String>, length: Duration) -> Self {
        self.lengths.insert(url.into(), length);
        self
    }

    /// Makes every load of `url` fail.
    pub fn with_unplayable(mut self, url: impl Into<String>) -> Self {
        self.unplayable.insert(url.into());
        self
    }
}

enum SimControl {
    Play,
    Pause,
    Seek(Duration),
}

pub struct SimulatedHandle {
    control: mpsc::UnboundedSender<SimControl>,
    length: Duration,
    task: JoinHandle<()>,
}

impl MediaBackend for SimulatedBackend {
    type Handle = SimulatedHandle;

    async fn load(&self, url: &str, sink: StatusSink) -> Result<SimulatedHandle> {
        if self.unplayable.contains(url) {
            return Err(Error::Media {
                url: url.to_string(),
                reason: "source unavailable".to_string(),
            });
        }

        let length = self
            .lengths
            .get(url)
            .copied()
            .unwrap_or(self.default_length);
        let (control, control_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(drive(length, self.tick, sink, control_rx));

        tracing::debug!(url, ?length, "simulated track loaded");
        Ok(SimulatedHandle {
            control,
            length,
            task,
        })
    }
}

impl SimulatedHandle {
    fn send(&self, msg: SimControl) -> Result<()> {
        self.control.send(msg).map_err(|_| Error::Media {
            url: String::new(),
            reason: "resource already finished".to_string(),
        })
    }
}

impl MediaHandle for SimulatedHandle {
    async fn play(&mut self) -> Result<()> {
        self.send(SimControl::Play)
    }

    async fn pause(&mut self) -> Result<()> {
        self.send(SimControl::Pause)
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        self.send(SimControl::Seek(position))
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.length)
    }

    async fn release(self) {
        self.task.abort();
    }
}

async fn drive(
    length: Duration,
    tick: Duration,
    sink: StatusSink,
    mut control: mpsc::UnboundedReceiver<SimControl>,
) {
    let mut position = Duration::ZERO;
    let mut playing = false;
    let mut ticker = interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            msg = control.recv() => match msg {
                Some(SimControl::Play) => {
                    if !playing {
                        playing = true;
                        ticker.reset();
                    }
                }
                Some(SimControl::Pause) => playing = false,
                Some(SimControl::Seek(to)) => {
                    position = to.min(length);
                    sink.send(MediaStatus::Progress {
                        position,
                        duration: Some(length),
                    });
                }
                None => break,
            },
            _ = ticker.tick(), if playing => {
                position = (position + tick).min(length);
                if position >= length {
                    sink.send(MediaStatus::Finished);
                    break;
                }
                if !sink.send(MediaStatus::Progress { position, duration: Some(length) }) {
                    break;
                }
            }
        }
    }
}
