use std::{future, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{interval_at, Instant, Interval, MissedTickBehavior},
};

use super::{
    error::{Error, Result},
    media::{MediaBackend, MediaEvent, MediaHandle, MediaStatus, StatusSink},
};
use crate::models::song::Song;

const SLEEP_TICK: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Idle,
    Paused,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Previous,
}

/// Observable state of a [`PlaybackSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub transport: Transport,
    pub current: Option<Song>,
    pub queue_len: usize,
    pub queue_index: Option<usize>,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub seeking: bool,
    pub sleep_minutes_left: Option<u32>,
    pub last_error: Option<Error>,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            transport: Transport::Idle,
            current: None,
            queue_len: 0,
            queue_index: None,
            position: Duration::ZERO,
            duration: None,
            seeking: false,
            sleep_minutes_left: None,
            last_error: None,
        }
    }

    /// Playback progress in `[0, 1]`, or 0 without a known duration.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(duration) if !duration.is_zero() => {
                (self.position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Wraps `index` into `0..len` at both ends. `None` for an empty queue.
pub fn wrap_index(index: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(index.rem_euclid(len as isize) as usize)
}

type Reply = oneshot::Sender<Result<()>>;

enum Command {
    Play { song: Song, reply: Reply },
    Toggle { reply: Reply },
    Seek { fraction: f64, reply: Reply },
    Skip { direction: SkipDirection, reply: Reply },
    SetQueue { songs: Vec<Song>, reply: Reply },
    PlayFrom { songs: Vec<Song>, index: usize, reply: Reply },
    BeginSeek { reply: Reply },
    EndSeek { fraction: f64, reply: Reply },
    SetSleepTimer { minutes: Option<u32>, reply: Reply },
    Shutdown { reply: Reply },
}

/// Handle to the task that owns the single active audio resource. Commands
/// are processed one at a time, in the order they were sent.
#[derive(Clone)]
pub struct PlaybackSession {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<SessionSnapshot>,
}

impl PlaybackSession {
    pub fn spawn<B: MediaBackend>(backend: B) -> Self {
        let (commands, command_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SessionSnapshot::idle());

        let actor = SessionActor {
            backend,
            handle: None,
            generation: 0,
            events_tx,
            queue: Vec::new(),
            index: None,
            current: None,
            transport: Transport::Idle,
            position: Duration::ZERO,
            duration: None,
            seeking: false,
            sleep: None,
            last_error: None,
            state_tx,
        };
        tokio::spawn(actor.run(command_rx, events_rx));

        Self { commands, state }
    }

    pub async fn play(&self, song: Song) -> Result<()> {
        self.request(|reply| Command::Play { song, reply }).await
    }

    pub async fn toggle(&self) -> Result<()> {
        self.request(|reply| Command::Toggle { reply }).await
    }

    pub async fn seek(&self, fraction: f64) -> Result<()> {
        self.request(|reply| Command::Seek { fraction, reply }).await
    }

    pub async fn skip(&self, direction: SkipDirection) -> Result<()> {
        self.request(|reply| Command::Skip { direction, reply })
            .await
    }

    pub async fn set_queue(&self, songs: Vec<Song>) -> Result<()> {
        self.request(|reply| Command::SetQueue { songs, reply }).await
    }

    pub async fn play_from(&self, songs: Vec<Song>, index: usize) -> Result<()> {
        self.request(|reply| Command::PlayFrom {
            songs,
            index,
            reply,
        })
        .await
    }

    pub async fn begin_seek(&self) -> Result<()> {
        self.request(|reply| Command::BeginSeek { reply }).await
    }

    pub async fn end_seek(&self, fraction: f64) -> Result<()> {
        self.request(|reply| Command::EndSeek { fraction, reply })
            .await
    }

    /// Pauses playback after `minutes` whole minutes; `None` disarms.
    pub async fn set_sleep_timer(&self, minutes: Option<u32>) -> Result<()> {
        self.request(|reply| Command::SetSleepTimer { minutes, reply })
            .await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.clone()
    }

    async fn request(&self, make: impl FnOnce(Reply) -> Command) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)?
    }
}

struct SleepTimer {
    minutes_left: u32,
    ticker: Interval,
}

async fn next_sleep_tick(timer: &mut Option<SleepTimer>) {
    match timer {
        Some(timer) => {
            timer.ticker.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

struct SessionActor<B: MediaBackend> {
    backend: B,
    handle: Option<B::Handle>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<MediaEvent>,

    queue: Vec<Song>,
    index: Option<usize>,
    current: Option<Song>,

    transport: Transport,
    position: Duration,
    duration: Option<Duration>,
    seeking: bool,
    sleep: Option<SleepTimer>,
    last_error: Option<Error>,

    state_tx: watch::Sender<SessionSnapshot>,
}

impl<B: MediaBackend> SessionActor<B> {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<MediaEvent>,
    ) {
        loop {
            // Pending media events are applied before the next command so a
            // command never observes state older than what was reported.
            tokio::select! {
                biased;

                Some(event) = events.recv() => self.on_media_event(event).await,
                command = commands.recv() => match command {
                    Some(Command::Shutdown { reply }) => {
                        self.release().await;
                        self.sleep = None;
                        self.publish();
                        let _ = reply.send(Ok(()));
                        break;
                    }
                    Some(command) => self.dispatch(command).await,
                    None => {
                        self.release().await;
                        break;
                    }
                },
                _ = next_sleep_tick(&mut self.sleep) => self.on_sleep_tick().await,
            }

            self.publish();
        }

        tracing::debug!("playback session stopped");
    }

    async fn dispatch(&mut self, command: Command) {
        let (result, reply) = match command {
            Command::Play { song, reply } => {
                let index = self.queue.iter().position(|queued| queued.id == song.id);
                let result = self.play(song).await;
                if result.is_ok() {
                    self.index = index;
                }
                (result, reply)
            }
            Command::Toggle { reply } => (self.toggle().await, reply),
            Command::Seek { fraction, reply } => (self.seek(fraction).await, reply),
            Command::Skip { direction, reply } => (self.skip(direction).await, reply),
            Command::SetQueue { songs, reply } => {
                self.set_queue(songs);
                (Ok(()), reply)
            }
            Command::PlayFrom {
                songs,
                index,
                reply,
            } => {
                self.set_queue(songs);
                (self.play_at(index).await, reply)
            }
            Command::BeginSeek { reply } => {
                self.seeking = true;
                (Ok(()), reply)
            }
            Command::EndSeek { fraction, reply } => {
                self.seeking = false;
                (self.seek(fraction).await, reply)
            }
            Command::SetSleepTimer { minutes, reply } => {
                self.set_sleep_timer(minutes);
                (Ok(()), reply)
            }
            Command::Shutdown { reply } => (Ok(()), reply),
        };

        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        let _ = reply.send(result);
    }

    fn set_queue(&mut self, songs: Vec<Song>) {
        self.index = self
            .current
            .as_ref()
            .and_then(|current| songs.iter().position(|song| song.id == current.id));
        self.queue = songs;
    }

    async fn play_at(&mut self, index: usize) -> Result<()> {
        let song = self
            .queue
            .get(index)
            .cloned()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.queue.len(),
            })?;

        let previous_index = self.index;
        self.index = Some(index);
        let result = self.play(song).await;
        if result.is_err() {
            self.index = previous_index;
        }
        result
    }

    /// Releases the active resource, then acquires and starts one for `song`.
    /// On failure the remembered song is left as it was and transport is idle.
    async fn play(&mut self, song: Song) -> Result<()> {
        self.release().await;

        self.generation += 1;
        let sink = StatusSink::new(self.generation, self.events_tx.clone());

        let mut handle = match self.backend.load(&song.audio_url, sink).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(song_id = %song.id, error = %e, "failed to load track");
                return Err(e);
            }
        };

        if let Err(e) = handle.play().await {
            tracing::warn!(song_id = %song.id, error = %e, "failed to start track");
            handle.release().await;
            return Err(e);
        }

        tracing::info!(song_id = %song.id, title = %song.title, "now playing");

        self.duration = handle.duration().or_else(|| {
            (song.duration_seconds > 0).then(|| Duration::from_secs(song.duration_seconds.into()))
        });
        self.handle = Some(handle);
        self.current = Some(song);
        self.transport = Transport::Playing;
        self.position = Duration::ZERO;
        self.last_error = None;
        Ok(())
    }

    async fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release().await;
        }
        self.transport = Transport::Idle;
        self.position = Duration::ZERO;
    }

    async fn toggle(&mut self) -> Result<()> {
        match (self.transport, self.handle.as_mut()) {
            (Transport::Playing, Some(handle)) => {
                handle.pause().await?;
                self.transport = Transport::Paused;
                Ok(())
            }
            (Transport::Paused, Some(handle)) => {
                handle.play().await?;
                self.transport = Transport::Playing;
                Ok(())
            }
            _ => match self.current.clone() {
                Some(song) => self.play(song).await,
                None => Ok(()),
            },
        }
    }

    async fn seek(&mut self, fraction: f64) -> Result<()> {
        if self.transport == Transport::Idle {
            return Ok(());
        }
        let (Some(handle), Some(duration)) = (self.handle.as_mut(), self.duration) else {
            return Ok(());
        };

        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let target = duration.mul_f64(fraction);

        handle.seek(target).await?;
        self.position = target;
        Ok(())
    }

    async fn skip(&mut self, direction: SkipDirection) -> Result<()> {
        let step = match (self.index, direction) {
            (Some(index), SkipDirection::Next) => index as isize + 1,
            (Some(index), SkipDirection::Previous) => index as isize - 1,
            (None, SkipDirection::Next) => 0,
            (None, SkipDirection::Previous) => -1,
        };
        let target = wrap_index(step, self.queue.len()).ok_or(Error::EmptyQueue)?;

        self.play_at(target).await
    }

    fn set_sleep_timer(&mut self, minutes: Option<u32>) {
        self.sleep = minutes.filter(|m| *m > 0).map(|minutes_left| {
            let mut ticker = interval_at(Instant::now() + SLEEP_TICK, SLEEP_TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            SleepTimer {
                minutes_left,
                ticker,
            }
        });
        tracing::debug!(?minutes, "sleep timer set");
    }

    async fn on_sleep_tick(&mut self) {
        let Some(timer) = self.sleep.as_mut() else {
            return;
        };

        timer.minutes_left = timer.minutes_left.saturating_sub(1);
        if timer.minutes_left > 0 {
            return;
        }

        self.sleep = None;
        if let (Transport::Playing, Some(handle)) = (self.transport, self.handle.as_mut()) {
            match handle.pause().await {
                Ok(()) => {
                    self.transport = Transport::Paused;
                    tracing::info!("sleep timer elapsed, playback paused");
                }
                Err(e) => self.last_error = Some(e),
            }
        }
    }

    async fn on_media_event(&mut self, event: MediaEvent) {
        if event.generation != self.generation || self.handle.is_none() {
            tracing::trace!(generation = event.generation, "dropping stale media event");
            return;
        }

        match event.status {
            MediaStatus::Progress { position, duration } => {
                if duration.is_some() {
                    self.duration = duration;
                }
                if !self.seeking {
                    self.position = position;
                }
            }
            MediaStatus::Finished => {
                if self.queue.is_empty() {
                    self.release().await;
                    return;
                }
                if let Err(e) = self.skip(SkipDirection::Next).await {
                    self.last_error = Some(e);
                }
            }
        }
    }

    fn publish(&self) {
        self.state_tx.send_replace(SessionSnapshot {
            transport: self.transport,
            current: self.current.clone(),
            queue_len: self.queue.len(),
            queue_index: self.index,
            position: self.position,
            duration: self.duration,
            seeking: self.seeking,
            sleep_minutes_left: self.sleep.as_ref().map(|timer| timer.minutes_left),
            last_error: self.last_error.clone(),
        });
    }
}
