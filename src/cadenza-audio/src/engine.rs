use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc, Mutex,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use thiserror::Error;

/// Audio playback errors.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio backend unavailable: {0}")]
    Backend(String),
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("{0}")]
    Other(String),
}

pub type AudioResult<T> = Result<T, AudioError>;

/// Abstract audio source. Backends may support a subset.
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// A URL (local file via `file://` or remote).
    Url(String),
    /// A local file path.
    File(PathBuf),
}

/// Runtime playback state for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    Idle,
    Playing,
    Paused,
    Completed,
    Stopped,
    Error,
}

struct Shared {
    state: Mutex<AudioState>,
    elapsed: Mutex<Duration>,
    stop_flag: AtomicBool,
    pause_flag: AtomicBool,
    volume: AtomicU8,
}

/// Handle representing an in-flight playback operation.
///
/// The handle is the only control surface a plugin gets: pause/resume,
/// stop, volume, and an elapsed-position read for status reports.
pub struct AudioHandle {
    shared: Arc<Shared>,
    join: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioHandle")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AudioHandle {
    pub(crate) fn spawn_simulated(duration: Duration, volume: u8) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(AudioState::Playing),
            elapsed: Mutex::new(Duration::ZERO),
            stop_flag: AtomicBool::new(false),
            pause_flag: AtomicBool::new(false),
            volume: AtomicU8::new(volume),
        });
        let worker = shared.clone();

        let join = thread::spawn(move || {
            let tick = Duration::from_millis(20);
            let mut last = Instant::now();
            loop {
                thread::sleep(tick);
                let now = Instant::now();
                if worker.stop_flag.load(Ordering::SeqCst) {
                    *worker.state.lock().unwrap() = AudioState::Stopped;
                    return;
                }
                if !worker.pause_flag.load(Ordering::SeqCst) {
                    let mut elapsed = worker.elapsed.lock().unwrap();
                    *elapsed += now - last;
                    if *elapsed >= duration {
                        drop(elapsed);
                        *worker.state.lock().unwrap() = AudioState::Completed;
                        return;
                    }
                }
                last = now;
            }
        });

        Self {
            shared,
            join: Some(join),
        }
    }

    pub fn state(&self) -> AudioState {
        *self.shared.state.lock().unwrap()
    }

    /// Elapsed playback time, frozen while paused.
    pub fn position(&self) -> Duration {
        *self.shared.elapsed.lock().unwrap()
    }

    pub fn pause(&self) {
        if self.state() == AudioState::Playing {
            self.shared.pause_flag.store(true, Ordering::SeqCst);
            *self.shared.state.lock().unwrap() = AudioState::Paused;
        }
    }

    pub fn resume(&self) {
        if self.state() == AudioState::Paused {
            self.shared.pause_flag.store(false, Ordering::SeqCst);
            *self.shared.state.lock().unwrap() = AudioState::Playing;
        }
    }

    /// Volume in [0, 100]. Values above 100 are clamped.
    pub fn set_volume(&self, level: u8) {
        self.shared.volume.store(level.min(100), Ordering::SeqCst);
    }

    pub fn volume(&self) -> u8 {
        self.shared.volume.load(Ordering::SeqCst)
    }

    pub fn stop(mut self) {
        self.shared.stop_flag.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Audio backend interface. Decoding and output are opaque to the core.
pub trait AudioEngine: Send + Sync {
    fn play(&self, source: AudioSource, volume: u8) -> AudioResult<AudioHandle>;
}

/// No-op audio engine used for tests and headless environments.
///
/// Simulates a clock without producing sound, so position reports and
/// pause/resume semantics stay testable.
#[derive(Debug, Clone)]
pub struct NullAudioEngine {
    track_length: Duration,
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self {
            track_length: Duration::from_secs(180),
        }
    }
}

impl NullAudioEngine {
    pub fn with_track_length(track_length: Duration) -> Self {
        Self { track_length }
    }
}

impl AudioEngine for NullAudioEngine {
    fn play(&self, source: AudioSource, volume: u8) -> AudioResult<AudioHandle> {
        tracing::debug!(?source, "starting simulated playback");
        Ok(AudioHandle::spawn_simulated(self.track_length, volume))
    }
}
