//! Replay journals for recording and playing back runs.
//!
//! A journal stores the simulation parameters plus the per-tick stream of
//! commands and tick lengths. Feeding the journal back through a fresh
//! simulation recreates the run bit for bit, and the recorded final state
//! hash confirms it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::math::Fixed;
use crate::player::Command;
use crate::simulation::{Simulation, SimulationParams};

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Errors from recording, storing, or verifying replays.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Reading or writing the replay file failed.
    #[error("replay file error: {0}")]
    Io(#[from] std::io::Error),
    /// The replay bytes could not be encoded or decoded.
    #[error("replay codec error: {0}")]
    Codec(String),
    /// Playback reached the end with a different state hash than recorded.
    #[error("replay diverged: recorded hash {expected:#018x}, playback produced {actual:#018x}")]
    HashMismatch {
        /// Hash stored in the journal.
        expected: u64,
        /// Hash the playback simulation actually reached.
        actual: u64,
    },
}

/// One recorded tick: the commands applied before it and its length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Tick length as raw fixed-point bits.
    pub dt_bits: i64,
    /// Commands applied before this tick, in issue order.
    pub commands: Vec<Command>,
}

impl ReplayFrame {
    /// Create a frame from a tick length and its commands.
    #[must_use]
    pub fn new(dt: Fixed, commands: Vec<Command>) -> Self {
        Self {
            dt_bits: dt.to_bits(),
            commands,
        }
    }

    /// The tick length this frame was stepped with.
    #[must_use]
    pub fn dt(&self) -> Fixed {
        Fixed::from_bits(self.dt_bits)
    }
}

/// Complete replay journal.
///
/// The parameters fully determine the starting state, so no state snapshot
/// is stored; playback begins from [`Simulation::new`] with the same
/// parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Parameters the recorded run started from.
    pub params: SimulationParams,
    /// Recorded ticks in order.
    pub frames: Vec<ReplayFrame>,
    /// State hash at the end of the recorded run.
    pub final_hash: u64,
}

impl Replay {
    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ReplayError> {
        let bytes = bincode::serialize(self)
            .map_err(|e| ReplayError::Codec(format!("failed to serialize replay: {}", e)))?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or if the
    /// file was written by an incompatible format version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let bytes = std::fs::read(path.as_ref())?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| ReplayError::Codec(format!("failed to deserialize replay: {}", e)))?;

        if replay.version != REPLAY_VERSION {
            return Err(ReplayError::Codec(format!(
                "replay version mismatch: expected {}, found {}",
                REPLAY_VERSION, replay.version
            )));
        }

        Ok(replay)
    }

    /// Number of recorded ticks.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total number of commands across all frames.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.frames.iter().map(|frame| frame.commands.len()).sum()
    }
}

/// Builds a replay journal while the host runs the live simulation.
///
/// Call [`record_command`](Self::record_command) for every command fed to
/// [`Simulation::apply_command`] and [`record_tick`](Self::record_tick) for
/// every [`Simulation::tick`], then seal the journal with
/// [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    params: SimulationParams,
    frames: Vec<ReplayFrame>,
    staged: Vec<Command>,
}

impl ReplayRecorder {
    /// Start recording a run that began from the given parameters.
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        Self {
            params,
            frames: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Stage a command for the upcoming tick.
    ///
    /// Rejected commands belong in the journal too: a cast the simulation
    /// refused mutates nothing at record time or playback time.
    pub fn record_command(&mut self, command: Command) {
        self.staged.push(command);
    }

    /// Seal the staged commands into a frame with the tick length used.
    pub fn record_tick(&mut self, dt: Fixed) {
        let commands = std::mem::take(&mut self.staged);
        self.frames.push(ReplayFrame::new(dt, commands));
    }

    /// Number of frames sealed so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Close the journal with the final state hash of the recorded run.
    #[must_use]
    pub fn finish(self, final_hash: u64) -> Replay {
        Replay {
            version: REPLAY_VERSION,
            params: self.params,
            frames: self.frames,
            final_hash,
        }
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    /// The journal being played.
    replay: Replay,
    /// Current playback state.
    simulation: Simulation,
    /// Index of the next frame to play.
    cursor: usize,
}

impl ReplayPlayer {
    /// Create a player positioned before the first frame.
    #[must_use]
    pub fn new(replay: Replay) -> Self {
        let simulation = Simulation::new(replay.params);
        Self {
            replay,
            simulation,
            cursor: 0,
        }
    }

    /// Play the next recorded frame.
    ///
    /// Returns true if more frames remain after this one.
    pub fn advance(&mut self) -> bool {
        let Some(frame) = self.replay.frames.get(self.cursor) else {
            return false;
        };
        for command in &frame.commands {
            // Rejected commands were recorded as issued; they are rejected
            // identically here.
            let _ = self.simulation.apply_command(*command);
        }
        self.simulation.tick(frame.dt());
        self.cursor += 1;
        self.cursor < self.replay.frames.len()
    }

    /// Rewind and play forward to just before the given frame index.
    pub fn seek(&mut self, target_frame: usize) {
        self.simulation = Simulation::new(self.replay.params);
        self.cursor = 0;
        while self.cursor < target_frame && self.cursor < self.replay.frames.len() {
            self.advance();
        }
    }

    /// Index of the next frame to play.
    #[must_use]
    pub const fn current_frame(&self) -> usize {
        self.cursor
    }

    /// Get a reference to the current playback state.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Get the journal being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Check whether every frame has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.replay.frames.len()
    }

    /// Play every remaining frame and compare against the recorded hash.
    ///
    /// Returns the reached hash on success.
    ///
    /// # Errors
    /// Returns [`ReplayError::HashMismatch`] if playback ends in a different
    /// state than the journal recorded.
    pub fn verify(&mut self) -> Result<u64, ReplayError> {
        while self.advance() {}
        let actual = self.simulation.state_hash();
        if actual == self.replay.final_hash {
            Ok(actual)
        } else {
            Err(ReplayError::HashMismatch {
                expected: self.replay.final_hash,
                actual,
            })
        }
    }

    /// Get playback progress as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.frames.is_empty() {
            100.0
        } else {
            (self.cursor as f64 / self.replay.frames.len() as f64) * 100.0
        }
    }
}
