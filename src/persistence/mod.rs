//! File-backed leaderboard
//!
//! One plain-text file per mode under a base directory, one record per line:
//! `survival_time,dodges`. Each append opens the file, writes a single line
//! and closes it again. Lines that fail to parse are skipped with a warning
//! so one damaged entry never hides the rest of the board.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::error::StoreError;
use crate::highscores::{LeaderboardStore, ScoreRecord, rank};
use crate::sim::Mode;

#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    dir: PathBuf,
}

impl FileLeaderboard {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of `mode`'s board
    pub fn file_path(&self, mode: Mode) -> PathBuf {
        self.dir.join(format!("{}_scores.txt", mode.as_str()))
    }

    fn read_all(&self, mode: Mode) -> Result<Vec<ScoreRecord>, StoreError> {
        let path = self.file_path(mode);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No leaderboard at {:?}, starting fresh", path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let records = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match parse_line(mode, index + 1, line) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping entry in {:?}: {}", path, e);
                    None
                }
            })
            .collect();
        Ok(records)
    }
}

/// True when `file` has content whose last byte is not a newline
fn ends_mid_line(file: &mut File) -> Result<bool, StoreError> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn parse_line(mode: Mode, line_number: usize, line: &str) -> Result<ScoreRecord, StoreError> {
    let malformed = || StoreError::Malformed {
        line: line_number,
        content: line.to_string(),
    };

    let (time, dodges) = line.trim().split_once(',').ok_or_else(malformed)?;
    let survival_time: f32 = time.trim().parse().map_err(|_| malformed())?;
    let dodges: u32 = dodges.trim().parse().map_err(|_| malformed())?;
    if !survival_time.is_finite() || survival_time < 0.0 {
        return Err(malformed());
    }

    Ok(ScoreRecord::new(mode, survival_time, dodges))
}

impl LeaderboardStore for FileLeaderboard {
    fn append(&mut self, mode: Mode, record: ScoreRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_path(mode);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        // Terminate a torn last line so this record starts on its own
        if ends_mid_line(&mut file)? {
            log::warn!("{:?} ended mid-line, terminating it before appending", path);
            writeln!(file)?;
        }
        // f32 Display is the shortest exact form, so the value parses back unchanged
        writeln!(file, "{},{}", record.survival_time, record.dodges)?;
        log::info!(
            "Saved {} score {:.2}s ({} dodges) to {:?}",
            mode.as_str(),
            record.survival_time,
            record.dodges,
            path
        );
        Ok(())
    }

    fn load_top(&self, mode: Mode, n: usize) -> Result<Vec<ScoreRecord>, StoreError> {
        let mut records = self.read_all(mode)?;
        rank(&mut records);
        records.truncate(n);
        Ok(records)
    }
}
