//! Paced playback of numbered bitmap frames
//!
//! [`Player`] reads `<dir>/1.<ext>`, `<dir>/2.<ext>`, ... up to the requested
//! frame count, decodes them into [`GrayFrame`]s and blits them to a
//! [`Display`] on a fixed schedule.
//!
//! ## Pacing
//!
//! Frame `n` owns the time slot `[(n - 1) * d, n * d)` measured from the start
//! of playback, where `d = 1 s / fps`. After blitting frame `n` the player
//! sleeps until the end of that slot if it is still in the future. A frame
//! that finishes late is shown anyway and counted in
//! [`PlaybackReport::late`]; nothing is dropped to catch up. Skipped frames
//! keep their slot, so the following frames stay on schedule.
//!
//! ## Read-ahead
//!
//! Frames are decoded into a bounded buffer (see
//! [`PlayerConfig::capacity`]). When the buffer is full, or the last index
//! has been decoded, it is drained in index order and playback resumes
//! filling. Decoding therefore happens in bursts between bursts of display
//! updates:
//!
//! ```text
//! Idle -> Filling -> Draining -> Filling -> ... -> Draining -> Done
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use sh1107::animation::Player;
//! # use sh1107::{Builder, Dimensions, Display, DisplayInterface};
//! # use sh1107::command::Command;
//! # struct Bus;
//! # impl DisplayInterface for Bus {
//! #     type Error = core::convert::Infallible;
//! #     fn send_command(&mut self, _: Command) -> Result<(), Self::Error> { Ok(()) }
//! #     fn send_data(&mut self, _: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let dims = match Dimensions::new(128, 128) { Ok(d) => d, Err(_) => return };
//! # let config = match Builder::new().dimensions(dims).build() { Ok(c) => c, Err(_) => return };
//! # let mut display = match Display::new(Bus, config, vec![0u8; 2048]) { Ok(d) => d, Err(_) => return };
//! let mut player = Player::new();
//! if let Ok(report) = player.play(&mut display, "frame128", 6574, 30) {
//!     log::info!("{} frames shown, {} late", report.shown, report.late);
//! }
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::string::String;
use std::thread;
use std::time::{Duration, Instant};
use std::vec::Vec;

use embedded_graphics_core::geometry::OriginDimensions;
use embedded_graphics_core::pixelcolor::Rgb888;
use log::{debug, info, trace, warn};
use tinybmp::Bmp;

use crate::display::Display;
use crate::error::Error;
use crate::image::{GrayFrame, Image};
use crate::interface::DisplayInterface;

/// Frames decoded ahead of display
pub const DEFAULT_BUFFER_CAPACITY: usize = 30;

/// File extension of frame files
pub const DEFAULT_EXTENSION: &str = "bmp";

/// Errors from reading or decoding one frame file
#[derive(Debug)]
pub enum DecodeError {
    /// The file could not be read
    Io(io::Error),
    /// The file is not a supported bitmap
    Format(tinybmp::ParseError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Format(e) => write!(f, "Invalid bitmap: {e:?}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Format(_) => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tinybmp::ParseError> for DecodeError {
    fn from(err: tinybmp::ParseError) -> Self {
        Self::Format(err)
    }
}

/// Source of animation frames
///
/// Implemented by [`BmpDecoder`] and by any
/// `FnMut(&Path) -> Result<GrayFrame, DecodeError>` closure.
pub trait FrameDecoder {
    /// Load and decode the frame stored at `path`
    fn decode(&mut self, path: &Path) -> Result<GrayFrame, DecodeError>;
}

impl<F> FrameDecoder for F
where
    F: FnMut(&Path) -> Result<GrayFrame, DecodeError>,
{
    fn decode(&mut self, path: &Path) -> Result<GrayFrame, DecodeError> {
        self(path)
    }
}

/// Decodes uncompressed BMP files with `tinybmp`
///
/// Palette, 16-, 24- and 32-bit images are accepted; every pixel is reduced
/// to luma.
#[derive(Clone, Copy, Debug, Default)]
pub struct BmpDecoder;

impl BmpDecoder {
    /// Decode a BMP image held in memory
    pub fn decode_bytes(data: &[u8]) -> Result<GrayFrame, DecodeError> {
        let bmp = Bmp::<Rgb888>::from_slice(data)?;
        let size = bmp.size();
        Ok(GrayFrame::from_fn(size.width, size.height, |x, y| {
            bmp.luma(x, y)
        }))
    }
}

impl FrameDecoder for BmpDecoder {
    fn decode(&mut self, path: &Path) -> Result<GrayFrame, DecodeError> {
        let data = std::fs::read(path)?;
        Self::decode_bytes(&data)
    }
}

/// Player settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Maximum number of decoded frames held before draining
    pub capacity: usize,
    /// Frame file extension, without the dot
    pub extension: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_CAPACITY,
            extension: String::from(DEFAULT_EXTENSION),
        }
    }
}

impl PlayerConfig {
    /// Set the read-ahead capacity (at least 1)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the frame file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Where the player is in its fill/drain cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Not started
    #[default]
    Idle,
    /// Decoding frames into the buffer
    Filling,
    /// Showing buffered frames
    Draining,
    /// Finished, successfully or not
    Done,
}

/// Outcome of one [`Player::play`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Frames blitted to the display
    pub shown: u32,
    /// Frames that could not be read or decoded
    pub skipped: u32,
    /// Frames decoded but rejected because their size differs from the display
    pub rejected: u32,
    /// Frames whose update finished after the end of their time slot
    pub late: u32,
    /// Wall time from start of playback to the end of the last slot wait
    pub elapsed: Duration,
}

/// Duration of one frame at `fps`, treating 0 as 1
pub fn frame_duration(fps: u32) -> Duration {
    if fps == 0 {
        warn!("animation: fps must be positive, using 1");
    }
    Duration::from_secs(1) / fps.max(1)
}

/// Animation player with bounded read-ahead
#[derive(Debug)]
pub struct Player<D = BmpDecoder> {
    decoder: D,
    config: PlayerConfig,
    state: PlaybackState,
}

impl Player<BmpDecoder> {
    /// Player reading `.bmp` frames with the default capacity
    pub fn new() -> Self {
        Self::with_decoder(BmpDecoder)
    }
}

impl Default for Player<BmpDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Player<D>
where
    D: FrameDecoder,
{
    /// Player using a custom frame source
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            decoder,
            config: PlayerConfig::default(),
            state: PlaybackState::Idle,
        }
    }

    /// Replace the player settings
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = PlayerConfig {
            capacity: config.capacity.max(1),
            ..config
        };
        self
    }

    /// Current settings
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// State left by the last run
    ///
    /// [`play`](Self::play) borrows the player for the whole run, so callers
    /// only ever observe [`PlaybackState::Idle`] (never played) or
    /// [`PlaybackState::Done`]. The fill/drain transitions in between are
    /// logged at `debug` level.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Path of frame `index` inside `dir`
    pub fn frame_path(&self, dir: &Path, index: u32) -> PathBuf {
        dir.join(std::format!("{index}.{}", self.config.extension))
    }

    /// Play frames `1..=frame_count` from `dir` at `fps` frames per second
    ///
    /// Blocks until the last frame's slot has ended. Unreadable frames are
    /// logged and skipped; wrongly sized frames are logged and not shown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] from the first failed bus write. Playback
    /// stops there.
    pub fn play<I, B>(
        &mut self,
        display: &mut Display<I, B>,
        dir: impl AsRef<Path>,
        frame_count: u32,
        fps: u32,
    ) -> Result<PlaybackReport, Error<I>>
    where
        I: DisplayInterface,
        B: AsRef<[u8]> + AsMut<[u8]>,
    {
        let dir = dir.as_ref();
        let slot = frame_duration(fps);
        let capacity = self.config.capacity;
        info!(
            "animation: {} frames from {} at {} fps",
            frame_count,
            dir.display(),
            fps.max(1)
        );

        let mut report = PlaybackReport::default();
        let mut buffer: Vec<(u32, GrayFrame)> =
            Vec::with_capacity(capacity.min(frame_count as usize));
        let start = Instant::now();
        self.state = PlaybackState::Filling;

        for index in 1..=frame_count {
            let path = self.frame_path(dir, index);
            match self.decoder.decode(&path) {
                Ok(frame) => buffer.push((index, frame)),
                Err(e) => {
                    warn!("animation: skipping {}: {}", path.display(), e);
                    report.skipped += 1;
                }
            }

            if buffer.len() >= capacity || index == frame_count {
                self.state = PlaybackState::Draining;
                debug!("animation: draining {} frames", buffer.len());
                if let Err(e) = drain(display, &mut buffer, start, slot, &mut report) {
                    self.state = PlaybackState::Done;
                    return Err(e);
                }
                self.state = PlaybackState::Filling;
            }
        }

        self.state = PlaybackState::Done;
        report.elapsed = start.elapsed();
        info!(
            "animation: {} shown, {} skipped, {} late in {:?}",
            report.shown, report.skipped, report.late, report.elapsed
        );
        Ok(report)
    }
}

/// Blit every buffered frame in order, waiting out each frame's slot
fn drain<I, B>(
    display: &mut Display<I, B>,
    buffer: &mut Vec<(u32, GrayFrame)>,
    start: Instant,
    slot: Duration,
    report: &mut PlaybackReport,
) -> Result<(), Error<I>>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let dims = display.dimensions();
    for (index, frame) in buffer.drain(..) {
        display.blit(&frame)?;
        if frame.width() == u32::from(dims.width) && frame.height() == u32::from(dims.height) {
            report.shown += 1;
        } else {
            report.rejected += 1;
        }

        let target = start + slot * index;
        let now = Instant::now();
        if target > now {
            thread::sleep(target - now);
        } else {
            trace!("animation: frame {} late by {:?}", index, now - target);
            report.late += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::config::{Builder, Dimensions};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::vec;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Event {
        Decode(u32),
        Show(u32, Instant),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    #[derive(Debug, PartialEq)]
    struct MockError;

    /// Records which frame each data burst carries; frame `n` lights column `n`
    #[derive(Debug)]
    struct MockInterface {
        log: Log,
        fail: Rc<Cell<bool>>,
    }

    impl DisplayInterface for MockInterface {
        type Error = MockError;

        fn send_command(&mut self, _command: Command) -> Result<(), Self::Error> {
            if self.fail.get() { Err(MockError) } else { Ok(()) }
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            if self.fail.get() {
                return Err(MockError);
            }
            if let Some(column) = data.iter().position(|b| *b != 0) {
                self.log
                    .borrow_mut()
                    .push(Event::Show(column as u32, Instant::now()));
            }
            Ok(())
        }
    }

    fn test_display(log: &Log) -> Display<MockInterface, Vec<u8>> {
        let config = Builder::new()
            .dimensions(Dimensions::new(128, 8).unwrap())
            .build()
            .unwrap();
        let interface = MockInterface {
            log: Rc::clone(log),
            fail: Rc::default(),
        };
        Display::new(interface, config, vec![0u8; 128]).unwrap()
    }

    fn index_of(path: &Path) -> u32 {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse().ok())
            .unwrap()
    }

    fn marker_frame(index: u32) -> GrayFrame {
        GrayFrame::from_fn(128, 8, |x, y| if x == index && y == 0 { 255 } else { 0 })
    }

    fn shown(log: &Log) -> Vec<u32> {
        log.borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Show(index, _) => Some(*index),
                Event::Decode(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_frame_path() {
        let player = Player::new();
        assert_eq!(
            player.frame_path(Path::new("frames"), 42),
            Path::new("frames").join("42.bmp")
        );
        let player = player.with_config(PlayerConfig::default().with_extension("img"));
        assert_eq!(
            player.frame_path(Path::new("frames"), 1),
            Path::new("frames").join("1.img")
        );
    }

    #[test]
    fn test_frame_duration() {
        assert_eq!(frame_duration(30), Duration::from_nanos(33_333_333));
        assert_eq!(frame_duration(1), Duration::from_secs(1));
        assert_eq!(frame_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn test_capacity_minimum_is_one() {
        assert_eq!(PlayerConfig::default().with_capacity(0).capacity, 1);
        let player = Player::new().with_config(PlayerConfig {
            capacity: 0,
            extension: String::from("bmp"),
        });
        assert_eq!(player.config().capacity, 1);
    }

    #[test]
    fn test_frames_shown_in_order_and_paced() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let mut player =
            Player::with_decoder(|path: &Path| -> Result<GrayFrame, DecodeError> {
                Ok(marker_frame(index_of(path)))
            });
        let fps = 30;
        let slot = frame_duration(fps);
        let before = Instant::now();
        let report = player.play(&mut display, "frames", 5, fps).unwrap();

        assert_eq!(shown(&log), vec![1, 2, 3, 4, 5]);
        assert_eq!(report.shown, 5);
        assert_eq!(report.skipped, 0);
        assert_eq!(player.state(), PlaybackState::Done);

        // Frame n is never shown before slot n-1 has ended
        for (k, event) in log.borrow().iter().enumerate() {
            if let Event::Show(_, at) = event {
                assert!(*at >= before + slot * k as u32);
            }
        }
        // Within one frame duration of 5/30 s
        assert!(report.elapsed >= slot * 5);
        assert!(report.elapsed < slot * 6);
    }

    #[test]
    fn test_failed_frame_is_skipped() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let mut player =
            Player::with_decoder(|path: &Path| -> Result<GrayFrame, DecodeError> {
                match index_of(path) {
                    3 => Err(DecodeError::Io(io::Error::from(io::ErrorKind::NotFound))),
                    index => Ok(marker_frame(index)),
                }
            });
        let report = player.play(&mut display, "frames", 5, 200).unwrap();

        assert_eq!(shown(&log), vec![1, 2, 4, 5]);
        assert_eq!(report.shown, 4);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_buffer_fills_before_draining() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let decode_log = Rc::clone(&log);
        let mut player =
            Player::with_decoder(move |path: &Path| -> Result<GrayFrame, DecodeError> {
                let index = index_of(path);
                decode_log.borrow_mut().push(Event::Decode(index));
                Ok(marker_frame(index))
            })
            .with_config(PlayerConfig::default().with_capacity(2));
        player.play(&mut display, "frames", 5, 200).unwrap();

        let order: Vec<(char, u32)> = log
            .borrow()
            .iter()
            .map(|e| match e {
                Event::Decode(i) => ('d', *i),
                Event::Show(i, _) => ('s', *i),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                ('d', 1),
                ('d', 2),
                ('s', 1),
                ('s', 2),
                ('d', 3),
                ('d', 4),
                ('s', 3),
                ('s', 4),
                ('d', 5),
                ('s', 5),
            ]
        );
    }

    #[test]
    fn test_last_frame_failing_still_drains() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let mut player =
            Player::with_decoder(|path: &Path| -> Result<GrayFrame, DecodeError> {
                match index_of(path) {
                    3 => Err(DecodeError::Io(io::Error::from(io::ErrorKind::InvalidData))),
                    index => Ok(marker_frame(index)),
                }
            });
        let report = player.play(&mut display, "frames", 3, 200).unwrap();
        assert_eq!(shown(&log), vec![1, 2]);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_wrong_size_frame_is_rejected() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let mut player =
            Player::with_decoder(|_: &Path| -> Result<GrayFrame, DecodeError> {
                Ok(GrayFrame::from_fn(64, 8, |_, _| 255))
            });
        let report = player.play(&mut display, "frames", 2, 200).unwrap();
        assert!(shown(&log).is_empty());
        assert_eq!(report.rejected, 2);
        assert_eq!(report.shown, 0);
    }

    #[test]
    fn test_zero_frames() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        let mut player = Player::new();
        assert_eq!(player.state(), PlaybackState::Idle);
        let report = player.play(&mut display, "missing", 0, 30).unwrap();
        assert_eq!(report.shown + report.skipped, 0);
        assert_eq!(player.state(), PlaybackState::Done);
    }

    #[test]
    fn test_bus_error_aborts_playback() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        let fail = Rc::clone(&display.interface().fail);

        let mut player =
            Player::with_decoder(move |path: &Path| -> Result<GrayFrame, DecodeError> {
                let index = index_of(path);
                if index == 2 {
                    fail.set(true);
                }
                Ok(marker_frame(index))
            })
            .with_config(PlayerConfig::default().with_capacity(1));
        let result = player.play(&mut display, "frames", 4, 200);

        assert!(matches!(result, Err(Error::Interface(MockError))));
        assert_eq!(player.state(), PlaybackState::Done);
        assert_eq!(shown(&log).last(), Some(&1));
    }

    #[test]
    fn test_oversized_capacity_does_not_preallocate() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);
        log.borrow_mut().clear();

        let mut player =
            Player::with_decoder(|path: &Path| -> Result<GrayFrame, DecodeError> {
                Ok(marker_frame(index_of(path)))
            })
            .with_config(PlayerConfig::default().with_capacity(usize::MAX));
        let report = player.play(&mut display, "frames", 3, 200).unwrap();

        assert_eq!(shown(&log), vec![1, 2, 3]);
        assert_eq!(report.shown, 3);
    }

    #[test]
    fn test_state_between_runs() {
        let log: Log = Rc::default();
        let mut display = test_display(&log);

        let mut player =
            Player::with_decoder(|path: &Path| -> Result<GrayFrame, DecodeError> {
                Ok(marker_frame(index_of(path)))
            });
        assert_eq!(player.state(), PlaybackState::Idle);

        let first = player.play(&mut display, "frames", 2, 200).unwrap();
        assert_eq!(player.state(), PlaybackState::Done);

        // A finished player can run again; counters start from zero
        let second = player.play(&mut display, "frames", 2, 200).unwrap();
        assert_eq!(player.state(), PlaybackState::Done);
        assert_eq!((first.shown, second.shown), (2, 2));
    }
}
