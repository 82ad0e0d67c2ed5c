//! Scan-direction rotation table
//!
//! The SH1107 rotates its output by changing the segment remap (column order)
//! and the COM scan direction (row order). This module maps each [`Rotation`]
//! to the pair of commands that selects it.
//!
//! | Rotation | Segment remap | COM scan |
//! |----------|---------------|----------|
//! | 0°       | `0xA0`        | `0xC0`   |
//! | 90°      | `0xA1`        | `0xC0`   |
//! | 180°     | `0xA1`        | `0xC8`   |
//! | 270°     | `0xA0`        | `0xC8`   |
//!
//! ## Known Limitation
//!
//! Only the controller's scan order changes. Framebuffer coordinates are not
//! transposed, so 90° and 270° produce a mirrored image rather than a
//! rotated one. 0° and 180° are correct.
//!
//! ## Example
//!
//! ```
//! use sh1107::{rotation::scan_commands, Rotation};
//!
//! let cmd = scan_commands(Rotation::Rotate180);
//! assert_eq!(cmd.as_bytes(), &[0xA1, 0xC8]);
//! ```

use crate::command::{
    COM_SCAN_NORMAL, COM_SCAN_REVERSE, Command, SEGMENT_REMAP_NORMAL, SEGMENT_REMAP_REVERSE,
};
use crate::config::Rotation;

/// Segment remap and COM scan command pair for `rotation`
pub fn scan_commands(rotation: Rotation) -> Command {
    match rotation {
        Rotation::Rotate0 => Command::pair(SEGMENT_REMAP_NORMAL, COM_SCAN_NORMAL),
        Rotation::Rotate90 => Command::pair(SEGMENT_REMAP_REVERSE, COM_SCAN_NORMAL),
        Rotation::Rotate180 => Command::pair(SEGMENT_REMAP_REVERSE, COM_SCAN_REVERSE),
        Rotation::Rotate270 => Command::pair(SEGMENT_REMAP_NORMAL, COM_SCAN_REVERSE),
    }
}
