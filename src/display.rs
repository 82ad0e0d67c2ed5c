//! Core display operations

use log::{debug, warn};

use crate::color::{Fill, is_lit};
use crate::command::{
    Command, DISPLAY_OFF, DISPLAY_ON, ENTIRE_DISPLAY_ON_RESUME, MAX_CONTRAST, NORMAL_DISPLAY,
    PAGE_ADDRESSING_MODE, SET_CLOCK_DIVIDE, SET_CONTRAST, SET_DC_DC, SET_DISPLAY_OFFSET,
    SET_DISPLAY_START_LINE, SET_MULTIPLEX_RATIO, SET_PRECHARGE, SET_VCOMH,
};
use crate::config::{Config, Dimensions, Rotation};
use crate::error::Error;
use crate::framebuffer::Framebuffer;
use crate::image::Image;
use crate::interface::DisplayInterface;
use crate::rotation::scan_commands;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Number of commands in the bring-up sequence
pub const BRING_UP_LEN: usize = 14;

/// Contrast register value for a brightness level
///
/// `level` is clamped to 0.0..=1.0 (NaN counts as 0.0) and scaled linearly
/// onto 0..=[`MAX_CONTRAST`], rounding halves up.
///
/// ```
/// use sh1107::display::contrast_for;
///
/// assert_eq!(contrast_for(0.0), 0);
/// assert_eq!(contrast_for(0.5), 64);
/// assert_eq!(contrast_for(1.0), 127);
/// assert_eq!(contrast_for(3.0), 127);
/// ```
pub fn contrast_for(level: f32) -> u8 {
    let level = if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    };
    (level * f32::from(MAX_CONTRAST) + 0.5) as u8
}

/// Core display driver for SH1107
///
/// Owns the bus interface and the framebuffer. Drawing operations only touch
/// the framebuffer; [`render`](Self::render) is the single path that sends
/// pixels to the controller. [`clear`](Self::clear),
/// [`test_pattern`](Self::test_pattern) and [`blit`](Self::blit) render
/// before returning.
///
/// The driver does no locking. Share it between threads only behind a mutex
/// or a channel owned by one task.
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B` - Framebuffer storage implementing `AsRef<[u8]> + AsMut<[u8]>`
pub struct Display<I, B>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Pixel store, one bit per pixel
    framebuffer: Framebuffer<B>,
    /// Display configuration
    config: Config,
    /// Last brightness level applied, 0.0..=1.0
    brightness: f32,
    /// Whether the display power is on
    is_display_on: bool,
}

impl<I, B> Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Bring up the controller and return a ready, cleared display
    ///
    /// Sends the bring-up sequence, applies the configured rotation and
    /// brightness, then clears the screen to dark.
    ///
    /// There is no retry. On error the interface and buffer are dropped,
    /// which releases the bus; the caller must start over.
    ///
    /// # Errors
    ///
    /// - [`Error::BufferTooSmall`] if `buffer` cannot hold the configured
    ///   dimensions (nothing is sent)
    /// - [`Error::Interface`] if any bus write fails
    pub fn new(interface: I, config: Config, buffer: B) -> Result<Self, Error<I>> {
        let framebuffer = Framebuffer::new(config.dimensions, buffer)?;
        let brightness = f32::from(config.contrast.min(MAX_CONTRAST)) / f32::from(MAX_CONTRAST);
        let mut display = Self {
            interface,
            framebuffer,
            config,
            brightness,
            is_display_on: false,
        };
        display.init()?;
        Ok(display)
    }

    /// Run the bring-up sequence, rotation, brightness and initial clear
    fn init(&mut self) -> DisplayResult<I> {
        debug!(
            "sh1107: bring-up {}x{} at {:#04x}",
            self.config.dimensions.width, self.config.dimensions.height, self.config.address
        );
        for command in self.bring_up_sequence() {
            self.send_command(command)?;
        }
        self.is_display_on = true;

        self.set_rotation(self.config.rotation)?;
        if let Some(level) = self.config.brightness {
            self.set_brightness(level)?;
        }
        self.clear(Fill::AllOff)
    }

    /// Controller bring-up commands, in the order they must be sent
    ///
    /// Later entries depend on state set by earlier ones: the panel is
    /// powered down first and powered up last.
    pub fn bring_up_sequence(&self) -> [Command; BRING_UP_LEN] {
        let config = &self.config;
        [
            Command::single(DISPLAY_OFF),
            Command::column_address(0),
            Command::with_arg(SET_DISPLAY_START_LINE, 0x00),
            Command::with_arg(SET_CONTRAST, config.contrast),
            Command::single(PAGE_ADDRESSING_MODE),
            Command::single(ENTIRE_DISPLAY_ON_RESUME),
            Command::single(NORMAL_DISPLAY),
            Command::with_arg(SET_MULTIPLEX_RATIO, config.multiplex_ratio()),
            Command::with_arg(SET_DISPLAY_OFFSET, config.display_offset),
            Command::with_arg(SET_CLOCK_DIVIDE, config.clock_divide),
            Command::with_arg(SET_PRECHARGE, config.precharge),
            Command::with_arg(SET_VCOMH, config.vcomh),
            Command::with_arg(SET_DC_DC, config.dc_dc),
            Command::single(DISPLAY_ON),
        ]
    }

    /// Turn the panel on
    pub fn on(&mut self) -> DisplayResult<I> {
        self.send_command(Command::single(DISPLAY_ON))?;
        self.is_display_on = true;
        Ok(())
    }

    /// Turn the panel off (display RAM is kept)
    pub fn off(&mut self) -> DisplayResult<I> {
        self.send_command(Command::single(DISPLAY_OFF))?;
        self.is_display_on = false;
        Ok(())
    }

    /// Change the controller scan direction
    ///
    /// Sends the segment remap / COM scan pair from
    /// [`scan_commands`](crate::rotation::scan_commands). For
    /// [`Rotation::Rotate90`] and [`Rotation::Rotate270`] the framebuffer is
    /// not transposed, so those modes mirror rather than rotate.
    pub fn set_rotation(&mut self, rotation: Rotation) -> DisplayResult<I> {
        debug!("sh1107: rotation {} degrees", rotation.degrees());
        self.send_command(scan_commands(rotation))?;
        self.config.rotation = rotation;
        Ok(())
    }

    /// Set brightness from 0.0 (dimmest) to 1.0 (brightest)
    ///
    /// Out-of-range levels are clamped. See [`contrast_for`] for the mapping.
    pub fn set_brightness(&mut self, level: f32) -> DisplayResult<I> {
        let contrast = contrast_for(level);
        debug!("sh1107: contrast {contrast:#04x}");
        self.send_command(Command::with_arg(SET_CONTRAST, contrast))?;
        self.brightness = f32::from(contrast) / f32::from(MAX_CONTRAST);
        Ok(())
    }

    /// Fill the whole screen and render immediately
    pub fn clear(&mut self, fill: Fill) -> DisplayResult<I> {
        self.framebuffer.fill(fill);
        self.render()
    }

    /// Set or clear one pixel in the framebuffer
    ///
    /// Off-screen coordinates are ignored. Nothing is sent until
    /// [`render`](Self::render).
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.framebuffer.set(x, y, on);
    }

    /// Read one pixel from the framebuffer, `None` when off-screen
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<bool> {
        self.framebuffer.get(x, y)
    }

    /// Send the framebuffer to the controller
    ///
    /// For every page: one 3-byte command burst selecting the page and column
    /// 0, then one data transaction carrying the page's `width` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interface`] from the first failed transaction; the
    /// remaining pages are not sent.
    pub fn render(&mut self) -> DisplayResult<I> {
        let pages = self.framebuffer.dimensions().pages();
        for page in 0..pages {
            self.interface
                .send_command(Command::page_address(page as u8))
                .map_err(Error::Interface)?;
            self.interface
                .send_data(self.framebuffer.page(page))
                .map_err(Error::Interface)?;
        }
        Ok(())
    }

    /// Draw a checkerboard, `(x + y) % 2 == 0` lit, and render it
    pub fn test_pattern(&mut self) -> DisplayResult<I> {
        let Dimensions { width, height } = self.framebuffer.dimensions();
        for y in 0..i32::from(height) {
            for x in 0..i32::from(width) {
                self.framebuffer.set(x, y, (x + y) % 2 == 0);
            }
        }
        self.render()
    }

    /// Draw a full-screen image and render it
    ///
    /// Each pixel is reduced to luma and thresholded (`luma > 127` is lit).
    /// The image must match the display size exactly; otherwise a warning is
    /// logged and neither the framebuffer nor the bus is touched.
    pub fn blit<Img>(&mut self, image: &Img) -> DisplayResult<I>
    where
        Img: Image + ?Sized,
    {
        let Dimensions { width, height } = self.framebuffer.dimensions();
        if image.width() != u32::from(width) || image.height() != u32::from(height) {
            warn!(
                "sh1107: blit requires a {}x{} image, got {}x{}",
                width,
                height,
                image.width(),
                image.height()
            );
            return Ok(());
        }

        for y in 0..image.height() {
            for x in 0..image.width() {
                self.framebuffer
                    .set(x as i32, y as i32, is_lit(image.luma(x, y)));
            }
        }
        self.render()
    }

    /// Send a command to the display controller
    fn send_command(&mut self, command: Command) -> DisplayResult<I> {
        self.interface
            .send_command(command)
            .map_err(Error::Interface)
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    /// Get display rotation
    pub fn rotation(&self) -> Rotation {
        self.config.rotation
    }

    /// Last brightness applied, 0.0..=1.0
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Whether the panel is powered on
    pub fn is_on(&self) -> bool {
        self.is_display_on
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the framebuffer
    pub fn framebuffer(&self) -> &Framebuffer<B> {
        &self.framebuffer
    }

    /// Access the interface
    pub fn interface(&self) -> &I {
        &self.interface
    }

    /// Tear down the driver and hand back the interface and buffer
    ///
    /// Dropping the returned interface closes the bus.
    pub fn release(self) -> (I, B) {
        (self.interface, self.framebuffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::image::GrayFrame;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Clone, Debug, PartialEq)]
    enum Transfer {
        Command(Vec<u8>),
        Data(Vec<u8>),
    }

    #[derive(Debug, Default)]
    struct MockInterface {
        transfers: Vec<Transfer>,
        /// Fail every transfer once this many have succeeded
        fail_after: Option<usize>,
    }

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl MockInterface {
        fn check(&self) -> Result<(), MockError> {
            match self.fail_after {
                Some(limit) if self.transfers.len() >= limit => Err(MockError),
                _ => Ok(()),
            }
        }

        fn commands(&self) -> Vec<Vec<u8>> {
            self.transfers
                .iter()
                .filter_map(|t| match t {
                    Transfer::Command(bytes) => Some(bytes.clone()),
                    Transfer::Data(_) => None,
                })
                .collect()
        }

        fn data(&self) -> Vec<Vec<u8>> {
            self.transfers
                .iter()
                .filter_map(|t| match t {
                    Transfer::Data(bytes) => Some(bytes.clone()),
                    Transfer::Command(_) => None,
                })
                .collect()
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = MockError;

        fn send_command(&mut self, command: Command) -> Result<(), Self::Error> {
            self.check()?;
            self.transfers
                .push(Transfer::Command(command.as_bytes().to_vec()));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.check()?;
            self.transfers.push(Transfer::Data(data.to_vec()));
            Ok(())
        }
    }

    fn config(width: u16, height: u16) -> Config {
        Builder::new()
            .dimensions(Dimensions::new(width, height).unwrap())
            .build()
            .unwrap()
    }

    fn test_display() -> Display<MockInterface, Vec<u8>> {
        let mut display =
            Display::new(MockInterface::default(), config(128, 128), vec![0u8; 2048]).unwrap();
        display.interface.transfers.clear();
        display
    }

    #[test]
    fn test_new_sends_bring_up_in_order() {
        let display =
            Display::new(MockInterface::default(), config(128, 128), vec![0u8; 2048]).unwrap();
        let commands = display.interface.commands();
        let expected: [&[u8]; BRING_UP_LEN] = [
            &[0xAE],
            &[0x00, 0x10],
            &[0xDC, 0x00],
            &[0x81, 0x7F],
            &[0x20],
            &[0xA4],
            &[0xA6],
            &[0xA8, 0x7F],
            &[0xD3, 0x00],
            &[0xD5, 0x41],
            &[0xD9, 0x22],
            &[0xDB, 0x35],
            &[0xAD, 0x8A],
            &[0xAF],
        ];
        for (sent, want) in commands.iter().zip(expected.iter()) {
            assert_eq!(sent.as_slice(), *want);
        }
        // Rotation follows bring-up, then the initial clear renders 16 pages
        assert_eq!(commands[BRING_UP_LEN], vec![0xA0, 0xC0]);
        assert_eq!(commands.len(), BRING_UP_LEN + 1 + 16);
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0));
        assert!(display.is_on());
    }

    #[test]
    fn test_new_applies_configured_rotation_and_brightness() {
        let config = Builder::new()
            .dimensions(Dimensions::new(128, 64).unwrap())
            .rotation(Rotation::Rotate180)
            .brightness(0.5)
            .build()
            .unwrap();
        let display = Display::new(MockInterface::default(), config, vec![0u8; 1024]).unwrap();
        let commands = display.interface.commands();
        assert_eq!(commands[7], vec![0xA8, 63]);
        assert_eq!(commands[BRING_UP_LEN], vec![0xA1, 0xC8]);
        assert_eq!(commands[BRING_UP_LEN + 1], vec![0x81, 64]);
        assert_eq!(display.rotation(), Rotation::Rotate180);
    }

    #[test]
    fn test_new_small_buffer_sends_nothing() {
        let result = Display::new(MockInterface::default(), config(128, 128), vec![0u8; 100]);
        assert!(matches!(
            result,
            Err(Error::BufferTooSmall {
                required: 2048,
                provided: 100
            })
        ));
    }

    #[test]
    fn test_new_propagates_bus_failure() {
        let interface = MockInterface {
            fail_after: Some(3),
            ..MockInterface::default()
        };
        let result = Display::new(interface, config(128, 128), vec![0u8; 2048]);
        assert!(matches!(result, Err(Error::Interface(MockError))));
    }

    #[test]
    fn test_brightness_mapping() {
        let mut display = test_display();
        for (level, contrast) in [
            (0.0, 0u8),
            (1.0, 127),
            (0.5, 64),
            (-0.5, 0),
            (7.0, 127),
            (f32::NAN, 0),
        ] {
            display.interface.transfers.clear();
            display.set_brightness(level).unwrap();
            assert_eq!(
                display.interface.transfers,
                vec![Transfer::Command(vec![0x81, contrast])]
            );
        }
    }

    #[test]
    fn test_brightness_is_linear() {
        let mut previous = 0;
        for step in 0..=100u8 {
            let contrast = contrast_for(f32::from(step) / 100.0);
            assert!(contrast >= previous);
            assert!(contrast <= MAX_CONTRAST);
            previous = contrast;
        }
        assert_eq!(previous, MAX_CONTRAST);
    }

    #[test]
    fn test_brightness_is_tracked() {
        let mut display = test_display();
        assert!((display.brightness() - 1.0).abs() < f32::EPSILON);
        display.set_brightness(0.0).unwrap();
        assert!(display.brightness().abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_rotation_sends_pair() {
        let mut display = test_display();
        display.set_rotation(Rotation::Rotate90).unwrap();
        display.set_rotation(Rotation::Rotate270).unwrap();
        assert_eq!(
            display.interface.commands(),
            vec![vec![0xA1, 0xC0], vec![0xA0, 0xC8]]
        );
        assert_eq!(display.rotation(), Rotation::Rotate270);
        // The framebuffer keeps its native geometry
        assert_eq!(display.dimensions(), Dimensions::new(128, 128).unwrap());
    }

    #[test]
    fn test_on_off() {
        let mut display = test_display();
        display.off().unwrap();
        assert!(!display.is_on());
        display.on().unwrap();
        assert!(display.is_on());
        assert_eq!(display.interface.commands(), vec![vec![0xAE], vec![0xAF]]);
    }

    #[test]
    fn test_clear_fills_and_renders() {
        let mut display = test_display();
        display.clear(Fill::AllOn).unwrap();
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0xFF));
        assert_eq!(display.interface.data().len(), 16);
        assert!(
            display
                .interface
                .data()
                .iter()
                .all(|page| page.iter().all(|b| *b == 0xFF))
        );

        display.clear(Fill::AllOff).unwrap();
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_render_page_layout() {
        let mut display = test_display();
        display.set_pixel(3, 17, true);
        display.render().unwrap();

        let transfers = &display.interface.transfers;
        assert_eq!(transfers.len(), 32);
        for (page, pair) in transfers.chunks(2).enumerate() {
            assert_eq!(
                pair[0],
                Transfer::Command(vec![0xB0 | page as u8, 0x00, 0x10])
            );
            match &pair[1] {
                Transfer::Data(bytes) => {
                    assert_eq!(bytes.len(), 128);
                    let expected = if page == 2 { 0b0000_0010 } else { 0 };
                    assert_eq!(bytes[3], expected);
                }
                Transfer::Command(_) => panic!("expected page data"),
            }
        }
    }

    #[test]
    fn test_render_narrow_display() {
        let mut display =
            Display::new(MockInterface::default(), config(64, 32), vec![0u8; 256]).unwrap();
        display.interface.transfers.clear();
        display.render().unwrap();
        let data = display.interface.data();
        assert_eq!(data.len(), 4);
        assert!(data.iter().all(|page| page.len() == 64));
    }

    #[test]
    fn test_render_error_stops_transfer() {
        let mut display = test_display();
        display.interface.fail_after = Some(5);
        let result = display.render();
        assert!(matches!(result, Err(Error::Interface(MockError))));
        assert_eq!(display.interface.transfers.len(), 5);
    }

    #[test]
    fn test_drawing_is_memory_only() {
        let mut display = test_display();
        display.set_pixel(10, 10, true);
        display.set_pixel(500, 10, true);
        assert!(display.interface.transfers.is_empty());
        assert_eq!(display.get_pixel(10, 10), Some(true));
        assert_eq!(display.get_pixel(500, 10), None);
    }

    #[test]
    fn test_test_pattern_is_checkerboard() {
        let mut display = test_display();
        display.test_pattern().unwrap();
        for y in 0..128 {
            for x in 0..128 {
                assert_eq!(display.get_pixel(x, y), Some((x + y) % 2 == 0));
            }
        }
        // Even columns light even rows: 0b0101_0101
        assert_eq!(display.framebuffer().page(0)[0], 0x55);
        assert_eq!(display.framebuffer().page(0)[1], 0xAA);
        assert_eq!(display.interface.data().len(), 16);
    }

    #[test]
    fn test_blit_threshold() {
        let mut display = test_display();
        let frame = GrayFrame::from_fn(128, 128, |x, _| if x % 2 == 0 { 128 } else { 127 });
        display.blit(&frame).unwrap();
        for x in 0..128 {
            assert_eq!(display.get_pixel(x, 0), Some(x % 2 == 0));
            assert_eq!(display.get_pixel(x, 127), Some(x % 2 == 0));
        }
    }

    #[test]
    fn test_blit_renders_once() {
        let mut display = test_display();
        let frame = GrayFrame::from_fn(128, 128, |_, _| 255);
        display.blit(&frame).unwrap();
        assert_eq!(display.interface.commands().len(), 16);
        assert_eq!(display.interface.data().len(), 16);
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_blit_size_mismatch_is_noop() {
        let mut display = test_display();
        display.set_pixel(0, 0, true);
        let before = display.framebuffer().as_bytes().to_vec();

        for (w, h) in [(129, 128), (128, 127), (64, 64), (0, 0)] {
            let frame = GrayFrame::from_fn(w, h, |_, _| 255);
            display.blit(&frame).unwrap();
        }
        assert_eq!(display.framebuffer().as_bytes(), &before[..]);
        assert!(display.interface.transfers.is_empty());
    }

    #[test]
    fn test_release_returns_parts() {
        let display = test_display();
        let (interface, buffer) = display.release();
        assert!(interface.transfers.is_empty());
        assert_eq!(buffer.len(), 2048);
    }
}
