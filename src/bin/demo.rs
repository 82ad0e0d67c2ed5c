//! SH1107 demo
//!
//! Walks a panel through every driver feature: power on, full clear,
//! brightness ramp, checkerboard, a smiley drawn with embedded-graphics and,
//! when a frame directory is given, a paced animation.
//!
//! # Usage
//!
//! ```bash
//! # 128x128 panel on /dev/i2c-0 at 0x3C
//! sh1107-demo
//!
//! # Different bus and address, then play frame128/1.bmp .. frame128/6574.bmp
//! sh1107-demo --bus 1 --address 0x3D --animation frame128 --frames 6574 --fps 30
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use clap::Parser;
use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
};
use log::{error, info};
use sh1107::{
    Builder, DEFAULT_ADDRESS, Dimensions, Display, Fill, LinuxDisplay, OpenError, Player,
    Rotation,
};

/// SH1107 OLED demo
#[derive(Parser, Debug)]
#[command(name = "sh1107-demo")]
#[command(version)]
#[command(about = "Exercise an SH1107 OLED panel over Linux I2C")]
struct Args {
    /// I2C bus number (opens /dev/i2c-N)
    #[arg(short, long, default_value_t = 0)]
    bus: u8,

    /// 7-bit device address, decimal or 0x-prefixed hex
    #[arg(short, long, default_value_t = DEFAULT_ADDRESS, value_parser = parse_address)]
    address: u8,

    /// Panel width in pixels
    #[arg(long, default_value_t = 128)]
    width: u16,

    /// Panel height in pixels (multiple of 8)
    #[arg(long, default_value_t = 128)]
    height: u16,

    /// Rotation in degrees (0, 90, 180, 270)
    #[arg(short, long, default_value_t = 0)]
    rotation: u16,

    /// Directory of numbered BMP frames to play after the still demos
    #[arg(long)]
    animation: Option<PathBuf>,

    /// Number of animation frames
    #[arg(long, default_value_t = 6574)]
    frames: u32,

    /// Animation frame rate
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .map_or_else(|| s.parse(), |hex| u8::from_str_radix(hex, 16));
    match parsed {
        Ok(address) if address <= 0x7F => Ok(address),
        Ok(address) => Err(format!("{address:#04x} is not a 7-bit address")),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Debug)]
enum DemoError {
    Config(sh1107::BuilderError),
    Open(OpenError),
    Bus(sh1107::Error<sh1107::linux::LinuxInterface>),
}

impl std::fmt::Display for DemoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Open(e) => write!(f, "{e}"),
            Self::Bus(e) => write!(f, "{e}"),
        }
    }
}

impl From<sh1107::BuilderError> for DemoError {
    fn from(err: sh1107::BuilderError) -> Self {
        Self::Config(err)
    }
}

impl From<OpenError> for DemoError {
    fn from(err: OpenError) -> Self {
        Self::Open(err)
    }
}

impl From<sh1107::Error<sh1107::linux::LinuxInterface>> for DemoError {
    fn from(err: sh1107::Error<sh1107::linux::LinuxInterface>) -> Self {
        Self::Bus(err)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), DemoError> {
    let config = Builder::new()
        .dimensions(Dimensions::new(args.width, args.height)?)
        .rotation(Rotation::from_degrees(args.rotation))
        .address(args.address)
        .build()?;

    info!("Starting display...");
    let mut display = Display::open(args.bus, config)?;

    info!("Turning on display...");
    display.on()?;

    info!("Clearing display...");
    display.clear(Fill::AllOn)?;
    thread::sleep(Duration::from_secs(1));

    info!("Adjusting brightness...");
    for step in 0..100u8 {
        display.set_brightness(f32::from(step) / 100.0)?;
        thread::sleep(Duration::from_millis(5));
    }

    info!("Test pattern");
    display.test_pattern()?;
    thread::sleep(Duration::from_secs(1));

    info!("Drawing a smiley");
    draw_smiley(&mut display);
    display.render()?;
    thread::sleep(Duration::from_secs(1));

    if let Some(dir) = &args.animation {
        info!("Playing {}", dir.display());
        let report = Player::new().play(&mut display, dir, args.frames, args.fps)?;
        info!(
            "{} frames shown, {} skipped, {} late",
            report.shown, report.skipped, report.late
        );
    }
    Ok(())
}

/// Face, two eyes and a three-pixel-thick half-ellipse smile
fn draw_smiley(display: &mut LinuxDisplay) {
    let size = display.size();
    let center = Point::new(size.width as i32 / 2, size.height as i32 / 2);

    DrawTarget::clear(display, BinaryColor::Off).ok();
    Circle::with_center(center, 81)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(display)
        .ok();
    for eye in [Point::new(-15, -10), Point::new(15, -10)] {
        Circle::with_center(center + eye, 11)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(display)
            .ok();
    }

    let smile = (-20..=20).flat_map(|x: i32| {
        let depth = (10.0 * (1.0 - f64::from(x * x) / 400.0).sqrt()) as i32;
        (-1..=1).map(move |dy| Pixel(center + Point::new(x, 8 + depth + dy), BinaryColor::Off))
    });
    display.draw_iter(smile).ok();
}
