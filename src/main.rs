use anyhow::{Context, Result};
use clap::Parser;
use greenkey::background::{open_background, BackgroundSource};
use greenkey::capture::{CaptureSource, ImageSequenceCapture};
use greenkey::config::{load_parameters, parse_hsv, ParameterOverrides};
use greenkey::keying::{mask_to_rgb, ChromaKeyer, KeyParameters, MaskGenerator};
use greenkey::output::{ImageSequenceOutput, OutputSink};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input frames: a single image or a directory of images
    #[arg(short, long)]
    input: PathBuf,

    /// Replacement background: an image, or a directory of frames to loop.
    /// Black when omitted
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Directory for composited PNG frames
    #[arg(short, long, default_value = "recording")]
    output_dir: PathBuf,

    /// Target frames per second, 0 for as fast as possible
    #[arg(long, default_value_t = 0)]
    fps: u32,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Output the key mask (white = background) instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// JSON file with key parameters; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Lower HSV bound as H,S,V (hue 0-179)
    #[arg(long, value_parser = parse_hsv)]
    lower: Option<[u8; 3]>,

    /// Upper HSV bound as H,S,V (hue 0-179)
    #[arg(long, value_parser = parse_hsv)]
    upper: Option<[u8; 3]>,

    /// Mask feathering kernel size (positive, odd)
    #[arg(long)]
    feather_radius: Option<u32>,

    /// Green spill suppression strength, 0.0-1.0
    #[arg(long)]
    spill_suppression: Option<f32>,
}

impl Args {
    fn key_parameters(&self) -> Result<KeyParameters> {
        let base = match &self.config {
            Some(path) => load_parameters(path).context("Failed to load key parameters")?,
            None => KeyParameters::default(),
        };

        let overrides = ParameterOverrides {
            lower_bound: self.lower,
            upper_bound: self.upper,
            feather_radius: self.feather_radius,
            spill_suppression: self.spill_suppression,
        };

        Ok(overrides.apply(base))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("greenkey starting");

    let params = args.key_parameters()?;
    let keyer = ChromaKeyer::new(params).context("Invalid key parameters")?;
    tracing::info!(
        "Key window: {:?}..={:?}, feather={}, spill={}",
        params.lower_bound,
        params.upper_bound,
        params.feather_radius,
        params.spill_suppression
    );

    // Initialize capture
    let mut capture =
        ImageSequenceCapture::new(&args.input).context("Failed to open input frames")?;
    let (width, height) = capture.resolution();
    tracing::info!("Capture: {}x{}", width, height);

    let mut background = open_background(args.background.as_deref());

    // Initialize output
    let mut output = ImageSequenceOutput::new(&args.output_dir, width, height)
        .context("Failed to initialize output")?;

    run_pipeline(
        &mut capture,
        background.as_mut(),
        &mut output,
        &keyer,
        args.fps,
        args.show_mask,
    )?;

    Ok(())
}

fn run_pipeline<C, O>(
    capture: &mut C,
    background: &mut dyn BackgroundSource,
    output: &mut O,
    keyer: &ChromaKeyer,
    target_fps: u32,
    show_mask: bool,
) -> Result<()>
where
    C: CaptureSource,
    O: OutputSink,
{
    let frame_duration =
        (target_fps > 0).then(|| Duration::from_secs_f32(1.0 / target_fps as f32));
    let mut frame_count = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_key_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    tracing::info!("Starting main pipeline loop, show_mask={}", show_mask);

    loop {
        let loop_start = Instant::now();

        // Capture frame
        let capture_start = Instant::now();
        let Some(frame) = capture
            .capture_frame()
            .context("Failed to capture frame")?
        else {
            break;
        };
        total_capture_time += capture_start.elapsed();

        // Keying
        let key_start = Instant::now();
        let output_frame = if show_mask {
            mask_to_rgb(&keyer.mask(&frame).context("Failed to key frame")?)
        } else {
            let (width, height) = frame.dimensions();
            let bg = background.next_frame(width, height);
            keyer
                .composite(&frame, &bg)
                .context("Failed to composite frame")?
        };
        total_key_time += key_start.elapsed();

        // Output frame
        let output_start = Instant::now();
        output
            .write_frame(&output_frame)
            .context("Failed to write frame")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            log_stats(
                frame_count,
                total_capture_time,
                total_key_time,
                total_output_time,
            );
        }

        // Frame rate limiting
        if let Some(frame_duration) = frame_duration {
            let elapsed = loop_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    if frame_count > 0 {
        log_stats(
            frame_count,
            total_capture_time,
            total_key_time,
            total_output_time,
        );
    }
    tracing::info!("Input exhausted after {} frame(s)", frame_count);

    Ok(())
}

fn log_stats(frame_count: u64, capture: Duration, key: Duration, output: Duration) {
    let avg_ms = |total: Duration| total.as_secs_f64() * 1000.0 / frame_count as f64;
    let avg_capture_ms = avg_ms(capture);
    let avg_key_ms = avg_ms(key);
    let avg_output_ms = avg_ms(output);
    let total_ms = avg_capture_ms + avg_key_ms + avg_output_ms;
    let actual_fps = if total_ms > 0.0 { 1000.0 / total_ms } else { 0.0 };

    tracing::info!(
        "Frame {}: capture={:.1}ms, key={:.1}ms, output={:.1}ms, total={:.1}ms, fps={:.1}",
        frame_count,
        avg_capture_ms,
        avg_key_ms,
        avg_output_ms,
        total_ms,
        actual_fps
    );
}
