#![cfg(feature = "host")]
//! PNG previews of matrix frames and whole messages, for documentation and host tests.
//!
//! Each LED is drawn as a round dot with a soft edge on a black panel. Channel values are
//! treated as gamma-encoded and linearized with [`PREVIEW_INVERSE_GAMMA`] so dim colors look
//! roughly the way they do on real LEDs.

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use png::{BitDepth, ColorType, Encoder, ScaledFloat};
use smart_leds::RGB8;

use crate::{
    engine::{DisplayEngine, EngineConfig, NoEvents, TickReport, render_interval_ms},
    frame::{Frame2d, MatrixFrame},
    message::DisplayMode,
};

/// Default inverse gamma applied to channel values before drawing.
pub const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

type PreviewResult<T> = core::result::Result<T, Box<dyn Error>>;

/// Render one frame into a PNG whose larger side is at most `target_max_dimension` pixels.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_frame_png<const W: usize, const H: usize>(
    frame: &Frame2d<W, H>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> PreviewResult<()> {
    write_frames_png(
        core::slice::from_ref(frame),
        output_path.as_ref(),
        target_max_dimension,
        None,
    )
}

/// Render frames into a looping APNG, one frame every `frame_delay_ms`.
///
/// # Errors
///
/// Returns an error if `frames` is empty, if the delay does not fit the APNG frame-delay
/// field, or if the file cannot be written.
pub fn write_frames_apng<const W: usize, const H: usize>(
    frames: &[Frame2d<W, H>],
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay_ms: u32,
) -> PreviewResult<()> {
    write_frames_png(
        frames,
        output_path.as_ref(),
        target_max_dimension,
        Some(frame_delay_ms),
    )
}

/// Run a message through a [`DisplayEngine`] and collect the frames it renders.
///
/// Stops when a one-shot message ends or after `max_frames` frames, whichever comes first,
/// so repeating modes yield their first `max_frames` frames.
///
/// # Errors
///
/// Returns the engine's validation errors for the message.
pub fn render_message_frames<const MAX_CAPACITY: usize>(
    text: &str,
    mode: DisplayMode,
    color: RGB8,
    period_ms: u32,
    max_frames: usize,
) -> crate::Result<Vec<MatrixFrame>> {
    let mut frames = Vec::new();
    let sink = |frame: &MatrixFrame| -> crate::Result<()> {
        frames.push(*frame);
        Ok(())
    };
    let mut engine: DisplayEngine<_, NoEvents, MAX_CAPACITY> =
        DisplayEngine::new(sink, EngineConfig::new());
    engine.initialize(MAX_CAPACITY, NoEvents)?;
    engine.set_message(text, mode, color, period_ms)?;

    let mut rendered = 0;
    while rendered < max_frames && engine.is_active() {
        if matches!(engine.tick(), TickReport::Rendered { .. }) {
            rendered = rendered.saturating_add(1);
        }
    }
    drop(engine);
    Ok(frames)
}

/// Render a message to an APNG that plays at the engine's own pace.
///
/// Frames are spaced by [`render_interval_ms`] at the default engine tick.
///
/// # Errors
///
/// Returns the engine's validation errors for the message, or an error writing the file.
pub fn write_message_apng(
    text: &str,
    mode: DisplayMode,
    color: RGB8,
    period_ms: u32,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> PreviewResult<()> {
    const PREVIEW_CAPACITY: usize = 64;
    const PREVIEW_MAX_FRAMES: usize = 512;

    let frames = render_message_frames::<PREVIEW_CAPACITY>(
        text,
        mode,
        color,
        period_ms,
        PREVIEW_MAX_FRAMES,
    )?;
    let frame_delay_ms =
        render_interval_ms(mode, period_ms, EngineConfig::new().tick_period_ms);
    write_frames_apng(&frames, output_path, target_max_dimension, frame_delay_ms)
}

/// Cell geometry for one preview image.
#[derive(Clone, Copy, Debug)]
struct PreviewStyle {
    cell_size: u32,
    led_radius: u32,
    fade_width: u32,
    inverse_gamma: f32,
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "cell sizes never exceed the target dimension"
)]
impl PreviewStyle {
    /// Largest cell size whose image (panel plus a one-radius border) fits the target.
    fn fit(panel_width: u32, panel_height: u32, target_max_dimension: u32) -> PreviewResult<Self> {
        if target_max_dimension == 0 {
            return Err("target_max_dimension must be positive".into());
        }
        let mut cell_size = target_max_dimension;
        while cell_size > 8 {
            let led_radius = Self::led_radius(cell_size);
            let largest = panel_width.max(panel_height) * cell_size + led_radius * 2;
            if largest <= target_max_dimension {
                break;
            }
            cell_size -= 1;
        }
        let led_radius = Self::led_radius(cell_size);
        if led_radius < 3 {
            return Err("target_max_dimension too small for a preview".into());
        }
        Ok(Self {
            cell_size,
            led_radius,
            fade_width: led_radius / 3,
            inverse_gamma: PREVIEW_INVERSE_GAMMA,
        })
    }

    fn led_radius(cell_size: u32) -> u32 {
        let led_margin = (cell_size / 8).max(1);
        cell_size.saturating_sub(led_margin * 2) / 2
    }
}

/// 16-bit RGB image data for one panel frame.
struct PanelImage {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

fn write_frames_png<const W: usize, const H: usize>(
    frames: &[Frame2d<W, H>],
    output_path: &Path,
    target_max_dimension: u32,
    frame_delay_ms: Option<u32>,
) -> PreviewResult<()> {
    if frames.is_empty() {
        return Err("frames must not be empty".into());
    }
    let style = PreviewStyle::fit(
        u32::try_from(W)?,
        u32::try_from(H)?,
        target_max_dimension,
    )?;
    let images = frames
        .iter()
        .map(|frame| render_panel(frame, style))
        .collect::<PreviewResult<Vec<_>>>()?;
    let (width, height) = images
        .first()
        .map(|image| (image.width, image.height))
        .ok_or("frames must not be empty")?;

    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));

    if let Some(frame_delay_ms) = frame_delay_ms {
        let delay_num = u16::try_from(frame_delay_ms)?;
        encoder.set_animated(u32::try_from(images.len())?, 0)?;
        let mut writer = encoder.write_header()?;
        for image in &images {
            writer.set_frame_delay(delay_num, 1000)?;
            writer.write_image_data(&image.bytes)?;
        }
        writer.finish()?;
        log::info!("wrote APNG ({} frames) to {}", images.len(), output_path.display());
    } else {
        let mut writer = encoder.write_header()?;
        for image in &images {
            writer.write_image_data(&image.bytes)?;
        }
        writer.finish()?;
        log::info!("wrote PNG to {}", output_path.display());
    }
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    reason = "preview geometry is bounded by the target dimension"
)]
fn render_panel<const W: usize, const H: usize>(
    frame: &Frame2d<W, H>,
    style: PreviewStyle,
) -> PreviewResult<PanelImage> {
    let PreviewStyle {
        cell_size,
        led_radius,
        fade_width,
        inverse_gamma,
    } = style;
    let border = led_radius;
    let width = u32::try_from(W)? * cell_size + border * 2;
    let height = u32::try_from(H)? * cell_size + border * 2;
    let mut bytes = vec![0u8; usize::try_from(width * height)? * 6];

    let center = (cell_size as i32 - 1) / 2;
    let radius_sq = (led_radius * led_radius) as i32;
    let outer = led_radius as f32;
    let inner = (led_radius - fade_width) as f32;

    for (row_index, row) in frame.iter().enumerate() {
        for (column_index, pixel) in row.iter().enumerate() {
            if *pixel == RGB8::default() {
                continue;
            }
            let channels = [pixel.r, pixel.g, pixel.b]
                .map(|channel| (f32::from(channel) / 255.0).powf(inverse_gamma));
            let origin_x = border + column_index as u32 * cell_size;
            let origin_y = border + row_index as u32 * cell_size;

            for local_y in 0..cell_size {
                let delta_y = local_y as i32 - center;
                for local_x in 0..cell_size {
                    let delta_x = local_x as i32 - center;
                    let distance_sq = delta_x * delta_x + delta_y * delta_y;
                    if distance_sq > radius_sq {
                        continue;
                    }
                    let distance = (distance_sq as f32).sqrt();
                    let intensity = if distance <= inner {
                        1.0
                    } else {
                        (1.0 - (distance - inner) / (outer - inner)).max(0.0)
                    };
                    let offset = (((origin_y + local_y) * width + origin_x + local_x) * 6) as usize;
                    for (slot, linear) in bytes[offset..offset + 6]
                        .chunks_exact_mut(2)
                        .zip(channels)
                    {
                        let level = ((linear * intensity).clamp(0.0, 1.0) * 65535.0).round() as u16;
                        slot.copy_from_slice(&level.to_be_bytes());
                    }
                }
            }
        }
    }

    Ok(PanelImage {
        width,
        height,
        bytes,
    })
}
