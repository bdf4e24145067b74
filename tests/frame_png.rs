#![cfg(feature = "host")]
#![allow(missing_docs)]
use std::error::Error;
use std::fs::File;
use std::path::Path;

use led_msgboard::{
    colors,
    compositor::Compositor,
    font::decode,
    frame::MatrixFrame,
    message::DisplayMode,
    to_png::{render_message_frames, write_frame_png, write_frames_apng, write_message_apng},
};
use png::{BitDepth, ColorType, Decoder};

const TARGET_MAX_DIMENSION: u32 = 120;

struct PngSummary {
    width: u32,
    height: u32,
    color_type: ColorType,
    bit_depth: BitDepth,
    animation_frames: Option<u32>,
    frame_delay: Option<(u16, u16)>,
}

fn read_png_summary(path: &Path) -> Result<PngSummary, Box<dyn Error>> {
    let reader = Decoder::new(File::open(path)?).read_info()?;
    let info = reader.info();
    Ok(PngSummary {
        width: info.width,
        height: info.height,
        color_type: info.color_type,
        bit_depth: info.bit_depth,
        animation_frames: info
            .animation_control
            .as_ref()
            .map(|control| control.num_frames),
        frame_delay: info
            .frame_control
            .as_ref()
            .map(|control| (control.delay_num, control.delay_den)),
    })
}

#[test]
fn frame_png_is_square_and_fits_target() -> Result<(), Box<dyn Error>> {
    let output_dir = tempfile::tempdir()?;
    let output_path = output_dir.path().join("letter_a.png");
    let frame = Compositor::render_character(&decode(b'A')?, colors::ORANGE);

    write_frame_png(&frame, &output_path, TARGET_MAX_DIMENSION)?;

    let summary = read_png_summary(&output_path)?;
    assert_eq!(summary.width, summary.height);
    assert!(summary.width <= TARGET_MAX_DIMENSION);
    assert!(summary.width >= TARGET_MAX_DIMENSION / 2);
    assert_eq!(summary.color_type, ColorType::Rgb);
    assert_eq!(summary.bit_depth, BitDepth::Sixteen);
    assert_eq!(summary.animation_frames, None);
    assert_eq!(summary.frame_delay, None);
    Ok(())
}

#[test]
fn message_apng_has_one_frame_per_render() -> Result<(), Box<dyn Error>> {
    let output_dir = tempfile::tempdir()?;
    let output_path = output_dir.path().join("nested").join("hi.png");

    write_message_apng(
        "Hi",
        DisplayMode::NormalOnce,
        colors::RED,
        200,
        &output_path,
        TARGET_MAX_DIMENSION,
    )?;

    // 'H', 'i', then the closing blank.
    let summary = read_png_summary(&output_path)?;
    assert_eq!(summary.animation_frames, Some(3));
    assert_eq!(summary.frame_delay, Some((200, 1000)));
    Ok(())
}

#[test]
fn message_apng_delay_matches_rendered_cadence() -> Result<(), Box<dyn Error>> {
    let output_dir = tempfile::tempdir()?;
    let normal_path = output_dir.path().join("normal.png");
    let scroll_path = output_dir.path().join("scroll.png");

    // 250 ms characters land on every third 100 ms tick.
    write_message_apng(
        "Hi",
        DisplayMode::NormalOnce,
        colors::RED,
        250,
        &normal_path,
        TARGET_MAX_DIMENSION,
    )?;
    write_message_apng(
        "Hi",
        DisplayMode::ScrollOnce,
        colors::RED,
        600,
        &scroll_path,
        TARGET_MAX_DIMENSION,
    )?;

    assert_eq!(read_png_summary(&normal_path)?.frame_delay, Some((300, 1000)));
    assert_eq!(read_png_summary(&scroll_path)?.frame_delay, Some((100, 1000)));
    Ok(())
}

#[test]
fn scroll_preview_frames_follow_the_engine() -> Result<(), Box<dyn Error>> {
    let frames =
        render_message_frames::<8>("A", DisplayMode::ScrollOnce, colors::GREEN, 600, 100)?;

    assert_eq!(frames.len(), 6);
    assert_eq!(
        frames[4],
        Compositor::render_character(&decode(b'A')?, colors::GREEN)
    );
    assert!(frames[5].0[0].iter().all(|pixel| *pixel == colors::BLACK));
    Ok(())
}

#[test]
fn repeating_preview_stops_at_frame_limit() -> Result<(), Box<dyn Error>> {
    let frames =
        render_message_frames::<8>("AB", DisplayMode::NormalRepeat, colors::BLUE, 100, 7)?;

    assert_eq!(frames.len(), 7);
    assert!(frames[2].is_blank());
    assert_eq!(frames[0], frames[3]);
    Ok(())
}

#[test]
fn empty_frame_list_is_an_error() -> Result<(), Box<dyn Error>> {
    let output_dir = tempfile::tempdir()?;
    let frames: [MatrixFrame; 0] = [];

    let result = write_frames_apng(&frames, output_dir.path().join("empty.png"), 100, 100);

    assert!(result.is_err());
    Ok(())
}
