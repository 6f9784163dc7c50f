//! patchbay - plays a fixed modular patch on the default output device
//!
//! Run with: cargo run --bin patchbay -- --bpm 128 --preset patch.json

mod patch;

use std::{path::PathBuf, thread, time::Duration};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing_subscriber::EnvFilter;

use eurorack_dsp::{
    modules::{FilterBankControls, FilterMode, SlopeRange, SlopesControls},
    presets::{PatchPreset, Preset},
    RenderCtx,
};

use patch::Patch;

#[derive(Debug, Parser)]
#[command(name = "patchbay", about = "Play a sequencer, drums, slopes and filter bank patch")]
struct Args {
    /// Override the sequencer tempo
    #[arg(long)]
    bpm: Option<f32>,

    /// Patch preset (JSON); unspecified fields keep their defaults
    #[arg(long)]
    preset: Option<PathBuf>,

    /// How long to play
    #[arg(long, default_value_t = 16.0)]
    seconds: f32,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut preset = match &args.preset {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read preset {}", path.display()))?;
            PatchPreset::from_json(&json).wrap_err("failed to parse preset")?
        }
        None => PatchPreset::default(),
    };
    if let Some(bpm) = args.bpm {
        preset.sequencer.bpm = bpm;
    }

    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    let ctx = RenderCtx::new(sample_rate)?;

    tracing::info!(sample_rate, channels, bpm = preset.sequencer.bpm, "starting patch");

    let (mut patch, mut handles) = Patch::new(ctx, &preset)?;
    if !handles.load(&preset) {
        tracing::warn!("some preset updates did not fit in the control queues");
    }

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| patch.fill(data, channels),
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )
        .wrap_err("failed to build output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    // Halfway through, open the filter bank into formant mode and let the
    // slopes run at audio rate.
    let half = Duration::from_secs_f32(args.seconds.max(0.0).min(86_400.0) / 2.0);
    thread::sleep(half);

    let variation = [
        Preset::FilterBank(FilterBankControls {
            mode: FilterMode::Formant,
            span: 0.6,
            ..preset.filter_bank
        }),
        Preset::Slopes(SlopesControls {
            range: SlopeRange::Sound,
            time: 0.2,
            ..preset.slopes
        }),
    ];
    for update in variation {
        if !handles.apply(update) {
            tracing::warn!(?update, "control queue full");
        }
    }
    tracing::info!("variation applied");

    thread::sleep(half);
    tracing::info!("done");
    Ok(())
}
