use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, time::Instant};

use playertrack::{
    event_log::{timestamp_now, SessionLog},
    video::{KeyCancel, OpencvTrackerFactory, VideoSink, VideoSource},
    Args, JsonLogger, NeverCancel, TrackingPipeline,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let started = Instant::now();
    let args = Args::parse();
    run(args)?;
    tracing::info!("Total time: {:.4}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn run(args: Args) -> Result<()> {
    args.validate()?;
    tracing::info!(
        "Reading inputs: {} , {}",
        args.json_file.display(),
        args.input.display()
    );
    tracing::info!("Tracker: {} ({:?} update)", args.tracker, args.update_policy);

    let seeds = playertrack::load_seed_file(&args.json_file)
        .with_context(|| format!("Failed to load seed file {}", args.json_file.display()))?;
    let mut source = VideoSource::open(&args.input)
        .with_context(|| format!("Failed to open input source: {}", args.input.display()))?;

    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let output = args.resolve_output(source.fps(), source.frame_size())?;
    let mut sink = VideoSink::create(&output)
        .with_context(|| format!("Failed to create {}", output.path.display()))?;
    tracing::info!(
        "Writing {} at {:.2} fps, {}x{}",
        output.path.display(),
        output.fps,
        output.width,
        output.height
    );

    let mut display_enabled = !args.headless;
    if display_enabled {
        if let Err(err) = sink.enable_preview("playertrack") {
            tracing::warn!("Failed to open display window: {}. Running headless.", err);
            display_enabled = false;
        }
    }

    let mut pipeline = TrackingPipeline::new(OpencvTrackerFactory, args.tracker, seeds.clone())
        .with_policy(args.update_policy);

    if let Some(path) = args.log_json.as_ref() {
        let mut logger = JsonLogger::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        logger.write_event(&SessionLog {
            event: "session_start",
            timestamp: timestamp_now(),
            input: args.input.display().to_string(),
            seed_file: args.json_file.display().to_string(),
            tracker: args.tracker,
            update_policy: args.update_policy,
            output: output.path.display().to_string(),
            objects: seeds.len(),
        })?;
        pipeline = pipeline.with_event_log(logger);
    }

    tracing::info!("Tracking {} objects", seeds.len());
    let summary = if display_enabled {
        pipeline.run(&mut source, &mut sink, &mut KeyCancel)?
    } else {
        pipeline.run(&mut source, &mut sink, &mut NeverCancel)?
    };

    if summary.degraded_frames > 0 {
        tracing::warn!(
            "{} of {} frames lost at least one object",
            summary.degraded_frames,
            summary.frames
        );
    }
    tracing::info!(
        "Processed {} frames{}; output video FPS: {}",
        summary.frames,
        if summary.cancelled { " (cancelled)" } else { "" },
        summary.mean_fps
    );
    tracing::info!("Output video written to {}", output.path.display());
    Ok(())
}
