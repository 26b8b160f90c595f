//! Wrist-Twist Gesture Sensing Engine
//!
//! Demo binary: runs a synthetic sensor stream through the pipeline and
//! prints every event it emits. For library use, see lib.rs.

use twist_sensing::{
    EngineEvent, GesturePipeline, PipelineConfig, SensorCaps, SensorSample, VERSION,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Wrist-Twist Gesture Sensing Engine v{VERSION}");

    let mut pipeline = match GesturePipeline::new(PipelineConfig::default(), SensorCaps::gyro_only())
    {
        Ok(p) => p,
        Err(err) => {
            eprintln!("cannot start engine: {err}");
            std::process::exit(1);
        }
    };

    // Synthetic stream: ambient wrist jitter, then a deliberate
    // twist-back-twist, then more jitter.
    let mut stream: Vec<SensorSample> = (0..25)
        .map(|i| SensorSample::gyro(i * 20, [0.3, 0.15, 0.1]))
        .collect();
    stream.push(SensorSample::accel(500, [0.6, 0.2, 0.1]));
    stream.push(SensorSample::gyro(1000, [8.5, 0.5, 0.3]));
    stream.push(SensorSample::gyro(1320, [-9.2, 0.4, 0.5]));
    stream.push(SensorSample::gyro(1640, [8.8, 0.3, 0.4]));
    stream.extend((0..25).map(|i| SensorSample::gyro(1700 + i * 20, [0.25, 0.1, 0.12])));

    println!("Processing {} samples...", stream.len());

    for sample in &stream {
        match pipeline.process_sample(sample) {
            Some(EngineEvent::GestureCompleted { direction }) => {
                println!(
                    "  t={}ms  TRIPLE TWIST (start direction {:+})",
                    sample.timestamp_ms,
                    direction.sign()
                );
            }
            Some(EngineEvent::WearStateChanged { worn }) => {
                println!("  t={}ms  wear state: {}", sample.timestamp_ms, worn);
            }
            None => {}
        }
    }

    println!(
        "Done. gestures={}, noise floor={:.2} rad/s",
        pipeline.gestures_emitted(),
        pipeline.noise_floor()
    );
}
