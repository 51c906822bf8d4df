//! Benchmarks for command synthesis
//!
//! Speed decomposition, bitrate budgeting and full plan assembly. Nothing here
//! spawns a process.

use clipforge_av::actions::{AudioFormat, VideoCodec};
use clipforge_av::{
    assemble, compute_budget, decompose, EncodeSettings, EncoderCapability, HwVendor,
    MediaDescriptor, MediaKind, Operation, Resolution,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::PathBuf;
use std::time::Duration;

fn movie() -> MediaDescriptor {
    MediaDescriptor {
        path: PathBuf::from("/media/movies/holiday clip.mp4"),
        kind: MediaKind::Video,
        video_codec: Some("h264".to_string()),
        audio_codec: Some("aac".to_string()),
        resolution: Some(Resolution {
            width: 1920,
            height: 1080,
        }),
        duration: Some(Duration::from_secs(600)),
        frame_count: Some(14_400),
        extension: "mp4".to_string(),
        file_size: 500 * 1024 * 1024,
        warnings: Vec::new(),
    }
}

fn bench_decompose(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompose");

    for factor in [1.0, 3.0, 0.1, 100.0] {
        group.bench_with_input(BenchmarkId::from_parameter(factor), &factor, |b, &f| {
            b.iter(|| decompose(black_box(f)))
        });
    }

    group.finish();
}

fn bench_budget(c: &mut Criterion) {
    c.bench_function("compute_budget", |b| {
        b.iter(|| compute_budget(black_box(25), black_box(200), black_box(128)))
    });
}

fn bench_assemble(c: &mut Criterion) {
    let media = movie();
    let settings = EncodeSettings::default();
    let nvenc = EncoderCapability::from_vendor(HwVendor::Nvidia);
    let output = PathBuf::from("/media/movies/out.mp4");

    let operations = [
        ("remove_audio", Operation::RemoveAudio),
        ("speed", Operation::ChangeSpeed { factor: 3.0 }),
        (
            "hardware",
            Operation::HardwareEncode {
                codec: VideoCodec::H265,
                quality: None,
            },
        ),
        (
            "extract_audio",
            Operation::ExtractAudio {
                format: AudioFormat::Mp3,
            },
        ),
        (
            "gif",
            Operation::ToGif {
                fps: None,
                width: None,
            },
        ),
    ];

    let mut group = c.benchmark_group("assemble");
    for (name, op) in &operations {
        group.bench_with_input(BenchmarkId::from_parameter(name), op, |b, op| {
            b.iter(|| assemble(black_box(op), &media, &nvenc, &output, &settings))
        });
    }
    group.finish();

    c.bench_function("preview_display", |b| {
        let plan = assemble(
            &Operation::ChangeSpeed { factor: 0.25 },
            &media,
            &nvenc,
            &output,
            &settings,
        )
        .unwrap();
        b.iter(|| {
            plan.commands()
                .iter()
                .map(|c| c.display())
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, bench_decompose, bench_budget, bench_assemble);
criterion_main!(benches);
