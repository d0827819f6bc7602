//! Integration tests for picopoly-io offline rendering, WAV output and the
//! ingest-to-render queue.

use picopoly_io::{
    IngestSink, OutputStage, ScheduledEvent, read_wav_info, read_wav_stereo, render_offline,
    write_wav_stereo,
};
use picopoly_synth::queue::heap_event_queue;
use picopoly_synth::{MidiEvent, SynthEngine};
use tempfile::NamedTempFile;

fn rising_crossings(left: impl Iterator<Item = i16>) -> usize {
    let mut prev = 0i16;
    let mut count = 0;
    for s in left {
        if prev < 0 && s >= 0 {
            count += 1;
        }
        prev = s;
    }
    count
}

fn left_channel(samples: &[i16]) -> impl Iterator<Item = i16> + '_ {
    samples.chunks_exact(2).map(|f| f[0])
}

// ---------------------------------------------------------------------------
// Offline render
// ---------------------------------------------------------------------------

#[test]
fn offline_a4_is_440_hz() {
    let sr = 44_100;
    let mut engine: SynthEngine = SynthEngine::new(sr);
    let schedule = [ScheduledEvent::new(0, MidiEvent::note_on(0, 69, 127))];

    let out = render_offline(&mut engine, &schedule, sr as usize, 256, OutputStage::default());
    let crossings = rising_crossings(left_channel(&out));
    assert!((436..=442).contains(&crossings), "got {crossings} crossings");
}

#[test]
fn offline_release_returns_to_silence() {
    let sr = 44_100;
    let mut engine: SynthEngine = SynthEngine::new(sr);
    let schedule = [
        ScheduledEvent::at_ms(0, sr, MidiEvent::note_on(0, 60, 100)),
        ScheduledEvent::at_ms(200, sr, MidiEvent::note_off(0, 60, 0)),
    ];

    // factory release drains in well under a second
    let out = render_offline(&mut engine, &schedule, sr as usize * 2, 256, OutputStage::default());
    let half = out.len() / 2;
    assert!(out[..half].iter().any(|&s| s != 0));
    assert!(out[out.len() - 2 * 256..].iter().all(|&s| s == 0));
    assert_eq!(engine.active_voice_count(), 0);
}

#[test]
fn offline_block_size_does_not_change_pitch() {
    let sr = 48_000;
    let schedule = [ScheduledEvent::new(0, MidiEvent::note_on(0, 57, 127))];

    let mut a: SynthEngine = SynthEngine::new(sr);
    let mut b: SynthEngine = SynthEngine::new(sr);
    let out_a = render_offline(&mut a, &schedule, sr as usize, 64, OutputStage::default());
    let out_b = render_offline(&mut b, &schedule, sr as usize, 512, OutputStage::default());

    // envelopes step per block, so amplitudes differ; the pitch does not
    let ca = rising_crossings(left_channel(&out_a)) as i64;
    let cb = rising_crossings(left_channel(&out_b)) as i64;
    assert!((ca - 220).abs() <= 3, "64-frame blocks: {ca}");
    assert!((cb - 220).abs() <= 3, "512-frame blocks: {cb}");
}

// ---------------------------------------------------------------------------
// WAV output
// ---------------------------------------------------------------------------

#[test]
fn render_to_wav_and_back() {
    let sr = 22_050;
    let mut engine: SynthEngine = SynthEngine::new(sr);
    let schedule = [
        ScheduledEvent::new(0, MidiEvent::note_on(0, 64, 110)),
        ScheduledEvent::new(0, MidiEvent::control_change(0, 10, 0)),
    ];
    let out = render_offline(&mut engine, &schedule, 11_025, 128, OutputStage::default());

    let file = NamedTempFile::new().unwrap();
    write_wav_stereo(file.path(), &out, sr).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, sr);
    assert_eq!(info.num_frames, 11_025);
    assert!((info.duration_secs - 0.5).abs() < 1e-9);

    let (loaded, rate) = read_wav_stereo(file.path()).unwrap();
    assert_eq!(rate, sr);
    assert_eq!(loaded, out);

    // hard left pan: the right channel is silent
    assert!(loaded.chunks_exact(2).all(|f| f[1] == 0));
    assert!(loaded.chunks_exact(2).any(|f| f[0] != 0));
}

// ---------------------------------------------------------------------------
// Ingest to render
// ---------------------------------------------------------------------------

#[test]
fn ingest_thread_feeds_render_context() {
    let (tx, mut rx) = heap_event_queue(64);
    let mut engine: SynthEngine = SynthEngine::new(44_100);

    let ingest = std::thread::spawn(move || {
        let mut sink = IngestSink::new(tx);
        // note on with running status for a chord, then a clock byte
        sink.feed(&[0x90, 60, 100, 64, 100, 67, 100, 0xF8]);
        sink.dropped()
    });
    assert_eq!(ingest.join().unwrap(), 0);

    let mut block = vec![0i32; 2 * 128];
    let applied = engine.process_block(&mut rx, &mut block);
    assert_eq!(applied, 3);
    assert_eq!(engine.active_voice_count(), 3);
    assert!(block.iter().any(|&s| s != 0));
}
