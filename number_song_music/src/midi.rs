// MIDI output from a composed orchestra.
//
// Converts every voice's note timeline into a Standard MIDI File (SMF) for
// quick auditioning without Csound. Each voice maps to its own track and
// channel. Beats map to ticks at a fixed resolution; half-beat starts (the
// quick voice) land exactly on tick boundaries.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1
// (multi-track): a tempo track followed by one track per voice.

use crate::error::Result;
use crate::instrument::NoteEvent;
use crate::orchestra::{Orchestra, VoiceRole};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;
use tracing::debug;

/// Ticks per beat in MIDI output.
const TICKS_PER_BEAT: u16 = 480;

/// Csound's default full-scale amplitude (0dBFS = 32768) in decibels.
const FULL_SCALE_DB: f64 = 90.309;

/// GM channel reserved for percussion.
const PERCUSSION_CHANNEL: u8 = 9;

/// Convert an orchestra to MIDI and write it to a file.
pub fn write_midi(orchestra: &Orchestra, tempo_bpm: u32, path: &Path) -> Result<()> {
    let smf = orchestra_to_smf(orchestra, tempo_bpm);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)?;
    debug!(path = %path.display(), bytes = buf.len(), "wrote MIDI file");
    Ok(())
}

/// MIDI channel for a voice: voice order, stepping over the percussion channel.
fn channel_for(role: VoiceRole) -> u4 {
    let index = role.index() as u8;
    let channel = if index >= PERCUSSION_CHANNEL {
        index + 1
    } else {
        index
    };
    u4::new(channel % 16)
}

/// General MIDI program approximating each orchestra instrument.
fn program_for(role: VoiceRole) -> u7 {
    let program = match role {
        VoiceRole::Bass => 33,
        VoiceRole::Arpeggio => 46,
        VoiceRole::High => 89,
        VoiceRole::Quick => 12,
        VoiceRole::Long => 52,
        VoiceRole::Ascent => 11,
        VoiceRole::Erratic => 81,
        VoiceRole::Buzzy => 62,
        VoiceRole::Churchbell => 14,
        VoiceRole::Happy => 73,
    };
    u7::new(program)
}

/// Map a decibel amplitude to a note-on velocity in 1..=127.
fn velocity(amplitude_db: f64) -> u7 {
    let linear = 10f64.powf((amplitude_db - FULL_SCALE_DB) / 20.0);
    u7::new((127.0 * linear).round().clamp(1.0, 127.0) as u8)
}

fn beat_to_tick(beat: f64) -> u32 {
    (beat.max(0.0) * TICKS_PER_BEAT as f64).round() as u32
}

/// Note-on and note-off messages for one voice, sorted by tick. At equal
/// ticks offs come first so a repeated key re-strikes cleanly.
fn voice_messages(notes: &[NoteEvent]) -> Vec<(u32, MidiMessage)> {
    let mut messages = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let key = u7::new(note.pitch.midi_key());
        messages.push((
            beat_to_tick(note.start),
            MidiMessage::NoteOn {
                key,
                vel: velocity(note.amplitude),
            },
        ));
        messages.push((
            beat_to_tick(note.start + note.duration.as_beats()),
            MidiMessage::NoteOff {
                key,
                vel: u7::new(0),
            },
        ));
    }
    messages.sort_by_key(|(tick, message)| (*tick, matches!(message, MidiMessage::NoteOn { .. })));
    messages
}

/// Microseconds per beat. The tempo meta event holds 24 bits, so tempos
/// slower than 4 BPM are written as the slowest representable one.
fn beat_period(tempo_bpm: u32) -> u24 {
    let microseconds = 60_000_000 / tempo_bpm.max(1);
    u24::new(microseconds.min(u24::max_value().as_int()))
}

/// Convert an orchestra to an in-memory SMF.
fn orchestra_to_smf(orchestra: &Orchestra, tempo_bpm: u32) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_BEAT)),
    ));

    // Track 0: tempo track
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(beat_period(tempo_bpm))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    for (role, instrument) in orchestra.iter() {
        let channel = channel_for(role);
        let mut track: Track<'static> = vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::TrackName(role.name().as_bytes())),
            },
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: program_for(role),
                    },
                },
            },
        ];

        let mut last_tick = 0;
        for (tick, message) in voice_messages(instrument.notes()) {
            track.push(TrackEvent {
                delta: u28::new(tick - last_tick),
                kind: TrackEventKind::Midi { channel, message },
            });
            last_tick = tick;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::NoteRequest;

    fn note_ticks(track: &Track<'_>) -> Vec<(u32, bool)> {
        let mut tick = 0;
        let mut out = Vec::new();
        for event in track {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = event.kind {
                match message {
                    MidiMessage::NoteOn { .. } => out.push((tick, true)),
                    MidiMessage::NoteOff { .. } => out.push((tick, false)),
                    _ => {}
                }
            }
        }
        out
    }

    #[test]
    fn test_orchestra_to_smf_basic() {
        let mut orchestra = Orchestra::default();
        let quick = orchestra.instrument_mut(VoiceRole::Quick);
        quick.add_note(NoteRequest::at(21.0).length(0.5)).unwrap();
        quick.add_note(NoteRequest::at(21.5).length(0.5)).unwrap();

        let smf = orchestra_to_smf(&orchestra, 217);
        // 1 tempo track + 10 voice tracks
        assert_eq!(smf.tracks.len(), 11);
        let quick_track = &smf.tracks[1 + VoiceRole::Quick.index()];
        assert_eq!(
            note_ticks(quick_track),
            vec![(10080, true), (10320, false), (10320, true), (10560, false)]
        );
    }

    #[test]
    fn test_beat_period_fits_tempo_event() {
        assert_eq!(beat_period(217).as_int(), 276_497);
        assert_eq!(beat_period(4).as_int(), 15_000_000);
        assert_eq!(beat_period(3).as_int(), 0xFF_FFFF);
        assert_eq!(beat_period(1).as_int(), 0xFF_FFFF);
        assert_eq!(beat_period(0).as_int(), 0xFF_FFFF);
    }

    #[test]
    fn test_velocity_curve() {
        assert_eq!(velocity(FULL_SCALE_DB).as_int(), 127);
        assert_eq!(velocity(120.0).as_int(), 127);
        assert_eq!(velocity(0.0).as_int(), 1);
        // 86 dB is about 0.61 of full scale
        assert_eq!(velocity(86.0).as_int(), 77);
    }

    #[test]
    fn test_channels_skip_percussion() {
        let channels: Vec<u8> = VoiceRole::ALL
            .iter()
            .map(|&r| channel_for(r).as_int())
            .collect();
        assert_eq!(channels, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10]);
    }

    #[test]
    fn test_write_midi_file() {
        let mut orchestra = Orchestra::default();
        orchestra
            .instrument_mut(VoiceRole::Bass)
            .add_note(NoteRequest::at(3.0))
            .unwrap();
        let path = std::env::temp_dir().join("number_song_midi_test.mid");
        write_midi(&orchestra, 217, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"MThd"));
        let parsed = Smf::parse(&bytes).unwrap();
        assert_eq!(parsed.tracks.len(), 11);
        let _ = std::fs::remove_file(&path);
    }
}
