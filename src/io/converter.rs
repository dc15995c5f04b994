use crate::engine::NoteEvent;
use crate::error::Result;
use crate::io::midi::MidiEvent;
use crate::theory::Chord;

/// Note-on and matching note-off for a struck note.
pub fn note_to_midi(note: &NoteEvent) -> (MidiEvent, MidiEvent) {
    (
        MidiEvent::NoteOn {
            channel: note.channel,
            key: note.key,
            velocity: note.velocity,
        },
        MidiEvent::NoteOff {
            channel: note.channel,
            key: note.key,
            velocity: 0,
        },
    )
}

/// Note-ons for every note of `chord`, voiced from `octave`.
pub fn chord_to_midi(chord: &Chord, octave: u8, velocity: u8, channel: u8) -> Result<Vec<MidiEvent>> {
    Ok(chord
        .midi_notes(octave)?
        .into_iter()
        .map(|key| MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        })
        .collect())
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn concert_pitch() {
        assert_relative_eq!(midi_note_to_freq(69), 440.0);
        assert_relative_eq!(midi_note_to_freq(60), 261.6256, epsilon = 1e-3);
    }

    #[test]
    fn chord_keys() {
        let chord: Chord = "D_min7".parse().unwrap();
        let keys: Vec<u8> = chord_to_midi(&chord, 3, 90, 2)
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                MidiEvent::NoteOn { key, channel: 2, .. } => Some(*key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, [50, 53, 57, 60]);
    }
}
