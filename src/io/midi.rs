use std::fmt;

/// Channel messages sent to the output transport. Channels are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
}

/// Controller number of "all notes off".
pub const ALL_NOTES_OFF: u8 = 123;

impl MidiEvent {
    pub fn all_notes_off(channel: u8) -> Self {
        MidiEvent::ControlChange {
            channel,
            controller: ALL_NOTES_OFF,
            value: 0,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiEvent::NoteOn { velocity, .. } if *velocity > 0)
    }

    /// Wire bytes, status first. Data bytes are masked to 7 bits.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => vec![0x90 | (channel & 0x0f), key & 0x7f, velocity & 0x7f],
            MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            } => vec![0x80 | (channel & 0x0f), key & 0x7f, velocity & 0x7f],
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => vec![0xb0 | (channel & 0x0f), controller & 0x7f, value & 0x7f],
            MidiEvent::ProgramChange { channel, program } => {
                vec![0xc0 | (channel & 0x0f), program & 0x7f]
            }
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            } => write!(f, "on  ch{channel} key {key} vel {velocity}"),
            MidiEvent::NoteOff { channel, key, .. } => write!(f, "off ch{channel} key {key}"),
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => write!(f, "cc  ch{channel} #{controller} = {value}"),
            MidiEvent::ProgramChange { channel, program } => {
                write!(f, "pc  ch{channel} program {program}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bytes() {
        let on = MidiEvent::NoteOn {
            channel: 9,
            key: 36,
            velocity: 127,
        };
        assert_eq!(on.to_bytes(), [0x99, 36, 127]);
        assert_eq!(MidiEvent::all_notes_off(1).to_bytes(), [0xb1, 123, 0]);
        assert_eq!(
            MidiEvent::ProgramChange {
                channel: 0,
                program: 5
            }
            .to_bytes(),
            [0xc0, 5]
        );
    }

    #[test]
    fn zero_velocity_on_is_not_a_note_on() {
        let silent = MidiEvent::NoteOn {
            channel: 0,
            key: 60,
            velocity: 0,
        };
        assert!(!silent.is_note_on());
        assert_eq!(silent.channel(), 0);
    }
}
