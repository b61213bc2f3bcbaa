//! Frequency to MIDI note conversion and note naming.
//!
//! MIDI note 69 is A4 (440 Hz). Out-of-range values are rejected here, at
//! the mapper, so downstream consumers only ever see a valid note or no
//! note at all.

/// Chromatic note names, sharp notation, indexed by `midi % 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert a frequency in Hz to the nearest MIDI note number.
///
/// Returns `None` for non-positive frequencies and for frequencies whose
/// nearest note falls outside the MIDI range `[0, 127]`
/// (roughly below 8 Hz or above 12.9 kHz).
pub fn frequency_to_midi(frequency: f64) -> Option<u8> {
    if frequency <= 0.0 {
        return None;
    }
    let note = (69.0 + 12.0 * (frequency / 440.0).log2()).round();
    if (0.0..=127.0).contains(&note) {
        Some(note as u8)
    } else {
        None
    }
}

/// Frequency in Hz of a MIDI note (equal temperament, A4 = 440 Hz).
pub fn midi_to_frequency(note: u8) -> f64 {
    440.0 * 2.0f64.powf((note as f64 - 69.0) / 12.0)
}

/// Note name for a MIDI note, e.g. `Some("A")` for 69.
///
/// `None` above 127; `u8` admits 128..=255, which are not MIDI notes.
pub fn note_name(note: u8) -> Option<&'static str> {
    (note <= 127).then(|| NOTE_NAMES[(note % 12) as usize])
}

/// Octave number for a MIDI note, e.g. 4 for 69 (A4). C-1 is note 0.
pub fn octave(note: u8) -> i32 {
    (note / 12) as i32 - 1
}

/// Format a note as name plus octave, e.g. `"A4"`. Empty when no note.
pub fn format_note_octave(note: Option<u8>) -> String {
    match note.and_then(|n| note_name(n).map(|name| (name, octave(n)))) {
        Some((name, octave)) => format!("{}{}", name, octave),
        None => String::new(),
    }
}
