// Csound score text.
//
// A score is the fixed preamble (function tables and the tempo statement)
// followed by each voice's timeline in `VoiceRole::ALL` order, every voice
// block terminated by a newline. Voices with no notes still contribute
// their terminating newline so the layout does not depend on content.

use crate::orchestra::Orchestra;

/// Function tables the orchestra instruments read from: basic waveforms,
/// the marimba sample for i12, and an envelope.
const FUNCTION_TABLES: &str = "\
; Function tables
f1  0   4096    10  1
f2  0   4096    10  1 0.5 0.3 0.25 0.2 0.167 0.14 0.125 .111
f3  0   4096    10  1 0   0.3 0    0.2 0     0.14 0     .111
f4  0   4096    10  1 1   1   1    0.7 0.5   0.3  0.1
f5  0   4096    9   1 1   0
f12 0   256     1   \"samples/marmstk1.wav\" 0 0 0

; Envelopes
f51 0   513     5   256   512  1
";

/// The score preamble for a piece at `tempo_bpm`.
pub fn score_header(tempo_bpm: u32) -> String {
    format!("\n{FUNCTION_TABLES}\nt   0   {tempo_bpm}\n\n")
}

/// Full score text: `header` then every voice's timeline plus a newline.
pub fn render_score(header: &str, orchestra: &Orchestra) -> String {
    let mut score = String::from(header);
    for (_, instrument) in orchestra.iter() {
        score.push_str(&instrument.render());
        score.push('\n');
    }
    score
}
