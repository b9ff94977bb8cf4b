//! Text normalization for catalog matching.
//!
//! The same pipeline runs on catalog rows at load time and on incoming
//! listening-history tracks at lookup time. Matching is exact-key, so both
//! sides must normalize bit-for-bit identically.
//!
//! Noise-pattern stripping runs BEFORE the character-class pass: markers like
//! "(feat. X)" are only recognizable while their punctuation is still intact.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Title noise patterns (applied in order, each replaced with "").
pub static TITLE_NOISE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Featured-artist markers: "(feat. X)", "[ft. X]", "(with X)"
        Regex::new(r"(?i)\s*[\(\[](?:featuring|feat\.?|ft\.?|with)\s+[^)\]]*[\)\]]").unwrap(),
        // Remaster variants, trailing dash form: "- Remastered 2011", "- 1997 Remaster"
        Regex::new(r"(?i)\s*[-–—]\s*(?:remaster(?:ed)?(?:\s+\d{4})?|\d{4}\s+remaster(?:ed)?)").unwrap(),
        // Remaster variants, bracketed: "(Remastered 2011)", "[2011 Remaster]"
        Regex::new(r"(?i)\s*[\(\[](?:remaster(?:ed)?(?:\s+\d{4})?|\d{4}\s+remaster(?:ed)?)[\)\]]").unwrap(),
        // Live markers: "(Live)", "(Live at Wembley)", "[Live 1985]"
        Regex::new(r"(?i)\s*[\(\[]live\b[^)\]]*[\)\]]").unwrap(),
        // Edit/version markers: "(Radio Edit)", "[Single Version]", "(Explicit)"
        Regex::new(r"(?i)\s*[\(\[](?:radio\s+(?:edit|mix)|single\s+version|album\s+version|original\s+mix|explicit|clean)[\)\]]").unwrap(),
    ]
});

/// Trailing featured-artist clause on artist names:
/// "Queen feat. David Bowie", "Santana ft. Rob Thomas", "Artist with Other"
pub static ARTIST_FEAT_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:featuring|feat\.?|ft\.?|with)\s+.*$").unwrap()
});

// ============================================================================
// SHARED TEXT PASS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to lowercase ASCII: NFKD decomposition drops combining
/// marks, then any remaining non-Latin script is transliterated.
/// e.g. "Beyoncé" → "beyonce", "Motörhead" → "motorhead"
fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    any_ascii(&stripped).to_lowercase()
}

/// Shared final pass of both normalizers (and the sole input to
/// [`generate_song_id`]): fold to lowercase ASCII, blank every character
/// outside `[a-z0-9 ]` to a space, collapse whitespace runs, trim.
///
/// Non-alphanumerics become spaces rather than being deleted so adjacent
/// words never merge ("AC/DC" → "ac dc", not "acdc").
pub fn normalize_text(s: &str) -> String {
    let folded = fold_to_ascii(s);
    let blanked: String = folded
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    blanked.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Normalize a track title for matching.
/// Strips feature credits, remaster/live/edit markers, then applies the
/// shared text pass. Total and idempotent; empty input yields "".
pub fn normalize_title(title: &str) -> String {
    if title.is_empty() {
        return String::new();
    }
    let mut result = title.to_string();
    for pattern in TITLE_NOISE_PATTERNS.iter() {
        result = pattern.replace_all(&result, "").to_string();
    }
    normalize_text(&result)
}

/// Normalize an artist name for matching.
/// Strips a trailing featured-artist clause, then applies the shared text
/// pass. Total and idempotent; empty input yields "".
pub fn normalize_artist(artist: &str) -> String {
    if artist.is_empty() {
        return String::new();
    }
    let result = ARTIST_FEAT_CLAUSE.replace(artist, "");
    normalize_text(&result)
}

/// Stable slug identifier for a song, derived from the shared text pass.
/// Used when minting ids for imported rows that lack one.
/// e.g. ("Simon & Garfunkel", "The Boxer") → "simon-garfunkel-the-boxer"
pub fn generate_song_id(artist: &str, title: &str) -> String {
    let a = normalize_text(artist).replace(' ', "-");
    let t = normalize_text(title).replace(' ', "-");
    format!("{}-{}", a, t)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title_feature_markers() {
        assert_eq!(normalize_title("Song (feat. Artist)"), "song");
        assert_eq!(normalize_title("Song (ft. Artist)"), "song");
        assert_eq!(normalize_title("Song (featuring Artist)"), "song");
        assert_eq!(normalize_title("Song (with Artist)"), "song");
        assert_eq!(normalize_title("Song [feat. Artist]"), "song");
        assert_eq!(normalize_title("Song [ft. Artist]"), "song");
    }

    #[test]
    fn test_normalize_title_remaster_markers() {
        assert_eq!(normalize_title("Song (Remastered 2011)"), "song");
        assert_eq!(normalize_title("Song (Remaster)"), "song");
        assert_eq!(normalize_title("Song [2011 Remaster]"), "song");
        assert_eq!(normalize_title("Song - Remastered 2011"), "song");
        assert_eq!(normalize_title("Song - Remaster"), "song");
    }

    #[test]
    fn test_normalize_title_live_and_edit_markers() {
        assert_eq!(normalize_title("Song (Live)"), "song");
        assert_eq!(normalize_title("Song (Live at Wembley)"), "song");
        assert_eq!(normalize_title("Song [Live 1985]"), "song");
        assert_eq!(normalize_title("Song (Radio Edit)"), "song");
        assert_eq!(normalize_title("Song (Radio Mix)"), "song");
        assert_eq!(normalize_title("Song (Single Version)"), "song");
        assert_eq!(normalize_title("Song (Album Version)"), "song");
        assert_eq!(normalize_title("Song (Original Mix)"), "song");
        assert_eq!(normalize_title("Song (Explicit)"), "song");
        assert_eq!(normalize_title("Song (Clean)"), "song");
    }

    #[test]
    fn test_normalize_title_stacked_markers() {
        assert_eq!(
            normalize_title("Song (feat. Artist) (Live) - Remastered 2011"),
            "song"
        );
        assert_eq!(normalize_title("Song - Remastered 2011 (Live)"), "song");
    }

    #[test]
    fn test_normalize_artist() {
        assert_eq!(normalize_artist("Artist feat. Other"), "artist");
        assert_eq!(normalize_artist("Artist ft. Other"), "artist");
        assert_eq!(normalize_artist("Artist featuring Other"), "artist");
        assert_eq!(normalize_artist("Artist with Other"), "artist");
        assert_eq!(normalize_artist("Queen feat. David Bowie"), "queen");
    }

    #[test]
    fn test_normalize_text_punctuation() {
        assert_eq!(normalize_text("Simon & Garfunkel"), "simon garfunkel");
        assert_eq!(normalize_text("AC/DC"), "ac dc");
        assert_eq!(normalize_text("Don't Stop Me Now"), "don t stop me now");
        assert_eq!(normalize_text("  multiple   spaces  "), "multiple spaces");
    }

    #[test]
    fn test_normalize_text_unicode() {
        assert_eq!(normalize_text("Beyoncé"), "beyonce");
        assert_eq!(normalize_text("Motörhead"), "motorhead");
        assert_eq!(normalize_text("Björk"), "bjork");
        assert_eq!(normalize_text("Sigur Rós"), "sigur ros");
    }

    #[test]
    fn test_normalization_is_total() {
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_artist(""), "");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_title("!!!???"), "");
        assert_eq!(normalize_artist("&&&"), "");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "Song (feat. Artist) - Remastered 2011",
            "Simon & Garfunkel",
            "Bohemian Rhapsody (Live at Wembley)",
            "Beyoncé",
            "plain title",
            "",
        ];
        for s in inputs {
            let t1 = normalize_title(s);
            assert_eq!(normalize_title(&t1), t1, "title not idempotent for {:?}", s);
            let a1 = normalize_artist(s);
            assert_eq!(normalize_artist(&a1), a1, "artist not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_case_insensitive_markers() {
        assert_eq!(normalize_title("SONG (FEAT. ARTIST)"), "song");
        assert_eq!(normalize_title("Song (remastered 2011)"), "song");
        assert_eq!(normalize_artist("ARTIST FEAT. OTHER"), "artist");
    }

    #[test]
    fn test_bare_feat_in_title_is_kept() {
        // Unbracketed feature credits in titles are left alone; only the
        // artist normalizer strips trailing clauses.
        assert_eq!(normalize_title("Song feat. Artist"), "song feat artist");
    }

    #[test]
    fn test_generate_song_id() {
        assert_eq!(
            generate_song_id("Simon & Garfunkel", "The Boxer"),
            "simon-garfunkel-the-boxer"
        );
        assert_eq!(generate_song_id("Queen", "Bohemian Rhapsody"), "queen-bohemian-rhapsody");
    }
}
