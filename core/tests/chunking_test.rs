//! Integration tests for profile-driven chunk packing

use voiceforge_core::{
    build_long_text_chunks, char_len, normalize_text, ChunkingProfile, LanguageBucket,
    ProfileTable, ENGINE_COMPACT, ENGINE_EXTENDED,
};

const HINDI_SAMPLE: &str = "नमस्ते। यह एक परीक्षण वाक्य है। यह दूसरा वाक्य है।";

fn all_profiles() -> Vec<(String, ChunkingProfile)> {
    let table = ProfileTable::builtin();
    let mut out = Vec::new();
    for engine in [ENGINE_COMPACT, ENGINE_EXTENDED] {
        for bucket in [LanguageBucket::Hindi, LanguageBucket::Default] {
            let profile = table.get(engine, bucket).expect("builtin profile");
            out.push((format!("{engine}/{}", bucket.as_str()), profile));
        }
    }
    out
}

fn long_mixed_text() -> String {
    let mut text = String::new();
    for i in 0..40 {
        text.push_str(&format!(
            "Paragraph {i} opens calmly. It continues, with a pause; then another: and finally \
             a very long run of words without any punctuation that just keeps going on and on \
             for quite a while until the sentence eventually needs to be forcibly divided by \
             the segmenter because nothing else can save it from being far too long for any \
             synthesis engine to accept in one piece {i}\n\n{HINDI_SAMPLE}\r\n"
        ));
    }
    text
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn round_trip_preserves_order_and_words() {
    let text = long_mixed_text();
    let normalized = normalize_text(&text);
    for (name, profile) in all_profiles() {
        let chunks = build_long_text_chunks(&text, &profile);
        let rebuilt = chunks
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(squash(&rebuilt), squash(&normalized), "profile {name}");
    }
}

#[test]
fn every_chunk_respects_profile_caps() {
    let text = long_mixed_text();
    for (name, profile) in all_profiles() {
        let chunks = build_long_text_chunks(&text, &profile);
        assert!(chunks.len() > 1, "profile {name} should split");
        for chunk in &chunks {
            assert!(
                chunk.char_count() <= profile.hard_char_cap,
                "profile {name}: chunk {} has {} chars",
                chunk.index(),
                chunk.char_count()
            );
            assert!(
                chunk.word_count() <= profile.max_words_per_chunk,
                "profile {name}: chunk {} has {} words",
                chunk.index(),
                chunk.word_count()
            );
            assert_eq!(chunk.char_count(), char_len(chunk.text()));
        }
    }
}

#[test]
fn non_empty_input_yields_chunks_and_blank_yields_none() {
    for (_, profile) in all_profiles() {
        assert_eq!(build_long_text_chunks("x", &profile).len(), 1);
        assert_eq!(build_long_text_chunks("?!", &profile).len(), 1);
        assert!(build_long_text_chunks("", &profile).is_empty());
        assert!(build_long_text_chunks(" \r\n\t ", &profile).is_empty());
    }
}

#[test]
fn overlong_token_is_sliced_not_dropped() {
    let table = ProfileTable::builtin();
    let profile = table.resolve(ENGINE_COMPACT, "hi").unwrap();
    let token = "क".repeat(400);
    let chunks = build_long_text_chunks(&token, &profile);
    assert_eq!(chunks.len(), 3);
    let counts: Vec<usize> = chunks.iter().map(|c| c.char_count()).collect();
    assert_eq!(counts, vec![160, 160, 80]);
    let rejoined: String = chunks.iter().map(|c| c.text()).collect();
    assert_eq!(rejoined, token);
}

#[test]
fn hindi_scenario_single_then_multiple_chunks() {
    let table = ProfileTable::builtin();
    let profile = table.resolve(ENGINE_COMPACT, "hi").unwrap();

    let normalized = normalize_text(HINDI_SAMPLE);
    assert!(char_len(&normalized) <= profile.target_char_cap);
    let chunks = build_long_text_chunks(HINDI_SAMPLE, &profile);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text(), normalized);

    let repeated = vec![HINDI_SAMPLE; 20].join(" ");
    let chunks = build_long_text_chunks(&repeated, &profile);
    assert!(chunks.len() > 1);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index(), i);
        assert!(chunk.char_count() <= 160);
    }
}

#[test]
fn packing_prefers_target_cap_over_hard_cap() {
    let table = ProfileTable::builtin();
    let profile = table.resolve(ENGINE_COMPACT, "en").unwrap();
    let sentence = "This sentence is exactly fifty characters long ok.";
    assert_eq!(char_len(sentence), 50);
    let text = vec![sentence; 10].join(" ");
    let chunks = build_long_text_chunks(&text, &profile);
    for chunk in &chunks {
        assert!(chunk.char_count() <= profile.target_char_cap);
    }
    // 3 sentences = 152 chars fit under 180; a 4th would make 203.
    assert_eq!(chunks[0].char_count(), 152);
}
