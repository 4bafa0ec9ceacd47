//! Motion-Blur Sequencing Tests
//!
//! Tests for:
//! - Bootstrap running-average frames until the history ring fills
//! - The switch to the steady sliding window
//! - Ring cursor wrap-around and the oldest-entry index
//! - Accumulation ping-pong and the presentable buffer
//! - Reset after target recreation

use gloam::renderer::passes::{BlurSequencer, BlurTechnique};
use gloam::renderer::targets::PAST_FRAME_COUNT;

/// Runs one whole frame of bookkeeping, as the renderer does.
fn step(sequencer: &mut BlurSequencer) -> (BlurTechnique, u32) {
    let picked = sequencer.begin_frame();
    sequencer.advance();
    picked
}

// ============================================================================
// Technique Selection
// ============================================================================

#[test]
fn first_frame_bootstraps_with_count_one() {
    let mut sequencer = BlurSequencer::new();
    assert_eq!(sequencer.begin_frame(), (BlurTechnique::Bootstrap, 1));
}

#[test]
fn bootstrap_counts_every_frame_of_the_window() {
    let mut sequencer = BlurSequencer::new();
    for expected in 1..=PAST_FRAME_COUNT as u32 {
        let (technique, count) = step(&mut sequencer);
        assert_eq!(technique, BlurTechnique::Bootstrap);
        assert_eq!(count, expected);
    }
}

#[test]
fn window_full_switches_to_steady() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..PAST_FRAME_COUNT {
        step(&mut sequencer);
    }
    let (technique, count) = step(&mut sequencer);
    assert_eq!(technique, BlurTechnique::Steady);
    assert_eq!(count, PAST_FRAME_COUNT as u32);

    // And it stays steady from here on.
    for _ in 0..20 {
        let (technique, _) = step(&mut sequencer);
        assert_eq!(technique, BlurTechnique::Steady);
    }
}

#[test]
fn technique_indices_match_shader_switch() {
    assert_eq!(BlurTechnique::Bootstrap.index(), 0);
    assert_eq!(BlurTechnique::Steady.index(), 1);
}

// ============================================================================
// Ring Indexing
// ============================================================================

#[test]
fn scene_index_walks_the_ring_and_wraps() {
    let mut sequencer = BlurSequencer::new();
    for frame in 0..(PAST_FRAME_COUNT * 2 + 3) {
        assert_eq!(sequencer.scene_index(), frame % PAST_FRAME_COUNT);
        step(&mut sequencer);
    }
}

#[test]
fn oldest_entry_is_the_slot_after_current() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..PAST_FRAME_COUNT + 2 {
        assert_eq!(
            sequencer.oldest_index(),
            (sequencer.scene_index() + 1) % PAST_FRAME_COUNT
        );
        step(&mut sequencer);
    }
}

#[test]
fn oldest_is_never_current() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..PAST_FRAME_COUNT {
        assert_ne!(sequencer.scene_index(), sequencer.oldest_index());
        step(&mut sequencer);
    }
}

// ============================================================================
// Accumulation Ping-Pong
// ============================================================================

#[test]
fn read_and_write_buffers_are_distinct() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..5 {
        assert_ne!(sequencer.read_index(), sequencer.write_index());
        step(&mut sequencer);
    }
}

#[test]
fn advance_makes_the_written_buffer_presentable() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..5 {
        let written = sequencer.write_index();
        let _ = sequencer.begin_frame();
        sequencer.advance();
        assert_eq!(sequencer.presentable_index(), written);
    }
}

#[test]
fn ping_pong_alternates_every_frame() {
    let mut sequencer = BlurSequencer::new();
    let first = sequencer.read_index();
    step(&mut sequencer);
    assert_eq!(sequencer.read_index(), 1 - first);
    step(&mut sequencer);
    assert_eq!(sequencer.read_index(), first);
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn reset_forgets_all_history() {
    let mut sequencer = BlurSequencer::new();
    for _ in 0..PAST_FRAME_COUNT + 3 {
        step(&mut sequencer);
    }
    sequencer.reset();

    assert_eq!(sequencer.scene_index(), 0);
    assert_eq!(sequencer.frames_seen(), 0);
    assert_eq!(sequencer.begin_frame(), (BlurTechnique::Bootstrap, 1));
}

#[test]
fn default_matches_new() {
    assert_eq!(BlurSequencer::default(), BlurSequencer::new());
}
