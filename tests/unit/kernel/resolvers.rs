use super::*;
use crate::kernel::services::ports::DirectorySnapshot;

fn directory() -> DirectorySnapshot {
    let mut bob = UserEntity::new("1", "bob");
    bob.global_name = Some("Bobby Tables".to_string());
    let mut alice = UserEntity::new("2", "alice");
    alice.nickname = Some("Al".to_string());
    let bobcat = UserEntity::new("3", "bobcat");

    let mut general = ChannelEntity::new("10", "general");
    general.guild_id = Some("100".to_string());

    DirectorySnapshot {
        users: vec![bobcat, bob, alice],
        channels: vec![general, ChannelEntity::new("11", "off-topic")],
        extra_channels: vec![
            ChannelEntity::new("11", "off-topic"),
            ChannelEntity::new("12", "general-chat"),
        ],
        guilds: vec![GuildEntity {
            id: "100".to_string(),
            name: "Rustaceans".to_string(),
        }],
        plugins: vec![PluginEntity {
            id: "silent-typing".to_string(),
            name: "SilentTyping".to_string(),
            enabled: true,
        }],
        ..DirectorySnapshot::default()
    }
}

#[test]
fn score_tiers() {
    assert_eq!(score_target_match("bob", "Bob"), SCORE_EXACT);
    assert_eq!(score_target_match("bob", "bobcat"), SCORE_PREFIX);
    assert_eq!(score_target_match("cat", "bobcat"), SCORE_SUBSTRING);
    assert_eq!(score_target_match("dog", "bobcat"), 0);
}

#[test]
fn punctuation_insensitive_form_can_win() {
    assert_eq!(score_target_match("off topic", "off-topic"), SCORE_EXACT);
    assert_eq!(score_target_match("silent typing", "silent-typing"), SCORE_EXACT);
}

#[test]
fn users_sorted_by_score_then_label() {
    let candidates = resolve_users(&directory(), "bob");
    let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(candidates[0].label, "Bobby Tables");
    assert_eq!(candidates[0].detail.as_deref(), Some("@bob"));
}

#[test]
fn nickname_counts_as_a_name() {
    let candidates = resolve_users(&directory(), "al");
    assert_eq!(candidates[0].id, "2");
    assert_eq!(candidates[0].score, SCORE_EXACT);
}

#[test]
fn mentions_and_ids_short_circuit() {
    let by_mention = resolve_users(&directory(), "<@!2>");
    assert_eq!(by_mention.len(), 1);
    assert_eq!(by_mention[0].id, "2");

    let by_channel_mention = resolve_channels(&directory(), "<#12>");
    assert_eq!(by_channel_mention.len(), 1);
    assert_eq!(by_channel_mention[0].label, "#general-chat");

    let by_id = resolve_guilds(&directory(), "100");
    assert_eq!(by_id[0].label, "Rustaceans");
}

#[test]
fn channels_merge_both_sources_without_duplicates() {
    let channels = all_channels(&directory());
    let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["10", "11", "12"]);

    let candidates = resolve_channels(&directory(), "#general");
    let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["10", "12"]);
}

#[test]
fn misses_yield_a_single_no_match_row() {
    let candidates = resolve_plugins(&directory(), "nope");
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].is_no_match());
    assert_eq!(candidates[0].label, "No match for \"nope\"");

    let destinations = resolve_destinations(&directory(), "zzz");
    assert_eq!(destinations.len(), 1);
    assert!(destinations[0].is_no_match());
}

#[test]
fn destinations_mix_channels_and_guilds() {
    let candidates = resolve_destinations(&directory(), "rust");
    assert_eq!(candidates[0].kind, CandidateKind::Guild);
}

#[test]
fn empty_target_lists_everything_alphabetically() {
    let candidates = resolve_users(&directory(), "");
    let labels: Vec<&str> = candidates.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Al", "Bobby Tables", "bobcat"]);
}

#[test]
fn url_normalization() {
    assert_eq!(
        normalize_url("example.com/docs").unwrap().as_str(),
        "https://example.com/docs"
    );
    assert_eq!(
        normalize_url("http://localhost:8080").unwrap().as_str(),
        "http://localhost:8080/"
    );
    assert!(matches!(
        normalize_url("not a url"),
        Err(ValidationError::MalformedUrl { .. })
    ));
    assert!(normalize_url("nohost").is_err());
    assert!(normalize_url("").is_err());
}
