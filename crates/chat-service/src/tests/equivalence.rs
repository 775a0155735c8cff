//! Memory and Redis backends behave the same.

use super::harness::{take_messages, TestHarness};
use chat_protocol_types::Message;

/// Publish/subscribe script run identically against one backend.
async fn run_script(harness: &TestHarness) -> (Vec<Message>, Vec<Message>, Vec<Message>) {
    harness.service.create_channel("a", "A").await.unwrap();
    harness.service.create_channel("b", "B").await.unwrap();

    harness.send("a", "alice", "a1").await;
    let mut replaying = harness.subscribe("a", true).await;
    let mut live_only = harness.subscribe("a", false).await;
    harness.send("b", "bob", "b1").await;
    harness.send("a", "bob", "a2").await;
    harness.send("a", "alice", "a3").await;

    let replayed = take_messages(&mut replaying, 3).await;
    let live = take_messages(&mut live_only, 2).await;
    let history = harness.service.get_messages("a").await.unwrap();
    (replayed, live, history)
}

fn project(messages: &[Message]) -> Vec<(String, String, String)> {
    messages
        .iter()
        .map(|m| {
            (
                m.channel_slug.clone(),
                m.sender_username.clone(),
                m.body.text.clone(),
            )
        })
        .collect()
}

#[tokio::test]
async fn same_script_same_observations() {
    let memory = run_script(&TestHarness::memory()).await;
    let redis = run_script(&TestHarness::redis()).await;

    assert_eq!(project(&memory.0), project(&redis.0));
    assert_eq!(project(&memory.1), project(&redis.1));
    assert_eq!(project(&memory.2), project(&redis.2));

    let expected: Vec<(String, String, String)> = [("alice", "a1"), ("bob", "a2"), ("alice", "a3")]
        .into_iter()
        .map(|(sender, text)| ("a".to_string(), sender.to_string(), text.to_string()))
        .collect();
    assert_eq!(project(&memory.0), expected);
}

#[tokio::test]
async fn channel_listing_has_same_contents() {
    let mut listings = Vec::new();
    for harness in TestHarness::all() {
        for slug in ["x", "y", "z"] {
            harness.service.create_channel(slug, slug).await.unwrap();
        }
        let mut slugs: Vec<String> = harness
            .service
            .get_channels()
            .await
            .unwrap()
            .iter()
            .map(|c| c.slug().to_string())
            .collect();
        // Redis hashes are unordered.
        slugs.sort();
        listings.push(slugs);
    }
    assert_eq!(listings[0], listings[1]);
}
