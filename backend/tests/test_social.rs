//! Tests for the social feed and whispers

mod common;

use common::{assert_conserved, balance_of, reputation_of, setup_default};
use gauntlet_sim_core_rs::PostKind;

#[tokio::test]
async fn post_limit_resets_each_game_hour() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    for i in 0..10 {
        engines
            .social
            .create_post("vega", PostKind::General, &format!("post {i}"))
            .await
            .unwrap();
    }
    // The eleventh post this hour is spam.
    assert!(engines
        .social
        .create_post("vega", PostKind::General, "one too many")
        .await
        .is_err());

    common::set_hour(&engines, 1).await;
    assert!(engines
        .social
        .create_post("vega", PostKind::General, "fresh hour")
        .await
        .is_ok());
}

#[tokio::test]
async fn organic_votes_are_single_shot_and_move_reputation() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000), ("altair", 1_000)]).await;
    let post = engines
        .social
        .create_post("vega", PostKind::MarketAnalysis, "the dip is a trap")
        .await
        .unwrap();

    assert!(engines.social.vote(post.id(), "vega", true).await.is_err());

    engines.social.vote(post.id(), "rigel", true).await.unwrap();
    assert_eq!(reputation_of(&engines, "vega").await, 51);
    // The same voter cannot vote twice, in either direction.
    assert!(engines.social.vote(post.id(), "rigel", false).await.is_err());

    engines.social.vote(post.id(), "altair", false).await.unwrap();
    assert_eq!(reputation_of(&engines, "vega").await, 49);

    let world = engines.store.read().await;
    let post = world.posts.get(post.id()).unwrap();
    assert_eq!(post.upvotes, 1);
    assert_eq!(post.downvotes, 1);
}

#[tokio::test]
async fn comments_attach_to_live_posts_only() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    let post = engines
        .social
        .create_post("vega", PostKind::Rumor, "someone is defecting")
        .await
        .unwrap();
    engines
        .social
        .create_comment(post.id(), "rigel", "source?")
        .await
        .unwrap();
    assert!(engines
        .social
        .create_comment("missing-post", "rigel", "hello?")
        .await
        .is_err());

    let world = engines.store.read().await;
    assert_eq!(world.posts.get(post.id()).unwrap().comments.len(), 1);
}

#[tokio::test]
async fn whisper_costs_are_burned() {
    let engines = setup_default(&[("vega", 1_000), ("rigel", 1_000)]).await;
    engines
        .social
        .send_whisper("vega", "rigel", "meet me at the order book")
        .await
        .unwrap();
    assert_eq!(balance_of(&engines, "vega").await, 980);
    assert_eq!(balance_of(&engines, "rigel").await, 1_000);
    assert_conserved(&engines).await;

    assert!(engines.social.send_whisper("vega", "vega", "hi").await.is_err());

    let unread = engines.social.drain_unread_whispers("rigel").await;
    assert_eq!(unread.len(), 1);
    // Draining marks them read.
    assert!(engines.social.drain_unread_whispers("rigel").await.is_empty());
}

#[tokio::test]
async fn feed_returns_newest_first() {
    let engines = setup_default(&[("vega", 1_000)]).await;
    engines
        .social
        .create_post("vega", PostKind::General, "first")
        .await
        .unwrap();
    common::advance_secs(&engines, 60).await;
    engines
        .social
        .create_post("vega", PostKind::General, "second")
        .await
        .unwrap();

    let feed = engines.social.feed(10).await;
    assert_eq!(feed[0].content, "second");
    assert_eq!(feed[1].content, "first");
}
