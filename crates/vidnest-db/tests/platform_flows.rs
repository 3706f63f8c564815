//! End-to-end persistence flows: toggle parity, channel statistics,
//! pagination windows, playlist membership, and comment liker sets.

use uuid::Uuid;

use vidnest_db::Database;
use vidnest_db::queries::VideoFilter;
use vidnest_types::models::LikeTarget;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn seed_user(db: &Database, username: &str) -> String {
    let id = new_id();
    db.create_user(&id, username, "argon2id-hash", "user").unwrap();
    id
}

fn seed_video(db: &Database, owner: &str, title: &str) -> String {
    let id = new_id();
    db.insert_video(&id, title, "a description", None, "/api/media/thumb", 12.5, owner)
        .unwrap();
    id
}

fn like_rows(db: &Database, user: &str, target_id: &str) -> i64 {
    db.with_conn(|conn| {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ?1 AND target_id = ?2",
            [user, target_id],
            |row| row.get(0),
        )?;
        Ok(count)
    })
    .unwrap()
}

// -- Toggle-relation flows --

#[test]
fn toggle_pair_returns_to_original_state() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "first");

    let created = db
        .toggle_like(&new_id(), &viewer, LikeTarget::Video, &video)
        .unwrap();
    assert!(created);
    assert!(db.like_exists(&viewer, LikeTarget::Video, &video).unwrap());

    let created = db
        .toggle_like(&new_id(), &viewer, LikeTarget::Video, &video)
        .unwrap();
    assert!(!created);
    assert!(!db.like_exists(&viewer, LikeTarget::Video, &video).unwrap());
    assert_eq!(like_rows(&db, &viewer, &video), 0);
}

#[test]
fn odd_toggle_count_leaves_relation_present_even_absent() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "first");

    for _ in 0..5 {
        db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &video)
            .unwrap();
    }
    assert!(db.like_exists(&viewer, LikeTarget::Video, &video).unwrap());
    assert_eq!(like_rows(&db, &viewer, &video), 1);

    for _ in 0..5 {
        db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &video)
            .unwrap();
    }
    assert!(!db.like_exists(&viewer, LikeTarget::Video, &video).unwrap());
    assert_eq!(like_rows(&db, &viewer, &video), 0);
}

#[test]
fn duplicate_relation_rows_are_rejected_by_constraint() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "first");

    db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &video)
        .unwrap();

    // A raw second insert for the same (user, kind, target) must fail
    let result = db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO likes (id, user_id, target_kind, target_id) VALUES (?1, ?2, 'video', ?3)",
            rusqlite::params![new_id(), viewer, video],
        )?;
        Ok(())
    });
    assert!(result.is_err());
    assert_eq!(like_rows(&db, &viewer, &video), 1);
}

#[test]
fn same_user_may_like_same_id_under_different_kinds() {
    let db = Database::open_in_memory().unwrap();
    let viewer = seed_user(&db, "viewer");
    let target = new_id();

    assert!(db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &target).unwrap());
    assert!(db.toggle_like(&new_id(), &viewer, LikeTarget::Comment, &target).unwrap());
    assert!(db.like_exists(&viewer, LikeTarget::Video, &target).unwrap());
    assert!(db.like_exists(&viewer, LikeTarget::Comment, &target).unwrap());
}

#[test]
fn subscription_toggle_alternates() {
    let db = Database::open_in_memory().unwrap();
    let channel = seed_user(&db, "channel");
    let subscriber = seed_user(&db, "subscriber");

    assert!(db.toggle_subscription(&new_id(), &subscriber, &channel).unwrap());
    assert!(db.subscription_exists(&subscriber, &channel).unwrap());

    assert!(!db.toggle_subscription(&new_id(), &subscriber, &channel).unwrap());
    assert!(!db.subscription_exists(&subscriber, &channel).unwrap());
}

#[test]
fn subscriber_listings_compose_user_documents() {
    let db = Database::open_in_memory().unwrap();
    let channel = seed_user(&db, "channel");
    let alice = seed_user(&db, "alice");
    let bob = seed_user(&db, "bob");

    db.toggle_subscription(&new_id(), &alice, &channel).unwrap();
    db.toggle_subscription(&new_id(), &bob, &channel).unwrap();

    let subscribers = db.list_channel_subscribers(&channel).unwrap();
    let mut names: Vec<_> = subscribers.iter().map(|s| s.username.clone()).collect();
    names.sort();
    assert_eq!(names, ["alice", "bob"]);

    let channels = db.list_subscribed_channels(&alice).unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].username, "channel");
    assert_eq!(channels[0].user_id, channel);
}

// -- Channel statistics --

#[test]
fn channel_stats_are_zero_for_empty_channel() {
    let db = Database::open_in_memory().unwrap();
    let channel = seed_user(&db, "channel");

    assert_eq!(db.count_channel_videos(&channel).unwrap(), 0);
    assert_eq!(db.count_channel_subscribers(&channel).unwrap(), 0);
    assert_eq!(db.sum_channel_views(&channel).unwrap(), 0);
    assert_eq!(db.count_channel_content_likes(&channel).unwrap(), 0);
}

#[test]
fn channel_stats_aggregate_videos_views_subscribers_and_likes() {
    let db = Database::open_in_memory().unwrap();
    let channel = seed_user(&db, "channel");
    let viewer = seed_user(&db, "viewer");

    let v1 = seed_video(&db, &channel, "first");
    let v2 = seed_video(&db, &channel, "second");

    for _ in 0..3 {
        db.increment_views(&v1).unwrap();
    }
    db.increment_views(&v2).unwrap();

    db.toggle_subscription(&new_id(), &viewer, &channel).unwrap();

    let comment = new_id();
    db.insert_comment(&comment, &v1, &viewer, "nice", None).unwrap();
    let tweet = new_id();
    db.insert_tweet(&tweet, &channel, "hello").unwrap();

    db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &v1).unwrap();
    db.toggle_like(&new_id(), &viewer, LikeTarget::Comment, &comment).unwrap();
    db.toggle_like(&new_id(), &viewer, LikeTarget::Tweet, &tweet).unwrap();

    assert_eq!(db.count_channel_videos(&channel).unwrap(), 2);
    assert_eq!(db.count_channel_subscribers(&channel).unwrap(), 1);
    assert_eq!(db.sum_channel_views(&channel).unwrap(), 4);
    assert_eq!(db.count_channel_content_likes(&channel).unwrap(), 3);
}

#[test]
fn soft_deleted_videos_drop_out_of_stats_and_listings() {
    let db = Database::open_in_memory().unwrap();
    let channel = seed_user(&db, "channel");
    let v1 = seed_video(&db, &channel, "kept");
    let v2 = seed_video(&db, &channel, "flagged");

    db.increment_views(&v1).unwrap();
    db.increment_views(&v2).unwrap();

    db.with_conn(|conn| {
        conn.execute("UPDATE videos SET is_deleted = 1 WHERE id = ?1", [&v2])?;
        Ok(())
    })
    .unwrap();

    assert_eq!(db.count_channel_videos(&channel).unwrap(), 1);
    assert_eq!(db.sum_channel_views(&channel).unwrap(), 1);

    let listed = db.list_channel_videos(&channel).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "kept");
}

// -- Video listing --

#[test]
fn pagination_window_returns_the_requested_slice() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");

    for i in 1..=25 {
        seed_video(&db, &owner, &format!("video-{i:02}"));
    }

    let page = 2;
    let limit = 10;
    let filter = VideoFilter {
        sort_by: Some("title".to_string()),
        ascending: true,
        limit,
        offset: (page - 1) * limit,
        ..Default::default()
    };

    let rows = db.list_videos(&filter).unwrap();
    let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
    let expected: Vec<String> = (11..=20).map(|i| format!("video-{i:02}")).collect();
    assert_eq!(titles, expected);

    assert_eq!(db.count_videos(&filter).unwrap(), 25);
}

#[test]
fn text_filter_matches_title_and_description_case_insensitively() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");

    let hit_title = new_id();
    db.insert_video(&hit_title, "Rust Tutorial", "basics", None, "/t", 1.0, &owner)
        .unwrap();
    let hit_description = new_id();
    db.insert_video(&hit_description, "episode two", "more RUST content", None, "/t", 1.0, &owner)
        .unwrap();
    seed_video(&db, &owner, "gardening");

    let filter = VideoFilter {
        text: Some("rust".to_string()),
        limit: 10,
        ..Default::default()
    };
    let rows = db.list_videos(&filter).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(db.count_videos(&filter).unwrap(), 2);
}

#[test]
fn owner_filter_narrows_the_listing() {
    let db = Database::open_in_memory().unwrap();
    let alice = seed_user(&db, "alice");
    let bob = seed_user(&db, "bob");
    seed_video(&db, &alice, "hers");
    seed_video(&db, &bob, "his");

    let filter = VideoFilter {
        owner_id: Some(alice.clone()),
        limit: 10,
        ..Default::default()
    };
    let rows = db.list_videos(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].owner_username, "alice");
}

#[test]
fn video_update_keeps_omitted_fields() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let video = seed_video(&db, &owner, "before");

    db.update_video(&video, Some("after"), None, None).unwrap();

    let row = db.get_video(&video).unwrap().unwrap();
    assert_eq!(row.title, "after");
    assert_eq!(row.description, "a description");
    assert_eq!(row.thumbnail_url, "/api/media/thumb");
}

#[test]
fn publish_toggle_flips_the_flag() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let video = seed_video(&db, &owner, "clip");

    assert!(db.get_video(&video).unwrap().unwrap().is_published);
    assert!(!db.toggle_publish(&video).unwrap());
    assert!(db.toggle_publish(&video).unwrap());
}

// -- Liked videos --

#[test]
fn liked_videos_compose_the_video_documents() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "clip");

    db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &video).unwrap();

    let liked = db.list_liked_videos(&viewer).unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0].title, "clip");
    assert_eq!(liked[0].owner_username, "owner");
}

#[test]
fn liked_videos_drop_like_rows_pointing_at_deleted_videos() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "clip");

    db.toggle_like(&new_id(), &viewer, LikeTarget::Video, &video).unwrap();
    db.delete_video(&video).unwrap();

    // The orphan relation row survives, but the join hides it
    assert!(db.like_exists(&viewer, LikeTarget::Video, &video).unwrap());
    assert!(db.list_liked_videos(&viewer).unwrap().is_empty());
}

// -- Playlists --

#[test]
fn playlist_membership_is_unique_and_ordered() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let playlist = new_id();
    db.insert_playlist(&playlist, "mix", "favourites", &owner).unwrap();

    let v1 = seed_video(&db, &owner, "one");
    let v2 = seed_video(&db, &owner, "two");
    let v3 = seed_video(&db, &owner, "three");

    assert!(db.add_playlist_video(&playlist, &v1).unwrap());
    assert!(db.add_playlist_video(&playlist, &v2).unwrap());
    assert!(db.add_playlist_video(&playlist, &v3).unwrap());

    // Second add of the same video reports a duplicate
    assert!(!db.add_playlist_video(&playlist, &v1).unwrap());

    assert_eq!(db.playlist_video_ids(&playlist).unwrap(), [v1.clone(), v2.clone(), v3.clone()]);
    assert_eq!(db.count_playlist_videos(&playlist).unwrap(), 3);

    // Removing the middle entry keeps the remaining order
    assert!(db.remove_playlist_video(&playlist, &v2).unwrap());
    assert_eq!(db.playlist_video_ids(&playlist).unwrap(), [v1, v3]);

    // Removing a video that is not in the playlist reports absence
    assert!(!db.remove_playlist_video(&playlist, &v2).unwrap());
}

#[test]
fn deleting_a_playlist_cascades_its_entries() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let playlist = new_id();
    db.insert_playlist(&playlist, "mix", "favourites", &owner).unwrap();
    let video = seed_video(&db, &owner, "clip");
    db.add_playlist_video(&playlist, &video).unwrap();

    db.delete_playlist(&playlist).unwrap();

    assert!(db.get_playlist(&playlist).unwrap().is_none());
    let entries: i64 = db
        .with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM playlist_videos WHERE playlist_id = ?1",
                [&playlist],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .unwrap();
    assert_eq!(entries, 0);
}

// -- Comment liker sets --

#[test]
fn comment_liker_set_rejects_double_like_and_double_unlike() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let viewer = seed_user(&db, "viewer");
    let video = seed_video(&db, &owner, "clip");
    let comment = new_id();
    db.insert_comment(&comment, &video, &viewer, "nice", None).unwrap();

    assert!(db.add_comment_liker(&comment, &viewer).unwrap());
    assert!(!db.add_comment_liker(&comment, &viewer).unwrap());
    assert_eq!(db.get_comment_likers(&comment).unwrap(), [viewer.clone()]);

    assert!(db.remove_comment_liker(&comment, &viewer).unwrap());
    assert!(!db.remove_comment_liker(&comment, &viewer).unwrap());
    assert!(db.get_comment_likers(&comment).unwrap().is_empty());
}

#[test]
fn liker_sets_batch_fetch_for_a_page_of_comments() {
    let db = Database::open_in_memory().unwrap();
    let owner = seed_user(&db, "owner");
    let alice = seed_user(&db, "alice");
    let bob = seed_user(&db, "bob");
    let video = seed_video(&db, &owner, "clip");

    let c1 = new_id();
    let c2 = new_id();
    db.insert_comment(&c1, &video, &alice, "first", None).unwrap();
    db.insert_comment(&c2, &video, &bob, "second", Some(c1.as_str())).unwrap();

    db.add_comment_liker(&c1, &alice).unwrap();
    db.add_comment_liker(&c1, &bob).unwrap();
    db.add_comment_liker(&c2, &alice).unwrap();

    let rows = db.likers_for_comments(&[c1.clone(), c2.clone()]).unwrap();
    assert_eq!(rows.iter().filter(|r| r.comment_id == c1).count(), 2);
    assert_eq!(rows.iter().filter(|r| r.comment_id == c2).count(), 1);

    // Deleting the comment clears its liker set
    db.delete_comment(&c1).unwrap();
    assert!(db.likers_for_comments(&[c1]).unwrap().is_empty());
}
