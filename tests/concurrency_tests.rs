// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Concurrent signups and cancellations on one workout.
//!
//! Requires `TEST_DATABASE_URL`.

use std::collections::HashSet;
use triclub::db::roster;
use triclub::models::Role;
use triclub::signup::ToggleOutcome;

mod common;
use common::{create_members, create_user, create_workout};

const CAPACITY: i32 = 3;
const NUM_CONCURRENT_MEMBERS: usize = 12;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_signups_never_exceed_capacity() {
    require_database!();
    let db = common::test_db().await;
    let (service, _) = common::signup_service(&db);

    let author = create_user(&db, Role::Exec).await;
    let workout = create_workout(&db, author.id, Some(CAPACITY)).await;
    let members = create_members(&db, NUM_CONCURRENT_MEMBERS).await;

    let mut handles = vec![];
    for member in &members {
        let service = service.clone();
        let (workout_id, user_id) = (workout.id, member.id);
        handles.push(tokio::spawn(async move {
            service.toggle_signup(workout_id, user_id).await
        }));
    }

    let mut signed_up = 0;
    let mut waitlisted = 0;
    for handle in handles {
        let outcome = handle
            .await
            .expect("Task join failed")
            .expect("Toggle failed");
        if outcome == ToggleOutcome::signed_up() {
            signed_up += 1;
        } else {
            assert_eq!(outcome, ToggleOutcome::waitlisted());
            waitlisted += 1;
        }
    }

    assert_eq!(signed_up, CAPACITY as usize);
    assert_eq!(waitlisted, NUM_CONCURRENT_MEMBERS - CAPACITY as usize);

    let mut conn = db.pool().acquire().await.unwrap();
    assert_eq!(
        roster::signup_count(&mut conn, workout.id).await.unwrap(),
        i64::from(CAPACITY)
    );
    assert_eq!(
        roster::list_waitlist(&mut conn, workout.id)
            .await
            .unwrap()
            .len(),
        NUM_CONCURRENT_MEMBERS - CAPACITY as usize
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_cancellations_promote_distinct_users() {
    require_database!();
    let db = common::test_db().await;
    let (service, notifier) = common::signup_service(&db);

    let author = create_user(&db, Role::Exec).await;
    let workout = create_workout(&db, author.id, Some(2)).await;
    let m = create_members(&db, 5).await;
    for member in &m {
        service.toggle_signup(workout.id, member.id).await.unwrap();
    }

    let cancels: Vec<_> = [m[0].id, m[1].id]
        .into_iter()
        .map(|user_id| {
            let service = service.clone();
            let workout_id = workout.id;
            tokio::spawn(async move { service.toggle_signup(workout_id, user_id).await })
        })
        .collect();
    for handle in cancels {
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(outcome, ToggleOutcome::cancelled(false));
    }

    let mut conn = db.pool().acquire().await.unwrap();
    let signed: HashSet<i64> = roster::list_signups(&mut conn, workout.id)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.user_id)
        .collect();
    assert_eq!(signed, HashSet::from([m[2].id, m[3].id]));

    let waitlist: Vec<i64> = roster::list_waitlist(&mut conn, workout.id)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.user_id)
        .collect();
    assert_eq!(waitlist, vec![m[4].id]);

    let notified: HashSet<i64> = notifier.recorded().iter().map(|n| n.user_id).collect();
    assert_eq!(notified, HashSet::from([m[2].id, m[3].id]));
}
