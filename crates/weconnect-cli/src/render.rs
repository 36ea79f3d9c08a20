//! Plain-text rendering for CLI output.

use chrono::{DateTime, Duration, Utc};
use weconnect_core::models::{Comment, MyProfile, Post, PostWithCounts, UserProfile, UserSummary};
use weconnect_core::utils::{age_display, format_date, single_line, truncate_string};

/// Width posts and comments are clipped to in list views
const BODY_WIDTH: usize = 72;

/// Posts older than this show a date instead of a relative age
const RELATIVE_AGE_DAYS: i64 = 7;

pub fn age(at: DateTime<Utc>) -> String {
    let now = Utc::now();
    if now - at > Duration::days(RELATIVE_AGE_DAYS) {
        format_date(at)
    } else {
        age_display(at, now)
    }
}

fn body(text: &str) -> String {
    truncate_string(&single_line(text), BODY_WIDTH)
}

pub fn print_feed(posts: &[PostWithCounts]) {
    if posts.is_empty() {
        println!("Nothing here yet. Follow people or write the first post.");
        return;
    }
    for post in posts {
        print_feed_post(post);
    }
}

fn print_feed_post(post: &PostWithCounts) {
    let heart = if post.is_liked_by_current_user { "♥" } else { "♡" };
    println!("#{} {}  @{} · {}", post.id, post.title, post.owner_username, age(post.timestamp));
    println!("    {}", body(&post.content));
    println!("    {} {}  {}", heart, post.display_likes(), post.display_comments());
    println!();
}

pub fn print_threads(threads: &[(PostWithCounts, Vec<Comment>)]) {
    if threads.is_empty() {
        print_feed(&[]);
        return;
    }
    for (post, comments) in threads {
        print_feed_post(post);
        for comment in comments {
            println!("      @{}: {}", comment.owner_username, body(&comment.content));
        }
        if !comments.is_empty() {
            println!();
        }
    }
}

pub fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts.");
        return;
    }
    for post in posts {
        println!("#{} {} · {}", post.id, post.title, age(post.timestamp));
        println!("    {}", body(&post.content));
    }
}

pub fn print_comments(comments: &[Comment]) {
    if comments.is_empty() {
        println!("No comments yet.");
        return;
    }
    for comment in comments {
        println!("@{} · {}: {}", comment.owner_username, age(comment.timestamp), comment.content);
    }
}

pub fn print_users(users: &[UserSummary]) {
    if users.is_empty() {
        println!("No one else is here yet.");
        return;
    }
    for user in users {
        let marker = if user.is_following { " (following)" } else { "" };
        println!("#{} @{}  {}{}", user.id, user.username, user.display_followers(), marker);
    }
}

pub fn print_my_profile(profile: &MyProfile, posts: &[Post]) {
    println!("@{} (#{})", profile.username, profile.id);
    println!("{} followers · {} following", profile.followers_count, profile.following_count);
    println!();
    print_posts(posts);
}

pub fn print_user_profile(profile: &UserProfile) {
    let marker = if profile.is_following { " · you follow them" } else { "" };
    println!("@{} (#{}){}", profile.username, profile.id, marker);
    println!("{} followers · {} following", profile.followers_count, profile.following_count);
    println!();
    print_posts(&profile.posts);
}
