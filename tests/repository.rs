//! End-to-end behaviour of the content repository through the public API

use chrono::NaiveDate;
use std::fs;
use tempfile::TempDir;

use milkyway::content::{query, ContentError, ContentRepository, FrontMatter, NewPost, PostUpdate};

fn repo() -> (ContentRepository, TempDir) {
    let dir = TempDir::new().expect("temp dir should be created");
    (ContentRepository::new(dir.path().join("blog"), "md"), dir)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

fn sample(title: &str, category: &str, tags: &[&str], pinned: bool) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: format!("About {}", title),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        pinned,
    }
}

#[test]
fn get_after_create_returns_supplied_metadata() {
    let (repo, _dir) = repo();
    let new = sample("Daily English", "회화 MASTER/영어", &["몰입", "AI 최신 소식"], true);
    let address = repo.create(&new, date("2025-11-28")).unwrap();

    let post = repo.get(&address.category, &address.slug).unwrap();
    assert_eq!(post.meta.title, "Daily English");
    assert_eq!(post.meta.tags, vec!["몰입", "AI 최신 소식"]);
    assert!(post.meta.pinned);
    assert_eq!(post.meta.date, "2025-11-28");
    assert_eq!(post.content.trim(), "About Daily English");
}

#[test]
fn content_only_update_preserves_metadata() {
    let (repo, _dir) = repo();
    let address = repo
        .create(&sample("Keep", "notes", &["x", "x"], false), date("2025-01-02"))
        .unwrap();

    repo.update(&PostUpdate {
        category: address.category.clone(),
        slug: address.slug.clone(),
        content: "rewritten".to_string(),
        ..Default::default()
    })
    .unwrap();

    let post = repo.get(&address.category, &address.slug).unwrap();
    assert_eq!(post.meta.title, "Keep");
    assert_eq!(post.meta.tags, vec!["x", "x"]);
    assert!(!post.meta.pinned);
    assert_eq!(post.meta.date, "2025-01-02");
    assert_eq!(post.content, "rewritten\n");
}

#[test]
fn delete_then_get_is_not_found() {
    let (repo, _dir) = repo();
    let address = repo
        .create(&sample("Gone", "notes", &[], false), date("2025-01-02"))
        .unwrap();

    repo.delete(&address.category, &address.slug).unwrap();
    assert!(matches!(
        repo.get(&address.category, &address.slug),
        Err(ContentError::NotFound { .. })
    ));
    assert!(repo.list_all().unwrap().is_empty());
}

#[test]
fn listing_puts_pinned_first_then_newest() {
    let (repo, _dir) = repo();
    repo.create(&sample("A", "n", &[], true), date("2025-01-01")).unwrap();
    repo.create(&sample("B", "n", &[], false), date("2025-06-01")).unwrap();
    repo.create(&sample("C", "n", &[], true), date("2025-03-01")).unwrap();

    let titles: Vec<_> = repo
        .list_all()
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
}

#[test]
fn category_view_includes_descendants_but_not_siblings_with_prefix() {
    let (repo, _dir) = repo();
    let today = date("2025-02-02");
    repo.create(&sample("In X", "x", &[], false), today).unwrap();
    repo.create(&sample("In XY nested", "x/y", &[], false), today).unwrap();
    repo.create(&sample("In XY flat", "xy", &[], false), today).unwrap();

    let mut titles: Vec<_> = query::by_category(&repo.list_all().unwrap(), "x")
        .into_iter()
        .map(|p| p.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["In X", "In XY nested"]);
}

#[test]
fn url_encoded_addresses_are_accepted() {
    let (repo, _dir) = repo();
    let address = repo
        .create(&sample("Encoded", "회화 MASTER", &[], false), date("2025-11-28"))
        .unwrap();

    let post = repo
        .get("%ED%9A%8C%ED%99%94%20MASTER", &address.slug)
        .unwrap();
    assert_eq!(post.meta.title, "Encoded");
}

#[test]
fn created_file_round_trips_through_the_serializer() {
    let (repo, dir) = repo();
    let address = repo
        .create(&sample("Hello, World! 테스트", "misc", &["a"], false), date("2025-11-28"))
        .unwrap();
    assert_eq!(address.slug, "2025-11-28-Hello-World-테스트");

    let path = dir
        .path()
        .join("blog")
        .join("misc")
        .join("2025-11-28-Hello-World-테스트.md");
    let raw = fs::read_to_string(path).unwrap();
    let (fm, body) = FrontMatter::parse(&raw);
    assert_eq!(fm.render(body), raw);
}

#[test]
fn empty_categories_are_discoverable() {
    let (repo, dir) = repo();
    fs::create_dir_all(dir.path().join("blog").join("drafts").join("later")).unwrap();
    repo.create(&sample("Only", "notes", &[], false), date("2025-01-01")).unwrap();

    let categories = repo.list_categories().unwrap();
    assert_eq!(categories, vec!["drafts", "drafts/later", "notes"]);
}

#[test]
fn tag_frequency_counts_in_first_seen_order() {
    let (repo, _dir) = repo();
    repo.create(&sample("Newer", "n", &["b", "a"], false), date("2025-02-01")).unwrap();
    repo.create(&sample("Older", "n", &["a"], false), date("2025-01-01")).unwrap();

    let freq = query::tag_frequency(&repo.list_all().unwrap());
    let entries: Vec<_> = freq.into_iter().collect();
    assert_eq!(entries, vec![("b".to_string(), 1), ("a".to_string(), 2)]);
    assert_eq!(query::by_tag(&repo.list_all().unwrap(), "a").len(), 2);
}
