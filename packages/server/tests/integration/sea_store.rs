use std::collections::BTreeSet;

use chrono::{Duration, Utc};
use common::{Locale, LocalizedContent, PostStatus, Revision, SeoMeta, Visibility};

use server::store::{ContentStore, NewCategory, NewPost, PostFilter, StoreError};

use crate::common::sea_store;

fn new_category(slug: &str) -> NewCategory {
    NewCategory {
        slug: slug.into(),
        name: [(Locale::Fa, "دسته".to_string()), (Locale::De, "Kategorie".to_string())]
            .into_iter()
            .collect(),
        description: None,
        parent_id: None,
        sort_order: 0.0,
        is_active: true,
        visibility: Visibility::Public,
        created_at: Utc::now(),
    }
}

fn new_post(slug: &str, categories: &[i32]) -> NewPost {
    let content = Locale::ALL
        .iter()
        .map(|&locale| {
            (
                locale,
                LocalizedContent {
                    title: format!("{slug} ({locale})"),
                    summary: "summary".into(),
                    body: "<p>body</p>".into(),
                },
            )
        })
        .collect();
    NewPost {
        slug: slug.into(),
        content,
        seo: SeoMeta::default(),
        category_ids: categories.iter().copied().collect::<BTreeSet<_>>(),
        featured_image: None,
        status: PostStatus::Draft,
        publish_date: None,
        scheduled_publish_date: None,
        created_by: "editor".into(),
        created_at: Utc::now(),
    }
}

mod sea_posts {
    use super::*;

    #[tokio::test]
    async fn soft_deleted_posts_are_hidden() {
        let store = sea_store().await;
        let kept = store.insert_post(new_post("kept", &[])).await.unwrap();
        let gone = store.insert_post(new_post("gone", &[])).await.unwrap();

        assert!(store.soft_delete_post(gone.id, "editor", Utc::now()).await.unwrap());
        assert!(!store.soft_delete_post(gone.id, "editor", Utc::now()).await.unwrap());

        assert!(store.get_post(gone.id).await.unwrap().is_none());
        assert!(store.find_post_by_slug("gone").await.unwrap().is_none());
        let page = store.list_posts(&PostFilter::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, kept.id);
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let store = sea_store().await;
        store.insert_post(new_post("same", &[])).await.unwrap();

        let err = store.insert_post(new_post("same", &[])).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

        store.insert_category(new_category("news")).await.unwrap();
        let err = store.insert_category(new_category("news")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");
    }

    #[tokio::test]
    async fn stale_copy_cannot_revive_deleted_post() {
        let store = sea_store().await;
        let post = store.insert_post(new_post("stale", &[])).await.unwrap();
        let mut stale = post.clone();
        store.soft_delete_post(post.id, "editor", Utc::now()).await.unwrap();

        stale.slug = "revived".into();
        assert!(store.update_post(&stale).await.unwrap().is_none());
        assert!(store.get_post(post.id).await.unwrap().is_none());
        assert!(store.find_post_by_slug("revived").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_stored_view_count() {
        let store = sea_store().await;
        let news = store.insert_category(new_category("news")).await.unwrap();
        let post = store.insert_post(new_post("read", &[])).await.unwrap();
        store.increment_view_count(post.id).await.unwrap();
        store.increment_view_count(post.id).await.unwrap();

        let mut edited = post.clone();
        edited.featured_image = Some("/uploads/cover.webp".into());
        edited.category_ids.insert(news.id);
        let saved = store.update_post(&edited).await.unwrap().unwrap();
        assert_eq!(saved.view_count, 2);
        assert!(!saved.is_deleted);
        assert_eq!(saved.featured_image.as_deref(), Some("/uploads/cover.webp"));
        assert_eq!(saved.category_ids, BTreeSet::from([news.id]));
        assert_eq!(store.get_post(post.id).await.unwrap().unwrap().view_count, 2);
    }

    #[tokio::test]
    async fn scheduled_sweep_touches_only_due_drafts() {
        let store = sea_store().await;
        let now = Utc::now();

        let mut due = new_post("due", &[]);
        due.scheduled_publish_date = Some(now - Duration::minutes(5));
        let due = store.insert_post(due).await.unwrap();

        let mut later = new_post("later", &[]);
        later.scheduled_publish_date = Some(now + Duration::hours(1));
        let later = store.insert_post(later).await.unwrap();

        let mut deleted = new_post("deleted", &[]);
        deleted.scheduled_publish_date = Some(now - Duration::minutes(5));
        let deleted = store.insert_post(deleted).await.unwrap();
        store.soft_delete_post(deleted.id, "editor", now).await.unwrap();

        assert_eq!(store.publish_due_scheduled(now, "system:scheduler").await.unwrap(), 1);
        assert_eq!(store.publish_due_scheduled(now, "system:scheduler").await.unwrap(), 0);

        let published = store.get_post(due.id).await.unwrap().unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert!(published.publish_date.is_some());
        assert_eq!(published.scheduled_publish_date, None);
        assert_eq!(published.updated_by, "system:scheduler");

        let waiting = store.get_post(later.id).await.unwrap().unwrap();
        assert_eq!(waiting.status, PostStatus::Draft);
    }
}

mod sea_categories {
    use super::*;

    #[tokio::test]
    async fn post_count_ignores_deleted_posts() {
        let store = sea_store().await;
        let news = store.insert_category(new_category("news")).await.unwrap();
        let a = store.insert_post(new_post("a", &[news.id])).await.unwrap();
        store.insert_post(new_post("b", &[news.id])).await.unwrap();
        assert_eq!(store.count_posts_in_category(news.id).await.unwrap(), 2);

        store.soft_delete_post(a.id, "editor", Utc::now()).await.unwrap();
        assert_eq!(store.count_posts_in_category(news.id).await.unwrap(), 1);
    }
}

mod sea_revisions {
    use super::*;

    #[tokio::test]
    async fn history_keeps_ten_newest() {
        let store = sea_store().await;
        let post = store.insert_post(new_post("busy", &[])).await.unwrap();
        let start = Utc::now();

        let mut pruned = 0;
        for i in 0..15 {
            let revision = Revision::snapshot(
                &post,
                &format!("editor-{i}"),
                start + Duration::seconds(i),
            );
            pruned += store.append_revision(post.id, revision, 10).await.unwrap();
        }
        assert_eq!(pruned, 5);

        let revisions = store.list_revisions(post.id).await.unwrap();
        let authors: Vec<&str> = revisions.iter().map(|r| r.modified_by.as_str()).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("editor-{i}")).collect();
        assert_eq!(authors, expected);
    }
}
