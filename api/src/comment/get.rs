use std::collections::{HashMap, HashSet};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    App,
    error::AppError,
    models::{comment::Comment, user::AuthorProfile},
    store::CommentStore,
};

use super::{CommentError, CommentNode, CommentsResponse, Reply, parse_id};

/// How many levels of `replys` get expanded under a top-level comment. The
/// deepest expanded level still gets its author, but its own replies stay as
/// bare ids.
pub const REPLY_RESOLUTION_DEPTH: usize = 2;

const RETRIEVAL_FAILED_MSG: &str = "Error al obtener los comentarios";

pub async fn get_comments(
    State(ctx): State<App>,
    Path(publication_id): Path<String>,
) -> Result<Json<CommentsResponse>, AppError> {
    let publication_id = parse_id(&publication_id).ok_or((
        CommentError::PublicationNotFound.to_string(),
        StatusCode::NOT_FOUND,
    ))?;

    match get_comments_by_publication(ctx.store.as_ref(), publication_id).await {
        Ok(comments) => Ok(Json(CommentsResponse {
            ok: true,
            msg: None,
            comments,
        })),
        Err(CommentError::PublicationNotFound) => Err((
            CommentError::PublicationNotFound.to_string(),
            StatusCode::NOT_FOUND,
        )
            .into()),
        Err(e) => Err(AppError::server(RETRIEVAL_FAILED_MSG, e)),
    }
}

/// Returns the top-level comments of a publication, newest first, each with
/// its replies expanded up to [`REPLY_RESOLUTION_DEPTH`] levels.
pub async fn get_comments_by_publication(
    store: &dyn CommentStore,
    publication_id: i32,
) -> Result<Vec<CommentNode>, CommentError> {
    if store.find_publication(publication_id).await?.is_none() {
        return Err(CommentError::PublicationNotFound);
    }

    let comments = store.comments_by_publication(publication_id).await?;

    let mut records: HashMap<i32, Comment> =
        comments.iter().map(|c| (c.id, c.clone())).collect();

    // walk the reply levels, fetching whatever the flat scan didn't cover
    let mut level: Vec<i32> = comments
        .iter()
        .filter(|c| c.parent_comment_id.is_none())
        .map(|c| c.id)
        .collect();
    let mut rendered: HashSet<i32> = level.iter().copied().collect();

    for _ in 0..REPLY_RESOLUTION_DEPTH {
        let reply_ids: Vec<i32> = level
            .iter()
            .filter_map(|id| records.get(id))
            .flat_map(|c| c.reply_ids.iter().copied())
            .collect();

        let missing: Vec<i32> = reply_ids
            .iter()
            .filter(|id| !records.contains_key(id))
            .copied()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if !missing.is_empty() {
            tracing::debug!(
                publication_id,
                count = missing.len(),
                "Fetching replies stored outside the publication"
            );
            for reply in store.comments_by_ids(&missing).await? {
                records.insert(reply.id, reply);
            }
        }

        rendered.extend(reply_ids.iter().copied());
        level = reply_ids;
    }

    let author_ids: Vec<i32> = rendered
        .iter()
        .filter_map(|id| records.get(id))
        .map(|c| c.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<i32, AuthorProfile> = store
        .author_profiles(&author_ids)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(build_comment_tree(comments, &records, &authors))
}

/// Keeps the top-level comments out of a flat list, expands their replies
/// from `records` and sorts them newest first.
pub fn build_comment_tree(
    comments: Vec<Comment>,
    records: &HashMap<i32, Comment>,
    authors: &HashMap<i32, AuthorProfile>,
) -> Vec<CommentNode> {
    let mut top_level: Vec<CommentNode> = comments
        .iter()
        .filter(|c| c.parent_comment_id.is_none())
        .map(|c| resolve(c, 0, records, authors))
        .collect();

    // stable, so equal timestamps keep their fetch order
    top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    top_level
}

fn resolve(
    comment: &Comment,
    depth: usize,
    records: &HashMap<i32, Comment>,
    authors: &HashMap<i32, AuthorProfile>,
) -> CommentNode {
    let replys = if depth < REPLY_RESOLUTION_DEPTH {
        // dangling ids are dropped
        comment
            .reply_ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(|reply| Reply::Resolved(resolve(reply, depth + 1, records, authors)))
            .collect()
    } else {
        comment
            .reply_ids
            .iter()
            .map(|id| Reply::Unresolved(*id))
            .collect()
    };

    CommentNode {
        id: comment.id,
        text: comment.text.clone(),
        author: authors.get(&comment.author_id).cloned(),
        publication: comment.publication_id,
        parent_comment: comment.parent_comment_id,
        replys,
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{
        store::MemoryStore,
        testing::{app_with, publication, response_json, user},
    };

    fn comment(id: i32, parent: Option<i32>, reply_ids: Vec<i32>, minutes: i64) -> Comment {
        Comment {
            id,
            text: format!("Content for comment {id}"),
            author_id: 1,
            publication_id: 10,
            parent_comment_id: parent,
            reply_ids,
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    fn index(comments: &[Comment]) -> HashMap<i32, Comment> {
        comments.iter().map(|c| (c.id, c.clone())).collect()
    }

    fn authors() -> HashMap<i32, AuthorProfile> {
        HashMap::from([(1, AuthorProfile::from(&user(1)))])
    }

    fn seeded(comments: Vec<Comment>) -> MemoryStore {
        let store = MemoryStore::new();
        store.add_user(user(1)).unwrap();
        store.add_publication(publication(10, 1)).unwrap();
        for c in comments {
            store.put_comment(c).unwrap();
        }
        store
    }

    #[test]
    fn test_build_comment_tree_with_no_comments() {
        let result = build_comment_tree(vec![], &HashMap::new(), &HashMap::new());
        assert!(result.is_empty(), "Expected no comments in the tree");
    }

    #[test]
    fn test_build_comment_tree_sorts_newest_first() {
        let comments = vec![
            comment(1, None, vec![], 1),
            comment(3, None, vec![], 3),
            comment(2, None, vec![], 2),
        ];
        let records = index(&comments);

        let result = build_comment_tree(comments, &records, &authors());

        let ids: Vec<i32> = result.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(result.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_build_comment_tree_only_returns_top_level() {
        let comments = vec![comment(1, None, vec![2], 1), comment(2, Some(1), vec![], 2)];
        let records = index(&comments);

        let result = build_comment_tree(comments, &records, &authors());

        assert_eq!(result.len(), 1);
        assert!(result.iter().all(|c| c.parent_comment.is_none()));
        assert_eq!(result[0].replys.len(), 1);
    }

    #[test]
    fn test_build_comment_tree_stops_after_two_levels() {
        let comments = vec![
            comment(1, None, vec![2], 1),
            comment(2, Some(1), vec![3], 2),
            comment(3, Some(2), vec![4], 3),
            comment(4, Some(3), vec![5], 4),
            comment(5, Some(4), vec![], 5),
        ];
        let records = index(&comments);

        let result = build_comment_tree(comments, &records, &authors());

        let Reply::Resolved(first) = &result[0].replys[0] else {
            panic!("first level reply should be resolved");
        };
        let Reply::Resolved(second) = &first.replys[0] else {
            panic!("second level reply should be resolved");
        };
        assert!(second.author.is_some());
        assert_eq!(second.replys, vec![Reply::Unresolved(4)]);
    }

    #[test]
    fn test_build_comment_tree_drops_dangling_replies_and_missing_authors() {
        let mut orphan_author = comment(1, None, vec![99], 1);
        orphan_author.author_id = 7;
        let comments = vec![orphan_author];
        let records = index(&comments);

        let result = build_comment_tree(comments, &records, &authors());

        assert!(result[0].author.is_none());
        assert!(result[0].replys.is_empty());
    }

    #[tokio::test]
    async fn test_get_comments_by_publication_resolves_reply_authors() {
        let store = seeded(vec![
            comment(1, None, vec![2], 1),
            comment(2, Some(1), vec![], 2),
        ]);

        let result = get_comments_by_publication(&store, 10).await.unwrap();

        assert_eq!(result.len(), 1);
        let Reply::Resolved(reply) = &result[0].replys[0] else {
            panic!("reply should be resolved");
        };
        assert_eq!(reply.id, 2);
        assert_eq!(reply.author.as_ref().map(|a| a.name.as_str()), Some("Name 1"));
    }

    #[tokio::test]
    async fn test_get_comments_by_publication_resolves_second_level_authors() {
        let mut first = comment(2, Some(1), vec![3], 2);
        first.author_id = 2;
        let mut second = comment(3, Some(2), vec![4], 3);
        second.author_id = 3;
        let store = seeded(vec![
            comment(1, None, vec![2], 1),
            first,
            second,
            comment(4, Some(3), vec![], 4),
        ]);
        store.add_user(user(2)).unwrap();
        store.add_user(user(3)).unwrap();

        let result = get_comments_by_publication(&store, 10).await.unwrap();

        assert_eq!(result.len(), 1);
        let Reply::Resolved(first) = &result[0].replys[0] else {
            panic!("first level reply should be resolved");
        };
        assert_eq!(first.author.as_ref().map(|a| a.id), Some(2));
        let Reply::Resolved(second) = &first.replys[0] else {
            panic!("second level reply should be resolved");
        };
        assert_eq!(second.author.as_ref().map(|a| a.id), Some(3));
        assert_eq!(second.replys, vec![Reply::Unresolved(4)]);
    }

    #[tokio::test]
    async fn test_get_comments_by_publication_fetches_replies_from_other_publications() {
        let mut foreign = comment(2, Some(1), vec![], 2);
        foreign.publication_id = 11;
        let store = seeded(vec![comment(1, None, vec![2], 1), foreign]);

        let result = get_comments_by_publication(&store, 10).await.unwrap();

        assert!(matches!(&result[0].replys[0], Reply::Resolved(r) if r.id == 2));
    }

    #[tokio::test]
    async fn test_get_comments_by_publication_empty() {
        let store = seeded(vec![]);
        assert!(get_comments_by_publication(&store, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_comments_by_publication_unknown_publication() {
        let store = seeded(vec![]);
        assert!(matches!(
            get_comments_by_publication(&store, 404).await,
            Err(CommentError::PublicationNotFound)
        ));
    }

    #[tokio::test]
    async fn test_get_comments_handler() {
        let store = Arc::new(seeded(vec![comment(1, None, vec![], 1)]));

        let response = get_comments(State(app_with(store.clone())), Path("10".into())).await;
        let (status, body) = response_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["comments"][0]["_id"], 1);
        assert_eq!(body["comments"][0]["author"]["lastName"], "Last name 1");

        let response = get_comments(State(app_with(store)), Path("11".into())).await;
        let (status, body) = response_json(response).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["msg"], "El ID de la publicación no existe");
    }
}
