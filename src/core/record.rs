//! Purpose: Define the resource records served by the remote API and their write payloads.
//! Exports: `Resource`, `Record`, `Writable`, `Post`, `Todo`, `User` (+ drafts/patches).
//! Role: Typed boundary between JSON wire bodies and the synchronizer.
//! Invariants: Identity is by `id`; JSON field names follow the remote (camelCase).
//! Invariants: Only `Writable` records can be created, patched, or deleted.
#![allow(clippy::result_large_err)]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{Error, FieldIssue};
use super::validate::Validate;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Resource {
    Posts,
    Users,
    Todos,
}

impl Resource {
    /// URL path segment on the remote service.
    pub fn segment(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Users => "users",
            Resource::Todos => "todos",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Posts => "post",
            Resource::Users => "user",
            Resource::Todos => "todo",
        }
    }
}

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const RESOURCE: Resource;

    fn id(&self) -> u64;
}

pub trait Writable: Record {
    type Draft: Serialize + Validate + Send + Sync;
    type Patch: Serialize + Send + Sync;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl Post {
    /// The draft this post would become after `patch`, for re-validation before an edit.
    pub fn patched(&self, patch: &PostPatch) -> Result<PostDraft, Error> {
        let user_id = match patch.user_id {
            Some(user_id) => user_id,
            None => i64::try_from(self.user_id).map_err(|_| {
                Error::validation(vec![FieldIssue::new("userId", "User ID is out of range")])
            })?,
        };
        Ok(PostDraft {
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            body: patch.body.clone().unwrap_or_else(|| self.body.clone()),
            user_id,
        })
    }
}

impl Record for Post {
    const RESOURCE: Resource = Resource::Posts;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Writable for Post {
    type Draft = PostDraft;
    type Patch = PostPatch;
}

/// Create payload for a post. `user_id` is signed so non-positive input reaches validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub user_id: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.user_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

impl Record for Todo {
    const RESOURCE: Resource = Resource::Todos;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Writable for Todo {
    type Draft = TodoDraft;
    type Patch = TodoPatch;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    pub title: String,
    pub user_id: i64,
    pub completed: bool,
}

impl TodoDraft {
    /// New todos always start active.
    pub fn new(title: impl Into<String>, user_id: i64) -> Self {
        Self {
            title: title.into(),
            user_id,
            completed: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub company: Company,
}

impl Record for User {
    const RESOURCE: Resource = Resource::Users;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    #[serde(default)]
    pub geo: Geo,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

#[cfg(test)]
mod tests {
    use super::{Post, PostDraft, PostPatch, TodoDraft, TodoPatch, User};
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn post_uses_remote_field_names() {
        let post: Post = serde_json::from_value(json!({
            "userId": 1,
            "id": 1,
            "title": "Hello World",
            "body": "first post body"
        }))
        .expect("post");
        assert_eq!(post.user_id, 1);
        assert_eq!(
            serde_json::to_value(&post).expect("encode"),
            json!({"id": 1, "userId": 1, "title": "Hello World", "body": "first post body"})
        );
    }

    #[test]
    fn drafts_never_carry_an_id() {
        let draft = PostDraft {
            title: "New Post Title".to_string(),
            body: "1234567890".to_string(),
            user_id: 2,
        };
        let value = serde_json::to_value(&draft).expect("encode");
        assert!(value.get("id").is_none());
        assert_eq!(value["userId"], 2);

        let todo = serde_json::to_value(TodoDraft::new("water plants", 3)).expect("encode");
        assert_eq!(todo, json!({"title": "water plants", "userId": 3, "completed": false}));
    }

    #[test]
    fn patches_serialize_only_present_fields() {
        let patch = PostPatch {
            title: Some("Renamed title".to_string()),
            ..PostPatch::default()
        };
        assert_eq!(
            serde_json::to_value(&patch).expect("encode"),
            json!({"title": "Renamed title"})
        );
        assert_eq!(
            serde_json::to_value(TodoPatch::completed(true)).expect("encode"),
            json!({"completed": true})
        );
    }

    #[test]
    fn patched_falls_back_to_current_values() {
        let post = Post {
            id: 4,
            user_id: 9,
            title: "Original title".to_string(),
            body: "original body text".to_string(),
        };
        let draft = post
            .patched(&PostPatch {
                body: Some("replacement body".to_string()),
                ..PostPatch::default()
            })
            .expect("patched");
        assert_eq!(draft.title, "Original title");
        assert_eq!(draft.body, "replacement body");
        assert_eq!(draft.user_id, 9);
    }

    #[test]
    fn oversized_user_id_is_a_field_issue() {
        let post = Post {
            id: 4,
            user_id: u64::MAX,
            title: "Original title".to_string(),
            body: "original body text".to_string(),
        };
        let err = post
            .patched(&PostPatch {
                title: Some("Renamed title".to_string()),
                ..PostPatch::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.issues()[0].field, "userId");

        let reassigned = post
            .patched(&PostPatch {
                user_id: Some(3),
                ..PostPatch::default()
            })
            .expect("explicit user id");
        assert_eq!(reassigned.user_id, 3);
    }

    #[test]
    fn user_tolerates_missing_nested_sections() {
        let user: User = serde_json::from_value(json!({
            "id": 3,
            "name": "Clementine Bauch",
            "username": "Samantha",
            "email": "Nathan@yesenia.net"
        }))
        .expect("user");
        assert_eq!(user.company.name, "");
        assert_eq!(user.address.city, "");
    }
}
