//! Purpose: Read-only user directory and per-user post lookup.
//! Exports: `UserDirectory`.
//! Role: Users cannot be written; this type exposes reads only.
//! Invariants: `posts_by` filters the full post collection client-side.
#![allow(clippy::result_large_err)]

use super::remote::ResourceService;
use crate::core::error::Error;
use crate::core::record::{Post, User};

pub struct UserDirectory<S> {
    remote: S,
}

impl<S: ResourceService> UserDirectory<S> {
    pub fn new(remote: S) -> Self {
        Self { remote }
    }

    pub fn list(&self) -> Result<Vec<User>, Error> {
        self.remote.list::<User>()
    }

    pub fn get(&self, id: u64) -> Result<User, Error> {
        self.remote.get::<User>(id)
    }

    pub fn posts_by(&self, user_id: u64) -> Result<Vec<Post>, Error> {
        let posts = self.remote.list::<Post>()?;
        Ok(posts.into_iter().filter(|post| post.user_id == user_id).collect())
    }
}
