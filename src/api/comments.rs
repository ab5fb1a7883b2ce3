/// Blog comments (`/comments`)
use crate::{
    api::{ListApi, RemoveApi, RestClient},
    error::AdminResult,
    models::Comment,
};
use async_trait::async_trait;
use reqwest::Method;

#[derive(Clone)]
pub struct CommentBoard {
    client: RestClient,
}

impl CommentBoard {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListApi for CommentBoard {
    type Record = Comment;

    async fn list_all(&self) -> AdminResult<Vec<Comment>> {
        self.client.get("/comments").await
    }
}

#[async_trait]
impl RemoveApi for CommentBoard {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        self.client
            .send_unit::<()>(Method::DELETE, &format!("/comments/{}", id), None)
            .await
    }
}
