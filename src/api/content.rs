/// Site content (`/content`)
use crate::{
    api::{
        client::encode_segment, ContentApi, CreateApi, ListApi, RemoveApi, RestClient,
    },
    error::AdminResult,
    models::{ContentEntry, ContentUpdate, NewContent},
};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct ValueBody<'a> {
    value: &'a str,
}

#[derive(Clone)]
pub struct ContentStore {
    client: RestClient,
}

impl ContentStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListApi for ContentStore {
    type Record = ContentEntry;

    async fn list_all(&self) -> AdminResult<Vec<ContentEntry>> {
        self.client.get("/content").await
    }
}

#[async_trait]
impl CreateApi for ContentStore {
    type Draft = NewContent;

    async fn create(&self, draft: &NewContent) -> AdminResult<()> {
        self.client.send_unit(Method::POST, "/content", Some(draft)).await
    }
}

#[async_trait]
impl RemoveApi for ContentStore {
    async fn remove(&self, key: &String) -> AdminResult<()> {
        self.client
            .send_unit::<()>(Method::DELETE, &format!("/content/{}", encode_segment(key)), None)
            .await
    }
}

#[async_trait]
impl ContentApi for ContentStore {
    async fn update_content(&self, key: &str, update: &ContentUpdate) -> AdminResult<()> {
        update.check_key(key)?;
        let path = format!("/content/{}", encode_segment(key));

        match update {
            ContentUpdate::Text(value) => {
                self.client
                    .send_unit(Method::PUT, &path, Some(&ValueBody { value }))
                    .await
            }
            ContentUpdate::File(upload) => {
                info!("Uploading {} ({} bytes) for {}", upload.file_name, upload.size(), key);
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.mime_type)?;
                let form = Form::new().part("file", part);
                self.client.send_multipart(Method::PUT, &path, form).await
            }
        }
    }
}
