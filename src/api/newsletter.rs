/// Newsletter subscribers (`/newsletter`)
use crate::{
    api::{client::StatusBody, ListApi, RemoveApi, RestClient, StatusApi},
    error::AdminResult,
    models::{Subscriber, SubscriptionStatus},
};
use async_trait::async_trait;
use reqwest::Method;

#[derive(Clone)]
pub struct NewsletterList {
    client: RestClient,
}

impl NewsletterList {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListApi for NewsletterList {
    type Record = Subscriber;

    async fn list_all(&self) -> AdminResult<Vec<Subscriber>> {
        self.client.get("/newsletter").await
    }
}

#[async_trait]
impl RemoveApi for NewsletterList {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        self.client
            .send_unit::<()>(Method::DELETE, &format!("/newsletter/{}", id), None)
            .await
    }
}

#[async_trait]
impl StatusApi for NewsletterList {
    type Status = SubscriptionStatus;

    async fn set_status(&self, id: &i64, status: SubscriptionStatus) -> AdminResult<()> {
        self.client
            .send_unit(
                Method::PATCH,
                &format!("/newsletter/{}/status", id),
                Some(&StatusBody { status }),
            )
            .await
    }
}
