//! REST resources administered by the client

use async_trait::async_trait;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::client::ApiClient;
use super::envelope::{self, Page};
use crate::crud::FilterSet;
use crate::error::Result;

/// The collections the admin console manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceKind {
    Providers,
    Jobs,
    Blogs,
    Bookings,
    Contracts,
    Vessels,
    Customers,
    Enquiries,
    #[value(name = "newsletter")]
    NewsletterSubscribers,
    #[value(name = "email-templates")]
    EmailTemplates,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Providers,
        ResourceKind::Jobs,
        ResourceKind::Blogs,
        ResourceKind::Bookings,
        ResourceKind::Contracts,
        ResourceKind::Vessels,
        ResourceKind::Customers,
        ResourceKind::Enquiries,
        ResourceKind::NewsletterSubscribers,
        ResourceKind::EmailTemplates,
    ];

    /// REST collection path
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Providers => "/providers",
            ResourceKind::Jobs => "/jobs",
            ResourceKind::Blogs => "/blogs",
            ResourceKind::Bookings => "/bookings",
            ResourceKind::Contracts => "/contracts",
            ResourceKind::Vessels => "/vessels",
            ResourceKind::Customers => "/customers",
            ResourceKind::Enquiries => "/enquiries",
            ResourceKind::NewsletterSubscribers => "/newsletter/subscribers",
            ResourceKind::EmailTemplates => "/email-templates",
        }
    }

    /// Singular label for notifications, e.g. "Provider created"
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Providers => "Provider",
            ResourceKind::Jobs => "Job",
            ResourceKind::Blogs => "Blog",
            ResourceKind::Bookings => "Booking",
            ResourceKind::Contracts => "Contract",
            ResourceKind::Vessels => "Vessel",
            ResourceKind::Customers => "Customer",
            ResourceKind::Enquiries => "Enquiry",
            ResourceKind::NewsletterSubscribers => "Subscriber",
            ResourceKind::EmailTemplates => "Email template",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().trim_start_matches('/'))
    }
}

/// List/detail/mutation endpoints for one collection
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Human label used in notifications
    fn label(&self) -> &str;

    /// Collection path, used when an error carries no URL of its own
    fn path(&self) -> &str;

    async fn list(&self, filters: &FilterSet) -> Result<Page<Self::Item>>;
    async fn get(&self, id: &str) -> Result<Self::Item>;
    async fn create(&self, data: Value) -> Result<Self::Item>;
    async fn update(&self, id: &str, data: Value) -> Result<Self::Item>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// `Resource` over the shared `ApiClient`
pub struct RestResource<T> {
    client: Arc<ApiClient>,
    kind: ResourceKind,
    _item: PhantomData<fn() -> T>,
}

impl<T> RestResource<T> {
    pub fn new(client: Arc<ApiClient>, kind: ResourceKind) -> Self {
        Self {
            client,
            kind,
            _item: PhantomData,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.kind.path(), id)
    }
}

#[async_trait]
impl<T> Resource for RestResource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Item = T;

    fn label(&self) -> &str {
        self.kind.label()
    }

    fn path(&self) -> &str {
        self.kind.path()
    }

    async fn list(&self, filters: &FilterSet) -> Result<Page<T>> {
        let query = filters.to_query();
        let url = self.client.url_for(self.kind.path(), &query)?;
        let body = self.client.get(self.kind.path(), &query).await?;
        Ok(envelope::decode_page(body, url.as_str())?)
    }

    async fn get(&self, id: &str) -> Result<T> {
        let path = self.item_path(id);
        let body = self.client.get(&path, &[]).await?;
        Ok(envelope::decode_item(body, &path)?)
    }

    async fn create(&self, data: Value) -> Result<T> {
        let body = self.client.post(self.kind.path(), data).await?;
        Ok(envelope::decode_item(body, self.kind.path())?)
    }

    async fn update(&self, id: &str, data: Value) -> Result<T> {
        let path = self.item_path(id);
        let body = self.client.put(&path, data).await?;
        Ok(envelope::decode_item(body, &path)?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let path = self.item_path(id);
        let body = self.client.delete(&path).await?;
        envelope::unwrap_data(body, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<_> = ResourceKind::ALL.iter().map(|k| k.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn test_cli_names() {
        assert_eq!(
            ResourceKind::from_str("email-templates", true).unwrap(),
            ResourceKind::EmailTemplates
        );
        assert_eq!(
            ResourceKind::from_str("newsletter", true).unwrap(),
            ResourceKind::NewsletterSubscribers
        );
        assert_eq!(ResourceKind::NewsletterSubscribers.to_string(), "newsletter/subscribers");
    }
}
