use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, error, warn};

use crate::{
    Fragment, FragmentError, FragmentId, FragmentListing, FragmentResult, MetadataStore,
    StorageConfig,
};

/// Metadata store backed by a DynamoDB table.
///
/// The table is keyed by `ownerId` (partition) + `id` (sort); each item
/// carries the full metadata record. Timestamps are stored as RFC 3339
/// strings so range queries sort chronologically.
pub struct DynamoMetadataStore {
    client: Client,
    table: String,
}

impl DynamoMetadataStore {
    pub async fn new(config: &StorageConfig) -> FragmentResult<Self> {
        let table = config.require_dynamo_table()?.to_string();
        let shared = config.sdk_config().await?;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
        if let Some(endpoint) = &config.dynamo_endpoint {
            debug!(%endpoint, "using alternate DynamoDB endpoint");
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            table,
        })
    }

    fn item_from_fragment(fragment: &Fragment) -> HashMap<String, AttributeValue> {
        let timestamp =
            |value: &DateTime<Utc>| value.to_rfc3339_opts(SecondsFormat::Millis, true);

        HashMap::from([
            ("id".to_string(), AttributeValue::S(fragment.id.to_string())),
            (
                "ownerId".to_string(),
                AttributeValue::S(fragment.owner_id.clone()),
            ),
            (
                "type".to_string(),
                AttributeValue::S(fragment.content_type.clone()),
            ),
            (
                "size".to_string(),
                AttributeValue::N(fragment.size.to_string()),
            ),
            (
                "created".to_string(),
                AttributeValue::S(timestamp(&fragment.created)),
            ),
            (
                "updated".to_string(),
                AttributeValue::S(timestamp(&fragment.updated)),
            ),
        ])
    }

    fn fragment_from_item(item: &HashMap<String, AttributeValue>) -> FragmentResult<Fragment> {
        fn string_attr<'a>(
            item: &'a HashMap<String, AttributeValue>,
            name: &str,
        ) -> FragmentResult<&'a str> {
            item.get(name)
                .and_then(|value| value.as_s().ok())
                .map(String::as_str)
                .ok_or_else(|| {
                    FragmentError::validation(format!("stored fragment is missing {name}"))
                })
        }

        fn timestamp_attr(
            item: &HashMap<String, AttributeValue>,
            name: &str,
        ) -> FragmentResult<DateTime<Utc>> {
            let raw = string_attr(item, name)?;
            DateTime::parse_from_rfc3339(raw)
                .map(|value| value.with_timezone(&Utc))
                .map_err(|err| {
                    FragmentError::validation(format!("stored fragment has a bad {name}: {err}"))
                })
        }

        let size = item
            .get("size")
            .and_then(|value| value.as_n().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or_else(|| FragmentError::validation("stored fragment has a bad size"))?;

        Ok(Fragment {
            id: FragmentId::from_string(string_attr(item, "id")?.to_string()),
            owner_id: string_attr(item, "ownerId")?.to_string(),
            content_type: string_attr(item, "type")?.to_string(),
            size,
            created: timestamp_attr(item, "created")?,
            updated: timestamp_attr(item, "updated")?,
        })
    }
}

#[async_trait]
impl MetadataStore for DynamoMetadataStore {
    async fn put(&self, fragment: &Fragment) -> FragmentResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(Self::item_from_fragment(fragment)))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, id = %fragment.id, "error writing fragment to DynamoDB");
                FragmentError::storage(err)
            })?;
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> FragmentResult<Option<Fragment>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("ownerId", AttributeValue::S(owner_id.to_string()))
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, owner_id, id, "error reading fragment from DynamoDB");
                FragmentError::storage(err)
            })?;

        output
            .item()
            .map(Self::fragment_from_item)
            .transpose()
    }

    async fn list(&self, owner_id: &str, expand: bool) -> FragmentResult<FragmentListing> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("ownerId = :ownerId")
            .expression_attribute_values(":ownerId", AttributeValue::S(owner_id.to_string()));

        // project down to ids unless the caller wants full records
        if !expand {
            request = request.projection_expression("id");
        }

        let output = request.send().await.map_err(|err| {
            error!(error = %err, owner_id, "error listing fragments from DynamoDB");
            FragmentError::storage(err)
        })?;

        let items = output.items();
        Ok(if expand {
            FragmentListing::Full(
                items
                    .iter()
                    .map(Self::fragment_from_item)
                    .collect::<FragmentResult<Vec<_>>>()?,
            )
        } else {
            FragmentListing::Ids(
                items
                    .iter()
                    .map(|item| {
                        item.get("id")
                            .and_then(|value| value.as_s().ok())
                            .cloned()
                            .ok_or_else(|| {
                                FragmentError::validation("stored fragment is missing id")
                            })
                    })
                    .collect::<FragmentResult<Vec<_>>>()?,
            )
        })
    }

    async fn delete(&self, owner_id: &str, id: &str) -> FragmentResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("ownerId", AttributeValue::S(owner_id.to_string()))
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, owner_id, id, "error deleting fragment from DynamoDB");
                FragmentError::storage(err)
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_round_trip() {
        let fragment = Fragment::new("userA", "text/markdown; charset=utf-8").unwrap();
        let item = DynamoMetadataStore::item_from_fragment(&fragment);

        let restored = DynamoMetadataStore::fragment_from_item(&item).unwrap();
        assert_eq!(restored.id, fragment.id);
        assert_eq!(restored.owner_id, fragment.owner_id);
        assert_eq!(restored.content_type, fragment.content_type);
        assert_eq!(restored.size, fragment.size);
        // millisecond precision survives the string encoding
        assert_eq!(
            restored.created.timestamp_millis(),
            fragment.created.timestamp_millis()
        );
    }

    #[test]
    fn test_malformed_item_is_rejected() {
        let fragment = Fragment::new("userA", "text/plain").unwrap();
        let mut item = DynamoMetadataStore::item_from_fragment(&fragment);
        item.remove("created");
        assert!(DynamoMetadataStore::fragment_from_item(&item).is_err());

        let mut item = DynamoMetadataStore::item_from_fragment(&fragment);
        item.insert("size".to_string(), AttributeValue::S("oops".to_string()));
        assert!(DynamoMetadataStore::fragment_from_item(&item).is_err());
    }
}
