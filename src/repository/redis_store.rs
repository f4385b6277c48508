use async_trait::async_trait;
use redis::Script;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::{debug, instrument};

use crate::repository::record::{Record, RecordStore, UpsertOutcome};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::redis::RedisService;

const INSERT_IF_ABSENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 1 then
    return 0
end
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

const REPLACE_IF_PRESENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], unpack(ARGV))
return 1
";

const UPSERT: &str = r"
local existed = redis.call('EXISTS', KEYS[1])
redis.call('DEL', KEYS[1])
redis.call('HSET', KEYS[1], unpack(ARGV))
return existed
";

const PATCH_IF_PRESENT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return {}
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
return redis.call('HGETALL', KEYS[1])
";

const TAKE: &str = r"
local fields = redis.call('HGETALL', KEYS[1])
if #fields > 0 then
    redis.call('DEL', KEYS[1])
end
return fields
";

/// One hash per record under `<kind>:<key>`, each field holding a JSON value
pub struct RedisStore<T: Record> {
    redis: RedisService,
    insert_script: Script,
    replace_script: Script,
    upsert_script: Script,
    patch_script: Script,
    take_script: Script,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Record> RedisStore<T> {
    pub fn new(redis: RedisService) -> Self {
        RedisStore {
            redis,
            insert_script: Script::new(INSERT_IF_ABSENT),
            replace_script: Script::new(REPLACE_IF_PRESENT),
            upsert_script: Script::new(UPSERT),
            patch_script: Script::new(PATCH_IF_PRESENT),
            take_script: Script::new(TAKE),
            _marker: PhantomData,
        }
    }

    fn hash_key(key: &str) -> String {
        format!("{}:{}", T::KIND, key)
    }

    async fn write(&self, script: &Script, record: &T) -> RepositoryResult<i64> {
        let key = Self::hash_key(&record.key());
        let args = encode_fields(record)?;
        Ok(self.redis.eval(script, &[key], &args).await?)
    }
}

/// Flattens a record into `field, json, field, json, ...`
pub(crate) fn encode_fields<T: Record>(record: &T) -> RepositoryResult<Vec<String>> {
    match serde_json::to_value(record)? {
        Value::Object(object) => Ok(object
            .into_iter()
            .flat_map(|(field, value)| [field, value.to_string()])
            .collect()),
        _ => Err(RepositoryError::serialization(format!("{} does not serialize to an object", T::KIND))),
    }
}

pub(crate) fn decode_fields<T: Record>(fields: HashMap<String, String>) -> RepositoryResult<T> {
    let mut object = Map::new();
    for (field, raw) in fields {
        object.insert(field, serde_json::from_str(&raw)?);
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// HGETALL as returned from a script: a flat list of alternating fields and values
fn pairs(flat: Vec<String>) -> HashMap<String, String> {
    let mut iter = flat.into_iter();
    let mut map = HashMap::new();
    while let (Some(field), Some(value)) = (iter.next(), iter.next()) {
        map.insert(field, value);
    }
    map
}

#[async_trait]
impl<T: Record> RecordStore<T> for RedisStore<T> {
    async fn find(&self, key: &str) -> RepositoryResult<Option<T>> {
        let fields = self.redis.hgetall(&Self::hash_key(key)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        decode_fields(fields).map(Some)
    }

    #[instrument(skip(self, record), fields(kind = T::KIND, key = %record.key()))]
    async fn insert(&self, record: T) -> RepositoryResult<T> {
        if self.write(&self.insert_script, &record).await? == 0 {
            return Err(RepositoryError::already_exists(format!(
                "{} {} already exists",
                T::KIND,
                record.key()
            )));
        }
        debug!("Inserted {}", Self::hash_key(&record.key()));
        Ok(record)
    }

    async fn replace(&self, record: T) -> RepositoryResult<bool> {
        Ok(self.write(&self.replace_script, &record).await? == 1)
    }

    async fn upsert(&self, record: T) -> RepositoryResult<UpsertOutcome> {
        match self.write(&self.upsert_script, &record).await? {
            0 => Ok(UpsertOutcome::Created),
            _ => Ok(UpsertOutcome::Replaced),
        }
    }

    async fn patch_field(&self, key: &str, field: &str, value: Value) -> RepositoryResult<Option<T>> {
        let flat: Vec<String> = self
            .redis
            .eval(&self.patch_script, &[Self::hash_key(key)], &[field.to_string(), value.to_string()])
            .await?;
        if flat.is_empty() {
            return Ok(None);
        }
        decode_fields(pairs(flat)).map(Some)
    }

    async fn delete(&self, key: &str) -> RepositoryResult<Option<T>> {
        let flat: Vec<String> = self.redis.eval(&self.take_script, &[Self::hash_key(key)], &[]).await?;
        if flat.is_empty() {
            return Ok(None);
        }
        decode_fields(pairs(flat)).map(Some)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<T>> {
        let mut keys = self.redis.scan_keys(&format!("{}:*", T::KIND)).await?;
        keys.sort();
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let fields = self.redis.hgetall(&key).await?;
            // removed between SCAN and HGETALL
            if fields.is_empty() {
                continue;
            }
            records.push(decode_fields(fields)?);
        }
        Ok(records)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.redis.scan_keys(&format!("{}:*", T::KIND)).await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{demo_catalog, Item, ItemId};
    use crate::model::user::{Role, User};

    #[test]
    fn test_item_fields_roundtrip_through_hash_encoding() {
        let item = demo_catalog().remove(3);
        let flat = encode_fields(&item).unwrap();
        assert!(flat.contains(&"description".to_string()));
        assert!(flat.contains(&"\"Radio AM/FM\"".to_string()));

        let decoded: Item = decode_fields(pairs(flat)).unwrap();
        assert_eq!(decoded, item);
        assert!(matches!(decoded.id, ItemId::Number(103)));
    }

    #[test]
    fn test_text_id_keeps_its_form() {
        let mut item = demo_catalog().remove(0);
        item.id = ItemId::Text("100".to_string());
        let decoded: Item = decode_fields(pairs(encode_fields(&item).unwrap())).unwrap();
        assert!(matches!(decoded.id, ItemId::Text(_)));
    }

    #[test]
    fn test_user_hash_key_uses_email() {
        let user = User {
            id: "abc".to_string(),
            fullname: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$...".to_string(),
            role: Role::Admin,
        };
        assert_eq!(RedisStore::<User>::hash_key(&user.key()), "user:ada@example.com");
    }
}
