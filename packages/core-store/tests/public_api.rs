use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fscache_core_store::{key, CacheProvider, Error, Format, Key, KeyError, Lookup};

/// A provider that keeps blobs in a map, written against the public API only.
#[derive(Default)]
struct BlobMap {
    format: Format,
    blobs: BTreeMap<Key, Vec<u8>>,
}

impl CacheProvider for BlobMap {
    fn format(&self) -> Format {
        self.format
    }

    fn lookup<T: serde::de::DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error> {
        match self.blobs.get(key) {
            Some(bytes) => self
                .format
                .decode(bytes)
                .map(Lookup::Found)
                .map_err(|err| Error::decode(key, self.format, err)),
            None => Ok(Lookup::Absent),
        }
    }

    fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error> {
        let bytes = self
            .format
            .encode(value)
            .map_err(|err| Error::encode(key, self.format, err))?;
        self.blobs.insert(key.clone(), bytes);
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        Ok(self.blobs.remove(key).is_some())
    }

    fn contains(&self, key: &Key) -> Result<bool, Error> {
        Ok(self.blobs.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<Key>, Error> {
        Ok(self.blobs.keys().cloned().collect())
    }

    fn size(&self) -> Result<u64, Error> {
        Ok(self.blobs.values().map(|b| b.len() as u64).sum())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Settings {
    theme: String,
    page_size: u32,
}

#[test]
fn test_key_parsing_from_user_input() {
    let key: Key = "accounts.work.imap".parse().unwrap();
    assert_eq!(key.len(), 3);
    assert_eq!(key.parents(), ["accounts", "work"]);
    assert_eq!(key.leaf(), "imap");
    assert_eq!(key.to_string(), "accounts.work.imap");

    let err = "accounts..imap".parse::<Key>().unwrap_err();
    assert!(matches!(err, KeyError::InvalidSegment { position: 1, .. }));

    // Key errors convert into the store error.
    let err: Error = err.into();
    assert!(matches!(err, Error::Key(_)));
}

#[test]
fn test_keys_embedded_in_config() {
    #[derive(Deserialize)]
    struct Pins {
        pinned: Vec<Key>,
    }

    let pins: Pins = serde_json::from_str(r#"{"pinned": ["inbox.1", "drafts"]}"#).unwrap();
    assert_eq!(pins.pinned, vec![key!("inbox.1"), key!("drafts")]);

    let bad = serde_json::from_str::<Pins>(r#"{"pinned": ["a/b"]}"#);
    assert!(bad.is_err());
}

#[test]
fn test_format_names_round_trip() {
    for format in Format::ALL {
        assert_eq!(format.name().parse::<Format>().unwrap(), format);
    }
    assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
    assert!("yaml".parse::<Format>().is_err());
}

#[test]
fn test_generic_code_over_any_provider() {
    fn load_settings(cache: &impl CacheProvider) -> Result<Settings, Error> {
        cache.get_or(
            &key!("ui.settings"),
            Settings {
                theme: "light".to_string(),
                page_size: 50,
            },
        )
    }

    for format in Format::ALL {
        let mut cache = BlobMap {
            format,
            ..BlobMap::default()
        };
        assert_eq!(load_settings(&cache).unwrap().theme, "light");

        let dark = Settings {
            theme: "dark".to_string(),
            page_size: 25,
        };
        cache.put(&key!("ui.settings"), &dark).unwrap();
        assert_eq!(load_settings(&cache).unwrap(), dark);
        assert_eq!(cache.len().unwrap(), 1);
    }
}

#[test]
fn test_decode_failure_is_not_absence() {
    let mut cache = BlobMap::default();
    cache.blobs.insert(key!("ui.settings"), b"[1, 2".to_vec());

    let err = cache.lookup::<Settings>(&key!("ui.settings")).unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("ui.settings"));
    assert!(cache.contains(&key!("ui.settings")).unwrap());
}
