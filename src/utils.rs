use indexmap::IndexMap;
use serde::{
    de::{DeserializeOwned, MapAccess, Visitor},
    ser::SerializeMap,
    Deserializer, Serialize, Serializer,
};
use sha2::{Digest, Sha256};
use std::{
    fmt::{self, Formatter},
    hash::Hash,
    marker::PhantomData,
};

pub(crate) fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(Sha256::digest(data).as_slice());
    out
}

pub(crate) fn serialize_indexmap<K: Serialize, V: Serialize, S: Serializer>(
    map: &IndexMap<K, V>,
    s: S,
) -> Result<S::Ok, S::Error> {
    let mut i = s.serialize_map(Some(map.len()))?;
    for (k, v) in map {
        i.serialize_entry(k, v)?;
    }
    i.end()
}

pub(crate) fn deserialize_indexmap<
    'de,
    K: Eq + Hash + DeserializeOwned,
    V: DeserializeOwned,
    D: Deserializer<'de>,
>(
    d: D,
) -> Result<IndexMap<K, V>, D::Error> {
    struct IndexMapVisitor<KK: Eq + Hash + DeserializeOwned, VV: DeserializeOwned> {
        _key_marker: PhantomData<KK>,
        _value_marker: PhantomData<VV>,
    }

    impl<'de, KK: Eq + Hash + DeserializeOwned, VV: DeserializeOwned> Visitor<'de>
        for IndexMapVisitor<KK, VV>
    {
        type Value = IndexMap<KK, VV>;

        fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
            write!(formatter, "a map")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut m = IndexMap::new();
            while let Some((k, v)) = map.next_entry()? {
                m.insert(k, v);
            }
            Ok(m)
        }
    }

    d.deserialize_map(IndexMapVisitor::<K, V> {
        _key_marker: PhantomData,
        _value_marker: PhantomData,
    })
}
