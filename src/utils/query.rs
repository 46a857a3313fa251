use serde::{
    de::{self, value, DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer,
};

/// Treats a missing or empty query parameter as "no constraint".
///
/// Filter forms submit `?mode=&source=` for untouched fields, so empty
/// strings must not fail parsing of typed values.
pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let inner: value::StrDeserializer<'_, value::Error> = s.into_deserializer();
            T::deserialize(inner).map(Some).map_err(de::Error::custom)
        }
    }
}
