//! The `key=value; key=value` parameter mini-language.

pub mod literal;

pub use literal::{Value, decode};

use crate::error::ParameterError;

/// One `key=value` fragment of a parameter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub key: &'a str,
    /// Raw value text, `None` when the fragment has no `=`.
    pub value: Option<&'a str>,
}

/// A tokenised parameter string.
///
/// Keys are matched exactly, so `io_tol` never picks up `io_tol2`. When a key
/// repeats, the first fragment wins and later ones are ignored.
#[derive(Debug, Clone)]
pub struct ParameterString<'a> {
    fragments: Vec<Fragment<'a>>,
}

impl<'a> ParameterString<'a> {
    pub fn parse(text: &'a str) -> Self {
        let fragments = text
            .split(';')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|fragment| match fragment.split_once('=') {
                Some((key, value)) => Fragment {
                    key: key.trim(),
                    value: Some(value.trim()),
                },
                None => Fragment {
                    key: fragment,
                    value: None,
                },
            })
            .collect();

        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment<'a>] {
        &self.fragments
    }

    /// Raw text of the first fragment named `key`.
    pub fn raw(&self, key: &str) -> Option<&Fragment<'a>> {
        self.fragments.iter().find(|f| f.key == key)
    }

    /// Decoded value of `key`, `Ok(None)` when absent.
    ///
    /// A literal `None` comes back as `Some(Value::None)`.
    pub fn extract(&self, key: &str) -> Result<Option<Value>, ParameterError> {
        let Some(fragment) = self.raw(key) else {
            return Ok(None);
        };

        let text = fragment.value.ok_or_else(|| ParameterError::MissingAssignment {
            key: key.to_string(),
        })?;

        decode(text)
            .map(Some)
            .map_err(|source| ParameterError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Like [`extract`](Self::extract), but a literal `None` also counts as absent.
    pub fn lookup(&self, key: &str) -> Result<Option<Value>, ParameterError> {
        Ok(self.extract(key)?.filter(|v| !v.is_none()))
    }

    /// Keys present in the string that are not in `known`.
    pub fn unknown_keys(&self, known: &[&str]) -> Vec<&'a str> {
        self.fragments
            .iter()
            .map(|f| f.key)
            .filter(|k| !known.contains(k))
            .collect()
    }
}

/// Decode the first occurrence of `key` in `params`.
pub fn extract(params: &str, key: &str) -> Result<Option<Value>, ParameterError> {
    ParameterString::parse(params).extract(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn extracts_each_key() {
        let s = "par_rep=(0.2, 0.3, 0.5); par_tol=0.2; print=True";
        assert_eq!(
            extract(s, "par_rep").unwrap(),
            Some(Value::Tuple(vec![
                Value::Float(0.2),
                Value::Float(0.3),
                Value::Float(0.5)
            ]))
        );
        assert_eq!(extract(s, "par_tol").unwrap(), Some(Value::Float(0.2)));
        assert_eq!(extract(s, "print").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn missing_key() {
        let s = "par_rep=(0.2, 0.3, 0.5); par_tol=0.2";
        assert_eq!(extract(s, "model_name").unwrap(), None);
        assert_eq!(extract("", "anything").unwrap(), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let s = "par_tol=0.2; par_tol=0.5";
        assert_eq!(extract(s, "par_tol").unwrap(), Some(Value::Float(0.2)));
    }

    #[test]
    fn exact_key_match() {
        let s = "key2=1; key=2";
        assert_eq!(extract(s, "key").unwrap(), Some(Value::Int(2)));
        assert_eq!(extract("io_tol2=5", "io_tol").unwrap(), None);
    }

    #[test]
    fn equals_inside_string_values() {
        let s = r#"dig_lab="sw"; dig_par="sig=(0, 1, 1, 1), alp=0.5""#;
        assert_eq!(
            extract(s, "dig_par").unwrap(),
            Some(Value::Str("sig=(0, 1, 1, 1), alp=0.5".into()))
        );
    }

    #[test]
    fn empty_value_is_an_error() {
        let err = extract("key=; other=1", "key").unwrap_err();
        assert_eq!(
            err,
            ParameterError::Decode {
                key: "key".into(),
                source: DecodeError::Empty
            }
        );
    }

    #[test]
    fn fragment_without_assignment() {
        let err = extract("io_prt; io_loc=(1, 0)", "io_prt").unwrap_err();
        assert!(matches!(err, ParameterError::MissingAssignment { .. }));
    }

    #[test]
    fn literal_none_is_absent_for_lookup() {
        let params = ParameterString::parse("io_met=None");
        assert_eq!(params.extract("io_met").unwrap(), Some(Value::None));
        assert_eq!(params.lookup("io_met").unwrap(), None);
    }

    #[test]
    fn reports_unknown_keys() {
        let params = ParameterString::parse("dig_lab=\"sw\"; print=True");
        assert_eq!(params.unknown_keys(&["dig_lab", "dig_par", "dig_prt"]), vec!["print"]);
    }
}
