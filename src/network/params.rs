use crate::error::LaunchError;
use crate::parameters::{Value, decode};
use serde::Serialize;

/// Knobs shared by the topology constructors, read from `dig_par`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyParams {
    /// `sig`: entry k != 0 links agent i to agent i+k.
    pub signature: Vec<f64>,
    /// `alp`
    pub change_probability: f64,
    /// `rev`
    pub reverse_probability: f64,
    /// `bid`
    pub bidirectional_probability: f64,
    /// `rnd`
    pub random_edges: usize,
    /// `pos`
    pub positive_edge_ratio: f64,
    /// `rst`
    pub row_stochastic: bool,
    /// `edp`
    pub edge_probability: f64,
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            signature: vec![0.0, 1.0],
            change_probability: 0.0,
            reverse_probability: 0.0,
            bidirectional_probability: 0.0,
            random_edges: 0,
            positive_edge_ratio: 1.0,
            row_stochastic: false,
            edge_probability: 0.5,
        }
    }
}

/// Split on commas that are not nested in brackets or quotes.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

fn probability(name: &str, value: &Value) -> Result<f64, LaunchError> {
    match value.as_f64() {
        Some(p) if (0.0..=1.0).contains(&p) => Ok(p),
        _ => Err(LaunchError::invalid(name, format!("{} is not a probability", value))),
    }
}

impl TopologyParams {
    /// Parse `name=literal, name=literal`. Earlier names win, like the outer
    /// parameter string.
    pub fn parse(text: &str) -> Result<Self, LaunchError> {
        let mut params = Self::default();
        let mut seen: Vec<&str> = Vec::new();

        for part in split_top_level(text) {
            let (name, raw) = part
                .split_once('=')
                .ok_or_else(|| LaunchError::invalid("dig_par", format!("'{}' is not name=value", part)))?;
            let name = name.trim();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            let value = decode(raw).map_err(|e| LaunchError::invalid(name, e.to_string()))?;
            params.set(name, &value)?;
        }

        Ok(params)
    }

    /// Resolve the raw `dig_par` value: absent, a parameter text, or `None`.
    pub fn from_value(value: Option<&Value>) -> Result<Self, LaunchError> {
        match value {
            None | Some(Value::None) => Ok(Self::default()),
            Some(Value::Str(text)) => Self::parse(text),
            Some(other) => Err(LaunchError::invalid(
                "dig_par",
                format!("expected a quoted parameter list, got {}", other.type_name()),
            )),
        }
    }

    fn set(&mut self, name: &str, value: &Value) -> Result<(), LaunchError> {
        match name {
            "sig" => {
                let items = value
                    .items()
                    .ok_or_else(|| LaunchError::invalid("sig", "expected a tuple of numbers"))?;
                self.signature = items
                    .iter()
                    .map(|v| v.as_f64().ok_or_else(|| LaunchError::invalid("sig", format!("{} is not a number", v))))
                    .collect::<Result<_, _>>()?;
            }
            "alp" => self.change_probability = probability(name, value)?,
            "rev" => self.reverse_probability = probability(name, value)?,
            "bid" => self.bidirectional_probability = probability(name, value)?,
            "pos" => self.positive_edge_ratio = probability(name, value)?,
            "edp" => self.edge_probability = probability(name, value)?,
            "rnd" => {
                self.random_edges = value
                    .as_i64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| LaunchError::invalid("rnd", format!("{} is not a non-negative integer", value)))?;
            }
            "rst" => {
                self.row_stochastic = value
                    .as_bool()
                    .ok_or_else(|| LaunchError::invalid("rst", format!("{} is not True/False", value)))?;
            }
            other => return Err(LaunchError::invalid(other, "unknown topology parameter")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_small_world_text() {
        let params = TopologyParams::parse("sig=(0, 1, 1, 1), alp=0.5").unwrap();
        assert_eq!(params.signature, vec![0.0, 1.0, 1.0, 1.0]);
        assert_eq!(params.change_probability, 0.5);
        assert_eq!(params.positive_edge_ratio, 1.0);
    }

    #[test]
    fn splits_only_top_level_commas() {
        assert_eq!(
            split_top_level("sig=(0,1,1,1), alp=0.5, x='a,b'"),
            vec!["sig=(0,1,1,1)", "alp=0.5", "x='a,b'"]
        );
    }

    #[test]
    fn all_knobs() {
        let params = TopologyParams::parse("rev=0.1, bid=0.2, rnd=3, pos=0.8, rst=True, edp=0.25").unwrap();
        assert_eq!(params.reverse_probability, 0.1);
        assert_eq!(params.bidirectional_probability, 0.2);
        assert_eq!(params.random_edges, 3);
        assert_eq!(params.positive_edge_ratio, 0.8);
        assert!(params.row_stochastic);
        assert_eq!(params.edge_probability, 0.25);
    }

    #[test]
    fn first_name_wins() {
        let params = TopologyParams::parse("alp=0.1, alp=0.9").unwrap();
        assert_eq!(params.change_probability, 0.1);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(TopologyParams::parse("alp=1.5").is_err());
        assert!(TopologyParams::parse("rnd=-1").is_err());
        assert!(TopologyParams::parse("zzz=1").is_err());
        assert!(TopologyParams::parse("alp").is_err());
        assert!(TopologyParams::from_value(Some(&Value::Int(3))).is_err());
    }

    #[test]
    fn absent_means_defaults() {
        assert_eq!(TopologyParams::from_value(None).unwrap(), TopologyParams::default());
        assert_eq!(TopologyParams::from_value(Some(&Value::None)).unwrap(), TopologyParams::default());
    }
}
