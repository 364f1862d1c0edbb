use serde::de::{self, DeserializeOwned, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identifier of a tree node. The API sends integers for real nodes; the
/// synthetic hospital root uses a string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Text(String),
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::Int(0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Int(value) => write!(f, "{value}"),
            NodeId::Text(value) => f.write_str(value),
        }
    }
}

/// Visualization / judgment mode selected for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeType {
    #[default]
    IncidentCount,
    DomainDistributionNumbers,
    DomainDistributionPercentage,
    SeverityDistributionNumbers,
    SeverityDistributionPercentage,
    RedFlagIncidents,
    NeverEventIncidents,
    #[serde(other)]
    Unknown,
}

impl TreeType {
    pub const ALL: [TreeType; 7] = [
        TreeType::IncidentCount,
        TreeType::DomainDistributionNumbers,
        TreeType::DomainDistributionPercentage,
        TreeType::SeverityDistributionNumbers,
        TreeType::SeverityDistributionPercentage,
        TreeType::RedFlagIncidents,
        TreeType::NeverEventIncidents,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TreeType::IncidentCount => "incident_count",
            TreeType::DomainDistributionNumbers => "domain_distribution_numbers",
            TreeType::DomainDistributionPercentage => "domain_distribution_percentage",
            TreeType::SeverityDistributionNumbers => "severity_distribution_numbers",
            TreeType::SeverityDistributionPercentage => "severity_distribution_percentage",
            TreeType::RedFlagIncidents => "red_flag_incidents",
            TreeType::NeverEventIncidents => "never_event_incidents",
            TreeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TreeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeType {
    type Err = anyhow::Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        TreeType::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == token.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown tree type: {token}"))
    }
}

/// Lists the seven known tags; `Unknown` is never offered on the command line.
#[cfg(feature = "cli")]
impl clap::ValueEnum for TreeType {
    fn value_variants<'a>() -> &'a [Self] {
        &TreeType::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            TreeType::Unknown => None,
            known => Some(clap::builder::PossibleValue::new(known.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainBreakdown {
    #[serde(default, alias = "clinical", deserialize_with = "lenient_count")]
    pub medical: u64,
    #[serde(default, alias = "relational", deserialize_with = "lenient_count")]
    pub nursing: u64,
    #[serde(default, alias = "management", deserialize_with = "lenient_count")]
    pub administrative: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    #[serde(default, deserialize_with = "lenient_count")]
    pub low: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub medium: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub high: u64,
}

/// One node of the investigation tree as returned by the API.
///
/// Every field decodes leniently: null or ill-typed values fall back to their
/// defaults (counts to 0) so one bad field never rejects the whole tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentTreeNode {
    #[serde(default, deserialize_with = "lenient_node_id")]
    pub node_id: NodeId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub node_name: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub node_name_ar: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub node_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub value: u64,
    #[serde(default, deserialize_with = "lenient_breakdown")]
    pub domain_breakdown: DomainBreakdown,
    #[serde(default, deserialize_with = "lenient_breakdown")]
    pub severity_breakdown: SeverityBreakdown,
    #[serde(default, deserialize_with = "lenient_count")]
    pub red_flag_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub never_event_count: u64,
    #[serde(default, deserialize_with = "lenient_children")]
    pub children: Vec<IncidentTreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    Hospital,
    Administration,
    Department,
    Section,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default, deserialize_with = "or_default")]
    pub level: ScopeLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_incidents: u64,
}

/// Response of the investigation tree endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeResponse {
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub season_label: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub tree_type: TreeType,
    #[serde(default, deserialize_with = "or_default")]
    pub scope: Scope,
    #[serde(default, deserialize_with = "lenient_children")]
    pub tree: Vec<IncidentTreeNode>,
    #[serde(default, deserialize_with = "or_default")]
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Response of the seasons endpoint. Seasons arrive either as plain strings or
/// as `{value, label}` objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonsResponse {
    #[serde(default, deserialize_with = "lenient_seasons")]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub current_season: Option<String>,
}

pub fn parse_tree_response(input: &str) -> anyhow::Result<TreeResponse> {
    Ok(decode_json(input)?)
}

/// JSON decoding without serde_json's nesting cap, since trees have no depth
/// limit. Children are streamed so each level is decoded once.
pub(crate) fn decode_json<T: DeserializeOwned>(input: &str) -> serde_json::Result<T> {
    let mut deserializer = serde_json::Deserializer::from_str(input);
    deserializer.disable_recursion_limit();
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<IncidentTreeNode>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ChildrenVisitor)
}

fn ignored_children(kind: &'static str) -> Vec<IncidentTreeNode> {
    tracing::warn!(kind, "ignoring non-array children");
    Vec::new()
}

struct ChildrenVisitor;

impl<'de> Visitor<'de> for ChildrenVisitor {
    type Value = Vec<IncidentTreeNode>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of tree nodes")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut nodes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(MaybeNode(node)) = seq.next_element()? {
            nodes.extend(node);
        }
        Ok(nodes)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(ignored_children("object"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Vec::new())
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(ignored_children("bool"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(ignored_children("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(ignored_children("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(ignored_children("number"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(ignored_children("string"))
    }
}

/// A children entry; anything that is not an object is skipped.
struct MaybeNode(Option<IncidentTreeNode>);

impl<'de> Deserialize<'de> for MaybeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MaybeNodeVisitor)
    }
}

fn skipped_node(kind: &'static str) -> MaybeNode {
    tracing::warn!(kind, "skipping non-object tree node");
    MaybeNode(None)
}

struct MaybeNodeVisitor;

impl<'de> Visitor<'de> for MaybeNodeVisitor {
    type Value = MaybeNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a tree node")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        IncidentTreeNode::deserialize(de::value::MapAccessDeserializer::new(map))
            .map(|node| MaybeNode(Some(node)))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(skipped_node("array"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(skipped_node("null"))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(skipped_node("bool"))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(skipped_node("number"))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(skipped_node("number"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(skipped_node("number"))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
        Ok(skipped_node("string"))
    }
}

fn lenient_breakdown<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(T::deserialize(value).unwrap_or_else(|err| {
            tracing::warn!(%err, "unreadable breakdown treated as zeros");
            T::default()
        })),
        _ => Ok(T::default()),
    }
}

/// Null falls back silently; anything else that fails to decode is logged.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        value => Ok(T::deserialize(value).unwrap_or_else(|err| {
            tracing::warn!(%err, "unreadable field replaced by its default");
            T::default()
        })),
    }
}

/// Counts are non-negative integers. Whole floats are accepted; null,
/// negative, fractional or non-numeric values count as 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(count_from_value(&Value::deserialize(deserializer)?))
}

fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Null => 0,
        Value::Number(number) => {
            if let Some(count) = number.as_u64() {
                return count;
            }
            match number.as_f64() {
                Some(float) if float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 => {
                    float as u64
                }
                _ => {
                    tracing::warn!(value = %number, "count treated as 0");
                    0
                }
            }
        }
        other => {
            tracing::warn!(kind = json_kind(other), "non-numeric count treated as 0");
            0
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_from_value(Value::deserialize(deserializer)?))
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Null => None,
        other => {
            tracing::warn!(kind = json_kind(&other), "non-text value ignored");
            None
        }
    }
}

fn lenient_node_id<'de, D>(deserializer: D) -> Result<NodeId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => match number.as_i64() {
            Some(id) => NodeId::Int(id),
            None => NodeId::Text(number.to_string()),
        },
        Value::String(id) => NodeId::Text(id),
        Value::Null => NodeId::default(),
        other => {
            tracing::warn!(kind = json_kind(&other), "unusable node id replaced by default");
            NodeId::default()
        }
    })
}

fn lenient_seasons<'de, D>(deserializer: D) -> Result<Vec<Season>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSeason {
        Plain(String),
        Full(Season),
    }

    let raw: Option<Vec<RawSeason>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|season| match season {
            RawSeason::Plain(value) => Season { value, label: None },
            RawSeason::Full(season) => season,
        })
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
