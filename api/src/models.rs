//! Wire models for the analysis backend.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-assigned session identifier. Opaque; never edited client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of chart images a report can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceName {
    KmeansElbow,
    KmeansClusters,
    Heatmap,
    Funnel,
}

impl ResourceName {
    pub const ALL: [ResourceName; 4] = [
        ResourceName::KmeansElbow,
        ResourceName::KmeansClusters,
        ResourceName::Heatmap,
        ResourceName::Funnel,
    ];

    pub fn as_key(self) -> &'static str {
        match self {
            Self::KmeansElbow => "kmeans_elbow",
            Self::KmeansClusters => "kmeans_clusters",
            Self::Heatmap => "heatmap",
            Self::Funnel => "funnel",
        }
    }

    /// Maps both the canonical names and the file stems used by `GET /results`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "kmeans_elbow" => Some(Self::KmeansElbow),
            "kmeans_clusters" => Some(Self::KmeansClusters),
            "heatmap" | "user_behavior_heatmap" => Some(Self::Heatmap),
            "funnel" | "conversion_funnel" => Some(Self::Funnel),
            _ => None,
        }
    }

    /// File name offered when saving the image locally.
    pub fn download_name(self) -> &'static str {
        match self {
            Self::KmeansElbow => "kmeans_elbow.png",
            Self::KmeansClusters => "kmeans_clusters.png",
            Self::Heatmap => "user_behavior_heatmap.png",
            Self::Funnel => "user_funnel.png",
        }
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// Resource name to backend-relative URL. Absent names are "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ImageUrls(BTreeMap<ResourceName, String>);

impl ImageUrls {
    pub fn get(&self, name: ResourceName) -> Option<&str> {
        self.0.get(&name).map(String::as_str)
    }

    pub fn insert(&mut self, name: ResourceName, url: impl Into<String>) -> Option<String> {
        self.0.insert(name, url.into())
    }

    pub fn contains(&self, name: ResourceName) -> bool {
        self.0.contains_key(&name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceName, &str)> {
        self.0.iter().map(|(name, url)| (*name, url.as_str()))
    }

    /// Adds every entry of `other` whose name is not present yet.
    pub fn fill_from(&mut self, other: ImageUrls) {
        for (name, url) in other.0 {
            self.0.entry(name).or_insert(url);
        }
    }
}

impl From<BTreeMap<String, String>> for ImageUrls {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut urls = BTreeMap::new();
        for (key, url) in raw {
            match ResourceName::from_key(&key) {
                Some(name) => {
                    urls.insert(name, url);
                }
                None => tracing::debug!(key = %key, "ignoring unknown image key"),
            }
        }
        Self(urls)
    }
}

impl From<ImageUrls> for BTreeMap<String, String> {
    fn from(urls: ImageUrls) -> Self {
        urls.0
            .into_iter()
            .map(|(name, url)| (name.as_key().to_string(), url))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub original_rows: u64,
    pub cleaned_rows: u64,
    pub removed_rows: u64,
    pub percent_kept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSize {
    /// Zero-based cluster index.
    #[serde(rename = "聚类", alias = "cluster")]
    pub cluster: u32,
    #[serde(rename = "用户数量", alias = "count")]
    pub users: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KmeansResults {
    #[serde(default)]
    pub cluster_stats: Vec<ClusterSize>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub cluster_profiles: Value,
}

impl KmeansResults {
    pub fn total_users(&self) -> u64 {
        self.cluster_stats.iter().map(|cluster| cluster.users).sum()
    }

    /// Share of all clustered users in percent; `None` when nothing was clustered.
    pub fn share_percent(&self, cluster: &ClusterSize) -> Option<f64> {
        let total = self.total_users();
        (total > 0).then(|| cluster.users as f64 / total as f64 * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSummary {
    #[serde(rename = "行为", alias = "behavior")]
    pub name: String,
    #[serde(rename = "均值", alias = "mean")]
    pub mean: f64,
    #[serde(rename = "最大值", alias = "max")]
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapResults {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub behavior_stats: Value,
    #[serde(default)]
    pub top_behaviors: Vec<BehaviorSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: String,
    pub count: u64,
    /// Display string such as `"45.2%"`; numeric values are rendered as-is.
    #[serde(deserialize_with = "string_or_number")]
    pub conversion_rate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelResults {
    #[serde(default)]
    pub funnel_data: Vec<FunnelStage>,
}

/// A hydrated (or partially hydrated) report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaning_stats: Option<CleaningStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kmeans_results: Option<KmeansResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap_results: Option<HeatmapResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_results: Option<FunnelResults>,
    #[serde(default)]
    pub image_urls: ImageUrls,
}

impl AnalysisResult {
    pub fn has_statistics(&self) -> bool {
        self.cleaning_stats.is_some()
            || self.kmeans_results.is_some()
            || self.heatmap_results.is_some()
            || self.funnel_results.is_some()
    }

    /// Image references only, no computed statistics.
    pub fn is_partial(&self) -> bool {
        !self.image_urls.is_empty() && !self.has_statistics()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Pending,
    Error,
}

/// Body of `GET /results/{session_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsEnvelope {
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub payload: AnalysisResult,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_complete_analyze_response() {
        let body = json!({
            "session_id": "abc123",
            "status": "success",
            "image_urls": {
                "kmeans_elbow": "/static/abc123/kmeans_elbow.png",
                "kmeans_clusters": "/static/abc123/kmeans_clusters.png",
                "heatmap": "/static/abc123/user_behavior_heatmap.png",
                "funnel": "/static/abc123/conversion_funnel.png"
            },
            "cleaning_stats": {"original_rows": 1000, "cleaned_rows": 950, "removed_rows": 50, "percent_kept": 95.0},
            "kmeans_results": {
                "cluster_stats": [{"聚类": 0, "用户数量": 600}, {"聚类": 1, "用户数量": 350}],
                "cluster_profiles": [{"cluster": 0, "年龄": 31.2}]
            },
            "heatmap_results": {
                "behavior_stats": {},
                "top_behaviors": [{"行为": "浏览", "均值": 3.456, "最大值": 12}]
            },
            "funnel_results": {
                "funnel_data": [
                    {"stage": "访问", "count": 950, "conversion_rate": "100%"},
                    {"stage": "购买", "count": 120, "conversion_rate": "12.63%"}
                ]
            }
        });

        let result: AnalysisResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.session_id, Some(SessionId::new("abc123")));
        assert_eq!(result.image_urls.len(), 4);
        assert!(result.has_statistics());
        assert!(!result.is_partial());

        let kmeans = result.kmeans_results.as_ref().unwrap();
        assert_eq!(kmeans.total_users(), 950);
        assert_eq!(kmeans.cluster_stats[1].users, 350);

        let heatmap = result.heatmap_results.as_ref().unwrap();
        assert_eq!(heatmap.top_behaviors[0].name, "浏览");
        assert_eq!(heatmap.top_behaviors[0].max, 12.0);

        let funnel = result.funnel_results.as_ref().unwrap();
        assert_eq!(funnel.funnel_data[1].conversion_rate, "12.63%");
    }

    #[test]
    fn results_envelope_normalises_file_stem_keys() {
        let body = json!({
            "status": "success",
            "session_id": "abc123",
            "image_urls": {
                "kmeans_elbow": "/static/abc123/kmeans_elbow.png",
                "user_behavior_heatmap": "/static/abc123/user_behavior_heatmap.png",
                "conversion_funnel": "/static/abc123/conversion_funnel.png",
                "association_network": "/static/abc123/association_network.png"
            }
        });

        let envelope: ResultsEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.status, ResultStatus::Success);
        let urls = &envelope.payload.image_urls;
        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls.get(ResourceName::Heatmap),
            Some("/static/abc123/user_behavior_heatmap.png")
        );
        assert!(urls.contains(ResourceName::Funnel));
        assert!(!urls.contains(ResourceName::KmeansClusters));
        assert!(envelope.payload.is_partial());
    }

    #[test]
    fn pending_and_error_envelopes_carry_messages() {
        let pending: ResultsEnvelope =
            serde_json::from_value(json!({"status": "pending", "message": "分析尚未完成或未生成图片"}))
                .unwrap();
        assert_eq!(pending.status, ResultStatus::Pending);
        assert!(pending.payload.image_urls.is_empty());
        assert!(!pending.payload.is_partial());

        let failed: ResultsEnvelope =
            serde_json::from_value(json!({"status": "error", "message": "文件格式错误"})).unwrap();
        assert_eq!(failed.status, ResultStatus::Error);
        assert_eq!(failed.message.as_deref(), Some("文件格式错误"));
    }

    #[test]
    fn english_aliases_and_numeric_rates_are_accepted() {
        let kmeans: KmeansResults =
            serde_json::from_value(json!({"cluster_stats": [{"cluster": 2, "count": 40}]})).unwrap();
        assert_eq!(kmeans.cluster_stats[0].cluster, 2);

        let stage: FunnelStage =
            serde_json::from_value(json!({"stage": "注册", "count": 10, "conversion_rate": 0.5}))
                .unwrap();
        assert_eq!(stage.conversion_rate, "0.5");
    }

    #[test]
    fn image_urls_serialise_with_canonical_keys() {
        let mut urls = ImageUrls::default();
        urls.insert(ResourceName::Funnel, "/static/s/conversion_funnel.png");
        let value = serde_json::to_value(&urls).unwrap();
        assert_eq!(value, json!({"funnel": "/static/s/conversion_funnel.png"}));
    }

    #[test]
    fn share_percent_handles_empty_clusters() {
        let kmeans = KmeansResults::default();
        let cluster = ClusterSize { cluster: 0, users: 0 };
        assert_eq!(kmeans.share_percent(&cluster), None);
    }
}
