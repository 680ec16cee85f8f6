use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct InsightConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub diagnostic: DiagnosticConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    /// Composite at or above which `quick_check` flags a student.
    pub struggling_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            struggling_threshold: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Sessions must score strictly above this composite to count toward a cluster.
    pub cluster_activation_threshold: f64,
    pub min_cluster_students: usize,
    pub enrichment_clusters: usize,
    pub enrichment_students: usize,
    pub excerpts_per_student: usize,
    pub max_insight_excerpts: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            cluster_activation_threshold: 0.4,
            min_cluster_students: 2,
            enrichment_clusters: 3,
            enrichment_students: 5,
            excerpts_per_student: 2,
            max_insight_excerpts: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DiagnosticConfig {
    pub critical_cell_threshold: f64,
    pub max_critical_cells: usize,
    pub summary_clusters: usize,
    pub max_recommendations: usize,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            critical_cell_threshold: 0.6,
            max_critical_cells: 8,
            summary_clusters: 5,
            max_recommendations: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationSettings {
    pub backend: String,
    pub model: String,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            max_retries: 2,
            retry_delay_ms: 1000,
            timeout_seconds: 120,
            temperature: 0.4,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub embedding_model: String,
    pub dimensions: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            embedding_model: "gemini-embedding-001".to_string(),
            dimensions: 768,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LexiconConfig {
    /// Optional TOML file whose lists replace the bundled ones.
    pub path: Option<String>,
}

impl InsightConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
