//! Topic clustering
//!
//! Groups above-threshold session scores by lesson topic. A topic becomes a
//! cluster only when at least `min_cluster_students` distinct students
//! struggled on it. The top clusters may then be enriched with excerpts from
//! the semantic memory collaborator; that step is best-effort.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use futures::future::join_all;
use insight_core::config::SnapshotConfig;
use insight_core::models::{Dimension, SemanticCluster, TopicStruggleRecord};
use insight_core::SemanticMemory;
use uuid::Uuid;

use super::struggle::round3;

#[derive(Default)]
struct TopicGroup {
    subject: String,
    student_ids: Vec<Uuid>,
    seen: HashSet<Uuid>,
    records: usize,
    composite: f64,
    socratic: f64,
    persistence: f64,
    frustration: f64,
}

/// Priority on ties: persistence, then frustration, then socratic as the default.
pub fn dominant_dimension(socratic: f64, persistence: f64, frustration: f64) -> Dimension {
    if persistence >= socratic && persistence >= frustration {
        Dimension::ErrorPersistence
    } else if frustration >= socratic && frustration >= persistence {
        Dimension::FrustrationSentiment
    } else {
        Dimension::SocraticDepth
    }
}

/// Clusters sorted by average composite, highest first.
pub fn form_clusters(records: &[TopicStruggleRecord], config: &SnapshotConfig) -> Vec<SemanticCluster> {
    let mut groups: BTreeMap<&str, TopicGroup> = BTreeMap::new();

    for record in records
        .iter()
        .filter(|r| r.dimensions.composite > config.cluster_activation_threshold)
    {
        let group = groups.entry(record.topic.as_str()).or_insert_with(|| TopicGroup {
            subject: record.subject.clone(),
            ..Default::default()
        });

        if group.seen.insert(record.student_id) {
            group.student_ids.push(record.student_id);
        }
        group.records += 1;
        group.composite += record.dimensions.composite;
        group.socratic += record.dimensions.socratic_depth;
        group.persistence += record.dimensions.error_persistence;
        group.frustration += record.dimensions.frustration_sentiment;
    }

    let mut clusters: Vec<SemanticCluster> = groups
        .into_iter()
        .filter(|(_, g)| g.student_ids.len() >= config.min_cluster_students)
        .map(|(topic, g)| {
            let n = g.records as f64;
            SemanticCluster {
                topic: topic.to_string(),
                subject: g.subject,
                avg_struggle_score: round3(g.composite / n),
                student_count: g.student_ids.len(),
                student_ids: g.student_ids,
                dominant_dimension: dominant_dimension(
                    g.socratic / n,
                    g.persistence / n,
                    g.frustration / n,
                ),
                memory_insight: None,
            }
        })
        .collect();

    clusters.sort_by(|a, b| {
        b.avg_struggle_score
            .partial_cmp(&a.avg_struggle_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.topic.cmp(&b.topic))
    });
    clusters
}

/// Attaches memory excerpts to the leading clusters. Failures are skipped.
pub async fn enrich_clusters(
    clusters: &mut [SemanticCluster],
    memory: &dyn SemanticMemory,
    config: &SnapshotConfig,
) {
    let limit = config.enrichment_clusters.min(clusters.len());
    let insights = join_all(
        clusters[..limit]
            .iter()
            .map(|cluster| memory_insight(cluster, memory, config)),
    )
    .await;

    for (cluster, insight) in clusters.iter_mut().zip(insights) {
        cluster.memory_insight = insight;
    }
}

async fn memory_insight(
    cluster: &SemanticCluster,
    memory: &dyn SemanticMemory,
    config: &SnapshotConfig,
) -> Option<String> {
    let lookups = cluster
        .student_ids
        .iter()
        .take(config.enrichment_students)
        .map(|student_id| async move {
            match memory
                .recall(*student_id, &cluster.topic, config.excerpts_per_student)
                .await
            {
                Ok(mut excerpts) => {
                    excerpts.truncate(config.excerpts_per_student);
                    excerpts
                }
                Err(e) => {
                    tracing::debug!(
                        student_id = %student_id,
                        topic = %cluster.topic,
                        error = %e,
                        "Memory recall failed, skipping student"
                    );
                    Vec::new()
                }
            }
        });

    let excerpts: Vec<String> = join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .take(config.max_insight_excerpts)
        .collect();

    if excerpts.is_empty() {
        None
    } else {
        Some(excerpts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::models::StruggleDimensions;

    fn record(student_id: Uuid, topic: &str, s: f64, p: f64, f: f64, composite: f64) -> TopicStruggleRecord {
        TopicStruggleRecord {
            student_id,
            topic: topic.to_string(),
            subject: "Math".to_string(),
            dimensions: StruggleDimensions {
                socratic_depth: s,
                error_persistence: p,
                frustration_sentiment: f,
                composite,
            },
        }
    }

    #[test]
    fn test_dominant_dimension_priority() {
        assert_eq!(dominant_dimension(0.2, 0.6, 0.6), Dimension::ErrorPersistence);
        assert_eq!(dominant_dimension(0.2, 0.5, 0.6), Dimension::FrustrationSentiment);
        assert_eq!(dominant_dimension(0.9, 0.5, 0.6), Dimension::SocraticDepth);
        assert_eq!(dominant_dimension(0.6, 0.6, 0.6), Dimension::ErrorPersistence);
        assert_eq!(dominant_dimension(0.6, 0.2, 0.6), Dimension::FrustrationSentiment);
        assert_eq!(dominant_dimension(0.0, 0.0, 0.0), Dimension::ErrorPersistence);
    }

    #[test]
    fn test_single_student_topic_is_not_a_cluster() {
        let alice = Uuid::new_v4();
        let records = vec![
            record(alice, "fractions", 0.9, 0.9, 0.9, 0.95),
            record(alice, "fractions", 0.9, 0.9, 0.9, 0.9),
        ];
        assert!(form_clusters(&records, &SnapshotConfig::default()).is_empty());
    }

    #[test]
    fn test_records_at_threshold_are_excluded() {
        let records = vec![
            record(Uuid::new_v4(), "decimals", 0.5, 0.5, 0.5, 0.4),
            record(Uuid::new_v4(), "decimals", 0.5, 0.5, 0.5, 0.4),
        ];
        assert!(form_clusters(&records, &SnapshotConfig::default()).is_empty());
    }

    #[test]
    fn test_clusters_average_and_sort() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let records = vec![
            record(a, "fractions", 0.2, 0.8, 0.4, 0.5),
            record(b, "fractions", 0.2, 0.6, 0.4, 0.7),
            record(a, "fractions", 0.2, 0.7, 0.4, 0.6),
            record(b, "geometry", 0.1, 0.3, 0.9, 0.8),
            record(c, "geometry", 0.1, 0.3, 0.7, 0.9),
        ];
        let clusters = form_clusters(&records, &SnapshotConfig::default());

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].topic, "geometry");
        assert_eq!(clusters[0].avg_struggle_score, 0.85);
        assert_eq!(clusters[0].dominant_dimension, Dimension::FrustrationSentiment);
        assert_eq!(clusters[0].student_ids, vec![b, c]);

        assert_eq!(clusters[1].topic, "fractions");
        assert_eq!(clusters[1].avg_struggle_score, 0.6);
        assert_eq!(clusters[1].student_count, 2);
        assert_eq!(clusters[1].student_ids, vec![a, b]);
        assert_eq!(clusters[1].dominant_dimension, Dimension::ErrorPersistence);
    }

    #[test]
    fn test_tied_persistence_and_frustration_resolve_to_persistence() {
        let records = vec![
            record(Uuid::new_v4(), "ratios", 0.1, 0.7, 0.7, 0.6),
            record(Uuid::new_v4(), "ratios", 0.3, 0.5, 0.5, 0.5),
        ];
        let clusters = form_clusters(&records, &SnapshotConfig::default());
        assert_eq!(clusters[0].dominant_dimension, Dimension::ErrorPersistence);
    }

    #[test]
    fn test_subject_and_members_follow_record_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut first = record(b, "fractions", 0.2, 0.8, 0.4, 0.6);
        first.subject = "Arithmetic".to_string();
        let records = vec![
            first,
            record(a, "fractions", 0.2, 0.8, 0.4, 0.6),
            record(b, "fractions", 0.2, 0.8, 0.4, 0.6),
        ];
        let clusters = form_clusters(&records, &SnapshotConfig::default());

        assert_eq!(clusters[0].subject, "Arithmetic");
        assert_eq!(clusters[0].student_ids, vec![b, a]);
        assert_eq!(clusters[0].student_count, 2);
    }
}
