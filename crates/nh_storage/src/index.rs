use chrono::{DateTime, NaiveDate, Utc};
use nh_core::{Error, LabeledArticle, ObjectStore, Result};
use serde::{Deserialize, Serialize};

use crate::dated::find_latest;
use crate::keys::{index_manifest_key, IndexKeys};
use crate::{get_json, put_json};

/// Exhaustive inner-product index. With unit vectors this is cosine similarity.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = vectors
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::Precondition("cannot build an index from zero vectors".to_string()))?;
        let mut index = Self::new(dimension);
        for vector in vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension || self.dimension == 0 {
            return Err(Error::Precondition(format!(
                "vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        self.vectors.push(vector);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Top `k` positions by inner product with `query`, best first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(Error::Precondition(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| (position, dot(v, query)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Publish marker for a snapshot, written after the vector and metadata blobs
/// of its generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    pub date: NaiveDate,
    pub generation: String,
    pub count: usize,
    pub dimension: usize,
    pub created_at: DateTime<Utc>,
}

/// One day's index with its metadata. Position is the only join key.
#[derive(Debug, Clone)]
pub struct VectorIndexSnapshot {
    date: NaiveDate,
    index: FlatIndex,
    metadata: Vec<LabeledArticle>,
}

impl VectorIndexSnapshot {
    pub fn new(date: NaiveDate, vectors: Vec<Vec<f32>>, metadata: Vec<LabeledArticle>) -> Result<Self> {
        if vectors.len() != metadata.len() {
            return Err(Error::Precondition(format!(
                "{} vectors but {} metadata records",
                vectors.len(),
                metadata.len()
            )));
        }
        let index = FlatIndex::from_vectors(vectors)?;
        Ok(Self { date, index, metadata })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn metadata(&self) -> &[LabeledArticle] {
        &self.metadata
    }

    pub fn record(&self, position: usize) -> Option<&LabeledArticle> {
        self.metadata.get(position)
    }
}

fn new_generation(created_at: DateTime<Utc>) -> String {
    format!("{}-{:08x}", created_at.timestamp_millis(), rand::random::<u32>())
}

/// Writes vectors and metadata under a fresh generation, then swaps the
/// manifest over to it. Readers only trust blobs the manifest names, so a
/// republish that dies halfway leaves the previous snapshot in place.
pub async fn publish_snapshot(store: &dyn ObjectStore, snapshot: &VectorIndexSnapshot) -> Result<IndexManifest> {
    let created_at = Utc::now();
    let manifest = IndexManifest {
        date: snapshot.date,
        generation: new_generation(created_at),
        count: snapshot.len(),
        dimension: snapshot.dimension(),
        created_at,
    };
    let keys = IndexKeys::for_generation(snapshot.date, &manifest.generation);

    put_json(store, &keys.vectors, snapshot.index.vectors()).await?;
    put_json(store, &keys.metadata, &snapshot.metadata).await?;
    put_json(store, &index_manifest_key(snapshot.date), &manifest).await?;

    tracing::info!(
        count = manifest.count,
        dimension = manifest.dimension,
        generation = %manifest.generation,
        "📦 Published vector index for {}",
        snapshot.date
    );
    Ok(manifest)
}

pub async fn load_snapshot(store: &dyn ObjectStore, date: NaiveDate) -> Result<VectorIndexSnapshot> {
    let manifest: IndexManifest = get_json(store, &index_manifest_key(date)).await?;
    let keys = IndexKeys::for_generation(date, &manifest.generation);
    let vectors: Vec<Vec<f32>> = get_json(store, &keys.vectors).await?;
    let metadata: Vec<LabeledArticle> = get_json(store, &keys.metadata).await?;

    if vectors.len() != manifest.count || metadata.len() != manifest.count {
        return Err(Error::Storage(format!(
            "index {} is inconsistent: manifest says {}, found {} vectors and {} records",
            date,
            manifest.count,
            vectors.len(),
            metadata.len()
        )));
    }

    let snapshot = VectorIndexSnapshot::new(date, vectors, metadata)?;
    if snapshot.dimension() != manifest.dimension {
        return Err(Error::Storage(format!(
            "index {} has dimension {}, manifest says {}",
            date,
            snapshot.dimension(),
            manifest.dimension
        )));
    }
    Ok(snapshot)
}

/// Most recent published snapshot, checking `today` and up to `lookback_days - 1` days before it.
pub async fn load_latest_snapshot(
    store: &dyn ObjectStore,
    today: NaiveDate,
    lookback_days: u32,
) -> Option<VectorIndexSnapshot> {
    find_latest(today, lookback_days, |date| load_snapshot(store, date))
        .await
        .map(|(_, snapshot)| snapshot)
}
