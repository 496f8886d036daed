use chrono::NaiveDate;

pub fn news_data_key(prefix: &str, date: NaiveDate) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("news_with_content_{}.json", date)
    } else {
        format!("{}/news_with_content_{}.json", prefix, date)
    }
}

pub fn trending_key(date: NaiveDate) -> String {
    format!("trending/{}/summary.json", date)
}

/// Publish marker of a dated index. It names the generation readers should load.
pub fn index_manifest_key(date: NaiveDate) -> String {
    format!("full_dataset/{}/manifest.json", date)
}

/// Blob names of one published generation of a dated index. Generations are
/// never overwritten, so a manifest always points at a complete pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKeys {
    pub vectors: String,
    pub metadata: String,
}

impl IndexKeys {
    pub fn for_generation(date: NaiveDate, generation: &str) -> Self {
        let dir = format!("full_dataset/{}/{}", date, generation);
        Self {
            vectors: format!("{}/vectors.json", dir),
            metadata: format!("{}/metadata.json", dir),
        }
    }
}
