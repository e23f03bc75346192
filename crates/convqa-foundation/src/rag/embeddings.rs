//! Deterministic local embeddings
//!
//! A byte-histogram embedder: no model download, stable output for a given
//! text. Good enough for demos, tests and tiny corpora; plug a real
//! [`Embeddings`] implementation in for anything else.

use async_trait::async_trait;
use convqa_kernel::{ChainResult, Embeddings};

pub struct HashEmbeddings {
    dimensions: usize,
}

impl HashEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// L2-normalised byte histogram folded into `dimensions` buckets.
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimensions];
        for (i, byte) in text.to_lowercase().bytes().enumerate() {
            embedding[(i + byte as usize) % self.dimensions] += byte as f32 / 255.0;
        }
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embeddings for HashEmbeddings {
    async fn embed_query(&self, text: &str) -> ChainResult<Vec<f32>> {
        Ok(self.embed(text))
    }
}
