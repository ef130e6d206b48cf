// Pairwise similarity over the whole corpus
use crate::embedding::{dot, Embedding};
use crate::errors::{NewsdeskError, Result};

/// Square, symmetric similarity matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build from explicit rows; every row must have one entry per row
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(NewsdeskError::EncodingError(format!(
                "similarity row {} has {} entries, expected {}",
                i,
                row.len(),
                size
            )));
        }
        Ok(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Fill the upper triangle with `f` and mirror it; diagonal is 1.0
    fn symmetric(size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut values = vec![0.0f32; size * size];
        for i in 0..size {
            values[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let v = f(i, j).clamp(-1.0, 1.0);
                values[i * size + j] = v;
                values[j * size + i] = v;
            }
        }
        Self { size, values }
    }

    /// Number of documents covered
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Similarity between documents `i` and `j`
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size + j]
    }

    /// Similarities of document `i` against every document
    pub fn row(&self, i: usize) -> &[f32] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

fn check_rows(name: &str, embeddings: &[Embedding], expected: usize) -> Result<()> {
    if embeddings.len() != expected {
        return Err(NewsdeskError::EncodingError(format!(
            "{} embeddings cover {} documents, expected {}",
            name,
            embeddings.len(),
            expected
        )));
    }
    if let Some(first) = embeddings.first() {
        if embeddings.iter().any(|e| e.len() != first.len()) {
            return Err(NewsdeskError::EncodingError(format!(
                "{} embeddings have inconsistent dimensions",
                name
            )));
        }
    }
    Ok(())
}

/// Dot-product similarity of every pair of unit vectors
pub fn pairwise_similarity(embeddings: &[Embedding]) -> Result<SimilarityMatrix> {
    check_rows("input", embeddings, embeddings.len())?;
    Ok(SimilarityMatrix::symmetric(embeddings.len(), |i, j| {
        dot(&embeddings[i], &embeddings[j])
    }))
}

/// Combined title/body similarity
///
/// A pair takes the larger of its title and body similarity only when both
/// documents have body text; otherwise the title similarity alone is used.
pub fn combined_similarity(
    titles: &[Embedding],
    bodies: &[Embedding],
    has_content: &[bool],
) -> Result<SimilarityMatrix> {
    let n = has_content.len();
    check_rows("title", titles, n)?;
    check_rows("body", bodies, n)?;

    Ok(SimilarityMatrix::symmetric(n, |i, j| {
        let title_sim = dot(&titles[i], &titles[j]);
        if has_content[i] && has_content[j] {
            title_sim.max(dot(&bodies[i], &bodies[j]))
        } else {
            title_sim
        }
    }))
}
