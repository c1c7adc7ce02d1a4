//! # Clusters de Palavras
//!
//! Tabela palavra → identificador de cluster (ex: clusters de Brown), carregada
//! de um arquivo gzip em que cada linha lista as palavras de um cluster; o
//! identificador é o número da linha, a partir de 0.
//!
//! A consulta ignora maiúsculas/minúsculas. Palavras desconhecidas recebem o
//! sentinela [`ClusterId::Unknown`], renderizado como `UNK`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::errors::Result;
use crate::io::read_gzip_lines;

/// Identificador de cluster de uma palavra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterId {
    Known(usize),
    Unknown,
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterId::Known(id) => write!(f, "C{id}"),
            ClusterId::Unknown => f.write_str("UNK"),
        }
    }
}

/// Tabela de clusters, somente leitura depois de carregada.
#[derive(Debug, Clone, Default)]
pub struct WordClusters {
    map: HashMap<String, usize>,
}

impl WordClusters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega o arquivo de clusters (gzip, um cluster por linha).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading word cluster information");
        let mut clusters = Self::new();
        for (line_no, line) in read_gzip_lines(path)?.enumerate() {
            let line = line?;
            clusters.add_cluster(line_no, line.split_whitespace());
        }
        tracing::info!(words = clusters.len(), "word clusters loaded");
        Ok(clusters)
    }

    /// Associa todas as `words` ao cluster `id`. Uma palavra repetida fica com o último cluster.
    pub fn add_cluster<'w>(&mut self, id: usize, words: impl IntoIterator<Item = &'w str>) {
        for word in words {
            self.map.insert(word.to_lowercase(), id);
        }
    }

    pub fn cluster_id(&self, word: &str) -> ClusterId {
        self.map
            .get(&word.to_lowercase())
            .map_or(ClusterId::Unknown, |&id| ClusterId::Known(id))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::tests::write_gzip;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut clusters = WordClusters::new();
        clusters.add_cluster(0, ["dog", "cat"]);
        clusters.add_cluster(1, ["Paris"]);

        assert_eq!(clusters.cluster_id("DOG"), ClusterId::Known(0));
        assert_eq!(clusters.cluster_id("paris"), ClusterId::Known(1));
        assert_eq!(clusters.cluster_id("zebra"), ClusterId::Unknown);
        assert_eq!(clusters.cluster_id("Paris").to_string(), "C1");
        assert_eq!(ClusterId::Unknown.to_string(), "UNK");
    }

    #[test]
    fn test_load_uses_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clusters.gz");
        write_gzip(&path, "the a an\ndog cat\n\nrun walk\n");

        let clusters = WordClusters::load(&path).unwrap();
        assert_eq!(clusters.cluster_id("an"), ClusterId::Known(0));
        assert_eq!(clusters.cluster_id("cat"), ClusterId::Known(1));
        // a linha vazia também conta
        assert_eq!(clusters.cluster_id("walk"), ClusterId::Known(3));
        assert_eq!(clusters.len(), 7);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = WordClusters::load("/nonexistent/clusters.gz").unwrap_err();
        assert!(matches!(err, crate::errors::SstError::Open { .. }));
    }
}
