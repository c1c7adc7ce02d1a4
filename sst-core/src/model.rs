//! # Recursos Lexicais
//!
//! [`LexicalResources`] é o dono dos recursos compartilhados pela extração de
//! features: o léxico de sentidos e, quando habilitados, os clusters de
//! palavras. Cada recurso é carregado do disco uma única vez, no primeiro
//! acesso, e depois disso é somente leitura.
//!
//! Para testes (ou para embutir dados já em memória), use
//! [`LexicalResources::from_parts`], que dispensa qualquer E/S.

use std::sync::OnceLock;

use crate::clusters::WordClusters;
use crate::config::FeatureOptions;
use crate::errors::Result;
use crate::extractor::FeatureExtractor;
use crate::lexicon::SenseLexicon;

/// Léxico e clusters, carregados sob demanda a partir de [`FeatureOptions`].
#[derive(Debug, Default)]
pub struct LexicalResources {
    options: FeatureOptions,
    lexicon: OnceLock<SenseLexicon>,
    clusters: OnceLock<Option<WordClusters>>,
}

impl LexicalResources {
    /// Cria o contêiner sem tocar no disco.
    pub fn new(options: FeatureOptions) -> Self {
        Self {
            options,
            lexicon: OnceLock::new(),
            clusters: OnceLock::new(),
        }
    }

    /// Cria o contêiner com recursos já construídos.
    pub fn from_parts(options: FeatureOptions, lexicon: SenseLexicon, clusters: Option<WordClusters>) -> Self {
        Self {
            options,
            lexicon: OnceLock::from(lexicon),
            clusters: OnceLock::from(clusters),
        }
    }

    pub fn options(&self) -> &FeatureOptions {
        &self.options
    }

    /// Léxico de sentidos; carrega os dicionários no primeiro acesso.
    pub fn lexicon(&self) -> Result<&SenseLexicon> {
        if let Some(lexicon) = self.lexicon.get() {
            return Ok(lexicon);
        }
        let loaded = SenseLexicon::load(&self.options)?;
        Ok(self.lexicon.get_or_init(|| loaded))
    }

    /// Clusters de palavras, ou `None` se as features de cluster estiverem desligadas.
    pub fn clusters(&self) -> Result<Option<&WordClusters>> {
        if let Some(clusters) = self.clusters.get() {
            return Ok(clusters.as_ref());
        }
        let loaded = if self.options.use_cluster_features {
            Some(WordClusters::load(&self.options.cluster_file)?)
        } else {
            None
        };
        Ok(self.clusters.get_or_init(|| loaded).as_ref())
    }

    /// Extrator ligado a estes recursos, carregando o que faltar.
    pub fn extractor(&self) -> Result<FeatureExtractor<'_>> {
        Ok(FeatureExtractor::new(&self.options, self.lexicon()?, self.clusters()?))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::errors::SstError;
    use crate::io::tests::write_gzip;

    fn options_in(dir: &Path) -> FeatureOptions {
        FeatureOptions::default().with_base_dir(dir)
    }

    #[test]
    fn test_from_parts_needs_no_files() {
        let mut lexicon = SenseLexicon::new();
        lexicon.add_most_frequent_sense(&["bank".to_string()], 'N', "artifact", 1);
        let resources = LexicalResources::from_parts(options_in(Path::new("/nonexistent")), lexicon, None);

        assert_eq!(resources.lexicon().unwrap().len(), 1);
        assert!(resources.clusters().unwrap().is_none());
        assert!(resources.extractor().is_ok());
    }

    #[test]
    fn test_missing_dictionary_is_an_open_error() {
        let resources = LexicalResources::new(options_in(Path::new("/nonexistent")));
        assert!(matches!(resources.lexicon(), Err(SstError::Open { .. })));
        assert!(resources.extractor().is_err());
    }

    #[test]
    fn test_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data/oldgaz");
        std::fs::create_dir_all(&data).unwrap();
        write_gzip(&data.join("NOUNS_WS_SS_P.gz"), "bank 1 artifact 2 3\n");
        write_gzip(&data.join("VERBS_WS_SS.gz"), "run 1 motion\n");

        let resources = LexicalResources::new(options_in(dir.path()));
        let first = resources.lexicon().unwrap();
        assert_eq!(first.len(), 2);

        // os arquivos somem, mas o léxico já está em memória
        drop(dir);
        let second = resources.lexicon().unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_clusters_disabled_skip_the_file() {
        let resources = LexicalResources::from_parts(
            options_in(Path::new("/nonexistent")),
            SenseLexicon::new(),
            None,
        );
        assert!(resources.clusters().unwrap().is_none());

        let enabled = FeatureOptions {
            use_cluster_features: true,
            ..options_in(Path::new("/nonexistent"))
        };
        let resources = LexicalResources::new(enabled);
        assert!(matches!(resources.clusters(), Err(SstError::Open { .. })));
    }
}
