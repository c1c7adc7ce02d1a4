//! # Configuração da Extração de Features
//!
//! Reúne as chaves que ligam/desligam cada template de features e os caminhos
//! dos arquivos de dados (dicionários de sentidos, gazetteer e clusters).
//!
//! ## Formato JSON
//!
//! Todas as chaves são opcionais; as ausentes assumem os valores padrão:
//!
//! ```json
//! {
//!   "use_prefix_and_suffix_features": false,
//!   "use_cluster_features": false,
//!   "use_bigram_features": true,
//!   "use_pos_neighbor_features": true,
//!   "use_prev_label": true,
//!   "sense_data_format": "original",
//!   "noun_file": "data/oldgaz/NOUNS_WS_SS_P.gz",
//!   "verb_file": "data/oldgaz/VERBS_WS_SS.gz",
//!   "possible_senses_file": "data/gaz/possibleSuperSenses.GAZ.gz",
//!   "cluster_file": "data/clusters/clusters_1024_49.gz"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SstError};

/// Formato em disco dos dicionários de sentidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenseDataFormat {
    /// Release original do SST: colunas separadas por espaço, com o sentido
    /// mais frequente na terceira coluna.
    #[default]
    Original,
    /// Formato novo: colunas separadas por TAB com subcampos `chave=valor`,
    /// mais um gazetteer separado de sentidos possíveis.
    New,
}

/// Opções consumidas pelo extrator de features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureOptions {
    /// Prefixo e sufixo de 3 caracteres do token atual.
    pub use_prefix_and_suffix_features: bool,
    /// Features de clusters de palavras (exige `cluster_file`).
    pub use_cluster_features: bool,
    /// Bigramas de observação (radical anterior/seguinte + radical atual).
    pub use_bigram_features: bool,
    /// Vizinhos de longa distância por classe gramatical grossa.
    pub use_pos_neighbor_features: bool,
    /// Features de primeira ordem (rótulo do token anterior).
    pub use_prev_label: bool,
    pub sense_data_format: SenseDataFormat,
    pub noun_file: PathBuf,
    pub verb_file: PathBuf,
    /// Usado apenas pelo formato novo.
    pub possible_senses_file: PathBuf,
    pub cluster_file: PathBuf,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            use_prefix_and_suffix_features: false,
            use_cluster_features: false,
            use_bigram_features: true,
            use_pos_neighbor_features: true,
            use_prev_label: true,
            sense_data_format: SenseDataFormat::Original,
            noun_file: PathBuf::from("data/oldgaz/NOUNS_WS_SS_P.gz"),
            verb_file: PathBuf::from("data/oldgaz/VERBS_WS_SS.gz"),
            possible_senses_file: PathBuf::from("data/gaz/possibleSuperSenses.GAZ.gz"),
            cluster_file: PathBuf::from("data/clusters/clusters_1024_49.gz"),
        }
    }
}

impl FeatureOptions {
    /// Lê as opções de um arquivo JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SstError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SstError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Indica se as features de primeira ordem estão habilitadas.
    pub fn has_first_order_features(&self) -> bool {
        self.use_prev_label
    }

    /// Resolve caminhos relativos a partir de `base` (ex: diretório do arquivo de configuração).
    pub fn with_base_dir(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        for path in [
            &mut self.noun_file,
            &mut self.verb_file,
            &mut self.possible_senses_file,
            &mut self.cluster_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let opts = FeatureOptions::default();
        assert!(!opts.use_prefix_and_suffix_features);
        assert!(!opts.use_cluster_features);
        assert!(opts.use_bigram_features);
        assert!(opts.use_pos_neighbor_features);
        assert!(opts.has_first_order_features());
        assert_eq!(opts.sense_data_format, SenseDataFormat::Original);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"use_cluster_features": true, "sense_data_format": "new", "noun_file": "n.gz"}}"#
        )
        .unwrap();

        let opts = FeatureOptions::from_json_file(file.path()).unwrap();
        assert!(opts.use_cluster_features);
        assert!(opts.use_bigram_features);
        assert_eq!(opts.sense_data_format, SenseDataFormat::New);
        assert_eq!(opts.noun_file, PathBuf::from("n.gz"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"use_trigrams": true}}"#).unwrap();
        let err = FeatureOptions::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, SstError::Config { .. }));
    }

    #[test]
    fn test_base_dir_only_touches_relative_paths() {
        let opts = FeatureOptions {
            verb_file: PathBuf::from("/abs/verbs.gz"),
            ..FeatureOptions::default()
        }
        .with_base_dir("/srv/sst");
        assert_eq!(opts.noun_file, PathBuf::from("/srv/sst/data/oldgaz/NOUNS_WS_SS_P.gz"));
        assert_eq!(opts.verb_file, PathBuf::from("/abs/verbs.gz"));
    }
}
