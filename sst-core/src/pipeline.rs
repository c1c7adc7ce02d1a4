//! # Pipeline de Featurização
//!
//! Junta os recursos lexicais e o alfabeto de features em um único objeto:
//!
//! 1. Na fase de treino, cada sentença featurizada registra nomes novos no
//!    alfabeto.
//! 2. [`FeaturePipeline::freeze`] fecha o vocabulário (aplicando o corte de
//!    frequência, se houver).
//! 3. Depois disso, features que não estão no alfabeto são descartadas
//!    silenciosamente.

use std::fs;
use std::path::Path;

use crate::alphabet::SymbolTable;
use crate::config::FeatureOptions;
use crate::errors::{Result, SstError};
use crate::extractor::{FeatureOrders, LabelSource};
use crate::features::FeatureVector;
use crate::model::LexicalResources;
use crate::sentence::Sentence;

/// Recursos lexicais + alfabeto de features compartilhado entre sentenças.
#[derive(Debug, Default)]
pub struct FeaturePipeline {
    resources: LexicalResources,
    alphabet: SymbolTable,
}

impl FeaturePipeline {
    pub fn new(resources: LexicalResources) -> Self {
        Self::with_alphabet(resources, SymbolTable::new())
    }

    /// Usa um alfabeto existente (ex: carregado de disco, ou com corte de frequência).
    pub fn with_alphabet(resources: LexicalResources, alphabet: SymbolTable) -> Self {
        Self { resources, alphabet }
    }

    /// Pipeline com recursos carregados sob demanda a partir de `options`.
    pub fn from_options(options: FeatureOptions) -> Self {
        Self::new(LexicalResources::new(options))
    }

    /// Carrega os recursos que ainda não estão em memória.
    pub fn preload(&self) -> Result<()> {
        self.resources.extractor().map(|_| ())
    }

    /// Features de todos os tokens da sentença (ordens zero e um).
    pub fn featurize(&mut self, sentence: &mut Sentence, labels: LabelSource) -> Result<Vec<FeatureVector>> {
        self.featurize_with_orders(sentence, labels, FeatureOrders::ALL)
    }

    pub fn featurize_with_orders(
        &mut self,
        sentence: &mut Sentence,
        labels: LabelSource,
        orders: FeatureOrders,
    ) -> Result<Vec<FeatureVector>> {
        let extractor = self.resources.extractor()?;
        Ok(extractor.extract_all(sentence, labels, orders, &mut self.alphabet))
    }

    /// Fecha o vocabulário de features.
    pub fn freeze(&mut self) {
        self.alphabet.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.alphabet.is_frozen()
    }

    pub fn resources(&self) -> &LexicalResources {
        &self.resources
    }

    pub fn alphabet(&self) -> &SymbolTable {
        &self.alphabet
    }

    /// Grava o alfabeto em JSON.
    pub fn save_alphabet(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.alphabet.to_json()?).map_err(|source| SstError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), features = self.alphabet.len(), "alphabet saved");
        Ok(())
    }

    /// Substitui o alfabeto pelo gravado em `path`.
    pub fn load_alphabet(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SstError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.alphabet = SymbolTable::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            features = self.alphabet.len(),
            frozen = self.alphabet.is_frozen(),
            "alphabet loaded"
        );
        Ok(())
    }

    /// Carrega o alfabeto de `path` e o congela, aplicando o corte pendente.
    /// Daí em diante a featurização não registra nomes novos.
    pub fn load_frozen_alphabet(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_alphabet(path)?;
        self.freeze();
        Ok(())
    }
}
