//! # Alfabeto de Features (Tabela de Símbolos)
//!
//! Atribui identificadores inteiros estáveis aos nomes de features. Durante a
//! varredura do corpus de treino o alfabeto cresce livremente; antes da
//! etiquetagem ele é **congelado**, e nomes desconhecidos passam a ser rejeitados.
//!
//! ## Corte por frequência
//!
//! Com um `cutoff` configurado, cada chamada a [`SymbolTable::add`] conta uma
//! ocorrência. Em [`SymbolTable::freeze`], símbolos com contagem abaixo do corte
//! são descartados e os sobreviventes são reindexados `0..N`, mantendo a ordem
//! relativa de inserção.

use std::collections::HashMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SstError};

/// Mapeamento bidirecional nome de feature ↔ índice.
///
/// Toda desserialização passa por [`RawSymbolTable`], que reconstrói o mapa
/// nome → índice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawSymbolTable")]
pub struct SymbolTable {
    strings: Vec<String>,
    #[serde(skip)]
    indices: HashMap<String, usize>,
    frozen: bool,
    cutoff: Option<usize>,
    /// Contagem por índice; existe apenas antes do primeiro congelamento com corte.
    counts: Option<Vec<usize>>,
}

/// Forma serializada de [`SymbolTable`], sem o índice reverso.
#[derive(Deserialize)]
struct RawSymbolTable {
    strings: Vec<String>,
    #[serde(default)]
    frozen: bool,
    #[serde(default)]
    cutoff: Option<usize>,
    #[serde(default)]
    counts: Option<Vec<usize>>,
}

impl From<RawSymbolTable> for SymbolTable {
    fn from(raw: RawSymbolTable) -> Self {
        let mut table = SymbolTable {
            strings: raw.strings,
            indices: HashMap::new(),
            frozen: raw.frozen,
            cutoff: raw.cutoff,
            counts: raw.counts,
        };
        table.rebuild_indices();
        table
    }
}

impl SymbolTable {
    /// Alfabeto vazio, sem corte por frequência.
    pub fn new() -> Self {
        Self::default()
    }

    /// Alfabeto vazio que, ao congelar, descarta símbolos vistos menos de `cutoff` vezes.
    pub fn with_cutoff(cutoff: usize) -> Self {
        Self {
            cutoff: Some(cutoff),
            counts: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Registra `s` (idempotente) e conta uma ocorrência quando há corte configurado.
    ///
    /// Falha com [`SstError::FrozenVocabulary`] se `s` é novo e o alfabeto está congelado.
    pub fn add(&mut self, s: &str) -> Result<()> {
        self.setdefault(s).map(|_| ())
    }

    /// Como [`add`](Self::add), devolvendo o índice de `s`.
    pub fn setdefault(&mut self, s: &str) -> Result<usize> {
        let index = match self.indices.get(s) {
            Some(&index) => index,
            None => {
                if self.frozen {
                    return Err(SstError::FrozenVocabulary(s.to_string()));
                }
                let index = self.strings.len();
                self.strings.push(s.to_string());
                self.indices.insert(s.to_string(), index);
                index
            }
        };
        if !self.frozen {
            if let Some(counts) = self.counts.as_mut() {
                if counts.len() <= index {
                    counts.resize(index + 1, 0);
                }
                counts[index] += 1;
            }
        }
        Ok(index)
    }

    /// Força a contagem de um símbolo existente, ignorando as chamadas a `add`.
    ///
    /// Útil para garantir que um símbolo sobreviva ao corte. Sem corte configurado
    /// (ou depois do congelamento) não há contagens e a chamada não tem efeito.
    pub fn set_count(&mut self, s: &str, n: usize) -> Result<()> {
        let index = self
            .index_of(s)
            .ok_or_else(|| SstError::UnknownSymbol(s.to_string()))?;
        self.set_count_at(index, n)
    }

    /// Variante de [`set_count`](Self::set_count) por índice bruto.
    pub fn set_count_at(&mut self, index: usize, n: usize) -> Result<()> {
        if index >= self.strings.len() {
            return Err(SstError::UnknownSymbol(format!("#{index}")));
        }
        if let Some(counts) = self.counts.as_mut() {
            if counts.len() <= index {
                counts.resize(index + 1, 0);
            }
            counts[index] = n;
        }
        Ok(())
    }

    /// Trava o alfabeto, aplicando antes o corte por frequência (se houver).
    ///
    /// As contagens são descartadas: um novo ciclo `unfreeze`/`freeze` não
    /// filtra de novo.
    pub fn freeze(&mut self) {
        if let (Some(cutoff), Some(counts)) = (self.cutoff, self.counts.take()) {
            let before = self.strings.len();
            self.strings = std::mem::take(&mut self.strings)
                .into_iter()
                .enumerate()
                .filter(|(i, _)| counts.get(*i).copied().unwrap_or(0) >= cutoff)
                .map(|(_, s)| s)
                .collect();
            self.rebuild_indices();
            tracing::debug!(
                cutoff,
                kept = self.strings.len(),
                dropped = before - self.strings.len(),
                "symbol table cutoff applied"
            );
        }
        self.frozen = true;
    }

    /// Reabre o alfabeto para novas inserções. Não restaura símbolos filtrados.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Nome associado ao índice, se existir.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Índice associado ao nome, se existir.
    pub fn index_of(&self, s: &str) -> Option<usize> {
        self.indices.get(s).copied()
    }

    pub fn contains(&self, s: &str) -> bool {
        self.indices.contains_key(s)
    }

    /// Contagem acumulada de um índice (somente antes do congelamento com corte).
    pub fn count(&self, index: usize) -> Option<usize> {
        self.counts
            .as_ref()
            .map(|counts| counts.get(index).copied().unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Todos os nomes, ordenados por índice.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Pares `(índice, nome)` em ordem de índice.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.strings.iter().map(String::as_str).enumerate()
    }

    /// Serializa o alfabeto (ex: para reutilizar o alfabeto congelado do treino na etiquetagem).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    fn rebuild_indices(&mut self) {
        self.indices = self
            .strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
    }
}

impl Index<usize> for SymbolTable {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.strings[index]
    }
}

impl Index<&str> for SymbolTable {
    type Output = usize;

    fn index(&self, s: &str) -> &usize {
        &self.indices[s]
    }
}
