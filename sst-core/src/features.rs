//! # Vetor de Features Esparso e Indexado
//!
//! Para cada token, o extrator ativa poucas dezenas de features entre centenas
//! de milhares possíveis. O [`FeatureVector`] guarda apenas os **índices** ativos
//! (resolvidos por um [`SymbolTable`] compartilhado) e, à parte, os valores que
//! diferem do valor padrão.
//!
//! ## Por que separar índices e valores?
//!
//! Quase todas as features são indicadoras binárias (valor 1). Guardar o valor
//! só quando ele foge do padrão deixa o caso comum com custo de um `usize`.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::alphabet::SymbolTable;

/// Valor implícito de toda feature ativa sem valor explícito.
pub const DEFAULT_FEATURE_VALUE: f64 = 1.0;

/// Features ativas de uma posição da sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Índices ativos, em ordem crescente.
    active: BTreeSet<usize>,
    /// Valores diferentes de `default`.
    overrides: HashMap<usize, f64>,
    default: f64,
    /// Referência ao índice do token original na sentença.
    pub token_index: usize,
}

impl FeatureVector {
    pub fn new(token_index: usize) -> Self {
        Self::with_default(token_index, DEFAULT_FEATURE_VALUE)
    }

    pub fn with_default(token_index: usize, default: f64) -> Self {
        Self {
            active: BTreeSet::new(),
            overrides: HashMap::new(),
            default,
            token_index,
        }
    }

    /// Ativa `name` com `value`, resolvendo o nome pelo alfabeto.
    ///
    /// Com o alfabeto aberto, nomes novos são registrados. Com o alfabeto
    /// congelado, nomes desconhecidos são ignorados em silêncio (features fora
    /// do vocabulário na etiquetagem não são erro). Devolve o índice usado.
    pub fn set(&mut self, table: &mut SymbolTable, name: &str, value: f64) -> Option<usize> {
        if table.is_frozen() && !table.contains(name) {
            return None;
        }
        let index = table.setdefault(name).ok()?;
        self.active.insert(index);
        if value != self.default {
            self.overrides.insert(index, value);
        } else {
            self.overrides.remove(&index);
        }
        Some(index)
    }

    /// Atalho para features indicadoras.
    pub fn activate(&mut self, table: &mut SymbolTable, name: &str) -> Option<usize> {
        self.set(table, name, self.default)
    }

    /// Pares `(índice, valor)` das features ativas, em ordem de índice.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.active.iter().map(|&i| (i, self.value_unchecked(i)))
    }

    /// Pares `(nome, valor)`, para diagnóstico.
    pub fn named_items<'t>(&'t self, table: &'t SymbolTable) -> impl Iterator<Item = (&'t str, f64)> + 't {
        self.iter()
            .filter_map(move |(i, v)| table.symbol(i).map(|name| (name, v)))
    }

    /// Nomes das features ativas. Não altera o alfabeto.
    pub fn names<'t>(&self, table: &'t SymbolTable) -> BTreeSet<&'t str> {
        self.active.iter().filter_map(|&i| table.symbol(i)).collect()
    }

    /// Índices ativos.
    pub fn indices(&self) -> &BTreeSet<usize> {
        &self.active
    }

    /// Valores explícitos (apenas os diferentes do padrão).
    pub fn overrides(&self) -> &HashMap<usize, f64> {
        &self.overrides
    }

    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub fn contains(&self, index: usize) -> bool {
        self.active.contains(&index)
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.contains(index).then(|| self.value_unchecked(index))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Produto escalar com um vetor de pesos denso indexado pelo alfabeto.
    ///
    /// $$ \text{score} = \sum_i w_i \cdot f_i $$
    ///
    /// Índices além do fim de `weights` contam como peso zero.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.iter()
            .map(|(i, v)| v * weights.get(i).copied().unwrap_or(0.0))
            .sum()
    }

    fn value_unchecked(&self, index: usize) -> f64 {
        self.overrides.get(&index).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_registers_in_open_table() {
        let mut table = SymbolTable::new();
        let mut fv = FeatureVector::new(0);
        fv.activate(&mut table, "bias");
        fv.set(&mut table, "stem=dog", 1.0);

        assert_eq!(table.len(), 2);
        assert_eq!(fv.len(), 2);
        assert_eq!(fv.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_default_values_are_not_stored() {
        let mut table = SymbolTable::new();
        let mut fv = FeatureVector::new(3);
        let weighted = fv.set(&mut table, "distance", 0.5).unwrap();
        let binary = fv.set(&mut table, "bias", 1.0).unwrap();

        assert_eq!(fv.overrides().get(&weighted), Some(&0.5));
        assert!(!fv.overrides().contains_key(&binary));

        // voltar ao padrão remove o valor explícito
        fv.set(&mut table, "distance", 1.0);
        assert!(fv.overrides().is_empty());
        assert_eq!(fv.value(weighted), Some(1.0));
    }

    #[test]
    fn test_frozen_table_drops_unknown_features() {
        let mut table = SymbolTable::new();
        for s in ["a", "b", "c"] {
            table.add(s).unwrap();
        }
        table.freeze();

        let mut fv = FeatureVector::new(0);
        fv.activate(&mut table, "b");
        let before = fv.clone();

        assert_eq!(fv.set(&mut table, "d", 1.0), None);
        assert_eq!(fv, before);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_names_and_dot() {
        let mut table = SymbolTable::new();
        let mut fv = FeatureVector::new(0);
        fv.activate(&mut table, "bias");
        fv.set(&mut table, "firstSense=B-noun.person", 2.0);

        let names = fv.names(&table);
        assert!(names.contains("bias"));
        assert!(names.contains("firstSense=B-noun.person"));
        assert_eq!(
            fv.named_items(&table).collect::<Vec<_>>(),
            vec![("bias", 1.0), ("firstSense=B-noun.person", 2.0)]
        );

        // pesos: bias=0.5, firstSense=0.25 → 0.5*1 + 0.25*2
        assert_eq!(fv.dot(&[0.5, 0.25]), 1.0);
        assert_eq!(fv.dot(&[0.5]), 0.5);
    }
}
