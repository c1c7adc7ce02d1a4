//! # Árvore de Prefixos sobre Sequências
//!
//! Mapeia sequências (ex: tuplas de radicais de uma expressão multipalavra) para
//! valores, com busca do **maior prefixo** armazenado. É a estrutura que permite
//! reconhecer "take off" antes de "take" na linha de base de sentido mais frequente.
//!
//! Valores podem ser sobrescritos; remoção não é suportada.
//!
//! ## Exemplo
//!
//! ```rust
//! use sst_core::trie::PrefixTrie;
//!
//! let mut trie = PrefixTrie::new();
//! trie.insert(&[3, 1, 4], "314");
//! trie.insert(&[3, 1, 4, 1, 5, 9], "314159");
//!
//! let (prefix, value) = trie.longest_prefix(&[3, 1, 4, 1, 5]).unwrap();
//! assert_eq!(prefix, &[3, 1, 4]);
//! assert_eq!(*value, "314");
//! ```

use std::collections::HashMap;
use std::hash::Hash;

/// Um nó da árvore. Cada nó guarda, por item, a subárvore que continua a
/// sequência e o valor das sequências que **terminam** naquele item.
#[derive(Debug, Clone)]
pub struct PrefixTrie<K: Eq + Hash, V> {
    children: HashMap<K, PrefixTrie<K, V>>,
    values: HashMap<K, V>,
}

impl<K: Eq + Hash, V> Default for PrefixTrie<K, V> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            values: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> PrefixTrie<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associa `value` à sequência `seq`, sobrescrevendo um valor anterior.
    ///
    /// # Panics
    /// Se `seq` for vazia.
    pub fn insert(&mut self, seq: &[K], value: V)
    where
        K: Clone,
    {
        let (first, rest) = seq.split_first().expect("cannot insert an empty sequence");
        if rest.is_empty() {
            self.values.insert(first.clone(), value);
        } else {
            self.children
                .entry(first.clone())
                .or_default()
                .insert(rest, value);
        }
    }

    /// Se existe valor armazenado exatamente para `seq`.
    pub fn contains(&self, seq: &[K]) -> bool {
        self.get(seq).is_some()
    }

    /// Valor associado exatamente a `seq`.
    pub fn get(&self, seq: &[K]) -> Option<&V> {
        let (first, rest) = seq.split_first()?;
        if rest.is_empty() {
            self.values.get(first)
        } else {
            self.children.get(first)?.get(rest)
        }
    }

    pub fn get_mut(&mut self, seq: &[K]) -> Option<&mut V> {
        let (first, rest) = seq.split_first()?;
        if rest.is_empty() {
            self.values.get_mut(first)
        } else {
            self.children.get_mut(first)?.get_mut(rest)
        }
    }

    /// Maior prefixo de `seq` com valor armazenado, junto com o valor.
    ///
    /// Tenta primeiro estender o casamento descendo pela subárvore do item
    /// atual; se nada mais longo casar, recua para o valor que termina no
    /// próprio item. Devolve `None` se nenhum prefixo não vazio foi inserido.
    pub fn longest_prefix<'s>(&self, seq: &'s [K]) -> Option<(&'s [K], &V)> {
        self.longest_len(seq)
            .map(|(len, value)| (&seq[..len], value))
    }

    fn longest_len(&self, seq: &[K]) -> Option<(usize, &V)> {
        let (first, rest) = seq.split_first()?;
        let longer = match self.children.get(first) {
            Some(child) if !rest.is_empty() => child.longest_len(rest),
            _ => None,
        };
        match longer {
            Some((len, value)) => Some((len + 1, value)),
            None => self.values.get(first).map(|value| (1, value)),
        }
    }

    /// Número de sequências com valor armazenado.
    pub fn len(&self) -> usize {
        self.values.len() + self.children.values().map(PrefixTrie::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.values().all(PrefixTrie::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn food_trie() -> PrefixTrie<char, String> {
        let mut trie = PrefixTrie::new();
        for word in ["panther", "panda", "pancake", "pastrami", "pastafarian", "noodles"] {
            trie.insert(&chars(word), word.to_uppercase());
        }
        trie
    }

    #[test]
    fn test_exact_lookup() {
        let trie = food_trie();
        for word in ["panther", "panda", "pancake", "pastrami", "pastafarian", "noodles"] {
            assert!(trie.contains(&chars(word)));
            assert_eq!(trie.get(&chars(word)), Some(&word.to_uppercase()));
        }
        assert!(!trie.contains(&chars("pescatarian")));
        assert_eq!(trie.get(&chars("pescatarian")), None);
        assert_eq!(trie.len(), 6);
    }

    #[test]
    fn test_intermediate_prefix_is_not_a_match() {
        let trie = food_trie();
        assert!(!trie.contains(&chars("pan")));
        assert!(trie.longest_prefix(&chars("pasta")).is_none());
    }

    #[test]
    fn test_longest_prefix() {
        let trie = food_trie();
        let word = chars("pastafarianism");
        let (prefix, value) = trie.longest_prefix(&word).unwrap();
        assert_eq!(prefix, chars("pastafarian").as_slice());
        assert_eq!(value, "PASTAFARIAN");
    }

    #[test]
    fn test_longest_prefers_longer_key() {
        let mut trie = PrefixTrie::new();
        trie.insert(&[3, 1, 4], "314");
        trie.insert(&[3, 1, 4, 1, 5, 9], "314159");
        trie.insert(&[0, 0, 3, 1, 4], "00314");

        assert_eq!(trie.longest_prefix(&[3, 1, 4]), Some((&[3, 1, 4][..], &"314")));
        assert!(!trie.contains(&[3, 1, 4, 1, 5]));
        assert_eq!(trie.get(&[3, 1, 4, 1, 5]), None);
        assert_eq!(
            trie.longest_prefix(&[3, 1, 4, 1, 5]),
            Some((&[3, 1, 4][..], &"314"))
        );
        assert_eq!(
            trie.longest_prefix(&[3, 1, 4, 1, 5, 9, 2, 6]),
            Some((&[3, 1, 4, 1, 5, 9][..], &"314159"))
        );
    }

    #[test]
    fn test_reinsert_overwrites() {
        let mut trie = PrefixTrie::new();
        trie.insert(&["go", "out"], 1);
        trie.insert(&["go", "out"], 2);
        assert_eq!(trie.get(&["go", "out"]), Some(&2));
        assert_eq!(trie.len(), 1);

        *trie.get_mut(&["go", "out"]).unwrap() += 1;
        assert_eq!(trie.get(&["go", "out"]), Some(&3));
    }

    #[test]
    fn test_empty_sequence_has_no_match() {
        let trie: PrefixTrie<&str, u8> = PrefixTrie::new();
        assert!(trie.is_empty());
        assert!(trie.longest_prefix(&[]).is_none());
        assert!(!trie.contains(&[]));
    }
}
