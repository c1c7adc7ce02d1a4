//! # Tokens e Sentenças Anotadas
//!
//! O etiquetador de supersentidos recebe sentenças já processadas: cada token
//! traz o texto original, o radical (stem), a etiqueta morfossintática (POS, no
//! conjunto Penn Treebank) e uma classe de forma ortográfica. A sentença guarda
//! ainda o cache da linha de base de sentido mais frequente, calculado uma vez
//! por sentença na primeira extração de features.

use serde::{Deserialize, Serialize};

use crate::tagger::Tag;

/// Um token de uma sentença anotada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Texto original (ex: "Banks").
    pub text: String,
    /// Forma normalizada (ex: "bank").
    pub stem: String,
    /// Etiqueta POS (ex: "NNS").
    pub pos: String,
    /// Classe ortográfica (ex: "Xx").
    pub shape: String,
    /// Rótulo de referência, quando a sentença vem de um corpus anotado.
    #[serde(default)]
    pub gold: Option<String>,
    /// Rótulo previsto pelo etiquetador.
    #[serde(default)]
    pub prediction: Option<String>,
}

impl Token {
    /// Cria um token calculando a forma a partir do texto.
    pub fn new(text: impl Into<String>, stem: impl Into<String>, pos: impl Into<String>) -> Self {
        let text = text.into();
        let shape = word_shape(&text);
        Self {
            text,
            stem: stem.into(),
            pos: pos.into(),
            shape,
            gold: None,
            prediction: None,
        }
    }

    pub fn with_gold(mut self, label: impl Into<String>) -> Self {
        self.gold = Some(label.into());
        self
    }

    /// Primeira letra da etiqueta POS, usada na consulta ao léxico de sentidos.
    pub fn pos_initial(&self) -> Option<char> {
        self.pos.chars().next()
    }
}

/// Uma sentença: tokens em ordem e o cache da linha de base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[serde(skip)]
    first_senses: Option<Vec<Tag>>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            first_senses: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rótulos da linha de base em cache, se ainda válidos para o tamanho atual.
    pub fn first_senses(&self) -> Option<&[Tag]> {
        self.first_senses
            .as_deref()
            .filter(|labels| labels.len() == self.tokens.len())
    }

    pub(crate) fn set_first_senses(&mut self, labels: Vec<Tag>) {
        debug_assert_eq!(labels.len(), self.tokens.len());
        self.first_senses = Some(labels);
    }
}

impl std::ops::Index<usize> for Sentence {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

/// Classe ortográfica compacta de uma palavra.
///
/// Maiúsculas viram `X`, minúsculas `x`, dígitos `d`; outros caracteres são
/// mantidos. Sequências repetidas da mesma classe colapsam em um símbolo:
/// "Banks" → "Xx", "1990s" → "dx", "U.S." → "X.X.".
pub fn word_shape(text: &str) -> String {
    let mut shape = String::new();
    let mut last = None;
    for c in text.chars() {
        let class = if c.is_uppercase() {
            'X'
        } else if c.is_lowercase() {
            'x'
        } else if c.is_numeric() {
            'd'
        } else {
            c
        };
        if last != Some(class) {
            shape.push(class);
            last = Some(class);
        }
    }
    shape
}
