//! # Esquema de Tags BIO para Supersentidos
//!
//! Os rótulos previstos pelo etiquetador externo (e pela linha de base de
//! sentido mais frequente) seguem o esquema **BIO** sobre categorias de
//! supersentido como `noun.person`, `verb.motion` ou `artifact`.
//!
//! ## Esquema BIO
//!
//! - `B-X`: Begin — primeiro token de uma expressão com supersentido X
//! - `I-X`: Inside — tokens seguintes da mesma expressão
//! - `O`: Outside — token sem supersentido
//!
//! Diferente de um NER com categorias fixas, o inventário de supersentidos vem
//! dos dicionários carregados em tempo de execução, por isso a categoria é uma
//! `String`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Início de uma expressão. Ex: **go** (B-motion) out.
    Begin(String),
    /// Continuação de uma expressão. Ex: go **out** (I-motion).
    Inside(String),
    /// O token não recebe supersentido.
    Outside,
}

impl Tag {
    /// Representação textual (ex: "B-motion", "I-motion", "O").
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Verifica se a transição `prev → next` é válida no esquema BIO.
    ///
    /// `I-X` só pode seguir `B-X` ou `I-X`; `B-X` e `O` podem seguir qualquer tag.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(sense) => match prev {
                Tag::Begin(prev_sense) | Tag::Inside(prev_sense) => prev_sense == sense,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Verifica uma sequência inteira: além das transições, a primeira tag não pode ser `I-`.
    pub fn is_valid_sequence(tags: &[Tag]) -> bool {
        if matches!(tags.first(), Some(Tag::Inside(_))) {
            return false;
        }
        tags.windows(2)
            .all(|pair| Tag::is_valid_transition(&pair[0], &pair[1]))
    }

    /// Parseia uma tag a partir de string (ex: "B-motion" → Begin("motion")).
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, sense) = s.split_once('-')?;
        if sense.is_empty() {
            return None;
        }
        match prefix {
            "B" => Some(Tag::Begin(sense.to_string())),
            "I" => Some(Tag::Inside(sense.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Begin(sense) => write!(f, "B-{sense}"),
            Tag::Inside(sense) => write!(f, "I-{sense}"),
            Tag::Outside => f.write_str("O"),
        }
    }
}
