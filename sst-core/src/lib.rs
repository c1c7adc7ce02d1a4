//! # sst-core — Extração de Features para Etiquetagem de Supersentidos
//!
//! Este crate implementa a camada de features de um etiquetador de
//! supersentidos (Ciaramita & Altun, 2006): para cada token de uma sentença já
//! anotada com radical e POS, produz um vetor esparso de features binárias que
//! alimenta um etiquetador sequencial com rótulos BIO (`B-artifact`, `I-motion`, `O`).
//!
//! ## Arquitetura
//!
//! 1.  **Recursos** ([`model`]): léxico de sentidos ([`lexicon`]) e clusters de
//!     palavras ([`clusters`]), carregados uma única vez a partir de arquivos gzip.
//! 2.  **Linha de base** ([`lexicon`]): segmentação gulosa da sentença pelo
//!     sentido mais frequente de cada expressão, via trie de prefixos ([`trie`]).
//! 3.  **Templates** ([`extractor`]): janela de contexto, bigramas, vizinhos por
//!     classe gramatical, capitalização, afixos, clusters e rótulo anterior.
//! 4.  **Alfabeto** ([`alphabet`]): nomes de features → índices; congelado antes
//!     da etiquetagem.
//! 5.  **Saída** ([`features`]): um [`FeatureVector`] por token.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use sst_core::{
//!     FeatureOptions, FeaturePipeline, LabelSource, LexicalResources, Sentence, SenseLexicon, Token,
//! };
//!
//! let mut lexicon = SenseLexicon::new();
//! lexicon.add_most_frequent_sense(&["bank".to_string()], 'N', "artifact", 1);
//! let resources = LexicalResources::from_parts(FeatureOptions::default(), lexicon, None);
//! let mut pipeline = FeaturePipeline::new(resources);
//!
//! let mut sentence = Sentence::new(vec![
//!     Token::new("the", "the", "DT"),
//!     Token::new("bank", "bank", "NN"),
//! ]);
//! let vectors = pipeline.featurize(&mut sentence, LabelSource::Predicted).unwrap();
//!
//! let names = vectors[1].names(pipeline.alphabet());
//! assert!(names.contains("firstSense=B-artifact"));
//! assert!(names.contains("stem@-1=the"));
//! ```

pub mod alphabet;
pub mod clusters;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod features;
mod io;
pub mod lexicon;
pub mod model;
pub mod pipeline;
pub mod sentence;
pub mod tagger;
pub mod trie;

pub use alphabet::SymbolTable;
pub use clusters::{ClusterId, WordClusters};
pub use config::{FeatureOptions, SenseDataFormat};
pub use errors::{Result, SstError};
pub use extractor::{FeatureExtractor, FeatureOrders, LabelSource};
pub use features::FeatureVector;
pub use lexicon::{SenseLexicon, SenseMatch};
pub use model::LexicalResources;
pub use pipeline::FeaturePipeline;
pub use sentence::{Sentence, Token};
pub use tagger::Tag;
pub use trie::PrefixTrie;
