//! # Templates de Features para Supersentidos
//!
//! Para cada token de uma sentença, gera o conjunto de features consumido pelo
//! etiquetador sequencial, seguindo Ciaramita & Altun (2006):
//!
//! ### Primeira ordem
//! - Rótulo do token anterior (previsto ou de referência)
//!
//! ### Token atual
//! - Viés (`bias`)
//! - Sentido mais frequente (linha de base), sozinho e combinado com o radical
//! - Cluster da palavra (opcional)
//! - Capitalização: minúscula / maiúscula no início da frase / maiúscula no meio
//! - Prefixo e sufixo de 3 caracteres (opcional)
//!
//! ### Contexto
//! - Janela de ±2 tokens: radical, POS, POS grossa, cluster, forma
//! - Bigramas de radicais com os vizinhos imediatos (opcional)
//! - Vizinho mais próximo de cada classe gramatical grossa compatível, à
//!   esquerda e à direita, com distância discretizada (opcional)
//!
//! Os nomes de features separam os componentes com TAB.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::alphabet::SymbolTable;
use crate::clusters::{ClusterId, WordClusters};
use crate::config::FeatureOptions;
use crate::features::FeatureVector;
use crate::lexicon::{SenseLexicon, UNKNOWN_POS};
use crate::sentence::Sentence;
use crate::tagger::Tag;

/// Classes grossas candidatas a vizinho, na ordem em que são avaliadas.
const NEIGHBOR_TAGS: [char; 12] = ['V', 'N', '^', 'I', 'T', 'P', 'J', 'R', 'D', 'M', '#', '&'];

/// Pares não ordenados {POS do token atual, POS do vizinho} que geram features.
const NEIGHBOR_PAIRS: [(char, char); 17] = [
    ('V', 'V'),
    ('V', 'N'),
    ('V', 'R'),
    ('V', 'T'),
    ('V', 'M'),
    ('V', 'P'),
    ('J', 'N'),
    ('N', 'N'),
    ('D', 'N'),
    ('D', '^'),
    ('N', '^'),
    ('^', '^'),
    ('R', 'J'),
    ('N', '&'),
    ('^', '&'),
    ('V', 'I'),
    ('I', 'N'),
];

/// Alcance da janela posicional, para cada lado.
const WINDOW: usize = 2;

/// Reduz uma etiqueta Penn Treebank a uma classe de um caractere.
///
/// `TO` → `I`, `NNP*` → `^`, `CC` → `&`, `CD` → `#`, `RP` → `T`; nos demais
/// casos, a primeira letra da etiqueta.
pub fn coarsen(pos: &str) -> char {
    match pos {
        "TO" => 'I',
        "CC" => '&',
        "CD" => '#',
        "RP" => 'T',
        _ if pos.starts_with("NNP") => '^',
        _ => pos.chars().next().unwrap_or(UNKNOWN_POS),
    }
}

fn is_neighbor_pair(a: char, b: char) -> bool {
    NEIGHBOR_PAIRS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Discretiza a distância até um vizinho: até 5 fica como está, de 6 a 9 vira
/// ±6 e a partir de 10 é truncada (em direção a zero) para múltiplo de 10.
pub fn bucket_distance(distance: isize) -> isize {
    let magnitude = distance.abs();
    if magnitude <= 5 {
        distance
    } else if magnitude < 10 {
        6 * distance.signum()
    } else {
        distance / 10 * 10
    }
}

/// De onde vem o rótulo do token anterior nas features de primeira ordem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    /// Rótulo previsto pelo etiquetador (decodificação).
    #[default]
    Predicted,
    /// Rótulo de referência (treino).
    Gold,
}

/// Ordens de features a extrair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOrders {
    /// Features de observação (ordem zero).
    pub zeroth: bool,
    /// Features de transição de rótulos (primeira ordem).
    pub first: bool,
}

impl FeatureOrders {
    pub const ALL: FeatureOrders = FeatureOrders { zeroth: true, first: true };
    pub const ZEROTH: FeatureOrders = FeatureOrders { zeroth: true, first: false };
    pub const FIRST: FeatureOrders = FeatureOrders { zeroth: false, first: true };
}

impl Default for FeatureOrders {
    fn default() -> Self {
        Self::ALL
    }
}

/// Acumula as features de um token, resolvendo nomes pelo alfabeto.
struct Emitter<'t> {
    table: &'t mut SymbolTable,
    vector: FeatureVector,
}

impl Emitter<'_> {
    fn emit(&mut self, name: impl AsRef<str>) {
        self.vector.activate(self.table, name.as_ref());
    }
}

/// Extrator de features. Só lê os recursos; o estado mutável é o alfabeto e o
/// cache de linha de base de cada sentença.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'r> {
    options: &'r FeatureOptions,
    lexicon: &'r SenseLexicon,
    clusters: Option<&'r WordClusters>,
}

impl<'r> FeatureExtractor<'r> {
    pub fn new(
        options: &'r FeatureOptions,
        lexicon: &'r SenseLexicon,
        clusters: Option<&'r WordClusters>,
    ) -> Self {
        Self {
            options,
            lexicon,
            clusters,
        }
    }

    pub fn options(&self) -> &FeatureOptions {
        self.options
    }

    /// Sem tabela de clusters, toda palavra cai no sentinela `UNK`.
    fn cluster_id(&self, word: &str) -> Option<ClusterId> {
        if !self.options.use_cluster_features {
            return None;
        }
        Some(
            self.clusters
                .map_or(ClusterId::Unknown, |clusters| clusters.cluster_id(word)),
        )
    }

    /// Extrai as features do token `j` de `sentence`.
    ///
    /// Na primeira chamada para a sentença, calcula e guarda em cache os rótulos
    /// da linha de base de sentido mais frequente.
    ///
    /// # Panics
    /// Se `j` estiver fora da sentença.
    pub fn extract(
        &self,
        sentence: &mut Sentence,
        j: usize,
        labels: LabelSource,
        orders: FeatureOrders,
        table: &mut SymbolTable,
    ) -> FeatureVector {
        assert!(j < sentence.len(), "token index {j} out of bounds");
        let first_sense = if orders.zeroth {
            self.lexicon
                .cached_first_sense_labels(sentence)
                .get(j)
                .map_or_else(|| Tag::Outside.label(), Tag::label)
        } else {
            String::new()
        };
        let sentence: &Sentence = sentence;

        let mut out = Emitter {
            table,
            vector: FeatureVector::new(j),
        };

        if orders.first && self.options.has_first_order_features() && j > 0 {
            let prev = &sentence[j - 1];
            let label = match labels {
                LabelSource::Predicted => prev.prediction.as_deref(),
                LabelSource::Gold => prev.gold.as_deref(),
            };
            out.emit(format!("prevLabel={}", label.unwrap_or("O")));
        }

        if orders.zeroth {
            self.zeroth_order(sentence, j, &first_sense, &mut out);
        }

        out.vector
    }

    /// Extrai as features de todas as posições da sentença.
    pub fn extract_all(
        &self,
        sentence: &mut Sentence,
        labels: LabelSource,
        orders: FeatureOrders,
        table: &mut SymbolTable,
    ) -> Vec<FeatureVector> {
        (0..sentence.len())
            .map(|j| self.extract(sentence, j, labels, orders, table))
            .collect()
    }

    fn zeroth_order(&self, sentence: &Sentence, j: usize, first_sense: &str, out: &mut Emitter<'_>) {
        let n = sentence.len();
        let cur = &sentence[j];

        out.emit("bias");

        out.emit(format!("firstSense={first_sense}"));
        out.emit(format!("firstSense+curTok={first_sense}\t{}", cur.stem));

        if let Some(cluster) = self.cluster_id(&cur.text) {
            out.emit(format!("firstSense+curCluster={first_sense}\t{cluster}"));
            out.emit(format!("curCluster={cluster}"));
        }

        // bigramas de observação (não de rótulos)
        if self.options.use_bigram_features {
            if j > 0 {
                out.emit(format!("prevStem+curStem={}\t{}", sentence[j - 1].stem, cur.stem));
            }
            if j + 1 < n {
                out.emit(format!("nextStem+curStem={}\t{}", sentence[j + 1].stem, cur.stem));
            }
        }

        for k in j.saturating_sub(WINDOW)..n.min(j + WINDOW + 1) {
            let delta = if k == j {
                String::new()
            } else {
                format!("@{}", k as isize - j as isize)
            };
            let tok = &sentence[k];
            out.emit(format!("stem{delta}={}", tok.stem));
            out.emit(format!("pos{delta}={}", tok.pos));
            out.emit(format!("cpos{delta}={}", coarsen(&tok.pos)));
            if let Some(cluster) = self.cluster_id(&tok.text) {
                out.emit(format!("cluster{delta}={cluster}"));
            }
            out.emit(format!("shape{delta}={}", tok.shape));
        }

        if self.options.use_pos_neighbor_features {
            self.pos_neighbors(sentence, j, out);
        }

        let first_char = cur.text.chars().next();
        match first_char {
            Some(c) if !c.to_lowercase().eq([c]) => {
                if j == 0 {
                    out.emit("curTokUpperCaseFirstChar");
                } else {
                    out.emit("curTokUpperCaseOther");
                }
            }
            _ => out.emit("curTokLowercase"),
        }

        if self.options.use_prefix_and_suffix_features {
            let graphemes: Vec<&str> = cur.text.graphemes(true).collect();
            let prefix: String = graphemes.iter().take(3).copied().collect();
            let suffix: String = graphemes[graphemes.len().saturating_sub(3)..].concat();
            out.emit(format!("prefix={prefix}"));
            out.emit(format!("suffix={suffix}"));
        }
    }

    /// Vizinhos mais próximos por classe gramatical grossa, à esquerda (`<`) e à direita (`>`).
    fn pos_neighbors(&self, sentence: &Sentence, j: usize, out: &mut Emitter<'_>) {
        let coarse: Vec<char> = sentence.tokens.iter().map(|t| coarsen(&t.pos)).collect();
        let cur_pos = coarse[j];
        let cur_stem = &sentence[j].stem;
        let bigrams = self.options.use_bigram_features;

        for cpos in NEIGHBOR_TAGS {
            if !is_neighbor_pair(cpos, cur_pos) {
                continue;
            }

            if let Some(k) = coarse[..j].iter().rposition(|&p| p == cpos) {
                let dist = bucket_distance(k as isize - j as isize);
                let stem = &sentence[k].stem;
                out.emit(format!("{cpos}\t<-{dist}\t{cur_pos}"));
                out.emit(format!("{cpos}\t<\t{stem}\t{cur_pos}"));
                if bigrams && dist.abs() < 6 {
                    out.emit(format!("{cpos}\t<-{dist}\t{cur_stem}"));
                    out.emit(format!("{cpos}\t<\t{stem}\t{cur_stem}"));
                }
            }

            if let Some(offset) = coarse[j + 1..].iter().position(|&p| p == cpos) {
                let k = j + 1 + offset;
                let dist = bucket_distance(k as isize - j as isize);
                let stem = &sentence[k].stem;
                out.emit(format!("{cpos}\t{dist}->\t{cur_pos}"));
                out.emit(format!("{cpos}\t>\t{stem}\t{cur_pos}"));
                if bigrams && dist.abs() < 6 {
                    out.emit(format!("{cpos}\t{dist}->\t{cur_stem}"));
                    out.emit(format!("{cpos}\t>\t{stem}\t{cur_stem}"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::lexicon::{NOUN, VERB};
    use crate::sentence::Token;

    fn lexicon() -> SenseLexicon {
        let mut lex = SenseLexicon::new();
        lex.add_most_frequent_sense(&["dog".to_string()], NOUN, "animal", 1);
        lex.add_most_frequent_sense(&["run".to_string()], VERB, "motion", 3);
        lex
    }

    fn dog_sentence() -> Sentence {
        Sentence::new(vec![
            Token::new("The", "the", "DT").with_gold("O"),
            Token::new("dog", "dog", "NN").with_gold("B-animal"),
            Token::new("quickly", "quickly", "RB").with_gold("O"),
            Token::new("ran", "run", "VBD").with_gold("B-motion"),
            Token::new(".", ".", ".").with_gold("O"),
        ])
    }

    fn names(fv: &FeatureVector, table: &SymbolTable) -> BTreeSet<String> {
        fv.names(table).into_iter().map(str::to_string).collect()
    }

    #[test]
    fn test_coarsen() {
        assert_eq!(coarsen("TO"), 'I');
        assert_eq!(coarsen("NNPS"), '^');
        assert_eq!(coarsen("NNS"), 'N');
        assert_eq!(coarsen("CC"), '&');
        assert_eq!(coarsen("CD"), '#');
        assert_eq!(coarsen("RP"), 'T');
        assert_eq!(coarsen("VBD"), 'V');
        assert_eq!(coarsen(""), UNKNOWN_POS);
    }

    #[test]
    fn test_bucket_distance() {
        assert_eq!(bucket_distance(-2), -2);
        assert_eq!(bucket_distance(5), 5);
        assert_eq!(bucket_distance(-5), -5);
        assert_eq!(bucket_distance(7), 6);
        assert_eq!(bucket_distance(-9), -6);
        assert_eq!(bucket_distance(10), 10);
        assert_eq!(bucket_distance(13), 10);
        assert_eq!(bucket_distance(-13), -10);
        assert_eq!(bucket_distance(-25), -20);
    }

    #[test]
    fn test_pos_neighbor_distance_and_stem() {
        let opts = FeatureOptions::default();
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut sent = dog_sentence();

        let fv = extractor.extract(&mut sent, 3, LabelSource::Gold, FeatureOrders::ALL, &mut table);
        let names = names(&fv, &table);

        assert!(names.contains("N\t<--2\tV"));
        assert!(names.contains("N\t<\tdog\tV"));
        // bigramas ligados: variantes com o radical atual
        assert!(names.contains("N\t<--2\trun"));
        assert!(names.contains("N\t<\tdog\trun"));
        // {V, R} também é um par permitido
        assert!(names.contains("R\t<--1\tV"));
        // {V, D} não é
        assert!(!names.iter().any(|n| n.starts_with("D\t")));
    }

    #[test]
    fn test_far_neighbors_are_bucketed_without_stem_variant() {
        let opts = FeatureOptions::default();
        let lex = SenseLexicon::new();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();

        let mut tokens = vec![Token::new("dogs", "dog", "NNS")];
        tokens.extend((0..7).map(|_| Token::new("very", "very", "RB")));
        tokens.push(Token::new("barked", "bark", "VBD"));
        let mut sent = Sentence::new(tokens);

        let fv = extractor.extract(&mut sent, 8, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
        let names = names(&fv, &table);
        assert!(names.contains("N\t<--6\tV"));
        assert!(names.contains("N\t<\tdog\tV"));
        assert!(!names.contains("N\t<--6\tbark"));
        assert!(!names.contains("N\t<\tdog\tbark"));

        let fv = extractor.extract(&mut sent, 0, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
        let names: BTreeSet<String> = fv.names(&table).into_iter().map(str::to_string).collect();
        assert!(names.contains("V\t6->\tN"));
        assert!(names.contains("V\t>\tbark\tN"));
    }

    #[test]
    fn test_core_templates() {
        let opts = FeatureOptions::default();
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut sent = dog_sentence();

        let fv = extractor.extract(&mut sent, 1, LabelSource::Gold, FeatureOrders::ALL, &mut table);
        let names = names(&fv, &table);

        for expected in [
            "bias",
            "prevLabel=O",
            "firstSense=B-animal",
            "firstSense+curTok=B-animal\tdog",
            "prevStem+curStem=the\tdog",
            "nextStem+curStem=quickly\tdog",
            "stem=dog",
            "stem@-1=the",
            "stem@2=run",
            "pos@1=RB",
            "cpos@-1=D",
            "shape@-1=Xx",
            "shape=x",
            "curTokLowercase",
        ] {
            assert!(names.contains(expected), "missing {expected:?}");
        }
        assert!(!names.iter().any(|n| n.starts_with("stem@3")));
        assert!(!names.iter().any(|n| n.starts_with("prefix=")));
        assert!(!names.iter().any(|n| n.contains("luster")));
        assert!(sent.first_senses().is_some());
    }

    #[test]
    fn test_capitalization_classes() {
        let opts = FeatureOptions::default();
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut sent = Sentence::new(vec![
            Token::new("Rex", "rex", "NNP"),
            Token::new("met", "meet", "VBD"),
            Token::new("Fido", "fido", "NNP"),
            Token::new("2day", "2day", "NN"),
        ]);

        let caps: Vec<BTreeSet<String>> = (0..4)
            .map(|j| {
                let fv = extractor.extract(&mut sent, j, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
                names(&fv, &table)
                    .into_iter()
                    .filter(|n| n.starts_with("curTok"))
                    .collect()
            })
            .collect();

        assert_eq!(caps[0], BTreeSet::from(["curTokUpperCaseFirstChar".to_string()]));
        assert_eq!(caps[1], BTreeSet::from(["curTokLowercase".to_string()]));
        assert_eq!(caps[2], BTreeSet::from(["curTokUpperCaseOther".to_string()]));
        assert_eq!(caps[3], BTreeSet::from(["curTokLowercase".to_string()]));
    }

    #[test]
    fn test_optional_templates() {
        let opts = FeatureOptions {
            use_prefix_and_suffix_features: true,
            use_cluster_features: true,
            use_bigram_features: false,
            use_pos_neighbor_features: false,
            ..FeatureOptions::default()
        };
        let lex = lexicon();
        let mut clusters = WordClusters::new();
        clusters.add_cluster(4, ["dog", "cat"]);
        let extractor = FeatureExtractor::new(&opts, &lex, Some(&clusters));
        let mut table = SymbolTable::new();
        let mut sent = dog_sentence();

        let fv = extractor.extract(&mut sent, 3, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
        let names = names(&fv, &table);

        assert!(names.contains("prefix=ran"));
        assert!(names.contains("suffix=ran"));
        assert!(names.contains("curCluster=UNK"));
        assert!(names.contains("firstSense+curCluster=B-motion\tUNK"));
        assert!(names.contains("cluster@-2=C4"));
        assert!(!names.iter().any(|n| n.starts_with("prevStem")));
        assert!(!names.iter().any(|n| n.contains("\t<")));

        let fv = extractor.extract(&mut sent, 2, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
        let names: BTreeSet<&str> = fv.names(&table);
        assert!(names.contains("prefix=qui"));
        assert!(names.contains("suffix=kly"));
    }

    #[test]
    fn test_cluster_features_without_table_are_unknown() {
        let opts = FeatureOptions {
            use_cluster_features: true,
            ..FeatureOptions::default()
        };
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut sent = dog_sentence();

        let fv = extractor.extract(&mut sent, 1, LabelSource::Gold, FeatureOrders::ZEROTH, &mut table);
        let names = names(&fv, &table);
        assert!(names.contains("curCluster=UNK"));
        assert!(names.contains("firstSense+curCluster=B-animal\tUNK"));
        assert!(names.contains("cluster@-1=UNK"));
    }

    #[test]
    fn test_first_order_only() {
        let opts = FeatureOptions::default();
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut sent = dog_sentence();
        sent.tokens[1].prediction = Some("B-person".into());

        let fv = extractor.extract(&mut sent, 2, LabelSource::Predicted, FeatureOrders::FIRST, &mut table);
        assert_eq!(names(&fv, &table), BTreeSet::from(["prevLabel=B-person".to_string()]));
        // o cache de linha de base só é calculado para features de ordem zero
        assert!(sent.first_senses().is_none());

        let fv = extractor.extract(&mut sent, 0, LabelSource::Predicted, FeatureOrders::FIRST, &mut table);
        assert!(fv.is_empty());

        let no_first = FeatureOptions {
            use_prev_label: false,
            ..FeatureOptions::default()
        };
        let extractor = FeatureExtractor::new(&no_first, &lex, None);
        let fv = extractor.extract(&mut sent, 2, LabelSource::Gold, FeatureOrders::ALL, &mut table);
        assert!(!names(&fv, &table).iter().any(|n| n.starts_with("prevLabel")));
    }

    #[test]
    fn test_frozen_alphabet_drops_unseen_features() {
        let opts = FeatureOptions::default();
        let lex = lexicon();
        let extractor = FeatureExtractor::new(&opts, &lex, None);
        let mut table = SymbolTable::new();
        let mut train = dog_sentence();
        extractor.extract_all(&mut train, LabelSource::Gold, FeatureOrders::ALL, &mut table);
        table.freeze();
        let size = table.len();

        let mut test = Sentence::new(vec![
            Token::new("A", "a", "DT"),
            Token::new("cat", "cat", "NN"),
        ]);
        let vectors = extractor.extract_all(&mut test, LabelSource::Predicted, FeatureOrders::ALL, &mut table);
        assert_eq!(vectors.len(), 2);
        assert_eq!(table.len(), size);

        let names = names(&vectors[1], &table);
        assert!(names.contains("bias"));
        assert!(names.contains("cpos=N"));
        assert!(!names.contains("stem=cat"));
    }
}
