//! # Léxico de Sentidos Mais Frequentes
//!
//! Carrega os dicionários de supersentidos (substantivos e verbos) e implementa
//! a **linha de base de sentido mais frequente** de Ciaramita & Altun (2006):
//! cada expressão (uma ou mais palavras) recebe o primeiro sentido listado no
//! dicionário para a sua classe gramatical.
//!
//! ## Estruturas
//!
//! - Árvore de prefixos: tupla de radicais → {POS grossa → sentido mais frequente}.
//! - Número de sentidos por POS e expressão (metadado).
//! - Palavra → conjunto de todos os sentidos possíveis, com prefixo `B-`/`I-`
//!   conforme a posição da palavra na expressão (dados de gazetteer; não entram
//!   na linha de base).
//!
//! ## Segmentação gulosa
//!
//! A sentença é varrida da esquerda para a direita, sem retrocesso: em cada
//! posição busca-se a expressão mais longa do dicionário que começa ali.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{FeatureOptions, SenseDataFormat};
use crate::errors::{Result, SstError};
use crate::io::read_gzip_lines;
use crate::sentence::Sentence;
use crate::tagger::Tag;
use crate::trie::PrefixTrie;

/// POS grossa usada quando o token não tem etiqueta; não casa com nenhuma entrada.
pub const UNKNOWN_POS: char = '?';

/// POS grossa das entradas do dicionário de substantivos.
pub const NOUN: char = 'N';
/// POS grossa das entradas do dicionário de verbos.
pub const VERB: char = 'V';

/// O formato original separa colunas por qualquer caractere de espaço, um a um.
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s").expect("static regex is valid"));

/// Resultado de uma consulta de prefixo: quantos tokens a expressão cobre e o sentido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenseMatch<'a> {
    pub len: usize,
    pub sense: &'a str,
}

/// Léxico de sentidos. Construído uma vez e somente lido depois.
#[derive(Debug, Clone, Default)]
pub struct SenseLexicon {
    senses: PrefixTrie<String, HashMap<char, String>>,
    sense_counts: HashMap<char, HashMap<Vec<String>, usize>>,
    possible_senses: HashMap<String, BTreeSet<String>>,
}

impl SenseLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega o léxico no formato escolhido em `options`.
    pub fn load(options: &FeatureOptions) -> Result<Self> {
        let mut lexicon = Self::new();
        match options.sense_data_format {
            SenseDataFormat::Original => {
                lexicon.load_original_format(&options.noun_file, &options.verb_file)?
            }
            SenseDataFormat::New => lexicon.load_new_format(
                &options.noun_file,
                &options.verb_file,
                &options.possible_senses_file,
            )?,
        }
        Ok(lexicon)
    }

    /// Carrega os dicionários da release original do SST.
    ///
    /// # Panics
    /// Se o léxico já estiver populado.
    pub fn load_original_format(&mut self, noun_file: &Path, verb_file: &Path) -> Result<()> {
        assert!(self.is_empty(), "sense lexicon is already populated");
        tracing::info!("loading most frequent sense information (old format)");
        self.load_sense_file_original(noun_file, NOUN)?;
        self.load_sense_file_original(verb_file, VERB)?;
        tracing::info!(
            phrases = self.senses.len(),
            words = self.possible_senses.len(),
            "sense lexicon loaded"
        );
        Ok(())
    }

    fn load_sense_file_original(&mut self, path: &Path, pos: char) -> Result<()> {
        // o arquivo de substantivos tem 3 colunas por sentido, o de verbos 2
        let stride = if pos == VERB { 2 } else { 3 };
        for (i, line) in read_gzip_lines(path)?.enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let parts: Vec<&str> = WHITESPACE.split(&line).collect();
            if parts.len() < 3 {
                return Err(SstError::malformed(
                    path,
                    i + 1,
                    format!("expected at least 3 columns, found {}", parts.len()),
                ));
            }
            let phrase = split_phrase(parts[0])
                .ok_or_else(|| SstError::malformed(path, i + 1, "empty phrase"))?;
            let num_senses = (parts.len() - 1) / stride;
            self.add_most_frequent_sense(&phrase, pos, parts[2], num_senses);

            for sense in parts.iter().skip(2).step_by(stride) {
                if !sense.is_empty() {
                    self.add_possible_sense(&phrase, sense);
                }
            }
        }
        Ok(())
    }

    /// Carrega os dicionários no formato novo (`chave=valor` separados por TAB)
    /// e o gazetteer de sentidos possíveis.
    ///
    /// A ausência do gazetteer é tolerada (aviso no log); a dos dicionários não.
    ///
    /// # Panics
    /// Se o léxico já estiver populado.
    pub fn load_new_format(
        &mut self,
        noun_file: &Path,
        verb_file: &Path,
        possible_senses_file: &Path,
    ) -> Result<()> {
        assert!(self.is_empty(), "sense lexicon is already populated");
        tracing::info!("loading most frequent sense information");
        for (pos, path) in [(NOUN, noun_file), (VERB, verb_file)] {
            for (i, line) in read_gzip_lines(path)?.enumerate() {
                let line = line?;
                if line.is_empty() {
                    continue;
                }
                let parts: Vec<&str> = line.split('\t').collect();
                if parts.len() < 4 {
                    return Err(SstError::malformed(
                        path,
                        i + 1,
                        format!("expected at least 4 tab-separated columns, found {}", parts.len()),
                    ));
                }
                let phrase = split_phrase(parts[0])
                    .ok_or_else(|| SstError::malformed(path, i + 1, "empty phrase"))?;
                let sense = field_value(parts[1]);
                let num_senses = field_value(parts[3]).parse::<usize>().map_err(|e| {
                    SstError::malformed(path, i + 1, format!("invalid sense count: {e}"))
                })?;
                self.add_most_frequent_sense(&phrase, pos, sense, num_senses);
            }
        }

        match read_gzip_lines(possible_senses_file) {
            Ok(lines) => {
                for (i, line) in lines.enumerate() {
                    let line = line?;
                    if line.is_empty() {
                        continue;
                    }
                    let mut columns = line.split('\t');
                    let phrase = columns
                        .next()
                        .and_then(split_phrase)
                        .ok_or_else(|| {
                            SstError::malformed(possible_senses_file, i + 1, "empty phrase")
                        })?;
                    for sense in columns.filter(|s| !s.is_empty()) {
                        self.add_possible_sense(&phrase, sense);
                    }
                }
            }
            Err(SstError::Open { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "possible senses gazetteer not loaded");
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            phrases = self.senses.len(),
            words = self.possible_senses.len(),
            "sense lexicon loaded"
        );
        Ok(())
    }

    /// Registra o sentido mais frequente de `phrase` para a POS grossa `pos`,
    /// junto com o número de sentidos observados.
    pub fn add_most_frequent_sense(&mut self, phrase: &[String], pos: char, sense: &str, num_senses: usize) {
        match self.senses.get_mut(phrase) {
            Some(by_pos) => {
                by_pos.insert(pos, sense.to_string());
            }
            None => {
                self.senses
                    .insert(phrase, HashMap::from([(pos, sense.to_string())]));
            }
        }
        self.sense_counts
            .entry(pos)
            .or_default()
            .insert(phrase.to_vec(), num_senses);
    }

    /// Registra `sense` como possível para cada palavra de `phrase`: `B-` para a
    /// primeira palavra, `I-` para as demais.
    pub fn add_possible_sense(&mut self, phrase: &[String], sense: &str) {
        for (j, word) in phrase.iter().enumerate() {
            let prefix = if j == 0 { "B-" } else { "I-" };
            self.possible_senses
                .entry(word.clone())
                .or_default()
                .insert(format!("{prefix}{sense}"));
        }
    }

    /// Sentido mais frequente do maior prefixo de `stems` presente no dicionário.
    ///
    /// O sentido é escolhido pela POS grossa do **primeiro** token da entrada;
    /// se não houver, pela do **último**. Se nenhuma casar, a consulta é
    /// repetida com a entrada truncada para um token a menos que o prefixo
    /// encontrado, até esvaziar.
    pub fn most_frequent_sense_prefix(&self, stems: &[String], coarse_poses: &[char]) -> Option<SenseMatch<'_>> {
        let mut len = stems.len().min(coarse_poses.len());
        while len > 0 {
            let (prefix, by_pos) = self.senses.longest_prefix(&stems[..len])?;
            let poses = &coarse_poses[..len];
            let sense = poses
                .first()
                .and_then(|p| by_pos.get(p))
                .or_else(|| poses.last().and_then(|p| by_pos.get(p)));
            if let Some(sense) = sense {
                return Some(SenseMatch {
                    len: prefix.len(),
                    sense: sense.as_str(),
                });
            }
            len = prefix.len() - 1;
        }
        None
    }

    /// Rótulos BIO da linha de base de sentido mais frequente, um por token.
    pub fn first_sense_labels(&self, sentence: &Sentence) -> Vec<Tag> {
        let stems: Vec<String> = sentence.tokens.iter().map(|t| t.stem.clone()).collect();
        let poses: Vec<char> = sentence
            .tokens
            .iter()
            .map(|t| t.pos_initial().unwrap_or(UNKNOWN_POS))
            .collect();

        let mut labels = Vec::with_capacity(stems.len());
        let mut i = 0;
        while i < stems.len() {
            match self.most_frequent_sense_prefix(&stems[i..], &poses[i..]) {
                Some(m) => {
                    labels.push(Tag::Begin(m.sense.to_string()));
                    labels.extend((1..m.len).map(|_| Tag::Inside(m.sense.to_string())));
                    i += m.len;
                }
                None => {
                    labels.push(Tag::Outside);
                    i += 1;
                }
            }
        }
        labels
    }

    /// Como [`first_sense_labels`](Self::first_sense_labels), usando o cache da
    /// sentença. Recalcula apenas se o cache não existe ou não bate com o tamanho.
    pub fn cached_first_sense_labels<'s>(&self, sentence: &'s mut Sentence) -> &'s [Tag] {
        if sentence.first_senses().is_none() {
            let labels = self.first_sense_labels(sentence);
            sentence.set_first_senses(labels);
        }
        sentence.first_senses().unwrap_or(&[])
    }

    /// Mapa POS grossa → sentido mais frequente de uma expressão exata.
    pub fn senses(&self, phrase: &[String]) -> Option<&HashMap<char, String>> {
        self.senses.get(phrase)
    }

    /// Número de sentidos registrados para `phrase` com a POS `pos`.
    pub fn sense_count(&self, pos: char, phrase: &[String]) -> Option<usize> {
        self.sense_counts.get(&pos)?.get(phrase).copied()
    }

    /// Todos os sentidos possíveis (com prefixo B-/I-) de uma palavra.
    pub fn possible_senses(&self, word: &str) -> Option<&BTreeSet<String>> {
        self.possible_senses.get(word)
    }

    /// Número de expressões com sentido registrado.
    pub fn len(&self) -> usize {
        self.senses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty() && self.sense_counts.is_empty() && self.possible_senses.is_empty()
    }
}

/// "take_off" → ["take", "off"]. `None` para uma expressão vazia.
fn split_phrase(raw: &str) -> Option<Vec<String>> {
    if raw.is_empty() {
        return None;
    }
    Some(raw.split('_').map(str::to_string).collect())
}

/// "sense=noun.person" → "noun.person". Sem `=`, o campo inteiro.
fn field_value(field: &str) -> &str {
    field.split_once('=').map_or(field, |(_, value)| value)
}
