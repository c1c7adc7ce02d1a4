//! # Tipos de Erro
//!
//! Todos os erros recuperáveis do crate passam por [`SstError`]. Violações de
//! pré-condição (ex: recarregar um léxico já populado) não são erros: são `panic!`.

use std::path::PathBuf;

/// `Result` do crate, com [`SstError`] como erro padrão.
pub type Result<T, E = SstError> = std::result::Result<T, E>;

/// Erros produzidos pelo carregamento de recursos e pelo alfabeto de features.
#[derive(Debug, thiserror::Error)]
pub enum SstError {
    /// Não foi possível abrir um arquivo de dados configurado.
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Falha de leitura no meio de um arquivo (ex: gzip corrompido).
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Linha de dicionário, gazetteer ou arquivo de clusters fora do formato esperado.
    #[error("{}:{line}: {message}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Tentativa de registrar um símbolo novo em um alfabeto congelado.
    #[error("cannot add new item to frozen symbol table: {0}")]
    FrozenVocabulary(String),

    /// Símbolo ou índice inexistente no alfabeto.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Arquivo de configuração inválido.
    #[error("invalid configuration in '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Erro de (de)serialização JSON fora do contexto de configuração.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SstError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        SstError::MalformedLine {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
