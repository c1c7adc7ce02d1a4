//! Leitura de arquivos de dados compactados com gzip, linha a linha.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::errors::{Result, SstError};

/// Abre `path` e devolve um iterador sobre as linhas descompactadas.
///
/// Falhas de abertura viram [`SstError::Open`]; falhas no meio da leitura
/// (ex: gzip truncado, UTF-8 inválido) viram [`SstError::Read`].
pub(crate) fn read_gzip_lines(path: &Path) -> Result<impl Iterator<Item = Result<String>>> {
    let file = File::open(path).map_err(|source| SstError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let owned: PathBuf = path.to_path_buf();
    Ok(BufReader::new(MultiGzDecoder::new(file))
        .lines()
        .map(move |line| {
            line.map_err(|source| SstError::Read {
                path: owned.clone(),
                source,
            })
        }))
}
