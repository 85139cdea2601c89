//! Writing vectors to disk.
//!
//! Two formats:
//! - a `vectors.tsv` / `metadata.tsv` pair, one row per id, for the
//!   TensorFlow embedding projector
//! - JSON of a whole [`WordEmbeddings`], readable back with [`read_json`]

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use distributional_core::Shape;
use tracing::info;

use crate::error::Result;
use crate::neighbors::WordEmbeddings;
use crate::project::Projection;
use crate::vocab::Vocabulary;

/// File name for the tab-separated vectors.
pub const VECTORS_FILE: &str = "vectors.tsv";
/// File name for the word labels.
pub const METADATA_FILE: &str = "metadata.tsv";

/// Write `vectors.tsv` and `metadata.tsv` into `dir`, creating it if needed.
///
/// Row `i` of both files belongs to id `i`. Returns the two paths.
pub fn write_projector_files(
    dir: impl AsRef<Path>,
    vocab: &Vocabulary,
    projection: &Projection,
) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    Shape::vectors(projection.len(), projection.dim())
        .expect(&Shape::vectors(vocab.size(), projection.dim()))?;
    fs::create_dir_all(dir)?;

    let vectors_path = dir.join(VECTORS_FILE);
    let mut out = BufWriter::new(File::create(&vectors_path)?);
    for row in &projection.vectors {
        let line: Vec<String> = row.iter().map(|x| x.to_string()).collect();
        writeln!(out, "{}", line.join("\t"))?;
    }
    out.flush()?;

    let metadata_path = dir.join(METADATA_FILE);
    let mut out = BufWriter::new(File::create(&metadata_path)?);
    for word in vocab.words() {
        writeln!(out, "{}", word)?;
    }
    out.flush()?;

    info!(
        dir = %dir.display(),
        rows = projection.len(),
        dim = projection.dim(),
        "wrote projector files"
    );
    Ok((vectors_path, metadata_path))
}

/// Serialize embeddings as JSON.
pub fn write_json(path: impl AsRef<Path>, embeddings: &WordEmbeddings) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut out, embeddings)?;
    out.flush()?;
    info!(path = %path.display(), words = embeddings.vocab().size(), "wrote embeddings");
    Ok(())
}

/// Load embeddings written by [`write_json`].
pub fn read_json(path: impl AsRef<Path>) -> Result<WordEmbeddings> {
    let reader = BufReader::new(File::open(path)?);
    let embeddings = serde_json::from_reader(reader)?;
    Ok(embeddings)
}
