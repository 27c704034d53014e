/// Natural-language views of chunks: identifier tokenization and the
/// text/code strings fed to lexical and embedding search.
pub mod tokenizer;
pub mod views;
