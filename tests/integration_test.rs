/// End-to-end integration tests for the symchunk pipeline.
///
/// Tests the complete flow:
///   Discovery → Provider → Flatten → Views → JSON → Stats
use std::fs;

use symchunk::config::Config;
use symchunk::indexer::core::Indexer;
use symchunk::indexer::discovery::{extension_stats, find_source_files};
use symchunk::lsp::mock::StaticProvider;
use symchunk::model::{Range, SemanticChunk, SymbolKind, SymbolNode};
use symchunk::output::{self, OutputStats};
use tempfile::tempdir;

const GZIP_HEADER: &str = "\
#pragma once

/// A gzip file device.
class QuaGzipFile {
public:
    /// Opens the file.
    bool open(int mode);
    int flags;
};
";

const SOCKET_SOURCE: &str = "\
#include \"socket.h\"

//! Connects to the peer
//! and waits.
int connectPeer(const char *host) {
    return 0;
}
";

fn gzip_tree() -> Vec<SymbolNode> {
    vec![
        SymbolNode::new("QuaGzipFile", SymbolKind::Class, Range::lines(3, 8)).with_children(vec![
            SymbolNode::new("open", SymbolKind::Method, Range::lines(6, 6)).with_detail("bool (int)"),
            SymbolNode::new("flags", SymbolKind::Field, Range::lines(7, 7)).with_detail("int"),
        ]),
    ]
}

fn socket_tree() -> Vec<SymbolNode> {
    vec![
        SymbolNode::new("connectPeer", SymbolKind::Function, Range::lines(4, 6))
            .with_detail("int (const char *)"),
    ]
}

/// Full pipeline: create sources → discover → chunk → write → read back → stats
#[tokio::test]
async fn test_full_pipeline() {
    // 1. Setup a source tree with a build dir that must be skipped
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("io")).unwrap();
    fs::create_dir_all(root.join("net")).unwrap();
    fs::create_dir_all(root.join("build")).unwrap();
    fs::write(root.join("io/quagzipfile.h"), GZIP_HEADER).unwrap();
    fs::write(root.join("net/socket.cpp"), SOCKET_SOURCE).unwrap();
    fs::write(root.join("net/README.md"), "# net").unwrap();
    fs::write(root.join("build/moc_socket.cpp"), "int x;").unwrap();

    // 2. Discover
    let config = Config::default();
    let files = find_source_files(root, &config.discovery_options()).unwrap();
    assert_eq!(files.len(), 2, "Should find 2 sources, got: {files:?}");
    let stats = extension_stats(&files);
    assert_eq!(stats.get(".h"), Some(&1));
    assert_eq!(stats.get(".cpp"), Some(&1));

    // 3. Chunk through the in-memory provider
    let mut provider = StaticProvider::new()
        .with_tree(root.join("io/quagzipfile.h"), gzip_tree())
        .with_tree(root.join("net/socket.cpp"), socket_tree());
    let result = Indexer::new(&mut provider).chunk_files(&files).await;

    assert_eq!(result.processed, 2);
    assert_eq!(result.failed, 0);
    assert_eq!(result.chunks.len(), 3);

    // Fields are not chunked
    let names: Vec<&str> = result.chunks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["QuaGzipFile", "open", "connectPeer"]);

    let class = &result.chunks[0];
    assert_eq!(class.code_type, "Class");
    assert_eq!(class.docstring, "A gzip file device.");
    assert_eq!(class.context.module, "io");
    assert_eq!(class.context.file_name, "quagzipfile.h");
    assert!(class.context.struct_name.is_empty());
    assert!(class.ident_tokens.starts_with(&[
        "QuaGzipFile".to_string(),
        "quagzipfile".to_string(),
        "Qua".to_string(),
    ]));

    let method = &result.chunks[1];
    assert_eq!(method.code_type, "Method");
    assert_eq!(method.context.struct_name, "QuaGzipFile");
    assert_eq!(method.docstring, "Opens the file.");
    assert_eq!((method.line, method.line_from, method.line_to), (7, 7, 7));
    assert_eq!(method.code_view, "bool (int)\nbool open(int mode);");

    let function = &result.chunks[2];
    assert_eq!(function.docstring, "Connects to the peer and waits.");
    assert_eq!(function.context.module, "net");
    assert!(function.context.snippet.starts_with("int connectPeer"));
    assert!(
        function
            .text_view
            .starts_with("Function connectPeer that does Connects to the peer and waits defined as")
    );
    assert!(
        function
            .text_view
            .ends_with("identifiers connectPeer connectpeer connect Peer peer")
    );

    // 4. Write JSON and read it back
    let out = root.join("out/chunks.json");
    output::write_json(&result.chunks, &out, false).unwrap();
    let data = fs::read_to_string(&out).unwrap();
    let parsed: Vec<SemanticChunk> = serde_json::from_str(&data).unwrap();
    assert_eq!(parsed, result.chunks);

    // struct_name is left out for top-level symbols
    let raw: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert!(raw[0]["context"].get("struct_name").is_none());
    assert_eq!(raw[1]["context"]["struct_name"], "QuaGzipFile");

    // 5. Stats
    let stats = OutputStats::from_chunks(&parsed);
    assert_eq!(stats.total_chunks, 3);
    assert_eq!(stats.with_docstring, 3);
    assert_eq!(stats.by_type.get("Class"), Some(&1));
    assert_eq!(stats.by_type.get("Method"), Some(&1));
    assert_eq!(stats.by_type.get("Field"), None);
    assert_eq!(stats.by_type.get("Function"), Some(&1));
}

/// A file the provider cannot answer for is reported, the rest still land.
#[tokio::test]
async fn test_pipeline_with_failing_file() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a.cpp"), SOCKET_SOURCE).unwrap();
    fs::write(root.join("b.cpp"), "int b();\n").unwrap();

    let files = find_source_files(root, &Config::default().discovery_options()).unwrap();
    let mut provider = StaticProvider::new().with_tree(root.join("a.cpp"), socket_tree());
    let result = Indexer::new(&mut provider).chunk_files(&files).await;

    assert_eq!(result.processed, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.failures[0].path, root.join("b.cpp"));
    assert_eq!(result.chunks.len(), 1);
    let dir_name = root.file_name().unwrap().to_string_lossy();
    assert_eq!(result.chunks[0].context.module, dir_name);
}

/// Config file on disk drives discovery excludes.
#[test]
fn test_config_file_drives_discovery() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().join("src");
    fs::create_dir_all(root.join("gen")).unwrap();
    fs::write(root.join("main.cc"), "int main() {}").unwrap();
    fs::write(root.join("gen/table.cc"), "int t;").unwrap();

    let config_path = temp_dir.path().join("symchunk.json");
    fs::write(
        &config_path,
        r#"{"discovery": {"exclude_patterns": ["gen/**"]}, "compact": true}"#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    assert!(config.compact);
    config.validate().unwrap();

    let files = find_source_files(&root, &config.discovery_options()).unwrap();
    assert_eq!(files, vec![root.join("main.cc")]);
}
