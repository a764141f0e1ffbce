// Shared build script helper: turns a crate's README.md into crate-level rustdoc.
// Include this in build.rs files with: include!("../build_common.rs");
//
// Required imports in the including file:
//   use std::env;
//   use std::fs;
//   use std::path::Path;

/// Copy a crate's README.md into `OUT_DIR/README_GENERATED.md` for rustdoc.
///
/// Links of the form `](src/foo.rs)` are rewritten to `](foo)` so rustdoc
/// resolves them as module paths. A crate without a README gets a one-line
/// placeholder so `include_str!` never fails.
fn process_readme_for_rustdoc(crate_dir: &str) {
    println!("cargo:rerun-if-changed=README.md");

    let readme_path = Path::new(crate_dir).join("README.md");
    let content = fs::read_to_string(&readme_path).unwrap_or_else(|_| {
        let name = env::var("CARGO_PKG_NAME").unwrap_or_default();
        format!("# {name}\n")
    });

    let rustdoc_content = content.replace("](src/", "](").replace(".rs)", ")");

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("README_GENERATED.md");
    fs::write(dest_path, rustdoc_content).unwrap();
}
